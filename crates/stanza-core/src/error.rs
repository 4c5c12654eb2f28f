//! Error type shared by the stanza crates.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, StanzaError>;

/// Every failure a generation or corpus call can surface.
///
/// The first four variants are the kinds callers branch on; the rest cover
/// bad option strings and storage plumbing.
#[derive(Debug, thiserror::Error)]
pub enum StanzaError {
    /// The rhyme scheme string is malformed. Raised before any corpus query.
    #[error("invalid rhyme scheme {scheme:?}: {reason}")]
    RhymeError { scheme: String, reason: String },
    /// No form, sample text, or rhyme scheme produced a usable template.
    #[error("no poetic form or rhyme scheme was given")]
    MissingFormOrRhyme,
    /// The corpus (after filters) cannot satisfy some group of slots.
    #[error("not enough data in corpus: {0}")]
    NotEnoughData(String),
    /// The stored corpus is malformed and must be rebuilt.
    #[error("corpus structure is invalid: {0}")]
    StructureInvalid(String),
    #[error("invalid option `{option}`: {reason}")]
    InvalidOption { option: &'static str, reason: String },
    #[error("corpus `{0}` does not exist")]
    MissingCorpus(String),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Payload-free discriminant of [`StanzaError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    RhymeError,
    MissingFormOrRhyme,
    NotEnoughData,
    StructureInvalid,
    InvalidOption,
    MissingCorpus,
    Io,
}

impl StanzaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RhymeError { .. } => ErrorKind::RhymeError,
            Self::MissingFormOrRhyme => ErrorKind::MissingFormOrRhyme,
            Self::NotEnoughData(_) => ErrorKind::NotEnoughData,
            Self::StructureInvalid(_) => ErrorKind::StructureInvalid,
            Self::InvalidOption { .. } => ErrorKind::InvalidOption,
            Self::MissingCorpus(_) => ErrorKind::MissingCorpus,
            Self::Io { .. } => ErrorKind::Io,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn rhyme(scheme: &str, reason: impl Into<String>) -> Self {
        Self::RhymeError {
            scheme: scheme.to_string(),
            reason: reason.into(),
        }
    }
}
