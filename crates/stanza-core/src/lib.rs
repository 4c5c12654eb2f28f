//! Core types and storage for stanza.
//!
//! Provides the corpus data model ([`corpus::CorpusLine`]), the read-only
//! [`corpus::CorpusStore`] contract the poem engine queries, an in-memory and
//! a JSON file-backed store, the error type shared by every crate, workspace
//! configuration, and the phonetics heuristics used when building corpora.

pub mod config;
pub mod corpus;
pub mod error;
pub mod phonetics;
pub mod schema;
pub mod storage;

pub use corpus::{CorpusLine, CorpusStore, MemoryCorpus, RhymeColumn, RhymeCount, SyllableRange};
pub use error::{ErrorKind, Result, StanzaError};
pub use phonetics::{EnglishHeuristic, Phonetics};
pub use storage::FileCorpus;
