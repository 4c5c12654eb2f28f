//! File-backed corpora: one JSON document per corpus in a corpus directory.

use crate::corpus::{CorpusLine, CorpusStore, RhymeCount, RhymeIndex, SyllableRange};
use crate::error::{Result, StanzaError};
use crate::schema::{self, CorpusDocument};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const CORPUS_EXT: &str = "json";

/// Get the path of the document for corpus `name` inside `dir`.
pub fn corpus_file(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.{}", name, CORPUS_EXT))
}

/// Check if corpus `name` has been written to `dir`.
pub fn corpus_exists(dir: &Path, name: &str) -> bool {
    corpus_file(dir, name).exists()
}

/// Corpus names are used as file stems, so keep them to a safe alphabet.
pub fn validate_name(name: &str) -> Result<()> {
    let ok = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(StanzaError::InvalidOption {
            option: "corpus",
            reason: format!("{:?} must be non-empty and use only [A-Za-z0-9_-]", name),
        })
    }
}

/// Names of every corpus stored in `dir`, sorted. A missing directory has none.
pub fn list(dir: &Path) -> Result<Vec<String>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let entries = fs::read_dir(dir).map_err(|e| StanzaError::io(dir, e))?;
    let mut names: Vec<String> = entries
        .flatten()
        .filter_map(|entry| {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(CORPUS_EXT) {
                return None;
            }
            path.file_stem()
                .and_then(|s| s.to_str())
                .filter(|s| validate_name(s).is_ok())
                .map(str::to_string)
        })
        .collect();
    names.sort();
    Ok(names)
}

/// Every corpus in `dir` with its description. Unreadable corpora map to `""`.
pub fn list_with_descriptions(dir: &Path) -> Result<BTreeMap<String, String>> {
    Ok(list(dir)?
        .into_iter()
        .map(|name| {
            let desc = FileCorpus::open(dir, &name)
                .map(|c| c.description())
                .unwrap_or_else(|e| {
                    tracing::debug!("skipping description of {}: {}", name, e);
                    String::new()
                });
            (name, desc)
        })
        .collect())
}

/// A corpus persisted as JSON.
///
/// The document is read once on [`FileCorpus::open`] and served from memory;
/// mutations write it straight back. Dropping or [`FileCorpus::close`]-ing
/// the handle releases it.
#[derive(Debug)]
pub struct FileCorpus {
    name: String,
    path: PathBuf,
    doc: Option<CorpusDocument>,
    index: RhymeIndex,
}

impl FileCorpus {
    /// Open corpus `name` in `dir`. A corpus that has not been written yet
    /// opens fine and reports `exists() == false` until rows are ingested.
    pub fn open(dir: &Path, name: &str) -> Result<Self> {
        validate_name(name)?;
        let path = corpus_file(dir, name);
        let doc = if path.exists() {
            let json = fs::read_to_string(&path).map_err(|e| StanzaError::io(&path, e))?;
            Some(schema::from_json(&json)?)
        } else {
            None
        };
        let index = doc
            .as_ref()
            .map(|d| RhymeIndex::build(&d.lines))
            .unwrap_or_default();
        Ok(Self {
            name: name.to_string(),
            path,
            doc,
            index,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the handle.
    pub fn close(self) {
        tracing::debug!("closed corpus {}", self.name);
    }

    /// Delete the stored document, if any.
    pub fn remove(self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| StanzaError::io(&self.path, e))?;
        }
        Ok(())
    }

    /// Write `doc` to disk. Callers commit it to the handle only after this
    /// succeeds, so a failed write leaves the handle as it was.
    fn save(&self, doc: &CorpusDocument) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| StanzaError::io(dir, e))?;
        }
        let json = schema::to_json(doc)?;
        fs::write(&self.path, json).map_err(|e| StanzaError::io(&self.path, e))
    }
}

impl CorpusStore for FileCorpus {
    fn exists(&self) -> bool {
        self.doc.is_some()
    }

    fn row_count(&self) -> usize {
        self.index.rows()
    }

    fn description(&self) -> String {
        self.doc
            .as_ref()
            .map(|d| d.description.clone())
            .unwrap_or_default()
    }

    fn set_description(&mut self, text: &str) -> Result<()> {
        let Some(doc) = &self.doc else {
            return Err(StanzaError::MissingCorpus(self.name.clone()));
        };
        let mut next = doc.clone();
        next.description = text.to_string();
        next.touch();
        self.save(&next)?;
        self.doc = Some(next);
        Ok(())
    }

    fn rhyme_keys_with_count(
        &self,
        min_distinct_final_words: usize,
        syllables: Option<SyllableRange>,
    ) -> Result<Vec<RhymeCount>> {
        Ok(self.index.rhyme_counts(min_distinct_final_words, syllables))
    }

    fn lines_for_rhyme(
        &self,
        rhyme_key: &str,
        syllables: Option<SyllableRange>,
    ) -> Result<Vec<CorpusLine>> {
        Ok(self.index.lines_for(rhyme_key, syllables))
    }

    fn ingest(&mut self, rows: Vec<CorpusLine>) -> Result<()> {
        let mut next = CorpusDocument::new(rows);
        if let Some(doc) = &self.doc {
            next.created_at = doc.created_at;
            next.description.clone_from(&doc.description);
        }
        self.save(&next)?;
        self.index = RhymeIndex::build(&next.lines);
        self.doc = Some(next);
        Ok(())
    }
}
