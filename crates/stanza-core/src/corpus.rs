//! Corpus data model and the read-only query surface the engine selects from.

use crate::error::{Result, StanzaError};
use crate::phonetics::Phonetics;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

/// One line of source text, indexed by rhyme and syllable count.
///
/// Rows are the 4-tuple `(line, syllables, final_word, rhyme)`. `rhyme_key`
/// groups lines that rhyme; `final_word` is the word the rhyme was taken from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorpusLine {
    pub text: String,
    pub syllable_count: u32,
    pub final_word: String,
    pub rhyme_key: String,
}

impl CorpusLine {
    pub fn new(
        text: impl Into<String>,
        syllable_count: u32,
        final_word: impl Into<String>,
        rhyme_key: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            syllable_count,
            final_word: final_word.into(),
            rhyme_key: rhyme_key.into(),
        }
    }
}

/// A rhyme key and the number of distinct final words that carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RhymeCount {
    pub rhyme_key: String,
    pub count: usize,
}

/// Inclusive syllable bounds for a corpus query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyllableRange {
    pub min: u32,
    pub max: u32,
}

impl SyllableRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// A range matching exactly `n` syllables.
    pub fn exactly(n: u32) -> Self {
        Self { min: n, max: n }
    }

    pub fn contains(&self, syllables: u32) -> bool {
        (self.min..=self.max).contains(&syllables)
    }
}

/// One column of a corpus row, for printing a projection of query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RhymeColumn {
    Rhyme,
    FinalWord,
    Syllables,
    Line,
}

impl RhymeColumn {
    pub fn project(self, line: &CorpusLine) -> String {
        match self {
            Self::Rhyme => line.rhyme_key.clone(),
            Self::FinalWord => line.final_word.clone(),
            Self::Syllables => line.syllable_count.to_string(),
            Self::Line => line.text.clone(),
        }
    }
}

impl FromStr for RhymeColumn {
    type Err = StanzaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "rhyme" => Ok(Self::Rhyme),
            "final_word" => Ok(Self::FinalWord),
            "syllables" => Ok(Self::Syllables),
            "line" => Ok(Self::Line),
            other => Err(StanzaError::InvalidOption {
                option: "column",
                reason: format!(
                    "{:?} is not one of rhyme, final_word, syllables, line",
                    other
                ),
            }),
        }
    }
}

/// Query surface of a rhyme/syllable indexed corpus.
///
/// Reads are idempotent. Implementations that allow concurrent readers are
/// responsible for their own synchronisation; the engine holds no locks.
pub trait CorpusStore {
    /// Whether the corpus has been created.
    fn exists(&self) -> bool;

    /// Number of stored rows, `0` when the corpus does not exist.
    fn row_count(&self) -> usize;

    /// Free-form description. Empty when unset or when the corpus is missing.
    fn description(&self) -> String;

    /// Store `text` exactly as given.
    fn set_description(&mut self, text: &str) -> Result<()>;

    /// Rhyme keys carried by at least `min_distinct_final_words` distinct
    /// final words, optionally counting only lines within `syllables`.
    /// Sorted by rhyme key.
    fn rhyme_keys_with_count(
        &self,
        min_distinct_final_words: usize,
        syllables: Option<SyllableRange>,
    ) -> Result<Vec<RhymeCount>>;

    /// All lines with the given rhyme key, optionally within `syllables`.
    fn lines_for_rhyme(
        &self,
        rhyme_key: &str,
        syllables: Option<SyllableRange>,
    ) -> Result<Vec<CorpusLine>>;

    /// Replace the corpus contents with `rows`, creating it if needed.
    fn ingest(&mut self, rows: Vec<CorpusLine>) -> Result<()>;

    /// Every line that rhymes with `word`, ordered by final word, syllable
    /// count and text. Empty when `word` has no rhyme key.
    fn rhymes_for_word(&self, word: &str, phonetics: &dyn Phonetics) -> Result<Vec<CorpusLine>> {
        let Some(key) = phonetics
            .final_word(word)
            .and_then(|w| phonetics.rhyme_key(&w))
        else {
            return Ok(Vec::new());
        };
        let mut lines = self.lines_for_rhyme(&key, None)?;
        lines.sort_by(|a, b| {
            (&a.final_word, a.syllable_count, &a.text).cmp(&(&b.final_word, b.syllable_count, &b.text))
        });
        Ok(lines)
    }
}

/// Lines grouped by rhyme key. Shared by the in-memory and file stores.
#[derive(Debug, Clone, Default)]
pub(crate) struct RhymeIndex {
    by_rhyme: BTreeMap<String, Vec<CorpusLine>>,
    rows: usize,
}

impl RhymeIndex {
    pub(crate) fn build(rows: &[CorpusLine]) -> Self {
        let mut by_rhyme: BTreeMap<String, Vec<CorpusLine>> = BTreeMap::new();
        for row in rows {
            by_rhyme
                .entry(row.rhyme_key.clone())
                .or_default()
                .push(row.clone());
        }
        Self {
            by_rhyme,
            rows: rows.len(),
        }
    }

    pub(crate) fn rows(&self) -> usize {
        self.rows
    }

    pub(crate) fn rhyme_counts(
        &self,
        min_distinct_final_words: usize,
        syllables: Option<SyllableRange>,
    ) -> Vec<RhymeCount> {
        self.by_rhyme
            .iter()
            .filter_map(|(key, lines)| {
                let words: BTreeSet<&str> = lines
                    .iter()
                    .filter(|l| syllables.is_none_or(|r| r.contains(l.syllable_count)))
                    .map(|l| l.final_word.as_str())
                    .collect();
                (!words.is_empty() && words.len() >= min_distinct_final_words).then(|| {
                    RhymeCount {
                        rhyme_key: key.clone(),
                        count: words.len(),
                    }
                })
            })
            .collect()
    }

    pub(crate) fn lines_for(
        &self,
        rhyme_key: &str,
        syllables: Option<SyllableRange>,
    ) -> Vec<CorpusLine> {
        self.by_rhyme
            .get(rhyme_key)
            .map(|lines| {
                lines
                    .iter()
                    .filter(|l| syllables.is_none_or(|r| r.contains(l.syllable_count)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// In-process corpus. Does not exist until rows are ingested.
#[derive(Debug, Clone, Default)]
pub struct MemoryCorpus {
    index: Option<RhymeIndex>,
    description: String,
}

impl MemoryCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// An existing corpus holding `rows`.
    pub fn from_lines(rows: Vec<CorpusLine>) -> Self {
        Self {
            index: Some(RhymeIndex::build(&rows)),
            description: String::new(),
        }
    }
}

impl CorpusStore for MemoryCorpus {
    fn exists(&self) -> bool {
        self.index.is_some()
    }

    fn row_count(&self) -> usize {
        self.index.as_ref().map_or(0, RhymeIndex::rows)
    }

    fn description(&self) -> String {
        self.description.clone()
    }

    fn set_description(&mut self, text: &str) -> Result<()> {
        if self.index.is_none() {
            return Err(StanzaError::MissingCorpus("<memory>".to_string()));
        }
        self.description = text.to_string();
        Ok(())
    }

    fn rhyme_keys_with_count(
        &self,
        min_distinct_final_words: usize,
        syllables: Option<SyllableRange>,
    ) -> Result<Vec<RhymeCount>> {
        Ok(self
            .index
            .as_ref()
            .map(|i| i.rhyme_counts(min_distinct_final_words, syllables))
            .unwrap_or_default())
    }

    fn lines_for_rhyme(
        &self,
        rhyme_key: &str,
        syllables: Option<SyllableRange>,
    ) -> Result<Vec<CorpusLine>> {
        Ok(self
            .index
            .as_ref()
            .map(|i| i.lines_for(rhyme_key, syllables))
            .unwrap_or_default())
    }

    fn ingest(&mut self, rows: Vec<CorpusLine>) -> Result<()> {
        self.index = Some(RhymeIndex::build(&rows));
        Ok(())
    }
}
