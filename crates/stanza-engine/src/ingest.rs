//! Build corpus rows from raw text.

use rayon::prelude::*;
use stanza_core::corpus::CorpusLine;
use stanza_core::error::{Result, StanzaError};
use stanza_core::phonetics::Phonetics;
use std::path::Path;

/// Outcome of turning raw lines into corpus rows.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub rows: Vec<CorpusLine>,
    /// Non-blank lines dropped because they carry no rhyme.
    pub skipped: usize,
}

/// Analyse one trimmed line. `None` for blank lines and lines without a
/// rhyme-bearing final word.
pub fn analyse_line(line: &str, phonetics: &dyn Phonetics) -> Option<CorpusLine> {
    let text = line.trim();
    if text.is_empty() {
        return None;
    }
    let final_word = phonetics.final_word(text)?;
    let rhyme_key = phonetics.rhyme_key(&final_word)?;
    Some(CorpusLine::new(
        text,
        phonetics.syllables(text),
        final_word,
        rhyme_key,
    ))
}

/// Analyse `lines` in parallel, keeping input order.
pub fn rows_from_lines<I, L>(lines: I, phonetics: &dyn Phonetics) -> IngestReport
where
    I: IntoIterator<Item = L>,
    L: AsRef<str>,
{
    let lines: Vec<String> = lines
        .into_iter()
        .map(|l| l.as_ref().trim().to_string())
        .filter(|l| !l.is_empty())
        .collect();

    let analysed: Vec<Option<CorpusLine>> = lines
        .par_iter()
        .map(|line| analyse_line(line, phonetics))
        .collect();

    let total = analysed.len();
    let rows: Vec<CorpusLine> = analysed.into_iter().flatten().collect();
    let skipped = total - rows.len();
    if skipped > 0 {
        tracing::debug!("skipped {} lines without a rhyme", skipped);
    }
    IngestReport { rows, skipped }
}

/// Analyse newline-delimited text.
pub fn rows_from_text(text: &str, phonetics: &dyn Phonetics) -> IngestReport {
    rows_from_lines(text.lines(), phonetics)
}

/// Analyse a text file, one corpus line per file line.
pub fn rows_from_file(path: &Path, phonetics: &dyn Phonetics) -> Result<IngestReport> {
    let text = std::fs::read_to_string(path).map_err(|source| StanzaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let report = rows_from_text(&text, phonetics);
    tracing::debug!("read {} corpus lines from {}", report.rows.len(), path.display());
    Ok(report)
}
