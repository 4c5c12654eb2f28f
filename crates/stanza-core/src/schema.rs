//! On-disk corpus document and its version handling.

use crate::corpus::CorpusLine;
use crate::error::{Result, StanzaError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const CURRENT_VERSION: &str = "1.0.0";

/// A stored corpus: rows plus metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusDocument {
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
    pub lines: Vec<CorpusLine>,
}

impl CorpusDocument {
    pub fn new(lines: Vec<CorpusLine>) -> Self {
        let now = Utc::now();
        Self {
            version: CURRENT_VERSION.to_string(),
            created_at: now,
            updated_at: now,
            description: String::new(),
            lines,
        }
    }

    /// Bump `updated_at` after a mutation.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Reject documents written by an incompatible version.
pub fn validate_version(doc: &CorpusDocument) -> Result<()> {
    if doc.version != CURRENT_VERSION {
        return Err(StanzaError::StructureInvalid(format!(
            "corpus version mismatch: expected {}, found {}",
            CURRENT_VERSION, doc.version
        )));
    }
    Ok(())
}

/// Serialize a corpus document to pretty-printed JSON.
pub fn to_json(doc: &CorpusDocument) -> Result<String> {
    serde_json::to_string_pretty(doc).map_err(|e| {
        StanzaError::StructureInvalid(format!("failed to serialize corpus: {}", e))
    })
}

/// Deserialize and validate a corpus document.
pub fn from_json(json: &str) -> Result<CorpusDocument> {
    let doc: CorpusDocument = serde_json::from_str(json).map_err(|e| {
        StanzaError::StructureInvalid(format!(
            "{}; delete the corpus file and rebuild it",
            e
        ))
    })?;
    validate_version(&doc)?;
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_roundtrip_preserves_description() {
        let mut doc = CorpusDocument::new(vec![CorpusLine::new("a man", 2, "man", "an")]);
        doc.description = "it's \"quoted\"; -- DROP".to_string();
        let back = from_json(&to_json(&doc).unwrap()).unwrap();
        assert_eq!(back.description, doc.description);
        assert_eq!(back.lines, doc.lines);
    }

    #[test]
    fn test_version_mismatch_is_structure_invalid() {
        let mut doc = CorpusDocument::new(Vec::new());
        doc.version = "0.1.0".to_string();
        let json = to_json(&doc).unwrap();
        let err = from_json(&json).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StructureInvalid);
    }

    #[test]
    fn test_garbage_is_structure_invalid() {
        let err = from_json("{\"lines\": 3}").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StructureInvalid);
    }
}
