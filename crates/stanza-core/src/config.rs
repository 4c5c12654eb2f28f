//! Configuration for corpus storage and poem generation.
//!
//! Load order: `.stanza/config.toml` → environment variables → defaults.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level stanza configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StanzaConfig {
    pub corpus: CorpusConfig,
    pub generation: GenerationConfig,
}

/// Where file-backed corpora live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Corpus directory. Relative paths resolve against the project root.
    pub dir: PathBuf,
}

/// Defaults applied to every generated poem.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Require a capitalised first line and a sentence-ending last line.
    pub proper: bool,
    /// Whitespace emitted per indent level.
    pub indent_unit: String,
    /// How many times a caller-side retry loop re-runs a poem that hit
    /// `NotEnoughData`. The engine itself never retries.
    pub attempts: usize,
    /// Fixed RNG seed for reproducible output.
    pub seed: Option<u64>,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".stanza").join("corpora"),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            proper: true,
            indent_unit: "  ".to_string(),
            attempts: 1,
            seed: None,
        }
    }
}

/// Helper to parse an env var and apply it to a config field.
fn env_override<T: std::str::FromStr>(var: &str, target: &mut T) {
    if let Ok(v) = std::env::var(var)
        && let Ok(n) = v.parse()
    {
        *target = n;
    }
}

impl StanzaConfig {
    /// Load config from `.stanza/config.toml` in the project root, with env var overrides.
    /// Falls back to defaults if no config file exists.
    pub fn load(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join(".stanza").join("config.toml");

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };

        env_override("STANZA_CORPUS_DIR", &mut config.corpus.dir);
        env_override("STANZA_PROPER", &mut config.generation.proper);
        env_override("STANZA_ATTEMPTS", &mut config.generation.attempts);
        env_override("STANZA_INDENT_UNIT", &mut config.generation.indent_unit);
        if let Ok(v) = std::env::var("STANZA_SEED")
            && let Ok(seed) = v.parse()
        {
            config.generation.seed = Some(seed);
        }

        if config.corpus.dir.is_relative() {
            config.corpus.dir = project_root.join(&config.corpus.dir);
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.generation.attempts == 0 {
            anyhow::bail!("generation.attempts must be at least 1");
        }
        if !self.generation.indent_unit.chars().all(char::is_whitespace) {
            anyhow::bail!(
                "generation.indent_unit must be whitespace, got {:?}",
                self.generation.indent_unit
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StanzaConfig::default();
        assert_eq!(config.corpus.dir, PathBuf::from(".stanza/corpora"));
        assert!(config.generation.proper);
        assert_eq!(config.generation.indent_unit, "  ");
        assert_eq!(config.generation.attempts, 1);
        assert!(config.generation.seed.is_none());
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
[corpus]
dir = "/srv/corpora"

[generation]
proper = false
attempts = 5
"#;
        let config: StanzaConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.corpus.dir, PathBuf::from("/srv/corpora"));
        assert!(!config.generation.proper);
        assert_eq!(config.generation.attempts, 5);
        // Defaults for unspecified fields
        assert_eq!(config.generation.indent_unit, "  ");
    }

    #[test]
    fn test_load_resolves_relative_corpus_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join(".stanza");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("config.toml"),
            "[corpus]\ndir = \"poems\"\n[generation]\nindent_unit = \"\\t\"\n",
        )
        .unwrap();

        let config = StanzaConfig::load(tmp.path()).unwrap();
        assert_eq!(config.corpus.dir, tmp.path().join("poems"));
        assert_eq!(config.generation.indent_unit, "\t");
    }

    #[test]
    fn test_load_rejects_zero_attempts() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join(".stanza");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.toml"), "[generation]\nattempts = 0\n").unwrap();
        assert!(StanzaConfig::load(tmp.path()).is_err());
    }

    #[test]
    fn test_load_rejects_visible_indent_unit() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join(".stanza");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.toml"), "[generation]\nindent_unit = \"--\"\n")
            .unwrap();
        assert!(StanzaConfig::load(tmp.path()).is_err());
    }
}
