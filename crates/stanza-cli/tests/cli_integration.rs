//! Integration tests for stanza-cli functionality.
//! Tests the library calls the CLI commands are built from.

use stanza_core::config::StanzaConfig;
use stanza_core::EnglishHeuristic;
use stanza_core::corpus::{CorpusStore, RhymeColumn};
use stanza_core::storage::{self, FileCorpus};
use stanza_engine::{Poem, PoemOptions};

const SOURCE: &str = "\
There once was a man.
He had a plan.
She baked a flan.
I caught a fish.
Make a wish.
Down by the sea.
Up in a tree.
";

fn write_config(root: &std::path::Path, body: &str) {
    let dir = root.join(".stanza");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), body).unwrap();
}

#[test]
fn test_config_resolves_corpus_dir_against_root() {
    let tmpdir = tempfile::tempdir().unwrap();
    write_config(tmpdir.path(), "[corpus]\ndir = \"poems\"\n");
    let config = StanzaConfig::load(tmpdir.path()).unwrap();
    assert_eq!(config.corpus.dir, tmpdir.path().join("poems"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let tmpdir = tempfile::tempdir().unwrap();
    write_config(tmpdir.path(), "[generation]\nindent_unit = \"--\"\n");
    assert!(StanzaConfig::load(tmpdir.path()).is_err());
}

#[test]
fn test_make_list_and_describe() {
    let tmpdir = tempfile::tempdir().unwrap();
    let config = StanzaConfig::load(tmpdir.path()).unwrap();
    let dir = &config.corpus.dir;

    let mut poem = Poem::new(FileCorpus::open(dir, "nursery").unwrap());
    poem.make_corpus(SOURCE.lines()).unwrap();
    poem.store_mut().set_description("O'Reilly's \"best\"").unwrap();
    poem.into_store().close();

    let mut empty = Poem::new(FileCorpus::open(dir, "blank").unwrap());
    empty.make_corpus(std::iter::empty::<&str>()).unwrap();

    assert_eq!(storage::list(dir).unwrap(), vec!["blank", "nursery"]);
    let described = storage::list_with_descriptions(dir).unwrap();
    assert_eq!(described["nursery"], "O'Reilly's \"best\"");
    assert_eq!(described["blank"], "");
}

#[test]
fn test_rhymes_for_a_word() {
    let tmpdir = tempfile::tempdir().unwrap();
    let config = StanzaConfig::load(tmpdir.path()).unwrap();
    let dir = &config.corpus.dir;

    let mut poem = Poem::new(FileCorpus::open(dir, "nursery").unwrap());
    poem.make_corpus(SOURCE.lines()).unwrap();
    poem.into_store().close();

    let store = FileCorpus::open(dir, "nursery").unwrap();
    let lines = store.rhymes_for_word("Tan", &EnglishHeuristic).unwrap();
    let column: RhymeColumn = "final_word".parse().unwrap();
    let words: Vec<String> = lines.iter().map(|l| column.project(l)).collect();
    assert_eq!(words, vec!["flan", "man", "plan"]);

    let texts: Vec<String> = store
        .rhymes_for_word("flea", &EnglishHeuristic)
        .unwrap()
        .iter()
        .map(|l| RhymeColumn::Line.project(l))
        .collect();
    assert_eq!(texts, vec!["Down by the sea.", "Up in a tree."]);
    assert!(store.rhymes_for_word("orange", &EnglishHeuristic).unwrap().is_empty());
    assert!("colour".parse::<RhymeColumn>().is_err());
}

#[test]
fn test_list_shows_every_corpus_name() {
    let tmpdir = tempfile::tempdir().unwrap();
    let dir = tmpdir.path();
    for name in ["test", "spec_nursery", "nursery"] {
        let mut poem = Poem::new(FileCorpus::open(dir, name).unwrap());
        poem.make_corpus(SOURCE.lines()).unwrap();
    }
    assert_eq!(storage::list(dir).unwrap(), vec!["nursery", "spec_nursery", "test"]);
}

#[test]
fn test_generate_with_config_settings() {
    let tmpdir = tempfile::tempdir().unwrap();
    write_config(
        tmpdir.path(),
        "[generation]\nindent_unit = \"\\t\"\nseed = 11\n",
    );
    let config = StanzaConfig::load(tmpdir.path()).unwrap();

    let mut store = FileCorpus::open(&config.corpus.dir, "nursery").unwrap();
    let rows = stanza_engine::ingest::rows_from_text(SOURCE, &stanza_core::EnglishHeuristic);
    store.ingest(rows.rows).unwrap();

    let options = PoemOptions::new().rhyme("aabb").indent("0110");
    let first = Poem::new(FileCorpus::open(&config.corpus.dir, "nursery").unwrap())
        .with_config(&config.generation)
        .generate(&options)
        .unwrap();
    let second = Poem::new(store)
        .with_config(&config.generation)
        .generate(&options)
        .unwrap();

    assert_eq!(first, second);
    assert!(!first[0].starts_with('\t'));
    assert!(first[1].starts_with('\t'));
    assert!(first[2].starts_with('\t'));
}

#[test]
fn test_template_json_for_form() {
    let options = PoemOptions::new().form("haiku");
    let resolved =
        stanza_engine::resolve::resolve(&options, &stanza_core::EnglishHeuristic, true).unwrap();
    let json = serde_json::to_value(&resolved.template).unwrap();
    let slots = json["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 3);
    assert_eq!(slots[1]["syllable_target"], 7);
}
