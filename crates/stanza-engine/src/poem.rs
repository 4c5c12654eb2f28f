//! The poem generation session: a corpus store, default options, and a
//! random source.

use crate::ingest::{IngestReport, rows_from_file, rows_from_lines};
use crate::options::PoemOptions;
use crate::postprocess::post_process;
use crate::resolve::resolve;
use crate::selector::{Filters, LineSelector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stanza_core::config::GenerationConfig;
use stanza_core::corpus::CorpusStore;
use stanza_core::error::{Result, StanzaError};
use stanza_core::phonetics::{EnglishHeuristic, Phonetics};
use std::path::Path;

/// Generates poems from one corpus.
///
/// Options passed to [`Poem::generate`] are merged over the session
/// defaults for that call only; the defaults change only through
/// [`Poem::set_defaults`].
pub struct Poem<S: CorpusStore> {
    store: S,
    defaults: PoemOptions,
    phonetics: Box<dyn Phonetics>,
    rng: StdRng,
    proper: bool,
    indent_unit: String,
}

impl<S: CorpusStore> Poem<S> {
    /// A session with an OS-seeded RNG and default generation settings.
    pub fn new(store: S) -> Self {
        let config = GenerationConfig::default();
        Self {
            store,
            defaults: PoemOptions::default(),
            phonetics: Box::new(EnglishHeuristic),
            rng: StdRng::from_os_rng(),
            proper: config.proper,
            indent_unit: config.indent_unit,
        }
    }

    /// Apply `[generation]` settings, including its seed if one is set.
    #[must_use]
    pub fn with_config(mut self, config: &GenerationConfig) -> Self {
        self.proper = config.proper;
        self.indent_unit.clone_from(&config.indent_unit);
        if let Some(seed) = config.seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    #[must_use]
    pub fn with_defaults(mut self, defaults: PoemOptions) -> Self {
        self.defaults = defaults;
        self
    }

    /// Phonetics used for ingestion and sample-text syllable counts.
    #[must_use]
    pub fn with_phonetics(mut self, phonetics: impl Phonetics + 'static) -> Self {
        self.phonetics = Box::new(phonetics);
        self
    }

    pub fn defaults(&self) -> &PoemOptions {
        &self.defaults
    }

    pub fn set_defaults(&mut self, defaults: PoemOptions) {
        self.defaults = defaults;
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Generate one poem using the session RNG.
    pub fn generate(&mut self, options: &PoemOptions) -> Result<Vec<String>> {
        generate_with(
            &self.store,
            &self.defaults,
            self.phonetics.as_ref(),
            self.proper,
            &self.indent_unit,
            options,
            &mut self.rng,
        )
    }

    /// Generate one poem from the session defaults alone.
    pub fn generate_default(&mut self) -> Result<Vec<String>> {
        self.generate(&PoemOptions::default())
    }

    /// Generate one poem with a caller-supplied RNG. Leaves the session RNG
    /// untouched, so concurrent callers can share a `&Poem`.
    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        options: &PoemOptions,
        rng: &mut R,
    ) -> Result<Vec<String>> {
        generate_with(
            &self.store,
            &self.defaults,
            self.phonetics.as_ref(),
            self.proper,
            &self.indent_unit,
            options,
            rng,
        )
    }

    /// Replace the corpus with rows built from `lines`.
    pub fn make_corpus<I, L>(&mut self, lines: I) -> Result<IngestReport>
    where
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        let report = rows_from_lines(lines, self.phonetics.as_ref());
        self.rebuild(report)
    }

    /// Replace the corpus with rows built from a text file.
    pub fn make_corpus_from_file(&mut self, path: &Path) -> Result<IngestReport> {
        let report = rows_from_file(path, self.phonetics.as_ref())?;
        self.rebuild(report)
    }

    fn rebuild(&mut self, report: IngestReport) -> Result<IngestReport> {
        self.store.ingest(report.rows.clone())?;
        tracing::info!(
            "corpus rebuilt with {} lines ({} skipped)",
            report.rows.len(),
            report.skipped
        );
        Ok(report)
    }

    /// End the session and hand back the store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// End the session, releasing the store.
    pub fn close(self) {
        drop(self.store);
    }
}

fn generate_with<S: CorpusStore + ?Sized, R: Rng + ?Sized>(
    store: &S,
    defaults: &PoemOptions,
    phonetics: &dyn Phonetics,
    default_proper: bool,
    indent_unit: &str,
    options: &PoemOptions,
    rng: &mut R,
) -> Result<Vec<String>> {
    let merged = defaults.merged_with(options);
    let resolved = resolve(&merged, phonetics, default_proper)?;

    if resolved.template.content_count() > 0 && !store.exists() {
        return Err(StanzaError::NotEnoughData(
            "the corpus has not been built".to_string(),
        ));
    }

    let filters = Filters {
        acrostic: resolved.acrostic.as_deref(),
        regex: resolved.regex.as_ref(),
        proper: resolved.proper,
    };
    let selection = LineSelector::new(store)
        .with_filters(filters)
        .select(&resolved.template, rng)?;

    Ok(post_process(
        selection.lines,
        &resolved.template,
        indent_unit,
        merged.transform.as_ref(),
    ))
}
