//! CLI binary for stanza: build rhyme corpora and generate poems from them.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use stanza_core::config::StanzaConfig;
use stanza_core::corpus::{CorpusStore, RhymeColumn};
use stanza_core::error::ErrorKind;
use stanza_core::storage::{self, FileCorpus};
use stanza_engine::{Poem, PoemOptions};
use stanza_form::{SyllableSpec, forms::POETIC_FORMS};
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "stanza", about = "Rhyme-scheme driven poem generator")]
struct Cli {
    /// Project root directory (defaults to current directory)
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Template options shared by `poem` and `template`.
#[derive(clap::Args, Debug, Default)]
struct ShapeArgs {
    /// Named poetic form (see `stanza forms`)
    #[arg(short, long)]
    form: Option<String>,

    /// Rhyme scheme, e.g. "abab cdcd" or "A1bA1"
    #[arg(short, long)]
    rhyme: Option<String>,

    /// Syllables per line: "10" or "[8,6,8,6]"
    #[arg(short, long)]
    syllable: Option<String>,

    /// One indent digit per line, e.g. "0101"
    #[arg(long)]
    indent: Option<String>,

    /// Use the shape of this text file as the template
    #[arg(long)]
    from_text: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a corpus from a text file, one line per corpus line
    Make {
        /// Corpus name
        corpus: String,

        /// Source text file; reads stdin when omitted or "-"
        source: Option<PathBuf>,

        /// Description stored with the corpus
        #[arg(long)]
        desc: Option<String>,

        /// Rebuild even if the corpus already exists
        #[arg(long)]
        force: bool,
    },

    /// List corpora and their descriptions
    List,

    /// Show or set a corpus description
    Desc {
        /// Corpus name
        corpus: String,

        /// New description; prints the current one when omitted
        text: Option<String>,
    },

    /// Print every corpus line that rhymes with a word
    Rhymes {
        /// Corpus name
        corpus: String,

        /// Word to rhyme with
        word: String,

        /// Print only one column: rhyme, final_word, syllables or line
        #[arg(short, long)]
        column: Option<String>,
    },

    /// List the built-in poetic forms
    Forms,

    /// Print the resolved template as JSON without touching a corpus
    Template {
        #[command(flatten)]
        shape: ShapeArgs,
    },

    /// Generate poems
    Poem {
        /// Corpus name
        corpus: String,

        #[command(flatten)]
        shape: ShapeArgs,

        /// Letters each line must start with, in order
        #[arg(short, long)]
        acrostic: Option<String>,

        /// Pattern every line must match
        #[arg(long)]
        regex: Option<String>,

        /// Allow a lowercase first line and an unterminated last line
        #[arg(long)]
        no_proper: bool,

        /// RNG seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Retries when the corpus runs out of matching lines
        #[arg(long)]
        attempts: Option<usize>,

        /// Number of poems to generate
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,
    },
}

fn get_project_root(cli: &Cli) -> Result<PathBuf> {
    match &cli.project {
        Some(p) => Ok(p.clone()),
        None => std::env::current_dir().context("failed to get current directory"),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let project_root = get_project_root(&cli)?;
    let config = StanzaConfig::load(&project_root)
        .with_context(|| format!("failed to load config in {}", project_root.display()))?;

    match cli.command {
        Commands::Make {
            corpus,
            source,
            desc,
            force,
        } => cmd_make(&config, &corpus, source.as_deref(), desc.as_deref(), force),
        Commands::List => cmd_list(&config),
        Commands::Desc { corpus, text } => cmd_desc(&config, &corpus, text.as_deref()),
        Commands::Rhymes {
            corpus,
            word,
            column,
        } => cmd_rhymes(&config, &corpus, &word, column.as_deref()),
        Commands::Forms => {
            cmd_forms();
            Ok(())
        }
        Commands::Template { shape } => cmd_template(&shape),
        Commands::Poem {
            corpus,
            shape,
            acrostic,
            regex,
            no_proper,
            seed,
            attempts,
            count,
        } => {
            let mut options = shape_options(&shape)?;
            options.acrostic = acrostic;
            options.regex = regex;
            if no_proper {
                options.proper = Some(false);
            }
            cmd_poem(&config, &corpus, &options, seed, attempts, count)
        }
    }
}

fn read_source(source: Option<&Path>) -> Result<String> {
    match source {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}

fn shape_options(shape: &ShapeArgs) -> Result<PoemOptions> {
    let mut options = PoemOptions::new();
    options.form.clone_from(&shape.form);
    options.rhyme.clone_from(&shape.rhyme);
    options.indent.clone_from(&shape.indent);
    if let Some(s) = &shape.syllable {
        options.syllable = Some(s.parse::<SyllableSpec>()?);
    }
    if let Some(path) = &shape.from_text {
        options.form_from_text = Some(read_source(Some(path))?);
    }
    Ok(options)
}

fn open_existing(config: &StanzaConfig, corpus: &str) -> Result<FileCorpus> {
    if !storage::corpus_exists(&config.corpus.dir, corpus) {
        anyhow::bail!("No corpus named {:?}. Run `stanza make {}` first.", corpus, corpus);
    }
    Ok(FileCorpus::open(&config.corpus.dir, corpus)?)
}

fn cmd_make(
    config: &StanzaConfig,
    corpus: &str,
    source: Option<&Path>,
    desc: Option<&str>,
    force: bool,
) -> Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};

    if storage::corpus_exists(&config.corpus.dir, corpus) && !force {
        anyhow::bail!("Corpus {:?} already exists. Use --force to rebuild.", corpus);
    }

    let text = read_source(source)?;
    let store = FileCorpus::open(&config.corpus.dir, corpus)?;
    let mut poem = Poem::new(store);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message(format!("Analysing {} lines...", text.lines().count()));
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    let report = poem.make_corpus(text.lines());
    spinner.finish_and_clear();
    let report = report?;

    if let Some(desc) = desc {
        poem.store_mut().set_description(desc)?;
    }

    let store = poem.into_store();
    eprintln!(
        "  Built corpus {:?}: {} lines ({} skipped) -> {}",
        corpus,
        report.rows.len(),
        report.skipped,
        store.path().display()
    );
    store.close();
    Ok(())
}

fn cmd_list(config: &StanzaConfig) -> Result<()> {
    let corpora = storage::list_with_descriptions(&config.corpus.dir)?;
    if corpora.is_empty() {
        eprintln!("No corpora in {}.", config.corpus.dir.display());
        return Ok(());
    }
    for (name, desc) in corpora {
        if desc.is_empty() {
            println!("{}", name);
        } else {
            println!("{}\t{}", name, desc);
        }
    }
    Ok(())
}

fn cmd_desc(config: &StanzaConfig, corpus: &str, text: Option<&str>) -> Result<()> {
    let mut store = open_existing(config, corpus)?;
    match text {
        Some(text) => {
            store.set_description(text)?;
            eprintln!("  Updated description of {:?}", corpus);
        }
        None => println!("{}", store.description()),
    }
    Ok(())
}

fn cmd_rhymes(config: &StanzaConfig, corpus: &str, word: &str, column: Option<&str>) -> Result<()> {
    let column = column.map(str::parse::<RhymeColumn>).transpose()?;
    let store = open_existing(config, corpus)?;
    let lines = store.rhymes_for_word(word, &stanza_core::EnglishHeuristic)?;
    if lines.is_empty() {
        eprintln!("No lines in {:?} rhyme with {:?}.", corpus, word);
    }
    for line in &lines {
        match column {
            Some(column) => println!("{}", column.project(line)),
            None => println!(
                "{}\t{}\t{}\t{}",
                line.rhyme_key, line.final_word, line.syllable_count, line.text
            ),
        }
    }
    Ok(())
}

fn cmd_forms() {
    let width = POETIC_FORMS.iter().map(|f| f.name.len()).max().unwrap_or(0);
    for form in POETIC_FORMS {
        let mut line = format!("{:width$}  {}", form.name, form.rhyme, width = width);
        if let Some(syllable) = form.syllable {
            line.push_str(&format!("  syllable={}", syllable));
        }
        println!("{}", line);
    }
}

fn cmd_template(shape: &ShapeArgs) -> Result<()> {
    let options = shape_options(shape)?;
    let resolved = stanza_engine::resolve::resolve(&options, &stanza_core::EnglishHeuristic, true)?;
    eprintln!("  Template from {}", resolved.source);
    println!("{}", serde_json::to_string_pretty(&resolved.template)?);
    Ok(())
}

fn cmd_poem(
    config: &StanzaConfig,
    corpus: &str,
    options: &PoemOptions,
    seed: Option<u64>,
    attempts: Option<usize>,
    count: usize,
) -> Result<()> {
    let store = open_existing(config, corpus)?;
    let mut poem = Poem::new(store).with_config(&config.generation);
    if let Some(seed) = seed {
        poem = poem.with_seed(seed);
    }
    let attempts = attempts.unwrap_or(config.generation.attempts).max(1);

    for n in 0..count {
        if n > 0 {
            println!();
        }
        for line in generate_with_retries(&mut poem, options, attempts)? {
            println!("{}", line);
        }
    }
    poem.into_store().close();
    Ok(())
}

/// Re-run a generation that ran out of matching lines, up to `attempts`
/// times in total. Every other error is returned immediately.
fn generate_with_retries<S: CorpusStore>(
    poem: &mut Poem<S>,
    options: &PoemOptions,
    attempts: usize,
) -> Result<Vec<String>> {
    let mut attempt = 1;
    loop {
        match poem.generate(options) {
            Err(e) if e.kind() == ErrorKind::NotEnoughData && attempt < attempts => {
                tracing::debug!("attempt {}/{} failed: {}", attempt, attempts, e);
                attempt += 1;
            }
            result => return Ok(result?),
        }
    }
}
