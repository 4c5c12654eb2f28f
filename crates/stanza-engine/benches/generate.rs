use criterion::{Criterion, criterion_group, criterion_main};
use stanza_core::corpus::{CorpusLine, MemoryCorpus};
use stanza_engine::{Poem, PoemOptions};
use std::hint::black_box;

/// A corpus with `keys` rhyme groups of `words` final words, three lines each.
fn build_corpus(keys: usize, words: usize) -> MemoryCorpus {
    let mut rows = Vec::with_capacity(keys * words * 3);
    for k in 0..keys {
        let key = format!("r{k}");
        for w in 0..words {
            let word = format!("w{k}x{w}");
            for variant in 0..3u32 {
                rows.push(CorpusLine::new(
                    format!("Line {variant} ends in {word}."),
                    6 + variant * 2,
                    word.clone(),
                    key.clone(),
                ));
            }
        }
    }
    MemoryCorpus::from_lines(rows)
}

fn bench_forms(c: &mut Criterion) {
    let mut poem = Poem::new(build_corpus(400, 12)).with_seed(1);

    c.bench_function("sonnet", |b| {
        let options = PoemOptions::new().form("sonnet");
        b.iter(|| black_box(poem.generate(&options).unwrap()));
    });

    c.bench_function("villanelle_with_syllables", |b| {
        let options = PoemOptions::new()
            .form("villanelle")
            .syllable(stanza_form::SyllableSpec::Uniform(8));
        b.iter(|| black_box(poem.generate(&options).unwrap()));
    });

    c.bench_function("long_refrain_scheme", |b| {
        let options = PoemOptions::new().rhyme("ABCDEFGH".repeat(50));
        b.iter(|| black_box(poem.generate(&options).unwrap()));
    });
}

criterion_group!(benches, bench_forms);
criterion_main!(benches);
