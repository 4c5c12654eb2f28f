//! Derive a template from the shape of a sample text.

use crate::template::{LineSpec, Template};
use stanza_core::phonetics::Phonetics;
use std::collections::HashMap;

/// Lines kept verbatim: blank lines, bracketed labels such as `[Chorus 1]`,
/// and lines with no letters at all.
fn is_literal_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty()
        || (trimmed.starts_with('[') && trimmed.ends_with(']'))
        || !trimmed.chars().any(char::is_alphabetic)
}

/// One slot per sample line, in order.
///
/// Literal lines are copied as-is. Content lines become rhyme slots targeting
/// the syllable count of the source line. Byte-identical content lines share
/// a group and repeat one generated line; every other content line is a
/// group of its own.
pub fn template_from_text(text: &str, phonetics: &dyn Phonetics) -> Template {
    let lines: Vec<&str> = text.lines().collect();

    let mut occurrences: HashMap<&str, usize> = HashMap::new();
    for &line in lines.iter().filter(|l| !is_literal_line(l)) {
        *occurrences.entry(line).or_default() += 1;
    }

    let mut group_of: HashMap<&str, String> = HashMap::new();
    let slots = lines
        .iter()
        .enumerate()
        .map(|(n, &line)| {
            if is_literal_line(line) {
                return LineSpec::literal(line);
            }
            let group_id = group_of
                .entry(line)
                .or_insert_with(|| format!("L{}", n + 1))
                .clone();
            let mut slot = if occurrences[line] > 1 {
                LineSpec::refrain(group_id)
            } else {
                LineSpec::rhyme(group_id)
            };
            let syllables = phonetics.syllables(line);
            slot.syllable_target = (syllables > 0).then_some(syllables);
            slot
        })
        .collect();

    Template::new(slots)
}
