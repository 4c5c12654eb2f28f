//! Named poetic forms.

use crate::template::SyllableSpec;

/// A preset: rhyme scheme plus optional syllable and indent strings, in the
/// same encodings callers pass as options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormSpec {
    pub name: &'static str,
    pub rhyme: &'static str,
    pub syllable: Option<&'static str>,
    pub indent: Option<&'static str>,
}

impl FormSpec {
    /// The preset's syllable constraint, if it has one.
    pub fn syllable_spec(&self) -> Option<SyllableSpec> {
        self.syllable.and_then(|s| s.parse().ok())
    }
}

/// Every built-in form, sorted by name.
pub const POETIC_FORMS: &[FormSpec] = &[
    FormSpec {
        name: "ballad",
        rhyme: "abcb",
        syllable: Some("[8,6,8,6]"),
        indent: Some("0101"),
    },
    FormSpec {
        name: "ballade",
        rhyme: "ababbcbC ababbcbC ababbcbC bcbC",
        syllable: None,
        indent: None,
    },
    FormSpec {
        name: "common",
        rhyme: "abcb",
        syllable: Some("[8,6,8,6]"),
        indent: None,
    },
    FormSpec {
        name: "default",
        rhyme: "a",
        syllable: None,
        indent: Some("0"),
    },
    FormSpec {
        name: "double_dactyl",
        rhyme: "abcd efgd",
        syllable: Some("[6,6,6,4,6,6,6,4]"),
        indent: None,
    },
    FormSpec {
        name: "haiku",
        rhyme: "abc",
        syllable: Some("[5,7,5]"),
        indent: None,
    },
    FormSpec {
        name: "limerick",
        rhyme: "aabba",
        syllable: Some("[8,8,5,5,8]"),
        indent: Some("00110"),
    },
    FormSpec {
        name: "rondeau",
        rhyme: "aabba aabR aabbaR",
        syllable: Some("[8,8,8,8,8,8,8,8,4,8,8,8,8,8,4]"),
        indent: None,
    },
    FormSpec {
        name: "sonnet",
        rhyme: "ababcdcdefefgg",
        syllable: None,
        indent: None,
    },
    FormSpec {
        name: "villanelle",
        rhyme: "AbC abA abC abA abC abAC",
        syllable: None,
        indent: Some("010 001 001 001 001 0011"),
    },
];

/// Fold a caller-supplied form name: case-insensitive, `-` and spaces as `_`.
fn normalise(name: &str) -> String {
    name.trim()
        .trim_start_matches(':')
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

/// Find a form by name. An unknown name is not an error at this level.
pub fn lookup_form(name: &str) -> Option<&'static FormSpec> {
    let key = normalise(name);
    POETIC_FORMS.iter().find(|f| f.name == key)
}

/// Names of every built-in form.
pub fn form_names() -> impl Iterator<Item = &'static str> {
    POETIC_FORMS.iter().map(|f| f.name)
}
