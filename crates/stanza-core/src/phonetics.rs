//! Syllable counting and rhyme-key extraction used when building corpora.
//!
//! The selection engine never calls into this module; it only sees the
//! `syllable_count` and `rhyme_key` already stored on each corpus line.

/// Phonetic analysis of raw text.
pub trait Phonetics: Send + Sync {
    /// Syllables in a whole line of text.
    fn syllables(&self, text: &str) -> u32;

    /// The last word of a line, lowercased, if it has one.
    fn final_word(&self, text: &str) -> Option<String>;

    /// A key shared by words that rhyme with `word`.
    fn rhyme_key(&self, word: &str) -> Option<String>;
}

/// Spelling-based English heuristics.
///
/// Good enough to group common rhymes (`sea`/`tree`, `night`/`bite`,
/// `hate`/`wait`) without a pronouncing dictionary. Irregular spellings
/// land in their own groups.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishHeuristic;

impl Phonetics for EnglishHeuristic {
    fn syllables(&self, text: &str) -> u32 {
        words(text).iter().map(|w| word_syllables(w)).sum()
    }

    fn final_word(&self, text: &str) -> Option<String> {
        words(text).pop()
    }

    fn rhyme_key(&self, word: &str) -> Option<String> {
        let letters = letters(word);
        if letters.is_empty() {
            return None;
        }
        Some(rime(&letters))
    }
}

/// Lowercased words, split on anything that is neither a letter nor an apostrophe.
fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphabetic() || c == '\'' || c == '’'))
        .map(|w| w.trim_matches(|c| c == '\'' || c == '’').to_lowercase())
        .filter(|w| w.chars().any(char::is_alphabetic))
        .collect()
}

fn letters(word: &str) -> Vec<char> {
    word.chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect()
}

/// `y` is a vowel everywhere except word-initially.
fn is_vowel(chars: &[char], i: usize) -> bool {
    match chars[i] {
        'a' | 'e' | 'i' | 'o' | 'u' => true,
        'y' => i > 0,
        _ => false,
    }
}

fn vowel_groups(chars: &[char]) -> usize {
    (0..chars.len())
        .filter(|&i| is_vowel(chars, i) && (i == 0 || !is_vowel(chars, i - 1)))
        .count()
}

/// Ends in consonant + `le`, as in `table`.
fn ends_with_syllabic_le(chars: &[char]) -> bool {
    let n = chars.len();
    n >= 3 && chars[n - 2..] == ['l', 'e'] && !is_vowel(chars, n - 3)
}

fn word_syllables(word: &str) -> u32 {
    let chars = letters(word);
    let n = chars.len();
    let mut count = vowel_groups(&chars);
    if count > 1 && n >= 2 && chars[n - 1] == 'e' && !is_vowel(&chars, n - 2) {
        if !ends_with_syllabic_le(&chars) {
            count -= 1;
        }
    } else if count > 1 && n >= 3 && chars[n - 2..] == ['e', 'd'] && !matches!(chars[n - 3], 't' | 'd')
    {
        count -= 1;
    } else if count > 1
        && n >= 4
        && chars[n - 2..] == ['e', 's']
        && !matches!(chars[n - 3], 's' | 'x' | 'z' | 'c' | 'g' | 'h')
        && !is_vowel(&chars, n - 3)
        && is_vowel(&chars, n - 4)
    {
        count -= 1;
    }
    count.max(1) as u32
}

/// Normalised last nucleus plus coda of a lowercase word.
fn rime(word: &[char]) -> String {
    if vowel_groups(word) == 0 {
        return word.iter().collect();
    }
    if ends_with_syllabic_le(word) && vowel_groups(&word[..word.len() - 2]) > 0 {
        return rime(&word[..word.len() - 2]) + "le";
    }

    let groups = vowel_groups(word);
    let mut chars = word.to_vec();
    let n = chars.len();
    let mut long = false;
    if n >= 3 && chars[n - 1] == 'e' && !is_vowel(&chars, n - 2) && groups >= 2 {
        long = is_vowel(&chars, n - 3);
        chars.pop();
    }

    let mut i = chars.len();
    while i > 0 && !is_vowel(&chars, i - 1) {
        i -= 1;
    }
    let coda_start = i;
    while i > 0 && is_vowel(&chars, i - 1) {
        i -= 1;
    }
    let mut nucleus: String = chars[i..coda_start].iter().collect();
    let mut coda: String = chars[coda_start..].iter().collect();

    // igh / eigh
    if coda.starts_with("gh") {
        let long_vowel = match nucleus.as_str() {
            "i" => Some("y"),
            "ei" => Some("ay"),
            _ => None,
        };
        if let Some(v) = long_vowel {
            nucleus = v.to_string();
            coda = coda[2..].to_string();
        }
    }

    let open = coda.is_empty();
    let nucleus = if long {
        match nucleus.as_str() {
            "a" => "ay",
            "e" | "ee" => "ee",
            "i" | "y" => "y",
            "o" => "oh",
            "u" => "oo",
            other => other,
        }
        .to_string()
    } else {
        match nucleus.as_str() {
            "ee" | "ea" => "ee",
            "e" if open && groups == 1 => "ee",
            "ai" | "ay" | "ei" | "ey" => "ay",
            "ie" if open => "y",
            "ie" => "ee",
            "y" if open => {
                if groups == 1 {
                    "y"
                } else {
                    "ee"
                }
            }
            "o" | "oe" if open => "oh",
            "oa" => "oh",
            "ew" | "ue" | "oo" | "ou" | "u" if open => "oo",
            other => other,
        }
        .to_string()
    };

    nucleus + &normalise_coda(&coda)
}

/// Collapse doubled consonants and `ck`.
fn normalise_coda(coda: &str) -> String {
    let mut out = String::with_capacity(coda.len());
    for c in coda.replace("ck", "k").chars() {
        if !out.ends_with(c) {
            out.push(c);
        }
    }
    out
}
