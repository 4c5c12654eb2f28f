//! Constraint-satisfying line selection.
//!
//! Slots are gathered into rhyme sets: every group whose letter names the
//! same rhyme, so the refrain `A` and the lowercase `a` lines share one
//! set. Sets are filled one at a time in first-occurrence order. For each
//! set the corpus is asked for rhyme keys with enough distinct final words,
//! the keys are shuffled, and the first one whose pool can cover every group
//! of the set wins. A set that no key can cover fails the whole call; there
//! is no backtracking into earlier sets.
//!
//! Within one poem:
//! - distinct rhyme sets never share a rhyme key,
//! - every line of a rhyme set has its own final word, and a refrain counts
//!   as one line however often it repeats,
//! - a corpus line is used by at most one group.

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use regex::Regex;
use stanza_core::corpus::{CorpusLine, CorpusStore, SyllableRange};
use stanza_core::error::{Result, StanzaError};
use stanza_form::{RhymeSet, Template};
use std::collections::{BTreeMap, HashSet};

/// Filters that apply across the whole poem.
#[derive(Debug, Clone, Copy, Default)]
pub struct Filters<'a> {
    /// One letter per non-literal slot.
    pub acrostic: Option<&'a str>,
    pub regex: Option<&'a Regex>,
    /// First line capitalised, last line ends a sentence.
    pub proper: bool,
}

/// Everything a single slot demands of its line.
#[derive(Debug, Clone, Default)]
struct SlotFilter {
    syllables: Option<u32>,
    letter: Option<char>,
    capitalised: bool,
    sentence_end: bool,
}

impl SlotFilter {
    fn accepts(&self, line: &CorpusLine, regex: Option<&Regex>) -> bool {
        if let Some(target) = self.syllables
            && line.syllable_count != target
        {
            return false;
        }
        let first = line.text.chars().next();
        if let Some(letter) = self.letter {
            let Some(first) = first else {
                return false;
            };
            if !first.to_lowercase().eq(letter.to_lowercase()) {
                return false;
            }
        }
        if self.capitalised && !first.is_some_and(char::is_uppercase) {
            return false;
        }
        if self.sentence_end && !line.text.trim_end().ends_with(['.', '!', '?']) {
            return false;
        }
        regex.is_none_or(|re| re.is_match(&line.text))
    }
}

/// Bookkeeping for one generation call. Never shared between calls.
#[derive(Debug, Clone, Default)]
pub struct GenerationSession {
    used_lines: HashSet<String>,
    used_rhymes: HashSet<String>,
    rhymes: BTreeMap<String, String>,
}

impl GenerationSession {
    /// The rhyme key chosen for `group_id`.
    pub fn rhyme_for(&self, group_id: &str) -> Option<&str> {
        self.rhymes.get(group_id).map(String::as_str)
    }

    /// Distinct corpus lines consumed so far.
    pub fn used_line_count(&self) -> usize {
        self.used_lines.len()
    }

    fn record(&mut self, set: &RhymeSet, rhyme_key: String, picked: &[(usize, String)]) {
        self.used_lines
            .extend(picked.iter().map(|(_, text)| text.clone()));
        for group in &set.groups {
            self.rhymes
                .insert(group.group_id.clone(), rhyme_key.clone());
        }
        self.used_rhymes.insert(rhyme_key);
    }
}

/// Slots that must receive one line together: every slot of a refrain
/// group, or a single slot of any other group.
struct Unit<'f> {
    slots: Vec<usize>,
    filters: Vec<&'f SlotFilter>,
}

impl Unit<'_> {
    fn accepts(&self, line: &CorpusLine, regex: Option<&Regex>) -> bool {
        self.filters.iter().all(|f| f.accepts(line, regex))
    }
}

fn units_of<'f>(set: &RhymeSet, filters: &'f [SlotFilter]) -> Vec<Unit<'f>> {
    let mut units = Vec::new();
    for group in &set.groups {
        if group.forced_repeat {
            units.push(Unit {
                slots: group.slots.clone(),
                filters: group.slots.iter().map(|&i| &filters[i]).collect(),
            });
        } else {
            units.extend(group.slots.iter().map(|&i| Unit {
                slots: vec![i],
                filters: vec![&filters[i]],
            }));
        }
    }
    units
}

/// A filled template.
#[derive(Debug, Clone)]
pub struct Selection {
    /// One entry per template slot, literals included.
    pub lines: Vec<String>,
    pub session: GenerationSession,
}

/// Fills templates from a corpus store.
pub struct LineSelector<'a, S: CorpusStore + ?Sized> {
    store: &'a S,
    filters: Filters<'a>,
}

impl<'a, S: CorpusStore + ?Sized> LineSelector<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            filters: Filters::default(),
        }
    }

    #[must_use]
    pub fn with_filters(mut self, filters: Filters<'a>) -> Self {
        self.filters = filters;
        self
    }

    /// Resolve every slot of `template`, or fail without a partial result.
    pub fn select<R: Rng + ?Sized>(&self, template: &Template, rng: &mut R) -> Result<Selection> {
        if template.is_empty() {
            return Err(StanzaError::MissingFormOrRhyme);
        }
        let filters = self.slot_filters(template)?;
        let mut session = GenerationSession::default();
        let mut lines: Vec<Option<String>> = template
            .slots
            .iter()
            .map(|s| s.literal_text.clone())
            .collect();

        for set in template.rhyme_sets() {
            for (slot, text) in self.fill_rhyme(&set, &filters, &mut session, rng)? {
                lines[slot] = Some(text);
            }
        }

        let lines = lines
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| StanzaError::NotEnoughData("a slot was left unfilled".into()))?;
        Ok(Selection { lines, session })
    }

    fn slot_filters(&self, template: &Template) -> Result<Vec<SlotFilter>> {
        let content = template.content_indices();
        let mut filters: Vec<SlotFilter> = template
            .slots
            .iter()
            .map(|s| SlotFilter {
                syllables: s.syllable_target,
                ..SlotFilter::default()
            })
            .collect();

        if let Some(acrostic) = self.filters.acrostic {
            let letters: Vec<char> = acrostic.chars().collect();
            if letters.len() != content.len() {
                return Err(StanzaError::NotEnoughData(format!(
                    "acrostic {:?} has {} letters for {} lines",
                    acrostic,
                    letters.len(),
                    content.len()
                )));
            }
            for (&slot, letter) in content.iter().zip(letters) {
                filters[slot].letter = Some(letter);
            }
        }

        if self.filters.proper {
            if let Some(&first) = content.first() {
                filters[first].capitalised = true;
            }
            if let Some(&last) = content.last() {
                filters[last].sentence_end = true;
            }
        }
        Ok(filters)
    }

    fn fill_rhyme<R: Rng + ?Sized>(
        &self,
        set: &RhymeSet,
        filters: &[SlotFilter],
        session: &mut GenerationSession,
        rng: &mut R,
    ) -> Result<Vec<(usize, String)>> {
        let units = units_of(set, filters);
        let required = set.required_distinct();
        let all_filters: Vec<&SlotFilter> = units
            .iter()
            .flat_map(|u| u.filters.iter().copied())
            .collect();
        let range = syllable_range(&all_filters);

        let mut keys: Vec<String> = self
            .store
            .rhyme_keys_with_count(required, range)?
            .into_iter()
            .map(|rc| rc.rhyme_key)
            .filter(|key| !session.used_rhymes.contains(key))
            .collect();
        keys.shuffle(rng);
        let considered = keys.len();

        for key in keys {
            let pool: Vec<CorpusLine> = self
                .store
                .lines_for_rhyme(&key, range)?
                .into_iter()
                .filter(|l| !session.used_lines.contains(&l.text))
                .collect();
            if let Some(picked) = self.match_units(&units, &pool, rng) {
                tracing::debug!(
                    "rhyme {:?} took key {:?} out of {} candidates",
                    set.rhyme_id,
                    key,
                    considered
                );
                session.record(set, key, &picked);
                return Ok(picked);
            }
        }

        let groups: Vec<&str> = set.groups.iter().map(|g| g.group_id.as_str()).collect();
        Err(StanzaError::NotEnoughData(format!(
            "no rhyme can supply {} distinct line(s) for rhyme {:?} (groups {:?}, {} candidate rhymes)",
            required, set.rhyme_id, groups, considered
        )))
    }

    /// One line per unit, each with a different final word.
    ///
    /// Units may carry different filters (acrostic letters, per-slot
    /// syllables, every slot of a refrain at once), so final words are
    /// assigned by bipartite matching over a shuffled word order.
    fn match_units<R: Rng + ?Sized>(
        &self,
        units: &[Unit<'_>],
        pool: &[CorpusLine],
        rng: &mut R,
    ) -> Option<Vec<(usize, String)>> {
        let mut by_word: BTreeMap<&str, Vec<&CorpusLine>> = BTreeMap::new();
        for line in pool {
            by_word.entry(line.final_word.as_str()).or_default().push(line);
        }
        if by_word.len() < units.len() {
            return None;
        }
        let mut words: Vec<Vec<&CorpusLine>> = by_word.into_values().collect();
        words.shuffle(rng);

        let regex = self.filters.regex;
        let options: Vec<Vec<usize>> = units
            .iter()
            .map(|u| {
                (0..words.len())
                    .filter(|&w| words[w].iter().any(|l| u.accepts(l, regex)))
                    .collect()
            })
            .collect();

        let mut owner: Vec<Option<usize>> = vec![None; words.len()];
        for unit in 0..units.len() {
            let mut seen = vec![false; words.len()];
            if !augment(unit, &options, &mut owner, &mut seen) {
                return None;
            }
        }

        let mut picked = Vec::new();
        for (w, &owned_by) in owner.iter().enumerate() {
            let Some(unit) = owned_by.map(|u| &units[u]) else {
                continue;
            };
            let fitting: Vec<&&CorpusLine> = words[w]
                .iter()
                .filter(|l| unit.accepts(l, regex))
                .collect();
            let line = fitting.choose(rng)?;
            picked.extend(unit.slots.iter().map(|&slot| (slot, line.text.clone())));
        }
        picked.sort_by_key(|(slot, _)| *slot);
        Some(picked)
    }
}

/// Kuhn's augmenting path step: try to give `unit` a word, displacing
/// earlier owners when they can move elsewhere.
fn augment(
    unit: usize,
    options: &[Vec<usize>],
    owner: &mut [Option<usize>],
    seen: &mut [bool],
) -> bool {
    for &w in &options[unit] {
        if seen[w] {
            continue;
        }
        seen[w] = true;
        let current = owner[w];
        if current.is_none_or(|other| augment(other, options, owner, seen)) {
            owner[w] = Some(unit);
            return true;
        }
    }
    false
}

/// Corpus-side prefilter covering every slot's syllable target. Unbounded as
/// soon as one slot has no target.
fn syllable_range(filters: &[&SlotFilter]) -> Option<SyllableRange> {
    let targets: Option<Vec<u32>> = filters.iter().map(|f| f.syllables).collect();
    let targets = targets?;
    let min = targets.iter().copied().min()?;
    let max = targets.iter().copied().max()?;
    Some(SyllableRange::new(min, max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use stanza_core::corpus::MemoryCorpus;
    use stanza_core::error::ErrorKind;
    use stanza_form::{LineSpec, parse_scheme};

    fn row(text: &str, syllables: u32, word: &str, key: &str) -> CorpusLine {
        CorpusLine::new(text, syllables, word, key)
    }

    fn corpus() -> MemoryCorpus {
        MemoryCorpus::from_lines(vec![
            row("There once was a man.", 5, "man", "an"),
            row("He had a plan.", 4, "plan", "an"),
            row("she baked a flan", 4, "flan", "an"),
            row("I caught a fish.", 4, "fish", "ish"),
            row("make a wish", 3, "wish", "ish"),
        ])
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_literals_are_copied() {
        let t = Template::new(vec![LineSpec::literal("[Intro]"), LineSpec::rhyme("a")]);
        let s = LineSelector::new(&corpus()).select(&t, &mut rng()).unwrap();
        assert_eq!(s.lines.len(), 2);
        assert_eq!(s.lines[0], "[Intro]");
    }

    #[test]
    fn test_groups_get_distinct_rhymes() {
        let t = parse_scheme("abab").unwrap();
        let s = LineSelector::new(&corpus()).select(&t, &mut rng()).unwrap();
        let a = s.session.rhyme_for("a").unwrap();
        let b = s.session.rhyme_for("b").unwrap();
        assert_ne!(a, b);
        assert_ne!(s.lines[0], s.lines[2]);
        assert_ne!(s.lines[1], s.lines[3]);
        assert_eq!(s.session.used_line_count(), 4);
    }

    #[test]
    fn test_third_group_exhausts_two_rhymes() {
        let t = parse_scheme("abc").unwrap();
        let err = LineSelector::new(&corpus()).select(&t, &mut rng()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotEnoughData);
    }

    #[test]
    fn test_proper_filters_first_and_last_slot() {
        let t = parse_scheme("aa").unwrap();
        let filters = Filters {
            proper: true,
            ..Filters::default()
        };
        for seed in 0..20 {
            let s = LineSelector::new(&corpus())
                .with_filters(filters)
                .select(&t, &mut StdRng::seed_from_u64(seed))
                .unwrap();
            assert!(s.lines[0].starts_with(char::is_uppercase));
            assert!(s.lines[1].ends_with('.'));
        }
    }

    #[test]
    fn test_refrain_line_must_fit_every_slot() {
        let mut t = parse_scheme("AA").unwrap();
        t.slots[0].syllable_target = Some(4);
        t.slots[1].syllable_target = Some(5);
        let err = LineSelector::new(&corpus()).select(&t, &mut rng()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotEnoughData);
    }

    #[test]
    fn test_matching_honours_per_slot_syllables() {
        let mut t = parse_scheme("aa").unwrap();
        t.slots[0].syllable_target = Some(4);
        t.slots[1].syllable_target = Some(5);
        for seed in 0..20 {
            let s = LineSelector::new(&corpus())
                .select(&t, &mut StdRng::seed_from_u64(seed))
                .unwrap();
            assert_eq!(s.lines[1], "There once was a man.");
            assert!(s.lines[0] == "He had a plan." || s.lines[0] == "she baked a flan");
        }
    }

    #[test]
    fn test_refrain_rhymes_with_its_lowercase_letter() {
        let t = parse_scheme("aAa").unwrap();
        for seed in 0..20 {
            let s = LineSelector::new(&corpus())
                .select(&t, &mut StdRng::seed_from_u64(seed))
                .unwrap();
            // only "an" has three final words
            assert_eq!(s.session.rhyme_for("a"), Some("an"));
            assert_eq!(s.session.rhyme_for("A"), Some("an"));
            assert_eq!(s.session.used_line_count(), 3);
        }

        let t = parse_scheme("AaA").unwrap();
        for seed in 0..20 {
            let s = LineSelector::new(&corpus())
                .select(&t, &mut StdRng::seed_from_u64(seed))
                .unwrap();
            assert_eq!(s.lines[0], s.lines[2]);
            assert_ne!(s.lines[0], s.lines[1]);
            assert_eq!(s.session.rhyme_for("a"), s.session.rhyme_for("A"));
        }
    }

    #[test]
    fn test_refrain_and_lowercase_lines_are_matched_together() {
        let mut t = parse_scheme("aA").unwrap();
        t.slots[1].syllable_target = Some(5);
        for seed in 0..20 {
            let s = LineSelector::new(&corpus())
                .select(&t, &mut StdRng::seed_from_u64(seed))
                .unwrap();
            assert_eq!(s.lines[1], "There once was a man.");
            assert!(s.lines[0] == "He had a plan." || s.lines[0] == "she baked a flan");
        }
    }

    #[test]
    fn test_rhyme_set_needs_a_word_per_line() {
        // "ish" has two words, "an" three; a refrain plus three lines needs four
        let t = parse_scheme("aaAa").unwrap();
        let err = LineSelector::new(&corpus()).select(&t, &mut rng()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotEnoughData);
    }

    #[test]
    fn test_augment_reassigns_earlier_slots() {
        // slot 0 can take words 0 or 1, slot 1 only word 0
        let options = vec![vec![0, 1], vec![0]];
        let mut owner = vec![None; 2];
        for slot in 0..2 {
            let mut seen = vec![false; 2];
            assert!(augment(slot, &options, &mut owner, &mut seen));
        }
        assert_eq!(owner, vec![Some(1), Some(0)]);
    }

    #[test]
    fn test_syllable_range_needs_every_target() {
        let a = SlotFilter {
            syllables: Some(8),
            ..SlotFilter::default()
        };
        let b = SlotFilter {
            syllables: Some(6),
            ..SlotFilter::default()
        };
        assert_eq!(syllable_range(&[&a, &b]), Some(SyllableRange::new(6, 8)));
        assert_eq!(syllable_range(&[&a, &SlotFilter::default()]), None);
    }

    #[test]
    fn test_acrostic_letter_is_case_insensitive() {
        let f = SlotFilter {
            letter: Some('T'),
            ..SlotFilter::default()
        };
        assert!(f.accepts(&row("there", 1, "there", "ere"), None));
        assert!(!f.accepts(&row("where", 1, "where", "ere"), None));
        assert!(!f.accepts(&row("", 0, "", ""), None));
    }
}
