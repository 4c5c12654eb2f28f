//! Template data model: slots, groups, and the syllable/indent overlays.

use serde::{Deserialize, Serialize};
use stanza_core::error::{Result, StanzaError};
use std::str::FromStr;

/// One slot of a poem.
///
/// A slot with `literal_text` is copied verbatim and takes no part in rhyme,
/// syllable or uniqueness accounting. Every other slot is resolved from the
/// corpus according to its group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSpec {
    pub group_id: String,
    /// Slots with the same rhyme id end on one rhyme key. For scheme letters
    /// this is the lowercase letter, so `A`, `A1` and `a` rhyme together.
    #[serde(default)]
    pub rhyme_id: String,
    /// Every slot of this group emits the same text.
    pub forced_repeat: bool,
    pub syllable_target: Option<u32>,
    /// The target came from a digit suffix in the scheme string and survives
    /// a uniform `syllable` override.
    #[serde(default)]
    pub syllable_pinned: bool,
    #[serde(default)]
    pub indent_level: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal_text: Option<String>,
}

impl LineSpec {
    /// A slot that shares a rhyme with its group but not its text.
    pub fn rhyme(group_id: impl Into<String>) -> Self {
        let group_id = group_id.into();
        Self {
            rhyme_id: group_id.to_lowercase(),
            group_id,
            forced_repeat: false,
            syllable_target: None,
            syllable_pinned: false,
            indent_level: 0,
            literal_text: None,
        }
    }

    /// A slot whose group repeats one line verbatim.
    pub fn refrain(group_id: impl Into<String>) -> Self {
        Self {
            forced_repeat: true,
            ..Self::rhyme(group_id)
        }
    }

    /// A verbatim slot.
    pub fn literal(text: impl Into<String>) -> Self {
        Self {
            literal_text: Some(text.into()),
            ..Self::rhyme(String::new())
        }
    }

    pub fn with_syllables(mut self, target: u32) -> Self {
        self.syllable_target = Some(target);
        self
    }

    pub fn is_literal(&self) -> bool {
        self.literal_text.is_some()
    }

    /// The rhyme this slot belongs to. Falls back to the group for
    /// templates deserialized without a rhyme id.
    pub fn rhyme_identity(&self) -> &str {
        if self.rhyme_id.is_empty() {
            &self.group_id
        } else {
            &self.rhyme_id
        }
    }
}

/// The slots sharing one `group_id`, in template order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotGroup {
    pub group_id: String,
    pub rhyme_id: String,
    pub forced_repeat: bool,
    /// Indices into [`Template::slots`].
    pub slots: Vec<usize>,
}

impl SlotGroup {
    /// Distinct corpus lines this group consumes.
    pub fn required_distinct(&self) -> usize {
        if self.forced_repeat { 1 } else { self.slots.len() }
    }
}

/// The groups sharing one rhyme id. They take one rhyme key between them
/// and never repeat a final word across groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RhymeSet {
    pub rhyme_id: String,
    pub groups: Vec<SlotGroup>,
}

impl RhymeSet {
    /// Distinct final words the whole set consumes.
    pub fn required_distinct(&self) -> usize {
        self.groups.iter().map(SlotGroup::required_distinct).sum()
    }
}

/// An ordered structural contract for one poem.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub slots: Vec<LineSpec>,
}

impl Template {
    pub fn new(slots: Vec<LineSpec>) -> Self {
        Self { slots }
    }

    /// Declared slot count; the number of lines a generated poem has.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots resolved from the corpus.
    pub fn content_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_literal()).count()
    }

    /// Indices of non-literal slots, in order.
    pub fn content_indices(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.is_literal())
            .map(|(i, _)| i)
            .collect()
    }

    /// Non-literal slots grouped by `group_id`, in first-occurrence order.
    pub fn groups(&self) -> Vec<SlotGroup> {
        let mut groups: Vec<SlotGroup> = Vec::new();
        for (i, slot) in self.slots.iter().enumerate() {
            if slot.is_literal() {
                continue;
            }
            match groups.iter_mut().find(|g| g.group_id == slot.group_id) {
                Some(group) => group.slots.push(i),
                None => groups.push(SlotGroup {
                    group_id: slot.group_id.clone(),
                    rhyme_id: slot.rhyme_identity().to_string(),
                    forced_repeat: slot.forced_repeat,
                    slots: vec![i],
                }),
            }
        }
        groups
    }

    /// Groups gathered by rhyme id, in first-occurrence order.
    pub fn rhyme_sets(&self) -> Vec<RhymeSet> {
        let mut sets: Vec<RhymeSet> = Vec::new();
        for group in self.groups() {
            match sets.iter_mut().find(|s| s.rhyme_id == group.rhyme_id) {
                Some(set) => set.groups.push(group),
                None => sets.push(RhymeSet {
                    rhyme_id: group.rhyme_id.clone(),
                    groups: vec![group],
                }),
            }
        }
        sets
    }

    /// Overlay a syllable spec on the non-literal slots.
    ///
    /// A uniform value replaces every target except those pinned by the
    /// scheme string. A per-slot list assigns its entries to non-literal
    /// slots in order; slots past the end of the list keep their target.
    /// `0` means "no constraint" in both forms.
    pub fn apply_syllables(&mut self, spec: &SyllableSpec) {
        let content = self.slots.iter_mut().filter(|s| !s.is_literal());
        match spec {
            SyllableSpec::Uniform(n) => {
                for slot in content.filter(|s| !s.syllable_pinned) {
                    slot.syllable_target = (*n > 0).then_some(*n);
                }
            }
            SyllableSpec::PerSlot(targets) => {
                for (slot, &n) in content.zip(targets) {
                    if n > 0 {
                        slot.syllable_target = Some(n);
                    } else if !slot.syllable_pinned {
                        slot.syllable_target = None;
                    }
                }
            }
        }
    }

    /// Assign indent levels to non-literal slots in order. Slots past the end
    /// of `levels` keep their level.
    pub fn apply_indent(&mut self, levels: &[usize]) {
        let content = self.slots.iter_mut().filter(|s| !s.is_literal());
        for (slot, &level) in content.zip(levels) {
            slot.indent_level = level;
        }
    }
}

/// Syllable constraint for a whole template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SyllableSpec {
    /// Same target for every slot.
    Uniform(u32),
    /// One target per non-literal slot.
    PerSlot(Vec<u32>),
}

impl FromStr for SyllableSpec {
    type Err = StanzaError;

    /// Parses `"10"` or `"[8,6,8,6]"`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: String| StanzaError::InvalidOption {
            option: "syllable",
            reason,
        };
        let s = s.trim();
        if let Some(inner) = s.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            let inner = inner.trim();
            if inner.is_empty() {
                return Ok(Self::PerSlot(Vec::new()));
            }
            let targets = inner
                .split(',')
                .map(|n| {
                    n.trim()
                        .parse::<u32>()
                        .map_err(|e| invalid(format!("{:?} in {:?}: {}", n.trim(), s, e)))
                })
                .collect::<Result<Vec<_>>>()?;
            return Ok(Self::PerSlot(targets));
        }
        s.parse::<u32>()
            .map(Self::Uniform)
            .map_err(|e| invalid(format!("{:?}: {}", s, e)))
    }
}

/// Parse an indent string: one digit per non-literal slot, whitespace ignored.
pub fn parse_indent(s: &str) -> Result<Vec<usize>> {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| {
            c.to_digit(10)
                .map(|d| d as usize)
                .ok_or_else(|| StanzaError::InvalidOption {
                    option: "indent",
                    reason: format!("{:?} is not a digit in {:?}", c, s),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abab() -> Template {
        Template::new(vec![
            LineSpec::rhyme("a"),
            LineSpec::refrain("B").with_syllables(4),
            LineSpec::literal(""),
            LineSpec::rhyme("a"),
            LineSpec::refrain("B"),
        ])
    }

    #[test]
    fn test_groups_in_first_occurrence_order() {
        let groups = abab().groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].group_id, "a");
        assert_eq!(groups[0].slots, vec![0, 3]);
        assert_eq!(groups[0].required_distinct(), 2);
        assert_eq!(groups[1].group_id, "B");
        assert_eq!(groups[1].slots, vec![1, 4]);
        assert_eq!(groups[1].required_distinct(), 1);
    }

    #[test]
    fn test_rhyme_sets_join_cases_of_one_letter() {
        let t = Template::new(vec![
            LineSpec::rhyme("a"),
            LineSpec::refrain("A"),
            LineSpec::rhyme("b"),
            LineSpec::refrain("A1").with_syllables(1),
            LineSpec::rhyme("a"),
        ]);
        let sets = t.rhyme_sets();
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].rhyme_id, "a");
        let ids: Vec<&str> = sets[0].groups.iter().map(|g| g.group_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "A", "A1"]);
        // two lowercase lines plus one line per refrain
        assert_eq!(sets[0].required_distinct(), 4);
        assert_eq!(sets[1].rhyme_id, "b");
    }

    #[test]
    fn test_rhyme_identity_falls_back_to_group() {
        let json = r#"{"slots":[{"group_id":"B","forced_repeat":true,"syllable_target":null}]}"#;
        let t: Template = serde_json::from_str(json).unwrap();
        assert_eq!(t.slots[0].rhyme_identity(), "B");
        assert_eq!(t.rhyme_sets()[0].rhyme_id, "B");
    }

    #[test]
    fn test_counts_skip_literals() {
        let t = abab();
        assert_eq!(t.slot_count(), 5);
        assert_eq!(t.content_count(), 4);
        assert_eq!(t.content_indices(), vec![0, 1, 3, 4]);
    }

    #[test]
    fn test_uniform_syllables_respect_pins() {
        let mut t = abab();
        t.slots[1].syllable_pinned = true;
        t.apply_syllables(&SyllableSpec::Uniform(10));
        assert_eq!(t.slots[0].syllable_target, Some(10));
        assert_eq!(t.slots[1].syllable_target, Some(4));
        assert_eq!(t.slots[2].syllable_target, None);
        assert_eq!(t.slots[4].syllable_target, Some(10));

        t.apply_syllables(&SyllableSpec::Uniform(0));
        assert_eq!(t.slots[0].syllable_target, None);
        assert_eq!(t.slots[1].syllable_target, Some(4));
    }

    #[test]
    fn test_per_slot_syllables_skip_literals() {
        let mut t = abab();
        t.apply_syllables(&SyllableSpec::PerSlot(vec![8, 0, 6]));
        let targets: Vec<_> = t.slots.iter().map(|s| s.syllable_target).collect();
        assert_eq!(targets, vec![Some(8), None, None, Some(6), None]);
    }

    #[test]
    fn test_apply_indent_skips_literals() {
        let mut t = abab();
        t.apply_indent(&[0, 1, 1]);
        let levels: Vec<_> = t.slots.iter().map(|s| s.indent_level).collect();
        assert_eq!(levels, vec![0, 1, 0, 1, 0]);
    }

    #[test]
    fn test_syllable_spec_parsing() {
        assert_eq!("10".parse::<SyllableSpec>().unwrap(), SyllableSpec::Uniform(10));
        assert_eq!(
            " [8, 6,8,6 ,0] ".parse::<SyllableSpec>().unwrap(),
            SyllableSpec::PerSlot(vec![8, 6, 8, 6, 0])
        );
        assert_eq!("[]".parse::<SyllableSpec>().unwrap(), SyllableSpec::PerSlot(vec![]));
        assert!("ten".parse::<SyllableSpec>().is_err());
        assert!("[8,x]".parse::<SyllableSpec>().is_err());
        assert!("-3".parse::<SyllableSpec>().is_err());
    }

    #[test]
    fn test_parse_indent() {
        assert_eq!(parse_indent("0101 0101 0011 01").unwrap().len(), 14);
        assert_eq!(parse_indent("012").unwrap(), vec![0, 1, 2]);
        assert!(parse_indent("01a").is_err());
    }

    #[test]
    fn test_template_json_shape() {
        let t = Template::new(vec![LineSpec::literal("[Chorus]"), LineSpec::rhyme("a")]);
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["slots"][0]["literal_text"], "[Chorus]");
        assert!(json["slots"][1].get("literal_text").is_none());
    }
}
