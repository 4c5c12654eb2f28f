//! The rhyme-scheme mini-language.
//!
//! - Each ASCII letter is one slot. The letter names the rhyme regardless of
//!   case, so `A` and `a` rhyme. Case decides repetition: an uppercase letter
//!   repeats one line verbatim, a lowercase letter takes a new line each time.
//! - Digits directly after an uppercase letter are a syllable suffix for
//!   that letter (`A10`) and take no slot. Identical letter + suffix pairs
//!   form one group; `A1` and `A2` are different groups.
//! - Digits with no letter before them, after a lowercase letter, or after
//!   a run of letters that mixes case are an error.
//! - Whitespace separates runs and takes no slot.
//! - Any other character is a slot of its own and behaves like a lowercase
//!   letter.

use crate::template::{LineSpec, Template};
use stanza_core::error::{Result, StanzaError};

/// Parse a rhyme scheme into a template with one slot per retained token.
pub fn parse_scheme(scheme: &str) -> Result<Template> {
    let chars: Vec<char> = scheme.chars().collect();
    let mut slots: Vec<LineSpec> = Vec::new();
    // First slot of the letter run currently being read.
    let mut run_start: Option<usize> = None;

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            run_start = None;
            i += 1;
            continue;
        }

        if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            let digits: String = chars[start..i].iter().collect();
            let Some(run) = run_start.take() else {
                return Err(StanzaError::rhyme(
                    scheme,
                    format!("digits {:?} have no letter before them", digits),
                ));
            };
            attach_suffix(scheme, &mut slots[run..], &digits)?;
            continue;
        }

        if c.is_ascii_alphabetic() {
            run_start.get_or_insert(slots.len());
            slots.push(if c.is_ascii_uppercase() {
                LineSpec::refrain(c.to_string())
            } else {
                LineSpec::rhyme(c.to_string())
            });
        } else {
            run_start = None;
            slots.push(LineSpec::rhyme(c.to_string()));
        }
        i += 1;
    }

    tracing::debug!("parsed rhyme scheme {:?} into {} slots", scheme, slots.len());
    Ok(Template::new(slots))
}

/// Bind a digit suffix to the last letter of `run`.
fn attach_suffix(scheme: &str, run: &mut [LineSpec], digits: &str) -> Result<()> {
    let upper = run.iter().filter(|s| s.forced_repeat).count();
    if upper != 0 && upper != run.len() {
        return Err(StanzaError::rhyme(
            scheme,
            format!("digits {:?} follow a run of mixed-case letters", digits),
        ));
    }
    let Some(last) = run.last_mut() else {
        return Err(StanzaError::rhyme(
            scheme,
            format!("digits {:?} have no letter before them", digits),
        ));
    };
    if !last.forced_repeat {
        return Err(StanzaError::rhyme(
            scheme,
            format!(
                "digits {:?} follow lowercase letter {:?}",
                digits, last.group_id
            ),
        ));
    }
    let syllables: u32 = digits.parse().map_err(|_| {
        StanzaError::rhyme(scheme, format!("syllable suffix {:?} is too large", digits))
    })?;
    last.group_id = format!("{}{}", last.group_id, syllables);
    last.syllable_target = Some(syllables);
    last.syllable_pinned = true;
    Ok(())
}
