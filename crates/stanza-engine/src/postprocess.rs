//! Indentation and caller transforms, applied after selection.

use crate::options::{LineFn, Transform};
use stanza_form::Template;

/// Indent, then transform.
pub fn post_process(
    lines: Vec<String>,
    template: &Template,
    indent_unit: &str,
    transform: Option<&Transform>,
) -> Vec<String> {
    let lines = indent_lines(lines, template, indent_unit);
    match transform {
        Some(transform) => apply_transform(lines, transform),
        None => lines,
    }
}

/// Prefix each line with `indent_level` copies of `unit`.
pub fn indent_lines(lines: Vec<String>, template: &Template, unit: &str) -> Vec<String> {
    lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| match template.slots.get(i).map(|s| s.indent_level) {
            Some(level) if level > 0 => unit.repeat(level) + &line,
            _ => line,
        })
        .collect()
}

/// Run `transform` over `lines`.
///
/// Each call sees the sequence as rewritten so far. Positional transforms
/// run in ascending line order once negative positions are resolved against
/// the line count; positions outside the poem are skipped.
pub fn apply_transform(mut lines: Vec<String>, transform: &Transform) -> Vec<String> {
    match transform {
        Transform::All(f) => {
            for i in 0..lines.len() {
                lines[i] = f(&lines[i], i + 1, &lines);
            }
        }
        Transform::ByLine(map) => {
            let mut resolved: Vec<(usize, &LineFn)> = Vec::with_capacity(map.len());
            for (&position, f) in map {
                match resolve_position(position, lines.len()) {
                    Some(index) => resolved.push((index, f)),
                    None => tracing::warn!(
                        "transform position {} is outside a {}-line poem",
                        position,
                        lines.len()
                    ),
                }
            }
            resolved.sort_by_key(|(index, _)| *index);
            for (index, f) in resolved {
                lines[index] = f(&lines[index], index + 1, &lines);
            }
        }
    }
    lines
}

/// `1..=len` counts from the front, `-len..=-1` from the back.
fn resolve_position(position: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let index = match position {
        p if p > 0 => p - 1,
        p if p < 0 => len + p,
        _ => return None,
    };
    (0..len).contains(&index).then_some(index as usize)
}
