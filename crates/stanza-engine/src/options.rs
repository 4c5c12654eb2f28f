//! Caller-facing generation options.

use stanza_form::SyllableSpec;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A line rewrite: `(text, 1-based position, every line so far) -> new text`.
pub type LineFn = Arc<dyn Fn(&str, usize, &[String]) -> String + Send + Sync>;

/// Rewrites applied after selection and indentation.
#[derive(Clone)]
pub enum Transform {
    /// Applied to every line, first to last.
    All(LineFn),
    /// Keyed by position: `1` is the first line, `-1` the last.
    ByLine(BTreeMap<i64, LineFn>),
}

impl Transform {
    pub fn all<F>(f: F) -> Self
    where
        F: Fn(&str, usize, &[String]) -> String + Send + Sync + 'static,
    {
        Self::All(Arc::new(f))
    }

    /// An empty positional transform, to be filled with [`Transform::line`].
    pub fn by_line() -> Self {
        Self::ByLine(BTreeMap::new())
    }

    /// Add a rewrite for one position. On a [`Transform::All`] this first
    /// converts to a positional transform, dropping the blanket function.
    #[must_use]
    pub fn line<F>(self, position: i64, f: F) -> Self
    where
        F: Fn(&str, usize, &[String]) -> String + Send + Sync + 'static,
    {
        let mut map = match self {
            Self::ByLine(map) => map,
            Self::All(_) => BTreeMap::new(),
        };
        map.insert(position, Arc::new(f));
        Self::ByLine(map)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All(_) => f.write_str("Transform::All(..)"),
            Self::ByLine(map) => f
                .debug_tuple("Transform::ByLine")
                .field(&map.keys().collect::<Vec<_>>())
                .finish(),
        }
    }
}

/// Every knob a generation call accepts. `None` means "not supplied", so the
/// value falls through to the session defaults and then to the form.
#[derive(Debug, Clone, Default)]
pub struct PoemOptions {
    /// Name of a built-in poetic form.
    pub form: Option<String>,
    /// Sample text whose shape becomes the template.
    pub form_from_text: Option<String>,
    /// Rhyme-scheme string.
    pub rhyme: Option<String>,
    pub syllable: Option<SyllableSpec>,
    /// Digit string, one indent level per generated line.
    pub indent: Option<String>,
    /// One letter per generated line; each line must start with its letter.
    pub acrostic: Option<String>,
    /// Pattern every selected line must match.
    pub regex: Option<String>,
    /// Start with a capital, end with a full stop.
    pub proper: Option<bool>,
    pub transform: Option<Transform>,
}

impl PoemOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn form(mut self, name: impl Into<String>) -> Self {
        self.form = Some(name.into());
        self
    }

    #[must_use]
    pub fn form_from_text(mut self, text: impl Into<String>) -> Self {
        self.form_from_text = Some(text.into());
        self
    }

    #[must_use]
    pub fn rhyme(mut self, scheme: impl Into<String>) -> Self {
        self.rhyme = Some(scheme.into());
        self
    }

    #[must_use]
    pub fn syllable(mut self, spec: SyllableSpec) -> Self {
        self.syllable = Some(spec);
        self
    }

    #[must_use]
    pub fn indent(mut self, levels: impl Into<String>) -> Self {
        self.indent = Some(levels.into());
        self
    }

    #[must_use]
    pub fn acrostic(mut self, letters: impl Into<String>) -> Self {
        self.acrostic = Some(letters.into());
        self
    }

    #[must_use]
    pub fn regex(mut self, pattern: impl Into<String>) -> Self {
        self.regex = Some(pattern.into());
        self
    }

    #[must_use]
    pub fn proper(mut self, proper: bool) -> Self {
        self.proper = Some(proper);
        self
    }

    #[must_use]
    pub fn transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Field-by-field merge: values set in `overrides` win, unset ones keep
    /// the value from `self`. Neither side is modified.
    #[must_use]
    pub fn merged_with(&self, overrides: &PoemOptions) -> PoemOptions {
        fn pick<T: Clone>(over: &Option<T>, base: &Option<T>) -> Option<T> {
            over.as_ref().or(base.as_ref()).cloned()
        }
        PoemOptions {
            form: pick(&overrides.form, &self.form),
            form_from_text: pick(&overrides.form_from_text, &self.form_from_text),
            rhyme: pick(&overrides.rhyme, &self.rhyme),
            syllable: pick(&overrides.syllable, &self.syllable),
            indent: pick(&overrides.indent, &self.indent),
            acrostic: pick(&overrides.acrostic, &self.acrostic),
            regex: pick(&overrides.regex, &self.regex),
            proper: pick(&overrides.proper, &self.proper),
            transform: pick(&overrides.transform, &self.transform),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_overrides_per_field() {
        let defaults = PoemOptions::new()
            .form("sonnet")
            .syllable(SyllableSpec::Uniform(10))
            .proper(false);
        let call = PoemOptions::new().rhyme("abcb").proper(true);
        let merged = defaults.merged_with(&call);

        assert_eq!(merged.form.as_deref(), Some("sonnet"));
        assert_eq!(merged.rhyme.as_deref(), Some("abcb"));
        assert_eq!(merged.syllable, Some(SyllableSpec::Uniform(10)));
        assert_eq!(merged.proper, Some(true));
        assert!(merged.acrostic.is_none());
    }

    #[test]
    fn test_merge_leaves_defaults_untouched() {
        let defaults = PoemOptions::new().rhyme("aabb");
        let _ = defaults.merged_with(&PoemOptions::new().rhyme("abab"));
        assert_eq!(defaults.rhyme.as_deref(), Some("aabb"));
    }

    #[test]
    fn test_line_builder_collects_positions() {
        let t = Transform::by_line()
            .line(4, |s, _, _| s.to_uppercase())
            .line(-3, |s, _, _| s.to_lowercase());
        match t {
            Transform::ByLine(map) => assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![-3, 4]),
            Transform::All(_) => panic!("expected positional transform"),
        }
    }

    #[test]
    fn test_transform_debug_hides_closures() {
        let t = Transform::all(|s, _, _| s.to_string());
        assert_eq!(format!("{t:?}"), "Transform::All(..)");
    }
}
