//! Turn merged options into a concrete template plus selection filters.

use crate::options::PoemOptions;
use regex::Regex;
use stanza_core::error::{Result, StanzaError};
use stanza_core::phonetics::Phonetics;
use stanza_form::{FormSpec, Template, lookup_form, parse_indent, parse_scheme, template_from_text};
use std::fmt;

/// Where the template structure came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// An explicit `rhyme` option.
    Scheme,
    /// `form_from_text`.
    SampleText,
    /// A built-in form, by canonical name.
    Form(&'static str),
}

impl fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scheme => f.write_str("rhyme scheme"),
            Self::SampleText => f.write_str("sample text"),
            Self::Form(name) => write!(f, "form {name}"),
        }
    }
}

/// A fully resolved generation request.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub template: Template,
    pub source: TemplateSource,
    pub acrostic: Option<String>,
    pub regex: Option<Regex>,
    pub proper: bool,
}

/// Resolve `options` into a template.
///
/// The base structure is the sample text if one is given, else the named
/// form. An explicit non-blank `rhyme` replaces that structure, while the
/// form's syllable and indent strings still apply unless `syllable` or
/// `indent` are supplied too. `default_proper` is used when `proper` is unset.
pub fn resolve(
    options: &PoemOptions,
    phonetics: &dyn Phonetics,
    default_proper: bool,
) -> Result<Resolved> {
    let form: Option<&'static FormSpec> = match options.form.as_deref() {
        Some(name) => {
            let found = lookup_form(name);
            if found.is_none() {
                tracing::debug!("ignoring unknown form {:?}", name);
            }
            found
        }
        None => None,
    };
    // Sample text takes precedence over a named form.
    let form = form.filter(|_| options.form_from_text.is_none());

    let rhyme = options.rhyme.as_deref().filter(|r| !r.trim().is_empty());
    let (mut template, source) = if let Some(scheme) = rhyme {
        (parse_scheme(scheme)?, TemplateSource::Scheme)
    } else if let Some(text) = options.form_from_text.as_deref() {
        (template_from_text(text, phonetics), TemplateSource::SampleText)
    } else if let Some(form) = form {
        (parse_scheme(form.rhyme)?, TemplateSource::Form(form.name))
    } else {
        return Err(StanzaError::MissingFormOrRhyme);
    };

    if template.is_empty() {
        return Err(StanzaError::MissingFormOrRhyme);
    }

    let syllable = options
        .syllable
        .clone()
        .or_else(|| form.and_then(FormSpec::syllable_spec));
    if let Some(spec) = &syllable {
        template.apply_syllables(spec);
    }

    let indent = options.indent.as_deref().or(form.and_then(|f| f.indent));
    if let Some(indent) = indent {
        template.apply_indent(&parse_indent(indent)?);
    }

    let regex = options
        .regex
        .as_deref()
        .map(|pattern| {
            Regex::new(pattern).map_err(|e| StanzaError::InvalidOption {
                option: "regex",
                reason: e.to_string(),
            })
        })
        .transpose()?;

    // An empty acrostic is kept so the selector can reject it for any
    // template with content lines.
    let acrostic = options.acrostic.clone();

    tracing::debug!(
        "resolved {} slots from {} ({} groups)",
        template.slot_count(),
        source,
        template.groups().len()
    );

    Ok(Resolved {
        template,
        source,
        acrostic,
        regex,
        proper: options.proper.unwrap_or(default_proper),
    })
}
