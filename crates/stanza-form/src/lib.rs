//! Structural templates for stanza poems.
//!
//! A [`template::Template`] is the ordered list of slots a poem must fill.
//! Templates come from three places: the rhyme-scheme mini-language
//! ([`scheme::parse_scheme`]), the named presets in [`forms`], and sample
//! texts ([`extract::template_from_text`]).

pub mod extract;
pub mod forms;
pub mod scheme;
pub mod template;

pub use extract::template_from_text;
pub use forms::{FormSpec, lookup_form};
pub use scheme::parse_scheme;
pub use template::{LineSpec, RhymeSet, SlotGroup, SyllableSpec, Template, parse_indent};
