//! Poem assembly: option resolution, constraint-satisfying line selection,
//! and post-processing.
//!
//! The pipeline for one call is
//! [`resolve`](resolve::resolve) → [`LineSelector`](selector::LineSelector)
//! → [`post_process`](postprocess::post_process). [`Poem`](poem::Poem) wires
//! the three together over an owned corpus store.

pub mod ingest;
pub mod options;
pub mod poem;
pub mod postprocess;
pub mod resolve;
pub mod selector;

pub use ingest::IngestReport;
pub use options::{LineFn, PoemOptions, Transform};
pub use poem::Poem;
pub use resolve::{Resolved, TemplateSource};
pub use selector::{Filters, GenerationSession, LineSelector, Selection};
