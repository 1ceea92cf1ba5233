//! Placeholder interpolation.
//!
//! Two substitution paths share the `{{ key }}` token syntax:
//!
//! - [`TemplateEngine::interpolate`] renders short patterns such as file
//!   names. Every token is replaced; unknown keys become empty text.
//! - [`TemplateEngine::substitute_body`] rewrites a document body one field
//!   at a time. Tokens naming fields absent from the record stay in place.

mod body;
mod engine;

pub use body::DocumentBody;
pub use engine::{TemplateEngine, DEFAULT_DOCUMENT_NAME};
