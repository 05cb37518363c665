//! Prompt templates
//!
//! `.pmt` files are compiled into the binary. A file of the same name under
//! `<config dir>/tripgenie/prompts/` overrides the embedded copy. Templates
//! use Handlebars syntax.

pub mod embedded;
mod loader;

pub use loader::PromptLoader;
