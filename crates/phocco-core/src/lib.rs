//! Literate-programming documentation engine.
//!
//! phocco turns a source file into a side-by-side HTML page: comments on
//! the left, highlighted code on the right. The work happens in three
//! steps:
//!
//! - [`segment`] splits the file into [`Section`]s of documentation text
//!   and code text, rewriting docblock annotations into prose;
//! - [`highlight`] sends all code through a highlighter in one call and
//!   splits the result back into per-section markup;
//! - [`page`] renders the documentation as Markdown and writes the page.
//!
//! [`Generator`] ties the steps together.

pub mod config;
pub mod error;
pub mod highlight;
pub mod language;
pub mod markdown;
pub mod page;
pub mod pipeline;
pub mod segment;

pub use config::{Config, ConfigError, HighlighterConfig, CONFIG_FILE};
pub use error::{PhoccoError, Result};
pub use highlight::{
    HighlightCoordinator, HighlightError, Highlighter, Pygments, RemoteHighlighter, WithFallback,
};
pub use language::{LanguageError, LanguageProfile, LanguageRegistry, LanguageSpec};
pub use pipeline::Generator;
pub use segment::{Section, Segmenter};

/// The current phocco version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
