//! Crate-level error type.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::highlight::HighlightError;
use crate::language::LanguageError;

/// Errors produced while documenting a file.
#[derive(Error, Debug)]
pub enum PhoccoError {
    #[error(transparent)]
    Language(#[from] LanguageError),

    #[error(transparent)]
    Highlight(#[from] HighlightError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to render page")]
    Render(#[from] std::fmt::Error),
}

/// Result type alias for phocco operations.
pub type Result<T> = std::result::Result<T, PhoccoError>;
