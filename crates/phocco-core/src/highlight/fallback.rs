//! Primary/fallback highlighter chaining.

use tracing::{info, warn};

use super::{HighlightError, Highlighter};

/// Tries `primary`, switching to `fallback` once if the primary tool is
/// not installed. Every other error is returned as is.
#[derive(Debug, Clone)]
pub struct WithFallback<P, F> {
    primary: P,
    fallback: F,
}

impl<P, F> WithFallback<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<P: Highlighter, F: Highlighter> Highlighter for WithFallback<P, F> {
    fn name(&self) -> &str {
        self.primary.name()
    }

    fn highlight(&self, lexer: &str, code: &str) -> Result<String, HighlightError> {
        match self.primary.highlight(lexer, code) {
            Err(HighlightError::Unavailable { tool }) => {
                warn!(
                    tool = %tool,
                    fallback = self.fallback.name(),
                    "highlighter not available, using fallback"
                );
                self.fallback.highlight(lexer, code)
            }
            result => {
                if result.is_ok() {
                    info!(highlighter = self.primary.name(), "highlighted locally");
                }
                result
            }
        }
    }
}
