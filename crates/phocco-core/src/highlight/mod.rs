//! Syntax highlighting of section code.
//!
//! All sections' code is joined into one blob, separated by the language's
//! divider token, and highlighted in a single call so the lexer keeps its
//! state across section boundaries. The returned HTML is split on the
//! divider pattern to recover exactly one fragment per section.

mod fallback;
mod pygments;
mod remote;

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::language::LanguageProfile;
use crate::segment::Section;

pub use fallback::WithFallback;
pub use pygments::{Pygments, DEFAULT_COMMAND};
pub use remote::{RemoteHighlighter, DEFAULT_REMOTE_URL};

/// Markup opening every section's highlighted code.
pub const CODE_OPEN: &str = "<div class=\"highlight\"><pre>";

/// Markup closing every section's highlighted code.
pub const CODE_CLOSE: &str = "</pre></div>";

/// Errors that can occur while highlighting.
#[derive(Error, Debug)]
pub enum HighlightError {
    /// The highlighter could not be found.
    #[error("highlighter '{tool}' is not available")]
    Unavailable { tool: String },

    /// The highlighter did not finish in time.
    #[error("highlighter '{tool}' timed out after {timeout:?}")]
    Timeout { tool: String, timeout: Duration },

    /// The highlighter exited unsuccessfully.
    #[error("highlighter '{tool}' failed ({status}): {stderr}")]
    Failed {
        tool: String,
        status: ExitStatus,
        stderr: String,
    },

    /// The remote highlighting service answered with an error status.
    #[error("highlighting service returned HTTP {status}")]
    RemoteStatus { status: u16 },

    /// Network error talking to the remote highlighting service.
    #[error("highlighting service error: {0}")]
    Remote(#[from] reqwest::Error),

    /// IO error while talking to the highlighter process.
    #[error("highlighter IO error: {0}")]
    Io(#[from] io::Error),

    /// The highlighted output could not be split back into sections.
    #[error("highlighter output has {fragments} fragments for {sections} sections")]
    Reconciliation { sections: usize, fragments: usize },
}

/// Something that turns source code into highlighted HTML.
pub trait Highlighter {
    /// Short name used in log output.
    fn name(&self) -> &str;

    /// Highlight `code` with the lexer called `lexer`, returning HTML.
    fn highlight(&self, lexer: &str, code: &str) -> Result<String, HighlightError>;
}

impl<H: Highlighter + ?Sized> Highlighter for Box<H> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn highlight(&self, lexer: &str, code: &str) -> Result<String, HighlightError> {
        (**self).highlight(lexer, code)
    }
}

impl<H: Highlighter + ?Sized> Highlighter for &H {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn highlight(&self, lexer: &str, code: &str) -> Result<String, HighlightError> {
        (**self).highlight(lexer, code)
    }
}

/// Join every section's code, each followed by the divider token.
pub fn build_blob(profile: &LanguageProfile, sections: &[Section]) -> String {
    let divider = profile.divider_token();
    let capacity = sections
        .iter()
        .map(|s| s.code_text().len() + divider.len())
        .sum();

    let mut blob = String::with_capacity(capacity);
    for section in sections {
        blob.push_str(section.code_text());
        blob.push_str(divider);
    }
    blob
}

/// Split highlighted output into one fragment per section.
///
/// The highlighter's own `<div class="highlight"><pre>` wrapper is removed
/// first. Since a divider follows the last section too, the blank remainder
/// after the final divider is discarded before the count is checked.
pub fn split_fragments<'a>(
    profile: &LanguageProfile,
    markup: &'a str,
    sections: usize,
) -> Result<Vec<&'a str>, HighlightError> {
    let body = strip_wrapper(markup);
    let mut fragments: Vec<&str> = profile.divider_pattern().split(body).collect();

    if fragments.len() == sections + 1 && fragments.last().is_some_and(|f| f.trim().is_empty()) {
        fragments.pop();
    }

    if fragments.len() != sections {
        return Err(HighlightError::Reconciliation {
            sections,
            fragments: fragments.len(),
        });
    }
    Ok(fragments)
}

fn strip_wrapper(markup: &str) -> &str {
    let body = markup.trim_end();
    let body = body.strip_prefix(CODE_OPEN).unwrap_or(body);
    let body = body.strip_prefix("<span></span>").unwrap_or(body);
    body.strip_suffix(CODE_CLOSE).unwrap_or(body)
}

/// Drives a [`Highlighter`] over a file's sections.
pub struct HighlightCoordinator<H> {
    highlighter: H,
}

impl<H: Highlighter> HighlightCoordinator<H> {
    pub fn new(highlighter: H) -> Self {
        Self { highlighter }
    }

    /// Highlight all sections in one call and attach each section's code markup.
    ///
    /// Sections are left untouched when highlighting or reconciliation fails.
    pub fn highlight(
        &self,
        profile: &LanguageProfile,
        sections: &mut [Section],
    ) -> Result<(), HighlightError> {
        let blob = build_blob(profile, sections);
        debug!(
            highlighter = self.highlighter.name(),
            lexer = profile.display_name(),
            bytes = blob.len(),
            sections = sections.len(),
            "highlighting"
        );

        let markup = self.highlighter.highlight(profile.display_name(), &blob)?;
        let fragments = split_fragments(profile, &markup, sections.len())?;

        for (section, fragment) in sections.iter_mut().zip(fragments) {
            section.attach_code_html(format!("{CODE_OPEN}{fragment}{CODE_CLOSE}"));
        }
        Ok(())
    }
}
