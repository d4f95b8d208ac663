//! Source segmentation: split a file into documentation / code sections.
//!
//! Every line is classified by an ordered list of prefix rules (docblock
//! open, docblock continuation, then the language's comment symbols). The
//! first rule that matches makes the line documentation; a line nothing
//! matches is code. A documentation line that follows code closes the
//! current section.
//!
//! Inside a `/** ... */` docblock, `@param` and `@return` annotations are
//! rewritten into prose:
//!
//! ```text
//! /**
//!  * @param int x the input
//!  * @param int y another input
//!  * @return int sum the sum
//!  */
//! ```
//!
//! becomes "Takes `int x` the input and `int y` another input. Returns
//! `int sum` the sum".

use std::mem;
use std::sync::OnceLock;

use regex::Regex;

use crate::language::LanguageProfile;

const DOCBLOCK_OPEN: &str = "/**";
const DOCBLOCK_CONTINUATION: &str = "*";
const SHEBANG: &str = "#!";

/// One documentation block and the code that follows it.
///
/// Text fields are filled once by the [`Segmenter`]; the markup fields are
/// attached later by the highlighter and the Markdown renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    index: usize,
    docs_text: String,
    code_text: String,
    docs_html: Option<String>,
    code_html: Option<String>,
}

impl Section {
    /// Create a section with its raw text.
    pub fn new(index: usize, docs_text: impl Into<String>, code_text: impl Into<String>) -> Self {
        Self {
            index,
            docs_text: docs_text.into(),
            code_text: code_text.into(),
            docs_html: None,
            code_html: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn docs_text(&self) -> &str {
        &self.docs_text
    }

    pub fn code_text(&self) -> &str {
        &self.code_text
    }

    pub fn docs_html(&self) -> Option<&str> {
        self.docs_html.as_deref()
    }

    pub fn code_html(&self) -> Option<&str> {
        self.code_html.as_deref()
    }

    pub(crate) fn attach_docs_html(&mut self, html: String) {
        debug_assert!(self.docs_html.is_none(), "docs markup attached twice");
        self.docs_html = Some(html);
    }

    pub(crate) fn attach_code_html(&mut self, html: String) {
        debug_assert!(self.code_html.is_none(), "code markup attached twice");
        self.code_html = Some(html);
    }
}

/// What a matched line prefix means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    DocblockOpen,
    DocblockContinuation,
    Comment,
}

#[derive(Debug, Clone)]
struct LineRule {
    kind: LineKind,
    prefix: String,
}

/// Ordered prefix rules for one language. First match wins.
#[derive(Debug, Clone)]
struct Grammar {
    rules: Vec<LineRule>,
}

impl Grammar {
    fn for_profile(profile: &LanguageProfile) -> Self {
        let mut rules = vec![
            LineRule {
                kind: LineKind::DocblockOpen,
                prefix: DOCBLOCK_OPEN.to_string(),
            },
            LineRule {
                kind: LineKind::DocblockContinuation,
                prefix: DOCBLOCK_CONTINUATION.to_string(),
            },
        ];
        rules.extend(profile.comment_symbols().iter().map(|symbol| LineRule {
            kind: LineKind::Comment,
            prefix: symbol.clone(),
        }));
        Self { rules }
    }

    /// Classify a line, returning the matched rule kind and the text left
    /// after the prefix (and its leading whitespace) is removed.
    fn classify<'a>(&self, line: &'a str) -> Option<(LineKind, &'a str)> {
        let trimmed = line.trim_start();
        self.rules.iter().find_map(|rule| {
            trimmed
                .strip_prefix(rule.prefix.as_str())
                .map(|rest| (rule.kind, rest))
        })
    }

    fn opens_docblock(&self, line: &str) -> bool {
        matches!(self.classify(line), Some((LineKind::DocblockOpen, _)))
    }
}

/// Recognized docblock annotation keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnnotationKind {
    Param,
    Return,
}

impl AnnotationKind {
    const ALL: [(&'static str, AnnotationKind); 2] =
        [("param", AnnotationKind::Param), ("return", AnnotationKind::Return)];

    fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .find(|(name, _)| *name == keyword)
            .map(|(_, kind)| *kind)
    }

    fn header(self) -> &'static str {
        match self {
            AnnotationKind::Param => "Takes ",
            AnnotationKind::Return => "Returns ",
        }
    }
}

/// A parsed `@keyword type name description` line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Annotation<'a> {
    kind: AnnotationKind,
    ty: &'a str,
    name: &'a str,
    description: &'a str,
}

impl<'a> Annotation<'a> {
    fn parse(text: &'a str) -> Option<Self> {
        let captures = annotation_regex().captures(text)?;
        let keyword = captures.get(1)?.as_str();
        let kind = AnnotationKind::from_keyword(keyword)?;
        let rest = captures.get(2).map_or("", |m| m.as_str());

        let (ty, rest) = next_field(rest);
        let (name, rest) = next_field(rest);
        Some(Self {
            kind,
            ty,
            name,
            description: rest.trim_end(),
        })
    }

    /// Render as "`type name` description". Missing fields are left out.
    fn render(&self) -> String {
        let signature = [self.ty, self.name]
            .into_iter()
            .filter(|field| !field.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let mut out = String::new();
        if !signature.is_empty() {
            out.push('`');
            out.push_str(&signature);
            out.push('`');
        }
        if !self.description.is_empty() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(self.description);
        }
        out
    }
}

/// Split off the next whitespace-delimited field.
fn next_field(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(end) => (&text[..end], text[end..].trim_start()),
        None => (text, ""),
    }
}

fn annotation_regex() -> &'static Regex {
    static ANNOTATION: OnceLock<Regex> = OnceLock::new();
    ANNOTATION.get_or_init(|| {
        Regex::new(r"^\s*@(\S+)(?:\s+(.*))?$").expect("annotation pattern is valid")
    })
}

fn signature_regex() -> &'static Regex {
    static SIGNATURE: OnceLock<Regex> = OnceLock::new();
    SIGNATURE.get_or_init(|| {
        Regex::new(r"function\s+([^\s(]+)\s*\(").expect("signature pattern is valid")
    })
}

/// Docblock tracking for a single segmentation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct DocblockState {
    in_docblock: bool,
    previous: Option<AnnotationKind>,
}

impl DocblockState {
    /// Turn a docblock line into prose when it carries an annotation.
    fn annotate(&mut self, text: &str) -> String {
        let Some(annotation) = Annotation::parse(text) else {
            self.previous = None;
            return text.to_string();
        };

        let lead = match self.previous {
            Some(previous) if previous == annotation.kind => " and ".to_string(),
            Some(_) => format!(". {}", annotation.kind.header()),
            None => annotation.kind.header().to_string(),
        };
        self.previous = Some(annotation.kind);
        lead + &annotation.render()
    }
}

/// Per-call accumulation buffers.
#[derive(Debug, Default)]
struct Accumulator {
    sections: Vec<Section>,
    docs: String,
    code: String,
    has_code: bool,
}

impl Accumulator {
    fn flush(&mut self) {
        let index = self.sections.len();
        self.sections.push(Section::new(
            index,
            mem::take(&mut self.docs),
            mem::take(&mut self.code),
        ));
        self.has_code = false;
    }
}

/// Splits source text into [`Section`]s for one language.
#[derive(Debug, Clone)]
pub struct Segmenter {
    grammar: Grammar,
}

impl Segmenter {
    pub fn new(profile: &LanguageProfile) -> Self {
        Self {
            grammar: Grammar::for_profile(profile),
        }
    }

    /// Segment a whole file.
    ///
    /// Always returns at least one section. A leading `#!` line is dropped
    /// before segmentation.
    pub fn segment(&self, source: &str) -> Vec<Section> {
        let mut lines: Vec<&str> = source.split('\n').collect();
        if lines.first().is_some_and(|line| line.starts_with(SHEBANG)) {
            lines.remove(0);
        }

        let mut acc = Accumulator::default();
        let mut state = DocblockState::default();

        for (number, line) in lines.iter().enumerate() {
            let Some((kind, rest)) = self.grammar.classify(line) else {
                acc.has_code = true;
                acc.code.push_str(line);
                acc.code.push('\n');
                continue;
            };

            if acc.has_code {
                acc.flush();
            }

            let mut text = if state.in_docblock {
                state.annotate(rest)
            } else {
                rest.to_string()
            };
            text.push('\n');

            match kind {
                LineKind::DocblockOpen => {
                    state.in_docblock = true;
                    if let Some(name) = self.find_signature(&lines[number + 1..]) {
                        text = format!("**` {name}`**\n\n ");
                    }
                }
                LineKind::DocblockContinuation if rest.trim_end() == "/" => {
                    state = DocblockState::default();
                    text = ".".to_string();
                }
                _ => {}
            }

            acc.docs.push_str(&text);
        }

        acc.flush();
        acc.sections
    }

    /// Look ahead for the function a docblock documents, stopping at the
    /// next docblock.
    fn find_signature<'a>(&self, lines: &[&'a str]) -> Option<&'a str> {
        for &line in lines {
            if let Some(captures) = signature_regex().captures(line) {
                return captures.get(1).map(|m| m.as_str());
            }
            if self.grammar.opens_docblock(line) {
                return None;
            }
        }
        None
    }
}

/// Segment `source` with the comment grammar of `profile`.
pub fn segment(profile: &LanguageProfile, source: &str) -> Vec<Section> {
    Segmenter::new(profile).segment(source)
}
