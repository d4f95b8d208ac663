//! Language profiles: extension lookup, comment symbols and the divider protocol.
//!
//! A [`LanguageProfile`] tells the segmenter which line prefixes count as
//! documentation and tells the highlighter which lexer to use. It also
//! derives the sentinel line that is inserted between sections before the
//! code is highlighted, together with the pattern that finds that sentinel
//! again in the highlighter's HTML.

use std::collections::HashMap;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

/// Marker text placed after the first comment symbol to form the divider line.
pub const DIVIDER_MARKER: &str = "DIVIDER";

/// Errors raised while resolving or building language profiles.
#[derive(Error, Debug)]
pub enum LanguageError {
    /// No profile is registered for the file's extension.
    #[error("could not determine language for extension '.{extension}' ({file})")]
    Unsupported { extension: String, file: String },

    /// A profile was declared with an empty lexer name.
    #[error("language profile has an empty lexer name")]
    EmptyName,

    /// A profile was declared without any comment symbols.
    #[error("language profile '{0}' declares no comment symbols")]
    NoSymbols(String),

    /// A profile declared an empty comment symbol.
    #[error("language profile '{0}' declares an empty comment symbol")]
    EmptySymbol(String),

    /// The divider recognition pattern could not be compiled.
    #[error("invalid divider pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Declarative form of a profile, as written in `phocco.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LanguageSpec {
    /// Lexer name understood by the highlighter.
    pub name: String,

    /// Comment prefixes, tried in order.
    pub symbols: Vec<String>,
}

impl LanguageSpec {
    /// Build a spec from string slices.
    pub fn new(name: &str, symbols: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            symbols: symbols.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

/// Resolved comment grammar and highlighter contract for one language.
#[derive(Debug, Clone)]
pub struct LanguageProfile {
    name: String,
    symbols: Vec<String>,
    divider_token: String,
    divider_pattern: Regex,
}

impl LanguageProfile {
    /// Build a profile and derive its divider token and recognition pattern.
    pub fn new(spec: LanguageSpec) -> Result<Self, LanguageError> {
        let LanguageSpec { name, symbols } = spec;

        if name.trim().is_empty() {
            return Err(LanguageError::EmptyName);
        }
        let Some(first) = symbols.first() else {
            return Err(LanguageError::NoSymbols(name));
        };
        if symbols.iter().any(|s| s.trim().is_empty()) {
            return Err(LanguageError::EmptySymbol(name));
        }

        let divider_token = format!("\n{first}{DIVIDER_MARKER}\n");

        // The highlighter escapes comment text, so the symbol is matched in
        // its HTML-escaped form.
        let escaped = html_escape::encode_text(first);
        let divider_pattern = Regex::new(&format!(
            r#"\n*<span class="c1?">{}{}</span>\n?"#,
            regex::escape(&escaped),
            DIVIDER_MARKER
        ))?;

        Ok(Self {
            name,
            symbols,
            divider_token,
            divider_pattern,
        })
    }

    /// Lexer name handed to the highlighter.
    pub fn display_name(&self) -> &str {
        &self.name
    }

    /// Comment symbols in registration order.
    pub fn comment_symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Sentinel line inserted after every section's code.
    pub fn divider_token(&self) -> &str {
        &self.divider_token
    }

    /// Pattern matching the sentinel as rendered by the highlighter.
    pub fn divider_pattern(&self) -> &Regex {
        &self.divider_pattern
    }
}

/// Extension-keyed table of language profiles.
///
/// Keys are stored without the leading dot. The registry is built once and
/// then only read.
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    profiles: HashMap<String, LanguageProfile>,
}

impl LanguageRegistry {
    /// An empty registry.
    pub fn empty() -> Self {
        Self {
            profiles: HashMap::new(),
        }
    }

    /// The built-in language table.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for (extension, spec) in builtin_specs() {
            // Built-in specs are all non-empty, so construction cannot fail.
            if let Ok(profile) = LanguageProfile::new(spec) {
                registry.profiles.insert(extension.to_string(), profile);
            }
        }
        registry
    }

    /// Register (or replace) the profile for an extension.
    pub fn register(&mut self, extension: &str, profile: LanguageProfile) {
        self.profiles
            .insert(normalize_extension(extension).to_string(), profile);
    }

    /// Look up a profile by extension, with or without a leading dot.
    pub fn get(&self, extension: &str) -> Option<&LanguageProfile> {
        self.profiles.get(normalize_extension(extension))
    }

    /// Resolve the profile for a source file from the text after the last `.`
    /// of its file name.
    pub fn resolve(&self, path: &Path) -> Result<&LanguageProfile, LanguageError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_string())
            .unwrap_or_default();

        self.get(&extension)
            .ok_or_else(|| LanguageError::Unsupported {
                extension,
                file: path.display().to_string(),
            })
    }

    /// Registered extensions, sorted.
    pub fn extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<_> = self.profiles.keys().map(String::as_str).collect();
        extensions.sort_unstable();
        extensions
    }

    /// Number of registered extensions.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Returns true if no extension is registered.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn normalize_extension(extension: &str) -> &str {
    extension.strip_prefix('.').unwrap_or(extension)
}

fn builtin_specs() -> Vec<(&'static str, LanguageSpec)> {
    vec![
        ("php", LanguageSpec::new("php", &["#", "//"])),
        ("py", LanguageSpec::new("python", &["#"])),
        ("rb", LanguageSpec::new("ruby", &["#"])),
        ("js", LanguageSpec::new("javascript", &["//"])),
        ("sh", LanguageSpec::new("bash", &["#"])),
        ("c", LanguageSpec::new("c", &["//"])),
        ("h", LanguageSpec::new("c", &["//"])),
        ("rs", LanguageSpec::new("rust", &["//"])),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn divider_token_uses_first_symbol() {
        let registry = LanguageRegistry::builtin();
        let php = registry.get("php").unwrap();
        assert_eq!(php.divider_token(), "\n#DIVIDER\n");

        let js = registry.get(".js").unwrap();
        assert_eq!(js.divider_token(), "\n//DIVIDER\n");
    }

    #[test]
    fn divider_pattern_matches_highlighted_sentinel() {
        let registry = LanguageRegistry::builtin();
        let py = registry.get("py").unwrap();
        let pattern = py.divider_pattern();

        assert!(pattern.is_match(r#"<span class="c1">#DIVIDER</span>"#));
        assert!(pattern.is_match(r#"<span class="c">#DIVIDER</span>"#));
        assert!(!pattern.is_match(r#"<span class="s">#DIVIDER</span>"#));
        assert!(!pattern.is_match("#DIVIDER"));
    }

    #[test]
    fn divider_pattern_absorbs_leading_blank_lines() {
        let registry = LanguageRegistry::builtin();
        let py = registry.get("py").unwrap();
        let parts: Vec<_> = py
            .divider_pattern()
            .split("a = 1\n\n\n<span class=\"c1\">#DIVIDER</span>\nb = 2")
            .collect();
        assert_eq!(parts, vec!["a = 1", "b = 2"]);
    }

    #[test]
    fn resolve_uses_last_extension() {
        let registry = LanguageRegistry::builtin();
        let profile = registry
            .resolve(&PathBuf::from("src/archive.tar.py"))
            .unwrap();
        assert_eq!(profile.display_name(), "python");
        assert_eq!(profile.comment_symbols(), &["#".to_string()]);
    }

    #[test]
    fn resolve_unknown_extension_fails() {
        let registry = LanguageRegistry::builtin();
        let err = registry.resolve(&PathBuf::from("notes.txt")).unwrap_err();
        match err {
            LanguageError::Unsupported { extension, .. } => assert_eq!(extension, "txt"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(err_message(&registry, "Makefile").contains("'.'"));
    }

    fn err_message(registry: &LanguageRegistry, file: &str) -> String {
        registry.resolve(&PathBuf::from(file)).unwrap_err().to_string()
    }

    #[test]
    fn profile_validation() {
        assert!(matches!(
            LanguageProfile::new(LanguageSpec::new("", &["#"])),
            Err(LanguageError::EmptyName)
        ));
        assert!(matches!(
            LanguageProfile::new(LanguageSpec::new("lua", &[])),
            Err(LanguageError::NoSymbols(_))
        ));
        assert!(matches!(
            LanguageProfile::new(LanguageSpec::new("lua", &["--", " "])),
            Err(LanguageError::EmptySymbol(_))
        ));
    }

    #[test]
    fn register_overrides_builtin() {
        let mut registry = LanguageRegistry::builtin();
        let before = registry.len();
        let profile = LanguageProfile::new(LanguageSpec::new("perl", &["#"])).unwrap();
        registry.register(".py", profile);
        assert_eq!(registry.len(), before);
        assert_eq!(registry.get("py").unwrap().display_name(), "perl");
        assert!(registry.extensions().contains(&"php"));
    }

    #[test]
    fn empty_registry_resolves_nothing() {
        let mut registry = LanguageRegistry::empty();
        assert!(registry.is_empty());
        assert!(registry.resolve(Path::new("main.py")).is_err());

        registry.register("py", LanguageProfile::new(LanguageSpec::new("python", &["#"])).unwrap());
        assert!(!registry.is_empty());
        assert_eq!(registry.len(), 1);
        assert!(!LanguageRegistry::builtin().is_empty());
    }
}
