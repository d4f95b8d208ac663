//! End-to-end documentation of source files.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::Config;
use crate::error::{PhoccoError, Result};
use crate::highlight::{HighlightCoordinator, Highlighter, Pygments, RemoteHighlighter, WithFallback};
use crate::language::{LanguageProfile, LanguageRegistry};
use crate::markdown::render_markdown;
use crate::page::{output_path, source_stem, PageRenderer};
use crate::segment::Segmenter;

/// Documents source files into HTML pages.
pub struct Generator {
    registry: LanguageRegistry,
    highlighter: Box<dyn Highlighter>,
    output_dir: PathBuf,
    sources: Vec<String>,
}

impl Generator {
    pub fn new(
        registry: LanguageRegistry,
        highlighter: impl Highlighter + 'static,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            registry,
            highlighter: Box::new(highlighter),
            output_dir: output_dir.into(),
            sources: Vec::new(),
        }
    }

    /// Build a generator with the configured languages, output directory and
    /// highlighter chain.
    pub fn from_config(config: &Config) -> Result<Self> {
        let registry = config.registry()?;
        let settings = &config.highlighter;
        let local = Pygments::new(settings.command.clone(), settings.timeout());

        let generator = if settings.fallback {
            let remote = RemoteHighlighter::new(settings.remote_url.clone(), settings.timeout())?;
            Self::new(registry, WithFallback::new(local, remote), config.output.clone())
        } else {
            Self::new(registry, local, config.output.clone())
        };
        Ok(generator)
    }

    /// Set the sources listed in each page's jump-to menu.
    #[must_use]
    pub fn with_sources<P: AsRef<Path>>(mut self, sources: &[P]) -> Self {
        self.sources = sources.iter().map(|p| source_stem(p.as_ref())).collect();
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Render the page for `source`, whose language is taken from `path`.
    pub fn document(&self, path: &Path, source: &str) -> Result<String> {
        let profile = self.registry.resolve(path)?;
        self.render(profile, path, source)
    }

    /// Read `path`, document it and write `<output_dir>/<stem>.html`.
    ///
    /// Nothing is written unless every section was resolved.
    pub fn generate(&self, path: &Path) -> Result<PathBuf> {
        let profile = self.registry.resolve(path)?;
        let source = fs::read_to_string(path).map_err(|source| PhoccoError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let page = self.render(profile, path, &source)?;

        fs::create_dir_all(&self.output_dir).map_err(|source| PhoccoError::Write {
            path: self.output_dir.clone(),
            source,
        })?;
        let output = output_path(&self.output_dir, path);
        fs::write(&output, page).map_err(|source| PhoccoError::Write {
            path: output.clone(),
            source,
        })?;

        info!(file = %path.display(), output = %output.display(), "generated");
        Ok(output)
    }

    fn render(&self, profile: &LanguageProfile, path: &Path, source: &str) -> Result<String> {
        let mut sections = Segmenter::new(profile).segment(source);
        debug!(
            file = %path.display(),
            lexer = profile.display_name(),
            sections = sections.len(),
            "segmented"
        );

        HighlightCoordinator::new(self.highlighter.as_ref()).highlight(profile, &mut sections)?;
        for section in &mut sections {
            let html = render_markdown(section.docs_text());
            section.attach_docs_html(html);
        }

        Ok(PageRenderer::render(&source_stem(path), &self.sources, &sections)?)
    }
}
