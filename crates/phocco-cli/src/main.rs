//! phocco CLI - generate side-by-side literate documentation pages

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use phocco_core::{Config, Generator};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "PHOCCO_LOG";

#[derive(Parser)]
#[command(name = "phocco")]
#[command(version = phocco_core::VERSION)]
#[command(about = "Literate-programming documentation generator", long_about = None)]
struct Cli {
    /// Source files to document
    files: Vec<PathBuf>,

    /// Output directory for generated pages (default: docs)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file (default: ./phocco.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Local highlighter command (default: pygmentize)
    #[arg(long)]
    highlighter: Option<String>,

    /// Never fall back to the remote highlighting service
    #[arg(long)]
    no_fallback: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    if cli.files.is_empty() {
        println!("You must supply a filename to continue.");
        return Ok(());
    }

    let config = load_config(cli)?;
    debug!(output = %config.output.display(), command = %config.highlighter.command, "configuration loaded");

    let generator = Generator::from_config(&config)
        .context("Failed to set up the highlighter")?
        .with_sources(&cli.files);

    let mut failed = 0;
    for file in &cli.files {
        match generator.generate(file) {
            Ok(output) => println!("Generated: {}", output.display()),
            Err(e) => {
                error!(file = %file.display(), "{e}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} files could not be documented", failed, cli.files.len());
    }

    println!("\nDocumentation generated in: {}", generator.output_dir().display());
    Ok(())
}

/// Load the configuration file and apply command-line overrides.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_path(path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => Config::discover(Path::new(".")).context("Failed to load phocco.toml")?,
    };

    if let Some(output) = &cli.output {
        config.output.clone_from(output);
    }
    if let Some(command) = &cli.highlighter {
        config.highlighter.command.clone_from(command);
    }
    if cli.no_fallback {
        config.highlighter.fallback = false;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_files_and_flags() {
        let cli = Cli::parse_from([
            "phocco",
            "a.php",
            "b.py",
            "--output",
            "site",
            "--no-fallback",
            "--highlighter",
            "/usr/local/bin/pygmentize",
        ]);
        assert_eq!(cli.files, vec![PathBuf::from("a.php"), PathBuf::from("b.py")]);
        assert_eq!(cli.output, Some(PathBuf::from("site")));
        assert!(cli.no_fallback);
        assert!(!cli.verbose);
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phocco.toml");
        std::fs::write(&path, "output = \"from-file\"\n[highlighter]\ncommand = \"file-cmd\"\n").unwrap();

        let cli = Cli::parse_from([
            "phocco".to_string(),
            "x.py".to_string(),
            "--config".to_string(),
            path.display().to_string(),
            "--output".to_string(),
            "from-flag".to_string(),
        ]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.output, PathBuf::from("from-flag"));
        assert_eq!(config.highlighter.command, "file-cmd");
        assert!(config.highlighter.fallback);
    }
}
