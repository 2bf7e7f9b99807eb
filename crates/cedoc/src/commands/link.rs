//! `cedoc link` command implementation.

use std::io::Read;
use std::path::{Path, PathBuf};

use cedoc_annotate::{LanguageProfile, LinkSynthesizer};
use cedoc_config::Config;
use clap::Args;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the link command.
#[derive(Args)]
pub(crate) struct LinkArgs {
    /// Source file (default: read from stdin).
    file: Option<PathBuf>,

    /// Language tag of the source: `cpp` or `c`.
    #[arg(short, long, default_value = "cpp")]
    lang: String,

    /// Path to configuration file (default: auto-discover cedoc.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl LinkArgs {
    /// Execute the link command.
    ///
    /// # Errors
    ///
    /// Returns an error if the language is unsupported or the source cannot be read.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let profile = resolve_profile(&self.lang)?;
        let config = Config::load(self.config.as_deref(), None)?;
        let source = read_source(self.file.as_deref())?;

        let url = LinkSynthesizer::new(&config.explorer).link_url(&source, profile)?;
        output.result(&url)?;
        Ok(())
    }
}

fn resolve_profile(tag: &str) -> Result<&'static LanguageProfile, CliError> {
    LanguageProfile::lookup(tag).ok_or_else(|| {
        CliError::Validation(format!(
            "unsupported language '{tag}', expected one of: {}",
            cedoc_annotate::LANGUAGE_PROFILES
                .iter()
                .map(|p| format!("{} ({})", p.tag, p.display_name))
                .collect::<Vec<_>>()
                .join(", ")
        ))
    })
}

fn read_source(file: Option<&Path>) -> Result<String, CliError> {
    match file {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut source = String::new();
            std::io::stdin().read_to_string(&mut source)?;
            Ok(source)
        }
    }
}
