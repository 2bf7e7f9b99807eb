//! `cedoc annotate` command implementation.

use std::path::PathBuf;

use cedoc_annotate::{Annotator, SiteProcessor, SiteStats};
use cedoc_config::{CliSettings, Config, TriggerMode};
use clap::Args;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the annotate command.
#[derive(Args)]
pub(crate) struct AnnotateArgs {
    /// HTML files or directories to annotate (default: site directory from config).
    paths: Vec<PathBuf>,

    /// Path to configuration file (default: auto-discover cedoc.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Site origin for include links (overrides config).
    #[arg(long)]
    origin: Option<String>,

    /// When links are added: `immediate` or `page-ready` (overrides config).
    #[arg(long, value_parser = parse_trigger)]
    trigger: Option<TriggerMode>,

    /// Do not mark annotated blocks; rerunning appends duplicate links.
    #[arg(long)]
    no_mark: bool,

    /// Report changes without writing files.
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose output (log each annotated page).
    #[arg(short, long)]
    pub verbose: bool,
}

impl AnnotateArgs {
    /// Execute the annotate command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or an input path is missing.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            origin: self.origin,
            trigger: self.trigger,
            mark_processed: self.no_mark.then_some(false),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        tracing::debug!(
            config = ?config.config_path,
            trigger = ?config.annotate.trigger,
            "Loaded configuration"
        );

        let paths = if self.paths.is_empty() {
            vec![config.site_resolved.dir.clone()]
        } else {
            self.paths
        };

        for path in &paths {
            output.info(&format!("Annotating {}...", path.display()));
        }

        let processor = SiteProcessor::new(Annotator::from_config(&config)).dry_run(self.dry_run);
        let stats = processor.process(&paths)?;

        print_stats(&output, &stats, self.dry_run);
        Ok(())
    }
}

/// Parse a trigger mode argument.
fn parse_trigger(value: &str) -> Result<TriggerMode, String> {
    TriggerMode::parse(value)
        .ok_or_else(|| format!("unknown trigger '{value}', expected 'immediate' or 'page-ready'"))
}

fn print_stats(output: &Output, stats: &SiteStats, dry_run: bool) {
    if dry_run {
        output.highlight("\n[DRY RUN] No files written.");
    }

    output.info(&format!(
        "Scanned {} page(s), {} changed",
        stats.files_scanned, stats.files_changed
    ));
    output.info(&format!(
        "Blocks: {} annotated, {} skipped",
        stats.blocks_annotated, stats.blocks_skipped
    ));
    if stats.includes_rewritten > 0 {
        output.info(&format!("Include links: {}", stats.includes_rewritten));
    }
    if !stats.unsupported_languages.is_empty() {
        output.warning(&format!(
            "Unsupported languages: {}",
            stats.unsupported_languages.join(", ")
        ));
    }
    if stats.files_failed > 0 {
        output.warning(&format!(
            "Failed to annotate {} page(s), run with --verbose or RUST_LOG=warn for details",
            stats.files_failed
        ));
    }

    if !dry_run && stats.files_changed > 0 {
        output.success(&format!("Annotated {} page(s)", stats.files_changed));
    }
}
