//! cedoc CLI - Compiler Explorer links for rendered documentation.
//!
//! Provides commands for:
//! - `annotate`: Add links to C and C++ code blocks of built HTML pages
//! - `link`: Print the Compiler Explorer link for a source file
//! - `decode`: Show the session descriptor behind a link

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{AnnotateArgs, DecodeArgs, LinkArgs};
use output::Output;

/// cedoc - Compiler Explorer links for rendered documentation.
#[derive(Parser)]
#[command(name = "cedoc", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add Compiler Explorer links to code blocks of HTML pages.
    Annotate(AnnotateArgs),
    /// Print the Compiler Explorer link for a source file.
    Link(LinkArgs),
    /// Decode a Compiler Explorer client-state link.
    Decode(DecodeArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = matches!(&cli.command, Commands::Annotate(args) if args.verbose);

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Annotate(args) => args.execute(),
        Commands::Link(args) => args.execute(),
        Commands::Decode(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
