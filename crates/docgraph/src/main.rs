//! docgraph CLI - Document graph engine.
//!
//! Provides commands for:
//! - `check`: Aggregate every category and report problems
//! - `tree`: Print the document hierarchy
//! - `show`: Print one document as JSON
//! - `children`: Run a filtered children query

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CheckArgs, ChildrenArgs, ShowArgs, TreeArgs};
use output::Output;

/// docgraph - Document graph engine for multi-version documentation.
#[derive(Parser)]
#[command(name = "docgraph", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate all categories and report problems.
    Check(CheckArgs),
    /// Print the document hierarchy.
    Tree(TreeArgs),
    /// Print a document as JSON.
    Show(ShowArgs),
    /// List the children of a document.
    Children(ChildrenArgs),
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Self::Check(args) => args.content.verbose,
            Self::Tree(args) => args.content.verbose,
            Self::Show(args) => args.content.verbose,
            Self::Children(args) => args.content.verbose,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.command.verbose() {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Check(args) => args.execute(),
        Commands::Tree(args) => args.execute(),
        Commands::Show(args) => args.execute(),
        Commands::Children(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
