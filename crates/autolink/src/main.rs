//! Autolink CLI - Markdown autolink rewriter.
//!
//! Provides commands for:
//! - `rewrite`: Rewrite a message with the configured rules
//! - `check`: Compile the configured rules and report invalid ones
//! - `admin`: Check whether a user may manage rules

mod commands;
mod directory;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{AdminArgs, CheckArgs, RewriteArgs};
use output::Output;

/// Autolink - Markdown autolink rewriter.
#[derive(Parser)]
#[command(name = "autolink", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite a message (argument or stdin) and print the result.
    Rewrite(RewriteArgs),
    /// Compile the configured rules and list them.
    Check(CheckArgs),
    /// Check whether a user may manage rules.
    Admin(AdminArgs),
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Self::Rewrite(args) => args.verbose,
            Self::Check(args) => args.verbose,
            Self::Admin(args) => args.verbose,
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
        Commands::Rewrite(args) => args.execute(),
        Commands::Check(args) => args.execute(),
        Commands::Admin(args) => args.execute(),
    };

    if let Err(err) = result {
        output.fail(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
