//! `autolink rewrite` command implementation.

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use autolink_config::{CliSettings, Config};
use autolink_core::{Autolinker, Post};
use clap::Args;

use crate::directory::{DirectoryArgs, StaticDirectory};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the rewrite command.
#[derive(Args)]
pub(crate) struct RewriteArgs {
    /// Message to rewrite (default: read from stdin).
    message: Option<String>,

    /// Path to configuration file (default: auto-discover autolink.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Treat the message as an edit instead of a new post.
    #[arg(long)]
    update: bool,

    /// Rewrite edited messages (overrides config).
    #[arg(long)]
    enable_on_update: Option<bool>,

    /// Author identifier.
    #[arg(long, default_value = "cli-user")]
    user_id: String,

    /// Channel identifier.
    #[arg(long, default_value = "cli-channel")]
    channel_id: String,

    #[command(flatten)]
    directory: DirectoryArgs,

    /// Enable verbose output (rule compilation and rewrite logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl RewriteArgs {
    /// Execute the rewrite command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the message cannot be read.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            enable_on_update: self.enable_on_update,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "Configuration loaded");
        }

        let directory = Arc::new(StaticDirectory::from_args(&self.directory));
        let locations = Arc::clone(&directory);
        let linker = Autolinker::new(locations, directory);
        let generation = linker.reload(&config);
        for skipped in generation.skipped() {
            output.warn(&format!("Skipped rule {}: {}", skipped.name, skipped.error));
        }

        let message = match self.message {
            Some(message) => message,
            None => read_stdin()?,
        };
        let post = Post::new(message, self.user_id, self.channel_id);
        let result = if self.update {
            linker.rewrite_on_update(&post)
        } else {
            linker.rewrite_on_create(&post)
        };

        if let Some(reason) = &result.rejection {
            return Err(CliError::Validation(format!("Message rejected: {reason}")));
        }

        output.message(&result.message)?;
        Ok(())
    }
}

fn read_stdin() -> Result<String, CliError> {
    let mut message = String::new();
    std::io::stdin().read_to_string(&mut message)?;
    Ok(message)
}
