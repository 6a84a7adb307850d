//! `autolink admin` command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use autolink_config::Config;
use autolink_core::Autolinker;
use clap::Args;

use crate::directory::{DirectoryArgs, StaticDirectory};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the admin command.
#[derive(Args)]
pub(crate) struct AdminArgs {
    /// User identifier to check.
    user_id: String,

    /// Path to configuration file (default: auto-discover autolink.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    directory: DirectoryArgs,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl AdminArgs {
    /// Execute the admin command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the user cannot be resolved.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), None)?;
        let directory = Arc::new(StaticDirectory::from_args(&self.directory));
        let locations = Arc::clone(&directory);
        let linker = Autolinker::new(locations, directory);
        linker.reload(&config);

        if linker.is_authorized_admin(&self.user_id)? {
            output.ok(&format!("{} may manage autolink rules", self.user_id));
        } else {
            output.warn(&format!("{} may not manage autolink rules", self.user_id));
        }
        Ok(())
    }
}
