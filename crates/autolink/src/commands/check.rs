//! `autolink check` command implementation.

use std::path::PathBuf;

use autolink_config::Config;
use autolink_core::Generation;
use clap::Args;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Path to configuration file (default: auto-discover autolink.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CheckArgs {
    /// Execute the check command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or any rule is invalid.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), None)?;
        match &config.config_path {
            Some(path) => output.heading(&format!("Rules from {}", path.display())),
            None => output.heading("No autolink.toml found, no rules configured"),
        }

        let generation = Generation::from_config(&config);
        for rule in generation.rules() {
            let scope = if rule.scope().is_global() {
                String::new()
            } else {
                format!(" (scope: {})", rule.scope())
            };
            output.status(&format!(
                "  [{:<6}] {} -> {}{scope}",
                rule.kind().as_str(),
                rule.name(),
                rule.template()
            ));
        }

        let disabled = config.rules.iter().filter(|d| d.disabled).count();
        if disabled > 0 {
            output.status(&format!("{disabled} rule(s) disabled"));
        }
        output.status(&format!(
            "Rewrite on edit: {}",
            if generation.enable_on_update() { "enabled" } else { "disabled" }
        ));

        if generation.skipped().is_empty() {
            output.ok(&format!("{} rule(s) OK", generation.rules().len()));
            return Ok(());
        }

        for skipped in generation.skipped() {
            output.fail(&format!("  {}: {}", skipped.name, skipped.error));
        }
        Err(CliError::Validation(format!(
            "{} invalid rule(s)",
            generation.skipped().len()
        )))
    }
}
