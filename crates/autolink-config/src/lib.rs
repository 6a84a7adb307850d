//! Configuration management for autolink.
//!
//! Parses `autolink.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! The crate only describes rules. Compiling them into executable matchers is
//! done by `autolink-core`, which drops individual malformed rules instead of
//! rejecting the whole file. Loading therefore only fails for problems that
//! affect the file as a whole (missing file, invalid TOML, duplicate names).
//!
//! ## Example
//!
//! ```toml
//! enable_on_update = true
//! admin_user_ids = ["8fqa3iyuypbxjb3iwjmhicumch"]
//!
//! [[rules]]
//! kind = "create"
//! name = "jira"
//! pattern = 'MM-(?P<jira_id>\d+)'
//! url_template = "https://tracker/browse/MM-$jira_id"
//! scope = ["engineering/town-square"]
//!
//! [[rules]]
//! kind = "title"
//! pattern = 'https://mattermost\.com'
//! title_template = "Mattermost"
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the rewrite-on-edit flag.
    pub enable_on_update: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "autolink.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Whether edited messages are rewritten as well as new ones.
    pub enable_on_update: bool,
    /// Users allowed to manage rules in addition to system administrators.
    pub admin_user_ids: Vec<String>,
    /// Ordered rule definitions. Rules are applied in this order.
    pub rules: Vec<RuleDefinition>,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Flavor of a rewrite rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Matches URL-shaped autolinks and gives them a display title.
    Title,
    /// Matches plain text and turns it into a link.
    Create,
}

impl RuleKind {
    /// Lowercase name as used in the config file.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Create => "create",
        }
    }
}

/// A single rule as written in the config file.
///
/// Template fields default to empty strings so that an incomplete rule
/// still parses; the compiler reports it as a per-rule error later.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RuleDefinition {
    /// Rule flavor.
    pub kind: RuleKind,
    /// Optional human-readable name used in logs.
    #[serde(default)]
    pub name: String,
    /// Regular expression matched against text or autolink destinations.
    #[serde(default)]
    pub pattern: String,
    /// Display title template (title rules only).
    #[serde(default)]
    pub title_template: String,
    /// Link destination template. Required for create rules, optional for
    /// title rules (defaults to the whole match).
    #[serde(default)]
    pub url_template: String,
    /// `"team"` or `"team/channel"` tokens. Empty means everywhere.
    #[serde(default)]
    pub scope: Vec<String>,
    /// Skip autolinks (bare URLs) for this rule.
    #[serde(default)]
    pub disable_in_hyperlinks: bool,
    /// Keep the rule in the file but do not apply it.
    #[serde(default)]
    pub disabled: bool,
}

impl RuleDefinition {
    /// Create a title rule definition.
    #[must_use]
    pub fn title(pattern: impl Into<String>, title_template: impl Into<String>) -> Self {
        Self {
            title_template: title_template.into(),
            ..Self::empty(RuleKind::Title, pattern.into())
        }
    }

    /// Create a create-rule definition.
    #[must_use]
    pub fn create(pattern: impl Into<String>, url_template: impl Into<String>) -> Self {
        Self {
            url_template: url_template.into(),
            ..Self::empty(RuleKind::Create, pattern.into())
        }
    }

    fn empty(kind: RuleKind, pattern: String) -> Self {
        Self {
            kind,
            name: String::new(),
            pattern,
            title_template: String::new(),
            url_template: String::new(),
            scope: Vec::new(),
            disable_in_hyperlinks: false,
            disabled: false,
        }
    }

    /// Set the rule name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the destination template.
    #[must_use]
    pub fn with_url_template(mut self, url_template: impl Into<String>) -> Self {
        self.url_template = url_template.into();
        self
    }

    /// Restrict the rule to the given scope tokens.
    #[must_use]
    pub fn with_scope<I, S>(mut self, scope: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope = scope.into_iter().map(Into::into).collect();
        self
    }

    /// Skip autolinks for this rule.
    #[must_use]
    pub fn disabled_in_hyperlinks(mut self) -> Self {
        self.disable_in_hyperlinks = true;
        self
    }

    /// Name for log output: the configured name, or the pattern if unnamed.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.pattern
        } else {
            &self.name
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `autolink.toml` in current directory and parents.
    /// Without any file the configuration is empty (no rules).
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Parse configuration from a TOML string and validate it.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(enable_on_update) = settings.enable_on_update {
            self.enable_on_update = enable_on_update;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&content)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_rule_names()?;
        self.validate_admin_ids()?;
        Ok(())
    }

    /// Rule names are optional but must be unique when given.
    fn validate_rule_names(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for rule in &self.rules {
            if !rule.name.is_empty() && !seen.insert(rule.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate rule name `{}`",
                    rule.name
                )));
            }
        }
        Ok(())
    }

    fn validate_admin_ids(&self) -> Result<(), ConfigError> {
        if self.admin_user_ids.iter().any(|id| id.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "admin_user_ids cannot contain empty entries".to_owned(),
            ));
        }
        Ok(())
    }
}
