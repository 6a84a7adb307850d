//! Error types.
//!
//! [`RuleError`] describes a malformed rule and only ever drops that rule.
//! [`ResolveError`] describes a failed lookup of a channel or user through one
//! of the directory collaborators; callers decide per use whether it fails
//! open, fails closed, or is surfaced.

/// A rule that cannot be compiled.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// The match pattern is empty.
    #[error("pattern is empty")]
    EmptyPattern,
    /// A required template is empty.
    #[error("{field} is empty")]
    EmptyTemplate {
        /// Config field name (e.g. `title_template`).
        field: &'static str,
    },
    /// The pattern is not a valid regular expression.
    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        /// Pattern as configured.
        pattern: String,
        /// Regex compilation error.
        #[source]
        source: regex::Error,
    },
}

/// Semantic categories for lookup failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResolveErrorKind {
    /// The channel, team or user does not exist.
    NotFound,
    /// The directory is temporarily unavailable.
    Unavailable,
    /// Other/unknown error category.
    Other,
}

/// A failed channel or user lookup.
#[derive(Debug)]
pub struct ResolveError {
    /// Semantic error category.
    pub kind: ResolveErrorKind,
    /// What was being resolved (e.g. `channel abc123`).
    pub subject: String,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ResolveError {
    /// Create a new resolve error.
    #[must_use]
    pub fn new(kind: ResolveErrorKind, subject: impl Into<String>) -> Self {
        Self {
            kind,
            subject: subject.into(),
            source: None,
        }
    }

    /// Create a not found error for `subject`.
    #[must_use]
    pub fn not_found(subject: impl Into<String>) -> Self {
        Self::new(ResolveErrorKind::NotFound, subject)
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind_str = match self.kind {
            ResolveErrorKind::NotFound => "Not found",
            ResolveErrorKind::Unavailable => "Unavailable",
            ResolveErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}: {}", self.subject)?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}
