//! Team and channel scoping of rules.
//!
//! A scope token is either `"team"` (every channel of the team) or
//! `"team/channel"` (exactly one channel). Names compare case-insensitively.
//! An empty scope applies everywhere.

use std::fmt;

use crate::directory::ChannelInfo;

/// Where a message was posted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Location {
    /// Channel name.
    pub channel: String,
    /// Team name. `None` for direct/group messages or when resolution failed.
    pub team: Option<String>,
}

impl Location {
    /// Create a location in a team channel.
    #[must_use]
    pub fn new(team: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            team: Some(team.into()),
        }
    }

    /// Location used when the channel could not be resolved.
    ///
    /// Only unscoped rules apply here.
    #[must_use]
    pub fn unresolved() -> Self {
        Self::default()
    }
}

impl From<ChannelInfo> for Location {
    fn from(info: ChannelInfo) -> Self {
        Self {
            channel: info.name,
            team: info.team_name,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum ScopeEntry {
    Team(String),
    Channel { team: String, channel: String },
    /// Malformed token. Never matches.
    Invalid(String),
}

impl ScopeEntry {
    fn parse(token: &str) -> Self {
        let mut parts = token.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(team), None, None) if !team.is_empty() => Self::Team(team.to_owned()),
            (Some(team), Some(channel), None) if !team.is_empty() && !channel.is_empty() => {
                Self::Channel {
                    team: team.to_owned(),
                    channel: channel.to_owned(),
                }
            }
            _ => Self::Invalid(token.to_owned()),
        }
    }

    fn matches(&self, team: &str, channel: &str) -> bool {
        match self {
            Self::Team(t) => eq_fold(t, team),
            Self::Channel {
                team: t,
                channel: c,
            } => eq_fold(t, team) && eq_fold(c, channel),
            Self::Invalid(_) => false,
        }
    }
}

/// Set of teams and channels a rule is restricted to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scope {
    entries: Vec<ScopeEntry>,
}

impl Scope {
    /// Parse scope tokens.
    ///
    /// Malformed tokens (empty, empty team or channel, more than one `/`)
    /// are kept but never match; see [`invalid_tokens`](Self::invalid_tokens).
    pub fn parse<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            entries: tokens
                .into_iter()
                .map(|t| ScopeEntry::parse(t.as_ref()))
                .collect(),
        }
    }

    /// Whether the scope is empty (applies everywhere).
    #[must_use]
    pub fn is_global(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tokens that could not be parsed.
    pub fn invalid_tokens(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|entry| match entry {
            ScopeEntry::Invalid(token) => Some(token.as_str()),
            _ => None,
        })
    }

    /// Whether a rule with this scope applies at `location`.
    ///
    /// Locations without a team only satisfy a global scope.
    #[must_use]
    pub fn contains(&self, location: &Location) -> bool {
        if self.is_global() {
            return true;
        }
        let Some(team) = location.team.as_deref() else {
            return false;
        };
        self.entries
            .iter()
            .any(|entry| entry.matches(team, &location.channel))
    }
}

impl fmt::Display for ScopeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Team(team) => f.write_str(team),
            Self::Channel { team, channel } => write!(f, "{team}/{channel}"),
            Self::Invalid(token) => write!(f, "{token:?}"),
        }
    }
}

/// Comma-separated tokens as configured. Invalid tokens are quoted.
impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}

/// Case-insensitive comparison under Unicode lowercase folding.
fn eq_fold(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}
