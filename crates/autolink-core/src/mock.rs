//! Mock directory implementation for testing.
//!
//! Provides [`MockDirectory`] for unit testing without a chat server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::directory::{ChannelInfo, IdentityResolver, LocationResolver, UserInfo};
use crate::error::{ResolveError, ResolveErrorKind};

/// In-memory directory of channels and users.
///
/// Unknown channels and users resolve to [`ResolveErrorKind::NotFound`].
/// Identifiers registered with [`with_unavailable`](Self::with_unavailable)
/// fail with [`ResolveErrorKind::Unavailable`]. Lookups are counted.
///
/// # Example
///
/// ```ignore
/// use autolink_core::MockDirectory;
///
/// let directory = MockDirectory::new()
///     .with_channel("c1", Some("TeamA"), "general")
///     .with_user("u1", &["system_user"])
///     .with_bot("bot1");
/// ```
#[derive(Debug, Default)]
pub struct MockDirectory {
    channels: HashMap<String, ChannelInfo>,
    users: HashMap<String, UserInfo>,
    unavailable: Vec<String>,
    channel_lookups: AtomicUsize,
    user_lookups: AtomicUsize,
}

impl MockDirectory {
    /// Create a new empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a channel. `team` is `None` for direct messages.
    #[must_use]
    pub fn with_channel(mut self, id: &str, team: Option<&str>, name: &str) -> Self {
        self.channels.insert(
            id.to_owned(),
            ChannelInfo {
                name: name.to_owned(),
                team_name: team.map(str::to_owned),
            },
        );
        self
    }

    /// Add a human user with the given roles.
    #[must_use]
    pub fn with_user(mut self, id: &str, roles: &[&str]) -> Self {
        self.users.insert(
            id.to_owned(),
            UserInfo {
                roles: roles.iter().map(|r| (*r).to_owned()).collect(),
                is_bot: false,
            },
        );
        self
    }

    /// Add an automated account.
    #[must_use]
    pub fn with_bot(mut self, id: &str) -> Self {
        self.users.insert(
            id.to_owned(),
            UserInfo {
                roles: Vec::new(),
                is_bot: true,
            },
        );
        self
    }

    /// Make lookups of `id` (channel or user) fail as unavailable.
    #[must_use]
    pub fn with_unavailable(mut self, id: &str) -> Self {
        self.unavailable.push(id.to_owned());
        self
    }

    /// Number of channel lookups performed.
    #[must_use]
    pub fn channel_lookups(&self) -> usize {
        self.channel_lookups.load(Ordering::Relaxed)
    }

    /// Number of user lookups performed.
    #[must_use]
    pub fn user_lookups(&self) -> usize {
        self.user_lookups.load(Ordering::Relaxed)
    }

    fn check_available(&self, id: &str, subject: &str) -> Result<(), ResolveError> {
        if self.unavailable.iter().any(|u| u == id) {
            return Err(ResolveError::new(ResolveErrorKind::Unavailable, subject));
        }
        Ok(())
    }
}

impl LocationResolver for MockDirectory {
    fn channel(&self, channel_id: &str) -> Result<ChannelInfo, ResolveError> {
        self.channel_lookups.fetch_add(1, Ordering::Relaxed);
        let subject = format!("channel {channel_id}");
        self.check_available(channel_id, &subject)?;
        self.channels
            .get(channel_id)
            .cloned()
            .ok_or_else(|| ResolveError::not_found(subject))
    }
}

impl IdentityResolver for MockDirectory {
    fn user(&self, user_id: &str) -> Result<UserInfo, ResolveError> {
        self.user_lookups.fetch_add(1, Ordering::Relaxed);
        let subject = format!("user {user_id}");
        self.check_available(user_id, &subject)?;
        self.users
            .get(user_id)
            .cloned()
            .ok_or_else(|| ResolveError::not_found(subject))
    }
}
