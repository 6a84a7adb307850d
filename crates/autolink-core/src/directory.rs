//! Directory collaborators: channel and user lookups.
//!
//! The rewrite engine never talks to the chat server directly. The host
//! supplies implementations of [`LocationResolver`] and [`IdentityResolver`];
//! both are synchronous and may fail with [`ResolveError`].

use crate::error::ResolveError;

/// Role that always grants rule management rights.
pub const SYSTEM_ADMIN_ROLE: &str = "system_admin";

/// Channel as seen by the scope filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelInfo {
    /// Channel name (not display name).
    pub name: String,
    /// Team name. `None` for direct and group messages.
    pub team_name: Option<String>,
}

/// User as seen by the bot check and the admin check.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserInfo {
    /// Role names held by the user.
    pub roles: Vec<String>,
    /// Whether the account is automated.
    pub is_bot: bool,
}

impl UserInfo {
    /// Whether the user holds `role`.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Resolves a channel identifier to its channel and team names.
pub trait LocationResolver: Send + Sync {
    /// Look up a channel.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] if the channel or its team cannot be resolved.
    fn channel(&self, channel_id: &str) -> Result<ChannelInfo, ResolveError>;
}

/// Resolves a user identifier to roles and account type.
pub trait IdentityResolver: Send + Sync {
    /// Look up a user.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] if the user cannot be resolved.
    fn user(&self, user_id: &str) -> Result<UserInfo, ResolveError>;
}
