//! Directory built from command-line flags.

use autolink_core::{
    ChannelInfo, IdentityResolver, LocationResolver, ResolveError, ResolveErrorKind, UserInfo,
};
use clap::Args;

/// Where the message is posted and who wrote it.
#[derive(Args, Clone, Debug, Default)]
pub(crate) struct DirectoryArgs {
    /// Team name of the channel (omit for direct messages).
    #[arg(long, env = "AUTOLINK_TEAM")]
    team: Option<String>,

    /// Channel name. Without it scoped rules never apply.
    #[arg(long, env = "AUTOLINK_CHANNEL")]
    channel: Option<String>,

    /// Role held by the author (repeatable).
    #[arg(long = "role")]
    roles: Vec<String>,

    /// Treat the author as a bot account.
    #[arg(long)]
    bot: bool,

    /// Make user lookups fail, as if the chat server were unreachable.
    #[arg(long)]
    unresolved_user: bool,
}

/// Single-channel, single-user directory.
#[derive(Debug)]
pub(crate) struct StaticDirectory {
    channel: Option<ChannelInfo>,
    user: Option<UserInfo>,
}

impl StaticDirectory {
    pub(crate) fn from_args(args: &DirectoryArgs) -> Self {
        let channel = args.channel.as_ref().map(|name| ChannelInfo {
            name: name.clone(),
            team_name: args.team.clone(),
        });
        let user = (!args.unresolved_user).then(|| UserInfo {
            roles: args.roles.clone(),
            is_bot: args.bot,
        });
        Self { channel, user }
    }
}

impl LocationResolver for StaticDirectory {
    fn channel(&self, channel_id: &str) -> Result<ChannelInfo, ResolveError> {
        self.channel
            .clone()
            .ok_or_else(|| ResolveError::not_found(format!("channel {channel_id}")))
    }
}

impl IdentityResolver for StaticDirectory {
    fn user(&self, user_id: &str) -> Result<UserInfo, ResolveError> {
        self.user.clone().ok_or_else(|| {
            ResolveError::new(ResolveErrorKind::Unavailable, format!("user {user_id}"))
        })
    }
}
