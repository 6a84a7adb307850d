//! Rewrite entry points.
//!
//! [`Autolinker`] ties a [`GenerationStore`] to the host's directory
//! collaborators and exposes the three operations the chat server calls:
//! rewriting a new message, rewriting an edited message, and checking
//! whether a user may manage rules.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Instant;

use autolink_config::Config;

use crate::directory::{IdentityResolver, LocationResolver, SYSTEM_ADMIN_ROLE};
use crate::error::ResolveError;
use crate::generation::{Generation, GenerationStore, elapsed_ms};
use crate::rewriter::apply_rules;
use crate::scope::Location;

/// A message as handed over by the chat server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Post {
    /// Markdown source.
    pub message: String,
    /// Author identifier.
    pub user_id: String,
    /// Channel identifier.
    pub channel_id: String,
}

impl Post {
    /// Create a post.
    #[must_use]
    pub fn new(
        message: impl Into<String>,
        user_id: impl Into<String>,
        channel_id: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            user_id: user_id.into(),
            channel_id: channel_id.into(),
        }
    }
}

/// Result of a rewrite entry point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rewrite {
    /// Message to store. Equal to the input when nothing applied.
    pub message: String,
    /// Reason the message must not be stored. Always `None` from this engine.
    pub rejection: Option<String>,
}

impl Rewrite {
    fn accepted(message: String) -> Self {
        Self {
            message,
            rejection: None,
        }
    }

    /// Whether the message differs from `original`.
    #[must_use]
    pub fn changed(&self, original: &str) -> bool {
        self.message != original
    }
}

/// Message rewriter bound to directory collaborators.
///
/// # Thread Safety
///
/// All methods take `&self`. Each call works on one [`Generation`] snapshot,
/// so a concurrent [`reload`](Self::reload) never mixes two configurations
/// within one message.
pub struct Autolinker {
    generations: GenerationStore,
    locations: Arc<dyn LocationResolver>,
    identities: Arc<dyn IdentityResolver>,
}

impl Autolinker {
    /// Create a rewriter with an empty rule set.
    #[must_use]
    pub fn new(locations: Arc<dyn LocationResolver>, identities: Arc<dyn IdentityResolver>) -> Self {
        Self {
            generations: GenerationStore::default(),
            locations,
            identities,
        }
    }

    /// Compile `config` and publish it as the current generation.
    pub fn reload(&self, config: &Config) -> Arc<Generation> {
        self.generations.replace(Generation::from_config(config))
    }

    /// Current generation snapshot.
    #[must_use]
    pub fn generation(&self) -> Arc<Generation> {
        self.generations.current()
    }

    /// Rewrite a newly created message.
    #[must_use]
    pub fn rewrite_on_create(&self, post: &Post) -> Rewrite {
        let generation = self.generations.current();
        self.process(&generation, post)
    }

    /// Rewrite an edited message.
    ///
    /// Returns the message unchanged unless rewriting on update is enabled.
    #[must_use]
    pub fn rewrite_on_update(&self, post: &Post) -> Rewrite {
        let generation = self.generations.current();
        if !generation.enable_on_update() {
            return Rewrite::accepted(post.message.clone());
        }
        self.process(&generation, post)
    }

    /// Whether `user_id` may manage rules.
    ///
    /// System administrators and users on the configured admin list qualify.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] if the user cannot be resolved.
    pub fn is_authorized_admin(&self, user_id: &str) -> Result<bool, ResolveError> {
        let user = self.identities.user(user_id)?;
        if user.has_role(SYSTEM_ADMIN_ROLE) {
            tracing::info!(user_id, "Authorized as system admin");
            return Ok(true);
        }
        if self.generations.current().is_admin(user_id) {
            tracing::info!(user_id, "Authorized by admin list");
            return Ok(true);
        }
        Ok(false)
    }

    fn process(&self, generation: &Generation, post: &Post) -> Rewrite {
        let start = Instant::now();
        let location = if generation.has_scoped_rules() {
            self.resolve_location(&post.channel_id)
        } else {
            Location::unresolved()
        };

        let message = match apply_rules(&post.message, generation.rules(), &location) {
            Cow::Owned(message) => message,
            Cow::Borrowed(_) => return Rewrite::accepted(post.message.clone()),
        };

        match self.identities.user(&post.user_id) {
            Ok(user) if user.is_bot => {
                tracing::debug!(user_id = %post.user_id, "Author is a bot, keeping original message");
                return Rewrite::accepted(post.message.clone());
            }
            Ok(_) => {}
            Err(error) => {
                tracing::warn!(user_id = %post.user_id, %error, "Failed to resolve author, keeping rewrite");
            }
        }

        tracing::debug!(
            channel_id = %post.channel_id,
            old_len = post.message.len(),
            new_len = message.len(),
            elapsed_ms = elapsed_ms(start),
            "Message rewritten"
        );
        Rewrite::accepted(message)
    }

    fn resolve_location(&self, channel_id: &str) -> Location {
        match self.locations.channel(channel_id) {
            Ok(info) => Location::from(info),
            Err(error) => {
                tracing::warn!(channel_id, %error, "Failed to resolve channel, scoped rules skipped");
                Location::unresolved()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use autolink_config::RuleDefinition;
    use pretty_assertions::assert_eq;
    use static_assertions::assert_impl_all;

    use super::*;
    use crate::directory::UserInfo;
    use crate::error::ResolveErrorKind;
    use crate::mock::MockDirectory;

    assert_impl_all!(Autolinker: Send, Sync);

    const LINK: &str = "[Mattermost](https://mattermost.com)";

    fn directory() -> MockDirectory {
        MockDirectory::new()
            .with_channel("c-a", Some("TeamA"), "town-square")
            .with_channel("c-b", Some("TeamB"), "off-topic")
            .with_channel("c-dm", None, "u1__u2")
            .with_user("u1", &["system_user"])
            .with_user("root", &["system_user", "system_admin"])
            .with_bot("bot")
            .with_unavailable("c-down")
            .with_unavailable("ghost")
    }

    fn unconfigured(directory: &Arc<MockDirectory>) -> Autolinker {
        let locations = Arc::clone(directory);
        let identities = Arc::clone(directory);
        Autolinker::new(locations, identities)
    }

    fn autolinker(directory: &Arc<MockDirectory>, config: &Config) -> Autolinker {
        let linker = unconfigured(directory);
        linker.reload(config);
        linker
    }

    fn rules_config(rules: Vec<RuleDefinition>) -> Config {
        Config {
            rules,
            ..Config::default()
        }
    }

    fn mattermost(scope: &[&str]) -> RuleDefinition {
        RuleDefinition::create("Mattermost", "https://mattermost.com").with_scope(scope.iter().copied())
    }

    fn create(linker: &Autolinker, user: &str, channel: &str, message: &str) -> String {
        linker.rewrite_on_create(&Post::new(message, user, channel)).message
    }

    #[test]
    fn test_rewrite_on_create() {
        let directory = Arc::new(directory());
        let linker = autolinker(&directory, &rules_config(vec![mattermost(&[])]));
        let result = linker.rewrite_on_create(&Post::new("Welcome to Mattermost!", "u1", "c-a"));
        assert_eq!(
            result,
            Rewrite {
                message: format!("Welcome to {LINK}!"),
                rejection: None,
            }
        );
        assert!(result.changed("Welcome to Mattermost!"));
        // Unscoped rules never need the channel.
        assert_eq!(directory.channel_lookups(), 0);
    }

    #[test]
    fn test_unchanged_message_skips_author_lookup() {
        let directory = Arc::new(directory());
        let linker = autolinker(&directory, &rules_config(vec![mattermost(&[])]));
        assert_eq!(create(&linker, "u1", "c-a", "nothing here"), "nothing here");
        assert_eq!(directory.user_lookups(), 0);
    }

    #[test]
    fn test_empty_rule_set() {
        let directory = Arc::new(directory());
        let linker = unconfigured(&directory);
        assert_eq!(create(&linker, "u1", "c-a", "Mattermost"), "Mattermost");
    }

    #[test]
    fn test_scopes() {
        struct Case {
            scope: &'static [&'static str],
            channel: &'static str,
            linked: bool,
        }
        let cases = [
            Case { scope: &["TeamA"], channel: "c-a", linked: true },
            Case { scope: &["teama"], channel: "c-a", linked: true },
            Case { scope: &["TeamA/Town-Square"], channel: "c-a", linked: true },
            Case { scope: &["TeamA/off-topic"], channel: "c-a", linked: false },
            Case { scope: &["TeamB"], channel: "c-a", linked: false },
            Case { scope: &["TeamB", "TeamA/town-square"], channel: "c-a", linked: true },
            Case { scope: &["TeamA"], channel: "c-dm", linked: false },
            Case { scope: &["TeamA"], channel: "c-down", linked: false },
            Case { scope: &["TeamA"], channel: "c-missing", linked: false },
            Case { scope: &["a/b/c"], channel: "c-a", linked: false },
        ];

        for case in cases {
            let directory = Arc::new(directory());
            let linker = autolinker(&directory, &rules_config(vec![mattermost(case.scope)]));
            let expected = if case.linked { LINK } else { "Mattermost" };
            assert_eq!(
                create(&linker, "u1", case.channel, "Mattermost"),
                expected,
                "scope {:?} in {}",
                case.scope,
                case.channel
            );
        }
    }

    #[test]
    fn test_failed_location_keeps_global_rules() {
        let directory = Arc::new(directory());
        let linker = autolinker(
            &directory,
            &rules_config(vec![
                mattermost(&["TeamA"]),
                RuleDefinition::create(r"MM-\d+", "https://jira/$0"),
            ]),
        );
        assert_eq!(
            create(&linker, "u1", "c-down", "Mattermost MM-1"),
            "Mattermost [MM-1](https://jira/MM-1)"
        );
    }

    #[test]
    fn test_location_resolved_once_per_message() {
        let directory = Arc::new(directory());
        let linker = autolinker(
            &directory,
            &rules_config(vec![
                mattermost(&["TeamA"]),
                RuleDefinition::create("Rust", "https://rust-lang.org").with_scope(["TeamA/town-square"]),
                RuleDefinition::create("Go", "https://go.dev").with_scope(["TeamB"]),
            ]),
        );
        assert_eq!(
            create(&linker, "u1", "c-a", "Mattermost Rust Go"),
            format!("{LINK} [Rust](https://rust-lang.org) Go")
        );
        assert_eq!(directory.channel_lookups(), 1);
    }

    #[test]
    fn test_bot_author_keeps_original() {
        let directory = Arc::new(directory());
        let linker = autolinker(&directory, &rules_config(vec![mattermost(&[])]));
        let message = "Mattermost and Mattermost";
        assert_eq!(create(&linker, "bot", "c-a", message), message);
        assert_eq!(directory.user_lookups(), 1);
    }

    #[test]
    fn test_unresolved_author_keeps_rewrite() {
        let directory = Arc::new(directory());
        let linker = autolinker(&directory, &rules_config(vec![mattermost(&[])]));
        assert_eq!(create(&linker, "ghost", "c-a", "Mattermost"), LINK);
        assert_eq!(create(&linker, "nobody", "c-a", "Mattermost"), LINK);
    }

    #[test]
    fn test_rewrite_on_update_disabled_by_default() {
        let directory = Arc::new(directory());
        let linker = autolinker(&directory, &rules_config(vec![mattermost(&[])]));
        let post = Post::new("Mattermost", "u1", "c-a");
        assert_eq!(linker.rewrite_on_update(&post).message, "Mattermost");
        assert_eq!(directory.user_lookups(), 0);
    }

    #[test]
    fn test_rewrite_on_update_enabled() {
        let directory = Arc::new(directory());
        let config = Config {
            enable_on_update: true,
            ..rules_config(vec![mattermost(&[])])
        };
        let linker = autolinker(&directory, &config);
        let post = Post::new("Mattermost", "u1", "c-a");
        assert_eq!(linker.rewrite_on_update(&post), linker.rewrite_on_create(&post));
        assert_eq!(linker.rewrite_on_update(&post).message, LINK);
    }

    #[test]
    fn test_reload_replaces_rules() {
        let directory = Arc::new(directory());
        let linker = autolinker(&directory, &rules_config(vec![mattermost(&[])]));
        let before = linker.generation();

        let generation = linker.reload(&rules_config(vec![RuleDefinition::create(
            "Rust",
            "https://rust-lang.org",
        )]));

        assert_eq!(generation.rules().len(), 1);
        assert_eq!(before.rules()[0].name(), "Mattermost");
        assert_eq!(create(&linker, "u1", "c-a", "Mattermost"), "Mattermost");
        assert_eq!(
            create(&linker, "u1", "c-a", "Rust"),
            "[Rust](https://rust-lang.org)"
        );
    }

    #[test]
    fn test_invalid_rule_does_not_block_others() {
        let directory = Arc::new(directory());
        let linker = autolinker(
            &directory,
            &rules_config(vec![
                RuleDefinition::create("(unclosed", "https://bad"),
                mattermost(&[]),
            ]),
        );
        assert_eq!(linker.generation().skipped().len(), 1);
        assert_eq!(create(&linker, "u1", "c-a", "Mattermost"), LINK);
    }

    #[test]
    fn test_is_authorized_admin() {
        let directory = Arc::new(directory());
        let config = Config {
            admin_user_ids: vec!["u1".to_owned()],
            ..Config::default()
        };
        let linker = autolinker(&directory, &config);

        assert!(linker.is_authorized_admin("root").unwrap());
        assert!(linker.is_authorized_admin("u1").unwrap());
        assert!(!linker.is_authorized_admin("bot").unwrap());
    }

    #[test]
    fn test_is_authorized_admin_surfaces_errors() {
        let directory = Arc::new(directory());
        let linker = autolinker(&directory, &Config::default());

        let err = linker.is_authorized_admin("ghost").unwrap_err();
        assert_eq!(err.kind, ResolveErrorKind::Unavailable);
        let err = linker.is_authorized_admin("nobody").unwrap_err();
        assert_eq!(err.kind, ResolveErrorKind::NotFound);
    }

    #[test]
    fn test_custom_resolver() {
        struct Everyone;
        impl IdentityResolver for Everyone {
            fn user(&self, _user_id: &str) -> Result<UserInfo, ResolveError> {
                Ok(UserInfo {
                    roles: vec![SYSTEM_ADMIN_ROLE.to_owned()],
                    is_bot: false,
                })
            }
        }

        let linker = Autolinker::new(Arc::new(MockDirectory::new()), Arc::new(Everyone));
        assert!(linker.is_authorized_admin("anyone").unwrap());
    }
}
