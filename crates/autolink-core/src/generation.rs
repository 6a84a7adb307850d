//! Config generations.
//!
//! A [`Generation`] is the immutable result of compiling one [`Config`]:
//! the valid rules in configured order, the admin list and the update flag.
//! [`GenerationStore`] publishes generations atomically, so a message is
//! always processed against exactly one of them.
//!
//! # Thread Safety
//!
//! - `current()` returns `Arc<Generation>` with minimal locking (just Arc clone)
//! - `replace()` swaps the snapshot under a short write lock
//! - readers holding an older `Arc` keep using it until they drop it

use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use autolink_config::{Config, RuleKind};

use crate::compiler::CompiledRule;
use crate::error::RuleError;

/// Convert elapsed time to milliseconds as f64.
pub(crate) fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// A rule left out of a generation because it failed to compile.
#[derive(Debug)]
pub struct SkippedRule {
    /// Rule display name.
    pub name: String,
    /// Why it was skipped.
    pub error: RuleError,
}

/// Immutable rule set built from one configuration.
#[derive(Debug, Default)]
pub struct Generation {
    rules: Vec<CompiledRule>,
    admin_user_ids: HashSet<String>,
    enable_on_update: bool,
    skipped: Vec<SkippedRule>,
}

impl Generation {
    /// Compile every enabled rule of `config`.
    ///
    /// Invalid rules are logged and recorded in [`skipped`](Self::skipped);
    /// they never prevent the remaining rules from loading.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let start = Instant::now();
        let mut rules = Vec::with_capacity(config.rules.len());
        let mut skipped = Vec::new();

        for definition in &config.rules {
            let name = definition.display_name();
            if definition.disabled {
                tracing::debug!(rule = name, "Rule disabled");
                continue;
            }

            match CompiledRule::compile(definition) {
                Ok(rule) => {
                    for token in rule.scope().invalid_tokens() {
                        tracing::warn!(
                            rule = name,
                            token,
                            "Scope entry is not `team` or `team/channel`, it will never match"
                        );
                    }
                    rules.push(rule);
                }
                Err(error) => {
                    tracing::warn!(rule = name, %error, "Skipping invalid rule");
                    skipped.push(SkippedRule {
                        name: name.to_owned(),
                        error,
                    });
                }
            }
        }

        let generation = Self {
            rules,
            admin_user_ids: config.admin_user_ids.iter().cloned().collect(),
            enable_on_update: config.enable_on_update,
            skipped,
        };
        tracing::info!(
            rules = generation.rules.len(),
            create_rules = generation.count(RuleKind::Create),
            title_rules = generation.count(RuleKind::Title),
            skipped = generation.skipped.len(),
            enable_on_update = generation.enable_on_update,
            elapsed_ms = elapsed_ms(start),
            "Rules compiled"
        );
        generation
    }

    fn count(&self, kind: RuleKind) -> usize {
        self.rules.iter().filter(|rule| rule.kind() == kind).count()
    }

    /// Valid rules in configured order.
    #[must_use]
    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    /// Whether `user_id` is on the configured admin list.
    #[must_use]
    pub fn is_admin(&self, user_id: &str) -> bool {
        self.admin_user_ids.contains(user_id)
    }

    /// Whether edited messages are rewritten too.
    #[must_use]
    pub fn enable_on_update(&self) -> bool {
        self.enable_on_update
    }

    /// Rules that failed to compile.
    #[must_use]
    pub fn skipped(&self) -> &[SkippedRule] {
        &self.skipped
    }

    /// Whether any rule is restricted to particular teams or channels.
    #[must_use]
    pub fn has_scoped_rules(&self) -> bool {
        self.rules.iter().any(|rule| !rule.scope().is_global())
    }
}

/// Holder of the current [`Generation`].
#[derive(Debug)]
pub struct GenerationStore {
    /// Current generation (atomically swappable).
    current: RwLock<Arc<Generation>>,
}

impl GenerationStore {
    /// Create a store holding `generation`.
    #[must_use]
    pub fn new(generation: Generation) -> Self {
        Self {
            current: RwLock::new(Arc::new(generation)),
        }
    }

    /// Get the current generation snapshot.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn current(&self) -> Arc<Generation> {
        Arc::clone(&*self.current.read().unwrap())
    }

    /// Publish `generation`, returning the new snapshot.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    pub fn replace(&self, generation: Generation) -> Arc<Generation> {
        let generation = Arc::new(generation);
        *self.current.write().unwrap() = Arc::clone(&generation);
        generation
    }
}

impl Default for GenerationStore {
    fn default() -> Self {
        Self::new(Generation::default())
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use autolink_config::RuleDefinition;
    use pretty_assertions::assert_eq;
    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Generation: Send, Sync);
    assert_impl_all!(GenerationStore: Send, Sync);

    fn config(rules: Vec<RuleDefinition>) -> Config {
        Config {
            rules,
            ..Config::default()
        }
    }

    fn names(generation: &Generation) -> Vec<&str> {
        generation.rules().iter().map(CompiledRule::name).collect()
    }

    #[test]
    fn test_invalid_rules_skipped() {
        let generation = Generation::from_config(&config(vec![
            RuleDefinition::create("good", "https://g").with_name("first"),
            RuleDefinition::create("(", "https://bad").with_name("broken"),
            RuleDefinition::create("", "https://empty").with_name("empty"),
            RuleDefinition::title("https://x", "X").with_name("last"),
        ]));

        assert_eq!(names(&generation), vec!["first", "last"]);
        let skipped: Vec<&str> = generation.skipped().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(skipped, vec!["broken", "empty"]);
        assert!(matches!(
            generation.skipped()[0].error,
            RuleError::InvalidPattern { .. }
        ));
        assert!(matches!(generation.skipped()[1].error, RuleError::EmptyPattern));
    }

    #[test]
    fn test_disabled_rules_left_out() {
        let mut off = RuleDefinition::create("off", "https://off").with_name("off");
        off.disabled = true;
        let generation = Generation::from_config(&config(vec![
            off,
            RuleDefinition::create("on", "https://on").with_name("on"),
        ]));
        assert_eq!(names(&generation), vec!["on"]);
        assert!(generation.skipped().is_empty());
    }

    #[test]
    fn test_settings_carried_over() {
        let generation = Generation::from_config(&Config {
            enable_on_update: true,
            admin_user_ids: vec!["u1".to_owned(), "u2".to_owned()],
            ..Config::default()
        });
        assert!(generation.enable_on_update());
        assert!(generation.is_admin("u2"));
        assert!(!generation.is_admin("u3"));
        assert!(!generation.has_scoped_rules());
    }

    #[test]
    fn test_has_scoped_rules() {
        let generation = Generation::from_config(&config(vec![
            RuleDefinition::create("a", "https://a"),
            RuleDefinition::create("b", "https://b").with_scope(["TeamA/general"]),
        ]));
        assert!(generation.has_scoped_rules());
    }

    #[test]
    fn test_same_pattern_rules_keep_their_own_scope() {
        let generation = Generation::from_config(&config(vec![
            RuleDefinition::create("Rust", "https://a").with_scope(["TeamA"]),
            RuleDefinition::create("Rust", "https://b").with_scope(["TeamB/dev"]),
        ]));
        let scopes: Vec<String> = generation
            .rules()
            .iter()
            .map(|rule| rule.scope().to_string())
            .collect();
        assert_eq!(scopes, vec!["TeamA", "TeamB/dev"]);
    }

    #[test]
    fn test_elapsed_ms_counts_from_start() {
        let start = Instant::now();
        thread::sleep(std::time::Duration::from_millis(2));
        assert!(elapsed_ms(start) >= 2.0);
    }

    #[test]
    fn test_empty_generation() {
        let generation = Generation::default();
        assert!(generation.rules().is_empty());
        assert!(!generation.enable_on_update());
        assert!(!generation.is_admin(""));
    }

    #[test]
    fn test_replace_keeps_old_snapshot_alive() {
        let store = GenerationStore::new(Generation::from_config(&config(vec![
            RuleDefinition::create("old", "https://old").with_name("old"),
        ])));
        let before = store.current();

        let after = store.replace(Generation::from_config(&config(vec![
            RuleDefinition::create("new", "https://new").with_name("new"),
        ])));

        assert_eq!(names(&before), vec!["old"]);
        assert_eq!(names(&after), vec!["new"]);
        assert_eq!(names(&store.current()), vec!["new"]);
    }

    #[test]
    fn test_concurrent_readers_see_whole_generations() {
        let store = Arc::new(GenerationStore::default());
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..200 {
                        let generation = store.current();
                        let rules = generation.rules();
                        // Every published generation has zero or two rules.
                        assert!(rules.is_empty() || rules.len() == 2);
                    }
                })
            })
            .collect();

        for i in 0..50 {
            store.replace(Generation::from_config(&config(vec![
                RuleDefinition::create(format!("a{i}"), "https://a"),
                RuleDefinition::create(format!("b{i}"), "https://b"),
            ])));
        }

        for reader in readers {
            reader.join().unwrap();
        }
    }
}
