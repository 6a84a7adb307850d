//! Rule compilation and regex replacement.
//!
//! A [`CompiledRule`] pairs a regex with a Markdown link template:
//! - title rules render `[<title_template>](<url_template or $0>)`
//! - create rules render `[$0](<url_template>)`
//!
//! Templates use the `regex` crate expansion syntax: `$0` for the whole
//! match, `$1`… for positional groups and `$name` / `${name}` for named
//! groups.

use std::borrow::Cow;

use autolink_config::{RuleDefinition, RuleKind};
use regex::Regex;

use crate::error::RuleError;
use crate::scope::Scope;

/// Template reproducing the whole match.
const WHOLE_MATCH: &str = "$0";

/// Executable form of a [`RuleDefinition`].
#[derive(Debug)]
pub struct CompiledRule {
    name: String,
    kind: RuleKind,
    pattern: Regex,
    template: String,
    scope: Scope,
    disable_in_hyperlinks: bool,
}

impl CompiledRule {
    /// Compile a rule definition.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError`] if the pattern or a required template is empty,
    /// or if the pattern is not a valid regular expression.
    pub fn compile(definition: &RuleDefinition) -> Result<Self, RuleError> {
        if definition.pattern.is_empty() {
            return Err(RuleError::EmptyPattern);
        }

        let template = match definition.kind {
            RuleKind::Title => {
                require_template(&definition.title_template, "title_template")?;
                let url = if definition.url_template.is_empty() {
                    WHOLE_MATCH
                } else {
                    &definition.url_template
                };
                format!("[{}]({url})", definition.title_template)
            }
            RuleKind::Create => {
                require_template(&definition.url_template, "url_template")?;
                format!("[{WHOLE_MATCH}]({})", definition.url_template)
            }
        };

        let pattern = Regex::new(&definition.pattern).map_err(|source| RuleError::InvalidPattern {
            pattern: definition.pattern.clone(),
            source,
        })?;

        Ok(Self {
            name: definition.display_name().to_owned(),
            kind: definition.kind,
            pattern,
            template,
            scope: Scope::parse(&definition.scope),
            disable_in_hyperlinks: definition.disable_in_hyperlinks,
        })
    }

    /// Replace every non-overlapping match in `text` with the rendered template.
    ///
    /// Returns `Cow::Borrowed` when nothing matched.
    pub fn replace<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.pattern.replace_all(text, self.template.as_str())
    }

    /// Name for log output.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rule flavor.
    #[must_use]
    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    /// Rendered link template.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Teams and channels the rule applies to.
    #[must_use]
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Whether autolinks are skipped for this rule.
    #[must_use]
    pub fn disable_in_hyperlinks(&self) -> bool {
        self.disable_in_hyperlinks
    }
}

fn require_template(value: &str, field: &'static str) -> Result<(), RuleError> {
    if value.is_empty() {
        return Err(RuleError::EmptyTemplate { field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const JIRA_URL: &str = "https://mattermost.atlassian.net/browse/MM-$jira_id";
    const JIRA_LINK: &str = "[MM-12345](https://mattermost.atlassian.net/browse/MM-12345)";

    fn create(pattern: &str, url: &str) -> CompiledRule {
        CompiledRule::compile(&RuleDefinition::create(pattern, url)).unwrap()
    }

    fn title(pattern: &str, title_template: &str) -> CompiledRule {
        CompiledRule::compile(&RuleDefinition::title(pattern, title_template)).unwrap()
    }

    #[test]
    fn test_create_template() {
        let rule = create("Mattermost", "https://mattermost.com");
        assert_eq!(rule.template(), "[$0](https://mattermost.com)");
        assert_eq!(rule.kind(), RuleKind::Create);
    }

    #[test]
    fn test_title_template_defaults_url_to_match() {
        let rule = title("https://mattermost\\.com", "Mattermost");
        assert_eq!(rule.template(), "[Mattermost]($0)");
    }

    #[test]
    fn test_title_template_with_url() {
        let definition = RuleDefinition::title("x", "X").with_url_template("https://y");
        let rule = CompiledRule::compile(&definition).unwrap();
        assert_eq!(rule.template(), "[X](https://y)");
    }

    #[test]
    fn test_create_replace_simple() {
        let rule = create("Mattermost", "https://mattermost.com");
        assert_eq!(
            rule.replace("Welcome to Mattermost!"),
            "Welcome to [Mattermost](https://mattermost.com)!"
        );
    }

    #[test]
    fn test_create_replace_every_occurrence() {
        let rule = create("(?P<key>Mattermost)", "https://mattermost.com");
        assert_eq!(
            rule.replace("Welcome to Mattermost and have fun with Mattermost!"),
            "Welcome to [Mattermost](https://mattermost.com) and have fun with [Mattermost](https://mattermost.com)!"
        );
    }

    #[test]
    fn test_create_named_group() {
        let rule = create(r"MM-(?P<jira_id>\d+)", JIRA_URL);
        assert_eq!(
            rule.replace("Welcome MM-12345 should link!"),
            format!("Welcome {JIRA_LINK} should link!")
        );
        assert_eq!(
            rule.replace("Link in brackets should link (see MM-12345)"),
            format!("Link in brackets should link (see {JIRA_LINK})")
        );
        assert_eq!(
            rule.replace("MM-12345 should link!"),
            format!("{JIRA_LINK} should link!")
        );
    }

    #[test]
    fn test_create_word_boundaries() {
        let rule = create(r"\bMM-(?P<jira_id>\d+)\b", JIRA_URL);
        assert_eq!(
            rule.replace("WelcomeMM-12345should not link!"),
            "WelcomeMM-12345should not link!"
        );
        assert_eq!(
            rule.replace("MM-12345, (MM-12345), notMM-12345though, and:MM-12345"),
            format!("{JIRA_LINK}, ({JIRA_LINK}), notMM-12345though, and:{JIRA_LINK}")
        );
    }

    #[test]
    fn test_title_replace() {
        let rule = title(
            r"https://mattermost.atlassian.net/browse/MM-(?P<jira_id>\d+)",
            "MM-$jira_id",
        );
        assert_eq!(
            rule.replace("Welcome https://mattermost.atlassian.net/browse/MM-12345. should link!"),
            format!("Welcome {JIRA_LINK}. should link!")
        );
        assert_eq!(
            rule.replace(
                "https://mattermost.atlassian.net/browse/MM-12345 https://mattermost.atlassian.net/browse/MM-12345"
            ),
            format!("{JIRA_LINK} {JIRA_LINK}")
        );
    }

    #[test]
    fn test_title_replace_with_url_template() {
        let definition = RuleDefinition::title(
            r"https://mattermost(.atlassian.net)?/browse/MM-(?P<jira_id>\d+)",
            "MM-$jira_id",
        )
        .with_url_template(JIRA_URL);
        let rule = CompiledRule::compile(&definition).unwrap();
        assert_eq!(
            rule.replace(
                "Both https://mattermost.atlassian.net/browse/MM-12345 and https://mattermost/browse/MM-12345 work"
            ),
            format!("Both {JIRA_LINK} and {JIRA_LINK} work")
        );
    }

    #[test]
    fn test_no_match_is_borrowed() {
        let rule = create("Mattermost", "https://mattermost.com");
        assert!(matches!(rule.replace("nothing here"), Cow::Borrowed("nothing here")));
    }

    #[test]
    fn test_create_errors() {
        for definition in [
            RuleDefinition::create("", ""),
            RuleDefinition::create("", "blah"),
            RuleDefinition::create("blah", ""),
        ] {
            assert!(CompiledRule::compile(&definition).is_err(), "{definition:?}");
        }
    }

    #[test]
    fn test_title_errors() {
        for definition in [
            RuleDefinition::title("", ""),
            RuleDefinition::title("", "blah"),
            RuleDefinition::title("blah", ""),
        ] {
            assert!(CompiledRule::compile(&definition).is_err(), "{definition:?}");
        }
    }

    #[test]
    fn test_title_rule_reports_empty_title_template() {
        let definition = RuleDefinition::title("blah", "");
        let err = CompiledRule::compile(&definition).unwrap_err();
        assert!(matches!(
            err,
            RuleError::EmptyTemplate {
                field: "title_template"
            }
        ));
    }

    #[test]
    fn test_invalid_regex() {
        let err = CompiledRule::compile(&RuleDefinition::create("MM-(", "https://x")).unwrap_err();
        assert!(matches!(err, RuleError::InvalidPattern { .. }));
        assert!(err.to_string().contains("MM-("));
    }

    #[test]
    fn test_metadata_carried_over() {
        let definition = RuleDefinition::create("x", "https://x")
            .with_name("ex")
            .with_scope(["TeamA"])
            .disabled_in_hyperlinks();
        let rule = CompiledRule::compile(&definition).unwrap();
        assert_eq!(rule.name(), "ex");
        assert!(!rule.scope().is_global());
        assert!(rule.disable_in_hyperlinks());
    }
}
