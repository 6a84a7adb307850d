//! Markdown-aware message rewriting for chat autolinks.
//!
//! This crate turns regex matches in chat messages into Markdown links
//! while leaving code, raw HTML and existing links untouched:
//! - [`CompiledRule`]: a regex plus a rendered link template
//! - [`Generation`]: the immutable rule set built from one [`Config`]
//! - [`Autolinker`]: the create/update/admin entry points
//!
//! # Architecture
//!
//! Each rule is applied in configured order. For every rule the current
//! message is parsed into an [`autolink_markdown::Document`], eligible spans
//! are collected by node kind, and the regex replacement is spliced back at
//! the span's byte range shifted by the running length delta.
//!
//! Team and channel names are resolved through [`LocationResolver`] and
//! authors through [`IdentityResolver`]; the host supplies both.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use autolink_config::{Config, RuleDefinition};
//! use autolink_core::{
//!     Autolinker, ChannelInfo, IdentityResolver, LocationResolver, Post, ResolveError, UserInfo,
//! };
//!
//! struct Directory;
//!
//! impl LocationResolver for Directory {
//!     fn channel(&self, channel_id: &str) -> Result<ChannelInfo, ResolveError> {
//!         Err(ResolveError::not_found(channel_id))
//!     }
//! }
//!
//! impl IdentityResolver for Directory {
//!     fn user(&self, _user_id: &str) -> Result<UserInfo, ResolveError> {
//!         Ok(UserInfo::default())
//!     }
//! }
//!
//! let directory = Arc::new(Directory);
//! let locations = Arc::clone(&directory);
//! let linker = Autolinker::new(locations, directory);
//! linker.reload(&Config {
//!     rules: vec![RuleDefinition::create(r"MM-(?P<id>\d+)", "https://jira/MM-$id")],
//!     ..Config::default()
//! });
//!
//! let result = linker.rewrite_on_create(&Post::new("See MM-42, not `MM-42`", "u1", "c1"));
//! assert_eq!(result.message, "See [MM-42](https://jira/MM-42), not `MM-42`");
//! ```
//!
//! [`Config`]: autolink_config::Config

mod compiler;
mod directory;
mod engine;
mod error;
mod generation;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod rewriter;
mod scanner;
mod scope;

pub use compiler::CompiledRule;
pub use directory::{ChannelInfo, IdentityResolver, LocationResolver, SYSTEM_ADMIN_ROLE, UserInfo};
pub use engine::{Autolinker, Post, Rewrite};
pub use error::{ResolveError, ResolveErrorKind, RuleError};
pub use generation::{Generation, GenerationStore, SkippedRule};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockDirectory;
pub use rewriter::{apply_rule, apply_rules};
pub use scanner::{Span, eligible_spans};
pub use scope::{Location, Scope};
