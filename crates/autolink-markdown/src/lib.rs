//! Markdown structure tree with source byte ranges.
//!
//! This crate parses a chat message into a small, closed set of node kinds
//! ([`NodeKind`]) that matter for link rewriting. Every node remembers the
//! byte range it occupies in the *original* input so callers can splice
//! replacement text back into the message without re-rendering it.
//!
//! # Architecture
//!
//! Parsing is delegated to `pulldown-cmark` (with its offset iterator). The
//! event stream is folded into a tree:
//! - Adjacent verbatim text events are merged into one [`NodeKind::Text`]
//! - Bare URLs inside text are split out as [`NodeKind::Autolink`] nodes
//! - Code, raw HTML and `<url>` autolinks become leaves with no text children
//!
//! # Example
//!
//! ```
//! use autolink_markdown::{Document, NodeKind, Visit};
//!
//! let doc = Document::parse("See `code` and https://example.com");
//! let mut autolinks = Vec::new();
//! doc.walk(|node| {
//!     if let NodeKind::Autolink { destination } = &node.kind {
//!         autolinks.push(destination.clone());
//!     }
//!     Visit::Descend
//! });
//!
//! assert_eq!(autolinks, vec!["https://example.com".to_owned()]);
//! ```

mod bare_url;
mod tree;

pub use tree::{Document, Node, NodeKind, Visit};
