//! Structural eligibility of document nodes.
//!
//! Decides, per node kind, whether a rule may rewrite a node:
//! - text nodes are eligible for create rules
//! - bare-URL autolinks are eligible for title rules unless the rule
//!   disables rewriting in hyperlinks
//! - links and images are never descended into
//! - code, raw HTML and `<url>` autolinks are never eligible

use std::ops::Range;

use autolink_config::RuleKind;
use autolink_markdown::{Document, NodeKind, Visit};

use crate::compiler::CompiledRule;

/// A node the rule may rewrite.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Span<'d> {
    /// Literal text recorded by the parser.
    pub text: &'d str,
    /// Byte range in the message the document was parsed from.
    pub range: Range<usize>,
}

/// Collect the spans of `document` that `rule` may rewrite, in document order.
pub fn eligible_spans<'d>(document: &'d Document, rule: &CompiledRule) -> Vec<Span<'d>> {
    let mut spans = Vec::new();

    document.walk(|node| match &node.kind {
        NodeKind::Document | NodeKind::Container => Visit::Descend,
        NodeKind::InlineLink
        | NodeKind::InlineImage
        | NodeKind::ReferenceLink
        | NodeKind::ReferenceImage => Visit::Skip,
        NodeKind::Text(text) => {
            if rule.kind() == RuleKind::Create {
                spans.push(Span {
                    text,
                    range: node.range.clone(),
                });
            }
            Visit::Skip
        }
        NodeKind::Autolink { destination } => {
            if rule.kind() == RuleKind::Title && !rule.disable_in_hyperlinks() {
                spans.push(Span {
                    text: destination,
                    range: node.range.clone(),
                });
            }
            Visit::Skip
        }
        NodeKind::AngleAutolink
        | NodeKind::CodeSpan
        | NodeKind::CodeBlock
        | NodeKind::Html
        | NodeKind::Break
        | NodeKind::Marker => Visit::Skip,
    });

    spans
}
