//! Offset-tracking rewriter.
//!
//! Each rule gets a fresh parse of the current message. Eligible spans are
//! rewritten in document order; a running byte delta maps the original span
//! ranges onto the message as it is being modified. The message is never
//! re-parsed in the middle of a rule's pass.

use std::borrow::Cow;
use std::ops::Range;

use autolink_markdown::Document;

use crate::compiler::CompiledRule;
use crate::scanner::{Span, eligible_spans};
use crate::scope::Location;

/// Mutable state of one rule's pass over one message.
struct RewriteState<'m> {
    message: Cow<'m, str>,
    /// Bytes added (positive) or removed (negative) so far.
    delta: isize,
}

impl<'m> RewriteState<'m> {
    fn new(message: &'m str) -> Self {
        Self {
            message: Cow::Borrowed(message),
            delta: 0,
        }
    }

    /// Position of `range` in the current message.
    fn shifted(&self, range: &Range<usize>) -> Option<Range<usize>> {
        let start = range.start.checked_add_signed(self.delta)?;
        let end = range.end.checked_add_signed(self.delta)?;
        Some(start..end)
    }

    fn rewrite_span(&mut self, span: &Span<'_>, rule: &CompiledRule) {
        let live = self
            .shifted(&span.range)
            .and_then(|range| Some((self.message.get(range.clone())?, range)));
        let Some((live, range)) = live else {
            tracing::warn!(
                rule = rule.name(),
                expected = span.text,
                start = span.range.start,
                end = span.range.end,
                delta = self.delta,
                "Markdown range is outside the message"
            );
            return;
        };

        if live != span.text {
            tracing::warn!(
                rule = rule.name(),
                expected = span.text,
                found = live,
                "Markdown text did not match range text"
            );
            return;
        }

        let replaced = match rule.replace(live) {
            Cow::Owned(replaced) if replaced != live => replaced,
            _ => return,
        };

        let old_len = range.len();
        self.message.to_mut().replace_range(range, &replaced);
        self.delta += len_delta(replaced.len(), old_len);
    }
}

/// Signed difference `new - old` between two string lengths.
#[allow(clippy::cast_possible_wrap)] // String lengths never exceed isize::MAX
fn len_delta(new: usize, old: usize) -> isize {
    new as isize - old as isize
}

/// Apply one rule to `message`.
///
/// Returns `Cow::Borrowed` when the rule changed nothing.
pub fn apply_rule<'m>(message: &'m str, rule: &CompiledRule) -> Cow<'m, str> {
    let document = Document::parse(message);
    let spans = eligible_spans(&document, rule);
    if spans.is_empty() {
        return Cow::Borrowed(message);
    }

    let mut state = RewriteState::new(message);
    for span in &spans {
        state.rewrite_span(span, rule);
    }
    state.message
}

/// Apply `rules` in order to `message`, skipping rules scoped away from `location`.
pub fn apply_rules<'m>(
    message: &'m str,
    rules: &[CompiledRule],
    location: &Location,
) -> Cow<'m, str> {
    let mut current = Cow::Borrowed(message);
    for rule in rules {
        if !rule.scope().contains(location) {
            tracing::trace!(rule = rule.name(), "Rule out of scope");
            continue;
        }
        let next = match apply_rule(&current, rule) {
            Cow::Owned(next) => next,
            Cow::Borrowed(_) => continue,
        };
        current = Cow::Owned(next);
    }
    current
}
