//! Document tree built from the `pulldown-cmark` event stream.

use std::ops::Range;

use pulldown_cmark::{Event, LinkType, Options, Parser, Tag};

use crate::bare_url::{find_bare_urls, url_len};

/// Kind of a document node.
///
/// This is a closed set: consumers are expected to `match` on it
/// exhaustively so that adding a construct forces every consumer to decide
/// how to treat it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Root of the tree.
    Document,
    /// Structural container (paragraph, heading, list, emphasis, table, …).
    Container,
    /// Literal text run as produced by the parser.
    Text(String),
    /// Bare URL recognized inside text. The node range covers the URL.
    Autolink {
        /// URL as written in the message.
        destination: String,
    },
    /// `<url>` or `<email>` autolink. Leaf.
    AngleAutolink,
    /// `[label](url)`.
    InlineLink,
    /// `![alt](url)`.
    InlineImage,
    /// `[label][ref]`, `[label][]` or `[label]`.
    ReferenceLink,
    /// `![alt][ref]`, `![alt][]` or `![alt]`.
    ReferenceImage,
    /// Inline code or math. Leaf.
    CodeSpan,
    /// Fenced or indented code block. Leaf.
    CodeBlock,
    /// Raw HTML, inline or block. Leaf.
    Html,
    /// Soft, hard or thematic break. Leaf.
    Break,
    /// Task list checkbox or footnote reference. Leaf.
    Marker,
}

/// A node of the parsed message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    /// Node kind.
    pub kind: NodeKind,
    /// Byte range in the original message.
    pub range: Range<usize>,
    /// Child nodes in document order.
    pub children: Vec<Node>,
}

impl Node {
    fn leaf(kind: NodeKind, range: Range<usize>) -> Self {
        Self {
            kind,
            range,
            children: Vec::new(),
        }
    }

    /// Whether text events inside this node are dropped rather than kept as children.
    fn swallows_text(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::CodeBlock | NodeKind::Html | NodeKind::AngleAutolink
        )
    }

    /// Whether bare URLs in child text should be split out.
    fn is_link_like(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::InlineLink
                | NodeKind::InlineImage
                | NodeKind::ReferenceLink
                | NodeKind::ReferenceImage
        )
    }
}

/// Walk decision returned by the visitor passed to [`Document::walk`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visit {
    /// Visit this node's children.
    Descend,
    /// Do not visit this node's children.
    Skip,
}

/// A parsed message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    root: Node,
}

impl Document {
    /// Parse a message.
    ///
    /// Uses GFM tables, strikethrough and task lists. Smart punctuation is
    /// never enabled because it would make text differ from its source.
    #[must_use]
    pub fn parse(source: &str) -> Self {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_GFM;
        let mut builder = TreeBuilder::new(source);
        for (event, range) in Parser::new_ext(source, options).into_offset_iter() {
            builder.push_event(event, range);
        }
        Self {
            root: builder.finish(),
        }
    }

    /// Root node.
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Visit nodes depth-first in document order.
    ///
    /// The visitor decides per node whether its children are visited.
    pub fn walk<'a, F>(&'a self, mut visit: F)
    where
        F: FnMut(&'a Node) -> Visit,
    {
        walk_node(&self.root, &mut visit);
    }
}

fn walk_node<'a, F>(node: &'a Node, visit: &mut F)
where
    F: FnMut(&'a Node) -> Visit,
{
    if visit(node) == Visit::Descend {
        for child in &node.children {
            walk_node(child, visit);
        }
    }
}

/// Text collected from consecutive parser events.
struct PendingText {
    text: String,
    range: Range<usize>,
    /// Text equals the source slice at `range`.
    verbatim: bool,
}

/// Folds parser events into a [`Node`] tree.
struct TreeBuilder<'s> {
    source: &'s str,
    stack: Vec<Node>,
    pending: Option<PendingText>,
}

impl<'s> TreeBuilder<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            stack: vec![Node::leaf(NodeKind::Document, 0..source.len())],
            pending: None,
        }
    }

    fn push_event(&mut self, event: Event<'_>, range: Range<usize>) {
        if let Event::Text(text) = &event {
            self.push_text(text, range);
            return;
        }
        self.flush_text();

        match event {
            Event::Start(tag) => {
                let node = self.open_tag(&tag, range);
                self.stack.push(node);
            }
            Event::End(_) => self.close_tag(),
            Event::Code(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {
                self.push_child(Node::leaf(NodeKind::CodeSpan, range));
            }
            Event::Html(_) | Event::InlineHtml(_) => {
                if !self.top().swallows_text() {
                    self.push_child(Node::leaf(NodeKind::Html, range));
                }
            }
            Event::SoftBreak | Event::HardBreak | Event::Rule => {
                self.push_child(Node::leaf(NodeKind::Break, range));
            }
            Event::FootnoteReference(_) | Event::TaskListMarker(_) => {
                self.push_child(Node::leaf(NodeKind::Marker, range));
            }
            Event::Text(_) => {}
        }
    }

    fn open_tag(&self, tag: &Tag<'_>, range: Range<usize>) -> Node {
        let kind = match tag {
            Tag::CodeBlock(_) => NodeKind::CodeBlock,
            Tag::HtmlBlock => NodeKind::Html,
            Tag::Link { link_type, .. } => match link_type {
                LinkType::Inline => NodeKind::InlineLink,
                LinkType::Autolink | LinkType::Email => NodeKind::AngleAutolink,
                _ => NodeKind::ReferenceLink,
            },
            Tag::Image { link_type, .. } => match link_type {
                LinkType::Inline => NodeKind::InlineImage,
                _ => NodeKind::ReferenceImage,
            },
            _ => NodeKind::Container,
        };
        let range = if kind == NodeKind::AngleAutolink {
            self.strip_angle_brackets(range)
        } else {
            range
        };
        Node::leaf(kind, range)
    }

    /// Narrow a `<url>` range to the destination between the brackets.
    fn strip_angle_brackets(&self, range: Range<usize>) -> Range<usize> {
        match self.source.get(range.clone()) {
            Some(raw) if raw.len() >= 2 && raw.starts_with('<') && raw.ends_with('>') => {
                range.start + 1..range.end - 1
            }
            _ => range,
        }
    }

    fn close_tag(&mut self) {
        // The root is never popped; unbalanced end events are ignored.
        if self.stack.len() > 1
            && let Some(node) = self.stack.pop()
        {
            self.push_child(node);
        }
    }

    fn top(&self) -> &Node {
        // The stack always holds at least the root.
        &self.stack[self.stack.len() - 1]
    }

    fn push_child(&mut self, node: Node) {
        if let Some(parent) = self.stack.last_mut() {
            parent.children.push(node);
        }
    }

    fn push_text(&mut self, text: &str, range: Range<usize>) {
        if self.top().swallows_text() {
            return;
        }

        let verbatim = self.source.get(range.clone()) == Some(text);
        if let Some(pending) = &mut self.pending
            && pending.verbatim
            && verbatim
            && pending.range.end == range.start
        {
            pending.text.push_str(text);
            pending.range.end = range.end;
            return;
        }

        self.flush_text();
        self.pending = Some(PendingText {
            text: text.to_owned(),
            range,
            verbatim,
        });
    }

    fn flush_text(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };

        // Offsets inside non-verbatim text do not map onto the source, so
        // URLs are only split out of verbatim runs.
        if !pending.verbatim || self.top().is_link_like() {
            self.push_child(Node::leaf(NodeKind::Text(pending.text), pending.range));
            return;
        }

        let base = pending.range.start;
        let mut cursor = 0;
        for url in find_bare_urls(&pending.text) {
            // An escape, entity or emphasis delimiter ends the text run but not
            // the URL. Such a URL stays plain text.
            let start = base + url.start;
            if start + url_len(&self.source[start..]) != base + url.end {
                continue;
            }
            if url.start > cursor {
                self.push_child(Node::leaf(
                    NodeKind::Text(pending.text[cursor..url.start].to_owned()),
                    base + cursor..base + url.start,
                ));
            }
            self.push_child(Node::leaf(
                NodeKind::Autolink {
                    destination: pending.text[url.clone()].to_owned(),
                },
                base + url.start..base + url.end,
            ));
            cursor = url.end;
        }
        if cursor < pending.text.len() {
            self.push_child(Node::leaf(
                NodeKind::Text(pending.text[cursor..].to_owned()),
                base + cursor..pending.range.end,
            ));
        }
    }

    fn finish(mut self) -> Node {
        self.flush_text();
        while self.stack.len() > 1 {
            self.close_tag();
        }
        self.stack
            .pop()
            .unwrap_or_else(|| Node::leaf(NodeKind::Document, 0..self.source.len()))
    }
}
