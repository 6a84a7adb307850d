//! Bare URL detection (GFM extended autolinks).
//!
//! `pulldown-cmark` only recognizes `<url>` autolinks, while chat clients
//! also link plain `https://…` and `www.…` text. This module finds those
//! URLs inside a text run using the GFM trailing punctuation rules.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

static URL_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:(?:https?|ftp)://|www\.)").unwrap());

/// Find bare URLs in `text`, returning byte ranges relative to `text`.
pub(crate) fn find_bare_urls(text: &str) -> Vec<Range<usize>> {
    let mut found = Vec::new();
    let mut search_from = 0;

    while let Some(m) = URL_START_RE.find_at(text, search_from) {
        let start = m.start();
        let prefix_end = m.end();
        let end = start + url_len(&text[start..]);

        if end > prefix_end && has_domain(&text[prefix_end..end]) {
            found.push(start..end);
            search_from = end;
        } else {
            search_from = prefix_end;
        }
    }

    found
}

/// Byte length of the URL at the start of `text`.
///
/// The URL ends at whitespace or `<`, minus trailing punctuation.
pub(crate) fn url_len(text: &str) -> usize {
    let raw_end = text
        .find(|c: char| c.is_whitespace() || c == '<')
        .unwrap_or(text.len());
    trim_trailing(&text[..raw_end])
}

/// Length of `url` after dropping trailing punctuation that is not part of it.
fn trim_trailing(url: &str) -> usize {
    let mut end = url.len();
    loop {
        let current = &url[..end];
        let Some(last) = current.chars().next_back() else {
            break;
        };
        match last {
            '?' | '!' | '.' | ',' | ':' | '*' | '_' | '~' | '\'' | '"' => end -= 1,
            ')' if current.matches(')').count() > current.matches('(').count() => end -= 1,
            ';' => match entity_suffix_start(current) {
                Some(amp) => end = amp,
                None => break,
            },
            _ => break,
        }
    }
    end
}

/// Start of a trailing `&name;` entity reference, if any.
fn entity_suffix_start(s: &str) -> Option<usize> {
    let body = s.strip_suffix(';')?;
    let amp = body.rfind('&')?;
    let name = &body[amp + 1..];
    (!name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric())).then_some(amp)
}

/// Whether the text following the scheme starts with a plausible host name.
fn has_domain(rest: &str) -> bool {
    rest.chars()
        .take_while(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .any(char::is_alphanumeric)
}
