//! Header extraction, anchor slugging, and keyword extraction.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// Extract ATX headers up to `max_depth`, in document order.
///
/// Returns `(level, text)` pairs with the text trimmed.
pub fn extract_headers(content: &str, max_depth: u8) -> Vec<(u8, String)> {
    static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?m)^(#{1,6})[ \t]+(.+)$").expect("valid regex")
    });

    HEADER_RE
        .captures_iter(content)
        .filter_map(|caps| {
            let level = caps[1].len() as u8;
            if level <= max_depth {
                Some((level, caps[2].trim().to_string()))
            } else {
                None
            }
        })
        .collect()
}

/// Derive a URL-safe anchor from header text.
///
/// Lowercase, non-word characters stripped, whitespace runs collapsed to
/// single hyphens.
pub fn anchor(text: &str) -> String {
    static NON_WORD_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("valid regex"));
    static WHITESPACE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

    let lowered = text.to_lowercase();
    let stripped = NON_WORD_RE.replace_all(&lowered, "");
    WHITESPACE_RE.replace_all(&stripped, "-").into_owned()
}

/// Extract candidate keywords from markdown content.
///
/// Collects capitalized multi-word phrases from header text plus
/// emphasized (bold/italic) spans longer than three characters, drops
/// tokens of two characters or fewer and purely numeric tokens, and
/// returns a sorted, de-duplicated list capped at `max_keywords`.
pub fn extract_keywords(content: &str, max_keywords: usize) -> Vec<String> {
    static PHRASE_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\b[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*\b").expect("valid regex")
    });
    static EMPHASIS_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\*\*([^*]+)\*\*|\*([^*]+)\*|__([^_]+)__|_([^_]+)_").expect("valid regex")
    });

    let mut found: BTreeSet<String> = BTreeSet::new();

    for (_, text) in extract_headers(content, 6) {
        for phrase in PHRASE_RE.find_iter(&text) {
            found.insert(phrase.as_str().to_string());
        }
    }

    for caps in EMPHASIS_RE.captures_iter(content) {
        for group in caps.iter().skip(1).flatten() {
            let span = group.as_str().trim();
            if span.len() > 3 {
                found.insert(span.to_string());
            }
        }
    }

    found
        .into_iter()
        .filter(|k| k.len() > 2 && !k.chars().all(|c| c.is_ascii_digit()))
        .take(max_keywords)
        .collect()
}
