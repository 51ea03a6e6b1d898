//! Content-level markdown transforms.
//!
//! Each transform is a pure function `&str -> String` (or a split returning
//! owned parts) applied by the document processor in a fixed order. These
//! are structural, regex-level operations — no markdown AST is built.

mod outline;

pub use outline::{anchor, extract_headers, extract_keywords};

use std::sync::LazyLock;

use regex::Regex;

use mergedown_shared::LineEnding;

/// Front-matter delimiter line.
const FRONT_MATTER_DELIMITER: &str = "---";

// ---------------------------------------------------------------------------
// Front matter
// ---------------------------------------------------------------------------

/// Split a leading front-matter block off the content.
///
/// The content must open with a `---` delimiter line; the block ends at the
/// next line that trims to `---`. Without a closing delimiter no front
/// matter is extracted and the content is returned unchanged. The remaining
/// content has leading blank lines stripped.
pub fn split_front_matter(content: &str) -> (Option<String>, String) {
    if !content.starts_with(FRONT_MATTER_DELIMITER) {
        return (None, content.to_string());
    }

    let lines: Vec<&str> = content.split('\n').collect();
    let close = lines
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, line)| line.trim() == FRONT_MATTER_DELIMITER)
        .map(|(i, _)| i);

    let Some(close) = close else {
        return (None, content.to_string());
    };

    let matter = lines[1..close].join("\n");
    let remaining = lines[close + 1..].join("\n");
    let remaining = remaining.trim_start_matches('\n').to_string();

    (Some(matter), remaining)
}

// ---------------------------------------------------------------------------
// Header levels
// ---------------------------------------------------------------------------

/// Shift every ATX header by `offset` levels, clamping results into [1,6].
///
/// Only lines that open with 1–6 `#` characters followed by horizontal
/// whitespace are headers; anything else (including `#!/...` shebangs and
/// `#hashtag` text) passes through untouched.
pub fn shift_header_levels(content: &str, offset: i8) -> String {
    static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?m)^(#{1,6})([ \t].*)$").expect("valid regex")
    });

    if offset == 0 {
        return content.to_string();
    }

    HEADER_RE
        .replace_all(content, |caps: &regex::Captures<'_>| {
            let level = caps[1].len() as i32;
            let shifted = (level + i32::from(offset)).clamp(1, 6) as usize;
            format!("{}{}", "#".repeat(shifted), &caps[2])
        })
        .into_owned()
}

// ---------------------------------------------------------------------------
// Whitespace
// ---------------------------------------------------------------------------

/// Collapse blank-line runs and trim surrounding whitespace.
///
/// Runs of `max_consecutive + 2` or more newlines (i.e. more than
/// `max_consecutive` blank lines) collapse to `max_consecutive + 1`
/// newlines. Leading/trailing whitespace is trimmed and exactly one
/// trailing newline is appended, which makes the operation idempotent for
/// any `max_consecutive >= 1`.
pub fn normalize_blank_lines(content: &str, max_consecutive: usize) -> String {
    let run = Regex::new(&format!(r"\n{{{},}}", max_consecutive + 2)).expect("valid regex");
    let kept = "\n".repeat(max_consecutive + 1);
    let collapsed = run.replace_all(content, kept.as_str());
    format!("{}\n", collapsed.trim())
}

// ---------------------------------------------------------------------------
// Line endings
// ---------------------------------------------------------------------------

/// Canonicalize line endings to LF, then expand to CRLF when configured.
///
/// Applied last in the transform pipeline so every earlier stage operates
/// on LF-only text.
pub fn normalize_line_endings(content: &str, style: LineEnding) -> String {
    let unified = content.replace("\r\n", "\n").replace('\r', "\n");
    match style {
        LineEnding::Lf => unified,
        LineEnding::Crlf => unified.replace('\n', "\r\n"),
    }
}
