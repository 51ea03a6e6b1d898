//! File ordering, including digit-run-aware natural sorting.

use std::cmp::Ordering;

use mergedown_shared::{FileRecord, SortOrder};

/// One token of a natural sort key.
///
/// Digit runs compare as numbers and sort before text at the same
/// position, so `file2` orders before `file10`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum NaturalToken {
    Number(u128),
    Text(String),
}

/// Build a natural sort key: alternating lowercased text and numeric
/// tokens.
pub fn natural_key(s: &str) -> Vec<NaturalToken> {
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut digits = String::new();

    let flush_text = |text: &mut String, tokens: &mut Vec<NaturalToken>| {
        if !text.is_empty() {
            tokens.push(NaturalToken::Text(text.to_lowercase()));
            text.clear();
        }
    };
    let flush_digits = |digits: &mut String, tokens: &mut Vec<NaturalToken>| {
        if !digits.is_empty() {
            // Digit runs longer than u128 all compare equal-largest.
            let value = digits.parse().unwrap_or(u128::MAX);
            tokens.push(NaturalToken::Number(value));
            digits.clear();
        }
    };

    for ch in s.chars() {
        if ch.is_ascii_digit() {
            flush_text(&mut text, &mut tokens);
            digits.push(ch);
        } else {
            flush_digits(&mut digits, &mut tokens);
            text.push(ch);
        }
    }
    flush_text(&mut text, &mut tokens);
    flush_digits(&mut digits, &mut tokens);

    tokens
}

/// Sort records in place according to the configured order.
///
/// Descending flips every non-equal comparison, so ties keep their
/// discovery order either way. `Custom` leaves the caller's order
/// untouched.
pub fn sort_records(records: &mut [FileRecord], order: SortOrder, ascending: bool) {
    let dir = |ordering: Ordering| if ascending { ordering } else { ordering.reverse() };

    match order {
        SortOrder::Alphabetical => records.sort_by(|a, b| {
            dir(a
                .path
                .to_string_lossy()
                .to_lowercase()
                .cmp(&b.path.to_string_lossy().to_lowercase()))
        }),
        SortOrder::Natural => records.sort_by(|a, b| {
            dir(natural_key(&a.path.to_string_lossy())
                .cmp(&natural_key(&b.path.to_string_lossy())))
        }),
        SortOrder::Date => records.sort_by(|a, b| dir(a.modified.cmp(&b.modified))),
        SortOrder::Size => records.sort_by(|a, b| dir(a.size.cmp(&b.size))),
        SortOrder::Custom => {}
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::{TimeZone, Utc};

    use super::*;

    fn record(path: &str, size: u64, modified_secs: i64) -> FileRecord {
        FileRecord {
            path: PathBuf::from(path),
            size,
            modified: Utc.timestamp_opt(modified_secs, 0).unwrap(),
            hash: None,
            preview: String::new(),
        }
    }

    fn paths(records: &[FileRecord]) -> Vec<String> {
        records
            .iter()
            .map(|r| r.path.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn natural_order_handles_digit_runs() {
        let mut records = vec![
            record("file10", 0, 0),
            record("file2", 0, 0),
            record("file1", 0, 0),
            record("file20", 0, 0),
        ];
        sort_records(&mut records, SortOrder::Natural, true);
        assert_eq!(paths(&records), vec!["file1", "file2", "file10", "file20"]);
    }

    #[test]
    fn natural_key_tokens() {
        assert_eq!(
            natural_key("ch2-Intro10"),
            vec![
                NaturalToken::Text("ch".into()),
                NaturalToken::Number(2),
                NaturalToken::Text("-intro".into()),
                NaturalToken::Number(10),
            ]
        );
    }

    #[test]
    fn alphabetical_is_case_insensitive() {
        let mut records = vec![record("Beta.md", 0, 0), record("alpha.md", 0, 0)];
        sort_records(&mut records, SortOrder::Alphabetical, true);
        assert_eq!(paths(&records), vec!["alpha.md", "Beta.md"]);
    }

    #[test]
    fn descending_reverses_order() {
        let mut records = vec![
            record("a.md", 1, 10),
            record("b.md", 3, 30),
            record("c.md", 2, 20),
        ];
        sort_records(&mut records, SortOrder::Size, false);
        assert_eq!(paths(&records), vec!["b.md", "c.md", "a.md"]);

        sort_records(&mut records, SortOrder::Date, true);
        assert_eq!(paths(&records), vec!["a.md", "c.md", "b.md"]);
    }

    #[test]
    fn custom_order_untouched() {
        let mut records = vec![
            record("z.md", 0, 0),
            record("a.md", 0, 0),
            record("m.md", 0, 0),
        ];
        sort_records(&mut records, SortOrder::Custom, true);
        assert_eq!(paths(&records), vec!["z.md", "a.md", "m.md"]);
    }
}
