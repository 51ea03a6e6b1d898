//! Best-effort document reading with an explicit encoding fallback chain.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use mergedown_shared::{MergeError, Result};

/// Sentinel preview text for files that cannot be read.
pub const UNREADABLE_PREVIEW: &str = "[could not read file]";

/// Preview length in characters.
const PREVIEW_CHARS: usize = 500;

/// Bytes read from the head of a file when building a preview.
const PREVIEW_READ_BYTES: u64 = 4096;

/// Which decoding strategy produced the text.
///
/// The chain is ordered: strict UTF-8 first, then a BOM-detected encoding,
/// then lossy UTF-8 as the last resort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStrategy {
    /// The bytes were valid UTF-8.
    Utf8,
    /// Decoded via the encoding named by its byte-order mark.
    Detected(&'static str),
    /// Lossy UTF-8 decode; invalid sequences were replaced.
    Lossy,
}

/// Read a document, decoding through the fallback chain.
///
/// The file must be openable; decoding itself never fails. Returns the text
/// together with the strategy that produced it.
pub fn read_document(path: &Path) -> Result<(String, DecodeStrategy)> {
    let bytes = std::fs::read(path).map_err(|e| MergeError::io(path, e))?;
    let (text, strategy) = decode_bytes(&bytes);
    if strategy != DecodeStrategy::Utf8 {
        debug!(path = %path.display(), ?strategy, "non-UTF-8 input decoded");
    }
    Ok((text, strategy))
}

/// Decode raw bytes: strict UTF-8 → BOM-detected encoding → lossy UTF-8.
pub fn decode_bytes(bytes: &[u8]) -> (String, DecodeStrategy) {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return (text.to_string(), DecodeStrategy::Utf8);
    }

    if let Some((encoding, _bom_len)) = encoding_rs::Encoding::for_bom(bytes) {
        let (text, _, had_errors) = encoding.decode(bytes);
        if !had_errors {
            return (text.into_owned(), DecodeStrategy::Detected(encoding.name()));
        }
    }

    (
        String::from_utf8_lossy(bytes).into_owned(),
        DecodeStrategy::Lossy,
    )
}

/// Read the first few hundred characters of a file for listings.
///
/// A truncated preview is cut back to its last complete line and suffixed
/// with `...`. Unreadable files yield [`UNREADABLE_PREVIEW`] instead of an
/// error.
pub fn read_preview(path: &Path) -> String {
    let mut head = Vec::new();
    let read = File::open(path)
        .and_then(|f| f.take(PREVIEW_READ_BYTES).read_to_end(&mut head));
    if read.is_err() {
        return UNREADABLE_PREVIEW.to_string();
    }

    let (text, _) = decode_bytes(&head);
    let mut chars = text.chars();
    let preview: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_none() {
        return preview;
    }

    // Cut back to the last full line so the ellipsis never splits one
    let cut = preview
        .rfind('\n')
        .map(|i| &preview[..i])
        .unwrap_or(&preview);
    format!("{cut}...")
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn temp_file(name: &str, bytes: &[u8]) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("md-read-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn utf8_reads_strict() {
        let path = temp_file("a.md", "# héllo\n".as_bytes());
        let (text, strategy) = read_document(&path).unwrap();
        assert_eq!(text, "# héllo\n");
        assert_eq!(strategy, DecodeStrategy::Utf8);
    }

    #[test]
    fn utf16le_bom_detected() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "# hi\n".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let path = temp_file("b.md", &bytes);
        let (text, strategy) = read_document(&path).unwrap();
        assert_eq!(text, "# hi\n");
        assert_eq!(strategy, DecodeStrategy::Detected("UTF-16LE"));
    }

    #[test]
    fn invalid_bytes_fall_back_to_lossy() {
        let path = temp_file("c.md", &[0x66, 0x6F, 0x6F, 0xFF, 0x62, 0x61, 0x72]);
        let (text, strategy) = read_document(&path).unwrap();
        assert_eq!(strategy, DecodeStrategy::Lossy);
        assert!(text.starts_with("foo"));
        assert!(text.ends_with("bar"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_document(Path::new("/nonexistent/nope.md")).unwrap_err();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn preview_short_file_returned_whole() {
        let path = temp_file("d.md", b"short content\n");
        assert_eq!(read_preview(&path), "short content\n");
    }

    #[test]
    fn preview_truncates_at_line_boundary() {
        let line = "x".repeat(40);
        let content: String = (0..30).map(|_| format!("{line}\n")).collect();
        let path = temp_file("e.md", content.as_bytes());
        let preview = read_preview(&path);
        assert!(preview.ends_with("..."));
        assert!(preview.chars().count() <= PREVIEW_CHARS + 3);
    }

    #[test]
    fn preview_unreadable_sentinel() {
        assert_eq!(
            read_preview(Path::new("/nonexistent/nope.md")),
            UNREADABLE_PREVIEW
        );
    }
}
