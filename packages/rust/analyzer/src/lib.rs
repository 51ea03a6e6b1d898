//! File discovery and analysis for mergedown.
//!
//! Finds candidate input files under a set of roots, filters them through
//! case-insensitive glob patterns, applies one total ordering, detects
//! byte-identical duplicates, and provides aggregate statistics — all
//! synchronously and with bounded memory per file.

pub mod dedupe;
pub mod discover;
pub mod read;
pub mod sort;

pub use dedupe::{UNREADABLE_HASH, detect_duplicates, hash_file};
pub use discover::{DiscoveryReport, FileAnalyzer, statistics};
pub use read::{DecodeStrategy, UNREADABLE_PREVIEW, decode_bytes, read_document, read_preview};
pub use sort::{natural_key, sort_records};
