//! Core domain types for mergedown discovery results.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// FileRecord
// ---------------------------------------------------------------------------

/// A discovered input file with its metadata.
///
/// Records are immutable once produced by discovery, except for `hash`,
/// which is filled lazily by duplicate detection. Paths are unique within
/// one discovery result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    /// Path as discovered (not canonicalized).
    pub path: PathBuf,
    /// File size in bytes.
    pub size: u64,
    /// Last modification time.
    pub modified: DateTime<Utc>,
    /// Content hash, computed lazily during duplicate detection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    /// First few hundred characters of content, for listings.
    #[serde(default)]
    pub preview: String,
}

impl FileRecord {
    /// File name component, lossily decoded.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File name without its extension.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Human-readable size, e.g. `12.3 KB`.
    pub fn size_formatted(&self) -> String {
        format_file_size(self.size)
    }

    /// Modification time as `YYYY-MM-DD HH:MM`.
    pub fn modified_formatted(&self) -> String {
        self.modified.format("%Y-%m-%d %H:%M").to_string()
    }
}

// ---------------------------------------------------------------------------
// DuplicateGroup
// ---------------------------------------------------------------------------

/// A group of files sharing identical content (always ≥ 2 members).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Content hash shared by every member.
    pub hash: String,
    /// Paths of the duplicate files, in discovery order.
    pub paths: Vec<PathBuf>,
}

// ---------------------------------------------------------------------------
// ScanStats
// ---------------------------------------------------------------------------

/// Aggregate statistics over a discovered file list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanStats {
    /// Number of files.
    pub count: usize,
    /// Sum of file sizes in bytes.
    pub total_size: u64,
    /// Integer average size in bytes (0 for an empty list).
    pub average_size: u64,
    /// Oldest modification time, if any files were found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oldest: Option<DateTime<Utc>>,
    /// Newest modification time, if any files were found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub newest: Option<DateTime<Utc>>,
}

impl ScanStats {
    /// Human-readable total size.
    pub fn total_size_formatted(&self) -> String {
        format_file_size(self.total_size)
    }

    /// Human-readable average size.
    pub fn average_size_formatted(&self) -> String {
        format_file_size(self.average_size)
    }
}

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

/// Format a byte count in human-readable form (`1.5 KB`, `3.2 MB`, ...).
pub fn format_file_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{size:.1} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.1} TB")
}

/// Format a duration in human-readable form (`4.2s`, `3m 12s`, `1h 5m`).
pub fn format_duration(seconds: f64) -> String {
    if seconds < 60.0 {
        format!("{seconds:.1}s")
    } else if seconds < 3600.0 {
        let minutes = (seconds / 60.0) as u64;
        let secs = (seconds % 60.0) as u64;
        format!("{minutes}m {secs}s")
    } else {
        let hours = (seconds / 3600.0) as u64;
        let minutes = ((seconds % 3600.0) / 60.0) as u64;
        format!("{hours}h {minutes}m")
    }
}
