//! Recursive file discovery with glob filtering and ordering.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::{debug, instrument, warn};

use mergedown_shared::{DuplicateGroup, FileRecord, MergeConfig, MergeError, Result, ScanStats};

use crate::dedupe;
use crate::read::read_preview;
use crate::sort::sort_records;

/// Marker prefix for hidden directory entries.
const HIDDEN_PREFIX: char = '.';

/// Outcome of a discovery pass: the ordered file list plus non-fatal
/// diagnostics (unreadable directories, missing roots).
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    /// Filtered, de-duplicated, ordered records.
    pub files: Vec<FileRecord>,
    /// Non-fatal scan diagnostics.
    pub warnings: Vec<String>,
}

/// Discovers and analyzes input files.
///
/// Include/exclude glob sets are compiled once at construction; an invalid
/// pattern is an immediate error, never silently dropped.
#[derive(Debug)]
pub struct FileAnalyzer {
    config: MergeConfig,
    include: GlobSet,
    exclude: GlobSet,
}

impl FileAnalyzer {
    pub fn new(config: &MergeConfig) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            include: build_glob_set(&config.include_patterns)?,
            exclude: build_glob_set(&config.exclude_patterns)?,
        })
    }

    /// Discover files under the given roots.
    ///
    /// File roots are filtered directly; directory roots are scanned,
    /// recursively when configured, with the depth limit counted per root.
    /// The result is de-duplicated by path and sorted with the configured
    /// order — ties keep discovery order.
    #[instrument(skip_all, fields(roots = paths.len()))]
    pub fn discover(&self, paths: &[PathBuf]) -> DiscoveryReport {
        let mut report = DiscoveryReport::default();

        for path in paths {
            if path.is_file() {
                if self.matches_filters(path) {
                    self.push_file(path, &mut report);
                }
            } else if path.is_dir() {
                self.scan_directory(path, 0, &mut report);
            } else {
                report
                    .warnings
                    .push(format!("path not found: {}", path.display()));
            }
        }

        dedupe_by_path(&mut report.files);
        sort_records(
            &mut report.files,
            self.config.sort_order,
            self.config.sort_ascending,
        );

        debug!(
            files = report.files.len(),
            warnings = report.warnings.len(),
            "discovery complete"
        );
        report
    }

    /// Group discovered files by identical content.
    ///
    /// Gated on `detect_duplicates`; when disabled no hashing happens at
    /// all and no groups are reported.
    pub fn detect_duplicates(&self, records: &mut [FileRecord]) -> Vec<DuplicateGroup> {
        if !self.config.detect_duplicates {
            return Vec::new();
        }
        dedupe::detect_duplicates(records)
    }

    fn scan_directory(&self, dir: &Path, depth: i32, report: &mut DiscoveryReport) {
        if self.config.max_depth >= 0 && depth > self.config.max_depth {
            return;
        }

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "cannot read directory");
                report
                    .warnings
                    .push(format!("cannot read directory {}: {e}", dir.display()));
                return;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    report
                        .warnings
                        .push(format!("cannot read entry in {}: {e}", dir.display()));
                    continue;
                }
            };
            let path = entry.path();

            if path.is_file() {
                if self.matches_filters(&path) {
                    self.push_file(&path, report);
                }
            } else if path.is_dir() && self.config.recursive && !is_hidden(&path) {
                self.scan_directory(&path, depth + 1, report);
            }
        }
    }

    /// Case-insensitive include-then-exclude filtering on the file name.
    fn matches_filters(&self, path: &Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };
        if !self.include.is_match(name) {
            return false;
        }
        !self.exclude.is_match(name)
    }

    fn push_file(&self, path: &Path, report: &mut DiscoveryReport) {
        match analyze_file(path) {
            Ok(record) => report.files.push(record),
            Err(e) => report.warnings.push(e.to_string()),
        }
    }
}

/// Aggregate statistics over a discovered file list.
pub fn statistics(files: &[FileRecord]) -> ScanStats {
    if files.is_empty() {
        return ScanStats::default();
    }

    let total_size: u64 = files.iter().map(|f| f.size).sum();
    ScanStats {
        count: files.len(),
        total_size,
        average_size: total_size / files.len() as u64,
        oldest: files.iter().map(|f| f.modified).min(),
        newest: files.iter().map(|f| f.modified).max(),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Compile glob patterns into a case-insensitive matcher set.
fn build_glob_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| MergeError::pattern(pattern, e.to_string()))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| MergeError::pattern(patterns.join(", "), e.to_string()))
}

/// Stat a file and read its preview snippet.
fn analyze_file(path: &Path) -> Result<FileRecord> {
    let metadata = std::fs::metadata(path).map_err(|e| MergeError::io(path, e))?;
    let modified = metadata
        .modified()
        .map(chrono::DateTime::from)
        .map_err(|e| MergeError::io(path, e))?;

    Ok(FileRecord {
        path: path.to_path_buf(),
        size: metadata.len(),
        modified,
        hash: None,
        preview: read_preview(path),
    })
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(HIDDEN_PREFIX))
}

/// Drop later records that resolve to an already-seen path.
fn dedupe_by_path(files: &mut Vec<FileRecord>) {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    files.retain(|record| {
        let key = record
            .path
            .canonicalize()
            .unwrap_or_else(|_| record.path.clone());
        seen.insert(key)
    });
}
