//! Merge engine: orchestrates analysis, per-document processing, and the
//! output write phase, with cooperative cancel/pause control.
//!
//! A run moves `Pending → Running → {Paused ⇄ Running} → {Completed |
//! Cancelled | Error}`. Control flags are run-scoped — the caller passes a
//! [`RunControl`] by reference into [`MergeEngine::merge`], so concurrent
//! runs on different engines can never interfere. Pause blocks on a
//! condition variable; cancellation wakes blocked pausers.

use std::path::{Path, PathBuf};
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use chrono::Local;
use tracing::{debug, error, info, instrument, warn};

use mergedown_analyzer::read_document;
use mergedown_shared::{FileRecord, MergeConfig, MergeError, Result, TocPosition, format_duration};

use crate::processor::{DocumentProcessor, ProcessedDocument};
use crate::toc::TocGenerator;

// ---------------------------------------------------------------------------
// Status, progress, result
// ---------------------------------------------------------------------------

/// Lifecycle state of a merge run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStatus {
    Pending,
    Running,
    Paused,
    Completed,
    Cancelled,
    Error,
}

/// Point-in-time snapshot emitted at file-processing boundaries.
///
/// Snapshots carry copies of the accumulated error/warning lists and are
/// never retained by the engine after emission.
#[derive(Debug, Clone)]
pub struct MergeProgress {
    pub status: MergeStatus,
    /// File name currently being scheduled.
    pub current_file: String,
    /// 1-based index of the current file.
    pub current_index: usize,
    pub total_files: usize,
    pub bytes_processed: u64,
    pub total_bytes: u64,
    pub elapsed_seconds: f64,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl MergeProgress {
    /// Completion percentage; 0 when no files.
    pub fn percent(&self) -> f64 {
        if self.total_files == 0 {
            return 0.0;
        }
        (self.current_index as f64 / self.total_files as f64) * 100.0
    }

    /// Throughput in files per second; 0 before any time has elapsed.
    pub fn files_per_second(&self) -> f64 {
        if self.elapsed_seconds == 0.0 {
            return 0.0;
        }
        self.current_index as f64 / self.elapsed_seconds
    }

    /// Estimated seconds remaining; 0 when throughput is unknown.
    pub fn eta_seconds(&self) -> f64 {
        let throughput = self.files_per_second();
        if throughput == 0.0 {
            return 0.0;
        }
        (self.total_files - self.current_index) as f64 / throughput
    }
}

/// Terminal summary of a merge run.
#[derive(Debug, Clone)]
pub struct MergeResult {
    pub status: MergeStatus,
    /// True only when the run completed with an empty error list.
    pub success: bool,
    /// The written artifact; `None` for dry runs and failed/cancelled runs.
    pub output_path: Option<PathBuf>,
    /// Documents actually merged, even under partial failure.
    pub files_merged: usize,
    /// Bytes of input consumed by merged documents.
    pub total_bytes: u64,
    pub duration: Duration,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl MergeResult {
    /// One-line human-readable outcome.
    pub fn summary(&self) -> String {
        match self.status {
            MergeStatus::Cancelled => {
                format!("merge cancelled after {} files", self.files_merged)
            }
            _ if self.success => format!(
                "successfully merged {} files in {}",
                self.files_merged,
                format_duration(self.duration.as_secs_f64())
            ),
            _ => format!("merge failed: {}", self.errors.join("; ")),
        }
    }
}

// ---------------------------------------------------------------------------
// Progress observer
// ---------------------------------------------------------------------------

/// Callback interface for per-file progress snapshots.
pub trait MergeObserver: Send + Sync {
    fn progress(&self, progress: &MergeProgress);
}

/// No-op observer for headless/test usage.
pub struct SilentObserver;

impl MergeObserver for SilentObserver {
    fn progress(&self, _progress: &MergeProgress) {}
}

// ---------------------------------------------------------------------------
// Run control
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct ControlState {
    cancelled: bool,
    paused: bool,
}

/// Run-scoped cancel/pause flags.
///
/// Shared between the merging thread and any controlling thread; all
/// transitions are observed by the engine at file boundaries only, so an
/// in-flight read/transform is never interrupted.
#[derive(Debug, Default)]
pub struct RunControl {
    state: Mutex<ControlState>,
    resumed: Condvar,
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; wakes a paused run.
    pub fn cancel(&self) {
        self.lock().cancelled = true;
        self.resumed.notify_all();
    }

    /// Suspend the run at the next file boundary.
    pub fn pause(&self) {
        self.lock().paused = true;
    }

    /// Let a paused run continue.
    pub fn resume(&self) {
        self.lock().paused = false;
        self.resumed.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.lock().cancelled
    }

    pub fn is_paused(&self) -> bool {
        self.lock().paused
    }

    /// Block until resumed or cancelled. Returns true if cancellation was
    /// observed while waiting.
    fn wait_while_paused(&self) -> bool {
        let mut state = self.lock();
        while state.paused && !state.cancelled {
            state = self
                .resumed
                .wait(state)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
        state.cancelled
    }

    fn lock(&self) -> MutexGuard<'_, ControlState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Orchestrates a merge run over an already-discovered, ordered file list.
pub struct MergeEngine {
    pub(crate) config: MergeConfig,
    pub(crate) processor: DocumentProcessor,
    pub(crate) toc: TocGenerator,
    encoding: &'static encoding_rs::Encoding,
}

impl MergeEngine {
    /// Build an engine, validating the configuration up front.
    pub fn new(config: MergeConfig) -> Result<Self> {
        config.validate()?;
        let encoding = encoding_rs::Encoding::for_label(config.output_encoding.as_bytes())
            .ok_or_else(|| {
                MergeError::config(format!(
                    "unrecognized output encoding label: {}",
                    config.output_encoding
                ))
            })?;

        Ok(Self {
            processor: DocumentProcessor::new(&config),
            toc: TocGenerator::new(&config),
            config,
            encoding,
        })
    }

    /// Merge the given files into a single output artifact.
    ///
    /// Per-file failures are absorbed into the result's error list and the
    /// run continues; only output-write failures are fatal. Cancellation
    /// is observed before each file is scheduled — an in-flight file
    /// always completes and counts.
    #[instrument(skip_all, fields(files = files.len(), output = %output_path.display(), dry_run))]
    pub fn merge(
        &self,
        files: &[FileRecord],
        output_path: &Path,
        control: &RunControl,
        observer: &dyn MergeObserver,
        dry_run: bool,
    ) -> MergeResult {
        let start = Instant::now();
        let total_files = files.len();
        let total_bytes: u64 = files.iter().map(|f| f.size).sum();

        let mut errors: Vec<String> = Vec::new();
        let mut warnings: Vec<String> = Vec::new();
        let mut bytes_processed: u64 = 0;

        info!(total_files, total_bytes, "merge run started");

        if !dry_run && self.config.backup_existing && output_path.exists() {
            match backup_output(output_path) {
                Ok(backup) => {
                    info!(backup = %backup.display(), "existing output backed up");
                }
                Err(e) => {
                    warn!(error = %e, "could not create backup");
                    warnings.push(format!("could not create backup: {e}"));
                }
            }
        }

        let mut documents: Vec<ProcessedDocument> = Vec::new();

        for (i, record) in files.iter().enumerate() {
            let index = i + 1;

            if control.is_cancelled() {
                info!(merged = documents.len(), "merge cancelled");
                return self.cancelled_result(&documents, bytes_processed, start, errors, warnings);
            }

            if control.is_paused() {
                debug!(index, "merge paused");
                observer.progress(&self.snapshot(
                    MergeStatus::Paused,
                    record,
                    index,
                    total_files,
                    bytes_processed,
                    total_bytes,
                    start,
                    &errors,
                    &warnings,
                ));
                if control.wait_while_paused() {
                    info!(merged = documents.len(), "merge cancelled while paused");
                    return self.cancelled_result(
                        &documents,
                        bytes_processed,
                        start,
                        errors,
                        warnings,
                    );
                }
                debug!(index, "merge resumed");
            }

            observer.progress(&self.snapshot(
                MergeStatus::Running,
                record,
                index,
                total_files,
                bytes_processed,
                total_bytes,
                start,
                &errors,
                &warnings,
            ));

            // Document indexes stay dense (1..N in output order) even when
            // earlier files failed, so they can diverge from the schedule
            // position reported in progress snapshots.
            match self.process_one(record, documents.len() + 1, total_files) {
                Ok(doc) => {
                    bytes_processed += record.size;
                    documents.push(doc);
                }
                Err(e) => {
                    let message = format!("error processing {}: {e}", record.file_name());
                    warn!(path = %record.path.display(), error = %e, "document skipped");
                    errors.push(message);
                }
            }
        }

        if !dry_run {
            let rendered = self.render(&documents);
            if let Err(e) = self.write_output(output_path, &rendered) {
                error!(error = %e, "output write failed");
                return MergeResult {
                    status: MergeStatus::Error,
                    success: false,
                    output_path: None,
                    files_merged: 0,
                    total_bytes: bytes_processed,
                    duration: start.elapsed(),
                    errors: vec![format!("failed to write output: {e}")],
                    warnings,
                };
            }
        }

        let success = errors.is_empty();
        info!(
            files_merged = documents.len(),
            success,
            elapsed_ms = start.elapsed().as_millis(),
            "merge run complete"
        );

        MergeResult {
            status: MergeStatus::Completed,
            success,
            output_path: (!dry_run).then(|| output_path.to_path_buf()),
            files_merged: documents.len(),
            total_bytes: bytes_processed,
            duration: start.elapsed(),
            errors,
            warnings,
        }
    }

    /// Read and transform one document.
    pub(crate) fn process_one(
        &self,
        record: &FileRecord,
        index: usize,
        total: usize,
    ) -> Result<ProcessedDocument> {
        let (content, _strategy) = read_document(&record.path)?;
        Ok(self.processor.process(record, content, index, total))
    }

    /// Assemble the full output text in write order.
    pub(crate) fn render(&self, documents: &[ProcessedDocument]) -> String {
        let mut out = String::new();

        let toc = self.toc.generate(documents);

        if self.config.toc_position == TocPosition::Top {
            out.push_str(&toc);
        }

        for (i, doc) in documents.iter().enumerate() {
            let metadata = self.processor.metadata_comment(doc);
            if !metadata.is_empty() {
                out.push_str(&metadata);
                out.push('\n');
            }

            let start_marker = self.processor.start_marker(doc);
            if !start_marker.is_empty() {
                out.push_str(&start_marker);
                out.push('\n');
            }

            let chunk_hint = self.processor.chunk_hint(doc);
            if !chunk_hint.is_empty() {
                out.push_str(&chunk_hint);
                out.push('\n');
            }

            out.push_str(&self.processor.header_block(doc));
            out.push_str("\n\n");

            out.push_str(&doc.content);

            let end_marker = self.processor.end_marker(doc);
            if !end_marker.is_empty() {
                out.push('\n');
                out.push_str(&end_marker);
            }

            if i < documents.len() - 1 {
                out.push_str(&self.processor.separator());
            }
        }

        if self.config.toc_position == TocPosition::Bottom && !toc.is_empty() {
            out.push_str("\n\n");
            out.push_str(&toc);
        }

        out
    }

    /// Encode and write the assembled output, creating parent directories.
    fn write_output(&self, output_path: &Path, rendered: &str) -> Result<()> {
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| MergeError::io(parent, e))?;
            }
        }

        let (encoded, _, _) = self.encoding.encode(rendered);
        std::fs::write(output_path, &encoded).map_err(|e| MergeError::io(output_path, e))?;

        debug!(path = %output_path.display(), bytes = encoded.len(), "output written");
        Ok(())
    }

    fn cancelled_result(
        &self,
        documents: &[ProcessedDocument],
        bytes_processed: u64,
        start: Instant,
        errors: Vec<String>,
        warnings: Vec<String>,
    ) -> MergeResult {
        MergeResult {
            status: MergeStatus::Cancelled,
            success: false,
            output_path: None,
            files_merged: documents.len(),
            total_bytes: bytes_processed,
            duration: start.elapsed(),
            errors,
            warnings,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn snapshot(
        &self,
        status: MergeStatus,
        record: &FileRecord,
        index: usize,
        total_files: usize,
        bytes_processed: u64,
        total_bytes: u64,
        start: Instant,
        errors: &[String],
        warnings: &[String],
    ) -> MergeProgress {
        MergeProgress {
            status,
            current_file: record.file_name(),
            current_index: index,
            total_files,
            bytes_processed,
            total_bytes,
            elapsed_seconds: start.elapsed().as_secs_f64(),
            errors: errors.to_vec(),
            warnings: warnings.to_vec(),
        }
    }
}

/// Copy an existing output file to a timestamp-suffixed backup.
fn backup_output(output_path: &Path) -> Result<PathBuf> {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let backup_path = output_path.with_extension(format!("backup_{timestamp}.md"));
    std::fs::copy(output_path, &backup_path).map_err(|e| MergeError::io(&backup_path, e))?;
    Ok(backup_path)
}
