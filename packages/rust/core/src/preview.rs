//! Bounded, non-destructive merge preview.
//!
//! Simulates the output for the head of the file list without ever touching
//! disk: a truncated TOC, the first few fully processed documents, and a
//! hard cap on total rendered lines.

use tracing::debug;

use mergedown_shared::FileRecord;

use crate::engine::MergeEngine;

/// Documents rendered in full by the preview.
const PREVIEW_DOCUMENTS: usize = 3;

/// TOC entries shown before the overflow note.
const PREVIEW_TOC_ENTRIES: usize = 10;

/// Content lines shown per previewed document.
const PREVIEW_CONTENT_LINES: usize = 20;

impl MergeEngine {
    /// Render a bounded preview of what a merge would produce.
    ///
    /// Processes only the first [`PREVIEW_DOCUMENTS`] files, caps the
    /// output at `max_lines` with a truncation notice, and never writes
    /// anything. Per-file failures render inline instead of aborting.
    pub fn preview(&self, files: &[FileRecord], max_lines: usize) -> String {
        if files.is_empty() {
            return "No files to preview.".to_string();
        }

        let mut lines: Vec<String> = Vec::new();

        if self.config.generate_toc {
            lines.push("# Table of Contents".to_string());
            lines.push(String::new());
            for record in files.iter().take(PREVIEW_TOC_ENTRIES) {
                lines.push(format!("- {}", record.stem()));
            }
            if files.len() > PREVIEW_TOC_ENTRIES {
                lines.push(format!("... and {} more", files.len() - PREVIEW_TOC_ENTRIES));
            }
            lines.push(String::new());
            lines.push("---".to_string());
            lines.push(String::new());
        }

        let shown = files.len().min(PREVIEW_DOCUMENTS);
        for (i, record) in files.iter().take(PREVIEW_DOCUMENTS).enumerate() {
            let index = i + 1;
            match self.process_one(record, index, files.len()) {
                Ok(doc) => {
                    lines.push(self.processor.header_block(&doc));
                    lines.push(String::new());
                    lines.extend(
                        doc.content
                            .split('\n')
                            .take(PREVIEW_CONTENT_LINES)
                            .map(str::to_string),
                    );
                    if files.len() > shown || index < shown {
                        lines.push(self.processor.separator());
                    }
                }
                Err(e) => {
                    lines.push(format!("[error previewing {}: {e}]", record.file_name()));
                }
            }
        }

        if files.len() > PREVIEW_DOCUMENTS {
            lines.push(format!("... {} more files ...", files.len() - PREVIEW_DOCUMENTS));
        }

        if lines.len() > max_lines {
            lines.truncate(max_lines);
            lines.push(String::new());
            lines.push("... (preview truncated) ...".to_string());
        }

        debug!(files = files.len(), lines = lines.len(), "preview rendered");
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use chrono::Utc;

    use mergedown_shared::MergeConfig;

    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("md-preview-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn make_files(dir: &Path, count: usize) -> Vec<FileRecord> {
        (1..=count)
            .map(|i| {
                let path = dir.join(format!("doc{i:02}.md"));
                std::fs::write(&path, format!("# Doc {i}\n\nBody {i}.\n")).unwrap();
                let size = std::fs::metadata(&path).unwrap().len();
                FileRecord {
                    path,
                    size,
                    modified: Utc::now(),
                    hash: None,
                    preview: String::new(),
                }
            })
            .collect()
    }

    fn engine() -> MergeEngine {
        MergeEngine::new(MergeConfig::default()).unwrap()
    }

    #[test]
    fn empty_list_has_placeholder() {
        assert_eq!(engine().preview(&[], 50), "No files to preview.");
    }

    #[test]
    fn preview_shows_toc_head_and_first_documents() {
        let dir = temp_dir();
        let files = make_files(&dir, 15);

        let preview = engine().preview(&files, 200);
        assert!(preview.starts_with("# Table of Contents"));
        assert!(preview.contains("- doc01"));
        assert!(preview.contains("- doc10"));
        // Only 10 TOC entries, then the overflow note
        assert!(!preview.contains("- doc11"));
        assert!(preview.contains("... and 5 more"));
        // First three documents rendered, the rest summarized
        assert!(preview.contains("## doc01"));
        assert!(preview.contains("## doc03"));
        assert!(!preview.contains("## doc04"));
        assert!(preview.contains("... 12 more files ..."));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn preview_caps_total_lines() {
        let dir = temp_dir();
        let files = make_files(&dir, 15);

        let preview = engine().preview(&files, 10);
        assert!(preview.ends_with("... (preview truncated) ..."));
        // max_lines plus the two-line truncation notice
        assert_eq!(preview.split('\n').count(), 12);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn preview_never_writes_to_disk() {
        let dir = temp_dir();
        let files = make_files(&dir, 2);
        let before: Vec<_> = std::fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();

        engine().preview(&files, 50);

        let after: Vec<_> = std::fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(before.len(), after.len());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn unreadable_file_renders_inline_error() {
        let dir = temp_dir();
        let mut files = make_files(&dir, 1);
        files.push(FileRecord {
            path: dir.join("missing.md"),
            size: 0,
            modified: Utc::now(),
            hash: None,
            preview: String::new(),
        });

        let preview = engine().preview(&files, 100);
        assert!(preview.contains("[error previewing missing.md:"));
        // The readable file still rendered
        assert!(preview.contains("## doc01"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn toc_disabled_skips_toc_block() {
        let dir = temp_dir();
        let files = make_files(&dir, 2);

        let config = MergeConfig {
            generate_toc: false,
            ..MergeConfig::default()
        };
        let engine = MergeEngine::new(config).unwrap();
        let preview = engine.preview(&files, 100);
        assert!(!preview.contains("# Table of Contents"));
        assert!(preview.contains("## doc01"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
