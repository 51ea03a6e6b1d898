//! Per-document transform pipeline and render fragments.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use mergedown_markdown::{
    extract_headers, extract_keywords, normalize_blank_lines, normalize_line_endings,
    shift_header_levels, split_front_matter,
};
use mergedown_shared::{FileRecord, MergeConfig};

/// Keyword list cap per document.
const MAX_KEYWORDS: usize = 10;

/// A fully transformed markdown document, ready for assembly.
///
/// Created once per file during a merge run and discarded after the write
/// phase. `index` is 1-based and dense across the run, matching output
/// order.
#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    pub source_path: PathBuf,
    pub original_content: String,
    /// Content after all enabled transform stages.
    pub content: String,
    /// Headers extracted from the transformed content, in order.
    pub headers: Vec<(u8, String)>,
    pub keywords: Vec<String>,
    /// Front matter removed from the content, when extraction is enabled
    /// and a closed delimiter pair was found.
    pub front_matter: Option<String>,
    pub size: u64,
    pub modified: DateTime<Utc>,
    pub index: usize,
    pub total_count: usize,
}

impl ProcessedDocument {
    /// Zero-padded sequential id shared by markers and chunk hints.
    pub fn id(&self) -> String {
        format!("doc_{:04}", self.index)
    }

    /// Source file name without extension.
    pub fn name(&self) -> String {
        self.source_path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Source file name with extension.
    pub fn file_name(&self) -> String {
        self.source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Structured metadata embedded as a comment before each document.
#[derive(Serialize)]
struct DocMeta<'a> {
    source: String,
    index: usize,
    size: u64,
    modified: String,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    keywords: &'a [String],
}

/// Applies the configured transform stages and renders the per-document
/// fragments used during assembly.
pub struct DocumentProcessor {
    config: MergeConfig,
}

impl DocumentProcessor {
    pub fn new(config: &MergeConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Run the transform pipeline over one document.
    ///
    /// Stages, each independently toggleable, in fixed order: front-matter
    /// extraction → header-level shift → blank-line normalization →
    /// line-ending normalization (always applied, last, so earlier stages
    /// see canonical LF text). Header and keyword extraction run on the
    /// transformed content.
    pub fn process(
        &self,
        record: &FileRecord,
        raw_content: String,
        index: usize,
        total_count: usize,
    ) -> ProcessedDocument {
        let original_content = raw_content;
        let mut content = original_content.clone();
        let mut front_matter = None;

        if self.config.strip_front_matter {
            let (matter, rest) = split_front_matter(&content);
            front_matter = matter;
            content = rest;
        }

        if self.config.header_level_offset != 0 {
            content = shift_header_levels(&content, self.config.header_level_offset);
        }

        if self.config.normalize_whitespace {
            content = normalize_blank_lines(&content, self.config.max_consecutive_blanks);
        }

        content = normalize_line_endings(&content, self.config.line_ending);

        let headers = extract_headers(&content, self.config.toc_depth);
        let keywords = if self.config.extract_keywords {
            extract_keywords(&content, MAX_KEYWORDS)
        } else {
            Vec::new()
        };

        debug!(
            source = %record.path.display(),
            index,
            headers = headers.len(),
            "document processed"
        );

        ProcessedDocument {
            source_path: record.path.clone(),
            original_content,
            content,
            headers,
            keywords,
            front_matter,
            size: record.size,
            modified: record.modified,
            index,
            total_count,
        }
    }

    // -----------------------------------------------------------------------
    // Render fragments
    // -----------------------------------------------------------------------

    /// Header block from the configured template, with optional source-path
    /// and index sub-lines.
    pub fn header_block(&self, doc: &ProcessedDocument) -> String {
        let mut header = self.config.header_template.replace("{name}", &doc.name());

        if self.config.include_source_path {
            header.push_str(&format!("\n*Source: `{}`*", doc.source_path.display()));
        }
        if self.config.include_doc_index {
            header.push_str(&format!("\n*Document {} of {}*", doc.index, doc.total_count));
        }

        header
    }

    /// Structured metadata annotation, encoded for embedding as a comment.
    pub fn metadata_comment(&self, doc: &ProcessedDocument) -> String {
        if !self.config.add_metadata {
            return String::new();
        }

        let meta = DocMeta {
            source: doc.source_path.display().to_string(),
            index: doc.index,
            size: doc.size,
            modified: doc.modified.format("%Y-%m-%d").to_string(),
            keywords: &doc.keywords,
        };

        format!(
            "<!-- DOC_META: {} -->",
            serde_json::to_string(&meta).unwrap_or_default()
        )
    }

    /// Opening semantic boundary marker.
    pub fn start_marker(&self, doc: &ProcessedDocument) -> String {
        if !self.config.add_semantic_markers {
            return String::new();
        }
        format!(
            "<document id=\"{}\" source=\"{}\">",
            doc.id(),
            doc.file_name()
        )
    }

    /// Closing semantic boundary marker.
    pub fn end_marker(&self, _doc: &ProcessedDocument) -> String {
        if !self.config.add_semantic_markers {
            return String::new();
        }
        "</document>".to_string()
    }

    /// Chunk-boundary hint for retrieval-style ingestion.
    pub fn chunk_hint(&self, doc: &ProcessedDocument) -> String {
        if !self.config.add_chunk_hints {
            return String::new();
        }
        format!("<!-- CHUNK_BOUNDARY: {} -->", doc.id())
    }

    /// Inter-document separator: the configured delimiter wrapped by the
    /// configured count of blank lines on each side.
    pub fn separator(&self) -> String {
        let blanks = "\n".repeat(self.config.separator_blank_lines);
        format!("{blanks}{}{blanks}", self.config.separator_style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path: &str, size: u64) -> FileRecord {
        FileRecord {
            path: PathBuf::from(path),
            size,
            modified: "2024-03-15T12:00:00Z".parse().unwrap(),
            hash: None,
            preview: String::new(),
        }
    }

    fn process(config: &MergeConfig, content: &str) -> ProcessedDocument {
        let processor = DocumentProcessor::new(config);
        processor.process(&record("docs/guide.md", 1234), content.to_string(), 1, 3)
    }

    #[test]
    fn full_pipeline_applies_stages_in_order() {
        let config = MergeConfig {
            header_level_offset: 1,
            ..MergeConfig::default()
        };
        let content = "---\ntitle: Guide\n---\n\n# Guide\n\n\n\n\n\nBody text.\n";
        let doc = process(&config, content);

        assert_eq!(doc.front_matter.as_deref(), Some("title: Guide"));
        // Header shifted one level down, blank run collapsed
        assert_eq!(doc.content, "## Guide\n\n\nBody text.\n");
        assert_eq!(doc.headers, vec![(2, "Guide".to_string())]);
        assert_eq!(doc.original_content, content);
    }

    #[test]
    fn stages_can_be_disabled() {
        let config = MergeConfig {
            strip_front_matter: false,
            normalize_whitespace: false,
            ..MergeConfig::default()
        };
        let content = "---\ntitle: kept\n---\nbody\n\n\n\n\nend\n";
        let doc = process(&config, content);

        assert!(doc.front_matter.is_none());
        assert_eq!(doc.content, content);
    }

    #[test]
    fn crlf_output_applied_last() {
        let config = MergeConfig {
            line_ending: mergedown_shared::LineEnding::Crlf,
            ..MergeConfig::default()
        };
        let doc = process(&config, "# Title\n\nbody\n");
        assert_eq!(doc.content, "# Title\r\n\r\nbody\r\n");
        // Header extraction still sees the header
        assert_eq!(doc.headers.len(), 1);
        assert_eq!(doc.headers[0].1, "Title");
    }

    #[test]
    fn keywords_only_when_enabled() {
        let content = "# Merge Engine\n\n**Pipeline Stages**\n";
        let off = process(&MergeConfig::default(), content);
        assert!(off.keywords.is_empty());

        let config = MergeConfig {
            extract_keywords: true,
            ..MergeConfig::default()
        };
        let on = process(&config, content);
        assert!(on.keywords.contains(&"Merge Engine".to_string()));
    }

    #[test]
    fn header_block_with_sublines() {
        let config = MergeConfig {
            include_source_path: true,
            include_doc_index: true,
            ..MergeConfig::default()
        };
        let processor = DocumentProcessor::new(&config);
        let doc = processor.process(&record("docs/guide.md", 10), "x\n".into(), 2, 5);

        let header = processor.header_block(&doc);
        assert!(header.starts_with("## guide"));
        assert!(header.contains("*Source: `docs/guide.md`*"));
        assert!(header.contains("*Document 2 of 5*"));
    }

    #[test]
    fn metadata_comment_encodes_json() {
        let config = MergeConfig {
            extract_keywords: true,
            ..MergeConfig::default()
        };
        let processor = DocumentProcessor::new(&config);
        let doc = processor.process(
            &record("a.md", 42),
            "# Topic Overview\n".into(),
            1,
            1,
        );

        let comment = processor.metadata_comment(&doc);
        assert!(comment.starts_with("<!-- DOC_META: {"));
        assert!(comment.ends_with("-->"));
        assert!(comment.contains("\"source\":\"a.md\""));
        assert!(comment.contains("\"index\":1"));
        assert!(comment.contains("\"size\":42"));
        assert!(comment.contains("\"modified\":\"2024-03-15\""));
        assert!(comment.contains("Topic Overview"));
    }

    #[test]
    fn metadata_comment_omits_empty_keywords() {
        let processor = DocumentProcessor::new(&MergeConfig::default());
        let doc = processor.process(&record("a.md", 1), "text\n".into(), 1, 1);
        let comment = processor.metadata_comment(&doc);
        assert!(!comment.contains("keywords"));
    }

    #[test]
    fn markers_use_zero_padded_ids() {
        let processor = DocumentProcessor::new(&MergeConfig::default());
        let doc = processor.process(&record("dir/note.md", 1), "x\n".into(), 7, 100);

        assert_eq!(
            processor.start_marker(&doc),
            "<document id=\"doc_0007\" source=\"note.md\">"
        );
        assert_eq!(processor.end_marker(&doc), "</document>");
    }

    #[test]
    fn fragments_empty_when_disabled() {
        let config = MergeConfig {
            add_metadata: false,
            add_semantic_markers: false,
            add_chunk_hints: false,
            ..MergeConfig::default()
        };
        let processor = DocumentProcessor::new(&config);
        let doc = processor.process(&record("a.md", 1), "x\n".into(), 1, 1);

        assert!(processor.metadata_comment(&doc).is_empty());
        assert!(processor.start_marker(&doc).is_empty());
        assert!(processor.end_marker(&doc).is_empty());
        assert!(processor.chunk_hint(&doc).is_empty());
    }

    #[test]
    fn chunk_hint_format() {
        let config = MergeConfig {
            add_chunk_hints: true,
            ..MergeConfig::default()
        };
        let processor = DocumentProcessor::new(&config);
        let doc = processor.process(&record("a.md", 1), "x\n".into(), 12, 20);
        assert_eq!(
            processor.chunk_hint(&doc),
            "<!-- CHUNK_BOUNDARY: doc_0012 -->"
        );
    }

    #[test]
    fn separator_wrapped_in_blank_lines() {
        let processor = DocumentProcessor::new(&MergeConfig::default());
        assert_eq!(processor.separator(), "\n\n---\n\n");

        let config = MergeConfig {
            separator_style: "* * *".into(),
            separator_blank_lines: 1,
            ..MergeConfig::default()
        };
        let processor = DocumentProcessor::new(&config);
        assert_eq!(processor.separator(), "\n* * *\n");
    }
}
