//! Merge configuration for mergedown.
//!
//! [`MergeConfig`] is the flat option record consumed by the pipeline. It is
//! read-only for the duration of a run; no pipeline stage mutates it. All
//! behavior switches are closed enums with exhaustive matches.
//!
//! The ambient [`AppConfig`] lives at `~/.mergedown/mergedown.toml`; CLI
//! flags override config file values, which override defaults. The core
//! crates never read that file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MergeError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "mergedown.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".mergedown";

// ---------------------------------------------------------------------------
// Option enums
// ---------------------------------------------------------------------------

/// Ordering applied to the discovered file list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Case-insensitive comparison of the full path string.
    Alphabetical,
    /// Digit-run-aware comparison, so `file2` sorts before `file10`.
    Natural,
    /// By modification time.
    Date,
    /// By file size.
    Size,
    /// Caller-supplied order, left untouched.
    Custom,
}

/// Rendering style for table-of-contents entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TocStyle {
    /// `- [Name](#anchor)`
    Links,
    /// `- Name`
    Plain,
    /// `1. [Name](#anchor)`
    Numbered,
}

/// Placement of the table of contents in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TocPosition {
    Top,
    Bottom,
}

/// Line-ending style for the output artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// `\n`
    Lf,
    /// `\r\n`
    Crlf,
}

// ---------------------------------------------------------------------------
// MergeConfig
// ---------------------------------------------------------------------------

/// Configuration for a merge run.
///
/// Deserializes from the `[merge]` table of `mergedown.toml`; missing
/// fields take their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    // --- Document structure ---
    /// Template for per-document header blocks; `{name}` expands to the
    /// source file stem.
    pub header_template: String,
    /// Append a `*Source: ...*` line to each header block.
    pub include_source_path: bool,
    /// Append a `*Document i of N*` line to each header block.
    pub include_doc_index: bool,
    /// Separator text emitted between documents.
    pub separator_style: String,
    /// Blank lines on each side of the separator.
    pub separator_blank_lines: usize,

    // --- Table of contents ---
    pub generate_toc: bool,
    /// Maximum header depth included in the TOC (1–6).
    pub toc_depth: u8,
    pub toc_style: TocStyle,
    pub toc_position: TocPosition,

    // --- Content processing ---
    /// Shift header levels by this signed offset; results clamp to [1,6].
    pub header_level_offset: i8,
    /// Extract and strip a leading front-matter block.
    pub strip_front_matter: bool,
    /// Collapse blank-line runs and trim surrounding whitespace.
    pub normalize_whitespace: bool,
    /// Maximum consecutive blank lines kept by normalization.
    pub max_consecutive_blanks: usize,
    /// Report files with byte-identical content.
    pub detect_duplicates: bool,

    // --- Annotations ---
    /// Emit a `DOC_META` comment before each document.
    pub add_metadata: bool,
    /// Wrap each document in `<document>` marker tags.
    pub add_semantic_markers: bool,
    /// Emit a chunk-boundary hint before each document.
    pub add_chunk_hints: bool,
    /// Extract keywords per document for the metadata annotation.
    pub extract_keywords: bool,

    // --- Filtering ---
    /// Include glob patterns, matched case-insensitively on file names.
    pub include_patterns: Vec<String>,
    /// Exclude glob patterns, matched case-insensitively on file names.
    pub exclude_patterns: Vec<String>,
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Maximum recursion depth per root; −1 means unlimited.
    pub max_depth: i32,

    // --- Sorting ---
    pub sort_order: SortOrder,
    pub sort_ascending: bool,

    // --- Output ---
    /// Output text encoding label (e.g. `utf-8`, `windows-1252`).
    pub output_encoding: String,
    pub line_ending: LineEnding,
    /// Snapshot a pre-existing output file before overwriting it.
    pub backup_existing: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            header_template: "## {name}".into(),
            include_source_path: false,
            include_doc_index: true,
            separator_style: "---".into(),
            separator_blank_lines: 2,
            generate_toc: true,
            toc_depth: 2,
            toc_style: TocStyle::Links,
            toc_position: TocPosition::Top,
            header_level_offset: 0,
            strip_front_matter: true,
            normalize_whitespace: true,
            max_consecutive_blanks: 2,
            detect_duplicates: true,
            add_metadata: true,
            add_semantic_markers: true,
            add_chunk_hints: false,
            extract_keywords: false,
            include_patterns: vec!["*.md".into(), "*.markdown".into()],
            exclude_patterns: Vec::new(),
            recursive: true,
            max_depth: -1,
            sort_order: SortOrder::Alphabetical,
            sort_ascending: true,
            output_encoding: "utf-8".into(),
            line_ending: LineEnding::Lf,
            backup_existing: true,
        }
    }
}

impl MergeConfig {
    /// Validate option values that cannot be expressed in the type system.
    ///
    /// Called before a run starts; configuration faults are raised to the
    /// caller immediately, never silently defaulted.
    pub fn validate(&self) -> Result<()> {
        if !(1..=6).contains(&self.toc_depth) {
            return Err(MergeError::config(format!(
                "toc_depth must be between 1 and 6, got {}",
                self.toc_depth
            )));
        }
        if self.include_patterns.is_empty() {
            return Err(MergeError::config(
                "include_patterns must contain at least one pattern",
            ));
        }
        if self.max_consecutive_blanks == 0 {
            return Err(MergeError::config(
                "max_consecutive_blanks must be at least 1",
            ));
        }
        if encoding_rs::Encoding::for_label(self.output_encoding.as_bytes()).is_none() {
            return Err(MergeError::config(format!(
                "unrecognized output encoding label: {}",
                self.output_encoding
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

/// Names of the built-in presets, in display order.
pub fn preset_names() -> &'static [&'static str] {
    &["basic", "knowledge-base", "documentation", "archive"]
}

/// Fetch a built-in preset by name.
///
/// Unknown names are a configuration error.
pub fn preset(name: &str) -> Result<MergeConfig> {
    let config = match name {
        // Plain concatenation with headers, no annotations.
        "basic" => MergeConfig {
            generate_toc: false,
            add_metadata: false,
            add_semantic_markers: false,
            ..MergeConfig::default()
        },
        // Everything on: retrieval-ready output with markers and hints.
        "knowledge-base" => MergeConfig {
            include_source_path: true,
            add_chunk_hints: true,
            extract_keywords: true,
            ..MergeConfig::default()
        },
        // Human-facing docs: deep TOC, front matter kept, no annotations.
        "documentation" => MergeConfig {
            header_template: "# {name}".into(),
            toc_depth: 3,
            add_metadata: false,
            add_semantic_markers: false,
            strip_front_matter: false,
            ..MergeConfig::default()
        },
        // Verbatim content, nothing added or normalized.
        "archive" => MergeConfig {
            header_template: "---\n# {name}".into(),
            generate_toc: false,
            add_metadata: false,
            add_semantic_markers: false,
            strip_front_matter: false,
            normalize_whitespace: false,
            ..MergeConfig::default()
        },
        _ => {
            return Err(MergeError::config(format!(
                "unknown preset: {name}. Available: {}",
                preset_names().join(", ")
            )));
        }
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// App config (CLI-side, ambient)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Merge option overrides.
    #[serde(default)]
    pub merge: MergeConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default output path when `--out` is not given.
    #[serde(default = "default_output")]
    pub output: String,

    /// Preset applied before `[merge]` overrides; empty means none.
    #[serde(default)]
    pub preset: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            preset: String::new(),
        }
    }
}

fn default_output() -> String {
    "merged.md".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.mergedown/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| MergeError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.mergedown/mergedown.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does
/// not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| MergeError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| MergeError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| MergeError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| MergeError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| MergeError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
