//! Shared types, error model, and configuration for mergedown.
//!
//! This crate is the foundation depended on by all other mergedown crates.
//! It provides:
//! - [`MergeError`] — the unified error type
//! - Domain types ([`FileRecord`], [`DuplicateGroup`], [`ScanStats`])
//! - Configuration ([`MergeConfig`], the closed option enums, presets,
//!   and the ambient [`AppConfig`] TOML loading used by the CLI)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, LineEnding, MergeConfig, SortOrder, TocPosition, TocStyle,
    config_dir, config_file_path, init_config, load_config, load_config_from, preset,
    preset_names,
};
pub use error::{MergeError, Result};
pub use types::{DuplicateGroup, FileRecord, ScanStats, format_duration, format_file_size};
