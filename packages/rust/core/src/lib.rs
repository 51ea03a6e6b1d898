//! Merge pipeline orchestration for mergedown.
//!
//! This crate ties discovery, per-document transformation, TOC generation,
//! and output assembly into the end-to-end merge run, with cooperative
//! cancel/pause control and per-file progress reporting.

pub mod engine;
pub mod preview;
pub mod processor;
pub mod toc;

pub use engine::{
    MergeEngine, MergeObserver, MergeProgress, MergeResult, MergeStatus, RunControl,
    SilentObserver,
};
pub use processor::{DocumentProcessor, ProcessedDocument};
pub use toc::TocGenerator;
