//! Pipeline orchestration for the world cruise extractor.
//!
//! This crate ties together loading, heading indexing, per-heading field
//! extraction, and JSON output into a single end-to-end run.

pub mod output;
pub mod pipeline;

pub use output::write_catalog;
pub use pipeline::{
    ProgressReporter, RunConfig, RunResult, SilentProgress, extract_catalog, run,
};
