//! Shared types, error model, configuration, and override tables for the
//! world cruise extractor.
//!
//! This crate is the foundation depended on by all other worldcruise crates.
//! It provides:
//! - [`WorldCruiseError`]: the unified error type
//! - Domain types ([`CruiseRecord`], [`Segments`], [`CruiseCatalog`])
//! - Configuration ([`AppConfig`], [`ExtractConfig`], config loading)
//! - Exception tables ([`OverrideTables`])

pub mod config;
pub mod error;
pub mod overrides;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ExtractConfig, ExtractSection, HttpConfig, OutputConfig, SourceConfig,
    DEFAULT_ARTICLE_URL, config_dir, config_file_path, init_config, load_config,
    load_config_from,
};
pub use error::{Result, WorldCruiseError};
pub use overrides::{OVERRIDES_SCHEMA_VERSION, OverrideTables};
pub use types::{CruiseCatalog, CruiseRecord, Segments};
