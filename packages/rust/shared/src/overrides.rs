//! Exception tables consulted before generic field extraction.
//!
//! The built-in tables ship as `overrides.toml` next to this crate's manifest
//! and are embedded at compile time. A user file with the same schema can
//! replace them wholesale.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WorldCruiseError};

/// Schema version understood by this build.
pub const OVERRIDES_SCHEMA_VERSION: u32 = 1;

const BUILTIN_OVERRIDES: &str = include_str!("../overrides.toml");

static BUILTIN: LazyLock<OverrideTables> = LazyLock::new(|| {
    OverrideTables::parse(BUILTIN_OVERRIDES, "built-in overrides")
        .expect("valid built-in overrides")
});

/// Immutable title-keyed override tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideTables {
    /// Format version of the table file.
    pub schema_version: u32,

    /// Heading name → corrected heading name.
    #[serde(default)]
    pub titles: HashMap<String, String>,

    /// Formatted title → ship names.
    #[serde(default)]
    pub ship_names: HashMap<String, Vec<String>>,

    /// Formatted title → departure locations.
    #[serde(default)]
    pub departure_locations: HashMap<String, Vec<String>>,

    /// Formatted title → departure dates.
    #[serde(default)]
    pub departure_dates: HashMap<String, Vec<String>>,
}

impl OverrideTables {
    /// The tables compiled into the binary, parsed once per process.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Load tables from a TOML file on disk.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| WorldCruiseError::io(path, e))?;
        let tables = Self::parse(&content, &path.display().to_string())?;
        tracing::debug!(?path, "loaded override tables");
        Ok(tables)
    }

    /// Parse and version-check TOML table content.
    pub fn parse(content: &str, origin: &str) -> Result<Self> {
        let tables: Self = toml::from_str(content)
            .map_err(|e| WorldCruiseError::config(format!("failed to parse {origin}: {e}")))?;

        if tables.schema_version != OVERRIDES_SCHEMA_VERSION {
            return Err(WorldCruiseError::config(format!(
                "{origin}: unsupported schema_version {} (expected {OVERRIDES_SCHEMA_VERSION})",
                tables.schema_version
            )));
        }

        Ok(tables)
    }

    /// Corrected heading name, if the raw heading is listed.
    pub fn title(&self, heading: &str) -> Option<&str> {
        self.titles.get(heading).map(String::as_str)
    }

    pub fn ship_names(&self, title: &str) -> Option<&[String]> {
        self.ship_names.get(title).map(Vec::as_slice)
    }

    pub fn departure_locations(&self, title: &str) -> Option<&[String]> {
        self.departure_locations.get(title).map(Vec::as_slice)
    }

    pub fn departure_dates(&self, title: &str) -> Option<&[String]> {
        self.departure_dates.get(title).map(Vec::as_slice)
    }
}
