//! Application configuration for the world cruise extractor.
//!
//! User config lives at `~/.worldcruise/worldcruise.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, WorldCruiseError};
use crate::overrides::OverrideTables;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "worldcruise.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".worldcruise";

/// The article the extraction rules were written against.
pub const DEFAULT_ARTICLE_URL: &str = "https://www.cruisecritic.com/articles.cfm?ID=514";

// ---------------------------------------------------------------------------
// Config structs (matching worldcruise.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where the article comes from.
    #[serde(default)]
    pub source: SourceConfig,

    /// Where the JSON goes.
    #[serde(default)]
    pub output: OutputConfig,

    /// Extraction tuning.
    #[serde(default)]
    pub extract: ExtractSection,

    /// HTTP settings for the optional fetch.
    #[serde(default)]
    pub http: HttpConfig,
}

/// `[source]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Local HTML file read by default.
    #[serde(default = "default_input_path")]
    pub path: String,

    /// Article URL; when set, the document is fetched instead of read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: default_input_path(),
            url: None,
        }
    }
}

fn default_input_path() -> String {
    "Best World Cruises of 2023, 2024 and 2025 _ Cruise Critic.html".into()
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// JSON output file.
    #[serde(default = "default_output_path")]
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

fn default_output_path() -> String {
    "world-cruises.json".into()
}

/// `[extract]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractSection {
    /// Maximum sibling nodes examined per marker search.
    #[serde(default = "default_max_lookahead")]
    pub max_lookahead: usize,

    /// Year assigned to the first year-section heading.
    #[serde(default = "default_first_year")]
    pub first_year: u16,

    /// Number of final level-3 headings that are not cruise entries.
    #[serde(default = "default_trailing_headings")]
    pub trailing_headings: usize,

    /// Replacement override table file (defaults to the built-in tables).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<String>,
}

impl Default for ExtractSection {
    fn default() -> Self {
        Self {
            max_lookahead: default_max_lookahead(),
            first_year: default_first_year(),
            trailing_headings: default_trailing_headings(),
            overrides: None,
        }
    }
}

fn default_max_lookahead() -> usize {
    64
}
fn default_first_year() -> u16 {
    2023
}
fn default_trailing_headings() -> usize {
    2
}

/// `[http]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

// ---------------------------------------------------------------------------
// Extract config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime extraction settings, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Maximum sibling nodes examined per marker search.
    pub max_lookahead: usize,
    /// Year assigned to the first year-section heading.
    pub first_year: u16,
    /// Number of final level-3 headings to skip.
    pub trailing_headings: usize,
    /// Exception tables in effect for this run.
    pub overrides: OverrideTables,
}

impl ExtractConfig {
    /// Build runtime settings from the file config, loading override tables.
    pub fn from_app_config(config: &AppConfig) -> Result<Self> {
        let overrides = match &config.extract.overrides {
            Some(path) => OverrideTables::load_from(Path::new(path))?,
            None => OverrideTables::builtin(),
        };

        let extract = Self {
            max_lookahead: config.extract.max_lookahead,
            first_year: config.extract.first_year,
            trailing_headings: config.extract.trailing_headings,
            overrides,
        };
        extract.validate()?;
        Ok(extract)
    }

    /// Reject settings that make every marker search fail.
    pub fn validate(&self) -> Result<()> {
        if self.max_lookahead == 0 {
            return Err(WorldCruiseError::validation("max_lookahead must be at least 1"));
        }
        Ok(())
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            max_lookahead: default_max_lookahead(),
            first_year: default_first_year(),
            trailing_headings: default_trailing_headings(),
            overrides: OverrideTables::builtin(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.worldcruise/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| WorldCruiseError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.worldcruise/worldcruise.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
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
    let content = std::fs::read_to_string(path).map_err(|e| WorldCruiseError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        WorldCruiseError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| WorldCruiseError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| WorldCruiseError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| WorldCruiseError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
