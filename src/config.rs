//! Build configuration loaded from `strata.toml`.
//!
//! One config file describes the whole build: the blueprint, run-wide
//! toggles, and any number of `[[endpoint]]` tables, each a compilation
//! request against the same content snapshot.
//!
//! ## Configuration Options
//!
//! ```toml
//! # The only required key: base directory plus ':'-prefixed level names.
//! blueprint = "data/:language/:genre/:year"
//!
//! output = "output"        # Output directory (recreated on every build)
//! pluralize = true         # "genre" collections appear as "genres"
//! inject-ids = true        # Add "<level>_id" fields to loaded records
//!
//! [processing]
//! max-threads = 4          # Parallel content loads (omit for auto = CPU cores)
//!
//! # Each [[endpoint]] is one compilation request.
//! [[endpoint]]
//! root = "genre"           # Level to re-root the hierarchy at (default: first)
//! levels = ["genre", "year"]  # Levels kept in output (default: all)
//! group-by = ["year"]      # Additionally emit one endpoint per value here
//! items-per-page = 10
//! path = "genres"          # Output name override (default: pluralized root)
//!
//! [endpoint.sort.year]     # Per-level ordering
//! field = "released"
//! order = "descending"
//! ```
//!
//! Endpoint tables are sparse — only `blueprint` has no usable default.
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Top-level build configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct SiteConfig {
    /// Path pattern mapping directory segments to levels.
    pub blueprint: String,
    /// Directory the compiled documents are written to.
    pub output: String,
    /// Whether collection keys use pluralized level names.
    pub pluralize: bool,
    /// Whether loaded records get a content-addressed `<level>_id` field.
    pub inject_ids: bool,
    /// Parallel load settings.
    pub processing: ProcessingConfig,
    /// Compilation requests, one per `[[endpoint]]` table.
    pub endpoint: Vec<EndpointSpec>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            blueprint: String::new(),
            output: "output".to_string(),
            pluralize: true,
            inject_ids: true,
            processing: ProcessingConfig::default(),
            endpoint: vec![EndpointSpec::default()],
        }
    }
}

impl SiteConfig {
    /// Validate config values before any I/O happens.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.blueprint.is_empty() {
            return Err(ConfigError::Validation("blueprint must be set".into()));
        }
        if self.endpoint.is_empty() {
            return Err(ConfigError::Validation(
                "at least one [[endpoint]] table is required".into(),
            ));
        }
        for endpoint in &self.endpoint {
            if endpoint.items_per_page == 0 {
                return Err(ConfigError::Validation(
                    "items-per-page must be at least 1".into(),
                ));
            }
        }
        Ok(())
    }
}

/// One compilation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct EndpointSpec {
    /// Level the hierarchy is re-rooted at; defaults to the first level.
    pub root: Option<String>,
    /// Level names kept in output; defaults to all levels.
    pub levels: Option<Vec<String>>,
    /// Levels to additionally aggregate by, one endpoint per distinct value.
    pub group_by: Vec<String>,
    /// Page size for every paginated collection this request produces.
    pub items_per_page: usize,
    /// Output name override for the main collection.
    pub path: Option<String>,
    /// Per-level sort rules, keyed by level name.
    pub sort: BTreeMap<String, SortRule>,
}

impl Default for EndpointSpec {
    fn default() -> Self {
        Self {
            root: None,
            levels: None,
            group_by: Vec::new(),
            items_per_page: 10,
            path: None,
            sort: BTreeMap::new(),
        }
    }
}

/// Ordering applied to one level's collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SortRule {
    /// Field of the loaded record to compare; `None` compares keys directly.
    pub field: Option<String>,
    pub order: SortOrder,
}

impl Default for SortRule {
    fn default() -> Self {
        Self {
            field: None,
            order: SortOrder::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Parallel load settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct ProcessingConfig {
    /// Maximum number of parallel content loads.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_threads: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_threads.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Load and validate a config file.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let raw = fs::read_to_string(path)?;
    let config: SiteConfig = toml::from_str(&raw)?;
    config.validate()?;
    Ok(config)
}

/// A documented stock `strata.toml`, printed by `strata gen-config`.
pub fn stock_config_toml() -> String {
    r#"# strata build configuration
#
# The blueprint maps your directory hierarchy to named levels. Literal
# segments form the base directory; ':'-prefixed segments are levels, in
# depth order. The deepest level is the content files themselves.
blueprint = "data/:language/:genre/:year"

# Output directory. Removed and recreated on every build.
output = "output"

# Collection keys use pluralized level names ("genre" -> "genres").
pluralize = true

# Every loaded record gets a "<level>_id" field derived from its path.
inject-ids = true

[processing]
# Parallel content loads. Omit for one per CPU core.
# max-threads = 4

# Each [[endpoint]] table is one compilation request. All keys are
# optional.
[[endpoint]]
# root = "genre"              # Re-root the hierarchy at this level
# levels = ["genre", "year"]  # Levels kept in output (others are merged up)
# group-by = ["year"]         # Emit one extra endpoint per distinct value
# path = "genres"             # Main collection name override
items-per-page = 10

# Per-level ordering:
# [endpoint.sort.year]
# field = "released"
# order = "descending"
"#
    .to_string()
}
