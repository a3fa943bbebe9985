//! Docs configuration module.
//!
//! Handles loading, migrating, validating and merging `docver.toml`. The file
//! lives at the site root and is optional: stock defaults apply for every key
//! it does not set.
//!
//! ## Site Layout
//!
//! ```text
//! site/
//! ├── docver.toml                         # Options (optional)
//! ├── sidebars.json                       # Sidebars of the current version
//! ├── docs/                               # Current ("next") version
//! │   ├── intro.md
//! │   └── guides/install.md
//! ├── versioned_docs/
//! │   └── version-1.0.0/                  # Released version 1.0.0
//! │       └── intro.md
//! └── versioned_sidebars/
//!     └── version-1.0.0-sidebars.json
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! path = "docs"                     # Docs of the current version
//! route_base_path = "docs"          # URL prefix of all docs
//! base_url = "/"
//! include = ["**/*.md", "**/*.mdx"] # Globs, relative to each docs root
//! sidebar_path = "sidebars.json"
//! # home_page_id = "intro"          # Doc served at the version root
//! # edit_url = "https://github.com/org/repo/edit/main/"
//! show_last_update_time = false
//! show_last_update_author = false
//! include_current_version = true
//! disable_versioning = false
//! # last_version = "1.0.0"          # Defaults to the first of `versions`
//! versions = []                     # Released versions, newest first
//! doc_layout_component = "@theme/DocPage"
//! doc_item_component = "@theme/DocItem"
//!
//! [processing]
//! max_processes = 4                 # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! ## Legacy Options
//!
//! Older option names are rewritten by [`migrate_legacy_options`] before
//! deserialization, with a warning for each:
//!
//! - `exclude_next_version_docs = true` → `include_current_version = false`
//! - `homepage_id` → `home_page_id`
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name of the options file in the site root.
pub const CONFIG_FILENAME: &str = "docver.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid value for option `{option}`: {value:?} ({reason})")]
    InvalidOption {
        option: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(option: &'static str, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            option,
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Options of the docs plugin, loaded from `docver.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocsOptions {
    /// Docs directory of the current version, relative to the site root.
    pub path: String,
    /// URL segment all docs live under (may be empty).
    pub route_base_path: String,
    /// Base URL of the site.
    pub base_url: String,
    /// Glob patterns selecting documents, relative to each docs root.
    pub include: Vec<String>,
    /// Sidebar file of the current version, relative to the site root.
    pub sidebar_path: String,
    /// Unversioned id of the doc served at each version's root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_page_id: Option<String>,
    /// Base URL for "edit this page" links.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_url: Option<String>,
    pub show_last_update_time: bool,
    pub show_last_update_author: bool,
    /// Whether the in-development version is built.
    pub include_current_version: bool,
    /// Ignore released versions and build the current one only.
    pub disable_versioning: bool,
    /// Version served at the root segment; defaults to the newest release.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_version: Option<String>,
    /// Released versions, newest first.
    pub versions: Vec<String>,
    /// Component rendering a version (sidebar + doc outlet).
    pub doc_layout_component: String,
    /// Component rendering a single doc.
    pub doc_item_component: String,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for DocsOptions {
    fn default() -> Self {
        Self {
            path: "docs".to_string(),
            route_base_path: "docs".to_string(),
            base_url: "/".to_string(),
            include: vec!["**/*.md".to_string(), "**/*.mdx".to_string()],
            sidebar_path: "sidebars.json".to_string(),
            home_page_id: None,
            edit_url: None,
            show_last_update_time: false,
            show_last_update_author: false,
            include_current_version: true,
            disable_versioning: false,
            last_version: None,
            versions: Vec::new(),
            doc_layout_component: "@theme/DocPage".to_string(),
            doc_item_component: "@theme/DocItem".to_string(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl DocsOptions {
    /// Validate option values. Version-list rules live in
    /// [`VersionCatalog`](crate::versions::VersionCatalog) since they depend
    /// on which versions end up enabled.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.include.is_empty() {
            return Err(ConfigError::invalid(
                "include",
                "[]",
                "at least one pattern is required",
            ));
        }
        self.include_patterns()?;
        if self.path.trim().is_empty() {
            return Err(ConfigError::invalid("path", &self.path, "must not be empty"));
        }
        if !self.base_url.starts_with('/') {
            return Err(ConfigError::invalid(
                "base_url",
                &self.base_url,
                "must start with '/'",
            ));
        }
        if self.doc_layout_component.trim().is_empty() {
            return Err(ConfigError::invalid(
                "doc_layout_component",
                &self.doc_layout_component,
                "must not be empty",
            ));
        }
        if self.doc_item_component.trim().is_empty() {
            return Err(ConfigError::invalid(
                "doc_item_component",
                &self.doc_item_component,
                "must not be empty",
            ));
        }
        Ok(())
    }

    /// Compile the `include` globs.
    pub fn include_patterns(&self) -> Result<Vec<glob::Pattern>, ConfigError> {
        self.include
            .iter()
            .map(|p| {
                glob::Pattern::new(p).map_err(|e| ConfigError::invalid("include", p, e.msg))
            })
            .collect()
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Legacy option migration
// =============================================================================

/// One rewritten legacy option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyRename {
    pub old: &'static str,
    pub new: &'static str,
}

/// Rewrite deprecated option names to their current form.
///
/// Pure: returns the migrated table and the list of applied renames so the
/// caller decides how to report them. When both the old and the new key are
/// present the new one wins and the old one is dropped.
pub fn migrate_legacy_options(value: toml::Value) -> (toml::Value, Vec<LegacyRename>) {
    let toml::Value::Table(mut table) = value else {
        return (value, Vec::new());
    };
    let mut renames = Vec::new();

    if let Some(old) = table.remove("homepage_id") {
        table.entry("home_page_id").or_insert(old);
        renames.push(LegacyRename {
            old: "homepage_id",
            new: "home_page_id",
        });
    }

    if let Some(old) = table.remove("exclude_next_version_docs") {
        if let toml::Value::Boolean(exclude) = old {
            table
                .entry("include_current_version")
                .or_insert(toml::Value::Boolean(!exclude));
        } else {
            // Keep the bad value under the new name so validation reports it.
            table.entry("include_current_version").or_insert(old);
        }
        renames.push(LegacyRename {
            old: "exclude_next_version_docs",
            new: "include_current_version",
        });
    }

    (toml::Value::Table(table), renames)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default options as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(DocsOptions::default())
        .map_err(|e| ConfigError::invalid("<defaults>", "", e.to_string()))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `docver.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(site_dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = site_dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Migrate, merge onto the defaults, deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<DocsOptions, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => {
            let (ov, renames) = migrate_legacy_options(ov);
            for rename in &renames {
                tracing::warn!(
                    old = rename.old,
                    new = rename.new,
                    "Deprecated option renamed, update {}",
                    CONFIG_FILENAME
                );
            }
            merge_toml(base, ov)
        }
        None => base,
    };
    let options: DocsOptions = merged.try_into()?;
    options.validate()?;
    Ok(options)
}

/// Load options from `docver.toml` in the site directory.
pub fn load_config(site_dir: &Path) -> Result<DocsOptions, ConfigError> {
    resolve_config(load_raw_config(site_dir)?)
}

/// Returns a fully-commented stock `docver.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# docver Configuration
# ====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# Docs directory of the current (in-development) version, relative to the
# site root.
path = "docs"

# URL segment all docs live under. Set to "" to serve docs at the site root.
route_base_path = "docs"

# Base URL of the site.
base_url = "/"

# Glob patterns selecting documents, relative to each version's docs root.
include = ["**/*.md", "**/*.mdx"]

# Sidebar declarations (JSON) of the current version. Released versions read
# versioned_sidebars/version-<name>-sidebars.json instead.
sidebar_path = "sidebars.json"

# Unversioned id of the doc served at the root of every version.
# home_page_id = "intro"

# Base URL for "edit this page" links; the doc path is appended.
# edit_url = "https://github.com/org/repo/edit/main/"

# Attach the source file modification time / the front matter
# `last_update_author` to every doc.
show_last_update_time = false
show_last_update_author = false

# ---------------------------------------------------------------------------
# Versions
# ---------------------------------------------------------------------------
# Released versions, newest first. Docs live in
# versioned_docs/version-<name>/.
versions = []

# Build the in-development version (served under /<route_base_path>/next).
include_current_version = true

# Build the current version only, ignoring `versions`.
disable_versioning = false

# Version served at the root segment. Defaults to the first of `versions`,
# or the current version when there are none.
# last_version = "1.0.0"

# ---------------------------------------------------------------------------
# Route components
# ---------------------------------------------------------------------------
doc_layout_component = "@theme/DocPage"
doc_item_component = "@theme/DocItem"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
