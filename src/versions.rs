//! Version catalog: the ordered list of documentation versions.
//!
//! Built once from [`DocsOptions`] and immutable afterwards. The catalog owns
//! every rule that depends on *which* version a thing belongs to:
//!
//! - where its documents and sidebars live on disk,
//! - the URL segment it is served under ([`VersionCatalog::version_url_segment`]),
//! - how ids inside it are scoped ([`VersionCatalog::global_id`]).
//!
//! ## Ordering
//!
//! The current version (`next`) comes first, followed by the released
//! versions in declared order (newest first). That order is only used to sort
//! outputs deterministically.
//!
//! ## URL segments
//!
//! ```text
//! latest version      →  ""        /docs/intro
//! current version     →  "next"    /docs/next/intro
//! any other version   →  its name  /docs/1.0.0/intro
//! ```
//!
//! When the current version is also the latest (nothing released yet) it is
//! served at the root segment.

use crate::config::{ConfigError, DocsOptions};
use crate::naming::{normalize_url, versioned_id};
use crate::types::VersionMetadata;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Reserved name of the in-development version.
pub const CURRENT_VERSION_NAME: &str = "next";

/// URL segment of the in-development version when it is not the latest.
pub const CURRENT_VERSION_SEGMENT: &str = "next";

const VERSIONED_DOCS_DIR: &str = "versioned_docs";
const VERSIONED_SIDEBARS_DIR: &str = "versioned_sidebars";

#[derive(Debug, Clone)]
pub struct VersionCatalog {
    versions: Vec<VersionMetadata>,
    /// Docs root path (`base_url` + `route_base_path`), shared by all versions.
    base_path: String,
}

impl VersionCatalog {
    /// Build the catalog from options, resolving paths against `site_dir`.
    pub fn from_options(site_dir: &Path, options: &DocsOptions) -> Result<Self, ConfigError> {
        let released: &[String] = if options.disable_versioning {
            &[]
        } else {
            &options.versions
        };
        validate_version_names(released)?;

        let mut names: Vec<&str> = Vec::with_capacity(released.len() + 1);
        if options.include_current_version {
            names.push(CURRENT_VERSION_NAME);
        }
        names.extend(released.iter().map(String::as_str));

        if names.is_empty() {
            return Err(ConfigError::InvalidOption {
                option: "include_current_version",
                value: "false".to_string(),
                reason: "no released versions declared, nothing to build".to_string(),
            });
        }

        let last_version = match &options.last_version {
            Some(name) => {
                if !names.contains(&name.as_str()) {
                    return Err(ConfigError::InvalidOption {
                        option: "last_version",
                        value: name.clone(),
                        reason: format!("not an enabled version; available: {}", names.join(", ")),
                    });
                }
                name.as_str()
            }
            None => released.first().map_or(CURRENT_VERSION_NAME, String::as_str),
        };

        let mut base_path = normalize_url(&[
            options.base_url.as_str(),
            options.route_base_path.as_str(),
        ]);
        if base_path.len() > 1 && base_path.ends_with('/') {
            base_path.pop();
        }

        let versions = names
            .into_iter()
            .map(|name| {
                let is_current = name == CURRENT_VERSION_NAME;
                let is_last = name == last_version;
                let segment = url_segment(name, is_last, is_current);
                let (docs_dir_path, sidebar_file_path) = if is_current {
                    (
                        site_dir.join(&options.path),
                        site_dir.join(&options.sidebar_path),
                    )
                } else {
                    (
                        site_dir
                            .join(VERSIONED_DOCS_DIR)
                            .join(format!("version-{name}")),
                        site_dir
                            .join(VERSIONED_SIDEBARS_DIR)
                            .join(format!("version-{name}-sidebars.json")),
                    )
                };
                VersionMetadata {
                    version_name: name.to_string(),
                    version_path: normalize_url(&[base_path.as_str(), segment]),
                    docs_dir_path,
                    sidebar_file_path,
                    is_last,
                    is_current,
                }
            })
            .collect();

        Ok(Self {
            versions,
            base_path,
        })
    }

    /// All enabled versions, in catalog order.
    pub fn versions(&self) -> &[VersionMetadata] {
        &self.versions
    }

    pub fn get(&self, name: &str) -> Option<&VersionMetadata> {
        self.versions.iter().find(|v| v.version_name == name)
    }

    /// The latest (stable) version.
    pub fn latest(&self) -> &VersionMetadata {
        // `from_options` guarantees exactly one latest version.
        self.versions
            .iter()
            .find(|v| v.is_last)
            .unwrap_or(&self.versions[0])
    }

    /// Docs root path shared by all versions, e.g. `/docs`.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Position of a version in catalog order; unknown names sort last.
    pub fn position(&self, name: &str) -> usize {
        self.versions
            .iter()
            .position(|v| v.version_name == name)
            .unwrap_or(usize::MAX)
    }

    /// URL segment of a version: empty for the latest, `next` for the
    /// in-development version, the version name otherwise.
    pub fn version_url_segment<'a>(&'a self, name: &'a str) -> &'a str {
        match self.get(name) {
            Some(v) => url_segment(&v.version_name, v.is_last, v.is_current),
            None => name,
        }
    }

    /// Corpus-wide id of a document or sidebar declared inside `version`.
    pub fn global_id(version: &VersionMetadata, id: &str) -> String {
        versioned_id(&version.version_name, version.is_current, id)
    }

    /// Paths the surrounding build tool should watch for changes: each
    /// version's sidebar file and its docs root joined with every include
    /// pattern.
    pub fn watch_paths(&self, include: &[String]) -> Vec<PathBuf> {
        self.versions
            .iter()
            .flat_map(|v| {
                std::iter::once(v.sidebar_file_path.clone())
                    .chain(include.iter().map(|pattern| v.docs_dir_path.join(pattern)))
            })
            .collect()
    }
}

fn url_segment<'a>(name: &'a str, is_last: bool, is_current: bool) -> &'a str {
    if is_last {
        ""
    } else if is_current {
        CURRENT_VERSION_SEGMENT
    } else {
        name
    }
}

fn validate_version_names(names: &[String]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for name in names {
        let reason = if name.trim().is_empty() {
            Some("version names must not be empty".to_string())
        } else if name.contains('/') || name.contains('\\') {
            Some("version names must not contain path separators".to_string())
        } else if name == CURRENT_VERSION_NAME {
            Some(format!(
                "`{CURRENT_VERSION_NAME}` is reserved for the in-development version"
            ))
        } else if !seen.insert(name.as_str()) {
            Some("declared more than once".to_string())
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(ConfigError::InvalidOption {
                option: "versions",
                value: name.clone(),
                reason,
            });
        }
    }
    Ok(())
}
