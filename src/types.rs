//! Shared types passed between pipeline stages.
//!
//! Everything here except [`VersionMetadata`] ends up serialized into the
//! JSON payloads consumed by the client-side renderer, so field names are
//! camelCase on the wire.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One declared version of the documentation.
///
/// Built once by [`VersionCatalog`](crate::versions::VersionCatalog) and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionMetadata {
    /// Version name as declared (`next` for the in-development version).
    pub version_name: String,
    /// Public URL prefix of the version, e.g. `/docs` or `/docs/1.0.0`.
    pub version_path: String,
    /// Directory holding the version's documents.
    pub docs_dir_path: PathBuf,
    /// Sidebar declaration file (may not exist).
    pub sidebar_file_path: PathBuf,
    /// Whether this is the latest (stable) version, served at the root segment.
    pub is_last: bool,
    /// Whether this is the in-development version.
    pub is_current: bool,
}

/// Per-document record produced by a
/// [`DocumentExtractor`](crate::metadata::DocumentExtractor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDocument {
    /// Name of the version the document belongs to.
    pub version: String,
    /// Id unique within the version (`guides/install`).
    pub unversioned_id: String,
    /// Id unique across the corpus (`version-1.0.0/guides/install`).
    pub id: String,
    pub is_docs_home_page: bool,
    pub title: String,
    pub description: String,
    /// Site-relative source, e.g. `@site/docs/guides/install.md`.
    pub source: String,
    pub slug: String,
    pub permalink: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sidebar_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_url: Option<String>,
    /// Unix timestamp (seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_by: Option<String>,
}

/// Normalized sidebar item.
///
/// Doc references from the raw declaration have been resolved into links by
/// the time this type exists. A link made from a doc reference keeps the
/// referenced global id in `doc_id`; it is not part of the client payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SidebarItem {
    Link {
        href: String,
        label: String,
        #[serde(skip)]
        doc_id: Option<String>,
    },
    Category {
        label: String,
        collapsed: bool,
        items: Vec<SidebarItem>,
    },
}

/// Sidebar id → normalized items, for every version at once.
pub type Sidebars = BTreeMap<String, Vec<SidebarItem>>;

/// Position of a document inside its sidebar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderMetadata {
    pub previous: Option<String>,
    pub next: Option<String>,
    pub sidebar: Option<String>,
}

/// Global doc id → ordering. Documents outside every sidebar are absent.
pub type Order = BTreeMap<String, OrderMetadata>;

/// Title and permalink snapshot of a neighbouring document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavLink {
    pub title: String,
    pub permalink: String,
}

/// A document with its sidebar membership and neighbours attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedDocument {
    #[serde(flatten)]
    pub doc: RawDocument,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sidebar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<NavLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<NavLink>,
}

/// Process-wide navigation index for the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalPluginData {
    /// Root docs path (`base_url` + `route_base_path`).
    pub path: String,
    pub latest_version_name: String,
    pub versions: Vec<GlobalVersion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalVersion {
    pub name: String,
    pub path: String,
    pub main_doc_id: String,
    pub docs: Vec<GlobalDoc>,
}

/// Minimal doc entry of the global index: nothing but id and path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalDoc {
    pub id: String,
    pub path: String,
}

/// Route handed to the surrounding router.
///
/// Version routes are prefix routes (`exact: false`) whose `routes` hold one
/// exact leaf per document. `modules` maps prop names to emitted data files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    pub path: String,
    pub component: String,
    pub exact: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub modules: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<RouteConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
}

impl RouteConfig {
    /// Priority used for matching; routes without one sit at 0.
    pub fn effective_priority(&self) -> i32 {
        self.priority.unwrap_or(0)
    }
}
