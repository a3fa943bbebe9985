//! Route and global-index emission.
//!
//! Final stage of the docver pipeline. Turns linked documents into what the
//! surrounding site generator consumes:
//!
//! - **Routes**: one prefix route per version, holding an exact leaf route
//!   per document.
//! - **Data files**: the full [`LinkedDocument`] of every doc, plus one
//!   navigation payload per version (the sidebars its docs belong to and the
//!   permalink → sidebar map). Sidebars without a member doc are left out.
//! - **Global data**: a minimal index of every version for client-side
//!   navigation (`{id, path}` per doc, nothing more).
//!
//! ## Output Structure
//!
//! ```text
//! .docver/
//! ├── routes.json
//! ├── global-data.json
//! └── data/
//!     ├── site-docs-intro-md-3f2a9c1e.json            # per doc
//!     └── version-next-metadata-8b0d4e77.json         # per version
//! ```
//!
//! ## Route Priority
//!
//! The latest version is served at the root docs path, which is a prefix of
//! every other version's path. Its route gets priority `-1` so routers try
//! `/docs/next/...` and `/docs/1.0.0/...` before falling back to `/docs/...`.
//!
//! ## Parallelism
//!
//! Each version is emitted independently and returns a fragment; fragments
//! are merged on one thread and sorted by catalog order, so the output is
//! identical whatever order the workers finish in.

use crate::config::DocsOptions;
use crate::linker::LinkedContent;
use crate::naming::content_hash_name;
use crate::types::{
    GlobalDoc, GlobalPluginData, GlobalVersion, LinkedDocument, RouteConfig, SidebarItem,
    Sidebars, VersionMetadata,
};
use crate::versions::VersionCatalog;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const ROUTES_FILE: &str = "routes.json";
pub const GLOBAL_DATA_FILE: &str = "global-data.json";
pub const DATA_DIR: &str = "data";

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Version `{0}` has no documents")]
    EmptyVersion(String),
    #[error("[internal error] data file `{0}` emitted twice")]
    DuplicateDataFile(String),
}

/// A JSON payload to persist, addressed relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFile {
    pub path: String,
    pub contents: String,
}

/// Everything the emitter produces, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emitted {
    pub routes: Vec<RouteConfig>,
    pub data_files: Vec<DataFile>,
    pub global_data: GlobalPluginData,
}

/// Navigation payload of one version.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionNavigation<'a> {
    pub docs_sidebars: BTreeMap<&'a str, &'a [SidebarItem]>,
    pub permalink_to_sidebar: BTreeMap<&'a str, &'a str>,
    pub version: &'a str,
}

struct VersionFragment {
    position: usize,
    route: RouteConfig,
    data_files: Vec<DataFile>,
    global: GlobalVersion,
}

/// Build routes, data payloads and the global index for every version.
///
/// `sidebars` maps version names to that version's normalized sidebars.
pub fn emit(
    catalog: &VersionCatalog,
    options: &DocsOptions,
    sidebars: &BTreeMap<String, Sidebars>,
    linked: &LinkedContent,
) -> Result<Emitted, GenerateError> {
    let mut by_version: BTreeMap<&str, Vec<&LinkedDocument>> = BTreeMap::new();
    for doc in linked.docs.values() {
        by_version.entry(doc.doc.version.as_str()).or_default().push(doc);
    }

    let mut fragments: Vec<VersionFragment> = catalog
        .versions()
        .par_iter()
        .map(|version| {
            let docs = by_version
                .get(version.version_name.as_str())
                .map(Vec::as_slice)
                .unwrap_or_default();
            emit_version(
                version,
                catalog.position(&version.version_name),
                docs,
                sidebars.get(&version.version_name),
                linked.version_to_sidebars.get(&version.version_name),
                options,
            )
        })
        .collect::<Result<_, GenerateError>>()?;

    fragments.sort_by_key(|f| f.position);

    let mut routes = Vec::with_capacity(fragments.len());
    let mut versions = Vec::with_capacity(fragments.len());
    let mut data_files = Vec::new();
    let mut seen = HashSet::new();
    for fragment in fragments {
        for file in &fragment.data_files {
            if !seen.insert(file.path.clone()) {
                return Err(GenerateError::DuplicateDataFile(file.path.clone()));
            }
        }
        routes.push(fragment.route);
        versions.push(fragment.global);
        data_files.extend(fragment.data_files);
    }

    tracing::info!(
        routes = routes.len(),
        data_files = data_files.len(),
        "Emission complete"
    );

    Ok(Emitted {
        routes,
        data_files,
        global_data: GlobalPluginData {
            path: catalog.base_path().to_string(),
            latest_version_name: catalog.latest().version_name.clone(),
            versions,
        },
    })
}

/// Emit one version. `docs` must be sorted by global id.
fn emit_version(
    version: &VersionMetadata,
    position: usize,
    docs: &[&LinkedDocument],
    sidebars: Option<&Sidebars>,
    reachable: Option<&BTreeSet<String>>,
    options: &DocsOptions,
) -> Result<VersionFragment, GenerateError> {
    let main_doc = docs
        .iter()
        .find(|d| d.doc.is_docs_home_page || d.doc.slug == "/")
        .or_else(|| docs.first())
        .ok_or_else(|| GenerateError::EmptyVersion(version.version_name.clone()))?;

    let mut data_files = Vec::with_capacity(docs.len() + 1);
    let mut doc_routes = Vec::with_capacity(docs.len());
    for doc in docs {
        let path = data_file_path(&doc.doc.source);
        data_files.push(DataFile {
            path: path.clone(),
            contents: serde_json::to_string_pretty(doc)?,
        });
        doc_routes.push(RouteConfig {
            path: doc.doc.permalink.clone(),
            component: options.doc_item_component.clone(),
            exact: true,
            modules: BTreeMap::from([
                ("content".to_string(), doc.doc.source.clone()),
                ("metadata".to_string(), path),
            ]),
            routes: Vec::new(),
            priority: None,
        });
    }
    doc_routes.sort_by(|a, b| a.path.cmp(&b.path));

    let navigation = VersionNavigation {
        docs_sidebars: match (sidebars, reachable) {
            (Some(sidebars), Some(reachable)) => sidebars
                .iter()
                .filter(|(id, _)| reachable.contains(*id))
                .map(|(id, items)| (id.as_str(), items.as_slice()))
                .collect(),
            _ => BTreeMap::new(),
        },
        permalink_to_sidebar: docs
            .iter()
            .filter_map(|d| {
                d.sidebar
                    .as_deref()
                    .map(|s| (d.doc.permalink.as_str(), s))
            })
            .collect(),
        version: &version.version_name,
    };
    let navigation_path =
        data_file_path(&format!("version-{}-metadata", version.version_name));
    data_files.push(DataFile {
        path: navigation_path.clone(),
        contents: serde_json::to_string_pretty(&navigation)?,
    });

    let mut global_docs: Vec<GlobalDoc> = docs
        .iter()
        .map(|d| GlobalDoc {
            id: d.doc.unversioned_id.clone(),
            path: d.doc.permalink.clone(),
        })
        .collect();
    global_docs.sort_by(|a, b| a.id.cmp(&b.id));

    tracing::debug!(
        version = %version.version_name,
        docs = docs.len(),
        main_doc = %main_doc.doc.id,
        "Version emitted"
    );

    Ok(VersionFragment {
        position,
        route: RouteConfig {
            path: version.version_path.clone(),
            component: options.doc_layout_component.clone(),
            exact: false,
            modules: BTreeMap::from([("docsMetadata".to_string(), navigation_path)]),
            routes: doc_routes,
            priority: version.is_last.then_some(-1),
        },
        data_files,
        global: GlobalVersion {
            name: version.version_name.clone(),
            path: version.version_path.clone(),
            main_doc_id: main_doc.doc.unversioned_id.clone(),
            docs: global_docs,
        },
    })
}

fn data_file_path(key: &str) -> String {
    format!("{DATA_DIR}/{}.json", content_hash_name(key))
}

/// Persist routes, global data and every data file under `out_dir`.
///
/// The data directory is recreated so payloads of removed docs do not
/// linger from a previous build.
pub fn write(emitted: &Emitted, out_dir: &Path) -> Result<(), GenerateError> {
    let data_dir = out_dir.join(DATA_DIR);
    if data_dir.exists() {
        fs::remove_dir_all(&data_dir)?;
    }
    fs::create_dir_all(&data_dir)?;

    for file in &emitted.data_files {
        fs::write(out_dir.join(&file.path), &file.contents)?;
    }
    fs::write(
        out_dir.join(ROUTES_FILE),
        serde_json::to_string_pretty(&emitted.routes)?,
    )?;
    fs::write(
        out_dir.join(GLOBAL_DATA_FILE),
        serde_json::to_string_pretty(&emitted.global_data)?,
    )?;

    tracing::info!(out_dir = %out_dir.display(), "Output written");
    Ok(())
}
