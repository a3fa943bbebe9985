//! Shared test utilities for the docver test suite.
//!
//! Provides fixture setup, hand-built documents and versions, and lookup
//! helpers that panic with the available keys on a miss.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let content = load_content(tmp.path()).unwrap();
//!
//! let doc = find_doc(&content.linked.docs, "guides/install");
//! assert_eq!(doc.sidebar.as_deref(), Some("docs"));
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use tempfile::TempDir;

use crate::config::DocsOptions;
use crate::naming::versioned_id;
use crate::types::{RawDocument, RouteConfig, VersionMetadata};
use crate::versions::{CURRENT_VERSION_NAME, VersionCatalog};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Hand-built inputs
// =========================================================================

fn version_path(name: &str) -> String {
    format!("/docs/{name}")
}

/// A version under `/docs/<name>` rooted at `/site`; never the latest.
pub fn version(name: &str, is_current: bool) -> VersionMetadata {
    let root = Path::new("/site");
    VersionMetadata {
        version_name: name.to_string(),
        version_path: version_path(name),
        docs_dir_path: if is_current {
            root.join("docs")
        } else {
            root.join(format!("versioned_docs/version-{name}"))
        },
        sidebar_file_path: root.join("sidebars.json"),
        is_last: false,
        is_current,
    }
}

/// Version `name` out of a real catalog rooted at `site_dir` with the given
/// released versions.
pub fn version_in(site_dir: &Path, name: &str, released: &[&str]) -> VersionMetadata {
    let options = DocsOptions {
        versions: released.iter().map(|s| s.to_string()).collect(),
        ..DocsOptions::default()
    };
    let catalog = VersionCatalog::from_options(site_dir, &options).unwrap();
    catalog
        .get(name)
        .cloned()
        .unwrap_or_else(|| panic!("version '{name}' not in catalog"))
}

/// A document of `version` with a permalink under `/docs/<version>/`.
pub fn raw_doc(version: &str, unversioned_id: &str, title: &str) -> RawDocument {
    let is_current = version == CURRENT_VERSION_NAME;
    let docs_dir = if is_current {
        "docs".to_string()
    } else {
        format!("versioned_docs/version-{version}")
    };
    RawDocument {
        version: version.to_string(),
        unversioned_id: unversioned_id.to_string(),
        id: versioned_id(version, is_current, unversioned_id),
        is_docs_home_page: false,
        title: title.to_string(),
        description: String::new(),
        source: format!("@site/{docs_dir}/{unversioned_id}.md"),
        slug: format!("/{unversioned_id}"),
        permalink: format!("{}/{unversioned_id}", version_path(version)),
        sidebar_label: None,
        edit_url: None,
        last_updated_at: None,
        last_updated_by: None,
    }
}

// =========================================================================
// Lookups: panic with a clear message on miss
// =========================================================================

/// Find a value by key in any id-keyed map. Panics if not found.
pub fn find_doc<'a, T>(docs: &'a BTreeMap<String, T>, id: &str) -> &'a T {
    docs.get(id).unwrap_or_else(|| {
        let ids: Vec<&str> = docs.keys().map(String::as_str).collect();
        panic!("doc '{id}' not found. Available: {ids:?}")
    })
}

/// Find a route by path, searching nested routes. Panics if not found.
pub fn find_route<'a>(routes: &'a [RouteConfig], path: &str) -> &'a RouteConfig {
    fn search<'a>(routes: &'a [RouteConfig], path: &str) -> Option<&'a RouteConfig> {
        routes.iter().find_map(|r| {
            if r.path == path {
                Some(r)
            } else {
                search(&r.routes, path)
            }
        })
    }
    search(routes, path).unwrap_or_else(|| {
        let paths = route_paths(routes);
        panic!("route '{path}' not found. Available: {paths:?}")
    })
}

/// Every route path, depth-first.
pub fn route_paths(routes: &[RouteConfig]) -> Vec<&str> {
    let mut paths = Vec::new();
    for route in routes {
        paths.push(route.path.as_str());
        paths.extend(route_paths(&route.routes));
    }
    paths
}
