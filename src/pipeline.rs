//! End-to-end content loading and emission.
//!
//! ```text
//! docver.toml ─► VersionCatalog ─► scan (per version, parallel)
//!                                     │  barrier: one registry by global id
//!                                     ▼
//!               sidebars (per version, parallel) ─► order ─► link ─► emit ─► write
//! ```
//!
//! Sidebars can only be normalized once the registry is complete, since doc
//! references resolve against it. Nothing touches the output directory until
//! every stage has succeeded.

use crate::config::{self, ConfigError, DocsOptions};
use crate::generate::{self, Emitted, GenerateError};
use crate::linker::{self, LinkError, LinkedContent};
use crate::metadata::{DocumentExtractor, MarkdownExtractor};
use crate::order::{OrderError, resolve_order};
use crate::scan::{self, Manifest, Registry, ScanError};
use crate::sidebar::{SidebarError, load_version_sidebars};
use crate::types::{Order, Sidebars};
use crate::versions::VersionCatalog;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
    #[error("Sidebar error: {0}")]
    Sidebar(#[from] SidebarError),
    #[error("Order error: {0}")]
    Order(#[from] OrderError),
    #[error("Link error: {0}")]
    Link(#[from] LinkError),
    #[error("Generate error: {0}")]
    Generate(#[from] GenerateError),
}

/// Everything known about the corpus after loading, before emission.
#[derive(Debug)]
pub struct LoadedContent {
    pub options: DocsOptions,
    pub catalog: VersionCatalog,
    pub docs: Registry,
    /// Version name → normalized sidebars of that version.
    pub sidebars: BTreeMap<String, Sidebars>,
    pub order: Order,
    pub linked: LinkedContent,
}

/// Load `docver.toml` and the whole corpus with the stock extractor.
pub fn load_content(site_dir: &Path) -> Result<LoadedContent, BuildError> {
    let options = config::load_config(site_dir)?;
    load_content_with_extractor(&MarkdownExtractor, site_dir, options)
}

pub fn load_content_with_extractor(
    extractor: &impl DocumentExtractor,
    site_dir: &Path,
    options: DocsOptions,
) -> Result<LoadedContent, BuildError> {
    let Manifest {
        options,
        catalog,
        docs,
    } = scan::scan_with_extractor(extractor, site_dir, options)?;

    let sidebars: BTreeMap<String, Sidebars> = catalog
        .versions()
        .par_iter()
        .map(|version| {
            load_version_sidebars(version, docs.values())
                .map(|s| (version.version_name.clone(), s))
        })
        .collect::<Result<_, SidebarError>>()?;

    let mut order = Order::new();
    for version_sidebars in sidebars.values() {
        order.extend(resolve_order(version_sidebars)?);
    }

    let linked = linker::link(&docs, &order)?;

    tracing::info!(
        versions = catalog.versions().len(),
        docs = docs.len(),
        sidebars = sidebars.values().map(BTreeMap::len).sum::<usize>(),
        "Content loaded"
    );

    Ok(LoadedContent {
        options,
        catalog,
        docs,
        sidebars,
        order,
        linked,
    })
}

/// Build routes, payloads and global data from loaded content.
pub fn emit(content: &LoadedContent) -> Result<Emitted, BuildError> {
    Ok(generate::emit(
        &content.catalog,
        &content.options,
        &content.sidebars,
        &content.linked,
    )?)
}

/// Load, emit and write everything to `out_dir`.
pub fn build(site_dir: &Path, out_dir: &Path) -> Result<(LoadedContent, Emitted), BuildError> {
    let options = config::load_config(site_dir)?;
    build_with_options(site_dir, out_dir, options)
}

pub fn build_with_options(
    site_dir: &Path,
    out_dir: &Path,
    options: DocsOptions,
) -> Result<(LoadedContent, Emitted), BuildError> {
    let content = load_content_with_extractor(&MarkdownExtractor, site_dir, options)?;
    let emitted = emit(&content)?;
    generate::write(&emitted, out_dir)?;
    Ok((content, emitted))
}

/// Files and globs whose changes should trigger a rebuild.
pub fn watch_paths(site_dir: &Path, options: &DocsOptions) -> Result<Vec<PathBuf>, BuildError> {
    let catalog = VersionCatalog::from_options(site_dir, options)?;
    Ok(catalog.watch_paths(&options.include))
}
