//! Document discovery and the document registry.
//!
//! Stage 1 of the docver pipeline. Loads the options, builds the
//! [`VersionCatalog`], then for every version walks its docs root and turns
//! each matching file into a [`RawDocument`] through a [`DocumentExtractor`].
//!
//! ## Discovery
//!
//! Files are selected by the `include` globs, matched against the path
//! relative to the version's docs root with `/` separators. Hidden files and
//! directories (leading `.`) are skipped entirely. The result is sorted so
//! every later stage sees the same order on every run.
//!
//! ## Parallelism
//!
//! Versions are scanned in parallel and, inside a version, files are
//! extracted in parallel. Each task returns its documents; the registry is
//! built afterwards on one thread, which is also where duplicate global ids
//! and duplicate permalinks are caught.

use crate::config::{self, ConfigError, DocsOptions};
use crate::metadata::{DocumentExtractor, ExtractContext, ExtractError, MarkdownExtractor};
use crate::naming::posix_path;
use crate::types::RawDocument;
use crate::versions::VersionCatalog;
use glob::{MatchOptions, Pattern};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Docs directory of version `{version}` not found: {}", .path.display())]
    MissingDocsDir { version: String, path: PathBuf },
    #[error("Cannot walk docs directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Failed to read doc metadata from {}: {source}", .path.display())]
    Extract {
        path: PathBuf,
        #[source]
        source: ExtractError,
    },
    #[error("Duplicate doc id `{id}`: declared by {first} and {second}")]
    DuplicateId {
        id: String,
        first: String,
        second: String,
    },
    #[error("Duplicate permalink `{permalink}`: served by both {first} and {second}")]
    DuplicatePermalink {
        permalink: String,
        first: String,
        second: String,
    },
}

/// Global doc id → document, across all versions.
pub type Registry = BTreeMap<String, RawDocument>;

/// Output of the scan stage.
#[derive(Debug)]
pub struct Manifest {
    pub options: DocsOptions,
    pub catalog: VersionCatalog,
    pub docs: Registry,
}

/// Load `docver.toml` and scan a site with the stock markdown extractor.
pub fn scan(site_dir: &Path) -> Result<Manifest, ScanError> {
    let options = config::load_config(site_dir)?;
    scan_with_extractor(&MarkdownExtractor, site_dir, options)
}

/// Scan a site using a specific extractor and already-loaded options.
pub fn scan_with_extractor(
    extractor: &impl DocumentExtractor,
    site_dir: &Path,
    options: DocsOptions,
) -> Result<Manifest, ScanError> {
    let catalog = VersionCatalog::from_options(site_dir, &options)?;
    let docs = scan_versions(extractor, site_dir, &catalog, &options)?;

    tracing::info!(
        versions = catalog.versions().len(),
        docs = docs.len(),
        "Scan complete"
    );

    Ok(Manifest {
        options,
        catalog,
        docs,
    })
}

/// Extract the documents of every version and merge them into one registry.
pub fn scan_versions(
    extractor: &impl DocumentExtractor,
    site_dir: &Path,
    catalog: &VersionCatalog,
    options: &DocsOptions,
) -> Result<Registry, ScanError> {
    let patterns = options.include_patterns()?;

    let per_version: Vec<Vec<RawDocument>> = catalog
        .versions()
        .par_iter()
        .map(|version| {
            let ctx = ExtractContext {
                site_dir,
                version,
                options,
            };
            scan_version(extractor, &ctx, &patterns)
        })
        .collect::<Result<_, _>>()?;

    let mut registry = Registry::new();
    let mut permalinks: HashMap<String, String> = HashMap::new();
    for doc in per_version.into_iter().flatten() {
        if let Some(first) = registry.get(&doc.id) {
            return Err(ScanError::DuplicateId {
                id: doc.id,
                first: first.source.clone(),
                second: doc.source,
            });
        }
        if let Some(first) = permalinks.get(&doc.permalink) {
            return Err(ScanError::DuplicatePermalink {
                permalink: doc.permalink,
                first: first.clone(),
                second: doc.source,
            });
        }
        permalinks.insert(doc.permalink.clone(), doc.source.clone());
        registry.insert(doc.id.clone(), doc);
    }
    Ok(registry)
}

/// Discover and extract the documents of one version.
pub fn scan_version(
    extractor: &impl DocumentExtractor,
    ctx: &ExtractContext<'_>,
    patterns: &[Pattern],
) -> Result<Vec<RawDocument>, ScanError> {
    let root = &ctx.version.docs_dir_path;
    if !root.is_dir() {
        return Err(ScanError::MissingDocsDir {
            version: ctx.version.version_name.clone(),
            path: root.clone(),
        });
    }

    let sources = discover_sources(root, patterns)?;
    let docs = sources
        .par_iter()
        .map(|relative| {
            extractor
                .extract(ctx, relative)
                .map_err(|source| ScanError::Extract {
                    path: root.join(relative),
                    source,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        version = %ctx.version.version_name,
        doc_count = docs.len(),
        "Version scanned"
    );
    Ok(docs)
}

/// Files under `root` matching any of `patterns`, as sorted relative paths.
pub fn discover_sources(root: &Path, patterns: &[Pattern]) -> Result<Vec<PathBuf>, ScanError> {
    let match_options = MatchOptions {
        require_literal_separator: true,
        ..MatchOptions::new()
    };

    let mut sources = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| !is_hidden(e));
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let candidate = posix_path(relative);
        if patterns
            .iter()
            .any(|p| p.matches_with(&candidate, match_options))
        {
            sources.push(relative.to_path_buf());
        }
    }
    sources.sort();
    Ok(sources)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}
