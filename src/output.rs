//! CLI output formatting for the load and emit stages.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Every entity
//! (version, document, sidebar item, route) leads with its identity and the
//! URL it is served at; source files and sidebar membership follow as
//! indented context lines.
//!
//! # Output Format
//!
//! ## Load
//!
//! ```text
//! Versions
//! 001 next → /docs/next (5 docs)
//!     Source: docs/
//!     001 Changelog → /docs/next/changelog
//!         Source: @site/docs/changelog.md
//!     002 Configuration → /docs/next/configuration
//!         Source: @site/docs/guides/configure.md
//!         Sidebar: docs
//! 002 1.0.0 → /docs (latest, 2 docs)
//!     ...
//!
//! Sidebars
//! 001 api
//!     001 Reference
//!         001 API Reference → /docs/next/reference
//! 002 docs
//!     ...
//!
//! Loaded 2 versions, 7 docs, 3 sidebars
//! ```
//!
//! ## Emit
//!
//! ```text
//! /docs/next → @theme/DocPage
//!     /docs/next/ → data/site-docs-intro-md-1a2b3c4d.json
//!     ...
//! /docs → @theme/DocPage (priority -1)
//!     ...
//!
//! Wrote 2 version routes, 7 doc routes, 9 data files → .docver
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure.

use crate::generate::Emitted;
use crate::pipeline::LoadedContent;
use crate::types::{RouteConfig, SidebarItem};
use std::path::{Path, PathBuf};

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Index, title and URL of an entity.
///
/// ```text
/// 001 Installation → /docs/next/guides/install
/// ```
fn entity_line(index: usize, title: &str, url: &str) -> String {
    format!("{} {} → {}", format_index(index), title, url)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut)
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}

// ============================================================================
// Sidebar tree walker
// ============================================================================

fn format_sidebar_items(items: &[SidebarItem], depth: usize, lines: &mut Vec<String>) {
    for (i, item) in items.iter().enumerate() {
        match item {
            SidebarItem::Link {
                href,
                label,
                doc_id,
            } => {
                let marker = if doc_id.is_some() { "" } else { " (link)" };
                lines.push(format!(
                    "{}{}{}",
                    indent(depth),
                    entity_line(i + 1, label, href),
                    marker
                ));
            }
            SidebarItem::Category {
                label,
                collapsed,
                items,
            } => {
                let marker = if *collapsed { "" } else { " (expanded)" };
                lines.push(format!(
                    "{}{} {}{}",
                    indent(depth),
                    format_index(i + 1),
                    label,
                    marker
                ));
                format_sidebar_items(items, depth + 1, lines);
            }
        }
    }
}

// ============================================================================
// Load output
// ============================================================================

/// Format what was loaded: every version with its documents, then every
/// sidebar as a tree.
pub fn format_load_output(content: &LoadedContent, site_dir: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Versions".to_string());
    for (vi, version) in content.catalog.versions().iter().enumerate() {
        let docs: Vec<_> = content
            .linked
            .docs
            .values()
            .filter(|d| d.doc.version == version.version_name)
            .collect();
        let detail = if version.is_last {
            format!("latest, {}", plural(docs.len(), "doc"))
        } else {
            plural(docs.len(), "doc")
        };
        lines.push(format!(
            "{} ({})",
            entity_line(vi + 1, &version.version_name, &version.version_path),
            detail
        ));
        let docs_dir = version
            .docs_dir_path
            .strip_prefix(site_dir)
            .unwrap_or(&version.docs_dir_path);
        lines.push(format!("    Source: {}/", docs_dir.display()));

        for (di, linked) in docs.iter().enumerate() {
            let doc = &linked.doc;
            lines.push(format!(
                "    {}",
                entity_line(di + 1, &doc.title, &doc.permalink)
            ));
            lines.push(format!("        Source: {}", doc.source));
            if !doc.description.is_empty() {
                lines.push(format!("        {}", truncate_desc(&doc.description, 60)));
            }
            if let Some(sidebar) = &linked.sidebar {
                lines.push(format!("        Sidebar: {}", sidebar));
            }
        }
    }

    lines.push(String::new());
    lines.push("Sidebars".to_string());
    let mut index = 0;
    for version in content.catalog.versions() {
        let Some(sidebars) = content.sidebars.get(&version.version_name) else {
            continue;
        };
        for (id, items) in sidebars {
            index += 1;
            lines.push(format!("{} {}", format_index(index), id));
            format_sidebar_items(items, 1, &mut lines);
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Loaded {}, {}, {}",
        plural(content.catalog.versions().len(), "version"),
        plural(content.docs.len(), "doc"),
        plural(index, "sidebar")
    ));
    lines
}

/// Print load output to stdout.
pub fn print_load_output(content: &LoadedContent, site_dir: &Path) {
    for line in format_load_output(content, site_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// Emit output
// ============================================================================

fn format_route(route: &RouteConfig, depth: usize, lines: &mut Vec<String>) {
    let target = route
        .modules
        .get("metadata")
        .unwrap_or(&route.component);
    let priority = match route.priority {
        Some(p) => format!(" (priority {})", p),
        None => String::new(),
    };
    lines.push(format!(
        "{}{} → {}{}",
        indent(depth),
        route.path,
        target,
        priority
    ));
    for child in &route.routes {
        format_route(child, depth + 1, lines);
    }
}

/// Format the emitted route tree and a one-line summary.
pub fn format_emit_output(emitted: &Emitted, out_dir: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    for route in &emitted.routes {
        format_route(route, 0, &mut lines);
    }
    let doc_routes: usize = emitted.routes.iter().map(|r| r.routes.len()).sum();

    lines.push(String::new());
    lines.push(format!(
        "Wrote {}, {}, {} → {}",
        plural(emitted.routes.len(), "version route"),
        plural(doc_routes, "doc route"),
        plural(emitted.data_files.len(), "data file"),
        out_dir.display()
    ));
    lines
}

/// Print emit output to stdout.
pub fn print_emit_output(emitted: &Emitted, out_dir: &Path) {
    for line in format_emit_output(emitted, out_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// Watch paths
// ============================================================================

/// One path per line, as the surrounding build tool expects them.
pub fn format_watch_paths(paths: &[PathBuf]) -> Vec<String> {
    paths.iter().map(|p| p.display().to_string()).collect()
}

pub fn print_watch_paths(paths: &[PathBuf]) {
    for line in format_watch_paths(paths) {
        println!("{}", line);
    }
}
