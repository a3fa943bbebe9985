//! Centralized URL, slug and id naming.
//!
//! Every public path the pipeline produces goes through this module so that
//! versions, documents, sidebars and emitted data files agree on one
//! convention:
//!
//! - URLs are joined with [`normalize_url`]: single slashes, a leading slash
//!   when the first part has one, and a trailing slash only when the last
//!   part asks for it (`/docs/` for a home page, `/docs/intro` otherwise).
//! - Slugs are resolved relative to the document's directory by
//!   [`resolve_slug`], unless they are absolute.
//! - Ids of non-current versions are prefixed with `version-<name>/` by
//!   [`versioned_id`]. The in-development version keeps bare ids.
//! - Emitted data files are named by [`content_hash_name`], a readable stem
//!   plus a short SHA-256 suffix.

use sha2::{Digest, Sha256};
use std::path::Path;

/// Join URL parts into one normalized path.
///
/// - `["/", "docs", "next"]` → `/docs/next`
/// - `["/docs", "/"]` → `/docs/`
/// - `["/", ""]` → `/`
/// - `["https://github.com/org/repo/", "/edit/docs/a.md"]` → `https://github.com/org/repo/edit/docs/a.md`
pub fn normalize_url(parts: &[&str]) -> String {
    let parts: Vec<&str> = parts.iter().copied().filter(|p| !p.is_empty()).collect();
    let Some(first) = parts.first() else {
        return String::new();
    };
    let keep_trailing = parts.last().is_some_and(|p| p.ends_with('/'));
    let joined = parts.join("/");

    // Keep the `scheme://` separator intact while collapsing the rest.
    let (scheme, rest) = match joined.find("://") {
        Some(pos) if !joined[..pos].contains('/') => joined.split_at(pos + 3),
        _ => ("", joined.as_str()),
    };

    let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
    let mut url = String::with_capacity(joined.len());
    url.push_str(scheme);
    if scheme.is_empty() && first.starts_with('/') {
        url.push('/');
    }
    url.push_str(&segments.join("/"));
    if keep_trailing && !url.ends_with('/') && !segments.is_empty() {
        url.push('/');
    }
    url
}

/// Resolve a document slug against the directory the document lives in.
///
/// Absolute slugs (leading `/`) are kept as-is; relative ones are appended to
/// `/<dir>/`. `.` and `..` segments are folded, never climbing above the root.
///
/// - `("guides", "install")` → `/guides/install`
/// - `("guides", "/setup")` → `/setup`
/// - `("guides/advanced", "../basics")` → `/guides/basics`
/// - `("", "intro")` → `/intro`
pub fn resolve_slug(dir: &str, slug: &str) -> String {
    let joined = if slug.starts_with('/') {
        slug.to_string()
    } else {
        format!("/{dir}/{slug}")
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    let mut resolved = format!("/{}", segments.join("/"));
    if slug.ends_with('/') && resolved != "/" {
        resolved.push('/');
    }
    resolved
}

/// Prefix an id with its version scope.
///
/// The in-development version owns the bare id space; every released version
/// gets `version-<name>/`. Ids that already carry the prefix are returned
/// unchanged so hand-written versioned sidebars can use either form.
pub fn versioned_id(version_name: &str, is_current: bool, id: &str) -> String {
    if is_current {
        return id.to_string();
    }
    let prefix = version_prefix(version_name);
    if id.starts_with(&prefix) {
        id.to_string()
    } else {
        format!("{prefix}{id}")
    }
}

/// `version-<name>/`, the id prefix of a released version.
pub fn version_prefix(version_name: &str) -> String {
    format!("version-{version_name}/")
}

/// Render a path with forward slashes, whatever the host separator.
pub fn posix_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

const MAX_STEM_LEN: usize = 60;

/// Stable, file-system safe name derived from an arbitrary string.
///
/// The stem keeps the alphanumeric characters of the input (lowercased,
/// everything else collapsed to single dashes) so the emitted files stay
/// readable; the 8-hex-digit SHA-256 suffix keeps distinct inputs apart.
/// The root path `/` maps to `index`.
pub fn content_hash_name(input: &str) -> String {
    if input == "/" {
        return "index".to_string();
    }

    let mut stem = String::with_capacity(input.len());
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            stem.push(c.to_ascii_lowercase());
        } else if !stem.ends_with('-') {
            stem.push('-');
        }
    }
    let stem = stem.trim_matches('-');
    let stem = if stem.len() > MAX_STEM_LEN {
        stem[stem.len() - MAX_STEM_LEN..].trim_start_matches('-')
    } else {
        stem
    };

    let digest = format!("{:x}", Sha256::digest(input.as_bytes()));
    format!("{}-{}", stem, &digest[..8])
}
