//! Sidebar loading, parsing and normalization.
//!
//! Sidebars are declared per version in a JSON file mapping sidebar ids to
//! their items. Two surface syntaxes are accepted and both end up as the same
//! [`RawSidebarItem`] tree:
//!
//! ```json
//! {
//!   "docs": [
//!     "intro",
//!     { "type": "category", "label": "Guides", "items": ["guides/install"] },
//!     { "type": "link", "href": "https://example.com", "label": "Website" }
//!   ],
//!   "api": {
//!     "Reference": ["api/overview", { "type": "ref", "id": "intro" }]
//!   }
//! }
//! ```
//!
//! - A sidebar is either an array of items or a shorthand object whose keys
//!   are category labels.
//! - An item is a bare doc id, a typed object (`doc`, `ref`, `link`,
//!   `category`) or, again, a shorthand `{ "Label": [items] }` object.
//!
//! Anything else is rejected: unknown `type` values, unknown keys and wrong
//! field types all fail with the offending item in the message.
//!
//! ## Normalization
//!
//! [`normalize_sidebars`] replaces every doc reference with a
//! [`SidebarItem::Link`] to the document's permalink, labelled with its
//! `sidebar_label` or title. `doc` items remember the referenced global id
//! so they take part in previous/next ordering; `ref` items do not. An id
//! with no matching document is a hard error listing every id the version
//! knows about.

use crate::types::{RawDocument, SidebarItem, Sidebars, VersionMetadata};
use crate::versions::VersionCatalog;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SidebarError {
    #[error("Cannot read sidebars {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid sidebar JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid item in sidebar `{sidebar}`: {reason}: {item}")]
    InvalidItem {
        sidebar: String,
        item: String,
        reason: String,
    },
    #[error(
        "Sidebar `{sidebar}` of version `{version}` references unknown doc id `{id}`. Available ids:\n- {}",
        .available.join("\n- ")
    )]
    UnknownDoc {
        version: String,
        sidebar: String,
        id: String,
        available: Vec<String>,
    },
}

/// Sidebar item as declared, before doc references are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawSidebarItem {
    Doc {
        id: String,
    },
    /// Link to a doc that does not take part in previous/next ordering.
    Ref {
        id: String,
    },
    Link {
        href: String,
        label: String,
    },
    Category {
        label: String,
        collapsed: bool,
        items: Vec<RawSidebarItem>,
    },
}

/// Sidebar id (as declared) → raw items.
pub type RawSidebars = BTreeMap<String, Vec<RawSidebarItem>>;

// =============================================================================
// Loading and parsing
// =============================================================================

/// Read and parse a sidebar file. A missing file is an empty sidebar set.
pub fn load_sidebars(path: &Path) -> Result<RawSidebars, SidebarError> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(RawSidebars::new()),
        Err(source) => {
            return Err(SidebarError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let value: Value = serde_json::from_str(&content).map_err(|source| SidebarError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    parse_sidebars(value)
}

/// Parse a sidebar declaration into raw items.
pub fn parse_sidebars(value: Value) -> Result<RawSidebars, SidebarError> {
    let Value::Object(map) = value else {
        return Err(invalid("<root>", &value, "expected an object of sidebars"));
    };
    map.into_iter()
        .map(|(id, sidebar)| {
            let items = parse_sidebar(&id, &sidebar)?;
            Ok((id, items))
        })
        .collect()
}

fn parse_sidebar(sidebar: &str, value: &Value) -> Result<Vec<RawSidebarItem>, SidebarError> {
    match value {
        Value::Array(items) => parse_items(sidebar, items),
        Value::Object(map) => parse_shorthand(sidebar, map),
        other => Err(invalid(
            sidebar,
            other,
            "a sidebar must be an array of items or an object of categories",
        )),
    }
}

fn parse_items(sidebar: &str, items: &[Value]) -> Result<Vec<RawSidebarItem>, SidebarError> {
    let mut parsed = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::String(id) => parsed.push(RawSidebarItem::Doc { id: id.clone() }),
            Value::Object(map) if !map.contains_key("type") => {
                parsed.extend(parse_shorthand(sidebar, map)?);
            }
            Value::Object(map) => parsed.push(parse_typed_item(sidebar, item, map)?),
            other => return Err(invalid(sidebar, other, "unsupported item")),
        }
    }
    Ok(parsed)
}

/// `{ "Label": [items], ... }` → one collapsed category per key.
fn parse_shorthand(
    sidebar: &str,
    map: &Map<String, Value>,
) -> Result<Vec<RawSidebarItem>, SidebarError> {
    map.iter()
        .map(|(label, items)| {
            let Value::Array(items) = items else {
                return Err(invalid(
                    sidebar,
                    items,
                    &format!("items of category `{label}` must be an array"),
                ));
            };
            Ok(RawSidebarItem::Category {
                label: label.clone(),
                collapsed: true,
                items: parse_items(sidebar, items)?,
            })
        })
        .collect()
}

fn parse_typed_item(
    sidebar: &str,
    item: &Value,
    map: &Map<String, Value>,
) -> Result<RawSidebarItem, SidebarError> {
    let kind = map.get("type").and_then(Value::as_str).unwrap_or_default();
    match kind {
        "doc" | "ref" => {
            check_keys(sidebar, item, map, &["type", "id"])?;
            let id = required_str(sidebar, item, map, "id")?;
            Ok(if kind == "doc" {
                RawSidebarItem::Doc { id }
            } else {
                RawSidebarItem::Ref { id }
            })
        }
        "link" => {
            check_keys(sidebar, item, map, &["type", "href", "label"])?;
            Ok(RawSidebarItem::Link {
                href: required_str(sidebar, item, map, "href")?,
                label: required_str(sidebar, item, map, "label")?,
            })
        }
        "category" => {
            check_keys(sidebar, item, map, &["type", "label", "items", "collapsed"])?;
            let label = required_str(sidebar, item, map, "label")?;
            let Some(Value::Array(items)) = map.get("items") else {
                return Err(invalid(sidebar, item, "category `items` must be an array"));
            };
            let collapsed = match map.get("collapsed") {
                None => true,
                Some(Value::Bool(b)) => *b,
                Some(_) => {
                    return Err(invalid(sidebar, item, "category `collapsed` must be a boolean"));
                }
            };
            Ok(RawSidebarItem::Category {
                label,
                collapsed,
                items: parse_items(sidebar, items)?,
            })
        }
        _ => Err(invalid(
            sidebar,
            item,
            "unknown item type, expected doc, ref, link or category",
        )),
    }
}

fn check_keys(
    sidebar: &str,
    item: &Value,
    map: &Map<String, Value>,
    allowed: &[&str],
) -> Result<(), SidebarError> {
    match map.keys().find(|k| !allowed.contains(&k.as_str())) {
        Some(key) => Err(invalid(sidebar, item, &format!("unknown key `{key}`"))),
        None => Ok(()),
    }
}

fn required_str(
    sidebar: &str,
    item: &Value,
    map: &Map<String, Value>,
    key: &str,
) -> Result<String, SidebarError> {
    map.get(key)
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| invalid(sidebar, item, &format!("`{key}` must be a string")))
}

fn invalid(sidebar: &str, item: &Value, reason: &str) -> SidebarError {
    SidebarError::InvalidItem {
        sidebar: sidebar.to_string(),
        item: item.to_string(),
        reason: reason.to_string(),
    }
}

// =============================================================================
// Normalization
// =============================================================================

/// Documents of one version, addressable by unversioned or global id.
pub struct DocIndex<'a> {
    version: &'a VersionMetadata,
    by_id: HashMap<&'a str, &'a RawDocument>,
}

impl<'a> DocIndex<'a> {
    pub fn new(
        version: &'a VersionMetadata,
        docs: impl IntoIterator<Item = &'a RawDocument>,
    ) -> Self {
        let by_id = docs
            .into_iter()
            .filter(|d| d.version == version.version_name)
            .map(|d| (d.id.as_str(), d))
            .collect();
        Self { version, by_id }
    }

    /// Look up a doc by its unversioned id or its global id.
    pub fn resolve(&self, id: &str) -> Option<&'a RawDocument> {
        self.by_id
            .get(VersionCatalog::global_id(self.version, id).as_str())
            .copied()
    }

    /// Every global id of the version, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.by_id.keys().map(|id| id.to_string()).collect();
        ids.sort();
        ids
    }
}

/// Resolve the raw sidebars of one version into normalized items keyed by
/// global sidebar id.
pub fn normalize_sidebars(raw: RawSidebars, index: &DocIndex<'_>) -> Result<Sidebars, SidebarError> {
    raw.into_iter()
        .map(|(id, items)| {
            let sidebar_id = VersionCatalog::global_id(index.version, &id);
            let items = normalize_items(&sidebar_id, items, index)?;
            Ok((sidebar_id, items))
        })
        .collect()
}

fn normalize_items(
    sidebar: &str,
    items: Vec<RawSidebarItem>,
    index: &DocIndex<'_>,
) -> Result<Vec<SidebarItem>, SidebarError> {
    items
        .into_iter()
        .map(|item| normalize_item(sidebar, item, index))
        .collect()
}

fn normalize_item(
    sidebar: &str,
    item: RawSidebarItem,
    index: &DocIndex<'_>,
) -> Result<SidebarItem, SidebarError> {
    match item {
        RawSidebarItem::Doc { id } => {
            let doc = resolve_doc(sidebar, &id, index)?;
            Ok(doc_link(doc, true))
        }
        RawSidebarItem::Ref { id } => {
            let doc = resolve_doc(sidebar, &id, index)?;
            Ok(doc_link(doc, false))
        }
        RawSidebarItem::Link { href, label } => Ok(SidebarItem::Link {
            href,
            label,
            doc_id: None,
        }),
        RawSidebarItem::Category {
            label,
            collapsed,
            items,
        } => Ok(SidebarItem::Category {
            label,
            collapsed,
            items: normalize_items(sidebar, items, index)?,
        }),
    }
}

fn resolve_doc<'a>(
    sidebar: &str,
    id: &str,
    index: &DocIndex<'a>,
) -> Result<&'a RawDocument, SidebarError> {
    index.resolve(id).ok_or_else(|| SidebarError::UnknownDoc {
        version: index.version.version_name.clone(),
        sidebar: sidebar.to_string(),
        id: id.to_string(),
        available: index.ids(),
    })
}

fn doc_link(doc: &RawDocument, ordered: bool) -> SidebarItem {
    SidebarItem::Link {
        href: doc.permalink.clone(),
        label: doc.sidebar_label.clone().unwrap_or_else(|| doc.title.clone()),
        doc_id: ordered.then(|| doc.id.clone()),
    }
}

/// Load, parse and normalize the sidebars of one version.
pub fn load_version_sidebars<'a>(
    version: &'a VersionMetadata,
    docs: impl IntoIterator<Item = &'a RawDocument>,
) -> Result<Sidebars, SidebarError> {
    let raw = load_sidebars(&version.sidebar_file_path)?;
    let index = DocIndex::new(version, docs);
    let sidebars = normalize_sidebars(raw, &index)?;
    tracing::debug!(
        version = %version.version_name,
        sidebar_count = sidebars.len(),
        "Sidebars normalized"
    );
    Ok(sidebars)
}
