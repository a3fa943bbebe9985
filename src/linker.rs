//! Joins documents with their sidebar order.
//!
//! One pass over the registry attaches each document's sidebar membership and
//! turns its previous/next ids into `{title, permalink}` snapshots. The same
//! pass builds the reverse indices later stages need.
//!
//! Order ids are global ids, so a `previous` in version `1.0.0` can never
//! resolve to the same-named doc of another version. An order entry pointing
//! at a doc the registry does not have means the sidebar stage and the
//! registry disagree about the id space; that is reported as an internal
//! error rather than a user error.

use crate::types::{LinkedDocument, NavLink, Order, RawDocument};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LinkError {
    #[error("[internal error] {0}")]
    Internal(String),
}

/// Linked documents and the indices derived from them.
#[derive(Debug, Default)]
pub struct LinkedContent {
    /// Global id → linked document.
    pub docs: BTreeMap<String, LinkedDocument>,
    /// `@site/...` source → permalink, for resolving markdown links.
    pub source_to_permalink: BTreeMap<String, String>,
    /// Permalink → id of the sidebar the document appears in.
    pub permalink_to_sidebar: BTreeMap<String, String>,
    /// Version name → ids of the sidebars its documents appear in.
    pub version_to_sidebars: BTreeMap<String, BTreeSet<String>>,
}

pub fn link(docs: &BTreeMap<String, RawDocument>, order: &Order) -> Result<LinkedContent, LinkError> {
    if let Some(id) = order.keys().find(|id| !docs.contains_key(*id)) {
        return Err(LinkError::Internal(format!(
            "sidebar order references doc `{id}` missing from the registry"
        )));
    }

    let mut linked = LinkedContent::default();

    for (id, doc) in docs {
        let meta = order.get(id).cloned().unwrap_or_default();
        let previous = meta
            .previous
            .map(|p| nav_link(docs, id, &p))
            .transpose()?;
        let next = meta.next.map(|n| nav_link(docs, id, &n)).transpose()?;

        linked
            .source_to_permalink
            .insert(doc.source.clone(), doc.permalink.clone());
        if let Some(sidebar) = &meta.sidebar {
            linked
                .permalink_to_sidebar
                .insert(doc.permalink.clone(), sidebar.clone());
            linked
                .version_to_sidebars
                .entry(doc.version.clone())
                .or_default()
                .insert(sidebar.clone());
        }

        linked.docs.insert(
            id.clone(),
            LinkedDocument {
                doc: doc.clone(),
                sidebar: meta.sidebar,
                previous,
                next,
            },
        );
    }

    tracing::debug!(
        docs = linked.docs.len(),
        in_sidebars = linked.permalink_to_sidebar.len(),
        "Documents linked"
    );
    Ok(linked)
}

fn nav_link(
    docs: &BTreeMap<String, RawDocument>,
    from: &str,
    target: &str,
) -> Result<NavLink, LinkError> {
    let doc = docs.get(target).ok_or_else(|| {
        LinkError::Internal(format!(
            "neighbour `{target}` of doc `{from}` is missing from the registry"
        ))
    })?;
    Ok(NavLink {
        title: doc.title.clone(),
        permalink: doc.permalink.clone(),
    })
}
