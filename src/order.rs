//! Previous/next ordering from sidebar position.
//!
//! Each sidebar is flattened pre-order into the sequence of its doc-backed
//! links; categories are transparent and plain links (external URLs, `ref`
//! items) are skipped. Neighbours in that sequence become each other's
//! previous/next, and every doc in it belongs to the enclosing sidebar:
//!
//! ```text
//! [A, Category[B, C], D]   →   A B C D
//!                              B.previous = A, B.next = C, C.next = D
//! ```
//!
//! A doc may appear in at most one place across all sidebars; a second
//! occurrence is an error rather than silently overriding the first.

use crate::types::{Order, OrderMetadata, SidebarItem, Sidebars};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrderError {
    #[error("Doc `{doc_id}` is referenced by sidebar `{first}` and again by sidebar `{second}`")]
    DuplicateDoc {
        doc_id: String,
        first: String,
        second: String,
    },
}

/// Compute sidebar membership and neighbours for every referenced doc.
pub fn resolve_order(sidebars: &Sidebars) -> Result<Order, OrderError> {
    let mut order = Order::new();
    let mut seen: HashMap<&str, &str> = HashMap::new();

    for (sidebar_id, items) in sidebars {
        let ids = flatten_doc_ids(items);

        for &id in &ids {
            if let Some(first) = seen.insert(id, sidebar_id.as_str()) {
                return Err(OrderError::DuplicateDoc {
                    doc_id: id.to_string(),
                    first: first.to_string(),
                    second: sidebar_id.clone(),
                });
            }
        }

        for (i, id) in ids.iter().enumerate() {
            let previous = i.checked_sub(1).map(|p| ids[p].to_string());
            let next = ids.get(i + 1).map(|n| n.to_string());
            order.insert(
                id.to_string(),
                OrderMetadata {
                    previous,
                    next,
                    sidebar: Some(sidebar_id.clone()),
                },
            );
        }
    }

    Ok(order)
}

/// Pre-order sequence of the doc ids linked from a sidebar.
pub fn flatten_doc_ids(items: &[SidebarItem]) -> Vec<&str> {
    let mut ids = Vec::new();
    collect_doc_ids(items, &mut ids);
    ids
}

fn collect_doc_ids<'a>(items: &'a [SidebarItem], ids: &mut Vec<&'a str>) {
    for item in items {
        match item {
            SidebarItem::Link {
                doc_id: Some(id), ..
            } => ids.push(id.as_str()),
            SidebarItem::Link { doc_id: None, .. } => {}
            SidebarItem::Category { items, .. } => collect_doc_ids(items, ids),
        }
    }
}
