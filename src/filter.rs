//! View filtering: node type, relationship type, and label search.
//!
//! Filtering only shapes what is displayed. Save and export always work on the
//! full tables.

use crate::schema::Table;

use serde::Serialize;
use std::collections::HashSet;

/// Sentinel meaning "no restriction" for the type and relationship filters.
pub const ALL: &str = "All";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Filters {
    pub node_type: String,
    pub relationship: String,
    pub search: String,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            node_type: ALL.to_string(),
            relationship: ALL.to_string(),
            search: String::new(),
        }
    }
}

impl Filters {
    pub fn is_default(&self) -> bool {
        restriction(&self.node_type).is_none()
            && restriction(&self.relationship).is_none()
            && self.search.trim().is_empty()
    }
}

/// Blank or `All` means unrestricted.
fn restriction(value: &str) -> Option<&str> {
    let v = value.trim();
    (!v.is_empty() && v != ALL).then_some(v)
}

/// Derive the displayed subset. Nodes are narrowed by type and label search;
/// edges survive only when both endpoints survive, then by relationship type.
pub fn apply_filters(nodes: &Table, edges: &Table, filters: &Filters) -> (Table, Table) {
    let node_type = restriction(&filters.node_type);
    let search = filters.search.trim().to_lowercase();

    let filtered_nodes = nodes.retain_rows(|row| {
        let type_ok = node_type.is_none_or(|t| nodes.text(row, "type") == t);
        let search_ok =
            search.is_empty() || nodes.text(row, "label").to_lowercase().contains(&search);
        type_ok && search_ok
    });

    let remaining: HashSet<String> = filtered_nodes.column("id").map(|v| v.as_text()).collect();
    let relationship = restriction(&filters.relationship);

    let filtered_edges = edges.retain_rows(|row| {
        remaining.contains(&edges.text(row, "source"))
            && remaining.contains(&edges.text(row, "target"))
            && relationship.is_none_or(|r| edges.text(row, "relationship_type") == r)
    });

    tracing::debug!(
        nodes = filtered_nodes.len(),
        edges = filtered_edges.len(),
        "applied view filters"
    );

    (filtered_nodes, filtered_edges)
}
