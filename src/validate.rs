//! Dataset validation: schema completeness and referential integrity.
//!
//! Unlike load-time schema errors, validation issues are non-fatal: the tables
//! stay viewable, but save and export are refused until the list is empty.

use crate::schema::{self, REQUIRED_EDGE_COLS, REQUIRED_NODE_COLS, Table, Value};

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Nodes,
    Edges,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Nodes => f.write_str("nodes"),
            Location::Edges => f.write_str("edges"),
        }
    }
}

/// One integrity problem. `row` is the 0-based table row, absent for
/// column-level problems.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub severity: Severity,
    pub location: Location,
    pub row: Option<usize>,
    pub message: String,
}

impl Issue {
    fn error(location: Location, row: Option<usize>, message: String) -> Self {
        Self {
            severity: Severity::Error,
            location,
            row,
            message,
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.location, self.message)
    }
}

/// Validate a node/edge table pair. Issues come back grouped by rule, in row
/// order within each rule; an empty list means the dataset is valid.
pub fn validate(nodes: &Table, edges: &Table) -> Vec<Issue> {
    let mut issues = Vec::new();

    // Rules 1-2: required columns on both tables.
    let missing_node_cols = schema::missing_columns(nodes, &REQUIRED_NODE_COLS);
    for col in &missing_node_cols {
        issues.push(Issue::error(
            Location::Nodes,
            None,
            format!("Missing required column '{}' in nodes sheet", col),
        ));
    }

    let missing_edge_cols = schema::missing_columns(edges, &REQUIRED_EDGE_COLS);
    for col in &missing_edge_cols {
        issues.push(Issue::error(
            Location::Edges,
            None,
            format!("Missing required column '{}' in edges sheet", col),
        ));
    }

    if !missing_node_cols.is_empty() {
        return issues;
    }

    // Rule 3: missing node ids.
    for (row, id) in nodes.column("id").enumerate() {
        if id.is_missing() {
            issues.push(Issue::error(
                Location::Nodes,
                Some(row),
                format!("Missing node id at row {}", row),
            ));
        }
    }

    // Rule 4: every row sharing a duplicated id is reported.
    let mut id_counts: BTreeMap<String, usize> = BTreeMap::new();
    for id in nodes.column("id").filter(|v| !v.is_missing()) {
        *id_counts.entry(id.as_text()).or_default() += 1;
    }
    for (row, id) in nodes.column("id").enumerate() {
        if id.is_missing() {
            continue;
        }
        let key = id.as_text();
        if id_counts.get(&key).copied().unwrap_or(0) > 1 {
            issues.push(Issue::error(
                Location::Nodes,
                Some(row),
                format!("Duplicate node id '{}' at row {}", key, row),
            ));
        }
    }

    if !missing_edge_cols.is_empty() {
        return issues;
    }

    let known_ids: HashSet<String> = id_counts.into_keys().collect();

    // Rule 5: missing endpoints, all sources first, then all targets.
    for column in ["source", "target"] {
        for (row, v) in edges.column(column).enumerate() {
            if v.is_missing() {
                issues.push(Issue::error(
                    Location::Edges,
                    Some(row),
                    format!("Missing edge {} at row {}", column, row),
                ));
            }
        }
    }

    // Rules 6-7: endpoints that name no known node.
    for column in ["source", "target"] {
        for (row, v) in edges.column(column).enumerate() {
            if is_unknown(v, &known_ids) {
                issues.push(Issue::error(
                    Location::Edges,
                    Some(row),
                    format!("Unknown edge {} '{}' at row {}", column, v, row),
                ));
            }
        }
    }

    issues
}

fn is_unknown(v: &Value, known_ids: &HashSet<String>) -> bool {
    !v.is_missing() && !known_ids.contains(&v.as_text())
}
