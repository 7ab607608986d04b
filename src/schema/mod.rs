//! Schema layer: sheet names, required columns, node types, and the table model.
//!
//! It owns:
//! - Value (a single loosely typed cell)
//! - Table (ordered columns + positional rows)
//! - optional provenance metadata helpers

pub mod provenance;
pub mod table;
pub mod value;

pub use table::Table;
pub use value::Value;

use std::fmt;
use std::str::FromStr;

pub const SHEET_NODES: &str = "nodes";
pub const SHEET_EDGES: &str = "edges";

pub const REQUIRED_NODE_COLS: [&str; 4] = ["id", "label", "type", "description"];
pub const REQUIRED_EDGE_COLS: [&str; 4] = ["source", "target", "relationship_type", "description"];

/// Node categories offered when entering nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Person,
    Place,
    Institution,
    Group,
}

impl NodeType {
    pub const ALL: [NodeType; 4] = [
        NodeType::Person,
        NodeType::Place,
        NodeType::Institution,
        NodeType::Group,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Person => "Person",
            NodeType::Place => "Place",
            NodeType::Institution => "Institution",
            NodeType::Group => "Group",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeType::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| format!("unknown node type: {}", s))
    }
}

/// Required columns of `required` that `table` lacks, in canonical order.
pub fn missing_columns<'a>(table: &Table, required: &[&'a str]) -> Vec<&'a str> {
    required
        .iter()
        .copied()
        .filter(|c| !table.has_column(c))
        .collect()
}

/// How extra (non-required, non-metadata) columns are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtraOrder {
    /// Keep table order (workbook saves).
    Preserve,
    /// Sort by name (deterministic exports).
    Sorted,
}

/// Canonical column order: required, then well-known metadata, then extras.
pub fn ordered_columns(table: &Table, required: &[&str], extras: ExtraOrder) -> Vec<String> {
    let mut out: Vec<String> = required
        .iter()
        .filter(|c| table.has_column(c))
        .map(|c| c.to_string())
        .collect();

    let extra = table.extra_columns(required);
    out.extend(
        provenance::WELL_KNOWN_METADATA_COLS
            .iter()
            .filter(|m| extra.iter().any(|c| c == *m))
            .map(|m| m.to_string()),
    );

    let mut rest: Vec<String> = extra
        .into_iter()
        .filter(|c| !provenance::WELL_KNOWN_METADATA_COLS.contains(&c.as_str()))
        .collect();
    if extras == ExtraOrder::Sorted {
        rest.sort();
    }
    out.extend(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn node_type_parses_exact_names() {
        assert_eq!("Place".parse::<NodeType>(), Ok(NodeType::Place));
        assert!("person".parse::<NodeType>().is_err());
    }

    #[test]
    fn ordered_columns_puts_metadata_after_required() {
        let t = Table::with_columns(&["zeta", "description", "id", "confidence", "alpha", "label", "source_ref", "type"]);
        assert_eq!(
            ordered_columns(&t, &REQUIRED_NODE_COLS, ExtraOrder::Preserve),
            vec!["id", "label", "type", "description", "source_ref", "confidence", "zeta", "alpha"]
        );
        assert_eq!(
            ordered_columns(&t, &REQUIRED_NODE_COLS, ExtraOrder::Sorted),
            vec!["id", "label", "type", "description", "source_ref", "confidence", "alpha", "zeta"]
        );
    }

    #[test]
    fn missing_columns_in_canonical_order() {
        let t = Table::with_columns(&["label", "source"]);
        assert_eq!(
            missing_columns(&t, &REQUIRED_EDGE_COLS),
            vec!["target", "relationship_type", "description"]
        );
    }
}
