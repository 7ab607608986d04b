//! Preconditions for single-record edits.
//!
//! Guards never touch the tables; they only say whether an add/edit/delete may
//! proceed, and why not.

use crate::error::InputError;
use crate::schema::provenance::{is_valid_optional_date, parse_optional_confidence};
use crate::schema::{NodeType, Table};

use std::collections::HashSet;

/// Fields entered for a node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeInput {
    pub id: String,
    pub label: String,
    pub node_type: String,
    pub description: String,
    pub metadata: MetadataInput,
}

/// Fields entered for an edge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeInput {
    pub source: String,
    pub target: String,
    pub relationship_type: String,
    pub description: String,
    pub metadata: MetadataInput,
}

/// Optional provenance entries. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataInput {
    pub source_ref: Option<String>,
    pub date: Option<String>,
    pub confidence: Option<String>,
}

impl MetadataInput {
    pub fn is_empty(&self) -> bool {
        self.source_ref.is_none() && self.date.is_none() && self.confidence.is_none()
    }
}

/// True iff no node other than `exclude_row` already uses `candidate`.
pub fn is_unique_node_id(nodes: &Table, candidate: &str, exclude_row: Option<usize>) -> bool {
    !nodes
        .column("id")
        .enumerate()
        .any(|(row, id)| Some(row) != exclude_row && id.as_text() == candidate)
}

/// Number of edges naming `node_id` as source or target.
pub fn edge_reference_count(edges: &Table, node_id: &str) -> usize {
    edges
        .column("source")
        .zip(edges.column("target"))
        .filter(|(s, t)| s.as_text() == node_id || t.as_text() == node_id)
        .count()
}

/// (allowed, reference_count): a node may only go when nothing points at it.
pub fn can_delete_node(edges: &Table, node_id: &str) -> (bool, usize) {
    let count = edge_reference_count(edges, node_id);
    (count == 0, count)
}

/// Check edge dialog inputs: required fields first, then endpoint existence,
/// then the self-loop rule.
pub fn can_add_or_edit_edge(
    nodes: &Table,
    source: &str,
    target: &str,
    relationship_type: &str,
) -> Result<(), InputError> {
    if source.is_empty() {
        return Err(InputError::SourceRequired);
    }
    if target.is_empty() {
        return Err(InputError::TargetRequired);
    }
    if relationship_type.is_empty() {
        return Err(InputError::RelationshipRequired);
    }

    let node_ids: HashSet<String> = nodes.column("id").map(|v| v.as_text()).collect();
    if !node_ids.contains(source) {
        return Err(InputError::UnknownSource(source.to_string()));
    }
    if !node_ids.contains(target) {
        return Err(InputError::UnknownTarget(target.to_string()));
    }
    if source == target {
        return Err(InputError::SelfLoop);
    }

    Ok(())
}

/// Check node dialog inputs. `exclude_row` is the row being edited, if any.
pub fn check_node_input(
    nodes: &Table,
    input: &NodeInput,
    exclude_row: Option<usize>,
) -> Result<(), InputError> {
    if input.id.is_empty() || input.label.is_empty() || input.node_type.is_empty() {
        return Err(InputError::NodeFieldsRequired);
    }
    if input.node_type.parse::<NodeType>().is_err() {
        return Err(InputError::InvalidNodeType(input.node_type.clone()));
    }
    if !is_unique_node_id(nodes, &input.id, exclude_row) {
        return Err(InputError::DuplicateNodeId(input.id.clone()));
    }
    check_metadata(&input.metadata)
}

/// Date must be empty or YYYY-MM-DD; confidence empty or within [0, 1].
pub fn check_metadata(metadata: &MetadataInput) -> Result<(), InputError> {
    if let Some(date) = &metadata.date {
        if !is_valid_optional_date(date.trim()) {
            return Err(InputError::InvalidDate(date.clone()));
        }
    }
    if let Some(confidence) = &metadata.confidence {
        parse_optional_confidence(confidence)?;
    }
    Ok(())
}
