//! Editable in-memory dataset.
//!
//! A `Session` owns the node and edge tables plus a dirty flag. Every mutation
//! runs its guard first; edge mutations are additionally validated against the
//! whole dataset and only applied when they leave it valid. Saving and
//! exporting are refused while validation reports issues.

use crate::error::{InputError, SessionError};
use crate::export;
use crate::graph::build_multigraph;
use crate::guards::{self, EdgeInput, MetadataInput, NodeInput};
use crate::schema::provenance::{ensure_metadata_columns, parse_optional_confidence};
use crate::schema::{Table, Value};
use crate::store;
use crate::validate::{Issue, validate};

use std::path::{Path, PathBuf};

/// Which record a metadata update applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record<'a> {
    Node(&'a str),
    Edge(usize),
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    nodes: Table,
    edges: Table,
    dirty: bool,
}

impl Session {
    pub fn new(nodes: Table, edges: Table) -> Self {
        Self {
            nodes,
            edges,
            dirty: false,
        }
    }

    pub fn load(path: &Path) -> Result<Self, SessionError> {
        let (nodes, edges) = store::load_workbook(path)?;
        let session = Self::new(nodes, edges);
        let issues = session.issues();
        if !issues.is_empty() {
            tracing::warn!(count = issues.len(), "loaded dataset has validation issues");
        }
        Ok(session)
    }

    pub fn nodes(&self) -> &Table {
        &self.nodes
    }

    pub fn edges(&self) -> &Table {
        &self.edges
    }

    /// Unsaved changes exist.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn issues(&self) -> Vec<Issue> {
        validate(&self.nodes, &self.edges)
    }

    /// Row of the first node with this id.
    pub fn node_row(&self, id: &str) -> Option<usize> {
        self.nodes.column("id").position(|v| v.as_text() == id)
    }

    fn require_node(&self, id: &str) -> Result<usize, InputError> {
        self.node_row(id)
            .ok_or_else(|| InputError::UnknownNode(id.to_string()))
    }

    fn require_edge(&self, row: usize) -> Result<usize, InputError> {
        if row < self.edges.len() {
            Ok(row)
        } else {
            Err(InputError::UnknownEdgeRow(row))
        }
    }

    pub fn add_node(&mut self, input: &NodeInput) -> Result<usize, SessionError> {
        let input = trim_node(input);
        guards::check_node_input(&self.nodes, &input, None)?;

        let row = self.nodes.push_record([
            ("id", Value::from(input.id.as_str())),
            ("label", Value::from(input.label.as_str())),
            ("type", Value::from(input.node_type.as_str())),
            ("description", Value::from(input.description.as_str())),
        ]);
        apply_metadata(&mut self.nodes, row, &input.metadata)?;

        self.dirty = true;
        tracing::info!(id = %input.id, "added node");
        Ok(row)
    }

    /// Replace the core fields of node `id`; the id itself may change.
    pub fn edit_node(&mut self, id: &str, input: &NodeInput) -> Result<(), SessionError> {
        let row = self.require_node(id)?;
        let input = trim_node(input);
        guards::check_node_input(&self.nodes, &input, Some(row))?;

        self.nodes.set(row, "id", Value::from(input.id.as_str()));
        self.nodes.set(row, "label", Value::from(input.label.as_str()));
        self.nodes.set(row, "type", Value::from(input.node_type.as_str()));
        self.nodes.set(row, "description", Value::from(input.description.as_str()));
        apply_metadata(&mut self.nodes, row, &input.metadata)?;

        self.dirty = true;
        tracing::info!(old = %id, new = %input.id, "edited node");
        Ok(())
    }

    /// Delete node `id`. Refused while any edge references it.
    pub fn delete_node(&mut self, id: &str) -> Result<(), SessionError> {
        self.require_node(id)?;
        let (allowed, count) = guards::can_delete_node(&self.edges, id);
        if !allowed {
            return Err(InputError::NodeReferenced {
                id: id.to_string(),
                count,
            }
            .into());
        }

        let nodes = &self.nodes;
        self.nodes = nodes.retain_rows(|row| nodes.text(row, "id") != id);
        self.dirty = true;
        tracing::info!(%id, "deleted node");
        Ok(())
    }

    pub fn add_edge(&mut self, input: &EdgeInput) -> Result<usize, SessionError> {
        let input = trim_edge(input);
        self.check_edge(&input)?;

        let mut candidate = self.edges.clone();
        let row = candidate.push_record([
            ("source", Value::from(input.source.as_str())),
            ("target", Value::from(input.target.as_str())),
            ("relationship_type", Value::from(input.relationship_type.as_str())),
            ("description", Value::from(input.description.as_str())),
        ]);
        apply_metadata(&mut candidate, row, &input.metadata)?;

        self.commit_edges(candidate)?;
        tracing::info!(row, source = %input.source, target = %input.target, "added edge");
        Ok(row)
    }

    pub fn edit_edge(&mut self, row: usize, input: &EdgeInput) -> Result<(), SessionError> {
        let row = self.require_edge(row)?;
        let input = trim_edge(input);
        self.check_edge(&input)?;

        let mut candidate = self.edges.clone();
        candidate.set(row, "source", Value::from(input.source.as_str()));
        candidate.set(row, "target", Value::from(input.target.as_str()));
        candidate.set(row, "relationship_type", Value::from(input.relationship_type.as_str()));
        candidate.set(row, "description", Value::from(input.description.as_str()));
        apply_metadata(&mut candidate, row, &input.metadata)?;

        self.commit_edges(candidate)?;
        tracing::info!(row, "edited edge");
        Ok(())
    }

    /// Delete the edge at `row`. Later rows shift up by one.
    pub fn delete_edge(&mut self, row: usize) -> Result<(), SessionError> {
        let row = self.require_edge(row)?;
        let mut candidate = self.edges.clone();
        candidate.remove_row(row);
        self.commit_edges(candidate)?;
        tracing::info!(row, "deleted edge");
        Ok(())
    }

    /// Update provenance fields of one record. Fields left as `None` are kept.
    pub fn set_metadata(
        &mut self,
        record: Record<'_>,
        metadata: &MetadataInput,
    ) -> Result<(), SessionError> {
        let metadata = trim_metadata(metadata);
        guards::check_metadata(&metadata)?;
        match record {
            Record::Node(id) => {
                let row = self.require_node(id)?;
                apply_metadata(&mut self.nodes, row, &metadata)?;
            }
            Record::Edge(row) => {
                let row = self.require_edge(row)?;
                apply_metadata(&mut self.edges, row, &metadata)?;
            }
        }
        self.dirty = true;
        tracing::info!(?record, "updated metadata");
        Ok(())
    }

    fn check_edge(&self, input: &EdgeInput) -> Result<(), InputError> {
        guards::can_add_or_edit_edge(
            &self.nodes,
            &input.source,
            &input.target,
            &input.relationship_type,
        )?;
        guards::check_metadata(&input.metadata)
    }

    /// Swap in `candidate` only if the dataset stays valid.
    fn commit_edges(&mut self, candidate: Table) -> Result<(), SessionError> {
        let issues = validate(&self.nodes, &candidate);
        if !issues.is_empty() {
            tracing::warn!(count = issues.len(), "edge change rejected by validation");
            return Err(SessionError::Rejected { issues });
        }
        self.edges = candidate;
        self.dirty = true;
        Ok(())
    }

    fn ensure_valid(&self, action: &'static str) -> Result<(), SessionError> {
        let issues = self.issues();
        if issues.is_empty() {
            return Ok(());
        }
        tracing::warn!(count = issues.len(), "cannot {}", action);
        Err(SessionError::Blocked { action, issues })
    }

    /// Persist both tables to `path`; clears the dirty flag on success.
    pub fn save(&mut self, path: &Path) -> Result<(), SessionError> {
        self.ensure_valid("save")?;
        store::save_workbook(&self.nodes, &self.edges, path)?;
        self.dirty = false;
        Ok(())
    }

    pub fn export_csv(&self, out_dir: &Path) -> Result<(PathBuf, PathBuf), SessionError> {
        self.ensure_valid("export CSV")?;
        Ok(export::export_csv(&self.nodes, &self.edges, out_dir)?)
    }

    pub fn export_gexf(&self, out_path: &Path) -> Result<(), SessionError> {
        self.ensure_valid("export GEXF")?;
        let graph = build_multigraph(&self.nodes, &self.edges);
        Ok(export::export_gexf(&graph, out_path)?)
    }

    pub fn export_summary(&self, out_path: &Path) -> Result<(), SessionError> {
        self.ensure_valid("export summary")?;
        Ok(export::export_summary(&self.nodes, &self.edges, out_path)?)
    }
}

fn trim_metadata(m: &MetadataInput) -> MetadataInput {
    let trim = |v: &Option<String>| v.as_ref().map(|s| s.trim().to_string());
    MetadataInput {
        source_ref: trim(&m.source_ref),
        date: trim(&m.date),
        confidence: trim(&m.confidence),
    }
}

fn trim_node(input: &NodeInput) -> NodeInput {
    NodeInput {
        id: input.id.trim().to_string(),
        label: input.label.trim().to_string(),
        node_type: input.node_type.trim().to_string(),
        description: input.description.trim().to_string(),
        metadata: trim_metadata(&input.metadata),
    }
}

fn trim_edge(input: &EdgeInput) -> EdgeInput {
    EdgeInput {
        source: input.source.trim().to_string(),
        target: input.target.trim().to_string(),
        relationship_type: input.relationship_type.trim().to_string(),
        description: input.description.trim().to_string(),
        metadata: trim_metadata(&input.metadata),
    }
}

/// Write the given provenance fields into `row`. Any metadata edit brings in
/// all well-known metadata columns. Confidence is stored as a number, or ""
/// when cleared.
fn apply_metadata(table: &mut Table, row: usize, m: &MetadataInput) -> Result<(), InputError> {
    if m.is_empty() {
        return Ok(());
    }
    ensure_metadata_columns(table);
    if let Some(source_ref) = &m.source_ref {
        table.set(row, "source_ref", Value::from(source_ref.as_str()));
    }
    if let Some(date) = &m.date {
        table.set(row, "date", Value::from(date.as_str()));
    }
    if let Some(confidence) = &m.confidence {
        let value = match parse_optional_confidence(confidence)? {
            Some(c) => Value::Float(c),
            None => Value::Text(String::new()),
        };
        table.set(row, "confidence", value);
    }
    Ok(())
}
