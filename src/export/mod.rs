//! Deterministic export artifacts: CSV tables, a GEXF graph and a markdown
//! summary. Running an export twice on the same tables yields identical bytes.

pub mod csv;
pub mod gexf;
pub mod summary;

pub use self::csv::export_csv;
pub use self::gexf::export_gexf;
pub use self::summary::export_summary;

use crate::error::{BoxError, ExportError, write_hint};
use crate::schema::Table;
use crate::store::atomic;

use std::path::Path;

pub const NODES_CSV: &str = "nodes.csv";
pub const EDGES_CSV: &str = "edges.csv";
pub const GRAPH_GEXF: &str = "graph.gexf";
pub const SUMMARY_MD: &str = "EXPORT_SUMMARY.md";

/// Nodes stably sorted by id.
pub(crate) fn sort_nodes(nodes: &Table) -> Table {
    let mut order: Vec<usize> = (0..nodes.len()).collect();
    order.sort_by_cached_key(|&row| nodes.text(row, "id"));
    nodes.take_rows(&order)
}

/// Edges sorted by (source, target, relationship_type); ties keep table order.
pub(crate) fn sort_edges(edges: &Table) -> Table {
    let mut order: Vec<usize> = (0..edges.len()).collect();
    order.sort_by_cached_key(|&row| {
        (
            edges.text(row, "source"),
            edges.text(row, "target"),
            edges.text(row, "relationship_type"),
        )
    });
    edges.take_rows(&order)
}

/// Write one artifact through the temp-file helper.
fn write_artifact(what: &'static str, path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    atomic::write_bytes(path, bytes).map_err(|err| ExportError {
        what,
        path: path.to_path_buf(),
        hint: write_hint(&err),
        source: Box::new(err),
    })?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "exported {}", what);
    Ok(())
}

/// Failure while producing an artifact's content, before anything is written.
fn render_failed(what: &'static str, path: &Path, source: BoxError) -> ExportError {
    ExportError {
        what,
        path: path.to_path_buf(),
        hint: "Verify the data can be serialized and the output path is valid.",
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{REQUIRED_EDGE_COLS, REQUIRED_NODE_COLS};
    use pretty_assertions::assert_eq;

    #[test]
    fn node_sort_is_by_id_and_stable() {
        let nodes = Table::from_rows(
            &REQUIRED_NODE_COLS,
            [
                vec!["b".into(), "B".into(), "Person".into(), "".into()],
                vec!["a".into(), "A1".into(), "Person".into(), "".into()],
                vec!["a".into(), "A2".into(), "Person".into(), "".into()],
            ],
        );
        let sorted = sort_nodes(&nodes);
        let labels: Vec<String> = sorted.column("label").map(|v| v.as_text()).collect();
        assert_eq!(labels, vec!["A1", "A2", "B"]);
    }

    #[test]
    fn edge_sort_keeps_ties_in_row_order() {
        let edges = Table::from_rows(
            &REQUIRED_EDGE_COLS,
            [
                vec!["b".into(), "a".into(), "knows".into(), "first".into()],
                vec!["a".into(), "b".into(), "knows".into(), "second".into()],
                vec!["a".into(), "b".into(), "knows".into(), "third".into()],
                vec!["a".into(), "b".into(), "calls".into(), "fourth".into()],
            ],
        );
        let sorted = sort_edges(&edges);
        let order: Vec<String> = sorted.column("description").map(|v| v.as_text()).collect();
        assert_eq!(order, vec!["fourth", "second", "third", "first"]);
    }
}
