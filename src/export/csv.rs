use crate::error::{BoxError, ExportError};
use crate::export::{EDGES_CSV, NODES_CSV, render_failed, sort_edges, sort_nodes, write_artifact};
use crate::schema::{self, ExtraOrder, REQUIRED_EDGE_COLS, REQUIRED_NODE_COLS, Table};

use std::path::{Path, PathBuf};

/// Export `nodes.csv` and `edges.csv` into `out_dir`: canonical columns with
/// sorted extras, nodes by id, edges by endpoints then relationship type.
pub fn export_csv(
    nodes: &Table,
    edges: &Table,
    out_dir: &Path,
) -> Result<(PathBuf, PathBuf), ExportError> {
    let nodes_path = out_dir.join(NODES_CSV);
    let edges_path = out_dir.join(EDGES_CSV);

    let nodes = sort_nodes(&nodes.select_columns(&schema::ordered_columns(
        nodes,
        &REQUIRED_NODE_COLS,
        ExtraOrder::Sorted,
    )));
    let edges = sort_edges(&edges.select_columns(&schema::ordered_columns(
        edges,
        &REQUIRED_EDGE_COLS,
        ExtraOrder::Sorted,
    )));

    let node_bytes = to_csv(&nodes).map_err(|e| render_failed("CSV files", out_dir, e))?;
    let edge_bytes = to_csv(&edges).map_err(|e| render_failed("CSV files", out_dir, e))?;

    write_artifact("CSV files", &nodes_path, &node_bytes)?;
    write_artifact("CSV files", &edges_path, &edge_bytes)?;
    Ok((nodes_path, edges_path))
}

fn to_csv(table: &Table) -> Result<Vec<u8>, BoxError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|v| v.to_string()))?;
    }
    Ok(writer.into_inner().map_err(|e| e.into_error())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Value;
    use pretty_assertions::assert_eq;

    fn tables() -> (Table, Table) {
        let nodes = Table::from_rows(
            &["zeta", "id", "label", "type", "description", "confidence", "alpha"],
            [
                vec![
                    "z2".into(),
                    "N2".into(),
                    "Bob, Jr.".into(),
                    "Person".into(),
                    Value::Null,
                    Value::Float(0.5),
                    "a2".into(),
                ],
                vec![
                    "z1".into(),
                    "N1".into(),
                    "Alice".into(),
                    "Person".into(),
                    "said \"hi\"".into(),
                    Value::Null,
                    "a1".into(),
                ],
            ],
        );
        let edges = Table::from_rows(
            &["source", "target", "relationship_type", "description", "source_ref"],
            [
                vec!["N2".into(), "N1".into(), "knows".into(), "".into(), "r2".into()],
                vec!["N1".into(), "N2".into(), "knows".into(), "".into(), "r1".into()],
            ],
        );
        (nodes, edges)
    }

    #[test]
    fn writes_canonical_sorted_csv() {
        let dir = tempfile::tempdir().unwrap();
        let (nodes, edges) = tables();
        let (nodes_path, edges_path) = export_csv(&nodes, &edges, dir.path()).unwrap();

        assert_eq!(
            std::fs::read_to_string(nodes_path).unwrap(),
            "id,label,type,description,confidence,alpha,zeta\n\
             N1,Alice,Person,\"said \"\"hi\"\"\",,a1,z1\n\
             N2,\"Bob, Jr.\",Person,,0.5,a2,z2\n"
        );
        assert_eq!(
            std::fs::read_to_string(edges_path).unwrap(),
            "source,target,relationship_type,description,source_ref\n\
             N1,N2,knows,,r1\n\
             N2,N1,knows,,r2\n"
        );
    }

    #[test]
    fn repeated_export_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let (nodes, edges) = tables();

        let (n1, e1) = export_csv(&nodes, &edges, dir.path()).unwrap();
        let first = (std::fs::read(&n1).unwrap(), std::fs::read(&e1).unwrap());
        let (n2, e2) = export_csv(&nodes, &edges, dir.path()).unwrap();
        let second = (std::fs::read(&n2).unwrap(), std::fs::read(&e2).unwrap());

        assert_eq!(first, second);
    }

    #[test]
    fn unwritable_directory_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        let (nodes, edges) = tables();

        let err = export_csv(&nodes, &edges, &blocker.join("out")).unwrap_err();
        assert!(err.to_string().starts_with("Failed to export CSV files to '"));
        assert!(err.to_string().contains("nodes.csv"));
    }
}
