use crate::error::ExportError;
use crate::export::write_artifact;
use crate::schema::{REQUIRED_EDGE_COLS, REQUIRED_NODE_COLS, Table};

use std::collections::BTreeMap;
use std::path::Path;

const FORMAT_VERSION: u32 = 1;
const MISSING_KEY: &str = "(missing)";

fn value_counts(table: &Table, column: &str) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for value in table.column(column) {
        let key = if value.is_missing() {
            MISSING_KEY.to_string()
        } else {
            value.as_text()
        };
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

fn filled_count(table: &Table, column: &str) -> usize {
    table
        .column(column)
        .filter(|v| !v.to_string().trim().is_empty())
        .count()
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// (min, mean, max) over the numeric confidence values, if there are any.
fn confidence_stats(table: &Table) -> Option<(f64, f64, f64)> {
    let values: Vec<f64> = table.column("confidence").filter_map(|v| v.as_f64()).collect();
    if values.is_empty() {
        return None;
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    Some((min, mean, max))
}

fn push_counts(lines: &mut Vec<String>, counts: &BTreeMap<String, usize>) {
    if counts.is_empty() {
        lines.push("- (none)".to_string());
    } else {
        lines.extend(counts.iter().map(|(k, n)| format!("- {}: {}", k, n)));
    }
}

fn extras_line(kind: &str, table: &Table, required: &[&str]) -> String {
    let mut extras = table.extra_columns(required);
    extras.sort();
    let listed = if extras.is_empty() {
        "(none)".to_string()
    } else {
        extras.join(", ")
    };
    format!("- {} extras: {}", kind, listed)
}

/// Markdown summary: counts by type and relationship, provenance coverage and
/// extra columns.
pub fn render_summary(nodes: &Table, edges: &Table) -> String {
    let mut lines = vec![
        "# Export Summary".to_string(),
        String::new(),
        format!("- Format version: {}", FORMAT_VERSION),
        format!("- Node count: {}", nodes.len()),
        format!("- Edge count: {}", edges.len()),
        String::new(),
        "## Nodes by type".to_string(),
    ];
    push_counts(&mut lines, &value_counts(nodes, "type"));

    lines.push(String::new());
    lines.push("## Edges by relationship_type".to_string());
    push_counts(&mut lines, &value_counts(edges, "relationship_type"));

    lines.push(String::new());
    lines.push("## Provenance coverage".to_string());
    let header_len = lines.len();

    for (kind, table) in [("Nodes", nodes), ("Edges", edges)] {
        if table.has_column("source_ref") {
            let filled = filled_count(table, "source_ref");
            lines.push(format!(
                "- {} with source_ref: {}/{} ({:.1}%)",
                kind,
                filled,
                table.len(),
                percent(filled, table.len())
            ));
        }
    }
    for (kind, table) in [("Node", nodes), ("Edge", edges)] {
        if let Some((min, mean, max)) = confidence_stats(table) {
            lines.push(format!(
                "- {} confidence (min/mean/max): {:.3}/{:.3}/{:.3}",
                kind, min, mean, max
            ));
        }
    }
    for (kind, table) in [("Nodes", nodes), ("Edges", edges)] {
        if table.has_column("date") {
            lines.push(format!(
                "- {} with date: {}/{}",
                kind,
                filled_count(table, "date"),
                table.len()
            ));
        }
    }
    if lines.len() == header_len {
        lines.push("- (no provenance columns found)".to_string());
    }

    lines.push(String::new());
    lines.push("## Extra columns".to_string());
    lines.push(extras_line("Nodes", nodes, &REQUIRED_NODE_COLS));
    lines.push(extras_line("Edges", edges, &REQUIRED_EDGE_COLS));
    lines.push(String::new());

    lines.join("\n")
}

pub fn export_summary(nodes: &Table, edges: &Table, out_path: &Path) -> Result<(), ExportError> {
    write_artifact("summary", out_path, render_summary(nodes, edges).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Value;
    use pretty_assertions::assert_eq;

    #[test]
    fn summary_with_provenance() {
        let nodes = Table::from_rows(
            &["id", "label", "type", "description", "confidence", "notes"],
            [
                vec!["b".into(), "B".into(), "Place".into(), "".into(), Value::Float(0.25), "x".into()],
                vec!["a".into(), "A".into(), "Person".into(), "".into(), "0.75".into(), Value::Null],
                vec!["c".into(), "C".into(), "Person".into(), "".into(), Value::Null, Value::Null],
            ],
        );
        let edges = Table::from_rows(
            &["source", "target", "relationship_type", "description", "source_ref", "date"],
            [
                vec!["a".into(), "b".into(), "visited".into(), "".into(), "doc1".into(), "2024-01-02".into()],
                vec!["c".into(), "b".into(), "visited".into(), "".into(), "  ".into(), Value::Null],
                vec!["a".into(), "c".into(), "knows".into(), "".into(), Value::Null, Value::Null],
            ],
        );

        assert_eq!(
            render_summary(&nodes, &edges),
            "# Export Summary\n\
             \n\
             - Format version: 1\n\
             - Node count: 3\n\
             - Edge count: 3\n\
             \n\
             ## Nodes by type\n\
             - Person: 2\n\
             - Place: 1\n\
             \n\
             ## Edges by relationship_type\n\
             - knows: 1\n\
             - visited: 2\n\
             \n\
             ## Provenance coverage\n\
             - Edges with source_ref: 1/3 (33.3%)\n\
             - Node confidence (min/mean/max): 0.250/0.500/0.750\n\
             - Edges with date: 1/3\n\
             \n\
             ## Extra columns\n\
             - Nodes extras: confidence, notes\n\
             - Edges extras: date, source_ref\n"
        );
    }

    #[test]
    fn summary_without_provenance_or_rows() {
        let nodes = Table::with_columns(&REQUIRED_NODE_COLS);
        let edges = Table::with_columns(&REQUIRED_EDGE_COLS);
        let text = render_summary(&nodes, &edges);
        assert!(text.contains("## Nodes by type\n- (none)\n"));
        assert!(text.contains("## Provenance coverage\n- (no provenance columns found)\n"));
        assert!(text.contains("- Nodes extras: (none)\n- Edges extras: (none)\n"));
    }

    #[test]
    fn missing_type_and_relationship_are_labelled() {
        let nodes = Table::from_rows(
            &REQUIRED_NODE_COLS,
            [
                vec!["a".into(), "A".into(), Value::Null, "".into()],
                vec!["b".into(), "B".into(), "Person".into(), "".into()],
            ],
        );
        let edges = Table::from_rows(
            &REQUIRED_EDGE_COLS,
            [vec!["a".into(), "b".into(), " ".into(), "".into()]],
        );
        let text = render_summary(&nodes, &edges);
        assert!(text.contains("## Nodes by type\n- (missing): 1\n- Person: 1\n"));
        assert!(text.contains("## Edges by relationship_type\n- (missing): 1\n"));
        assert!(!text.contains("- : "));
    }

    #[test]
    fn export_twice_is_identical() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("EXPORT_SUMMARY.md");
        let nodes = Table::with_columns(&REQUIRED_NODE_COLS);
        let edges = Table::with_columns(&REQUIRED_EDGE_COLS);
        export_summary(&nodes, &edges, &path).unwrap();
        let first = std::fs::read_to_string(&path).unwrap();
        export_summary(&nodes, &edges, &path).unwrap();
        assert_eq!(first, std::fs::read_to_string(&path).unwrap());
    }
}
