use crate::schema::{REQUIRED_EDGE_COLS, REQUIRED_NODE_COLS, Table, Value};

use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementGroup {
    Nodes,
    Edges,
}

/// One render element. `data` keeps column order: core fields, then extras.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub group: ElementGroup,
    pub data: IndexMap<String, Value>,
}

impl Element {
    pub fn id(&self) -> String {
        self.data.get("id").map(Value::as_text).unwrap_or_default()
    }
}

/// Synthesized edge id; parallel edges stay distinct through the row index.
pub fn edge_id(source: &str, target: &str, relationship_type: &str, row: usize) -> String {
    format!("{}__{}__{}__{}", source, target, relationship_type, row)
}

/// Missing text becomes "".
pub(crate) fn optional_text(v: &Value) -> Value {
    match v {
        Value::Null => Value::Text(String::new()),
        other => other.clone(),
    }
}

/// Flatten validated tables into node elements followed by edge elements.
pub fn build_elements(nodes: &Table, edges: &Table) -> Vec<Element> {
    let mut elements = Vec::with_capacity(nodes.len() + edges.len());

    let node_extras = nodes.extra_columns(&REQUIRED_NODE_COLS);
    for row in 0..nodes.len() {
        let mut data = IndexMap::new();
        data.insert("id".to_string(), nodes.cell(row, "id").clone());
        data.insert("label".to_string(), nodes.cell(row, "label").clone());
        data.insert("type".to_string(), nodes.cell(row, "type").clone());
        data.insert("description".to_string(), optional_text(nodes.cell(row, "description")));
        for column in &node_extras {
            data.insert(column.clone(), nodes.cell(row, column).clone());
        }
        elements.push(Element {
            group: ElementGroup::Nodes,
            data,
        });
    }

    let edge_extras = edges.extra_columns(&REQUIRED_EDGE_COLS);
    for row in 0..edges.len() {
        let source = edges.cell(row, "source");
        let target = edges.cell(row, "target");
        let relationship_type = edges.cell(row, "relationship_type");

        let mut data = IndexMap::new();
        data.insert(
            "id".to_string(),
            Value::Text(edge_id(
                &source.as_text(),
                &target.as_text(),
                &relationship_type.as_text(),
                row,
            )),
        );
        data.insert("source".to_string(), source.clone());
        data.insert("target".to_string(), target.clone());
        data.insert("relationship_type".to_string(), relationship_type.clone());
        data.insert("description".to_string(), optional_text(edges.cell(row, "description")));
        for column in &edge_extras {
            data.insert(column.clone(), edges.cell(row, column).clone());
        }
        elements.push(Element {
            group: ElementGroup::Edges,
            data,
        });
    }

    elements
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tables() -> (Table, Table) {
        let nodes = Table::from_rows(
            &["id", "label", "type", "description", "rank"],
            [
                vec!["A".into(), "Node A".into(), "Person".into(), Value::Null, Value::Int(1)],
                vec!["B".into(), "Node B".into(), "Group".into(), "known".into(), Value::Int(2)],
            ],
        );
        let edges = Table::from_rows(
            &["source", "target", "relationship_type", "description", "confidence"],
            [
                vec!["A".into(), "B".into(), "knows".into(), Value::Null, Value::Float(0.9)],
                vec!["A".into(), "B".into(), "knows".into(), "again".into(), Value::Float(f64::NAN)],
            ],
        );
        (nodes, edges)
    }

    #[test]
    fn nodes_then_edges_with_defaults() {
        let (nodes, edges) = tables();
        let elements = build_elements(&nodes, &edges);

        let groups: Vec<ElementGroup> = elements.iter().map(|e| e.group).collect();
        assert_eq!(
            groups,
            vec![ElementGroup::Nodes, ElementGroup::Nodes, ElementGroup::Edges, ElementGroup::Edges]
        );

        let first = &elements[0].data;
        let keys: Vec<&str> = first.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "label", "type", "description", "rank"]);
        assert_eq!(first["description"], Value::from(""));
        assert_eq!(first["rank"], Value::Int(1));
        assert_eq!(elements[2].data["description"], Value::from(""));
    }

    #[test]
    fn parallel_edges_get_distinct_stable_ids() {
        let (nodes, edges) = tables();
        let ids = |els: Vec<Element>| -> Vec<String> {
            els.iter()
                .filter(|e| e.group == ElementGroup::Edges)
                .map(Element::id)
                .collect()
        };
        let first = ids(build_elements(&nodes, &edges));
        assert_eq!(first, vec!["A__B__knows__0", "A__B__knows__1"]);
        assert_eq!(ids(build_elements(&nodes, &edges)), first);
    }

    #[test]
    fn extras_serialize_to_json_primitives() {
        let (nodes, edges) = tables();
        let elements = build_elements(&nodes, &edges);
        let json = serde_json::to_value(&elements[3]).unwrap();
        assert_eq!(json["group"], "edges");
        assert_eq!(json["data"]["confidence"], "");
        assert_eq!(json["data"]["description"], "again");
    }
}
