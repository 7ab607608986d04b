use crate::graph::elements::optional_text;
use crate::schema::{REQUIRED_EDGE_COLS, REQUIRED_NODE_COLS, Table, Value};

use indexmap::IndexMap;
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::HashMap;

pub type Attributes = IndexMap<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    pub id: String,
    pub attributes: Attributes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeData {
    /// Row of the edge in its source table.
    pub row: usize,
    pub attributes: Attributes,
}

/// Undirected multigraph: parallel edges between one pair are kept apart.
#[derive(Debug, Clone, Default)]
pub struct MultiGraph {
    graph: UnGraph<NodeData, EdgeData>,
    index: HashMap<String, NodeIndex>,
}

impl MultiGraph {
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeData> {
        self.graph.node_indices().map(|ix| &self.graph[ix])
    }

    /// Edges in insertion order as (source id, target id, data).
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, &EdgeData)> {
        self.graph.edge_indices().filter_map(|ix| {
            let (a, b) = self.graph.edge_endpoints(ix)?;
            Some((self.graph[a].id.as_str(), self.graph[b].id.as_str(), &self.graph[ix]))
        })
    }

    fn add_node(&mut self, id: String, attributes: Attributes) -> NodeIndex {
        if let Some(&ix) = self.index.get(&id) {
            self.graph[ix].attributes.extend(attributes);
            return ix;
        }
        let ix = self.graph.add_node(NodeData {
            id: id.clone(),
            attributes,
        });
        self.index.insert(id, ix);
        ix
    }
}

/// Build the analysis multigraph. Node attributes are the non-id columns, edge
/// attributes the non-endpoint columns. Unknown endpoints become bare nodes.
pub fn build_multigraph(nodes: &Table, edges: &Table) -> MultiGraph {
    let mut g = MultiGraph::default();

    let node_extras = nodes.extra_columns(&REQUIRED_NODE_COLS);
    for row in 0..nodes.len() {
        let mut attributes = Attributes::new();
        attributes.insert("label".to_string(), nodes.cell(row, "label").clone());
        attributes.insert("type".to_string(), nodes.cell(row, "type").clone());
        attributes.insert("description".to_string(), optional_text(nodes.cell(row, "description")));
        for column in &node_extras {
            attributes.insert(column.clone(), nodes.cell(row, column).clone());
        }
        g.add_node(nodes.text(row, "id"), attributes);
    }

    let edge_extras = edges.extra_columns(&REQUIRED_EDGE_COLS);
    for row in 0..edges.len() {
        let a = g.add_node(edges.text(row, "source"), Attributes::new());
        let b = g.add_node(edges.text(row, "target"), Attributes::new());

        let mut attributes = Attributes::new();
        attributes.insert(
            "relationship_type".to_string(),
            edges.cell(row, "relationship_type").clone(),
        );
        attributes.insert("description".to_string(), optional_text(edges.cell(row, "description")));
        for column in &edge_extras {
            attributes.insert(column.clone(), edges.cell(row, column).clone());
        }
        g.graph.add_edge(a, b, EdgeData { row, attributes });
    }

    g
}
