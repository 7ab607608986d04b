//! GEXF 1.2 writer for the analysis multigraph.
//!
//! Layout follows what Gephi expects from a static undirected graph:
//!
//! ```text
//! gexf
//! └─ graph (defaultedgetype=undirected, mode=static)
//!    ├─ attributes class=node   (one <attribute> per node key)
//!    ├─ attributes class=edge   (one <attribute> per edge key)
//!    ├─ nodes / node[id,label] / attvalues
//!    └─ edges / edge[id,source,target,label] / attvalues
//! ```
//!
//! No timestamps are written, so output depends only on the graph.

use crate::error::{BoxError, ExportError};
use crate::export::{render_failed, write_artifact};
use crate::graph::MultiGraph;
use crate::graph::multigraph::Attributes;
use crate::schema::Value;

use indexmap::IndexMap;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::path::Path;

const GEXF_NS: &str = "http://www.gexf.net/1.2draft";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const SCHEMA_LOCATION: &str = "http://www.gexf.net/1.2draft http://www.gexf.net/1.2draft/gexf.xsd";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrType {
    Boolean,
    Long,
    Double,
    String,
}

impl AttrType {
    fn of(value: &Value) -> Option<AttrType> {
        match value {
            Value::Null => None,
            Value::Float(f) if !f.is_finite() => None,
            Value::Bool(_) => Some(AttrType::Boolean),
            Value::Int(_) => Some(AttrType::Long),
            Value::Float(_) => Some(AttrType::Double),
            Value::Text(_) => Some(AttrType::String),
        }
    }

    /// Widest type able to hold both; ints widen to doubles, anything else
    /// mixed falls back to string.
    fn merge(self, other: AttrType) -> AttrType {
        use AttrType::*;
        match (self, other) {
            (a, b) if a == b => a,
            (Long, Double) | (Double, Long) => Double,
            _ => String,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            AttrType::Boolean => "boolean",
            AttrType::Long => "long",
            AttrType::Double => "double",
            AttrType::String => "string",
        }
    }
}

/// Declared attribute: position is its GEXF id.
type Declarations = IndexMap<String, AttrType>;

fn declare<'a>(attributes: impl Iterator<Item = &'a Attributes>, skip: &[&str]) -> Declarations {
    let mut decls = Declarations::new();
    for attrs in attributes {
        for (key, value) in attrs {
            if skip.contains(&key.as_str()) {
                continue;
            }
            let Some(ty) = AttrType::of(value) else {
                continue;
            };
            decls
                .entry(key.clone())
                .and_modify(|t| *t = t.merge(ty))
                .or_insert(ty);
        }
    }
    decls
}

/// Render the multigraph as a GEXF document.
pub fn render_gexf(graph: &MultiGraph) -> Result<String, BoxError> {
    let node_decls = declare(graph.nodes().map(|n| &n.attributes), &["label"]);
    let edge_decls = declare(graph.edges().map(|(_, _, e)| &e.attributes), &[]);

    let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    w.write_event(Event::Start(BytesStart::new("gexf").with_attributes([
        ("xmlns", GEXF_NS),
        ("xmlns:xsi", XSI_NS),
        ("xsi:schemaLocation", SCHEMA_LOCATION),
        ("version", "1.2"),
    ])))?;

    w.write_event(Event::Start(BytesStart::new("meta")))?;
    w.write_event(Event::Start(BytesStart::new("creator")))?;
    w.write_event(Event::Text(BytesText::new(concat!("crimenet ", env!("CARGO_PKG_VERSION")))))?;
    w.write_event(Event::End(BytesEnd::new("creator")))?;
    w.write_event(Event::End(BytesEnd::new("meta")))?;

    w.write_event(Event::Start(
        BytesStart::new("graph")
            .with_attributes([("defaultedgetype", "undirected"), ("mode", "static")]),
    ))?;

    write_declarations(&mut w, "node", &node_decls)?;
    write_declarations(&mut w, "edge", &edge_decls)?;

    w.write_event(Event::Start(BytesStart::new("nodes")))?;
    for node in graph.nodes() {
        let label = node
            .attributes
            .get("label")
            .filter(|v| !v.is_missing())
            .map(Value::as_text)
            .unwrap_or_else(|| node.id.clone());
        let start = BytesStart::new("node")
            .with_attributes([("id", node.id.as_str()), ("label", label.as_str())]);
        write_element(&mut w, start, "node", &node.attributes, &node_decls)?;
    }
    w.write_event(Event::End(BytesEnd::new("nodes")))?;

    w.write_event(Event::Start(BytesStart::new("edges")))?;
    for (i, (source, target, edge)) in graph.edges().enumerate() {
        let id = i.to_string();
        let mut start = BytesStart::new("edge")
            .with_attributes([("id", id.as_str()), ("source", source), ("target", target)]);
        if let Some(rel) = edge.attributes.get("relationship_type").filter(|v| !v.is_missing()) {
            start.push_attribute(("label", rel.as_text().as_str()));
        }
        write_element(&mut w, start, "edge", &edge.attributes, &edge_decls)?;
    }
    w.write_event(Event::End(BytesEnd::new("edges")))?;

    w.write_event(Event::End(BytesEnd::new("graph")))?;
    w.write_event(Event::End(BytesEnd::new("gexf")))?;

    let mut out = String::from_utf8(w.into_inner())?;
    out.push('\n');
    Ok(out)
}

fn write_declarations(
    w: &mut Writer<Vec<u8>>,
    class: &str,
    decls: &Declarations,
) -> Result<(), BoxError> {
    if decls.is_empty() {
        return Ok(());
    }
    w.write_event(Event::Start(
        BytesStart::new("attributes").with_attributes([("class", class), ("mode", "static")]),
    ))?;
    for (i, (title, ty)) in decls.iter().enumerate() {
        let id = i.to_string();
        w.write_event(Event::Empty(BytesStart::new("attribute").with_attributes([
            ("id", id.as_str()),
            ("title", title.as_str()),
            ("type", ty.as_str()),
        ])))?;
    }
    w.write_event(Event::End(BytesEnd::new("attributes")))?;
    Ok(())
}

fn write_element(
    w: &mut Writer<Vec<u8>>,
    start: BytesStart<'_>,
    name: &str,
    attributes: &Attributes,
    decls: &Declarations,
) -> Result<(), BoxError> {
    let values: Vec<(usize, String)> = attributes
        .iter()
        .filter(|(_, v)| AttrType::of(v).is_some())
        .filter_map(|(k, v)| decls.get_index_of(k).map(|i| (i, v.as_text())))
        .collect();

    if values.is_empty() {
        w.write_event(Event::Empty(start))?;
        return Ok(());
    }

    w.write_event(Event::Start(start))?;
    w.write_event(Event::Start(BytesStart::new("attvalues")))?;
    for (i, value) in values {
        let id = i.to_string();
        w.write_event(Event::Empty(
            BytesStart::new("attvalue")
                .with_attributes([("for", id.as_str()), ("value", value.as_str())]),
        ))?;
    }
    w.write_event(Event::End(BytesEnd::new("attvalues")))?;
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Write `graph` as GEXF to `out_path`.
pub fn export_gexf(graph: &MultiGraph, out_path: &Path) -> Result<(), ExportError> {
    let xml = render_gexf(graph).map_err(|e| render_failed("GEXF", out_path, e))?;
    tracing::debug!(nodes = graph.node_count(), edges = graph.edge_count(), "rendered GEXF");
    write_artifact("GEXF", out_path, xml.as_bytes())
}
