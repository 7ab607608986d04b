use crate::graph::ElementGroup;
use crate::schema::Value;

use indexmap::IndexMap;

/// Longest value shown before truncation.
pub const MAX_VALUE_CHARS: usize = 200;

const NODE_CORE_KEYS: [&str; 4] = ["id", "label", "type", "description"];
const EDGE_CORE_KEYS: [&str; 5] = ["id", "source", "target", "relationship_type", "description"];

fn display_value(value: Option<&Value>) -> String {
    let text = value.map(Value::as_text).unwrap_or_default();
    match text.char_indices().nth(MAX_VALUE_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text,
    }
}

/// Key/value rows for the inspector panel: core keys first (missing ones as
/// ""), then the remaining keys sorted by name.
pub fn format_inspector_rows(
    kind: ElementGroup,
    data: &IndexMap<String, Value>,
) -> Vec<(String, String)> {
    let core: &[&str] = match kind {
        ElementGroup::Nodes => &NODE_CORE_KEYS,
        ElementGroup::Edges => &EDGE_CORE_KEYS,
    };

    let mut rows: Vec<(String, String)> = core
        .iter()
        .map(|k| (k.to_string(), display_value(data.get(*k))))
        .collect();

    let mut extra: Vec<&String> = data.keys().filter(|k| !core.contains(&k.as_str())).collect();
    extra.sort();
    rows.extend(extra.into_iter().map(|k| (k.clone(), display_value(data.get(k)))));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn data(pairs: &[(&str, Value)]) -> IndexMap<String, Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn node_rows_put_core_keys_first() {
        let d = data(&[
            ("zeta", Value::Int(1)),
            ("label", "Alice".into()),
            ("id", "N1".into()),
            ("alpha", Value::Null),
        ]);
        let rows = format_inspector_rows(ElementGroup::Nodes, &d);
        let keys: Vec<&str> = rows.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["id", "label", "type", "description", "alpha", "zeta"]);
        assert_eq!(rows[2].1, "");
        assert_eq!(rows[4].1, "");
        assert_eq!(rows[5].1, "1");
    }

    #[test]
    fn edge_rows_use_edge_core_keys() {
        let d = data(&[("source", "A".into()), ("weight", Value::Float(0.5))]);
        let rows = format_inspector_rows(ElementGroup::Edges, &d);
        let keys: Vec<&str> = rows.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec!["id", "source", "target", "relationship_type", "description", "weight"]
        );
        assert_eq!(rows[5].1, "0.5");
    }

    #[test]
    fn long_values_are_truncated_at_200_chars() {
        let long = "é".repeat(MAX_VALUE_CHARS + 5);
        let exact = "x".repeat(MAX_VALUE_CHARS);
        let d = data(&[("description", long.into()), ("notes", exact.clone().into())]);
        let rows = format_inspector_rows(ElementGroup::Nodes, &d);

        assert_eq!(rows[3].1, format!("{}...", "é".repeat(MAX_VALUE_CHARS)));
        assert_eq!(rows[4].1, exact);
    }
}
