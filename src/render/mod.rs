//! Read-only graph view: report model, inspector rows and the HTML page.

pub mod html;
pub mod inspector;

pub use html::render_html_report;
pub use inspector::format_inspector_rows;

use crate::filter::{Filters, apply_filters};
use crate::graph::{Element, ElementGroup, build_elements};
use crate::schema::Table;
use crate::validate::{Issue, validate};

use serde::Serialize;
use std::f64::consts::PI;

#[derive(Debug, Clone, Serialize)]
pub struct Totals {
    pub nodes: usize,
    pub edges: usize,
    pub shown_nodes: usize,
    pub shown_edges: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportElement {
    #[serde(flatten)]
    pub element: Element,
    /// Node position on the canvas; edges are drawn between their endpoints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    pub inspector: Vec<(String, String)>,
}

/// Everything the HTML page needs, embedded as one JSON object.
#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    pub title: String,
    pub totals: Totals,
    pub filters: Filters,
    pub canvas: f64,
    pub issues: Vec<Issue>,
    pub elements: Vec<ReportElement>,
}

const MARGIN: f64 = 80.0;

/// Radius grows with the node count so labels stay apart.
fn circle_radius(n: usize) -> f64 {
    (n as f64 * 18.0).clamp(120.0, 1200.0)
}

/// Evenly spaced points on a circle, starting at 12 o'clock.
pub fn circle_layout(n: usize) -> (f64, Vec<Point>) {
    let radius = circle_radius(n);
    let canvas = 2.0 * (radius + MARGIN);
    let center = canvas / 2.0;
    if n == 1 {
        return (canvas, vec![Point { x: center, y: center }]);
    }
    let points = (0..n)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / n as f64 - PI / 2.0;
            Point {
                x: (center + radius * angle.cos()).round(),
                y: (center + radius * angle.sin()).round(),
            }
        })
        .collect();
    (canvas, points)
}

/// Build the report for the filtered view of the full tables. Validation
/// always runs over the full tables.
pub fn build_report(title: &str, nodes: &Table, edges: &Table, filters: &Filters) -> ReportData {
    let (shown_nodes, shown_edges) = apply_filters(nodes, edges, filters);
    let elements = build_elements(&shown_nodes, &shown_edges);

    let node_count = elements.iter().filter(|e| e.group == ElementGroup::Nodes).count();
    let (canvas, mut points) = circle_layout(node_count);
    points.reverse();

    let elements = elements
        .into_iter()
        .map(|element| {
            let position = match element.group {
                ElementGroup::Nodes => points.pop(),
                ElementGroup::Edges => None,
            };
            let inspector = format_inspector_rows(element.group, &element.data);
            ReportElement {
                element,
                position,
                inspector,
            }
        })
        .collect();

    ReportData {
        title: title.to_string(),
        totals: Totals {
            nodes: nodes.len(),
            edges: edges.len(),
            shown_nodes: shown_nodes.len(),
            shown_edges: shown_edges.len(),
        },
        filters: filters.clone(),
        canvas,
        issues: validate(nodes, edges),
        elements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{REQUIRED_EDGE_COLS, REQUIRED_NODE_COLS};
    use pretty_assertions::assert_eq;

    fn tables() -> (Table, Table) {
        let nodes = Table::from_rows(
            &REQUIRED_NODE_COLS,
            [
                vec!["N1".into(), "Alice".into(), "Person".into(), "".into()],
                vec!["N2".into(), "Bob".into(), "Person".into(), "".into()],
                vec!["P1".into(), "Harbor".into(), "Place".into(), "".into()],
            ],
        );
        let edges = Table::from_rows(
            &REQUIRED_EDGE_COLS,
            [
                vec!["N1".into(), "N2".into(), "knows".into(), "".into()],
                vec!["N1".into(), "P1".into(), "visited".into(), "".into()],
            ],
        );
        (nodes, edges)
    }

    #[test]
    fn layout_is_a_circle_starting_at_top() {
        let (canvas, points) = circle_layout(4);
        let c = canvas / 2.0;
        let r = circle_radius(4);
        assert_eq!(points[0], Point { x: c, y: c - r });
        assert_eq!(points[1], Point { x: c + r, y: c });
        assert_eq!(circle_layout(1).1, vec![Point { x: c, y: c }]);
        assert!(circle_layout(0).1.is_empty());
    }

    #[test]
    fn report_counts_filtered_view_against_totals() {
        let (nodes, edges) = tables();
        let filters = Filters {
            node_type: "Person".into(),
            ..Filters::default()
        };
        let report = build_report("test", &nodes, &edges, &filters);

        assert_eq!(report.totals.nodes, 3);
        assert_eq!(report.totals.shown_nodes, 2);
        assert_eq!(report.totals.shown_edges, 1);
        assert!(report.issues.is_empty());

        let positioned = report.elements.iter().filter(|e| e.position.is_some()).count();
        assert_eq!(positioned, 2);
        assert_eq!(report.elements[2].inspector[0], ("id".to_string(), "N1__N2__knows__0".to_string()));
    }
}
