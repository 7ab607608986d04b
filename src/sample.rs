//! Starter dataset: a small fictional network to explore the tool with.

use crate::error::WorkbookError;
use crate::schema::{REQUIRED_EDGE_COLS, REQUIRED_NODE_COLS, Table, Value};
use crate::store;

use std::path::Path;

// (id, label, type, description, notes)
const NODES: [(&str, &str, &str, &str, &str); 9] = [
    ("p_alice", "Alice Romano", "Person", "Financial coordinator with links to multiple entities", "Primary analyst interview source"),
    ("p_bruno", "Bruno Keller", "Person", "Operations contact observed in site visits", "Seen in 2022 transfer records"),
    ("p_clara", "Clara Mendes", "Person", "Board advisor and institutional liaison", "Maintains communication logs"),
    ("pl_harbor", "Harbor District", "Place", "Logistics zone used for meetings", "Geo tag HD-14"),
    ("pl_university", "North University", "Place", "Campus where recruitment events occurred", "Public venue"),
    ("i_meridian", "Meridian Labs", "Institution", "Private contractor in procurement chain", "Registered in 2017"),
    ("i_cityhall", "City Hall", "Institution", "Municipal authority issuing permits", "Open data records available"),
    ("g_tide", "Tide Circle", "Group", "Coordination group connecting field actors", "Weekly meeting cadence"),
    ("g_axis", "Axis Network", "Group", "Secondary coordination cell", "Cross-border interactions"),
];

// (source, target, relationship_type, description, source_ref)
const EDGES: [(&str, &str, &str, &str, &str); 12] = [
    ("p_alice", "i_meridian", "employed_by", "Alice appears in payroll summaries", "payroll_2023_q2"),
    ("p_bruno", "pl_harbor", "operates_in", "Bruno tracked near harbor logistics offices", "surveillance_log_17"),
    ("p_clara", "i_cityhall", "advises", "Clara listed on advisory committee minutes", "minutes_apr_2024"),
    ("g_tide", "p_alice", "coordinates", "Group tasks routed through Alice", "chat_export_091"),
    ("g_tide", "p_bruno", "coordinates", "Bruno receives operational requests", "chat_export_094"),
    ("g_axis", "p_clara", "coordinates", "Clara contributes strategy memos", "memo_chain_22"),
    ("i_meridian", "i_cityhall", "contracts_with", "Vendor contract for permit processing", "contract_8841"),
    ("p_alice", "p_clara", "communicates_with", "Regular planning calls", "call_log_week32"),
    ("p_bruno", "g_axis", "reports_to", "Bruno provides transport updates", "ops_report_11"),
    ("g_axis", "pl_university", "recruits_from", "Recruitment outreach near campus", "flyer_batch_b"),
    ("p_clara", "pl_university", "visited", "Recorded attendance at panel event", "event_sheet_53"),
    ("g_tide", "pl_harbor", "meets_at", "Recurring meetings in warehouse district", "field_note_h12"),
];

/// The starter tables: nodes sorted by id; edges sorted by source, target and
/// normalized relationship type, ties in listing order.
pub fn sample_tables() -> (Table, Table) {
    let mut node_rows = NODES.to_vec();
    node_rows.sort_by_key(|(id, ..)| *id);

    let mut node_columns = REQUIRED_NODE_COLS.to_vec();
    node_columns.push("notes");
    let nodes = Table::from_rows(
        &node_columns,
        node_rows.into_iter().map(|(id, label, ty, description, notes)| {
            [id, label, ty, description, notes].map(Value::from)
        }),
    );

    let mut edge_rows: Vec<(&str, &str, String, &str, &str)> = EDGES
        .iter()
        .map(|&(s, t, rel, d, r)| (s, t, rel.trim().to_lowercase(), d, r))
        .collect();
    edge_rows.sort_by(|a, b| (a.0, a.1, &a.2).cmp(&(b.0, b.1, &b.2)));

    let mut edge_columns = REQUIRED_EDGE_COLS.to_vec();
    edge_columns.push("source_ref");
    let edges = Table::from_rows(
        &edge_columns,
        edge_rows.into_iter().map(|(s, t, rel, d, r)| {
            vec![Value::from(s), Value::from(t), Value::from(rel), Value::from(d), Value::from(r)]
        }),
    );

    (nodes, edges)
}

/// Write the starter workbook to `path`.
pub fn create_sample_workbook(path: &Path) -> Result<(), WorkbookError> {
    let (nodes, edges) = sample_tables();
    store::save_workbook(&nodes, &edges, path)?;
    tracing::info!(path = %path.display(), "created sample workbook");
    Ok(())
}
