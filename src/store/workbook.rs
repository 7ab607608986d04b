//! Two-sheet `.xlsx` workbook holding the node and edge tables.
//!
//! Expected layout: sheets `nodes` and `edges`, each with a header row
//! followed by one record per row.
//!
//! Example header (nodes):
//! id | label | type | description | source_ref | date | confidence | notes

use crate::error::{BoxError, WorkbookError, write_hint};
use crate::schema::{
    self, ExtraOrder, REQUIRED_EDGE_COLS, REQUIRED_NODE_COLS, SHEET_EDGES, SHEET_NODES, Table,
    Value,
};
use crate::store::atomic::{self, AtomicError};

use calamine::{Data, Reader, Xlsx, open_workbook};
use chrono::NaiveTime;
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};

/// Stored as a number in [0, 1]; whole values must not turn into integers.
const CONFIDENCE_COL: &str = "confidence";

/// Load both sheets and check that required sheets and columns exist.
pub fn load_workbook(path: &Path) -> Result<(Table, Table), WorkbookError> {
    if !path.exists() {
        return Err(WorkbookError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let unreadable = |source: BoxError| WorkbookError::Unreadable {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e| unreadable(Box::new(e)))?;

    let available = workbook.sheet_names();
    let mut missing: Vec<String> = [SHEET_NODES, SHEET_EDGES]
        .iter()
        .filter(|s| !available.iter().any(|a| a == *s))
        .map(|s| s.to_string())
        .collect();
    if !missing.is_empty() {
        missing.sort();
        return Err(WorkbookError::MissingSheets { sheets: missing });
    }

    let nodes = read_sheet(&mut workbook, SHEET_NODES).map_err(unreadable)?;
    let edges = read_sheet(&mut workbook, SHEET_EDGES).map_err(unreadable)?;

    let mut errors = Vec::new();
    let missing_nodes = schema::missing_columns(&nodes, &REQUIRED_NODE_COLS);
    if !missing_nodes.is_empty() {
        errors.push(format!("{}: {}", SHEET_NODES, missing_nodes.join(", ")));
    }
    let missing_edges = schema::missing_columns(&edges, &REQUIRED_EDGE_COLS);
    if !missing_edges.is_empty() {
        errors.push(format!("{}: {}", SHEET_EDGES, missing_edges.join(", ")));
    }
    if !errors.is_empty() {
        return Err(WorkbookError::MissingColumns {
            detail: errors.join("; "),
        });
    }

    tracing::info!(
        path = %path.display(),
        nodes = nodes.len(),
        edges = edges.len(),
        "loaded workbook"
    );
    Ok((nodes, edges))
}

fn read_sheet<R>(workbook: &mut Xlsx<R>, name: &str) -> Result<Table, BoxError>
where
    R: std::io::Read + std::io::Seek,
{
    let range = workbook.worksheet_range(name)?;
    let mut rows = range.rows();

    let Some(header) = rows.next() else {
        return Ok(Table::default());
    };
    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell_value(cell, false) {
            Value::Null => format!("Unnamed: {}", i),
            v => v.as_text(),
        })
        .collect();
    let float_columns: Vec<bool> = columns.iter().map(|c| c == CONFIDENCE_COL).collect();

    let mut table = Table::new(columns);
    for row in rows {
        table.push_values(
            row.iter()
                .enumerate()
                .map(|(i, cell)| cell_value(cell, float_columns.get(i).copied().unwrap_or(false)))
                .collect(),
        );
    }
    Ok(table)
}

/// Map a spreadsheet cell onto a table value. xlsx stores every number as a
/// double, so integral floats come back as integers unless `keep_float`.
/// Date cells become `YYYY-MM-DD`, or an ISO timestamp when they carry a time.
fn cell_value(cell: &Data, keep_float: bool) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) if s.is_empty() => Value::Null,
        Data::String(s) => Value::Text(s.clone()),
        Data::Int(i) if keep_float => Value::Float(*i as f64),
        Data::Int(i) => Value::Int(*i),
        Data::Float(f) if !keep_float && f.fract() == 0.0 && f.abs() < 9.0e15 => {
            Value::Int(*f as i64)
        }
        Data::Float(f) => Value::Float(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) if dt.is_datetime() => match dt.as_datetime() {
            Some(dt) if dt.time() == NaiveTime::MIN => {
                Value::Text(dt.format("%Y-%m-%d").to_string())
            }
            Some(dt) => Value::Text(dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
            None => Value::Text(dt.to_string()),
        },
        Data::DateTimeIso(s) => Value::Text(s.clone()),
        other => Value::Text(other.to_string()),
    }
}

/// Persist both tables in canonical column order. The workbook is written to a
/// sibling temp file and renamed over `path`.
pub fn save_workbook(nodes: &Table, edges: &Table, path: &Path) -> Result<(), WorkbookError> {
    let ordered_nodes = nodes.select_columns(&schema::ordered_columns(
        nodes,
        &REQUIRED_NODE_COLS,
        ExtraOrder::Preserve,
    ));
    let ordered_edges = edges.select_columns(&schema::ordered_columns(
        edges,
        &REQUIRED_EDGE_COLS,
        ExtraOrder::Preserve,
    ));

    atomic::replace_with(path, |temp| -> Result<(), BoxError> {
        let mut workbook = Workbook::new();
        write_sheet(&mut workbook, SHEET_NODES, &ordered_nodes)?;
        write_sheet(&mut workbook, SHEET_EDGES, &ordered_edges)?;
        workbook.save(temp)?;
        Ok(())
    })
    .map_err(|e| save_failed(path.to_path_buf(), e))?;

    tracing::info!(path = %path.display(), "saved workbook");
    Ok(())
}

fn save_failed(path: PathBuf, err: AtomicError<BoxError>) -> WorkbookError {
    let (hint, source): (&'static str, BoxError) = match err {
        AtomicError::Io(e) => (write_hint(&e), Box::new(e)),
        AtomicError::Write(e) => {
            let hint = e
                .downcast_ref::<std::io::Error>()
                .map(write_hint)
                .unwrap_or("Verify the destination path exists and is writable.");
            (hint, e)
        }
    };
    WorkbookError::SaveFailed { path, hint, source }
}

fn write_sheet(workbook: &mut Workbook, name: &str, table: &Table) -> Result<(), BoxError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name(name)?;

    for (c, column) in table.columns().iter().enumerate() {
        sheet.write_string(0, u16::try_from(c)?, column.as_str())?;
    }

    for (r, row) in table.rows().enumerate() {
        let r = u32::try_from(r + 1)?;
        for (c, value) in row.iter().enumerate() {
            let c = u16::try_from(c)?;
            match value {
                Value::Null => {}
                Value::Text(s) if s.is_empty() => {}
                Value::Text(s) => {
                    sheet.write_string(r, c, s.as_str())?;
                }
                Value::Int(i) => {
                    sheet.write_number(r, c, *i as f64)?;
                }
                Value::Float(f) if f.is_finite() => {
                    sheet.write_number(r, c, *f)?;
                }
                Value::Float(_) => {}
                Value::Bool(b) => {
                    sheet.write_boolean(r, c, *b)?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_xlsxwriter::{ExcelDateTime, Format};

    fn tables() -> (Table, Table) {
        let nodes = Table::from_rows(
            &["risk_score", "id", "label", "type", "description"],
            [
                vec![Value::Int(8), "n1".into(), "Alice".into(), "Person".into(), "desc".into()],
                vec![Value::Int(3), "n2".into(), "Bob".into(), "Person".into(), "".into()],
            ],
        );
        let edges = Table::from_rows(
            &["source", "target", "relationship_type", "description", "weight", "flag"],
            [vec![
                "n1".into(),
                "n2".into(),
                "knows".into(),
                "sample".into(),
                Value::Float(0.7),
                Value::Bool(true),
            ]],
        );
        (nodes, edges)
    }

    #[test]
    fn save_then_load_round_trips_in_canonical_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("data.xlsx");
        let (nodes, edges) = tables();

        save_workbook(&nodes, &edges, &path).unwrap();
        assert!(!atomic::temp_path_for(&path).exists());

        let (loaded_nodes, loaded_edges) = load_workbook(&path).unwrap();
        assert_eq!(
            loaded_nodes.columns(),
            ["id", "label", "type", "description", "risk_score"]
        );
        assert_eq!(loaded_nodes.len(), 2);
        assert_eq!(loaded_nodes.cell(0, "risk_score"), &Value::Int(8));
        assert_eq!(loaded_nodes.text(1, "label"), "Bob");
        assert_eq!(loaded_nodes.cell(1, "description"), &Value::Null);

        assert_eq!(loaded_edges.len(), 1);
        assert_eq!(loaded_edges.cell(0, "weight"), &Value::Float(0.7));
        assert_eq!(loaded_edges.cell(0, "flag"), &Value::Bool(true));
        assert_eq!(loaded_edges.text(0, "relationship_type"), "knows");
    }

    #[test]
    fn metadata_columns_round_trip_after_required_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.xlsx");
        let nodes = Table::from_rows(
            &["notes", "confidence", "id", "label", "type", "description", "date", "source_ref"],
            [
                vec![
                    "x".into(),
                    Value::Float(1.0),
                    "n1".into(),
                    "Alice".into(),
                    "Person".into(),
                    "".into(),
                    "2024-01-02".into(),
                    "doc-1".into(),
                ],
                vec![
                    Value::Null,
                    Value::Float(0.5),
                    "n2".into(),
                    "Bob".into(),
                    "Person".into(),
                    "".into(),
                    Value::Null,
                    Value::Null,
                ],
                vec![
                    Value::Null,
                    Value::Null,
                    "n3".into(),
                    "Carol".into(),
                    "Person".into(),
                    "".into(),
                    Value::Null,
                    Value::Null,
                ],
            ],
        );
        save_workbook(&nodes, &tables().1, &path).unwrap();

        let (loaded, _) = load_workbook(&path).unwrap();
        assert_eq!(
            loaded.columns(),
            ["id", "label", "type", "description", "source_ref", "date", "confidence", "notes"]
        );
        assert_eq!(loaded.text(0, "source_ref"), "doc-1");
        assert_eq!(loaded.text(0, "date"), "2024-01-02");
        assert_eq!(loaded.cell(0, "confidence"), &Value::Float(1.0));
        assert_eq!(loaded.cell(1, "confidence"), &Value::Float(0.5));
        assert_eq!(loaded.cell(2, "confidence"), &Value::Null);
        assert_eq!(loaded.cell(1, "source_ref"), &Value::Null);
    }

    #[test]
    fn date_typed_cells_load_as_iso_dates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dates.xlsx");
        let (mut nodes, edges) = tables();
        nodes.ensure_column("date");

        let mut workbook = Workbook::new();
        write_sheet(&mut workbook, SHEET_NODES, &nodes).unwrap();
        write_sheet(&mut workbook, SHEET_EDGES, &edges).unwrap();
        let date_col = u16::try_from(nodes.column_index("date").unwrap()).unwrap();
        let date = ExcelDateTime::from_ymd(2024, 1, 2).unwrap();
        let format = Format::new().set_num_format("yyyy-mm-dd");
        workbook
            .worksheet_from_name(SHEET_NODES)
            .unwrap()
            .write_datetime_with_format(1, date_col, &date, &format)
            .unwrap();
        workbook.save(&path).unwrap();

        let (loaded, _) = load_workbook(&path).unwrap();
        assert_eq!(loaded.cell(0, "date"), &Value::from("2024-01-02"));
        assert_eq!(loaded.cell(1, "date"), &Value::Null);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_workbook(&dir.path().join("nope.xlsx")).unwrap_err();
        assert!(matches!(err, WorkbookError::NotFound { .. }));
        assert!(err.to_string().contains("DHVIZ_DATA_PATH"));
    }

    #[test]
    fn garbage_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.xlsx");
        std::fs::write(&path, b"not a workbook").unwrap();
        assert!(matches!(
            load_workbook(&path).unwrap_err(),
            WorkbookError::Unreadable { .. }
        ));
    }

    #[test]
    fn missing_sheet_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one_sheet.xlsx");
        let mut workbook = Workbook::new();
        write_sheet(&mut workbook, SHEET_NODES, &tables().0).unwrap();
        workbook.save(&path).unwrap();

        let err = load_workbook(&path).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Workbook is missing required sheet(s): edges. Add the missing sheets and try again."
        );
    }

    #[test]
    fn missing_columns_are_listed_per_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.xlsx");
        let mut workbook = Workbook::new();
        write_sheet(&mut workbook, SHEET_NODES, &Table::with_columns(&["id", "label"])).unwrap();
        write_sheet(&mut workbook, SHEET_EDGES, &Table::with_columns(&["source", "target", "relationship_type"]))
            .unwrap();
        workbook.save(&path).unwrap();

        let err = load_workbook(&path).unwrap_err();
        assert!(matches!(err, WorkbookError::MissingColumns { .. }));
        assert!(err
            .to_string()
            .contains("nodes: type, description; edges: description"));
    }

    #[test]
    fn save_into_unwritable_location_fails_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let path = blocker.join("data.xlsx");
        let (nodes, edges) = tables();

        let err = save_workbook(&nodes, &edges, &path).unwrap_err();
        assert!(matches!(err, WorkbookError::SaveFailed { .. }));
        assert!(err.to_string().contains("data.xlsx"));
    }
}
