//! Column-addressable in-memory table used for both node and edge records.
//!
//! Rows are positional: row `i` is the i-th record in table order, and that
//! position is what validation issues and synthesized edge ids refer to.

use crate::schema::Value;

static NULL: Value = Value::Null;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn with_columns(columns: &[&str]) -> Self {
        Self::new(columns.iter().map(|c| c.to_string()).collect())
    }

    /// Build a table from literal rows. Short rows are padded with nulls.
    pub fn from_rows<R>(columns: &[&str], rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = Value>,
    {
        let mut table = Self::with_columns(columns);
        for row in rows {
            table.push_values(row.into_iter().collect());
        }
        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at (row, column); absent rows or columns read as null.
    pub fn cell(&self, row: usize, column: &str) -> &Value {
        self.column_index(column)
            .and_then(|c| self.rows.get(row).and_then(|r| r.get(c)))
            .unwrap_or(&NULL)
    }

    pub fn text(&self, row: usize, column: &str) -> String {
        self.cell(row, column).as_text()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Value]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Iterate one column's cells in row order (nulls if the column is absent).
    pub fn column(&self, column: &str) -> impl Iterator<Item = &Value> {
        let idx = self.column_index(column);
        self.rows
            .iter()
            .map(move |r| idx.and_then(|c| r.get(c)).unwrap_or(&NULL))
    }

    /// Add a column filled with `""` if it does not exist yet.
    pub fn ensure_column(&mut self, name: &str) {
        if self.has_column(name) {
            return;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(Value::Text(String::new()));
        }
    }

    /// Append a raw row aligned with `columns`; pads or truncates to width.
    pub fn push_values(&mut self, mut values: Vec<Value>) {
        values.resize(self.columns.len(), Value::Null);
        self.rows.push(values);
    }

    /// Append a record. Named cells create their column when needed;
    /// unnamed columns default to `""`.
    pub fn push_record<'a>(&mut self, cells: impl IntoIterator<Item = (&'a str, Value)>) -> usize {
        let cells: Vec<(&str, Value)> = cells.into_iter().collect();
        for (name, _) in &cells {
            self.ensure_column(name);
        }
        let mut row = vec![Value::Text(String::new()); self.columns.len()];
        for (name, value) in cells {
            if let Some(c) = self.column_index(name) {
                row[c] = value;
            }
        }
        self.rows.push(row);
        self.rows.len() - 1
    }

    /// Overwrite one cell, creating the column when needed.
    /// Returns false if `row` is out of range.
    pub fn set(&mut self, row: usize, column: &str, value: Value) -> bool {
        if row >= self.rows.len() {
            return false;
        }
        self.ensure_column(column);
        let Some(c) = self.column_index(column) else {
            return false;
        };
        self.rows[row][c] = value;
        true
    }

    pub fn remove_row(&mut self, row: usize) -> Option<Vec<Value>> {
        (row < self.rows.len()).then(|| self.rows.remove(row))
    }

    /// New table keeping the rows for which `keep(row_index)` holds, in order.
    pub fn retain_rows(&self, mut keep: impl FnMut(usize) -> bool) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .enumerate()
                .filter(|(i, _)| keep(*i))
                .map(|(_, r)| r.clone())
                .collect(),
        }
    }

    /// New table with rows in the given order (indices into this table).
    pub fn take_rows(&self, order: &[usize]) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: order.iter().filter_map(|&i| self.rows.get(i).cloned()).collect(),
        }
    }

    /// New table with only `columns`, in that order. Unknown names are skipped.
    pub fn select_columns(&self, columns: &[String]) -> Table {
        let picked: Vec<(String, usize)> = columns
            .iter()
            .filter_map(|c| self.column_index(c).map(|i| (c.clone(), i)))
            .collect();
        Table {
            columns: picked.iter().map(|(c, _)| c.clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|r| picked.iter().map(|(_, i)| r[*i].clone()).collect())
                .collect(),
        }
    }

    /// Column names not in `required`, in table order.
    pub fn extra_columns(&self, required: &[&str]) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| !required.contains(&c.as_str()))
            .cloned()
            .collect()
    }
}
