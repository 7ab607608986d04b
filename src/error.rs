//! Typed failures for loading, editing, saving and exporting.
//!
//! - WorkbookError: schema problems at load time, I/O problems at save time
//! - InputError: a guard rejected a single add/edit/delete
//! - ExportError: an export artifact could not be written
//! - SessionError: anything a session operation can raise

use crate::validate::Issue;

use std::path::PathBuf;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error(
        "Workbook not found at '{}'. Create the file with 'nodes' and 'edges' sheets \
         or set DHVIZ_DATA_PATH to the correct workbook location.",
        .path.display()
    )]
    NotFound { path: PathBuf },

    #[error(
        "Unable to read workbook '{}'. Ensure it is a valid .xlsx file and is not locked by another application.",
        .path.display()
    )]
    Unreadable {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("Workbook is missing required sheet(s): {}. Add the missing sheets and try again.", .sheets.join(", "))]
    MissingSheets { sheets: Vec<String> },

    #[error("Workbook is missing required column(s): {detail}. Add the missing columns and try again.")]
    MissingColumns { detail: String },

    #[error("Failed to save workbook to '{}'. {hint}", .path.display())]
    SaveFailed {
        path: PathBuf,
        hint: &'static str,
        #[source]
        source: BoxError,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("source is required")]
    SourceRequired,
    #[error("target is required")]
    TargetRequired,
    #[error("relationship_type is required")]
    RelationshipRequired,
    #[error("source '{0}' does not exist")]
    UnknownSource(String),
    #[error("target '{0}' does not exist")]
    UnknownTarget(String),
    #[error("source and target must be different (self-loops are not allowed yet)")]
    SelfLoop,

    #[error("id, label, and type are required")]
    NodeFieldsRequired,
    #[error("node type '{0}' is not one of Person, Place, Institution, Group")]
    InvalidNodeType(String),
    #[error("Node id '{0}' is already in use")]
    DuplicateNodeId(String),
    #[error("Cannot delete node '{id}': referenced by {count} edge(s)")]
    NodeReferenced { id: String, count: usize },
    #[error("node '{0}' does not exist")]
    UnknownNode(String),
    #[error("edge row {0} does not exist")]
    UnknownEdgeRow(usize),

    #[error("date '{0}' must be empty or YYYY-MM-DD")]
    InvalidDate(String),
    #[error("confidence '{0}' must be empty or a number between 0 and 1")]
    InvalidConfidence(String),
}

#[derive(Debug, Error)]
#[error("Failed to export {what} to '{}'. {hint}", .path.display())]
pub struct ExportError {
    pub what: &'static str,
    pub path: PathBuf,
    pub hint: &'static str,
    #[source]
    pub source: BoxError,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("change rejected: it would introduce {} validation issue(s)", .issues.len())]
    Rejected { issues: Vec<Issue> },

    #[error("Cannot {action}: fix {} validation issue(s) first", .issues.len())]
    Blocked { action: &'static str, issues: Vec<Issue> },

    #[error(transparent)]
    Workbook(#[from] WorkbookError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

impl SessionError {
    /// Validation issues carried by the error, if any.
    pub fn issues(&self) -> &[Issue] {
        match self {
            SessionError::Rejected { issues } | SessionError::Blocked { issues, .. } => issues,
            _ => &[],
        }
    }
}

/// Remediation hint for an I/O failure while writing an output file.
pub fn write_hint(err: &std::io::Error) -> &'static str {
    match err.kind() {
        std::io::ErrorKind::PermissionDenied => {
            "Check file permissions and close the file if it is open in another program."
        }
        _ => "Verify the destination path exists and is writable.",
    }
}
