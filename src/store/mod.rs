//! Workbook persistence.
//!
//! `workbook` reads and writes the two-sheet `.xlsx` file; `atomic` is the
//! temp-file + rename helper every writer in the crate goes through.

pub mod atomic;
pub mod workbook;

pub use workbook::{load_workbook, save_workbook};
