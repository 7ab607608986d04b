//! Environment-driven defaults for where the workbook lives and where exports go.

use crate::export::{GRAPH_GEXF, SUMMARY_MD};

use std::path::{Path, PathBuf};

pub const DATA_PATH_ENV: &str = "DHVIZ_DATA_PATH";
pub const EXPORT_DIR_ENV: &str = "DHVIZ_EXPORT_DIR";

pub const DEFAULT_DATA_PATH: &str = "data/data.xlsx";
pub const DEFAULT_EXPORT_DIR: &str = "exports";

/// Resolved locations for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_path: PathBuf,
    pub export_dir: PathBuf,
}

impl Settings {
    pub fn new(data_path: impl Into<PathBuf>, export_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            export_dir: export_dir.into(),
        }
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    pub fn gexf_path(&self) -> PathBuf {
        self.export_dir.join(GRAPH_GEXF)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.export_dir.join(SUMMARY_MD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn export_paths_live_in_export_dir() {
        let s = Settings::new("book.xlsx", "out");
        assert_eq!(s.gexf_path(), PathBuf::from("out/graph.gexf"));
        assert_eq!(s.summary_path(), PathBuf::from("out/EXPORT_SUMMARY.md"));
        assert_eq!(s.data_path(), Path::new("book.xlsx"));
        assert_eq!(s.export_dir(), Path::new("out"));
    }
}
