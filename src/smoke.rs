//! End-to-end check without any UI: sample workbook, reload, validate, export.

use crate::Result;
use crate::export::{self, EDGES_CSV, GRAPH_GEXF, NODES_CSV, SUMMARY_MD};
use crate::graph::build_multigraph;
use crate::sample::create_sample_workbook;
use crate::store::load_workbook;
use crate::validate::validate;

use anyhow::{Context, bail};
use std::path::{Path, PathBuf};

/// Produced artifacts, in creation order.
#[derive(Debug, Clone)]
pub struct SmokeArtifacts {
    pub workbook: PathBuf,
    pub nodes_csv: PathBuf,
    pub edges_csv: PathBuf,
    pub graph_gexf: PathBuf,
    pub summary_md: PathBuf,
}

impl SmokeArtifacts {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Path)> {
        [
            ("workbook", self.workbook.as_path()),
            ("nodes_csv", self.nodes_csv.as_path()),
            ("edges_csv", self.edges_csv.as_path()),
            ("graph_gexf", self.graph_gexf.as_path()),
            ("summary_md", self.summary_md.as_path()),
        ]
        .into_iter()
    }
}

/// Run the pipeline under `root` (`data/data.xlsx`, `exports/...`).
pub fn run_smoke_check(root: &Path) -> Result<SmokeArtifacts> {
    let workbook = root.join("data").join("data.xlsx");
    let exports = root.join("exports");

    create_sample_workbook(&workbook)?;
    let (nodes, edges) = load_workbook(&workbook)?;

    let issues = validate(&nodes, &edges);
    if !issues.is_empty() {
        let listed: Vec<String> = issues.iter().map(|i| i.to_string()).collect();
        bail!("Smoke check failed validation: {}", listed.join("; "));
    }

    let (nodes_csv, edges_csv) = export::export_csv(&nodes, &edges, &exports)?;
    let graph_gexf = exports.join(GRAPH_GEXF);
    export::export_gexf(&build_multigraph(&nodes, &edges), &graph_gexf)?;
    let summary_md = exports.join(SUMMARY_MD);
    export::export_summary(&nodes, &edges, &summary_md)?;

    let artifacts = SmokeArtifacts {
        workbook,
        nodes_csv,
        edges_csv,
        graph_gexf,
        summary_md,
    };
    for (name, path) in artifacts.iter() {
        if !path.exists() {
            bail!("Smoke check expected artifact missing: {} ({})", path.display(), name);
        }
    }
    tracing::info!(root = %root.display(), "smoke check passed");
    Ok(artifacts)
}

/// Per-process directory under the system temp dir, used when none is given.
pub fn default_smoke_dir() -> Result<PathBuf> {
    let dir = std::env::temp_dir().join(format!("crimenet_smoke_{}", std::process::id()));
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating smoke check directory {}", dir.display()))?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke_check_produces_every_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = run_smoke_check(dir.path()).unwrap();

        assert_eq!(artifacts.iter().count(), 5);
        assert!(artifacts.iter().all(|(_, p)| p.exists()));
        assert!(artifacts.nodes_csv.ends_with(NODES_CSV));
        assert!(artifacts.edges_csv.ends_with(EDGES_CSV));

        let summary = std::fs::read_to_string(&artifacts.summary_md).unwrap();
        assert!(summary.contains("- Node count: 9"));
        assert!(summary.contains("- Edges with source_ref: 12/12 (100.0%)"));
    }
}
