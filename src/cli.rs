use crate::config::{DATA_PATH_ENV, DEFAULT_DATA_PATH, DEFAULT_EXPORT_DIR, EXPORT_DIR_ENV, Settings};
use crate::filter::{ALL, Filters};
use crate::guards::MetadataInput;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "crimenet")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Curate and explore a criminal-network graph kept in an Excel workbook", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalOptions {
    /// Workbook with `nodes` and `edges` sheets
    #[arg(long, env = DATA_PATH_ENV, global = true, default_value = DEFAULT_DATA_PATH)]
    pub data_path: PathBuf,

    /// Directory receiving export artifacts
    #[arg(long, env = EXPORT_DIR_ENV, global = true, default_value = DEFAULT_EXPORT_DIR)]
    pub export_dir: PathBuf,
}

impl GlobalOptions {
    pub fn settings(&self) -> Settings {
        Settings::new(&self.data_path, &self.export_dir)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check the workbook for integrity problems (non-zero exit when invalid).
    Validate,

    /// List nodes.
    Nodes {
        #[command(subcommand)]
        cmd: ListCommand,
    },

    /// Add, edit, delete or inspect one node; changes are saved on success.
    Node {
        #[command(subcommand)]
        cmd: NodeCommand,
    },

    /// List edges.
    Edges {
        #[command(subcommand)]
        cmd: ListCommand,
    },

    /// Add, edit, delete or inspect one edge; changes are saved on success.
    Edge {
        #[command(subcommand)]
        cmd: EdgeCommand,
    },

    /// Print the filtered view of the graph.
    Filter {
        #[command(flatten)]
        filters: FilterArgs,

        /// Print graph elements as JSON instead of tables.
        #[arg(long)]
        json: bool,
    },

    /// Write a self-contained HTML graph report.
    Render {
        #[arg(short = 'o', long)]
        out: PathBuf,

        #[arg(long, default_value = "Crime network")]
        title: String,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Export the full dataset (refused while validation reports issues).
    Export {
        #[command(subcommand)]
        kind: ExportKind,
    },

    /// Create the starter workbook at the data path.
    Sample {
        /// Overwrite an existing workbook.
        #[arg(long)]
        force: bool,
    },

    /// Create, validate and export a sample dataset in a scratch directory.
    Smoke {
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ListCommand {
    List {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct MetadataArgs {
    #[arg(long)]
    pub source_ref: Option<String>,

    /// YYYY-MM-DD; pass "" to clear.
    #[arg(long)]
    pub date: Option<String>,

    /// Number in [0, 1]; pass "" to clear.
    #[arg(long)]
    pub confidence: Option<String>,
}

impl From<MetadataArgs> for MetadataInput {
    fn from(m: MetadataArgs) -> Self {
        MetadataInput {
            source_ref: m.source_ref,
            date: m.date,
            confidence: m.confidence,
        }
    }
}

#[derive(Subcommand)]
pub enum NodeCommand {
    Add {
        #[arg(long)]
        id: String,
        #[arg(long)]
        label: String,
        /// One of Person, Place, Institution, Group.
        #[arg(long = "type")]
        node_type: String,
        #[arg(long, default_value = "")]
        description: String,
        #[command(flatten)]
        metadata: MetadataArgs,
    },
    /// Change fields of node ID; omitted fields keep their value.
    Edit {
        id: String,
        #[arg(long = "new-id")]
        new_id: Option<String>,
        #[arg(long)]
        label: Option<String>,
        #[arg(long = "type")]
        node_type: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[command(flatten)]
        metadata: MetadataArgs,
    },
    /// Delete node ID; refused while edges reference it.
    Delete { id: String },
    /// Set provenance fields of node ID.
    Meta {
        id: String,
        #[command(flatten)]
        metadata: MetadataArgs,
    },
    Show { id: String },
}

#[derive(Subcommand)]
pub enum EdgeCommand {
    Add {
        #[arg(long)]
        source: String,
        #[arg(long)]
        target: String,
        #[arg(long = "rel")]
        relationship_type: String,
        #[arg(long, default_value = "")]
        description: String,
        #[command(flatten)]
        metadata: MetadataArgs,
    },
    /// Change fields of the edge at ROW; omitted fields keep their value.
    Edit {
        row: usize,
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        target: Option<String>,
        #[arg(long = "rel")]
        relationship_type: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[command(flatten)]
        metadata: MetadataArgs,
    },
    Delete { row: usize },
    /// Set provenance fields of the edge at ROW.
    Meta {
        row: usize,
        #[command(flatten)]
        metadata: MetadataArgs,
    },
    Show { row: usize },
}

#[derive(Subcommand)]
pub enum ExportKind {
    Csv,
    Gexf,
    Summary,
    /// CSV, GEXF and summary.
    All,
}

#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    /// Node type to keep, or "All".
    #[arg(long = "type", default_value = ALL)]
    pub node_type: String,

    /// Relationship type to keep, or "All".
    #[arg(long = "rel", default_value = ALL)]
    pub relationship: String,

    /// Case-insensitive label substring.
    #[arg(long, default_value = "")]
    pub search: String,
}

impl From<FilterArgs> for Filters {
    fn from(f: FilterArgs) -> Self {
        Filters {
            node_type: f.node_type,
            relationship: f.relationship,
            search: f.search,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_edge_edit_with_metadata() {
        let cli = Cli::try_parse_from([
            "crimenet",
            "--data-path",
            "book.xlsx",
            "edge",
            "edit",
            "3",
            "--rel",
            "knows",
            "--confidence",
            "0.5",
        ])
        .unwrap();
        assert_eq!(cli.global.data_path, PathBuf::from("book.xlsx"));
        match cli.command {
            Commands::Edge {
                cmd:
                    EdgeCommand::Edit {
                        row,
                        relationship_type,
                        metadata,
                        ..
                    },
            } => {
                assert_eq!(row, 3);
                assert_eq!(relationship_type.as_deref(), Some("knows"));
                assert_eq!(metadata.confidence.as_deref(), Some("0.5"));
            }
            _ => panic!("expected edge edit"),
        }
    }

    #[test]
    fn filter_defaults_mean_unrestricted() {
        let cli = Cli::try_parse_from(["crimenet", "filter"]).unwrap();
        let Commands::Filter { filters, json } = cli.command else {
            panic!("expected filter");
        };
        assert!(!json);
        assert!(Filters::from(filters).is_default());
    }
}
