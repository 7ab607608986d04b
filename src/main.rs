use clap::Parser;

mod cli;
mod config;
mod error;
mod export;
mod filter;
mod graph;
mod guards;
mod render;
mod sample;
mod schema;
mod session;
mod smoke;
mod store;
mod validate;

use anyhow::{Context, bail};
use cli::{Cli, Commands, EdgeCommand, ExportKind, ListCommand, NodeCommand};
use error::SessionError;
use filter::Filters;
use graph::{Element, ElementGroup, build_elements};
use guards::{EdgeInput, NodeInput};
use indexmap::IndexMap;
use schema::{Table, Value};
use session::{Record, Session};
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub type Result<T> = anyhow::Result<T>;

fn main() -> Result<ExitCode> {
    // Logs go to stderr; stdout carries command output.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "crimenet=info".into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = cli.global.settings();

    match cli.command {
        Commands::Validate => {
            let session = Session::load(settings.data_path())?;
            let issues = session.issues();
            if issues.is_empty() {
                println!(
                    "OK: {} nodes, {} edges, no validation issues",
                    session.nodes().len(),
                    session.edges().len()
                );
                return Ok(ExitCode::SUCCESS);
            }
            println!("Validation errors: {}", issues.len());
            for issue in &issues {
                println!("  {}", issue);
            }
            return Ok(ExitCode::FAILURE);
        }

        Commands::Nodes {
            cmd: ListCommand::List { json },
        } => {
            let session = Session::load(settings.data_path())?;
            print_table(session.nodes(), &["id", "label", "type", "description"], json)?;
        }

        Commands::Edges {
            cmd: ListCommand::List { json },
        } => {
            let session = Session::load(settings.data_path())?;
            print_table(
                session.edges(),
                &["source", "target", "relationship_type", "description"],
                json,
            )?;
        }

        Commands::Node { cmd } => {
            let mut session = Session::load(settings.data_path())?;
            run_node_command(&mut session, cmd)?;
            if session.is_dirty() {
                with_issues(session.save(settings.data_path()))?;
                println!("Saved to {}", settings.data_path().display());
            }
        }

        Commands::Edge { cmd } => {
            let mut session = Session::load(settings.data_path())?;
            run_edge_command(&mut session, cmd)?;
            if session.is_dirty() {
                with_issues(session.save(settings.data_path()))?;
                println!("Saved to {}", settings.data_path().display());
            }
        }

        Commands::Filter { filters, json } => {
            let session = Session::load(settings.data_path())?;
            let filters: Filters = filters.into();
            let (nodes, edges) = filter::apply_filters(session.nodes(), session.edges(), &filters);
            if json {
                let elements = build_elements(&nodes, &edges);
                println!("{}", serde_json::to_string_pretty(&elements)?);
            } else {
                if !filters.is_default() {
                    println!(
                        "# filters: type={}, rel={}, search={:?}",
                        filters.node_type, filters.relationship, filters.search
                    );
                }
                println!("# nodes ({})", nodes.len());
                print_table(&nodes, &["id", "label", "type", "description"], false)?;
                println!();
                println!("# edges ({})", edges.len());
                print_table(&edges, &["source", "target", "relationship_type", "description"], false)?;
            }
        }

        Commands::Render { out, title, filters } => {
            let session = Session::load(settings.data_path())?;
            let report =
                render::build_report(&title, session.nodes(), session.edges(), &filters.into());
            let html = render::render_html_report(&report)?;
            store::atomic::write_bytes(&out, html.as_bytes())
                .with_context(|| format!("writing report to {}", out.display()))?;
            println!("Wrote {}", out.display());
        }

        Commands::Export { kind } => {
            let session = Session::load(settings.data_path())?;
            let dir = settings.export_dir();
            if matches!(kind, ExportKind::Csv | ExportKind::All) {
                let (nodes_path, edges_path) = with_issues(session.export_csv(dir))?;
                println!("Exported CSV: {}, {}", nodes_path.display(), edges_path.display());
            }
            if matches!(kind, ExportKind::Gexf | ExportKind::All) {
                let path = settings.gexf_path();
                with_issues(session.export_gexf(&path))?;
                println!("Exported GEXF: {}", path.display());
            }
            if matches!(kind, ExportKind::Summary | ExportKind::All) {
                let path = settings.summary_path();
                with_issues(session.export_summary(&path))?;
                println!("Exported summary: {}", path.display());
            }
        }

        Commands::Sample { force } => {
            let path = settings.data_path();
            if path.exists() && !force {
                bail!(
                    "Workbook already exists at '{}'. Pass --force to overwrite it.",
                    path.display()
                );
            }
            sample::create_sample_workbook(path)?;
            println!("Created sample workbook at {}", path.display());
        }

        Commands::Smoke { dir } => {
            let root = match dir {
                Some(dir) => dir,
                None => smoke::default_smoke_dir()?,
            };
            let artifacts = smoke::run_smoke_check(&root)?;
            println!("Smoke check artifacts:");
            for (name, path) in artifacts.iter() {
                println!("- {}: {}", name, path.display());
            }
            println!("OK");
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Print validation issues attached to a session error before propagating it.
fn with_issues<T>(result: std::result::Result<T, SessionError>) -> Result<T> {
    result.map_err(|err| {
        for issue in err.issues() {
            eprintln!("  {}", issue);
        }
        anyhow::Error::new(err)
    })
}

fn run_node_command(session: &mut Session, cmd: NodeCommand) -> Result<()> {
    match cmd {
        NodeCommand::Add {
            id,
            label,
            node_type,
            description,
            metadata,
        } => {
            let input = NodeInput {
                id,
                label,
                node_type,
                description,
                metadata: metadata.into(),
            };
            session.add_node(&input)?;
            println!("Added node '{}'", input.id.trim());
        }
        NodeCommand::Edit {
            id,
            new_id,
            label,
            node_type,
            description,
            metadata,
        } => {
            let row = session
                .node_row(&id)
                .with_context(|| format!("node '{}' does not exist", id))?;
            let nodes = session.nodes();
            let input = NodeInput {
                id: new_id.unwrap_or_else(|| id.clone()),
                label: label.unwrap_or_else(|| nodes.text(row, "label")),
                node_type: node_type.unwrap_or_else(|| nodes.text(row, "type")),
                description: description.unwrap_or_else(|| nodes.text(row, "description")),
                metadata: metadata.into(),
            };
            session.edit_node(&id, &input)?;
            println!("Updated node '{}'", input.id.trim());
        }
        NodeCommand::Delete { id } => {
            session.delete_node(&id)?;
            println!("Deleted node '{}'", id);
        }
        NodeCommand::Meta { id, metadata } => {
            session.set_metadata(Record::Node(&id), &metadata.into())?;
            println!("Updated metadata of node '{}'", id);
        }
        NodeCommand::Show { id } => {
            let elements = build_elements(session.nodes(), session.edges());
            let element = elements
                .iter()
                .find(|e| e.group == ElementGroup::Nodes && e.id() == id)
                .with_context(|| format!("node '{}' does not exist", id))?;
            print_inspector(element);
        }
    }
    Ok(())
}

fn run_edge_command(session: &mut Session, cmd: EdgeCommand) -> Result<()> {
    match cmd {
        EdgeCommand::Add {
            source,
            target,
            relationship_type,
            description,
            metadata,
        } => {
            let input = EdgeInput {
                source,
                target,
                relationship_type,
                description,
                metadata: metadata.into(),
            };
            let row = with_issues(session.add_edge(&input))?;
            println!("Added edge at row {}", row);
        }
        EdgeCommand::Edit {
            row,
            source,
            target,
            relationship_type,
            description,
            metadata,
        } => {
            if row >= session.edges().len() {
                bail!("edge row {} does not exist", row);
            }
            let edges = session.edges();
            let input = EdgeInput {
                source: source.unwrap_or_else(|| edges.text(row, "source")),
                target: target.unwrap_or_else(|| edges.text(row, "target")),
                relationship_type: relationship_type
                    .unwrap_or_else(|| edges.text(row, "relationship_type")),
                description: description.unwrap_or_else(|| edges.text(row, "description")),
                metadata: metadata.into(),
            };
            with_issues(session.edit_edge(row, &input))?;
            println!("Updated edge at row {}", row);
        }
        EdgeCommand::Delete { row } => {
            with_issues(session.delete_edge(row))?;
            println!("Deleted edge at row {}", row);
        }
        EdgeCommand::Meta { row, metadata } => {
            session.set_metadata(Record::Edge(row), &metadata.into())?;
            println!("Updated metadata of edge at row {}", row);
        }
        EdgeCommand::Show { row } => {
            let elements = build_elements(session.nodes(), session.edges());
            let element = elements
                .iter()
                .filter(|e| e.group == ElementGroup::Edges)
                .nth(row)
                .with_context(|| format!("edge row {} does not exist", row))?;
            print_inspector(element);
        }
    }
    Ok(())
}

fn print_inspector(element: &Element) {
    for (key, value) in render::format_inspector_rows(element.group, &element.data) {
        println!("{}: {}", key, value);
    }
}

/// Tab-separated listing of `columns`, or every column as JSON records.
fn print_table(table: &Table, columns: &[&str], json: bool) -> Result<()> {
    if json {
        let records: Vec<IndexMap<&str, &Value>> = (0..table.len())
            .map(|row| {
                table
                    .columns()
                    .iter()
                    .map(|c| (c.as_str(), table.cell(row, c)))
                    .collect()
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if table.is_empty() {
        println!("(none)");
        return Ok(());
    }
    println!("row\t{}", columns.join("\t"));
    for row in 0..table.len() {
        let cells: Vec<String> = columns.iter().map(|c| table.text(row, c)).collect();
        println!("{}\t{}", row, cells.join("\t"));
    }
    Ok(())
}
