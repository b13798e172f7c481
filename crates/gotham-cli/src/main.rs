//! Gotham CLI - Command-line interface
//!
//! Usage:
//!   gotham parse [--file <path>]
//!   gotham canonicalize [--file <path>] [--max-nodes <n>]
//!   gotham mission <task> [--thread-id <id>]
//!   gotham sample [--doc-limit <n>]
//!   gotham stats
//!   gotham insight <company> [--no-mood] [--timeframe <window>]
//!
//! `parse` and `canonicalize` run locally on stdin or a file; the other
//! commands call the agent backend.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use gotham_client::{Console, HttpBackend, RequestState};
use gotham_core::{AppConfig, GraphEdge, GraphNode, GraphSample, LoggingConfig};
use gotham_extractor::ResultParser;
use gotham_graph::GraphCanonicalizer;
use serde::Serialize;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gotham")]
#[command(about = "Project Gotham console core CLI")]
#[command(version)]
struct Cli {
    /// TOML configuration file (environment variables still take precedence)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = Format::Json)]
    format: Format,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an agent answer into headline, subtitle and inferred entity
    Parse {
        /// Read the answer from a file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Canonicalize a raw graph dump ({nodes, edges} or {nodes, links})
    Canonicalize {
        #[arg(long)]
        file: Option<PathBuf>,
        /// Override the configured node cap
        #[arg(long)]
        max_nodes: Option<usize>,
    },
    /// Run a mission against the backend
    Mission {
        task: String,
        #[arg(long)]
        thread_id: Option<String>,
    },
    /// Fetch and canonicalize a graph sample
    Sample {
        #[arg(long)]
        doc_limit: Option<usize>,
    },
    /// Entity and source totals of the graph
    Stats,
    /// Company profile, competitors and mood
    Insight {
        company: String,
        #[arg(long)]
        thread_id: Option<String>,
        /// Skip the mood request
        #[arg(long)]
        no_mood: bool,
        /// Override the configured mood timeframe
        #[arg(long)]
        timeframe: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config.logging);
    tracing::debug!("Backend at {}", config.backend.base_url);

    match cli.command {
        Commands::Parse { file } => {
            let text = read_input(file.as_deref())?;
            let parsed = ResultParser::from_config(&config.inference).parse(&text);
            match cli.format {
                Format::Json => print_json(&json!({
                    "headline": parsed.headline(),
                    "subtitle": parsed.subtitle(),
                    "parsed": parsed,
                }))?,
                Format::Text => {
                    println!("{}", parsed.headline());
                    println!("{}", parsed.subtitle());
                }
            }
        }
        Commands::Canonicalize { file, max_nodes } => {
            let text = read_input(file.as_deref())?;
            let value: Value = serde_json::from_str(&text).context("graph input is not JSON")?;
            let (nodes, edges) = read_graph(&value);

            let canonicalizer = match max_nodes {
                Some(cap) => GraphCanonicalizer::new(cap),
                None => GraphCanonicalizer::from_config(&config.graph),
            };
            let (graph, stats) = canonicalizer.canonicalize_with_stats(&nodes, &edges);
            match cli.format {
                Format::Json => print_json(&graph)?,
                Format::Text => println!(
                    "{} nodes, {} links ({} merged, {} unnamed, {} truncated)",
                    graph.nodes.len(),
                    graph.links.len(),
                    stats.merged_nodes,
                    stats.unnamed_nodes,
                    stats.truncated_nodes
                ),
            }
        }
        Commands::Mission { task, thread_id } => {
            let console = console(&config);
            let state = console.submit_mission(&task, thread_id.as_deref()).await;
            let outcome = settled(state)?;
            match cli.format {
                Format::Json => print_json(&outcome)?,
                Format::Text => {
                    println!("{}", outcome.headline);
                    println!("{}", outcome.subtitle);
                    if !outcome.response.thread_id.is_empty() {
                        println!("thread: {}", outcome.response.thread_id);
                    }
                }
            }
        }
        Commands::Sample { doc_limit } => {
            let mut console = console(&config);
            if let Some(limit) = doc_limit {
                console = console.with_doc_limit(limit);
            }
            let preview = settled(console.graph_preview().await)?;
            match cli.format {
                Format::Json => print_json(&preview)?,
                Format::Text => {
                    let summary = &preview.summary;
                    println!("{} nodes, {} edges", summary.node_count, summary.edge_count);
                    if !summary.sample_nodes.is_empty() {
                        println!("sample: {}", summary.sample_nodes.join(", "));
                    }
                    if preview.graph.is_empty() {
                        println!("no graph data");
                    } else {
                        println!(
                            "preview: {} nodes, {} links",
                            preview.graph.nodes.len(),
                            preview.graph.links.len()
                        );
                    }
                }
            }
        }
        Commands::Stats => {
            let stats = settled(console(&config).graph_stats().await)?;
            match cli.format {
                Format::Json => print_json(&stats)?,
                Format::Text => {
                    println!(
                        "{} entities, {} sources, {:.0}% dedupe confidence",
                        stats.entities, stats.sources, stats.dedupe_confidence
                    );
                    if let Some(raw) = &stats.raw {
                        println!("backend said: {raw}");
                    }
                }
            }
        }
        Commands::Insight {
            company,
            thread_id,
            no_mood,
            timeframe,
        } => {
            let mut console = console(&config);
            if let Some(timeframe) = timeframe {
                console = console.with_timeframe(timeframe);
            }
            let report = console
                .company_lookup(&company, thread_id.as_deref(), !no_mood)
                .await;

            match cli.format {
                Format::Json => print_json(&report)?,
                Format::Text => {
                    println!("{}", report.company);
                    match &report.insight {
                        RequestState::Ready(insight) if insight.is_empty() => {
                            println!("insight: no data")
                        }
                        RequestState::Ready(insight) => {
                            for c in &insight.competitors {
                                println!(
                                    "competitor: {} ({})",
                                    c.competitor,
                                    c.reason.as_deref().unwrap_or_default()
                                );
                            }
                        }
                        other => println!("insight: {other}"),
                    }
                    match &report.mood {
                        RequestState::Ready(mood) => {
                            println!("mood: {} ({:.2})", mood.label, mood.confidence)
                        }
                        other => println!("mood: {other}"),
                    }
                }
            }

            if let Some(message) = report.insight.error() {
                anyhow::bail!("{message}");
            }
        }
    }

    Ok(())
}

/// File settings with environment overrides, or the environment alone
fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    Ok(config)
}

fn init_tracing(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn console(config: &AppConfig) -> Console {
    Console::from_config(Arc::new(HttpBackend::from_config(&config.backend)), config)
}

/// Unwrap a settled request, turning a failure into the command's error
fn settled<T>(state: RequestState<T>) -> anyhow::Result<T> {
    match state {
        RequestState::Ready(value) => Ok(value),
        RequestState::Failed(message) => Err(anyhow::anyhow!(message)),
        other => Err(anyhow::anyhow!("nothing to do (request {})", other.as_str())),
    }
}

fn read_input(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

/// Nodes and edges of a graph dump; edges may also be named `links`
fn read_graph(value: &Value) -> (Vec<GraphNode>, Vec<GraphEdge>) {
    let sample = GraphSample::from_value(value);
    if !sample.edges.is_empty() {
        return (sample.nodes, sample.edges);
    }

    let links = value
        .get("links")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(GraphEdge::from_value).collect())
        .unwrap_or_default();
    (sample.nodes, links)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use gotham_core::ConfigError;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_args() {
        let cli = Cli::parse_from(["gotham", "insight", "Delta", "--no-mood", "--format", "text"]);
        assert!(cli.format == Format::Text);
        match cli.command {
            Commands::Insight {
                company, no_mood, ..
            } => {
                assert_eq!(company, "Delta");
                assert!(no_mood);
            }
            _ => panic!("expected insight"),
        }
    }

    #[test]
    fn test_stats_command() {
        let cli = Cli::parse_from(["gotham", "stats", "--format", "text"]);
        assert!(matches!(cli.command, Commands::Stats));
    }

    #[test]
    fn test_missing_config_file_is_config_error() {
        let err = load_config(Some(Path::new("/nonexistent/gotham.toml"))).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::FileReadError { .. })
        ));
    }

    #[test]
    fn test_read_graph_accepts_links() {
        let value = json!({
            "nodes": [{"id": "a", "name": "A"}, {"id": "b", "name": "B"}],
            "links": [{"source": "a", "target": "b"}]
        });
        let (nodes, edges) = read_graph(&value);
        assert_eq!(nodes.len(), 2);
        assert_eq!(edges, vec![GraphEdge::new("a", "b")]);

        let value = json!({
            "nodes": [{"id": 1, "name": "A"}],
            "edges": [{"source": 1, "target": 2}]
        });
        let (_, edges) = read_graph(&value);
        assert_eq!(edges[0].target, "2");
    }

    #[test]
    fn test_settled() {
        assert_eq!(settled(RequestState::Ready(1)).unwrap(), 1);
        let err = settled::<u8>(RequestState::Failed("Backend responded 500".to_string()))
            .unwrap_err();
        assert_eq!(err.to_string(), "Backend responded 500");
        assert!(settled::<u8>(RequestState::Idle).is_err());
    }
}
