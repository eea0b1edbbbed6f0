//! intocps-trace CLI: query and feed an INTO-CPS provenance store.
//!
//! Usage:
//!   intocps-trace [--url URL] [--project-id ID] simulations
//!   intocps-trace details <SIM>
//!   intocps-trace decode <FILE> [--content-type TYPE]
//!   intocps-trace expand <VALUE>

use clap::{Parser, Subcommand};
use intocps_traceability::{
    vocab, DecodedGraph, ProjectContext, RdfFormat, TraceClient, TraceConfig, TraceMessageBuilder,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "intocps-trace",
    version,
    about = "Traceability client for INTO-CPS provenance stores"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Path to the traceability config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Base URL of the store, overriding the config file
    #[arg(long, global = true)]
    url: Option<String>,
    /// Log requests and decode details
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Project identifier
    #[arg(long, global = true, default_value = "default")]
    project_id: String,
    /// Project root directory
    #[arg(long, global = true)]
    project_root: Option<PathBuf>,
    /// Human-readable project name
    #[arg(long, global = true)]
    project_name: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List simulations recorded for the project
    Simulations,
    /// List FMUs used by a simulation
    Fmus {
        /// Simulation URI
        simulation: String,
    },
    /// List simulations that used an FMU
    WithFmu {
        /// FMU artefact URI
        fmu: String,
    },
    /// Show everything recorded about a simulation
    Details {
        /// Simulation URI
        simulation: String,
    },
    /// Decode an RDF file into typed nodes and traces
    Decode {
        /// File to decode
        file: PathBuf,
        /// Content type; guessed from the extension when omitted
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Push the nodes and traces in an RDF file to the store
    Push {
        /// File to push
        file: PathBuf,
        /// Content type; guessed from the extension when omitted
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Expand a term or prefixed name to a full IRI
    Expand { value: String },
    /// Compact a full IRI to a term or prefixed name
    Compact { value: String },
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>, url: Option<String>) -> Result<TraceConfig, String> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(TraceConfig::default_path);
    let mut config = TraceConfig::load_or_default(&path)
        .and_then(TraceConfig::with_env)
        .map_err(|e| format!("Failed to load config {}: {}", path.display(), e))?;
    if let Some(url) = url {
        config.base_url = url;
    }
    Ok(config)
}

fn project(cli: &Cli) -> ProjectContext {
    let root = cli
        .project_root
        .clone()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_default();
    let name = cli.project_name.clone().unwrap_or_else(|| cli.project_id.clone());
    ProjectContext::new(&cli.project_id, root, name)
}

fn guess_content_type(path: &Path) -> &'static str {
    let format = match path.extension().and_then(|e| e.to_str()) {
        Some("nt") => RdfFormat::NTriples,
        Some("nq") => RdfFormat::NQuads,
        Some("ttl") => RdfFormat::Turtle,
        Some("trig") => RdfFormat::TriG,
        _ => RdfFormat::JsonLd,
    };
    format.media_type()
}

fn print_json<T: Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(text) => {
            println!("{}", text);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn report<T: Serialize, E: std::fmt::Display>(result: Result<T, E>) -> i32 {
    match result {
        Ok(value) => print_json(&value),
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn read_graph(file: &Path, content_type: Option<&str>) -> Result<DecodedGraph, String> {
    let body = std::fs::read_to_string(file)
        .map_err(|e| format!("cannot read '{}': {}", file.display(), e))?;
    let content_type = content_type.unwrap_or_else(|| guess_content_type(file));
    intocps_traceability::parse_objects(&body, content_type).map_err(|e| e.to_string())
}

async fn cmd_push(client: &TraceClient, config: &TraceConfig, graph: DecodedGraph) -> i32 {
    let mut builder = TraceMessageBuilder::new(client.project().clone());
    if let Some(dir) = config.snapshot_dir(client.project()) {
        builder = builder.with_snapshot_dir(dir);
    }
    let added = graph
        .nodes
        .iter()
        .try_for_each(|node| builder.add_node(node))
        .and_then(|()| graph.traces.iter().try_for_each(|trace| builder.add_trace(trace)));
    if let Err(e) = added {
        eprintln!("Error: {}", e);
        return 1;
    }
    if builder.is_empty() {
        eprintln!("Nothing to push.");
        return 1;
    }

    match client.push(&builder).await {
        Ok(()) => {
            println!(
                "Pushed {} nodes and {} traces ({} triples)",
                graph.nodes.len(),
                graph.traces.len(),
                builder.len()
            );
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Offline commands first; they need no config or client
    match &cli.command {
        Commands::Expand { value } => {
            println!("{}", vocab::expand(value));
            return;
        }
        Commands::Compact { value } => {
            println!("{}", vocab::compact(value));
            return;
        }
        Commands::Decode { file, content_type } => {
            std::process::exit(report(read_graph(file, content_type.as_deref())));
        }
        _ => {}
    }

    let config = match load_config(cli.config.as_deref(), cli.url.clone()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let client = match TraceClient::from_config(&config, project(&cli)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let code = match &cli.command {
        Commands::Simulations => report(client.get_simulations().await),
        Commands::Fmus { simulation } => report(client.get_fmus_in_simulation(simulation).await),
        Commands::WithFmu { fmu } => report(client.get_simulations_with_fmu(fmu).await),
        Commands::Details { simulation } => report(client.get_simulation_details(simulation).await),
        Commands::Push { file, content_type } => match read_graph(file, content_type.as_deref()) {
            Ok(graph) => cmd_push(&client, &config, graph).await,
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
        Commands::Expand { .. } | Commands::Compact { .. } | Commands::Decode { .. } => 0,
    };
    std::process::exit(code);
}
