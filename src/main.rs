//! Headless driver for livegraph.
//!
//! Runs the ingestion server on a Unix socket and a line-based stand-in for
//! the UI on stdin:
//!
//! ```text
//! activate <name>   right-click the node
//! pin <name>        middle-click the node
//! reveal <name>     reveal one pending neighbor without fetching
//! dump              print the graph as JSON
//! quit
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use livegraph::crawl::DiscoveryProvider;
use livegraph::ingest::StdoutSink;
use livegraph::{Config, Crawler, Flow, GraphStore, IngestServer, InputEvent, Interaction, Vec2};

#[derive(Debug, Parser)]
#[command(name = "livegraph", version, about = "Live graph fed by a crawler and a local socket")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Ingestion socket path (overrides the config file)
    #[arg(long, value_name = "PATH")]
    socket: Option<PathBuf>,

    /// Draw edges to already-visible nodes when revealing
    #[arg(long)]
    reconnect_edges: bool,

    /// Name of a node to seed the graph with
    #[arg(long, value_name = "NAME")]
    seed: Option<String>,
}

#[tokio::main]
async fn main() -> livegraph::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(socket) = cli.socket {
        config.ingest.socket_path = socket;
    }
    if cli.reconnect_edges {
        config.crawl.reconnect_existing = true;
    }

    info!("Starting livegraph v{}", env!("CARGO_PKG_VERSION"));

    let store = Arc::new(GraphStore::new());
    let context = Arc::new(config.graph_context());
    let crawler = Crawler::new(
        store.clone(),
        context,
        discovery_provider(&config),
        tokio::runtime::Handle::current(),
    );

    // Bind errors are fatal at startup
    let listener = IngestServer::bind(&config.ingest.socket_path)?;
    let server = IngestServer::new(store.clone(), Arc::new(StdoutSink), config.ingest_options());
    tokio::spawn(async move {
        if let Err(e) = server.run(listener).await {
            warn!(error = %e, "ingestion server stopped");
        }
    });

    if let Some(name) = &cli.seed {
        store.find_or_add(name, Vec2::ZERO);
    }

    let mut ui = Interaction::new(crawler);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match drive(&mut ui, line.trim()) {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) => {}
            Err(e) => warn!(error = %e, "command failed"),
        }
    }

    info!("Shutdown complete");
    Ok(())
}

/// Translate one stdin command into hover + button events.
fn drive(ui: &mut Interaction, line: &str) -> livegraph::Result<Flow> {
    let (verb, arg) = line.split_once(' ').unwrap_or((line, ""));
    let hovered = ui.store().find_by_name(arg.trim());

    let event = match verb {
        "" => return Ok(Flow::Continue),
        "quit" => InputEvent::Quit,
        "activate" => InputEvent::Activate { hovered },
        "pin" => InputEvent::TogglePinned { hovered },
        "reveal" => {
            match hovered {
                Some(id) => match ui.reveal(id)? {
                    Some(reveal) => info!(node = %reveal.target, created = reveal.created, "revealed"),
                    None => info!(name = arg, "nothing left to reveal"),
                },
                None => warn!(name = arg, "no such node"),
            }
            return Ok(Flow::Continue);
        }
        "dump" => {
            livegraph::export::export_json(ui.store(), &mut std::io::stderr())?;
            return Ok(Flow::Continue);
        }
        other => {
            warn!(command = other, "unknown command");
            return Ok(Flow::Continue);
        }
    };

    if hovered.is_none() && !matches!(event, InputEvent::Quit) {
        warn!(name = arg, "no such node");
    }
    ui.handle(InputEvent::Hover(hovered))?;
    ui.handle(event)
}

#[cfg(feature = "wiki")]
fn discovery_provider(config: &Config) -> Arc<dyn DiscoveryProvider> {
    Arc::new(livegraph::WikiDiscovery::new(config.discovery.base_url.clone()))
}

#[cfg(not(feature = "wiki"))]
fn discovery_provider(_config: &Config) -> Arc<dyn DiscoveryProvider> {
    warn!("built without the `wiki` feature; crawling will find no neighbors");
    Arc::new(livegraph::StaticDiscovery::new())
}
