//! Gilt yield server entry point.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gilt_ext_file::create_file_reference_data;
use gilt_server::{Server, ServerConfig};

/// Serve gilt yields over HTTP.
#[derive(Debug, Parser)]
#[command(name = "gilt-server", version, about)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "GILT_CONFIG")]
    config: Option<PathBuf>,

    /// Serve the front-end under /gilts
    #[arg(long)]
    serve_static: bool,

    /// Directory holding gilt workbooks
    #[arg(long, env = "GILTS_DIR")]
    gilts_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,gilt=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Gilt Yield Server v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            ServerConfig::from_file(path)
                .with_context(|| format!("reading configuration {}", path.display()))?
        }
        None => {
            info!("Using default configuration");
            ServerConfig::default()
        }
    };
    if args.serve_static {
        config.serve_static = true;
    }
    if let Some(gilts_dir) = args.gilts_dir {
        config.gilts_dir = gilts_dir;
    }

    info!("Reading gilt workbooks from {}", config.gilts_dir.display());
    let source = create_file_reference_data(&config.gilts_dir);

    let server = Server::new(config, source);
    server.start().await?;

    Ok(())
}
