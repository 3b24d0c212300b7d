//! # Main Entry Point
//!
//! Wires the layers together and serves the tool catalog over stdio:
//! - Domain: Configuration, Errors and Types
//! - Infrastructure: Path guard, Process runner, HTTP client, MCP adapter
//! - Application: Registry, Dispatcher, Handlers
//!
//! stdout carries the protocol; logs go to a file and to stderr.

mod application;
mod domain;
mod infrastructure;
mod strings;

use anyhow::{Context, Result};
use clap::Parser;
use rmcp::ServiceExt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::application::dispatcher::{Dispatcher, ToolContext};
use crate::domain::config::AppConfig;
use crate::infrastructure::http::ReqwestClient;
use crate::infrastructure::mcp::server::HermesServer;

#[derive(Parser, Debug)]
#[command(version, about = "Sandboxed file, process and network tools over MCP")]
struct Cli {
    /// Configuration file. Missing file means defaults.
    #[arg(long, default_value = "data/config.yaml")]
    config: PathBuf,

    /// Additional allowed directory (repeatable).
    #[arg(long = "allow", value_name = "DIR")]
    allow: Vec<PathBuf>,

    /// Overrides `logging.dir` from the config.
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load Configuration
    let mut config = AppConfig::load(&cli.config)?;
    config.allowed_paths.extend(cli.allow);
    if let Some(dir) = cli.log_dir {
        config.logging.dir = dir;
    }

    // 2. Logging Setup
    std::fs::create_dir_all(&config.logging.dir).with_context(|| {
        format!(
            "Failed to create log directory {}",
            config.logging.dir.display()
        )
    })?;

    let file_appender =
        tracing_appender::rolling::never(&config.logging.dir, &config.logging.file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.filter));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    tracing::info!("Starting hermes {}...", env!("CARGO_PKG_VERSION"));

    // 3. Initialize Infrastructure
    let http = Arc::new(ReqwestClient::new().context("Failed to build HTTP client")?);
    let ctx = ToolContext::from_config(&config, http)?;

    // 4. Serve
    let server = HermesServer::new(Dispatcher::new(ctx));
    let service = server
        .serve(rmcp::transport::stdio())
        .await
        .context("Failed to start MCP service")?;
    tracing::info!("Serving on stdio");

    service.waiting().await?;
    tracing::info!("Client disconnected, shutting down");
    Ok(())
}
