//! URL redirector gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────┐
//!   Navigation        │  ┌─────────┐    ┌────────────┐               │
//!   ──────────────────┼─▶│  http   │───▶│ Redirector │──▶ 302 / 404  │
//!                     │  │ gateway │    │ RuleTable  │               │
//!                     │  └─────────┘    └─────┬──────┘               │
//!                     │                       │ record stat          │
//!                     │                       ▼                      │
//!   redirector-cli    │               ┌──────────────┐   watcher     │
//!   ──────────────────┼──────────────▶│  FileStore   │◀──────────────┤
//!   (rules, import,   │               │ rules, stats │               │
//!    stats, toggles)  │               └──────────────┘               │
//!                     └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use url_redirector::config::{load_config, RedirectorConfig};
use url_redirector::lifecycle::startup;
use url_redirector::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "url-redirector")]
#[command(about = "Redirect gateway driven by URL redirection rules", long_about = None)]
struct Args {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the store file path from the config.
    #[arg(short, long)]
    store: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => RedirectorConfig::default(),
    };
    if let Some(store) = args.store {
        config.store.path = store.to_string_lossy().into_owned();
    }

    init_logging(&config.observability);

    tracing::info!("url-redirector v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.gateway.bind_address,
        store = %config.store.path,
        watch = config.store.watch,
        admin = config.admin.enabled,
        "Configuration loaded"
    );

    startup::run(config).await
}
