//! # thanos CRM demo
//!
//! Serves a console for two models, `crm.customer` and `edu.school`, backed
//! by an in-memory store with sample data.
//!
//! ```bash
//! cargo run -p thanos-crm-demo -- runserver --addr 127.0.0.1:8000
//! cargo run -p thanos-crm-demo -- show-urls
//! ```
//!
//! Settings are read from `thanos.toml` when it exists, then from `THANOS_*`
//! environment variables.

mod models;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use thanos::core::logging::setup_logging;
use thanos::core::settings_loader;
use thanos::prelude::*;

/// A CRM console over an in-memory store.
#[derive(Parser)]
#[command(name = "thanos-crm-demo")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Settings file; missing files fall back to the defaults.
    #[arg(long, default_value = "thanos.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the console with seeded sample data
    Runserver {
        /// Address to bind, overriding the settings
        #[arg(long)]
        addr: Option<String>,
    },

    /// Print every console route with its name
    ShowUrls,
}

fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    if path.is_file() {
        return Ok(settings_loader::from_toml_file_with_env(path)?);
    }
    let mut settings = Settings::default();
    settings_loader::apply_env_overrides(&mut settings);
    Ok(settings)
}

async fn runserver(settings: Settings, addr: Option<String>) -> anyhow::Result<()> {
    let store = Arc::new(InMemoryStore::new());
    models::seed(store.as_ref()).await?;

    let addr = addr.unwrap_or_else(|| settings.bind_address.clone());
    let router = models::build_site().into_router(store, &settings)?;
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        "Console at http://{addr}{}/crm/customer/",
        settings.normalized_url_prefix()
    );
    axum::serve(listener, router).await?;
    Ok(())
}

fn show_urls(settings: &Settings) -> anyhow::Result<()> {
    let urls = models::build_site().url_table(&settings.normalized_url_prefix())?;
    for (name, pattern) in urls.iter() {
        println!("{:<28} {}/{}", name, urls.prefix(), pattern.route());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(&cli.config)?;
    setup_logging(&settings);

    match cli.command {
        Command::Runserver { addr } => runserver(settings, addr).await,
        Command::ShowUrls => show_urls(&settings),
    }
}
