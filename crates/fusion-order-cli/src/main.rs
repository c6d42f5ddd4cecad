//! Fusion Order - a terminal front end for the order-management service.
//!
//! Browse the product catalog, place orders, and run the admin console
//! (users, products, orders) against the remote API.

mod cli;
mod commands;
mod format;

use std::io;
use std::path::Path;

use anyhow::Result;
use clap::Parser;
use tokio::sync::broadcast;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fusion_order_core::{ApiClient, AuthEvent, Config};

use cli::Cli;

/// Initialize the tracing subscriber for logging.
/// Returns the appender guard when logging to a file; keep it alive until exit.
fn init_tracing(log_file: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_file {
        Some(path) => {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "fusion-order.log".into());
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            None
        }
    }
}

/// The server answers a bad login the same way as a revoked token, so the
/// wording covers both.
fn auth_notice(event: &AuthEvent) -> String {
    match event {
        AuthEvent::SessionExpired { message, .. } => format!(
            "Not signed in: {}\nSign in with `fusion-order login` (login page: {}).",
            message,
            event.login_path()
        ),
    }
}

fn report_auth_events(events: &mut broadcast::Receiver<AuthEvent>) {
    while let Ok(event) = events.try_recv() {
        eprintln!("{}", auth_notice(&event));
    }
}

#[tokio::main]
async fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_file.as_deref());
    info!("Fusion Order starting");

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(ref url) = cli.api_url {
        config.api_base_url = url.clone();
    }

    let credentials = config.credential_store()?;
    let client = ApiClient::from_config(&config, credentials)?;
    let mut events = client.subscribe_auth_events();

    let result = commands::execute(&client, &mut config, cli.json, cli.command).await;
    report_auth_events(&mut events);
    result
}
