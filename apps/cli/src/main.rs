mod config;
mod prompt;

use std::{io, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::HttpSubscriptionClient;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;
use workflow::WorkflowController;

#[derive(Parser, Debug)]
#[command(name = "alert-subscribe", about = "Subscribe a phone number to air pollution alerts")]
struct Args {
    #[arg(long, default_value = "alerts.toml")]
    config: PathBuf,
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut settings = config::load_settings(&args.config);
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        settings.request_timeout_secs = timeout_secs;
    }
    let server_url = settings.validated_server_url()?;

    let timeout = settings.request_timeout();
    let client = HttpSubscriptionClient::with_timeout(server_url.as_str(), timeout)
        .with_context(|| format!("failed to build client for {server_url}"))?;
    info!(server_url = %client.server_url(), "alert service configured");

    let mut controller = WorkflowController::new(Arc::new(client));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = io::stdout();
    let flow = prompt::run(&mut controller, &mut lines, &mut stdout).await?;
    info!(%flow, "session finished");

    Ok(())
}
