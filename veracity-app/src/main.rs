//! Command-line front end for the verification session.
//!
//! Thin presentational collaborator: it wires config + logging + a
//! [`VerifySession`] together, narrates progress on stderr, and renders the
//! final report on stdout.

use anyhow::{bail, Context};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use veracity_api::{PredictionClient, VerificationReport, VerificationService};
use veracity_common::observability::{init_logging, LogConfig};
use veracity_common::{InputMode, VeracityConfig};
use veracity_session::{stage_message, RequestState, VerifySession};

#[derive(Debug, Parser)]
#[command(name = "veracity", about = "Submit a claim to the verification service")]
struct Cli {
    /// URL or headline of the claim to verify.
    #[arg(required_unless_present = "health")]
    title: Option<String>,

    /// Article text to verify alongside the headline.
    #[arg(long)]
    body: Option<String>,

    /// Input mode: "url" or "article". Defaults to the configured mode.
    #[arg(long)]
    mode: Option<String>,

    /// Base address of the verification service.
    #[arg(long, env = "VERACITY_API_URL")]
    api_url: Option<String>,

    /// Print the report as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Probe the service's health endpoint and exit.
    #[arg(long)]
    health: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(LogConfig::default()).context("logging setup failed")?;

    let mut config = VeracityConfig::from_env();
    if let Some(url) = &cli.api_url {
        config.api_url = url.trim().trim_end_matches('/').to_string();
    }
    let mode = match &cli.mode {
        Some(raw) => raw.parse::<InputMode>()?,
        None => config.default_mode,
    };

    let client = PredictionClient::with_timeout(
        &config.api_url,
        Duration::from_secs(config.request_timeout_secs),
    )?;
    tracing::info!(api_url = %config.api_url, ?mode, "veracity starting");

    if cli.health {
        return run_health_probe(&client).await;
    }

    let title = cli.title.unwrap_or_default();
    let body = cli.body.unwrap_or_default();
    if title.trim().is_empty() && body.trim().is_empty() {
        bail!("nothing to verify: provide a URL, a headline, or --body text");
    }

    let session = VerifySession::new(
        Arc::new(client),
        mode,
        Duration::from_millis(config.stage_interval_ms),
    );
    let mut updates = session.subscribe();

    session.set_title(title);
    session.set_body(body);
    session.submit();

    loop {
        updates.changed().await.context("session closed")?;
        let state = updates.borrow_and_update().clone();
        match state {
            RequestState::Idle => {}
            RequestState::Loading { stage, .. } => eprintln!("{}", stage_message(stage)),
            RequestState::Succeeded { report } => {
                render_report(&report, cli.json)?;
                return Ok(());
            }
            RequestState::Failed { message } => {
                eprintln!("{message}");
                std::process::exit(1);
            }
        }
    }
}

async fn run_health_probe(client: &PredictionClient) -> anyhow::Result<()> {
    let health = client
        .health_check()
        .await
        .with_context(|| format!("service at {} is unreachable", client.base_url()))?;
    println!(
        "status: {}  ai: {}  tokens_active: {}  requests_processed: {}",
        health.status, health.ai, health.tokens_active, health.requests_processed
    );
    if !health.is_healthy() {
        std::process::exit(1);
    }
    Ok(())
}

fn render_report(report: &VerificationReport, as_json: bool) -> anyhow::Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("Verdict: {} ({}% confidence)", report.verdict, report.confidence);
    println!("Writing style: {}", report.style);
    if !report.explanation.is_empty() {
        println!("\n{}", report.explanation);
    }
    if !report.sources.is_empty() {
        println!("\nSources:");
        for source in &report.sources {
            println!("  {:<32} {}", source.host_str().unwrap_or("-"), source);
        }
    }
    Ok(())
}
