use anyhow::{Context, Result};
use clap::Parser;
use quarry::{
    ExtractionError, Extractor, batch::extract_batch, config::Config, telemetry,
};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Extract article text and metadata from one or more URLs and print JSON.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Absolute http(s) URLs to extract
    #[arg(required = true)]
    urls: Vec<String>,

    /// Maximum extractions in flight (defaults to QUARRY_CONCURRENCY)
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.json_logs);

    let config = Config::from_env()?;
    let extractor = Extractor::from_config(&config).context("failed to build http client")?;

    // Ctrl-C abandons in-flight fetches instead of killing the process mid-write
    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received shutdown signal, cancelling extractions");
            shutdown.cancel();
        }
    });

    let concurrency = cli.concurrency.unwrap_or(config.concurrency());
    let items = extract_batch(&extractor, cli.urls, concurrency, cancel).await;

    let output: Vec<_> = items
        .into_iter()
        .map(|item| match item.result {
            Ok(result) => json!({ "url": item.url, "ok": true, "result": result }),
            Err(err) => {
                warn!(url = %item.url, error = %err, "extraction failed");
                json!({
                    "url": item.url,
                    "ok": false,
                    "error": err.to_string(),
                    "kind": error_kind(&err),
                    "status": err.status().map(|s| s.as_u16()),
                })
            }
        })
        .collect();

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{rendered}");
    Ok(())
}

fn error_kind(err: &ExtractionError) -> &'static str {
    match err {
        ExtractionError::Fetch(fetch) if fetch.status().is_some() => "fetch_error",
        ExtractionError::Fetch(fetch) if fetch.is_network() => "network_error",
        ExtractionError::Fetch(_) => "invalid_request",
        ExtractionError::NoContentFound => "no_content_found",
        ExtractionError::Cancelled => "cancelled",
    }
}
