use anyhow::Result;
use clap::Parser;
use quarry::{Extractor, config::Config, telemetry};
use tokio_util::sync::CancellationToken;

/// Show how every configured content selector fares on a page.
///
/// For tuning the selector cascade; it never picks a winner.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Page to inspect
    url: String,

    /// Print the report as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.json_logs);

    let config = Config::from_env()?;
    let extractor = Extractor::from_config(&config)?;
    let reports = extractor
        .diagnose(&cli.url, &CancellationToken::new())
        .await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    let qualify = extractor.cascade().qualify_chars;
    let strong = extractor.cascade().strong_chars;
    println!("{}", cli.url);
    println!("qualifies: > {qualify} chars, strong: > {strong} chars\n");

    let mut winner = None;
    for report in &reports {
        if !report.matched {
            println!("{:>3}  {:<28} no match", report.rank, report.selector);
            continue;
        }
        let marker = match (report.qualifies, report.strong) {
            (true, true) => "strong",
            (true, false) => "qualifies",
            _ => "too short",
        };
        if report.qualifies && winner.is_none() {
            winner = Some(report.selector.as_str());
        }
        println!(
            "{:>3}  {:<28} {:>7} chars {:>6} words  {marker}",
            report.rank, report.selector, report.char_length, report.word_count
        );
        if !report.preview.is_empty() {
            println!("     {}", report.preview.replace('\n', " "));
        }
    }

    match winner {
        Some(selector) => println!("\ncascade would select: {selector}"),
        None => println!("\ncascade would fail: no content found"),
    }
    Ok(())
}
