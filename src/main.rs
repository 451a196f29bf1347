//! spendstat - Apportion expenditure records across date windows

use clap::Parser;
use spendstat::{
    aggregation::{BacklogTotals, aggregate},
    cli::{Cli, Command},
    error::Result,
    output::get_formatter,
    provider::RecordSource,
    session::analyze_windows,
};
use spendstat_provider_json::DataLoader;
use std::io::IsTerminal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise quiet unless --verbose
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            tracing_subscriber::EnvFilter::new("spendstat=info,spendstat_provider_json=info")
        } else {
            tracing_subscriber::EnvFilter::new("warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if cli.json || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let windows = cli.resolve_windows()?;
    let formatter = get_formatter(cli.json, &cli.currency);

    match cli.command() {
        Command::Windows => {
            info!("Listing {} windows", windows.len());
            println!("{}", formatter.format_windows(windows.windows()));
        }
        command @ (Command::Report | Command::Summary) => {
            let loader = match &cli.data {
                Some(path) => DataLoader::with_path(path),
                None => DataLoader::new().await?,
            };
            info!("Loading records from {}", loader.path().display());
            let records = loader.collect_records().await?;

            let sessions = analyze_windows(&records, windows, cli.parallel)?;
            let summary = aggregate(&sessions)?;

            if command == Command::Report {
                info!("Running window report");
                let backlog = BacklogTotals::from_records(&records)?;
                println!(
                    "{}",
                    formatter.format_report(&sessions, &summary, &backlog)
                );
            } else {
                info!("Running combined summary");
                println!("{}", formatter.format_summary(&summary));
            }
        }
    }

    Ok(())
}
