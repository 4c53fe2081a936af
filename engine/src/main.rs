// Forecast CLI entry point
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use forecast_engine::config::ForecastSettings;
use forecast_engine::data::{CsvDirectorySource, Period};
use forecast_engine::PredictionService;

#[derive(Parser)]
#[command(name = "forecast")]
#[command(
    about = "Technical indicators and next-day close forecasts from daily OHLCV files",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// JSON settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory of <SYMBOL>.csv files (overrides the settings file)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Forecast the next close for one or more symbols
    Predict {
        #[arg(required = true)]
        symbols: Vec<String>,
    },

    /// Bars with indicator columns and a summary
    History {
        symbol: String,

        /// Lookback: 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max
        #[arg(short, long)]
        period: Option<String>,
    },

    /// Latest price snapshot
    Quote { symbol: String },

    /// Day-over-day moves of the configured market indices
    MarketSummary,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => ForecastSettings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => ForecastSettings::default(),
    };
    if let Some(dir) = cli.data_dir {
        settings.data_dir = dir;
    }
    info!(data_dir = %settings.data_dir.display(), "Starting forecast engine");

    let source = Arc::new(CsvDirectorySource::new(settings.data_dir.clone()));
    let default_period = settings.default_period.clone();
    let service = Arc::new(PredictionService::new(settings));

    match cli.command {
        Commands::Predict { symbols } => {
            let mut tasks = Vec::with_capacity(symbols.len());
            for symbol in symbols {
                let service = Arc::clone(&service);
                let source = Arc::clone(&source);
                tasks.push(tokio::task::spawn_blocking(move || {
                    let result = service.forecast(source.as_ref(), &symbol);
                    (symbol, result)
                }));
            }

            let mut failures = 0;
            for task in tasks {
                let (symbol, result) = task.await.context("forecast task panicked")?;
                match result {
                    Ok(prediction) => println!("{}", serde_json::to_string_pretty(&prediction)?),
                    Err(e) => {
                        failures += 1;
                        error!(%symbol, "Forecast failed: {}", e);
                    }
                }
            }
            if failures > 0 {
                anyhow::bail!("{} forecast(s) failed", failures);
            }
        }
        Commands::History { symbol, period } => {
            let period = Period::parse_or_default(period.as_deref().unwrap_or(&default_period));
            let history = service.history(source.as_ref(), &symbol, period)?;
            println!("{}", serde_json::to_string_pretty(&history)?);
        }
        Commands::Quote { symbol } => {
            let quote = service.quote(source.as_ref(), &symbol)?;
            println!("{}", serde_json::to_string_pretty(&quote)?);
        }
        Commands::MarketSummary => {
            let summary = service.market_summary(source.as_ref());
            info!(indices = summary.indices.len(), "Market summary ready");
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
