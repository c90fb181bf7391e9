use clap::Parser;
use demand_forecast::{
    log_panics_with_tracing, run_batch, AlgorithmRegistry, BatchRequest, ForecastConfig,
    ForecastError,
};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Run one forecasting algorithm over every group of a batch request
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Batch request (JSON)
    request: PathBuf,

    /// Engine and message configuration (JSON), defaults when omitted
    config: Option<PathBuf>,
}

fn main() -> Result<(), ForecastError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    log_panics_with_tracing();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ForecastConfig::from_json_file(path)?,
        None => ForecastConfig::default(),
    };

    let request: BatchRequest = serde_json::from_str(&fs::read_to_string(&cli.request)?)?;
    let registry = AlgorithmRegistry::with_defaults(&config)?;
    let response = run_batch(&registry, &request)?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
