use chrono::{DateTime, Duration as ChronoDuration, Utc};
use clap::Parser;
use log::{error, info, warn};
use std::time::Duration;

use usdt_memo_exporter::config::AppConfig;
use usdt_memo_exporter::logging::init_logging;
use usdt_memo_exporter::pipeline::run_export;

#[derive(Parser)]
#[command(
    name = "exporter",
    about = "Daily CSV export of memo-tagged USDT transfers from a watched address"
)]
struct Cli {
    /// Run a single export immediately and exit
    #[arg(long)]
    once: bool,

    /// Path to the TOML configuration file
    #[arg(long)]
    config: Option<String>,

    /// Print a sample configuration file and exit
    #[arg(long)]
    sample_config: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.sample_config {
        println!("{}", AppConfig::generate_sample_config()?);
        return Ok(());
    }

    if let Some(config_path) = &cli.config {
        std::env::set_var("CONFIG_FILE", config_path);
    }

    init_logging()?;

    // Missing required configuration is fatal before any RPC call
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if cli.once {
        let summary = run_export(&config).await?;
        info!(
            "Wrote {} rows to {}",
            summary.rows_written,
            summary.output_path.display()
        );
        return Ok(());
    }

    info!(
        "Scheduling daily export at {:02}:00 UTC",
        config.export.run_hour_utc
    );

    loop {
        let delay = delay_until_next_run(Utc::now(), config.export.run_hour_utc);
        info!("Next export run in {} seconds", delay.as_secs());

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal, stopping scheduler");
                return Ok(());
            }
        }

        // A failed scheduled run is logged and the next day's run proceeds
        match run_export(&config).await {
            Ok(summary) => info!(
                "Wrote {} rows to {}",
                summary.rows_written,
                summary.output_path.display()
            ),
            Err(e) if e.is_transient() => warn!("Export run failed: {}", e),
            Err(e) => error!("Export run failed: {}", e),
        }
    }
}

/// Time remaining until the next occurrence of `run_hour` o'clock UTC
fn delay_until_next_run(now: DateTime<Utc>, run_hour: u32) -> Duration {
    // run_hour is validated to 0..=23 at config load
    let today_run = now
        .date_naive()
        .and_hms_opt(run_hour.min(23), 0, 0)
        .expect("valid hour of day")
        .and_utc();

    let next_run = if now < today_run {
        today_run
    } else {
        today_run + ChronoDuration::days(1)
    };

    (next_run - now)
        .to_std()
        .unwrap_or_else(|_| Duration::from_secs(0))
}
