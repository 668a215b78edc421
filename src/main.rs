//! # APRS Beacon
//!
//! Beacon GPS fixes as APRS position reports.
//!
//! This application reads GPS fixes as JSON lines, encodes them as APRS
//! position reports and transmits them through a serial-attached radio or TNC.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufRead, BufReader};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

use aprs_beacon::beacon::Beacon;
use aprs_beacon::config::{Config, LoggingConfig, DEFAULT_CONFIG_PATH};
use aprs_beacon::gps::FixFeed;
use aprs_beacon::radio::{candidate_paths, SerialRadio};

/// Log file name prefix inside the logging directory
const LOG_FILE_PREFIX: &str = "aprs-beacon.log";

/// Main entry point for the APRS beacon
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (first argument, default `config/default.toml`)
///    - Set up logging with tracing subscriber (stdout or rolling files)
///    - Open the radio, retrying up to `radio.max_open_attempts` times
///
/// 2. **Main Loop**
///    - Read fixes from the GPS feed (stdin or a file)
///    - Every `beacon.interval_ms`, transmit a report if a new fix arrived
///    - Handle Ctrl+C for graceful shutdown
///
/// # Errors
///
/// Returns error if:
/// - The configuration cannot be loaded or is invalid
/// - No radio could be opened
/// - The GPS feed cannot be read
///
/// # Examples
///
/// ```bash
/// gpspipe -w | jq -c --unbuffered 'select(.class=="TPV") | {latitude: .lat, longitude: .lon}' \
///     | cargo run --release -- config/default.toml
/// ```
///
/// Expected output:
/// ```text
/// INFO aprs_beacon: APRS Beacon v0.1.0 starting...
/// INFO aprs_beacon::radio: Opened radio at /dev/ttyUSB0 (9600 baud)
/// INFO aprs_beacon::beacon: N0CALL-11>APLT00:!4903.50N/07201.75WO360/000/A=001234
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    let _log_guard = init_logging(&config.logging);

    info!("APRS Beacon v{} starting...", env!("CARGO_PKG_VERSION"));
    info!(
        "Station {}-{} on {:.3} MHz",
        config.station.callsign, config.station.ssid, config.radio.frequency_mhz
    );

    let paths = candidate_paths(&config.radio.port);
    let radio = SerialRadio::open_with_retry(
        &paths,
        config.radio.baud_rate,
        config.radio.max_open_attempts,
        Duration::from_millis(config.radio.reconnect_interval_ms),
    )
    .await?
    .with_write_timeout(Duration::from_millis(config.radio.timeout_ms));

    let feed = FixFeed::new(open_feed(&config.gps.feed).await?);
    let mut beacon = Beacon::new(radio, &config)?;

    info!("Press Ctrl+C to exit");
    beacon
        .run(feed, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}

/// Initialize logging to stdout, or to daily rolling files when configured
///
/// The returned guard must be held until exit so buffered lines are flushed.
fn init_logging(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    match &logging.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            None
        }
    }
}

/// Open the GPS fix source: `-` is stdin, anything else a file path
async fn open_feed(source: &str) -> Result<Box<dyn AsyncBufRead + Unpin + Send>> {
    if source == "-" {
        info!("Reading GPS fixes from stdin");
        return Ok(Box::new(BufReader::new(tokio::io::stdin())));
    }

    let file = tokio::fs::File::open(source)
        .await
        .with_context(|| format!("Failed to open GPS feed {}", source))?;
    info!("Reading GPS fixes from {}", source);
    Ok(Box::new(BufReader::new(file)))
}
