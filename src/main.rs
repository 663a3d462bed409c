//! Scan station
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin scanflow               # terminal UI
//! cargo run --release --bin scanflow -- --headless # one scan per stdin line
//! cargo run --release --bin scanflow -- --dry-run  # no service, every scan succeeds
//! ```
//!
//! ## Environment Variables
//!
//! - SCAN_API_URL - Scan service base URL (required unless --dry-run)
//! - SCAN_QUIET_PERIOD_MS - Silence that completes a scan (default: 100)
//! - SCAN_SUCCESS_DISPLAY_MS / SCAN_ERROR_DISPLAY_MS - Banner durations (default: 2000 / 3000)
//! - SCAN_HTTP_TIMEOUT_SECS - Request timeout (default: 10)
//! - SCAN_SIMULATED_CODE - Code sent by F5 (default: 1234567890)
//! - SCANFLOW_LOG_FILE - Write logs to this file instead of stderr (the terminal UI
//!   only prints warnings and errors to stderr)
//! - RUST_LOG - Logging level (optional, default: info)

use {
    scanflow::{
        aggregator::{AggregatorSettings, ScanAggregator},
        config::Config,
        headless,
        logging::init_logging,
        notify::{ConsoleNotifier, NotificationSink, WatchNotifier},
        scan_service::ScanApiClient,
        submission::{ScriptedSink, SubmissionSink},
        ui::{self, UiOptions},
    },
    std::{env, sync::Arc},
    tokio::io::BufReader,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Flags {
    headless: bool,
    dry_run: bool,
    unknown: Vec<String>,
}

fn parse_flags() -> Flags {
    let mut flags = Flags::default();
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--headless" => flags.headless = true,
            "--dry-run" => flags.dry_run = true,
            _ => flags.unknown.push(arg),
        }
    }
    flags
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let flags = parse_flags();
    let config = Config::from_env()?;
    init_logging(&config, !flags.headless);
    for arg in &flags.unknown {
        log::warn!("Ignoring unknown argument {}", arg);
    }

    log::info!("🚀 Starting scan station...");
    log::info!("📊 Configuration:");
    log::info!("   Mode: {}", if flags.headless { "headless" } else { "terminal" });
    log::info!("   Quiet period: {}ms", config.quiet_period.as_millis());
    log::info!(
        "   Display: {}ms success / {}ms error",
        config.display.success.as_millis(),
        config.display.error.as_millis()
    );

    let sink: Arc<dyn SubmissionSink> = if flags.dry_run {
        log::info!("   Sink: dry run (nothing is sent)");
        Arc::new(ScriptedSink::new())
    } else {
        let api_url = config.require_api_url()?;
        log::info!("   SCAN_API_URL: {}", api_url);
        Arc::new(ScanApiClient::new(api_url, config.http_timeout)?)
    };

    let settings = AggregatorSettings::from(&config);

    if flags.headless {
        let notifier: Arc<dyn NotificationSink> = Arc::new(ConsoleNotifier);
        let (station, session) = ScanAggregator::new(settings, sink, notifier).spawn();

        let stdin = BufReader::new(tokio::io::stdin());
        let fed = headless::feed_lines(stdin, &station).await?;
        log::info!("Fed {} scans", fed);

        // Let the last submission resolve and its banner expire
        station.finish()?;
        let stats = session.await?;
        log::info!("✅ Done: {} scans, {} failed", stats.scans, stats.failures);
        return Ok(());
    }

    let (notifier, banner) = WatchNotifier::new();
    let (station, session) = ScanAggregator::new(settings, sink, Arc::new(notifier)).spawn();

    let ui_station = station.clone();
    let options = UiOptions {
        simulated_code: config.simulated_code.clone(),
    };
    let ui_result = tokio::task::spawn_blocking(move || ui::run_ui(ui_station, banner, options)).await?;
    if let Err(e) = ui_result {
        log::error!("UI error: {}", e);
    }

    station.stop().ok();
    let stats = session.await?;
    log::info!(
        "👋 Station closed: {} scans ({} ok, {} failed)",
        stats.scans,
        stats.successes,
        stats.failures
    );

    Ok(())
}
