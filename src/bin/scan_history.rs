//! Scan History - list scans recorded by the service
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin scan_history            # table
//! cargo run --release --bin scan_history -- --json  # raw JSON
//! ```
//!
//! ## Environment Variables
//!
//! - SCAN_API_URL - Scan service base URL (required)
//! - SCAN_HTTP_TIMEOUT_SECS - Request timeout (default: 10)
//! - RUST_LOG - Logging level (optional, default: info)

use scanflow::{config::Config, logging::init_logging, scan_service::ScanApiClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = Config::from_env()?;
    init_logging(&config, false);
    let as_json = std::env::args().any(|arg| arg == "--json");

    let client = ScanApiClient::new(config.require_api_url()?, config.http_timeout)?;
    log::info!("📥 Fetching scans from {}", client.base_url());

    let records = client.fetch_all_scans().await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    println!("{:<5} {:<24} {}", "#", "NumeroBL", "Details");
    for (index, record) in records.iter().enumerate() {
        let details = record
            .extra
            .iter()
            .map(|(key, value)| match value {
                serde_json::Value::String(s) => format!("{}={}", key, s),
                other => format!("{}={}", key, other),
            })
            .collect::<Vec<_>>()
            .join(" ");

        println!(
            "{:<5} {:<24} {}",
            index + 1,
            record.numero_bl.as_deref().unwrap_or("-"),
            details
        );
    }

    log::info!("✅ {} scans listed", records.len());
    Ok(())
}
