use {
    crate::notify::DisplayDurations,
    std::{env, str::FromStr, time::Duration},
    thiserror::Error,
};

pub const DEFAULT_QUIET_PERIOD_MS: u64 = 100;
pub const DEFAULT_SUCCESS_DISPLAY_MS: u64 = 2_000;
pub const DEFAULT_ERROR_DISPLAY_MS: u64 = 3_000;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SIMULATED_CODE: &str = "1234567890";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the scan service (`SCAN_API_URL`)
    pub api_url: Option<String>,
    pub quiet_period: Duration,
    pub display: DisplayDurations,
    pub http_timeout: Duration,
    /// Code submitted by the simulate-scan key
    pub simulated_code: String,
    pub log_file: Option<String>,
    pub rust_log: Option<String>,
    /// Values that were rejected and replaced by their default
    ///
    /// Config is read before the logger exists; `init_logging` reports these.
    pub warnings: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `SCAN_API_URL` (required for submissions, http:// or https://)
    /// - `SCAN_QUIET_PERIOD_MS` (default: 100)
    /// - `SCAN_SUCCESS_DISPLAY_MS` (default: 2000)
    /// - `SCAN_ERROR_DISPLAY_MS` (default: 3000)
    /// - `SCAN_HTTP_TIMEOUT_SECS` (default: 10)
    /// - `SCAN_SIMULATED_CODE` (default: 1234567890)
    /// - `SCANFLOW_LOG_FILE` (optional, logs go to stderr otherwise)
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut warnings = Vec::new();

        let api_url = env::var("SCAN_API_URL")
            .ok()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        if let Some(url) = &api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidValue(
                    "SCAN_API_URL must start with http:// or https://".to_string(),
                ));
            }
        }

        let quiet_period_ms =
            parse_or_default("SCAN_QUIET_PERIOD_MS", DEFAULT_QUIET_PERIOD_MS, &mut warnings);
        if quiet_period_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "SCAN_QUIET_PERIOD_MS must be greater than zero".to_string(),
            ));
        }

        let simulated_code = env::var("SCAN_SIMULATED_CODE")
            .ok()
            .filter(|code| !code.is_empty())
            .unwrap_or_else(|| DEFAULT_SIMULATED_CODE.to_string());

        Ok(Self {
            api_url,
            quiet_period: Duration::from_millis(quiet_period_ms),
            display: DisplayDurations {
                success: Duration::from_millis(parse_or_default(
                    "SCAN_SUCCESS_DISPLAY_MS",
                    DEFAULT_SUCCESS_DISPLAY_MS,
                    &mut warnings,
                )),
                error: Duration::from_millis(parse_or_default(
                    "SCAN_ERROR_DISPLAY_MS",
                    DEFAULT_ERROR_DISPLAY_MS,
                    &mut warnings,
                )),
            },
            http_timeout: Duration::from_secs(parse_or_default(
                "SCAN_HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
                &mut warnings,
            )),
            simulated_code,
            log_file: env::var("SCANFLOW_LOG_FILE").ok().filter(|p| !p.is_empty()),
            rust_log: env::var("RUST_LOG").ok(),
            warnings,
        })
    }

    /// Service URL, required whenever scans go to the real service
    pub fn require_api_url(&self) -> Result<&str, ConfigError> {
        self.api_url
            .as_deref()
            .ok_or_else(|| ConfigError::MissingVariable("SCAN_API_URL".to_string()))
    }
}

fn parse_or_default<T>(var: &str, default: T, warnings: &mut Vec<String>) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match env::var(var) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warnings.push(format!("Invalid {} '{}', defaulting to {}", var, raw, default));
            default
        }),
        Err(_) => default,
    }
}
