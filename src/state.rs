use {
    crate::notify::{ResultKind, ScanResult},
    chrono::{DateTime, Utc},
};

/// What the station is doing, as shown under the code field
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StationStatus {
    /// Waiting for a scan, input has focus
    #[default]
    Idle,
    /// A code was handed to the submission sink
    Processing,
    /// The submission resolved; its result is on display
    Detected,
}

/// Counters for the current listening session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub scans: u64,
    pub successes: u64,
    pub failures: u64,
}

impl SessionStats {
    pub fn record(&mut self, result: &ScanResult) {
        match result.kind {
            ResultKind::Success => self.successes += 1,
            ResultKind::Error => self.failures += 1,
        }
    }
}

/// Snapshot of the station published to the UI after every change
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StationView {
    pub status: StationStatus,
    /// Code being processed or whose result is displayed
    pub code: String,
    pub last_result: Option<ScanResult>,
    pub last_scan_at: Option<DateTime<Utc>>,
    pub stats: SessionStats,
    /// False once the session stopped
    pub listening: bool,
}

impl StationView {
    pub fn new() -> Self {
        Self {
            listening: true,
            ..Self::default()
        }
    }

    /// A scan is in flight or its result is still on display
    pub fn is_busy(&self) -> bool {
        self.status != StationStatus::Idle
    }

    /// Move to processing with a freshly flushed code
    pub fn begin_scan(&mut self, code: &str) {
        self.status = StationStatus::Processing;
        self.code = code.to_string();
        self.stats.scans += 1;
        self.last_scan_at = Some(Utc::now());
    }

    pub fn resolve(&mut self, result: &ScanResult) {
        self.status = StationStatus::Detected;
        self.stats.record(result);
        self.last_result = Some(result.clone());
    }

    /// Back to idle: residual input cleared, ready for the next scan
    pub fn reset(&mut self) {
        self.status = StationStatus::Idle;
        self.code.clear();
    }
}
