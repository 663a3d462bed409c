use {
    serde::{Deserialize, Serialize},
    std::{sync::Mutex, time::Duration},
    tokio::sync::watch,
};

/// Outcome category of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Success,
    Error,
}

/// Result of one submission attempt, shown to the operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub kind: ResultKind,
    pub message: String,
}

impl ScanResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: ResultKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ResultKind::Error,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == ResultKind::Success
    }

    /// Banner title for this result
    pub fn title(&self) -> &'static str {
        match self.kind {
            ResultKind::Success => "Succès",
            ResultKind::Error => "Erreur",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self.kind {
            ResultKind::Success => "✓",
            ResultKind::Error => "✗",
        }
    }
}

/// How long each kind of result stays on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayDurations {
    pub success: Duration,
    pub error: Duration,
}

impl DisplayDurations {
    pub fn for_result(&self, result: &ScanResult) -> Duration {
        match result.kind {
            ResultKind::Success => self.success,
            ResultKind::Error => self.error,
        }
    }
}

impl Default for DisplayDurations {
    fn default() -> Self {
        Self {
            success: Duration::from_millis(2000),
            error: Duration::from_millis(3000),
        }
    }
}

/// A banner currently on display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub result: ScanResult,
    pub duration: Duration,
}

/// Where scan results are shown to the operator
///
/// The aggregator owns the display timer: `show` is followed by `clear` once
/// the duration elapses or the operator dismisses the banner. Implementations
/// only render.
pub trait NotificationSink: Send + Sync {
    fn show(&self, result: &ScanResult, duration: Duration);

    fn clear(&self);
}

/// Prints banners to stdout (headless mode)
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl NotificationSink for ConsoleNotifier {
    fn show(&self, result: &ScanResult, duration: Duration) {
        println!("{} {}: {}", result.icon(), result.title(), result.message);
        log::debug!("Banner shown for {}ms", duration.as_millis());
    }

    fn clear(&self) {}
}

/// Publishes the current banner on a watch channel (terminal UI)
#[derive(Debug)]
pub struct WatchNotifier {
    tx: watch::Sender<Option<Banner>>,
}

impl WatchNotifier {
    pub fn new() -> (Self, watch::Receiver<Option<Banner>>) {
        let (tx, rx) = watch::channel(None);
        (Self { tx }, rx)
    }
}

impl NotificationSink for WatchNotifier {
    fn show(&self, result: &ScanResult, duration: Duration) {
        self.tx.send_replace(Some(Banner {
            result: result.clone(),
            duration,
        }));
    }

    fn clear(&self) {
        self.tx.send_replace(None);
    }
}

/// Everything a notification sink was asked to do, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationRecord {
    Shown(Banner),
    Cleared,
}

/// Keeps a log of notifications, for tests and diagnostics
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    records: Mutex<Vec<NotificationRecord>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<NotificationRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Banners shown so far, ignoring clears
    pub fn banners(&self) -> Vec<Banner> {
        self.records()
            .into_iter()
            .filter_map(|record| match record {
                NotificationRecord::Shown(banner) => Some(banner),
                NotificationRecord::Cleared => None,
            })
            .collect()
    }

    fn push(&self, record: NotificationRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
    }
}

impl NotificationSink for RecordingNotifier {
    fn show(&self, result: &ScanResult, duration: Duration) {
        self.push(NotificationRecord::Shown(Banner {
            result: result.clone(),
            duration,
        }));
    }

    fn clear(&self) {
        self.push(NotificationRecord::Cleared);
    }
}
