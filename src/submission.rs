use {
    async_trait::async_trait,
    std::{
        collections::VecDeque,
        sync::Mutex,
        time::Duration,
    },
    thiserror::Error,
};

/// Message shown when the service accepts a scan without saying anything
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Scan enregistré avec succès";

/// Message shown when a submission fails without a usable error body
pub const DEFAULT_ERROR_MESSAGE: &str = "Erreur lors du scan";

/// Rejection of a submitted code, carrying the text shown to the operator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SubmissionFailure {
    pub message: String,
}

impl SubmissionFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Destination of completed scans
///
/// Resolves to the operator-facing acknowledgement on success.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    async fn submit(&self, code: &str) -> Result<String, SubmissionFailure>;

    /// Sink name for logging
    fn sink_name(&self) -> &'static str;
}

/// In-memory sink that records every code and replays scripted outcomes
///
/// Outcomes are consumed in order; once the script is exhausted every
/// submission succeeds with [`DEFAULT_SUCCESS_MESSAGE`].
#[derive(Debug, Default)]
pub struct ScriptedSink {
    submitted: Mutex<Vec<String>>,
    outcomes: Mutex<VecDeque<Result<String, SubmissionFailure>>>,
    latency: Duration,
}

impl ScriptedSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every submission by `latency` before resolving
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn push_outcome(&self, outcome: Result<String, SubmissionFailure>) {
        if let Ok(mut outcomes) = self.outcomes.lock() {
            outcomes.push_back(outcome);
        }
    }

    /// Codes received so far, in submission order
    pub fn submitted(&self) -> Vec<String> {
        self.submitted
            .lock()
            .map(|codes| codes.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SubmissionSink for ScriptedSink {
    async fn submit(&self, code: &str) -> Result<String, SubmissionFailure> {
        if let Ok(mut codes) = self.submitted.lock() {
            codes.push(code.to_string());
        }

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let scripted = self
            .outcomes
            .lock()
            .ok()
            .and_then(|mut outcomes| outcomes.pop_front());

        scripted.unwrap_or_else(|| Ok(DEFAULT_SUCCESS_MESSAGE.to_string()))
    }

    fn sink_name(&self) -> &'static str {
        "scripted"
    }
}
