//! Keystroke-to-scan aggregation
//!
//! A [`ScanAggregator`] turns a stream of single key presses into completed
//! scans. A scan ends either with the terminator key or after a quiet period
//! with no new character. Each completed scan is submitted exactly once; the
//! station then shows the result for a fixed duration before accepting input
//! again.
//!
//! ```text
//!   keys ──► buffer ──(Enter | quiet period)──► flush ──► SubmissionSink
//!                                                              │
//!      idle ◄── display elapsed / dismiss ◄── NotificationSink ◄┘
//! ```
//!
//! Everything runs on one task: commands, timer expirations and submission
//! results are handled one at a time, so buffer, timer handles and the
//! processing flag are plain fields. Only the submission call itself runs on
//! a separate task and reports back through a channel. Key presses received
//! while a scan is processing are discarded.

use {
    crate::{
        config::Config,
        input::KeyInput,
        notify::{DisplayDurations, NotificationSink, ScanResult},
        scheduler::{Expired, Scheduler, TimerHandle, TokioScheduler},
        state::{SessionStats, StationView},
        submission::SubmissionSink,
    },
    std::{sync::Arc, time::Duration},
    thiserror::Error,
    tokio::{
        sync::{mpsc, watch},
        task::JoinHandle,
    },
};

/// Timing policy of the aggregator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorSettings {
    /// Silence after the last character that completes a scan
    pub quiet_period: Duration,
    pub display: DisplayDurations,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            quiet_period: Duration::from_millis(crate::config::DEFAULT_QUIET_PERIOD_MS),
            display: DisplayDurations::default(),
        }
    }
}

impl From<&Config> for AggregatorSettings {
    fn from(config: &Config) -> Self {
        Self {
            quiet_period: config.quiet_period,
            display: config.display,
        }
    }
}

/// Input accepted by a running station
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StationCommand {
    Key(KeyInput),
    /// Submit a code directly, bypassing the buffer ("simulate scan")
    SubmitCode(String),
    /// Close the result banner before its duration elapses
    Dismiss,
    /// Stop as soon as the station is idle (pending scan submitted, banner expired)
    Finish,
    /// Stop immediately
    Stop,
}

/// Deferred events the aggregator schedules for itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    QuietPeriod,
    DisplayElapsed,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StationError {
    #[error("scan session is closed")]
    Closed,
}

/// Producer side of a running station
///
/// Cloneable; the session stops when [`StationHandle::stop`] is called or
/// every handle is dropped.
#[derive(Debug, Clone)]
pub struct StationHandle {
    tx: mpsc::UnboundedSender<StationCommand>,
    view: watch::Receiver<StationView>,
}

impl StationHandle {
    pub fn send(&self, command: StationCommand) -> Result<(), StationError> {
        self.tx.send(command).map_err(|_| StationError::Closed)
    }

    pub fn key(&self, key: KeyInput) -> Result<(), StationError> {
        self.send(StationCommand::Key(key))
    }

    pub fn character(&self, c: char) -> Result<(), StationError> {
        self.key(KeyInput::Char(c))
    }

    pub fn terminator(&self) -> Result<(), StationError> {
        self.key(KeyInput::Terminator)
    }

    /// Send every character of `text` as separate key presses
    pub fn type_text(&self, text: &str) -> Result<(), StationError> {
        text.chars().try_for_each(|c| self.character(c))
    }

    pub fn submit_code(&self, code: impl Into<String>) -> Result<(), StationError> {
        self.send(StationCommand::SubmitCode(code.into()))
    }

    pub fn dismiss(&self) -> Result<(), StationError> {
        self.send(StationCommand::Dismiss)
    }

    pub fn finish(&self) -> Result<(), StationError> {
        self.send(StationCommand::Finish)
    }

    pub fn stop(&self) -> Result<(), StationError> {
        self.send(StationCommand::Stop)
    }

    /// Current station snapshot
    pub fn view(&self) -> StationView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StationView> {
        self.view.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Reassembles scans from key presses and drives their submission
pub struct ScanAggregator {
    settings: AggregatorSettings,
    buffer: String,
    pending_flush: Option<TimerHandle>,
    pending_reset: Option<TimerHandle>,
    processing: bool,
    finishing: bool,
    stopped: bool,
    sink: Arc<dyn SubmissionSink>,
    notifier: Arc<dyn NotificationSink>,
    scheduler: Box<dyn Scheduler<TimerEvent>>,
    timers: mpsc::UnboundedReceiver<Expired<TimerEvent>>,
    resolved_tx: mpsc::UnboundedSender<ScanResult>,
    resolved_rx: mpsc::UnboundedReceiver<ScanResult>,
    view: watch::Sender<StationView>,
}

impl ScanAggregator {
    pub fn new(
        settings: AggregatorSettings,
        sink: Arc<dyn SubmissionSink>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        let (scheduler, timers) = TokioScheduler::channel();
        Self::with_scheduler(settings, sink, notifier, Box::new(scheduler), timers)
    }

    /// Build with a custom scheduler; `timers` must receive its expirations
    pub fn with_scheduler(
        settings: AggregatorSettings,
        sink: Arc<dyn SubmissionSink>,
        notifier: Arc<dyn NotificationSink>,
        scheduler: Box<dyn Scheduler<TimerEvent>>,
        timers: mpsc::UnboundedReceiver<Expired<TimerEvent>>,
    ) -> Self {
        let (resolved_tx, resolved_rx) = mpsc::unbounded_channel();
        let (view, _) = watch::channel(StationView::new());

        Self {
            settings,
            buffer: String::new(),
            pending_flush: None,
            pending_reset: None,
            processing: false,
            finishing: false,
            stopped: false,
            sink,
            notifier,
            scheduler,
            timers,
            resolved_tx,
            resolved_rx,
            view,
        }
    }

    /// Start the listening session on its own task
    ///
    /// The task resolves to the session counters once the session stops.
    pub fn spawn(self) -> (StationHandle, JoinHandle<SessionStats>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = StationHandle {
            tx,
            view: self.view.subscribe(),
        };
        let task = tokio::spawn(self.run(rx));
        (handle, task)
    }

    /// Process commands until stopped or every producer is gone
    pub async fn run(mut self, mut commands: mpsc::UnboundedReceiver<StationCommand>) -> SessionStats {
        log::info!(
            "🎯 Scan session started (sink: {}, quiet period: {}ms)",
            self.sink.sink_name(),
            self.settings.quiet_period.as_millis()
        );

        while !self.stopped {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => self.shutdown(),
                },
                Some(expired) = self.timers.recv() => self.on_timer(expired),
                Some(result) = self.resolved_rx.recv() => self.on_resolved(result),
            }

            if self.finishing && self.is_idle() {
                self.shutdown();
            }
        }

        commands.close();
        self.view.borrow().stats.clone()
    }

    /// Apply one command; everything is ignored once the station stopped
    pub fn handle_command(&mut self, command: StationCommand) {
        if self.stopped {
            log::trace!("Ignoring {:?} after stop", command);
            return;
        }

        match command {
            StationCommand::Key(KeyInput::Char(c)) => self.on_character(c),
            StationCommand::Key(KeyInput::Terminator) => self.on_terminator(),
            StationCommand::Key(KeyInput::Other(name)) => {
                log::trace!("Ignoring key {}", name);
            }
            StationCommand::SubmitCode(code) => self.submit_code(code),
            StationCommand::Dismiss => self.dismiss(),
            StationCommand::Finish => self.finishing = true,
            StationCommand::Stop => self.shutdown(),
        }
    }

    /// Append a printable character and restart the quiet period
    pub fn on_character(&mut self, c: char) {
        if self.processing {
            log::trace!("Dropping '{}' while processing", c);
            return;
        }
        if c.is_control() {
            return;
        }

        self.buffer.push(c);
        self.cancel_pending_flush();
        self.pending_flush = Some(
            self.scheduler
                .schedule(self.settings.quiet_period, TimerEvent::QuietPeriod),
        );
    }

    /// Flush immediately, without waiting for the quiet period
    pub fn on_terminator(&mut self) {
        if self.processing || self.buffer.is_empty() {
            return;
        }
        self.flush();
    }

    /// Submit `code` through the same path as a scanned code
    pub fn submit_code(&mut self, code: String) {
        if self.processing {
            log::debug!("Ignoring manual submission of {} while processing", code);
            return;
        }
        self.start_submission(code);
    }

    /// Close the result banner early and return to idle
    pub fn dismiss(&mut self) {
        if let Some(handle) = self.pending_reset.take() {
            self.scheduler.cancel(handle);
            self.notifier.clear();
            self.reset();
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Nothing buffered, nothing in flight, no banner on display
    pub fn is_idle(&self) -> bool {
        !self.processing && self.buffer.is_empty()
    }

    pub fn view(&self) -> StationView {
        self.view.borrow().clone()
    }

    fn on_timer(&mut self, expired: Expired<TimerEvent>) {
        match expired.event {
            TimerEvent::QuietPeriod => {
                if self.pending_flush.map(|h| h.id()) != Some(expired.id) {
                    return;
                }
                self.pending_flush = None;
                if !self.processing && !self.buffer.is_empty() {
                    self.flush();
                }
            }
            TimerEvent::DisplayElapsed => {
                if self.pending_reset.map(|h| h.id()) != Some(expired.id) {
                    return;
                }
                self.pending_reset = None;
                self.notifier.clear();
                self.reset();
            }
        }
    }

    fn flush(&mut self) {
        let code = std::mem::take(&mut self.buffer);
        self.start_submission(code);
    }

    fn start_submission(&mut self, code: String) {
        self.cancel_pending_flush();
        self.buffer.clear();

        if code.is_empty() {
            return;
        }

        self.processing = true;
        self.view.send_modify(|view| view.begin_scan(&code));
        log::info!("📦 Scan completed: {} ({} chars)", code, code.chars().count());

        let sink = self.sink.clone();
        let resolved_tx = self.resolved_tx.clone();
        tokio::spawn(async move {
            let result = match sink.submit(&code).await {
                Ok(message) => ScanResult::success(message),
                Err(failure) => ScanResult::error(failure.message),
            };
            // Receiver gone means the session stopped meanwhile
            let _ = resolved_tx.send(result);
        });
    }

    fn on_resolved(&mut self, result: ScanResult) {
        if !self.processing {
            return;
        }

        if result.is_success() {
            log::info!("✅ Scan recorded: {}", result.message);
        } else {
            log::debug!("Scan rejected: {}", result.message);
        }

        let duration = self.settings.display.for_result(&result);
        self.view.send_modify(|view| view.resolve(&result));
        self.notifier.show(&result, duration);
        self.pending_reset = Some(
            self.scheduler
                .schedule(duration, TimerEvent::DisplayElapsed),
        );
    }

    fn reset(&mut self) {
        self.processing = false;
        self.buffer.clear();
        self.cancel_pending_flush();
        self.view.send_modify(|view| view.reset());
    }

    fn cancel_pending_flush(&mut self) {
        if let Some(handle) = self.pending_flush.take() {
            self.scheduler.cancel(handle);
        }
    }

    /// Cancel every timer, drop a late result and stop listening
    fn shutdown(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;

        self.scheduler.cancel_all();
        self.pending_flush = None;
        if self.pending_reset.take().is_some() {
            self.notifier.clear();
        }
        self.processing = false;
        self.buffer.clear();
        self.view.send_modify(|view| view.listening = false);

        let stats = self.view.borrow().stats.clone();
        log::info!(
            "🛑 Scan session stopped ({} scans, {} ok, {} failed)",
            stats.scans,
            stats.successes,
            stats.failures
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{notify::RecordingNotifier, submission::ScriptedSink};

    fn aggregator() -> (ScanAggregator, Arc<ScriptedSink>) {
        let sink = Arc::new(ScriptedSink::new());
        let aggregator = ScanAggregator::new(
            AggregatorSettings::default(),
            sink.clone(),
            Arc::new(RecordingNotifier::new()),
        );
        (aggregator, sink)
    }

    #[tokio::test]
    async fn test_characters_accumulate_in_order() {
        let (mut aggregator, _) = aggregator();

        for c in "BL-0042".chars() {
            aggregator.on_character(c);
        }

        assert_eq!(aggregator.buffer(), "BL-0042");
        assert!(!aggregator.is_processing());
        assert_eq!(aggregator.scheduler.pending(), 1, "only one flush timer outstanding");
    }

    #[tokio::test]
    async fn test_named_keys_are_ignored() {
        let (mut aggregator, _) = aggregator();

        aggregator.handle_command(StationCommand::Key(KeyInput::Char('A')));
        aggregator.handle_command(StationCommand::Key(KeyInput::Other("Shift".to_string())));
        aggregator.handle_command(StationCommand::Key(KeyInput::Char('1')));

        assert_eq!(aggregator.buffer(), "A1");
    }

    #[tokio::test]
    async fn test_terminator_flushes_synchronously() {
        let (mut aggregator, _) = aggregator();

        aggregator.on_character('X');
        aggregator.on_terminator();

        assert!(aggregator.is_processing());
        assert_eq!(aggregator.buffer(), "");
        assert_eq!(aggregator.scheduler.pending(), 0, "flush timer cancelled");
        assert_eq!(aggregator.view().code, "X");
    }

    #[tokio::test]
    async fn test_empty_terminator_is_noop() {
        let (mut aggregator, _) = aggregator();

        aggregator.on_terminator();
        aggregator.submit_code(String::new());

        assert!(!aggregator.is_processing());
        assert_eq!(aggregator.view().stats.scans, 0);
    }

    #[tokio::test]
    async fn test_input_dropped_while_processing() {
        let (mut aggregator, _) = aggregator();

        aggregator.submit_code("1234567890".to_string());
        aggregator.on_character('Z');
        aggregator.on_terminator();
        aggregator.submit_code("1234567890".to_string());

        assert_eq!(aggregator.buffer(), "");
        assert_eq!(aggregator.view().stats.scans, 1);
    }

    #[tokio::test]
    async fn test_stop_command_ends_listening() {
        let (mut aggregator, sink) = aggregator();

        aggregator.on_character('A');
        aggregator.handle_command(StationCommand::Stop);

        assert!(aggregator.is_stopped());
        assert!(!aggregator.view().listening);
        assert_eq!(aggregator.buffer(), "");
        assert_eq!(aggregator.scheduler.pending(), 0, "timers cancelled");

        aggregator.handle_command(StationCommand::Key(KeyInput::Char('B')));
        aggregator.handle_command(StationCommand::Key(KeyInput::Terminator));
        aggregator.handle_command(StationCommand::SubmitCode("4711".to_string()));

        assert_eq!(aggregator.buffer(), "");
        assert!(!aggregator.is_processing());
        assert_eq!(aggregator.view().stats.scans, 0);
        tokio::task::yield_now().await;
        assert!(sink.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_dismiss_without_result_is_noop() {
        let (mut aggregator, _) = aggregator();

        aggregator.submit_code("ABC".to_string());
        aggregator.dismiss();

        assert!(aggregator.is_processing(), "still waiting on the sink");
    }
}
