#[cfg(test)]
mod tests {
    use {
        crate::{
            aggregator::{AggregatorSettings, ScanAggregator, StationHandle},
            notify::{NotificationRecord, RecordingNotifier, ResultKind},
            state::{SessionStats, StationStatus},
            submission::{ScriptedSink, SubmissionFailure},
        },
        std::{sync::Arc, time::Duration},
        tokio::task::JoinHandle,
    };

    struct Station {
        handle: StationHandle,
        task: JoinHandle<SessionStats>,
        sink: Arc<ScriptedSink>,
        notifier: Arc<RecordingNotifier>,
    }

    fn start(sink: ScriptedSink) -> Station {
        let sink = Arc::new(sink);
        let notifier = Arc::new(RecordingNotifier::new());
        let (handle, task) =
            ScanAggregator::new(AggregatorSettings::default(), sink.clone(), notifier.clone()).spawn();
        Station {
            handle,
            task,
            sink,
            notifier,
        }
    }

    async fn advance(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    /// Type `text` one character at a time with `gap_ms` between characters
    async fn type_slowly(station: &StationHandle, text: &str, gap_ms: u64) {
        for (i, c) in text.chars().enumerate() {
            if i > 0 {
                advance(gap_ms).await;
            }
            station.character(c).unwrap();
        }
    }

    /// Characters then Enter: one submission, no quiet-period wait
    #[tokio::test(start_paused = true)]
    async fn test_terminator_completes_scan() {
        let station = start(ScriptedSink::new());

        type_slowly(&station.handle, "ABC1", 30).await;
        station.handle.terminator().unwrap();

        // Well before the 100ms quiet period would have elapsed
        advance(1).await;
        assert_eq!(station.sink.submitted(), vec!["ABC1".to_string()]);

        advance(500).await;
        assert_eq!(station.sink.submitted().len(), 1, "stale quiet period must not flush again");
    }

    /// Characters then silence: one submission once the quiet period elapses
    #[tokio::test(start_paused = true)]
    async fn test_quiet_period_completes_scan() {
        let station = start(ScriptedSink::new());

        type_slowly(&station.handle, "XYZ", 30).await;

        advance(90).await;
        assert!(station.sink.submitted().is_empty(), "flushed before the quiet period");

        advance(20).await;
        assert_eq!(station.sink.submitted(), vec!["XYZ".to_string()]);

        advance(5_000).await;
        assert_eq!(station.sink.submitted().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_character_restarts_quiet_period() {
        let station = start(ScriptedSink::new());

        // 80ms gaps keep the scan open well past a single quiet period
        type_slowly(&station.handle, "0123456", 80).await;
        assert!(station.sink.submitted().is_empty());

        advance(150).await;
        assert_eq!(station.sink.submitted(), vec!["0123456".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminator_on_empty_buffer_submits_nothing() {
        let station = start(ScriptedSink::new());

        station.handle.terminator().unwrap();
        station.handle.terminator().unwrap();
        advance(500).await;

        assert!(station.sink.submitted().is_empty());
        assert!(station.notifier.records().is_empty());
        assert_eq!(station.handle.view().status, StationStatus::Idle);
    }

    /// Rejected scan: error banner for 3000ms, then input accepted again
    #[tokio::test(start_paused = true)]
    async fn test_rejected_scan_shows_error_then_recovers() {
        let sink = ScriptedSink::new();
        sink.push_outcome(Err(SubmissionFailure::new("Erreur lors du scan")));
        let station = start(sink);

        station.handle.type_text("BL-404").unwrap();
        station.handle.terminator().unwrap();
        advance(1).await;

        let banners = station.notifier.banners();
        assert_eq!(banners.len(), 1);
        assert_eq!(banners[0].result.kind, ResultKind::Error);
        assert_eq!(banners[0].result.message, "Erreur lors du scan");
        assert_eq!(banners[0].duration, Duration::from_millis(3_000));

        // Scanned while the error is displayed: discarded
        station.handle.type_text("LOST").unwrap();
        station.handle.terminator().unwrap();
        advance(2_900).await;
        assert!(station.handle.view().is_busy());
        assert_eq!(station.sink.submitted(), vec!["BL-404".to_string()]);

        advance(200).await;
        let view = station.handle.view();
        assert_eq!(view.status, StationStatus::Idle);
        assert_eq!(view.stats.failures, 1);
        assert_eq!(
            station.notifier.records().last(),
            Some(&NotificationRecord::Cleared)
        );

        station.handle.type_text("BL-405").unwrap();
        station.handle.terminator().unwrap();
        advance(1).await;
        assert_eq!(
            station.sink.submitted(),
            vec!["BL-404".to_string(), "BL-405".to_string()]
        );
    }

    /// Accepted scan: success banner for 2000ms, then state reset
    #[tokio::test(start_paused = true)]
    async fn test_accepted_scan_shows_success_then_resets() {
        let sink = ScriptedSink::new();
        sink.push_outcome(Ok("Scan enregistré avec succès".to_string()));
        let station = start(sink);

        station.handle.type_text("BL-200").unwrap();
        station.handle.terminator().unwrap();
        advance(1).await;

        let banners = station.notifier.banners();
        assert_eq!(banners.len(), 1);
        assert!(banners[0].result.is_success());
        assert_eq!(banners[0].result.message, "Scan enregistré avec succès");
        assert_eq!(banners[0].duration, Duration::from_millis(2_000));

        let view = station.handle.view();
        assert_eq!(view.status, StationStatus::Detected);
        assert_eq!(view.code, "BL-200");

        advance(2_000).await;
        let view = station.handle.view();
        assert_eq!(view.status, StationStatus::Idle);
        assert!(view.code.is_empty());
        assert_eq!(view.stats.successes, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_trigger_twice_submits_once() {
        let station = start(ScriptedSink::new());

        station.handle.submit_code("1234567890").unwrap();
        station.handle.submit_code("1234567890").unwrap();
        advance(10).await;

        assert_eq!(station.sink.submitted(), vec!["1234567890".to_string()]);
        assert_eq!(station.handle.view().stats.scans, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_second_submission_while_in_flight() {
        let station = start(ScriptedSink::new().with_latency(Duration::from_millis(500)));

        station.handle.type_text("FIRST").unwrap();
        station.handle.terminator().unwrap();
        advance(50).await;
        assert_eq!(station.handle.view().status, StationStatus::Processing);

        // Keyboard, quiet period and manual paths all race the in-flight call
        station.handle.type_text("SECOND").unwrap();
        station.handle.terminator().unwrap();
        type_slowly(&station.handle, "THIRD", 10).await;
        station.handle.submit_code("1234567890").unwrap();
        advance(300).await;

        assert_eq!(station.sink.submitted(), vec!["FIRST".to_string()]);

        // Resolves at 500ms, banner until 2500ms
        advance(2_200).await;
        assert_eq!(station.handle.view().status, StationStatus::Idle);
        assert_eq!(station.sink.submitted().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_returns_to_idle_early() {
        let sink = ScriptedSink::new();
        sink.push_outcome(Ok("Scan enregistré avec succès".to_string()));
        sink.push_outcome(Err(SubmissionFailure::new("BL inconnu")));
        let station = start(sink);

        station.handle.submit_code("BL-X").unwrap();
        advance(100).await;
        assert!(station.handle.view().is_busy());

        station.handle.dismiss().unwrap();
        advance(1).await;
        assert_eq!(station.handle.view().status, StationStatus::Idle);
        assert_eq!(
            station.notifier.records().last(),
            Some(&NotificationRecord::Cleared)
        );

        station.handle.type_text("BL-Y").unwrap();
        station.handle.terminator().unwrap();
        advance(1).await;
        assert_eq!(
            station.sink.submitted(),
            vec!["BL-X".to_string(), "BL-Y".to_string()]
        );

        // The dismissed success timer (2000ms) must not cut the error banner short
        advance(2_400).await;
        assert!(station.handle.view().is_busy());
        assert!(matches!(
            station.notifier.records().last(),
            Some(NotificationRecord::Shown(_))
        ));

        advance(700).await;
        assert_eq!(station.handle.view().status, StationStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_pending_flush() {
        let station = start(ScriptedSink::new());

        station.handle.type_text("AB").unwrap();
        station.handle.stop().unwrap();

        let stats = station.task.await.unwrap();
        advance(500).await;

        assert!(station.sink.submitted().is_empty());
        assert_eq!(stats, SessionStats::default());
        assert!(station.handle.is_closed());
        assert!(station.handle.character('C').is_err());
        assert!(!station.handle.view().listening);
    }

    #[tokio::test(start_paused = true)]
    async fn test_finish_waits_for_last_scan() {
        let station = start(ScriptedSink::new().with_latency(Duration::from_millis(200)));

        station.handle.type_text("LAST").unwrap();
        station.handle.finish().unwrap();

        let stats = station.task.await.unwrap();
        assert_eq!(station.sink.submitted(), vec!["LAST".to_string()]);
        assert_eq!(stats.scans, 1);
        assert_eq!(stats.successes, 1);
        assert_eq!(
            station.notifier.records().last(),
            Some(&NotificationRecord::Cleared)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_ends_when_handles_dropped() {
        let Station { handle, task, .. } = start(ScriptedSink::new());

        drop(handle);
        let stats = task.await.unwrap();
        assert_eq!(stats.scans, 0);
    }
}
