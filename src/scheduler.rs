//! Cancellable deferred events
//!
//! The aggregator never sleeps itself. It asks a [`Scheduler`] to deliver an
//! event after a delay and keeps the returned [`TimerHandle`] so the event can
//! be cancelled (debounce restart, early dismissal, teardown).
//!
//! Cancellation is best effort: a timer may already have fired and queued its
//! event when `cancel` is called. Every delivered event is tagged with its
//! [`TimerId`] so the receiver can drop expirations it no longer expects.

use std::{collections::HashMap, time::Duration};
use tokio::{sync::mpsc, task::AbortHandle};

/// Identifier of one scheduled event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// Handle returned by [`Scheduler::schedule`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle {
    id: TimerId,
}

impl TimerHandle {
    pub fn id(&self) -> TimerId {
        self.id
    }
}

/// A scheduled event that reached its deadline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expired<E> {
    pub id: TimerId,
    pub event: E,
}

pub trait Scheduler<E>: Send {
    /// Deliver `event` once `delay` has elapsed
    fn schedule(&mut self, delay: Duration, event: E) -> TimerHandle;

    /// Cancel a scheduled event. Unknown or already fired handles are ignored.
    fn cancel(&mut self, handle: TimerHandle);

    /// Cancel every outstanding event
    fn cancel_all(&mut self);

    /// Number of events still waiting for their deadline
    fn pending(&self) -> usize;
}

/// [`Scheduler`] backed by tokio timers
///
/// Each scheduled event is a small task sleeping until its deadline, then
/// sending an [`Expired`] on the channel given at construction.
pub struct TokioScheduler<E> {
    tx: mpsc::UnboundedSender<Expired<E>>,
    next_id: u64,
    tasks: HashMap<TimerId, AbortHandle>,
}

impl<E: Send + 'static> TokioScheduler<E> {
    pub fn new(tx: mpsc::UnboundedSender<Expired<E>>) -> Self {
        Self {
            tx,
            next_id: 0,
            tasks: HashMap::new(),
        }
    }

    /// Create a scheduler together with the receiving end of its events
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Expired<E>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    fn prune_finished(&mut self) {
        self.tasks.retain(|_, task| !task.is_finished());
    }
}

impl<E: Send + 'static> Scheduler<E> for TokioScheduler<E> {
    fn schedule(&mut self, delay: Duration, event: E) -> TimerHandle {
        self.prune_finished();

        let id = TimerId(self.next_id);
        self.next_id += 1;

        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the session stopped
            let _ = tx.send(Expired { id, event });
        });

        self.tasks.insert(id, task.abort_handle());
        TimerHandle { id }
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if let Some(task) = self.tasks.remove(&handle.id) {
            task.abort();
        }
    }

    fn cancel_all(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }

    fn pending(&self) -> usize {
        self.tasks.values().filter(|task| !task.is_finished()).count()
    }
}

impl<E> Drop for TokioScheduler<E> {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}
