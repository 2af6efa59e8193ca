//! Injectable scheduling for session timers.
//!
//! Sessions never sleep on their own. They ask a `Timer` to deliver a
//! `TimerEvent` later and get the event back through
//! `SessionController::handle_timer`. Every event carries the epoch of the
//! session that scheduled it, so deliveries that race a restart are dropped.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{trace, warn};

/// Something a timer delivers back to the session that scheduled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerEvent {
    /// One second of the level countdown elapsed.
    CountdownTick { epoch: u64 },
    /// The red highlight after a failed check should be cleared.
    HighlightExpired { epoch: u64 },
}

impl TimerEvent {
    #[must_use]
    pub fn epoch(self) -> u64 {
        match self {
            TimerEvent::CountdownTick { epoch } | TimerEvent::HighlightExpired { epoch } => epoch,
        }
    }
}

/// Opaque handle for a scheduled event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// Schedules `TimerEvent`s for later delivery.
pub trait Timer: Send + Sync {
    /// Deliver `event` every `period` until cancelled.
    fn every(&self, period: Duration, event: TimerEvent) -> TimerHandle;

    /// Deliver `event` once after `delay`.
    fn once(&self, delay: Duration, event: TimerEvent) -> TimerHandle;

    /// Stop a scheduled event. Unknown or finished handles are ignored.
    fn cancel(&self, handle: TimerHandle);
}

// ─── TOKIO ─────────────────────────────────────────────────────────────────

/// Wall-clock timer backed by tokio tasks.
///
/// Events arrive on the receiver returned from `TokioTimer::new`.
pub struct TokioTimer {
    runtime: Handle,
    sender: UnboundedSender<TimerEvent>,
    next_handle: AtomicU64,
    tasks: Mutex<HashMap<TimerHandle, JoinHandle<()>>>,
}

impl TokioTimer {
    #[must_use]
    pub fn new(runtime: Handle) -> (Self, UnboundedReceiver<TimerEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let timer = Self {
            runtime,
            sender,
            next_handle: AtomicU64::new(1),
            tasks: Mutex::new(HashMap::new()),
        };
        (timer, receiver)
    }

    fn track(&self, task: JoinHandle<()>) -> TimerHandle {
        let handle = TimerHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        match self.tasks.lock() {
            Ok(mut tasks) => {
                tasks.retain(|_, task| !task.is_finished());
                tasks.insert(handle, task);
            }
            Err(err) => warn!(error = %err, "timer registry poisoned; task cannot be cancelled"),
        }
        handle
    }
}

impl Timer for TokioTimer {
    fn every(&self, period: Duration, event: TimerEvent) -> TimerHandle {
        let sender = self.sender.clone();
        let task = self.runtime.spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut interval = tokio::time::interval_at(start, period);
            loop {
                interval.tick().await;
                trace!(?event, "timer fired");
                if sender.send(event).is_err() {
                    break;
                }
            }
        });
        self.track(task)
    }

    fn once(&self, delay: Duration, event: TimerEvent) -> TimerHandle {
        let sender = self.sender.clone();
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            trace!(?event, "timer fired");
            let _ = sender.send(event);
        });
        self.track(task)
    }

    fn cancel(&self, handle: TimerHandle) {
        let task = match self.tasks.lock() {
            Ok(mut tasks) => tasks.remove(&handle),
            Err(err) => {
                warn!(error = %err, "timer registry poisoned; cannot cancel");
                None
            }
        };
        if let Some(task) = task {
            task.abort();
        }
    }
}

// ─── MANUAL ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    due: Duration,
    period: Option<Duration>,
    event: TimerEvent,
}

#[derive(Debug, Default)]
struct ManualState {
    now: Duration,
    next_handle: u64,
    scheduled: BTreeMap<TimerHandle, Scheduled>,
}

/// Virtual-time timer for deterministic tests and headless drivers.
///
/// Nothing fires until `advance` moves the clock forward.
#[derive(Debug, Default)]
pub struct ManualTimer {
    state: Mutex<ManualState>,
}

impl ManualTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move virtual time forward, returning every event that fell due in
    /// firing order.
    pub fn advance(&self, by: Duration) -> Vec<TimerEvent> {
        let Ok(mut state) = self.state.lock() else {
            return Vec::new();
        };
        let target = state.now + by;
        let mut fired = Vec::new();

        loop {
            let next = state
                .scheduled
                .iter()
                .filter(|(_, entry)| entry.due <= target)
                .min_by_key(|(handle, entry)| (entry.due, **handle))
                .map(|(handle, entry)| (*handle, *entry));
            let Some((handle, entry)) = next else {
                break;
            };

            state.now = entry.due;
            fired.push(entry.event);
            match entry.period {
                Some(period) => {
                    if let Some(slot) = state.scheduled.get_mut(&handle) {
                        slot.due = entry.due + period;
                    }
                }
                None => {
                    state.scheduled.remove(&handle);
                }
            }
        }

        state.now = target;
        fired
    }

    #[must_use]
    pub fn is_active(&self, handle: TimerHandle) -> bool {
        self.state
            .lock()
            .map(|state| state.scheduled.contains_key(&handle))
            .unwrap_or(false)
    }

    /// Number of pending schedules.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.state
            .lock()
            .map(|state| state.scheduled.len())
            .unwrap_or(0)
    }

    fn schedule(&self, delay: Duration, period: Option<Duration>, event: TimerEvent) -> TimerHandle {
        let Ok(mut state) = self.state.lock() else {
            return TimerHandle(0);
        };
        state.next_handle += 1;
        let handle = TimerHandle(state.next_handle);
        let due = state.now + delay;
        state.scheduled.insert(
            handle,
            Scheduled {
                due,
                period,
                event,
            },
        );
        handle
    }
}

impl Timer for ManualTimer {
    fn every(&self, period: Duration, event: TimerEvent) -> TimerHandle {
        let period = period.max(Duration::from_millis(1));
        self.schedule(period, Some(period), event)
    }

    fn once(&self, delay: Duration, event: TimerEvent) -> TimerHandle {
        self.schedule(delay, None, event)
    }

    fn cancel(&self, handle: TimerHandle) {
        if let Ok(mut state) = self.state.lock() {
            state.scheduled.remove(&handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_secs(1);

    #[test]
    fn manual_repeating_fires_once_per_period() {
        let timer = ManualTimer::new();
        let tick = TimerEvent::CountdownTick { epoch: 7 };
        let handle = timer.every(SECOND, tick);

        assert!(timer.advance(Duration::from_millis(999)).is_empty());
        assert_eq!(timer.advance(Duration::from_millis(1)), vec![tick]);
        assert_eq!(timer.advance(SECOND * 3), vec![tick, tick, tick]);
        assert!(timer.is_active(handle));
    }

    #[test]
    fn manual_once_fires_then_disappears() {
        let timer = ManualTimer::new();
        let expired = TimerEvent::HighlightExpired { epoch: 1 };
        let handle = timer.once(SECOND, expired);

        assert_eq!(timer.advance(SECOND * 2), vec![expired]);
        assert!(!timer.is_active(handle));
        assert!(timer.advance(SECOND * 2).is_empty());
    }

    #[test]
    fn manual_cancel_stops_delivery() {
        let timer = ManualTimer::new();
        let handle = timer.every(SECOND, TimerEvent::CountdownTick { epoch: 1 });
        timer.cancel(handle);
        timer.cancel(handle);

        assert!(timer.advance(SECOND * 5).is_empty());
        assert_eq!(timer.pending(), 0);
    }

    #[test]
    fn manual_events_come_out_in_due_order() {
        let timer = ManualTimer::new();
        let tick = TimerEvent::CountdownTick { epoch: 2 };
        let expired = TimerEvent::HighlightExpired { epoch: 2 };
        timer.every(SECOND, tick);
        timer.once(Duration::from_millis(1500), expired);

        assert_eq!(timer.advance(SECOND * 2), vec![tick, expired, tick]);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_timer_delivers_and_cancels() {
        let (timer, mut events) = TokioTimer::new(Handle::current());
        let tick = TimerEvent::CountdownTick { epoch: 3 };
        let handle = timer.every(SECOND, tick);

        assert_eq!(events.recv().await, Some(tick));
        assert_eq!(events.recv().await, Some(tick));
        timer.cancel(handle);

        let expired = TimerEvent::HighlightExpired { epoch: 3 };
        timer.once(SECOND, expired);
        assert_eq!(events.recv().await, Some(expired));
    }
}
