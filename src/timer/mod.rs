//! # Refresh Timer
//!
//! Calls a callback once per interval and publishes how many whole seconds
//! have passed since the last call.
//!
//! ## States
//!
//! ```text
//! Idle --start--> Running --stop/drop--> Idle
//! ```
//!
//! `start` on a running timer does nothing. The seconds counter is reset to
//! zero when the timer starts and at every fire; drift is not corrected.
//!
//! The callback runs synchronously inside the timer task, so a fire either
//! completes its callback or happens after `stop` and never runs at all.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const SECOND: Duration = Duration::from_secs(1);

enum TimerState {
    Idle,
    Running {
        cancel: CancellationToken,
        handle: JoinHandle<()>,
    },
}

pub struct RefreshTimer {
    interval: Duration,
    state: TimerState,
    elapsed: Arc<watch::Sender<u64>>,
}

impl RefreshTimer {
    pub fn new(interval: Duration) -> Self {
        let (elapsed, _) = watch::channel(0);
        Self {
            interval,
            state: TimerState::Idle,
            elapsed: Arc::new(elapsed),
        }
    }

    /// Starts firing `on_fire` every interval. Returns `false` if already running.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start<F>(&mut self, on_fire: F) -> bool
    where
        F: FnMut() + Send + 'static,
    {
        if self.is_running() {
            debug!("Refresh timer already running");
            return false;
        }

        let cancel = CancellationToken::new();
        self.elapsed.send_replace(0);
        let handle = tokio::spawn(tick(
            self.interval,
            on_fire,
            self.elapsed.clone(),
            cancel.clone(),
        ));
        self.state = TimerState::Running { cancel, handle };
        info!(interval_secs = self.interval.as_secs(), "Refresh timer started");
        true
    }

    /// Stops the timer. Returns `false` if it was not running.
    pub fn stop(&mut self) -> bool {
        match std::mem::replace(&mut self.state, TimerState::Idle) {
            TimerState::Running { cancel, handle } => {
                cancel.cancel();
                handle.abort();
                info!("Refresh timer stopped");
                true
            }
            TimerState::Idle => false,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, TimerState::Running { .. })
    }

    /// Whole seconds since the last fire (or since start).
    pub fn elapsed_secs(&self) -> u64 {
        *self.elapsed.borrow()
    }

    /// Receives every change of the seconds counter.
    pub fn subscribe_elapsed(&self) -> watch::Receiver<u64> {
        self.elapsed.subscribe()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Drop for RefreshTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn tick<F>(
    interval: Duration,
    mut on_fire: F,
    elapsed: Arc<watch::Sender<u64>>,
    cancel: CancellationToken,
) where
    F: FnMut(),
{
    let start = Instant::now();
    let mut fire = time::interval_at(start + interval, interval);
    // A stalled runtime yields one late reload, then the schedule restarts from it.
    fire.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut seconds = time::interval_at(start + SECOND, SECOND);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = fire.tick() => {
                debug!("Refresh timer fired");
                on_fire();
                elapsed.send_replace(0);
                seconds.reset();
            }
            _ = seconds.tick() => {
                elapsed.send_modify(|secs| *secs += 1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl FnMut() + Send + 'static) {
        let fires = Arc::new(AtomicUsize::new(0));
        let fires_clone = fires.clone();
        (fires, move || {
            fires_clone.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_every_interval_and_counts_seconds() {
        let mut timer = RefreshTimer::new(Duration::from_secs(10));
        let (fires, on_fire) = counter();

        assert!(timer.start(on_fire));
        assert!(timer.is_running());

        time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(fires.load(Ordering::SeqCst), 0);
        assert_eq!(timer.elapsed_secs(), 3);

        time::sleep(Duration::from_secs(32)).await;
        assert_eq!(fires.load(Ordering::SeqCst), 3);
        assert_eq!(timer.elapsed_secs(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_fires_are_not_replayed() {
        let mut timer = RefreshTimer::new(Duration::from_secs(10));
        let (fires, on_fire) = counter();
        timer.start(on_fire);
        tokio::task::yield_now().await;

        // Jump past three deadlines without letting the timer task run.
        time::advance(Duration::from_secs(35)).await;
        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(fires.load(Ordering::SeqCst), 1);

        time::sleep(Duration::from_secs(9)).await;
        assert_eq!(fires.load(Ordering::SeqCst), 1);

        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(fires.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_while_running_keeps_single_schedule() {
        let mut timer = RefreshTimer::new(Duration::from_secs(10));
        let (fires, on_fire) = counter();
        let (other_fires, other) = counter();

        assert!(timer.start(on_fire));
        assert!(!timer.start(other));

        time::sleep(Duration::from_millis(20_500)).await;
        assert_eq!(fires.load(Ordering::SeqCst), 2);
        assert_eq!(other_fires.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_callbacks_and_counter() {
        let mut timer = RefreshTimer::new(Duration::from_secs(10));
        let (fires, on_fire) = counter();
        timer.start(on_fire);

        time::sleep(Duration::from_millis(12_500)).await;
        assert!(timer.stop());
        assert!(!timer.stop());
        assert_eq!(fires.load(Ordering::SeqCst), 1);
        assert_eq!(timer.elapsed_secs(), 2);

        time::sleep(Duration::from_secs(60)).await;
        assert_eq!(fires.load(Ordering::SeqCst), 1);
        assert_eq!(timer.elapsed_secs(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_stop() {
        let mut timer = RefreshTimer::new(Duration::from_secs(5));
        let (fires, on_fire) = counter();
        timer.start(on_fire);
        time::sleep(Duration::from_millis(7_500)).await;
        timer.stop();

        let (again, on_fire) = counter();
        assert!(timer.start(on_fire));
        assert_eq!(timer.elapsed_secs(), 0);

        time::sleep(Duration::from_millis(5_500)).await;
        assert_eq!(fires.load(Ordering::SeqCst), 1);
        assert_eq!(again.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_timer() {
        let (fires, on_fire) = counter();
        let elapsed = {
            let mut timer = RefreshTimer::new(Duration::from_secs(1));
            timer.start(on_fire);
            timer.subscribe_elapsed()
        };

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(fires.load(Ordering::SeqCst), 0);
        assert_eq!(*elapsed.borrow(), 0);
    }
}
