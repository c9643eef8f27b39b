use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// One firing of a running timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Firing {
    /// 1-based count of firings since `start`
    pub sequence: u32,
    /// Interval that elapsed before this firing
    pub interval: Duration,
    /// Total scheduled time since `start`
    pub elapsed: Duration,
}

#[async_trait]
pub trait TimerHandler: Send + Sync {
    async fn fire(&self, firing: Firing);
}

struct Running {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Repeating timer backed by one spawned task.
///
/// The interval lives in a watch channel: the task reads it when computing
/// each next deadline, so `change_interval` never moves a deadline that is
/// already being waited on.
pub struct TimerService {
    handler: Arc<dyn TimerHandler>,
    interval_tx: watch::Sender<Duration>,
    running: Option<Running>,
}

impl TimerService {
    pub fn new(handler: Arc<dyn TimerHandler>, interval: Duration) -> Self {
        let (interval_tx, _) = watch::channel(interval);
        Self {
            handler,
            interval_tx,
            running: None,
        }
    }

    /// Fire every `interval`, at most `repeat_count` times when given. Any
    /// previous run is stopped first.
    pub fn start(&mut self, interval: Duration, repeat_count: Option<u32>) {
        self.stop();
        self.interval_tx.send_replace(interval);

        if repeat_count == Some(0) {
            return;
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_timer(
            Arc::clone(&self.handler),
            self.interval_tx.subscribe(),
            repeat_count,
            cancel.clone(),
        ));
        self.running = Some(Running { cancel, handle });
    }

    /// Cancel future firings. Safe to call when not running.
    pub fn stop(&mut self) {
        if let Some(running) = self.running.take() {
            running.cancel.cancel();
        }
    }

    /// Applies from the next scheduled deadline on.
    pub fn change_interval(&self, interval: Duration) {
        self.interval_tx.send_replace(interval);
    }

    pub fn interval(&self) -> Duration {
        *self.interval_tx.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .map_or(false, |r| !r.cancel.is_cancelled() && !r.handle.is_finished())
    }
}

impl Drop for TimerService {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_timer(
    handler: Arc<dyn TimerHandler>,
    interval_rx: watch::Receiver<Duration>,
    repeat_count: Option<u32>,
    cancel: CancellationToken,
) {
    let started = Instant::now();
    let mut deadline = started;
    let mut sequence = 0u32;

    while repeat_count.map_or(true, |n| sequence < n) {
        let interval = *interval_rx.borrow();
        if interval.is_zero() {
            tracing::warn!("timer interval is zero, stopping");
            break;
        }
        deadline += interval;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep_until(deadline) => {}
        }
        if cancel.is_cancelled() {
            break;
        }

        sequence += 1;
        tracing::debug!(sequence, interval_secs = interval.as_secs(), "timer fired");
        handler
            .fire(Firing {
                sequence,
                interval,
                elapsed: deadline - started,
            })
            .await;
    }
}
