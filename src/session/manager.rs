use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::error::GuardViolation;
use crate::core::message::Destination;
use crate::core::notifier::Notifier;
use crate::core::session::{minutes, OwnerId, PomodoroPlan, Session, SessionPhase};
use crate::timer::{BreakReminder, TimerService};

/// Result of a successful `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStarted {
    pub start_time: DateTime<Utc>,
    pub planned_minutes: Option<u32>,
    /// Break reminders scheduled for the planned duration
    pub reminders: u32,
    pub break_interval_minutes: u32,
}

/// Result of closing a session (`end`, `stop` or a completed Pomodoro run).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    /// Wall time since the session started
    pub elapsed: Duration,
    pub total_time: Duration,
}

#[derive(Default)]
struct Slot {
    session: Session,
    break_timer: Option<TimerService>,
    pomodoro_run: Option<CancellationToken>,
}

struct Inner {
    slots: HashMap<OwnerId, Slot>,
    break_interval_minutes: u32,
}

/// Owns every session and its timers. All transitions go through here and are
/// serialized by one lock; guard checks and mutations happen under it.
pub struct SessionManager {
    inner: Mutex<Inner>,
    notifier: Arc<dyn Notifier>,
}

impl SessionManager {
    pub fn new(notifier: Arc<dyn Notifier>, break_interval_minutes: u32) -> Self {
        Self {
            inner: Mutex::new(Inner {
                slots: HashMap::new(),
                break_interval_minutes: break_interval_minutes.max(1),
            }),
            notifier,
        }
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub async fn snapshot(&self, owner: &OwnerId) -> Session {
        let inner = self.inner.lock().await;
        inner
            .slots
            .get(owner)
            .map(|slot| slot.session.clone())
            .unwrap_or_default()
    }

    pub async fn break_interval_minutes(&self) -> u32 {
        self.inner.lock().await.break_interval_minutes
    }

    pub async fn has_break_timer(&self, owner: &OwnerId) -> bool {
        let inner = self.inner.lock().await;
        inner
            .slots
            .get(owner)
            .and_then(|slot| slot.break_timer.as_ref())
            .map_or(false, TimerService::is_running)
    }

    // ── Regular sessions ─────────────────────────────────────────────

    pub async fn start(
        &self,
        owner: &OwnerId,
        destination: Destination,
        planned_minutes: Option<u32>,
    ) -> Result<SessionStarted, GuardViolation> {
        let mut inner = self.inner.lock().await;
        let interval = inner.break_interval_minutes;
        let slot = inner.slots.entry(owner.clone()).or_default();

        if slot.session.is_active() {
            return Err(GuardViolation::AlreadyActive);
        }

        let now = Utc::now();
        slot.session.begin_regular(now, planned_minutes);

        let reminders = planned_minutes.map_or(0, |planned| planned / interval);
        if reminders > 0 {
            let reminder = Arc::new(BreakReminder::new(Arc::clone(&self.notifier), destination));
            let mut timer = TimerService::new(reminder, minutes(interval));
            timer.start(minutes(interval), Some(reminders));
            slot.break_timer = Some(timer);
        }

        tracing::info!(owner = %owner, ?planned_minutes, reminders, "study session started");
        Ok(SessionStarted {
            start_time: now,
            planned_minutes,
            reminders,
            break_interval_minutes: interval,
        })
    }

    pub async fn end(&self, owner: &OwnerId) -> Result<SessionSummary, GuardViolation> {
        let mut inner = self.inner.lock().await;
        let slot = inner
            .slots
            .get_mut(owner)
            .filter(|slot| slot.session.phase() == SessionPhase::ActiveRegular)
            .ok_or(GuardViolation::NoRegularSession)?;

        let elapsed = slot.session.finish_regular(Utc::now());
        if let Some(mut timer) = slot.break_timer.take() {
            timer.stop();
        }

        let total_time = slot.session.total_time();
        tracing::info!(owner = %owner, elapsed_secs = elapsed.as_secs(), "study session ended");
        Ok(SessionSummary {
            elapsed,
            total_time,
        })
    }

    /// Change the break interval for future sessions and for every running
    /// break timer. Returns how many running timers were updated.
    pub async fn set_break_interval(&self, interval_minutes: u32) -> usize {
        let mut inner = self.inner.lock().await;
        inner.break_interval_minutes = interval_minutes.max(1);
        let interval = minutes(inner.break_interval_minutes);

        let mut updated = 0;
        for timer in inner.slots.values().filter_map(|s| s.break_timer.as_ref()) {
            if timer.is_running() {
                timer.change_interval(interval);
                updated += 1;
            }
        }
        tracing::info!(interval_minutes, updated, "break interval changed");
        updated
    }

    // ── Pomodoro sessions ────────────────────────────────────────────

    /// Begin a Pomodoro session and spawn its cycle runner.
    pub async fn start_pomodoro(
        self: &Arc<Self>,
        owner: &OwnerId,
        destination: Destination,
        plan: PomodoroPlan,
    ) -> Result<JoinHandle<()>, GuardViolation> {
        let run = self.begin_pomodoro(owner, plan).await?;
        Ok(tokio::spawn(super::pomodoro::run_pomodoro(
            Arc::clone(self),
            owner.clone(),
            destination,
            plan,
            run,
        )))
    }

    async fn begin_pomodoro(
        &self,
        owner: &OwnerId,
        plan: PomodoroPlan,
    ) -> Result<CancellationToken, GuardViolation> {
        let mut inner = self.inner.lock().await;
        let slot = inner.slots.entry(owner.clone()).or_default();

        if slot.session.is_active() {
            return Err(GuardViolation::AlreadyActive);
        }

        slot.session.begin_pomodoro(Utc::now(), plan);
        let run = CancellationToken::new();
        slot.pomodoro_run = Some(run.clone());

        tracing::info!(
            owner = %owner,
            work = plan.work_minutes,
            rest = plan.break_minutes,
            cycles = plan.cycles,
            "pomodoro session started"
        );
        Ok(run)
    }

    /// Credit one finished work phase. Returns `false`, leaving state alone,
    /// when the run was stopped in the meantime.
    pub(crate) async fn credit_work_phase(
        &self,
        owner: &OwnerId,
        run: &CancellationToken,
        work: Duration,
    ) -> bool {
        let mut inner = self.inner.lock().await;
        if run.is_cancelled() {
            return false;
        }
        match inner.slots.get_mut(owner) {
            Some(slot) if slot.session.is_pomodoro() => {
                slot.session.credit_work_phase(work);
                tracing::debug!(owner = %owner, cycles = slot.session.completed_cycles(), "work phase credited");
                true
            }
            _ => false,
        }
    }

    /// Close a run that went through all its cycles. `None` when it was
    /// stopped first.
    pub(crate) async fn complete_pomodoro(
        &self,
        owner: &OwnerId,
        run: &CancellationToken,
    ) -> Option<SessionSummary> {
        let mut inner = self.inner.lock().await;
        if run.is_cancelled() {
            return None;
        }
        let slot = inner.slots.get_mut(owner)?;
        if !slot.session.is_pomodoro() {
            return None;
        }

        let elapsed = slot.session.elapsed(Utc::now());
        slot.session.reset();
        slot.pomodoro_run = None;

        tracing::info!(owner = %owner, "pomodoro session completed");
        Some(SessionSummary {
            elapsed,
            total_time: slot.session.total_time(),
        })
    }

    /// Stop a running Pomodoro session. Only completed work phases count
    /// towards the total; the phase in progress is dropped.
    pub async fn stop(&self, owner: &OwnerId) -> Result<SessionSummary, GuardViolation> {
        let mut inner = self.inner.lock().await;
        let slot = inner
            .slots
            .get_mut(owner)
            .filter(|slot| slot.session.is_pomodoro())
            .ok_or(GuardViolation::NoPomodoroSession)?;

        if let Some(run) = slot.pomodoro_run.take() {
            run.cancel();
        }
        let elapsed = slot.session.elapsed(Utc::now());
        slot.session.reset();

        tracing::info!(owner = %owner, elapsed_secs = elapsed.as_secs(), "pomodoro session stopped");
        Ok(SessionSummary {
            elapsed,
            total_time: slot.session.total_time(),
        })
    }
}
