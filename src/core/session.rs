use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Key a session belongs to: a guild, or a channel outside any guild.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OwnerId(pub String);

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    ActiveRegular,
    ActivePomodoro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroPlan {
    pub work_minutes: u32,
    pub break_minutes: u32,
    pub cycles: u32,
}

impl PomodoroPlan {
    pub fn work(&self) -> Duration {
        minutes(self.work_minutes)
    }

    pub fn rest(&self) -> Duration {
        minutes(self.break_minutes)
    }
}

impl Default for PomodoroPlan {
    fn default() -> Self {
        Self {
            work_minutes: 25,
            break_minutes: 5,
            cycles: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
enum SessionState {
    Idle,
    ActiveRegular {
        start_time: DateTime<Utc>,
        planned_minutes: Option<u32>,
    },
    ActivePomodoro {
        start_time: DateTime<Utc>,
        plan: PomodoroPlan,
        completed_cycles: u32,
    },
}

/// Study-session record for one owner.
///
/// Only `session::SessionManager` mutates it; everything else reads the
/// flattened view (`is_active`, `is_pomodoro`, `start_time`, `total_time`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    state: SessionState,
    total_time: Duration,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            state: SessionState::Idle,
            total_time: Duration::ZERO,
        }
    }
}

impl Session {
    pub fn phase(&self) -> SessionPhase {
        match self.state {
            SessionState::Idle => SessionPhase::Idle,
            SessionState::ActiveRegular { .. } => SessionPhase::ActiveRegular,
            SessionState::ActivePomodoro { .. } => SessionPhase::ActivePomodoro,
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase() != SessionPhase::Idle
    }

    pub fn is_pomodoro(&self) -> bool {
        self.phase() == SessionPhase::ActivePomodoro
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        match self.state {
            SessionState::Idle => None,
            SessionState::ActiveRegular { start_time, .. }
            | SessionState::ActivePomodoro { start_time, .. } => Some(start_time),
        }
    }

    pub fn total_time(&self) -> Duration {
        self.total_time
    }

    pub fn planned_minutes(&self) -> Option<u32> {
        match self.state {
            SessionState::ActiveRegular { planned_minutes, .. } => planned_minutes,
            _ => None,
        }
    }

    pub fn pomodoro_plan(&self) -> Option<PomodoroPlan> {
        match self.state {
            SessionState::ActivePomodoro { plan, .. } => Some(plan),
            _ => None,
        }
    }

    pub fn completed_cycles(&self) -> u32 {
        match self.state {
            SessionState::ActivePomodoro {
                completed_cycles, ..
            } => completed_cycles,
            _ => 0,
        }
    }

    /// Wall time since the session started; zero when idle.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        self.start_time()
            .and_then(|start| (now - start).to_std().ok())
            .unwrap_or(Duration::ZERO)
    }

    // ── Transitions (crate-private; guards live in SessionManager) ──

    pub(crate) fn begin_regular(&mut self, now: DateTime<Utc>, planned_minutes: Option<u32>) {
        self.state = SessionState::ActiveRegular {
            start_time: now,
            planned_minutes,
        };
    }

    pub(crate) fn begin_pomodoro(&mut self, now: DateTime<Utc>, plan: PomodoroPlan) {
        self.state = SessionState::ActivePomodoro {
            start_time: now,
            plan,
            completed_cycles: 0,
        };
    }

    /// Close a regular session, crediting its wall time.
    pub(crate) fn finish_regular(&mut self, now: DateTime<Utc>) -> Duration {
        let elapsed = self.elapsed(now);
        self.total_time += elapsed;
        self.state = SessionState::Idle;
        elapsed
    }

    pub(crate) fn credit_work_phase(&mut self, work: Duration) {
        self.total_time += work;
        if let SessionState::ActivePomodoro {
            completed_cycles, ..
        } = &mut self.state
        {
            *completed_cycles += 1;
        }
    }

    pub(crate) fn reset(&mut self) {
        self.state = SessionState::Idle;
    }
}

pub fn minutes(n: u32) -> Duration {
    Duration::from_secs(u64::from(n) * 60)
}

/// `H:MM:SS`, the way study totals are shown in chat.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}
