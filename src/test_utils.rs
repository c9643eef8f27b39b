//! Shared fakes for unit tests: a notifier that records what it was asked to
//! send, an LMS client serving canned courses, and a timer handler that
//! records firing times.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::core::error::{LmsError, NotifyError};
use crate::core::lms::{Assignment, Course, LmsClient};
use crate::core::message::{Destination, OutboundMessage};
use crate::core::notifier::Notifier;
use crate::timer::{Firing, TimerHandler};

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(Destination, OutboundMessage)>>,
}

impl RecordingNotifier {
    pub fn texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, m)| m.plain_text())
            .collect()
    }

    pub fn destinations(&self) -> Vec<Destination> {
        self.sent.lock().unwrap().iter().map(|(d, _)| d.clone()).collect()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, destination: &Destination, message: &OutboundMessage) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap()
            .push((destination.clone(), message.clone()));
        Ok(())
    }
}

/// Notifier that always fails, for checking failures are swallowed.
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _destination: &Destination, _message: &OutboundMessage) -> Result<(), NotifyError> {
        Err(NotifyError::Http("connection refused".into()))
    }
}

#[derive(Default)]
pub struct FakeLms {
    pub courses: Vec<Course>,
    pub assignments: HashMap<u64, Vec<Assignment>>,
    pub fail: bool,
}

impl FakeLms {
    fn check(&self) -> Result<(), LmsError> {
        if self.fail {
            return Err(LmsError::Api {
                status: 500,
                message: "internal error".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl LmsClient for FakeLms {
    async fn list_active_courses(&self) -> Result<Vec<Course>, LmsError> {
        self.check()?;
        Ok(self.courses.clone())
    }

    async fn course(&self, course_id: u64) -> Result<Course, LmsError> {
        self.check()?;
        self.courses
            .iter()
            .find(|c| c.id == course_id)
            .cloned()
            .ok_or(LmsError::CourseNotFound(course_id))
    }

    async fn list_assignments(&self, course_id: u64) -> Result<Vec<Assignment>, LmsError> {
        self.check()?;
        Ok(self.assignments.get(&course_id).cloned().unwrap_or_default())
    }
}

/// Records every firing together with the paused-clock time it happened at.
pub struct RecordingHandler {
    origin: tokio::time::Instant,
    firings: Mutex<Vec<(Duration, Firing)>>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
            firings: Mutex::new(Vec::new()),
        }
    }

    pub fn firings(&self) -> Vec<Firing> {
        self.firings.lock().unwrap().iter().map(|(_, f)| *f).collect()
    }

    /// Offsets from handler creation at which firings arrived.
    pub fn offsets(&self) -> Vec<Duration> {
        self.firings.lock().unwrap().iter().map(|(at, _)| *at).collect()
    }
}

#[async_trait]
impl TimerHandler for RecordingHandler {
    async fn fire(&self, firing: Firing) {
        let at = self.origin.elapsed();
        self.firings.lock().unwrap().push((at, firing));
    }
}

pub fn mins(n: u64) -> Duration {
    Duration::from_secs(n * 60)
}
