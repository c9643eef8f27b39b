use chrono::Utc;
use std::sync::Arc;

use crate::core::command::{Command, CommandContext};
use crate::core::error::{CommandError, LmsError, StorageError, UpstreamError};
use crate::core::lms::{self, LmsClient};
use crate::core::message::{Destination, Reply};
use crate::core::session::{format_duration, PomodoroPlan, SessionPhase};
use crate::core::todo::TodoStore;
use crate::dispatch::format::{assignments_reply, courses_reply, due_soon_reply, help_text};
use crate::session::SessionManager;

/// Entry point for chat input. Owns no state of its own; sessions, the LMS
/// client and the to-do store are injected.
pub struct Dispatcher {
    sessions: Arc<SessionManager>,
    lms: Option<Arc<dyn LmsClient>>,
    todos: Arc<dyn TodoStore>,
    prefix: String,
    pomodoro_defaults: PomodoroPlan,
}

impl Dispatcher {
    pub fn new(sessions: Arc<SessionManager>, todos: Arc<dyn TodoStore>, prefix: impl Into<String>) -> Self {
        Self {
            sessions,
            lms: None,
            todos,
            prefix: prefix.into(),
            pomodoro_defaults: PomodoroPlan::default(),
        }
    }

    pub fn with_lms(mut self, lms: Arc<dyn LmsClient>) -> Self {
        self.lms = Some(lms);
        self
    }

    pub fn with_pomodoro_defaults(mut self, plan: PomodoroPlan) -> Self {
        self.pomodoro_defaults = plan;
        self
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Handle one chat message. `None` for text that is not a command;
    /// otherwise always a reply, errors included.
    pub async fn dispatch(&self, ctx: &CommandContext, input: &str) -> Option<Reply> {
        let result = match Command::parse(input, &self.prefix, self.pomodoro_defaults) {
            Ok(None) => return None,
            Ok(Some(command)) => {
                tracing::debug!(command = command.name(), owner = %ctx.owner, "dispatching");
                self.handle(ctx, command).await
            }
            Err(e) => Err(e),
        };

        Some(result.unwrap_or_else(|e| {
            match &e {
                CommandError::Upstream(inner) => {
                    tracing::warn!(owner = %ctx.owner, "command failed: {inner}")
                }
                other => tracing::debug!(owner = %ctx.owner, "command rejected: {other}"),
            }
            Reply::text(e.user_message())
        }))
    }

    pub async fn handle(&self, ctx: &CommandContext, command: Command) -> Result<Reply, CommandError> {
        match command {
            Command::Help => Ok(Reply::text(help_text(&self.prefix))),
            Command::Hello => Ok(Reply::text("Hello!")),
            Command::Add(values) => {
                let sum = values
                    .iter()
                    .try_fold(0i64, |acc, v| acc.checked_add(*v))
                    .ok_or_else(|| CommandError::validation("Result is too large."))?;
                Ok(Reply::text(format!("Result = {sum}")))
            }
            Command::Multiply(values) => {
                let product = values
                    .iter()
                    .try_fold(1i64, |acc, v| acc.checked_mul(*v))
                    .ok_or_else(|| CommandError::validation("Result is too large."))?;
                Ok(Reply::text(format!("Result = {product}")))
            }

            Command::Start { duration_minutes } => {
                let started = self
                    .sessions
                    .start(&ctx.owner, destination(ctx), duration_minutes)
                    .await?;
                Ok(Reply::text(match started.planned_minutes {
                    Some(minutes) => format!("Study session has started for {minutes} minutes."),
                    None => "Study session has started.".to_string(),
                }))
            }
            Command::End => {
                let summary = self.sessions.end(&ctx.owner).await?;
                Ok(Reply::text(format!(
                    "Study session has been ended! Total study time: {}",
                    format_duration(summary.total_time)
                )))
            }
            Command::Pomodoro(plan) => {
                self.sessions
                    .start_pomodoro(&ctx.owner, destination(ctx), plan)
                    .await?;
                Ok(Reply::text(format!(
                    "Pomodoro session started: {} cycle(s) of {} minutes work and {} minutes break.",
                    plan.cycles, plan.work_minutes, plan.break_minutes
                )))
            }
            Command::Stop => {
                let summary = self.sessions.stop(&ctx.owner).await?;
                Ok(Reply::text(format!(
                    "Pomodoro session has been stopped! Total study time: {}",
                    format_duration(summary.total_time)
                )))
            }
            Command::Status => self.status(ctx).await,
            Command::SetMaxSession { minutes } => {
                if !ctx.permissions.administrator {
                    return Err(CommandError::PermissionDenied {
                        action: "set the max session time".into(),
                    });
                }
                self.sessions.set_break_interval(minutes).await;
                Ok(Reply::text(format!(
                    "Max session time has been set to {minutes} minutes."
                )))
            }

            Command::AddTask { text } => {
                self.todos
                    .add(&ctx.user_id, &text)
                    .await
                    .map_err(upstream_storage)?;
                Ok(Reply::text(format!("Task added: {text}")))
            }
            Command::RemoveTask { number } => match self.todos.remove(&ctx.user_id, number).await {
                Ok(removed) => Ok(Reply::text(format!("Task removed: {removed}"))),
                Err(StorageError::NotFound(_)) => Ok(Reply::text(format!(
                    "No task found with number {number}."
                ))),
                Err(e) => Err(upstream_storage(e)),
            },
            Command::ViewTasks => {
                let tasks = self
                    .todos
                    .list(&ctx.user_id)
                    .await
                    .map_err(upstream_storage)?;
                if tasks.is_empty() {
                    return Ok(Reply::text("You have no tasks in your to-do list."));
                }
                let lines = tasks
                    .iter()
                    .enumerate()
                    .map(|(i, task)| format!("{}. {task}", i + 1))
                    .collect::<Vec<_>>()
                    .join("\n");
                Ok(Reply::text(format!("Your to-do list:\n{lines}")))
            }

            Command::Courses => {
                let courses = self.lms()?.list_active_courses().await.map_err(upstream_lms)?;
                Ok(courses_reply(&courses))
            }
            Command::Assignments { course_id, count } => {
                let client = self.lms()?;
                let course = client.course(course_id).await.map_err(upstream_lms)?;
                let assignments = client
                    .list_assignments(course_id)
                    .await
                    .map_err(upstream_lms)?;
                let upcoming = lms::upcoming(assignments, Utc::now(), count);
                Ok(assignments_reply(&course, &upcoming))
            }
            Command::DueSoon => self.due_soon().await,
        }
    }

    async fn status(&self, ctx: &CommandContext) -> Result<Reply, CommandError> {
        let session = self.sessions.snapshot(&ctx.owner).await;
        let total = format_duration(session.total_time());
        let elapsed = format_duration(session.elapsed(Utc::now()));

        let text = match session.phase() {
            SessionPhase::Idle => format!("No session is active. Total study time: {total}"),
            SessionPhase::ActiveRegular => match session.planned_minutes() {
                Some(planned) => format!(
                    "Study session active for {elapsed} of {planned} planned minutes. Total study time: {total}"
                ),
                None => format!("Study session active for {elapsed}. Total study time: {total}"),
            },
            SessionPhase::ActivePomodoro => {
                let cycles = session.pomodoro_plan().map_or(0, |p| p.cycles);
                format!(
                    "Pomodoro session active for {elapsed}, {} of {cycles} work periods done. Total study time: {total}",
                    session.completed_cycles()
                )
            }
        };
        Ok(Reply::text(text))
    }

    async fn due_soon(&self) -> Result<Reply, CommandError> {
        let client = self.lms()?;
        let now = Utc::now();
        let window_end = lms::next_week_end(now);

        let mut due = Vec::new();
        for course in client.list_active_courses().await.map_err(upstream_lms)? {
            let assignments = client
                .list_assignments(course.id)
                .await
                .map_err(upstream_lms)?;
            due.extend(
                assignments
                    .into_iter()
                    .filter(|a| a.due_at.map_or(false, |d| d > now && d <= window_end))
                    .map(|a| (course.name.clone(), a)),
            );
        }
        due.sort_by_key(|(_, a)| a.due_at);
        Ok(due_soon_reply(&due))
    }

    fn lms(&self) -> Result<&Arc<dyn LmsClient>, CommandError> {
        self.lms.as_ref().ok_or_else(|| upstream_lms(LmsError::NotConfigured))
    }
}

fn destination(ctx: &CommandContext) -> Destination {
    Destination::channel(ctx.channel_id.clone())
}

fn upstream_lms(e: LmsError) -> CommandError {
    CommandError::Upstream(UpstreamError::Lms(e))
}

fn upstream_storage(e: StorageError) -> CommandError {
    CommandError::Upstream(UpstreamError::Storage(e))
}
