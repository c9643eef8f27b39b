use serde::{Deserialize, Serialize};

use crate::core::error::CommandError;
use crate::core::session::{OwnerId, PomodoroPlan};

/// Default number of assignments listed by `assignments <course_id>`.
pub const DEFAULT_ASSIGNMENT_COUNT: usize = 5;

/// Every command the bot understands. Parsing is the only place raw text is
/// looked at; the dispatcher matches on this exhaustively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Hello,
    Add(Vec<i64>),
    Multiply(Vec<i64>),

    Start { duration_minutes: Option<u32> },
    End,
    Pomodoro(PomodoroPlan),
    Stop,
    Status,
    SetMaxSession { minutes: u32 },

    AddTask { text: String },
    RemoveTask { number: usize },
    ViewTasks,

    Courses,
    Assignments { course_id: u64, count: usize },
    DueSoon,
}

/// Who sent a command and where replies go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandContext {
    pub owner: OwnerId,
    pub user_id: String,
    pub channel_id: String,
    #[serde(default)]
    pub permissions: Permissions,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    pub administrator: bool,
}

impl Command {
    /// Parse a message such as `!pomodoro 50 10 2`. Returns `Ok(None)` when the
    /// text does not start with `prefix` (ordinary chat).
    pub fn parse(input: &str, prefix: &str, defaults: PomodoroPlan) -> Result<Option<Self>, CommandError> {
        let Some(body) = input.trim().strip_prefix(prefix) else {
            return Ok(None);
        };
        let body = body.trim_start();
        let (name, rest) = match body.find(char::is_whitespace) {
            Some(idx) => (&body[..idx], body[idx..].trim()),
            None => (body, ""),
        };
        if name.is_empty() {
            return Ok(None);
        }
        let args: Vec<&str> = rest.split_whitespace().collect();

        let command = match name.to_ascii_lowercase().as_str() {
            "help" => Command::Help,
            "hello" => Command::Hello,
            "add" => Command::Add(parse_ints(&args)?),
            "multiply" => Command::Multiply(parse_ints(&args)?),

            "start" => {
                expect_at_most(name, &args, 1)?;
                Command::Start {
                    duration_minutes: args
                        .first()
                        .map(|a| positive(a, "duration"))
                        .transpose()?,
                }
            }
            "end" => Command::End,
            "pomodoro" => {
                expect_at_most(name, &args, 3)?;
                let arg = |i: usize, field: &str, default: u32| {
                    args.get(i).map_or(Ok(default), |a| positive(a, field))
                };
                Command::Pomodoro(PomodoroPlan {
                    work_minutes: arg(0, "work time", defaults.work_minutes)?,
                    break_minutes: arg(1, "break time", defaults.break_minutes)?,
                    cycles: arg(2, "cycles", defaults.cycles)?,
                })
            }
            "stop" => Command::Stop,
            "status" => Command::Status,
            "set_max_session" | "setmaxsession" => {
                let raw = args.first().ok_or_else(|| {
                    CommandError::validation("Usage: set_max_session <minutes>")
                })?;
                let minutes = positive(raw, "minutes").map_err(|_| {
                    CommandError::validation(
                        "Invalid value. Please enter a positive integer for minutes.",
                    )
                })?;
                Command::SetMaxSession { minutes }
            }

            "add_task" | "addtask" => {
                if rest.is_empty() {
                    return Err(CommandError::validation("Usage: add_task <task>"));
                }
                Command::AddTask {
                    text: rest.to_string(),
                }
            }
            "remove_task" | "removetask" => {
                let raw = args
                    .first()
                    .ok_or_else(|| CommandError::validation("Usage: remove_task <number>"))?;
                let number = raw.parse::<usize>().map_err(|_| {
                    CommandError::validation(format!("'{raw}' is not a task number."))
                })?;
                Command::RemoveTask { number }
            }
            "view_tasks" | "showtasks" | "tasks" => Command::ViewTasks,

            "courses" | "showcourses" => Command::Courses,
            "assignments" | "getcourseassignments" => {
                let raw = args.first().ok_or_else(|| {
                    CommandError::validation("Usage: assignments <course_id> [count]")
                })?;
                let course_id = raw.parse::<u64>().map_err(|_| {
                    CommandError::validation(format!("'{raw}' is not a course ID."))
                })?;
                let count = match args.get(1) {
                    Some(a) => positive(a, "count")? as usize,
                    None => DEFAULT_ASSIGNMENT_COUNT,
                };
                Command::Assignments { course_id, count }
            }
            "due_soon" | "getassignments" => Command::DueSoon,

            _ => return Err(CommandError::UnknownCommand(name.to_string())),
        };

        Ok(Some(command))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Help => "help",
            Command::Hello => "hello",
            Command::Add(_) => "add",
            Command::Multiply(_) => "multiply",
            Command::Start { .. } => "start",
            Command::End => "end",
            Command::Pomodoro(_) => "pomodoro",
            Command::Stop => "stop",
            Command::Status => "status",
            Command::SetMaxSession { .. } => "set_max_session",
            Command::AddTask { .. } => "add_task",
            Command::RemoveTask { .. } => "remove_task",
            Command::ViewTasks => "view_tasks",
            Command::Courses => "courses",
            Command::Assignments { .. } => "assignments",
            Command::DueSoon => "due_soon",
        }
    }
}

fn positive(raw: &str, field: &str) -> Result<u32, CommandError> {
    match raw.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CommandError::validation(format!(
            "Invalid {field} '{raw}': expected a positive whole number."
        ))),
    }
}

fn parse_ints(args: &[&str]) -> Result<Vec<i64>, CommandError> {
    args.iter()
        .map(|a| {
            a.parse::<i64>()
                .map_err(|_| CommandError::validation(format!("'{a}' is not an integer.")))
        })
        .collect()
}

fn expect_at_most(name: &str, args: &[&str], max: usize) -> Result<(), CommandError> {
    if args.len() > max {
        return Err(CommandError::validation(format!(
            "Too many arguments for {name}: expected at most {max}."
        )));
    }
    Ok(())
}
