use chrono::{DateTime, Utc};

use crate::core::lms::{Assignment, Course};
use crate::core::message::{Embed, Reply};

/// e.g. `Friday, March 07, 2025 11:59 PM`
pub const DUE_DATE_FORMAT: &str = "%A, %B %d, %Y %I:%M %p";

const EMBED_COLOR: u32 = 0x5865F2;

pub fn format_due(due: Option<DateTime<Utc>>) -> String {
    due.map_or_else(|| "No due date".to_string(), |d| d.format(DUE_DATE_FORMAT).to_string())
}

pub fn help_text(prefix: &str) -> String {
    let rows: &[(&str, &str)] = &[
        ("start [minutes]", "Start a study session, with break reminders when a duration is given"),
        ("end", "End the current study session"),
        ("pomodoro [work] [break] [cycles]", "Start a Pomodoro session (default 25 5 1)"),
        ("stop", "Stop the current Pomodoro session"),
        ("status", "Show the current session and total study time"),
        ("set_max_session <minutes>", "Set the break reminder interval (admin)"),
        ("add_task <task>", "Add a task to your to-do list"),
        ("remove_task <number>", "Remove a task by its number"),
        ("view_tasks", "Show your to-do list"),
        ("courses", "List your active courses"),
        ("assignments <course_id> [count]", "Upcoming assignments for a course"),
        ("due_soon", "Assignments due in the next week"),
        ("hello", "Say hello"),
        ("add <n...>", "Add integers"),
        ("multiply <n...>", "Multiply integers"),
    ];

    let mut out = String::from("Available commands:");
    for (usage, about) in rows {
        out.push_str(&format!("\n{prefix}{usage} - {about}"));
    }
    out
}

pub(crate) fn courses_reply(courses: &[Course]) -> Reply {
    if courses.is_empty() {
        return Reply::text("No active courses found.");
    }
    let body = courses
        .iter()
        .map(|c| format!("{} (ID: {})", c.name, c.id))
        .collect::<Vec<_>>()
        .join("\n");
    Reply::embed(
        Embed::new("Available courses")
            .description(body)
            .color(EMBED_COLOR),
    )
}

pub(crate) fn assignments_reply(course: &Course, assignments: &[Assignment]) -> Reply {
    if assignments.is_empty() {
        return Reply::text("No upcoming assignments.");
    }
    let embed = assignments.iter().fold(
        Embed::new(format!("Upcoming assignments for course {}", course.name)).color(EMBED_COLOR),
        |embed, a| embed.field(&a.name, format!("Due: {}", format_due(a.due_at))),
    );
    Reply::embed(embed)
}

pub(crate) fn due_soon_reply(due: &[(String, Assignment)]) -> Reply {
    if due.is_empty() {
        return Reply::text("No assignments due in the next week.");
    }
    let embed = due.iter().fold(
        Embed::new("Assignments due in the next week").color(EMBED_COLOR),
        |embed, (course, a)| {
            embed.field(
                &a.name,
                format!("Course: {course}\nDue: {}", format_due(a.due_at)),
            )
        },
    );
    Reply::embed(embed)
}
