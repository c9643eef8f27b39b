use super::command::*;
use super::config::*;
use super::error::*;
use super::lms::*;
use super::message::*;
use super::session::*;
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use std::time::Duration;

fn parse(input: &str) -> Result<Option<Command>, CommandError> {
    Command::parse(input, "!", PomodoroPlan::default())
}

#[test]
fn test_parse_ignores_plain_chat() {
    assert_eq!(parse("hello everyone").unwrap(), None);
    assert_eq!(parse("!").unwrap(), None);
}

#[test]
fn test_parse_start_with_and_without_duration() {
    assert_eq!(
        parse("!start").unwrap(),
        Some(Command::Start {
            duration_minutes: None
        })
    );
    assert_eq!(
        parse("!start 90").unwrap(),
        Some(Command::Start {
            duration_minutes: Some(90)
        })
    );
}

#[test]
fn test_parse_rejects_bad_durations() {
    for input in ["!start soon", "!start 0", "!start -5", "!pomodoro 25 x"] {
        match parse(input) {
            Err(CommandError::Validation(_)) => {}
            other => panic!("expected validation error for {input:?}, got {other:?}"),
        }
    }
}

#[test]
fn test_parse_pomodoro_defaults_and_overrides() {
    assert_eq!(
        parse("!pomodoro").unwrap(),
        Some(Command::Pomodoro(PomodoroPlan {
            work_minutes: 25,
            break_minutes: 5,
            cycles: 1,
        }))
    );
    assert_eq!(
        parse("!pomodoro 50 10 3").unwrap(),
        Some(Command::Pomodoro(PomodoroPlan {
            work_minutes: 50,
            break_minutes: 10,
            cycles: 3,
        }))
    );
}

#[test]
fn test_parse_pomodoro_uses_configured_defaults() {
    let defaults = PomodoroPlan {
        work_minutes: 45,
        break_minutes: 15,
        cycles: 2,
    };
    assert_eq!(
        Command::parse("!pomodoro 30", "!", defaults).unwrap(),
        Some(Command::Pomodoro(PomodoroPlan {
            work_minutes: 30,
            break_minutes: 15,
            cycles: 2,
        }))
    );
}

#[test]
fn test_parse_set_max_session_message() {
    match parse("!set_max_session 0") {
        Err(CommandError::Validation(msg)) => {
            assert_eq!(msg, "Invalid value. Please enter a positive integer for minutes.")
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(
        parse("!set_max_session 45").unwrap(),
        Some(Command::SetMaxSession { minutes: 45 })
    );
}

#[test]
fn test_parse_task_commands_and_aliases() {
    assert_eq!(
        parse("!add_task read chapter 4").unwrap(),
        Some(Command::AddTask {
            text: "read chapter 4".into()
        })
    );
    assert_eq!(
        parse("!addTask finish lab").unwrap(),
        Some(Command::AddTask {
            text: "finish lab".into()
        })
    );
    assert_eq!(
        parse("!removeTask 2").unwrap(),
        Some(Command::RemoveTask { number: 2 })
    );
    assert_eq!(parse("!showTasks").unwrap(), Some(Command::ViewTasks));
    assert!(matches!(parse("!add_task"), Err(CommandError::Validation(_))));
}

#[test]
fn test_parse_lms_commands() {
    assert_eq!(parse("!showcourses").unwrap(), Some(Command::Courses));
    assert_eq!(
        parse("!assignments 1234").unwrap(),
        Some(Command::Assignments {
            course_id: 1234,
            count: DEFAULT_ASSIGNMENT_COUNT
        })
    );
    assert_eq!(
        parse("!getcourseassignments 1234 2").unwrap(),
        Some(Command::Assignments {
            course_id: 1234,
            count: 2
        })
    );
    assert_eq!(parse("!getassignments").unwrap(), Some(Command::DueSoon));
}

#[test]
fn test_parse_unknown_command() {
    match parse("!dance") {
        Err(CommandError::UnknownCommand(name)) => assert_eq!(name, "dance"),
        other => panic!("expected unknown command, got {other:?}"),
    }
}

#[test]
fn test_parse_math() {
    assert_eq!(parse("!add 1 2 3").unwrap(), Some(Command::Add(vec![1, 2, 3])));
    assert!(matches!(parse("!multiply 2 two"), Err(CommandError::Validation(_))));
}

#[test]
fn test_session_defaults_to_idle() {
    let session = Session::default();
    assert_eq!(session.phase(), SessionPhase::Idle);
    assert!(!session.is_active());
    assert!(!session.is_pomodoro());
    assert!(session.start_time().is_none());
    assert_eq!(session.total_time(), Duration::ZERO);
}

#[test]
fn test_session_regular_credit() {
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    let mut session = Session::default();
    session.begin_regular(start, Some(30));
    assert!(session.is_active());
    assert!(!session.is_pomodoro());
    assert_eq!(session.planned_minutes(), Some(30));

    let credited = session.finish_regular(start + ChronoDuration::minutes(42));
    assert_eq!(credited, minutes(42));
    assert_eq!(session.total_time(), minutes(42));
    assert!(!session.is_active());
}

#[test]
fn test_session_clock_skew_never_decreases_total() {
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    let mut session = Session::default();
    session.begin_regular(start, None);
    session.finish_regular(start - ChronoDuration::minutes(5));
    assert_eq!(session.total_time(), Duration::ZERO);
}

#[test]
fn test_session_pomodoro_flags() {
    let mut session = Session::default();
    session.begin_pomodoro(Utc::now(), PomodoroPlan::default());
    assert!(session.is_active());
    assert!(session.is_pomodoro());
    session.credit_work_phase(minutes(25));
    assert_eq!(session.completed_cycles(), 1);
    assert_eq!(session.total_time(), minutes(25));
    session.reset();
    assert!(!session.is_pomodoro());
    assert_eq!(session.total_time(), minutes(25));
}

#[test]
fn test_format_duration() {
    assert_eq!(format_duration(Duration::ZERO), "0:00:00");
    assert_eq!(format_duration(minutes(50)), "0:50:00");
    assert_eq!(format_duration(Duration::from_secs(3 * 3600 + 61)), "3:01:01");
}

fn assignment(id: u64, due: Option<chrono::DateTime<Utc>>) -> Assignment {
    Assignment {
        id,
        name: format!("hw{id}"),
        due_at: due,
        html_url: None,
    }
}

#[test]
fn test_sort_by_due_puts_missing_last() {
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let mut list = vec![
        assignment(1, None),
        assignment(2, Some(base + ChronoDuration::days(3))),
        assignment(3, Some(base + ChronoDuration::days(1))),
        assignment(4, None),
    ];
    sort_by_due(&mut list);
    let ids: Vec<u64> = list.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![3, 2, 1, 4]);
}

#[test]
fn test_upcoming_filters_past_and_limits() {
    let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
    let list = vec![
        assignment(1, Some(now - ChronoDuration::days(1))),
        assignment(2, Some(now + ChronoDuration::days(2))),
        assignment(3, None),
        assignment(4, Some(now + ChronoDuration::hours(1))),
        assignment(5, Some(now + ChronoDuration::days(9))),
    ];
    let ids: Vec<u64> = upcoming(list, now, 2).iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![4, 2]);
}

#[test]
fn test_next_week_end() {
    let now = Utc.with_ymd_and_hms(2024, 3, 10, 8, 30, 0).unwrap();
    assert_eq!(
        next_week_end(now),
        Utc.with_ymd_and_hms(2024, 3, 17, 23, 59, 59).unwrap()
    );
}

#[test]
fn test_embed_plain_text() {
    let embed = Embed::new("Courses")
        .description("Active this term")
        .field("Algorithms", "ID: 42");
    let msg = OutboundMessage::embed(embed);
    assert_eq!(msg.plain_text(), "**Courses**\nActive this term\nAlgorithms: ID: 42");
}

#[test]
fn test_upstream_errors_are_generic_for_users() {
    let err = CommandError::Upstream(UpstreamError::Lms(LmsError::Api {
        status: 500,
        message: "secret stack trace".into(),
    }));
    assert!(!err.user_message().contains("secret"));
    assert_eq!(
        CommandError::Guard(GuardViolation::AlreadyActive).user_message(),
        "Session is already active!"
    );
    assert_eq!(
        CommandError::UnknownCommand("x".into()).user_message(),
        "Command not found."
    );
}

#[test]
fn test_config_defaults_and_validation() {
    let config = AppConfig::default();
    assert_eq!(config.command_prefix, "!");
    assert_eq!(config.session.max_session_minutes, 60);
    assert!(config.validate().is_ok());

    let mut bad = AppConfig::default();
    bad.session.cycles = 0;
    assert!(matches!(bad.validate(), Err(ConfigError::Invalid(_))));

    let mut half_canvas = AppConfig::default();
    half_canvas.canvas.api_url = Some("https://canvas.example".into());
    match half_canvas.validate() {
        Err(ConfigError::MissingField(field)) => assert_eq!(field, "canvas.api_key"),
        other => panic!("expected missing field, got {other:?}"),
    }
}

#[test]
fn test_config_file_parses_partial_json() {
    let config: AppConfig = serde_json::from_str(
        r#"{"admins": ["42"], "session": {"max_session_minutes": 45}}"#,
    )
    .unwrap();
    assert!(config.is_admin("42"));
    assert!(!config.is_admin("7"));
    assert_eq!(config.session.max_session_minutes, 45);
    assert_eq!(config.session.work_minutes, 25);
}
