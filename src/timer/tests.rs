use super::*;
use crate::core::message::Destination;
use crate::test_utils::{mins, RecordingHandler, RecordingNotifier};
use std::sync::Arc;

#[tokio::test(start_paused = true)]
async fn test_fires_bounded_number_of_times() {
    let handler = Arc::new(RecordingHandler::new());
    let mut timer = TimerService::new(handler.clone(), mins(60));

    timer.start(mins(60), Some(2));
    assert!(timer.is_running());

    tokio::time::sleep(mins(5 * 60)).await;

    let sequences: Vec<u32> = handler.firings().iter().map(|f| f.sequence).collect();
    assert_eq!(sequences, vec![1, 2]);
    assert_eq!(handler.offsets(), vec![mins(60), mins(120)]);
    assert!(!timer.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_first_firing_waits_one_interval() {
    let handler = Arc::new(RecordingHandler::new());
    let mut timer = TimerService::new(handler.clone(), mins(30));
    timer.start(mins(30), None);

    tokio::time::sleep(mins(29)).await;
    assert!(handler.firings().is_empty());

    tokio::time::sleep(mins(2)).await;
    assert_eq!(handler.firings().len(), 1);
    timer.stop();
}

#[tokio::test(start_paused = true)]
async fn test_zero_repeat_count_never_fires() {
    let handler = Arc::new(RecordingHandler::new());
    let mut timer = TimerService::new(handler.clone(), mins(10));
    timer.start(mins(10), Some(0));
    assert!(!timer.is_running());

    tokio::time::sleep(mins(60)).await;
    assert!(handler.firings().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_no_firing_after_stop() {
    let handler = Arc::new(RecordingHandler::new());
    let mut timer = TimerService::new(handler.clone(), mins(10));
    timer.start(mins(10), None);

    tokio::time::sleep(mins(25)).await;
    assert_eq!(handler.firings().len(), 2);

    timer.stop();
    assert!(!timer.is_running());
    timer.stop();

    tokio::time::sleep(mins(120)).await;
    assert_eq!(handler.firings().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_change_interval_leaves_pending_firing_alone() {
    let handler = Arc::new(RecordingHandler::new());
    let mut timer = TimerService::new(handler.clone(), mins(10));
    timer.start(mins(10), None);

    tokio::time::sleep(mins(5)).await;
    timer.change_interval(mins(20));
    assert_eq!(timer.interval(), mins(20));

    tokio::time::sleep(mins(50)).await;
    timer.stop();

    assert_eq!(handler.offsets(), vec![mins(10), mins(30), mins(50)]);
    let intervals: Vec<_> = handler.firings().iter().map(|f| f.interval).collect();
    assert_eq!(intervals, vec![mins(10), mins(20), mins(20)]);
    let elapsed: Vec<_> = handler.firings().iter().map(|f| f.elapsed).collect();
    assert_eq!(elapsed, vec![mins(10), mins(30), mins(50)]);
}

#[tokio::test(start_paused = true)]
async fn test_restart_replaces_previous_run() {
    let handler = Arc::new(RecordingHandler::new());
    let mut timer = TimerService::new(handler.clone(), mins(10));
    timer.start(mins(10), None);

    tokio::time::sleep(mins(15)).await;
    timer.start(mins(30), Some(1));

    tokio::time::sleep(mins(100)).await;
    let sequences: Vec<u32> = handler.firings().iter().map(|f| f.sequence).collect();
    assert_eq!(sequences, vec![1, 1]);
    assert_eq!(handler.offsets(), vec![mins(10), mins(45)]);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_timer_cancels_it() {
    let handler = Arc::new(RecordingHandler::new());
    {
        let mut timer = TimerService::new(handler.clone(), mins(10));
        timer.start(mins(10), None);
    }
    tokio::time::sleep(mins(60)).await;
    assert!(handler.firings().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_break_reminder_posts_to_channel() {
    let notifier = Arc::new(RecordingNotifier::default());
    let reminder = Arc::new(BreakReminder::new(
        notifier.clone(),
        Destination::channel("study-hall"),
    ));
    let mut timer = TimerService::new(reminder, mins(60));
    timer.start(mins(60), Some(2));

    tokio::time::sleep(mins(180)).await;

    assert_eq!(
        notifier.texts(),
        vec![
            "**Time to take a break!** You've been studying for 60 minutes",
            "**Time to take a break!** You've been studying for 120 minutes",
        ]
    );
    assert!(notifier
        .destinations()
        .iter()
        .all(|d| d.channel_id == "study-hall"));
}
