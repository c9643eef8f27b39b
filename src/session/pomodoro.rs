use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::core::message::{Destination, OutboundMessage};
use crate::core::notifier::send_logged;
use crate::core::session::{format_duration, OwnerId, PomodoroPlan};
use crate::session::manager::SessionManager;

/// Work/break cycle loop for one Pomodoro session.
///
/// The token is checked at phase boundaries only. Once it is cancelled the
/// runner leaves without touching state or posting anything: `stop` has
/// already reset the session and replied.
pub(crate) async fn run_pomodoro(
    manager: Arc<SessionManager>,
    owner: OwnerId,
    destination: Destination,
    plan: PomodoroPlan,
    run: CancellationToken,
) {
    let span = tracing::info_span!("pomodoro", run_id = %Uuid::new_v4(), owner = %owner);
    run_cycles(manager, owner, destination, plan, run)
        .instrument(span)
        .await
}

async fn run_cycles(
    manager: Arc<SessionManager>,
    owner: OwnerId,
    destination: Destination,
    plan: PomodoroPlan,
    run: CancellationToken,
) {
    let notifier = Arc::clone(manager.notifier());

    for cycle in 1..=plan.cycles {
        if run.is_cancelled() {
            tracing::debug!(cycle, "run cancelled before work phase");
            return;
        }
        send_logged(
            notifier.as_ref(),
            &destination,
            OutboundMessage::text(format!(
                "Starting a {}-minute work period now!",
                plan.work_minutes
            )),
        )
        .await;
        tokio::time::sleep(plan.work()).await;

        if !manager.credit_work_phase(&owner, &run, plan.work()).await {
            tracing::debug!(cycle, "run cancelled during work phase");
            return;
        }

        send_logged(
            notifier.as_ref(),
            &destination,
            OutboundMessage::text(format!(
                "Time for a {}-minute break!",
                plan.break_minutes
            )),
        )
        .await;
        tokio::time::sleep(plan.rest()).await;
    }

    match manager.complete_pomodoro(&owner, &run).await {
        Some(summary) => {
            send_logged(
                notifier.as_ref(),
                &destination,
                OutboundMessage::text(format!(
                    "Pomodoro session has ended! Total study time: {}",
                    format_duration(summary.total_time)
                )),
            )
            .await;
        }
        None => tracing::debug!("run cancelled during final break"),
    }
}
