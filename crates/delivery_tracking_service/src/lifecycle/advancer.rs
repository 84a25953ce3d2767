/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::{
    common::{types::*, utils::*},
    environment::AdvancerSettings,
    lifecycle::{
        notifications,
        state_machine::{next_status, RequestAction},
    },
    store::Store,
    tools::{error::AppError, prometheus::LIFECYCLE_TRANSITIONS},
};
use shared::tools::logger::*;

/// Records moved by one pass, as returned by the conditional updates.
#[derive(Debug, Default, Clone)]
pub struct RequestPassOutcome {
    pub cancelled: Vec<LifecycleRecord>,
    pub completed: Vec<LifecycleRecord>,
}

/// One scan-and-mutate pass over trips or service requests.
///
/// 1. `pending` older than `pending_cancel_after_mins` become `cancelled`.
/// 2. `in_progress` older than `in_progress_complete_after_mins` become `completed` with
///    `actual_duration` in whole minutes and `payment_status = pending`; an assigned driver is
///    credited the fare.
///
/// Every update is guarded on the status the record was fetched in, so a record that moved in the
/// meantime is skipped and never notified twice. A failed query aborts the pass; a failed update
/// only skips that record; a failed notification or driver credit is logged and the transition
/// still counts.
#[macros::measure_duration]
pub async fn advance_requests(
    store: &dyn Store,
    kind: RequestKind,
    settings: &AdvancerSettings,
    now: TimeStamp,
) -> Result<RequestPassOutcome, AppError> {
    let mut outcome = RequestPassOutcome::default();

    let pending = store
        .fetch_requests(
            kind,
            RequestStatus::Pending,
            minutes_before(now, settings.pending_cancel_after_mins),
        )
        .await?;

    for record in pending {
        let Some(cancelled) =
            apply_transition(store, kind, &record, RequestAction::Cancel, |status| {
                RequestPatch::status(status)
            })
            .await
        else {
            continue;
        };

        notify(store, &notifications::request_cancelled(kind, &cancelled)).await;
        outcome.cancelled.push(cancelled);
    }

    let in_progress = store
        .fetch_requests(
            kind,
            RequestStatus::InProgress,
            minutes_before(now, settings.in_progress_complete_after_mins),
        )
        .await?;

    for record in in_progress {
        let actual_duration = elapsed_minutes(record.created_at, now);
        let Some(completed) =
            apply_transition(store, kind, &record, RequestAction::Complete, |status| {
                RequestPatch {
                    status,
                    driver_id: None,
                    actual_duration: Some(actual_duration),
                    payment_status: Some(PaymentStatus::Pending),
                }
            })
            .await
        else {
            continue;
        };

        if let Some(driver_id) = &completed.driver_id {
            let fare = completed.fare.unwrap_or_default();
            if let Err(err) = store
                .credit_driver(driver_id, fare, settings.earnings_policy)
                .await
            {
                error!(tag = "[Driver Credit Failed]", kind = %kind, request_id = %completed.id.0, driver_id = %driver_id.0, error = %err.message());
            }
        }

        notify(store, &notifications::request_completed(kind, &completed)).await;
        outcome.completed.push(completed);
    }

    info!(
        tag = "[Request Pass Completed]",
        kind = %kind,
        cancelled = outcome.cancelled.len(),
        completed = outcome.completed.len()
    );

    Ok(outcome)
}

async fn apply_transition(
    store: &dyn Store,
    kind: RequestKind,
    record: &LifecycleRecord,
    action: RequestAction,
    patch: impl FnOnce(RequestStatus) -> RequestPatch,
) -> Option<LifecycleRecord> {
    let status = match next_status(record.status, action) {
        Ok(status) => status,
        Err(err) => {
            warn!(tag = "[Transition Skipped]", kind = %kind, request_id = %record.id.0, error = %err.message());
            return None;
        }
    };

    match store
        .transition_request(kind, &record.id, record.status, &patch(status))
        .await
    {
        Ok(Some(updated)) => {
            LIFECYCLE_TRANSITIONS
                .with_label_values(&[kind.table(), &status.to_string(), "advancer"])
                .inc();
            Some(updated)
        }
        Ok(None) => {
            info!(tag = "[Transition Lost Race]", kind = %kind, request_id = %record.id.0, expected = %record.status);
            None
        }
        Err(err) => {
            error!(tag = "[Transition Failed]", kind = %kind, request_id = %record.id.0, error = %err.message());
            None
        }
    }
}

pub(crate) async fn notify(store: &dyn Store, notification: &Notification) {
    if let Err(err) = store.insert_notification(notification).await {
        error!(tag = "[Notification Failed]", user_id = %notification.user_id.0, title = %notification.title, error = %err.message());
    }
}
