/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::{
    common::{types::*, utils::elapsed_minutes},
    lifecycle::state_machine::{next_status, RequestAction},
    store::Store,
    tools::{error::AppError, prometheus::LIFECYCLE_TRANSITIONS},
};
use shared::tools::logger::*;

/// Applies an actor-initiated action (accept, start, complete, cancel) to one record.
///
/// The move is checked against the state machine using the stored status and written with an
/// update guarded on that status. `complete` records `actual_duration` and resets
/// `payment_status`; it does not credit the driver.
pub async fn apply_action(
    store: &dyn Store,
    kind: RequestKind,
    id: &RequestId,
    action: RequestAction,
    driver_id: Option<DriverId>,
    now: TimeStamp,
) -> Result<LifecycleRecord, AppError> {
    let record = store
        .fetch_request(kind, id)
        .await?
        .ok_or_else(|| AppError::RequestNotFound(id.0.to_owned()))?;

    let status = next_status(record.status, action)?;

    let patch = match action {
        RequestAction::Accept => RequestPatch {
            driver_id: Some(driver_id.ok_or_else(|| {
                AppError::InvalidRequest("driverId is required to accept".to_string())
            })?),
            ..RequestPatch::status(status)
        },
        RequestAction::Complete => RequestPatch {
            actual_duration: Some(elapsed_minutes(record.created_at, now)),
            payment_status: Some(PaymentStatus::Pending),
            ..RequestPatch::status(status)
        },
        RequestAction::Start | RequestAction::Cancel => RequestPatch::status(status),
    };

    let updated = store
        .transition_request(kind, id, record.status, &patch)
        .await?
        .ok_or_else(|| AppError::StatusChanged(id.0.to_owned()))?;

    LIFECYCLE_TRANSITIONS
        .with_label_values(&[kind.table(), &status.to_string(), "actor"])
        .inc();

    info!(tag = "[Request Transitioned]", kind = %kind, request_id = %id.0, action = %action, from = %record.status, to = %status);

    Ok(updated)
}
