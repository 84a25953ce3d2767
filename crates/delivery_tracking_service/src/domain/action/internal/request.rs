/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::{
    common::types::*,
    environment::AppState,
    kafka::{producers::kafka_stream_request_updates, types::TransitionSource},
    lifecycle::{actions::apply_action, state_machine::RequestAction},
    tools::error::AppError,
};
use actix_web::web::Data;
use chrono::Utc;

pub async fn transition_request(
    kind: RequestKind,
    request_id: RequestId,
    action: RequestAction,
    driver_id: Option<DriverId>,
    data: Data<AppState>,
) -> Result<LifecycleRecord, AppError> {
    let updated = apply_action(
        data.store.as_ref(),
        kind,
        &request_id,
        action,
        driver_id,
        TimeStamp(Utc::now()),
    )
    .await?;

    kafka_stream_request_updates(
        &data.producer,
        &data.trip_status_update_topic,
        kind,
        std::slice::from_ref(&updated),
        TransitionSource::Actor,
    )
    .await;

    Ok(updated)
}
