/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use actix_web::{
    get,
    http::header::{CacheControl, CacheDirective},
    mime,
    post,
    web::{Bytes, Data, Json, Path},
    HttpResponse,
};
use futures::StreamExt;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};

use crate::{
    common::types::{DriverId, DriverPosition},
    domain::{action::ui::tracker, types::ui::tracker::*},
    environment::AppState,
    tools::error::AppError,
    tracker::state::{FocusState, TrackerSnapshot},
};
use shared::tools::logger::*;

#[get("/ui/drivers/locations")]
async fn driver_locations(data: Data<AppState>) -> Result<Json<TrackerSnapshot>, AppError> {
    Ok(Json(tracker::driver_locations(data).await))
}

/// Server-sent events, one `data:` frame per applied change. A subscriber that falls behind the
/// broadcast buffer skips the missed changes and should refetch the snapshot.
#[get("/ui/drivers/stream")]
async fn driver_locations_stream(data: Data<AppState>) -> HttpResponse {
    let changes = BroadcastStream::new(data.tracker.changes()).filter_map(|change| async move {
        match change {
            Ok(change) => match serde_json::to_string(&change) {
                Ok(payload) => Some(Ok::<_, AppError>(Bytes::from(format!("data: {payload}\n\n")))),
                Err(err) => {
                    error!(tag = "[Tracker Stream Serialization Failed]", error = %err);
                    None
                }
            },
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!(tag = "[Tracker Stream Lagged]", skipped = skipped);
                None
            }
        }
    });

    HttpResponse::Ok()
        .content_type(mime::TEXT_EVENT_STREAM)
        .insert_header(CacheControl(vec![CacheDirective::NoCache]))
        .streaming(changes)
}

#[get("/ui/drivers/locations/{driverId}")]
async fn driver_location(
    data: Data<AppState>,
    path: Path<String>,
) -> Result<Json<DriverPosition>, AppError> {
    let driver_id = DriverId(path.into_inner());

    Ok(Json(tracker::driver_location(driver_id, data).await?))
}

#[post("/ui/drivers/focus/{driverId}")]
async fn focus_driver(
    data: Data<AppState>,
    path: Path<String>,
) -> Result<Json<FocusState>, AppError> {
    let driver_id = DriverId(path.into_inner());

    Ok(Json(tracker::focus_driver(driver_id, data).await))
}

#[get("/ui/drivers/focus")]
async fn focused_driver(data: Data<AppState>) -> Result<Json<FocusResponse>, AppError> {
    Ok(Json(tracker::focused_driver(data).await))
}
