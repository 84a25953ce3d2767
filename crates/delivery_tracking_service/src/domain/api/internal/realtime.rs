/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use actix_web::{
    post,
    web::{Data, Json},
};
use serde_json::Value;

use crate::{
    domain::{action::internal::*, types::internal::realtime::*},
    environment::AppState,
    tools::error::AppError,
};

/// Database webhook target for `driver_locations` changes.
#[post("/internal/realtime/driver_locations")]
async fn driver_location_changes(
    data: Data<AppState>,
    param_obj: Json<Value>,
) -> Result<Json<IngestResponse>, AppError> {
    let request_body = param_obj.into_inner();

    Ok(Json(
        realtime::ingest_change_events(data, request_body).await?,
    ))
}
