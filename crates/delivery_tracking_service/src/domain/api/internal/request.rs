/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use actix_web::{
    post,
    web::{Data, Json, Path},
};

use crate::{
    common::types::*,
    domain::{action::internal::*, types::internal::request::*},
    environment::AppState,
    lifecycle::state_machine::RequestAction,
    tools::error::AppError,
};

#[post("/internal/{kind}/{requestId}/accept")]
async fn accept(
    data: Data<AppState>,
    param_obj: Json<AcceptRequest>,
    path: Path<(RequestKind, String)>,
) -> Result<Json<LifecycleRecord>, AppError> {
    let AcceptRequest { driver_id } = param_obj.into_inner();
    let (kind, request_id) = path.into_inner();

    Ok(Json(
        request::transition_request(
            kind,
            RequestId(request_id),
            RequestAction::Accept,
            Some(driver_id),
            data,
        )
        .await?,
    ))
}

#[post("/internal/{kind}/{requestId}/start")]
async fn start(
    data: Data<AppState>,
    path: Path<(RequestKind, String)>,
) -> Result<Json<LifecycleRecord>, AppError> {
    let (kind, request_id) = path.into_inner();

    Ok(Json(
        request::transition_request(
            kind,
            RequestId(request_id),
            RequestAction::Start,
            None,
            data,
        )
        .await?,
    ))
}

#[post("/internal/{kind}/{requestId}/complete")]
async fn complete(
    data: Data<AppState>,
    path: Path<(RequestKind, String)>,
) -> Result<Json<LifecycleRecord>, AppError> {
    let (kind, request_id) = path.into_inner();

    Ok(Json(
        request::transition_request(
            kind,
            RequestId(request_id),
            RequestAction::Complete,
            None,
            data,
        )
        .await?,
    ))
}

#[post("/internal/{kind}/{requestId}/cancel")]
async fn cancel(
    data: Data<AppState>,
    path: Path<(RequestKind, String)>,
) -> Result<Json<LifecycleRecord>, AppError> {
    let (kind, request_id) = path.into_inner();

    Ok(Json(
        request::transition_request(
            kind,
            RequestId(request_id),
            RequestAction::Cancel,
            None,
            data,
        )
        .await?,
    ))
}
