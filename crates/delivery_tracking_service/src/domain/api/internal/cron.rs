/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use actix_web::{
    route,
    web::{Data, Json},
    HttpRequest,
};

use crate::{
    common::types::RequestKind,
    domain::{action::internal::*, types::internal::cron::*},
    environment::AppState,
    tools::error::CronError,
};

fn cron_secret<'a>(req: &'a HttpRequest, data: &AppState) -> Option<&'a str> {
    req.headers()
        .get(data.cron_secret_header.as_str())
        .and_then(|secret| secret.to_str().ok())
}

#[route("/internal/cron/update-trips", method = "GET", method = "POST")]
async fn update_trips(
    req: HttpRequest,
    data: Data<AppState>,
) -> Result<Json<RequestPassResponse>, CronError> {
    let secret = cron_secret(&req, &data);

    Ok(Json(
        cron::update_requests(RequestKind::Trip, data.clone(), secret).await?,
    ))
}

#[route("/internal/cron/update-service-requests", method = "GET", method = "POST")]
async fn update_service_requests(
    req: HttpRequest,
    data: Data<AppState>,
) -> Result<Json<RequestPassResponse>, CronError> {
    let secret = cron_secret(&req, &data);

    Ok(Json(
        cron::update_requests(RequestKind::ServiceRequest, data.clone(), secret).await?,
    ))
}

#[route("/internal/cron/update-orders", method = "GET", method = "POST")]
async fn update_orders(
    req: HttpRequest,
    data: Data<AppState>,
) -> Result<Json<OrderPassResponse>, CronError> {
    let secret = cron_secret(&req, &data);

    Ok(Json(cron::update_orders(data.clone(), secret).await?))
}
