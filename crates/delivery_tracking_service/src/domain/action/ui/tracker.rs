/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::{
    common::types::{DriverId, DriverPosition},
    domain::types::ui::tracker::*,
    environment::AppState,
    tools::error::AppError,
    tracker::state::{FocusState, TrackerSnapshot},
};
use actix_web::web::Data;

pub async fn driver_locations(data: Data<AppState>) -> TrackerSnapshot {
    data.tracker.snapshot().await
}

pub async fn driver_location(
    driver_id: DriverId,
    data: Data<AppState>,
) -> Result<DriverPosition, AppError> {
    data.tracker
        .position(&driver_id)
        .await
        .ok_or(AppError::DriverNotTracked(driver_id.0))
}

/// Focusing a driver without a known position is allowed; `flyTo` is filled once one arrives.
pub async fn focus_driver(driver_id: DriverId, data: Data<AppState>) -> FocusState {
    data.tracker.focus(driver_id).await
}

pub async fn focused_driver(data: Data<AppState>) -> FocusResponse {
    FocusResponse {
        focus: data.tracker.focused().await,
    }
}
