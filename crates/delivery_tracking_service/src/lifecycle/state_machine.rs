/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::{common::types::*, tools::error::AppError};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, Display, EnumString, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RequestAction {
    Accept,
    Start,
    Complete,
    Cancel,
}

/// ```text
/// pending --accept--> accepted --start--> in_progress --complete--> completed
/// pending | accepted --cancel--> cancelled
/// ```
/// `completed` and `cancelled` are terminal.
pub fn next_status(
    current: RequestStatus,
    action: RequestAction,
) -> Result<RequestStatus, AppError> {
    match (current, action) {
        (RequestStatus::Pending, RequestAction::Accept) => Ok(RequestStatus::Accepted),
        (RequestStatus::Accepted, RequestAction::Start) => Ok(RequestStatus::InProgress),
        (RequestStatus::InProgress, RequestAction::Complete) => Ok(RequestStatus::Completed),
        (RequestStatus::Pending | RequestStatus::Accepted, RequestAction::Cancel) => {
            Ok(RequestStatus::Cancelled)
        }
        (current, action) => Err(AppError::InvalidStatusTransition(
            current.to_string(),
            action.to_string(),
        )),
    }
}

pub fn next_order_status(current: OrderStatus) -> Option<OrderStatus> {
    match current {
        OrderStatus::Pending => Some(OrderStatus::Confirmed),
        OrderStatus::Confirmed => Some(OrderStatus::Preparing),
        OrderStatus::Preparing => Some(OrderStatus::Ready),
        OrderStatus::Ready => Some(OrderStatus::Delivered),
        OrderStatus::Delivered | OrderStatus::Cancelled => None,
    }
}
