/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use actix_web::{
    http::{header::ContentType, StatusCode},
    HttpResponse, ResponseError,
};
use serde::{Deserialize, Serialize};
use shared::redis::error::RedisError;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    error_message: String,
    pub error_code: String,
}

#[macros::add_error]
pub enum AppError {
    InternalError(String),
    InvalidRequest(String),
    UnprocessibleRequest(String),
    LargePayloadSize(usize, usize),
    RequestTimeout,
    ExternalAPICallError(String),
    SerializationError(String),
    DeserializationError(String),
    RequestNotFound(String),
    InvalidStatusTransition(String, String),
    StatusChanged(String),
    MalformedChangeEvent(String),
    TrackerAlreadySubscribed,
    TrackerNotSubscribed,
    DriverNotTracked(String),
}

impl AppError {
    fn error_message(&self) -> ErrorBody {
        ErrorBody {
            error_message: self.message(),
            error_code: self.code(),
        }
    }

    pub fn message(&self) -> String {
        match self {
            AppError::InternalError(err) => err.to_string(),
            AppError::InvalidRequest(err) => err.to_string(),
            AppError::UnprocessibleRequest(err) => err.to_string(),
            AppError::LargePayloadSize(length, limit) => {
                format!("Content length ({length} Bytes) greater than allowed maximum limit : ({limit} Bytes)")
            }
            AppError::ExternalAPICallError(err) => err.to_string(),
            AppError::SerializationError(err) => err.to_string(),
            AppError::DeserializationError(err) => err.to_string(),
            AppError::RequestNotFound(id) => format!("Request not found : {id}"),
            AppError::InvalidStatusTransition(status, action) => {
                format!("Cannot {action} a request in status {status}")
            }
            AppError::StatusChanged(id) => {
                format!("Request {id} changed status before the update was applied")
            }
            AppError::MalformedChangeEvent(reason) => format!("Malformed change event : {reason}"),
            AppError::TrackerAlreadySubscribed => {
                "Tracker already holds an open change subscription".to_string()
            }
            AppError::TrackerNotSubscribed => "Tracker is not accepting change events".to_string(),
            AppError::DriverNotTracked(driver_id) => {
                format!("No known position for driver : {driver_id}")
            }
            _ => "Some Error Occured".to_string(),
        }
    }

    fn code(&self) -> String {
        match self {
            AppError::InternalError(_) => "INTERNAL_ERROR",
            AppError::InvalidRequest(_) => "INVALID_REQUEST",
            AppError::UnprocessibleRequest(_) => "UNPROCESSIBLE_REQUEST",
            AppError::LargePayloadSize(_, _) => "LARGE_PAYLOAD_SIZE",
            AppError::RequestTimeout => "REQUEST_TIMEOUT",
            AppError::ExternalAPICallError(_) => "EXTERNAL_API_CALL_ERROR",
            AppError::SerializationError(_) => "SERIALIZATION_ERROR",
            AppError::DeserializationError(_) => "DESERIALIZATION_ERROR",
            AppError::RequestNotFound(_) => "REQUEST_NOT_FOUND",
            AppError::InvalidStatusTransition(_, _) => "INVALID_STATUS_TRANSITION",
            AppError::StatusChanged(_) => "STATUS_CHANGED",
            AppError::MalformedChangeEvent(_) => "MALFORMED_CHANGE_EVENT",
            AppError::TrackerAlreadySubscribed => "TRACKER_ALREADY_SUBSCRIBED",
            AppError::TrackerNotSubscribed => "TRACKER_NOT_SUBSCRIBED",
            AppError::DriverNotTracked(_) => "DRIVER_NOT_TRACKED",
        }
        .to_string()
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(self.error_message())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UnprocessibleRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::LargePayloadSize(_, _) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            AppError::ExternalAPICallError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::DeserializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::RequestNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidStatusTransition(_, _) => StatusCode::BAD_REQUEST,
            AppError::StatusChanged(_) => StatusCode::CONFLICT,
            AppError::MalformedChangeEvent(_) => StatusCode::BAD_REQUEST,
            AppError::TrackerAlreadySubscribed => StatusCode::CONFLICT,
            AppError::TrackerNotSubscribed => StatusCode::SERVICE_UNAVAILABLE,
            AppError::DriverNotTracked(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl From<RedisError> for AppError {
    fn from(error: RedisError) -> Self {
        AppError::InternalError(error.message())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CronErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Failures of the scheduled status passes, answered with an `{error, message}` body.
#[macros::add_error]
pub enum CronError {
    Unauthorized,
    PassInProgress(String),
    PassFailed(String),
}

impl CronError {
    fn error_body(&self) -> CronErrorBody {
        match self {
            CronError::Unauthorized => CronErrorBody {
                error: "Unauthorized".to_string(),
                message: None,
            },
            CronError::PassInProgress(job) => CronErrorBody {
                error: "Cron job already running".to_string(),
                message: Some(format!("Another {job} pass holds the lock")),
            },
            CronError::PassFailed(reason) => CronErrorBody {
                error: "Cron job failed".to_string(),
                message: Some(reason.to_string()),
            },
        }
    }
}

impl ResponseError for CronError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(self.error_body())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            CronError::Unauthorized => StatusCode::UNAUTHORIZED,
            CronError::PassInProgress(_) => StatusCode::CONFLICT,
            CronError::PassFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AppError> for CronError {
    fn from(error: AppError) -> Self {
        CronError::PassFailed(error.message())
    }
}

impl From<RedisError> for CronError {
    fn from(error: RedisError) -> Self {
        CronError::PassFailed(error.message())
    }
}
