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

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    error_message: String,
    pub error_code: String,
}

#[macros::add_error]
pub enum RedisError {
    RedisConnectionError(String),
    SetFailed(String),
    SetExFailed(String),
    GetFailed(String),
    DeleteFailed(String),
    SubscribeError(String),
}

impl RedisError {
    fn error_message(&self) -> ErrorBody {
        ErrorBody {
            error_message: self.message(),
            error_code: self.code(),
        }
    }

    pub fn message(&self) -> String {
        match self {
            RedisError::RedisConnectionError(err) => format!("Redis Connection Error : {err}"),
            RedisError::SetFailed(err)
            | RedisError::SetExFailed(err)
            | RedisError::GetFailed(err)
            | RedisError::DeleteFailed(err)
            | RedisError::SubscribeError(err) => format!("Redis Error : {err}"),
        }
    }

    fn code(&self) -> String {
        match self {
            RedisError::RedisConnectionError(_) => "REDIS_CONNECTION_FAILED",
            RedisError::SetFailed(_) => "SET_FAILED",
            RedisError::SetExFailed(_) => "SET_EX_FAILED",
            RedisError::GetFailed(_) => "GET_FAILED",
            RedisError::DeleteFailed(_) => "DELETE_FAILED",
            RedisError::SubscribeError(_) => "SUBSCRIBE_FAILED",
        }
        .to_string()
    }
}

impl ResponseError for RedisError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(self.error_message())
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
