/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::tools::error::AppError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::call_external_api;
use std::fmt::Debug;
use std::str::FromStr;
use tracing::{error, info};

/// Sends an HTTP request through `client` and deserializes the JSON response into `T`.
///
/// An empty success body (`204 No Content`, or a `return=minimal` write) is read as JSON `null`,
/// so `T = ()` or `Option<_>` can be used for calls that return nothing. Non-2xx responses become
/// `AppError::ExternalAPICallError` carrying the status and the response body.
///
/// # Arguments
///
/// * `client` - Shared client; connection pooling and timeouts are configured on it.
/// * `method` - The HTTP method (e.g., GET, POST) for the request.
/// * `url` - A reference to the target URL for the request.
/// * `headers` - A vector containing tuples of header key-value pairs.
/// * `body` - An optional request body. If provided, it will be serialized to JSON.
pub async fn call_api<T, U>(
    client: &Client,
    method: Method,
    url: &Url,
    headers: Vec<(&str, &str)>,
    body: Option<U>,
) -> Result<T, AppError>
where
    T: DeserializeOwned,
    U: Serialize + Debug,
{
    let start_time = std::time::Instant::now();

    let mut header_map = HeaderMap::new();

    for (header_key, header_value) in headers {
        let header_name = HeaderName::from_str(header_key)
            .map_err(|_| AppError::InvalidRequest(format!("Invalid Header Name : {header_key}")))?;
        let header_value = HeaderValue::from_str(header_value).map_err(|_| {
            AppError::InvalidRequest(format!("Invalid Header Value For : {header_key}"))
        })?;

        header_map.insert(header_name, header_value);
    }

    let mut request = client
        .request(method.to_owned(), url.to_owned())
        .headers(header_map);

    if let Some(body) = &body {
        let body = serde_json::to_string(body)
            .map_err(|err| AppError::SerializationError(err.to_string()))?;
        request = request
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);
    }

    let resp = request.send().await;

    let url_str = format!(
        "{}://{}:{}",
        url.scheme(),
        url.host_str().unwrap_or(""),
        url.port_or_known_default().unwrap_or(80)
    );

    let status = match resp.as_ref() {
        Ok(resp) => resp.status().as_str().to_string(),
        Err(err) if err.is_timeout() => "TIMEOUT".to_string(),
        Err(err) => err
            .status()
            .map(|status| status.to_string())
            .unwrap_or("UNKNOWN".to_string()),
    };

    call_external_api!(
        method.as_str(),
        url_str.as_str(),
        url.path(),
        status.as_str(),
        start_time
    );

    match resp {
        Ok(resp) => {
            let resp_status = resp.status();
            let resp_body = resp
                .bytes()
                .await
                .map_err(|err| AppError::ExternalAPICallError(err.to_string()))?;

            if resp_status.is_success() {
                info!(tag = "[OUTGOING API]", request_method = %method, request_url = %url, response_status = %resp_status, latency = format!("{:?}ms", start_time.elapsed().as_millis()));
                let resp_body: &[u8] = if resp_body.is_empty() {
                    b"null"
                } else {
                    &resp_body
                };
                serde_json::from_slice::<T>(resp_body)
                    .map_err(|err| AppError::DeserializationError(err.to_string()))
            } else {
                let resp_body = String::from_utf8_lossy(&resp_body);
                error!(tag = "[OUTGOING API - ERROR]", request_method = %method, request_body = format!("{:?}", body), request_url = %url, response_status = %resp_status, error = %resp_body, latency = format!("{:?}ms", start_time.elapsed().as_millis()));
                Err(AppError::ExternalAPICallError(format!(
                    "{resp_status} : {resp_body}"
                )))
            }
        }
        Err(err) => {
            error!(tag = "[OUTGOING API - ERROR]", request_method = %method, request_body = format!("{:?}", body), request_url = %url, error = format!("{:?}", err), latency = format!("{:?}ms", start_time.elapsed().as_millis()));
            Err(AppError::ExternalAPICallError(err.to_string()))
        }
    }
}
