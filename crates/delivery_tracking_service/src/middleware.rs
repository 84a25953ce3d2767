/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use std::{rc::Rc, time::Duration};

use crate::incoming_api;
use crate::tools::prometheus::INCOMING_API;
use actix::fut::{ready, Ready};
use actix_http::{h1, header::CONTENT_LENGTH, StatusCode};
use actix_web::{
    body::{BoxBody, MessageBody},
    dev::{self, forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web::{self, Bytes, Data},
    Error, HttpRequest,
};
use futures::future::LocalBoxFuture;
use tokio::time::{timeout, Instant};
use tracing::Span;
use tracing::{error, info, warn};
use tracing_actix_web::{DefaultRootSpanBuilder, RootSpanBuilder};
use uuid::Uuid;

use crate::{environment::AppState, tools::error::AppError};

/// Routes whose handlers own work that must not be cut off halfway.
const UNBOUNDED_PATH_PREFIXES: [&str; 1] = ["/internal/cron/"];

/// Fails a request with `RequestTimeout` when the handler does not produce a response head within
/// `request_timeout` milliseconds. Streaming bodies are not bounded once the head is sent, and
/// status passes under `/internal/cron/` run to completion.
pub struct RequestTimeout;

impl<S: 'static> Transform<S, ServiceRequest> for RequestTimeout
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error>,
    S::Future: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestTimeoutMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestTimeoutMiddleware { service }))
    }
}

pub struct RequestTimeoutMiddleware<S> {
    service: S,
}

impl<S> Service<ServiceRequest> for RequestTimeoutMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let request_timeout = req
            .app_data::<Data<AppState>>()
            .filter(|_| {
                !UNBOUNDED_PATH_PREFIXES
                    .iter()
                    .any(|prefix| req.path().starts_with(prefix))
            })
            .map(|data| Duration::from_millis(data.request_timeout));

        let fut = self.service.call(req);
        match request_timeout {
            Some(request_timeout) => Box::pin(async move {
                timeout(request_timeout, fut)
                    .await
                    .map_err(|_| actix_web::Error::from(AppError::RequestTimeout))?
            }),
            None => Box::pin(fut),
        }
    }
}

/// Root span carrying the caller supplied `x-request-id`, or a fresh one when absent.
pub struct DomainRootSpanBuilder;

impl RootSpanBuilder for DomainRootSpanBuilder {
    fn on_request_start(request: &ServiceRequest) -> Span {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|request_id| request_id.to_str().ok())
            .map(|str| str.to_string())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        tracing_actix_web::root_span!(request, request_id)
    }

    fn on_request_end<B: MessageBody>(span: Span, outcome: &Result<ServiceResponse<B>, Error>) {
        DefaultRootSpanBuilder::on_request_end(span, outcome);
    }
}

/// Logs every request with its latency and records it in the `http_request_duration_seconds`
/// histogram, labelled by the route template rather than the concrete path.
pub struct IncomingRequestMetrics;

impl<S> Transform<S, ServiceRequest> for IncomingRequestMetrics
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error>,
    S::Future: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = IncomingRequestMetricsMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(IncomingRequestMetricsMiddleware { service }))
    }
}

pub struct IncomingRequestMetricsMiddleware<S> {
    service: S,
}

impl<S> Service<ServiceRequest> for IncomingRequestMetricsMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error>,
    S::Future: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start_time = Instant::now();
        let request_meta = RequestMeta::from(req.request());

        let fut = self.service.call(req);
        Box::pin(async move {
            match fut.await {
                Ok(response) => {
                    calculate_metrics(
                        response.response().error(),
                        response.status(),
                        RequestMeta::from(response.request()),
                        start_time,
                    );
                    Ok(response)
                }
                Err(err) => {
                    let err_resp_status = err.error_response().status();
                    calculate_metrics(Some(&err), err_resp_status, request_meta, start_time);
                    Err(err)
                }
            }
        })
    }
}

/// Buffers the request body and logs it when the handler fails with one of the error codes listed
/// in `log_unprocessible_req_body`.
pub struct LogIncomingRequestBody;

impl<S: 'static> Transform<S, ServiceRequest> for LogIncomingRequestBody
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error>,
    S::Future: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = LogIncomingRequestBodyMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(LogIncomingRequestBodyMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct LogIncomingRequestBodyMiddleware<S> {
    service: Rc<S>,
}

impl<S> Service<ServiceRequest> for LogIncomingRequestBodyMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let svc = self.service.clone();
        Box::pin(async move {
            let logged_error_codes = req
                .app_data::<Data<AppState>>()
                .map_or(vec![], |data| data.log_unprocessible_req_body.to_owned());

            if logged_error_codes.is_empty() {
                return svc.call(req).await;
            }

            let body = req.extract::<web::Bytes>().await?;
            req.set_payload(bytes_to_payload(body.clone()));

            match svc.call(req).await {
                Ok(response) => {
                    if let Some(err_resp) = response.response().error() {
                        log_request_body(&logged_error_codes, err_resp, &body);
                    }
                    Ok(response)
                }
                Err(err_resp) => {
                    log_request_body(&logged_error_codes, &err_resp, &body);
                    Err(err_resp)
                }
            }
        })
    }
}

fn bytes_to_payload(buf: web::Bytes) -> dev::Payload {
    let (_, mut pl) = h1::Payload::create(true);
    pl.unread_data(buf);
    dev::Payload::from(pl)
}

/// Request fields attached to the incoming API log line.
struct RequestMeta {
    method: String,
    path: String,
    headers: String,
}

impl From<&HttpRequest> for RequestMeta {
    fn from(request: &HttpRequest) -> Self {
        // `/internal/trips/abc/accept` is reported as `/internal/:kind/:requestId/accept`.
        let mut path = request.path().to_string();
        request
            .match_info()
            .iter()
            .for_each(|(path_name, path_val)| {
                path = path.replace(path_val, format!(":{path_name}").as_str());
            });

        let secret_header = request
            .app_data::<Data<AppState>>()
            .map(|data| data.cron_secret_header.to_ascii_lowercase());

        let headers = request
            .headers()
            .iter()
            .map(|(name, value)| {
                if Some(name.as_str()) == secret_header.as_deref() {
                    format!("{name}: <redacted>")
                } else {
                    format!("{name}: {value:?}")
                }
            })
            .collect::<Vec<_>>()
            .join(", ");

        RequestMeta {
            method: request.method().to_string(),
            path,
            headers,
        }
    }
}

fn calculate_metrics(
    err_resp: Option<&Error>,
    resp_status: StatusCode,
    request: RequestMeta,
    time: Instant,
) {
    let RequestMeta {
        method,
        path,
        headers,
    } = request;

    if let Some(err_resp) = err_resp {
        let err_resp_code = err_resp.to_string();
        error!(tag = "[INCOMING API - ERROR]", request_method = %method, request_path = %path, request_headers = headers, response_code = err_resp_code, response_status = resp_status.as_str(), latency = format!("{:?}ms", time.elapsed().as_millis()));
        incoming_api!(
            method.as_str(),
            path.as_str(),
            resp_status.as_str(),
            err_resp_code.as_str(),
            time
        );
    } else {
        info!(tag = "[INCOMING API]", request_method = %method, request_path = %path, request_headers = headers, response_status = resp_status.as_str(), latency = format!("{:?}ms", time.elapsed().as_millis()));
        incoming_api!(
            method.as_str(),
            path.as_str(),
            resp_status.as_str(),
            "SUCCESS",
            time
        );
    }
}

fn log_request_body(err_codes: &[String], err_resp: &Error, request_body: &Bytes) {
    if err_codes.contains(&err_resp.to_string()) {
        warn!(tag = "[Unprocessible Request Body]", error_code = %err_resp, "Raw Request Body: {:?}", request_body);
    }
}

/// Rejects requests whose `Content-Length` exceeds `max_allowed_req_size` before the body is read.
pub struct CheckContentLength;

impl<S> Transform<S, ServiceRequest> for CheckContentLength
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error>,
    S::Future: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = CheckContentLengthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CheckContentLengthMiddleware { service }))
    }
}

pub struct CheckContentLengthMiddleware<S> {
    service: S,
}

impl<S> Service<ServiceRequest> for CheckContentLengthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error>,
    S::Future: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let content_length = req
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|content_length| content_length.to_str().ok()?.parse::<usize>().ok());
        let limit = req
            .app_data::<Data<AppState>>()
            .map(|data| data.max_allowed_req_size);

        let fut = self.service.call(req);
        Box::pin(async move {
            match (content_length, limit) {
                (Some(content_length), Some(limit)) if content_length > limit => Err(
                    actix_web::Error::from(AppError::LargePayloadSize(content_length, limit)),
                ),
                _ => fut.await,
            }
        })
    }
}
