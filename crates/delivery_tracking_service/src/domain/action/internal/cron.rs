/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use std::future::Future;

use crate::{
    common::types::*,
    domain::types::internal::cron::*,
    environment::AppState,
    kafka::{
        producers::{kafka_stream_order_updates, kafka_stream_request_updates},
        types::TransitionSource,
    },
    lifecycle::{advancer::advance_requests, orders::advance_orders},
    redis::commands::{acquire_status_pass_lock, release_status_pass_lock, LockToken},
    status_pass_latency,
    tools::error::CronError,
};
use actix_web::web::Data;
use chrono::Utc;
use shared::tools::logger::*;
use tokio::time::Instant;
use tracing::{Instrument, Span};

pub const ORDERS_JOB: &str = "orders";

/// The configured secret must be non-empty and match the header exactly.
pub fn authorize(cron_secret: &str, provided: Option<&str>) -> Result<(), CronError> {
    match provided {
        Some(provided) if !cron_secret.is_empty() && provided == cron_secret => Ok(()),
        _ => Err(CronError::Unauthorized),
    }
}

/// Runs a pass on its own task. Dropping the returned future (client disconnect, request timeout)
/// leaves the pass running to completion, so its lock is always released.
pub async fn detach_pass<F, T>(pass: F) -> Result<T, CronError>
where
    F: Future<Output = Result<T, CronError>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(pass.instrument(Span::current()))
        .await
        .map_err(|err| CronError::PassFailed(err.to_string()))?
}

async fn acquire(data: &AppState, job: &str) -> Result<LockToken, CronError> {
    acquire_status_pass_lock(data.redis.as_ref(), job, data.lock_expiry_secs)
        .await?
        .ok_or_else(|| CronError::PassInProgress(job.to_string()))
}

async fn release(data: &AppState, job: &str, token: &LockToken) {
    match release_status_pass_lock(data.redis.as_ref(), job, token).await {
        Ok(true) => {}
        Ok(false) => {
            warn!(tag = "[Status Pass Lock Lost]", job = job, "Lock expired before the pass finished")
        }
        Err(err) => {
            error!(tag = "[Status Pass Lock Release Failed]", job = job, error = %err.message())
        }
    }
}

/// Runs one trip or service-request pass under the Redis lock for its table and publishes every
/// transition it made.
pub async fn run_request_pass(
    data: Data<AppState>,
    kind: RequestKind,
) -> Result<RequestPassResponse, CronError> {
    detach_pass(request_pass(data, kind)).await
}

async fn request_pass(
    data: Data<AppState>,
    kind: RequestKind,
) -> Result<RequestPassResponse, CronError> {
    let job = kind.table();
    let token = acquire(&data, job).await?;

    let start = Instant::now();
    let result = advance_requests(
        data.store.as_ref(),
        kind,
        &data.advancer,
        TimeStamp(Utc::now()),
    )
    .await;
    release(&data, job, &token).await;

    let outcome = match result {
        Ok(outcome) => {
            status_pass_latency!(job, "success", start);
            outcome
        }
        Err(err) => {
            status_pass_latency!(job, "failure", start);
            error!(tag = "[Status Pass Failed]", job = job, error = %err.message());
            return Err(err.into());
        }
    };

    for records in [&outcome.cancelled, &outcome.completed] {
        kafka_stream_request_updates(
            &data.producer,
            &data.trip_status_update_topic,
            kind,
            records,
            TransitionSource::Advancer,
        )
        .await;
    }

    info!(tag = "[Status Pass Completed]", job = job, cancelled = outcome.cancelled.len(), completed = outcome.completed.len());

    Ok(RequestPassResponse {
        success: true,
        message: format!("{} statuses updated successfully", kind.label()),
        cancelled_count: outcome.cancelled.len(),
        completed_count: outcome.completed.len(),
        timestamp: TimeStamp(Utc::now()),
    })
}

pub async fn run_order_pass(data: Data<AppState>) -> Result<OrderPassResponse, CronError> {
    detach_pass(order_pass(data)).await
}

async fn order_pass(data: Data<AppState>) -> Result<OrderPassResponse, CronError> {
    let token = acquire(&data, ORDERS_JOB).await?;

    let start = Instant::now();
    let result = advance_orders(data.store.as_ref(), &data.advancer, TimeStamp(Utc::now())).await;
    release(&data, ORDERS_JOB, &token).await;

    let outcome = match result {
        Ok(outcome) => {
            status_pass_latency!(ORDERS_JOB, "success", start);
            outcome
        }
        Err(err) => {
            status_pass_latency!(ORDERS_JOB, "failure", start);
            error!(tag = "[Status Pass Failed]", job = ORDERS_JOB, error = %err.message());
            return Err(err.into());
        }
    };

    for orders in [&outcome.confirmed, &outcome.ready] {
        kafka_stream_order_updates(
            &data.producer,
            &data.trip_status_update_topic,
            orders,
            TransitionSource::Advancer,
        )
        .await;
    }

    info!(tag = "[Status Pass Completed]", job = ORDERS_JOB, confirmed = outcome.confirmed.len(), ready = outcome.ready.len());

    Ok(OrderPassResponse {
        success: true,
        message: "Order statuses updated successfully".to_string(),
        updated_count: outcome.updated_count(),
        timestamp: TimeStamp(Utc::now()),
    })
}

pub async fn update_requests(
    kind: RequestKind,
    data: Data<AppState>,
    secret: Option<&str>,
) -> Result<RequestPassResponse, CronError> {
    authorize(&data.cron_secret, secret)?;
    run_request_pass(data, kind).await
}

pub async fn update_orders(
    data: Data<AppState>,
    secret: Option<&str>,
) -> Result<OrderPassResponse, CronError> {
    authorize(&data.cron_secret, secret)?;
    run_order_pass(data).await
}
