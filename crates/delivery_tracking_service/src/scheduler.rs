/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use actix_web::web::Data;
use shared::tools::logger::*;
use tokio::time::{interval, MissedTickBehavior};

use crate::{
    common::types::RequestKind,
    domain::action::internal::cron::{run_order_pass, run_request_pass, ORDERS_JOB},
    environment::AppState,
    tools::error::CronError,
};

const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_secs(1);

fn log_pass_failure(job: &str, err: CronError) {
    match err {
        CronError::PassInProgress(_) => {
            info!(tag = "[Scheduled Pass Skipped]", job = job, "Another pass holds the lock")
        }
        err => error!(tag = "[Scheduled Pass Failed]", job = job, error = %err),
    }
}

async fn run_status_passes(data: &Data<AppState>) {
    for kind in [RequestKind::Trip, RequestKind::ServiceRequest] {
        if let Err(err) = run_request_pass(data.clone(), kind).await {
            log_pass_failure(kind.table(), err);
        }
    }

    if let Err(err) = run_order_pass(data.clone()).await {
        log_pass_failure(ORDERS_JOB, err);
    }
}

/// Runs the trip, service-request and order passes every `interval_secs` until termination is
/// requested. Passes take the same Redis locks as the cron endpoints, so an external scheduler can
/// run alongside.
pub async fn run_status_scheduler(
    data: Data<AppState>,
    interval_secs: u64,
    graceful_termination_requested: Arc<AtomicBool>,
) {
    let mut timer = interval(Duration::from_secs(interval_secs.max(1)));
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut shutdown_poll = interval(SHUTDOWN_POLL_INTERVAL);

    info!(tag = "[Status Scheduler Started]", interval_secs = interval_secs);

    loop {
        if graceful_termination_requested.load(Ordering::Relaxed) {
            info!(tag = "[Graceful Shutting Down]", "Status scheduler stopped");
            break;
        }
        tokio::select! {
            _ = timer.tick() => run_status_passes(&data).await,
            _ = shutdown_poll.tick() => {},
        }
    }
}
