/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
#![allow(clippy::expect_used)]

use actix_web::{web, App, HttpServer};
use delivery_tracking_service::{
    domain::api,
    environment::{AppConfig, AppState},
    middleware::*,
    scheduler::run_status_scheduler,
    tools::{error::AppError, prometheus::prometheus_metrics},
};
use shared::tools::logger::*;
use std::{
    env::var,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};
use tokio::signal::unix::{signal, SignalKind};
use tracing_actix_web::TracingLogger;

const APP_NAME: &str = "delivery-tracking-service";

pub fn read_dhall_config(config_path: &str) -> Result<AppConfig, String> {
    let config = serde_dhall::from_file(config_path).parse::<AppConfig>();
    match config {
        Ok(config) => Ok(config),
        Err(e) => Err(format!("Error reading config: {}", e)),
    }
}

#[actix_web::main]
async fn start_server() -> std::io::Result<()> {
    let dhall_config_path = var("DHALL_CONFIG")
        .unwrap_or_else(|_| "./dhall-configs/dev/delivery_tracking_service.dhall".to_string());
    let app_config = read_dhall_config(&dhall_config_path).unwrap_or_else(|err| {
        println!("Dhall Config Reading Error : {}", err);
        std::process::exit(1);
    });

    let _guard = setup_tracing(APP_NAME, app_config.logger_cfg);

    let port = app_config.port;
    let workers = app_config.workers;

    let redis_pool = app_config.redis_cfg.connect().await;
    let app_state = AppState::new(app_config, redis_pool.clone()).await;

    app_state
        .tracker
        .initialize(app_state.store.as_ref(), app_state.initial_fetch_limit)
        .await;

    let mut subscription = app_state
        .tracker
        .subscribe()
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err.message()))?;

    if let Some(channel) = app_state.change_channel.as_deref() {
        match redis_pool.subscriber().await {
            Ok(subscriber) => {
                if let Err(err) = subscription.bridge_redis(subscriber, channel).await {
                    error!(tag = "[Tracker Redis Bridge Failed]", channel = channel, error = %err.message());
                }
            }
            Err(err) => {
                error!(tag = "[Tracker Redis Bridge Failed]", channel = channel, error = %err.message());
            }
        }
    }

    let data = web::Data::new(app_state);

    let graceful_termination_requested = Arc::new(AtomicBool::new(false));
    let graceful_termination_requested_sigterm = graceful_termination_requested.to_owned();
    let graceful_termination_requested_sigint = graceful_termination_requested.to_owned();
    // Listen for SIGTERM signal.
    tokio::spawn(async move {
        let mut sigterm = signal(SignalKind::terminate()).expect("Failed to listen for SIGTERM");
        sigterm.recv().await;
        graceful_termination_requested_sigterm.store(true, Ordering::Relaxed);
    });
    // Listen for SIGINT (Ctrl+C) signal.
    tokio::spawn(async move {
        let mut ctrl_c = signal(SignalKind::interrupt()).expect("Failed to listen for SIGINT");
        ctrl_c.recv().await;
        graceful_termination_requested_sigint.store(true, Ordering::Relaxed);
    });

    let scheduler_thread = data.schedule_interval_secs.map(|interval_secs| {
        tokio::spawn(run_status_scheduler(
            data.clone(),
            interval_secs,
            graceful_termination_requested.clone(),
        ))
    });

    let server_data = data.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(server_data.clone())
            .app_data(
                web::JsonConfig::default()
                    .error_handler(|err, _| AppError::UnprocessibleRequest(err.to_string()).into()),
            )
            .app_data(
                web::PathConfig::default()
                    .error_handler(|err, _| AppError::InvalidRequest(err.to_string()).into()),
            )
            .wrap(CheckContentLength)
            .wrap(LogIncomingRequestBody)
            .wrap(RequestTimeout)
            .wrap(IncomingRequestMetrics)
            .wrap(TracingLogger::<DomainRootSpanBuilder>::new())
            .wrap(prometheus_metrics())
            .configure(api::handler)
    })
    .workers(workers)
    .bind(("0.0.0.0", port))?
    .run()
    .await?;

    graceful_termination_requested.store(true, Ordering::Relaxed);
    if let Some(scheduler_thread) = scheduler_thread {
        scheduler_thread
            .await
            .expect("Status scheduler thread panicked");
    }

    subscription.unsubscribe().await;
    redis_pool.close_connections().await;

    Ok(())
}

fn main() {
    start_server().expect("Failed to start the server");
}
