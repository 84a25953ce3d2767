/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
#![allow(clippy::expect_used)]

use actix_web_prom::PrometheusMetrics;
use prometheus::{
    opts, register_histogram_vec, register_int_counter_vec, register_int_gauge, HistogramVec,
    IntCounterVec, IntGauge,
};
pub use shared::tools::prometheus::*;

pub static INCOMING_API: once_cell::sync::Lazy<HistogramVec> = once_cell::sync::Lazy::new(|| {
    register_histogram_vec!(
        opts!("http_request_duration_seconds", "Incoming API requests").into(),
        &["method", "handler", "status_code", "code", "version"]
    )
    .expect("Failed to register incoming API metrics")
});

pub static TRACKER_EVENTS: once_cell::sync::Lazy<IntCounterVec> =
    once_cell::sync::Lazy::new(|| {
        register_int_counter_vec!(
            opts!("tracker_events", "Driver location change events by outcome"),
            &["outcome"]
        )
        .expect("Failed to register tracker events metrics")
    });

pub static TRACKED_DRIVERS: once_cell::sync::Lazy<IntGauge> = once_cell::sync::Lazy::new(|| {
    register_int_gauge!("tracked_drivers", "Drivers with a known position")
        .expect("Failed to register tracked drivers metrics")
});

pub static LIFECYCLE_TRANSITIONS: once_cell::sync::Lazy<IntCounterVec> =
    once_cell::sync::Lazy::new(|| {
        register_int_counter_vec!(
            opts!("lifecycle_transitions", "Status transitions applied to stored records"),
            &["entity", "status", "source"]
        )
        .expect("Failed to register lifecycle transitions metrics")
    });

pub static STATUS_PASS_DURATION: once_cell::sync::Lazy<HistogramVec> =
    once_cell::sync::Lazy::new(|| {
        register_histogram_vec!(
            opts!("status_pass_duration_seconds", "Scheduled status pass latency").into(),
            &["job", "result"]
        )
        .expect("Failed to register status pass duration metrics")
    });

/// Macro that observes the duration of incoming API requests and logs metrics related to the request.
///
/// # Arguments
///
/// * `$method` - The HTTP method of the request (e.g., GET, POST).
/// * `$endpoint` - The endpoint or route of the request.
/// * `$status` - The HTTP status code of the response.
/// * `$code` - A specific code detailing more about the response, if available.
/// * `$start` - The time when the request was received. This is used to calculate the request duration.
#[macro_export]
macro_rules! incoming_api {
    ($method:expr, $endpoint:expr, $status:expr, $code:expr, $start:expr) => {
        let duration = $start.elapsed().as_secs_f64();
        let version = std::env::var("DEPLOYMENT_VERSION").unwrap_or("DEV".to_string());
        $crate::tools::prometheus::INCOMING_API
            .with_label_values(&[$method, $endpoint, $status, $code, version.as_str()])
            .observe(duration);
    };
}

#[macro_export]
macro_rules! status_pass_latency {
    ($job:expr, $result:expr, $start:expr) => {
        let duration = $start.elapsed().as_secs_f64();
        $crate::tools::prometheus::STATUS_PASS_DURATION
            .with_label_values(&[$job, $result])
            .observe(duration);
    };
}

/// Initializes and returns a `PrometheusMetrics` instance serving `/metrics`, with every service
/// metric registered on top of the shared ones.
///
/// # Panics
///
/// * If a metric cannot be registered to the Prometheus registry.
pub fn prometheus_metrics() -> PrometheusMetrics {
    let prometheus = init_prometheus_metrics();

    prometheus
        .registry
        .register(Box::new(INCOMING_API.to_owned()))
        .expect("Failed to register incoming API metrics");

    prometheus
        .registry
        .register(Box::new(TRACKER_EVENTS.to_owned()))
        .expect("Failed to register tracker events metrics");

    prometheus
        .registry
        .register(Box::new(TRACKED_DRIVERS.to_owned()))
        .expect("Failed to register tracked drivers metrics");

    prometheus
        .registry
        .register(Box::new(LIFECYCLE_TRANSITIONS.to_owned()))
        .expect("Failed to register lifecycle transitions metrics");

    prometheus
        .registry
        .register(Box::new(STATUS_PASS_DURATION.to_owned()))
        .expect("Failed to register status pass duration metrics");

    prometheus
}
