/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
#![allow(clippy::expect_used)]

use std::sync::Arc;

use crate::{
    common::types::*,
    redis::RedisClient,
    store::{postgrest::PostgrestStore, Store},
    tracker::Tracker,
};
use rdkafka::{error::KafkaError, producer::FutureProducer, ClientConfig};
use serde::{Deserialize, Serialize};
use shared::{
    redis::types::{RedisConnectionPool, RedisSettings},
    tools::logger::*,
};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub workers: usize,
    pub logger_cfg: LoggerConfig,
    pub redis_cfg: RedisConfig,
    pub store_cfg: StoreConfig,
    pub kafka_cfg: KafkaConfig,
    pub trip_status_update_topic: String,
    pub tracker_cfg: TrackerConfig,
    pub advancer_cfg: AdvancerConfig,
    pub request_timeout: u64,
    pub log_unprocessible_req_body: Vec<String>,
    pub max_allowed_req_size: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct KafkaConfig {
    pub kafka_key: String,
    pub kafka_host: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RedisConfig {
    pub redis_host: String,
    pub redis_port: u16,
    pub redis_pool_size: usize,
    pub redis_partition: usize,
    pub reconnect_max_attempts: u32,
    pub reconnect_delay: u32,
    pub default_ttl: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StoreConfig {
    pub base_url: String,
    pub api_key: String,
    pub request_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TrackerConfig {
    pub initial_fetch_limit: usize,
    /// Redis pub/sub channel carrying `driver_locations` change events; `None` disables the bridge.
    pub change_channel: Option<String>,
    pub event_buffer_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdvancerConfig {
    pub cron_secret: String,
    pub cron_secret_header: String,
    pub pending_cancel_after_mins: u32,
    pub in_progress_complete_after_mins: u32,
    pub order_confirm_after_mins: u32,
    pub order_ready_after_mins: u32,
    pub lock_expiry_secs: u32,
    pub earnings_policy: EarningsPolicy,
    pub schedule_interval_secs: Option<u64>,
}

/// Thresholds for the scheduled passes, in minutes from `created_at`.
#[derive(Debug, Clone, Copy)]
pub struct AdvancerSettings {
    pub pending_cancel_after_mins: u32,
    pub in_progress_complete_after_mins: u32,
    pub order_confirm_after_mins: u32,
    pub order_ready_after_mins: u32,
    pub earnings_policy: EarningsPolicy,
}

impl Default for AdvancerSettings {
    fn default() -> Self {
        AdvancerSettings {
            pending_cancel_after_mins: 5,
            in_progress_complete_after_mins: 60,
            order_confirm_after_mins: 5,
            order_ready_after_mins: 30,
            earnings_policy: EarningsPolicy::Accumulate,
        }
    }
}

impl From<&AdvancerConfig> for AdvancerSettings {
    fn from(cfg: &AdvancerConfig) -> Self {
        AdvancerSettings {
            pending_cancel_after_mins: cfg.pending_cancel_after_mins,
            in_progress_complete_after_mins: cfg.in_progress_complete_after_mins,
            order_confirm_after_mins: cfg.order_confirm_after_mins,
            order_ready_after_mins: cfg.order_ready_after_mins,
            earnings_policy: cfg.earnings_policy,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub redis: Arc<dyn RedisClient>,
    pub store: Arc<dyn Store>,
    pub tracker: Tracker,
    pub producer: Option<FutureProducer>,
    pub trip_status_update_topic: String,
    pub advancer: AdvancerSettings,
    pub cron_secret: String,
    pub cron_secret_header: String,
    pub lock_expiry_secs: u32,
    pub schedule_interval_secs: Option<u64>,
    pub initial_fetch_limit: usize,
    pub change_channel: Option<String>,
    pub max_allowed_req_size: usize,
    pub log_unprocessible_req_body: Vec<String>,
    pub request_timeout: u64,
}

impl RedisConfig {
    /// Connects the pool, aborting startup when Redis is unreachable.
    pub async fn connect(&self) -> Arc<RedisConnectionPool> {
        Arc::new(
            RedisConnectionPool::new(RedisSettings::new(
                self.redis_host.to_owned(),
                self.redis_port,
                self.redis_pool_size,
                self.redis_partition,
                self.reconnect_max_attempts,
                self.reconnect_delay,
                self.default_ttl,
            ))
            .await
            .expect("Failed to create Redis connection pool"),
        )
    }
}

impl AppState {
    pub async fn new(app_config: AppConfig, redis: Arc<dyn RedisClient>) -> AppState {
        let store: Arc<dyn Store> = Arc::new(
            PostgrestStore::new(&app_config.store_cfg).expect("Failed to create store client"),
        );

        let producer: Option<FutureProducer>;

        let result: Result<FutureProducer, KafkaError> = ClientConfig::new()
            .set(
                app_config.kafka_cfg.kafka_key,
                app_config.kafka_cfg.kafka_host,
            )
            .set("compression.type", "lz4")
            .create();

        match result {
            Ok(val) => {
                producer = Some(val);
            }
            Err(err) => {
                producer = None;
                info!(
                    tag = "[Kafka Connection]",
                    "Error connecting to kafka config: {err}"
                );
            }
        }

        AppState {
            redis,
            store,
            tracker: Tracker::new(app_config.tracker_cfg.event_buffer_size),
            producer,
            trip_status_update_topic: app_config.trip_status_update_topic,
            advancer: AdvancerSettings::from(&app_config.advancer_cfg),
            cron_secret: app_config.advancer_cfg.cron_secret,
            cron_secret_header: app_config.advancer_cfg.cron_secret_header,
            lock_expiry_secs: app_config.advancer_cfg.lock_expiry_secs,
            schedule_interval_secs: app_config.advancer_cfg.schedule_interval_secs,
            initial_fetch_limit: app_config.tracker_cfg.initial_fetch_limit,
            change_channel: app_config.tracker_cfg.change_channel,
            max_allowed_req_size: app_config.max_allowed_req_size,
            log_unprocessible_req_body: app_config.log_unprocessible_req_body,
            request_timeout: app_config.request_timeout,
        }
    }
}
