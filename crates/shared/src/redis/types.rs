/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use fred::{
    clients::{RedisPool, SubscriberClient},
    interfaces::ClientLike,
    types::{Builder, ConnectHandle, ReconnectPolicy, RedisConfig, RespVersion},
};
use serde::Deserialize;
use std::sync::Mutex;
use tracing::error;

use super::error::RedisError;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RedisSettings {
    pub host: String,
    pub port: u16,
    pub use_legacy_version: bool,
    pub pool_size: usize,
    pub reconnect_max_attempts: u32,
    /// Reconnect delay in milliseconds
    pub reconnect_delay: u32,
    /// TTL in seconds
    pub default_ttl: u32,
    pub partition: usize,
}

impl Default for RedisSettings {
    fn default() -> Self {
        RedisSettings {
            host: String::from("localhost"),
            port: 6379,
            use_legacy_version: false,
            pool_size: 10,
            reconnect_max_attempts: 5,
            reconnect_delay: 1000,
            default_ttl: 3600,
            partition: 0,
        }
    }
}

impl RedisSettings {
    pub fn new(
        host: String,
        port: u16,
        pool_size: usize,
        partition: usize,
        reconnect_max_attempts: u32,
        reconnect_delay: u32,
        default_ttl: u32,
    ) -> Self {
        RedisSettings {
            host,
            port,
            partition,
            use_legacy_version: false,
            pool_size,
            reconnect_max_attempts,
            reconnect_delay,
            default_ttl,
        }
    }

    fn builder(&self) -> Result<Builder, RedisError> {
        let redis_connection_url = format!("redis://{}:{}/{}", self.host, self.port, self.partition);

        let mut config = RedisConfig::from_url(&redis_connection_url)
            .map_err(|err| RedisError::RedisConnectionError(err.to_string()))?;

        if !self.use_legacy_version {
            config.version = RespVersion::RESP3;
        }

        let mut builder = Builder::from_config(config);
        builder.set_policy(ReconnectPolicy::new_constant(
            self.reconnect_max_attempts,
            self.reconnect_delay,
        ));

        Ok(builder)
    }
}

pub struct RedisConnectionPool {
    pub pool: RedisPool,
    pub settings: RedisSettings,
    join_handle: Mutex<Option<ConnectHandle>>,
}

impl RedisConnectionPool {
    /// Create a new Redis connection pool and wait until it is connected.
    pub async fn new(settings: RedisSettings) -> Result<Self, RedisError> {
        let pool = settings
            .builder()?
            .build_pool(settings.pool_size)
            .map_err(|err| RedisError::RedisConnectionError(err.to_string()))?;

        let join_handle = pool
            .init()
            .await
            .map_err(|err| RedisError::RedisConnectionError(err.to_string()))?;

        Ok(Self {
            pool,
            settings,
            join_handle: Mutex::new(Some(join_handle)),
        })
    }

    /// Opens a dedicated pub/sub connection with the same settings as the pool.
    ///
    /// Subscriptions made through the returned client are re-established by fred after a reconnect.
    pub async fn subscriber(&self) -> Result<SubscriberClient, RedisError> {
        let subscriber = self
            .settings
            .builder()?
            .build_subscriber_client()
            .map_err(|err| RedisError::RedisConnectionError(err.to_string()))?;

        subscriber
            .init()
            .await
            .map_err(|err| RedisError::RedisConnectionError(err.to_string()))?;

        let _ = subscriber.manage_subscriptions();

        Ok(subscriber)
    }

    pub async fn close_connections(&self) {
        if let Err(error) = self.pool.quit().await {
            error!(%error, "Failed to quit redis pool");
        }
        let handle = self
            .join_handle
            .lock()
            .ok()
            .and_then(|mut join_handle| join_handle.take());
        if let Some(handle) = handle {
            match handle.await {
                Ok(Ok(_)) => (),
                Ok(Err(error)) => error!(%error),
                Err(error) => error!(%error),
            };
        }
    }
}
