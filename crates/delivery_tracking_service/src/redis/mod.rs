/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
pub mod commands;
pub mod keys;

use async_trait::async_trait;
use shared::redis::{error::RedisError, types::RedisConnectionPool};

/// Key operations the service needs from Redis: the health check round trip and the pass locks.
#[async_trait]
pub trait RedisClient: Send + Sync {
    async fn set_key(&self, key: &str, value: &str) -> Result<(), RedisError>;

    async fn get_key(&self, key: &str) -> Result<Option<String>, RedisError>;

    /// SET NX EX; `true` when this call wrote the key.
    async fn setnx_with_expiry(
        &self,
        key: &str,
        value: &str,
        expiry: u32,
    ) -> Result<bool, RedisError>;

    /// Deletes `key` only if it still holds `value`, atomically.
    async fn delete_if_equals(&self, key: &str, value: &str) -> Result<bool, RedisError>;
}

#[async_trait]
impl RedisClient for RedisConnectionPool {
    async fn set_key(&self, key: &str, value: &str) -> Result<(), RedisError> {
        RedisConnectionPool::set_key(self, key, value).await
    }

    async fn get_key(&self, key: &str) -> Result<Option<String>, RedisError> {
        RedisConnectionPool::get_key(self, key).await
    }

    async fn setnx_with_expiry(
        &self,
        key: &str,
        value: &str,
        expiry: u32,
    ) -> Result<bool, RedisError> {
        RedisConnectionPool::setnx_with_expiry(self, key, value, expiry).await
    }

    async fn delete_if_equals(&self, key: &str, value: &str) -> Result<bool, RedisError> {
        RedisConnectionPool::delete_if_equals(self, key, value).await
    }
}
