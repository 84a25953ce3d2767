/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::redis::{error::RedisError, types::RedisConnectionPool};
use fred::{
    interfaces::{KeysInterface, LuaInterface},
    types::{Expiration, SetOptions},
};
use tracing::instrument;

const COMPARE_AND_DELETE: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
else
    return 0
end
"#;

impl RedisConnectionPool {
    // set key with default ttl
    #[instrument(level = "DEBUG", skip(self))]
    pub async fn set_key(&self, key: &str, value: &str) -> Result<(), RedisError> {
        self.set_with_expiry(key, value, self.settings.default_ttl)
            .await
    }

    // set key with expiry
    #[instrument(level = "DEBUG", skip(self))]
    pub async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        expiry: u32,
    ) -> Result<(), RedisError> {
        self.pool
            .set::<(), _, _>(key, value, Some(Expiration::EX(expiry.into())), None, false)
            .await
            .map_err(|err| RedisError::SetFailed(err.to_string()))
    }

    /// SET NX EX, returning whether the key was written by this call.
    #[instrument(level = "DEBUG", skip(self))]
    pub async fn setnx_with_expiry(
        &self,
        key: &str,
        value: &str,
        expiry: u32,
    ) -> Result<bool, RedisError> {
        let output: Option<String> = self
            .pool
            .set(
                key,
                value,
                Some(Expiration::EX(expiry.into())),
                Some(SetOptions::NX),
                false,
            )
            .await
            .map_err(|err| RedisError::SetExFailed(err.to_string()))?;

        Ok(output.is_some())
    }

    // get key
    #[instrument(level = "DEBUG", skip(self))]
    pub async fn get_key(&self, key: &str) -> Result<Option<String>, RedisError> {
        self.pool
            .get::<Option<String>, _>(key)
            .await
            .map_err(|err| RedisError::GetFailed(err.to_string()))
    }

    /// Deletes `key` only while it still holds `value`, in one server-side step.
    #[instrument(level = "DEBUG", skip(self))]
    pub async fn delete_if_equals(&self, key: &str, value: &str) -> Result<bool, RedisError> {
        self.pool
            .eval::<i64, _, _, _>(COMPARE_AND_DELETE, vec![key], vec![value])
            .await
            .map(|deleted| deleted == 1)
            .map_err(|err| RedisError::DeleteFailed(err.to_string()))
    }
}
