/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::redis::{keys::*, RedisClient};
use shared::redis::error::RedisError;
use uuid::Uuid;

/// Token proving ownership of a pass lock; only its holder may release it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockToken(pub String);

/// Takes the lock for `job` if nobody holds it. The lock expires after `expiry` seconds.
pub async fn acquire_status_pass_lock(
    redis: &dyn RedisClient,
    job: &str,
    expiry: u32,
) -> Result<Option<LockToken>, RedisError> {
    let token = Uuid::new_v4().to_string();
    let acquired = redis
        .setnx_with_expiry(&status_pass_lock_key(job), &token, expiry)
        .await?;

    Ok(acquired.then_some(LockToken(token)))
}

/// Releases the lock for `job` unless it expired and was taken over by another pass.
/// Returns whether this token's lock was the one deleted.
pub async fn release_status_pass_lock(
    redis: &dyn RedisClient,
    job: &str,
    LockToken(token): &LockToken,
) -> Result<bool, RedisError> {
    redis
        .delete_if_equals(&status_pass_lock_key(job), token)
        .await
}
