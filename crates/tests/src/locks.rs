/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use delivery_tracking_service::redis::{
    commands::{acquire_status_pass_lock, release_status_pass_lock},
    keys::status_pass_lock_key,
};

use crate::memory_store::MemoryRedis;

#[tokio::test]
async fn holder_releases_its_own_lock() {
    let redis = MemoryRedis::default();
    let token = acquire_status_pass_lock(&redis, "trips", 120)
        .await
        .unwrap()
        .expect("free lock");

    assert!(acquire_status_pass_lock(&redis, "trips", 120)
        .await
        .unwrap()
        .is_none());
    assert!(release_status_pass_lock(&redis, "trips", &token).await.unwrap());
    assert_eq!(redis.value(&status_pass_lock_key("trips")), None);
}

#[tokio::test]
async fn stale_holder_cannot_release_a_successors_lock() {
    let redis = MemoryRedis::default();
    let stale = acquire_status_pass_lock(&redis, "orders", 120)
        .await
        .unwrap()
        .expect("free lock");

    // Lock expired and another pass took it.
    redis.overwrite(&status_pass_lock_key("orders"), "successor");

    assert!(!release_status_pass_lock(&redis, "orders", &stale).await.unwrap());
    assert_eq!(
        redis.value(&status_pass_lock_key("orders")),
        Some("successor".to_string())
    );
}

#[tokio::test]
async fn locks_are_per_job() {
    let redis = MemoryRedis::default();
    let trips = acquire_status_pass_lock(&redis, "trips", 120).await.unwrap();
    let orders = acquire_status_pass_lock(&redis, "orders", 120).await.unwrap();

    assert!(trips.is_some());
    assert!(orders.is_some());
    assert_ne!(trips, orders);
}
