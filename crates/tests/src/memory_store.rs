/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use delivery_tracking_service::{
    common::types::*, redis::RedisClient, store::Store, tools::error::AppError,
};
use shared::redis::error::RedisError;

#[derive(Default)]
struct Tables {
    positions: Vec<DriverPosition>,
    requests: HashMap<(RequestKind, RequestId), LifecycleRecord>,
    orders: HashMap<OrderId, Order>,
    notifications: Vec<Notification>,
    credits: Vec<(DriverId, f64, EarningsPolicy)>,
}

/// Store backed by in-process tables, with switches for failures and concurrent writers.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_reads: AtomicBool,
    fail_notifications: AtomicBool,
    /// Records moved to `cancelled` by a concurrent writer right before our guarded update lands.
    stolen: Mutex<HashSet<RequestId>>,
    read_delay: Mutex<Option<std::time::Duration>>,
}

pub fn minutes_ago(mins: i64) -> TimeStamp {
    TimeStamp(Utc::now() - Duration::minutes(mins))
}

pub fn request(id: &str, status: RequestStatus, age_mins: i64) -> LifecycleRecord {
    LifecycleRecord {
        id: RequestId(id.to_string()),
        user_id: UserId(format!("user-{id}")),
        driver_id: None,
        status,
        created_at: minutes_ago(age_mins),
        fare: None,
        distance: None,
        payment_status: None,
        actual_duration: None,
    }
}

pub fn order(
    id: &str,
    status: OrderStatus,
    payment_status: Option<PaymentStatus>,
    age_mins: i64,
) -> Order {
    Order {
        id: OrderId(id.to_string()),
        user_id: UserId(format!("user-{id}")),
        order_number: format!("ORD-{id}"),
        status,
        payment_status,
        created_at: minutes_ago(age_mins),
    }
}

pub fn position(driver_id: &str, lat: f64, lng: f64) -> DriverPosition {
    DriverPosition {
        driver_id: DriverId(driver_id.to_string()),
        lat: Latitude(lat),
        lng: Longitude(lng),
        updated_at: None,
    }
}

impl MemoryStore {
    pub fn with_positions(positions: Vec<DriverPosition>) -> Self {
        let store = MemoryStore::default();
        store.tables.lock().unwrap().positions = positions;
        store
    }

    pub fn insert_request(&self, kind: RequestKind, record: LifecycleRecord) {
        self.tables
            .lock()
            .unwrap()
            .requests
            .insert((kind, record.id.clone()), record);
    }

    pub fn insert_order(&self, order: Order) {
        self.tables
            .lock()
            .unwrap()
            .orders
            .insert(order.id.clone(), order);
    }

    pub fn request(&self, kind: RequestKind, id: &str) -> LifecycleRecord {
        self.tables.lock().unwrap().requests[&(kind, RequestId(id.to_string()))].clone()
    }

    pub fn order(&self, id: &str) -> Order {
        self.tables.lock().unwrap().orders[&OrderId(id.to_string())].clone()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.tables.lock().unwrap().notifications.clone()
    }

    pub fn credits(&self) -> Vec<(DriverId, f64, EarningsPolicy)> {
        self.tables.lock().unwrap().credits.clone()
    }

    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    pub fn fail_notifications(&self) {
        self.fail_notifications.store(true, Ordering::SeqCst);
    }

    pub fn steal_before_update(&self, id: &str) {
        self.stolen
            .lock()
            .unwrap()
            .insert(RequestId(id.to_string()));
    }

    /// Every lifecycle query sleeps this long before answering.
    pub fn slow_reads(&self, delay: std::time::Duration) {
        *self.read_delay.lock().unwrap() = Some(delay);
    }

    async fn wait_for_read(&self) {
        let delay = *self.read_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn check_reads(&self) -> Result<(), AppError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            Err(AppError::ExternalAPICallError(
                "503 : store unavailable".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn fetch_driver_positions(&self, limit: usize) -> Result<Vec<DriverPosition>, AppError> {
        self.check_reads()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.positions.iter().take(limit).cloned().collect())
    }

    async fn fetch_requests(
        &self,
        kind: RequestKind,
        status: RequestStatus,
        created_before: TimeStamp,
    ) -> Result<Vec<LifecycleRecord>, AppError> {
        self.wait_for_read().await;
        self.check_reads()?;
        let tables = self.tables.lock().unwrap();
        let mut records: Vec<LifecycleRecord> = tables
            .requests
            .iter()
            .filter(|((record_kind, _), record)| {
                *record_kind == kind && record.status == status && record.created_at < created_before
            })
            .map(|(_, record)| record.clone())
            .collect();
        records.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(records)
    }

    async fn fetch_request(
        &self,
        kind: RequestKind,
        id: &RequestId,
    ) -> Result<Option<LifecycleRecord>, AppError> {
        self.check_reads()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.requests.get(&(kind, id.clone())).cloned())
    }

    async fn transition_request(
        &self,
        kind: RequestKind,
        id: &RequestId,
        expected: RequestStatus,
        patch: &RequestPatch,
    ) -> Result<Option<LifecycleRecord>, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let Some(record) = tables.requests.get_mut(&(kind, id.clone())) else {
            return Ok(None);
        };

        if self.stolen.lock().unwrap().remove(id) {
            record.status = RequestStatus::Cancelled;
        }

        if record.status != expected {
            return Ok(None);
        }

        record.status = patch.status;
        if let Some(driver_id) = &patch.driver_id {
            record.driver_id = Some(driver_id.clone());
        }
        if let Some(actual_duration) = patch.actual_duration {
            record.actual_duration = Some(actual_duration);
        }
        if let Some(payment_status) = patch.payment_status {
            record.payment_status = Some(payment_status);
        }
        Ok(Some(record.clone()))
    }

    async fn credit_driver(
        &self,
        driver_id: &DriverId,
        fare: f64,
        policy: EarningsPolicy,
    ) -> Result<(), AppError> {
        self.tables
            .lock()
            .unwrap()
            .credits
            .push((driver_id.clone(), fare, policy));
        Ok(())
    }

    async fn insert_notification(&self, notification: &Notification) -> Result<(), AppError> {
        if self.fail_notifications.load(Ordering::SeqCst) {
            return Err(AppError::ExternalAPICallError(
                "500 : notifications unavailable".to_string(),
            ));
        }
        self.tables
            .lock()
            .unwrap()
            .notifications
            .push(notification.clone());
        Ok(())
    }

    async fn fetch_orders(
        &self,
        status: OrderStatus,
        created_before: TimeStamp,
    ) -> Result<Vec<Order>, AppError> {
        self.wait_for_read().await;
        self.check_reads()?;
        let tables = self.tables.lock().unwrap();
        let mut orders: Vec<Order> = tables
            .orders
            .values()
            .filter(|order| order.status == status && order.created_at < created_before)
            .cloned()
            .collect();
        orders.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(orders)
    }

    async fn transition_order(
        &self,
        id: &OrderId,
        expected: OrderStatus,
        patch: &OrderPatch,
    ) -> Result<Option<Order>, AppError> {
        let mut tables = self.tables.lock().unwrap();
        match tables.orders.get_mut(id) {
            Some(order) if order.status == expected => {
                order.status = patch.status;
                Ok(Some(order.clone()))
            }
            _ => Ok(None),
        }
    }
}

/// Redis stand-in for the key commands; expiry is not modelled.
#[derive(Default)]
pub struct MemoryRedis {
    keys: Mutex<HashMap<String, String>>,
}

impl MemoryRedis {
    pub fn value(&self, key: &str) -> Option<String> {
        self.keys.lock().unwrap().get(key).cloned()
    }

    pub fn overwrite(&self, key: &str, value: &str) {
        self.keys
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }
}

#[async_trait]
impl RedisClient for MemoryRedis {
    async fn set_key(&self, key: &str, value: &str) -> Result<(), RedisError> {
        self.overwrite(key, value);
        Ok(())
    }

    async fn get_key(&self, key: &str) -> Result<Option<String>, RedisError> {
        Ok(self.value(key))
    }

    async fn setnx_with_expiry(
        &self,
        key: &str,
        value: &str,
        _expiry: u32,
    ) -> Result<bool, RedisError> {
        let mut keys = self.keys.lock().unwrap();
        if keys.contains_key(key) {
            return Ok(false);
        }
        keys.insert(key.to_string(), value.to_string());
        Ok(true)
    }

    async fn delete_if_equals(&self, key: &str, value: &str) -> Result<bool, RedisError> {
        let mut keys = self.keys.lock().unwrap();
        if keys.get(key).map(String::as_str) == Some(value) {
            keys.remove(key);
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
