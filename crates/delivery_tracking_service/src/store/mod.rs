/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
pub mod postgrest;

use crate::{common::types::*, tools::error::AppError};
use async_trait::async_trait;

/// Persisted-store operations the tracker and the lifecycle passes rely on.
///
/// Conditional writes (`transition_request`, `transition_order`) only apply when the row is still
/// in `expected`; they return `Ok(None)` when it is not, which callers treat as a lost race rather
/// than a failure.
#[async_trait]
pub trait Store: Send + Sync {
    async fn fetch_driver_positions(&self, limit: usize) -> Result<Vec<DriverPosition>, AppError>;

    async fn fetch_requests(
        &self,
        kind: RequestKind,
        status: RequestStatus,
        created_before: TimeStamp,
    ) -> Result<Vec<LifecycleRecord>, AppError>;

    async fn fetch_request(
        &self,
        kind: RequestKind,
        id: &RequestId,
    ) -> Result<Option<LifecycleRecord>, AppError>;

    async fn transition_request(
        &self,
        kind: RequestKind,
        id: &RequestId,
        expected: RequestStatus,
        patch: &RequestPatch,
    ) -> Result<Option<LifecycleRecord>, AppError>;

    async fn credit_driver(
        &self,
        driver_id: &DriverId,
        fare: f64,
        policy: EarningsPolicy,
    ) -> Result<(), AppError>;

    async fn insert_notification(&self, notification: &Notification) -> Result<(), AppError>;

    async fn fetch_orders(
        &self,
        status: OrderStatus,
        created_before: TimeStamp,
    ) -> Result<Vec<Order>, AppError>;

    async fn transition_order(
        &self,
        id: &OrderId,
        expected: OrderStatus,
        patch: &OrderPatch,
    ) -> Result<Option<Order>, AppError>;
}
