/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use std::time::Duration;

use crate::{
    common::types::*, environment::StoreConfig, store::Store, tools::callapi::call_api,
    tools::error::AppError,
};
use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::{Client, Method, Url};
use serde::Serialize;
use serde_json::{json, Value};
use shared::tools::logger::*;

const DRIVER_LOCATIONS: &str = "driver_locations";
const DRIVERS: &str = "drivers";
const NOTIFICATIONS: &str = "notifications";
const ORDERS: &str = "orders";
const INCREMENT_DRIVER_EARNINGS: &str = "rpc/increment_driver_earnings";

enum Prefer {
    Representation,
    Minimal,
}

/// `Store` over a PostgREST endpoint (a Supabase project's `/rest/v1/`).
pub struct PostgrestStore {
    client: Client,
    base_url: Url,
    api_key: String,
    authorization: String,
}

impl PostgrestStore {
    pub fn new(store_cfg: &StoreConfig) -> Result<Self, AppError> {
        let mut base_url = store_cfg.base_url.to_owned();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let base_url = Url::parse(&base_url)
            .map_err(|err| AppError::InvalidRequest(format!("Invalid store base url : {err}")))?;

        let client = Client::builder()
            .timeout(Duration::from_millis(store_cfg.request_timeout_ms))
            .build()
            .map_err(|err| AppError::InternalError(err.to_string()))?;

        Ok(PostgrestStore {
            client,
            base_url,
            api_key: store_cfg.api_key.to_owned(),
            authorization: format!("Bearer {}", store_cfg.api_key),
        })
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, AppError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|err| AppError::InvalidRequest(format!("Invalid store path {path} : {err}")))?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(key, value)| (*key, value.as_str())));
        }
        Ok(url)
    }

    fn headers(&self, prefer: Option<Prefer>) -> Vec<(&str, &str)> {
        let mut headers = vec![
            ("apikey", self.api_key.as_str()),
            ("Authorization", self.authorization.as_str()),
            ("Accept", "application/json"),
        ];
        match prefer {
            Some(Prefer::Representation) => headers.push(("Prefer", "return=representation")),
            Some(Prefer::Minimal) => headers.push(("Prefer", "return=minimal")),
            None => (),
        }
        headers
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, AppError> {
        call_api::<T, ()>(
            &self.client,
            Method::GET,
            &self.url(path, query)?,
            self.headers(None),
            None,
        )
        .await
    }

    async fn patch_returning<T, U>(
        &self,
        path: &str,
        query: &[(&str, String)],
        body: &U,
    ) -> Result<Option<T>, AppError>
    where
        T: serde::de::DeserializeOwned,
        U: Serialize + std::fmt::Debug,
    {
        let rows: Vec<T> = call_api(
            &self.client,
            Method::PATCH,
            &self.url(path, query)?,
            self.headers(Some(Prefer::Representation)),
            Some(body),
        )
        .await?;

        Ok(rows.into_iter().next())
    }
}

fn eq<T: ToString>(value: T) -> String {
    format!("eq.{}", value.to_string())
}

fn lt(TimeStamp(ts): TimeStamp) -> String {
    format!("lt.{}", ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[async_trait]
impl Store for PostgrestStore {
    async fn fetch_driver_positions(&self, limit: usize) -> Result<Vec<DriverPosition>, AppError> {
        let rows: Vec<Value> = self
            .get(
                DRIVER_LOCATIONS,
                &[
                    ("select", "driver_id,lat,lng,updated_at".to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<DriverPosition>(row) {
                Ok(position) => Some(position),
                Err(err) => {
                    warn!(tag = "[Driver Position Skipped]", error = %err);
                    None
                }
            })
            .collect())
    }

    async fn fetch_requests(
        &self,
        kind: RequestKind,
        status: RequestStatus,
        created_before: TimeStamp,
    ) -> Result<Vec<LifecycleRecord>, AppError> {
        self.get(
            kind.table(),
            &[
                ("select", "*".to_string()),
                ("status", eq(status)),
                ("created_at", lt(created_before)),
                ("order", "created_at.asc".to_string()),
            ],
        )
        .await
    }

    async fn fetch_request(
        &self,
        kind: RequestKind,
        RequestId(id): &RequestId,
    ) -> Result<Option<LifecycleRecord>, AppError> {
        let rows: Vec<LifecycleRecord> = self
            .get(
                kind.table(),
                &[
                    ("select", "*".to_string()),
                    ("id", eq(id)),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;

        Ok(rows.into_iter().next())
    }

    async fn transition_request(
        &self,
        kind: RequestKind,
        RequestId(id): &RequestId,
        expected: RequestStatus,
        patch: &RequestPatch,
    ) -> Result<Option<LifecycleRecord>, AppError> {
        self.patch_returning(
            kind.table(),
            &[("id", eq(id)), ("status", eq(expected))],
            patch,
        )
        .await
    }

    async fn credit_driver(
        &self,
        DriverId(driver_id): &DriverId,
        fare: f64,
        policy: EarningsPolicy,
    ) -> Result<(), AppError> {
        match policy {
            EarningsPolicy::Accumulate => {
                let _: Value = call_api(
                    &self.client,
                    Method::POST,
                    &self.url(INCREMENT_DRIVER_EARNINGS, &[])?,
                    self.headers(None),
                    Some(json!({ "driver_id": driver_id, "amount": fare })),
                )
                .await?;
            }
            EarningsPolicy::Overwrite => {
                call_api::<(), _>(
                    &self.client,
                    Method::PATCH,
                    &self.url(DRIVERS, &[("id", eq(driver_id))])?,
                    self.headers(Some(Prefer::Minimal)),
                    Some(json!({ "total_earnings": fare, "total_trips": 1 })),
                )
                .await?;
            }
        }
        Ok(())
    }

    async fn insert_notification(&self, notification: &Notification) -> Result<(), AppError> {
        call_api::<(), _>(
            &self.client,
            Method::POST,
            &self.url(NOTIFICATIONS, &[])?,
            self.headers(Some(Prefer::Minimal)),
            Some([notification]),
        )
        .await
    }

    async fn fetch_orders(
        &self,
        status: OrderStatus,
        created_before: TimeStamp,
    ) -> Result<Vec<Order>, AppError> {
        self.get(
            ORDERS,
            &[
                ("select", "*".to_string()),
                ("status", eq(status)),
                ("created_at", lt(created_before)),
                ("order", "created_at.asc".to_string()),
            ],
        )
        .await
    }

    async fn transition_order(
        &self,
        OrderId(id): &OrderId,
        expected: OrderStatus,
        patch: &OrderPatch,
    ) -> Result<Option<Order>, AppError> {
        self.patch_returning(ORDERS, &[("id", eq(id)), ("status", eq(expected))], patch)
            .await
    }
}
