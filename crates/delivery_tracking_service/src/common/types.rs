/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{Display, EnumString};

#[derive(Deserialize, Serialize, Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct DriverId(pub String);
#[derive(Deserialize, Serialize, Clone, Debug, Eq, Hash, PartialEq)]
pub struct UserId(pub String);
#[derive(Deserialize, Serialize, Clone, Debug, Eq, Hash, PartialEq)]
pub struct RequestId(pub String);
#[derive(Deserialize, Serialize, Clone, Debug, Eq, Hash, PartialEq)]
pub struct OrderId(pub String);
#[derive(Serialize, Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Hash, Ord)]
pub struct TimeStamp(pub DateTime<Utc>);
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub struct Minutes(pub i64);

#[derive(Serialize, Clone, Debug, PartialEq, Copy)]
pub struct Latitude(pub f64);
#[derive(Serialize, Clone, Debug, PartialEq, Copy)]
pub struct Longitude(pub f64);

/// Accepts a coordinate as a JSON number or a numeric string. Non-finite values are rejected.
struct CoordinateVisitor;

impl<'de> serde::de::Visitor<'de> for CoordinateVisitor {
    type Value = f64;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a finite number or a string containing a finite floating-point number")
    }

    fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(E::invalid_value(serde::de::Unexpected::Float(value), &self))
        }
    }

    fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(value as f64)
    }

    fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(value as f64)
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| E::invalid_value(serde::de::Unexpected::Str(value), &self))
    }
}

impl<'de> Deserialize<'de> for Latitude {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(CoordinateVisitor).map(Latitude)
    }
}

impl<'de> Deserialize<'de> for Longitude {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(CoordinateVisitor).map(Longitude)
    }
}

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

impl TimeStamp {
    /// Parses RFC 3339 and the Postgres text forms of `timestamptz` and `timestamp`. Values without
    /// an offset are read as UTC.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
            return Some(TimeStamp(parsed.with_timezone(&Utc)));
        }
        OFFSET_FORMATS
            .iter()
            .find_map(|format| DateTime::parse_from_str(value, format).ok())
            .map(|parsed| TimeStamp(parsed.with_timezone(&Utc)))
            .or_else(|| {
                NAIVE_FORMATS
                    .iter()
                    .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
                    .map(|parsed| TimeStamp(parsed.and_utc()))
            })
    }
}

struct TimeStampVisitor;

impl<'de> serde::de::Visitor<'de> for TimeStampVisitor {
    type Value = TimeStamp;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("an RFC 3339 or Postgres timestamp string")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        TimeStamp::parse(value)
            .ok_or_else(|| E::invalid_value(serde::de::Unexpected::Str(value), &self))
    }
}

impl<'de> Deserialize<'de> for TimeStamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(TimeStampVisitor)
    }
}

/// Reads an optional timestamp, treating anything unparseable as absent.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<TimeStamp>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(TimeStamp::parse))
}

/// Last reported position of a driver, keyed by `driver_id` in the tracker.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct DriverPosition {
    pub driver_id: DriverId,
    pub lat: Latitude,
    pub lng: Longitude,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<TimeStamp>,
}

#[derive(
    Debug, Clone, Copy, EnumString, Display, Serialize, Deserialize, Eq, Hash, PartialEq,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Accepted,
    InProgress,
    Completed,
    Cancelled,
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStatus::Completed | RequestStatus::Cancelled)
    }
}

#[derive(
    Debug, Clone, Copy, EnumString, Display, Serialize, Deserialize, Eq, Hash, PartialEq,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, Copy, Display, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
    #[serde(other)]
    Unknown,
}

/// Trips and service requests share one lifecycle and only differ in where they are stored and
/// how their notifications are labelled.
#[derive(
    Debug, Clone, Copy, EnumString, Display, Serialize, Deserialize, Eq, Hash, PartialEq,
)]
pub enum RequestKind {
    #[strum(serialize = "trips")]
    #[serde(rename = "trips")]
    Trip,
    #[strum(serialize = "service-requests")]
    #[serde(rename = "service-requests")]
    ServiceRequest,
}

impl RequestKind {
    pub fn table(&self) -> &'static str {
        match self {
            RequestKind::Trip => "trips",
            RequestKind::ServiceRequest => "service_requests",
        }
    }

    pub fn notification_type(&self) -> NotificationType {
        match self {
            RequestKind::Trip => NotificationType::Delivery,
            RequestKind::ServiceRequest => NotificationType::Service,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RequestKind::Trip => "Trip",
            RequestKind::ServiceRequest => "Service Request",
        }
    }

    pub fn id_field(&self) -> &'static str {
        match self {
            RequestKind::Trip => "tripId",
            RequestKind::ServiceRequest => "serviceRequestId",
        }
    }
}

#[derive(Debug, Clone, Copy, Display, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationType {
    Delivery,
    Service,
    Order,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EarningsPolicy {
    /// Server side `total_earnings += fare`, `total_trips += 1`.
    #[default]
    Accumulate,
    /// Writes `total_earnings = fare`, `total_trips = 1`, as older deployments did.
    Overwrite,
}

/// A trip or service request row.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct LifecycleRecord {
    pub id: RequestId,
    pub user_id: UserId,
    #[serde(default)]
    pub driver_id: Option<DriverId>,
    pub status: RequestStatus,
    pub created_at: TimeStamp,
    #[serde(default)]
    pub fare: Option<f64>,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default)]
    pub actual_duration: Option<Minutes>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub order_number: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
    pub created_at: TimeStamp,
}

/// Columns written by a lifecycle transition; unset fields are left untouched.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct RequestPatch {
    pub status: RequestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<DriverId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_duration: Option<Minutes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
}

impl RequestPatch {
    pub fn status(status: RequestStatus) -> Self {
        RequestPatch {
            status,
            driver_id: None,
            actual_duration: None,
            payment_status: None,
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct OrderPatch {
    pub status: OrderStatus,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Notification {
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub data: serde_json::Value,
}
