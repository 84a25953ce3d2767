/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::{common::types::*, tools::error::AppError};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeEventType {
    Insert,
    Update,
    Delete,
}

/// Row change on `driver_locations`, as sent by Supabase realtime (`eventType`, `new`, `old`)
/// or by a database webhook (`type`, `record`, `old_record`).
#[derive(Debug, Deserialize)]
struct ChangeEvent {
    #[serde(rename = "eventType", alias = "type")]
    event_type: ChangeEventType,
    #[serde(default, alias = "record")]
    new: Option<Value>,
    #[serde(default, alias = "old_record")]
    old: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    Upsert(DriverPosition),
    Remove(DriverId),
    /// Well-formed event with nothing to apply.
    Ignore(&'static str),
}

/// Decodes a raw change event fully before anything is applied, so a bad field rejects the whole
/// event instead of leaving a half-written entry.
pub fn decode_change_event(raw: &Value) -> Result<TrackerEvent, AppError> {
    let event = ChangeEvent::deserialize(raw)
        .map_err(|err| AppError::MalformedChangeEvent(err.to_string()))?;

    match event.event_type {
        ChangeEventType::Insert | ChangeEventType::Update => match event.new {
            None | Some(Value::Null) => Ok(TrackerEvent::Ignore("change event without new row")),
            Some(row) => DriverPosition::deserialize(&row)
                .map(TrackerEvent::Upsert)
                .map_err(|err| AppError::MalformedChangeEvent(err.to_string())),
        },
        ChangeEventType::Delete => Ok(event
            .old
            .as_ref()
            .and_then(|old| old.get("driver_id"))
            .and_then(driver_id_of)
            .map(TrackerEvent::Remove)
            .unwrap_or(TrackerEvent::Ignore("delete without driver_id"))),
    }
}

fn driver_id_of(value: &Value) -> Option<DriverId> {
    match value {
        Value::String(driver_id) if !driver_id.is_empty() => Some(DriverId(driver_id.to_owned())),
        Value::Number(driver_id) => Some(DriverId(driver_id.to_string())),
        _ => None,
    }
}
