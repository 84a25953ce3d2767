/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::{domain::types::internal::realtime::*, environment::AppState, tools::error::AppError};
use actix_web::web::Data;
use serde_json::Value;

/// Queues one change event, or each element of an array of them, onto the tracker channel.
///
/// Decoding happens in the tracker drainer; malformed events are dropped there and still count as
/// accepted here.
pub async fn ingest_change_events(
    data: Data<AppState>,
    request_body: Value,
) -> Result<IngestResponse, AppError> {
    let events = match request_body {
        Value::Array(events) => events,
        event => vec![event],
    };

    let accepted = events.len();
    for event in events {
        data.tracker.push(event).await?;
    }

    Ok(IngestResponse { accepted })
}
