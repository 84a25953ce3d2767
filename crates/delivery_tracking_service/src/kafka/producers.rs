/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use super::types::*;
use crate::common::{kafka::push_to_kafka, types::*};
use chrono::Utc;
use rdkafka::producer::FutureProducer;

pub async fn kafka_stream_request_updates(
    producer: &Option<FutureProducer>,
    topic: &str,
    kind: RequestKind,
    records: &[LifecycleRecord],
    source: TransitionSource,
) {
    for record in records {
        let message = StatusUpdate {
            entity: kind.table(),
            id: record.id.0.to_owned(),
            user_id: record.user_id.to_owned(),
            driver_id: record.driver_id.to_owned(),
            status: record.status.to_string(),
            source,
            ts: TimeStamp(Utc::now()),
        };
        push_to_kafka(producer, topic, record.id.0.as_str(), message).await;
    }
}

pub async fn kafka_stream_order_updates(
    producer: &Option<FutureProducer>,
    topic: &str,
    orders: &[Order],
    source: TransitionSource,
) {
    for order in orders {
        let message = StatusUpdate {
            entity: "orders",
            id: order.id.0.to_owned(),
            user_id: order.user_id.to_owned(),
            driver_id: None,
            status: order.status.to_string(),
            source,
            ts: TimeStamp(Utc::now()),
        };
        push_to_kafka(producer, topic, order.id.0.as_str(), message).await;
    }
}
