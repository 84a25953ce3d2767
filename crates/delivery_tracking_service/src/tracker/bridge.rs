/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::tools::{error::AppError, prometheus::TRACKER_EVENTS};
use fred::{
    clients::SubscriberClient,
    interfaces::{ClientLike, EventInterface, PubsubInterface},
};
use serde_json::Value;
use shared::{redis::error::RedisError, tools::logger::*};
use tokio::{
    sync::{broadcast::error::RecvError, mpsc},
    task::JoinHandle,
};

/// Subscribes `subscriber` to `channel` and spawns a task forwarding every payload into `sender`.
/// Payloads that are not JSON are dropped here; everything else is decoded by the drainer.
pub async fn spawn_redis_bridge(
    subscriber: &SubscriberClient,
    channel: &str,
    sender: mpsc::Sender<Value>,
) -> Result<JoinHandle<()>, AppError> {
    let mut messages = subscriber.message_rx();

    subscriber
        .subscribe(channel)
        .await
        .map_err(|err| RedisError::SubscribeError(err.to_string()))?;

    info!(tag = "[Tracker Bridge Subscribed]", channel = %channel);

    let channel = channel.to_string();
    Ok(tokio::spawn(async move {
        loop {
            match messages.recv().await {
                Ok(message) => {
                    if message.channel.to_string() != channel {
                        continue;
                    }
                    let payload = match message.value.convert::<String>() {
                        Ok(payload) => payload,
                        Err(err) => {
                            warn!(tag = "[Tracker Event Dropped]", channel = %channel, error = %err);
                            TRACKER_EVENTS.with_label_values(&["dropped"]).inc();
                            continue;
                        }
                    };
                    match serde_json::from_str::<Value>(&payload) {
                        Ok(raw) => {
                            if sender.send(raw).await.is_err() {
                                break;
                            }
                        }
                        Err(err) => {
                            warn!(tag = "[Tracker Event Dropped]", channel = %channel, error = %err, payload = %payload);
                            TRACKER_EVENTS.with_label_values(&["dropped"]).inc();
                        }
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(tag = "[Tracker Bridge Lagged]", channel = %channel, skipped = skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
        warn!(tag = "[Tracker Bridge Closed]", channel = %channel);
    }))
}

pub async fn close_redis_bridge(subscriber: SubscriberClient, channel: String) {
    if let Err(err) = subscriber.unsubscribe(channel.as_str()).await {
        error!(tag = "[Tracker Bridge Unsubscribe Failed]", channel = %channel, error = %err);
    }
    if let Err(err) = subscriber.quit().await {
        error!(tag = "[Tracker Bridge Quit Failed]", channel = %channel, error = %err);
    }
}
