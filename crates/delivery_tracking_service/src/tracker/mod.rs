/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
//! Live driver-location mapping.
//!
//! Change events from every source are queued as raw JSON on one bounded channel and applied by
//! a single drain task, which is the only writer of the mapping. Readers take snapshots through
//! the shared lock or follow `changes()`.

pub mod bridge;
pub mod event;
pub mod state;

use std::sync::{Arc, Mutex};

use crate::{
    common::types::*,
    store::Store,
    tools::{error::AppError, prometheus::*},
    tracker::{
        event::{decode_change_event, TrackerEvent},
        state::*,
    },
};
use fred::clients::SubscriberClient;
use serde_json::Value;
use shared::tools::logger::*;
use tokio::{
    sync::{broadcast, mpsc, RwLock},
    task::JoinHandle,
};

const CHANGE_BROADCAST_CAPACITY: usize = 1024;

type SenderSlot = Arc<Mutex<Option<mpsc::Sender<Value>>>>;

#[derive(Clone)]
pub struct Tracker {
    state: Arc<RwLock<TrackerState>>,
    sender: SenderSlot,
    changes: broadcast::Sender<AppliedChange>,
    buffer_size: usize,
}

impl Tracker {
    pub fn new(buffer_size: usize) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_BROADCAST_CAPACITY);
        Tracker {
            state: Arc::new(RwLock::new(TrackerState::default())),
            sender: Arc::new(Mutex::new(None)),
            changes,
            buffer_size: buffer_size.max(1),
        }
    }

    /// One bulk read of up to `limit` positions. A failed read is logged and leaves the mapping
    /// as it was; it never prevents `subscribe`.
    pub async fn initialize(&self, store: &dyn Store, limit: usize) -> usize {
        match store.fetch_driver_positions(limit).await {
            Ok(positions) => {
                let mut state = self.state.write().await;
                let loaded = state.load(positions);
                TRACKED_DRIVERS.set(state.len() as i64);
                info!(tag = "[Tracker Initialized]", loaded = loaded);
                loaded
            }
            Err(err) => {
                error!(tag = "[Tracker Initial Fetch Failed]", error = %err.message());
                0
            }
        }
    }

    /// Opens the change channel and starts draining it. The returned guard owns the channel:
    /// dropping it, or calling `unsubscribe`, releases the channel and every bridge feeding it.
    pub fn subscribe(&self) -> Result<Subscription, AppError> {
        let mut slot = self
            .sender
            .lock()
            .map_err(|err| AppError::InternalError(err.to_string()))?;

        if slot.as_ref().is_some_and(|sender| !sender.is_closed()) {
            return Err(AppError::TrackerAlreadySubscribed);
        }

        let (sender, receiver) = mpsc::channel(self.buffer_size);
        *slot = Some(sender);

        let drainer = tokio::spawn(drain_change_events(
            receiver,
            self.state.clone(),
            self.changes.clone(),
        ));

        Ok(Subscription {
            drainer: Some(drainer),
            bridges: Vec::new(),
            redis: None,
            sender: self.sender.clone(),
        })
    }

    /// Queues a raw change event. Waits while the channel is full.
    pub async fn push(&self, raw: Value) -> Result<(), AppError> {
        let sender = self
            .sender
            .lock()
            .map_err(|err| AppError::InternalError(err.to_string()))?
            .clone()
            .ok_or(AppError::TrackerNotSubscribed)?;

        sender
            .send(raw)
            .await
            .map_err(|_| AppError::TrackerNotSubscribed)
    }

    pub async fn focus(&self, driver_id: DriverId) -> FocusState {
        self.state.write().await.focus(driver_id)
    }

    pub async fn focused(&self) -> Option<FocusState> {
        self.state.read().await.focused().cloned()
    }

    pub async fn position(&self, driver_id: &DriverId) -> Option<DriverPosition> {
        self.state.read().await.get(driver_id).cloned()
    }

    pub async fn snapshot(&self) -> TrackerSnapshot {
        self.state.read().await.snapshot()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.is_empty()
    }

    /// Stream of changes applied from now on. Slow receivers skip ahead.
    pub fn changes(&self) -> broadcast::Receiver<AppliedChange> {
        self.changes.subscribe()
    }
}

async fn drain_change_events(
    mut receiver: mpsc::Receiver<Value>,
    state: Arc<RwLock<TrackerState>>,
    changes: broadcast::Sender<AppliedChange>,
) {
    while let Some(raw) = receiver.recv().await {
        let event = match decode_change_event(&raw) {
            Ok(TrackerEvent::Ignore(reason)) => {
                debug!(tag = "[Tracker Event Ignored]", reason = reason);
                TRACKER_EVENTS.with_label_values(&["ignored"]).inc();
                continue;
            }
            Ok(event) => event,
            Err(err) => {
                warn!(tag = "[Tracker Event Dropped]", error = %err.message(), event = %raw);
                TRACKER_EVENTS.with_label_values(&["dropped"]).inc();
                continue;
            }
        };

        let (change, tracked) = {
            let mut state = state.write().await;
            let change = state.apply(event);
            (change, state.len())
        };
        TRACKED_DRIVERS.set(tracked as i64);

        match change {
            Some(change) => {
                TRACKER_EVENTS.with_label_values(&["applied"]).inc();
                let _ = changes.send(change);
            }
            None => {
                TRACKER_EVENTS.with_label_values(&["noop"]).inc();
            }
        }
    }

    info!(tag = "[Tracker Feed Closed]");
}

/// Scoped handle on the tracker's change channel.
pub struct Subscription {
    drainer: Option<JoinHandle<()>>,
    bridges: Vec<JoinHandle<()>>,
    redis: Option<(SubscriberClient, String)>,
    sender: SenderSlot,
}

impl Subscription {
    /// Forwards messages published on `channel` into the tracker.
    pub async fn bridge_redis(
        &mut self,
        subscriber: SubscriberClient,
        channel: &str,
    ) -> Result<(), AppError> {
        let sender = self
            .sender
            .lock()
            .map_err(|err| AppError::InternalError(err.to_string()))?
            .clone()
            .ok_or(AppError::TrackerNotSubscribed)?;

        let bridge = bridge::spawn_redis_bridge(&subscriber, channel, sender).await?;
        self.bridges.push(bridge);
        self.redis = Some((subscriber, channel.to_string()));
        Ok(())
    }

    /// Releases the channel, letting already queued events drain first.
    pub async fn unsubscribe(mut self) {
        self.close_sources();
        if let Some((subscriber, channel)) = self.redis.take() {
            bridge::close_redis_bridge(subscriber, channel).await;
        }
        if let Some(drainer) = self.drainer.take() {
            if let Err(err) = drainer.await {
                error!(tag = "[Tracker Drainer Failed]", error = %err);
            }
        }
    }

    fn close_sources(&mut self) {
        match self.sender.lock() {
            Ok(mut slot) => *slot = None,
            Err(err) => error!(tag = "[Tracker Release Failed]", error = %err),
        }
        for bridge in self.bridges.drain(..) {
            bridge.abort();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close_sources();
        if let Some(drainer) = self.drainer.take() {
            drainer.abort();
        }
        if let Some((subscriber, channel)) = self.redis.take() {
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                handle.spawn(bridge::close_redis_bridge(subscriber, channel));
            }
        }
    }
}
