/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use std::time::Duration;

use delivery_tracking_service::{
    common::types::*,
    tools::error::AppError,
    tracker::{
        state::{AppliedChange, FlyTo},
        Tracker,
    },
};
use serde_json::json;
use tokio::{sync::broadcast, time::timeout};

use crate::memory_store::{position, MemoryStore};

fn driver(id: &str) -> DriverId {
    DriverId(id.to_string())
}

async fn next_change(changes: &mut broadcast::Receiver<AppliedChange>) -> AppliedChange {
    timeout(Duration::from_secs(2), changes.recv())
        .await
        .expect("no change applied in time")
        .expect("change stream closed")
}

#[tokio::test]
async fn initial_fetch_seeds_the_mapping() {
    let store = MemoryStore::with_positions(vec![
        position("d1", 24.71, 46.67),
        position("d2", 21.54, 39.17),
        position("d3", 26.42, 50.08),
    ]);
    let tracker = Tracker::new(16);

    assert_eq!(tracker.initialize(&store, 2).await, 2);
    assert_eq!(tracker.len().await, 2);
}

#[tokio::test]
async fn failed_initial_fetch_does_not_block_subscription() {
    let store = MemoryStore::default();
    store.fail_reads();
    let tracker = Tracker::new(16);

    assert_eq!(tracker.initialize(&store, 500).await, 0);
    assert!(tracker.is_empty().await);

    let subscription = tracker.subscribe().expect("subscribe after failed fetch");
    let mut changes = tracker.changes();
    tracker
        .push(json!({
            "eventType": "INSERT",
            "new": { "driver_id": "d1", "lat": 24.71, "lng": 46.67 },
            "old": null
        }))
        .await
        .unwrap();

    next_change(&mut changes).await;
    assert_eq!(tracker.len().await, 1);
    subscription.unsubscribe().await;
}

#[tokio::test]
async fn insert_update_delete_keep_the_mapping_in_step() {
    let tracker = Tracker::new(16);
    let subscription = tracker.subscribe().unwrap();
    let mut changes = tracker.changes();

    tracker
        .push(json!({
            "eventType": "INSERT",
            "new": { "driver_id": "d1", "lat": "24.7136", "lng": "46.6753" },
            "old": null
        }))
        .await
        .unwrap();
    next_change(&mut changes).await;

    tracker
        .push(json!({
            "eventType": "UPDATE",
            "new": { "driver_id": "d1", "lat": 24.8, "lng": 46.7, "updated_at": "2024-03-01T10:00:00Z" },
            "old": { "driver_id": "d1" }
        }))
        .await
        .unwrap();
    next_change(&mut changes).await;

    let d1 = tracker.position(&driver("d1")).await.unwrap();
    assert_eq!(d1.lat, Latitude(24.8));
    assert_eq!(d1.lng, Longitude(46.7));
    assert!(d1.updated_at.is_some());

    tracker
        .push(json!({ "eventType": "DELETE", "new": null, "old": { "driver_id": "d1" } }))
        .await
        .unwrap();

    assert_eq!(
        next_change(&mut changes).await,
        AppliedChange::Removed {
            driver_id: driver("d1")
        }
    );
    assert!(tracker.is_empty().await);
    subscription.unsubscribe().await;
}

#[tokio::test]
async fn malformed_events_are_dropped_without_killing_the_feed() {
    let tracker = Tracker::new(16);
    let subscription = tracker.subscribe().unwrap();
    let mut changes = tracker.changes();

    for bad in [
        json!({ "eventType": "TRUNCATE" }),
        json!({ "eventType": "UPDATE", "new": { "driver_id": "d1", "lat": "north", "lng": 46.6 } }),
        json!({ "eventType": "DELETE", "old": {} }),
        json!("not an event"),
    ] {
        tracker.push(bad).await.unwrap();
    }

    tracker
        .push(json!({
            "type": "INSERT",
            "record": { "driver_id": "d2", "lat": 21.54, "lng": 39.17 },
            "old_record": null
        }))
        .await
        .unwrap();

    match next_change(&mut changes).await {
        AppliedChange::Upserted { position } => assert_eq!(position.driver_id, driver("d2")),
        other => panic!("expected upsert, got {other:?}"),
    }
    assert_eq!(tracker.len().await, 1);
    assert!(tracker.position(&driver("d1")).await.is_none());
    subscription.unsubscribe().await;
}

#[tokio::test]
async fn focus_keeps_last_target_after_removal() {
    let store = MemoryStore::with_positions(vec![position("d1", 24.71, 46.67)]);
    let tracker = Tracker::new(16);
    tracker.initialize(&store, 500).await;
    let subscription = tracker.subscribe().unwrap();
    let mut changes = tracker.changes();

    let focus = tracker.focus(driver("d1")).await;
    assert_eq!(
        focus.fly_to,
        Some(FlyTo {
            lat: Latitude(24.71),
            lng: Longitude(46.67)
        })
    );

    tracker
        .push(json!({ "eventType": "UPDATE", "new": { "driver_id": "d1", "lat": 24.9, "lng": 46.9 } }))
        .await
        .unwrap();
    next_change(&mut changes).await;

    tracker
        .push(json!({ "eventType": "DELETE", "old": { "driver_id": "d1" } }))
        .await
        .unwrap();
    next_change(&mut changes).await;

    let focus = tracker.focused().await.unwrap();
    assert_eq!(focus.driver_id, driver("d1"));
    assert_eq!(
        focus.fly_to,
        Some(FlyTo {
            lat: Latitude(24.9),
            lng: Longitude(46.9)
        })
    );
    subscription.unsubscribe().await;
}

#[tokio::test]
async fn focusing_an_unknown_driver_has_no_target() {
    let tracker = Tracker::new(16);

    let focus = tracker.focus(driver("ghost")).await;
    assert_eq!(focus.fly_to, None);
    assert_eq!(tracker.snapshot().await.focus, Some(focus));
}

#[tokio::test]
async fn only_one_subscription_at_a_time() {
    let tracker = Tracker::new(16);
    let subscription = tracker.subscribe().unwrap();

    assert!(matches!(
        tracker.subscribe(),
        Err(AppError::TrackerAlreadySubscribed)
    ));

    subscription.unsubscribe().await;
    let again = tracker.subscribe().expect("resubscribe after unsubscribe");
    drop(again);
}

#[tokio::test]
async fn dropped_subscription_releases_the_channel() {
    let tracker = Tracker::new(16);
    let subscription = tracker.subscribe().unwrap();
    drop(subscription);

    let err = tracker
        .push(json!({ "eventType": "DELETE", "old": { "driver_id": "d1" } }))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::TrackerNotSubscribed));

    assert!(tracker.subscribe().is_ok());
}

#[tokio::test]
async fn queued_events_drain_before_unsubscribe_returns() {
    let tracker = Tracker::new(64);
    let subscription = tracker.subscribe().unwrap();

    for idx in 0..20 {
        tracker
            .push(json!({
                "eventType": "INSERT",
                "new": { "driver_id": format!("d{idx}"), "lat": 10.0 + idx as f64, "lng": 20.0 }
            }))
            .await
            .unwrap();
    }

    subscription.unsubscribe().await;
    assert_eq!(tracker.len().await, 20);
}

#[tokio::test]
async fn last_arrived_update_wins_over_newer_timestamp() {
    let tracker = Tracker::new(16);
    let subscription = tracker.subscribe().unwrap();
    let mut changes = tracker.changes();

    tracker
        .push(json!({
            "eventType": "UPDATE",
            "new": { "driver_id": "d1", "lat": 10.0, "lng": 20.0, "updated_at": "2024-03-01T10:05:00Z" }
        }))
        .await
        .unwrap();
    tracker
        .push(json!({
            "eventType": "UPDATE",
            "new": { "driver_id": "d1", "lat": 11.0, "lng": 21.0, "updated_at": "2024-03-01T10:00:00Z" }
        }))
        .await
        .unwrap();
    next_change(&mut changes).await;
    next_change(&mut changes).await;

    let d1 = tracker.position(&driver("d1")).await.unwrap();
    assert_eq!((d1.lat, d1.lng), (Latitude(11.0), Longitude(21.0)));
    subscription.unsubscribe().await;
}
