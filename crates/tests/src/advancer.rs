/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use chrono::{Duration, Utc};
use delivery_tracking_service::{
    common::types::*,
    environment::AdvancerSettings,
    lifecycle::advancer::advance_requests,
};

use crate::memory_store::{request, MemoryStore};

fn now() -> TimeStamp {
    TimeStamp(Utc::now())
}

#[tokio::test]
async fn stale_pending_requests_are_cancelled_and_notified() {
    let store = MemoryStore::default();
    store.insert_request(RequestKind::Trip, request("t-old", RequestStatus::Pending, 10));
    store.insert_request(RequestKind::Trip, request("t-new", RequestStatus::Pending, 2));

    let outcome = advance_requests(&store, RequestKind::Trip, &AdvancerSettings::default(), now())
        .await
        .unwrap();

    assert_eq!(outcome.cancelled.len(), 1);
    assert!(outcome.completed.is_empty());
    assert_eq!(store.request(RequestKind::Trip, "t-old").status, RequestStatus::Cancelled);
    assert_eq!(store.request(RequestKind::Trip, "t-new").status, RequestStatus::Pending);

    let notifications = store.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].title, "Trip Cancelled");
    assert_eq!(notifications[0].user_id, UserId("user-t-old".to_string()));
}

fn pending_since(id: &str, now: TimeStamp, age: Duration) -> LifecycleRecord {
    LifecycleRecord {
        created_at: TimeStamp(now.0 - age),
        ..request(id, RequestStatus::Pending, 0)
    }
}

#[tokio::test]
async fn pending_just_past_the_threshold_is_cancelled() {
    let now = now();
    let store = MemoryStore::default();
    store.insert_request(RequestKind::Trip, pending_since("t-six", now, Duration::minutes(6)));

    let outcome = advance_requests(&store, RequestKind::Trip, &AdvancerSettings::default(), now)
        .await
        .unwrap();

    assert_eq!(outcome.cancelled.len(), 1);
    assert_eq!(store.request(RequestKind::Trip, "t-six").status, RequestStatus::Cancelled);
}

#[tokio::test]
async fn pending_exactly_at_the_threshold_is_kept() {
    let now = now();
    let store = MemoryStore::default();
    store.insert_request(RequestKind::Trip, pending_since("t-five", now, Duration::minutes(5)));
    store.insert_request(
        RequestKind::Trip,
        pending_since("t-almost", now, Duration::minutes(5) - Duration::seconds(1)),
    );

    let outcome = advance_requests(&store, RequestKind::Trip, &AdvancerSettings::default(), now)
        .await
        .unwrap();

    assert!(outcome.cancelled.is_empty());
    assert_eq!(store.request(RequestKind::Trip, "t-five").status, RequestStatus::Pending);
    assert_eq!(store.request(RequestKind::Trip, "t-almost").status, RequestStatus::Pending);
    assert!(store.notifications().is_empty());
}

#[tokio::test]
async fn long_running_requests_complete_with_duration_and_credit() {
    let store = MemoryStore::default();
    let mut assigned = request("t-driven", RequestStatus::InProgress, 90);
    assigned.driver_id = Some(DriverId("d1".to_string()));
    assigned.fare = Some(120.0);
    store.insert_request(RequestKind::Trip, assigned);
    store.insert_request(RequestKind::Trip, request("t-unassigned", RequestStatus::InProgress, 75));
    store.insert_request(RequestKind::Trip, request("t-recent", RequestStatus::InProgress, 30));

    let outcome = advance_requests(&store, RequestKind::Trip, &AdvancerSettings::default(), now())
        .await
        .unwrap();

    assert_eq!(outcome.completed.len(), 2);

    let driven = store.request(RequestKind::Trip, "t-driven");
    assert_eq!(driven.status, RequestStatus::Completed);
    assert_eq!(driven.payment_status, Some(PaymentStatus::Pending));
    assert!(matches!(driven.actual_duration, Some(Minutes(mins)) if (89..=91).contains(&mins)));

    assert_eq!(
        store.credits(),
        vec![(DriverId("d1".to_string()), 120.0, EarningsPolicy::Accumulate)]
    );
    assert_eq!(
        store.request(RequestKind::Trip, "t-recent").status,
        RequestStatus::InProgress
    );
}

#[tokio::test]
async fn missing_fare_credits_zero() {
    let store = MemoryStore::default();
    let mut assigned = request("s1", RequestStatus::InProgress, 61);
    assigned.driver_id = Some(DriverId("p1".to_string()));
    store.insert_request(RequestKind::ServiceRequest, assigned);

    let settings = AdvancerSettings {
        earnings_policy: EarningsPolicy::Overwrite,
        ..AdvancerSettings::default()
    };
    advance_requests(&store, RequestKind::ServiceRequest, &settings, now())
        .await
        .unwrap();

    assert_eq!(
        store.credits(),
        vec![(DriverId("p1".to_string()), 0.0, EarningsPolicy::Overwrite)]
    );
    assert_eq!(store.notifications()[0].title, "Service Request Completed");
}

#[tokio::test]
async fn second_pass_is_a_no_op() {
    let store = MemoryStore::default();
    store.insert_request(RequestKind::Trip, request("t1", RequestStatus::Pending, 10));
    store.insert_request(RequestKind::Trip, request("t2", RequestStatus::InProgress, 70));
    let settings = AdvancerSettings::default();

    let first = advance_requests(&store, RequestKind::Trip, &settings, now()).await.unwrap();
    let second = advance_requests(&store, RequestKind::Trip, &settings, now()).await.unwrap();

    assert_eq!((first.cancelled.len(), first.completed.len()), (1, 1));
    assert_eq!((second.cancelled.len(), second.completed.len()), (0, 0));
    assert_eq!(store.notifications().len(), 2);
}

#[tokio::test]
async fn record_moved_by_someone_else_is_skipped() {
    let store = MemoryStore::default();
    store.insert_request(RequestKind::Trip, request("t1", RequestStatus::Pending, 10));
    store.insert_request(RequestKind::Trip, request("t2", RequestStatus::InProgress, 70));
    store.steal_before_update("t2");

    let outcome = advance_requests(&store, RequestKind::Trip, &AdvancerSettings::default(), now())
        .await
        .unwrap();

    assert_eq!(outcome.cancelled.len(), 1);
    assert!(outcome.completed.is_empty());
    assert!(store.credits().is_empty());
    assert_eq!(store.notifications().len(), 1);
}

#[tokio::test]
async fn failed_query_fails_the_pass() {
    let store = MemoryStore::default();
    store.insert_request(RequestKind::Trip, request("t1", RequestStatus::Pending, 10));
    store.fail_reads();

    assert!(
        advance_requests(&store, RequestKind::Trip, &AdvancerSettings::default(), now())
            .await
            .is_err()
    );
}

#[tokio::test]
async fn failed_notification_still_counts_the_transition() {
    let store = MemoryStore::default();
    store.insert_request(RequestKind::Trip, request("t1", RequestStatus::Pending, 10));
    store.fail_notifications();

    let outcome = advance_requests(&store, RequestKind::Trip, &AdvancerSettings::default(), now())
        .await
        .unwrap();

    assert_eq!(outcome.cancelled.len(), 1);
    assert_eq!(store.request(RequestKind::Trip, "t1").status, RequestStatus::Cancelled);
}

#[tokio::test]
async fn kinds_do_not_leak_into_each_other() {
    let store = MemoryStore::default();
    store.insert_request(RequestKind::ServiceRequest, request("s1", RequestStatus::Pending, 10));

    let outcome = advance_requests(&store, RequestKind::Trip, &AdvancerSettings::default(), now())
        .await
        .unwrap();

    assert!(outcome.cancelled.is_empty());
    assert_eq!(
        store.request(RequestKind::ServiceRequest, "s1").status,
        RequestStatus::Pending
    );
}

#[tokio::test]
async fn terminal_records_are_left_alone() {
    let store = MemoryStore::default();
    store.insert_request(RequestKind::Trip, request("t-done", RequestStatus::Completed, 500));
    store.insert_request(RequestKind::Trip, request("t-gone", RequestStatus::Cancelled, 500));

    let outcome = advance_requests(&store, RequestKind::Trip, &AdvancerSettings::default(), now())
        .await
        .unwrap();

    assert_eq!((outcome.cancelled.len(), outcome.completed.len()), (0, 0));
    assert_eq!(store.request(RequestKind::Trip, "t-done").status, RequestStatus::Completed);
    assert_eq!(store.request(RequestKind::Trip, "t-gone").status, RequestStatus::Cancelled);
    assert!(store.notifications().is_empty());
}
