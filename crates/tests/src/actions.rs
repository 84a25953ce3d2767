/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use chrono::Utc;
use delivery_tracking_service::{
    common::types::*,
    lifecycle::{actions::apply_action, state_machine::RequestAction},
    tools::error::AppError,
};

use crate::memory_store::{request, MemoryStore};

fn id(id: &str) -> RequestId {
    RequestId(id.to_string())
}

fn now() -> TimeStamp {
    TimeStamp(Utc::now())
}

#[tokio::test]
async fn full_lifecycle_through_actor_actions() {
    let store = MemoryStore::default();
    store.insert_request(RequestKind::Trip, request("t1", RequestStatus::Pending, 20));
    let driver = DriverId("d1".to_string());

    let accepted = apply_action(
        &store,
        RequestKind::Trip,
        &id("t1"),
        RequestAction::Accept,
        Some(driver.clone()),
        now(),
    )
    .await
    .unwrap();
    assert_eq!(accepted.status, RequestStatus::Accepted);
    assert_eq!(accepted.driver_id, Some(driver));

    let started = apply_action(&store, RequestKind::Trip, &id("t1"), RequestAction::Start, None, now())
        .await
        .unwrap();
    assert_eq!(started.status, RequestStatus::InProgress);

    let completed =
        apply_action(&store, RequestKind::Trip, &id("t1"), RequestAction::Complete, None, now())
            .await
            .unwrap();
    assert_eq!(completed.status, RequestStatus::Completed);
    assert_eq!(completed.payment_status, Some(PaymentStatus::Pending));
    assert!(matches!(completed.actual_duration, Some(Minutes(mins)) if (19..=21).contains(&mins)));
    assert!(store.credits().is_empty());
}

#[tokio::test]
async fn terminal_records_reject_further_actions() {
    let store = MemoryStore::default();
    store.insert_request(RequestKind::Trip, request("t1", RequestStatus::Completed, 20));

    let err = apply_action(&store, RequestKind::Trip, &id("t1"), RequestAction::Cancel, None, now())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidStatusTransition(_, _)));
    assert_eq!(store.request(RequestKind::Trip, "t1").status, RequestStatus::Completed);
}

#[tokio::test]
async fn accept_requires_a_driver() {
    let store = MemoryStore::default();
    store.insert_request(RequestKind::ServiceRequest, request("s1", RequestStatus::Pending, 1));

    let err = apply_action(
        &store,
        RequestKind::ServiceRequest,
        &id("s1"),
        RequestAction::Accept,
        None,
        now(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::InvalidRequest(_)));
    assert_eq!(
        store.request(RequestKind::ServiceRequest, "s1").status,
        RequestStatus::Pending
    );
}

#[tokio::test]
async fn unknown_record_is_not_found() {
    let store = MemoryStore::default();

    let err = apply_action(&store, RequestKind::Trip, &id("missing"), RequestAction::Start, None, now())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::RequestNotFound(_)));
}

#[tokio::test]
async fn concurrent_change_is_reported_as_conflict() {
    let store = MemoryStore::default();
    store.insert_request(RequestKind::Trip, request("t1", RequestStatus::Accepted, 3));
    store.steal_before_update("t1");

    let err = apply_action(&store, RequestKind::Trip, &id("t1"), RequestAction::Start, None, now())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::StatusChanged(_)));
    assert_eq!(store.request(RequestKind::Trip, "t1").status, RequestStatus::Cancelled);
}
