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
    environment::AdvancerSettings,
    lifecycle::orders::advance_orders,
};

use crate::memory_store::{order, MemoryStore};

#[tokio::test]
async fn paid_pending_orders_are_confirmed() {
    let store = MemoryStore::default();
    store.insert_order(order("o-paid", OrderStatus::Pending, Some(PaymentStatus::Paid), 6));
    store.insert_order(order("o-unpaid", OrderStatus::Pending, Some(PaymentStatus::Pending), 6));
    store.insert_order(order("o-no-payment", OrderStatus::Pending, None, 6));
    store.insert_order(order("o-fresh", OrderStatus::Pending, Some(PaymentStatus::Paid), 1));

    let outcome = advance_orders(&store, &AdvancerSettings::default(), TimeStamp(Utc::now()))
        .await
        .unwrap();

    assert_eq!(outcome.updated_count(), 1);
    assert_eq!(store.order("o-paid").status, OrderStatus::Confirmed);
    assert_eq!(store.order("o-unpaid").status, OrderStatus::Pending);
    assert_eq!(store.order("o-no-payment").status, OrderStatus::Pending);
    assert_eq!(store.order("o-fresh").status, OrderStatus::Pending);

    let notifications = store.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].title, "Order Confirmed");
    assert_eq!(notifications[0].notification_type, NotificationType::Order);
}

#[tokio::test]
async fn preparing_orders_become_ready() {
    let store = MemoryStore::default();
    store.insert_order(order("o-slow", OrderStatus::Preparing, Some(PaymentStatus::Paid), 31));
    store.insert_order(order("o-quick", OrderStatus::Preparing, Some(PaymentStatus::Paid), 10));
    store.insert_order(order("o-done", OrderStatus::Delivered, Some(PaymentStatus::Paid), 300));

    let outcome = advance_orders(&store, &AdvancerSettings::default(), TimeStamp(Utc::now()))
        .await
        .unwrap();

    assert_eq!(outcome.ready.len(), 1);
    assert_eq!(outcome.updated_count(), 1);
    assert_eq!(store.order("o-slow").status, OrderStatus::Ready);
    assert_eq!(store.order("o-quick").status, OrderStatus::Preparing);
    assert_eq!(store.order("o-done").status, OrderStatus::Delivered);
    assert_eq!(store.notifications()[0].title, "Order Ready");
}

#[tokio::test]
async fn confirmed_order_is_not_readied_in_the_same_pass() {
    let store = MemoryStore::default();
    store.insert_order(order("o1", OrderStatus::Pending, Some(PaymentStatus::Paid), 45));

    let outcome = advance_orders(&store, &AdvancerSettings::default(), TimeStamp(Utc::now()))
        .await
        .unwrap();

    assert_eq!((outcome.confirmed.len(), outcome.ready.len()), (1, 0));
    assert_eq!(store.order("o1").status, OrderStatus::Confirmed);
}
