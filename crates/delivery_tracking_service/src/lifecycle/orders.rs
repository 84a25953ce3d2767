/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::{
    common::{types::*, utils::*},
    environment::AdvancerSettings,
    lifecycle::{advancer::notify, notifications, state_machine::next_order_status},
    store::Store,
    tools::{error::AppError, prometheus::LIFECYCLE_TRANSITIONS},
};
use shared::tools::logger::*;

#[derive(Debug, Default, Clone)]
pub struct OrderPassOutcome {
    pub confirmed: Vec<Order>,
    pub ready: Vec<Order>,
}

impl OrderPassOutcome {
    pub fn updated_count(&self) -> usize {
        self.confirmed.len() + self.ready.len()
    }
}

/// Paid `pending` orders older than `order_confirm_after_mins` become `confirmed`;
/// `preparing` orders older than `order_ready_after_mins` become `ready`.
#[macros::measure_duration]
pub async fn advance_orders(
    store: &dyn Store,
    settings: &AdvancerSettings,
    now: TimeStamp,
) -> Result<OrderPassOutcome, AppError> {
    let mut outcome = OrderPassOutcome::default();

    let pending = store
        .fetch_orders(
            OrderStatus::Pending,
            minutes_before(now, settings.order_confirm_after_mins),
        )
        .await?;

    for order in pending
        .into_iter()
        .filter(|order| order.payment_status == Some(PaymentStatus::Paid))
    {
        if let Some(confirmed) = apply_order_transition(store, &order).await {
            notify(store, &notifications::order_confirmed(&confirmed)).await;
            outcome.confirmed.push(confirmed);
        }
    }

    let preparing = store
        .fetch_orders(
            OrderStatus::Preparing,
            minutes_before(now, settings.order_ready_after_mins),
        )
        .await?;

    for order in preparing {
        if let Some(ready) = apply_order_transition(store, &order).await {
            notify(store, &notifications::order_ready(&ready)).await;
            outcome.ready.push(ready);
        }
    }

    info!(
        tag = "[Order Pass Completed]",
        confirmed = outcome.confirmed.len(),
        ready = outcome.ready.len()
    );

    Ok(outcome)
}

async fn apply_order_transition(store: &dyn Store, order: &Order) -> Option<Order> {
    let status = next_order_status(order.status)?;

    match store
        .transition_order(&order.id, order.status, &OrderPatch { status })
        .await
    {
        Ok(Some(updated)) => {
            LIFECYCLE_TRANSITIONS
                .with_label_values(&["orders", &status.to_string(), "advancer"])
                .inc();
            Some(updated)
        }
        Ok(None) => {
            info!(tag = "[Transition Lost Race]", order_id = %order.id.0, expected = %order.status);
            None
        }
        Err(err) => {
            error!(tag = "[Transition Failed]", order_id = %order.id.0, error = %err.message());
            None
        }
    }
}
