/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::types::*;
use serde_json::json;

pub fn request_cancelled(kind: RequestKind, record: &LifecycleRecord) -> Notification {
    let message = match kind {
        RequestKind::Trip => "No drivers were available for your trip. Please try again.",
        RequestKind::ServiceRequest => {
            "No providers were available for your service request. Please try again."
        }
    };
    Notification {
        user_id: record.user_id.to_owned(),
        notification_type: kind.notification_type(),
        title: format!("{} Cancelled", kind.label()),
        message: message.to_string(),
        data: json!({ kind.id_field(): record.id }),
    }
}

pub fn request_completed(kind: RequestKind, record: &LifecycleRecord) -> Notification {
    let fare = record.fare.unwrap_or_default();
    let noun = match kind {
        RequestKind::Trip => "trip",
        RequestKind::ServiceRequest => "service request",
    };
    Notification {
        user_id: record.user_id.to_owned(),
        notification_type: kind.notification_type(),
        title: format!("{} Completed", kind.label()),
        message: format!("Your {noun} has been completed. Total fare: {fare}"),
        data: json!({ kind.id_field(): record.id, "fare": fare }),
    }
}

pub fn order_confirmed(order: &Order) -> Notification {
    Notification {
        user_id: order.user_id.to_owned(),
        notification_type: NotificationType::Order,
        title: "Order Confirmed".to_string(),
        message: format!(
            "Your order #{} has been confirmed and is being prepared.",
            order.order_number
        ),
        data: json!({ "orderId": order.id }),
    }
}

pub fn order_ready(order: &Order) -> Notification {
    Notification {
        user_id: order.user_id.to_owned(),
        notification_type: NotificationType::Order,
        title: "Order Ready".to_string(),
        message: format!(
            "Your order #{} is ready for pickup/delivery.",
            order.order_number
        ),
        data: json!({ "orderId": order.id }),
    }
}
