//! Event types for observing engine activity.
//!
//! The engine publishes these on a broadcast bus after each processed turn.
//! They exist for logging and tests; nothing in the dialog machinery depends
//! on anyone listening.

use crate::catalog::{CategoryId, ItemId, OrderId};
use crate::chat::UserId;
use crate::dialog::FlowTag;
use serde::{Deserialize, Serialize};

/// Main event type encompassing all assistant events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BotEvent {
	/// Dialog lifecycle events.
	Flow(FlowEvent),
	/// Order lifecycle events.
	Order(OrderEvent),
	/// Catalog administration events.
	Admin(AdminEvent),
}

/// Dialog lifecycle events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FlowEvent {
	/// A user entered a flow (replacing any prior state).
	Started { user: UserId, flow: String },
	/// A flow ran its terminal action and cleared state.
	Completed { user: UserId, flow: String },
	/// A flow was cancelled or aborted before its terminal action.
	Cancelled { user: UserId, flow: String },
	/// Input failed a step validator; state was left untouched.
	InputRejected { user: UserId, flow: String, step: String },
	/// An administrative trigger from a non-operator identity was refused.
	AccessDenied { user: UserId },
}

impl FlowEvent {
	/// Started event for the given flow tag.
	pub fn started(user: UserId, flow: FlowTag) -> BotEvent {
		BotEvent::Flow(FlowEvent::Started {
			user,
			flow: flow.as_str().to_string(),
		})
	}
}

/// Order lifecycle events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OrderEvent {
	/// The ordering flow's terminal step recorded a new order.
	Placed {
		order_id: OrderId,
		item_id: ItemId,
		customer: UserId,
	},
	/// The operator accepted an order.
	Accepted { order_id: OrderId },
	/// The operator rejected an order.
	Rejected { order_id: OrderId },
}

/// Catalog administration events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AdminEvent {
	CategoryCreated { id: CategoryId, name: String },
	/// Cascade removal; `items_removed` counts the items deleted with it.
	CategoryDeleted { id: CategoryId, items_removed: usize },
	ItemCreated { id: ItemId, category_id: CategoryId },
	ItemDeleted { id: ItemId },
}
