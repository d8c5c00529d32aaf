//! Catalog record types: categories, items, and customer orders.
//!
//! These are the durable records managed by the catalog store. Categories own
//! items (deleting a category cascades over its items); orders reference an
//! item by id and must tolerate that item disappearing later.

use crate::chat::{PhotoRef, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier for a catalog category.
pub type CategoryId = u64;
/// Identifier for a catalog item.
pub type ItemId = u64;
/// Identifier for a customer order.
pub type OrderId = u64;

/// A named grouping of items.
///
/// Category names are unique across the catalog; creation with a taken name
/// is refused with a typed conflict signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
	/// Stable identifier.
	pub id: CategoryId,
	/// Unique display name.
	pub name: String,
}

/// A sellable catalog entry.
///
/// Items are never mutated in place; corrections are delete + recreate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
	/// Stable identifier.
	pub id: ItemId,
	/// Owning category.
	pub category_id: CategoryId,
	/// Display name.
	pub name: String,
	/// Optional free-text description.
	pub description: Option<String>,
	/// Non-negative price.
	pub price: Decimal,
	/// Optional transport-issued photo handle.
	pub photo: Option<PhotoRef>,
}

/// Fields required to create a new item.
#[derive(Debug, Clone)]
pub struct NewItem {
	pub category_id: CategoryId,
	pub name: String,
	pub description: Option<String>,
	pub price: Decimal,
	pub photo: Option<PhotoRef>,
}

/// How the customer wants to receive an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
	/// Courier delivery to an address collected during the flow.
	Delivery,
	/// Customer pickup; no address is collected.
	Pickup,
}

impl DeliveryMethod {
	/// Returns the token/config string for this method.
	pub fn as_str(&self) -> &'static str {
		match self {
			DeliveryMethod::Delivery => "delivery",
			DeliveryMethod::Pickup => "pickup",
		}
	}

	/// Parses a method from its token string.
	pub fn parse(s: &str) -> Option<Self> {
		match s {
			"delivery" => Some(DeliveryMethod::Delivery),
			"pickup" => Some(DeliveryMethod::Pickup),
			_ => None,
		}
	}

	/// Human-readable label used in summaries.
	pub fn label(&self) -> &'static str {
		match self {
			DeliveryMethod::Delivery => "Delivery",
			DeliveryMethod::Pickup => "Pickup",
		}
	}
}

/// Review status of an order.
///
/// Orders start as `New` and are moved to `Confirmed` or `Cancelled` only by
/// operator actions. Orders are never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
	New,
	Confirmed,
	Cancelled,
}

impl OrderStatus {
	/// Human-readable label used in summaries.
	pub fn label(&self) -> &'static str {
		match self {
			OrderStatus::New => "New",
			OrderStatus::Confirmed => "Confirmed",
			OrderStatus::Cancelled => "Cancelled",
		}
	}
}

/// A placed customer order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
	/// Stable identifier.
	pub id: OrderId,
	/// The ordered item. May point at a deleted item; lookups must treat
	/// that as a routine absence, not an error.
	pub item_id: ItemId,
	/// Chat identity of the customer.
	pub customer_id: UserId,
	/// Name supplied during the ordering flow.
	pub customer_name: String,
	/// Contact phone supplied during the ordering flow.
	pub customer_phone: String,
	/// Chosen delivery method.
	pub delivery_method: DeliveryMethod,
	/// Present iff `delivery_method` is `Delivery`.
	pub address: Option<String>,
	/// Review status, mutated only by operator actions.
	pub status: OrderStatus,
	/// Creation timestamp.
	pub created_at: DateTime<Utc>,
}

/// Fields collected by the ordering flow's terminal step.
#[derive(Debug, Clone)]
pub struct NewOrder {
	pub item_id: ItemId,
	pub customer_id: UserId,
	pub customer_name: String,
	pub customer_phone: String,
	pub delivery_method: DeliveryMethod,
	pub address: Option<String>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn delivery_method_round_trip() {
		for method in [DeliveryMethod::Delivery, DeliveryMethod::Pickup] {
			assert_eq!(DeliveryMethod::parse(method.as_str()), Some(method));
		}
		assert_eq!(DeliveryMethod::parse("courier"), None);
	}

	#[test]
	fn order_serde_round_trip() {
		let order = Order {
			id: 7,
			item_id: 3,
			customer_id: UserId(42),
			customer_name: "Ann".into(),
			customer_phone: "+1555".into(),
			delivery_method: DeliveryMethod::Pickup,
			address: None,
			status: OrderStatus::New,
			created_at: Utc::now(),
		};
		let json = serde_json::to_string(&order).unwrap();
		let back: Order = serde_json::from_str(&json).unwrap();
		assert_eq!(back, order);
	}
}
