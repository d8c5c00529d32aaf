//! Opaque button token encoding and parsing.
//!
//! Every button the assistant renders carries one of these tokens; the
//! transport treats them as opaque strings and delivers them back verbatim.
//! Payload-carrying tokens use a `prefix:id` shape. Centralizing the
//! constants keeps the flow tables and the renderer in agreement.

use crate::catalog::{CategoryId, ItemId, OrderId};

/// Entry point into catalog browsing.
pub const CATALOG: &str = "catalog";
/// Welcome menu / fresh start.
pub const START: &str = "start";
/// Cancels the active flow.
pub const CANCEL: &str = "cancel";
/// Confirms the pending order at the ordering flow's terminal step.
pub const CONFIRM: &str = "confirm";
/// Delivery method choices.
pub const DELIVERY: &str = "delivery";
pub const PICKUP: &str = "pickup";

/// Operator panel and admin flow entry points.
pub const ADMIN_MENU: &str = "admin:menu";
pub const ADMIN_ADD_CATEGORY: &str = "admin:add_category";
pub const ADMIN_ADD_ITEM: &str = "admin:add_item";
pub const ADMIN_DEL_CATEGORY: &str = "admin:del_category";
pub const ADMIN_DEL_ITEM: &str = "admin:del_item";
pub const ADMIN_ORDERS: &str = "admin:orders";

/// Prefixes for payload-carrying tokens.
pub const CATEGORY_PREFIX: &str = "cat:";
pub const ITEM_PREFIX: &str = "item:";
pub const ORDER_ITEM_PREFIX: &str = "order:";
pub const ADD_TO_CATEGORY_PREFIX: &str = "addto:";
pub const DELETE_CATEGORY_PREFIX: &str = "delcat:";
pub const DELETE_ITEM_PREFIX: &str = "delitem:";
pub const ACCEPT_ORDER_PREFIX: &str = "acceptorder:";
pub const REJECT_ORDER_PREFIX: &str = "rejectorder:";

/// Browse a category's items.
pub fn category(id: CategoryId) -> String {
	format!("{}{}", CATEGORY_PREFIX, id)
}

/// Open an item card.
pub fn item(id: ItemId) -> String {
	format!("{}{}", ITEM_PREFIX, id)
}

/// Start the ordering flow for an item.
pub fn order_item(id: ItemId) -> String {
	format!("{}{}", ORDER_ITEM_PREFIX, id)
}

/// Pick the category a new item goes into.
pub fn add_to_category(id: CategoryId) -> String {
	format!("{}{}", ADD_TO_CATEGORY_PREFIX, id)
}

/// Delete a category (cascading its items).
pub fn delete_category(id: CategoryId) -> String {
	format!("{}{}", DELETE_CATEGORY_PREFIX, id)
}

/// Delete an item.
pub fn delete_item(id: ItemId) -> String {
	format!("{}{}", DELETE_ITEM_PREFIX, id)
}

/// Accept an order.
pub fn accept_order(id: OrderId) -> String {
	format!("{}{}", ACCEPT_ORDER_PREFIX, id)
}

/// Reject an order.
pub fn reject_order(id: OrderId) -> String {
	format!("{}{}", REJECT_ORDER_PREFIX, id)
}

/// Extracts the numeric payload of a `prefix:id` token.
///
/// Returns `None` when the prefix does not match or the payload is not a
/// valid id, so malformed tokens fall through to validation failure instead
/// of panicking.
pub fn parse_id(token: &str, prefix: &str) -> Option<u64> {
	token.strip_prefix(prefix)?.parse().ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn round_trips_payload_tokens() {
		assert_eq!(parse_id(&category(12), CATEGORY_PREFIX), Some(12));
		assert_eq!(parse_id(&item(7), ITEM_PREFIX), Some(7));
		assert_eq!(parse_id(&order_item(3), ORDER_ITEM_PREFIX), Some(3));
		assert_eq!(parse_id(&delete_category(9), DELETE_CATEGORY_PREFIX), Some(9));
		assert_eq!(parse_id(&accept_order(1), ACCEPT_ORDER_PREFIX), Some(1));
	}

	#[test]
	fn rejects_foreign_prefix() {
		assert_eq!(parse_id(&category(12), ITEM_PREFIX), None);
	}

	#[test]
	fn rejects_malformed_payload() {
		assert_eq!(parse_id("cat:", CATEGORY_PREFIX), None);
		assert_eq!(parse_id("cat:abc", CATEGORY_PREFIX), None);
		assert_eq!(parse_id("cat:-3", CATEGORY_PREFIX), None);
	}
}
