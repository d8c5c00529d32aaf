//! Conversation state types.
//!
//! Each user has at most one active flow. The state records which flow, which
//! step within it, and the bag of fields collected so far. A flow-start
//! always replaces the whole state; completion, cancellation, and aborts
//! clear it.

use crate::chat::PhotoRef;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// The multi-step conversations the assistant understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowTag {
	/// Customer catalog browsing: categories, items, item card.
	Browsing,
	/// Customer order placement.
	Ordering,
	/// Operator: create a category.
	AddCategory,
	/// Operator: create an item (category, name, description, price, photo).
	AddItem,
	/// Operator: delete a category and cascade its items.
	DeleteCategory,
	/// Operator: delete a single item.
	DeleteItem,
	/// Operator: review orders and accept/reject them.
	ReviewOrders,
}

impl FlowTag {
	/// Returns the log-friendly name of the flow.
	pub fn as_str(&self) -> &'static str {
		match self {
			FlowTag::Browsing => "browsing",
			FlowTag::Ordering => "ordering",
			FlowTag::AddCategory => "add_category",
			FlowTag::AddItem => "add_item",
			FlowTag::DeleteCategory => "delete_category",
			FlowTag::DeleteItem => "delete_item",
			FlowTag::ReviewOrders => "review_orders",
		}
	}
}

/// Name of a step within a flow, referencing the flow's definition table.
pub type StepTag = &'static str;

/// Name of a collected field, referencing the flow's definition table.
pub type FieldName = &'static str;

/// A value collected at some step of a flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
	/// Trimmed free text.
	Text(String),
	/// Parsed non-negative decimal.
	Number(Decimal),
	/// One token out of an enumerated choice.
	Choice(String),
	/// Identifier parsed out of an opaque button token.
	Id(u64),
	/// Photo handle.
	Photo(PhotoRef),
	/// Explicitly absent (skipped photo, pickup address).
	Absent,
}

/// Bag of fields collected so far in a flow.
pub type FieldBag = HashMap<FieldName, FieldValue>;

/// The per-user dialog position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationState {
	/// The active flow.
	pub flow: FlowTag,
	/// Current step within the flow.
	pub step: StepTag,
	/// Fields collected by earlier steps.
	pub fields: FieldBag,
}

impl ConversationState {
	/// Creates fresh state at the given step with an empty fields bag.
	pub fn at(flow: FlowTag, step: StepTag) -> Self {
		Self {
			flow,
			step,
			fields: FieldBag::new(),
		}
	}

	/// Convenience accessor for a collected text field.
	pub fn text(&self, name: FieldName) -> Option<&str> {
		match self.fields.get(name) {
			Some(FieldValue::Text(s)) => Some(s),
			_ => None,
		}
	}

	/// Convenience accessor for a collected id field.
	pub fn id(&self, name: FieldName) -> Option<u64> {
		match self.fields.get(name) {
			Some(FieldValue::Id(id)) => Some(*id),
			_ => None,
		}
	}
}
