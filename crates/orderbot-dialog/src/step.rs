//! Building blocks of flow definitions.
//!
//! A flow is an ordered table of steps. Each step declares the input it
//! accepts (a validator), the field it writes on success, the prompt and
//! re-prompt it shows, and the transition taken afterwards. Conditional
//! routing is part of the table ([`Transition::Branch`]), not ad hoc logic in
//! handlers.

use orderbot_types::{tokens, FieldName, FieldValue, InboundKind, StepTag};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Matches a button token, either exactly or by `prefix:id` shape.
#[derive(Debug, Clone, Copy)]
pub enum TokenPattern {
	/// The token must equal this string.
	Exact(&'static str),
	/// The token must be this prefix followed by a numeric payload.
	Prefix(&'static str),
}

impl TokenPattern {
	/// Matches a token against this pattern.
	///
	/// Returns `Some(payload)` on a match; the payload is present only for
	/// prefix patterns. A prefix with a malformed payload does not match at
	/// all, so garbage tokens fall through to validation failure.
	pub fn match_token(&self, token: &str) -> Option<Option<u64>> {
		match self {
			TokenPattern::Exact(s) => (token == *s).then_some(None),
			TokenPattern::Prefix(p) => tokens::parse_id(token, p).map(Some),
		}
	}
}

/// Input validation predicate of one step.
#[derive(Debug, Clone, Copy)]
pub enum Validator {
	/// Free text that is non-empty after trimming.
	NonEmptyText,
	/// Text parsing as a non-negative decimal.
	NonNegativeDecimal,
	/// A button press matching one of the listed patterns.
	OneOf(&'static [TokenPattern]),
	/// A photo upload, or the explicit skip marker.
	PhotoOrSkip,
}

impl Validator {
	/// Validates an inbound input against this predicate.
	///
	/// On success returns the field value the step records; on failure
	/// returns `None` and the caller re-prompts without touching state.
	pub fn validate(&self, input: &InboundKind) -> Option<FieldValue> {
		match (self, input) {
			(Validator::NonEmptyText, InboundKind::Text(text)) => {
				let trimmed = text.trim();
				(!trimmed.is_empty()).then(|| FieldValue::Text(trimmed.to_string()))
			}
			(Validator::NonNegativeDecimal, InboundKind::Text(text)) => {
				match Decimal::from_str(text.trim()) {
					Ok(value) if value >= Decimal::ZERO => Some(FieldValue::Number(value)),
					_ => None,
				}
			}
			(Validator::OneOf(patterns), InboundKind::Button(token)) => {
				patterns.iter().find_map(|p| {
					p.match_token(token).map(|payload| match payload {
						Some(id) => FieldValue::Id(id),
						None => FieldValue::Choice(token.clone()),
					})
				})
			}
			(Validator::PhotoOrSkip, InboundKind::Photo(photo)) => {
				Some(FieldValue::Photo(photo.clone()))
			}
			(Validator::PhotoOrSkip, InboundKind::Skip) => Some(FieldValue::Absent),
			_ => None,
		}
	}
}

/// One conditional route out of a step.
///
/// Taken when the value just written equals `when`; any fields listed in
/// `mark_absent` are recorded as explicitly absent before moving on.
#[derive(Debug, Clone, Copy)]
pub struct BranchArm {
	pub when: &'static str,
	pub to: StepTag,
	pub mark_absent: &'static [FieldName],
}

/// Where a successful step leads.
#[derive(Debug, Clone, Copy)]
pub enum Transition {
	/// Advance to the named step and show its prompt.
	Next(StepTag),
	/// Route conditionally on the choice just collected.
	Branch(&'static [BranchArm]),
	/// Run a terminal action and clear the conversation state.
	Finish(TerminalAction),
}

/// Durable effect of a flow's terminal step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalAction {
	/// Render an item card (browsing has no durable effect).
	ShowItem,
	/// Record a new order and notify the operator.
	PlaceOrder,
	/// Create a category.
	CreateCategory,
	/// Create an item.
	CreateItem,
	/// Delete a category, cascading its items.
	DeleteCategory,
	/// Delete an item.
	DeleteItem,
	/// Render all orders with accept/reject buttons (no durable effect).
	ShowOrders,
	/// Mark an order confirmed.
	AcceptOrder,
	/// Mark an order cancelled.
	RejectOrder,
}

/// Async guard run after a step's validator passes.
#[derive(Debug, Clone, Copy)]
pub enum StepCheck {
	/// The collected category name must not already exist; a hit aborts the
	/// flow back to the menu rather than re-prompting.
	UniqueCategoryName,
}

/// What a step shows when it becomes current.
///
/// Menu prompts are rendered against live catalog data; rendering may abort
/// the flow when the data it needs is gone (e.g. the ordered item vanished
/// before the confirmation step).
#[derive(Debug, Clone, Copy)]
pub enum Prompt {
	/// Fixed text.
	Static(&'static str),
	/// Category menu for browsing.
	Categories,
	/// Item menu for the category collected so far.
	Items,
	/// Category menu for item creation.
	AddItemCategories,
	/// Delivery/pickup choice.
	DeliveryMethods,
	/// Order summary with confirm/cancel buttons.
	OrderSummary,
	/// Category menu for deletion.
	DeleteCategories,
	/// Item menu for deletion.
	DeleteItems,
}

/// One step of a flow definition.
#[derive(Debug)]
pub struct Step {
	/// Step name, unique within the flow.
	pub tag: StepTag,
	/// Input shapes and predicate this step accepts.
	pub validator: Validator,
	/// Optional async guard run after validation.
	pub check: Option<StepCheck>,
	/// Field written on success.
	pub field: Option<FieldName>,
	/// Prompt shown when the step becomes current.
	pub prompt: Prompt,
	/// Re-prompt shown on validation failure, describing the expected input.
	pub reprompt: &'static str,
	/// Transition applied after a successful turn.
	pub next: Transition,
}

#[cfg(test)]
mod tests {
	use super::*;
	use orderbot_types::PhotoRef;

	#[test]
	fn non_empty_text_trims() {
		let v = Validator::NonEmptyText;
		assert_eq!(
			v.validate(&InboundKind::Text("  Ann  ".into())),
			Some(FieldValue::Text("Ann".into()))
		);
		assert_eq!(v.validate(&InboundKind::Text("   ".into())), None);
		assert_eq!(v.validate(&InboundKind::Button("x".into())), None);
	}

	#[test]
	fn decimal_rejects_negative_and_garbage() {
		let v = Validator::NonNegativeDecimal;
		assert_eq!(
			v.validate(&InboundKind::Text("499.99".into())),
			Some(FieldValue::Number(Decimal::new(49_999, 2)))
		);
		assert_eq!(
			v.validate(&InboundKind::Text("0".into())),
			Some(FieldValue::Number(Decimal::ZERO))
		);
		assert_eq!(v.validate(&InboundKind::Text("-1".into())), None);
		assert_eq!(v.validate(&InboundKind::Text("cheap".into())), None);
	}

	#[test]
	fn one_of_distinguishes_exact_and_prefix() {
		let v = Validator::OneOf(&[
			TokenPattern::Exact("pickup"),
			TokenPattern::Prefix("cat:"),
		]);
		assert_eq!(
			v.validate(&InboundKind::Button("pickup".into())),
			Some(FieldValue::Choice("pickup".into()))
		);
		assert_eq!(
			v.validate(&InboundKind::Button("cat:8".into())),
			Some(FieldValue::Id(8))
		);
		assert_eq!(v.validate(&InboundKind::Button("cat:x".into())), None);
		assert_eq!(v.validate(&InboundKind::Text("pickup".into())), None);
	}

	#[test]
	fn photo_or_skip() {
		let v = Validator::PhotoOrSkip;
		assert_eq!(
			v.validate(&InboundKind::Photo(PhotoRef("f1".into()))),
			Some(FieldValue::Photo(PhotoRef("f1".into())))
		);
		assert_eq!(v.validate(&InboundKind::Skip), Some(FieldValue::Absent));
		assert_eq!(v.validate(&InboundKind::Text("/skip maybe".into())), None);
	}
}
