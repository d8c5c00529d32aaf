//! Declarative flow definitions.
//!
//! Every conversation the assistant supports is one table here: its entry
//! triggers, its step sequence, and its terminal action. The engine contains
//! no per-flow logic; changing a flow means changing its table.
//!
//! Entries double as the trigger set: a token matching an entry starts (or
//! re-enters) the flow, replacing any prior state for the identity. That is
//! what makes stale buttons from old menus safe: they simply re-enter the
//! flow at the right place.

use crate::step::{
	BranchArm, Prompt, Step, StepCheck, TerminalAction, TokenPattern, Transition, Validator,
};
use orderbot_types::{tokens, FieldName, FlowTag, StepTag};

/// A flow-start trigger: the token pattern, the field its payload writes,
/// and the transition taken on entry.
#[derive(Debug)]
pub struct Entry {
	pub on: TokenPattern,
	pub field: Option<FieldName>,
	pub next: Transition,
}

/// One flow definition.
#[derive(Debug)]
pub struct Flow {
	pub tag: FlowTag,
	/// Whether only the configured operator may enter this flow.
	pub operator_only: bool,
	pub entries: &'static [Entry],
	pub steps: &'static [Step],
}

impl Flow {
	/// Looks up a step of this flow by tag.
	pub fn step(&self, tag: StepTag) -> Option<&Step> {
		self.steps.iter().find(|s| s.tag == tag)
	}
}

/// All flow definitions.
pub static FLOWS: &[Flow] = &[
	// Customer: browse categories -> items -> item card.
	Flow {
		tag: FlowTag::Browsing,
		operator_only: false,
		entries: &[
			Entry {
				on: TokenPattern::Exact(tokens::CATALOG),
				field: None,
				next: Transition::Next("choose_category"),
			},
			Entry {
				on: TokenPattern::Prefix(tokens::CATEGORY_PREFIX),
				field: Some("category_id"),
				next: Transition::Next("choose_item"),
			},
			Entry {
				on: TokenPattern::Prefix(tokens::ITEM_PREFIX),
				field: Some("item_id"),
				next: Transition::Finish(TerminalAction::ShowItem),
			},
		],
		steps: &[
			Step {
				tag: "choose_category",
				validator: Validator::OneOf(&[TokenPattern::Prefix(tokens::CATEGORY_PREFIX)]),
				check: None,
				field: Some("category_id"),
				prompt: Prompt::Categories,
				reprompt: "Pick a category using the buttons.",
				next: Transition::Next("choose_item"),
			},
			Step {
				tag: "choose_item",
				validator: Validator::OneOf(&[TokenPattern::Prefix(tokens::ITEM_PREFIX)]),
				check: None,
				field: Some("item_id"),
				prompt: Prompt::Items,
				reprompt: "Pick an item using the buttons.",
				next: Transition::Finish(TerminalAction::ShowItem),
			},
		],
	},
	// Customer: place an order for one item.
	Flow {
		tag: FlowTag::Ordering,
		operator_only: false,
		entries: &[Entry {
			on: TokenPattern::Prefix(tokens::ORDER_ITEM_PREFIX),
			field: Some("item_id"),
			next: Transition::Next("name"),
		}],
		steps: &[
			Step {
				tag: "name",
				validator: Validator::NonEmptyText,
				check: None,
				field: Some("customer_name"),
				prompt: Prompt::Static("What name should we put on the order?"),
				reprompt: "Please send your name as text.",
				next: Transition::Next("phone"),
			},
			Step {
				tag: "phone",
				validator: Validator::NonEmptyText,
				check: None,
				field: Some("customer_phone"),
				prompt: Prompt::Static("Your phone number (for example +77001234567):"),
				reprompt: "Please send your phone number as text.",
				next: Transition::Next("delivery_method"),
			},
			Step {
				tag: "delivery_method",
				validator: Validator::OneOf(&[
					TokenPattern::Exact(tokens::DELIVERY),
					TokenPattern::Exact(tokens::PICKUP),
				]),
				check: None,
				field: Some("delivery_method"),
				prompt: Prompt::DeliveryMethods,
				reprompt: "Please choose delivery or pickup using the buttons.",
				// The address step exists only for delivery; pickup records
				// the address as explicitly absent and goes straight to
				// confirmation.
				next: Transition::Branch(&[
					BranchArm {
						when: tokens::DELIVERY,
						to: "address",
						mark_absent: &[],
					},
					BranchArm {
						when: tokens::PICKUP,
						to: "confirm",
						mark_absent: &["address"],
					},
				]),
			},
			Step {
				tag: "address",
				validator: Validator::NonEmptyText,
				check: None,
				field: Some("address"),
				prompt: Prompt::Static("Delivery address:"),
				reprompt: "Please send the delivery address as text.",
				next: Transition::Next("confirm"),
			},
			Step {
				tag: "confirm",
				validator: Validator::OneOf(&[TokenPattern::Exact(tokens::CONFIRM)]),
				check: None,
				field: None,
				prompt: Prompt::OrderSummary,
				reprompt: "Please use the confirm or cancel buttons.",
				next: Transition::Finish(TerminalAction::PlaceOrder),
			},
		],
	},
	// Operator: create a category.
	Flow {
		tag: FlowTag::AddCategory,
		operator_only: true,
		entries: &[Entry {
			on: TokenPattern::Exact(tokens::ADMIN_ADD_CATEGORY),
			field: None,
			next: Transition::Next("name"),
		}],
		steps: &[Step {
			tag: "name",
			validator: Validator::NonEmptyText,
			check: Some(StepCheck::UniqueCategoryName),
			field: Some("name"),
			prompt: Prompt::Static("Name for the new category:"),
			reprompt: "Category name cannot be empty.",
			next: Transition::Finish(TerminalAction::CreateCategory),
		}],
	},
	// Operator: create an item (category, name, description, price, photo).
	Flow {
		tag: FlowTag::AddItem,
		operator_only: true,
		entries: &[Entry {
			on: TokenPattern::Exact(tokens::ADMIN_ADD_ITEM),
			field: None,
			next: Transition::Next("category"),
		}],
		steps: &[
			Step {
				tag: "category",
				validator: Validator::OneOf(&[TokenPattern::Prefix(
					tokens::ADD_TO_CATEGORY_PREFIX,
				)]),
				check: None,
				field: Some("category_id"),
				prompt: Prompt::AddItemCategories,
				reprompt: "Pick a category using the buttons.",
				next: Transition::Next("name"),
			},
			Step {
				tag: "name",
				validator: Validator::NonEmptyText,
				check: None,
				field: Some("name"),
				prompt: Prompt::Static("Item name:"),
				reprompt: "Item name cannot be empty.",
				next: Transition::Next("description"),
			},
			Step {
				tag: "description",
				validator: Validator::NonEmptyText,
				check: None,
				field: Some("description"),
				prompt: Prompt::Static("Item description:"),
				reprompt: "Please send the description as text.",
				next: Transition::Next("price"),
			},
			Step {
				tag: "price",
				validator: Validator::NonNegativeDecimal,
				check: None,
				field: Some("price"),
				prompt: Prompt::Static("Price (for example 499.99):"),
				reprompt: "That is not a valid price. Send a number like 199.50.",
				next: Transition::Next("photo"),
			},
			Step {
				tag: "photo",
				validator: Validator::PhotoOrSkip,
				check: None,
				field: Some("photo"),
				prompt: Prompt::Static(
					"Send a photo of the item, or /skip to add it without one.",
				),
				reprompt: "Please send a photo or /skip.",
				next: Transition::Finish(TerminalAction::CreateItem),
			},
		],
	},
	// Operator: delete a category (single-step; no extra confirmation).
	Flow {
		tag: FlowTag::DeleteCategory,
		operator_only: true,
		entries: &[
			Entry {
				on: TokenPattern::Exact(tokens::ADMIN_DEL_CATEGORY),
				field: None,
				next: Transition::Next("pick"),
			},
			Entry {
				on: TokenPattern::Prefix(tokens::DELETE_CATEGORY_PREFIX),
				field: Some("category_id"),
				next: Transition::Finish(TerminalAction::DeleteCategory),
			},
		],
		steps: &[Step {
			tag: "pick",
			validator: Validator::OneOf(&[TokenPattern::Prefix(tokens::DELETE_CATEGORY_PREFIX)]),
			check: None,
			field: Some("category_id"),
			prompt: Prompt::DeleteCategories,
			reprompt: "Pick a category using the buttons.",
			next: Transition::Finish(TerminalAction::DeleteCategory),
		}],
	},
	// Operator: delete an item (single-step; no extra confirmation).
	Flow {
		tag: FlowTag::DeleteItem,
		operator_only: true,
		entries: &[
			Entry {
				on: TokenPattern::Exact(tokens::ADMIN_DEL_ITEM),
				field: None,
				next: Transition::Next("pick"),
			},
			Entry {
				on: TokenPattern::Prefix(tokens::DELETE_ITEM_PREFIX),
				field: Some("item_id"),
				next: Transition::Finish(TerminalAction::DeleteItem),
			},
		],
		steps: &[Step {
			tag: "pick",
			validator: Validator::OneOf(&[TokenPattern::Prefix(tokens::DELETE_ITEM_PREFIX)]),
			check: None,
			field: Some("item_id"),
			prompt: Prompt::DeleteItems,
			reprompt: "Pick an item using the buttons.",
			next: Transition::Finish(TerminalAction::DeleteItem),
		}],
	},
	// Operator: review orders; accept/reject are immediately terminal so
	// buttons under any listed order keep working later.
	Flow {
		tag: FlowTag::ReviewOrders,
		operator_only: true,
		entries: &[
			Entry {
				on: TokenPattern::Exact(tokens::ADMIN_ORDERS),
				field: None,
				next: Transition::Finish(TerminalAction::ShowOrders),
			},
			Entry {
				on: TokenPattern::Prefix(tokens::ACCEPT_ORDER_PREFIX),
				field: Some("order_id"),
				next: Transition::Finish(TerminalAction::AcceptOrder),
			},
			Entry {
				on: TokenPattern::Prefix(tokens::REJECT_ORDER_PREFIX),
				field: Some("order_id"),
				next: Transition::Finish(TerminalAction::RejectOrder),
			},
		],
		steps: &[],
	},
];

/// Looks up a flow definition by tag.
pub fn flow(tag: FlowTag) -> &'static Flow {
	// Every FlowTag variant has exactly one table entry.
	FLOWS
		.iter()
		.find(|f| f.tag == tag)
		.unwrap_or(&FLOWS[0])
}

/// Resolves a button token against all flow entries.
///
/// Returns the flow, the matching entry, and the parsed payload for prefix
/// patterns.
pub fn resolve_entry(token: &str) -> Option<(&'static Flow, &'static Entry, Option<u64>)> {
	for flow in FLOWS {
		for entry in flow.entries {
			if let Some(payload) = entry.on.match_token(token) {
				return Some((flow, entry, payload));
			}
		}
	}
	None
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn every_flow_tag_has_a_table() {
		for tag in [
			FlowTag::Browsing,
			FlowTag::Ordering,
			FlowTag::AddCategory,
			FlowTag::AddItem,
			FlowTag::DeleteCategory,
			FlowTag::DeleteItem,
			FlowTag::ReviewOrders,
		] {
			assert_eq!(flow(tag).tag, tag);
		}
	}

	#[test]
	fn transitions_reference_existing_steps() {
		for flow in FLOWS {
			let check = |t: &Transition| match *t {
				Transition::Next(tag) => {
					assert!(flow.step(tag).is_some(), "{:?} -> {}", flow.tag, tag)
				}
				Transition::Branch(arms) => {
					for arm in arms {
						assert!(flow.step(arm.to).is_some(), "{:?} -> {}", flow.tag, arm.to);
					}
				}
				Transition::Finish(_) => {}
			};
			for entry in flow.entries {
				check(&entry.next);
			}
			for step in flow.steps {
				check(&step.next);
			}
		}
	}

	#[test]
	fn entry_tokens_resolve_to_their_flow() {
		let (flow, _, payload) = resolve_entry("order:5").unwrap();
		assert_eq!(flow.tag, FlowTag::Ordering);
		assert_eq!(payload, Some(5));

		let (flow, _, _) = resolve_entry("catalog").unwrap();
		assert_eq!(flow.tag, FlowTag::Browsing);

		let (flow, _, _) = resolve_entry("delcat:3").unwrap();
		assert_eq!(flow.tag, FlowTag::DeleteCategory);
		assert!(flow.operator_only);

		assert!(resolve_entry("order:").is_none());
		assert!(resolve_entry("unknown").is_none());
	}

	#[test]
	fn admin_flows_are_operator_only() {
		for flow in FLOWS {
			let admin = matches!(
				flow.tag,
				FlowTag::AddCategory
					| FlowTag::AddItem
					| FlowTag::DeleteCategory
					| FlowTag::DeleteItem
					| FlowTag::ReviewOrders
			);
			assert_eq!(flow.operator_only, admin, "{:?}", flow.tag);
		}
	}
}
