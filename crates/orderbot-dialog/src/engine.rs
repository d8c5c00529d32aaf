//! The dialog engine: one inbound event in, one deterministic turn out.
//!
//! Dispatch order for a turn:
//! 1. the global cancel token,
//! 2. navigation tokens (welcome menu, operator panel),
//! 3. flow-start triggers, which always replace any prior state for the
//!    identity (operator-only flows refuse other identities without
//!    touching state),
//! 4. the active flow's current step,
//! 5. a hint when nothing matched.
//!
//! Step dispatch is where the idempotence contract lives: input that fails
//! the step's validator produces a re-prompt and leaves state byte-for-byte
//! unchanged, so repeated invalid input can never corrupt or advance a flow.

use crate::flows::{self, Flow};
use crate::prompts::{self, Rendered};
use crate::step::{StepCheck, Transition};
use crate::{terminal, DialogError};
use orderbot_session::SessionStore;
use orderbot_storage::CatalogStore;
use orderbot_types::{
	tokens, BotEvent, ConversationState, FieldBag, FieldValue, FlowEvent, FlowTag, InboundEvent,
	InboundKind, MenuOption, OutboundMessage, StepTag, UserId,
};
use std::sync::Arc;

/// Everything one turn produces: outbound messages (possibly addressed to
/// several recipients, e.g. the operator notification) and observability
/// events.
#[derive(Debug, Default)]
pub struct TurnOutput {
	pub messages: Vec<OutboundMessage>,
	pub events: Vec<BotEvent>,
}

impl TurnOutput {
	fn reply(user: UserId, body: impl Into<String>) -> Self {
		Self {
			messages: vec![OutboundMessage::text(user, body)],
			events: Vec::new(),
		}
	}
}

/// The per-user dialog state machine.
pub struct DialogEngine {
	catalog: Arc<CatalogStore>,
	sessions: SessionStore,
	/// The single configured operator identity.
	operator: UserId,
}

impl DialogEngine {
	/// Creates an engine over the given stores.
	pub fn new(catalog: Arc<CatalogStore>, sessions: SessionStore, operator: UserId) -> Self {
		Self {
			catalog,
			sessions,
			operator,
		}
	}

	/// Advances the sender's dialog by one turn.
	pub async fn advance(&self, event: InboundEvent) -> Result<TurnOutput, DialogError> {
		let user = event.user;
		let token = match &event.kind {
			InboundKind::Button(token) => Some(token.clone()),
			_ => None,
		};

		if let Some(token) = token {
			if token == tokens::CANCEL {
				return Ok(self.cancel(user).await);
			}
			if token == tokens::START {
				self.sessions.clear(user).await;
				return Ok(self.welcome(user));
			}
			if token == tokens::ADMIN_MENU {
				if user != self.operator {
					return Ok(self.access_denied(user));
				}
				self.sessions.clear(user).await;
				return Ok(self.operator_panel(user));
			}

			if let Some((flow, entry, payload)) = flows::resolve_entry(&token) {
				if flow.operator_only && user != self.operator {
					tracing::debug!(%user, flow = flow.tag.as_str(), "Refused admin trigger");
					return Ok(self.access_denied(user));
				}

				let mut fields = FieldBag::new();
				if let Some(name) = entry.field {
					let id = payload.ok_or_else(|| {
						DialogError::Definition(format!(
							"entry for {} writes '{}' but carries no payload",
							flow.tag.as_str(),
							name
						))
					})?;
					fields.insert(name, FieldValue::Id(id));
				}

				tracing::debug!(%user, flow = flow.tag.as_str(), "Flow started");
				let mut out = self
					.apply_transition(user, flow, fields, &entry.next, None)
					.await?;
				out.events.insert(0, FlowEvent::started(user, flow.tag));
				return Ok(out);
			}
		}

		if let Some(state) = self.sessions.get(user).await {
			return self.advance_step(user, state, &event.kind).await;
		}

		Ok(TurnOutput::reply(user, "Send /start to open the menu."))
	}

	/// Dispatches input to the active flow's current step.
	async fn advance_step(
		&self,
		user: UserId,
		state: ConversationState,
		input: &InboundKind,
	) -> Result<TurnOutput, DialogError> {
		let flow = flows::flow(state.flow);
		let Some(step) = flow.step(state.step) else {
			// State referencing an unknown step cannot advance; drop it.
			tracing::warn!(%user, flow = state.flow.as_str(), step = state.step, "Dropping inconsistent state");
			self.sessions.clear(user).await;
			return Ok(TurnOutput::reply(user, "Send /start to open the menu."));
		};

		// Validation failure does not consume the turn: state stays
		// untouched and only the re-prompt goes out.
		let Some(value) = step.validator.validate(input) else {
			tracing::debug!(%user, flow = state.flow.as_str(), step = step.tag, "Input rejected");
			return Ok(TurnOutput {
				messages: vec![OutboundMessage::text(user, step.reprompt)],
				events: vec![BotEvent::Flow(FlowEvent::InputRejected {
					user,
					flow: state.flow.as_str().to_string(),
					step: step.tag.to_string(),
				})],
			});
		};

		if let Some(check) = &step.check {
			if let Some(abort) = self.run_check(user, state.flow, check, &value).await? {
				self.sessions.clear(user).await;
				return Ok(abort);
			}
		}

		let mut fields = state.fields;
		if let Some(name) = step.field {
			fields.insert(name, value.clone());
		}

		self.apply_transition(user, flow, fields, &step.next, Some(&value))
			.await
	}

	/// Applies a transition: advance to a step, route through a branch, or
	/// run a terminal action.
	async fn apply_transition(
		&self,
		user: UserId,
		flow: &'static Flow,
		mut fields: FieldBag,
		next: &Transition,
		last: Option<&FieldValue>,
	) -> Result<TurnOutput, DialogError> {
		match *next {
			Transition::Next(tag) => self.goto_step(user, flow, tag, fields).await,
			Transition::Branch(arms) => {
				let choice = match last {
					Some(FieldValue::Choice(choice)) => choice.as_str(),
					_ => {
						return Err(DialogError::Definition(format!(
							"branch in {} without a preceding choice",
							flow.tag.as_str()
						)))
					}
				};
				let arm = arms.iter().find(|a| a.when == choice).ok_or_else(|| {
					DialogError::Definition(format!(
						"no branch arm for '{}' in {}",
						choice,
						flow.tag.as_str()
					))
				})?;
				for name in arm.mark_absent {
					fields.insert(*name, FieldValue::Absent);
				}
				self.goto_step(user, flow, arm.to, fields).await
			}
			Transition::Finish(action) => {
				// Terminal actions run with no state held; the flow is over
				// whatever the outcome.
				self.sessions.clear(user).await;
				terminal::run(action, flow.tag, user, self.operator, &fields, &self.catalog).await
			}
		}
	}

	/// Makes a step current: renders its prompt and persists the new state.
	///
	/// When the prompt cannot be rendered (the data it depends on is gone or
	/// empty), the flow aborts: the user is informed and state is cleared.
	async fn goto_step(
		&self,
		user: UserId,
		flow: &'static Flow,
		tag: StepTag,
		fields: FieldBag,
	) -> Result<TurnOutput, DialogError> {
		let step = flow.step(tag).ok_or_else(|| {
			DialogError::Definition(format!("unknown step '{}' in {}", tag, flow.tag.as_str()))
		})?;

		match prompts::render(&step.prompt, user, &fields, &self.catalog).await? {
			Rendered::Messages(messages) => {
				self.sessions
					.replace(
						user,
						ConversationState {
							flow: flow.tag,
							step: step.tag,
							fields,
						},
					)
					.await;
				Ok(TurnOutput {
					messages,
					events: Vec::new(),
				})
			}
			Rendered::Abort(messages) => {
				self.sessions.clear(user).await;
				Ok(TurnOutput {
					messages,
					events: vec![BotEvent::Flow(FlowEvent::Cancelled {
						user,
						flow: flow.tag.as_str().to_string(),
					})],
				})
			}
		}
	}

	/// Runs a step's async guard. `Some` means the flow aborts.
	async fn run_check(
		&self,
		user: UserId,
		flow: FlowTag,
		check: &StepCheck,
		value: &FieldValue,
	) -> Result<Option<TurnOutput>, DialogError> {
		match check {
			StepCheck::UniqueCategoryName => {
				let FieldValue::Text(name) = value else {
					return Err(DialogError::Definition(
						"uniqueness check on a non-text value".into(),
					));
				};
				let taken = self
					.catalog
					.list_categories()
					.await?
					.iter()
					.any(|c| c.name == *name);
				if !taken {
					return Ok(None);
				}
				Ok(Some(TurnOutput {
					messages: vec![OutboundMessage::text(
						user,
						format!("A category named '{}' already exists.", name),
					)],
					events: vec![BotEvent::Flow(FlowEvent::Cancelled {
						user,
						flow: flow.as_str().to_string(),
					})],
				}))
			}
		}
	}

	/// Cancels the active flow, if any. Never mutates the catalog.
	async fn cancel(&self, user: UserId) -> TurnOutput {
		match self.sessions.get(user).await {
			Some(state) => {
				self.sessions.clear(user).await;
				TurnOutput {
					messages: vec![OutboundMessage::text(user, "Cancelled.")],
					events: vec![BotEvent::Flow(FlowEvent::Cancelled {
						user,
						flow: state.flow.as_str().to_string(),
					})],
				}
			}
			None => TurnOutput::reply(user, "Nothing to cancel."),
		}
	}

	/// Welcome menu; the admin entry shows only for the operator.
	fn welcome(&self, user: UserId) -> TurnOutput {
		let mut options = vec![MenuOption::new("Catalog", tokens::CATALOG)];
		if user == self.operator {
			options.push(MenuOption::new("Admin panel", tokens::ADMIN_MENU));
		}
		TurnOutput {
			messages: vec![OutboundMessage::menu(
				user,
				"Welcome! Browse the catalog to place an order.",
				options,
			)],
			events: Vec::new(),
		}
	}

	/// Operator panel menu.
	fn operator_panel(&self, user: UserId) -> TurnOutput {
		TurnOutput {
			messages: vec![OutboundMessage::menu(
				user,
				"Operator panel:",
				vec![
					MenuOption::new("Add category", tokens::ADMIN_ADD_CATEGORY),
					MenuOption::new("Delete category", tokens::ADMIN_DEL_CATEGORY),
					MenuOption::new("Add item", tokens::ADMIN_ADD_ITEM),
					MenuOption::new("Delete item", tokens::ADMIN_DEL_ITEM),
					MenuOption::new("Orders", tokens::ADMIN_ORDERS),
					MenuOption::new("Catalog", tokens::CATALOG),
				],
			)],
			events: Vec::new(),
		}
	}

	/// Uniform refusal for administrative triggers from other identities.
	fn access_denied(&self, user: UserId) -> TurnOutput {
		TurnOutput {
			messages: vec![OutboundMessage::text(
				user,
				"You do not have access to this.",
			)],
			events: vec![BotEvent::Flow(FlowEvent::AccessDenied { user })],
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use orderbot_storage::implementations::memory::MemoryStorage;
	use orderbot_storage::StorageService;
	use orderbot_types::{Category, DeliveryMethod, Item, NewItem, OrderStatus, PhotoRef};
	use rust_decimal::Decimal;

	const OPERATOR: UserId = UserId(77);
	const CUSTOMER: UserId = UserId(5);

	fn engine() -> (DialogEngine, Arc<CatalogStore>) {
		let catalog = Arc::new(CatalogStore::new(StorageService::new(Box::new(
			MemoryStorage::new(),
		))));
		let engine = DialogEngine::new(catalog.clone(), SessionStore::new(), OPERATOR);
		(engine, catalog)
	}

	async fn seed_item(catalog: &CatalogStore) -> (Category, Item) {
		let category = catalog.create_category("Roses").await.unwrap();
		let item = catalog
			.create_item(NewItem {
				category_id: category.id,
				name: "Red bouquet".into(),
				description: Some("A dozen red roses".into()),
				price: Decimal::new(49_999, 2),
				photo: None,
			})
			.await
			.unwrap();
		(category, item)
	}

	fn bodies(out: &TurnOutput) -> Vec<String> {
		out.messages
			.iter()
			.map(|m| match m {
				OutboundMessage::Text { body, .. } => body.clone(),
				OutboundMessage::Menu { body, .. } => body.clone(),
				OutboundMessage::PhotoCard { caption, .. } => caption.clone(),
			})
			.collect()
	}

	async fn drive(engine: &DialogEngine, event: InboundEvent) -> TurnOutput {
		engine.advance(event).await.unwrap()
	}

	// Property 1: repeated invalid input never corrupts or advances state.
	#[tokio::test]
	async fn invalid_input_never_consumes_the_turn() {
		let (engine, catalog) = engine();
		let (_, item) = seed_item(&catalog).await;

		drive(&engine, InboundEvent::button(CUSTOMER, tokens::order_item(item.id))).await;
		let before = engine.sessions.get(CUSTOMER).await.unwrap();
		assert_eq!(before.step, "name");

		for bad in [
			InboundEvent::button(CUSTOMER, "bogus-token"),
			InboundEvent::photo(CUSTOMER, PhotoRef("f1".into())),
			InboundEvent::skip(CUSTOMER),
			InboundEvent::text(CUSTOMER, "   "),
		] {
			let out = drive(&engine, bad).await;
			assert_eq!(out.messages.len(), 1);
			assert_eq!(bodies(&out)[0], "Please send your name as text.");
			assert_eq!(engine.sessions.get(CUSTOMER).await.unwrap(), before);
		}
	}

	// Property 2: the pickup path records exactly one order with no address.
	#[tokio::test]
	async fn pickup_order_end_to_end() {
		let (engine, catalog) = engine();
		let (_, item) = seed_item(&catalog).await;

		drive(&engine, InboundEvent::button(CUSTOMER, tokens::order_item(item.id))).await;
		drive(&engine, InboundEvent::text(CUSTOMER, "Ann")).await;
		drive(&engine, InboundEvent::text(CUSTOMER, "+1555")).await;
		let summary = drive(&engine, InboundEvent::button(CUSTOMER, tokens::PICKUP)).await;
		assert!(bodies(&summary)[0].contains("Method: Pickup"));

		let out = drive(&engine, InboundEvent::button(CUSTOMER, tokens::CONFIRM)).await;

		let orders = catalog.list_orders().await.unwrap();
		assert_eq!(orders.len(), 1);
		let order = &orders[0];
		assert_eq!(order.item_id, item.id);
		assert_eq!(order.customer_name, "Ann");
		assert_eq!(order.customer_phone, "+1555");
		assert_eq!(order.delivery_method, DeliveryMethod::Pickup);
		assert_eq!(order.address, None);
		assert_eq!(order.status, OrderStatus::New);

		// State cleared, customer thanked, operator notified.
		assert!(engine.sessions.get(CUSTOMER).await.is_none());
		let to_operator: Vec<_> = out
			.messages
			.iter()
			.filter(|m| m.recipient() == OPERATOR)
			.collect();
		assert_eq!(to_operator.len(), 1);
		assert!(bodies(&out).iter().any(|b| b.contains("New order #1")));
	}

	// Property 3: delivery forces the address step before confirmation.
	#[tokio::test]
	async fn delivery_requires_address_before_confirmation() {
		let (engine, catalog) = engine();
		let (_, item) = seed_item(&catalog).await;

		drive(&engine, InboundEvent::button(CUSTOMER, tokens::order_item(item.id))).await;
		drive(&engine, InboundEvent::text(CUSTOMER, "Ann")).await;
		drive(&engine, InboundEvent::text(CUSTOMER, "+1555")).await;
		let out = drive(&engine, InboundEvent::button(CUSTOMER, tokens::DELIVERY)).await;
		assert_eq!(bodies(&out)[0], "Delivery address:");

		// Confirming without an address is unreachable: the confirm button
		// is just invalid input at the address step.
		let out = drive(&engine, InboundEvent::button(CUSTOMER, tokens::CONFIRM)).await;
		assert_eq!(bodies(&out)[0], "Please send the delivery address as text.");
		assert!(catalog.list_orders().await.unwrap().is_empty());
		assert_eq!(engine.sessions.get(CUSTOMER).await.unwrap().step, "address");

		drive(&engine, InboundEvent::text(CUSTOMER, "12 Main St")).await;
		drive(&engine, InboundEvent::button(CUSTOMER, tokens::CONFIRM)).await;

		let orders = catalog.list_orders().await.unwrap();
		assert_eq!(orders.len(), 1);
		assert_eq!(orders[0].delivery_method, DeliveryMethod::Delivery);
		assert_eq!(orders[0].address.as_deref(), Some("12 Main St"));
	}

	// Property 4: cascade delete via the dialog keeps orders retrievable.
	#[tokio::test]
	async fn category_cascade_keeps_orders_retrievable() {
		let (engine, catalog) = engine();
		let (category, item) = seed_item(&catalog).await;

		drive(&engine, InboundEvent::button(CUSTOMER, tokens::order_item(item.id))).await;
		drive(&engine, InboundEvent::text(CUSTOMER, "Ann")).await;
		drive(&engine, InboundEvent::text(CUSTOMER, "+1555")).await;
		drive(&engine, InboundEvent::button(CUSTOMER, tokens::PICKUP)).await;
		drive(&engine, InboundEvent::button(CUSTOMER, tokens::CONFIRM)).await;

		let out = drive(
			&engine,
			InboundEvent::button(OPERATOR, tokens::delete_category(category.id)),
		)
		.await;
		assert!(bodies(&out)[0].contains("deleted along with 1 item(s)"));

		let order = catalog.get_order(1).await.unwrap().unwrap();
		assert_eq!(order.status, OrderStatus::New);
		assert!(catalog.get_item(order.item_id).await.unwrap().is_none());
	}

	// Property 5: admin triggers from non-operators mutate nothing,
	// regardless of prior conversation state.
	#[tokio::test]
	async fn admin_triggers_refused_for_non_operator() {
		let (engine, catalog) = engine();
		let (category, item) = seed_item(&catalog).await;

		drive(&engine, InboundEvent::button(CUSTOMER, tokens::order_item(item.id))).await;
		let before = engine.sessions.get(CUSTOMER).await.unwrap();

		for trigger in [
			tokens::ADMIN_MENU.to_string(),
			tokens::ADMIN_ADD_CATEGORY.to_string(),
			tokens::ADMIN_ORDERS.to_string(),
			tokens::delete_category(category.id),
			tokens::delete_item(item.id),
			tokens::accept_order(1),
		] {
			let out = drive(&engine, InboundEvent::button(CUSTOMER, trigger)).await;
			assert_eq!(bodies(&out)[0], "You do not have access to this.");
			assert_eq!(engine.sessions.get(CUSTOMER).await.unwrap(), before);
		}

		assert_eq!(catalog.list_categories().await.unwrap().len(), 1);
		assert_eq!(catalog.list_all_items().await.unwrap().len(), 1);
	}

	// Property 6: a non-numeric price re-prompts; a valid one proceeds.
	#[tokio::test]
	async fn invalid_price_reprompts_then_proceeds() {
		let (engine, catalog) = engine();
		let (category, _) = seed_item(&catalog).await;

		drive(&engine, InboundEvent::button(OPERATOR, tokens::ADMIN_ADD_ITEM)).await;
		drive(
			&engine,
			InboundEvent::button(OPERATOR, tokens::add_to_category(category.id)),
		)
		.await;
		drive(&engine, InboundEvent::text(OPERATOR, "White bouquet")).await;
		drive(&engine, InboundEvent::text(OPERATOR, "Seven white roses")).await;

		let out = drive(&engine, InboundEvent::text(OPERATOR, "cheap")).await;
		assert!(bodies(&out)[0].contains("not a valid price"));
		assert_eq!(catalog.list_all_items().await.unwrap().len(), 1);
		assert_eq!(engine.sessions.get(OPERATOR).await.unwrap().step, "price");

		let out = drive(&engine, InboundEvent::text(OPERATOR, "199.50")).await;
		assert!(bodies(&out)[0].contains("photo"));

		drive(&engine, InboundEvent::skip(OPERATOR)).await;
		let items = catalog.list_all_items().await.unwrap();
		assert_eq!(items.len(), 2);
		let created = items.iter().find(|i| i.name == "White bouquet").unwrap();
		assert_eq!(created.price, Decimal::new(19_950, 2));
		assert_eq!(created.photo, None);
		assert!(engine.sessions.get(OPERATOR).await.is_none());
	}

	// Property 7: a flow-start discards stale state completely.
	#[tokio::test]
	async fn flow_start_replaces_stale_state() {
		let (engine, catalog) = engine();
		let (_, item) = seed_item(&catalog).await;

		drive(&engine, InboundEvent::button(OPERATOR, tokens::ADMIN_ADD_CATEGORY)).await;
		assert_eq!(
			engine.sessions.get(OPERATOR).await.unwrap().flow,
			FlowTag::AddCategory
		);

		let out = drive(&engine, InboundEvent::button(OPERATOR, tokens::order_item(item.id))).await;
		assert_eq!(bodies(&out)[0], "What name should we put on the order?");

		let state = engine.sessions.get(OPERATOR).await.unwrap();
		assert_eq!(state.flow, FlowTag::Ordering);
		assert_eq!(state.fields.len(), 1);
		assert_eq!(state.id("item_id"), Some(item.id));
	}

	#[tokio::test]
	async fn duplicate_category_name_aborts_flow() {
		let (engine, catalog) = engine();
		catalog.create_category("Roses").await.unwrap();

		drive(&engine, InboundEvent::button(OPERATOR, tokens::ADMIN_ADD_CATEGORY)).await;
		let out = drive(&engine, InboundEvent::text(OPERATOR, "Roses")).await;

		assert!(bodies(&out)[0].contains("already exists"));
		assert!(engine.sessions.get(OPERATOR).await.is_none());
		assert_eq!(catalog.list_categories().await.unwrap().len(), 1);
	}

	#[tokio::test]
	async fn stale_delete_button_observes_not_found() {
		let (engine, _) = engine();
		let out = drive(&engine, InboundEvent::button(OPERATOR, tokens::delete_category(99))).await;
		assert_eq!(bodies(&out)[0], "Category not found.");
	}

	#[tokio::test]
	async fn cancel_clears_state_without_mutation() {
		let (engine, catalog) = engine();
		let (_, item) = seed_item(&catalog).await;

		drive(&engine, InboundEvent::button(CUSTOMER, tokens::order_item(item.id))).await;
		drive(&engine, InboundEvent::text(CUSTOMER, "Ann")).await;

		let out = drive(&engine, InboundEvent::button(CUSTOMER, tokens::CANCEL)).await;
		assert_eq!(bodies(&out)[0], "Cancelled.");
		assert!(engine.sessions.get(CUSTOMER).await.is_none());
		assert!(catalog.list_orders().await.unwrap().is_empty());

		let out = drive(&engine, InboundEvent::button(CUSTOMER, tokens::CANCEL)).await;
		assert_eq!(bodies(&out)[0], "Nothing to cancel.");
	}

	#[tokio::test]
	async fn browsing_reaches_the_item_card() {
		let (engine, catalog) = engine();
		let (category, item) = seed_item(&catalog).await;

		let out = drive(&engine, InboundEvent::button(CUSTOMER, tokens::CATALOG)).await;
		assert_eq!(bodies(&out)[0], "Categories:");

		let out = drive(&engine, InboundEvent::button(CUSTOMER, tokens::category(category.id))).await;
		assert_eq!(bodies(&out)[0], "Items in this category:");

		let out = drive(&engine, InboundEvent::button(CUSTOMER, tokens::item(item.id))).await;
		let caption = &bodies(&out)[0];
		assert!(caption.contains("Red bouquet"));
		assert!(caption.contains("Price: 499.99"));
		match &out.messages[0] {
			OutboundMessage::Menu { options, .. } => {
				assert_eq!(options[0].token, tokens::order_item(item.id));
				assert_eq!(options[1].token, tokens::category(category.id));
			}
			other => panic!("expected a menu card, got {:?}", other),
		}
		// The card is terminal for browsing; its buttons are triggers.
		assert!(engine.sessions.get(CUSTOMER).await.is_none());
	}

	#[tokio::test]
	async fn browsing_empty_catalog_aborts() {
		let (engine, _) = engine();
		let out = drive(&engine, InboundEvent::button(CUSTOMER, tokens::CATALOG)).await;
		assert_eq!(bodies(&out)[0], "There are no categories yet.");
		assert!(engine.sessions.get(CUSTOMER).await.is_none());
	}

	#[tokio::test]
	async fn confirming_a_vanished_item_cancels_the_order() {
		let (engine, catalog) = engine();
		let (_, item) = seed_item(&catalog).await;

		drive(&engine, InboundEvent::button(CUSTOMER, tokens::order_item(item.id))).await;
		drive(&engine, InboundEvent::text(CUSTOMER, "Ann")).await;
		drive(&engine, InboundEvent::text(CUSTOMER, "+1555")).await;
		drive(&engine, InboundEvent::button(CUSTOMER, tokens::PICKUP)).await;

		catalog.delete_item(item.id).await.unwrap();

		let out = drive(&engine, InboundEvent::button(CUSTOMER, tokens::CONFIRM)).await;
		assert!(bodies(&out)[0].contains("no longer available"));
		assert!(catalog.list_orders().await.unwrap().is_empty());
		assert!(engine.sessions.get(CUSTOMER).await.is_none());
	}

	#[tokio::test]
	async fn welcome_menu_hides_admin_from_customers() {
		let (engine, _) = engine();

		let out = drive(&engine, InboundEvent::button(CUSTOMER, tokens::START)).await;
		match &out.messages[0] {
			OutboundMessage::Menu { options, .. } => {
				assert_eq!(options.len(), 1);
				assert_eq!(options[0].token, tokens::CATALOG);
			}
			other => panic!("expected a menu, got {:?}", other),
		}

		let out = drive(&engine, InboundEvent::button(OPERATOR, tokens::START)).await;
		match &out.messages[0] {
			OutboundMessage::Menu { options, .. } => {
				assert!(options.iter().any(|o| o.token == tokens::ADMIN_MENU));
			}
			other => panic!("expected a menu, got {:?}", other),
		}
	}

	#[tokio::test]
	async fn review_orders_lists_accept_reject_buttons() {
		let (engine, catalog) = engine();
		let (_, item) = seed_item(&catalog).await;

		drive(&engine, InboundEvent::button(CUSTOMER, tokens::order_item(item.id))).await;
		drive(&engine, InboundEvent::text(CUSTOMER, "Ann")).await;
		drive(&engine, InboundEvent::text(CUSTOMER, "+1555")).await;
		drive(&engine, InboundEvent::button(CUSTOMER, tokens::PICKUP)).await;
		drive(&engine, InboundEvent::button(CUSTOMER, tokens::CONFIRM)).await;

		let out = drive(&engine, InboundEvent::button(OPERATOR, tokens::ADMIN_ORDERS)).await;
		assert_eq!(out.messages.len(), 1);
		match &out.messages[0] {
			OutboundMessage::Menu { body, options, .. } => {
				assert!(body.contains("Order #1"));
				assert!(body.contains("Status: New"));
				assert_eq!(options[0].token, tokens::accept_order(1));
				assert_eq!(options[1].token, tokens::reject_order(1));
			}
			other => panic!("expected a menu, got {:?}", other),
		}

		let out = drive(&engine, InboundEvent::button(OPERATOR, tokens::accept_order(1))).await;
		assert_eq!(bodies(&out)[0], "Order #1 confirmed.");
		assert_eq!(
			catalog.get_order(1).await.unwrap().unwrap().status,
			OrderStatus::Confirmed
		);
	}
}
