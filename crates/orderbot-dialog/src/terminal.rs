//! Terminal actions: the durable effects at the end of a flow.
//!
//! A terminal action runs only after every step of its flow validated. It
//! performs the catalog write (or read, for the render-only actions), builds
//! the user-facing output plus any operator notification, emits a typed
//! event, and the engine clears the conversation state afterwards.
//!
//! Records vanishing between listing and action are routine here: the user
//! is informed and nothing crashes.

use crate::bag;
use crate::engine::TurnOutput;
use crate::step::TerminalAction;
use crate::DialogError;
use orderbot_storage::{CatalogError, CatalogStore};
use orderbot_types::{
	tokens, AdminEvent, BotEvent, DeliveryMethod, FieldBag, FlowEvent, FlowTag, Item, MenuOption,
	NewItem, NewOrder, Order, OrderEvent, OrderStatus, OutboundMessage, UserId,
};

/// Runs a terminal action for the given user and collected fields.
pub(crate) async fn run(
	action: TerminalAction,
	flow: FlowTag,
	user: UserId,
	operator: UserId,
	fields: &FieldBag,
	catalog: &CatalogStore,
) -> Result<TurnOutput, DialogError> {
	let mut out = TurnOutput::default();

	match action {
		TerminalAction::ShowItem => {
			let item_id = bag::id(fields, "item_id")?;
			match catalog.get_item(item_id).await? {
				Some(item) => {
					out.messages.push(item_card(user, &item));
					out.events.push(completed(user, flow));
				}
				None => {
					out.messages
						.push(OutboundMessage::text(user, "Item not found."));
				}
			}
		}

		TerminalAction::PlaceOrder => {
			let item_id = bag::id(fields, "item_id")?;
			// Re-check right before the write; the confirmation summary may
			// be arbitrarily stale by the time the button is pressed.
			let Some(item) = catalog.get_item(item_id).await? else {
				out.messages.push(OutboundMessage::text(
					user,
					"That item is no longer available, the order was cancelled.",
				));
				out.events.push(cancelled(user, flow));
				return Ok(out);
			};

			let method = DeliveryMethod::parse(bag::choice(fields, "delivery_method")?)
				.ok_or_else(|| DialogError::Definition("unknown delivery method choice".into()))?;
			let order = catalog
				.create_order(NewOrder {
					item_id,
					customer_id: user,
					customer_name: bag::text(fields, "customer_name")?.to_string(),
					customer_phone: bag::text(fields, "customer_phone")?.to_string(),
					delivery_method: method,
					address: bag::optional_text(fields, "address")?,
				})
				.await?;

			out.messages.push(OutboundMessage::text(
				user,
				format!("Thank you! Your order #{} has been placed.", order.id),
			));
			out.messages.push(OutboundMessage::text(
				operator,
				operator_notification(&order, &item),
			));
			out.events.push(BotEvent::Order(OrderEvent::Placed {
				order_id: order.id,
				item_id,
				customer: user,
			}));
			out.events.push(completed(user, flow));
		}

		TerminalAction::CreateCategory => {
			let name = bag::text(fields, "name")?;
			match catalog.create_category(name).await {
				Ok(category) => {
					out.messages.push(OutboundMessage::text(
						user,
						format!("Category '{}' added.", category.name),
					));
					out.events.push(BotEvent::Admin(AdminEvent::CategoryCreated {
						id: category.id,
						name: category.name,
					}));
					out.events.push(completed(user, flow));
				}
				Err(CatalogError::DuplicateName(name)) => {
					out.messages.push(OutboundMessage::text(
						user,
						format!("A category named '{}' already exists.", name),
					));
					out.events.push(cancelled(user, flow));
				}
				Err(e) => return Err(e.into()),
			}
		}

		TerminalAction::CreateItem => {
			let new = NewItem {
				category_id: bag::id(fields, "category_id")?,
				name: bag::text(fields, "name")?.to_string(),
				description: Some(bag::text(fields, "description")?.to_string()),
				price: bag::number(fields, "price")?,
				photo: bag::optional_photo(fields, "photo")?,
			};
			match catalog.create_item(new).await {
				Ok(item) => {
					out.messages.push(OutboundMessage::text(
						user,
						format!("Item '{}' added.", item.name),
					));
					out.events.push(BotEvent::Admin(AdminEvent::ItemCreated {
						id: item.id,
						category_id: item.category_id,
					}));
					out.events.push(completed(user, flow));
				}
				Err(CatalogError::CategoryVanished(_)) => {
					out.messages.push(OutboundMessage::text(
						user,
						"That category no longer exists, the item was not added.",
					));
					out.events.push(cancelled(user, flow));
				}
				Err(e) => return Err(e.into()),
			}
		}

		TerminalAction::DeleteCategory => {
			let id = bag::id(fields, "category_id")?;
			match catalog.delete_category(id).await? {
				Some(removed) => {
					out.messages.push(OutboundMessage::text(
						user,
						format!(
							"Category '{}' deleted along with {} item(s).",
							removed.name, removed.items_removed
						),
					));
					out.events.push(BotEvent::Admin(AdminEvent::CategoryDeleted {
						id,
						items_removed: removed.items_removed,
					}));
					out.events.push(completed(user, flow));
				}
				None => {
					out.messages
						.push(OutboundMessage::text(user, "Category not found."));
				}
			}
		}

		TerminalAction::DeleteItem => {
			let id = bag::id(fields, "item_id")?;
			match catalog.delete_item(id).await? {
				Some(item) => {
					out.messages.push(OutboundMessage::text(
						user,
						format!("Item '{}' deleted.", item.name),
					));
					out.events
						.push(BotEvent::Admin(AdminEvent::ItemDeleted { id }));
					out.events.push(completed(user, flow));
				}
				None => {
					out.messages
						.push(OutboundMessage::text(user, "Item not found."));
				}
			}
		}

		TerminalAction::ShowOrders => {
			let orders = catalog.list_orders().await?;
			if orders.is_empty() {
				out.messages
					.push(OutboundMessage::text(user, "No orders yet."));
				return Ok(out);
			}
			for order in orders {
				// The item may be long gone; the order still renders.
				let item = catalog.get_item(order.item_id).await?;
				out.messages.push(OutboundMessage::menu(
					user,
					order_review_block(&order, item.as_ref()),
					vec![
						MenuOption::new("Accept", tokens::accept_order(order.id)),
						MenuOption::new("Reject", tokens::reject_order(order.id)),
					],
				));
			}
		}

		TerminalAction::AcceptOrder => {
			let id = bag::id(fields, "order_id")?;
			match catalog.set_order_status(id, OrderStatus::Confirmed).await? {
				Some(order) => {
					out.messages.push(OutboundMessage::text(
						user,
						format!("Order #{} confirmed.", order.id),
					));
					out.events
						.push(BotEvent::Order(OrderEvent::Accepted { order_id: id }));
				}
				None => {
					out.messages
						.push(OutboundMessage::text(user, "Order not found."));
				}
			}
		}

		TerminalAction::RejectOrder => {
			let id = bag::id(fields, "order_id")?;
			match catalog.set_order_status(id, OrderStatus::Cancelled).await? {
				Some(order) => {
					out.messages.push(OutboundMessage::text(
						user,
						format!("Order #{} rejected.", order.id),
					));
					out.events
						.push(BotEvent::Order(OrderEvent::Rejected { order_id: id }));
				}
				None => {
					out.messages
						.push(OutboundMessage::text(user, "Order not found."));
				}
			}
		}
	}

	Ok(out)
}

fn completed(user: UserId, flow: FlowTag) -> BotEvent {
	BotEvent::Flow(FlowEvent::Completed {
		user,
		flow: flow.as_str().to_string(),
	})
}

fn cancelled(user: UserId, flow: FlowTag) -> BotEvent {
	BotEvent::Flow(FlowEvent::Cancelled {
		user,
		flow: flow.as_str().to_string(),
	})
}

/// Renders an item card with order and back buttons.
fn item_card(to: UserId, item: &Item) -> OutboundMessage {
	let mut caption = item.name.clone();
	if let Some(description) = &item.description {
		caption.push_str("\n\n");
		caption.push_str(description);
	}
	caption.push_str(&format!("\n\nPrice: {}", item.price));

	let options = vec![
		MenuOption::new("Order", tokens::order_item(item.id)),
		MenuOption::new("Back to category", tokens::category(item.category_id)),
	];

	match &item.photo {
		Some(photo) => OutboundMessage::PhotoCard {
			to,
			photo: photo.clone(),
			caption,
			options,
		},
		None => OutboundMessage::Menu {
			to,
			body: caption,
			options,
		},
	}
}

/// Summary sent to the operator when a new order lands.
fn operator_notification(order: &Order, item: &Item) -> String {
	format!(
		"New order #{}\nItem: {} (id {})\nCustomer: {} ({})\nMethod: {}\nAddress: {}",
		order.id,
		item.name,
		order.item_id,
		order.customer_name,
		order.customer_phone,
		order.delivery_method.label(),
		order.address.as_deref().unwrap_or("-"),
	)
}

/// One order's block in the operator review listing.
fn order_review_block(order: &Order, item: Option<&Item>) -> String {
	format!(
		"Order #{}\nItem: {} (id {})\nCustomer: {} ({})\nMethod: {}\nAddress: {}\nStatus: {}\nPlaced: {}",
		order.id,
		item.map(|i| i.name.as_str()).unwrap_or("<deleted>"),
		order.item_id,
		order.customer_name,
		order.customer_phone,
		order.delivery_method.label(),
		order.address.as_deref().unwrap_or("-"),
		order.status.label(),
		order.created_at.format("%Y-%m-%d %H:%M:%S"),
	)
}
