//! Prompt rendering against live catalog data.
//!
//! Static prompts are plain text; menu prompts enumerate catalog records into
//! buttons. Rendering can abort the flow when the data a step depends on is
//! gone, such as the ordered item deleted before confirmation or a menu with
//! nothing left to offer; the engine then informs the user and clears state
//! instead of advancing.

use crate::bag;
use crate::step::Prompt;
use crate::DialogError;
use orderbot_storage::CatalogStore;
use orderbot_types::{tokens, DeliveryMethod, FieldBag, Item, MenuOption, OutboundMessage, UserId};

/// Outcome of rendering a step's prompt.
pub enum Rendered {
	/// Prompt produced; the step becomes current.
	Messages(Vec<OutboundMessage>),
	/// The flow cannot continue; state is cleared and these messages sent.
	Abort(Vec<OutboundMessage>),
}

/// Renders a prompt for the given user and collected fields.
pub async fn render(
	prompt: &Prompt,
	to: UserId,
	fields: &FieldBag,
	catalog: &CatalogStore,
) -> Result<Rendered, DialogError> {
	match prompt {
		Prompt::Static(text) => Ok(Rendered::Messages(vec![OutboundMessage::text(to, *text)])),

		Prompt::Categories => {
			let categories = catalog.list_categories().await?;
			if categories.is_empty() {
				return Ok(Rendered::Abort(vec![OutboundMessage::text(
					to,
					"There are no categories yet.",
				)]));
			}
			let options = categories
				.into_iter()
				.map(|c| MenuOption::new(c.name, tokens::category(c.id)))
				.collect();
			Ok(Rendered::Messages(vec![OutboundMessage::menu(
				to,
				"Categories:",
				options,
			)]))
		}

		Prompt::Items => {
			let category_id = bag::id(fields, "category_id")?;
			let items = catalog.list_items(category_id).await?;
			if items.is_empty() {
				return Ok(Rendered::Abort(vec![OutboundMessage::text(
					to,
					"No items in this category yet.",
				)]));
			}
			let options = items
				.into_iter()
				.map(|i| MenuOption::new(i.name, tokens::item(i.id)))
				.collect();
			Ok(Rendered::Messages(vec![OutboundMessage::menu(
				to,
				"Items in this category:",
				options,
			)]))
		}

		Prompt::AddItemCategories => {
			let categories = catalog.list_categories().await?;
			if categories.is_empty() {
				return Ok(Rendered::Abort(vec![OutboundMessage::text(
					to,
					"Add a category first.",
				)]));
			}
			let options = categories
				.into_iter()
				.map(|c| MenuOption::new(c.name, tokens::add_to_category(c.id)))
				.collect();
			Ok(Rendered::Messages(vec![OutboundMessage::menu(
				to,
				"Category for the new item:",
				options,
			)]))
		}

		Prompt::DeliveryMethods => Ok(Rendered::Messages(vec![OutboundMessage::menu(
			to,
			"How would you like to receive it?",
			vec![
				MenuOption::new("Delivery", tokens::DELIVERY),
				MenuOption::new("Pickup", tokens::PICKUP),
			],
		)])),

		Prompt::OrderSummary => {
			let item_id = bag::id(fields, "item_id")?;
			// The item can vanish between flow start and confirmation.
			let Some(item) = catalog.get_item(item_id).await? else {
				return Ok(Rendered::Abort(vec![OutboundMessage::text(
					to,
					"That item is no longer available, the order was cancelled.",
				)]));
			};
			let summary = order_summary(&item, fields)?;
			Ok(Rendered::Messages(vec![OutboundMessage::menu(
				to,
				summary,
				vec![
					MenuOption::new("Confirm order", tokens::CONFIRM),
					MenuOption::new("Cancel", tokens::CANCEL),
				],
			)]))
		}

		Prompt::DeleteCategories => {
			let categories = catalog.list_categories().await?;
			if categories.is_empty() {
				return Ok(Rendered::Abort(vec![OutboundMessage::text(
					to,
					"There are no categories yet.",
				)]));
			}
			let options = categories
				.into_iter()
				.map(|c| MenuOption::new(c.name, tokens::delete_category(c.id)))
				.collect();
			Ok(Rendered::Messages(vec![OutboundMessage::menu(
				to,
				"Category to delete (all of its items go with it):",
				options,
			)]))
		}

		Prompt::DeleteItems => {
			let items = catalog.list_all_items().await?;
			if items.is_empty() {
				return Ok(Rendered::Abort(vec![OutboundMessage::text(
					to,
					"No items to delete.",
				)]));
			}
			let options = items
				.into_iter()
				.map(|i| MenuOption::new(i.name, tokens::delete_item(i.id)))
				.collect();
			Ok(Rendered::Messages(vec![OutboundMessage::menu(
				to,
				"Item to delete:",
				options,
			)]))
		}
	}
}

/// Builds the confirmation summary for the ordering flow.
fn order_summary(item: &Item, fields: &FieldBag) -> Result<String, DialogError> {
	let name = bag::text(fields, "customer_name")?;
	let phone = bag::text(fields, "customer_phone")?;
	let method = DeliveryMethod::parse(bag::choice(fields, "delivery_method")?)
		.ok_or_else(|| DialogError::Definition("unknown delivery method choice".into()))?;

	let mut summary = format!(
		"You are ordering:\n\n{}\nPrice: {}\n\nName: {}\nPhone: {}\nMethod: {}",
		item.name,
		item.price,
		name,
		phone,
		method.label()
	);
	if let Some(address) = bag::optional_text(fields, "address")? {
		summary.push_str(&format!("\nAddress: {}", address));
	}
	Ok(summary)
}
