//! Typed catalog operations over the raw storage backend.
//!
//! The catalog store is pure data access: categories, items, and orders, with
//! no workflow logic. All lookups treat absence as a routine, typed outcome
//! rather than an error, because records legitimately vanish between listing
//! and action (an order may reference a deleted item forever).
//!
//! Compound mutations (id allocation, uniqueness check + insert, cascade
//! delete) run under an internal async mutex so concurrent operator actions
//! cannot double-cascade or slip past the uniqueness check.

use crate::{StorageError, StorageService};
use chrono::Utc;
use orderbot_types::{
	Category, CategoryId, Item, ItemId, NewItem, NewOrder, Order, OrderId, OrderStatus, StorageKey,
};
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors that can occur during catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
	/// A category with the requested name already exists.
	#[error("Category name already taken: {0}")]
	DuplicateName(String),
	/// The owning category disappeared before the item could be created.
	#[error("Category {0} no longer exists")]
	CategoryVanished(CategoryId),
	/// The storage backend failed; this is infrastructure, not user input.
	#[error("Storage error: {0}")]
	Storage(#[from] StorageError),
}

/// Result of a cascading category deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedCategory {
	/// Name of the removed category.
	pub name: String,
	/// Items deleted along with it.
	pub items_removed: usize,
}

/// Typed catalog store the dialog engine issues its reads and writes against.
pub struct CatalogStore {
	storage: StorageService,
	/// Serializes compound mutations; plain reads go around it.
	write_lock: Mutex<()>,
}

impl CatalogStore {
	/// Creates a catalog store over the given storage service.
	pub fn new(storage: StorageService) -> Self {
		Self {
			storage,
			write_lock: Mutex::new(()),
		}
	}

	/// Allocates the next id for a collection.
	///
	/// Must be called with the write lock held.
	async fn next_id(&self, collection: StorageKey) -> Result<u64, CatalogError> {
		let counters = StorageKey::Counters.as_str();
		let next: u64 = self
			.storage
			.retrieve_opt(counters, collection.as_str())
			.await?
			.unwrap_or(0)
			+ 1;
		self.storage.store(counters, collection.as_str(), &next).await?;
		Ok(next)
	}

	/// Lists all categories in id order.
	pub async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
		let mut categories: Vec<Category> = self
			.storage
			.retrieve_all(StorageKey::Categories.as_str())
			.await?;
		categories.sort_by_key(|c| c.id);
		Ok(categories)
	}

	/// Creates a category, refusing duplicate names.
	pub async fn create_category(&self, name: &str) -> Result<Category, CatalogError> {
		let _guard = self.write_lock.lock().await;

		let taken = self
			.storage
			.retrieve_all::<Category>(StorageKey::Categories.as_str())
			.await?
			.into_iter()
			.any(|c| c.name == name);
		if taken {
			return Err(CatalogError::DuplicateName(name.to_string()));
		}

		let category = Category {
			id: self.next_id(StorageKey::Categories).await?,
			name: name.to_string(),
		};
		self.storage
			.store(
				StorageKey::Categories.as_str(),
				&category.id.to_string(),
				&category,
			)
			.await?;
		Ok(category)
	}

	/// Deletes a category, cascading over its items.
	///
	/// Returns `None` when the category is already gone, so a second
	/// concurrent delete observes not-found instead of double-cascading.
	pub async fn delete_category(
		&self,
		id: CategoryId,
	) -> Result<Option<RemovedCategory>, CatalogError> {
		let _guard = self.write_lock.lock().await;

		let category: Option<Category> = self
			.storage
			.retrieve_opt(StorageKey::Categories.as_str(), &id.to_string())
			.await?;
		let Some(category) = category else {
			return Ok(None);
		};

		let items: Vec<Item> = self
			.storage
			.retrieve_all(StorageKey::Items.as_str())
			.await?;
		let mut items_removed = 0;
		for item in items.iter().filter(|i| i.category_id == id) {
			self.storage
				.remove(StorageKey::Items.as_str(), &item.id.to_string())
				.await?;
			items_removed += 1;
		}

		self.storage
			.remove(StorageKey::Categories.as_str(), &id.to_string())
			.await?;

		tracing::debug!(category = id, items_removed, "Cascade deleted category");
		Ok(Some(RemovedCategory {
			name: category.name,
			items_removed,
		}))
	}

	/// Lists a category's items in id order.
	pub async fn list_items(&self, category_id: CategoryId) -> Result<Vec<Item>, CatalogError> {
		let mut items: Vec<Item> = self
			.storage
			.retrieve_all(StorageKey::Items.as_str())
			.await?;
		items.retain(|i| i.category_id == category_id);
		items.sort_by_key(|i| i.id);
		Ok(items)
	}

	/// Lists every item in id order.
	pub async fn list_all_items(&self) -> Result<Vec<Item>, CatalogError> {
		let mut items: Vec<Item> = self
			.storage
			.retrieve_all(StorageKey::Items.as_str())
			.await?;
		items.sort_by_key(|i| i.id);
		Ok(items)
	}

	/// Looks up an item. `None` is a routine outcome, not an error.
	pub async fn get_item(&self, id: ItemId) -> Result<Option<Item>, CatalogError> {
		Ok(self
			.storage
			.retrieve_opt(StorageKey::Items.as_str(), &id.to_string())
			.await?)
	}

	/// Creates an item in an existing category.
	pub async fn create_item(&self, new: NewItem) -> Result<Item, CatalogError> {
		let _guard = self.write_lock.lock().await;

		let category_exists = self
			.storage
			.exists(
				StorageKey::Categories.as_str(),
				&new.category_id.to_string(),
			)
			.await?;
		if !category_exists {
			return Err(CatalogError::CategoryVanished(new.category_id));
		}

		let item = Item {
			id: self.next_id(StorageKey::Items).await?,
			category_id: new.category_id,
			name: new.name,
			description: new.description,
			price: new.price,
			photo: new.photo,
		};
		self.storage
			.store(StorageKey::Items.as_str(), &item.id.to_string(), &item)
			.await?;
		Ok(item)
	}

	/// Deletes an item, returning it, or `None` when already gone.
	pub async fn delete_item(&self, id: ItemId) -> Result<Option<Item>, CatalogError> {
		let _guard = self.write_lock.lock().await;

		let item: Option<Item> = self
			.storage
			.retrieve_opt(StorageKey::Items.as_str(), &id.to_string())
			.await?;
		if item.is_some() {
			self.storage
				.remove(StorageKey::Items.as_str(), &id.to_string())
				.await?;
		}
		Ok(item)
	}

	/// Records a new order with status `New` and the current timestamp.
	pub async fn create_order(&self, new: NewOrder) -> Result<Order, CatalogError> {
		let _guard = self.write_lock.lock().await;

		let order = Order {
			id: self.next_id(StorageKey::Orders).await?,
			item_id: new.item_id,
			customer_id: new.customer_id,
			customer_name: new.customer_name,
			customer_phone: new.customer_phone,
			delivery_method: new.delivery_method,
			address: new.address,
			status: OrderStatus::New,
			created_at: Utc::now(),
		};
		self.storage
			.store(StorageKey::Orders.as_str(), &order.id.to_string(), &order)
			.await?;
		Ok(order)
	}

	/// Lists all orders, newest first.
	pub async fn list_orders(&self) -> Result<Vec<Order>, CatalogError> {
		let mut orders: Vec<Order> = self
			.storage
			.retrieve_all(StorageKey::Orders.as_str())
			.await?;
		orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
		Ok(orders)
	}

	/// Looks up an order. `None` is a routine outcome, not an error.
	pub async fn get_order(&self, id: OrderId) -> Result<Option<Order>, CatalogError> {
		Ok(self
			.storage
			.retrieve_opt(StorageKey::Orders.as_str(), &id.to_string())
			.await?)
	}

	/// Updates an order's review status.
	///
	/// Returns the updated order, or `None` when the order does not exist.
	pub async fn set_order_status(
		&self,
		id: OrderId,
		status: OrderStatus,
	) -> Result<Option<Order>, CatalogError> {
		let _guard = self.write_lock.lock().await;

		let order: Option<Order> = self
			.storage
			.retrieve_opt(StorageKey::Orders.as_str(), &id.to_string())
			.await?;
		let Some(mut order) = order else {
			return Ok(None);
		};

		order.status = status;
		self.storage
			.store(StorageKey::Orders.as_str(), &id.to_string(), &order)
			.await?;
		Ok(Some(order))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::implementations::memory::MemoryStorage;
	use orderbot_types::DeliveryMethod;
	use rust_decimal::Decimal;

	fn store() -> CatalogStore {
		CatalogStore::new(StorageService::new(Box::new(MemoryStorage::new())))
	}

	fn new_item(category_id: CategoryId, name: &str) -> NewItem {
		NewItem {
			category_id,
			name: name.to_string(),
			description: Some("fresh".to_string()),
			price: Decimal::new(4_990, 2),
			photo: None,
		}
	}

	#[tokio::test]
	async fn category_names_are_unique() {
		let catalog = store();
		catalog.create_category("Roses").await.unwrap();

		let err = catalog.create_category("Roses").await.unwrap_err();
		assert!(matches!(err, CatalogError::DuplicateName(name) if name == "Roses"));

		assert_eq!(catalog.list_categories().await.unwrap().len(), 1);
	}

	#[tokio::test]
	async fn ids_are_sequential_per_collection() {
		let catalog = store();
		let a = catalog.create_category("A").await.unwrap();
		let b = catalog.create_category("B").await.unwrap();
		assert_eq!((a.id, b.id), (1, 2));

		let item = catalog.create_item(new_item(a.id, "Bouquet")).await.unwrap();
		assert_eq!(item.id, 1);
	}

	#[tokio::test]
	async fn cascade_delete_removes_exactly_the_categorys_items() {
		let catalog = store();
		let roses = catalog.create_category("Roses").await.unwrap();
		let tulips = catalog.create_category("Tulips").await.unwrap();
		for n in ["Red", "White", "Pink"] {
			catalog.create_item(new_item(roses.id, n)).await.unwrap();
		}
		let kept = catalog.create_item(new_item(tulips.id, "Yellow")).await.unwrap();

		let removed = catalog.delete_category(roses.id).await.unwrap().unwrap();
		assert_eq!(removed.name, "Roses");
		assert_eq!(removed.items_removed, 3);

		assert!(catalog.list_items(roses.id).await.unwrap().is_empty());
		assert_eq!(catalog.list_items(tulips.id).await.unwrap(), vec![kept]);

		// Second delete observes not-found
		assert!(catalog.delete_category(roses.id).await.unwrap().is_none());
	}

	#[tokio::test]
	async fn orders_survive_item_deletion() {
		let catalog = store();
		let cat = catalog.create_category("Roses").await.unwrap();
		let item = catalog.create_item(new_item(cat.id, "Red")).await.unwrap();

		let order = catalog
			.create_order(NewOrder {
				item_id: item.id,
				customer_id: orderbot_types::UserId(9),
				customer_name: "Ann".into(),
				customer_phone: "+1555".into(),
				delivery_method: DeliveryMethod::Pickup,
				address: None,
			})
			.await
			.unwrap();
		assert_eq!(order.status, OrderStatus::New);

		catalog.delete_category(cat.id).await.unwrap();

		let kept = catalog.get_order(order.id).await.unwrap().unwrap();
		assert_eq!(kept.status, OrderStatus::New);
		assert_eq!(kept.item_id, item.id);
		// The dangling item reference resolves to a routine absence
		assert!(catalog.get_item(kept.item_id).await.unwrap().is_none());
	}

	#[tokio::test]
	async fn item_creation_requires_a_live_category() {
		let catalog = store();
		let cat = catalog.create_category("Roses").await.unwrap();
		catalog.delete_category(cat.id).await.unwrap();

		let err = catalog.create_item(new_item(cat.id, "Red")).await.unwrap_err();
		assert!(matches!(err, CatalogError::CategoryVanished(id) if id == cat.id));
	}

	#[tokio::test]
	async fn order_status_transitions() {
		let catalog = store();
		let cat = catalog.create_category("Roses").await.unwrap();
		let item = catalog.create_item(new_item(cat.id, "Red")).await.unwrap();
		let order = catalog
			.create_order(NewOrder {
				item_id: item.id,
				customer_id: orderbot_types::UserId(9),
				customer_name: "Ann".into(),
				customer_phone: "+1555".into(),
				delivery_method: DeliveryMethod::Pickup,
				address: None,
			})
			.await
			.unwrap();

		let updated = catalog
			.set_order_status(order.id, OrderStatus::Confirmed)
			.await
			.unwrap()
			.unwrap();
		assert_eq!(updated.status, OrderStatus::Confirmed);

		assert!(catalog
			.set_order_status(9999, OrderStatus::Cancelled)
			.await
			.unwrap()
			.is_none());
	}

	#[tokio::test]
	async fn orders_list_newest_first() {
		let catalog = store();
		let cat = catalog.create_category("Roses").await.unwrap();
		let item = catalog.create_item(new_item(cat.id, "Red")).await.unwrap();
		for _ in 0..3 {
			catalog
				.create_order(NewOrder {
					item_id: item.id,
					customer_id: orderbot_types::UserId(9),
					customer_name: "Ann".into(),
					customer_phone: "+1555".into(),
					delivery_method: DeliveryMethod::Pickup,
					address: None,
				})
				.await
				.unwrap();
		}

		let ids: Vec<_> = catalog
			.list_orders()
			.await
			.unwrap()
			.into_iter()
			.map(|o| o.id)
			.collect();
		assert_eq!(ids, vec![3, 2, 1]);
	}
}
