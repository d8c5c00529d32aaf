//! Storage namespace keys.

use std::str::FromStr;

/// Namespaces for the durable data collections.
///
/// This enum provides type safety for storage operations by replacing
/// string literals with strongly typed variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
	/// Catalog categories.
	Categories,
	/// Catalog items.
	Items,
	/// Customer orders.
	Orders,
	/// Per-collection id sequence counters.
	Counters,
}

impl StorageKey {
	/// Returns the string representation of the storage key.
	pub fn as_str(&self) -> &'static str {
		match self {
			StorageKey::Categories => "categories",
			StorageKey::Items => "items",
			StorageKey::Orders => "orders",
			StorageKey::Counters => "counters",
		}
	}

	/// Returns an iterator over all StorageKey variants.
	pub fn all() -> impl Iterator<Item = Self> {
		[
			Self::Categories,
			Self::Items,
			Self::Orders,
			Self::Counters,
		]
		.into_iter()
	}
}

impl FromStr for StorageKey {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"categories" => Ok(Self::Categories),
			"items" => Ok(Self::Items),
			"orders" => Ok(Self::Orders),
			"counters" => Ok(Self::Counters),
			_ => Err(()),
		}
	}
}

impl From<StorageKey> for &'static str {
	fn from(key: StorageKey) -> Self {
		key.as_str()
	}
}
