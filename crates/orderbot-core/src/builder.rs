//! Builder wiring the engine from configuration and factory maps.
//!
//! Uses the factory pattern so different storage backends and transports can
//! be plugged in based on configuration: the builder looks up the configured
//! primary implementation by name, creates it through its factory, and
//! validates its TOML table against the implementation's own schema before
//! use.

use crate::event_bus::EventBus;
use crate::{Engine, EngineError};
use orderbot_config::Config;
use orderbot_dialog::DialogEngine;
use orderbot_session::SessionStore;
use orderbot_storage::{CatalogStore, StorageFactory, StorageService};
use orderbot_transport::{TransportFactory, TransportService};
use orderbot_types::UserId;
use std::collections::HashMap;
use std::sync::Arc;

/// Capacity of the engine's broadcast event bus.
const EVENT_BUS_CAPACITY: usize = 256;

/// Factory maps for all pluggable implementations.
pub struct EngineFactories {
	/// Storage backend factories keyed by configuration name.
	pub storage_factories: HashMap<String, StorageFactory>,
	/// Transport factories keyed by configuration name.
	pub transport_factories: HashMap<String, TransportFactory>,
}

/// Builder for constructing an [`Engine`] with pluggable implementations.
pub struct EngineBuilder {
	config: Config,
}

impl EngineBuilder {
	/// Creates a new EngineBuilder with the given configuration.
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Builds the Engine using the configured factories.
	///
	/// This method:
	/// 1. Creates the primary storage backend and transport via their
	///    factories
	/// 2. Validates each implementation's configuration against its schema
	/// 3. Wires up the catalog, session store, and dialog engine
	pub fn build(self, factories: EngineFactories) -> Result<Engine, EngineError> {
		let config = self.config;

		// Storage backend
		let storage_name = &config.storage.primary;
		let storage_config = config
			.storage
			.implementations
			.get(storage_name)
			.ok_or_else(|| {
				EngineError::Config(format!(
					"Primary storage '{}' has no configuration",
					storage_name
				))
			})?;
		let storage_factory = factories.storage_factories.get(storage_name).ok_or_else(|| {
			EngineError::Config(format!("Unknown storage implementation '{}'", storage_name))
		})?;
		let backend = storage_factory(storage_config).map_err(|e| {
			EngineError::Config(format!(
				"Failed to create storage backend '{}': {}",
				storage_name, e
			))
		})?;
		backend
			.config_schema()
			.validate(storage_config)
			.map_err(|e| {
				EngineError::Config(format!(
					"Invalid configuration for storage '{}': {}",
					storage_name, e
				))
			})?;
		tracing::info!(component = "storage", implementation = %storage_name, "Loaded");
		let catalog = Arc::new(CatalogStore::new(StorageService::new(backend)));

		// Transport
		let transport_name = &config.transport.primary;
		let transport_config = config
			.transport
			.implementations
			.get(transport_name)
			.ok_or_else(|| {
				EngineError::Config(format!(
					"Primary transport '{}' has no configuration",
					transport_name
				))
			})?;
		let transport_factory = factories
			.transport_factories
			.get(transport_name)
			.ok_or_else(|| {
				EngineError::Config(format!(
					"Unknown transport implementation '{}'",
					transport_name
				))
			})?;
		let transport_impl = transport_factory(transport_config).map_err(|e| {
			EngineError::Config(format!(
				"Failed to create transport '{}': {}",
				transport_name, e
			))
		})?;
		transport_impl
			.config_schema()
			.validate(transport_config)
			.map_err(|e| {
				EngineError::Config(format!(
					"Invalid configuration for transport '{}': {}",
					transport_name, e
				))
			})?;
		tracing::info!(component = "transport", implementation = %transport_name, "Loaded");
		let transport = Arc::new(TransportService::new(transport_impl));

		// Dialog machinery
		let sessions = SessionStore::new();
		let operator = UserId(config.assistant.operator_id);
		let dialog = DialogEngine::new(catalog.clone(), sessions, operator);
		tracing::info!(component = "dialog", operator = %operator, "Loaded");

		Ok(Engine::new(
			config,
			catalog,
			dialog,
			transport,
			EventBus::new(EVENT_BUS_CAPACITY),
		))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::str::FromStr;

	fn factories() -> EngineFactories {
		EngineFactories {
			storage_factories: orderbot_storage::get_all_implementations()
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect(),
			transport_factories: orderbot_transport::get_all_implementations()
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect(),
		}
	}

	const CONFIG: &str = r#"
[assistant]
id = "test-shop"
operator_id = 77

[storage]
primary = "memory"
[storage.implementations.memory]

[transport]
primary = "telegram"
[transport.implementations.telegram]
token = "123:abc"
"#;

	#[test]
	fn builds_with_memory_storage_and_telegram_transport() {
		let config = Config::from_str(CONFIG).unwrap();
		let engine = EngineBuilder::new(config).build(factories());
		assert!(engine.is_ok(), "build failed: {:?}", engine.err());
	}

	#[test]
	fn unknown_storage_implementation_is_a_config_error() {
		let config = Config::from_str(&CONFIG.replace("memory", "redis")).unwrap();
		let err = EngineBuilder::new(config).build(factories()).unwrap_err();
		assert!(err.to_string().contains("redis"));
	}

	#[test]
	fn missing_transport_token_is_a_config_error() {
		let config =
			Config::from_str(&CONFIG.replace("token = \"123:abc\"", "token = \"\"")).unwrap();
		let err = EngineBuilder::new(config).build(factories()).unwrap_err();
		assert!(err.to_string().contains("token"));
	}
}
