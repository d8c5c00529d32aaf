//! Core engine for the ordering assistant.
//!
//! This module provides the main orchestration loop: it receives normalized
//! inbound events from the transport, advances the dialog engine one turn at
//! a time, delivers the turn's outbound messages, and publishes the turn's
//! events on the broadcast bus.
//!
//! Turns are processed strictly sequentially on a single logical scheduler,
//! which gives the per-identity ordering guarantee for free: no two turns
//! are ever evaluated against the same state snapshot concurrently, and no
//! conversation state is held across a suspension point mid-update.

use orderbot_config::Config;
use orderbot_dialog::DialogEngine;
use orderbot_storage::CatalogStore;
use orderbot_transport::TransportService;
use orderbot_types::InboundEvent;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

pub mod builder;
pub mod event_bus;

pub use builder::{EngineBuilder, EngineFactories};
pub use event_bus::EventBus;

/// Errors that can occur during engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
	/// Error related to configuration issues.
	#[error("Configuration error: {0}")]
	Config(String),
	/// Error from one of the engine's services.
	#[error("Service error: {0}")]
	Service(String),
}

/// Main engine that runs the assistant's event loop.
pub struct Engine {
	/// Assistant configuration.
	config: Config,
	/// Catalog store for durable records.
	catalog: Arc<CatalogStore>,
	/// The per-user dialog state machine.
	dialog: DialogEngine,
	/// Transport service for inbound events and outbound messages.
	transport: Arc<TransportService>,
	/// Event bus for observability.
	event_bus: EventBus,
}

impl std::fmt::Debug for Engine {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Engine").finish_non_exhaustive()
	}
}

impl Engine {
	/// Creates an engine from its wired services. Use [`EngineBuilder`] to
	/// construct one from configuration.
	pub fn new(
		config: Config,
		catalog: Arc<CatalogStore>,
		dialog: DialogEngine,
		transport: Arc<TransportService>,
		event_bus: EventBus,
	) -> Self {
		Self {
			config,
			catalog,
			dialog,
			transport,
			event_bus,
		}
	}

	/// Main event loop.
	///
	/// This method:
	/// 1. Starts the transport's inbound receiving
	/// 2. Processes inbound events one turn at a time, in arrival order
	/// 3. Handles graceful shutdown on Ctrl+C
	pub async fn run(&self) -> Result<(), EngineError> {
		let (event_tx, mut event_rx) = mpsc::unbounded_channel();
		self.transport
			.start_receiving(event_tx)
			.await
			.map_err(|e| EngineError::Service(e.to_string()))?;

		tracing::info!(assistant = %self.config.assistant.id, "Engine running");

		loop {
			tokio::select! {
				Some(event) = event_rx.recv() => {
					self.handle_turn(event).await;
				}

				// Shutdown signal
				_ = tokio::signal::ctrl_c() => {
					break;
				}
			}
		}

		self.transport
			.stop_receiving()
			.await
			.map_err(|e| EngineError::Service(e.to_string()))?;

		tracing::info!("Engine stopped");
		Ok(())
	}

	/// Processes one inbound event as one dialog turn.
	///
	/// No failure here is fatal to the process: dialog or delivery errors
	/// are logged and scoped to this turn.
	async fn handle_turn(&self, event: InboundEvent) {
		let user = event.user;
		match self.dialog.advance(event).await {
			Ok(output) => {
				for event in &output.events {
					self.event_bus.publish(event.clone()).ok();
				}
				if let Err(e) = self.transport.send_all(&output.messages).await {
					tracing::error!(%user, error = %e, "Failed to deliver turn output");
				}
			}
			Err(e) => {
				tracing::error!(%user, error = %e, "Turn failed");
			}
		}
	}

	/// Returns a reference to the event bus.
	pub fn event_bus(&self) -> &EventBus {
		&self.event_bus
	}

	/// Returns a reference to the configuration.
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Returns a reference to the catalog store.
	pub fn catalog(&self) -> &Arc<CatalogStore> {
		&self.catalog
	}
}
