//! Chat transport module for the ordering assistant.
//!
//! This module is the presentation adapter between the dialog engine and a
//! concrete messaging transport. Inbound transport updates are normalized
//! into [`InboundEvent`]s (button tokens extracted from presses, photos
//! reduced to their largest-resolution handle, command texts mapped to
//! navigation tokens); outbound [`OutboundMessage`]s are rendered into
//! transport-specific messages and keyboards.

use async_trait::async_trait;
use orderbot_types::{tokens, ConfigSchema, ImplementationRegistry, InboundEvent, InboundKind, OutboundMessage};
use thiserror::Error;
use tokio::sync::mpsc;

/// Re-export implementations
pub mod implementations {
	pub mod channel;
	pub mod telegram;
}

/// Errors that can occur during transport operations.
///
/// These are infrastructure errors, distinguishable from anything the dialog
/// engine would interpret as user input.
#[derive(Debug, Error)]
pub enum TransportError {
	/// Network communication with the chat service failed.
	#[error("Network error: {0}")]
	Network(String),
	/// The chat service answered with an error.
	#[error("API error: {0}")]
	Api(String),
	/// Receiving was started while already active.
	#[error("Already receiving")]
	AlreadyReceiving,
	/// The transport configuration is invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for chat transports.
///
/// This trait must be implemented by any transport that wants to carry the
/// assistant's conversations. It provides inbound event delivery through a
/// channel and outbound message submission.
#[async_trait]
pub trait TransportInterface: Send + Sync {
	/// Returns the configuration schema for this transport implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Starts receiving inbound events from the chat service.
	///
	/// Normalized events are sent through the provided channel. The
	/// transport keeps receiving until `stop_receiving` is called.
	async fn start_receiving(
		&self,
		sender: mpsc::UnboundedSender<InboundEvent>,
	) -> Result<(), TransportError>;

	/// Stops receiving inbound events and releases associated resources.
	async fn stop_receiving(&self) -> Result<(), TransportError>;

	/// Sends one outbound message.
	async fn send(&self, message: &OutboundMessage) -> Result<(), TransportError>;
}

/// Type alias for transport factory functions.
pub type TransportFactory = fn(&toml::Value) -> Result<Box<dyn TransportInterface>, TransportError>;

/// Registry trait for transport implementations.
pub trait TransportRegistry: ImplementationRegistry<Factory = TransportFactory> {}

/// Get all registered transport implementations.
///
/// The channel transport is not listed here: it exists for tests and is
/// constructed directly with its in-process handles.
pub fn get_all_implementations() -> Vec<(&'static str, TransportFactory)> {
	use implementations::telegram;

	vec![(telegram::Registry::NAME, telegram::Registry::factory())]
}

/// Service that wraps the selected transport implementation.
///
/// Routes the dialog engine's outbound batches to the transport and forwards
/// lifecycle calls. Send failures are logged per message so one failed
/// delivery does not drop the rest of a turn's output.
pub struct TransportService {
	implementation: Box<dyn TransportInterface>,
}

impl TransportService {
	/// Creates a new TransportService with the specified implementation.
	pub fn new(implementation: Box<dyn TransportInterface>) -> Self {
		Self { implementation }
	}

	/// Starts receiving inbound events.
	pub async fn start_receiving(
		&self,
		sender: mpsc::UnboundedSender<InboundEvent>,
	) -> Result<(), TransportError> {
		self.implementation.start_receiving(sender).await
	}

	/// Stops receiving inbound events.
	pub async fn stop_receiving(&self) -> Result<(), TransportError> {
		self.implementation.stop_receiving().await
	}

	/// Sends one outbound message.
	pub async fn send(&self, message: &OutboundMessage) -> Result<(), TransportError> {
		self.implementation.send(message).await
	}

	/// Sends a turn's outbound batch, attempting every message.
	///
	/// The first error is returned after all messages were tried.
	pub async fn send_all(&self, messages: &[OutboundMessage]) -> Result<(), TransportError> {
		let mut first_error = None;
		for message in messages {
			if let Err(e) = self.implementation.send(message).await {
				tracing::error!(recipient = %message.recipient(), error = %e, "Failed to send message");
				first_error.get_or_insert(e);
			}
		}
		match first_error {
			Some(e) => Err(e),
			None => Ok(()),
		}
	}
}

/// Normalizes a free-text message into the engine's input shape.
///
/// Command texts map to their tokens (`/start`, `/cancel`) or the skip
/// marker (`/skip`); everything else stays free text for the active step's
/// validator.
pub fn normalize_text(text: &str) -> InboundKind {
	let trimmed = text.trim();
	if trimmed.eq_ignore_ascii_case("/start") {
		InboundKind::Button(tokens::START.to_string())
	} else if trimmed.eq_ignore_ascii_case("/cancel") {
		InboundKind::Button(tokens::CANCEL.to_string())
	} else if trimmed.eq_ignore_ascii_case("/skip") {
		InboundKind::Skip
	} else {
		InboundKind::Text(text.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn commands_map_to_tokens() {
		assert_eq!(
			normalize_text("/start"),
			InboundKind::Button(tokens::START.to_string())
		);
		assert_eq!(
			normalize_text(" /CANCEL "),
			InboundKind::Button(tokens::CANCEL.to_string())
		);
		assert_eq!(normalize_text("/skip"), InboundKind::Skip);
	}

	#[test]
	fn plain_text_stays_text() {
		assert_eq!(
			normalize_text("Ann"),
			InboundKind::Text("Ann".to_string())
		);
		// A command with trailing words is just text
		assert_eq!(
			normalize_text("/skip the photo"),
			InboundKind::Text("/skip the photo".to_string())
		);
	}
}
