//! In-process channel transport implementation.
//!
//! Carries conversations over a pair of in-memory channels: tests and local
//! development inject inbound events and observe the outbound messages the
//! engine produces, with no chat service involved. Constructed directly via
//! [`ChannelTransport::new`] rather than through configuration.

use crate::{TransportError, TransportInterface};
use async_trait::async_trait;
use orderbot_types::{ConfigSchema, InboundEvent, OutboundMessage, Schema, ValidationError};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

/// Transport backed by in-process channels.
pub struct ChannelTransport {
	/// Inbound side, consumed when receiving starts.
	inbound: Mutex<Option<mpsc::UnboundedReceiver<InboundEvent>>>,
	outbound: mpsc::UnboundedSender<OutboundMessage>,
	forward_task: Mutex<Option<JoinHandle<()>>>,
}

impl ChannelTransport {
	/// Creates a transport plus the handles to drive it: a sender for
	/// injecting inbound events and a receiver observing outbound messages.
	pub fn new() -> (
		Self,
		mpsc::UnboundedSender<InboundEvent>,
		mpsc::UnboundedReceiver<OutboundMessage>,
	) {
		let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
		let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
		(
			Self {
				inbound: Mutex::new(Some(inbound_rx)),
				outbound: outbound_tx,
				forward_task: Mutex::new(None),
			},
			inbound_tx,
			outbound_rx,
		)
	}
}

#[async_trait]
impl TransportInterface for ChannelTransport {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(ChannelTransportSchema)
	}

	async fn start_receiving(
		&self,
		sender: mpsc::UnboundedSender<InboundEvent>,
	) -> Result<(), TransportError> {
		let mut task = self.forward_task.lock().await;
		if task.is_some() {
			return Err(TransportError::AlreadyReceiving);
		}

		let mut inbound = self
			.inbound
			.lock()
			.await
			.take()
			.ok_or(TransportError::AlreadyReceiving)?;

		*task = Some(tokio::spawn(async move {
			while let Some(event) = inbound.recv().await {
				if sender.send(event).is_err() {
					break;
				}
			}
		}));

		Ok(())
	}

	async fn stop_receiving(&self) -> Result<(), TransportError> {
		let mut task = self.forward_task.lock().await;
		if let Some(handle) = task.take() {
			handle.abort();
		}
		Ok(())
	}

	async fn send(&self, message: &OutboundMessage) -> Result<(), TransportError> {
		self.outbound
			.send(message.clone())
			.map_err(|_| TransportError::Network("outbound channel closed".into()))
	}
}

/// Configuration schema for the channel transport.
pub struct ChannelTransportSchema;

impl ConfigSchema for ChannelTransportSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		// No configuration required
		Schema::new(vec![], vec![]).validate(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use orderbot_types::UserId;

	#[tokio::test]
	async fn forwards_inbound_and_outbound() {
		let (transport, inject, mut observe) = ChannelTransport::new();
		let (engine_tx, mut engine_rx) = mpsc::unbounded_channel();

		transport.start_receiving(engine_tx).await.unwrap();

		inject
			.send(InboundEvent::text(UserId(1), "hello"))
			.unwrap();
		let event = engine_rx.recv().await.unwrap();
		assert_eq!(event, InboundEvent::text(UserId(1), "hello"));

		transport
			.send(&OutboundMessage::text(UserId(1), "hi"))
			.await
			.unwrap();
		assert_eq!(
			observe.recv().await.unwrap(),
			OutboundMessage::text(UserId(1), "hi")
		);

		transport.stop_receiving().await.unwrap();
	}

	#[tokio::test]
	async fn double_start_is_refused() {
		let (transport, _inject, _observe) = ChannelTransport::new();
		let (tx, _rx) = mpsc::unbounded_channel();
		transport.start_receiving(tx).await.unwrap();

		let (tx2, _rx2) = mpsc::unbounded_channel();
		assert!(matches!(
			transport.start_receiving(tx2).await,
			Err(TransportError::AlreadyReceiving)
		));
	}
}
