//! Broadcast bus for engine events.
//!
//! The engine publishes a [`BotEvent`] for every notable thing a turn did.
//! Subscribers (logging, tests) come and go freely; publishing to a bus with
//! no subscribers is not an error.

use orderbot_types::BotEvent;
use tokio::sync::broadcast;

/// Clonable handle to the event broadcast channel.
#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<BotEvent>,
}

impl EventBus {
	/// Creates a bus retaining up to `capacity` undelivered events per
	/// subscriber.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Publishes an event to all current subscribers.
	pub fn publish(&self, event: BotEvent) -> Result<(), Box<broadcast::error::SendError<BotEvent>>> {
		self.sender.send(event).map(|_| ()).map_err(Box::new)
	}

	/// Subscribes to events published after this call.
	pub fn subscribe(&self) -> broadcast::Receiver<BotEvent> {
		self.sender.subscribe()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use orderbot_types::{FlowEvent, UserId};

	#[tokio::test]
	async fn delivers_to_subscribers() {
		let bus = EventBus::new(8);
		let mut rx = bus.subscribe();

		bus.publish(BotEvent::Flow(FlowEvent::AccessDenied { user: UserId(3) }))
			.unwrap();

		match rx.recv().await.unwrap() {
			BotEvent::Flow(FlowEvent::AccessDenied { user }) => assert_eq!(user, UserId(3)),
			other => panic!("unexpected event: {:?}", other),
		}
	}

	#[test]
	fn publish_without_subscribers_is_an_error_we_ignore() {
		let bus = EventBus::new(8);
		assert!(bus
			.publish(BotEvent::Flow(FlowEvent::AccessDenied { user: UserId(3) }))
			.is_err());
	}
}
