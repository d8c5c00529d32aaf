//! Conversation state store for the ordering assistant.
//!
//! Holds each user's dialog position: the active flow, the current step, and
//! the fields collected so far. State is ephemeral (an in-memory map is
//! sufficient) and is overwritten wholesale on every flow start so
//! nothing from an abandoned flow can leak into a new one. Abandoned state
//! persists until overwritten or cancelled; no expiry is imposed.

use orderbot_types::{ConversationState, UserId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Per-user conversation state store.
///
/// One entry per user identity; a user has at most one active flow. The
/// store performs no workflow logic; the dialog engine decides what to put
/// here and when to clear it.
#[derive(Clone, Default)]
pub struct SessionStore {
	sessions: Arc<RwLock<HashMap<UserId, ConversationState>>>,
}

impl SessionStore {
	/// Creates an empty session store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns a snapshot of the user's current state, if any.
	pub async fn get(&self, user: UserId) -> Option<ConversationState> {
		let sessions = self.sessions.read().await;
		sessions.get(&user).cloned()
	}

	/// Replaces the user's state wholesale.
	///
	/// Any prior state for the identity is discarded; flows never stack.
	pub async fn replace(&self, user: UserId, state: ConversationState) {
		let mut sessions = self.sessions.write().await;
		if let Some(old) = sessions.insert(user, state) {
			tracing::debug!(%user, flow = old.flow.as_str(), "Replaced active flow");
		}
	}

	/// Clears the user's state on completion, cancellation, or abort.
	pub async fn clear(&self, user: UserId) {
		let mut sessions = self.sessions.write().await;
		sessions.remove(&user);
	}

	/// Number of users with an active flow.
	pub async fn active_count(&self) -> usize {
		let sessions = self.sessions.read().await;
		sessions.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use orderbot_types::{FieldValue, FlowTag};

	#[tokio::test]
	async fn replace_discards_prior_state() {
		let store = SessionStore::new();
		let user = UserId(1);

		let mut first = ConversationState::at(FlowTag::AddCategory, "name");
		first
			.fields
			.insert("name", FieldValue::Text("Roses".into()));
		store.replace(user, first).await;

		store
			.replace(user, ConversationState::at(FlowTag::Ordering, "name"))
			.await;

		let state = store.get(user).await.unwrap();
		assert_eq!(state.flow, FlowTag::Ordering);
		assert!(state.fields.is_empty());
	}

	#[tokio::test]
	async fn states_are_independent_per_user() {
		let store = SessionStore::new();
		store
			.replace(UserId(1), ConversationState::at(FlowTag::Ordering, "name"))
			.await;
		store
			.replace(UserId(2), ConversationState::at(FlowTag::Browsing, "choose_category"))
			.await;

		store.clear(UserId(1)).await;

		assert!(store.get(UserId(1)).await.is_none());
		assert_eq!(store.get(UserId(2)).await.unwrap().flow, FlowTag::Browsing);
		assert_eq!(store.active_count().await, 1);
	}
}
