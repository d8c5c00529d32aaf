//! Chat-level types shared between the transport adapter and the engine.
//!
//! Inbound events are the transport-agnostic shape of everything a user can
//! send (text, a button press carrying an opaque token, a photo, or the skip
//! marker). Outbound messages are the shapes the engine can answer with;
//! the transport adapter renders them into its own wire format.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Chat identity of a user.
///
/// Signed to match the id space of common chat transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Opaque transport-issued photo handle.
///
/// The engine stores and echoes these without interpreting them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRef(pub String);

/// One normalized inbound turn from a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
	/// Sender identity.
	pub user: UserId,
	/// Normalized payload.
	pub kind: InboundKind,
}

impl InboundEvent {
	pub fn text(user: UserId, body: impl Into<String>) -> Self {
		Self {
			user,
			kind: InboundKind::Text(body.into()),
		}
	}

	pub fn button(user: UserId, token: impl Into<String>) -> Self {
		Self {
			user,
			kind: InboundKind::Button(token.into()),
		}
	}

	pub fn photo(user: UserId, photo: PhotoRef) -> Self {
		Self {
			user,
			kind: InboundKind::Photo(photo),
		}
	}

	pub fn skip(user: UserId) -> Self {
		Self {
			user,
			kind: InboundKind::Skip,
		}
	}
}

/// The input shapes a turn can carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundKind {
	/// Free-form message text.
	Text(String),
	/// Button press carrying an opaque token.
	Button(String),
	/// Photo upload, already reduced to the largest-resolution handle.
	Photo(PhotoRef),
	/// Explicit skip marker for optional steps.
	Skip,
}

/// One selectable option in an outbound menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOption {
	/// Text shown on the button.
	pub label: String,
	/// Opaque token delivered back on press.
	pub token: String,
}

impl MenuOption {
	pub fn new(label: impl Into<String>, token: impl Into<String>) -> Self {
		Self {
			label: label.into(),
			token: token.into(),
		}
	}
}

/// One outbound message produced by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
	/// Plain text.
	Text { to: UserId, body: String },
	/// Text with selectable buttons.
	Menu {
		to: UserId,
		body: String,
		options: Vec<MenuOption>,
	},
	/// Photo with a caption and selectable buttons.
	PhotoCard {
		to: UserId,
		photo: PhotoRef,
		caption: String,
		options: Vec<MenuOption>,
	},
}

impl OutboundMessage {
	/// Recipient of this message.
	pub fn recipient(&self) -> UserId {
		match self {
			OutboundMessage::Text { to, .. } => *to,
			OutboundMessage::Menu { to, .. } => *to,
			OutboundMessage::PhotoCard { to, .. } => *to,
		}
	}

	pub fn text(to: UserId, body: impl Into<String>) -> Self {
		OutboundMessage::Text {
			to,
			body: body.into(),
		}
	}

	pub fn menu(to: UserId, body: impl Into<String>, options: Vec<MenuOption>) -> Self {
		OutboundMessage::Menu {
			to,
			body: body.into(),
			options,
		}
	}
}
