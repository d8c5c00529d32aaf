//! Telegram Bot API transport implementation.
//!
//! Long-polls `getUpdates` for inbound updates and renders outbound messages
//! through `sendMessage`/`sendPhoto` with inline keyboards. Every menu
//! option becomes one inline button whose callback data is the engine's
//! opaque token; callback queries are acknowledged so clients stop showing
//! the progress spinner.

use crate::{normalize_text, TransportError, TransportInterface};
use async_trait::async_trait;
use orderbot_types::{
	ConfigSchema, Field, FieldType, ImplementationRegistry, InboundEvent, MenuOption,
	OutboundMessage, PhotoRef, Schema, SecretString, UserId, ValidationError,
};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

const DEFAULT_API_URL: &str = "https://api.telegram.org";
const DEFAULT_POLL_TIMEOUT_SECS: i64 = 30;

/// Telegram Bot API transport.
pub struct TelegramTransport {
	client: reqwest::Client,
	/// Full method base, `<api_url>/bot<token>`.
	base: String,
	poll_timeout_secs: i64,
	poll_task: Mutex<Option<JoinHandle<()>>>,
}

impl TelegramTransport {
	/// Creates a transport for the given bot token.
	pub fn new(token: &SecretString, api_url: &str, poll_timeout_secs: i64) -> Self {
		Self {
			client: reqwest::Client::new(),
			base: format!("{}/bot{}", api_url.trim_end_matches('/'), token.expose_secret()),
			poll_timeout_secs,
			poll_task: Mutex::new(None),
		}
	}

	async fn call(&self, method: &str, body: serde_json::Value) -> Result<serde_json::Value, TransportError> {
		call_api(&self.client, &self.base, method, body).await
	}
}

async fn call_api(
	client: &reqwest::Client,
	base: &str,
	method: &str,
	body: serde_json::Value,
) -> Result<serde_json::Value, TransportError> {
	let response = client
		.post(format!("{}/{}", base, method))
		.json(&body)
		.send()
		.await
		.map_err(|e| TransportError::Network(e.to_string()))?;

	let envelope: ApiResponse = response
		.json()
		.await
		.map_err(|e| TransportError::Network(e.to_string()))?;

	if !envelope.ok {
		return Err(TransportError::Api(
			envelope
				.description
				.unwrap_or_else(|| format!("{} failed", method)),
		));
	}
	Ok(envelope.result.unwrap_or(serde_json::Value::Null))
}

#[async_trait]
impl TransportInterface for TelegramTransport {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(TelegramTransportSchema)
	}

	async fn start_receiving(
		&self,
		sender: mpsc::UnboundedSender<InboundEvent>,
	) -> Result<(), TransportError> {
		let mut task = self.poll_task.lock().await;
		if task.is_some() {
			return Err(TransportError::AlreadyReceiving);
		}

		let client = self.client.clone();
		let base = self.base.clone();
		let poll_timeout = self.poll_timeout_secs;

		*task = Some(tokio::spawn(async move {
			let mut offset: i64 = 0;
			loop {
				let body = json!({ "offset": offset, "timeout": poll_timeout });
				let result = call_api(&client, &base, "getUpdates", body).await;

				let updates: Vec<Update> = match result
					.and_then(|v| {
						serde_json::from_value(v).map_err(|e| TransportError::Api(e.to_string()))
					}) {
					Ok(updates) => updates,
					Err(e) => {
						tracing::warn!(error = %e, "Polling for updates failed, backing off");
						tokio::time::sleep(std::time::Duration::from_secs(3)).await;
						continue;
					}
				};

				for update in updates {
					offset = offset.max(update.update_id + 1);

					// Acknowledge callback queries so clients stop spinning.
					if let Some(callback) = &update.callback_query {
						let ack = json!({ "callback_query_id": callback.id });
						if let Err(e) = call_api(&client, &base, "answerCallbackQuery", ack).await {
							tracing::debug!(error = %e, "Failed to acknowledge callback");
						}
					}

					if let Some(event) = normalize_update(update) {
						if sender.send(event).is_err() {
							// Engine side is gone; stop polling.
							return;
						}
					}
				}
			}
		}));

		Ok(())
	}

	async fn stop_receiving(&self) -> Result<(), TransportError> {
		let mut task = self.poll_task.lock().await;
		if let Some(handle) = task.take() {
			handle.abort();
		}
		Ok(())
	}

	async fn send(&self, message: &OutboundMessage) -> Result<(), TransportError> {
		let (method, body) = match message {
			OutboundMessage::Text { to, body } => (
				"sendMessage",
				json!({ "chat_id": to.0, "text": body }),
			),
			OutboundMessage::Menu { to, body, options } => (
				"sendMessage",
				json!({
					"chat_id": to.0,
					"text": body,
					"reply_markup": inline_keyboard(options),
				}),
			),
			OutboundMessage::PhotoCard {
				to,
				photo,
				caption,
				options,
			} => (
				"sendPhoto",
				json!({
					"chat_id": to.0,
					"photo": photo.0,
					"caption": caption,
					"reply_markup": inline_keyboard(options),
				}),
			),
		};

		self.call(method, body).await.map(|_| ())
	}
}

/// Renders menu options as an inline keyboard, one button per row.
fn inline_keyboard(options: &[MenuOption]) -> serde_json::Value {
	let rows: Vec<serde_json::Value> = options
		.iter()
		.map(|o| json!([{ "text": o.label, "callback_data": o.token }]))
		.collect();
	json!({ "inline_keyboard": rows })
}

/// Normalizes one Telegram update into the engine's input shape.
///
/// Callback data becomes a button token; photo uploads are reduced to the
/// largest available resolution's file id; texts go through the shared
/// command mapping.
fn normalize_update(update: Update) -> Option<InboundEvent> {
	if let Some(callback) = update.callback_query {
		let token = callback.data?;
		return Some(InboundEvent::button(UserId(callback.from.id), token));
	}

	let message = update.message?;
	let user = UserId(message.from?.id);

	if let Some(photos) = &message.photo {
		if let Some(largest) = photos
			.iter()
			.max_by_key(|p| u64::from(p.width) * u64::from(p.height))
		{
			return Some(InboundEvent::photo(user, PhotoRef(largest.file_id.clone())));
		}
	}

	let text = message.text?;
	Some(InboundEvent {
		user,
		kind: normalize_text(&text),
	})
}

// Wire shapes: the subset of the Bot API the assistant consumes.

#[derive(Debug, Deserialize)]
struct ApiResponse {
	ok: bool,
	result: Option<serde_json::Value>,
	description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Update {
	update_id: i64,
	message: Option<Message>,
	callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Deserialize)]
struct Message {
	from: Option<Sender>,
	text: Option<String>,
	photo: Option<Vec<PhotoSize>>,
}

#[derive(Debug, Deserialize)]
struct Sender {
	id: i64,
}

#[derive(Debug, Deserialize)]
struct PhotoSize {
	file_id: String,
	width: u32,
	height: u32,
}

#[derive(Debug, Deserialize)]
struct CallbackQuery {
	id: String,
	from: Sender,
	data: Option<String>,
}

/// Configuration schema for the Telegram transport.
pub struct TelegramTransportSchema;

impl ConfigSchema for TelegramTransportSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		Schema::new(
			vec![Field::new("token", FieldType::String).with_validator(|v| {
				if v.as_str().is_some_and(|s| s.is_empty()) {
					Err("token must not be empty".into())
				} else {
					Ok(())
				}
			})],
			vec![
				Field::new("api_url", FieldType::String),
				Field::new(
					"poll_timeout_seconds",
					FieldType::Integer {
						min: Some(1),
						max: Some(90),
					},
				),
			],
		)
		.validate(config)
	}
}

/// Registry entry for the Telegram transport.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "telegram";
	type Factory = crate::TransportFactory;

	fn factory() -> Self::Factory {
		create_transport
	}
}

impl crate::TransportRegistry for Registry {}

/// Factory function to create a Telegram transport from configuration.
///
/// Configuration parameters:
/// - `token`: Bot API token (required)
/// - `api_url`: API base URL (default: "https://api.telegram.org")
/// - `poll_timeout_seconds`: long-poll timeout (default: 30)
pub fn create_transport(
	config: &toml::Value,
) -> Result<Box<dyn TransportInterface>, TransportError> {
	let token = config
		.get("token")
		.and_then(|v| v.as_str())
		.filter(|s| !s.is_empty())
		.map(SecretString::from)
		.ok_or_else(|| TransportError::Configuration("token is required".into()))?;

	let api_url = config
		.get("api_url")
		.and_then(|v| v.as_str())
		.unwrap_or(DEFAULT_API_URL);

	let poll_timeout_secs = config
		.get("poll_timeout_seconds")
		.and_then(|v| v.as_integer())
		.unwrap_or(DEFAULT_POLL_TIMEOUT_SECS);

	Ok(Box::new(TelegramTransport::new(
		&token,
		api_url,
		poll_timeout_secs,
	)))
}
