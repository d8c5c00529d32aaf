//! Configuration module for the ordering assistant.
//!
//! This module provides structures and utilities for managing assistant
//! configuration. It supports loading configuration from TOML files with
//! environment variable resolution and validates that all required values are
//! properly set before the engine is built.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the assistant.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Configuration specific to the assistant instance.
	pub assistant: AssistantConfig,
	/// Configuration for the storage backend.
	pub storage: StorageConfig,
	/// Configuration for the chat transport.
	pub transport: TransportConfig,
}

/// Configuration specific to the assistant instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssistantConfig {
	/// Identifier for this assistant instance, used in logs.
	pub id: String,
	/// Chat identity of the single configured operator. Administrative
	/// triggers from any other identity are refused.
	pub operator_id: i64,
}

/// Configuration for the storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the chat transport.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransportConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of transport implementation names to their configurations.
	/// Each implementation has its own format stored as raw TOML values.
	pub implementations: HashMap<String, toml::Value>,
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB to prevent ReDoS attacks.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024; // 1MB
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = input.to_string();
	let mut replacements = Vec::new();

	for cap in re.captures_iter(input) {
		let full_match = cap.get(0).unwrap();
		let var_name = cap.get(1).unwrap().as_str();
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name) {
			Ok(v) => v,
			Err(_) => match default_value {
				Some(default) => default.to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name
					)))
				}
			},
		};

		replacements.push((full_match.start(), full_match.end(), value));
	}

	// Apply replacements in reverse order to maintain positions
	for (start, end, value) in replacements.iter().rev() {
		result.replace_range(start..end, value);
	}

	Ok(result)
}

impl Config {
	/// Loads configuration from a TOML file.
	///
	/// Environment variables are resolved and the configuration is validated
	/// after parsing.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let raw = tokio::fs::read_to_string(path).await?;
		raw.parse()
	}

	/// Validates the configuration to ensure all required fields are set.
	///
	/// This method checks that:
	/// - The assistant id is not empty
	/// - The operator id is set
	/// - Storage and transport declare a primary implementation that exists
	///   in their implementation maps
	fn validate(&self) -> Result<(), ConfigError> {
		if self.assistant.id.is_empty() {
			return Err(ConfigError::Validation(
				"Assistant id cannot be empty".into(),
			));
		}
		if self.assistant.operator_id == 0 {
			return Err(ConfigError::Validation(
				"Operator id must be configured".into(),
			));
		}

		if self.storage.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Storage primary implementation cannot be empty".into(),
			));
		}
		if !self
			.storage
			.implementations
			.contains_key(&self.storage.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary storage '{}' not found in implementations",
				self.storage.primary
			)));
		}

		if self.transport.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Transport primary implementation cannot be empty".into(),
			));
		}
		if !self
			.transport
			.implementations
			.contains_key(&self.transport.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary transport '{}' not found in implementations",
				self.transport.primary
			)));
		}

		Ok(())
	}
}

/// Implementation of FromStr for Config to enable parsing from string.
///
/// Environment variables are resolved and the configuration is automatically
/// validated after parsing.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const VALID: &str = r#"
[assistant]
id = "flower-shop"
operator_id = 1128002925

[storage]
primary = "memory"
[storage.implementations.memory]

[transport]
primary = "telegram"
[transport.implementations.telegram]
token = "123:abc"
"#;

	#[test]
	fn parses_valid_config() {
		let config: Config = VALID.parse().unwrap();
		assert_eq!(config.assistant.id, "flower-shop");
		assert_eq!(config.assistant.operator_id, 1128002925);
		assert_eq!(config.storage.primary, "memory");
		assert_eq!(config.transport.primary, "telegram");
	}

	#[test]
	fn env_var_resolution() {
		std::env::set_var("ORDERBOT_TEST_TOKEN", "tok-42");
		let input = "token = \"${ORDERBOT_TEST_TOKEN}\"";
		assert_eq!(resolve_env_vars(input).unwrap(), "token = \"tok-42\"");
		std::env::remove_var("ORDERBOT_TEST_TOKEN");
	}

	#[test]
	fn env_var_with_default() {
		let input = "value = \"${ORDERBOT_MISSING_VAR:-fallback}\"";
		assert_eq!(resolve_env_vars(input).unwrap(), "value = \"fallback\"");
	}

	#[test]
	fn missing_env_var_is_an_error() {
		let result = resolve_env_vars("value = \"${ORDERBOT_MISSING_VAR}\"");
		assert!(result.is_err());
		assert!(result
			.unwrap_err()
			.to_string()
			.contains("ORDERBOT_MISSING_VAR"));
	}

	#[test]
	fn unknown_primary_storage_rejected() {
		let bad = VALID.replace("primary = \"memory\"", "primary = \"redis\"");
		let err = bad.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("redis"));
	}

	#[test]
	fn missing_operator_rejected() {
		let bad = VALID.replace("operator_id = 1128002925", "operator_id = 0");
		assert!(bad.parse::<Config>().is_err());
	}

	#[test]
	fn empty_assistant_id_rejected() {
		let bad = VALID.replace("id = \"flower-shop\"", "id = \"\"");
		assert!(bad.parse::<Config>().is_err());
	}
}
