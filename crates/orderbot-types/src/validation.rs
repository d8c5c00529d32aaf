//! Configuration validation types.
//!
//! Pluggable implementations (storage backends, transports) are configured
//! through free-form TOML tables. Each implementation publishes a schema so
//! the builder can validate its table before instantiation and report precise
//! errors instead of failing deep inside the implementation.

use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Debug, Error)]
pub enum ValidationError {
	/// A required field is missing.
	#[error("Missing required field: {0}")]
	MissingField(String),
	/// A field is present but holds an unacceptable value.
	#[error("Invalid value for field '{field}': {message}")]
	InvalidValue { field: String, message: String },
	/// A field has the wrong TOML type.
	#[error("Type mismatch for field '{field}': expected {expected}, got {actual}")]
	TypeMismatch {
		field: String,
		expected: String,
		actual: String,
	},
}

/// The TOML type expected of a configuration field.
#[derive(Debug)]
pub enum FieldType {
	/// A string value.
	String,
	/// An integer value with optional inclusive bounds.
	Integer { min: Option<i64>, max: Option<i64> },
	/// A boolean value.
	Boolean,
}

/// One field in a configuration schema.
pub struct Field {
	pub name: String,
	pub field_type: FieldType,
	validator: Option<Box<dyn Fn(&toml::Value) -> Result<(), String> + Send + Sync>>,
}

impl Field {
	/// Creates a field with the given name and expected type.
	pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
		Self {
			name: name.into(),
			field_type,
			validator: None,
		}
	}

	/// Attaches a custom check run after the type check passes.
	pub fn with_validator<F>(mut self, validator: F) -> Self
	where
		F: Fn(&toml::Value) -> Result<(), String> + Send + Sync + 'static,
	{
		self.validator = Some(Box::new(validator));
		self
	}
}

/// A flat schema of required and optional fields.
pub struct Schema {
	required: Vec<Field>,
	optional: Vec<Field>,
}

impl Schema {
	pub fn new(required: Vec<Field>, optional: Vec<Field>) -> Self {
		Self { required, optional }
	}

	/// Validates a TOML table against this schema.
	///
	/// Required fields must be present; every present field must match its
	/// declared type and pass its custom check, if any.
	pub fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let table = config
			.as_table()
			.ok_or_else(|| ValidationError::TypeMismatch {
				field: "root".to_string(),
				expected: "table".to_string(),
				actual: config.type_str().to_string(),
			})?;

		for field in &self.required {
			let value = table
				.get(&field.name)
				.ok_or_else(|| ValidationError::MissingField(field.name.clone()))?;
			check_field(field, value)?;
		}

		for field in &self.optional {
			if let Some(value) = table.get(&field.name) {
				check_field(field, value)?;
			}
		}

		Ok(())
	}
}

fn check_field(field: &Field, value: &toml::Value) -> Result<(), ValidationError> {
	match &field.field_type {
		FieldType::String => {
			if !value.is_str() {
				return Err(type_mismatch(&field.name, "string", value));
			}
		}
		FieldType::Integer { min, max } => {
			let n = value
				.as_integer()
				.ok_or_else(|| type_mismatch(&field.name, "integer", value))?;
			if min.is_some_and(|lo| n < lo) || max.is_some_and(|hi| n > hi) {
				return Err(ValidationError::InvalidValue {
					field: field.name.clone(),
					message: format!("value {} is out of range", n),
				});
			}
		}
		FieldType::Boolean => {
			if !value.is_bool() {
				return Err(type_mismatch(&field.name, "boolean", value));
			}
		}
	}

	if let Some(validator) = &field.validator {
		validator(value).map_err(|message| ValidationError::InvalidValue {
			field: field.name.clone(),
			message,
		})?;
	}

	Ok(())
}

fn type_mismatch(field: &str, expected: &str, value: &toml::Value) -> ValidationError {
	ValidationError::TypeMismatch {
		field: field.to_string(),
		expected: expected.to_string(),
		actual: value.type_str().to_string(),
	}
}

/// A configuration schema that can validate the TOML table of one
/// implementation.
pub trait ConfigSchema: Send + Sync {
	/// Validates a TOML configuration value against this schema.
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError>;
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse(s: &str) -> toml::Value {
		s.parse().unwrap()
	}

	#[test]
	fn missing_required_field() {
		let schema = Schema::new(vec![Field::new("token", FieldType::String)], vec![]);
		let err = schema.validate(&parse("other = 1")).unwrap_err();
		assert!(matches!(err, ValidationError::MissingField(f) if f == "token"));
	}

	#[test]
	fn wrong_type_reported() {
		let schema = Schema::new(vec![Field::new("token", FieldType::String)], vec![]);
		let err = schema.validate(&parse("token = 42")).unwrap_err();
		assert!(matches!(err, ValidationError::TypeMismatch { .. }));
	}

	#[test]
	fn integer_bounds_enforced() {
		let schema = Schema::new(
			vec![],
			vec![Field::new(
				"poll_timeout_seconds",
				FieldType::Integer {
					min: Some(1),
					max: Some(90),
				},
			)],
		);
		assert!(schema.validate(&parse("poll_timeout_seconds = 30")).is_ok());
		assert!(schema
			.validate(&parse("poll_timeout_seconds = 0"))
			.is_err());
	}

	#[test]
	fn custom_validator_runs() {
		let schema = Schema::new(
			vec![Field::new("token", FieldType::String).with_validator(|v| {
				if v.as_str().is_some_and(|s| s.is_empty()) {
					Err("must not be empty".into())
				} else {
					Ok(())
				}
			})],
			vec![],
		);
		assert!(schema.validate(&parse("token = \"abc\"")).is_ok());
		assert!(schema.validate(&parse("token = \"\"")).is_err());
	}
}
