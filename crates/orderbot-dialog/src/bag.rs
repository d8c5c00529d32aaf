//! Typed accessors for the collected-fields bag.
//!
//! The flow tables guarantee which fields are present by the time a prompt or
//! terminal action needs them; a miss here means the tables are wrong, which
//! surfaces as a definition error rather than a panic.

use crate::DialogError;
use orderbot_types::{FieldBag, FieldName, FieldValue, PhotoRef};
use rust_decimal::Decimal;

fn missing(name: FieldName) -> DialogError {
	DialogError::Definition(format!("missing collected field '{}'", name))
}

pub(crate) fn id(fields: &FieldBag, name: FieldName) -> Result<u64, DialogError> {
	match fields.get(name) {
		Some(FieldValue::Id(id)) => Ok(*id),
		_ => Err(missing(name)),
	}
}

pub(crate) fn text<'a>(fields: &'a FieldBag, name: FieldName) -> Result<&'a str, DialogError> {
	match fields.get(name) {
		Some(FieldValue::Text(s)) => Ok(s),
		_ => Err(missing(name)),
	}
}

pub(crate) fn number(fields: &FieldBag, name: FieldName) -> Result<Decimal, DialogError> {
	match fields.get(name) {
		Some(FieldValue::Number(n)) => Ok(*n),
		_ => Err(missing(name)),
	}
}

pub(crate) fn choice<'a>(fields: &'a FieldBag, name: FieldName) -> Result<&'a str, DialogError> {
	match fields.get(name) {
		Some(FieldValue::Choice(c)) => Ok(c),
		_ => Err(missing(name)),
	}
}

/// Text that a branch may have recorded as explicitly absent.
pub(crate) fn optional_text(
	fields: &FieldBag,
	name: FieldName,
) -> Result<Option<String>, DialogError> {
	match fields.get(name) {
		Some(FieldValue::Text(s)) => Ok(Some(s.clone())),
		Some(FieldValue::Absent) => Ok(None),
		_ => Err(missing(name)),
	}
}

/// Photo that the skip marker may have recorded as explicitly absent.
pub(crate) fn optional_photo(
	fields: &FieldBag,
	name: FieldName,
) -> Result<Option<PhotoRef>, DialogError> {
	match fields.get(name) {
		Some(FieldValue::Photo(p)) => Ok(Some(p.clone())),
		Some(FieldValue::Absent) => Ok(None),
		_ => Err(missing(name)),
	}
}
