//! Dialog engine for the ordering assistant.
//!
//! This crate is the conversation state machine: given a user's current
//! dialog position and one inbound event, it validates the input against the
//! expected step, updates the collected-fields bag, and transitions
//! deterministically to the next step or a terminal action. Flow shapes live
//! in declarative tables ([`flows`]); the engine ([`engine`]) interprets
//! them against the catalog store and the session store.
//!
//! The core contract: invalid input never consumes the turn. The state is
//! returned unchanged and only a re-prompt is produced, no matter how often
//! it happens.

use orderbot_storage::CatalogError;
use thiserror::Error;

mod bag;
pub mod engine;
pub mod flows;
pub mod prompts;
pub mod step;
mod terminal;

pub use engine::{DialogEngine, TurnOutput};
pub use step::{BranchArm, Prompt, Step, StepCheck, TerminalAction, TokenPattern, Transition, Validator};

/// Errors that can occur while advancing a dialog.
///
/// Expected conversational outcomes (invalid input, vanished records,
/// duplicate names, refused admin triggers) are not errors; they are
/// regular turn outputs. These variants cover infrastructure failures and
/// flow-table inconsistencies only.
#[derive(Debug, Error)]
pub enum DialogError {
	/// The catalog store failed below the data-access layer.
	#[error("Catalog error: {0}")]
	Catalog(#[from] CatalogError),
	/// A flow table referenced a step or field that does not exist.
	#[error("Flow definition error: {0}")]
	Definition(String),
}
