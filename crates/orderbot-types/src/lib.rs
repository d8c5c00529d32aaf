//! Common types module for the ordering assistant.
//!
//! This module defines the core data types and structures shared by all
//! assistant components. It provides a centralized location for the catalog
//! records, chat input/output shapes, conversation state, and the
//! configuration validation framework.

/// Catalog records: categories, items, and orders.
pub mod catalog;
/// Chat-level types: identities, inbound events, outbound messages.
pub mod chat;
/// Conversation state types shared between the session store and the engine.
pub mod dialog;
/// Event types for observing engine activity.
pub mod events;
/// Registry trait for self-registering implementations.
pub mod registry;
/// Zeroizing wrapper for sensitive configuration values.
pub mod secret;
/// Storage namespace keys.
pub mod storage;
/// Opaque button token encoding and parsing.
pub mod tokens;
/// Configuration validation types for ensuring type-safe configurations.
pub mod validation;

// Re-export all types for convenient access
pub use catalog::*;
pub use chat::*;
pub use dialog::*;
pub use events::*;
pub use registry::*;
pub use secret::SecretString;
pub use storage::*;
pub use validation::*;
