//! Registry trait for self-registering implementations.
//!
//! This module provides the base trait that storage and transport
//! implementations must implement to register themselves with their
//! configuration name and factory function.

/// Base trait for implementation registries.
///
/// Each pluggable module (storage backends, transports) provides a Registry
/// struct implementing this trait, declaring the configuration name the
/// implementation is selected by and a factory function that builds it.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation.
	///
	/// This should match the key used in the TOML configuration, for example:
	/// - "memory" for storage.implementations.memory
	/// - "telegram" for transport.implementations.telegram
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Get the factory function for this implementation.
	fn factory() -> Self::Factory;
}
