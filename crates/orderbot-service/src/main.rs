//! Main entry point for the ordering assistant service.
//!
//! This binary wires the complete assistant: it loads configuration,
//! registers the available storage and transport implementations, builds the
//! engine, and runs it until interrupted.

use clap::Parser;
use orderbot_config::Config;
use orderbot_core::{EngineBuilder, EngineFactories};
use std::collections::HashMap;
use std::path::PathBuf;

/// Command-line arguments for the assistant service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

/// Main entry point for the assistant service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Builds the engine with all registered implementations
/// 5. Runs the engine until interrupted
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(args.log_level.clone()));

	fmt().with_env_filter(env_filter).with_target(true).init();

	let config_path = args
		.config
		.to_str()
		.ok_or("Configuration path is not valid UTF-8")?;
	let config = Config::from_file(config_path).await?;
	tracing::info!("Loaded configuration [{}]", config.assistant.id);

	let engine = EngineBuilder::new(config).build(all_factories())?;
	engine.run().await?;

	Ok(())
}

/// Collects the factory maps of every registered implementation.
fn all_factories() -> EngineFactories {
	EngineFactories {
		storage_factories: named(orderbot_storage::get_all_implementations()),
		transport_factories: named(orderbot_transport::get_all_implementations()),
	}
}

fn named<F>(implementations: Vec<(&'static str, F)>) -> HashMap<String, F> {
	implementations
		.into_iter()
		.map(|(name, factory)| (name.to_string(), factory))
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn all_factories_register_every_implementation() {
		let factories = all_factories();
		assert!(factories.storage_factories.contains_key("memory"));
		assert!(factories.storage_factories.contains_key("file"));
		assert!(factories.transport_factories.contains_key("telegram"));
	}

	#[test]
	fn args_default_values() {
		let args = Args {
			config: PathBuf::from("config.toml"),
			log_level: "info".to_string(),
		};

		assert_eq!(args.config, PathBuf::from("config.toml"));
		assert_eq!(args.log_level, "info");
	}
}
