//! File-based storage backend implementation.
//!
//! Stores each record as one JSON file under a configured directory,
//! providing simple persistence without external dependencies. Writes go
//! through a temp file plus rename so a crash never leaves a half-written
//! record behind.

use crate::{StorageError, StorageInterface};
use async_trait::async_trait;
use orderbot_types::{ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, ValidationError};
use std::path::PathBuf;
use tokio::fs;

/// File-based storage implementation.
pub struct FileStorage {
	/// Base directory path for storing files.
	base_path: PathBuf,
}

impl FileStorage {
	/// Creates a new FileStorage instance rooted at the given directory.
	pub fn new(base_path: PathBuf) -> Self {
		Self { base_path }
	}

	/// Converts a storage key to a filesystem-safe file path.
	///
	/// Key namespacing uses `:`, which is replaced for filesystem safety;
	/// the mapping must stay injective so `list_keys` can invert it.
	fn file_path(&self, key: &str) -> PathBuf {
		self.base_path.join(format!("{}.json", Self::encode(key)))
	}

	fn encode(key: &str) -> String {
		key.replace(':', "__")
	}

	fn decode(file_stem: &str) -> String {
		file_stem.replace("__", ":")
	}
}

#[async_trait]
impl StorageInterface for FileStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		match fs::read(self.file_path(key)).await {
			Ok(data) => Ok(data),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let path = self.file_path(key);

		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)
				.await
				.map_err(|e| StorageError::Backend(e.to_string()))?;
		}

		// Write atomically by writing to a temp file then renaming
		let temp_path = path.with_extension("tmp");
		fs::write(&temp_path, value)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;
		fs::rename(&temp_path, &path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		match fs::remove_file(self.file_path(key)).await {
			Ok(_) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		Ok(self.file_path(key).exists())
	}

	async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
		let mut keys = Vec::new();

		let mut entries = match fs::read_dir(&self.base_path).await {
			Ok(entries) => entries,
			// An empty store has no directory yet
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(keys),
			Err(e) => return Err(StorageError::Backend(e.to_string())),
		};

		while let Some(entry) = entries
			.next_entry()
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?
		{
			let path = entry.path();
			if path.extension() != Some(std::ffi::OsStr::new("json")) {
				continue;
			}
			if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
				let key = Self::decode(stem);
				if key.starts_with(prefix) {
					keys.push(key);
				}
			}
		}

		Ok(keys)
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(FileStorageSchema)
	}
}

/// Configuration schema for FileStorage.
pub struct FileStorageSchema;

impl ConfigSchema for FileStorageSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		Schema::new(vec![], vec![Field::new("path", FieldType::String)]).validate(config)
	}
}

/// Registry entry for the file storage backend.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "file";
	type Factory = crate::StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl crate::StorageRegistry for Registry {}

/// Factory function to create a file storage backend from configuration.
///
/// Configuration parameters:
/// - `path`: Base directory for record files (default: "./data")
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	let path = config
		.get("path")
		.and_then(|v| v.as_str())
		.unwrap_or("./data")
		.to_string();

	Ok(Box::new(FileStorage::new(PathBuf::from(path))))
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::tempdir;

	#[tokio::test]
	async fn round_trips_records() {
		let dir = tempdir().unwrap();
		let storage = FileStorage::new(dir.path().to_path_buf());

		storage
			.set_bytes("orders:12", b"{\"id\":12}".to_vec())
			.await
			.unwrap();
		assert_eq!(
			storage.get_bytes("orders:12").await.unwrap(),
			b"{\"id\":12}".to_vec()
		);

		storage.delete("orders:12").await.unwrap();
		assert!(matches!(
			storage.get_bytes("orders:12").await,
			Err(StorageError::NotFound)
		));
		// Deleting again stays quiet
		storage.delete("orders:12").await.unwrap();
	}

	#[tokio::test]
	async fn list_keys_recovers_namespaced_keys() {
		let dir = tempdir().unwrap();
		let storage = FileStorage::new(dir.path().to_path_buf());

		storage.set_bytes("categories:1", vec![1]).await.unwrap();
		storage.set_bytes("categories:2", vec![2]).await.unwrap();
		storage.set_bytes("items:1", vec![3]).await.unwrap();

		let mut keys = storage.list_keys("categories:").await.unwrap();
		keys.sort();
		assert_eq!(keys, vec!["categories:1", "categories:2"]);
	}

	#[tokio::test]
	async fn listing_missing_directory_is_empty() {
		let dir = tempdir().unwrap();
		let storage = FileStorage::new(dir.path().join("nested"));
		assert!(storage.list_keys("orders:").await.unwrap().is_empty());
	}
}
