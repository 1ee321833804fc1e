// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Filesystem-backed document store.
//!
//! Every entity instance is a single JSON file under the data directory;
//! activity logs are appended to daily JSONL files. Writes go through a
//! temp-file-then-rename sequence so a crashed write never leaves a
//! half-serialized document behind.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use super::StoragePaths;

/// Error type for document store operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Entity not found
    #[error("Not found: {0}")]
    NotFound(String),
    /// Entity already exists
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    /// Storage not initialized
    #[error("Storage not initialized")]
    NotInitialized,
    /// Generic serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Document store over a plain directory tree.
///
/// All operations use standard filesystem I/O against the configured root.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    paths: StoragePaths,
    initialized: bool,
}

impl DocumentStore {
    /// Create a new DocumentStore instance.
    ///
    /// Does NOT create the directory structure. Call `initialize()` first.
    pub fn new(paths: StoragePaths) -> Self {
        Self {
            paths,
            initialized: false,
        }
    }

    /// Get the storage paths.
    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    /// Initialize the storage directory structure.
    ///
    /// Creates all required directories under the root.
    /// Safe to call multiple times (idempotent).
    pub fn initialize(&mut self) -> StorageResult<()> {
        let dirs = [
            self.paths.users_dir(),
            self.paths.clients_dir(),
            self.paths.inquiries_dir(),
            self.paths.projects_dir(),
            self.paths.activity_dir(),
        ];

        for dir in dirs {
            fs::create_dir_all(&dir)?;
        }

        self.initialized = true;
        Ok(())
    }

    /// Check if the storage directory is available and writable.
    ///
    /// Performs a write-read-delete probe against the root.
    pub fn health_check(&self) -> StorageResult<()> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let test_file = self.paths.root().join(".health_check");
        let test_data = b"health_check_data";

        fs::write(&test_file, test_data)?;
        let read_data = fs::read(&test_file)?;
        fs::remove_file(&test_file)?;

        if read_data != test_data {
            return Err(StorageError::SerializationError(
                "Health check data mismatch".to_string(),
            ));
        }

        Ok(())
    }

    // ========== Generic JSON Operations ==========

    /// Read a JSON document and deserialize it.
    pub fn read_json<T: DeserializeOwned>(&self, path: impl AsRef<Path>) -> StorageResult<T> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);
        let value = serde_json::from_reader(reader)?;
        Ok(value)
    }

    /// Write a JSON document (atomic write via rename).
    pub fn write_json<T: Serialize>(&self, path: impl AsRef<Path>, value: &T) -> StorageResult<()> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("tmp");
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.flush()?;
        }

        fs::rename(&temp_path, path)?;
        Ok(())
    }

    /// Check if a document exists.
    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        File::open(path.as_ref()).is_ok()
    }

    /// Delete a document.
    pub fn delete(&self, path: impl AsRef<Path>) -> StorageResult<()> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }
        fs::remove_file(path.as_ref())?;
        Ok(())
    }

    /// List all document ids in a directory matching an extension.
    pub fn list_files(&self, dir: impl AsRef<Path>, extension: &str) -> StorageResult<Vec<String>> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let dir = dir.as_ref();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext == extension {
                        if let Some(stem) = path.file_stem() {
                            if let Some(id) = stem.to_str() {
                                ids.push(id.to_string());
                            }
                        }
                    }
                }
            }
        }
        Ok(ids)
    }

    // ========== Raw File Operations (for JSONL logs) ==========

    /// Append raw bytes to a file, creating it if absent.
    pub fn append_raw(&self, path: impl AsRef<Path>, data: &[u8]) -> StorageResult<()> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().append(true).create(true).open(path)?;
        file.write_all(data)?;
        file.flush()?;
        Ok(())
    }

    /// Read raw bytes from a file.
    pub fn read_raw(&self, path: impl AsRef<Path>) -> StorageResult<Vec<u8>> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let mut file = File::open(path.as_ref())?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    fn test_store() -> (TempDir, DocumentStore) {
        let temp = TempDir::new().unwrap();
        let paths = StoragePaths::new(temp.path());
        let mut store = DocumentStore::new(paths);
        store.initialize().expect("Failed to initialize test store");
        (temp, store)
    }

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TestDoc {
        id: String,
        value: i32,
    }

    #[test]
    fn initialize_creates_directories() {
        let (_temp, store) = test_store();

        assert!(store.paths().users_dir().exists());
        assert!(store.paths().clients_dir().exists());
        assert!(store.paths().inquiries_dir().exists());
        assert!(store.paths().projects_dir().exists());
        assert!(store.paths().activity_dir().exists());
    }

    #[test]
    fn write_and_read_json() {
        let (_temp, store) = test_store();
        let doc = TestDoc {
            id: "test-1".to_string(),
            value: 42,
        };

        let path = store.paths().user("test-1");
        store.write_json(&path, &doc).unwrap();

        let read: TestDoc = store.read_json(&path).unwrap();
        assert_eq!(read, doc);
    }

    #[test]
    fn list_files_returns_ids() {
        let (_temp, store) = test_store();

        for i in 1..=3 {
            let path = store.paths().client(&format!("c-{i}"));
            store
                .write_json(
                    &path,
                    &TestDoc {
                        id: format!("c-{i}"),
                        value: i,
                    },
                )
                .unwrap();
        }

        let ids = store.list_files(store.paths().clients_dir(), "json").unwrap();
        assert_eq!(ids.len(), 3);
        assert!(ids.contains(&"c-1".to_string()));
        assert!(ids.contains(&"c-3".to_string()));
    }

    #[test]
    fn delete_file_removes_it() {
        let (_temp, store) = test_store();

        let path = store.paths().user("to-delete");
        store
            .write_json(
                &path,
                &TestDoc {
                    id: "del".to_string(),
                    value: 0,
                },
            )
            .unwrap();

        assert!(store.exists(&path));
        store.delete(&path).unwrap();
        assert!(!store.exists(&path));
    }

    #[test]
    fn append_raw_accumulates_lines() {
        let (_temp, store) = test_store();

        let path = store.paths().activity_day_file("2026-01-01");
        store.append_raw(&path, b"line one\n").unwrap();
        store.append_raw(&path, b"line two\n").unwrap();

        let data = store.read_raw(&path).unwrap();
        assert_eq!(data, b"line one\nline two\n");
    }

    #[test]
    fn health_check_works() {
        let (_temp, store) = test_store();
        store.health_check().expect("Health check should pass");
    }

    #[test]
    fn uninitialized_store_returns_error() {
        let paths = StoragePaths::new("/tmp/never-init");
        let store = DocumentStore::new(paths);

        let result = store.read_json::<TestDoc>("/tmp/any.json");
        assert!(matches!(result, Err(StorageError::NotInitialized)));
    }
}
