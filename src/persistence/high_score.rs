//! Best-score persistence
//!
//! The engine never touches storage itself. It announces a new best score with
//! `EngineEvent::HighScore` and the driver hands the value to a [`HighScoreStore`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Storage for the best score across sessions
pub trait HighScoreStore {
    /// Stored best score, 0 when nothing was saved yet
    fn load(&self) -> Result<u32>;

    fn save(&mut self, high_score: u32) -> Result<()>;
}

impl<T: HighScoreStore + ?Sized> HighScoreStore for Box<T> {
    fn load(&self) -> Result<u32> {
        (**self).load()
    }

    fn save(&mut self, high_score: u32) -> Result<()> {
        (**self).save(high_score)
    }
}

/// On-disk record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HighScoreRecord {
    pub high_score: u32,
    /// Version of the game that wrote the record
    #[serde(default)]
    pub version: String,
}

impl HighScoreRecord {
    pub fn new(high_score: u32) -> Self {
        Self {
            high_score,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Keeps the best score in a small JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HighScoreStore for JsonFileStore {
    /// A missing file counts as no score yet; an unreadable one is an error
    fn load(&self) -> Result<u32> {
        if !self.path.exists() {
            return Ok(0);
        }

        let json = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read high score from {:?}", self.path))?;
        let record: HighScoreRecord = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse high score file {:?}", self.path))?;

        Ok(record.high_score)
    }

    /// Creates parent directories if they don't exist
    fn save(&mut self, high_score: u32) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {:?}", parent))?;
            }
        }

        let json = serde_json::to_string_pretty(&HighScoreRecord::new(high_score))
            .context("Failed to serialize high score")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write high score to {:?}", self.path))?;

        Ok(())
    }
}

/// Process-local store, used when saving is disabled and in tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    high_score: u32,
    saves: usize,
}

impl MemoryStore {
    pub fn new(high_score: u32) -> Self {
        Self {
            high_score,
            saves: 0,
        }
    }

    /// Number of successful saves
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl HighScoreStore for MemoryStore {
    fn load(&self) -> Result<u32> {
        Ok(self.high_score)
    }

    fn save(&mut self, high_score: u32) -> Result<()> {
        self.high_score = high_score;
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_loads_zero() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path().join("high_score.json"));

        assert_eq!(store.load().unwrap(), 0);
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("high_score.json");
        let mut store = JsonFileStore::new(&path);

        store.save(130).unwrap();
        assert!(path.exists());
        assert_eq!(store.load().unwrap(), 130);

        // A fresh handle on the same file sees the value
        assert_eq!(JsonFileStore::new(&path).load().unwrap(), 130);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("high_score.json");
        std::fs::write(&path, "not json").unwrap();

        let err = JsonFileStore::new(&path).load().unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse high score file"));
    }

    #[test]
    fn test_record_without_version() {
        let record: HighScoreRecord = serde_json::from_str(r#"{ "high_score": 70 }"#).unwrap();
        assert_eq!(record.high_score, 70);
        assert!(record.version.is_empty());
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new(40);
        assert_eq!(store.load().unwrap(), 40);

        store.save(50).unwrap();
        assert_eq!(store.load().unwrap(), 50);
        assert_eq!(store.saves(), 1);
    }
}
