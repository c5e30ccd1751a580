//! Ledger persistence
//!
//! The hosted [`Runtime`] is kept as one pretty-printed JSON document. Every
//! load re-runs the supply audit, so a hand-edited or truncated file is
//! refused instead of being served.

use crate::runtime::Runtime;
use std::fs;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub ledger_file: String,
    pub backup_enabled: bool,
    pub max_backups: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".ledger_data"),
            ledger_file: "ledger.json".to_string(),
            backup_enabled: true,
            max_backups: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Storage {
    config: StorageConfig,
}

impl Storage {
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(&config.data_dir)?;
        Ok(Self { config })
    }

    fn ledger_path(&self) -> PathBuf {
        self.config.data_dir.join(&self.config.ledger_file)
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        self.config
            .data_dir
            .join(format!("{}.backup.{}", self.config.ledger_file, index))
    }

    /// Persist the runtime, keeping the previous file as backup 0
    pub fn save(&self, runtime: &Runtime) -> Result<(), StorageError> {
        let path = self.ledger_path();

        if self.config.backup_enabled && self.config.max_backups > 0 && path.exists() {
            self.rotate_backups()?;
            fs::copy(&path, self.backup_path(0))?;
        }

        let temp_path = self
            .config
            .data_dir
            .join(format!("{}.tmp", self.config.ledger_file));
        let file = fs::File::create(&temp_path)?;
        let writer = BufWriter::new(file);

        serde_json::to_writer_pretty(writer, runtime)?;
        fs::rename(&temp_path, &path)?;

        log::debug!(
            "Saved ledger ({} committed calls) to {:?}",
            runtime.committed_calls(),
            path
        );

        Ok(())
    }

    /// Load the runtime from disk, rejecting state that fails its audit
    pub fn load(&self) -> Result<Runtime, StorageError> {
        let path = self.ledger_path();

        if !path.exists() {
            return Err(StorageError::InvalidData(format!(
                "no ledger file at {:?}",
                path
            )));
        }

        let runtime = load_from_file(&path)?;
        log::debug!("Loaded ledger from {:?}", path);
        Ok(runtime)
    }

    pub fn exists(&self) -> bool {
        self.ledger_path().exists()
    }

    /// Remove the ledger file. Backups are left in place.
    pub fn delete(&self) -> Result<(), StorageError> {
        let path = self.ledger_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    // Shifts backup i to i + 1, dropping the oldest
    fn rotate_backups(&self) -> Result<(), StorageError> {
        let oldest = self.backup_path(self.config.max_backups - 1);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }

        for i in (0..self.config.max_backups - 1).rev() {
            let current = self.backup_path(i);
            if current.exists() {
                let next = self.backup_path(i + 1);
                fs::rename(&current, &next)?;
            }
        }

        Ok(())
    }

    /// Load backup `backup_index` (0 is the most recent). The live file is untouched.
    pub fn restore_backup(&self, backup_index: usize) -> Result<Runtime, StorageError> {
        let backup_path = self.backup_path(backup_index);

        if !backup_path.exists() {
            return Err(StorageError::InvalidData(format!(
                "Backup {} not found",
                backup_index
            )));
        }

        load_from_file(&backup_path)
    }

    pub fn list_backups(&self) -> Vec<usize> {
        (0..self.config.max_backups)
            .filter(|&i| self.backup_path(i).exists())
            .collect()
    }

    pub fn stats(&self) -> Result<StorageStats, StorageError> {
        let path = self.ledger_path();

        let file_size = if path.exists() {
            fs::metadata(&path)?.len()
        } else {
            0
        };

        Ok(StorageStats {
            file_size,
            backup_count: self.list_backups().len(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageStats {
    pub file_size: u64,
    pub backup_count: usize,
}

fn load_from_file(path: &Path) -> Result<Runtime, StorageError> {
    let reader = BufReader::new(fs::File::open(path)?);
    let runtime: Runtime = serde_json::from_reader(reader)?;

    if runtime.is_initialized() {
        runtime.verify().map_err(|e| {
            StorageError::InvalidData(format!("{:?} failed its audit: {}", path, e))
        })?;
    }

    Ok(runtime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Address;
    use crate::runtime::Call;

    const A: Address = Address::new([0xa; 20]);
    const B: Address = Address::new([0xb; 20]);

    fn test_storage(dir: &Path, max_backups: usize) -> Storage {
        let config = StorageConfig {
            data_dir: dir.to_path_buf(),
            max_backups,
            ..Default::default()
        };
        Storage::new(config).unwrap()
    }

    #[test]
    fn test_save_load_ledger() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = test_storage(temp_dir.path(), 5);

        let mut runtime = Runtime::default();
        runtime.deploy(A, "Test Token", "TST", u128::MAX, 18).unwrap();
        runtime
            .execute(A, Call::Transfer { to: B, amount: 300 })
            .unwrap();

        // Save
        storage.save(&runtime).unwrap();
        assert!(storage.exists());

        // Load
        let loaded = storage.load().unwrap();
        assert_eq!(loaded.ledger().unwrap(), runtime.ledger().unwrap());
        assert_eq!(loaded.balance_of(&B).unwrap(), 300);
        assert_eq!(loaded.total_supply().unwrap(), u128::MAX);
        assert_eq!(loaded.history().len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = test_storage(temp_dir.path(), 5);

        assert!(!storage.exists());
        assert!(matches!(storage.load(), Err(StorageError::InvalidData(_))));
    }

    #[test]
    fn test_load_rejects_tampered_supply() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = test_storage(temp_dir.path(), 5);

        let mut runtime = Runtime::default();
        runtime.deploy(A, "Test Token", "TST", 1000, 18).unwrap();
        storage.save(&runtime).unwrap();

        let path = temp_dir.path().join("ledger.json");
        let json = fs::read_to_string(&path).unwrap();
        let tampered = json.replace("\"total_supply\": 1000", "\"total_supply\": 5000");
        assert_ne!(json, tampered);
        fs::write(&path, tampered).unwrap();

        assert!(matches!(storage.load(), Err(StorageError::InvalidData(_))));
    }

    #[test]
    fn test_backup_rotation() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = test_storage(temp_dir.path(), 3);

        let mut runtime = Runtime::default();
        runtime.deploy(A, "Test Token", "TST", 1000, 18).unwrap();

        // Save multiple times
        for amount in 1..=5 {
            storage.save(&runtime).unwrap();
            runtime
                .execute(A, Call::Transfer { to: B, amount })
                .unwrap();
        }

        let backups = storage.list_backups();
        assert_eq!(backups, vec![0, 1, 2]);

        // Backup 0 is the save before the last one: transfers 1..=3 applied
        let restored = storage.restore_backup(0).unwrap();
        assert_eq!(restored.balance_of(&B).unwrap(), 6);
        assert!(matches!(
            storage.restore_backup(7),
            Err(StorageError::InvalidData(_))
        ));
    }

    #[test]
    fn test_delete_and_stats() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = test_storage(temp_dir.path(), 5);

        storage.save(&Runtime::default()).unwrap();
        storage.save(&Runtime::default()).unwrap();
        let stats = storage.stats().unwrap();
        assert!(stats.file_size > 0);
        assert_eq!(stats.backup_count, 1);

        // Backups survive deletion of the live file
        storage.delete().unwrap();
        assert!(!storage.exists());
        assert_eq!(
            storage.stats().unwrap(),
            StorageStats {
                file_size: 0,
                backup_count: 1
            }
        );
        assert!(!storage.restore_backup(0).unwrap().is_initialized());
    }
}
