//! File-backed practice data persistence.
//!
//! # File Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "pool": [ { "id": "p_...", "text": "...", "createdAt": "...", "workedCount": 0 } ],
//!   "sessions": [ ... most recent first ... ],
//!   "archive": [ ... newest last ... ]
//! }
//! ```
//!
//! The shadow slot is a separate file holding a single `ActiveSession`
//! object; the file is removed when no session is in flight.
//!
//! # Failure Handling
//!
//! - Missing or empty main file: empty aggregate
//! - Corrupt JSON or a newer schema version: `CorruptDurableState`, after
//!   copying the file aside so the fallback cannot overwrite the only copy

use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::Utc;
use fs_err as fs;

use super::{atomic_write, PracticeStore};
use crate::error::{PracticeError, Result};
use crate::storage::StorageConfig;
use crate::types::{ActiveSession, PracticeData, DATA_VERSION};

/// JSON files under a [`StorageConfig`] root.
pub struct FileStore {
    data_path: PathBuf,
    active_path: PathBuf,
    storage: StorageConfig,
}

impl FileStore {
    pub fn new(storage: &StorageConfig) -> Self {
        FileStore {
            data_path: storage.data_file(),
            active_path: storage.active_session_file(),
            storage: storage.clone(),
        }
    }

    fn ensure_root(&self) -> Result<()> {
        self.storage.ensure_dirs().map_err(|e| PracticeError::Io {
            context: format!("creating {}", self.storage.root().display()),
            source: e,
        })
    }

    /// Copies an unreadable data file next to the original.
    fn preserve_corrupt(&self) {
        let backup = self
            .data_path
            .with_extension(format!("json.corrupt-{}", Utc::now().format("%Y%m%d%H%M%S")));
        match fs::copy(&self.data_path, &backup) {
            Ok(_) => tracing::warn!(backup = %backup.display(), "Preserved corrupt data file"),
            Err(e) => tracing::warn!(error = %e, "Failed to preserve corrupt data file"),
        }
    }

    fn corrupt(&self, details: String) -> PracticeError {
        self.preserve_corrupt();
        PracticeError::CorruptDurableState {
            path: self.data_path.clone(),
            details,
        }
    }
}

impl PracticeStore for FileStore {
    fn load_data(&self) -> Result<PracticeData> {
        if !self.data_path.exists() {
            return Ok(PracticeData::default());
        }

        let content = fs::read_to_string(&self.data_path).map_err(|e| PracticeError::Io {
            context: "reading practice data".to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            tracing::warn!(path = %self.data_path.display(), "Empty data file, starting fresh");
            return Ok(PracticeData::default());
        }

        match serde_json::from_str::<PracticeData>(&content) {
            Ok(data) if data.version <= DATA_VERSION => Ok(data),
            Ok(data) => Err(self.corrupt(format!(
                "unsupported version {} (expected {})",
                data.version, DATA_VERSION
            ))),
            Err(e) => Err(self.corrupt(e.to_string())),
        }
    }

    fn save_data(&mut self, data: &PracticeData) -> Result<()> {
        self.ensure_root()?;
        let content = serde_json::to_string_pretty(data).map_err(|e| PracticeError::Json {
            context: "serializing practice data".to_string(),
            source: e,
        })?;
        atomic_write(&self.data_path, &content)
    }

    fn load_active(&self) -> Result<Option<ActiveSession>> {
        let content = match fs::read_to_string(&self.active_path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(PracticeError::Io {
                    context: "reading active session".to_string(),
                    source: e,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| PracticeError::CorruptDurableState {
                path: self.active_path.clone(),
                details: e.to_string(),
            })
    }

    fn save_active(&mut self, session: Option<&ActiveSession>) -> Result<()> {
        match session {
            Some(session) => {
                self.ensure_root()?;
                let content =
                    serde_json::to_string_pretty(session).map_err(|e| PracticeError::Json {
                        context: "serializing active session".to_string(),
                        source: e,
                    })?;
                atomic_write(&self.active_path, &content)
            }
            None => match fs::remove_file(&self.active_path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(PracticeError::Io {
                    context: "clearing active session".to_string(),
                    source: e,
                }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ArchiveEntry, PoolItem, SessionRecord};
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    fn sample_data() -> PracticeData {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap();
        PracticeData {
            version: DATA_VERSION,
            pool: vec![PoolItem {
                id: "p_1".to_string(),
                text: "Sevcik Op. 1".to_string(),
                created_at: at,
                worked_count: 2,
            }],
            sessions: vec![SessionRecord {
                id: "s_1".to_string(),
                started_at: at,
                ended_at: at,
                duration: 0,
                completed: vec!["p_0".to_string()],
                worked_on: vec!["p_1".to_string()],
                note: "bow distribution".to_string(),
            }],
            archive: vec![ArchiveEntry {
                id: "p_0".to_string(),
                text: "G major scale".to_string(),
                completed_at: at,
            }],
        }
    }

    #[test]
    fn test_persistence_round_trip() {
        let temp = tempdir().unwrap();
        let storage = StorageConfig::with_root(temp.path().join("root"));
        let data = sample_data();

        FileStore::new(&storage).save_data(&data).unwrap();

        assert_eq!(FileStore::new(&storage).load_data().unwrap(), data);
    }

    #[test]
    fn test_load_nonexistent_file_returns_default() {
        let temp = tempdir().unwrap();
        let store = FileStore::new(&StorageConfig::with_root(temp.path().to_path_buf()));
        assert_eq!(store.load_data().unwrap(), PracticeData::default());
    }

    #[test]
    fn test_load_empty_file_returns_default() {
        let temp = tempdir().unwrap();
        let storage = StorageConfig::with_root(temp.path().to_path_buf());
        std::fs::write(storage.data_file(), "  ").unwrap();

        let store = FileStore::new(&storage);
        assert_eq!(store.load_data().unwrap(), PracticeData::default());
    }

    #[test]
    fn test_load_corrupt_json_reports_corrupt_state() {
        let temp = tempdir().unwrap();
        let storage = StorageConfig::with_root(temp.path().to_path_buf());
        std::fs::write(storage.data_file(), "{invalid json}").unwrap();

        let result = FileStore::new(&storage).load_data();
        assert!(matches!(
            result,
            Err(PracticeError::CorruptDurableState { .. })
        ));
    }

    #[test]
    fn test_corrupt_file_is_preserved_aside() {
        let temp = tempdir().unwrap();
        let storage = StorageConfig::with_root(temp.path().to_path_buf());
        std::fs::write(storage.data_file(), "{invalid json}").unwrap();

        let _ = FileStore::new(&storage).load_data();

        let backups = std::fs::read_dir(temp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".corrupt-"))
            .count();
        assert_eq!(backups, 1);
    }

    #[test]
    fn test_load_newer_version_reports_corrupt_state() {
        let temp = tempdir().unwrap();
        let storage = StorageConfig::with_root(temp.path().to_path_buf());
        std::fs::write(storage.data_file(), r#"{"version":9,"pool":[]}"#).unwrap();

        let result = FileStore::new(&storage).load_data();
        assert!(matches!(
            result,
            Err(PracticeError::CorruptDurableState { .. })
        ));
    }

    #[test]
    fn test_active_slot_save_load_clear() {
        let temp = tempdir().unwrap();
        let storage = StorageConfig::with_root(temp.path().join("root"));
        let mut store = FileStore::new(&storage);
        let session = ActiveSession::new(
            "s_1".to_string(),
            Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap(),
        );

        assert_eq!(store.load_active().unwrap(), None);

        store.save_active(Some(&session)).unwrap();
        assert_eq!(store.load_active().unwrap(), Some(session));

        store.save_active(None).unwrap();
        assert_eq!(store.load_active().unwrap(), None);
        assert!(!storage.active_session_file().exists());
    }

    #[test]
    fn test_clearing_absent_active_slot_is_ok() {
        let temp = tempdir().unwrap();
        let mut store = FileStore::new(&StorageConfig::with_root(temp.path().to_path_buf()));
        assert!(store.save_active(None).is_ok());
    }

    #[test]
    fn test_corrupt_active_slot_reports_corrupt_state() {
        let temp = tempdir().unwrap();
        let storage = StorageConfig::with_root(temp.path().to_path_buf());
        std::fs::write(storage.active_session_file(), "nope").unwrap();

        let result = FileStore::new(&storage).load_active();
        assert!(matches!(
            result,
            Err(PracticeError::CorruptDurableState { .. })
        ));
    }
}
