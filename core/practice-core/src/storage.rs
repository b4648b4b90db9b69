//! Storage configuration and path management for the practice log.
//!
//! Centralizes every file path the practice log reads or writes, so tests
//! can inject a temp directory and clients can point at an alternate root.
//!
//! ## Layout
//!
//! ```text
//! ~/.practice-log/
//!   practice-log.json     main aggregate (pool, sessions, archive)
//!   practice-active.json  shadow slot for the in-flight session
//!   config.json           preferences
//!   logs/                 client log files
//! ```

use std::path::{Path, PathBuf};

/// Central configuration for all practice-log storage paths.
///
/// Production code uses `StorageConfig::default()` which points to `~/.practice-log/`.
/// Tests use `StorageConfig::with_root(temp_dir)` for isolation.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            root: home.join(".practice-log"),
        }
    }
}

impl StorageConfig {
    /// Creates a StorageConfig with a custom root directory.
    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    /// Returns the root directory for practice-log data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Files
    // ─────────────────────────────────────────────────────────────────────────────

    /// Path to the main aggregate (pool, sessions, archive).
    pub fn data_file(&self) -> PathBuf {
        self.root.join("practice-log.json")
    }

    /// Path to the shadow slot holding the in-flight session.
    /// Kept separate from the main aggregate so a failed aggregate write
    /// cannot hide a running session.
    pub fn active_session_file(&self) -> PathBuf {
        self.root.join("practice-active.json")
    }

    /// Path to config.json (preferences).
    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.json")
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Directories
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Ensures the root directory and standard subdirectories exist.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_root_is_practice_log() {
        let config = StorageConfig::default();
        assert!(config.root().ends_with(".practice-log"));
    }

    #[test]
    fn test_with_root_sets_custom_path() {
        let config = StorageConfig::with_root(PathBuf::from("/tmp/test-practice"));
        assert_eq!(config.root(), Path::new("/tmp/test-practice"));
    }

    #[test]
    fn test_file_paths() {
        let config = StorageConfig::with_root(PathBuf::from("/tmp/practice"));
        assert_eq!(
            config.data_file(),
            PathBuf::from("/tmp/practice/practice-log.json")
        );
        assert_eq!(
            config.active_session_file(),
            PathBuf::from("/tmp/practice/practice-active.json")
        );
        assert_eq!(
            config.config_file(),
            PathBuf::from("/tmp/practice/config.json")
        );
        assert_eq!(config.logs_dir(), PathBuf::from("/tmp/practice/logs"));
    }

    #[test]
    fn test_ensure_dirs_creates_structure() {
        let temp = TempDir::new().unwrap();
        let config = StorageConfig::with_root(temp.path().join("nested"));

        config.ensure_dirs().unwrap();

        assert!(config.root().exists());
        assert!(config.logs_dir().exists());
    }
}
