//! Durable storage for practice data.
//!
//! Two independent slots:
//!
//! - **Main slot**: the `{ pool, sessions, archive }` aggregate.
//! - **Shadow slot**: the in-flight [`ActiveSession`], or nothing.
//!
//! The shadow slot is the source of truth for "is a session in flight".
//! Finalizing writes the main slot first and clears the shadow slot second;
//! a crash between the two leaves the shadow populated, which the recovery
//! check on the next start picks up.
//!
//! # Module Structure
//!
//! - [`file`]: JSON files under the storage root, atomic writes
//! - [`memory`]: shared in-memory slots for tests and embedding

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{PracticeError, Result};
use crate::types::{ActiveSession, PracticeData};

/// Capability the engine needs from its storage layer.
///
/// Saves are synchronous: when a call returns `Ok`, a later load observes it.
pub trait PracticeStore {
    /// Reads the main aggregate. A slot that was never written yields the
    /// empty default; an unreadable one yields `CorruptDurableState`.
    fn load_data(&self) -> Result<PracticeData>;

    /// Replaces the main aggregate in one write.
    fn save_data(&mut self, data: &PracticeData) -> Result<()>;

    /// Reads the shadow slot.
    fn load_active(&self) -> Result<Option<ActiveSession>>;

    /// Writes the shadow slot; `None` clears it.
    fn save_active(&mut self, session: Option<&ActiveSession>) -> Result<()>;
}

/// Writes content to a file atomically using temp file + rename.
pub(crate) fn atomic_write(path: &Path, contents: &str) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| PracticeError::Io {
        context: format!("creating temp file in {}", dir.display()),
        source: e,
    })?;

    tmp.write_all(contents.as_bytes())
        .map_err(|e| PracticeError::Io {
            context: format!("writing temp file for {}", path.display()),
            source: e,
        })?;

    tmp.flush().map_err(|e| PracticeError::Io {
        context: format!("flushing temp file for {}", path.display()),
        source: e,
    })?;

    tmp.persist(path).map_err(|e| PracticeError::Io {
        context: format!("persisting temp file to {}", path.display()),
        source: e.error,
    })?;

    Ok(())
}
