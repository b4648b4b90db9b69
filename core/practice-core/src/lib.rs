//! # practice-core
//!
//! Core library for the practice log: a pool of pieces and exercises to work
//! on, timed practice sessions, and a swipe-driven pass at the end of each
//! session that marks items completed or worked on.
//!
//! ## Design Principles
//!
//! - **Synchronous**: No async runtime dependency. Clients drive the engine from their own loop.
//! - **Not thread-safe**: One engine per process, owned by the client.
//! - **Graceful degradation**: Unreadable files fall back to empty state and are logged, not fatal.
//! - **Crash safe**: An in-flight session lives in its own file until it is committed.
//! - **Injected effects**: Storage, clock and id generation sit behind traits.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use practice_core::{PracticeEngine, StopOutcome};
//!
//! let mut engine = PracticeEngine::new();
//! engine.add_items("Scales in D\nBach partita, mm. 1-16")?;
//! engine.start()?;
//! // ...practice...
//! match engine.stop()? {
//!     StopOutcome::Classifying => {
//!         let first = engine.classification_items()[0].id.clone();
//!         engine.mark_completed(&first)?;
//!         engine.finalize()?;
//!     }
//!     StopOutcome::Finalized(record) => println!("logged {}s", record.duration),
//! }
//! ```

// Public modules
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod export;
pub mod format;
pub mod gesture;
pub mod ledger;
pub mod session;
pub mod storage;
pub mod store;
pub mod types;
pub mod undo;

// Re-export commonly used items at crate root
pub use clock::{Clock, IdSource, ManualClock, SequentialIds, SystemClock, UlidIds};
pub use config::*;
pub use engine::{ArchiveView, PracticeEngine, StopOutcome};
pub use error::{PracticeError, Result};
pub use events::EngineEvent;
pub use export::{export_file_name, parse_import, ExportEnvelope, EXPORT_APP_NAME};
pub use format::*;
pub use gesture::{GestureOutcome, SwipeFeedback};
pub use ledger::ClassificationLedger;
pub use session::{RecoveryChoice, RecoveryOffer, SessionPhase};
pub use storage::*;
pub use store::{FileStore, MemoryStore, PracticeStore};
pub use types::*;
pub use undo::UndoWindow;
