//! Practice Session Lifecycle
//!
//! ```text
//!          start            stop              finalize
//!   Idle ────────▶ Active ────────▶ Classifying ────────▶ Idle
//!    ▲               ▲
//!    │  discard      │ resume
//!    └──── Recovery ─┘   (once, at engine construction)
//! ```
//!
//! # Module Structure
//!
//! - [`machine`]: phase transitions, the in-memory session and its ledger
//! - [`commit`]: applies a finished ledger to the durable aggregate
//! - [`recovery`]: detects a session left in the shadow slot by a crash
//!
//! None of these modules perform I/O; the engine sequences them against the
//! store.

mod commit;
mod machine;
mod recovery;

pub use commit::{apply_session, CommitSummary};
pub use machine::{next_phase, PhaseEvent, SessionMachine, SessionPhase};
pub use recovery::{RecoveryChoice, RecoveryManager, RecoveryOffer};
