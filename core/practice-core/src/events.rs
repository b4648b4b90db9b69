//! Notifications emitted for the presentation layer.
//!
//! The engine buffers these as it changes state; clients drain them after
//! each call and render whatever they need. Nothing in the engine depends on
//! them being read.

use chrono::{DateTime, Utc};

use crate::session::{RecoveryOffer, SessionPhase};
use crate::types::{ItemOutcome, SessionRecord};

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    PhaseChanged {
        from: SessionPhase,
        to: SessionPhase,
    },
    ItemClassified {
        item_id: String,
        outcome: ItemOutcome,
    },
    UndoArmed {
        item_id: String,
        expires_at: DateTime<Utc>,
    },
    UndoApplied {
        item_id: String,
    },
    UndoExpired {
        item_id: String,
    },
    SessionFinalized(SessionRecord),
    RecoveryOffered(RecoveryOffer),
    SessionDiscarded {
        session_id: String,
    },
}
