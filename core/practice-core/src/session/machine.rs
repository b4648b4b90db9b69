//! Session phase state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PracticeError, Result};
use crate::ledger::ClassificationLedger;
use crate::types::{whole_seconds_between, ActiveSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    Active,
    Classifying,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    Start,
    Resume,
    Stop,
    Finalize,
}

/// Maps a phase and an event to the next phase, or the error the caller sees.
pub fn next_phase(current: SessionPhase, event: PhaseEvent) -> Result<SessionPhase> {
    use SessionPhase::*;
    match (current, event) {
        (Idle, PhaseEvent::Start) | (Idle, PhaseEvent::Resume) => Ok(Active),
        (_, PhaseEvent::Start) | (_, PhaseEvent::Resume) => Err(PracticeError::AlreadyActive),
        (Active, PhaseEvent::Stop) => Ok(Classifying),
        (_, PhaseEvent::Stop) => Err(PracticeError::NotActive),
        (Classifying, PhaseEvent::Finalize) => Ok(Idle),
        (Active, PhaseEvent::Finalize) => Err(PracticeError::NotClassifying),
        (Idle, PhaseEvent::Finalize) => Err(PracticeError::NoActiveSession),
    }
}

/// The in-memory half of a session: phase, `ActiveSession` and ledger.
#[derive(Debug, Clone)]
pub struct SessionMachine {
    phase: SessionPhase,
    session: Option<ActiveSession>,
    ledger: Option<ClassificationLedger>,
}

impl Default for SessionMachine {
    fn default() -> Self {
        SessionMachine {
            phase: SessionPhase::Idle,
            session: None,
            ledger: None,
        }
    }
}

impl SessionMachine {
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn session(&self) -> Option<&ActiveSession> {
        self.session.as_ref()
    }

    pub fn ledger(&self) -> Option<&ClassificationLedger> {
        self.ledger.as_ref()
    }

    /// The ledger, available only while classifying.
    pub fn ledger_mut(&mut self) -> Result<&mut ClassificationLedger> {
        match self.phase {
            SessionPhase::Idle => Err(PracticeError::NoActiveSession),
            SessionPhase::Active => Err(PracticeError::NotClassifying),
            SessionPhase::Classifying => self.ledger.as_mut().ok_or(PracticeError::NotClassifying),
        }
    }

    pub fn start(&mut self, id: String, now: DateTime<Utc>) -> Result<&ActiveSession> {
        self.phase = next_phase(self.phase, PhaseEvent::Start)?;
        Ok(self.session.insert(ActiveSession::new(id, now)))
    }

    /// Restores a recovered session to Active, keeping its original start.
    pub fn resume(&mut self, mut session: ActiveSession) -> Result<&ActiveSession> {
        self.phase = next_phase(self.phase, PhaseEvent::Resume)?;
        session.ended_at = None;
        session.duration = None;
        Ok(self.session.insert(session))
    }

    /// Stamps the end time and duration and opens an empty ledger.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Result<&ActiveSession> {
        let next = next_phase(self.phase, PhaseEvent::Stop)?;
        let session = self.session.as_mut().ok_or(PracticeError::NotActive)?;
        session.ended_at = Some(now);
        session.duration = Some(whole_seconds_between(session.started_at, now));
        self.ledger = Some(ClassificationLedger::new());
        self.phase = next;
        Ok(session)
    }

    /// Borrows what finalize needs without leaving Classifying, so a failed
    /// write can be retried.
    pub fn finalize_inputs(&self) -> Result<(&ActiveSession, &ClassificationLedger)> {
        next_phase(self.phase, PhaseEvent::Finalize)?;
        match (&self.session, &self.ledger) {
            (Some(session), Some(ledger)) => Ok((session, ledger)),
            _ => Err(PracticeError::NoActiveSession),
        }
    }

    /// Destroys the session and ledger and returns to Idle.
    pub fn finish(&mut self) -> Option<ActiveSession> {
        self.phase = SessionPhase::Idle;
        self.ledger = None;
        self.session.take()
    }
}
