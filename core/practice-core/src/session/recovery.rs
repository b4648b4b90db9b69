//! Crash recovery for a session left in the shadow slot.
//!
//! Runs once per process start. A populated shadow slot means the previous
//! process never reached finalize; the caller must pick exactly one of
//! resume or discard before a new session may start.

use chrono::{DateTime, Utc};

use crate::error::{PracticeError, Result};
use crate::types::{whole_seconds_between, ActiveSession};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryOffer {
    pub session: ActiveSession,
    /// Seconds from the session's original start to detection.
    pub elapsed_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryChoice {
    Resume,
    Discard,
}

#[derive(Debug, Clone, Default)]
pub struct RecoveryManager {
    pending: Option<RecoveryOffer>,
}

impl RecoveryManager {
    pub fn detect(shadow: Option<ActiveSession>, now: DateTime<Utc>) -> Self {
        RecoveryManager {
            pending: shadow.map(|session| RecoveryOffer {
                elapsed_secs: whole_seconds_between(session.started_at, now),
                session,
            }),
        }
    }

    pub fn offer(&self) -> Option<&RecoveryOffer> {
        self.pending.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Consumes the pending offer. The caller applies the choice.
    pub fn resolve(&mut self, choice: RecoveryChoice) -> Result<ActiveSession> {
        let offer = self.pending.take().ok_or(PracticeError::NoRecoveryPending)?;
        tracing::info!(
            session_id = %offer.session.id,
            choice = ?choice,
            elapsed_secs = offer.elapsed_secs,
            "Recovery resolved"
        );
        Ok(offer.session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_shadow_offers_nothing() {
        let manager = RecoveryManager::detect(None, t0());
        assert!(!manager.is_pending());
        assert!(manager.offer().is_none());
    }

    #[test]
    fn test_dangling_session_reports_original_start() {
        let session = ActiveSession::new("s_1".to_string(), t0());
        let manager = RecoveryManager::detect(Some(session), t0() + Duration::minutes(20));

        let offer = manager.offer().unwrap();
        assert_eq!(offer.session.started_at, t0());
        assert_eq!(offer.elapsed_secs, 1200);
    }

    #[test]
    fn test_resolve_is_one_shot() {
        let session = ActiveSession::new("s_1".to_string(), t0());
        let mut manager = RecoveryManager::detect(Some(session.clone()), t0());

        assert_eq!(manager.resolve(RecoveryChoice::Discard).unwrap(), session);
        assert!(matches!(
            manager.resolve(RecoveryChoice::Resume),
            Err(PracticeError::NoRecoveryPending)
        ));
    }
}
