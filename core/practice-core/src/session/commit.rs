//! The persistence transition: applies a finished classification pass to the
//! durable aggregate.
//!
//! Order matters:
//!
//! 1. Snapshot the ledger and session timestamps into a `SessionRecord`
//! 2. Prepend it to the history (most recent first)
//! 3. Archive every completed id still in the pool and remove it from the pool
//! 4. Increment `worked_count` by one for every worked-on id still in the pool
//!
//! Ids missing from the pool (deleted mid-session) are skipped. The caller
//! writes the result in one save and only then clears the shadow slot.

use chrono::{DateTime, Utc};

use crate::ledger::ClassificationLedger;
use crate::types::{whole_seconds_between, ActiveSession, ArchiveEntry, PracticeData, SessionRecord};

/// What a commit changed, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommitSummary {
    pub archived: usize,
    pub worked: usize,
    pub skipped: usize,
}

pub fn apply_session(
    data: &mut PracticeData,
    session: &ActiveSession,
    ledger: &ClassificationLedger,
    now: DateTime<Utc>,
) -> (SessionRecord, CommitSummary) {
    let ended_at = session.ended_at.unwrap_or(now);
    let record = SessionRecord {
        id: session.id.clone(),
        started_at: session.started_at,
        ended_at,
        duration: session
            .duration
            .unwrap_or_else(|| whole_seconds_between(session.started_at, ended_at)),
        completed: ledger.completed().to_vec(),
        worked_on: ledger.worked_on().to_vec(),
        note: String::new(),
    };

    data.sessions.insert(0, record.clone());

    let mut summary = CommitSummary::default();

    for id in ledger.completed() {
        match data.pool.iter().position(|p| &p.id == id) {
            Some(index) => {
                let item = data.pool.remove(index);
                data.archive.push(ArchiveEntry {
                    id: item.id,
                    text: item.text,
                    completed_at: now,
                });
                summary.archived += 1;
            }
            None => summary.skipped += 1,
        }
    }

    for id in ledger.worked_on() {
        match data.pool.iter_mut().find(|p| &p.id == id) {
            Some(item) => {
                item.worked_count += 1;
                summary.worked += 1;
            }
            None => summary.skipped += 1,
        }
    }

    (record, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PoolItem;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap()
    }

    fn item(id: &str, worked_count: u32) -> PoolItem {
        PoolItem {
            id: id.to_string(),
            text: format!("Item {}", id),
            created_at: t0(),
            worked_count,
        }
    }

    fn stopped_session(secs: i64) -> ActiveSession {
        let mut session = ActiveSession::new("s_1".to_string(), t0());
        session.ended_at = Some(t0() + Duration::seconds(secs));
        session.duration = Some(secs as u64);
        session
    }

    #[test]
    fn test_completed_and_worked_on_scenario() {
        let mut data = PracticeData {
            pool: vec![item("a", 0), item("b", 2)],
            ..PracticeData::default()
        };
        let mut ledger = ClassificationLedger::new();
        ledger.mark_completed("a");
        ledger.mark_worked_on("b");
        let now = t0() + Duration::seconds(140);

        let (record, summary) = apply_session(&mut data, &stopped_session(125), &ledger, now);

        assert_eq!(record.duration, 125);
        assert_eq!(record.completed, vec!["a".to_string()]);
        assert_eq!(record.worked_on, vec!["b".to_string()]);
        assert_eq!(data.sessions, vec![record]);
        assert_eq!(data.archive.len(), 1);
        assert_eq!(data.archive[0].id, "a");
        assert_eq!(data.archive[0].text, "Item a");
        assert_eq!(data.archive[0].completed_at, now);
        assert_eq!(data.pool.len(), 1);
        assert_eq!(data.pool[0].id, "b");
        assert_eq!(data.pool[0].worked_count, 3);
        assert_eq!(
            summary,
            CommitSummary {
                archived: 1,
                worked: 1,
                skipped: 0
            }
        );
    }

    #[test]
    fn test_new_session_is_prepended() {
        let mut data = PracticeData::default();
        let ledger = ClassificationLedger::new();
        let mut first = stopped_session(10);
        first.id = "s_old".to_string();
        apply_session(&mut data, &first, &ledger, t0());

        apply_session(&mut data, &stopped_session(20), &ledger, t0());

        let ids: Vec<_> = data.sessions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s_1", "s_old"]);
    }

    #[test]
    fn test_archive_appends_newest_last() {
        let mut data = PracticeData {
            pool: vec![item("a", 0), item("b", 0)],
            ..PracticeData::default()
        };
        let mut first = ClassificationLedger::new();
        first.mark_completed("a");
        apply_session(&mut data, &stopped_session(1), &first, t0());

        let mut second = ClassificationLedger::new();
        second.mark_completed("b");
        apply_session(&mut data, &stopped_session(1), &second, t0());

        let ids: Vec<_> = data.archive.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_missing_ids_are_skipped_but_recorded() {
        let mut data = PracticeData {
            pool: vec![item("b", 0)],
            ..PracticeData::default()
        };
        let mut ledger = ClassificationLedger::new();
        ledger.mark_completed("gone");
        ledger.mark_worked_on("also-gone");

        let (record, summary) = apply_session(&mut data, &stopped_session(5), &ledger, t0());

        assert!(data.archive.is_empty());
        assert_eq!(data.pool[0].worked_count, 0);
        assert_eq!(record.completed, vec!["gone".to_string()]);
        assert_eq!(summary.skipped, 2);
    }

    #[test]
    fn test_missing_end_falls_back_to_now() {
        let mut data = PracticeData::default();
        let session = ActiveSession::new("s_1".to_string(), t0());
        let now = t0() + Duration::seconds(42);

        let (record, _) = apply_session(&mut data, &session, &ClassificationLedger::new(), now);

        assert_eq!(record.ended_at, now);
        assert_eq!(record.duration, 42);
    }
}
