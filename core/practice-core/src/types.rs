//! Core data types shared by the engine, the stores and every client.
//!
//! Field names serialize as camelCase so data files and exports written by
//! earlier versions of the practice log load unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Current schema version of the main data file.
pub const DATA_VERSION: u32 = 1;

/// Label shown for an id that no longer resolves to a pool or archive item.
pub const DELETED_ITEM_LABEL: &str = "(deleted item)";

// ═══════════════════════════════════════════════════════════════════════════════
// Durable Aggregate
// ═══════════════════════════════════════════════════════════════════════════════

/// A not-yet-completed practice item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolItem {
    pub id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    /// Older files omit this field or write `null`; both mean zero.
    #[serde(default, deserialize_with = "null_as_zero")]
    pub worked_count: u32,
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or(0))
}

/// An item that graduated out of the pool. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveEntry {
    /// Same id as the originating [`PoolItem`].
    pub id: String,
    pub text: String,
    pub completed_at: DateTime<Utc>,
}

/// One finished practice session.
///
/// `completed` and `worked_on` are snapshots of the classification ledger at
/// finalize time; an id appears in at most one of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// Whole seconds.
    #[serde(default)]
    pub duration: u64,
    #[serde(default)]
    pub completed: Vec<String>,
    #[serde(default)]
    pub worked_on: Vec<String>,
    #[serde(default)]
    pub note: String,
}

/// The `{ pool, sessions, archive }` aggregate persisted in the main slot.
///
/// `sessions` is most-recent-first; `archive` is append-only, newest last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeData {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub pool: Vec<PoolItem>,
    #[serde(default)]
    pub sessions: Vec<SessionRecord>,
    #[serde(default)]
    pub archive: Vec<ArchiveEntry>,
}

fn default_version() -> u32 {
    DATA_VERSION
}

impl Default for PracticeData {
    fn default() -> Self {
        PracticeData {
            version: DATA_VERSION,
            pool: Vec::new(),
            sessions: Vec::new(),
            archive: Vec::new(),
        }
    }
}

impl PracticeData {
    pub fn pool_item(&self, id: &str) -> Option<&PoolItem> {
        self.pool.iter().find(|p| p.id == id)
    }

    pub fn contains_pool_item(&self, id: &str) -> bool {
        self.pool_item(id).is_some()
    }

    pub fn session(&self, id: &str) -> Option<&SessionRecord> {
        self.sessions.iter().find(|s| s.id == id)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// In-Flight Session
// ═══════════════════════════════════════════════════════════════════════════════

/// The session currently being practiced.
///
/// Held in memory by the engine and mirrored into the shadow slot so that an
/// unclean shutdown can be detected on the next start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSession {
    pub id: String,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
}

impl ActiveSession {
    pub fn new(id: String, started_at: DateTime<Utc>) -> Self {
        ActiveSession {
            id,
            started_at,
            ended_at: None,
            duration: None,
        }
    }
}

/// Whole seconds between two instants: elapsed milliseconds / 1000, rounded.
/// Negative spans (clock moved backwards) clamp to zero.
pub fn whole_seconds_between(start: DateTime<Utc>, end: DateTime<Utc>) -> u64 {
    let millis = end.signed_duration_since(start).num_milliseconds();
    if millis <= 0 {
        return 0;
    }
    ((millis as f64) / 1000.0).round() as u64
}

// ═══════════════════════════════════════════════════════════════════════════════
// Classification
// ═══════════════════════════════════════════════════════════════════════════════

/// Where a pool item stands in the current classification pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemOutcome {
    Completed,
    WorkedOn,
    Unclassified,
}

/// A pool item as presented during classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationItem {
    pub id: String,
    pub text: String,
    pub worked_on: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap()
    }

    #[test]
    fn test_whole_seconds_rounds_half_up() {
        assert_eq!(
            whole_seconds_between(t0(), t0() + Duration::milliseconds(125_499)),
            125
        );
        assert_eq!(
            whole_seconds_between(t0(), t0() + Duration::milliseconds(125_500)),
            126
        );
    }

    #[test]
    fn test_whole_seconds_clamps_negative_span() {
        assert_eq!(whole_seconds_between(t0(), t0() - Duration::seconds(5)), 0);
    }

    #[test]
    fn test_pool_item_without_worked_count_defaults_to_zero() {
        let json = r#"{"id":"p_1","text":"Scales","createdAt":"2024-05-01T18:00:00.000Z"}"#;
        let item: PoolItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.worked_count, 0);
    }

    #[test]
    fn test_pool_item_with_null_worked_count_defaults_to_zero() {
        let json = r#"{"id":"p_1","text":"Scales","createdAt":"2024-05-01T18:00:00.000Z","workedCount":null}"#;
        let item: PoolItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.worked_count, 0);
    }

    #[test]
    fn test_practice_data_serializes_camel_case_fields() {
        let data = PracticeData {
            pool: vec![PoolItem {
                id: "p_1".to_string(),
                text: "Kreutzer No. 2".to_string(),
                created_at: t0(),
                worked_count: 3,
            }],
            ..PracticeData::default()
        };
        let json = serde_json::to_string(&data).unwrap();
        assert!(json.contains("\"workedCount\":3"));
        assert!(json.contains("\"createdAt\""));
    }

    #[test]
    fn test_active_session_omits_unset_end() {
        let session = ActiveSession::new("s_1".to_string(), t0());
        let json = serde_json::to_string(&session).unwrap();
        assert!(!json.contains("endedAt"));
        let back: ActiveSession = serde_json::from_str(&json).unwrap();
        assert_eq!(back, session);
    }
}
