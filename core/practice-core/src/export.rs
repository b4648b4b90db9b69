//! Export/import envelope for moving practice data between installs.
//!
//! ```json
//! {
//!   "appName": "violin-practice-log",
//!   "version": 1,
//!   "exportedAt": "2024-05-01T18:00:00Z",
//!   "data": { "pool": [...], "sessions": [...], "archive": [...] }
//! }
//! ```
//!
//! Import validates the whole envelope before anything is mutated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PracticeError, Result};
use crate::types::{ArchiveEntry, PoolItem, PracticeData, SessionRecord, DATA_VERSION};

/// Tag identifying files produced by this application.
pub const EXPORT_APP_NAME: &str = "violin-practice-log";
pub const EXPORT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportData {
    #[serde(default)]
    pub pool: Vec<PoolItem>,
    #[serde(default)]
    pub sessions: Vec<SessionRecord>,
    #[serde(default)]
    pub archive: Vec<ArchiveEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEnvelope {
    pub app_name: String,
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub data: ExportData,
}

/// Loose shape used for validation, so a wrong tag is reported as such
/// rather than as whatever field happens to fail first.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEnvelope {
    #[serde(default)]
    app_name: Option<String>,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

impl ExportEnvelope {
    pub fn new(data: &PracticeData, exported_at: DateTime<Utc>) -> Self {
        ExportEnvelope {
            app_name: EXPORT_APP_NAME.to_string(),
            version: EXPORT_VERSION,
            exported_at,
            data: ExportData {
                pool: data.pool.clone(),
                sessions: data.sessions.clone(),
                archive: data.archive.clone(),
            },
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| PracticeError::Json {
            context: "serializing export".to_string(),
            source: e,
        })
    }
}

/// Suggested file name for an export taken at `at`.
pub fn export_file_name(at: DateTime<Utc>) -> String {
    format!("practice-log_{}.json", at.format("%Y-%m-%d"))
}

/// Parses and validates an export, returning the aggregate it carries.
pub fn parse_import(json: &str) -> Result<PracticeData> {
    let invalid = |reason: String| PracticeError::InvalidImportEnvelope { reason };

    let raw: RawEnvelope =
        serde_json::from_str(json).map_err(|e| invalid(format!("unreadable file: {}", e)))?;

    match raw.app_name.as_deref() {
        Some(EXPORT_APP_NAME) => {}
        Some(other) => return Err(invalid(format!("unexpected app name {:?}", other))),
        None => return Err(invalid("missing app name".to_string())),
    }

    let data = match raw.data {
        Some(value) if !value.is_null() => value,
        _ => return Err(invalid("missing data".to_string())),
    };

    let data: ExportData =
        serde_json::from_value(data).map_err(|e| invalid(format!("malformed data: {}", e)))?;

    Ok(PracticeData {
        version: DATA_VERSION,
        pool: data.pool,
        sessions: data.sessions,
        archive: data.archive,
    })
}
