//! Preference loading and saving.
//!
//! Preferences live in `config.json` under the storage root. A missing or
//! malformed file yields defaults rather than an error, and out-of-range
//! values fall back to their defaults one field at a time.

use crate::error::{PracticeError, Result};
use crate::store::atomic_write;
use crate::storage::StorageConfig;
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Longest undo window accepted from `config.json`.
pub const MAX_UNDO_WINDOW_SECS: u64 = 3600;

/// What a release without a horizontal swipe does to an unclassified item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TapPolicy {
    /// A tap is a no-op.
    #[default]
    Ignore,
    /// A tap flips the item's worked-on mark.
    ToggleWorkedOn,
}

/// Tunables for gesture classification and the undo window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PracticeConfig {
    /// Horizontal distance a swipe must cover to classify an item.
    pub swipe_threshold: f64,
    /// Movement tolerated before the drag axis locks.
    pub jitter_radius: f64,
    /// Drags starting left of this x are left to the platform back gesture.
    pub edge_margin: f64,
    pub undo_window_secs: u64,
    pub tap_policy: TapPolicy,
}

impl Default for PracticeConfig {
    fn default() -> Self {
        PracticeConfig {
            swipe_threshold: 80.0,
            jitter_radius: 8.0,
            edge_margin: 30.0,
            undo_window_secs: 4,
            tap_policy: TapPolicy::Ignore,
        }
    }
}

impl PracticeConfig {
    /// Replaces out-of-range fields with their defaults, logging each one.
    pub fn sanitized(self) -> Self {
        let defaults = PracticeConfig::default();
        PracticeConfig {
            swipe_threshold: checked_distance(
                "swipe_threshold",
                self.swipe_threshold,
                defaults.swipe_threshold,
                |v| v > 0.0,
            ),
            jitter_radius: checked_distance(
                "jitter_radius",
                self.jitter_radius,
                defaults.jitter_radius,
                |v| v >= 0.0,
            ),
            edge_margin: checked_distance(
                "edge_margin",
                self.edge_margin,
                defaults.edge_margin,
                |v| v >= 0.0,
            ),
            undo_window_secs: if self.undo_window_secs > MAX_UNDO_WINDOW_SECS {
                tracing::warn!(
                    value = self.undo_window_secs,
                    max = MAX_UNDO_WINDOW_SECS,
                    "undo_window_secs out of range, using default"
                );
                defaults.undo_window_secs
            } else {
                self.undo_window_secs
            },
            tap_policy: self.tap_policy,
        }
    }

    /// Length of the undo window, capped at [`MAX_UNDO_WINDOW_SECS`].
    pub fn undo_window(&self) -> Duration {
        let secs = self.undo_window_secs.min(MAX_UNDO_WINDOW_SECS);
        Duration::seconds(i64::try_from(secs).unwrap_or(0))
    }
}

fn checked_distance(field: &str, value: f64, default: f64, valid: fn(f64) -> bool) -> f64 {
    if value.is_finite() && valid(value) {
        value
    } else {
        tracing::warn!(field, value, "Config value out of range, using default");
        default
    }
}

/// Loads preferences, returning defaults if the file is missing or malformed.
pub fn load_config_with_storage(storage: &StorageConfig) -> PracticeConfig {
    let path = storage.config_file();
    let Ok(content) = fs_err::read_to_string(&path) else {
        return PracticeConfig::default();
    };
    match serde_json::from_str::<PracticeConfig>(&content) {
        Ok(config) => config.sanitized(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Malformed config, using defaults");
            PracticeConfig::default()
        }
    }
}

/// Saves preferences to disk.
pub fn save_config_with_storage(storage: &StorageConfig, config: &PracticeConfig) -> Result<()> {
    let content = serde_json::to_string_pretty(config).map_err(|e| PracticeError::Json {
        context: "serializing config".to_string(),
        source: e,
    })?;
    storage.ensure_dirs().map_err(|e| PracticeError::Io {
        context: format!("creating {}", storage.root().display()),
        source: e,
    })?;
    atomic_write(&storage.config_file(), &content)
}
