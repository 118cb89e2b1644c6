//! Persisted chart settings (lives in the OS config directory).

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::chart::scheduler::IdleMode;
use crate::chart::WindowPolicy;
use crate::error::{ConfigError, StoreError};

/// Upper bound for the length of any month, used to size the initial window.
const MAX_DAYS_PER_MONTH: usize = 31;

/// Largest accepted value for any day count: ten years of columns.
pub const MAX_DAYS_LIMIT: usize = 3660;
/// Largest accepted `months_past` / `months_future`.
pub const MAX_MONTHS_LIMIT: u32 = 60;
pub const MAX_COLUMN_WIDTH: f32 = 400.0;
pub const MAX_PRUNE_QUIET_MS: u64 = 60_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    /// Width of one day column in pixels.
    pub column_width: f32,
    pub months_past: u32,
    pub months_future: u32,
    pub extend_threshold_days: usize,
    pub extend_chunk_days: usize,
    pub prune_threshold_days: usize,
    pub prune_chunk_days: usize,
    pub max_window_days: usize,
    pub prune_quiet_ms: u64,
    /// `native` waits for an idle frame before maintaining the window;
    /// `next_frame` runs maintenance on the frame after it was scheduled.
    pub idle_mode: IdleMode,
    /// Schedule file reopened on start.
    pub last_file: Option<PathBuf>,
}

impl Default for ChartSettings {
    fn default() -> Self {
        let policy = WindowPolicy::default();
        Self {
            column_width: 36.0,
            months_past: 6,
            months_future: 12,
            extend_threshold_days: policy.extend_threshold_days,
            extend_chunk_days: policy.extend_chunk_days,
            prune_threshold_days: policy.prune_threshold_days,
            prune_chunk_days: policy.prune_chunk_days,
            max_window_days: policy.max_window_days,
            prune_quiet_ms: policy.prune_quiet.as_millis() as u64,
            idle_mode: IdleMode::Native,
            last_file: None,
        }
    }
}

impl ChartSettings {
    pub fn policy(&self) -> WindowPolicy {
        WindowPolicy {
            extend_threshold_days: self.extend_threshold_days,
            extend_chunk_days: self.extend_chunk_days,
            prune_threshold_days: self.prune_threshold_days,
            prune_chunk_days: self.prune_chunk_days,
            max_window_days: self.max_window_days,
            prune_quiet: Duration::from_millis(self.prune_quiet_ms),
        }
    }

    /// Months covered by one "move span" step.
    pub fn span_months(&self) -> u32 {
        self.months_past.saturating_add(self.months_future)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.column_width > 0.0 && self.column_width <= MAX_COLUMN_WIDTH) {
            return Err(ConfigError::ColumnWidth(self.column_width));
        }
        let limits = [
            ("months_past", self.months_past as u64, MAX_MONTHS_LIMIT as u64),
            ("months_future", self.months_future as u64, MAX_MONTHS_LIMIT as u64),
            ("extend_threshold_days", self.extend_threshold_days as u64, MAX_DAYS_LIMIT as u64),
            ("extend_chunk_days", self.extend_chunk_days as u64, MAX_DAYS_LIMIT as u64),
            ("prune_threshold_days", self.prune_threshold_days as u64, MAX_DAYS_LIMIT as u64),
            ("prune_chunk_days", self.prune_chunk_days as u64, MAX_DAYS_LIMIT as u64),
            ("max_window_days", self.max_window_days as u64, MAX_DAYS_LIMIT as u64),
            ("prune_quiet_ms", self.prune_quiet_ms, MAX_PRUNE_QUIET_MS),
        ];
        for (field, value, limit) in limits {
            if value > limit {
                return Err(ConfigError::OutOfRange { field, value, limit });
            }
        }
        self.policy().validate()?;
        let initial = self.span_months() as usize * MAX_DAYS_PER_MONTH + 1;
        if self.max_window_days <= initial {
            return Err(ConfigError::WindowCapTooSmall {
                max: self.max_window_days,
                initial,
            });
        }
        Ok(())
    }
}

/// Reads and writes `settings.json`.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the OS config directory, or the working directory when the
    /// platform has none.
    pub fn open_default() -> Self {
        let path = match directories::ProjectDirs::from("", "", "ScheduleGantt") {
            Some(dirs) => dirs.config_dir().join("settings.json"),
            None => PathBuf::from(".").join("settings.json"),
        };
        Self::new(path)
    }

    /// Load settings, falling back to defaults for a missing, unreadable or
    /// invalid file.
    pub fn load(&self) -> ChartSettings {
        if !self.path.exists() {
            info!(path = %self.path.display(), "no settings file, using defaults");
            return ChartSettings::default();
        }
        let settings = match self.read() {
            Ok(settings) => settings,
            Err(e) => {
                warn!(error = %e, "could not load settings, using defaults");
                return ChartSettings::default();
            }
        };
        match settings.validate() {
            Ok(()) => settings,
            Err(e) => {
                warn!(error = %e, "invalid chart settings, using defaults");
                ChartSettings {
                    last_file: settings.last_file,
                    ..ChartSettings::default()
                }
            }
        }
    }

    pub fn save(&self, settings: &ChartSettings) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(settings)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&self.path, json).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }

    fn read(&self) -> Result<ChartSettings, StoreError> {
        let json = std::fs::read_to_string(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(ChartSettings::default().validate(), Ok(()));
        assert_eq!(ChartSettings::default().span_months(), 18);
    }

    #[test]
    fn validation_catches_bad_values() {
        let zero_width = ChartSettings {
            column_width: 0.0,
            ..Default::default()
        };
        assert_eq!(zero_width.validate(), Err(ConfigError::ColumnWidth(0.0)));

        let tiny_cap = ChartSettings {
            max_window_days: 400,
            ..Default::default()
        };
        assert!(matches!(
            tiny_cap.validate(),
            Err(ConfigError::WindowCapTooSmall { max: 400, .. })
        ));
    }

    #[test]
    fn oversized_values_are_rejected() {
        let huge_chunk = ChartSettings {
            extend_chunk_days: 200_000_000,
            ..Default::default()
        };
        assert_eq!(
            huge_chunk.validate(),
            Err(ConfigError::OutOfRange {
                field: "extend_chunk_days",
                value: 200_000_000,
                limit: MAX_DAYS_LIMIT as u64,
            })
        );

        let huge_months = ChartSettings {
            months_past: u32::MAX,
            months_future: u32::MAX,
            ..Default::default()
        };
        assert_eq!(huge_months.span_months(), u32::MAX);
        assert!(matches!(
            huge_months.validate(),
            Err(ConfigError::OutOfRange { field: "months_past", .. })
        ));

        let wide = ChartSettings {
            column_width: f32::INFINITY,
            ..Default::default()
        };
        assert_eq!(wide.validate(), Err(ConfigError::ColumnWidth(f32::INFINITY)));
    }

    #[test]
    fn oversized_settings_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "extend_chunk_days": 200000000 }"#).unwrap();
        let loaded = SettingsStore::new(&path).load();
        assert_eq!(loaded, ChartSettings::default());
        assert_eq!(loaded.validate(), Ok(()));
    }

    #[test]
    fn idle_mode_reads_snake_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "idle_mode": "next_frame" }"#).unwrap();
        assert_eq!(SettingsStore::new(&path).load().idle_mode, IdleMode::NextFrame);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("nested").join("settings.json"));
        let settings = ChartSettings {
            column_width: 40.0,
            last_file: Some(PathBuf::from("plan.json")),
            ..Default::default()
        };
        store.save(&settings).unwrap();
        assert_eq!(store.load(), settings);
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "months_past": 3 }"#).unwrap();
        let loaded = SettingsStore::new(&path).load();
        assert_eq!(loaded.months_past, 3);
        assert_eq!(loaded.column_width, 36.0);
    }

    #[test]
    fn broken_or_invalid_files_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(SettingsStore::new(&path).load(), ChartSettings::default());

        std::fs::write(
            &path,
            r#"{ "extend_chunk_days": 10, "last_file": "keep.json" }"#,
        )
        .unwrap();
        let loaded = SettingsStore::new(&path).load();
        assert_eq!(loaded.extend_chunk_days, 90);
        assert_eq!(loaded.last_file, Some(PathBuf::from("keep.json")));
    }
}
