//! Spiralkeep configuration
//!
//! All tunable parameters in one place. Loaded from TOML at startup,
//! falls back to defaults if no config file exists.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpiralkeepConfig {
    /// Storage keys and on-disk location.
    pub storage: StorageConfig,
    /// Cross-surface sync parameters.
    pub sync: SyncConfig,
    /// Poll defaults.
    pub polls: PollConfig,
    /// Event scheduling defaults.
    pub events: EventConfig,
    /// Consensus voting defaults.
    pub consensus: ConsensusConfig,
    /// Activity aggregation windows.
    pub activity: ActivityConfig,
    /// Status refresh timer.
    pub refresh: RefreshConfig,
    /// Log filter and format.
    pub logging: LoggingConfig,
    /// Seed sample inputs, a poll, an event and a proposal on construction.
    pub seed_demo_data: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Key holding the serialized consciousness record.
    pub consciousness_key: String,
    /// Key holding roadmap pillars.
    pub pillars_key: String,
    /// Key holding roadmap projects.
    pub projects_key: String,
    /// Directory for the file-backed store. None means in-memory only.
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Platform tag stamped into preferences and sync payloads.
    pub platform: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub default_duration_hours: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    pub default_duration_minutes: i64,
    pub default_type: String,
    pub default_location: String,
    /// How many upcoming events the status snapshot carries.
    pub upcoming_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusConfig {
    pub default_voting_period_days: i64,
    /// Support ratio (0.0 - 1.0] needed for approval.
    pub default_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityConfig {
    /// Width of the "recent" window used by activity counts.
    pub recent_window_hours: i64,
    /// Default page size for channel input queries.
    pub channel_input_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Status refresh period in milliseconds.
    pub interval_ms: u64,
    /// Close expired polls and proposals on every refresh tick.
    /// Off by default: deadlines are otherwise only checked when a vote arrives.
    pub sweep_expired: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// EnvFilter directive used when RUST_LOG is unset.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

// ============================================================
// Defaults
// ============================================================

impl Default for SpiralkeepConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            sync: SyncConfig::default(),
            polls: PollConfig::default(),
            events: EventConfig::default(),
            consensus: ConsensusConfig::default(),
            activity: ActivityConfig::default(),
            refresh: RefreshConfig::default(),
            logging: LoggingConfig::default(),
            seed_demo_data: true,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            consciousness_key: "consciousness_state".into(),
            pillars_key: "roadmap_pillars".into(),
            projects_key: "roadmap_projects".into(),
            data_dir: None,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { platform: "native".into() }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { default_duration_hours: 24 }
    }
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            default_duration_minutes: 60,
            default_type: "general".into(),
            default_location: "virtual".into(),
            upcoming_limit: 5,
        }
    }
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self { default_voting_period_days: 7, default_threshold: 0.67 }
    }
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self { recent_window_hours: 24, channel_input_limit: 50 }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self { interval_ms: 5_000, sweep_expired: false }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: "spiralkeep=info".into(), json: false }
    }
}

// ============================================================
// Loading
// ============================================================

impl SpiralkeepConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {} - using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                tracing::info!("No config at {} - using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Render the current config as TOML (for generating a default config file).
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }

    /// Write the config atomically next to its final location.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let rendered = toml::to_string_pretty(self)?;
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, rendered)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn refresh_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.refresh.interval_ms.max(1))
    }

    /// Default poll lifetime. Values chrono cannot represent fall back to the built-in default.
    pub fn poll_duration(&self) -> Duration {
        Duration::try_hours(self.polls.default_duration_hours)
            .unwrap_or_else(|| Duration::hours(PollConfig::default().default_duration_hours))
    }

    pub fn event_duration(&self) -> Duration {
        Duration::try_minutes(self.events.default_duration_minutes)
            .unwrap_or_else(|| Duration::minutes(EventConfig::default().default_duration_minutes))
    }

    pub fn voting_period(&self) -> Duration {
        Duration::try_days(self.consensus.default_voting_period_days).unwrap_or_else(|| {
            Duration::days(ConsensusConfig::default().default_voting_period_days)
        })
    }

    pub fn recent_window(&self) -> Duration {
        Duration::try_hours(self.activity.recent_window_hours)
            .unwrap_or_else(|| Duration::hours(ActivityConfig::default().recent_window_hours))
    }
}
