//! ConsciousnessState and the actions that mutate it
//!
//! Every mutation is one `ConsciousnessAction` applied by `ConsciousnessState::apply`.
//! Field updates are partial: `None` leaves a field untouched.

use chrono::serde::{ts_milliseconds, ts_milliseconds_option};
use serde::{Deserialize, Serialize};
use spiralkeep_core::Timestamp;

/// Narrative progression tag. Informational; no transition order is enforced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Seed,
    Threshold,
    Bloom,
    Memory,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Clockwise,
    Counterclockwise,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipationLevel {
    #[default]
    Observer,
    Active,
    Contributor,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpiralState {
    /// Never negative.
    pub depth: f64,
    pub direction: Direction,
    /// Conventionally within [0, 1]; not enforced.
    pub resonance: f64,
}

impl Default for SpiralState {
    fn default() -> Self {
        Self {
            depth: 0.0,
            direction: Direction::Clockwise,
            resonance: 0.5,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityState {
    pub participation_level: ParticipationLevel,
    pub contribution_count: u32,
    #[serde(default, with = "ts_milliseconds_option")]
    pub last_contribution: Option<Timestamp>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub notifications: bool,
    pub auto_sync: bool,
    pub platform: String,
}

/// The single per-user/device record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsciousnessState {
    pub user_id: String,
    pub current_phase: Phase,
    #[serde(with = "ts_milliseconds")]
    pub last_active: Timestamp,
    pub spiral: SpiralState,
    pub community: CommunityState,
    pub preferences: Preferences,
}

impl ConsciousnessState {
    /// Fresh record for a first-time user.
    pub fn new(user_id: impl Into<String>, platform: impl Into<String>, now: Timestamp) -> Self {
        Self {
            user_id: user_id.into(),
            current_phase: Phase::Seed,
            last_active: now,
            spiral: SpiralState::default(),
            community: CommunityState::default(),
            preferences: Preferences {
                notifications: true,
                auto_sync: false,
                platform: platform.into(),
            },
        }
    }

    /// Apply one action. Always stamps `last_active`.
    pub fn apply(&mut self, action: ConsciousnessAction, now: Timestamp) {
        match action {
            ConsciousnessAction::UpdateSpiral(update) => self.spiral.merge(update),
            ConsciousnessAction::UpdateCommunity(update) => self.community.merge(update),
            ConsciousnessAction::SetPhase(phase) => self.current_phase = phase,
            ConsciousnessAction::UpdatePreferences(update) => self.preferences.merge(update),
            ConsciousnessAction::Import(patch) => {
                if let Some(user_id) = patch.user_id {
                    self.user_id = user_id;
                }
                if let Some(phase) = patch.current_phase {
                    self.current_phase = phase;
                }
                if let Some(spiral) = patch.spiral {
                    self.spiral.merge(spiral);
                }
                if let Some(community) = patch.community {
                    self.community.merge(community);
                }
                if let Some(preferences) = patch.preferences {
                    self.preferences.merge(preferences);
                }
            }
        }
        self.last_active = now;
    }
}

impl SpiralState {
    fn merge(&mut self, update: SpiralUpdate) {
        if let Some(depth) = update.depth {
            self.depth = depth.max(0.0);
        }
        if let Some(direction) = update.direction {
            self.direction = direction;
        }
        if let Some(resonance) = update.resonance {
            self.resonance = resonance;
        }
    }
}

impl CommunityState {
    fn merge(&mut self, update: CommunityUpdate) {
        if let Some(level) = update.participation_level {
            self.participation_level = level;
        }
        if let Some(count) = update.contribution_count {
            self.contribution_count = count;
        }
        if let Some(at) = update.last_contribution {
            self.last_contribution = Some(at);
        }
    }
}

impl Preferences {
    fn merge(&mut self, update: PreferencesUpdate) {
        if let Some(notifications) = update.notifications {
            self.notifications = notifications;
        }
        if let Some(auto_sync) = update.auto_sync {
            self.auto_sync = auto_sync;
        }
        if let Some(platform) = update.platform {
            self.platform = platform;
        }
    }
}

// ============================================================
// Partial updates
// ============================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpiralUpdate {
    pub depth: Option<f64>,
    pub direction: Option<Direction>,
    pub resonance: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommunityUpdate {
    pub participation_level: Option<ParticipationLevel>,
    pub contribution_count: Option<u32>,
    #[serde(with = "ts_milliseconds_option")]
    pub last_contribution: Option<Timestamp>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PreferencesUpdate {
    pub notifications: Option<bool>,
    pub auto_sync: Option<bool>,
    pub platform: Option<String>,
}

/// Field-optional view of an imported record. Unknown keys
/// (`exportedAt`, `version`, ...) are ignored; ill-typed keys fail the parse.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConsciousnessPatch {
    pub user_id: Option<String>,
    pub current_phase: Option<Phase>,
    pub spiral: Option<SpiralUpdate>,
    pub community: Option<CommunityUpdate>,
    pub preferences: Option<PreferencesUpdate>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConsciousnessAction {
    UpdateSpiral(SpiralUpdate),
    UpdateCommunity(CommunityUpdate),
    SetPhase(Phase),
    UpdatePreferences(PreferencesUpdate),
    Import(ConsciousnessPatch),
}

/// Snapshot tagged for transport to another client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedConsciousness {
    #[serde(flatten)]
    pub state: ConsciousnessState,
    #[serde(with = "ts_milliseconds")]
    pub exported_at: Timestamp,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn t0() -> Timestamp {
        Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
    }

    #[test]
    fn new_state_defaults() {
        let state = ConsciousnessState::new("user_1", "native", t0());
        assert_eq!(state.current_phase, Phase::Seed);
        assert_eq!(state.community.participation_level, ParticipationLevel::Observer);
        assert_eq!(state.community.contribution_count, 0);
        assert!(state.community.last_contribution.is_none());
        assert_eq!(state.preferences.platform, "native");
        assert!(state.preferences.notifications);
    }

    #[test]
    fn spiral_update_is_partial() {
        let mut state = ConsciousnessState::new("u", "native", t0());
        state.apply(
            ConsciousnessAction::UpdateSpiral(SpiralUpdate {
                depth: Some(3.5),
                ..Default::default()
            }),
            t0() + Duration::seconds(1),
        );
        assert_eq!(state.spiral.depth, 3.5);
        assert_eq!(state.spiral.direction, Direction::Clockwise);
        assert_eq!(state.spiral.resonance, 0.5);
        assert_eq!(state.last_active, t0() + Duration::seconds(1));
    }

    #[test]
    fn negative_depth_clamps_to_zero() {
        let mut state = ConsciousnessState::new("u", "native", t0());
        state.apply(
            ConsciousnessAction::UpdateSpiral(SpiralUpdate {
                depth: Some(-2.0),
                ..Default::default()
            }),
            t0(),
        );
        assert_eq!(state.spiral.depth, 0.0);
    }

    #[test]
    fn set_phase_stamps_last_active() {
        let mut state = ConsciousnessState::new("u", "native", t0());
        let later = t0() + Duration::minutes(5);
        state.apply(ConsciousnessAction::SetPhase(Phase::Bloom), later);
        assert_eq!(state.current_phase, Phase::Bloom);
        assert_eq!(state.last_active, later);
    }

    #[test]
    fn wire_format_is_camel_case_with_millis() {
        let state = ConsciousnessState::new("user_1", "native", t0());
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["userId"], "user_1");
        assert_eq!(json["currentPhase"], "seed");
        assert_eq!(json["lastActive"], 1_700_000_000_000i64);
        assert_eq!(json["community"]["participationLevel"], "observer");
        assert_eq!(json["preferences"]["autoSync"], false);
    }

    #[test]
    fn patch_ignores_export_metadata() {
        let patch: ConsciousnessPatch = serde_json::from_value(serde_json::json!({
            "currentPhase": "memory",
            "exportedAt": 1,
            "version": "1.0"
        }))
        .unwrap();
        assert_eq!(patch.current_phase, Some(Phase::Memory));
        assert!(patch.spiral.is_none());
    }

    #[test]
    fn patch_rejects_ill_typed_fields() {
        let parsed: Result<ConsciousnessPatch, _> = serde_json::from_value(serde_json::json!({
            "spiral": { "depth": "very deep" }
        }));
        assert!(parsed.is_err());
    }
}
