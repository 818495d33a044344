//! Consolidated read model

use serde::Serialize;
use spiralkeep_community::{CommunityActivity, CommunityEvent, ConsensusItem, Poll};
use spiralkeep_consciousness::ConsciousnessState;

/// Everything a status screen shows, recomputed on every request.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityStatus {
    pub consciousness: ConsciousnessState,
    pub activity: CommunityActivity,
    pub upcoming_events: Vec<CommunityEvent>,
    pub active_polls: Vec<Poll>,
    /// Proposals still open for ballots.
    pub consensus_items: Vec<ConsensusItem>,
}

/// What one expiry sweep closed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub closed_polls: usize,
    pub expired_items: usize,
}
