//! Spiralkeep — community coordination core
//!
//! One `CoordinationSystem` per session ties together the per-user
//! consciousness record, the channel ledger with its polls, scheduled
//! events, consensus proposals and the roadmap. Only the consciousness
//! record persists and syncs between clients.

pub use spiralkeep_community as community;
pub use spiralkeep_consciousness as consciousness;
pub use spiralkeep_coordination as coordination;
pub use spiralkeep_core as foundation;

pub use spiralkeep_coordination::{CommunityStatus, CoordinationSystem, StatusRefresher, SyncPayload};
pub use spiralkeep_core::{Error, Result, SpiralkeepConfig};
