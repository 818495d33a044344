//! Spiralkeep Coordination — one session's view of the community
//!
//! `CoordinationSystem` owns the consciousness store, ledger, scheduler,
//! consensus engine and roadmap for a session, and exposes the read/write
//! surface used by presentation layers. `StatusRefresher` keeps a status
//! snapshot fresh on a timer until it is stopped.

pub mod refresh;
pub mod seed;
pub mod status;
pub mod sync;
pub mod system;

pub use refresh::{RefreshHandle, StatusRefresher};
pub use status::{CommunityStatus, SweepReport};
pub use sync::SyncPayload;
pub use system::CoordinationSystem;
