//! Spiralkeep Consciousness — the per-user state record
//!
//! - `state`: the record itself and the tagged-union actions that mutate it
//! - `store`: load/persist through the key-value collaborator, subscriber
//!   broadcast, and versioned export/import for cross-surface sync

pub mod state;
pub mod store;

pub use state::*;
pub use store::{ConsciousnessStore, Subscription, STATE_VERSION};
