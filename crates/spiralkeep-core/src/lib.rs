//! Spiralkeep Core - Types, errors, configuration and the storage collaborator

pub mod config;
pub mod error;
pub mod logging;
pub mod storage;
pub mod types;

pub use config::SpiralkeepConfig;
pub use error::{Error, Result};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use types::*;
