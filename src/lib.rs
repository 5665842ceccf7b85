pub mod catalog;
pub mod wheel;

// Host-side drivers (threads, queues)
pub mod host;

// Scoring and history, observers of settled spins
pub mod game;

pub use catalog::{Catalog, CategoryFilter, Item};
pub use wheel::{
    ConfigError, InvalidStateError, SpinConfig, SpinEngine, SpinPhase, SpinResult,
    SpinStateSnapshot,
};
