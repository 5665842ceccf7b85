//! Wheel spin engine
//!
//! - `config`: tuning surface and its bounds
//! - `engine`: Idle → Spinning → Settled state machine, fixed-tick physics
//! - `resolve`: pointer angle → segment index
//! - `error`: typed configuration / state errors

pub mod config;
pub mod engine;
pub mod error;
pub mod resolve;

pub use config::SpinConfig;
pub use engine::{SpinEngine, SpinPhase, SpinResult, SpinStateSnapshot};
pub use error::{ConfigError, InvalidStateError};
pub use resolve::{normalize_degrees, resolve_index, segment_bounds};
