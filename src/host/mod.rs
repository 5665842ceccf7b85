//! Adapters for hosts that drive the engine from more than one thread.
//!
//! - `SharedSpinEngine`: one mutex around the engine
//! - `SpinDriver`: worker thread + command queue (single writer), ticks on a fixed interval

pub mod driver;
pub mod shared;

pub use driver::{DriverError, SpinDriver, SpinEvent, DEFAULT_TICK_INTERVAL, EVENT_QUEUE_CAPACITY};
pub use shared::SharedSpinEngine;
