//! Spin tuning surface.
//!
//! All velocities are in degrees per tick. The engine never reads a wall clock,
//! so "per tick" means whatever interval the host schedules `tick()` at.

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Lower bound of the initial velocity draw, before the speed multiplier.
pub const BASE_MIN_VELOCITY: f64 = 20.0;
/// Upper bound of the initial velocity draw, before the speed multiplier.
pub const BASE_MAX_VELOCITY: f64 = 25.0;

/// Multiplicative velocity decay applied every tick.
pub const DEFAULT_DECELERATION: f64 = 0.985;
/// Velocity below which a spin settles.
pub const DEFAULT_STOP_THRESHOLD: f64 = 0.5;
/// Pointer fixed at the top of the wheel.
pub const DEFAULT_POINTER_OFFSET: f64 = 90.0;

/// Speed multiplier range a host slider should offer.
pub const SPEED_MULTIPLIER_MIN: f64 = 0.1;
pub const SPEED_MULTIPLIER_MAX: f64 = 3.0;

/// Engine configuration.
///
/// Build with `SpinConfig::default()` and the `with_*` methods; the engine
/// validates on `configure`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinConfig {
    /// Per-tick velocity factor, strictly inside (0, 1)
    pub deceleration_factor: f64,
    /// Settle once velocity drops below this (> 0)
    pub stop_threshold: f64,
    /// Scales the initial velocity draw (> 0)
    pub speed_multiplier: f64,
    /// Where the pointer sits relative to angle 0, in degrees
    pub pointer_offset_degrees: f64,
    /// Force a settle after this many ticks (at least 1)
    pub max_ticks: Option<u64>,
}

impl Default for SpinConfig {
    fn default() -> Self {
        Self {
            deceleration_factor: DEFAULT_DECELERATION,
            stop_threshold: DEFAULT_STOP_THRESHOLD,
            speed_multiplier: 1.0,
            pointer_offset_degrees: DEFAULT_POINTER_OFFSET,
            max_ticks: None,
        }
    }
}

impl SpinConfig {
    pub fn with_deceleration(mut self, factor: f64) -> Self {
        self.deceleration_factor = factor;
        self
    }

    pub fn with_stop_threshold(mut self, threshold: f64) -> Self {
        self.stop_threshold = threshold;
        self
    }

    pub fn with_speed_multiplier(mut self, multiplier: f64) -> Self {
        self.speed_multiplier = multiplier;
        self
    }

    pub fn with_pointer_offset(mut self, degrees: f64) -> Self {
        self.pointer_offset_degrees = degrees;
        self
    }

    pub fn with_max_ticks(mut self, ticks: u64) -> Self {
        self.max_ticks = Some(ticks);
        self
    }

    /// Check every numeric bound. Non-finite values are rejected before range checks.
    pub fn validate(&self) -> Result<(), ConfigError> {
        open_range("deceleration_factor", self.deceleration_factor, 0.0, 1.0)?;
        open_range("stop_threshold", self.stop_threshold, 0.0, f64::INFINITY)?;
        // Subnormal velocities stop shrinking under multiplication
        if !self.stop_threshold.is_normal() {
            return Err(ConfigError::OutOfRange {
                field: "stop_threshold",
                value: self.stop_threshold,
                min: f64::MIN_POSITIVE,
                max: f64::INFINITY,
            });
        }
        open_range("speed_multiplier", self.speed_multiplier, 0.0, f64::INFINITY)?;
        let (_, hi) = self.velocity_range();
        if !hi.is_finite() {
            return Err(ConfigError::OutOfRange {
                field: "speed_multiplier",
                value: self.speed_multiplier,
                min: 0.0,
                max: f64::MAX / BASE_MAX_VELOCITY,
            });
        }
        finite("pointer_offset_degrees", self.pointer_offset_degrees)?;
        if self.max_ticks == Some(0) {
            return Err(ConfigError::OutOfRange {
                field: "max_ticks",
                value: 0.0,
                min: 0.0,
                max: f64::INFINITY,
            });
        }
        Ok(())
    }

    /// Initial velocity bounds after applying the speed multiplier.
    pub fn velocity_range(&self) -> (f64, f64) {
        (
            BASE_MIN_VELOCITY * self.speed_multiplier,
            BASE_MAX_VELOCITY * self.speed_multiplier,
        )
    }
}

/// Clamp a host-supplied speed into the slider range.
pub fn clamp_speed_multiplier(value: f64) -> f64 {
    if value.is_nan() {
        return 1.0;
    }
    value.clamp(SPEED_MULTIPLIER_MIN, SPEED_MULTIPLIER_MAX)
}

fn finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field, value })
    }
}

fn open_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value <= min || value >= max {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}
