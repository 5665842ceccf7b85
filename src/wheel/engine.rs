use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::config::SpinConfig;
use super::error::{ConfigError, InvalidStateError};
use super::resolve::{normalize_degrees, resolve_index};
use crate::catalog::{Catalog, Item};

/// Lifecycle phase of the wheel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpinPhase {
    Idle,
    Spinning,
    Settled,
}

/// What a presentation layer needs to draw one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpinStateSnapshot {
    pub phase: SpinPhase,
    /// Wheel rotation in degrees, always in [0, 360)
    pub angle: f64,
    /// Degrees per tick
    pub velocity: f64,
    /// Ticks since the current (or last) spin started
    pub tick_count: u64,
}

/// Outcome of one completed spin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinResult {
    /// Strictly increasing per engine
    pub spin_id: u64,
    /// Index into the catalog snapshot taken when the spin started
    pub index: usize,
    pub item: Item,
    pub final_angle: f64,
    pub tick_count: u64,
}

/// Wheel spin state machine.
///
/// Idle → Spinning (`start_spin`) → Settled (`tick` / `abort_spin`) → Idle
/// (`acknowledge`, or implicitly by starting the next spin).
///
/// The engine is not synchronized; see [`crate::host`] for multi-threaded hosts.
pub struct SpinEngine {
    /// Catalog the next spin will use
    catalog: Catalog,
    /// Snapshot the in-flight (or last) spin resolves against
    active: Catalog,
    config: SpinConfig,
    phase: SpinPhase,
    angle: f64,
    velocity: f64,
    tick_count: u64,
    spin_id: u64,
    result: Option<SpinResult>,
    rng: ChaCha8Rng,
}

impl SpinEngine {
    pub fn new(catalog: Catalog, config: SpinConfig) -> Result<Self, ConfigError> {
        validate(&catalog, &config)?;
        Ok(Self {
            active: catalog.clone(),
            catalog,
            config,
            phase: SpinPhase::Idle,
            angle: 0.0,
            velocity: 0.0,
            tick_count: 0,
            spin_id: 0,
            result: None,
            rng: ChaCha8Rng::from_entropy(),
        })
    }

    /// Use a fixed RNG seed so every spin sequence is reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self
    }

    /// Replace catalog and tuning, returning to `Idle`.
    ///
    /// On error nothing changes. An in-flight spin is discarded without a
    /// result. The wheel keeps its current angle.
    pub fn configure(&mut self, catalog: Catalog, config: SpinConfig) -> Result<(), ConfigError> {
        validate(&catalog, &config)?;
        if self.phase == SpinPhase::Spinning {
            log::warn!("Reconfigured mid-spin; spin {} discarded", self.spin_id);
        }
        log::debug!(
            "Configured: {} items, decel={}, stop={}, speed={}",
            catalog.len(),
            config.deceleration_factor,
            config.stop_threshold,
            config.speed_multiplier
        );
        self.active = catalog.clone();
        self.catalog = catalog;
        self.config = config;
        self.phase = SpinPhase::Idle;
        self.velocity = 0.0;
        self.tick_count = 0;
        self.result = None;
        Ok(())
    }

    /// Swap the catalog used by the *next* spin without disturbing the
    /// current one. The in-flight spin still resolves against its snapshot.
    pub fn stage_catalog(&mut self, catalog: Catalog) -> Result<(), ConfigError> {
        if catalog.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        self.catalog = catalog;
        Ok(())
    }

    /// Start a spin with a velocity drawn uniformly from the configured range.
    pub fn start_spin(&mut self) -> Result<(), InvalidStateError> {
        self.ensure_not_spinning()?;
        let (lo, hi) = self.config.velocity_range();
        let velocity = self.rng.gen_range(lo..=hi);
        self.begin(velocity);
        Ok(())
    }

    /// Reseed the RNG, then start a spin.
    pub fn start_spin_seeded(&mut self, seed: u64) -> Result<(), InvalidStateError> {
        self.ensure_not_spinning()?;
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self.start_spin()
    }

    /// Start a spin with an explicit initial velocity (degrees per tick).
    /// Negative or non-finite velocities are treated as 0 and settle on the next tick.
    pub fn start_spin_with_velocity(&mut self, velocity: f64) -> Result<(), InvalidStateError> {
        self.ensure_not_spinning()?;
        let velocity = if velocity.is_finite() { velocity.max(0.0) } else { 0.0 };
        self.begin(velocity);
        Ok(())
    }

    /// Advance one fixed step. No-op unless spinning.
    pub fn tick(&mut self) -> SpinStateSnapshot {
        if self.phase != SpinPhase::Spinning {
            return self.current_snapshot();
        }

        self.angle = normalize_degrees(self.angle + self.velocity);
        self.velocity *= self.config.deceleration_factor;
        self.tick_count += 1;

        let capped = self
            .config
            .max_ticks
            .is_some_and(|cap| self.tick_count >= cap);
        if self.velocity < self.config.stop_threshold || capped {
            if capped && self.velocity >= self.config.stop_threshold {
                log::warn!(
                    "Spin {} hit the {}-tick cap at {:.2} deg/tick",
                    self.spin_id,
                    self.tick_count,
                    self.velocity
                );
            }
            self.settle();
        }

        self.current_snapshot()
    }

    /// Stop immediately and resolve at the current angle.
    pub fn abort_spin(&mut self) -> Result<&SpinResult, InvalidStateError> {
        if self.phase != SpinPhase::Spinning {
            return Err(InvalidStateError::NotSpinning);
        }
        log::debug!("Spin {} aborted at tick {}", self.spin_id, self.tick_count);
        Ok(self.settle())
    }

    /// Take the settled result and return to `Idle`.
    pub fn acknowledge(&mut self) -> Option<SpinResult> {
        if self.phase != SpinPhase::Settled {
            return None;
        }
        self.phase = SpinPhase::Idle;
        self.result.take()
    }

    pub fn current_snapshot(&self) -> SpinStateSnapshot {
        SpinStateSnapshot {
            phase: self.phase,
            angle: self.angle,
            velocity: self.velocity,
            tick_count: self.tick_count,
        }
    }

    pub fn last_result(&self) -> Option<&SpinResult> {
        self.result.as_ref()
    }

    pub fn phase(&self) -> SpinPhase {
        self.phase
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &SpinConfig {
        &self.config
    }

    /// Index under the pointer right now, against the active snapshot.
    pub fn pointed_index(&self) -> usize {
        resolve_index(self.angle, self.active.len(), self.config.pointer_offset_degrees)
    }

    fn ensure_not_spinning(&self) -> Result<(), InvalidStateError> {
        if self.phase == SpinPhase::Spinning {
            return Err(InvalidStateError::AlreadySpinning);
        }
        Ok(())
    }

    fn begin(&mut self, velocity: f64) {
        self.spin_id += 1;
        self.result = None;
        self.active = self.catalog.clone();
        self.velocity = velocity;
        self.tick_count = 0;
        self.phase = SpinPhase::Spinning;
        log::debug!(
            "Spin {} started: {:.2} deg/tick over {} items",
            self.spin_id,
            velocity,
            self.active.len()
        );
    }

    fn settle(&mut self) -> &SpinResult {
        let index = self.pointed_index();
        // `active` is validated non-empty and the index is reduced mod len
        let item = self.active.items()[index].clone();
        log::debug!(
            "Spin {} settled after {} ticks at {:.2} deg: {}",
            self.spin_id,
            self.tick_count,
            self.angle,
            item.display_name
        );
        self.velocity = 0.0;
        self.phase = SpinPhase::Settled;
        self.result.insert(SpinResult {
            spin_id: self.spin_id,
            index,
            item,
            final_angle: self.angle,
            tick_count: self.tick_count,
        })
    }
}

fn validate(catalog: &Catalog, config: &SpinConfig) -> Result<(), ConfigError> {
    if catalog.is_empty() {
        return Err(ConfigError::EmptyCatalog);
    }
    config.validate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::devops;

    fn abcd() -> Catalog {
        ["A", "B", "C", "D"]
            .iter()
            .map(|n| Item::new(&n.to_lowercase(), n, "letters"))
            .collect()
    }

    fn run_to_settle(engine: &mut SpinEngine) -> SpinStateSnapshot {
        for _ in 0..100_000 {
            let snap = engine.tick();
            if snap.phase == SpinPhase::Settled {
                return snap;
            }
        }
        panic!("spin did not settle");
    }

    #[test]
    fn empty_catalog_rejected() {
        assert_eq!(
            SpinEngine::new(Catalog::new(Vec::new()), SpinConfig::default()).err(),
            Some(ConfigError::EmptyCatalog)
        );

        let mut engine = SpinEngine::new(abcd(), SpinConfig::default()).unwrap();
        assert_eq!(
            engine.configure(Catalog::new(Vec::new()), SpinConfig::default()),
            Err(ConfigError::EmptyCatalog)
        );
        // failed configure leaves the engine untouched
        assert_eq!(engine.catalog().len(), 4);
    }

    #[test]
    fn bad_numbers_rejected() {
        let mut engine = SpinEngine::new(abcd(), SpinConfig::default()).unwrap();
        let err = engine
            .configure(abcd(), SpinConfig::default().with_deceleration(1.0))
            .unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { .. }));
        assert!((engine.config().deceleration_factor - 0.985).abs() < 1e-12);
    }

    #[test]
    fn start_while_spinning_fails() {
        let mut engine = SpinEngine::new(abcd(), SpinConfig::default()).unwrap().with_seed(7);
        engine.start_spin().unwrap();
        assert_eq!(engine.start_spin(), Err(InvalidStateError::AlreadySpinning));
        assert_eq!(
            engine.start_spin_with_velocity(3.0),
            Err(InvalidStateError::AlreadySpinning)
        );
        assert_eq!(engine.start_spin_seeded(1), Err(InvalidStateError::AlreadySpinning));
    }

    #[test]
    fn tick_while_idle_is_noop() {
        let mut engine = SpinEngine::new(abcd(), SpinConfig::default()).unwrap();
        let before = engine.current_snapshot();
        let after = engine.tick();
        assert_eq!(before, after);
        assert_eq!(after.phase, SpinPhase::Idle);
        assert_eq!(after.angle, 0.0);
    }

    #[test]
    fn tick_while_settled_is_noop() {
        let mut engine = SpinEngine::new(abcd(), SpinConfig::default()).unwrap();
        engine.start_spin_with_velocity(5.0).unwrap();
        let settled = run_to_settle(&mut engine);
        assert_eq!(engine.tick(), settled);
    }

    #[test]
    fn four_item_scenario() {
        let config = SpinConfig::default()
            .with_deceleration(0.9)
            .with_stop_threshold(0.5);
        let mut engine = SpinEngine::new(abcd(), config).unwrap();
        engine.start_spin_with_velocity(10.0).unwrap();
        let snap = run_to_settle(&mut engine);

        // Replay the same arithmetic by hand
        let mut angle = 0.0_f64;
        let mut velocity = 10.0_f64;
        let mut ticks = 0;
        loop {
            angle = (angle + velocity).rem_euclid(360.0);
            velocity *= 0.9;
            ticks += 1;
            if velocity < 0.5 {
                break;
            }
        }

        assert_eq!(snap.tick_count, ticks);
        assert_eq!(ticks, 29);
        assert!((snap.angle - angle).abs() < 1e-9);

        let result = engine.last_result().unwrap();
        assert_eq!(result.index, resolve_index(angle, 4, 90.0));
        assert_eq!(result.item.display_name, "D");
        assert_eq!(result.final_angle, snap.angle);
    }

    #[test]
    fn velocity_monotone_and_angle_normalized() {
        let config = SpinConfig::default().with_speed_multiplier(3.0);
        let mut engine = SpinEngine::new(devops::builtin(), config).unwrap().with_seed(42);
        engine.start_spin().unwrap();
        let mut last_velocity = engine.current_snapshot().velocity;
        loop {
            let snap = engine.tick();
            assert!(snap.angle >= 0.0 && snap.angle < 360.0, "angle {}", snap.angle);
            assert!(snap.velocity <= last_velocity);
            last_velocity = snap.velocity;
            if snap.phase == SpinPhase::Settled {
                break;
            }
        }
    }

    #[test]
    fn terminates_for_any_valid_deceleration() {
        for &decel in &[0.01, 0.5, 0.9, 0.985, 0.999] {
            for &v0 in &[0.1, 1.0, 25.0, 75.0] {
                let config = SpinConfig::default().with_deceleration(decel);
                let mut engine = SpinEngine::new(abcd(), config).unwrap();
                engine.start_spin_with_velocity(v0).unwrap();
                let snap = run_to_settle(&mut engine);
                assert!(snap.velocity < 0.5);
            }
        }
    }

    #[test]
    fn smallest_normal_threshold_still_settles() {
        let config = SpinConfig::default()
            .with_deceleration(0.9)
            .with_stop_threshold(f64::MIN_POSITIVE);
        let mut engine = SpinEngine::new(abcd(), config).unwrap();
        engine.start_spin_with_velocity(1.0).unwrap();
        let snap = run_to_settle(&mut engine);
        assert!(snap.velocity < f64::MIN_POSITIVE);
    }

    #[test]
    fn oversized_speed_rejected_before_spinning() {
        let config = SpinConfig::default().with_speed_multiplier(1e307);
        assert!(matches!(
            SpinEngine::new(abcd(), config),
            Err(ConfigError::OutOfRange { field: "speed_multiplier", .. })
        ));
    }

    #[test]
    fn initial_velocity_in_range() {
        let config = SpinConfig::default().with_speed_multiplier(2.0);
        let mut engine = SpinEngine::new(abcd(), config).unwrap().with_seed(3);
        for _ in 0..50 {
            engine.start_spin().unwrap();
            let v = engine.current_snapshot().velocity;
            assert!((40.0..=50.0).contains(&v), "velocity {v}");
            engine.abort_spin().unwrap();
        }
    }

    #[test]
    fn seeded_spins_reproduce() {
        let mut a = SpinEngine::new(devops::builtin(), SpinConfig::default()).unwrap();
        let mut b = SpinEngine::new(devops::builtin(), SpinConfig::default()).unwrap();
        a.start_spin_seeded(99).unwrap();
        b.start_spin_seeded(99).unwrap();
        assert_eq!(run_to_settle(&mut a), run_to_settle(&mut b));
        assert_eq!(a.last_result().map(|r| r.index), b.last_result().map(|r| r.index));
    }

    #[test]
    fn second_spin_discards_first_result() {
        let mut engine = SpinEngine::new(abcd(), SpinConfig::default()).unwrap().with_seed(1);
        engine.start_spin().unwrap();
        run_to_settle(&mut engine);
        let first = engine.last_result().cloned().unwrap();

        engine.start_spin().unwrap();
        assert!(engine.last_result().is_none());
        run_to_settle(&mut engine);
        let second = engine.last_result().cloned().unwrap();
        assert_ne!(first, second);
        assert!(second.spin_id > first.spin_id);
    }

    #[test]
    fn staged_catalog_does_not_affect_inflight_spin() {
        let mut engine = SpinEngine::new(abcd(), SpinConfig::default()).unwrap();
        engine.start_spin_with_velocity(30.0).unwrap();
        engine.tick();

        let single: Catalog = vec![Item::new("solo", "Solo", "x")].into_iter().collect();
        engine.stage_catalog(single).unwrap();
        let snap = run_to_settle(&mut engine);

        let result = engine.last_result().unwrap();
        assert_eq!(result.index, resolve_index(snap.angle, 4, 90.0));
        assert_eq!(result.item.category, "letters");

        // next spin picks up the staged catalog
        engine.start_spin_with_velocity(30.0).unwrap();
        run_to_settle(&mut engine);
        assert_eq!(engine.last_result().map(|r| r.item.id.as_str()), Some("solo"));
    }

    #[test]
    fn stage_empty_catalog_rejected() {
        let mut engine = SpinEngine::new(abcd(), SpinConfig::default()).unwrap();
        assert_eq!(
            engine.stage_catalog(Catalog::new(Vec::new())),
            Err(ConfigError::EmptyCatalog)
        );
    }

    #[test]
    fn abort_settles_at_current_angle() {
        let mut engine = SpinEngine::new(abcd(), SpinConfig::default()).unwrap();
        assert_eq!(engine.abort_spin().err(), Some(InvalidStateError::NotSpinning));

        engine.start_spin_with_velocity(20.0).unwrap();
        engine.tick();
        engine.tick();
        let angle = engine.current_snapshot().angle;
        let result = engine.abort_spin().unwrap();
        assert_eq!(result.final_angle, angle);
        assert_eq!(result.tick_count, 2);
        assert_eq!(engine.phase(), SpinPhase::Settled);
        assert_eq!(engine.current_snapshot().velocity, 0.0);
    }

    #[test]
    fn max_ticks_forces_settle() {
        let config = SpinConfig::default().with_deceleration(0.9999).with_max_ticks(10);
        let mut engine = SpinEngine::new(abcd(), config).unwrap();
        engine.start_spin_with_velocity(25.0).unwrap();
        let snap = run_to_settle(&mut engine);
        assert_eq!(snap.tick_count, 10);
    }

    #[test]
    fn zero_velocity_settles_on_first_tick() {
        let mut engine = SpinEngine::new(abcd(), SpinConfig::default()).unwrap();
        engine.start_spin_with_velocity(f64::NAN).unwrap();
        let snap = engine.tick();
        assert_eq!(snap.phase, SpinPhase::Settled);
        assert_eq!(snap.angle, 0.0);
        // angle 0, pointer 90, 4 segments of 90 deg → segment 1
        assert_eq!(engine.last_result().map(|r| r.index), Some(1));
    }

    #[test]
    fn acknowledge_returns_to_idle() {
        let mut engine = SpinEngine::new(abcd(), SpinConfig::default()).unwrap();
        assert!(engine.acknowledge().is_none());
        engine.start_spin_with_velocity(4.0).unwrap();
        run_to_settle(&mut engine);
        let result = engine.acknowledge().unwrap();
        assert_eq!(result.spin_id, 1);
        assert_eq!(engine.phase(), SpinPhase::Idle);
        assert!(engine.last_result().is_none());
    }

    #[test]
    fn configure_mid_spin_resets_to_idle() {
        let mut engine = SpinEngine::new(abcd(), SpinConfig::default()).unwrap();
        engine.start_spin_with_velocity(20.0).unwrap();
        engine.tick();
        let angle = engine.current_snapshot().angle;
        engine
            .configure(devops::builtin(), SpinConfig::default().with_speed_multiplier(2.0))
            .unwrap();
        let snap = engine.current_snapshot();
        assert_eq!(snap.phase, SpinPhase::Idle);
        assert_eq!(snap.velocity, 0.0);
        assert_eq!(snap.angle, angle);
        assert!(engine.last_result().is_none());
    }
}
