//! Simulation Module
//!
//! Everything the device does on its own, independent of any connection.
//!
//! ## Tick
//! Each tick takes the store lock once and, in order:
//! 1. applies armed commit triples ([`CommitEngine`])
//! 2. steps the supply sensor and recomputes the outdoor sensor ([`PhysicalModel`])

mod commit;
mod physics;
mod ticker;

pub use commit::{Commit, CommitEngine, CONTROL_ACKNOWLEDGED, CONTROL_ARMED};
pub use physics::{step_toward, PhysicalModel, SensorReadings};
pub use ticker::{run_isolated, Ticker};

use std::time::{Duration, Instant};

use crate::config::Config;
use crate::registers::RegisterStore;

/// Outcome of one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub commits: Vec<Commit>,
    pub readings: SensorReadings,
}

/// Commit engine and physical model, run together as one tick
#[derive(Debug, Clone)]
pub struct Simulation {
    commit: CommitEngine,
    physics: PhysicalModel,
    started: Instant,
}

impl Simulation {
    pub fn new(config: &Config) -> Self {
        Self {
            commit: CommitEngine::new(&config.register_map, config.commit_mode),
            physics: PhysicalModel::new(&config.register_map, config.ambient),
            started: Instant::now(),
        }
    }

    /// Run one tick against the wall clock
    pub fn tick(&self, store: &RegisterStore) -> TickReport {
        self.tick_at(store, self.started.elapsed())
    }

    /// Run one tick as if `elapsed` time had passed since start
    pub fn tick_at(&self, store: &RegisterStore, elapsed: Duration) -> TickReport {
        store.batch(|regs| {
            let commits = self.commit.apply(regs);
            let readings = self.physics.advance(regs, elapsed);
            TickReport { commits, readings }
        })
    }

    pub fn physics(&self) -> &PhysicalModel {
        &self.physics
    }
}
