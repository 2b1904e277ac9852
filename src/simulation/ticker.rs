//! Ticker
//!
//! Background thread that runs one simulation tick per interval. It only
//! touches the register store, never a connection.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel;

use crate::error::Result;
use crate::registers::RegisterStore;
use crate::shutdown::ShutdownHandle;
use super::Simulation;

/// Drives a [`Simulation`] on a fixed period
pub struct Ticker {
    simulation: Simulation,
    store: Arc<RegisterStore>,
    interval: Duration,
}

impl Ticker {
    pub fn new(simulation: Simulation, store: Arc<RegisterStore>, interval: Duration) -> Self {
        Self {
            simulation,
            store,
            interval,
        }
    }

    /// Start the tick thread; it exits once `shutdown` is triggered
    pub fn spawn(self, shutdown: ShutdownHandle) -> Result<JoinHandle<()>> {
        let handle = thread::Builder::new()
            .name("ventsim-ticker".to_string())
            .spawn(move || self.run(shutdown))?;
        Ok(handle)
    }

    fn run(self, shutdown: ShutdownHandle) {
        tracing::info!("Simulation ticker running every {:?}", self.interval);
        let ticks = channel::tick(self.interval);

        for _ in ticks.iter() {
            if shutdown.is_triggered() {
                break;
            }

            run_isolated(|| self.simulation.tick(&self.store));
        }

        tracing::info!("Simulation ticker stopped");
    }
}

/// Run one tick, logging and swallowing a panic instead of unwinding
///
/// Returns `None` if the tick panicked. The store lock does not poison,
/// so the next tick sees consistent registers.
pub fn run_isolated<R>(tick: impl FnOnce() -> R) -> Option<R> {
    match panic::catch_unwind(AssertUnwindSafe(tick)) {
        Ok(result) => Some(result),
        Err(cause) => {
            let message = cause
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| cause.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!("Simulation tick failed, skipping: {}", message);
            None
        }
    }
}
