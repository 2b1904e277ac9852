//! Engine Module
//!
//! Executes decoded requests against the register store.
//!
//! ## Responsibilities
//! - Validate the register map and seed the store with defaults
//! - Dispatch each request by function code
//! - Log accesses to named registers in human-readable form
//!
//! The engine only stages writes. Reported values governed by a commit
//! triple change on the next simulation tick, never inside a request.

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::protocol::{decode_request, Frame, Request, Response};
use crate::registers::{Address, RegisterMap, RegisterRole, RegisterStore, WriteOutcome};

/// Request executor shared by every session
pub struct Engine {
    /// Address table (read-only after startup)
    map: RegisterMap,

    /// Shared with the simulation ticker
    store: Arc<RegisterStore>,
}

impl Engine {
    /// Build an engine with a fresh store seeded from the config's map
    pub fn new(config: &Config) -> Result<Self> {
        config.register_map.validate()?;
        let store = Arc::new(RegisterStore::new(&config.register_map));
        Ok(Self {
            map: config.register_map.clone(),
            store,
        })
    }

    /// Decode and execute the request carried by a frame
    ///
    /// Unsupported function codes and malformed payloads come back as
    /// errors; the caller sends nothing for them.
    pub fn handle(&self, frame: &Frame) -> Result<Response> {
        let request = decode_request(frame)?;
        tracing::trace!("Unit {} request: {:?}", frame.header.unit_id, request);
        Ok(self.execute(request))
    }

    /// Execute a request
    pub fn execute(&self, request: Request) -> Response {
        match request {
            Request::ReadHoldingRegisters { start, count } => {
                let values = self.read(start, count);
                Response::ReadHoldingRegisters { values }
            }
            Request::WriteSingleRegister { address, value } => {
                let outcome = self.store.set(address, value);
                self.log_write(address, value, outcome);
                // Echo the supplied value even when the address is unknown
                Response::WriteSingleRegister { address, value }
            }
            Request::WriteMultipleRegisters { start, values } => {
                for (address, value) in addresses(start, values.len() as u16).zip(&values) {
                    let outcome = self.store.set(address, *value);
                    if outcome.changed {
                        tracing::info!(
                            "Multi-write {} = {} (was {})",
                            address,
                            value,
                            outcome.previous
                        );
                    }
                }
                Response::WriteMultipleRegisters {
                    start,
                    count: values.len() as u16,
                }
            }
        }
    }

    /// Read `count` registers one at a time; gaps read as 0
    fn read(&self, start: Address, count: u16) -> Vec<u16> {
        addresses(start, count)
            .map(|address| {
                let value = self.store.get(address);
                if let Some(RegisterRole::Reported(quantity)) = self.map.role(address) {
                    tracing::debug!("Read {}: {}", quantity.name(), quantity.format(value));
                }
                value
            })
            .collect()
    }

    fn log_write(&self, address: Address, value: u16, outcome: WriteOutcome) {
        if !outcome.changed {
            return;
        }

        match self.map.role(address) {
            Some(RegisterRole::Control(quantity)) => tracing::info!(
                "{} control trigger: {} -> {}",
                quantity.name(),
                outcome.previous,
                value
            ),
            Some(RegisterRole::Target(quantity)) => tracing::info!(
                "{} target: {} -> {}",
                quantity.name(),
                quantity.format(outcome.previous),
                quantity.format(value)
            ),
            _ => tracing::info!("Register {}: {} -> {}", address, outcome.previous, value),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Shared register store
    pub fn store(&self) -> &Arc<RegisterStore> {
        &self.store
    }

    /// Register address table
    pub fn map(&self) -> &RegisterMap {
        &self.map
    }
}

/// Consecutive addresses from `start`, wrapping past 0xFFFF
fn addresses(start: Address, count: u16) -> impl Iterator<Item = Address> {
    (0..count).map(move |offset| start.wrapping_add(offset))
}
