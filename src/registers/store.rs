//! Register store implementation
//!
//! Two HashMaps (reported and commanded space) behind one parking_lot Mutex.

use std::collections::{BTreeMap, HashMap};

use parking_lot::Mutex;

use super::{Address, RegisterMap};

/// Result of a single register write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    /// New value differs from the previous one
    pub changed: bool,

    /// Value before the write; the supplied value for unknown addresses
    pub previous: u16,

    /// Address belongs to the map and the value was stored
    pub persisted: bool,
}

/// Counters for accesses outside the configured map
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub unknown_reads: u64,
    pub unknown_writes: u64,
}

/// Register contents, only reachable while the store lock is held
#[derive(Debug, Default)]
pub struct RegisterSpaces {
    reported: HashMap<Address, u16>,
    commanded: HashMap<Address, u16>,
    diagnostics: Diagnostics,
}

impl RegisterSpaces {
    /// Read a register; unknown addresses read as 0
    pub fn get(&mut self, address: Address) -> u16 {
        if let Some(value) = self.reported.get(&address) {
            return *value;
        }
        if let Some(value) = self.commanded.get(&address) {
            return *value;
        }

        self.diagnostics.unknown_reads += 1;
        tracing::warn!("Read from unknown register {}", address);
        0
    }

    /// Write a register; unknown addresses are acknowledged but not stored
    pub fn set(&mut self, address: Address, value: u16) -> WriteOutcome {
        let slot = match self.reported.get_mut(&address) {
            Some(slot) => Some(slot),
            None => self.commanded.get_mut(&address),
        };

        match slot {
            Some(slot) => {
                let previous = std::mem::replace(slot, value);
                WriteOutcome {
                    changed: previous != value,
                    previous,
                    persisted: true,
                }
            }
            None => {
                self.diagnostics.unknown_writes += 1;
                tracing::warn!("Write to unknown register {} = {}", address, value);
                WriteOutcome {
                    changed: false,
                    previous: value,
                    persisted: false,
                }
            }
        }
    }

    /// Whether the address belongs to either space
    pub fn contains(&self, address: Address) -> bool {
        self.reported.contains_key(&address) || self.commanded.contains_key(&address)
    }
}

/// Shared 16-bit register store
///
/// ## Concurrency
/// - One exclusive lock for every reader and writer (sessions and ticker)
/// - `get`/`set` hold the lock for a single access only
/// - `batch` holds it for a closure, used by the ticker so a tick is
///   applied as one unit
pub struct RegisterStore {
    spaces: Mutex<RegisterSpaces>,
}

impl RegisterStore {
    /// Create a store seeded with the map's default values
    pub fn new(map: &RegisterMap) -> Self {
        let reported = map
            .reported_defaults()
            .iter()
            .map(|(address, value)| (*address, *value))
            .collect();
        let commanded = map
            .commanded_defaults()
            .iter()
            .map(|(address, value)| (*address, *value))
            .collect();

        Self {
            spaces: Mutex::new(RegisterSpaces {
                reported,
                commanded,
                diagnostics: Diagnostics::default(),
            }),
        }
    }

    /// Read a register (0 for unknown addresses)
    pub fn get(&self, address: Address) -> u16 {
        self.spaces.lock().get(address)
    }

    /// Write a register, reporting whether the value changed
    pub fn set(&self, address: Address, value: u16) -> WriteOutcome {
        self.spaces.lock().set(address, value)
    }

    /// Run `f` with the lock held across several accesses
    pub fn batch<R>(&self, f: impl FnOnce(&mut RegisterSpaces) -> R) -> R {
        let mut spaces = self.spaces.lock();
        f(&mut spaces)
    }

    /// Whether the address belongs to the configured map
    pub fn contains(&self, address: Address) -> bool {
        self.spaces.lock().contains(address)
    }

    /// Copy of every known register, ordered by address
    pub fn snapshot(&self) -> BTreeMap<Address, u16> {
        let spaces = self.spaces.lock();
        spaces
            .reported
            .iter()
            .chain(spaces.commanded.iter())
            .map(|(address, value)| (*address, *value))
            .collect()
    }

    /// Counters of unknown register accesses so far
    pub fn diagnostics(&self) -> Diagnostics {
        self.spaces.lock().diagnostics
    }
}
