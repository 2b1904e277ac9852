//! Configuration for ventsim
//!
//! Centralized configuration with sensible defaults.

use std::time::Duration;

use crate::registers::RegisterMap;

/// Main configuration for a simulator instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    // -------------------------------------------------------------------------
    // Simulation Configuration
    // -------------------------------------------------------------------------
    /// Period of the commit/physics tick (milliseconds)
    pub tick_interval_ms: u64,

    /// How control registers behave
    pub commit_mode: CommitMode,

    /// Outdoor temperature curve
    pub ambient: AmbientProfile,

    // -------------------------------------------------------------------------
    // Register Configuration
    // -------------------------------------------------------------------------
    /// Address table of the simulated device
    pub register_map: RegisterMap,
}

/// Control register behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitMode {
    /// Client writes control=0, device commits and writes control=1
    Handshake,

    /// Control registers are held at 0; every target change is applied
    /// on the next tick
    AlwaysArmed,
}

/// Outdoor temperature: `round(baseline + amplitude * sin(t / period))`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientProfile {
    /// Raw register value at the midpoint (0.1 °C units)
    pub baseline: f64,

    /// Peak deviation from the baseline (0.1 °C units)
    pub amplitude: f64,

    /// Divisor applied to elapsed seconds before taking the sine
    pub period_secs: f64,
}

impl Default for AmbientProfile {
    fn default() -> Self {
        Self {
            baseline: 120.0,
            amplitude: 20.0,
            period_secs: 10.0,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:502".to_string(),
            tick_interval_ms: 100,
            commit_mode: CommitMode::Handshake,
            ambient: AmbientProfile::default(),
            register_map: RegisterMap::atrea_rd5(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Tick period as a Duration, never shorter than 1 ms
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the tick period (in milliseconds)
    pub fn tick_interval_ms(mut self, ms: u64) -> Self {
        self.config.tick_interval_ms = ms;
        self
    }

    /// Set the control register behaviour
    pub fn commit_mode(mut self, mode: CommitMode) -> Self {
        self.config.commit_mode = mode;
        self
    }

    /// Set the outdoor temperature curve
    pub fn ambient(mut self, profile: AmbientProfile) -> Self {
        self.config.ambient = profile;
        self
    }

    /// Replace the register table
    pub fn register_map(mut self, map: RegisterMap) -> Self {
        self.config.register_map = map;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
