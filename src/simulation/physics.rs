//! Physical model
//!
//! Evolves the sensor registers that no client writes:
//! - supply temperature creeps 1 raw unit per tick toward the applied
//!   setpoint and stops there
//! - outdoor temperature is a sine of elapsed time, recomputed every tick
//!
//! Temperatures are signed tenths of a degree stored as two's complement,
//! so -5.0 °C is the raw register value `0xFFCE`.

use std::time::Duration;

use crate::config::AmbientProfile;
use crate::registers::{Address, RegisterMap, RegisterSpaces, SupplySensor};

/// Sensor readings after one step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SensorReadings {
    pub outdoor: Option<u16>,
    pub supply: Option<u16>,
}

/// Time-driven model of the sensor registers
#[derive(Debug, Clone)]
pub struct PhysicalModel {
    outdoor: Option<Address>,
    supply: Option<SupplySensor>,
    ambient: AmbientProfile,
}

impl PhysicalModel {
    pub fn new(map: &RegisterMap, ambient: AmbientProfile) -> Self {
        Self {
            outdoor: map.outdoor(),
            supply: map.supply(),
            ambient,
        }
    }

    /// Outdoor reading at `elapsed` since the simulation started
    pub fn ambient_at(&self, elapsed: Duration) -> u16 {
        let phase = elapsed.as_secs_f64() / self.ambient.period_secs;
        let value = self.ambient.baseline + self.ambient.amplitude * phase.sin();
        let tenths = value.round().clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16;
        tenths as u16
    }

    /// Advance the sensors by one tick
    ///
    /// Runs after commits so the supply reading chases the freshly applied
    /// setpoint.
    pub fn advance(&self, regs: &mut RegisterSpaces, elapsed: Duration) -> SensorReadings {
        let mut readings = SensorReadings::default();

        if let Some(supply) = self.supply {
            let setpoint = regs.get(supply.follows);
            let current = regs.get(supply.address);
            let next = step_toward(current, setpoint);
            if next != current {
                regs.set(supply.address, next);
                tracing::trace!("Supply {} -> {} (setpoint {})", current, next, setpoint);
            }
            readings.supply = Some(next);
        }

        if let Some(outdoor) = self.outdoor {
            let value = self.ambient_at(elapsed);
            regs.set(outdoor, value);
            readings.outdoor = Some(value);
        }

        readings
    }
}

/// Move the signed temperature `current` one unit toward `target`, never
/// past it
pub fn step_toward(current: u16, target: u16) -> u16 {
    let (current, target) = (current as i16, target as i16);
    let next = if current < target {
        current + 1
    } else if current > target {
        current - 1
    } else {
        current
    };
    next as u16
}
