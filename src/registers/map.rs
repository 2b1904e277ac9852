//! Register address map
//!
//! Describes which addresses exist, which space they belong to, and how
//! they are grouped into commit triples. Built once at startup and shared
//! read-only by the engine and the simulation.

use std::collections::BTreeMap;

use crate::error::{Result, SimError};
use super::{Address, Mode};

// =============================================================================
// Atrea RD5 Register Layout
// =============================================================================

pub const RD5_POWER_CONTROL: Address = 10700;
pub const RD5_MODE_CONTROL: Address = 10701;
pub const RD5_TEMPERATURE_CONTROL: Address = 10702;

pub const RD5_POWER_REPORTED: Address = 10704;
pub const RD5_MODE_REPORTED: Address = 10705;
pub const RD5_TEMPERATURE_REPORTED: Address = 10706;

pub const RD5_POWER_TARGET: Address = 10708;
pub const RD5_MODE_TARGET: Address = 10709;
pub const RD5_TEMPERATURE_TARGET: Address = 10710;

pub const RD5_OUTDOOR_TEMPERATURE: Address = 10300;
pub const RD5_SUPPLY_TEMPERATURE: Address = 10301;

/// Physical quantity carried by a register, used to render values in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    /// Fan power in percent
    Power,
    /// Operating mode, see [`Mode`]
    Mode,
    /// Temperature in tenths of a degree Celsius
    Temperature,
}

impl Quantity {
    pub fn name(&self) -> &'static str {
        match self {
            Quantity::Power => "Power",
            Quantity::Mode => "Mode",
            Quantity::Temperature => "Temperature",
        }
    }

    /// Format a raw register value for display
    pub fn format(&self, raw: u16) -> String {
        match self {
            Quantity::Power => format!("{}%", raw),
            Quantity::Mode => format!("{} ({})", Mode::describe(raw), raw),
            Quantity::Temperature => format!("{:.1}°C", f64::from(raw as i16) / 10.0),
        }
    }
}

/// Control/target/reported grouping for one controllable quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitTriple {
    pub quantity: Quantity,
    /// Writing 0 arms the triple; the device writes 1 once applied
    pub control: Address,
    /// Value staged by the client
    pub target: Address,
    /// Value the device reports as applied
    pub reported: Address,
}

/// Supply sensor that drifts toward another reported register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupplySensor {
    pub address: Address,
    /// Reported register the supply reading converges on
    pub follows: Address,
}

/// What a known address is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterRole {
    Control(Quantity),
    Target(Quantity),
    Reported(Quantity),
    Outdoor,
    Supply,
}

/// Fixed address table for one simulated device
#[derive(Debug, Clone, Default)]
pub struct RegisterMap {
    triples: Vec<CommitTriple>,
    outdoor: Option<Address>,
    supply: Option<SupplySensor>,
    reported: BTreeMap<Address, u16>,
    commanded: BTreeMap<Address, u16>,
    declared: Vec<Address>,
}

impl RegisterMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Default table of the Atrea RD5 unit
    ///
    /// Power 40 %, mode Ventilation, setpoint 22.5 °C, outdoor 12.0 °C and
    /// supply 20.0 °C. All control registers start armed (0).
    pub fn atrea_rd5() -> Self {
        Self::new()
            .with_triple(
                Quantity::Power,
                RD5_POWER_CONTROL,
                RD5_POWER_TARGET,
                RD5_POWER_REPORTED,
                40,
            )
            .with_triple(
                Quantity::Mode,
                RD5_MODE_CONTROL,
                RD5_MODE_TARGET,
                RD5_MODE_REPORTED,
                Mode::Ventilation as u16,
            )
            .with_triple(
                Quantity::Temperature,
                RD5_TEMPERATURE_CONTROL,
                RD5_TEMPERATURE_TARGET,
                RD5_TEMPERATURE_REPORTED,
                225,
            )
            .with_outdoor(RD5_OUTDOOR_TEMPERATURE, 120)
            .with_supply(RD5_SUPPLY_TEMPERATURE, 200, RD5_TEMPERATURE_REPORTED)
    }

    /// Add a commit triple; target and reported both start at `initial`,
    /// control starts armed
    pub fn with_triple(
        mut self,
        quantity: Quantity,
        control: Address,
        target: Address,
        reported: Address,
        initial: u16,
    ) -> Self {
        self.triples.push(CommitTriple {
            quantity,
            control,
            target,
            reported,
        });
        self.commanded.insert(control, 0);
        self.commanded.insert(target, initial);
        self.reported.insert(reported, initial);
        self.declared.extend([control, target, reported]);
        self
    }

    /// Add the outdoor temperature register
    pub fn with_outdoor(mut self, address: Address, initial: u16) -> Self {
        self.outdoor = Some(address);
        self.reported.insert(address, initial);
        self.declared.push(address);
        self
    }

    /// Add the supply temperature register, converging on `follows`
    pub fn with_supply(mut self, address: Address, initial: u16, follows: Address) -> Self {
        self.supply = Some(SupplySensor { address, follows });
        self.reported.insert(address, initial);
        self.declared.push(address);
        self
    }

    /// Check that every address is declared once and the supply sensor
    /// follows a reported register
    pub fn validate(&self) -> Result<()> {
        let mut seen = self.declared.clone();
        seen.sort_unstable();
        if let Some(pair) = seen.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(SimError::Config(format!(
                "register {} declared more than once",
                pair[0]
            )));
        }

        if let Some(supply) = self.supply {
            if !self.reported.contains_key(&supply.follows) || supply.follows == supply.address {
                return Err(SimError::Config(format!(
                    "supply register {} must follow another reported register, got {}",
                    supply.address, supply.follows
                )));
            }
        }

        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn triples(&self) -> &[CommitTriple] {
        &self.triples
    }

    pub fn outdoor(&self) -> Option<Address> {
        self.outdoor
    }

    pub fn supply(&self) -> Option<SupplySensor> {
        self.supply
    }

    /// Initial values of the reported space
    pub fn reported_defaults(&self) -> &BTreeMap<Address, u16> {
        &self.reported
    }

    /// Initial values of the commanded space
    pub fn commanded_defaults(&self) -> &BTreeMap<Address, u16> {
        &self.commanded
    }

    /// Triple governing a given quantity, if configured
    pub fn triple(&self, quantity: Quantity) -> Option<&CommitTriple> {
        self.triples.iter().find(|t| t.quantity == quantity)
    }

    /// Role of an address, if it is part of the map
    pub fn role(&self, address: Address) -> Option<RegisterRole> {
        if self.outdoor == Some(address) {
            return Some(RegisterRole::Outdoor);
        }
        if self.supply.map(|s| s.address) == Some(address) {
            return Some(RegisterRole::Supply);
        }
        self.triples.iter().find_map(|t| {
            if t.control == address {
                Some(RegisterRole::Control(t.quantity))
            } else if t.target == address {
                Some(RegisterRole::Target(t.quantity))
            } else if t.reported == address {
                Some(RegisterRole::Reported(t.quantity))
            } else {
                None
            }
        })
    }
}
