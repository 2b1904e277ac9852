//! Operating modes
//!
//! Human-readable names for the values carried by the mode registers.
//! Only used for log output; the protocol treats modes as raw integers.

use std::fmt;

/// Ventilation unit operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Mode {
    Off = 0,
    Auto = 1,
    Ventilation = 2,
    CirculationVentilation = 3,
    Circulation = 4,
    NightPrecooling = 5,
    Disbalance = 6,
    Overpressure = 7,
}

impl Mode {
    /// Look up the mode for a raw register value
    pub fn from_raw(raw: u16) -> Option<Self> {
        match raw {
            0 => Some(Mode::Off),
            1 => Some(Mode::Auto),
            2 => Some(Mode::Ventilation),
            3 => Some(Mode::CirculationVentilation),
            4 => Some(Mode::Circulation),
            5 => Some(Mode::NightPrecooling),
            6 => Some(Mode::Disbalance),
            7 => Some(Mode::Overpressure),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mode::Off => "Off",
            Mode::Auto => "Auto",
            Mode::Ventilation => "Ventilation",
            Mode::CirculationVentilation => "Circulation+Ventilation",
            Mode::Circulation => "Circulation",
            Mode::NightPrecooling => "Night Precooling",
            Mode::Disbalance => "Disbalance",
            Mode::Overpressure => "Overpressure",
        }
    }

    /// Render a raw value, falling back to the number for unknown modes
    pub fn describe(raw: u16) -> String {
        match Self::from_raw(raw) {
            Some(mode) => mode.name().to_string(),
            None => raw.to_string(),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
