//! Commit protocol engine
//!
//! Applies armed commit triples: when `control == 0` and
//! `target != reported`, the device copies target into reported and writes
//! `control = 1` to acknowledge.
//!
//! ```text
//!   IDLE ──(client: control=0)──▶ ARMED ──(tick: target≠reported)──▶ COMMITTED
//!    ▲                                                                   │
//!    └──────────────────────────(control=1)──────────────────────────────┘
//! ```

use crate::config::CommitMode;
use crate::registers::{CommitTriple, RegisterMap, RegisterSpaces};

/// Control value meaning "armed"
pub const CONTROL_ARMED: u16 = 0;

/// Control value written once a command has been applied
pub const CONTROL_ACKNOWLEDGED: u16 = 1;

/// One applied command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Commit {
    pub triple: CommitTriple,
    pub previous: u16,
    pub applied: u16,
}

/// Applies pending commands from the commanded space to the reported space
#[derive(Debug, Clone)]
pub struct CommitEngine {
    triples: Vec<CommitTriple>,
    mode: CommitMode,
}

impl CommitEngine {
    pub fn new(map: &RegisterMap, mode: CommitMode) -> Self {
        Self {
            triples: map.triples().to_vec(),
            mode,
        }
    }

    /// Apply every armed triple whose target differs from its reported value
    ///
    /// Must be called with the store lock held so each triple is updated
    /// as one unit.
    pub fn apply(&self, regs: &mut RegisterSpaces) -> Vec<Commit> {
        let mut commits = Vec::new();

        for triple in &self.triples {
            let control = regs.get(triple.control);

            if self.mode == CommitMode::AlwaysArmed && control != CONTROL_ARMED {
                regs.set(triple.control, CONTROL_ARMED);
            }
            let armed = match self.mode {
                CommitMode::Handshake => control == CONTROL_ARMED,
                CommitMode::AlwaysArmed => true,
            };
            if !armed {
                continue;
            }

            let target = regs.get(triple.target);
            let previous = regs.get(triple.reported);
            if target == previous {
                continue;
            }

            regs.set(triple.reported, target);
            if self.mode == CommitMode::Handshake {
                regs.set(triple.control, CONTROL_ACKNOWLEDGED);
            }

            tracing::info!(
                "{} commit: {} -> {}",
                triple.quantity.name(),
                triple.quantity.format(previous),
                triple.quantity.format(target)
            );

            commits.push(Commit {
                triple: *triple,
                previous,
                applied: target,
            });
        }

        commits
    }
}
