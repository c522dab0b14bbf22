//! Shared deterministic types for the routine core.
//!
//! These types define stable contracts between the composer, the plan runtime,
//! and the actions. They carry no actuator handles and no clock readings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a single action.
///
/// Transitions: `Created → Initialized → Running → Finished | Interrupted`.
/// `Finished` and `Interrupted` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionState {
    Created,
    Initialized,
    Running,
    Finished,
    Interrupted,
}

impl ActionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ActionState::Finished | ActionState::Interrupted)
    }

    /// True once `initialize()` has run and no terminal callback has.
    pub fn is_active(self) -> bool {
        matches!(self, ActionState::Initialized | ActionState::Running)
    }
}

/// Physical subsystem that at most one active action may command at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    DriveBase,
    ShooterWheels,
    Feeder,
    ShooterPivot,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Resource::DriveBase => "drive base",
            Resource::ShooterWheels => "shooter wheels",
            Resource::Feeder => "feeder",
            Resource::ShooterPivot => "shooter pivot",
        };
        f.write_str(label)
    }
}

/// Named pivot targets for the shooter/grabber arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShooterPosition {
    /// Angle used for high-goal shots with target seeking.
    DefaultShooting,
    /// Fully lowered, used for the low goal.
    Lowest,
    /// Fully raised, the stowed pose when not shooting.
    Highest,
}

impl fmt::Display for ShooterPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ShooterPosition::DefaultShooting => "default-shooting",
            ShooterPosition::Lowest => "lowest",
            ShooterPosition::Highest => "highest",
        };
        f.write_str(label)
    }
}

/// Concrete obstacle-crossing strategy selected for a routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Crossing {
    LowBar,
    Portcullis,
    SallyPort,
    Drawbridge,
    ChevalDeFrise,
    /// Fallback for every defense without a dedicated strategy.
    Generic,
}

impl fmt::Display for Crossing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Crossing::LowBar => "LowBar",
            Crossing::Portcullis => "Portcullis",
            Crossing::SallyPort => "SallyPort",
            Crossing::Drawbridge => "Drawbridge",
            Crossing::ChevalDeFrise => "ChevalDeFrise",
            Crossing::Generic => "Generic",
        };
        f.write_str(label)
    }
}
