//! Trash weight classes and what they are worth.
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Weight class of a piece of trash.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TrashClass {
    #[default]
    Light,
    Medium,
    Heavy,
    SuperHeavy,
}

impl TrashClass {
    pub const ALL: [TrashClass; 4] = [
        TrashClass::Light,
        TrashClass::Medium,
        TrashClass::Heavy,
        TrashClass::SuperHeavy,
    ];

    /// Recycle points awarded at the dock.
    pub fn points(self) -> u32 {
        match self {
            TrashClass::Light => 1,
            TrashClass::Medium => 2,
            TrashClass::Heavy => 5,
            TrashClass::SuperHeavy => 10,
        }
    }

    /// How long the collect action must be held for sunken trash of this class.
    pub fn hold_time(self) -> Duration {
        match self {
            TrashClass::Light => Duration::ZERO,
            TrashClass::Medium => Duration::from_secs(2),
            TrashClass::Heavy => Duration::from_secs(3),
            TrashClass::SuperHeavy => Duration::from_secs(5),
        }
    }
}
