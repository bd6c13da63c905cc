//! Player stats, special unlocks and their levels.
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::PurchaseError;

/// Level of an unlocked special.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UnlockLevel {
    #[default]
    Level1,
    Level2,
    Level3,
}

impl UnlockLevel {
    pub const MAX: UnlockLevel = UnlockLevel::Level3;

    /// The following level, `None` at [`UnlockLevel::MAX`].
    pub fn next(self) -> Option<UnlockLevel> {
        match self {
            UnlockLevel::Level1 => Some(UnlockLevel::Level2),
            UnlockLevel::Level2 => Some(UnlockLevel::Level3),
            UnlockLevel::Level3 => None,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            UnlockLevel::Level1 => 1,
            UnlockLevel::Level2 => 2,
            UnlockLevel::Level3 => 3,
        }
    }
}

/// Special boat equipment bought in the shop.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpecialKind {
    TrashNet,
    IceBreaker,
    SpeedBurst,
}

impl SpecialKind {
    pub const ALL: [SpecialKind; 3] = [
        SpecialKind::TrashNet,
        SpecialKind::IceBreaker,
        SpecialKind::SpeedBurst,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SpecialKind::TrashNet => "trashnet",
            SpecialKind::IceBreaker => "icebreaker",
            SpecialKind::SpeedBurst => "speedburst",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for SpecialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SpecialKind {
    type Err = PurchaseError;

    /// Case-insensitive; accepts `"TrashNet"`, `"trashnet"` and `"trash_net"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        SpecialKind::ALL
            .into_iter()
            .find(|k| k.name() == key)
            .ok_or_else(|| PurchaseError::UnknownSpecial(s.to_owned()))
    }
}

/// Whether a special is unlocked and at which level.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpecialState {
    pub unlocked: bool,
    pub level: UnlockLevel,
}

/// Persistent player data. All values are clamped at zero.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerStats {
    pub hp: u32,
    pub energy: u32,
    pub speed: u32,
    /// Trash currently carried.
    pub storage: u32,
    /// Cargo capacity.
    pub max_storage: u32,
    /// Recycle points available to spend.
    pub currency: u32,
    specials: [SpecialState; 3],
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            hp: 100,
            energy: 10,
            speed: 5,
            storage: 0,
            max_storage: 5,
            currency: 0,
            specials: [SpecialState::default(); 3],
        }
    }
}

/// Adds a signed delta, saturating at zero and `u32::MAX`.
#[inline]
fn apply_delta(value: u32, delta: i64) -> u32 {
    i64::from(value)
        .saturating_add(delta)
        .clamp(0, i64::from(u32::MAX)) as u32
}

impl PlayerStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn adjust_hp(&mut self, delta: i64) {
        self.hp = apply_delta(self.hp, delta);
    }

    pub fn adjust_energy(&mut self, delta: i64) {
        self.energy = apply_delta(self.energy, delta);
    }

    pub fn adjust_speed(&mut self, delta: i64) {
        self.speed = apply_delta(self.speed, delta);
    }

    pub fn adjust_storage(&mut self, delta: i64) {
        self.storage = apply_delta(self.storage, delta);
    }

    pub fn adjust_max_storage(&mut self, delta: i64) {
        self.max_storage = apply_delta(self.max_storage, delta);
    }

    pub fn adjust_currency(&mut self, delta: i64) {
        self.currency = apply_delta(self.currency, delta);
    }

    /// Free cargo slots.
    pub fn free_storage(&self) -> u32 {
        self.max_storage.saturating_sub(self.storage)
    }

    pub fn special(&self, kind: SpecialKind) -> SpecialState {
        self.specials[kind.index()]
    }

    pub(crate) fn special_mut(&mut self, kind: SpecialKind) -> &mut SpecialState {
        &mut self.specials[kind.index()]
    }

    pub fn is_unlocked(&self, kind: SpecialKind) -> bool {
        self.special(kind).unlocked
    }

    /// Restores the starting values of a new game.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
