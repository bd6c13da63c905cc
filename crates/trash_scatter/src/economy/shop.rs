//! Upgrade shop with multiplicative price scaling.
//!
//! Every purchase multiplies the price of the bought entry by its multiplier and
//! rounds up. Stat prices, unlock prices and upgrade prices scale independently.
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::economy::player::{PlayerStats, SpecialKind, UnlockLevel};
use crate::error::{Error, PurchaseError, Result};

/// Player stats that can be raised in the shop.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatKind {
    Hp,
    Energy,
    Speed,
    /// Raises [`PlayerStats::max_storage`].
    Storage,
}

impl StatKind {
    pub const ALL: [StatKind; 4] = [
        StatKind::Hp,
        StatKind::Energy,
        StatKind::Speed,
        StatKind::Storage,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StatKind::Hp => "hp",
            StatKind::Energy => "energy",
            StatKind::Speed => "speed",
            StatKind::Storage => "storage",
        }
    }

    /// Amount one purchase adds to the stat.
    pub fn increment(self) -> u32 {
        match self {
            StatKind::Hp => 10,
            StatKind::Energy => 5,
            StatKind::Speed => 1,
            StatKind::Storage => 5,
        }
    }

    fn apply(self, stats: &mut PlayerStats) -> u32 {
        let delta = i64::from(self.increment());
        match self {
            StatKind::Hp => {
                stats.adjust_hp(delta);
                stats.hp
            }
            StatKind::Energy => {
                stats.adjust_energy(delta);
                stats.energy
            }
            StatKind::Speed => {
                stats.adjust_speed(delta);
                stats.speed
            }
            StatKind::Storage => {
                stats.adjust_max_storage(delta);
                stats.max_storage
            }
        }
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StatKind {
    type Err = PurchaseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        StatKind::ALL
            .into_iter()
            .find(|k| k.name() == key)
            .ok_or_else(|| PurchaseError::UnknownStat(s.to_owned()))
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatPrice {
    pub stat: StatKind,
    pub base_price: u32,
    /// Factor applied to the price after each purchase.
    pub multiplier: f32,
}

impl StatPrice {
    pub fn new(stat: StatKind, base_price: u32, multiplier: f32) -> Self {
        Self {
            stat,
            base_price,
            multiplier,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecialPrice {
    pub special: SpecialKind,
    pub unlock_base_price: u32,
    pub upgrade_base_price: u32,
    pub unlock_multiplier: f32,
    pub upgrade_multiplier: f32,
}

impl SpecialPrice {
    /// Both multipliers set to 2.
    pub fn new(special: SpecialKind, unlock_base_price: u32, upgrade_base_price: u32) -> Self {
        Self {
            special,
            unlock_base_price,
            upgrade_base_price,
            unlock_multiplier: 2.0,
            upgrade_multiplier: 2.0,
        }
    }
}

/// Base prices and multipliers of every shop entry.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    pub stats: Vec<StatPrice>,
    pub specials: Vec<SpecialPrice>,
}

impl Default for PriceTable {
    fn default() -> Self {
        Self {
            stats: vec![
                StatPrice::new(StatKind::Hp, 10, 2.0),
                StatPrice::new(StatKind::Energy, 15, 2.0),
                StatPrice::new(StatKind::Speed, 20, 1.5),
                StatPrice::new(StatKind::Storage, 25, 2.0),
            ],
            specials: vec![
                SpecialPrice::new(SpecialKind::TrashNet, 50, 20),
                SpecialPrice::new(SpecialKind::IceBreaker, 60, 25),
                SpecialPrice::new(SpecialKind::SpeedBurst, 70, 30),
            ],
        }
    }
}

impl PriceTable {
    /// Checks that every multiplier is finite and not negative.
    pub fn validate(&self) -> Result<()> {
        let stat_multipliers = self.stats.iter().map(|p| (p.stat.name(), p.multiplier));
        let special_multipliers = self.specials.iter().flat_map(|p| {
            [
                (p.special.name(), p.unlock_multiplier),
                (p.special.name(), p.upgrade_multiplier),
            ]
        });
        for (name, m) in stat_multipliers.chain(special_multipliers) {
            if !m.is_finite() || m < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "price multiplier of '{name}' must be finite and >= 0, got {m}"
                )));
            }
        }
        Ok(())
    }
}

/// `ceil(price * multiplier)`, computed in `f32`.
pub fn scale_price(price: u32, multiplier: f32) -> u32 {
    (price as f32 * multiplier).ceil() as u32
}

/// A completed purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Receipt {
    /// Currency paid.
    pub cost: u32,
    /// Price of the next purchase of the same entry.
    pub new_price: u32,
    /// Currency left afterwards.
    pub balance: u32,
}

#[derive(Debug, Clone)]
struct Entry {
    price: u32,
    multiplier: f32,
}

impl Entry {
    fn new(price: u32, multiplier: f32) -> Self {
        Self { price, multiplier }
    }

    fn bump(&mut self) -> u32 {
        self.price = scale_price(self.price, self.multiplier);
        self.price
    }
}

/// Shop state: current prices, scaled after each purchase.
#[derive(Debug, Clone)]
pub struct Shop {
    stats: HashMap<StatKind, Entry>,
    unlocks: HashMap<SpecialKind, Entry>,
    upgrades: HashMap<SpecialKind, Entry>,
}

impl Default for Shop {
    fn default() -> Self {
        Self::new(&PriceTable::default())
    }
}

impl Shop {
    pub fn new(table: &PriceTable) -> Self {
        let stats = table
            .stats
            .iter()
            .map(|p| (p.stat, Entry::new(p.base_price, p.multiplier)))
            .collect();
        let unlocks = table
            .specials
            .iter()
            .map(|p| (p.special, Entry::new(p.unlock_base_price, p.unlock_multiplier)))
            .collect();
        let upgrades = table
            .specials
            .iter()
            .map(|p| (p.special, Entry::new(p.upgrade_base_price, p.upgrade_multiplier)))
            .collect();
        Self {
            stats,
            unlocks,
            upgrades,
        }
    }

    pub fn try_new(table: &PriceTable) -> Result<Self> {
        table.validate()?;
        Ok(Self::new(table))
    }

    pub fn stat_price(&self, stat: StatKind) -> Option<u32> {
        self.stats.get(&stat).map(|e| e.price)
    }

    pub fn unlock_price(&self, special: SpecialKind) -> Option<u32> {
        self.unlocks.get(&special).map(|e| e.price)
    }

    pub fn upgrade_price(&self, special: SpecialKind) -> Option<u32> {
        self.upgrades.get(&special).map(|e| e.price)
    }

    /// Raises `stat` by its increment and pays the current price.
    pub fn increase_stat(
        &mut self,
        stat: StatKind,
        player: &mut PlayerStats,
    ) -> std::result::Result<Receipt, PurchaseError> {
        let entry = self
            .stats
            .get_mut(&stat)
            .ok_or_else(|| PurchaseError::UnknownStat(stat.name().to_owned()))?;
        let cost = entry.price;
        afford(cost, player)?;

        let value = stat.apply(player);
        let receipt = pay(entry, cost, player);
        info!(
            "Increased {} to {} for {}; balance {}, next price {}.",
            stat, value, cost, receipt.balance, receipt.new_price
        );
        Ok(receipt)
    }

    /// Unlocks `special` at level 1.
    pub fn unlock_special(
        &mut self,
        special: SpecialKind,
        player: &mut PlayerStats,
    ) -> std::result::Result<Receipt, PurchaseError> {
        let entry = self
            .unlocks
            .get_mut(&special)
            .ok_or_else(|| PurchaseError::UnknownSpecial(special.name().to_owned()))?;
        if player.is_unlocked(special) {
            return Err(refused(PurchaseError::AlreadyUnlocked(special.name().to_owned())));
        }
        let cost = entry.price;
        afford(cost, player)?;

        let state = player.special_mut(special);
        state.unlocked = true;
        state.level = UnlockLevel::Level1;
        let receipt = pay(entry, cost, player);
        info!(
            "Unlocked {} for {}; balance {}, next unlock price {}.",
            special, cost, receipt.balance, receipt.new_price
        );
        Ok(receipt)
    }

    /// Raises an unlocked `special` by one level, up to level 3.
    pub fn upgrade_special(
        &mut self,
        special: SpecialKind,
        player: &mut PlayerStats,
    ) -> std::result::Result<Receipt, PurchaseError> {
        let entry = self
            .upgrades
            .get_mut(&special)
            .ok_or_else(|| PurchaseError::UnknownSpecial(special.name().to_owned()))?;
        let state = player.special(special);
        if !state.unlocked {
            return Err(refused(PurchaseError::NotUnlocked(special.name().to_owned())));
        }
        let Some(level) = state.level.next() else {
            return Err(refused(PurchaseError::MaxLevel(special.name().to_owned())));
        };
        let cost = entry.price;
        afford(cost, player)?;

        player.special_mut(special).level = level;
        let receipt = pay(entry, cost, player);
        info!(
            "Upgraded {} to level {} for {}; balance {}, next upgrade price {}.",
            special,
            level.number(),
            cost,
            receipt.balance,
            receipt.new_price
        );
        Ok(receipt)
    }

    /// [`Shop::increase_stat`] by name, case-insensitive.
    pub fn increase_stat_named(
        &mut self,
        name: &str,
        player: &mut PlayerStats,
    ) -> std::result::Result<Receipt, PurchaseError> {
        let stat = name.parse::<StatKind>().map_err(refused)?;
        self.increase_stat(stat, player)
    }

    pub fn unlock_special_named(
        &mut self,
        name: &str,
        player: &mut PlayerStats,
    ) -> std::result::Result<Receipt, PurchaseError> {
        let special = name.parse::<SpecialKind>().map_err(refused)?;
        self.unlock_special(special, player)
    }

    pub fn upgrade_special_named(
        &mut self,
        name: &str,
        player: &mut PlayerStats,
    ) -> std::result::Result<Receipt, PurchaseError> {
        let special = name.parse::<SpecialKind>().map_err(refused)?;
        self.upgrade_special(special, player)
    }
}

fn refused(err: PurchaseError) -> PurchaseError {
    warn!("Purchase refused: {}.", err);
    err
}

fn afford(cost: u32, player: &PlayerStats) -> std::result::Result<(), PurchaseError> {
    if player.currency < cost {
        return Err(refused(PurchaseError::InsufficientFunds {
            cost,
            available: player.currency,
        }));
    }
    Ok(())
}

fn pay(entry: &mut Entry, cost: u32, player: &mut PlayerStats) -> Receipt {
    player.currency -= cost;
    Receipt {
        cost,
        new_price: entry.bump(),
        balance: player.currency,
    }
}
