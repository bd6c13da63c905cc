//! Carried trash and the dock recycler that turns it into currency.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::economy::player::PlayerStats;
use crate::economy::trash::TrashClass;
use crate::error::{Error, Result};

/// Trash on board, bounded by [`PlayerStats::max_storage`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cargo {
    items: Vec<TrashClass>,
}

impl Cargo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads one piece of trash and updates `stats.storage`.
    ///
    /// Fails with [`Error::StorageFull`] when the cargo is at capacity.
    pub fn collect(&mut self, class: TrashClass, stats: &mut PlayerStats) -> Result<()> {
        if self.items.len() >= stats.max_storage as usize {
            return Err(Error::StorageFull {
                capacity: stats.max_storage,
            });
        }
        self.items.push(class);
        stats.storage = self.items.len() as u32;
        debug!(
            "Collected {:?} trash ({}/{}).",
            class, stats.storage, stats.max_storage
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[TrashClass] {
        &self.items
    }

    /// Points the current cargo is worth.
    pub fn value(&self) -> u32 {
        self.items.iter().map(|c| c.points()).sum()
    }
}

/// Outcome of one dock visit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deposit {
    pub items: usize,
    pub points: u32,
}

/// Dock recycler. Keeps running totals across deposits.
#[derive(Debug, Clone, Default)]
pub struct Recycler {
    total_items: usize,
    total_points: u64,
}

impl Recycler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties `cargo` and credits its value to `stats.currency`.
    pub fn deposit(&mut self, cargo: &mut Cargo, stats: &mut PlayerStats) -> Deposit {
        let deposit = Deposit {
            items: cargo.len(),
            points: cargo.value(),
        };
        cargo.items.clear();
        stats.storage = 0;
        stats.currency = stats.currency.saturating_add(deposit.points);

        self.total_items += deposit.items;
        self.total_points += u64::from(deposit.points);

        if deposit.items > 0 {
            info!(
                "Recycled {} items for {} points; balance {}.",
                deposit.items, deposit.points, stats.currency
            );
        }
        deposit
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    pub fn total_points(&self) -> u64 {
        self.total_points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cargo_refuses_trash_beyond_capacity() {
        let mut stats = PlayerStats::new();
        let mut cargo = Cargo::new();
        for _ in 0..5 {
            cargo.collect(TrashClass::Light, &mut stats).expect("space left");
        }
        assert_eq!(stats.storage, 5);
        assert_eq!(stats.free_storage(), 0);

        let err = cargo
            .collect(TrashClass::Heavy, &mut stats)
            .expect_err("cargo is full");
        assert!(matches!(err, Error::StorageFull { capacity: 5 }));
        assert_eq!(cargo.len(), 5);
    }

    #[test]
    fn deposit_converts_points_to_currency() {
        let mut stats = PlayerStats::new();
        stats.adjust_currency(3);
        let mut cargo = Cargo::new();
        for class in TrashClass::ALL {
            cargo.collect(class, &mut stats).expect("space left");
        }

        let mut recycler = Recycler::new();
        let deposit = recycler.deposit(&mut cargo, &mut stats);

        assert_eq!(deposit, Deposit { items: 4, points: 18 });
        assert_eq!(stats.currency, 21);
        assert_eq!(stats.storage, 0);
        assert!(cargo.is_empty());

        let empty = recycler.deposit(&mut cargo, &mut stats);
        assert_eq!(empty, Deposit::default());
        assert_eq!(recycler.total_points(), 18);
        assert_eq!(recycler.total_items(), 4);
    }
}
