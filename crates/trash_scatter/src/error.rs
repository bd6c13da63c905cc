//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias.
//! Placement itself never fails; errors come from configuration validation,
//! cargo handling and shop purchases.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid spec '{id}': {reason}")]
    InvalidSpec { id: String, reason: String },

    #[error("storage full ({capacity} items)")]
    StorageFull { capacity: u32 },

    #[error(transparent)]
    Purchase(#[from] PurchaseError),
}

/// Reasons a shop purchase is refused. A refused purchase leaves all state untouched.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseError {
    #[error("unknown stat '{0}'")]
    UnknownStat(String),

    #[error("unknown special '{0}'")]
    UnknownSpecial(String),

    #[error("not enough currency: cost {cost}, available {available}")]
    InsufficientFunds { cost: u32, available: u32 },

    #[error("special '{0}' is already unlocked")]
    AlreadyUnlocked(String),

    #[error("special '{0}' is not unlocked")]
    NotUnlocked(String),

    #[error("special '{0}' is already at max level")]
    MaxLevel(String),
}
