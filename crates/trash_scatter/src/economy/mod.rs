//! Trash economy: point values, player stats, cargo, recycling and the upgrade shop.
pub mod player;
pub mod recycler;
pub mod shop;
pub mod trash;
