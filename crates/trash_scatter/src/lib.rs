#![forbid(unsafe_code)]
//! trash_scatter: constrained procedural placement of trash, plus the recycling economy.
//!
//! Modules:
//! - area: rectangular placement areas and surface height lookups
//! - noise: scalar fields used to gate placement density
//! - sampling: bounds-constrained random sampling
//! - scatter: batch/item specs, the placer, the parallel placer, events
//! - economy: trash classes, player stats, cargo, recycling and the upgrade shop
pub mod area;
pub mod economy;
pub mod error;
pub mod noise;
pub mod sampling;
pub mod scatter;

/// Convenient re-exports for common types. Import with `use trash_scatter::prelude::*;`.
pub mod prelude {
    pub use crate::area::{FlatSurface, FnSurface, PlacementArea, SurfaceHeight};
    pub use crate::economy::player::{PlayerStats, SpecialKind, SpecialState, UnlockLevel};
    pub use crate::economy::recycler::{Cargo, Deposit, Recycler};
    pub use crate::economy::shop::{
        scale_price, PriceTable, Receipt, Shop, SpecialPrice, StatKind, StatPrice,
    };
    pub use crate::economy::trash::TrashClass;
    pub use crate::error::{Error, PurchaseError, Result};
    pub use crate::noise::{
        passes_gate, ConstantField, FnField, NoiseField, NoiseSettings, PerlinField,
    };
    pub use crate::sampling::{AreaSample, AreaSampler};
    pub use crate::scatter::events::{
        EventSink, FnSink, MultiSink, ScatterEvent, ScatterEventKind, VecSink,
    };
    pub use crate::scatter::parallel::{seed_for_job, ParallelPlacer};
    pub use crate::scatter::placer::{
        place_plan, Placement, PlacementResult, PlacerConfig, ScatterPlacer,
    };
    pub use crate::scatter::spec::{BatchSpec, ItemSpec, ScatterPlan};
    pub use crate::scatter::{SpecId, SpecRef};
}
