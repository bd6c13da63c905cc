//! Placement pipeline: specs, the synchronous and parallel placers, occupancy, events.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod events;
pub mod occupancy;
pub mod parallel;
pub mod placer;
pub mod spec;

pub type SpecId = String;

/// Index of the spec that produced a placement within its [`spec::ScatterPlan`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecRef {
    /// Index into [`spec::ScatterPlan::batches`].
    Batch(usize),
    /// Index into [`spec::ScatterPlan::items`].
    Item(usize),
}

impl SpecRef {
    pub fn is_batch(&self) -> bool {
        matches!(self, SpecRef::Batch(_))
    }
}

/// Clamps a spec distance to a finite, non-negative value.
#[inline]
pub(crate) fn sanitize_distance(value: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}
