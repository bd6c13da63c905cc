//! Random sampling primitives for placement.
//!
//! [`AreaSampler`] draws uniformly distributed points from a [`crate::area::PlacementArea`]
//! with a bounded retry budget; the free helpers draw offsets inside disks.
use glam::Vec2;
use rand::Rng as RngCore;

pub mod area_sampler;

pub use area_sampler::{AreaSample, AreaSampler, DEFAULT_MAX_ATTEMPTS};

/// Generate a random float in the range [0, 1).
#[inline]
pub(crate) fn rand01(rng: &mut dyn RngCore) -> f32 {
    (rng.next_u32() as f32) / ((u32::MAX as f32) + 1.0)
}

/// Generate a random float in `[lo, hi]`.
///
/// Never panics on non-finite bounds; the result then fails any containment test.
#[inline]
pub(crate) fn rand_range(rng: &mut dyn RngCore, lo: f32, hi: f32) -> f32 {
    (lo + rand01(rng) * (hi - lo)).max(lo).min(hi)
}

/// Uniform random offset inside a disk of `radius` around the origin.
#[inline]
pub(crate) fn offset_in_disk(rng: &mut dyn RngCore, radius: f32) -> Vec2 {
    let r = radius.max(0.0) * rand01(rng).sqrt();
    let theta = core::f32::consts::TAU * rand01(rng);
    Vec2::new(r * theta.cos(), r * theta.sin())
}
