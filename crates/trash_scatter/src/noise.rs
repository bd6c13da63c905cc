//! Scalar fields used to gate placement density.
//!
//! A [`NoiseField`] maps an XZ coordinate to a value in `[0, 1]`. Specs carry an
//! optional threshold; a candidate whose field value is strictly below it is rejected.
use noise::{NoiseFn, Perlin};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Deterministic scalar field over the XZ plane with values in `[0, 1]`.
pub trait NoiseField: Send + Sync {
    fn value(&self, x: f32, z: f32) -> f32;
}

/// Returns true when `value` passes `threshold`.
///
/// Values strictly below the threshold are rejected; equality passes. A missing
/// threshold always passes, as does any comparison against NaN.
#[inline]
pub fn passes_gate(value: f32, threshold: Option<f32>) -> bool {
    match threshold {
        Some(t) => value >= t || value.is_nan() || t.is_nan(),
        None => true,
    }
}

/// Perlin noise remapped from `[-1, 1]` to `[0, 1]`.
#[derive(Clone)]
pub struct PerlinField {
    perlin: Perlin,
    /// Frequency multiplier applied to world coordinates before sampling.
    pub scale: f32,
}

impl PerlinField {
    pub fn new(seed: u32, scale: f32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            scale,
        }
    }

    /// Builds the field described by `settings`.
    pub fn from_settings(settings: &NoiseSettings) -> Self {
        Self::new(settings.seed, settings.scale)
    }
}

impl NoiseField for PerlinField {
    fn value(&self, x: f32, z: f32) -> f32 {
        let sx = (x * self.scale) as f64;
        let sz = (z * self.scale) as f64;
        let raw = self.perlin.get([sx, sz]) as f32;
        ((raw + 1.0) * 0.5).clamp(0.0, 1.0)
    }
}

/// Serializable description of a [`PerlinField`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseSettings {
    pub seed: u32,
    pub scale: f32,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            scale: 0.1,
        }
    }
}

/// Field with the same value everywhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantField(pub f32);

impl NoiseField for ConstantField {
    #[inline]
    fn value(&self, _x: f32, _z: f32) -> f32 {
        self.0
    }
}

/// Field backed by a closure.
pub struct FnField<F>
where
    F: Fn(f32, f32) -> f32 + Send + Sync,
{
    f: F,
}

impl<F> FnField<F>
where
    F: Fn(f32, f32) -> f32 + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> NoiseField for FnField<F>
where
    F: Fn(f32, f32) -> f32 + Send + Sync,
{
    #[inline]
    fn value(&self, x: f32, z: f32) -> f32 {
        (self.f)(x, z)
    }
}
