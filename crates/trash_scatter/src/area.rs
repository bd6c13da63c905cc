//! Placement areas on a horizontal surface and height lookups over them.
//!
//! An area is an axis-aligned rectangle in the XZ plane at a fixed height. Sampled
//! points are 3D (`x`, `height`, `z`); a [`SurfaceHeight`] may replace the fixed
//! height with whatever surface lies under the point.
use glam::{Vec2, Vec3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangular region on a horizontal plane.
///
/// `min`/`max` are XZ corners (the `y` component of a [`Vec2`] holds world `z`).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementArea {
    /// Minimum XZ corner.
    pub min: Vec2,
    /// Maximum XZ corner.
    pub max: Vec2,
    /// World height of the plane.
    pub height: f32,
}

impl PlacementArea {
    /// Creates an area from two corners in any order.
    pub fn new(a: Vec2, b: Vec2, height: f32) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
            height,
        }
    }

    /// Creates an area from its XZ center and full extent.
    pub fn from_center_extent(center: Vec2, extent: Vec2, height: f32) -> Self {
        let half = extent.abs() * 0.5;
        Self::new(center - half, center + half, height)
    }

    /// Full XZ extent.
    pub fn extent(&self) -> Vec2 {
        self.max - self.min
    }

    /// XZ centroid.
    pub fn center_xz(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Centroid at the plane height.
    pub fn center(&self) -> Vec3 {
        let c = self.center_xz();
        Vec3::new(c.x, self.height, c.y)
    }

    /// Inclusive containment test on XZ.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Grows the area by `margin` on every side. Negative margins shrink it but never
    /// past its center.
    pub fn expanded(&self, margin: f32) -> Self {
        let m = Vec2::splat(margin).max(-self.extent() * 0.5);
        Self {
            min: self.min - m,
            max: self.max + m,
            height: self.height,
        }
    }

    /// Clamps an XZ point into the area.
    pub fn clamp(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }

    /// True when a corner is non-finite or the area has no surface.
    pub fn is_degenerate(&self) -> bool {
        !(self.min.is_finite() && self.max.is_finite() && self.height.is_finite())
            || self.extent().x <= 0.0
            || self.extent().y <= 0.0
    }
}

/// Height of the placement surface under an XZ position.
///
/// `None` means the lookup missed; callers fall back to the area height.
pub trait SurfaceHeight: Send + Sync {
    fn height_at(&self, x: f32, z: f32) -> Option<f32>;
}

/// Flat surface: every lookup misses, so the area height is used.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatSurface;

impl SurfaceHeight for FlatSurface {
    #[inline]
    fn height_at(&self, _x: f32, _z: f32) -> Option<f32> {
        None
    }
}

/// Surface height backed by a closure.
pub struct FnSurface<F>
where
    F: Fn(f32, f32) -> Option<f32> + Send + Sync,
{
    f: F,
}

impl<F> FnSurface<F>
where
    F: Fn(f32, f32) -> Option<f32> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> SurfaceHeight for FnSurface<F>
where
    F: Fn(f32, f32) -> Option<f32> + Send + Sync,
{
    #[inline]
    fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        (self.f)(x, z)
    }
}

/// Lifts an XZ point onto the surface, falling back to `area.height` on a miss.
pub(crate) fn lift(p: Vec2, area: &PlacementArea, surface: &dyn SurfaceHeight) -> Vec3 {
    let y = surface
        .height_at(p.x, p.y)
        .filter(|h| h.is_finite())
        .unwrap_or(area.height);
    Vec3::new(p.x, y, p.y)
}
