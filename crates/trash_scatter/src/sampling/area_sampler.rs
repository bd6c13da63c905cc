//! Bounds-constrained uniform sampler with a centroid fallback.
use glam::{Vec2, Vec3};
use rand::Rng as RngCore;
use tracing::debug;

use crate::area::{lift, FlatSurface, PlacementArea, SurfaceHeight};
use crate::sampling::rand_range;

/// Retry budget used by the sampler and the placers unless configured otherwise.
pub const DEFAULT_MAX_ATTEMPTS: usize = 100;

/// A sampled point and whether the retry budget ran out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaSample {
    /// Point at the area height (or the surface height under it).
    pub position: Vec3,
    /// True when no valid candidate was found and the area centroid was returned.
    pub used_fallback: bool,
}

impl AreaSample {
    /// XZ part of the position.
    pub fn xz(&self) -> Vec2 {
        Vec2::new(self.position.x, self.position.z)
    }
}

/// Uniform sampler over a [`PlacementArea`].
#[derive(Debug, Clone, Copy)]
pub struct AreaSampler {
    /// Candidates drawn before falling back to the centroid.
    pub max_attempts: usize,
}

impl Default for AreaSampler {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl AreaSampler {
    pub fn new(max_attempts: usize) -> Self {
        Self { max_attempts }
    }

    /// Draws a uniform point inside `area`.
    pub fn sample(&self, area: &PlacementArea, rng: &mut dyn RngCore) -> AreaSample {
        self.sample_where(area, rng, &FlatSurface, |_| true)
    }

    /// Draws a uniform point and places it on `surface`.
    pub fn sample_on(
        &self,
        area: &PlacementArea,
        rng: &mut dyn RngCore,
        surface: &dyn SurfaceHeight,
    ) -> AreaSample {
        self.sample_where(area, rng, surface, |_| true)
    }

    /// Draws points until one lies inside `area` and satisfies `accept`.
    ///
    /// When the budget is exhausted the area centroid is returned, at the plane height,
    /// with [`AreaSample::used_fallback`] set.
    pub fn sample_where<F>(
        &self,
        area: &PlacementArea,
        rng: &mut dyn RngCore,
        surface: &dyn SurfaceHeight,
        mut accept: F,
    ) -> AreaSample
    where
        F: FnMut(Vec2) -> bool,
    {
        for _ in 0..self.max_attempts {
            let x = rand_range(rng, area.min.x, area.max.x);
            let z = rand_range(rng, area.min.y, area.max.y);
            let candidate = Vec2::new(x, z);
            if area.contains(candidate) && accept(candidate) {
                return AreaSample {
                    position: lift(candidate, area, surface),
                    used_fallback: false,
                };
            }
        }

        debug!(
            "No valid position within {} attempts; using area center.",
            self.max_attempts
        );
        AreaSample {
            position: area.center(),
            used_fallback: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::area::FnSurface;

    fn area() -> PlacementArea {
        PlacementArea::new(Vec2::new(-3.0, 2.0), Vec2::new(5.0, 8.0), 1.95)
    }

    #[test]
    fn samples_lie_within_bounds_at_plane_height() {
        let mut rng = StdRng::seed_from_u64(42);
        let sampler = AreaSampler::default();
        for _ in 0..1000 {
            let s = sampler.sample(&area(), &mut rng);
            assert!(!s.used_fallback);
            assert!(area().contains(s.xz()));
            assert_eq!(s.position.y, 1.95);
        }
    }

    #[test]
    fn exhausted_budget_returns_exact_centroid() {
        let mut rng = StdRng::seed_from_u64(5);
        let sampler = AreaSampler::new(25);
        let s = sampler.sample_where(&area(), &mut rng, &FlatSurface, |_| false);
        assert!(s.used_fallback);
        assert_eq!(s.position, Vec3::new(1.0, 1.95, 5.0));
    }

    #[test]
    fn zero_budget_falls_back_immediately() {
        let mut rng = StdRng::seed_from_u64(5);
        let s = AreaSampler::new(0).sample(&area(), &mut rng);
        assert!(s.used_fallback);
        assert_eq!(s.position, area().center());
    }

    #[test]
    fn non_finite_area_falls_back_to_centroid() {
        let mut rng = StdRng::seed_from_u64(5);
        let broken = PlacementArea {
            min: Vec2::new(0.0, 0.0),
            max: Vec2::new(f32::NAN, 4.0),
            height: 0.0,
        };
        let s = AreaSampler::new(10).sample(&broken, &mut rng);
        assert!(s.used_fallback);
    }

    #[test]
    fn predicate_restricts_accepted_region() {
        let mut rng = StdRng::seed_from_u64(11);
        let sampler = AreaSampler::default();
        for _ in 0..200 {
            let s = sampler.sample_where(&area(), &mut rng, &FlatSurface, |p| p.x > 3.0);
            assert!(s.used_fallback || s.position.x > 3.0);
        }
    }

    #[test]
    fn surface_height_replaces_plane_height() {
        let mut rng = StdRng::seed_from_u64(3);
        let floor = FnSurface::new(|x, z| Some(-(x + z)));
        let s = AreaSampler::default().sample_on(&area(), &mut rng, &floor);
        assert_eq!(s.position.y, -(s.position.x + s.position.z));
    }

    #[test]
    fn same_seed_yields_same_points() {
        let sampler = AreaSampler::default();
        let mut a = StdRng::seed_from_u64(123);
        let mut b = StdRng::seed_from_u64(123);
        let pa: Vec<_> = (0..32).map(|_| sampler.sample(&area(), &mut a)).collect();
        let pb: Vec<_> = (0..32).map(|_| sampler.sample(&area(), &mut b)).collect();
        assert_eq!(pa, pb);
    }
}
