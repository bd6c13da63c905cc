use std::time::Duration;

use criterion::{Criterion, Throughput};
use glam::Vec2;
use trash_scatter::prelude::{BatchSpec, ItemSpec, PlacementArea, ScatterPlan};

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(2);

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

pub fn square_area(size: f32) -> PlacementArea {
    PlacementArea::new(Vec2::ZERO, Vec2::splat(size), 0.0)
}

/// Floor-like plan: a few batch specs of varying density plus loose items.
pub fn ocean_floor_plan(batches: usize, items: usize) -> ScatterPlan {
    ScatterPlan::new()
        .with_batch(
            BatchSpec::new("bottles", batches, 5)
                .with_radius(3.0)
                .with_spacing(0.8)
                .with_noise_threshold(0.45),
        )
        .with_batch(
            BatchSpec::new("nets", batches / 2, 3)
                .with_radius(4.0)
                .with_spacing(1.5),
        )
        .with_item(ItemSpec::new("tires", items).with_noise_threshold(0.3))
}
