use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use trash_scatter::prelude::*;
use trash_scatter_examples::{init_tracing, render_result_to_png, RenderConfig, SpecStyle};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let area = PlacementArea::from_center_extent(Vec2::ZERO, Vec2::new(120.0, 120.0), -8.0);
    // Gently rolling seabed; a trench in the middle misses and falls back to the plane.
    let seabed = FnSurface::new(|x: f32, z: f32| {
        if x.abs() < 4.0 {
            None
        } else {
            Some(-8.0 + 0.6 * (x * 0.05).sin() + 0.4 * (z * 0.07).cos())
        }
    });
    let noise = PerlinField::new(1337, 0.1);

    let plan = ScatterPlan::new()
        .with_batch(
            BatchSpec::new("bottles", 10, 5)
                .with_radius(3.0)
                .with_spacing(0.8)
                .with_noise_threshold(0.45),
        )
        .with_batch(
            BatchSpec::new("nets", 4, 2)
                .with_radius(4.0)
                .with_spacing(2.5)
                .with_pushable(true)
                .with_trash_class(TrashClass::Heavy),
        )
        .with_item(
            ItemSpec::new("tires", 12)
                .with_noise_threshold(0.3)
                .with_rotation(Vec3::new(-90.0, 0.0, 0.0))
                .with_trash_class(TrashClass::SuperHeavy),
        )
        .with_item(ItemSpec::new("cans", 30).with_trash_class(TrashClass::Medium));
    plan.validate()?;

    let config = PlacerConfig::new(area).with_global_spacing(2.0);
    let placer = ScatterPlacer::try_new(config, &noise)?.with_surface(&seabed);

    let mut forced = 0usize;
    let mut sink = FnSink::new(|event| match event {
        ScatterEvent::BatchPlaced { forced: true, .. } | ScatterEvent::ItemPlaced { forced: true, .. } => {
            forced += 1
        }
        _ => {}
    });
    let mut rng = StdRng::seed_from_u64(42);
    let result = placer.place_with_events(&plan, &mut rng, &mut sink);

    tracing::info!(
        "Placed {}/{} objects: {} forced events, {} candidates evaluated, {} rejected.",
        result.len(),
        plan.requested(),
        forced,
        result.candidates_evaluated,
        result.candidates_rejected
    );

    let mut cfg = RenderConfig::new((960, 960), area.expanded(4.0))
        .with_background([15, 45, 80])
        .with_area_outline([120, 160, 200], area);
    cfg.set_spec_style("bottles", SpecStyle { color: [120, 230, 160], radius: 3 });
    cfg.set_spec_style("nets", SpecStyle { color: [240, 200, 80], radius: 5 });
    cfg.set_spec_style("tires", SpecStyle { color: [20, 20, 20], radius: 6 });
    cfg.set_spec_style("cans", SpecStyle { color: [200, 200, 210], radius: 3 });

    render_result_to_png(&result, &cfg, "ocean-floor.png")?;
    Ok(())
}
