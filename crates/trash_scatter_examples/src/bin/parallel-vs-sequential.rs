use std::time::Instant;

use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use trash_scatter::prelude::*;
use trash_scatter_examples::{init_tracing, render_result_to_png, RenderConfig, SpecStyle};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let area = PlacementArea::new(Vec2::ZERO, Vec2::splat(400.0), 0.0);
    let noise = PerlinField::new(99, 0.05);
    let plan = ScatterPlan::new()
        .with_batch(
            BatchSpec::new("clusters", 150, 6)
                .with_radius(3.0)
                .with_spacing(0.9)
                .with_noise_threshold(0.4),
        )
        .with_item(ItemSpec::new("singles", 2000).with_noise_threshold(0.35));
    let config = PlacerConfig::new(area).with_global_spacing(1.5);

    let sequential = ScatterPlacer::try_new(config.clone(), &noise)?;
    let started = Instant::now();
    let seq = sequential.place(&plan, &mut StdRng::seed_from_u64(5));
    let seq_time = started.elapsed();

    let parallel = ParallelPlacer::try_new(config, &noise)?;
    let started = Instant::now();
    let par = parallel.place(&plan, 5);
    let par_time = started.elapsed();

    tracing::info!(
        "sequential: {} objects ({} forced) in {:?}",
        seq.len(),
        seq.forced_count(),
        seq_time
    );
    tracing::info!(
        "parallel:   {} objects ({} forced) in {:?} with {} cores available",
        par.len(),
        par.forced_count(),
        par_time,
        available_cores()
    );
    anyhow::ensure!(
        seq.len() == plan.requested() && par.len() == plan.requested(),
        "placers must place every requested object"
    );

    for (name, result) in [("sequential", &seq), ("parallel", &par)] {
        let mut cfg = RenderConfig::new((800, 800), area.expanded(3.0));
        cfg.set_spec_style("clusters", SpecStyle { color: [30, 90, 200], radius: 2 });
        cfg.set_spec_style("singles", SpecStyle { color: [60, 60, 60], radius: 1 });
        render_result_to_png(result, &cfg, format!("placement-{name}.png"))?;
    }
    Ok(())
}

fn available_cores() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}
