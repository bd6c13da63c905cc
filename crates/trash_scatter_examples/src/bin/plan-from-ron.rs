use rand::rngs::StdRng;
use rand::SeedableRng;
use trash_scatter::prelude::*;
use trash_scatter_examples::{init_tracing, load_scene, render_result_to_png, RenderConfig};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let path = std::env::args().nth(1).unwrap_or_else(|| {
        format!("{}/plans/ocean_floor.ron", env!("CARGO_MANIFEST_DIR"))
    });
    let scene = load_scene(&path)?;
    tracing::info!(
        "Loaded '{}': {} batch specs, {} item specs.",
        path,
        scene.plan.batches.len(),
        scene.plan.items.len()
    );

    let noise = PerlinField::from_settings(&scene.noise);
    let placer = ScatterPlacer::try_new(scene.config.clone(), &noise)?;
    let result = placer.place(&scene.plan, &mut StdRng::seed_from_u64(scene.seed));

    for (idx, spec) in scene.plan.batches.iter().enumerate() {
        let count = result
            .placements
            .iter()
            .filter(|p| p.spec == SpecRef::Batch(idx))
            .count();
        tracing::info!("  batch '{}': {} objects", spec.id, count);
    }
    for spec in &scene.plan.items {
        tracing::info!("  item '{}': {} objects", spec.id, result.for_spec(&spec.id).count());
    }

    let area = scene.config.area;
    let cfg = RenderConfig::new((800, 800), area.expanded(4.0))
        .with_area_outline([160, 160, 160], area);
    render_result_to_png(&result, &cfg, "plan-from-ron.png")?;
    Ok(())
}
