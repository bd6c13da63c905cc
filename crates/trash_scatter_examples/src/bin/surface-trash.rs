use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use trash_scatter::prelude::*;
use trash_scatter_examples::{init_tracing, render_result_to_png, RenderConfig, SpecStyle};

/// Height of the water plane floating trash sits on.
const FLOATING_Y: f32 = 1.95;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let area = PlacementArea::new(Vec2::new(0.0, 0.0), Vec2::new(80.0, 50.0), FLOATING_Y);
    let noise = PerlinField::from_settings(&NoiseSettings {
        seed: 7,
        scale: 0.08,
    });

    let plan = ScatterPlan::new()
        .with_item(ItemSpec::new("bottles", 50).with_noise_threshold(0.5))
        .with_item(ItemSpec::new("bags", 20).with_trash_class(TrashClass::Medium));

    let config = PlacerConfig::new(area).with_global_spacing(3.0);
    let placer = ScatterPlacer::try_new(config, &noise)?;

    let mut sink = VecSink::only(&[ScatterEventKind::ItemPlaced, ScatterEventKind::SamplerFallback]);
    let result = placer.place_with_events(&plan, &mut StdRng::seed_from_u64(7), &mut sink);

    let fallbacks = sink
        .as_slice()
        .iter()
        .filter(|e| e.kind() == ScatterEventKind::SamplerFallback)
        .count();
    tracing::info!(
        "Placed {} floating items ({} forced, {} sampler fallbacks), all at y = {}.",
        result.len(),
        result.forced_items,
        fallbacks,
        FLOATING_Y
    );

    let mut cfg = RenderConfig::new((1000, 625), area).with_background([40, 110, 170]);
    cfg.set_spec_style("bottles", SpecStyle { color: [240, 240, 240], radius: 4 });
    cfg.set_spec_style("bags", SpecStyle { color: [250, 170, 60], radius: 5 });

    render_result_to_png(&result, &cfg, "surface-trash.png")?;
    Ok(())
}
