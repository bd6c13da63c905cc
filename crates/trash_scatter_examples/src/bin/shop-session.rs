use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use trash_scatter::prelude::*;
use trash_scatter_examples::init_tracing;

/// Plays a few dock visits: collect scattered trash, recycle it, spend the points.
fn main() -> anyhow::Result<()> {
    init_tracing();

    let area = PlacementArea::new(Vec2::ZERO, Vec2::splat(60.0), 1.95);
    let plan = ScatterPlan::new()
        .with_batch(BatchSpec::new("bottles", 4, 4).with_trash_class(TrashClass::Light))
        .with_item(ItemSpec::new("bags", 10).with_trash_class(TrashClass::Medium))
        .with_item(ItemSpec::new("tires", 6).with_trash_class(TrashClass::Heavy))
        .with_item(ItemSpec::new("fridges", 2).with_trash_class(TrashClass::SuperHeavy));
    let placer = ScatterPlacer::ungated(PlacerConfig::new(area).with_global_spacing(2.0))?;
    let result = placer.place(&plan, &mut StdRng::seed_from_u64(3));

    let mut player = PlayerStats::new();
    let mut cargo = Cargo::new();
    let mut recycler = Recycler::new();
    let mut shop = Shop::try_new(&PriceTable::default())?;

    // Orders purchases by preference; the shop skips what the player cannot afford.
    let wishlist: [(&str, &str); 5] = [
        ("stat", "storage"),
        ("unlock", "TrashNet"),
        ("stat", "hp"),
        ("upgrade", "trashnet"),
        ("stat", "speed"),
    ];

    let mut remaining = result.placements.iter().peekable();
    let mut visit = 0;
    loop {
        while let Some(placement) = remaining.peek() {
            if let Err(err) = cargo.collect(placement.trash_class, &mut player) {
                tracing::info!("{err}; heading to the dock.");
                break;
            }
            remaining.next();
        }
        if cargo.is_empty() {
            break;
        }

        visit += 1;
        let deposit = recycler.deposit(&mut cargo, &mut player);
        tracing::info!(
            "Visit {visit}: recycled {} items for {} points.",
            deposit.items,
            deposit.points
        );

        for (action, name) in wishlist {
            let outcome = match action {
                "stat" => shop.increase_stat_named(name, &mut player),
                "unlock" => shop.unlock_special_named(name, &mut player),
                _ => shop.upgrade_special_named(name, &mut player),
            };
            if let Ok(receipt) = outcome {
                tracing::info!(
                    "  bought {action} {name} for {}; {} left.",
                    receipt.cost,
                    receipt.balance
                );
            }
        }
    }

    tracing::info!(
        "Done after {visit} visits: {} points recycled. hp {}, speed {}, storage {}, trashnet {:?}.",
        recycler.total_points(),
        player.hp,
        player.speed,
        player.max_storage,
        player.special(SpecialKind::TrashNet)
    );
    Ok(())
}
