//! Parallel placer running one job per batch instance and per item instance.
//!
//! Jobs share an [`AtomicOccupancyGrid`]. A job only commits after it won every cell
//! its clearance disk touches, so two accepted objects from different jobs always keep
//! the global spacing. Forced jobs stack onto the grid without checks.
//!
//! Every job draws from its own RNG seeded with [`seed_for_job`]. Results are collected
//! in job order. Output is reproducible for a fixed seed as long as no two jobs compete
//! for the same cells; under contention the winner depends on scheduling.
use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::area::{FlatSurface, SurfaceHeight};
use crate::error::Result;
use crate::noise::NoiseField;
use crate::scatter::events::{EventSink, ScatterEvent, ScatterEventKind};
use crate::scatter::occupancy::AtomicOccupancyGrid;
use crate::scatter::placer::{
    batch_offsets, batch_placements, emit_batch, emit_item, emit_run_finished, emit_run_started,
    item_placement, PlaceContext, Placement, PlacementResult, PlacerConfig,
};
use crate::scatter::spec::{BatchSpec, ItemSpec, ScatterPlan};
use crate::scatter::{sanitize_distance, SpecRef};

static FLAT: FlatSurface = FlatSurface;

/// Derives the RNG seed of job `job` from `base_seed`.
pub fn seed_for_job(base_seed: u64, job: usize) -> u64 {
    let j = job as u64;
    let mixed = base_seed ^ j.wrapping_mul(0x9E3779B97F4A7C15) ^ 0xBF58476D1CE4E5B9;
    mix_u64(mixed)
}

#[inline]
fn mix_u64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xBF58476D1CE4E5B9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94D049BB133111EB);
    x ^ (x >> 31)
}

#[derive(Clone, Copy)]
enum Job<'p> {
    Batch {
        spec_ref: SpecRef,
        spec: &'p BatchSpec,
        batch: usize,
    },
    Item {
        spec_ref: SpecRef,
        spec: &'p ItemSpec,
    },
}

impl<'p> Job<'p> {
    fn spec_id(&self) -> &'p str {
        match self {
            Job::Batch { spec, .. } => &spec.id,
            Job::Item { spec, .. } => &spec.id,
        }
    }
}

fn jobs_for(plan: &ScatterPlan) -> Vec<Job<'_>> {
    let mut jobs = Vec::with_capacity(plan.requested());
    for (idx, spec) in plan.batches.iter().enumerate() {
        if spec.items_per_batch == 0 {
            continue;
        }
        for batch in 0..spec.batch_count {
            jobs.push(Job::Batch {
                spec_ref: SpecRef::Batch(idx),
                spec,
                batch,
            });
        }
    }
    for (idx, spec) in plan.items.iter().enumerate() {
        for _ in 0..spec.count {
            jobs.push(Job::Item {
                spec_ref: SpecRef::Item(idx),
                spec,
            });
        }
    }
    jobs
}

struct JobOutcome {
    placements: Vec<Placement>,
    /// Batch center, `None` for items.
    center: Option<Vec3>,
    forced: bool,
    stats: PlacementResult,
}

struct Shared<'c> {
    ctx: PlaceContext<'c>,
    grid: AtomicOccupancyGrid,
}

impl Shared<'_> {
    fn run(&self, job: Job<'_>, seed: u64) -> JobOutcome {
        let mut rng = StdRng::seed_from_u64(seed);
        match job {
            Job::Batch {
                spec_ref,
                spec,
                batch,
            } => self.run_batch(spec_ref, spec, batch, &mut rng),
            Job::Item { spec_ref, spec } => self.run_item(spec_ref, spec, &mut rng),
        }
    }

    fn run_batch(
        &self,
        spec_ref: SpecRef,
        spec: &BatchSpec,
        batch: usize,
        rng: &mut StdRng,
    ) -> JobOutcome {
        let ctx = &self.ctx;
        let max_attempts = ctx.config.max_attempts;
        let claim_radius = sanitize_distance(spec.batch_radius) + 0.5 * ctx.global_spacing();
        let mut stats = PlacementResult::default();

        for _ in 0..max_attempts {
            let center = ctx.draw(&spec.id, rng, &mut stats, &mut ());
            let c = center.xz();

            if !ctx.gate_open(c, spec.noise_threshold) {
                stats.candidates_rejected += 1;
                continue;
            }

            let Some(claim) = self.grid.try_claim(c, claim_radius) else {
                stats.candidates_rejected += 1;
                continue;
            };

            match batch_offsets(c, spec, max_attempts, false, rng) {
                Some(offsets) => {
                    return JobOutcome {
                        placements: batch_placements(ctx, spec_ref, spec, batch, &offsets, false),
                        center: Some(center.position),
                        forced: false,
                        stats,
                    };
                }
                None => {
                    self.grid.release(claim);
                    stats.candidates_rejected += 1;
                }
            }
        }

        warn!(
            "Failed to place batch {} of '{}' after {} attempts; forcing placement.",
            batch, spec.id, max_attempts
        );
        let center = ctx.draw(&spec.id, rng, &mut stats, &mut ());
        self.grid.force_claim(center.xz(), claim_radius);
        let offsets = batch_offsets(center.xz(), spec, max_attempts, true, rng).unwrap_or_default();
        stats.forced_batches = 1;
        JobOutcome {
            placements: batch_placements(ctx, spec_ref, spec, batch, &offsets, true),
            center: Some(center.position),
            forced: true,
            stats,
        }
    }

    fn run_item(&self, spec_ref: SpecRef, spec: &ItemSpec, rng: &mut StdRng) -> JobOutcome {
        let ctx = &self.ctx;
        let claim_radius = 0.5 * ctx.global_spacing();
        let mut stats = PlacementResult::default();

        for _ in 0..ctx.config.max_attempts {
            let candidate = ctx.draw(&spec.id, rng, &mut stats, &mut ());
            let p = candidate.xz();

            if !ctx.gate_open(p, spec.noise_threshold) {
                stats.candidates_rejected += 1;
                continue;
            }
            if self.grid.try_claim(p, claim_radius).is_none() {
                stats.candidates_rejected += 1;
                continue;
            }

            return JobOutcome {
                placements: vec![item_placement(ctx, spec_ref, spec, p, false)],
                center: None,
                forced: false,
                stats,
            };
        }

        warn!(
            "Failed to place item '{}' after {} attempts; forcing placement.",
            spec.id, ctx.config.max_attempts
        );
        let candidate = ctx.draw(&spec.id, rng, &mut stats, &mut ());
        self.grid.force_claim(candidate.xz(), claim_radius);
        stats.forced_items = 1;
        JobOutcome {
            placements: vec![item_placement(ctx, spec_ref, spec, candidate.xz(), true)],
            center: None,
            forced: true,
            stats,
        }
    }
}

/// Places a [`ScatterPlan`] on the current rayon thread pool.
///
/// Run inside [`rayon::ThreadPool::install`] to choose the pool.
pub struct ParallelPlacer<'a> {
    pub config: PlacerConfig,
    pub noise: &'a dyn NoiseField,
    pub surface: &'a dyn SurfaceHeight,
}

impl<'a> ParallelPlacer<'a> {
    pub fn try_new(config: PlacerConfig, noise: &'a dyn NoiseField) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            noise,
            surface: &FLAT,
        })
    }

    pub fn with_surface(mut self, surface: &'a dyn SurfaceHeight) -> Self {
        self.surface = surface;
        self
    }

    pub fn place(&self, plan: &ScatterPlan, base_seed: u64) -> PlacementResult {
        self.place_with_events(plan, base_seed, &mut ())
    }

    /// Places the plan; events are sent from the calling thread after all jobs finished.
    pub fn place_with_events(
        &self,
        plan: &ScatterPlan,
        base_seed: u64,
        sink: &mut dyn EventSink,
    ) -> PlacementResult {
        emit_run_started(sink, &self.config, plan);

        let jobs = jobs_for(plan);
        let shared = Shared {
            ctx: PlaceContext::new(&self.config, self.noise, self.surface),
            grid: AtomicOccupancyGrid::new(&self.config.area, grid_cell_size(&self.config)),
        };
        info!(
            "Placing {} jobs on {} threads ({} objects).",
            jobs.len(),
            rayon::current_num_threads(),
            plan.requested()
        );

        let outcomes: Vec<JobOutcome> = jobs
            .par_iter()
            .enumerate()
            .map(|(i, job)| shared.run(*job, seed_for_job(base_seed, i)))
            .collect();

        let mut result = PlacementResult {
            placements: Vec::with_capacity(plan.requested()),
            ..Default::default()
        };
        for (job, outcome) in jobs.iter().zip(outcomes) {
            for _ in 0..outcome.stats.sampler_fallbacks {
                if sink.wants(ScatterEventKind::SamplerFallback) {
                    sink.send(ScatterEvent::SamplerFallback {
                        spec_id: job.spec_id().to_owned(),
                    });
                }
            }
            match *job {
                Job::Batch {
                    spec_ref,
                    spec,
                    batch,
                } => emit_batch(
                    sink,
                    spec_ref,
                    spec,
                    batch,
                    outcome.center.unwrap_or_default(),
                    outcome.placements.len(),
                    outcome.forced,
                ),
                Job::Item { .. } => {
                    for p in &outcome.placements {
                        emit_item(sink, p);
                    }
                }
            }

            result.candidates_evaluated += outcome.stats.candidates_evaluated;
            result.candidates_rejected += outcome.stats.candidates_rejected;
            result.sampler_fallbacks += outcome.stats.sampler_fallbacks;
            result.forced_batches += outcome.stats.forced_batches;
            result.forced_items += outcome.stats.forced_items;
            result.placements.extend(outcome.placements);
        }

        emit_run_finished(sink, &result);
        result
    }
}

/// Grid cells match the global spacing; a spacing of zero falls back to unit cells.
fn grid_cell_size(config: &PlacerConfig) -> f32 {
    let spacing = sanitize_distance(config.global_spacing);
    if spacing > 0.0 {
        spacing
    } else {
        1.0
    }
}
