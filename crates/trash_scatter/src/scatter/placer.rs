//! Synchronous placer: batches first, then individual items, with forced fallback.
//!
//! Every requested object is placed. A batch or item that cannot satisfy its
//! constraints within the retry budget is force-placed instead, ignoring the
//! noise gate and the overlap checks.
use glam::{Vec2, Vec3};
use rand::Rng as RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::area::{lift, FlatSurface, PlacementArea, SurfaceHeight};
use crate::economy::trash::TrashClass;
use crate::error::{Error, Result};
use crate::noise::{passes_gate, ConstantField, NoiseField};
use crate::sampling::{offset_in_disk, AreaSample, AreaSampler, DEFAULT_MAX_ATTEMPTS};
use crate::scatter::events::{EventSink, ScatterEvent, ScatterEventKind};
use crate::scatter::occupancy::OccupancyIndex;
use crate::scatter::spec::{BatchSpec, ItemSpec, ScatterPlan};
use crate::scatter::{sanitize_distance, SpecId, SpecRef};

static OPEN_FIELD: ConstantField = ConstantField(1.0);
static FLAT: FlatSurface = FlatSurface;

/// A resolved object position tagged with the spec that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub spec: SpecRef,
    pub spec_id: SpecId,
    /// World position; `y` is the surface height or the area height.
    pub position: Vec3,
    /// Batch index within the spec, `None` for individual items.
    pub batch: Option<usize>,
    /// True when constraints were ignored to guarantee the placement.
    pub forced: bool,
    pub pushable: bool,
    pub rotation: Option<Vec3>,
    pub trash_class: TrashClass,
}

impl Placement {
    /// XZ part of the position.
    pub fn xz(&self) -> Vec2 {
        Vec2::new(self.position.x, self.position.z)
    }
}

/// Configuration for running a placement.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct PlacerConfig {
    /// Area batch centers and items are drawn from.
    pub area: PlacementArea,
    /// Minimum distance kept between objects of different batches and items.
    pub global_spacing: f32,
    /// Retry budget for each batch center, each batch item and each individual item.
    pub max_attempts: usize,
}

impl Default for PlacerConfig {
    fn default() -> Self {
        Self {
            area: PlacementArea::new(Vec2::ZERO, Vec2::ZERO, 0.0),
            global_spacing: 2.0,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl PlacerConfig {
    /// Creates a new [`PlacerConfig`] for the given area.
    pub fn new(area: PlacementArea) -> Self {
        Self {
            area,
            ..Default::default()
        }
    }

    pub fn with_global_spacing(mut self, global_spacing: f32) -> Self {
        self.global_spacing = global_spacing;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.area.is_degenerate() {
            return Err(Error::InvalidConfig(
                "area must be finite with a positive extent in x and z".into(),
            ));
        }
        if !self.global_spacing.is_finite() || self.global_spacing < 0.0 {
            return Err(Error::InvalidConfig(
                "global_spacing must be finite and >= 0".into(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(Error::InvalidConfig("max_attempts must be > 0".into()));
        }
        Ok(())
    }
}

/// Result of placing a plan.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlacementResult {
    /// Placements in the order they were made.
    pub placements: Vec<Placement>,
    /// Batch centers and item positions drawn, forced draws included.
    pub candidates_evaluated: usize,
    /// Candidates rejected by the gate, the overlap test or batch spacing.
    pub candidates_rejected: usize,
    pub forced_batches: usize,
    pub forced_items: usize,
    /// Draws for which the area sampler returned the centroid.
    pub sampler_fallbacks: usize,
}

impl PlacementResult {
    /// Creates a new empty [`PlacementResult`].
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.placements.iter().map(|p| p.position)
    }

    /// Placements produced by the spec named `id`.
    pub fn for_spec<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Placement> + 'a {
        self.placements.iter().filter(move |p| p.spec_id == id)
    }

    /// Number of objects placed without their constraints.
    pub fn forced_count(&self) -> usize {
        self.placements.iter().filter(|p| p.forced).count()
    }
}

pub struct ScatterPlacer<'a> {
    /// Configuration applied to this placer.
    pub config: PlacerConfig,
    /// Field consulted by noise gates.
    pub noise: &'a dyn NoiseField,
    /// Height lookup under placed objects.
    pub surface: &'a dyn SurfaceHeight,
}

impl<'a> ScatterPlacer<'a> {
    pub fn try_new(config: PlacerConfig, noise: &'a dyn NoiseField) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            noise,
            surface: &FLAT,
        })
    }

    pub fn new(config: PlacerConfig, noise: &'a dyn NoiseField) -> Self {
        debug_assert!(
            !config.area.is_degenerate(),
            "area must be finite with a positive extent"
        );
        debug_assert!(config.max_attempts > 0, "max_attempts must be > 0");
        Self {
            config,
            noise,
            surface: &FLAT,
        }
    }

    /// Placer without a noise field; every gate sees 1.0 and passes.
    pub fn ungated(config: PlacerConfig) -> Result<ScatterPlacer<'static>> {
        ScatterPlacer::try_new(config, &OPEN_FIELD)
    }

    /// Places objects on `surface` instead of the flat area plane.
    pub fn with_surface(mut self, surface: &'a dyn SurfaceHeight) -> Self {
        self.surface = surface;
        self
    }

    /// Places the plan, returning every placement.
    pub fn place(&self, plan: &ScatterPlan, rng: &mut impl RngCore) -> PlacementResult {
        place_plan(plan, &self.config, self.noise, self.surface, rng, None)
    }

    pub fn place_with_events(
        &self,
        plan: &ScatterPlan,
        rng: &mut impl RngCore,
        sink: &mut dyn EventSink,
    ) -> PlacementResult {
        place_plan(plan, &self.config, self.noise, self.surface, rng, Some(sink))
    }
}

/// Shared, read-only parameters of one run.
pub(crate) struct PlaceContext<'a> {
    pub(crate) config: &'a PlacerConfig,
    pub(crate) sampler: AreaSampler,
    pub(crate) noise: &'a dyn NoiseField,
    pub(crate) surface: &'a dyn SurfaceHeight,
}

impl<'a> PlaceContext<'a> {
    pub(crate) fn new(
        config: &'a PlacerConfig,
        noise: &'a dyn NoiseField,
        surface: &'a dyn SurfaceHeight,
    ) -> Self {
        Self {
            config,
            sampler: AreaSampler::new(config.max_attempts),
            noise,
            surface,
        }
    }

    pub(crate) fn area(&self) -> &PlacementArea {
        &self.config.area
    }

    pub(crate) fn global_spacing(&self) -> f32 {
        sanitize_distance(self.config.global_spacing)
    }

    /// Draws a candidate position and records sampler fallbacks.
    pub(crate) fn draw(
        &self,
        spec_id: &str,
        rng: &mut dyn RngCore,
        result: &mut PlacementResult,
        sink: &mut dyn EventSink,
    ) -> AreaSample {
        let sample = self.sampler.sample_on(self.area(), rng, self.surface);
        result.candidates_evaluated += 1;
        if sample.used_fallback {
            result.sampler_fallbacks += 1;
            warn!("Spec '{}': no valid position in area; using its center.", spec_id);
            if sink.wants(ScatterEventKind::SamplerFallback) {
                sink.send(ScatterEvent::SamplerFallback {
                    spec_id: spec_id.to_owned(),
                });
            }
        }
        sample
    }

    pub(crate) fn gate_open(&self, p: Vec2, threshold: Option<f32>) -> bool {
        threshold.is_none() || passes_gate(self.noise.value(p.x, p.y), threshold)
    }

    pub(crate) fn lift(&self, p: Vec2) -> Vec3 {
        lift(p, self.area(), self.surface)
    }
}

/// Generates the XZ positions of one batch around `center`.
///
/// Each item gets `max_attempts` tries to keep `spacing` to the items already accepted.
/// Without `force`, one exhausted item abandons the batch (`None`); with `force` the
/// last candidate is accepted anyway, so the result is always `Some`.
pub(crate) fn batch_offsets(
    center: Vec2,
    spec: &BatchSpec,
    max_attempts: usize,
    force: bool,
    rng: &mut dyn RngCore,
) -> Option<Vec<Vec2>> {
    let radius = sanitize_distance(spec.batch_radius);
    let spacing2 = sanitize_distance(spec.spacing).powi(2);
    let mut positions: Vec<Vec2> = Vec::with_capacity(spec.items_per_batch);

    for _ in 0..spec.items_per_batch {
        let mut last = center;
        let mut accepted = false;
        for _ in 0..max_attempts.max(1) {
            let candidate = center + offset_in_disk(rng, radius);
            last = candidate;
            if positions
                .iter()
                .all(|q| q.distance_squared(candidate) >= spacing2)
            {
                positions.push(candidate);
                accepted = true;
                break;
            }
        }
        if !accepted {
            if !force {
                return None;
            }
            positions.push(last);
        }
    }

    Some(positions)
}

pub(crate) fn batch_placements(
    ctx: &PlaceContext<'_>,
    spec_ref: SpecRef,
    spec: &BatchSpec,
    batch: usize,
    offsets: &[Vec2],
    forced: bool,
) -> Vec<Placement> {
    offsets
        .iter()
        .map(|&p| Placement {
            spec: spec_ref,
            spec_id: spec.id.clone(),
            position: ctx.lift(p),
            batch: Some(batch),
            forced,
            pushable: spec.pushable,
            rotation: spec.rotation,
            trash_class: spec.trash_class,
        })
        .collect()
}

pub(crate) fn item_placement(
    ctx: &PlaceContext<'_>,
    spec_ref: SpecRef,
    spec: &ItemSpec,
    p: Vec2,
    forced: bool,
) -> Placement {
    Placement {
        spec: spec_ref,
        spec_id: spec.id.clone(),
        position: ctx.lift(p),
        batch: None,
        forced,
        pushable: false,
        rotation: spec.rotation,
        trash_class: spec.trash_class,
    }
}

struct RunState<'s> {
    occupancy: OccupancyIndex,
    result: PlacementResult,
    sink: &'s mut dyn EventSink,
}

impl RunState<'_> {
    fn commit(&mut self, placements: Vec<Placement>) {
        for p in &placements {
            self.occupancy.insert(p.xz());
        }
        if placements.first().is_some_and(|p| p.forced) {
            if placements[0].batch.is_some() {
                self.result.forced_batches += 1;
            } else {
                self.result.forced_items += 1;
            }
        }
        self.result.placements.extend(placements);
    }
}

fn place_batch(
    ctx: &PlaceContext<'_>,
    spec_ref: SpecRef,
    spec: &BatchSpec,
    batch: usize,
    rng: &mut dyn RngCore,
    state: &mut RunState<'_>,
) {
    let max_attempts = ctx.config.max_attempts;
    let clearance = sanitize_distance(spec.batch_radius) + ctx.global_spacing();

    for _ in 0..max_attempts {
        let center = ctx.draw(&spec.id, rng, &mut state.result, state.sink);
        let c = center.xz();

        if !ctx.gate_open(c, spec.noise_threshold) {
            state.result.candidates_rejected += 1;
            continue;
        }

        if state.occupancy.any_within(c, clearance) {
            state.result.candidates_rejected += 1;
            continue;
        }

        let Some(offsets) = batch_offsets(c, spec, max_attempts, false, rng) else {
            state.result.candidates_rejected += 1;
            continue;
        };

        emit_batch(state.sink, spec_ref, spec, batch, center.position, offsets.len(), false);
        state.commit(batch_placements(ctx, spec_ref, spec, batch, &offsets, false));
        return;
    }

    warn!(
        "Failed to place batch {} of '{}' after {} attempts; forcing placement.",
        batch, spec.id, max_attempts
    );
    let center = ctx.draw(&spec.id, rng, &mut state.result, state.sink);
    let offsets = batch_offsets(center.xz(), spec, max_attempts, true, rng).unwrap_or_default();
    emit_batch(state.sink, spec_ref, spec, batch, center.position, offsets.len(), true);
    state.commit(batch_placements(ctx, spec_ref, spec, batch, &offsets, true));
}

fn place_item(
    ctx: &PlaceContext<'_>,
    spec_ref: SpecRef,
    spec: &ItemSpec,
    rng: &mut dyn RngCore,
    state: &mut RunState<'_>,
) {
    let spacing = ctx.global_spacing();

    for _ in 0..ctx.config.max_attempts {
        let candidate = ctx.draw(&spec.id, rng, &mut state.result, state.sink);
        let p = candidate.xz();

        if !ctx.gate_open(p, spec.noise_threshold) || state.occupancy.any_within(p, spacing) {
            state.result.candidates_rejected += 1;
            continue;
        }

        let placement = item_placement(ctx, spec_ref, spec, p, false);
        emit_item(state.sink, &placement);
        state.commit(vec![placement]);
        return;
    }

    warn!(
        "Failed to place item '{}' after {} attempts; forcing placement.",
        spec.id, ctx.config.max_attempts
    );
    let candidate = ctx.draw(&spec.id, rng, &mut state.result, state.sink);
    let placement = item_placement(ctx, spec_ref, spec, candidate.xz(), true);
    emit_item(state.sink, &placement);
    state.commit(vec![placement]);
}

pub(crate) fn emit_batch(
    sink: &mut dyn EventSink,
    spec_ref: SpecRef,
    spec: &BatchSpec,
    batch: usize,
    center: Vec3,
    count: usize,
    forced: bool,
) {
    if sink.wants(ScatterEventKind::BatchPlaced) {
        sink.send(ScatterEvent::BatchPlaced {
            spec: spec_ref,
            spec_id: spec.id.clone(),
            batch,
            center,
            count,
            forced,
        });
    }
}

pub(crate) fn emit_item(sink: &mut dyn EventSink, placement: &Placement) {
    if sink.wants(ScatterEventKind::ItemPlaced) {
        sink.send(ScatterEvent::ItemPlaced {
            spec: placement.spec,
            spec_id: placement.spec_id.clone(),
            position: placement.position,
            forced: placement.forced,
        });
    }
}

pub(crate) fn emit_run_started(
    sink: &mut dyn EventSink,
    config: &PlacerConfig,
    plan: &ScatterPlan,
) {
    if sink.wants(ScatterEventKind::RunStarted) {
        sink.send(ScatterEvent::RunStarted {
            config: config.clone(),
            batch_specs: plan.batches.len(),
            item_specs: plan.items.len(),
            requested: plan.requested(),
        });
    }

    if plan.is_empty() {
        warn!("Scatter plan has no specs.");
        if sink.wants(ScatterEventKind::Warning) {
            sink.send(ScatterEvent::Warning {
                context: "plan".into(),
                message: "Scatter plan has no specs".into(),
            });
        }
    }
}

pub(crate) fn emit_run_finished(sink: &mut dyn EventSink, result: &PlacementResult) {
    if sink.wants(ScatterEventKind::RunFinished) {
        sink.send(ScatterEvent::RunFinished {
            result: result.clone(),
        });
    }
}

/// Places `plan` in `config.area`: all batch specs in order, then all item specs.
pub fn place_plan<R: RngCore>(
    plan: &ScatterPlan,
    config: &PlacerConfig,
    noise: &dyn NoiseField,
    surface: &dyn SurfaceHeight,
    rng: &mut R,
    sink: Option<&mut dyn EventSink>,
) -> PlacementResult {
    if let Some(s) = sink {
        place_plan_with_events(plan, config, noise, surface, rng, s)
    } else {
        place_plan_with_events(plan, config, noise, surface, rng, &mut ())
    }
}

pub fn place_plan_with_events<R: RngCore>(
    plan: &ScatterPlan,
    config: &PlacerConfig,
    noise: &dyn NoiseField,
    surface: &dyn SurfaceHeight,
    rng: &mut R,
    sink: &mut dyn EventSink,
) -> PlacementResult {
    let ctx = PlaceContext::new(config, noise, surface);
    emit_run_started(sink, config, plan);
    info!(
        "Placing {} batch specs and {} item specs ({} objects).",
        plan.batches.len(),
        plan.items.len(),
        plan.requested()
    );

    let mut state = RunState {
        occupancy: OccupancyIndex::new(ctx.global_spacing().max(1.0)),
        result: PlacementResult {
            placements: Vec::with_capacity(plan.requested()),
            ..Default::default()
        },
        sink,
    };

    for (idx, spec) in plan.batches.iter().enumerate() {
        if spec.requested() == 0 {
            debug!("Batch spec '{}' requests nothing; skipping.", spec.id);
            continue;
        }
        for batch in 0..spec.batch_count {
            place_batch(&ctx, SpecRef::Batch(idx), spec, batch, rng, &mut state);
        }
    }

    for (idx, spec) in plan.items.iter().enumerate() {
        for _ in 0..spec.count {
            place_item(&ctx, SpecRef::Item(idx), spec, rng, &mut state);
        }
    }

    let result = state.result;
    if result.forced_batches + result.forced_items > 0 {
        info!(
            "Placed {} objects ({} forced batches, {} forced items).",
            result.len(),
            result.forced_batches,
            result.forced_items
        );
    }
    emit_run_finished(state.sink, &result);
    result
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::area::FnSurface;
    use crate::noise::FnField;
    use crate::scatter::events::VecSink;

    fn square(size: f32) -> PlacementArea {
        PlacementArea::new(Vec2::ZERO, Vec2::splat(size), 0.0)
    }

    fn pairwise_min_distance(points: &[Vec2]) -> f32 {
        let mut min = f32::MAX;
        for i in 0..points.len() {
            for j in (i + 1)..points.len() {
                min = min.min(points[i].distance(points[j]));
            }
        }
        min
    }

    #[test]
    fn single_batch_scenario_respects_radius_and_spacing() {
        let placer = ScatterPlacer::ungated(PlacerConfig::new(square(10.0))).expect("valid config");
        let plan = ScatterPlan::new().with_batch(
            BatchSpec::new("bottles", 1, 3)
                .with_radius(2.0)
                .with_spacing(1.0)
                .with_noise_threshold(0.0),
        );

        let mut rng = StdRng::seed_from_u64(2025);
        let result = placer.place(&plan, &mut rng);

        assert_eq!(result.len(), 3);
        let bounds = square(10.0).expanded(2.0);
        let pts: Vec<Vec2> = result.placements.iter().map(Placement::xz).collect();
        for p in &pts {
            assert!(bounds.contains(*p), "{p} outside expanded bounds");
        }
        assert!(result.placements.iter().all(|p| !p.forced));
        assert!(pairwise_min_distance(&pts) >= 1.0);
    }

    #[test]
    fn second_item_is_forced_when_spacing_cannot_be_met() {
        let config = PlacerConfig::new(square(1.0)).with_global_spacing(5.0);
        let placer = ScatterPlacer::ungated(config).expect("valid config");
        let plan = ScatterPlan::new()
            .with_item(ItemSpec::new("can", 1))
            .with_item(ItemSpec::new("bag", 1));

        let mut rng = StdRng::seed_from_u64(1);
        let result = placer.place(&plan, &mut rng);

        assert_eq!(result.len(), 2);
        assert!(!result.placements[0].forced);
        assert!(result.placements[1].forced);
        assert_eq!(result.forced_items, 1);
        assert_eq!(result.placements[1].spec, SpecRef::Item(1));
        assert_eq!(result.candidates_rejected, 100);
    }

    #[test]
    fn zero_counts_generate_nothing() {
        let placer = ScatterPlacer::ungated(PlacerConfig::new(square(10.0))).expect("valid config");
        let plan = ScatterPlan::new()
            .with_batch(BatchSpec::new("no_batches", 0, 5))
            .with_batch(BatchSpec::new("empty_batches", 4, 0))
            .with_item(ItemSpec::new("no_items", 0));

        let mut rng = StdRng::seed_from_u64(3);
        let mut sink = VecSink::new();
        let result = placer.place_with_events(&plan, &mut rng, &mut sink);

        assert!(result.is_empty());
        assert_eq!(result.candidates_evaluated, 0);
        assert!(!sink
            .as_slice()
            .iter()
            .any(|e| matches!(e, ScatterEvent::BatchPlaced { .. } | ScatterEvent::ItemPlaced { .. })));
    }

    #[test]
    fn fixed_seed_is_deterministic() {
        let noise = crate::noise::PerlinField::new(4, 0.1);
        let config = PlacerConfig::new(square(60.0)).with_global_spacing(2.0);
        let placer = ScatterPlacer::try_new(config, &noise).expect("valid config");
        let plan = ScatterPlan::new()
            .with_batch(BatchSpec::new("coral", 4, 5).with_noise_threshold(0.4))
            .with_item(ItemSpec::new("starfish", 12).with_noise_threshold(0.5));

        let a = placer.place(&plan, &mut StdRng::seed_from_u64(77));
        let b = placer.place(&plan, &mut StdRng::seed_from_u64(77));
        let c = placer.place(&plan, &mut StdRng::seed_from_u64(78));

        assert_eq!(a, b);
        assert_eq!(a.len(), plan.requested());
        assert_ne!(a.placements, c.placements);
    }

    #[test]
    fn accepted_batches_keep_intra_batch_spacing() {
        let config = PlacerConfig::new(square(80.0)).with_global_spacing(1.0);
        let placer = ScatterPlacer::ungated(config).expect("valid config");
        let plan = ScatterPlan::new().with_batch(
            BatchSpec::new("nets", 6, 6).with_radius(3.0).with_spacing(1.2),
        );

        let result = placer.place(&plan, &mut StdRng::seed_from_u64(10));
        assert_eq!(result.len(), 36);

        for batch in 0..6 {
            let members: Vec<&Placement> = result
                .placements
                .iter()
                .filter(|p| p.batch == Some(batch))
                .collect();
            assert_eq!(members.len(), 6);
            if members[0].forced {
                continue;
            }
            let pts: Vec<Vec2> = members.iter().map(|p| p.xz()).collect();
            assert!(pairwise_min_distance(&pts) >= 1.2);
        }
    }

    #[test]
    fn impossible_batch_spacing_forces_placement_with_full_count() {
        let placer = ScatterPlacer::ungated(PlacerConfig::new(square(10.0)).with_max_attempts(20))
            .expect("valid config");
        // Five items with spacing 3 cannot fit into a disk of radius 0.5.
        let plan = ScatterPlan::new().with_batch(
            BatchSpec::new("cramped", 2, 5).with_radius(0.5).with_spacing(3.0),
        );

        let mut sink = VecSink::only(&[ScatterEventKind::BatchPlaced]);
        let result = placer.place_with_events(&plan, &mut StdRng::seed_from_u64(8), &mut sink);

        assert_eq!(result.len(), 10);
        assert_eq!(result.forced_batches, 2);
        let bounds = square(10.0).expanded(0.5);
        assert!(result.placements.iter().all(|p| p.forced && bounds.contains(p.xz())));
        assert_eq!(sink.len(), 2);
        assert!(sink
            .as_slice()
            .iter()
            .all(|e| matches!(e, ScatterEvent::BatchPlaced { forced: true, count: 5, .. })));
    }

    #[test]
    fn closed_noise_gate_forces_every_batch_and_item() {
        let closed = ConstantField(0.2);
        let placer = ScatterPlacer::try_new(PlacerConfig::new(square(20.0)), &closed)
            .expect("valid config");
        let plan = ScatterPlan::new()
            .with_batch(BatchSpec::new("coral", 2, 2).with_noise_threshold(0.7))
            .with_item(ItemSpec::new("starfish", 3).with_noise_threshold(0.5));

        let result = placer.place(&plan, &mut StdRng::seed_from_u64(4));
        assert_eq!(result.len(), 7);
        assert_eq!(result.forced_batches, 2);
        assert_eq!(result.forced_items, 3);
        assert_eq!(result.forced_count(), 7);
    }

    #[test]
    fn threshold_equal_to_noise_value_is_accepted() {
        let field = ConstantField(0.5);
        let placer = ScatterPlacer::try_new(PlacerConfig::new(square(30.0)), &field)
            .expect("valid config");
        let plan = ScatterPlan::new()
            .with_batch(BatchSpec::new("edge", 1, 2).with_noise_threshold(0.5))
            .with_item(ItemSpec::new("edge_item", 1).with_noise_threshold(0.5));

        let result = placer.place(&plan, &mut StdRng::seed_from_u64(12));
        assert_eq!(result.forced_count(), 0);
    }

    #[test]
    fn noise_gate_restricts_accepted_centers() {
        // Only the right half of the area is open.
        let half = FnField::new(|x, _z| if x >= 50.0 { 1.0 } else { 0.0 });
        let config = PlacerConfig::new(square(100.0)).with_global_spacing(0.5);
        let placer = ScatterPlacer::try_new(config, &half).expect("valid config");
        let plan = ScatterPlan::new().with_item(ItemSpec::new("bottle", 40).with_noise_threshold(0.5));

        let result = placer.place(&plan, &mut StdRng::seed_from_u64(21));
        assert_eq!(result.len(), 40);
        for p in result.placements.iter().filter(|p| !p.forced) {
            assert!(p.position.x >= 50.0);
        }
    }

    #[test]
    fn later_batches_keep_clear_of_earlier_objects() {
        let config = PlacerConfig::new(square(100.0)).with_global_spacing(2.0);
        let placer = ScatterPlacer::ungated(config).expect("valid config");
        let plan = ScatterPlan::new()
            .with_batch(BatchSpec::new("a", 3, 3).with_radius(2.0).with_spacing(0.5))
            .with_item(ItemSpec::new("b", 5));

        let result = placer.place(&plan, &mut StdRng::seed_from_u64(99));
        assert_eq!(result.forced_count(), 0);

        let items: Vec<Vec2> = result.for_spec("b").map(Placement::xz).collect();
        let batched: Vec<&Placement> = result.for_spec("a").collect();
        for item in &items {
            for other in &batched {
                assert!(item.distance(other.xz()) >= 2.0);
            }
        }
    }

    #[test]
    fn items_are_never_pushable_and_batches_carry_spec_flags() {
        let placer = ScatterPlacer::ungated(PlacerConfig::new(square(40.0))).expect("valid config");
        let plan = ScatterPlan::new()
            .with_batch(
                BatchSpec::new("drift", 1, 2)
                    .with_pushable(true)
                    .with_trash_class(TrashClass::Medium),
            )
            .with_item(ItemSpec::new("tire", 1).with_trash_class(TrashClass::SuperHeavy));

        let result = placer.place(&plan, &mut StdRng::seed_from_u64(5));
        let drift: Vec<_> = result.for_spec("drift").collect();
        assert!(drift.iter().all(|p| p.pushable && p.trash_class == TrashClass::Medium));
        let tire = result.for_spec("tire").next().expect("tire placed");
        assert!(!tire.pushable);
        assert_eq!(tire.trash_class, TrashClass::SuperHeavy);
        assert_eq!(tire.batch, None);
    }

    #[test]
    fn placements_follow_surface_height() {
        let floor = FnSurface::new(|x, z| Some(-10.0 + 0.1 * x + 0.05 * z));
        let placer = ScatterPlacer::ungated(PlacerConfig::new(square(20.0)))
            .expect("valid config")
            .with_surface(&floor);
        let plan = ScatterPlan::new()
            .with_batch(BatchSpec::new("coral", 1, 3))
            .with_item(ItemSpec::new("shell", 2));

        let result = placer.place(&plan, &mut StdRng::seed_from_u64(6));
        for p in &result.placements {
            let expected = -10.0 + 0.1 * p.position.x + 0.05 * p.position.z;
            assert!((p.position.y - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn run_events_bracket_placements() {
        let placer = ScatterPlacer::ungated(PlacerConfig::new(square(30.0))).expect("valid config");
        let plan = ScatterPlan::new()
            .with_batch(BatchSpec::new("a", 2, 2))
            .with_item(ItemSpec::new("b", 3));

        let mut sink = VecSink::new();
        let result = placer.place_with_events(&plan, &mut StdRng::seed_from_u64(13), &mut sink);
        let events = sink.into_inner();

        assert!(matches!(
            events.first(),
            Some(ScatterEvent::RunStarted { requested: 7, .. })
        ));
        assert!(matches!(
            events.last(),
            Some(ScatterEvent::RunFinished { result: r }) if r.len() == result.len()
        ));
        let batches = events
            .iter()
            .filter(|e| e.kind() == ScatterEventKind::BatchPlaced)
            .count();
        let items = events
            .iter()
            .filter(|e| e.kind() == ScatterEventKind::ItemPlaced)
            .count();
        assert_eq!((batches, items), (2, 3));
    }

    #[test]
    fn empty_plan_warns() {
        let placer = ScatterPlacer::ungated(PlacerConfig::new(square(5.0))).expect("valid config");
        let mut sink = VecSink::only(&[ScatterEventKind::Warning]);
        let result = placer.place_with_events(&ScatterPlan::new(), &mut StdRng::seed_from_u64(0), &mut sink);
        assert!(result.is_empty());
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn config_validation() {
        assert!(PlacerConfig::default().validate().is_err());
        assert!(PlacerConfig::new(square(5.0)).validate().is_ok());
        assert!(PlacerConfig::new(square(5.0))
            .with_global_spacing(-1.0)
            .validate()
            .is_err());
        assert!(PlacerConfig::new(square(5.0))
            .with_max_attempts(0)
            .validate()
            .is_err());
        assert!(matches!(
            ScatterPlacer::ungated(PlacerConfig::default()),
            Err(Error::InvalidConfig(_))
        ));
    }
}
