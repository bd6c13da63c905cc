//! Event types and sinks for observing placement runs.
//!
//! This module defines [`ScatterEvent`] and a set of sinks to emit, collect, or
//! forward events while running a [`crate::scatter::spec::ScatterPlan`] through
//! [`crate::scatter::placer::ScatterPlacer`] or [`crate::scatter::parallel::ParallelPlacer`].
use glam::Vec3;

use crate::scatter::placer::{PlacementResult, PlacerConfig};
use crate::scatter::{SpecId, SpecRef};

/// Describes events emitted by placement runs.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum ScatterEvent {
    /// Emitted when a run starts.
    RunStarted {
        /// The configuration used.
        config: PlacerConfig,
        /// Number of batch specs in the plan.
        batch_specs: usize,
        /// Number of item specs in the plan.
        item_specs: usize,
        /// Objects the plan requests in total.
        requested: usize,
    },

    /// Emitted when the whole plan is placed.
    RunFinished {
        /// Aggregated result.
        result: PlacementResult,
    },

    /// Emitted once per placed batch.
    BatchPlaced {
        spec: SpecRef,
        spec_id: SpecId,
        /// Index of this batch within its spec.
        batch: usize,
        center: Vec3,
        /// Number of objects placed around the center.
        count: usize,
        /// True when the retry budget ran out and constraints were ignored.
        forced: bool,
    },

    /// Emitted once per placed individual item.
    ItemPlaced {
        spec: SpecRef,
        spec_id: SpecId,
        position: Vec3,
        forced: bool,
    },

    /// Emitted when the area sampler returned the area centroid.
    SamplerFallback { spec_id: SpecId },

    /// Non-fatal warning generated during placement.
    Warning {
        /// Context string (e.g. spec id).
        context: String,
        /// Human-readable message.
        message: String,
    },
}

impl ScatterEvent {
    pub fn kind(&self) -> ScatterEventKind {
        match self {
            ScatterEvent::RunStarted { .. } => ScatterEventKind::RunStarted,
            ScatterEvent::RunFinished { .. } => ScatterEventKind::RunFinished,
            ScatterEvent::BatchPlaced { .. } => ScatterEventKind::BatchPlaced,
            ScatterEvent::ItemPlaced { .. } => ScatterEventKind::ItemPlaced,
            ScatterEvent::SamplerFallback { .. } => ScatterEventKind::SamplerFallback,
            ScatterEvent::Warning { .. } => ScatterEventKind::Warning,
        }
    }
}

/// Discriminant of [`ScatterEvent`], used by sinks to opt out of event construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScatterEventKind {
    RunStarted,
    RunFinished,
    BatchPlaced,
    ItemPlaced,
    SamplerFallback,
    Warning,
}

/// A generic event sink that accepts [`ScatterEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: ScatterEvent);

    /// Whether events of `kind` should be built and sent at all.
    #[inline]
    fn wants(&self, _kind: ScatterEventKind) -> bool {
        true
    }

    fn send_many<I>(&mut self, events: I)
    where
        Self: Sized,
        I: IntoIterator<Item = ScatterEvent>,
    {
        for e in events {
            self.send(e);
        }
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: ScatterEvent) {}

    #[inline]
    fn wants(&self, _kind: ScatterEventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(ScatterEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(ScatterEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(ScatterEvent),
{
    #[inline]
    fn send(&mut self, event: ScatterEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects events in a `Vec`, optionally only some kinds.
#[derive(Default)]
pub struct VecSink {
    events: Vec<ScatterEvent>,
    only: Option<Vec<ScatterEventKind>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect only events of the listed kinds.
    pub fn only(kinds: &[ScatterEventKind]) -> Self {
        Self {
            events: Vec::new(),
            only: Some(kinds.to_vec()),
        }
    }

    pub fn into_inner(self) -> Vec<ScatterEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[ScatterEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: ScatterEvent) {
        if self.wants(event.kind()) {
            self.events.push(event);
        }
    }

    #[inline]
    fn wants(&self, kind: ScatterEventKind) -> bool {
        self.only.as_ref().is_none_or(|kinds| kinds.contains(&kind))
    }
}

/// Fan-out sink that forwards each event to all contained sinks.
pub struct MultiSink<S: EventSink> {
    pub(crate) sinks: Vec<S>,
}

impl<S: EventSink> MultiSink<S> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with_sinks(sinks: Vec<S>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: S) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn into_inner(self) -> Vec<S> {
        self.sinks
    }
}

impl<S: EventSink> Default for MultiSink<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EventSink> EventSink for MultiSink<S> {
    fn send(&mut self, event: ScatterEvent) {
        let kind = event.kind();
        let mut targets: Vec<usize> = (0..self.sinks.len())
            .filter(|&i| self.sinks[i].wants(kind))
            .collect();
        let Some(last) = targets.pop() else {
            return;
        };
        for i in targets {
            self.sinks[i].send(event.clone());
        }
        self.sinks[last].send(event);
    }

    fn wants(&self, kind: ScatterEventKind) -> bool {
        self.sinks.iter().any(|s| s.wants(kind))
    }
}
