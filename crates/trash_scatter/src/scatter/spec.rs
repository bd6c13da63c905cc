//! Batch and item descriptors and the plan that orders them.
use glam::Vec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::economy::trash::TrashClass;
use crate::error::{Error, Result};
use crate::scatter::SpecId;

/// A group of clustered objects sharing a center and an intra-batch spacing rule.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSpec {
    /// Name used to tag placements.
    pub id: SpecId,
    /// Objects generated around each batch center.
    pub items_per_batch: usize,
    /// Number of batches to place.
    pub batch_count: usize,
    /// Radius around the center in which batch objects are placed.
    pub batch_radius: f32,
    /// Minimum distance between two objects of the same batch.
    pub spacing: f32,
    /// Noise gate threshold for batch centers; `None` disables the gate.
    pub noise_threshold: Option<f32>,
    /// Whether the spawned objects can be pushed around by the player.
    pub pushable: bool,
    /// Custom Euler rotation in degrees; `None` keeps the surface default.
    pub rotation: Option<Vec3>,
    /// Economy value of each spawned object.
    pub trash_class: TrashClass,
}

impl Default for BatchSpec {
    fn default() -> Self {
        Self {
            id: SpecId::new(),
            items_per_batch: 3,
            batch_count: 1,
            batch_radius: 2.0,
            spacing: 1.0,
            noise_threshold: None,
            pushable: false,
            rotation: None,
            trash_class: TrashClass::default(),
        }
    }
}

impl BatchSpec {
    /// Create a batch spec with `batch_count` batches of `items_per_batch` objects.
    pub fn new(id: impl Into<SpecId>, batch_count: usize, items_per_batch: usize) -> Self {
        Self {
            id: id.into(),
            batch_count,
            items_per_batch,
            ..Default::default()
        }
    }

    pub fn with_radius(mut self, batch_radius: f32) -> Self {
        self.batch_radius = batch_radius;
        self
    }

    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_noise_threshold(mut self, threshold: f32) -> Self {
        self.noise_threshold = Some(threshold);
        self
    }

    pub fn with_pushable(mut self, pushable: bool) -> Self {
        self.pushable = pushable;
        self
    }

    pub fn with_rotation(mut self, euler_degrees: Vec3) -> Self {
        self.rotation = Some(euler_degrees);
        self
    }

    pub fn with_trash_class(mut self, class: TrashClass) -> Self {
        self.trash_class = class;
        self
    }

    /// Total number of objects this spec requests.
    pub fn requested(&self) -> usize {
        self.batch_count.saturating_mul(self.items_per_batch)
    }

    pub fn validate(&self) -> Result<()> {
        check_distance(&self.id, "batch_radius", self.batch_radius)?;
        check_distance(&self.id, "spacing", self.spacing)?;
        check_threshold(&self.id, self.noise_threshold)
    }
}

/// Independent objects checked only against the global spacing.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSpec {
    pub id: SpecId,
    /// Number of objects to place.
    pub count: usize,
    pub noise_threshold: Option<f32>,
    pub rotation: Option<Vec3>,
    pub trash_class: TrashClass,
}

impl Default for ItemSpec {
    fn default() -> Self {
        Self {
            id: SpecId::new(),
            count: 1,
            noise_threshold: None,
            rotation: None,
            trash_class: TrashClass::default(),
        }
    }
}

impl ItemSpec {
    pub fn new(id: impl Into<SpecId>, count: usize) -> Self {
        Self {
            id: id.into(),
            count,
            ..Default::default()
        }
    }

    pub fn with_noise_threshold(mut self, threshold: f32) -> Self {
        self.noise_threshold = Some(threshold);
        self
    }

    pub fn with_rotation(mut self, euler_degrees: Vec3) -> Self {
        self.rotation = Some(euler_degrees);
        self
    }

    pub fn with_trash_class(mut self, class: TrashClass) -> Self {
        self.trash_class = class;
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_threshold(&self.id, self.noise_threshold)
    }
}

/// Ordered batches and items. Batches are always placed before items.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Default, PartialEq)]
#[non_exhaustive]
pub struct ScatterPlan {
    pub batches: Vec<BatchSpec>,
    pub items: Vec<ItemSpec>,
}

impl ScatterPlan {
    /// Create a new empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_batch(mut self, batch: BatchSpec) -> Self {
        self.batches.push(batch);
        self
    }

    pub fn with_item(mut self, item: ItemSpec) -> Self {
        self.items.push(item);
        self
    }

    pub fn with_batches(mut self, batches: Vec<BatchSpec>) -> Self {
        self.batches.extend(batches);
        self
    }

    pub fn with_items(mut self, items: Vec<ItemSpec>) -> Self {
        self.items.extend(items);
        self
    }

    /// Total number of objects the plan requests.
    pub fn requested(&self) -> usize {
        self.batches
            .iter()
            .map(BatchSpec::requested)
            .chain(self.items.iter().map(|i| i.count))
            .fold(0, usize::saturating_add)
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty() && self.items.is_empty()
    }

    /// Checks every spec. Placement tolerates invalid values, this is for authoring.
    pub fn validate(&self) -> Result<()> {
        for b in &self.batches {
            b.validate()?;
        }
        for i in &self.items {
            i.validate()?;
        }
        Ok(())
    }
}

fn check_distance(id: &str, field: &str, value: f32) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidSpec {
            id: id.to_owned(),
            reason: format!("{field} must be finite and >= 0, got {value}"),
        });
    }
    Ok(())
}

fn check_threshold(id: &str, threshold: Option<f32>) -> Result<()> {
    match threshold {
        Some(t) if t.is_nan() => Err(Error::InvalidSpec {
            id: id.to_owned(),
            reason: "noise_threshold must not be NaN".into(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_builder_sets_optional_fields() {
        let spec = BatchSpec::new("coral", 4, 5)
            .with_radius(3.0)
            .with_spacing(0.5)
            .with_noise_threshold(0.7)
            .with_pushable(true)
            .with_rotation(Vec3::new(-90.0, 0.0, 0.0))
            .with_trash_class(TrashClass::Heavy);

        assert_eq!(spec.id, "coral");
        assert_eq!(spec.requested(), 20);
        assert_eq!(spec.noise_threshold, Some(0.7));
        assert!(spec.pushable);
        assert_eq!(spec.rotation, Some(Vec3::new(-90.0, 0.0, 0.0)));
        assert_eq!(spec.trash_class, TrashClass::Heavy);
    }

    #[test]
    fn plan_counts_requested_objects() {
        let plan = ScatterPlan::new()
            .with_batch(BatchSpec::new("a", 2, 3))
            .with_batch(BatchSpec::new("b", 0, 9))
            .with_item(ItemSpec::new("c", 4));
        assert_eq!(plan.requested(), 10);
        assert!(!plan.is_empty());
        assert!(ScatterPlan::new().is_empty());
    }

    #[test]
    fn requested_saturates_on_huge_counts() {
        let plan = ScatterPlan::new()
            .with_batch(BatchSpec::new("a", usize::MAX, 2))
            .with_item(ItemSpec::new("b", usize::MAX))
            .with_item(ItemSpec::new("c", 1));
        assert_eq!(plan.requested(), usize::MAX);
    }

    #[test]
    fn validate_rejects_negative_radius_and_nan_threshold() {
        let bad_radius = ScatterPlan::new().with_batch(BatchSpec::new("a", 1, 1).with_radius(-1.0));
        assert!(matches!(
            bad_radius.validate(),
            Err(Error::InvalidSpec { ref id, .. }) if id == "a"
        ));

        let bad_gate = ScatterPlan::new().with_item(ItemSpec::new("b", 1).with_noise_threshold(f32::NAN));
        assert!(bad_gate.validate().is_err());

        let ok = ScatterPlan::new()
            .with_batch(BatchSpec::new("a", 1, 1))
            .with_item(ItemSpec::new("b", 1).with_noise_threshold(0.5));
        assert!(ok.validate().is_ok());
    }
}
