use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use trash_scatter::prelude::{NoiseSettings, PlacerConfig, ScatterPlan};

/// A placement run described in RON: area and spacing, the noise field and the plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScatterScene {
    pub config: PlacerConfig,
    #[serde(default)]
    pub noise: NoiseSettings,
    pub plan: ScatterPlan,
    #[serde(default)]
    pub seed: u64,
}

impl ScatterScene {
    /// Validates the config and every spec of the plan.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.config.validate()?;
        self.plan.validate()?;
        Ok(())
    }
}

/// Reads and validates a [`ScatterScene`] from a RON file.
pub fn load_scene(path: impl AsRef<Path>) -> anyhow::Result<ScatterScene> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let scene: ScatterScene = ron::de::from_bytes(&bytes)
        .map_err(|e| anyhow::anyhow!(e))
        .with_context(|| format!("parsing {}", path.display()))?;
    scene.validate()?;
    Ok(scene)
}
