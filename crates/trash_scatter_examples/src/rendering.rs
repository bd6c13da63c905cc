use std::collections::HashMap;
use std::path::Path;

use glam::Vec2;
use image::{Rgb, RgbImage};
use trash_scatter::prelude::{PlacementArea, PlacementResult};
use tracing_subscriber::EnvFilter;

/// Installs a compact `tracing` subscriber. `RUST_LOG` overrides the default `info` level.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}

/// How placements of one spec are drawn.
#[derive(Debug, Clone, Copy)]
pub struct SpecStyle {
    pub color: [u8; 3],
    /// Disk radius in pixels.
    pub radius: u32,
}

impl Default for SpecStyle {
    fn default() -> Self {
        Self {
            color: [40, 40, 40],
            radius: 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub image_size: (u32, u32),
    /// World rectangle mapped onto the image.
    pub view: PlacementArea,
    pub background: [u8; 3],
    /// Outline color of the placement area, `None` to skip it.
    pub area_outline: Option<([u8; 3], PlacementArea)>,
    /// Ring drawn around forced placements, `None` to skip it.
    pub forced_marker: Option<[u8; 3]>,
    styles: HashMap<String, SpecStyle>,
}

impl RenderConfig {
    pub fn new(image_size: (u32, u32), view: PlacementArea) -> Self {
        Self {
            image_size,
            view,
            background: [255, 255, 255],
            area_outline: None,
            forced_marker: Some([220, 30, 30]),
            styles: HashMap::new(),
        }
    }

    pub fn with_background(mut self, background: [u8; 3]) -> Self {
        self.background = background;
        self
    }

    pub fn with_area_outline(mut self, color: [u8; 3], area: PlacementArea) -> Self {
        self.area_outline = Some((color, area));
        self
    }

    pub fn set_spec_style(&mut self, spec_id: impl Into<String>, style: SpecStyle) {
        self.styles.insert(spec_id.into(), style);
    }

    fn style(&self, spec_id: &str) -> SpecStyle {
        self.styles.get(spec_id).copied().unwrap_or_default()
    }

    /// Pixel position of a world XZ point; `None` when it falls outside the image.
    fn to_pixel(&self, p: Vec2) -> Option<(i64, i64)> {
        let extent = self.view.extent();
        if extent.x <= 0.0 || extent.y <= 0.0 {
            return None;
        }
        let uv = (p - self.view.min) / extent;
        let (w, h) = self.image_size;
        let x = (uv.x * w as f32).floor() as i64;
        // Image rows grow downwards, world z grows upwards.
        let y = ((1.0 - uv.y) * h as f32).floor() as i64;
        Some((x, y))
    }
}

fn put(img: &mut RgbImage, x: i64, y: i64, color: [u8; 3]) {
    if x >= 0 && y >= 0 && x < img.width() as i64 && y < img.height() as i64 {
        img.put_pixel(x as u32, y as u32, Rgb(color));
    }
}

fn fill_disk(img: &mut RgbImage, cx: i64, cy: i64, radius: u32, color: [u8; 3]) {
    let r = radius as i64;
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy <= r * r {
                put(img, cx + dx, cy + dy, color);
            }
        }
    }
}

fn ring(img: &mut RgbImage, cx: i64, cy: i64, radius: u32, color: [u8; 3]) {
    let r = radius as i64;
    let inner = (r - 1).max(0);
    for dy in -r..=r {
        for dx in -r..=r {
            let d2 = dx * dx + dy * dy;
            if d2 <= r * r && d2 > inner * inner {
                put(img, cx + dx, cy + dy, color);
            }
        }
    }
}

fn outline(img: &mut RgbImage, cfg: &RenderConfig, area: &PlacementArea, color: [u8; 3]) {
    let (Some((x0, y1)), Some((x1, y0))) = (cfg.to_pixel(area.min), cfg.to_pixel(area.max)) else {
        return;
    };
    for x in x0..=x1 {
        put(img, x, y0, color);
        put(img, x, y1, color);
    }
    for y in y0..=y1 {
        put(img, x0, y, color);
        put(img, x1, y, color);
    }
}

/// Draws every placement of `result` as a disk and writes the image to `path`.
pub fn render_result_to_png(
    result: &PlacementResult,
    cfg: &RenderConfig,
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let (w, h) = cfg.image_size;
    let mut img = RgbImage::from_pixel(w, h, Rgb(cfg.background));

    if let Some((color, area)) = &cfg.area_outline {
        outline(&mut img, cfg, area, *color);
    }

    for placement in &result.placements {
        let Some((x, y)) = cfg.to_pixel(placement.xz()) else {
            continue;
        };
        let style = cfg.style(&placement.spec_id);
        fill_disk(&mut img, x, y, style.radius, style.color);
        if placement.forced {
            if let Some(marker) = cfg.forced_marker {
                ring(&mut img, x, y, style.radius + 2, marker);
            }
        }
    }

    img.save(path.as_ref())?;
    tracing::info!(
        "Wrote {} placements to {}.",
        result.len(),
        path.as_ref().display()
    );
    Ok(())
}
