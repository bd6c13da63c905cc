#![forbid(unsafe_code)]

mod rendering;
mod scene;

pub use rendering::{init_tracing, render_result_to_png, RenderConfig, SpecStyle};
pub use scene::{load_scene, ScatterScene};
