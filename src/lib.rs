//! Gradix is a deterministic procedural gradient synthesizer.
//!
//! It paints abstract gradient backgrounds from a small palette and runs the
//! result through a fixed pixel-space post-process stack, producing both a
//! live low-resolution preview and a pixel-faithful high-resolution export.
//!
//! # Pipeline overview
//!
//! 1. **Extract** (optional): cluster an uploaded image into dominant color
//!    regions, yielding a snapped brand palette plus positioned blobs.
//! 2. **Plan**: `RenderConfig -> ShapePlan`, a resolution-independent
//!    composition in normalized coordinates.
//! 3. **Paint**: rasterize the plan at the target dimensions; output is
//!    always fully opaque.
//! 4. **Post-process**: blur, posterize, grain, vignette, overlay/glitch,
//!    ripple, in that fixed order.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic-by-default**: shape placement derives from the config
//!   seed through a fixed generator; only explicit accent shapes and glitch
//!   geometry use the separate accent stream.
//! - **Resolution independence**: plans carry no pixel dimensions, so the
//!   same composition renders proportionally identically at preview size and
//!   export size.
//! - **Total stages**: every pipeline stage no-ops on degenerate input; the
//!   render loop never panics.
#![forbid(unsafe_code)]

pub mod compose;
pub mod config;
pub mod export;
pub mod extract;
pub mod foundation;
pub mod fx;
pub mod palette;
pub mod surface;

pub use compose::{
    BlendMode, SHAPE_MODE_CYCLE, SUNBURST_MODE_CYCLE, Shape, ShapeGeom, ShapePlan, build_plan,
    compose, mode_for_shape, paint_plan,
};
pub use config::{
    AnimationConfig, GradientStyle, OverlayConfig, OverlayKind, RenderConfig, RippleConfig,
};
pub use export::{
    ExportPreset, export_dimensions, export_filename, export_to_dir, render_export, save_jpeg,
};
pub use extract::analyze::{Suggestion, analyze_composition};
pub use extract::regions::{Extraction, extract_palette};
pub use foundation::core::{AspectRatio, Canvas, PixelBuffer};
pub use foundation::error::{GradixError, GradixResult};
pub use foundation::math::Rng64;
pub use fx::{apply_overlay, apply_stack, box_blur, film_grain, heavy_blur, posterize, ripple_warp, vignette};
pub use palette::brand::{brand_colors, mid_tone_palette, nearest_brand};
pub use palette::{Color, ColorBlob};
pub use surface::{BASE_DIM, DEBUG_FILL, Surface, render_pipeline};
