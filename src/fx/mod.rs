//! The post-process stack.
//!
//! Stages run in a fixed order over the full pixel buffer after compositing:
//! blur, posterize, grain, vignette, overlay, ripple. Each stage gates itself
//! and no-ops on degenerate input, so the stack as a whole is total.

pub mod blur;
pub mod grain;
pub mod overlay;
pub mod ripple;
pub mod tone;

pub use blur::{box_blur, heavy_blur};
pub use grain::film_grain;
pub use overlay::apply_overlay;
pub use ripple::ripple_warp;
pub use tone::{posterize, vignette};

use crate::config::RenderConfig;
use crate::foundation::core::PixelBuffer;
use crate::foundation::math::Rng64;

/// Run the full stack over `buf` in the fixed order.
///
/// `animating` selects the cost-reduced variant: a single blur pass and no
/// vignette, for use between frames of the cooperative animation loop.
#[tracing::instrument(skip(buf, cfg, rng))]
pub fn apply_stack(
    buf: &mut PixelBuffer,
    cfg: &RenderConfig,
    time: f64,
    animating: bool,
    rng: &mut Rng64,
) {
    if buf.is_degenerate() {
        return;
    }

    heavy_blur(buf, animating);
    posterize(buf, cfg.posterize_strength);
    if cfg.noise_intensity > 0.0 {
        film_grain(buf, cfg.noise_intensity, rng);
    }
    if !animating {
        vignette(buf);
    }
    if cfg.overlay.enabled {
        apply_overlay(buf, cfg.overlay.kind, cfg.overlay.intensity, rng);
    }
    if cfg.ripple.enabled {
        ripple_warp(buf, &cfg.ripple, time);
    }
}
