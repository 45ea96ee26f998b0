//! Tonal stages: posterization and the corner vignette.

use crate::foundation::core::PixelBuffer;
use crate::foundation::math::{lerp, smoothstep};

/// Discrete levels per channel when posterizing.
const POSTERIZE_STEPS: u32 = 6;
/// Peak darkening at the far corner.
const VIGNETTE_STRENGTH: f64 = 0.10;

/// Round each channel to [`POSTERIZE_STEPS`] levels, then blend `strength`
/// of the quantized value back over the original. The default configuration
/// keeps this near-transparent (5%), but the strength is a first-class
/// parameter.
pub fn posterize(buf: &mut PixelBuffer, strength: f64) {
    let strength = strength.clamp(0.0, 1.0);
    if buf.is_degenerate() || strength <= 0.0 {
        return;
    }

    let levels = f64::from(POSTERIZE_STEPS - 1);
    for px in buf.data.chunks_exact_mut(4) {
        for c in &mut px[..3] {
            let v = f64::from(*c) / 255.0;
            let q = (v * levels).round() / levels;
            *c = (lerp(v, q, strength) * 255.0).round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Radial darkening: transparent through the center and mid-field, reaching
/// 10% black at the far corner. Skipped by the stack mid-animation.
pub fn vignette(buf: &mut PixelBuffer) {
    if buf.is_degenerate() {
        return;
    }

    let (w, h) = (f64::from(buf.width), f64::from(buf.height));
    let (cx, cy) = (w / 2.0, h / 2.0);
    let corner = (cx * cx + cy * cy).sqrt();

    for y in 0..buf.height {
        for x in 0..buf.width {
            let dx = f64::from(x) + 0.5 - cx;
            let dy = f64::from(y) + 0.5 - cy;
            let t = (dx * dx + dy * dy).sqrt() / corner;
            let dark = smoothstep(0.55, 1.0, t) * VIGNETTE_STRENGTH;
            if dark <= 0.0 {
                continue;
            }
            let mut px = buf.get(x, y);
            for c in &mut px[..3] {
                *c = (f64::from(*c) * (1.0 - dark)).round() as u8;
            }
            buf.put(x, y, px);
        }
    }
}
