//! Per-pixel compositing modes.
//!
//! The compositor rotates blend modes across shapes so that no single palette
//! color dominates regardless of luminance. The rotation is an explicit
//! enum-indexed table; shape index 0 always composites plain so the opaque
//! base fill shows through untinted.

/// Separable compositing operators over an opaque destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    Normal,
    Overlay,
    SoftLight,
    HardLight,
    Multiply,
    Screen,
    /// Intense highlight mode used by radial hotspots and sunburst rays.
    ColorDodge,
}

/// Mode rotation for most styles. Index 0 is plain compositing.
pub const SHAPE_MODE_CYCLE: [BlendMode; 5] = [
    BlendMode::Overlay,
    BlendMode::SoftLight,
    BlendMode::HardLight,
    BlendMode::Multiply,
    BlendMode::Screen,
];

/// Sunburst rotation, which folds in the dodge highlight.
pub const SUNBURST_MODE_CYCLE: [BlendMode; 4] = [
    BlendMode::Overlay,
    BlendMode::SoftLight,
    BlendMode::Screen,
    BlendMode::ColorDodge,
];

/// Mode for the `index`-th shape of a style using `cycle`.
pub fn mode_for_shape(index: usize, cycle: &[BlendMode]) -> BlendMode {
    if index == 0 || cycle.is_empty() {
        BlendMode::Normal
    } else {
        cycle[(index - 1) % cycle.len()]
    }
}

/// Composite a straight-alpha source sample over an opaque destination pixel.
///
/// The destination stays opaque, so the full Porter-Duff stack collapses to a
/// per-channel mix toward the blended color by source alpha.
pub fn blend_px(dst: [u8; 4], src_rgb: [u8; 3], src_alpha: f64, mode: BlendMode) -> [u8; 4] {
    let a = src_alpha.clamp(0.0, 1.0);
    if a <= 0.0 {
        return dst;
    }

    let mut out = [0u8; 4];
    for c in 0..3 {
        let d = f64::from(dst[c]) / 255.0;
        let s = f64::from(src_rgb[c]) / 255.0;
        let blended = blend_channel(mode, d, s);
        let v = d + (blended - d) * a;
        out[c] = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    }
    out[3] = dst[3];
    out
}

fn blend_channel(mode: BlendMode, d: f64, s: f64) -> f64 {
    match mode {
        BlendMode::Normal => s,
        BlendMode::Multiply => d * s,
        BlendMode::Screen => 1.0 - (1.0 - d) * (1.0 - s),
        BlendMode::Overlay => hard_mix(s, d),
        BlendMode::HardLight => hard_mix(d, s),
        BlendMode::SoftLight => soft_light(d, s),
        BlendMode::ColorDodge => {
            if s >= 1.0 {
                1.0
            } else {
                (d / (1.0 - s)).min(1.0)
            }
        }
    }
}

/// Shared overlay/hard-light kernel: multiply in shadows, screen in lights,
/// switched on `selector`.
fn hard_mix(carrier: f64, selector: f64) -> f64 {
    if selector <= 0.5 {
        2.0 * selector * carrier
    } else {
        1.0 - 2.0 * (1.0 - selector) * (1.0 - carrier)
    }
}

fn soft_light(d: f64, s: f64) -> f64 {
    if s <= 0.5 {
        d - (1.0 - 2.0 * s) * d * (1.0 - d)
    } else {
        let dd = if d <= 0.25 {
            ((16.0 * d - 12.0) * d + 4.0) * d
        } else {
            d.sqrt()
        };
        d + (2.0 * s - 1.0) * (dd - d)
    }
}
