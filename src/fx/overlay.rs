//! Overlay/glitch effects: one of five pixel-displacement or pattern stages,
//! gated by the overlay toggle.
//!
//! Band sizes, directions, and offsets are intentionally non-reproducible:
//! they draw from the accent generator, never the seeded placement stream.

use crate::compose::blend::{BlendMode, blend_px};
use crate::config::OverlayKind;
use crate::foundation::core::PixelBuffer;
use crate::foundation::math::{Rng64, add_clamped};

/// Waves across the width for the glass displacement.
const GLASS_WAVES: f64 = 6.0;
/// Peak glass displacement as a fraction of height.
const GLASS_SHIFT: f64 = 0.06;
/// Intensity above which glitch modes split the red/blue channels.
const CHANNEL_SPLIT_THRESHOLD: f64 = 0.6;

/// Apply the selected overlay effect in place.
#[tracing::instrument(skip(buf, rng))]
pub fn apply_overlay(buf: &mut PixelBuffer, kind: OverlayKind, intensity: f64, rng: &mut Rng64) {
    if buf.is_degenerate() || intensity <= 0.0 {
        return;
    }
    let intensity = intensity.clamp(0.0, 1.0);

    match kind {
        OverlayKind::Glass => glass(buf, intensity),
        OverlayKind::HorizontalGlitch => glitch_rows(buf, intensity, rng),
        OverlayKind::VerticalGlitch => glitch_columns(buf, intensity, rng),
        OverlayKind::Pattern => dot_pattern(buf, intensity),
        OverlayKind::Noise => block_noise(buf, intensity, rng),
    }
}

/// Per-column vertical displacement through a sine of x.
fn glass(buf: &mut PixelBuffer, intensity: f64) {
    let src = buf.clone();
    let (w, h) = (f64::from(buf.width), f64::from(buf.height));

    for y in 0..buf.height {
        for x in 0..buf.width {
            let nx = (f64::from(x) + 0.5) / w;
            let shift = (nx * GLASS_WAVES * std::f64::consts::TAU).sin() * intensity * GLASS_SHIFT;
            let sy = (f64::from(y) + shift * h).round().clamp(0.0, h - 1.0) as u32;
            buf.put(x, y, src.get(x, sy));
        }
    }
}

/// Scanline-band horizontal displacement with randomized geometry.
fn glitch_rows(buf: &mut PixelBuffer, intensity: f64, rng: &mut Rng64) {
    let src = buf.clone();
    let (w, h) = (buf.width, buf.height);
    let split = channel_split(intensity);

    let mut y = 0u32;
    while y < h {
        let band = 2 + rng.next_below(18) as u32;
        let glitching = rng.next_f64_01() < 0.2 + intensity * 0.5;
        let offset = if glitching {
            (rng.next_f64_01() * 2.0 - 1.0) * intensity * 0.25 * f64::from(w)
        } else {
            0.0
        };

        for row in y..(y + band).min(h) {
            if offset == 0.0 && split == 0 {
                continue;
            }
            for x in 0..w {
                let sx = (f64::from(x) + offset).round().clamp(0.0, f64::from(w) - 1.0) as u32;
                let mut px = src.get(sx, row);
                if split > 0 {
                    px[0] = src.get(sx.saturating_add(split).min(w - 1), row)[0];
                    px[2] = src.get(sx.saturating_sub(split), row)[2];
                }
                buf.put(x, row, px);
            }
        }
        y += band;
    }
}

/// Scancolumn-band vertical displacement with randomized geometry.
fn glitch_columns(buf: &mut PixelBuffer, intensity: f64, rng: &mut Rng64) {
    let src = buf.clone();
    let (w, h) = (buf.width, buf.height);
    let split = channel_split(intensity);

    let mut x = 0u32;
    while x < w {
        let band = 2 + rng.next_below(18) as u32;
        let glitching = rng.next_f64_01() < 0.2 + intensity * 0.5;
        let offset = if glitching {
            (rng.next_f64_01() * 2.0 - 1.0) * intensity * 0.25 * f64::from(h)
        } else {
            0.0
        };

        for col in x..(x + band).min(w) {
            if offset == 0.0 && split == 0 {
                continue;
            }
            for y in 0..h {
                let sy = (f64::from(y) + offset).round().clamp(0.0, f64::from(h) - 1.0) as u32;
                let mut px = src.get(col, sy);
                if split > 0 {
                    px[0] = src.get(col, sy.saturating_add(split).min(h - 1))[0];
                    px[2] = src.get(col, sy.saturating_sub(split))[2];
                }
                buf.put(col, y, px);
            }
        }
        x += band;
    }
}

fn channel_split(intensity: f64) -> u32 {
    if intensity > CHANNEL_SPLIT_THRESHOLD {
        (((intensity - CHANNEL_SPLIT_THRESHOLD) * 20.0).round() as u32).max(1)
    } else {
        0
    }
}

/// Overlay-blended dot grid; spacing shrinks as intensity grows.
fn dot_pattern(buf: &mut PixelBuffer, intensity: f64) {
    let min_dim = f64::from(buf.width.min(buf.height));
    let spacing = ((min_dim * 0.12) / (0.4 + intensity)).max(4.0);
    let dot_radius = spacing * 0.18;
    let opacity = 0.3 * intensity;

    for y in 0..buf.height {
        for x in 0..buf.width {
            let fx = (f64::from(x) + 0.5).rem_euclid(spacing) - spacing / 2.0;
            let fy = (f64::from(y) + 0.5).rem_euclid(spacing) - spacing / 2.0;
            let d = (fx * fx + fy * fy).sqrt();
            if d > dot_radius {
                continue;
            }
            let falloff = 1.0 - d / dot_radius;
            let px = buf.get(x, y);
            buf.put(
                x,
                y,
                blend_px(px, [255, 255, 255], opacity * falloff, BlendMode::Overlay),
            );
        }
    }
}

/// Block-wise color offsets, with a slight red/blue split above 0.5.
fn block_noise(buf: &mut PixelBuffer, intensity: f64, rng: &mut Rng64) {
    let src = buf.clone();
    let (w, h) = (buf.width, buf.height);
    let block = 8 + rng.next_below(16) as u32;
    let split: u32 = if intensity > 0.5 { 2 } else { 0 };

    let mut by = 0u32;
    while by < h {
        let mut bx = 0u32;
        while bx < w {
            let offsets = [
                (rng.next_f64_01() - 0.5) * intensity * 60.0,
                (rng.next_f64_01() - 0.5) * intensity * 60.0,
                (rng.next_f64_01() - 0.5) * intensity * 60.0,
            ];

            for y in by..(by + block).min(h) {
                for x in bx..(bx + block).min(w) {
                    let mut px = src.get(x, y);
                    if split > 0 {
                        px[0] = src.get((x + split).min(w - 1), y)[0];
                        px[2] = src.get(x.saturating_sub(split), y)[2];
                    }
                    for (c, off) in px[..3].iter_mut().zip(offsets) {
                        *c = add_clamped(*c, off);
                    }
                    buf.put(x, y, px);
                }
            }
            bx += block;
        }
        by += block;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> PixelBuffer {
        let mut buf = PixelBuffer::new(width, height);
        for y in 0..height {
            for x in 0..width {
                buf.put(x, y, [(x * 8 % 256) as u8, (y * 8 % 256) as u8, 100, 255]);
            }
        }
        buf
    }

    #[test]
    fn zero_intensity_is_noop_for_all_kinds() {
        for kind in [
            OverlayKind::Glass,
            OverlayKind::HorizontalGlitch,
            OverlayKind::VerticalGlitch,
            OverlayKind::Pattern,
            OverlayKind::Noise,
        ] {
            let mut buf = gradient(24, 24);
            let before = buf.clone();
            apply_overlay(&mut buf, kind, 0.0, &mut Rng64::new(1));
            assert_eq!(buf, before, "{kind:?} modified at zero intensity");
        }
    }

    #[test]
    fn every_kind_keeps_dimensions_and_opacity() {
        for kind in [
            OverlayKind::Glass,
            OverlayKind::HorizontalGlitch,
            OverlayKind::VerticalGlitch,
            OverlayKind::Pattern,
            OverlayKind::Noise,
        ] {
            let mut buf = gradient(32, 24);
            apply_overlay(&mut buf, kind, 0.8, &mut Rng64::new(7));
            assert_eq!(buf.width, 32);
            assert_eq!(buf.height, 24);
            assert!(
                buf.data.chunks_exact(4).all(|px| px[3] == 255),
                "{kind:?} lost opacity"
            );
        }
    }

    #[test]
    fn glass_displaces_deterministically() {
        let mut a = gradient(32, 32);
        let mut b = gradient(32, 32);
        apply_overlay(&mut a, OverlayKind::Glass, 0.9, &mut Rng64::new(1));
        apply_overlay(&mut b, OverlayKind::Glass, 0.9, &mut Rng64::new(99));
        // Glass consumes no randomness at all.
        assert_eq!(a, b);
        assert_ne!(a, gradient(32, 32));
    }

    #[test]
    fn pattern_adds_dots() {
        let mut buf = PixelBuffer::filled(48, 48, [60, 60, 60]);
        apply_overlay(&mut buf, OverlayKind::Pattern, 1.0, &mut Rng64::new(1));
        let brightened = buf
            .data
            .chunks_exact(4)
            .filter(|px| px[0] > 60)
            .count();
        assert!(brightened > 0);
    }

    #[test]
    fn noise_offsets_blocks() {
        let mut buf = PixelBuffer::filled(40, 40, [120, 120, 120]);
        apply_overlay(&mut buf, OverlayKind::Noise, 0.8, &mut Rng64::new(3));
        let changed = buf
            .data
            .chunks_exact(4)
            .filter(|px| px[..3] != [120, 120, 120])
            .count();
        assert!(changed > 0);
    }

    #[test]
    fn degenerate_buffer_no_op() {
        let mut buf = PixelBuffer::new(0, 0);
        apply_overlay(&mut buf, OverlayKind::Glass, 1.0, &mut Rng64::new(1));
        assert!(buf.data.is_empty());
    }
}
