//! Composition analysis: inspect brightness gradients of an image to suggest
//! a gradient style, intensity, and density. A best-effort heuristic, not an
//! exact classification; the suggestion feeds the configuration, never the
//! compositor directly.

use crate::config::GradientStyle;
use crate::foundation::core::PixelBuffer;
use crate::foundation::math::Rng64;

/// Analyzer sampling stride in both axes.
const SAMPLE_STEP: u32 = 4;
/// Complexity fraction above which the high-complexity branch triggers.
const COMPLEXITY_TRIGGER: f64 = 0.10;

/// A suggested configuration, clamped to the compositor's supported styles.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Suggestion {
    pub style: GradientStyle,
    pub intensity: f64,
    pub density: f64,
}

/// Analyze `buf` and suggest style/intensity/density.
///
/// Deterministic for identical pixels except the documented high-complexity
/// branch, which draws once from `rng` to pick between the two busy styles.
/// Callers needing reproducibility should not rely on that branch.
#[tracing::instrument(skip(buf, rng))]
pub fn analyze_composition(buf: &PixelBuffer, rng: &mut Rng64) -> Suggestion {
    let mut horizontal = 0.0f64;
    let mut vertical = 0.0f64;
    let mut radial = 0.0f64;
    let mut complexity = 0.0f64;
    let mut count = 0usize;

    if !buf.is_degenerate() {
        let (w, h) = (buf.width, buf.height);
        let (cx, cy) = (f64::from(w) / 2.0, f64::from(h) / 2.0);
        let max_dist = (cx * cx + cy * cy).sqrt().max(1.0);

        let mut prev_col = vec![None::<f64>; w.div_ceil(SAMPLE_STEP) as usize];
        for y in (0..h).step_by(SAMPLE_STEP as usize) {
            let mut prev_row = None::<f64>;
            for (xi, x) in (0..w).step_by(SAMPLE_STEP as usize).enumerate() {
                let [r, g, b, _] = buf.get(x, y);
                let brightness = (f64::from(r) + f64::from(g) + f64::from(b)) / 3.0;

                if let Some(p) = prev_row {
                    horizontal += (brightness - p).abs();
                }
                if let Some(p) = prev_col[xi] {
                    vertical += (brightness - p).abs();
                }
                prev_row = Some(brightness);
                prev_col[xi] = Some(brightness);

                let dx = f64::from(x) - cx;
                let dy = f64::from(y) - cy;
                let dist = (dx * dx + dy * dy).sqrt() / max_dist;
                radial += brightness * (1.0 - dist);

                complexity += (brightness - 128.0).abs() / 128.0;
                count += 1;
            }
        }
    }

    if count == 0 {
        return Suggestion {
            style: GradientStyle::Organic,
            intensity: 0.4,
            density: 0.3,
        };
    }

    // The radial accumulator sums raw brightness while the delta accumulators
    // sum differences, so normalize radial down to the same order.
    let radial_score = radial / 96.0;
    let busy = complexity > COMPLEXITY_TRIGGER * count as f64;

    let style = if busy {
        // Both high-complexity styles fit; let the caller's generator choose.
        if rng.next_below(2) == 0 {
            GradientStyle::Organic
        } else {
            GradientStyle::Mesh
        }
    } else if horizontal >= vertical && horizontal >= radial_score {
        GradientStyle::Linear
    } else if vertical >= radial_score {
        GradientStyle::Radial
    } else {
        GradientStyle::Organic
    };

    let avg_complexity = (complexity / count as f64).clamp(0.0, 1.0);
    Suggestion {
        style,
        intensity: 0.4 + avg_complexity * 0.6,
        density: 0.3 + avg_complexity * 0.9,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_h(width: u32, height: u32) -> PixelBuffer {
        let mut buf = PixelBuffer::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let v = ((x * 255) / width.max(1)) as u8;
                buf.put(x, y, [v, v, v, 255]);
            }
        }
        buf
    }

    fn gradient_v(width: u32, height: u32) -> PixelBuffer {
        let mut buf = PixelBuffer::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let v = ((y * 255) / height.max(1)) as u8;
                buf.put(x, y, [v, v, v, 255]);
            }
        }
        buf
    }

    #[test]
    fn horizontal_ramp_suggests_linear() {
        // A smooth mid-anchored ramp keeps complexity below the busy trigger.
        let mut buf = gradient_h(128, 128);
        for px in buf.data.chunks_exact_mut(4) {
            for c in &mut px[..3] {
                *c = 112 + *c / 8;
            }
        }
        let mut rng = Rng64::new(1);
        let s = analyze_composition(&buf, &mut rng);
        assert_eq!(s.style, GradientStyle::Linear);
    }

    #[test]
    fn suggestion_ranges_hold() {
        for buf in [gradient_h(96, 64), gradient_v(64, 96)] {
            let mut rng = Rng64::new(2);
            let s = analyze_composition(&buf, &mut rng);
            assert!((0.4..=1.0).contains(&s.intensity));
            assert!((0.3..=1.2).contains(&s.density));
        }
    }

    #[test]
    fn busy_image_picks_a_high_complexity_style() {
        let mut buf = PixelBuffer::new(64, 64);
        for y in 0..64u32 {
            for x in 0..64u32 {
                let v = if (x + y) % 2 == 0 { 0 } else { 255 };
                buf.put(x, y, [v, v, v, 255]);
            }
        }
        let mut rng = Rng64::new(3);
        let s = analyze_composition(&buf, &mut rng);
        assert!(matches!(
            s.style,
            GradientStyle::Organic | GradientStyle::Mesh
        ));
    }

    #[test]
    fn empty_buffer_returns_floor_suggestion() {
        let buf = PixelBuffer::new(0, 0);
        let mut rng = Rng64::new(4);
        let s = analyze_composition(&buf, &mut rng);
        assert_eq!(s.intensity, 0.4);
        assert_eq!(s.density, 0.3);
    }

    #[test]
    fn uniform_bright_image_suggests_organic() {
        // No directional deltas at all: only the radial accumulator scores.
        let buf = PixelBuffer::filled(96, 96, [128, 128, 128]);
        let mut rng = Rng64::new(1);
        let s = analyze_composition(&buf, &mut rng);
        assert_eq!(s.style, GradientStyle::Organic);
    }

    #[test]
    fn deterministic_outside_busy_branch() {
        // Mid-anchored vertical ramp: low complexity, vertical deltas win.
        let mut buf = gradient_v(80, 80);
        for px in buf.data.chunks_exact_mut(4) {
            for c in &mut px[..3] {
                *c = 112 + *c / 8;
            }
        }
        let mut r1 = Rng64::new(10);
        let mut r2 = Rng64::new(99);
        // Different rng seeds: the non-busy path must not consult them.
        let a = analyze_composition(&buf, &mut r1);
        let b = analyze_composition(&buf, &mut r2);
        assert_eq!(a, b);
        assert_eq!(a.style, GradientStyle::Radial);
    }
}
