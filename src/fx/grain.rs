//! Film grain: three-layer weighted noise plus per-channel jitter.

use crate::foundation::core::PixelBuffer;
use crate::foundation::math::{Rng64, add_clamped};

/// Layer weights for the composite noise term.
const LAYER_WEIGHTS: [f64; 3] = [0.6, 0.3, 0.1];
/// Luma offset scale at intensity 1.0.
const GRAIN_SCALE: f64 = 40.0;
/// Per-channel jitter scale at intensity 1.0.
const JITTER_SCALE: f64 = 8.0;

/// Inject grain scaled by `intensity` (the config's `noise_intensity`,
/// 0..=0.5). Noise comes from the accent generator; grain is not part of the
/// preview/export parity guarantee.
pub fn film_grain(buf: &mut PixelBuffer, intensity: f64, rng: &mut Rng64) {
    if buf.is_degenerate() || intensity <= 0.0 {
        return;
    }

    for px in buf.data.chunks_exact_mut(4) {
        let mut n = 0.0;
        for w in LAYER_WEIGHTS {
            n += w * (rng.next_f64_01() * 2.0 - 1.0);
        }
        let offset = n * intensity * GRAIN_SCALE;

        for c in &mut px[..3] {
            let jitter = (rng.next_f64_01() * 2.0 - 1.0) * intensity * JITTER_SCALE;
            *c = add_clamped(*c, offset + jitter);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_intensity_is_identity() {
        let mut buf = PixelBuffer::filled(8, 8, [100, 100, 100]);
        let before = buf.clone();
        film_grain(&mut buf, 0.0, &mut Rng64::new(1));
        assert_eq!(buf, before);
    }

    #[test]
    fn grain_perturbs_channels_but_not_alpha() {
        let mut buf = PixelBuffer::filled(16, 16, [100, 100, 100]);
        film_grain(&mut buf, 0.5, &mut Rng64::new(1));

        assert!(buf.data.chunks_exact(4).all(|px| px[3] == 255));
        let changed = buf
            .data
            .chunks_exact(4)
            .filter(|px| px[0] != 100 || px[1] != 100 || px[2] != 100)
            .count();
        assert!(changed > 0);
    }

    #[test]
    fn grain_is_bounded() {
        let mut buf = PixelBuffer::filled(16, 16, [128, 128, 128]);
        film_grain(&mut buf, 0.5, &mut Rng64::new(2));
        // Max offset: |n| <= 1 -> 0.5*40 = 20, plus jitter 0.5*8 = 4.
        for px in buf.data.chunks_exact(4) {
            for &c in &px[..3] {
                assert!((i16::from(c) - 128).abs() <= 25);
            }
        }
    }

    #[test]
    fn same_seed_reproduces_grain() {
        let mut a = PixelBuffer::filled(8, 8, [90, 90, 90]);
        let mut b = PixelBuffer::filled(8, 8, [90, 90, 90]);
        film_grain(&mut a, 0.3, &mut Rng64::new(44));
        film_grain(&mut b, 0.3, &mut Rng64::new(44));
        assert_eq!(a, b);
    }
}
