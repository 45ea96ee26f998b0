//! Heavy multi-pass blur.
//!
//! Three successive separable box-blur passes with decreasing radius
//! approximate a strong Gaussian without a dedicated kernel; each pass runs
//! horizontally then vertically through a scratch buffer.

use crate::foundation::core::PixelBuffer;

/// Base radius as a fraction of the short edge.
const BASE_RADIUS_FACTOR: f64 = 0.12;
const PASSES: u32 = 3;

/// Apply the heavy blur in place. Under animation only the first (widest)
/// pass runs, trading softness for frame cost.
pub fn heavy_blur(buf: &mut PixelBuffer, animating: bool) {
    if buf.is_degenerate() {
        return;
    }

    let base = (BASE_RADIUS_FACTOR * f64::from(buf.width.min(buf.height))) as u32;
    let passes = if animating { 1 } else { PASSES };
    for pass in 0..passes {
        box_blur(buf, base / (pass + 1));
    }
}

/// One separable box-blur pass of the given pixel radius.
pub fn box_blur(buf: &mut PixelBuffer, radius: u32) {
    if radius == 0 || buf.is_degenerate() {
        return;
    }

    let mut scratch = vec![0u8; buf.data.len()];
    horizontal_pass(&buf.data, &mut scratch, buf.width, buf.height, radius);
    let mut out = std::mem::take(&mut buf.data);
    vertical_pass(&scratch, &mut out, buf.width, buf.height, radius);
    buf.data = out;
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, radius: u32) {
    let w = width as i64;
    let r = radius as i64;
    let window = (2 * r + 1) as u64;

    for y in 0..height as i64 {
        let row = (y * w) as usize * 4;
        let mut acc = [0u64; 4];
        // Prime the clamped window around x = 0.
        for dx in -r..=r {
            let sx = dx.clamp(0, w - 1) as usize;
            for c in 0..4 {
                acc[c] += u64::from(src[row + sx * 4 + c]);
            }
        }
        for x in 0..w {
            let out = row + (x as usize) * 4;
            for c in 0..4 {
                dst[out + c] = ((acc[c] + window / 2) / window) as u8;
            }
            let leaving = (x - r).clamp(0, w - 1) as usize;
            let entering = (x + r + 1).clamp(0, w - 1) as usize;
            for c in 0..4 {
                acc[c] += u64::from(src[row + entering * 4 + c]);
                acc[c] -= u64::from(src[row + leaving * 4 + c]);
            }
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, radius: u32) {
    let w = width as i64;
    let h = height as i64;
    let r = radius as i64;
    let window = (2 * r + 1) as u64;

    for x in 0..w {
        let mut acc = [0u64; 4];
        for dy in -r..=r {
            let sy = dy.clamp(0, h - 1);
            let idx = ((sy * w + x) as usize) * 4;
            for c in 0..4 {
                acc[c] += u64::from(src[idx + c]);
            }
        }
        for y in 0..h {
            let out = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out + c] = ((acc[c] + window / 2) / window) as u8;
            }
            let leaving = ((y - r).clamp(0, h - 1) * w + x) as usize * 4;
            let entering = ((y + r + 1).clamp(0, h - 1) * w + x) as usize * 4;
            for c in 0..4 {
                acc[c] += u64::from(src[entering + c]);
                acc[c] -= u64::from(src[leaving + c]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_0_is_identity() {
        let mut buf = PixelBuffer::filled(4, 3, [9, 8, 7]);
        let before = buf.clone();
        box_blur(&mut buf, 0);
        assert_eq!(buf, before);
    }

    #[test]
    fn constant_image_is_unchanged() {
        let mut buf = PixelBuffer::filled(8, 8, [10, 20, 30]);
        let before = buf.clone();
        box_blur(&mut buf, 3);
        assert_eq!(buf, before);
    }

    #[test]
    fn blur_spreads_energy_from_single_pixel() {
        let mut buf = PixelBuffer::new(9, 9);
        buf.put(4, 4, [255, 255, 255, 255]);

        box_blur(&mut buf, 2);

        let nonzero = buf.data.chunks_exact(4).filter(|px| px[3] != 0).count();
        assert!(nonzero > 1);
        assert!(buf.get(4, 4)[3] < 255);
    }

    #[test]
    fn heavy_blur_preserves_opacity() {
        let mut buf = PixelBuffer::filled(32, 32, [50, 100, 150]);
        buf.put(0, 0, [255, 0, 0, 255]);
        heavy_blur(&mut buf, false);
        assert!(buf.data.chunks_exact(4).all(|px| px[3] == 255));
    }

    #[test]
    fn degenerate_buffer_no_op() {
        let mut buf = PixelBuffer::new(0, 0);
        heavy_blur(&mut buf, false);
        assert!(buf.data.is_empty());
    }

    #[test]
    fn animating_mode_blurs_less() {
        let mut sharp = PixelBuffer::new(33, 33);
        sharp.put(16, 16, [255, 255, 255, 255]);
        let mut full = sharp.clone();

        heavy_blur(&mut sharp, true);
        heavy_blur(&mut full, false);

        let spread = |b: &PixelBuffer| b.data.chunks_exact(4).filter(|px| px[3] != 0).count();
        assert!(spread(&full) >= spread(&sharp));
    }
}
