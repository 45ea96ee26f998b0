//! Palette & region extraction: cluster an uploaded image's pixels into
//! dominant color regions and turn them into positioned blobs plus a reduced
//! brand palette.

use std::collections::BTreeMap;

use tracing::warn;

use crate::foundation::core::PixelBuffer;
use crate::foundation::math::Rng64;
use crate::palette::{Color, ColorBlob, brand};

/// Sampling stride in both axes.
const SAMPLE_STEP: u32 = 2;
/// Pixels with alpha below this are ignored.
const ALPHA_FLOOR: u8 = 128;
/// Channel quantization bucket width for region keys.
const BUCKET: u8 = 20;
/// Regions kept after ranking by `count * max_intensity`.
const TOP_REGIONS: usize = 12;
/// Regions with more samples than this split into contiguous sub-clusters.
const SPLIT_THRESHOLD: usize = 20;
const MAX_SUB_CLUSTERS: usize = 3;
/// Palette cap after blob-color deduplication.
const MAX_COLORS: usize = 6;

/// Extraction output: a reduced palette and the spatial hints that produced it.
#[derive(Clone, Debug, serde::Serialize)]
pub struct Extraction {
    pub colors: Vec<Color>,
    pub blobs: Vec<ColorBlob>,
}

#[derive(Clone, Copy, Debug)]
struct Sample {
    key: [u8; 3],
    x: f64,
    y: f64,
    intensity: f64,
}

struct Region {
    count: usize,
    positions: Vec<(f64, f64)>,
    max_intensity: f64,
}

/// Cluster `buf` into dominant color regions and emit palette + blobs.
///
/// The caller pre-downscales to <= 200px on the longest side. A fully
/// transparent (or empty) input is a recovered condition: the result falls
/// back to a random mid-tone palette of three colors with no blobs.
#[tracing::instrument(skip(buf, rng))]
pub fn extract_palette(buf: &PixelBuffer, rng: &mut Rng64) -> Extraction {
    let samples = collect_samples(buf);
    let regions = fold_regions(&samples);

    let mut ranked: Vec<(&[u8; 3], &Region)> = regions.iter().collect();
    ranked.sort_by(|a, b| {
        let ka = a.1.count as f64 * a.1.max_intensity;
        let kb = b.1.count as f64 * b.1.max_intensity;
        kb.partial_cmp(&ka).unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(TOP_REGIONS);

    let mut blobs = Vec::new();
    for (key, region) in ranked {
        let color = brand::nearest_brand(*key);
        emit_blobs(&mut blobs, region, color, rng);
    }

    let colors = dedup_colors(&blobs);
    if colors.is_empty() {
        warn!("no usable colors extracted; falling back to a random mid-tone palette");
        return Extraction {
            colors: brand::mid_tone_palette(rng, 3),
            blobs: Vec::new(),
        };
    }

    Extraction { colors, blobs }
}

fn collect_samples(buf: &PixelBuffer) -> Vec<Sample> {
    if buf.is_degenerate() {
        return Vec::new();
    }

    let mut samples = Vec::new();
    let (w, h) = (buf.width, buf.height);
    for y in (0..h).step_by(SAMPLE_STEP as usize) {
        for x in (0..w).step_by(SAMPLE_STEP as usize) {
            let [r, g, b, a] = buf.get(x, y);
            if a < ALPHA_FLOOR {
                continue;
            }
            let intensity = (f64::from(r).powi(2) + f64::from(g).powi(2) + f64::from(b).powi(2))
                .sqrt()
                / 255.0;
            samples.push(Sample {
                key: [quantize(r), quantize(g), quantize(b)],
                x: f64::from(x) / f64::from(w),
                y: f64::from(y) / f64::from(h),
                intensity,
            });
        }
    }
    samples
}

/// One fold over the immutable sample list. Position means are taken from
/// whole sums at emit time, so there is no incremental-average drift.
fn fold_regions(samples: &[Sample]) -> BTreeMap<[u8; 3], Region> {
    let mut regions = BTreeMap::<[u8; 3], Region>::new();
    for s in samples {
        let region = regions.entry(s.key).or_insert(Region {
            count: 0,
            positions: Vec::new(),
            max_intensity: 0.0,
        });
        region.count += 1;
        region.positions.push((s.x, s.y));
        if s.intensity > region.max_intensity {
            region.max_intensity = s.intensity;
        }
    }
    regions
}

fn emit_blobs(out: &mut Vec<ColorBlob>, region: &Region, color: Color, rng: &mut Rng64) {
    let intensity = region.max_intensity.clamp(0.0, 1.0);

    if region.positions.len() > SPLIT_THRESHOLD {
        // Contiguous sub-clusters in original sampling order.
        let chunk = region.positions.len().div_ceil(MAX_SUB_CLUSTERS);
        for part in region.positions.chunks(chunk) {
            let (x, y) = mean(part);
            out.push(ColorBlob {
                color: color.clone(),
                x,
                y,
                radius: 0.15 + rng.next_f64_01() * 0.15,
                intensity,
            });
        }
    } else {
        let (x, y) = mean(&region.positions);
        out.push(ColorBlob {
            color,
            x,
            y,
            radius: 0.1 + rng.next_f64_01() * 0.2,
            intensity,
        });
    }
}

fn mean(positions: &[(f64, f64)]) -> (f64, f64) {
    if positions.is_empty() {
        return (0.5, 0.5);
    }
    let n = positions.len() as f64;
    let (sx, sy) = positions
        .iter()
        .fold((0.0, 0.0), |(ax, ay), (x, y)| (ax + x, ay + y));
    (sx / n, sy / n)
}

fn dedup_colors(blobs: &[ColorBlob]) -> Vec<Color> {
    let mut seen = Vec::<Color>::new();
    for blob in blobs {
        if seen.len() == MAX_COLORS {
            break;
        }
        if !seen.iter().any(|c| c.hex == blob.color.hex) {
            seen.push(blob.color.clone());
        }
    }
    seen
}

fn quantize(c: u8) -> u8 {
    (c / BUCKET) * BUCKET
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> PixelBuffer {
        let mut buf = PixelBuffer::new(width, height);
        for px in buf.data.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
        buf
    }

    #[test]
    fn solid_color_image_yields_single_deterministic_entry() {
        let buf = solid(64, 64, [0x3B, 0x82, 0xF6, 255]);

        let mut rng = Rng64::new(1);
        let a = extract_palette(&buf, &mut rng);
        let mut rng = Rng64::new(1);
        let b = extract_palette(&buf, &mut rng);

        assert_eq!(a.colors.len(), 1);
        assert_eq!(a.colors[0].name, b.colors[0].name);
        // Quantization buckets the channels, but the snap stays in the hue.
        assert!(a.colors[0].name.starts_with("blue-"));
    }

    #[test]
    fn transparent_image_falls_back_to_three_midtones() {
        let buf = solid(32, 32, [10, 10, 10, 0]);
        let mut rng = Rng64::new(5);
        let out = extract_palette(&buf, &mut rng);
        assert_eq!(out.colors.len(), 3);
        assert!(out.blobs.is_empty());
    }

    #[test]
    fn empty_buffer_falls_back_instead_of_panicking() {
        let buf = PixelBuffer::new(0, 0);
        let mut rng = Rng64::new(5);
        let out = extract_palette(&buf, &mut rng);
        assert_eq!(out.colors.len(), 3);
    }

    #[test]
    fn large_region_splits_into_sub_clusters() {
        // 64x64 solid yields a single region with ~1024 samples.
        let buf = solid(64, 64, [0x10, 0xB9, 0x81, 255]);
        let mut rng = Rng64::new(3);
        let out = extract_palette(&buf, &mut rng);
        assert_eq!(out.blobs.len(), MAX_SUB_CLUSTERS);
        for blob in &out.blobs {
            assert!((0.15..=0.30).contains(&blob.radius));
            assert!((0.0..=1.0).contains(&blob.x));
        }
    }

    #[test]
    fn two_color_image_yields_both_hues() {
        let mut buf = solid(64, 64, [0x3B, 0x82, 0xF6, 255]);
        for y in 0..64u32 {
            for x in 32..64u32 {
                buf.put(x, y, [0xF4, 0x3F, 0x5E, 255]);
            }
        }
        let mut rng = Rng64::new(7);
        let out = extract_palette(&buf, &mut rng);
        let hues: Vec<&str> = out
            .colors
            .iter()
            .filter_map(|c| c.name.rsplit_once('-').map(|(h, _)| h))
            .collect();
        assert!(hues.contains(&"blue"));
        assert!(hues.contains(&"rose"));
    }

    #[test]
    fn palette_never_exceeds_cap() {
        // Noisy gradient image touching many buckets.
        let mut buf = PixelBuffer::new(64, 64);
        for y in 0..64u32 {
            for x in 0..64u32 {
                buf.put(x, y, [(x * 4) as u8, (y * 4) as u8, ((x + y) * 2) as u8, 255]);
            }
        }
        let mut rng = Rng64::new(11);
        let out = extract_palette(&buf, &mut rng);
        assert!((1..=MAX_COLORS).contains(&out.colors.len()));
    }
}
