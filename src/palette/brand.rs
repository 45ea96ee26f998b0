//! The fixed brand table: 7 hues × 9 shades. Every generated color is drawn
//! from this table or snapped to its nearest entry.

use crate::foundation::math::Rng64;
use crate::palette::{Color, channel_dist2, decode_hex};

pub const HUE_COUNT: usize = 7;
pub const SHADE_COUNT: usize = 9;

const SHADE_STEPS: [u16; SHADE_COUNT] = [100, 200, 300, 400, 500, 600, 700, 800, 900];

/// Mid-tone shade band preferred for default random palettes.
const MID_TONE_RANGE: (u16, u16) = (400, 600);

const HUES: [(&str, [&str; SHADE_COUNT]); HUE_COUNT] = [
    ("blue", [
        "DBEAFE", "BFDBFE", "93C5FD", "60A5FA", "3B82F6", "2563EB", "1D4ED8", "1E40AF", "1E3A8A",
    ]),
    ("emerald", [
        "D1FAE5", "A7F3D0", "6EE7B7", "34D399", "10B981", "059669", "047857", "065F46", "064E3B",
    ]),
    ("violet", [
        "EDE9FE", "DDD6FE", "C4B5FD", "A78BFA", "8B5CF6", "7C3AED", "6D28D9", "5B21B6", "4C1D95",
    ]),
    ("rose", [
        "FFE4E6", "FECDD3", "FDA4AF", "FB7185", "F43F5E", "E11D48", "BE123C", "9F1239", "881337",
    ]),
    ("amber", [
        "FEF3C7", "FDE68A", "FCD34D", "FBBF24", "F59E0B", "D97706", "B45309", "92400E", "78350F",
    ]),
    ("cyan", [
        "CFFAFE", "A5F3FC", "67E8F9", "22D3EE", "06B6D4", "0891B2", "0E7490", "155E75", "164E63",
    ]),
    ("slate", [
        "F1F5F9", "E2E8F0", "CBD5E1", "94A3B8", "64748B", "475569", "334155", "1E293B", "0F172A",
    ]),
];

/// Iterate the full brand table in a fixed order (hue-major, light to dark).
pub fn brand_colors() -> impl Iterator<Item = Color> {
    HUES.iter().flat_map(|(hue, shades)| {
        shades.iter().zip(SHADE_STEPS).filter_map(move |(hex, step)| {
            let rgb = decode_hex(hex)?;
            Some(Color {
                name: format!("{hue}-{step}"),
                hex: (*hex).to_string(),
                rgb,
            })
        })
    })
}

/// Snap raw channels to the nearest brand color by Euclidean RGB distance.
/// Ties resolve to the first-encountered entry in table iteration order.
pub fn nearest_brand(rgb: [u8; 3]) -> Color {
    let mut best: Option<(u32, Color)> = None;
    for color in brand_colors() {
        let d = channel_dist2(color.rgb, rgb);
        match &best {
            Some((bd, _)) if *bd <= d => {}
            _ => best = Some((d, color)),
        }
    }
    // The table is non-empty and every entry decodes (asserted in tests), so
    // the fold always produces a value; fall back to slate-500 regardless.
    best.map(|(_, c)| c).unwrap_or(Color {
        name: "slate-500".to_string(),
        hex: "64748B".to_string(),
        rgb: [0x64, 0x74, 0x8B],
    })
}

/// Pick `n` distinct-hue mid-tone colors (shades 400-600) at random.
pub fn mid_tone_palette(rng: &mut Rng64, n: usize) -> Vec<Color> {
    let lo = SHADE_STEPS
        .iter()
        .position(|&s| s == MID_TONE_RANGE.0)
        .unwrap_or(3);
    let hi = SHADE_STEPS
        .iter()
        .position(|&s| s == MID_TONE_RANGE.1)
        .unwrap_or(5);

    let mut hue_order: Vec<usize> = (0..HUE_COUNT).collect();
    for i in (1..hue_order.len()).rev() {
        let j = rng.next_below(i as u64 + 1) as usize;
        hue_order.swap(i, j);
    }

    hue_order
        .into_iter()
        .take(n)
        .filter_map(|hue_idx| {
            let shade_idx = lo + rng.next_below((hi - lo + 1) as u64) as usize;
            let (hue, shades) = HUES[hue_idx];
            let hex = shades[shade_idx];
            let rgb = decode_hex(hex)?;
            Some(Color {
                name: format!("{hue}-{}", SHADE_STEPS[shade_idx]),
                hex: hex.to_string(),
                rgb,
            })
        })
        .collect()
}
