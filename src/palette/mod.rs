//! Color model: named colors snapped to a fixed brand table, and the spatial
//! "blob" hints that bias gradient shape placement toward an uploaded image's
//! dominant regions.

pub mod brand;

use crate::foundation::error::{GradixError, GradixResult};

/// A named color. `rgb` is always the exact decode of `hex`; the only way to
/// build one is through [`Color::from_hex`] or the brand table, so the
/// invariant holds by construction.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Color {
    pub name: String,
    pub hex: String,
    pub rgb: [u8; 3],
}

impl Color {
    /// Parse a 6-digit hex color (leading `#` optional).
    pub fn from_hex(name: impl Into<String>, hex: &str) -> GradixResult<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let rgb = decode_hex(digits)
            .ok_or_else(|| GradixError::validation(format!("invalid hex color '{hex}'")))?;
        Ok(Self {
            name: name.into(),
            hex: digits.to_ascii_uppercase(),
            rgb,
        })
    }

    /// Squared Euclidean RGB distance to another color's channels.
    pub fn dist2(&self, rgb: [u8; 3]) -> u32 {
        channel_dist2(self.rgb, rgb)
    }
}

impl<'de> serde::Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            Full { name: String, hex: String },
        }

        match Repr::deserialize(deserializer)? {
            Repr::Hex(hex) => {
                Color::from_hex(hex.clone(), &hex).map_err(serde::de::Error::custom)
            }
            Repr::Full { name, hex } => {
                Color::from_hex(name, &hex).map_err(serde::de::Error::custom)
            }
        }
    }
}

pub(crate) fn decode_hex(digits: &str) -> Option<[u8; 3]> {
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
    let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
    let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
    Some([r, g, b])
}

pub(crate) fn channel_dist2(a: [u8; 3], b: [u8; 3]) -> u32 {
    let dr = i32::from(a[0]) - i32::from(b[0]);
    let dg = i32::from(a[1]) - i32::from(b[1]);
    let db = i32::from(a[2]) - i32::from(b[2]);
    (dr * dr + dg * dg + db * db) as u32
}

/// A normalized-coordinate spatial hint: where a dominant color region sits in
/// the source image, and how large/intense the matching gradient shape should
/// lean. Created in bulk by extraction, replaced wholesale on re-upload.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ColorBlob {
    pub color: Color,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub intensity: f64,
}
