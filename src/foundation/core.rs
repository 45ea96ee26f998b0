use std::str::FromStr;

use crate::foundation::error::{GradixError, GradixResult};

pub use kurbo::{Point, Vec2};

/// Target raster dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    /// Size a canvas from an aspect ratio, fixing the longer edge to `base`.
    pub fn from_aspect(aspect: AspectRatio, base: u32) -> Self {
        let (w, h) = (aspect.w as u64, aspect.h as u64);
        if w >= h {
            Self {
                width: base,
                height: ((base as u64 * h) / w).max(1) as u32,
            }
        } else {
            Self {
                width: ((base as u64 * w) / h).max(1) as u32,
                height: base,
            }
        }
    }
}

/// An aspect ratio expressed as a `"W:H"` string in configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AspectRatio {
    pub w: u32,
    pub h: u32,
}

impl AspectRatio {
    pub fn new(w: u32, h: u32) -> GradixResult<Self> {
        if w == 0 || h == 0 {
            return Err(GradixError::validation("aspect ratio terms must be > 0"));
        }
        Ok(Self { w, h })
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.w) / f64::from(self.h)
    }
}

impl FromStr for AspectRatio {
    type Err = GradixError;

    fn from_str(s: &str) -> GradixResult<Self> {
        let (w, h) = s
            .split_once(':')
            .ok_or_else(|| GradixError::validation(format!("aspect ratio '{s}' must be 'W:H'")))?;
        let w = w
            .trim()
            .parse::<u32>()
            .map_err(|_| GradixError::validation(format!("aspect ratio width '{w}' invalid")))?;
        let h = h
            .trim()
            .parse::<u32>()
            .map_err(|_| GradixError::validation(format!("aspect ratio height '{h}' invalid")))?;
        Self::new(w, h)
    }
}

impl TryFrom<String> for AspectRatio {
    type Error = GradixError;

    fn try_from(s: String) -> GradixResult<Self> {
        s.parse()
    }
}

impl From<AspectRatio> for String {
    fn from(a: AspectRatio) -> String {
        format!("{}:{}", a.w, a.h)
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self { w: 16, h: 9 }
    }
}

/// A width × height RGBA8 raster.
///
/// The compositor's base fill is opaque, so everything downstream of it is
/// effectively straight *and* premultiplied at the same time; intermediate
/// shape samples carry straight alpha and are resolved at blend time. Each
/// pipeline stage owns the buffer exclusively while transforming it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl PixelBuffer {
    /// Allocate a transparent buffer, or an empty one on size overflow.
    pub fn new(width: u32, height: u32) -> Self {
        match checked_len(width, height) {
            Some(len) => Self {
                width,
                height,
                data: vec![0u8; len],
            },
            None => Self {
                width: 0,
                height: 0,
                data: Vec::new(),
            },
        }
    }

    /// Allocate a buffer filled with one opaque color.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let mut buf = Self::new(width, height);
        for px in buf.data.chunks_exact_mut(4) {
            px[0] = rgb[0];
            px[1] = rgb[1];
            px[2] = rgb[2];
            px[3] = 255;
        }
        buf
    }

    /// Wrap raw RGBA8 bytes, checking the length matches the dimensions.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> GradixResult<Self> {
        let expected = checked_len(width, height)
            .ok_or_else(|| GradixError::render("pixel buffer size overflow"))?;
        if data.len() != expected {
            return Err(GradixError::render(
                "pixel buffer expects data matching width*height*4",
            ));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn idx(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * 4
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.idx(x, y);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    #[inline]
    pub fn put(&mut self, x: u32, y: u32, px: [u8; 4]) {
        let i = self.idx(x, y);
        self.data[i..i + 4].copy_from_slice(&px);
    }
}

fn checked_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_parses_and_roundtrips() {
        let a: AspectRatio = "16:9".parse().unwrap();
        assert_eq!(a, AspectRatio { w: 16, h: 9 });
        assert_eq!(String::from(a), "16:9");
        assert!("16x9".parse::<AspectRatio>().is_err());
        assert!("0:9".parse::<AspectRatio>().is_err());
    }

    #[test]
    fn canvas_from_aspect_fixes_long_edge() {
        let c = Canvas::from_aspect(AspectRatio { w: 16, h: 9 }, 960);
        assert_eq!(c, Canvas {
            width: 960,
            height: 540
        });

        let c = Canvas::from_aspect(AspectRatio { w: 9, h: 16 }, 960);
        assert_eq!(c, Canvas {
            width: 540,
            height: 960
        });
    }

    #[test]
    fn buffer_get_put_roundtrip() {
        let mut buf = PixelBuffer::new(4, 3);
        buf.put(2, 1, [9, 8, 7, 255]);
        assert_eq!(buf.get(2, 1), [9, 8, 7, 255]);
        assert_eq!(buf.get(0, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn filled_buffer_is_opaque() {
        let buf = PixelBuffer::filled(3, 3, [10, 20, 30]);
        assert!(buf.data.chunks_exact(4).all(|px| px == [10, 20, 30, 255]));
    }

    #[test]
    fn from_rgba8_rejects_bad_length() {
        assert!(PixelBuffer::from_rgba8(2, 2, vec![0u8; 15]).is_err());
        assert!(PixelBuffer::from_rgba8(2, 2, vec![0u8; 16]).is_ok());
    }
}
