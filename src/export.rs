//! High-resolution export: preset dimensions, aspect fitting, JPEG encoding,
//! and the preview-upscale fallback.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::ImageEncoder as _;
use tracing::warn;

use crate::config::RenderConfig;
use crate::foundation::core::{AspectRatio, PixelBuffer};
use crate::foundation::error::GradixResult;
use crate::surface::Surface;

const JPEG_QUALITY: u8 = 92;

/// The four fixed export resolution presets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportPreset {
    S,
    M,
    L,
    Xl,
}

impl ExportPreset {
    pub const ALL: [ExportPreset; 4] = [
        ExportPreset::S,
        ExportPreset::M,
        ExportPreset::L,
        ExportPreset::Xl,
    ];

    /// Preset bounding box in pixels.
    pub fn bounds(self) -> (u32, u32) {
        match self {
            ExportPreset::S => (1920, 1080),
            ExportPreset::M => (2880, 1800),
            ExportPreset::L => (3840, 2160),
            ExportPreset::Xl => (5120, 2880),
        }
    }
}

/// Fit the active aspect ratio into a preset: width-fit first, height-fit
/// when the width-derived height overflows the preset box.
pub fn export_dimensions(preset: ExportPreset, aspect: AspectRatio) -> (u32, u32) {
    let (pw, ph) = preset.bounds();
    let (aw, ah) = (aspect.w as u64, aspect.h as u64);

    let height_at_full_width = ((pw as u64 * ah) / aw) as u32;
    if height_at_full_width <= ph {
        (pw, height_at_full_width.max(1))
    } else {
        let width_at_full_height = ((ph as u64 * aw) / ah) as u32;
        (width_at_full_height.max(1), ph)
    }
}

/// `background-{width}x{height}-{timestamp}.jpg`
pub fn export_filename(width: u32, height: u32, timestamp_secs: u64) -> String {
    format!("background-{width}x{height}-{timestamp_secs}.jpg")
}

/// Render the export image through the surface's resolution-independent
/// entry point. A failed high-resolution render degrades to a nearest
/// upscale of the current preview buffer rather than failing the export.
pub fn render_export(surface: &Surface, cfg: &RenderConfig, preset: ExportPreset) -> PixelBuffer {
    let (width, height) = export_dimensions(preset, cfg.aspect);
    match surface.render_at(cfg, width, height) {
        Ok(buf) => buf,
        Err(e) => {
            warn!(error = %e, "high-resolution render failed; upscaling preview");
            upscale_nearest(surface.buffer(), width, height)
        }
    }
}

/// Render and write one export file into `dir`, returning its path.
pub fn export_to_dir(
    surface: &Surface,
    cfg: &RenderConfig,
    preset: ExportPreset,
    dir: &Path,
) -> GradixResult<PathBuf> {
    let buf = render_export(surface, cfg, preset);
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    std::fs::create_dir_all(dir)
        .with_context(|| format!("create export dir '{}'", dir.display()))?;
    let path = dir.join(export_filename(buf.width, buf.height, timestamp));
    save_jpeg(&buf, &path)?;
    Ok(path)
}

/// Encode an opaque buffer as a quality-92 JPEG.
pub fn save_jpeg(buf: &PixelBuffer, path: &Path) -> GradixResult<()> {
    // JPEG has no alpha; the pipeline output is opaque, so dropping the
    // channel is lossless.
    let mut rgb = Vec::with_capacity(buf.data.len() / 4 * 3);
    for px in buf.data.chunks_exact(4) {
        rgb.extend_from_slice(&px[..3]);
    }

    let file = std::fs::File::create(path)
        .with_context(|| format!("create export file '{}'", path.display()))?;
    let mut writer = std::io::BufWriter::new(file);
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY);
    encoder
        .write_image(
            &rgb,
            buf.width,
            buf.height,
            image::ExtendedColorType::Rgb8,
        )
        .with_context(|| format!("encode jpeg '{}'", path.display()))?;
    Ok(())
}

fn upscale_nearest(src: &PixelBuffer, width: u32, height: u32) -> PixelBuffer {
    if src.is_degenerate() {
        return PixelBuffer::new(width, height);
    }
    let mut out = PixelBuffer::new(width, height);
    for y in 0..height {
        let sy = ((y as u64 * src.height as u64) / height as u64) as u32;
        for x in 0..width {
            let sx = ((x as u64 * src.width as u64) / width as u64) as u32;
            out.put(x, y, src.get(sx, sy));
        }
    }
    out
}
