use crate::foundation::core::AspectRatio;
use crate::foundation::error::{GradixError, GradixResult};
use crate::palette::{Color, ColorBlob};

/// Which compositing algorithm paints the gradient surface.
///
/// Each style reinterprets `density` and `intensity` within its own bracket;
/// see the per-style planners in [`crate::compose`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientStyle {
    Organic,
    Linear,
    Radial,
    Mesh,
    Sunburst,
}

/// Overlay post-effect selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayKind {
    Glass,
    HorizontalGlitch,
    VerticalGlitch,
    Pattern,
    Noise,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OverlayConfig {
    pub enabled: bool,
    pub kind: OverlayKind,
    pub intensity: f64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            kind: OverlayKind::Glass,
            intensity: 0.5,
        }
    }
}

/// Sinusoidal warp applied last in the post-process stack.
///
/// Frequencies are in radians across the normalized dimension; amplitudes are
/// fractions of width/height, so the warp scales with export resolution.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RippleConfig {
    pub enabled: bool,
    pub freq_x: f64,
    pub freq_y: f64,
    pub amp_x: f64,
    pub amp_y: f64,
}

impl Default for RippleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            freq_x: 12.0,
            freq_y: 12.0,
            amp_x: 0.012,
            amp_y: 0.012,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnimationConfig {
    pub enabled: bool,
    pub speed: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            speed: 1.0,
        }
    }
}

/// One render call's immutable input snapshot.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct RenderConfig {
    pub palette: Vec<Color>,
    #[serde(default)]
    pub blobs: Vec<ColorBlob>,
    pub style: GradientStyle,
    #[serde(default = "default_intensity")]
    pub intensity: f64,
    #[serde(default = "default_density")]
    pub density: f64,
    #[serde(default = "default_zoom")]
    pub zoom: f64,
    #[serde(default)]
    pub aspect: AspectRatio,
    #[serde(default)]
    pub noise_intensity: f64,
    #[serde(default = "default_posterize_strength")]
    pub posterize_strength: f64,
    #[serde(default)]
    pub overlay: OverlayConfig,
    #[serde(default)]
    pub ripple: RippleConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    /// Determinism seed for shape placement.
    #[serde(default)]
    pub seed: u64,
}

fn default_intensity() -> f64 {
    0.7
}

fn default_density() -> f64 {
    0.7
}

fn default_zoom() -> f64 {
    1.0
}

fn default_posterize_strength() -> f64 {
    0.05
}

impl RenderConfig {
    /// A usable starting configuration around a given palette.
    pub fn with_palette(palette: Vec<Color>) -> Self {
        Self {
            palette,
            blobs: Vec::new(),
            style: GradientStyle::Organic,
            intensity: default_intensity(),
            density: default_density(),
            zoom: default_zoom(),
            aspect: AspectRatio::default(),
            noise_intensity: 0.0,
            posterize_strength: default_posterize_strength(),
            overlay: OverlayConfig::default(),
            ripple: RippleConfig::default(),
            animation: AnimationConfig::default(),
            seed: 0,
        }
    }

    pub fn validate(&self) -> GradixResult<()> {
        if !(2..=6).contains(&self.palette.len()) {
            return Err(GradixError::validation(format!(
                "palette must have 2..=6 colors, got {}",
                self.palette.len()
            )));
        }
        check_range("intensity", self.intensity, 0.0, 1.2)?;
        check_range("density", self.density, 0.0, 1.5)?;
        check_range("zoom", self.zoom, 0.2, 3.0)?;
        check_range("noise_intensity", self.noise_intensity, 0.0, 0.5)?;
        check_range("posterize_strength", self.posterize_strength, 0.0, 1.0)?;
        check_range("overlay.intensity", self.overlay.intensity, 0.0, 1.0)?;
        for (name, v) in [
            ("ripple.freq_x", self.ripple.freq_x),
            ("ripple.freq_y", self.ripple.freq_y),
            ("ripple.amp_x", self.ripple.amp_x),
            ("ripple.amp_y", self.ripple.amp_y),
            ("animation.speed", self.animation.speed),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(GradixError::validation(format!(
                    "{name} must be finite and >= 0"
                )));
            }
        }
        for blob in &self.blobs {
            if !(0.0..=1.0).contains(&blob.x) || !(0.0..=1.0).contains(&blob.y) {
                return Err(GradixError::validation(
                    "blob position must be normalized to [0,1]",
                ));
            }
        }
        Ok(())
    }
}

fn check_range(name: &str, v: f64, lo: f64, hi: f64) -> GradixResult<()> {
    if !v.is_finite() || v < lo || v > hi {
        return Err(GradixError::validation(format!(
            "{name} must be within [{lo}, {hi}], got {v}"
        )));
    }
    Ok(())
}
