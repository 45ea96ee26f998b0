//! Resolution-independent shape planning.
//!
//! Every style builds its composition as a list of shapes whose geometry is
//! expressed in normalized canvas coordinates (fractions of width/height,
//! never pixels). The plan is what makes export resolution-independent: the
//! rasterizer receives the same plan whatever the target dimensions.
//!
//! Placement draws from a [`Rng64`] stream seeded per shape index from the
//! config seed, so preview and export agree bit-for-bit. Only the explicit
//! "extra accent" shapes at high intensity/density draw from the separate
//! accent generator and are exempt from that guarantee.

use kurbo::Point;

use crate::compose::blend::{BlendMode, SHAPE_MODE_CYCLE, SUNBURST_MODE_CYCLE, mode_for_shape};
use crate::config::{GradientStyle, RenderConfig};
use crate::foundation::math::{Rng64, mix_seed};

const SALT_ORGANIC: u64 = 0x6F72_6761;
const SALT_LINEAR: u64 = 0x6C69_6E65;
const SALT_RADIAL: u64 = 0x7261_6469;
const SALT_MESH: u64 = 0x6D65_7368;
const SALT_SUNBURST: u64 = 0x7375_6E62;

/// Largest sinusoidal drift applied to any coordinate under animation.
const DRIFT_AMPLITUDE: f64 = 0.02;

/// A full-surface composition: opaque base fill plus ordered shapes.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapePlan {
    pub base: [u8; 3],
    pub shapes: Vec<Shape>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    pub geom: ShapeGeom,
    pub rgb: [u8; 3],
    pub mode: BlendMode,
    pub opacity: f64,
}

/// Shape geometry in normalized canvas coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum ShapeGeom {
    /// Radial blob, 3-stop falloff (center -> 70% mid -> transparent edge).
    Blob { cx: f64, cy: f64, radius: f64 },
    /// Full-diagonal soft band along `angle`, 6-stop falloff.
    Band {
        cx: f64,
        cy: f64,
        angle: f64,
        half_width: f64,
    },
    /// Large radial burst, 4-stop falloff.
    Burst { cx: f64, cy: f64, radius: f64 },
    /// Filled triangle with a radial gradient about its centroid.
    Triangle { a: Point, b: Point, c: Point },
    /// Rotated connector bar between two anchors, faded at both ends.
    Bar {
        from: Point,
        to: Point,
        thickness: f64,
    },
    /// Angular wedge ray from a center, radial falloff to transparent.
    Ray {
        cx: f64,
        cy: f64,
        angle: f64,
        spread: f64,
        radius: f64,
    },
}

/// Build the composition for one render call.
///
/// `accents` feeds only the extra accent shapes; the deterministic placement
/// stream never touches it.
#[tracing::instrument(skip(cfg, accents), fields(style = ?cfg.style))]
pub fn build_plan(cfg: &RenderConfig, time: f64, accents: &mut Rng64) -> ShapePlan {
    let base = cfg
        .palette
        .first()
        .map(|c| c.rgb)
        .unwrap_or([0x64, 0x74, 0x8B]);

    let mut shapes = Vec::new();
    if !cfg.palette.is_empty() {
        match cfg.style {
            GradientStyle::Organic => plan_organic(cfg, time, accents, &mut shapes),
            GradientStyle::Linear => plan_linear(cfg, time, accents, &mut shapes),
            GradientStyle::Radial => plan_radial(cfg, time, accents, &mut shapes),
            GradientStyle::Mesh => plan_mesh(cfg, time, accents, &mut shapes),
            GradientStyle::Sunburst => plan_sunburst(cfg, time, &mut shapes),
        }
        apply_zoom(&mut shapes, cfg.zoom);
    }

    ShapePlan { base, shapes }
}

/// Normalized intensity in [0,1] (slider range is [0,1.2]).
fn intensity_norm(cfg: &RenderConfig) -> f64 {
    (cfg.intensity / 1.2).clamp(0.0, 1.0)
}

/// Monotone count ramp from `lo` to `hi` as `t` sweeps `[0, t_max]`.
fn scaled_count(lo: usize, hi: usize, t: f64, t_max: f64) -> usize {
    let t = (t / t_max).clamp(0.0, 1.0);
    lo + ((hi - lo) as f64 * t).round() as usize
}

/// Intensity bonus shapes, 0..=max.
fn intensity_bonus(cfg: &RenderConfig, max: usize) -> usize {
    ((intensity_norm(cfg) * (max as f64 + 0.999)).floor() as usize).min(max)
}

/// Base center opacity; monotone in intensity.
fn base_opacity(cfg: &RenderConfig) -> f64 {
    0.35 + 0.45 * intensity_norm(cfg)
}

fn shape_rng(cfg: &RenderConfig, salt: u64, index: usize) -> Rng64 {
    Rng64::new(mix_seed(cfg.seed ^ salt, index as u64))
}

/// Sinusoidal drift/breathing under animation; zero otherwise.
fn drift(cfg: &RenderConfig, time: f64, index: usize) -> (f64, f64, f64) {
    if !cfg.animation.enabled {
        return (0.0, 0.0, 1.0);
    }
    let t = time * cfg.animation.speed;
    let i = index as f64;
    (
        (t + i * 1.7).sin() * DRIFT_AMPLITUDE,
        (t * 0.8 + i * 2.3).cos() * DRIFT_AMPLITUDE,
        1.0 + (t * 1.1 + i * 0.9).sin() * 0.03,
    )
}

/// Blob-hinted position for shape `index`, else a seeded pseudo-position.
fn hinted_position(cfg: &RenderConfig, index: usize, rng: &mut Rng64) -> (f64, f64, Option<f64>) {
    if let Some(blob) = cfg.blobs.get(index) {
        (blob.x, blob.y, Some(blob.radius))
    } else {
        (rng.next_f64_01(), rng.next_f64_01(), None)
    }
}

fn palette_rgb(cfg: &RenderConfig, index: usize) -> [u8; 3] {
    cfg.palette[index % cfg.palette.len()].rgb
}

fn plan_organic(cfg: &RenderConfig, time: f64, accents: &mut Rng64, shapes: &mut Vec<Shape>) {
    let count = scaled_count(2, 15, cfg.density, 1.5) + intensity_bonus(cfg, 3);
    let opacity = base_opacity(cfg);

    for i in 0..count {
        let mut rng = shape_rng(cfg, SALT_ORGANIC, i);
        let (x, y, hint_radius) = hinted_position(cfg, i, &mut rng);
        let (dx, dy, breath) = drift(cfg, time, i);
        let radius = match hint_radius {
            Some(r) => r * (1.0 + 0.3 * intensity_norm(cfg)),
            None => 0.18 + rng.next_f64_01() * 0.25 + 0.1 * intensity_norm(cfg),
        };

        shapes.push(Shape {
            geom: ShapeGeom::Blob {
                cx: x + dx,
                cy: y + dy,
                radius: radius * breath,
            },
            rgb: palette_rgb(cfg, i),
            mode: mode_for_shape(i, &SHAPE_MODE_CYCLE),
            opacity,
        });
    }

    // Extra low-opacity accent blobs at high density.
    if cfg.density > 0.8 {
        let extra = 1 + ((cfg.density - 0.8) * 4.0) as usize;
        for j in 0..extra {
            let color = accents.next_below(cfg.palette.len() as u64) as usize;
            shapes.push(Shape {
                geom: ShapeGeom::Blob {
                    cx: accents.next_f64_01(),
                    cy: accents.next_f64_01(),
                    radius: accents.next_range(0.1, 0.3),
                },
                rgb: palette_rgb(cfg, color),
                mode: mode_for_shape(count + j, &SHAPE_MODE_CYCLE),
                opacity: 0.12,
            });
        }
    }
}

fn plan_linear(cfg: &RenderConfig, time: f64, accents: &mut Rng64, shapes: &mut Vec<Shape>) {
    let count = scaled_count(3, 12, cfg.density, 1.5) + intensity_bonus(cfg, 2);
    let opacity = base_opacity(cfg);

    for i in 0..count {
        let mut rng = shape_rng(cfg, SALT_LINEAR, i);
        let angle = band_angle(cfg, i, &mut rng);
        let (dx, dy, _) = drift(cfg, time, i);

        shapes.push(Shape {
            geom: ShapeGeom::Band {
                cx: rng.next_range(0.25, 0.75) + dx,
                cy: rng.next_range(0.25, 0.75) + dy,
                angle,
                half_width: 0.08 + rng.next_f64_01() * 0.12 + 0.05 * intensity_norm(cfg),
            },
            rgb: palette_rgb(cfg, i),
            mode: mode_for_shape(i, &SHAPE_MODE_CYCLE),
            opacity,
        });
    }

    // Extra dramatic accent bands at high intensity.
    if cfg.intensity > 0.6 {
        let extra = 1 + ((cfg.intensity - 0.6) * 2.0) as usize;
        for j in 0..extra {
            let color = accents.next_below(cfg.palette.len() as u64) as usize;
            shapes.push(Shape {
                geom: ShapeGeom::Band {
                    cx: accents.next_range(0.2, 0.8),
                    cy: accents.next_range(0.2, 0.8),
                    angle: accents.next_range(0.0, std::f64::consts::PI),
                    half_width: accents.next_range(0.03, 0.07),
                },
                rgb: palette_rgb(cfg, color),
                mode: mode_for_shape(count + j, &SHAPE_MODE_CYCLE),
                opacity: (opacity + 0.15).min(1.0),
            });
        }
    }
}

/// Band angle from consecutive blob-to-blob vectors when blobs exist.
fn band_angle(cfg: &RenderConfig, index: usize, rng: &mut Rng64) -> f64 {
    if cfg.blobs.len() >= 2 {
        let a = &cfg.blobs[index % cfg.blobs.len()];
        let b = &cfg.blobs[(index + 1) % cfg.blobs.len()];
        (b.y - a.y).atan2(b.x - a.x)
    } else {
        rng.next_range(0.0, std::f64::consts::PI)
    }
}

fn plan_radial(cfg: &RenderConfig, time: f64, accents: &mut Rng64, shapes: &mut Vec<Shape>) {
    let count = scaled_count(2, 8, cfg.density, 1.5) + intensity_bonus(cfg, 2);
    let opacity = base_opacity(cfg);

    for i in 0..count {
        let mut rng = shape_rng(cfg, SALT_RADIAL, i);
        let (x, y, hint_radius) = hinted_position(cfg, i, &mut rng);
        let (dx, dy, breath) = drift(cfg, time, i);
        let radius = match hint_radius {
            Some(r) => (r * 2.0).clamp(0.25, 0.8),
            None => 0.35 + rng.next_f64_01() * 0.3 + 0.15 * intensity_norm(cfg),
        };

        shapes.push(Shape {
            geom: ShapeGeom::Burst {
                cx: x + dx,
                cy: y + dy,
                radius: radius * breath,
            },
            rgb: palette_rgb(cfg, i),
            mode: mode_for_shape(i, &SHAPE_MODE_CYCLE),
            opacity,
        });
    }

    if cfg.intensity > 0.5 {
        for _ in 0..2usize {
            let color = accents.next_below(cfg.palette.len() as u64) as usize;
            shapes.push(Shape {
                geom: ShapeGeom::Burst {
                    cx: accents.next_f64_01(),
                    cy: accents.next_f64_01(),
                    radius: accents.next_range(0.3, 0.6),
                },
                rgb: palette_rgb(cfg, color),
                mode: BlendMode::Overlay,
                opacity: 0.25,
            });
        }
    }

    // Saturated hotspots punch through with the dodge mode.
    if cfg.intensity > 0.7 {
        let hotspots = 1 + accents.next_below(2) as usize;
        for _ in 0..hotspots {
            let color = accents.next_below(cfg.palette.len() as u64) as usize;
            shapes.push(Shape {
                geom: ShapeGeom::Blob {
                    cx: accents.next_f64_01(),
                    cy: accents.next_f64_01(),
                    radius: accents.next_range(0.08, 0.18),
                },
                rgb: palette_rgb(cfg, color),
                mode: BlendMode::ColorDodge,
                opacity: 0.5,
            });
        }
    }
}

fn plan_mesh(cfg: &RenderConfig, time: f64, accents: &mut Rng64, shapes: &mut Vec<Shape>) {
    let anchor_count = scaled_count(4, 16, cfg.density, 1.5) + intensity_bonus(cfg, 2);
    let opacity = base_opacity(cfg);

    let mut anchors = Vec::with_capacity(anchor_count);
    for i in 0..anchor_count {
        let mut rng = shape_rng(cfg, SALT_MESH, i);
        let (x, y, _) = hinted_position(cfg, i, &mut rng);
        let (dx, dy, _) = drift(cfg, time, i);
        anchors.push(Point::new(x + dx, y + dy));
    }

    // Triangles over consecutive anchor triples.
    for i in 0..anchor_count.saturating_sub(2) {
        shapes.push(Shape {
            geom: ShapeGeom::Triangle {
                a: anchors[i],
                b: anchors[i + 1],
                c: anchors[i + 2],
            },
            rgb: palette_rgb(cfg, i),
            mode: mode_for_shape(i, &SHAPE_MODE_CYCLE),
            opacity,
        });
    }

    // Circular overlay zones at high intensity.
    if cfg.intensity > 0.5 {
        for _ in 0..2usize {
            let color = accents.next_below(cfg.palette.len() as u64) as usize;
            shapes.push(Shape {
                geom: ShapeGeom::Blob {
                    cx: accents.next_f64_01(),
                    cy: accents.next_f64_01(),
                    radius: accents.next_range(0.2, 0.35),
                },
                rgb: palette_rgb(cfg, color),
                mode: BlendMode::Overlay,
                opacity: 0.2,
            });
        }
    }

    // Gradient connector bars between distant anchor pairs.
    if cfg.intensity > 0.7 {
        let mut bars = 0usize;
        'outer: for i in 0..anchors.len() {
            for j in (i + 1)..anchors.len() {
                if anchors[i].distance(anchors[j]) > 0.45 {
                    shapes.push(Shape {
                        geom: ShapeGeom::Bar {
                            from: anchors[i],
                            to: anchors[j],
                            thickness: 0.035,
                        },
                        rgb: palette_rgb(cfg, i + j),
                        mode: mode_for_shape(shapes.len(), &SHAPE_MODE_CYCLE),
                        opacity: 0.3,
                    });
                    bars += 1;
                    if bars == 3 {
                        break 'outer;
                    }
                }
            }
        }
    }
}

fn plan_sunburst(cfg: &RenderConfig, time: f64, shapes: &mut Vec<Shape>) {
    let rays = scaled_count(16, 64, cfg.density, 1.5);
    let opacity = 0.3 + 0.4 * intensity_norm(cfg);

    let (dx, dy, _) = drift(cfg, time, 0);
    let (cx, cy) = (0.5 + dx, 0.5 + dy);

    let step = std::f64::consts::TAU / rays as f64;
    for i in 0..rays {
        let mut rng = shape_rng(cfg, SALT_SUNBURST, i);
        shapes.push(Shape {
            geom: ShapeGeom::Ray {
                cx,
                cy,
                angle: step * i as f64,
                spread: step * 1.35,
                radius: 0.75 + rng.next_f64_01() * 0.2,
            },
            rgb: palette_rgb(cfg, i),
            mode: mode_for_shape(i, &SUNBURST_MODE_CYCLE),
            opacity,
        });
    }

    // Central glow above the derived-intensity threshold.
    if intensity_norm(cfg) > 0.55 {
        shapes.push(Shape {
            geom: ShapeGeom::Blob {
                cx,
                cy,
                radius: 0.3,
            },
            rgb: palette_rgb(cfg, 1),
            mode: BlendMode::Screen,
            opacity: 0.5,
        });
    }
}

/// Uniform scale about the canvas center, applied after planning so zoom is
/// style-agnostic.
fn apply_zoom(shapes: &mut [Shape], zoom: f64) {
    if (zoom - 1.0).abs() < 1e-12 {
        return;
    }

    let zp = |v: f64| 0.5 + (v - 0.5) * zoom;
    let zpt = |p: Point| Point::new(zp(p.x), zp(p.y));

    for shape in shapes {
        match &mut shape.geom {
            ShapeGeom::Blob { cx, cy, radius } | ShapeGeom::Burst { cx, cy, radius } => {
                *cx = zp(*cx);
                *cy = zp(*cy);
                *radius *= zoom;
            }
            ShapeGeom::Band {
                cx,
                cy,
                half_width,
                ..
            } => {
                *cx = zp(*cx);
                *cy = zp(*cy);
                *half_width *= zoom;
            }
            ShapeGeom::Triangle { a, b, c } => {
                *a = zpt(*a);
                *b = zpt(*b);
                *c = zpt(*c);
            }
            ShapeGeom::Bar {
                from,
                to,
                thickness,
            } => {
                *from = zpt(*from);
                *to = zpt(*to);
                *thickness *= zoom;
            }
            ShapeGeom::Ray {
                cx, cy, radius, ..
            } => {
                *cx = zp(*cx);
                *cy = zp(*cy);
                *radius *= zoom;
            }
        }
    }
}
