//! Rasterization of a [`ShapePlan`] onto a pixel buffer.
//!
//! All geometry arrives in normalized canvas coordinates; this module is the
//! only place where pixel dimensions enter the compositor. Distances are
//! measured in normalized space, so a "circle" covers the same fraction of
//! width and height at every target resolution.

use kurbo::Point;

use crate::compose::blend::blend_px;
use crate::compose::plan::{Shape, ShapeGeom, ShapePlan};
use crate::foundation::core::PixelBuffer;
use crate::foundation::math::smoothstep;

/// 3-stop blob falloff: center, 70% at the midpoint, transparent edge.
const BLOB_STOPS: [(f64, f64); 3] = [(0.0, 1.0), (0.5, 0.7), (1.0, 0.0)];
/// 4-stop burst falloff.
const BURST_STOPS: [(f64, f64); 4] = [(0.0, 1.0), (0.3, 0.85), (0.65, 0.4), (1.0, 0.0)];
/// 6-stop soft band profile across the perpendicular axis.
const BAND_STOPS: [(f64, f64); 6] = [
    (0.0, 0.0),
    (0.2, 0.3),
    (0.35, 1.0),
    (0.65, 1.0),
    (0.8, 0.3),
    (1.0, 0.0),
];
/// Connector bar profile along its axis, faded at both ends.
const BAR_STOPS: [(f64, f64); 4] = [(0.0, 0.0), (0.25, 1.0), (0.75, 1.0), (1.0, 0.0)];

/// Paint `plan` into a fresh buffer of the given pixel dimensions.
///
/// The first fill is an opaque solid of the plan's base color, so the output
/// is fully opaque before any post-processing.
#[tracing::instrument(skip(plan))]
pub fn paint_plan(plan: &ShapePlan, width: u32, height: u32) -> PixelBuffer {
    let mut buf = PixelBuffer::filled(width, height, plan.base);
    if buf.is_degenerate() {
        return buf;
    }

    for shape in &plan.shapes {
        paint_shape(&mut buf, shape);
    }
    buf
}

fn paint_shape(buf: &mut PixelBuffer, shape: &Shape) {
    let (w, h) = (f64::from(buf.width), f64::from(buf.height));
    let (x0, y0, x1, y1) = pixel_bounds(&shape.geom, buf.width, buf.height);

    for y in y0..y1 {
        let ny = (f64::from(y) + 0.5) / h;
        for x in x0..x1 {
            let nx = (f64::from(x) + 0.5) / w;
            let alpha = coverage(&shape.geom, nx, ny) * shape.opacity;
            if alpha <= 0.0 {
                continue;
            }
            let px = buf.get(x, y);
            buf.put(x, y, blend_px(px, shape.rgb, alpha, shape.mode));
        }
    }
}

/// Clamped pixel bounding box of a normalized-space geometry.
fn pixel_bounds(geom: &ShapeGeom, width: u32, height: u32) -> (u32, u32, u32, u32) {
    let (w, h) = (f64::from(width), f64::from(height));
    let clamp_box = |nx0: f64, ny0: f64, nx1: f64, ny1: f64| {
        let x0 = ((nx0 * w).floor().max(0.0)) as u32;
        let y0 = ((ny0 * h).floor().max(0.0)) as u32;
        let x1 = ((nx1 * w).ceil().min(w)) as u32;
        let y1 = ((ny1 * h).ceil().min(h)) as u32;
        (x0, y0, x1.max(x0), y1.max(y0))
    };

    match *geom {
        ShapeGeom::Blob { cx, cy, radius } | ShapeGeom::Burst { cx, cy, radius } => {
            clamp_box(cx - radius, cy - radius, cx + radius, cy + radius)
        }
        // Bands run the full diagonal.
        ShapeGeom::Band { .. } => (0, 0, width, height),
        ShapeGeom::Triangle { a, b, c } => clamp_box(
            a.x.min(b.x).min(c.x),
            a.y.min(b.y).min(c.y),
            a.x.max(b.x).max(c.x),
            a.y.max(b.y).max(c.y),
        ),
        ShapeGeom::Bar {
            from,
            to,
            thickness,
        } => {
            let t = thickness / 2.0;
            clamp_box(
                from.x.min(to.x) - t,
                from.y.min(to.y) - t,
                from.x.max(to.x) + t,
                from.y.max(to.y) + t,
            )
        }
        ShapeGeom::Ray { cx, cy, radius, .. } => {
            clamp_box(cx - radius, cy - radius, cx + radius, cy + radius)
        }
    }
}

/// Shape coverage (pre-opacity alpha) at a normalized point.
fn coverage(geom: &ShapeGeom, nx: f64, ny: f64) -> f64 {
    match *geom {
        ShapeGeom::Blob { cx, cy, radius } => {
            radial_profile(&BLOB_STOPS, nx, ny, cx, cy, radius)
        }
        ShapeGeom::Burst { cx, cy, radius } => {
            radial_profile(&BURST_STOPS, nx, ny, cx, cy, radius)
        }
        ShapeGeom::Band {
            cx,
            cy,
            angle,
            half_width,
        } => {
            if half_width <= 0.0 {
                return 0.0;
            }
            // Signed distance along the band normal.
            let (sin_a, cos_a) = angle.sin_cos();
            let perp = (nx - cx) * (-sin_a) + (ny - cy) * cos_a;
            let t = 0.5 + perp / (2.0 * half_width);
            profile(&BAND_STOPS, t)
        }
        ShapeGeom::Triangle { a, b, c } => {
            if !point_in_triangle(nx, ny, a, b, c) {
                return 0.0;
            }
            let centroid = Point::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0);
            let reach = (centroid.distance(a) + centroid.distance(b) + centroid.distance(c)) / 3.0;
            radial_profile(&BLOB_STOPS, nx, ny, centroid.x, centroid.y, reach.max(1e-9))
        }
        ShapeGeom::Bar {
            from,
            to,
            thickness,
        } => {
            let axis = to - from;
            let len2 = axis.hypot2();
            if len2 <= 0.0 || thickness <= 0.0 {
                return 0.0;
            }
            let rel = Point::new(nx, ny) - from;
            let along = (rel.x * axis.x + rel.y * axis.y) / len2;
            if !(0.0..=1.0).contains(&along) {
                return 0.0;
            }
            let perp = (rel.x * axis.y - rel.y * axis.x).abs() / len2.sqrt();
            if perp > thickness / 2.0 {
                return 0.0;
            }
            profile(&BAR_STOPS, along)
        }
        ShapeGeom::Ray {
            cx,
            cy,
            angle,
            spread,
            radius,
        } => {
            let (dx, dy) = (nx - cx, ny - cy);
            let dist = (dx * dx + dy * dy).sqrt();
            if dist > radius || radius <= 0.0 || spread <= 0.0 {
                return 0.0;
            }
            let diff = wrap_angle(dy.atan2(dx) - angle).abs();
            let half = spread / 2.0;
            if diff > half {
                return 0.0;
            }
            // Radial falloff to transparent, softened at the angular edges.
            let radial = 1.0 - dist / radius;
            let edge = 1.0 - smoothstep(0.8, 1.0, diff / half);
            radial * edge
        }
    }
}

fn radial_profile(stops: &[(f64, f64)], nx: f64, ny: f64, cx: f64, cy: f64, radius: f64) -> f64 {
    if radius <= 0.0 {
        return 0.0;
    }
    let (dx, dy) = (nx - cx, ny - cy);
    let t = (dx * dx + dy * dy).sqrt() / radius;
    profile(stops, t)
}

/// Piecewise-linear interpolation over gradient stops; zero outside [0,1].
fn profile(stops: &[(f64, f64)], t: f64) -> f64 {
    if !(0.0..=1.0).contains(&t) {
        return 0.0;
    }
    for pair in stops.windows(2) {
        let (t0, v0) = pair[0];
        let (t1, v1) = pair[1];
        if t <= t1 {
            if t1 <= t0 {
                return v1;
            }
            return v0 + (v1 - v0) * (t - t0) / (t1 - t0);
        }
    }
    stops.last().map(|&(_, v)| v).unwrap_or(0.0)
}

/// Same-side edge-function test; tolerant of either winding order.
fn point_in_triangle(px: f64, py: f64, a: Point, b: Point, c: Point) -> bool {
    let edge = |p0: Point, p1: Point| (px - p0.x) * (p1.y - p0.y) - (py - p0.y) * (p1.x - p0.x);
    let d0 = edge(a, b);
    let d1 = edge(b, c);
    let d2 = edge(c, a);
    let has_neg = d0 < 0.0 || d1 < 0.0 || d2 < 0.0;
    let has_pos = d0 > 0.0 || d1 > 0.0 || d2 > 0.0;
    !(has_neg && has_pos)
}

fn wrap_angle(a: f64) -> f64 {
    let mut a = a % std::f64::consts::TAU;
    if a > std::f64::consts::PI {
        a -= std::f64::consts::TAU;
    }
    if a < -std::f64::consts::PI {
        a += std::f64::consts::TAU;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::blend::BlendMode;

    #[test]
    fn base_fill_is_opaque_everywhere() {
        let plan = ShapePlan {
            base: [10, 20, 30],
            shapes: Vec::new(),
        };
        let buf = paint_plan(&plan, 16, 9);
        assert!(buf.data.chunks_exact(4).all(|px| px == [10, 20, 30, 255]));
    }

    #[test]
    fn degenerate_dimensions_no_op() {
        let plan = ShapePlan {
            base: [1, 2, 3],
            shapes: Vec::new(),
        };
        let buf = paint_plan(&plan, 0, 64);
        assert!(buf.is_degenerate());
    }

    #[test]
    fn blob_tints_center_not_corner() {
        let plan = ShapePlan {
            base: [0, 0, 0],
            shapes: vec![Shape {
                geom: ShapeGeom::Blob {
                    cx: 0.5,
                    cy: 0.5,
                    radius: 0.25,
                },
                rgb: [255, 0, 0],
                mode: BlendMode::Normal,
                opacity: 1.0,
            }],
        };
        let buf = paint_plan(&plan, 64, 64);
        assert!(buf.get(32, 32)[0] > 230);
        assert_eq!(buf.get(0, 0), [0, 0, 0, 255]);
        assert_eq!(buf.get(32, 32)[3], 255);
    }

    #[test]
    fn band_covers_its_axis() {
        let plan = ShapePlan {
            base: [0, 0, 0],
            shapes: vec![Shape {
                geom: ShapeGeom::Band {
                    cx: 0.5,
                    cy: 0.5,
                    angle: 0.0,
                    half_width: 0.2,
                },
                rgb: [0, 255, 0],
                mode: BlendMode::Normal,
                opacity: 1.0,
            }],
        };
        let buf = paint_plan(&plan, 64, 64);
        // Horizontal band through the middle: center green, top edge dark.
        assert!(buf.get(32, 32)[1] > 200);
        assert_eq!(buf.get(32, 0)[1], 0);
    }

    #[test]
    fn triangle_fills_inside_only() {
        let plan = ShapePlan {
            base: [0, 0, 0],
            shapes: vec![Shape {
                geom: ShapeGeom::Triangle {
                    a: Point::new(0.1, 0.1),
                    b: Point::new(0.9, 0.1),
                    c: Point::new(0.5, 0.9),
                },
                rgb: [0, 0, 255],
                mode: BlendMode::Normal,
                opacity: 1.0,
            }],
        };
        let buf = paint_plan(&plan, 64, 64);
        assert!(buf.get(32, 20)[2] > 0);
        assert_eq!(buf.get(2, 60)[2], 0);
    }

    #[test]
    fn ray_is_angularly_bounded() {
        let plan = ShapePlan {
            base: [0, 0, 0],
            shapes: vec![Shape {
                geom: ShapeGeom::Ray {
                    cx: 0.5,
                    cy: 0.5,
                    angle: 0.0,
                    spread: 0.6,
                    radius: 0.5,
                },
                rgb: [255, 255, 0],
                mode: BlendMode::Normal,
                opacity: 1.0,
            }],
        };
        let buf = paint_plan(&plan, 64, 64);
        // Along +x from center: lit. Opposite direction: untouched.
        assert!(buf.get(40, 32)[0] > 0);
        assert_eq!(buf.get(20, 32)[0], 0);
    }

    #[test]
    fn profile_interpolates_between_stops() {
        assert_eq!(profile(&BLOB_STOPS, 0.0), 1.0);
        assert!((profile(&BLOB_STOPS, 0.5) - 0.7).abs() < 1e-9);
        assert_eq!(profile(&BLOB_STOPS, 1.0), 0.0);
        assert_eq!(profile(&BLOB_STOPS, 1.5), 0.0);
        let mid = profile(&BAND_STOPS, 0.5);
        assert_eq!(mid, 1.0);
    }

    #[test]
    fn output_fully_opaque_for_all_modes() {
        let modes = [
            BlendMode::Normal,
            BlendMode::Overlay,
            BlendMode::SoftLight,
            BlendMode::HardLight,
            BlendMode::Multiply,
            BlendMode::Screen,
            BlendMode::ColorDodge,
        ];
        let shapes = modes
            .iter()
            .enumerate()
            .map(|(i, &mode)| Shape {
                geom: ShapeGeom::Blob {
                    cx: 0.3 + 0.05 * i as f64,
                    cy: 0.5,
                    radius: 0.3,
                },
                rgb: [200, 100, 50],
                mode,
                opacity: 0.8,
            })
            .collect();
        let plan = ShapePlan {
            base: [30, 30, 30],
            shapes,
        };
        let buf = paint_plan(&plan, 48, 27);
        assert!(buf.data.chunks_exact(4).all(|px| px[3] == 255));
    }
}
