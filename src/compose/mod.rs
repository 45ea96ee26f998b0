//! The gradient compositor: plan shapes in normalized space, then rasterize.

pub mod blend;
pub mod paint;
pub mod plan;

pub use blend::{BlendMode, SHAPE_MODE_CYCLE, SUNBURST_MODE_CYCLE, mode_for_shape};
pub use paint::paint_plan;
pub use plan::{Shape, ShapeGeom, ShapePlan, build_plan};

use crate::config::RenderConfig;
use crate::foundation::core::PixelBuffer;
use crate::foundation::math::Rng64;

/// One-shot compositor entry: build the plan for `cfg` and paint it at the
/// given pixel dimensions. The output is fully opaque.
pub fn compose(
    cfg: &RenderConfig,
    width: u32,
    height: u32,
    time: f64,
    accents: &mut Rng64,
) -> PixelBuffer {
    let plan = build_plan(cfg, time, accents);
    paint_plan(&plan, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GradientStyle;
    use crate::palette::brand::nearest_brand;

    #[test]
    fn compose_is_opaque_for_every_style() {
        for style in [
            GradientStyle::Organic,
            GradientStyle::Linear,
            GradientStyle::Radial,
            GradientStyle::Mesh,
            GradientStyle::Sunburst,
        ] {
            let mut cfg = crate::config::RenderConfig::with_palette(vec![
                nearest_brand([0x3B, 0x82, 0xF6]),
                nearest_brand([0x10, 0xB9, 0x81]),
            ]);
            cfg.style = style;
            cfg.intensity = 1.0;
            cfg.density = 1.2;

            let buf = compose(&cfg, 48, 27, 0.0, &mut Rng64::new(2));
            assert!(
                buf.data.chunks_exact(4).all(|px| px[3] == 255),
                "{style:?} produced non-opaque output"
            );
        }
    }

    #[test]
    fn same_plan_rasterizes_proportionally_at_two_resolutions() {
        let cfg = crate::config::RenderConfig::with_palette(vec![
            nearest_brand([0x3B, 0x82, 0xF6]),
            nearest_brand([0x8B, 0x5C, 0xF6]),
            nearest_brand([0x10, 0xB9, 0x81]),
        ]);

        let a = build_plan(&cfg, 0.0, &mut Rng64::new(5));
        let b = build_plan(&cfg, 0.0, &mut Rng64::new(5));
        // The plan carries no pixel dimensions at all, so parity of the
        // normalized composition across export sizes is exact.
        assert_eq!(a, b);

        let small = paint_plan(&a, 32, 18);
        let large = paint_plan(&b, 128, 72);
        assert_eq!(small.width * 4, large.width);
        assert!(small.data.chunks_exact(4).all(|px| px[3] == 255));
        assert!(large.data.chunks_exact(4).all(|px| px[3] == 255));
    }
}
