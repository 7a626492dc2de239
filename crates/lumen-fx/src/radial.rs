//! Radial light-shaft blur.
//!
//! Each destination pixel marches [`SAMPLE_COUNT`] steps toward the focal
//! center, attenuating later samples by `decay`. Samples are split by alpha:
//! positive alpha marks light, zero or negative alpha marks occluders. The
//! averaged light is added on top of the base color, and the occluder
//! average scales the base color, so occluders darken the shafts instead of
//! being blended into them.

use lumen_core::{Color, GradingVolume, Image2D, RadialParams, Vec2};

use crate::dispatch::{dispatch, PixelKernel};
use crate::dither::grade;
use crate::sampler::sample_bilinear;

/// Ray-march steps per pixel.
pub const SAMPLE_COUNT: u32 = 32;

/// The `negative_weight` at which the occluder factor is applied in full.
pub const REFERENCE_NEGATIVE_WEIGHT: f32 = 0.4;

/// Accumulated ray-march samples, split into light and occluder classes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RayMarch {
    pub positive_sum: Color,
    pub negative_sum: Color,
    pub positive_count: u32,
    pub negative_count: u32,
}

impl RayMarch {
    fn push(&mut self, sample: Color) {
        if sample.a > 0.0 {
            self.positive_sum += sample;
            self.positive_count += 1;
        } else {
            self.negative_sum += sample;
            self.negative_count += 1;
        }
    }

    pub fn positive_average(&self) -> Color {
        average(self.positive_sum, self.positive_count)
    }

    pub fn negative_average(&self) -> Color {
        average(self.negative_sum, self.negative_count)
    }
}

fn average(sum: Color, count: u32) -> Color {
    let n = if count > 0 { count as f32 } else { 1.0 };
    sum / n
}

/// The light-shaft pass. Borrows the grading volume for its lifetime.
#[derive(Debug, Clone, Copy)]
pub struct RadialBlurKernel<'a> {
    params: RadialParams,
    volume: &'a GradingVolume,
}

impl<'a> RadialBlurKernel<'a> {
    pub fn new(params: RadialParams, volume: &'a GradingVolume) -> Self {
        Self { params, volume }
    }

    /// March from `origin` toward the focal center and accumulate samples.
    pub fn march(&self, src: &Image2D, origin: Vec2) -> RayMarch {
        let delta = (origin - self.params.center) / SAMPLE_COUNT as f32 * self.params.density;
        let mut coord = origin;
        let mut illumination = 1.0f32;
        let mut ray = RayMarch::default();

        for _ in 0..SAMPLE_COUNT {
            coord -= delta;
            let sample = sample_bilinear(src, coord, self.params.edge).scale_rgb(illumination);
            ray.push(sample);
            illumination *= self.params.decay;
        }
        ray
    }

    /// Combine the march with the base color, before grading.
    pub fn composite(&self, ray: &RayMarch, base: Color) -> [f32; 3] {
        let light = ray.positive_average();
        let shadow = ray.negative_average();

        let base_factor = if self.params.negative_weight > 0.0 {
            let t = self.params.negative_weight / REFERENCE_NEGATIVE_WEIGHT;
            (1.0 - t) + shadow.rgb_length() * t
        } else {
            1.0
        };

        let gain = self.params.positive_weight * SAMPLE_COUNT as f32;
        [
            light.r * gain + base.r * base_factor,
            light.g * gain + base.g * base_factor,
            light.b * gain + base.b * base_factor,
        ]
    }

    /// Run the pass from `src` into `dst`.
    pub fn apply(&self, src: &Image2D, dst: &mut Image2D) {
        dispatch(self, src, dst);
    }
}

impl PixelKernel for RadialBlurKernel<'_> {
    fn name(&self) -> &'static str {
        "radial"
    }

    fn shade(&self, src: &Image2D, dst_size: Vec2, x: u32, y: u32) -> Color {
        let origin = Vec2::new(x as f32, y as f32) / dst_size;
        let ray = self.march(src, origin);
        let base = sample_bilinear(src, origin, self.params.edge);
        let rgb = self.composite(&ray, base);
        let graded = grade(self.volume, origin * src.size(), rgb);
        Color::rgb(graded[0], graded[1], graded[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::render;
    use lumen_core::VolumeFilter;

    fn params() -> RadialParams {
        RadialParams {
            center: Vec2::new(0.5, 0.5),
            ..RadialParams::default()
        }
    }

    #[test]
    fn test_counts_always_sum_to_sample_count() {
        let mut src = Image2D::new(8, 8);
        for y in 0..8 {
            for x in 0..8 {
                let a = if (x + y) % 3 == 0 { -1.0 } else { 0.5 };
                src.set(x, y, Color::rgba(0.5, 0.5, 0.5, a));
            }
        }
        let volume = GradingVolume::identity(16);
        let kernel = RadialBlurKernel::new(params(), &volume);
        for y in 0..8 {
            for x in 0..8 {
                let ray = kernel.march(&src, Vec2::new(x as f32 / 8.0, y as f32 / 8.0));
                assert_eq!(ray.positive_count + ray.negative_count, SAMPLE_COUNT);
            }
        }
    }

    #[test]
    fn test_zero_alpha_routes_to_occluders() {
        let src = Image2D::solid(4, 4, Color::rgba(1.0, 1.0, 1.0, 0.0));
        let volume = GradingVolume::identity(16);
        let kernel = RadialBlurKernel::new(params(), &volume);
        let ray = kernel.march(&src, Vec2::new(0.25, 0.25));
        assert_eq!(ray.negative_count, SAMPLE_COUNT);
        assert_eq!(ray.positive_count, 0);
        assert_eq!(ray.positive_average(), Color::TRANSPARENT);
    }

    #[test]
    fn test_first_sample_is_unattenuated() {
        let src = Image2D::solid(4, 4, Color::WHITE);
        let volume = GradingVolume::identity(16);
        let p = RadialParams {
            decay: 0.5,
            ..params()
        };
        let kernel = RadialBlurKernel::new(p, &volume);
        let ray = kernel.march(&src, Vec2::new(0.25, 0.25));
        // Geometric series 1 + 0.5 + ... + 0.5^31.
        let expected = (1.0 - 0.5f32.powi(32)) / 0.5;
        assert!((ray.positive_sum.r - expected).abs() < 1e-5);
        // Alpha is never attenuated.
        assert!((ray.positive_sum.a - 32.0).abs() < 1e-5);
    }

    #[test]
    fn test_composite_default_weights() {
        let volume = GradingVolume::identity(16);
        let kernel = RadialBlurKernel::new(params(), &volume);
        let ray = RayMarch {
            positive_sum: Color::rgba(0.8, 0.4, 0.0, 2.0),
            negative_sum: Color::rgba(0.0, 0.6, 0.8, 0.0),
            positive_count: 2,
            negative_count: 2,
        };
        let base = Color::rgb(0.5, 0.5, 0.5);
        let rgb = kernel.composite(&ray, base);
        // light avg (0.4, 0.2, 0) * 0.05 * 32; shadow avg length 0.5 at full weight.
        assert!((rgb[0] - (0.4 * 1.6 + 0.25)).abs() < 1e-5);
        assert!((rgb[1] - (0.2 * 1.6 + 0.25)).abs() < 1e-5);
        assert!((rgb[2] - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_composite_without_negative_weight_keeps_base() {
        let volume = GradingVolume::identity(16);
        let p = RadialParams {
            positive_weight: 0.0,
            negative_weight: 0.0,
            ..params()
        };
        let kernel = RadialBlurKernel::new(p, &volume);
        let ray = RayMarch {
            negative_sum: Color::rgba(5.0, 5.0, 5.0, 0.0),
            negative_count: 32,
            ..RayMarch::default()
        };
        let rgb = kernel.composite(&ray, Color::rgb(0.1, 0.2, 0.3));
        assert_eq!(rgb, [0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_composite_half_negative_weight() {
        let volume = GradingVolume::identity(16);
        let p = RadialParams {
            positive_weight: 0.0,
            negative_weight: 0.2,
            ..params()
        };
        let kernel = RadialBlurKernel::new(p, &volume);
        // No occluders: shadow length 0, factor mix(1, 0, 0.5) = 0.5.
        let rgb = kernel.composite(&RayMarch::default(), Color::rgb(0.8, 0.8, 0.8));
        assert!((rgb[0] - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_output_alpha_is_opaque() {
        let src = Image2D::solid(8, 8, Color::rgba(0.5, 0.25, 0.125, 0.3));
        let volume = GradingVolume::identity(16);
        let kernel = RadialBlurKernel::new(params(), &volume);
        let dst = render(&kernel, &src, 8, 8);
        assert!(dst.data.iter().all(|c| c.a == 1.0));
    }

    #[test]
    fn test_apply_fills_caller_destination() {
        let src = Image2D::solid(8, 8, Color::rgb(0.5, 0.25, 0.125));
        let volume = GradingVolume::identity(16);
        let kernel = RadialBlurKernel::new(params(), &volume);

        let mut dst = Image2D::new(4, 4);
        kernel.apply(&src, &mut dst);

        assert_eq!(dst, render(&kernel, &src, 4, 4));
        assert!(dst.data.iter().all(|c| c.a == 1.0));
    }

    #[test]
    fn test_black_source_stays_black() {
        let src = Image2D::solid(8, 8, Color::BLACK);
        let volume = GradingVolume::identity(16).with_filter(VolumeFilter::Nearest);
        let kernel = RadialBlurKernel::new(params(), &volume);
        let dst = render(&kernel, &src, 8, 8);
        assert!(dst.data.iter().all(|c| *c == Color::BLACK));
    }
}
