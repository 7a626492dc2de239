//! Directional Gaussian blur with bilinear-optimized taps.
//!
//! Six bilinear fetches plus a center fetch stand in for a 13-tap discrete
//! Gaussian: each offset sits between two texels at the point where the
//! bilinear weights reproduce the ratio of the two discrete weights.

use lumen_core::{Color, GaussianParams, Image2D, Vec2};

use crate::dispatch::{dispatch, PixelKernel};
use crate::sampler::{fetch_nearest, sample_bilinear};

pub const TAP_COUNT: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianKernelTable {
    pub center_weight: f32,
    pub weights: [f32; TAP_COUNT],
    /// Tap distances in source texels, before `radius` scaling.
    pub offsets: [f32; TAP_COUNT],
}

impl GaussianKernelTable {
    pub const BILINEAR_13: GaussianKernelTable = GaussianKernelTable {
        center_weight: 0.196483,
        weights: [0.0103814, 0.0944704, 0.296907, 0.296907, 0.0944704, 0.0103814],
        offsets: [-5.17647, -3.29412, -1.41176, 1.41176, 3.29412, 5.17647],
    };

    /// Sum of the center and tap weights.
    pub fn weight_sum(&self) -> f32 {
        self.center_weight + self.weights.iter().sum::<f32>()
    }
}

impl Default for GaussianKernelTable {
    fn default() -> Self {
        Self::BILINEAR_13
    }
}

/// One blur pass along `params.direction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianBlurKernel {
    params: GaussianParams,
    table: GaussianKernelTable,
}

impl GaussianBlurKernel {
    pub fn new(params: GaussianParams) -> Self {
        Self {
            params,
            table: GaussianKernelTable::default(),
        }
    }

    /// Replace the tap table. The result is still normalized by the running
    /// weight sum, so tables need not sum to one.
    pub fn with_table(mut self, table: GaussianKernelTable) -> Self {
        if table.weight_sum() == 0.0 {
            tracing::warn!("gaussian table weights sum to zero; output will be transparent black");
        }
        self.table = table;
        self
    }

    /// Run the pass from `src` into `dst`.
    pub fn apply(&self, src: &Image2D, dst: &mut Image2D) {
        dispatch(self, src, dst);
    }
}

impl PixelKernel for GaussianBlurKernel {
    fn name(&self) -> &'static str {
        "gaussian"
    }

    fn shade(&self, src: &Image2D, dst_size: Vec2, x: u32, y: u32) -> Color {
        let edge = self.params.edge;
        let t = Vec2::new(x as f32, y as f32) / dst_size;
        let dir = self.params.direction / src.size();

        let mut result = fetch_nearest(src, t, edge) * self.table.center_weight;
        let mut weight_sum = self.table.center_weight;

        for (&weight, &offset) in self.table.weights.iter().zip(&self.table.offsets) {
            let coord = t + dir * (offset * self.params.radius);
            result += sample_bilinear(src, coord, edge) * weight;
            weight_sum += weight;
        }

        if weight_sum == 0.0 {
            return Color::TRANSPARENT;
        }
        // Divide rather than multiply by the reciprocal so a uniform input
        // reproduces itself bit for bit.
        result / weight_sum
    }
}
