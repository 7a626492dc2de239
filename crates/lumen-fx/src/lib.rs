//! # lumen-fx
//!
//! Per-pixel post-process kernels. Each kernel is a pure function of a
//! destination coordinate and read-only inputs; [`dispatch`] runs it once per
//! destination pixel in 16x16 tiles on the rayon pool.
//!
//! - [`GaussianBlurKernel`]: one directional pass of a bilinear-optimized
//!   13-tap Gaussian. Run it twice, (1, 0) then (0, 1), for a 2D blur.
//! - [`RadialBlurKernel`]: ray-marched light shafts toward a focal point,
//!   with occluder separation and dithered color grading.

pub mod dispatch;
pub mod dither;
pub mod gaussian;
pub mod radial;
pub mod sampler;

pub use dispatch::{dispatch, render, workgroup_count, PixelKernel, TILE_SIZE};
pub use dither::{grade, DITHER_MATRIX};
pub use gaussian::{GaussianBlurKernel, GaussianKernelTable};
pub use radial::{RadialBlurKernel, RayMarch, SAMPLE_COUNT};
pub use sampler::{fetch_nearest, sample_bilinear};
