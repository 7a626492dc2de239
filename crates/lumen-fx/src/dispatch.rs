//! Grid execution: one kernel invocation per destination pixel.
//!
//! The destination is split into bands of [`TILE_SIZE`] rows, one rayon task
//! per band, and each band walks its 16x16 tiles left to right. Every pixel
//! is owned by exactly one band, so writes never overlap.

use lumen_core::{Color, Image2D, Vec2};
use rayon::prelude::*;

/// Edge length of a square work tile.
pub const TILE_SIZE: u32 = 16;

/// A per-pixel kernel: a pure function of the destination coordinate and
/// read-only inputs.
pub trait PixelKernel: Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Compute the color of destination pixel `(x, y)` of a `dst_size` image.
    fn shade(&self, src: &Image2D, dst_size: Vec2, x: u32, y: u32) -> Color;
}

/// Number of tiles needed to cover an extent, rounded up on each axis.
pub fn workgroup_count(width: u32, height: u32) -> (u32, u32) {
    (width.div_ceil(TILE_SIZE), height.div_ceil(TILE_SIZE))
}

/// Run `kernel` over every pixel of `dst`, reading from `src`.
pub fn dispatch<K: PixelKernel + ?Sized>(kernel: &K, src: &Image2D, dst: &mut Image2D) {
    if dst.is_empty() {
        return;
    }

    let (groups_x, groups_y) = workgroup_count(dst.width, dst.height);
    tracing::debug!(
        kernel = kernel.name(),
        src_width = src.width,
        src_height = src.height,
        dst_width = dst.width,
        dst_height = dst.height,
        groups_x,
        groups_y,
        "dispatching"
    );

    let dst_size = dst.size();
    let width = dst.width;
    let stride = width as usize;

    dst.data
        .par_chunks_mut(stride * TILE_SIZE as usize)
        .enumerate()
        .for_each(|(band, rows)| {
            let y0 = band as u32 * TILE_SIZE;
            let band_rows = rows.len() / stride;
            for tile_x in 0..groups_x {
                let x0 = tile_x * TILE_SIZE;
                let x1 = (x0 + TILE_SIZE).min(width);
                for ly in 0..band_rows {
                    let y = y0 + ly as u32;
                    let row = &mut rows[ly * stride..(ly + 1) * stride];
                    for x in x0..x1 {
                        row[x as usize] = kernel.shade(src, dst_size, x, y);
                    }
                }
            }
        });
}

/// Allocate a `width` x `height` destination and dispatch into it.
pub fn render<K: PixelKernel + ?Sized>(kernel: &K, src: &Image2D, width: u32, height: u32) -> Image2D {
    let mut dst = Image2D::new(width, height);
    dispatch(kernel, src, &mut dst);
    dst
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Writes its own coordinate and counts invocations.
    struct CoordKernel {
        calls: AtomicUsize,
    }

    impl PixelKernel for CoordKernel {
        fn name(&self) -> &'static str {
            "coord"
        }

        fn shade(&self, _src: &Image2D, dst_size: Vec2, x: u32, y: u32) -> Color {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Color::rgba(x as f32, y as f32, dst_size.x, dst_size.y)
        }
    }

    #[test]
    fn test_workgroup_count_rounds_up() {
        assert_eq!(workgroup_count(16, 16), (1, 1));
        assert_eq!(workgroup_count(17, 1), (2, 1));
        assert_eq!(workgroup_count(1920, 1080), (120, 68));
        assert_eq!(workgroup_count(0, 5), (0, 1));
    }

    #[test]
    fn test_every_pixel_written_once() {
        let kernel = CoordKernel {
            calls: AtomicUsize::new(0),
        };
        let src = Image2D::new(1, 1);
        // Deliberately not a multiple of the tile size.
        let dst = render(&kernel, &src, 37, 21);
        assert_eq!(kernel.calls.load(Ordering::Relaxed), 37 * 21);
        for y in 0..21 {
            for x in 0..37 {
                assert_eq!(
                    dst.get(x, y),
                    Some(Color::rgba(x as f32, y as f32, 37.0, 21.0))
                );
            }
        }
    }

    #[test]
    fn test_empty_destination_is_noop() {
        let kernel = CoordKernel {
            calls: AtomicUsize::new(0),
        };
        let src = Image2D::new(4, 4);
        let dst = render(&kernel, &src, 0, 8);
        assert!(dst.is_empty());
        assert_eq!(kernel.calls.load(Ordering::Relaxed), 0);
    }
}
