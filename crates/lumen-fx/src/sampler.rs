//! Bilinear reconstruction from a discretely addressed image.
//!
//! Texels are addressed at their integer corner: `coord * size` lands exactly
//! on texel `(x, y)` when `coord == (x, y) / size`, and the fractional part of
//! `coord * size` blends toward the right and lower neighbors.

use lumen_core::{Color, EdgePolicy, Image2D, Vec2};

/// Scaled coordinates this close to an integer are treated as that integer,
/// so `(x / size) * size` addresses texel `x` even when the division rounds.
const TEXEL_SNAP: f32 = 1.0 / 4096.0;

fn snap(v: f32) -> f32 {
    let r = v.round();
    if (v - r).abs() < TEXEL_SNAP {
        r
    } else {
        v
    }
}

fn texel_position(image: &Image2D, coord: Vec2) -> Vec2 {
    let p = coord * image.size();
    Vec2::new(snap(p.x), snap(p.y))
}

/// 4-tap bilinear sample at a normalized coordinate.
pub fn sample_bilinear(image: &Image2D, coord: Vec2, edge: EdgePolicy) -> Color {
    let pos = texel_position(image, coord);
    let base = pos.floor();
    let f = pos - base;
    let (x, y) = (base.x as i64, base.y as i64);

    let s00 = image.load(x, y, edge);
    let right = image.load(x.saturating_add(1), y, edge);
    let below = image.load(x, y.saturating_add(1), edge);
    let diag = image.load(x.saturating_add(1), y.saturating_add(1), edge);

    let top = s00.mix(&right, f.x);
    let bottom = below.mix(&diag, f.x);
    top.mix(&bottom, f.y)
}

/// Unfiltered fetch of the texel containing a normalized coordinate.
pub fn fetch_nearest(image: &Image2D, coord: Vec2, edge: EdgePolicy) -> Color {
    let base = texel_position(image, coord).floor();
    image.load(base.x as i64, base.y as i64, edge)
}
