//! Ordered dithering ahead of the color-grading lookup.
//!
//! The threshold is scaled to `value / 65 / 16`, below one step of a 16-entry
//! volume, so it nudges colors across cell boundaries without skipping cells.

use lumen_core::{GradingVolume, Vec2};

/// 8x8 Bayer thresholds, 1..=64. Indexed `[x % 8][y % 8]`.
#[rustfmt::skip]
pub const DITHER_MATRIX: [[u8; 8]; 8] = [
    [ 1, 49, 13, 61,  4, 52, 16, 64],
    [33, 17, 45, 29, 36, 20, 48, 32],
    [ 9, 57,  5, 53, 12, 60,  8, 56],
    [41, 25, 37, 21, 44, 28, 40, 24],
    [ 3, 51, 15, 63,  2, 50, 14, 62],
    [35, 19, 47, 31, 34, 18, 46, 30],
    [11, 59,  7, 55, 10, 58,  6, 54],
    [43, 27, 39, 23, 42, 26, 38, 22],
];

/// Colors whose squared magnitude is below this grade to pure black.
pub const BLACK_THRESHOLD: f32 = 0.001;

/// Per-channel offset for a texel-space coordinate.
pub fn dither_offset(coord: Vec2) -> f32 {
    let cell = coord.rem_euclid(8.0);
    // rem_euclid can round up to 8.0 for tiny negative inputs.
    let i = (cell.x as usize).min(7);
    let j = (cell.y as usize).min(7);
    DITHER_MATRIX[i][j] as f32 / 65.0 / 16.0
}

/// Dither `rgb` by its position and look it up in the grading volume.
pub fn grade(volume: &GradingVolume, coord: Vec2, rgb: [f32; 3]) -> [f32; 3] {
    let energy = rgb[0] * rgb[0] + rgb[1] * rgb[1] + rgb[2] * rgb[2];
    if energy < BLACK_THRESHOLD {
        return [0.0; 3];
    }
    let offset = dither_offset(coord);
    volume.sample(rgb.map(|c| c + offset))
}
