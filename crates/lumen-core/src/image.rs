use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{LumenError, LumenResult};
use crate::math::Vec2;

/// What a texel fetch returns for integer coordinates outside the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgePolicy {
    /// Clamp the coordinate to the nearest edge texel.
    #[default]
    ClampToEdge,
    /// Return transparent black, like an out-of-range GPU image load.
    Transparent,
}

/// A 2D grid of float RGBA texels, row-major, origin top-left.
#[derive(Debug, Clone, PartialEq)]
pub struct Image2D {
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Texel data, `width * height` entries.
    pub data: Vec<Color>,
}

impl Image2D {
    /// Create an image filled with transparent black.
    pub fn new(width: u32, height: u32) -> Self {
        Self::solid(width, height, Color::TRANSPARENT)
    }

    /// Create an image filled with a solid color.
    pub fn solid(width: u32, height: u32, color: Color) -> Self {
        let count = (width as usize) * (height as usize);
        Self {
            width,
            height,
            data: vec![color; count],
        }
    }

    /// Build an image from tightly packed 8-bit RGBA bytes.
    pub fn from_rgba8(width: u32, height: u32, bytes: &[u8]) -> LumenResult<Self> {
        let expected = (width as usize) * (height as usize) * 4;
        if bytes.len() != expected {
            return Err(LumenError::InvalidArgument(format!(
                "RGBA8 buffer has {} bytes, expected {} for {}x{}",
                bytes.len(),
                expected,
                width,
                height
            )));
        }
        let data = bytes
            .chunks_exact(4)
            .map(|px| Color::from_rgba8([px[0], px[1], px[2], px[3]]))
            .collect();
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Pack into 8-bit RGBA bytes (clamped, rounded).
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.data.iter().flat_map(|c| c.to_rgba8()).collect()
    }

    /// Total number of texels.
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Dimensions as a float vector, for normalized-coordinate math.
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Get the texel at a coordinate. Returns None if out of bounds.
    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[self.index(x, y)])
    }

    /// Set the texel at a coordinate. No-op if out of bounds.
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = self.index(x, y);
        self.data[i] = color;
    }

    /// Texel fetch at a signed integer coordinate, resolving out-of-range
    /// reads with `edge`.
    pub fn load(&self, x: i64, y: i64, edge: EdgePolicy) -> Color {
        if self.is_empty() {
            return Color::TRANSPARENT;
        }
        let w = self.width as i64;
        let h = self.height as i64;
        let (x, y) = match edge {
            EdgePolicy::ClampToEdge => (x.clamp(0, w - 1), y.clamp(0, h - 1)),
            EdgePolicy::Transparent => {
                if x < 0 || y < 0 || x >= w || y >= h {
                    return Color::TRANSPARENT;
                }
                (x, y)
            }
        };
        self.data[(y as usize) * (self.width as usize) + (x as usize)]
    }

    /// Sum of every channel of every texel.
    pub fn channel_sum(&self) -> f64 {
        self.data.iter().map(|c| c.channel_sum() as f64).sum()
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }
}
