use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul};

/// RGBA color with f32 components. Nominally in [0.0, 1.0], but kernel
/// arithmetic never clamps, so values outside that range are legal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Create a new RGBA color.
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color (alpha = 1.0).
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Build a color from normalized 8-bit channels.
    pub fn from_rgba8(px: [u8; 4]) -> Self {
        Self::rgba(
            px[0] as f32 / 255.0,
            px[1] as f32 / 255.0,
            px[2] as f32 / 255.0,
            px[3] as f32 / 255.0,
        )
    }

    /// Convert to RGBA u8, clamping and rounding the way an RGBA8 image
    /// store does.
    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// Scale the color channels only.
    pub fn scale_rgb(self, s: f32) -> Self {
        Self::rgba(self.r * s, self.g * s, self.b * s, self.a)
    }

    /// Euclidean length of the color channels.
    pub fn rgb_length(&self) -> f32 {
        (self.r * self.r + self.g * self.g + self.b * self.b).sqrt()
    }

    /// Linear blend of all four channels, `self * (1 - t) + other * t`.
    /// `t` is not clamped.
    pub fn mix(&self, other: &Color, t: f32) -> Color {
        Color {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// Sum of all four channels.
    pub fn channel_sum(&self) -> f32 {
        self.r + self.g + self.b + self.a
    }

    pub fn is_finite(&self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }

    // --- Named constants ---

    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
}

impl Default for Color {
    fn default() -> Self {
        Color::TRANSPARENT
    }
}

impl Add for Color {
    type Output = Color;
    fn add(self, rhs: Color) -> Color {
        Color::rgba(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b, self.a + rhs.a)
    }
}

impl AddAssign for Color {
    fn add_assign(&mut self, rhs: Color) {
        *self = *self + rhs;
    }
}

impl Mul<f32> for Color {
    type Output = Color;
    fn mul(self, s: f32) -> Color {
        Color::rgba(self.r * s, self.g * s, self.b * s, self.a * s)
    }
}

impl Div<f32> for Color {
    type Output = Color;
    fn div(self, s: f32) -> Color {
        Color::rgba(self.r / s, self.g / s, self.b / s, self.a / s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rgba({:.4}, {:.4}, {:.4}, {:.4})",
            self.r, self.g, self.b, self.a
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba8_round_trip_is_exact() {
        let px = [255, 136, 0, 128];
        assert_eq!(Color::from_rgba8(px).to_rgba8(), px);
    }

    #[test]
    fn test_to_rgba8_clamps() {
        let c = Color::rgba(1.7, -0.3, 0.5, 2.0);
        assert_eq!(c.to_rgba8(), [255, 0, 128, 255]);
    }

    #[test]
    fn test_mix_is_unclamped() {
        let a = Color::BLACK;
        let b = Color::WHITE;
        let mid = a.mix(&b, 0.5);
        assert!((mid.r - 0.5).abs() < 1e-6);
        let past = a.mix(&b, 2.0);
        assert!((past.g - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_scale_rgb_keeps_alpha() {
        let c = Color::rgba(0.5, 0.5, 0.5, -1.0).scale_rgb(2.0);
        assert_eq!(c, Color::rgba(1.0, 1.0, 1.0, -1.0));
    }

    #[test]
    fn test_rgb_length() {
        let c = Color::rgba(0.0, 3.0, 4.0, 9.0);
        assert!((c.rgb_length() - 5.0).abs() < 1e-6);
    }
}
