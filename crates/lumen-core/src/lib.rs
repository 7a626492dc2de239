//! # lumen-core
//!
//! Core types shared by the Lumen post-process kernels:
//! float RGBA images, 2D vectors, colors, the color-grading volume,
//! pass parameters and error types.

pub mod color;
pub mod config;
pub mod error;
pub mod image;
pub mod math;
pub mod volume;

pub use config::*;

pub use color::Color;
pub use error::{LumenError, LumenResult};
pub use image::{EdgePolicy, Image2D};
pub use math::Vec2;
pub use volume::{GradingVolume, VolumeFilter};
