use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LumenError, LumenResult};
use crate::image::EdgePolicy;
use crate::math::Vec2;
use crate::volume::{GradingVolume, VolumeFilter};

/// Parameters of one directional Gaussian pass.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GaussianParams {
    /// Blur direction in source texels per tap unit. (1, 0) is horizontal.
    pub direction: Vec2,
    /// Multiplier on the tap offsets.
    pub radius: f32,
    pub edge: EdgePolicy,
}

impl Default for GaussianParams {
    fn default() -> Self {
        Self {
            direction: Vec2::new(1.0, 0.0),
            radius: 1.0,
            edge: EdgePolicy::default(),
        }
    }
}

impl GaussianParams {
    pub fn horizontal(radius: f32) -> Self {
        Self {
            direction: Vec2::new(1.0, 0.0),
            radius,
            ..Self::default()
        }
    }

    pub fn vertical(radius: f32) -> Self {
        Self {
            direction: Vec2::new(0.0, 1.0),
            radius,
            ..Self::default()
        }
    }
}

/// Parameters of the radial light-shaft pass.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RadialParams {
    /// Focal point in normalized [0, 1]^2 coordinates.
    pub center: Vec2,
    /// Scale of the ray-march step.
    pub density: f32,
    /// Strength of the light (positive alpha) contribution.
    pub positive_weight: f32,
    /// Strength of the occluder (non-positive alpha) attenuation.
    pub negative_weight: f32,
    /// Per-step illumination attenuation.
    pub decay: f32,
    pub edge: EdgePolicy,
}

impl Default for RadialParams {
    fn default() -> Self {
        Self {
            center: Vec2::ZERO,
            density: 0.96,
            positive_weight: 0.05,
            negative_weight: 0.4,
            decay: 0.93,
            edge: EdgePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GradingConfig {
    /// Optional `.cube` file. Without one an identity volume is used.
    pub lut: Option<PathBuf>,
    /// Edge length of the identity volume.
    pub size: usize,
    pub filter: VolumeFilter,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            lut: None,
            size: 16,
            filter: VolumeFilter::default(),
        }
    }
}

impl GradingConfig {
    /// Load the configured `.cube` file, or build the identity volume.
    pub fn build_volume(&self) -> LumenResult<GradingVolume> {
        let volume = match &self.lut {
            Some(path) => GradingVolume::load_cube(path)?,
            None => {
                self.check_size()?;
                GradingVolume::identity(self.size)
            }
        };
        Ok(volume.with_filter(self.filter))
    }

    fn check_size(&self) -> LumenResult<()> {
        if !(2..=GradingVolume::MAX_SIZE).contains(&self.size) {
            return Err(LumenError::Config(format!(
                "grading size must be between 2 and {}, got {}",
                GradingVolume::MAX_SIZE,
                self.size
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct LumenConfig {
    #[serde(default)]
    pub gaussian: GaussianParams,
    #[serde(default)]
    pub radial: RadialParams,
    #[serde(default)]
    pub grading: GradingConfig,
}

impl LumenConfig {
    /// Load from a `.json` or `.toml` file (TOML for any other extension).
    pub fn load_from_file(path: &Path) -> LumenResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: LumenConfig = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&contents)?,
            _ => Self::from_toml_str(&contents)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> LumenResult<Self> {
        toml::from_str(contents).map_err(|e| LumenError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> LumenResult<String> {
        toml::to_string_pretty(self).map_err(|e| LumenError::Config(e.to_string()))
    }

    pub fn save_to_file(&self, path: &Path) -> LumenResult<()> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Reject parameters no pass can do anything sensible with.
    pub fn validate(&self) -> LumenResult<()> {
        let g = &self.gaussian;
        if !g.direction.is_finite() || !g.radius.is_finite() {
            return Err(LumenError::Config(
                "gaussian direction and radius must be finite".into(),
            ));
        }

        let r = &self.radial;
        let scalars = [r.density, r.positive_weight, r.negative_weight, r.decay];
        if !r.center.is_finite() || scalars.iter().any(|v| !v.is_finite()) {
            return Err(LumenError::Config("radial parameters must be finite".into()));
        }

        if self.grading.lut.is_none() {
            self.grading.check_size()?;
        }
        Ok(())
    }
}
