//! The color-grading lookup volume.
//!
//! A cube of RGB entries addressed like a GPU 3D texture: normalized
//! coordinates in [0, 1]^3, texel centers at `(i + 0.5) / size`, clamp-to-edge
//! on every axis. Entries are stored with red changing fastest, then green,
//! then blue, which is both the `.cube` file order and the order of a 3D
//! texture upload.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LumenError, LumenResult};

/// Filtering used when sampling the volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeFilter {
    #[default]
    Trilinear,
    Nearest,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradingVolume {
    size: usize,
    data: Vec<[f32; 3]>,
    filter: VolumeFilter,
}

impl GradingVolume {
    /// Largest supported edge length.
    pub const MAX_SIZE: usize = 256;

    /// Wrap raw entries. `data.len()` must be `size^3` and `size` in
    /// `1..=MAX_SIZE`.
    pub fn from_entries(size: usize, data: Vec<[f32; 3]>) -> LumenResult<Self> {
        if size == 0 || size > Self::MAX_SIZE {
            return Err(LumenError::InvalidArgument(format!(
                "grading volume size must be between 1 and {}, got {}",
                Self::MAX_SIZE,
                size
            )));
        }
        let expected = size * size * size;
        if data.len() != expected {
            return Err(LumenError::InvalidArgument(format!(
                "grading volume has {} entries, expected {}",
                data.len(),
                expected
            )));
        }
        Ok(Self {
            size,
            data,
            filter: VolumeFilter::default(),
        })
    }

    /// The pass-through volume a host uploads when no grade is configured:
    /// entry `(r, g, b)` holds `(r, g, b) / size`. `size` is clamped to
    /// `1..=MAX_SIZE`.
    pub fn identity(size: usize) -> Self {
        let size = size.clamp(1, Self::MAX_SIZE);
        let n = size as f32;
        let mut data = Vec::with_capacity(size * size * size);
        for b in 0..size {
            for g in 0..size {
                for r in 0..size {
                    data.push([r as f32 / n, g as f32 / n, b as f32 / n]);
                }
            }
        }
        Self {
            size,
            data,
            filter: VolumeFilter::default(),
        }
    }

    /// Parse an Adobe `.cube` 3D LUT.
    pub fn parse_cube(source: &str) -> LumenResult<Self> {
        let mut size: Option<usize> = None;
        let mut data: Vec<[f32; 3]> = Vec::new();

        for (idx, raw) in source.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some(rest) = line.strip_prefix("LUT_3D_SIZE") {
                let parsed = rest
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| LumenError::lut("invalid LUT_3D_SIZE", line_no))?;
                if parsed < 2 {
                    return Err(LumenError::lut("LUT_3D_SIZE must be at least 2", line_no));
                }
                if parsed > Self::MAX_SIZE {
                    return Err(LumenError::lut(
                        format!("LUT_3D_SIZE must be at most {}", Self::MAX_SIZE),
                        line_no,
                    ));
                }
                size = Some(parsed);
                continue;
            }
            if line.starts_with("LUT_1D_SIZE") {
                return Err(LumenError::lut("1D LUTs are not supported", line_no));
            }
            if line.starts_with("TITLE") || line.starts_with("DOMAIN_") {
                continue;
            }

            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() != 3 {
                return Err(LumenError::lut(
                    format!("expected 3 values, found {}", parts.len()),
                    line_no,
                ));
            }
            let mut entry = [0.0f32; 3];
            for (slot, part) in entry.iter_mut().zip(&parts) {
                *slot = part
                    .parse::<f32>()
                    .map_err(|_| LumenError::lut(format!("invalid number '{}'", part), line_no))?;
            }
            data.push(entry);
        }

        let Some(size) = size else {
            return Err(LumenError::lut("missing LUT_3D_SIZE", 0));
        };

        let expected = size * size * size;
        if data.len() != expected {
            return Err(LumenError::lut(
                format!("invalid LUT length: got {}, expected {}", data.len(), expected),
                0,
            ));
        }

        Ok(Self {
            size,
            data,
            filter: VolumeFilter::default(),
        })
    }

    /// Read and parse a `.cube` file.
    pub fn load_cube(path: &Path) -> LumenResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            LumenError::asset(format!("failed to read LUT '{}': {}", path.display(), e), path)
        })?;
        Self::parse_cube(&source)
    }

    pub fn with_filter(mut self, filter: VolumeFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn filter(&self) -> VolumeFilter {
        self.filter
    }

    /// Entry at integer coordinates, clamped to the volume.
    pub fn at(&self, r: usize, g: usize, b: usize) -> [f32; 3] {
        let m = self.size - 1;
        let (r, g, b) = (r.min(m), g.min(m), b.min(m));
        self.data[(b * self.size + g) * self.size + r]
    }

    /// Sample at a normalized RGB coordinate.
    pub fn sample(&self, rgb: [f32; 3]) -> [f32; 3] {
        match self.filter {
            VolumeFilter::Nearest => {
                let [r, g, b] = rgb.map(|u| self.nearest_index(u));
                self.at(r, g, b)
            }
            VolumeFilter::Trilinear => self.sample_trilinear(rgb),
        }
    }

    fn nearest_index(&self, u: f32) -> usize {
        let t = (u * self.size as f32).floor();
        t.clamp(0.0, (self.size - 1) as f32) as usize
    }

    /// Lower texel index and blend weight along one axis.
    fn linear_axis(&self, u: f32) -> (usize, usize, f32) {
        let m = (self.size - 1) as f32;
        let p = u * self.size as f32 - 0.5;
        let base = p.floor();
        let t = p - base;
        let i0 = base.clamp(0.0, m) as usize;
        let i1 = (base + 1.0).clamp(0.0, m) as usize;
        (i0, i1, t)
    }

    fn sample_trilinear(&self, rgb: [f32; 3]) -> [f32; 3] {
        let (r0, r1, tr) = self.linear_axis(rgb[0]);
        let (g0, g1, tg) = self.linear_axis(rgb[1]);
        let (b0, b1, tb) = self.linear_axis(rgb[2]);

        let c00 = lerp3(self.at(r0, g0, b0), self.at(r1, g0, b0), tr);
        let c10 = lerp3(self.at(r0, g1, b0), self.at(r1, g1, b0), tr);
        let c01 = lerp3(self.at(r0, g0, b1), self.at(r1, g0, b1), tr);
        let c11 = lerp3(self.at(r0, g1, b1), self.at(r1, g1, b1), tr);

        let c0 = lerp3(c00, c10, tg);
        let c1 = lerp3(c01, c11, tg);
        lerp3(c0, c1, tb)
    }
}

fn lerp3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}
