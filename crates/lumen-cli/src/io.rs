//! Image file I/O for the CLI host.
//! Decodes PNG, JPEG and the other `image` formats into float images.

use std::path::Path;

use lumen_core::{Image2D, LumenError};

/// Load an image file as normalized RGBA.
pub fn load_image(path: &Path) -> Result<Image2D, LumenError> {
    let img = image::open(path).map_err(|e| {
        LumenError::asset(
            format!("failed to load image '{}': {}", path.display(), e),
            path,
        )
    })?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Image2D::from_rgba8(width, height, rgba.as_raw())
}

/// Quantize to 8-bit RGBA and write; the format follows the extension.
pub fn save_image(img: &Image2D, path: &Path) -> Result<(), LumenError> {
    let buffer = image::RgbaImage::from_raw(img.width, img.height, img.to_rgba8())
        .ok_or_else(|| LumenError::Other("image buffer size mismatch".into()))?;
    buffer.save(path).map_err(|e| {
        LumenError::asset(
            format!("failed to save image '{}': {}", path.display(), e),
            path,
        )
    })
}

/// Destination extent for a source extent scaled by `scale`, at least 1x1.
pub fn scaled_extent(width: u32, height: u32, scale: f32) -> (u32, u32) {
    let dim = |v: u32| ((v as f32 * scale).round() as u32).max(1);
    (dim(width), dim(height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::Color;

    #[test]
    fn test_load_image_missing_file() {
        let result = load_image(Path::new("/nonexistent/frame.png"));
        assert!(matches!(result, Err(LumenError::Asset { .. })));
    }

    #[test]
    fn test_png_round_trip() {
        let mut img = Image2D::new(3, 2);
        img.set(1, 1, Color::rgba(1.0, 0.0, 0.5, 1.0));
        let path = std::env::temp_dir().join("lumen_io_round_trip.png");
        save_image(&img, &path).unwrap();

        let loaded = load_image(&path).unwrap();
        assert_eq!((loaded.width, loaded.height), (3, 2));
        assert_eq!(loaded.get(1, 1).unwrap().to_rgba8(), [255, 0, 128, 255]);
        assert_eq!(loaded.get(0, 0).unwrap().to_rgba8(), [0, 0, 0, 0]);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_scaled_extent() {
        assert_eq!(scaled_extent(1920, 1080, 0.5), (960, 540));
        assert_eq!(scaled_extent(3, 3, 0.1), (1, 1));
        assert_eq!(scaled_extent(10, 20, 1.0), (10, 20));
    }
}
