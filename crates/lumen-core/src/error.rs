/// Core error types for Lumen.
use std::path::PathBuf;

/// A specialized Result type for Lumen operations.
pub type LumenResult<T> = Result<T, LumenError>;

/// Top-level error type. The kernels themselves are total; these cover the
/// host-side work around them (loading images, grading volumes, config).
#[derive(Debug, thiserror::Error)]
pub enum LumenError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("asset error: {message} ({path:?})")]
    Asset { message: String, path: PathBuf },

    #[error("LUT error: {message} (line {line})")]
    Lut { message: String, line: usize },

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl LumenError {
    /// Create an asset error.
    pub fn asset(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        LumenError::Asset {
            message: message.into(),
            path: path.into(),
        }
    }

    /// Create a LUT parse error at a 1-based line number.
    pub fn lut(message: impl Into<String>, line: usize) -> Self {
        LumenError::Lut {
            message: message.into(),
            line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lut_error_display() {
        let err = LumenError::lut("expected 3 values", 7);
        assert_eq!(err.to_string(), "LUT error: expected 3 values (line 7)");
    }

    #[test]
    fn test_asset_error_display() {
        let err = LumenError::asset("file not found", "/assets/sky.png");
        assert!(err.to_string().contains("file not found"));
        assert!(err.to_string().contains("sky.png"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: LumenError = io.into();
        assert!(matches!(err, LumenError::Io(_)));
    }
}
