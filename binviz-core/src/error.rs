//! Error types for binviz

use std::path::PathBuf;
use thiserror::Error;

/// Reasons a byte source could not be turned into a point cloud
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("input holds {len} bytes, at least 3 are needed for one point")]
    EmptyOrTooSmall { len: usize },
}

/// Main error type for binviz operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("GPU error: {0}")]
    Gpu(String),

    #[error("Visualization error: {0}")]
    Visualization(String),
}

impl Error {
    /// Returns the load failure, if this error is one
    pub fn as_load_error(&self) -> Option<&LoadError> {
        match self {
            Error::Load(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type alias for binviz operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_messages() {
        let err = LoadError::EmptyOrTooSmall { len: 2 };
        assert_eq!(
            err.to_string(),
            "input holds 2 bytes, at least 3 are needed for one point"
        );

        let err = LoadError::NotFound { path: PathBuf::from("missing.bin") };
        assert_eq!(err.to_string(), "file not found: missing.bin");
    }

    #[test]
    fn test_load_error_is_transparent() {
        let err: Error = LoadError::EmptyOrTooSmall { len: 0 }.into();
        assert_eq!(err.to_string(), LoadError::EmptyOrTooSmall { len: 0 }.to_string());
        assert_eq!(err.as_load_error(), Some(&LoadError::EmptyOrTooSmall { len: 0 }));

        let io: Error = std::io::Error::new(std::io::ErrorKind::Other, "boom").into();
        assert!(io.as_load_error().is_none());
    }
}
