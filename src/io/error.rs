//! Error types for grid construction, class analysis and map loading

use std::fmt;
use std::path::PathBuf;

/// Main error type for all interpretation operations
#[derive(Debug)]
pub enum SomGridError {
    /// Failed to load a class or quality map image from the filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Unit data cannot be turned into a grid
    InvalidSourceData {
        /// Description of what's wrong with the unit data
        reason: String,
    },

    /// Parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Class index exceeds the classes present in the membership table
    InvalidClassIndex {
        /// The requested class index
        index: usize,
        /// Number of classes in the membership table
        class_count: usize,
    },

    /// Two matrices that must share the grid shape do not
    ShapeMismatch {
        /// What was being matched against the grid
        operation: &'static str,
        /// Expected dimensions (width, height)
        expected: (usize, usize),
        /// Dimensions that were supplied (width, height)
        found: (usize, usize),
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl fmt::Display for SomGridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::InvalidSourceData { reason } => {
                write!(f, "Invalid unit data: {reason}")
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::InvalidClassIndex { index, class_count } => {
                write!(
                    f,
                    "Class index {index} is out of bounds ({class_count} classes known)"
                )
            }
            Self::ShapeMismatch {
                operation,
                expected,
                found,
            } => {
                write!(
                    f,
                    "Shape mismatch in {operation}: expected {}x{}, found {}x{}",
                    expected.0, expected.1, found.0, found.1
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for SomGridError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for interpretation results
pub type Result<T> = std::result::Result<T, SomGridError>;

impl From<std::io::Error> for SomGridError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Attach a path and operation name to I/O failures
pub trait WithPath<T> {
    /// Convert an I/O error into a [`SomGridError::FileSystem`] naming the path
    ///
    /// # Errors
    ///
    /// Propagates the original I/O error with the path and operation applied
    fn with_path(self, path: &std::path::Path, operation: &'static str) -> Result<T>;
}

impl<T> WithPath<T> for std::result::Result<T, std::io::Error> {
    fn with_path(self, path: &std::path::Path, operation: &'static str) -> Result<T> {
        self.map_err(|source| SomGridError::FileSystem {
            path: path.to_path_buf(),
            operation,
            source,
        })
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> SomGridError {
    SomGridError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create a shape mismatch error from two (width, height) pairs
pub const fn shape_mismatch(
    operation: &'static str,
    expected: (usize, usize),
    found: (usize, usize),
) -> SomGridError {
    SomGridError::ShapeMismatch {
        operation,
        expected,
        found,
    }
}
