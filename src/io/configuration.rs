//! Interpretation constants and runtime configuration defaults

// Grid decomposition
/// Minimum width and height for recursive nine-region decomposition
pub const RECURSION_THRESHOLD: usize = 10;
/// Number of canonical regions covering a grid
pub const REGION_COUNT: usize = 9;
/// Number of directional strength levels on each side of an axis
pub const STRENGTH_LEVELS: u8 = 8;

// Safety limit to prevent excessive memory allocation
/// Maximum allowed grid dimension
pub const MAX_GRID_DIMENSION: usize = 10_000;

// Quality measure bucketing
/// Number of ordered strength buckets for quality values
pub const BUCKET_COUNT: usize = 5;
/// Cut points between buckets for quality values normalised into [0, 1]
pub const DEFAULT_BUCKET_THRESHOLDS: [f64; BUCKET_COUNT - 1] = [0.2, 0.4, 0.6, 0.8];

// Progress bar display settings
/// Threshold for switching to batch progress mode
pub const MAX_INDIVIDUAL_PROGRESS_BARS: usize = 5;
/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 40;

// Output settings
/// Suffix added to output filenames
pub const OUTPUT_SUFFIX: &str = "_semantics";
/// Extension of the statistics table
pub const OUTPUT_EXTENSION: &str = "tsv";

/// Optional bounds restricting which classes are reported
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnalysisConfig {
    /// Classes below this compactness are filtered out
    pub min_compactness: Option<f64>,
    /// Classes above this compactness are filtered out
    pub max_compactness: Option<f64>,
}

impl AnalysisConfig {
    /// Create a configuration with both compactness bounds
    ///
    /// # Errors
    ///
    /// Returns an error if a bound lies outside [0, 1] or min exceeds max
    pub fn with_bounds(
        min_compactness: Option<f64>,
        max_compactness: Option<f64>,
    ) -> crate::io::error::Result<Self> {
        for (name, bound) in [
            ("min_compactness", min_compactness),
            ("max_compactness", max_compactness),
        ] {
            if let Some(value) = bound {
                if !(0.0..=1.0).contains(&value) {
                    return Err(crate::io::error::invalid_parameter(
                        name,
                        &value,
                        &"compactness bounds must lie in [0, 1]",
                    ));
                }
            }
        }

        if let (Some(min), Some(max)) = (min_compactness, max_compactness) {
            if min > max {
                return Err(crate::io::error::invalid_parameter(
                    "min_compactness",
                    &min,
                    &format!("exceeds max_compactness {max}"),
                ));
            }
        }

        Ok(Self {
            min_compactness,
            max_compactness,
        })
    }

    /// Check whether a compactness value passes both bounds
    pub fn accepts(&self, compactness: f64) -> bool {
        self.min_compactness.is_none_or(|min| compactness >= min)
            && self.max_compactness.is_none_or(|max| compactness <= max)
    }
}
