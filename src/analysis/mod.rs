//! Analysis of class membership and quality measures over a labeled grid

/// Per-class connectivity, compactness, edges and region mix
pub mod classes;
/// Quality measure strength buckets and region occurrence
pub mod quality;
