//! Spatial data structures and grid labeling
//!
//! This module contains spatial-related functionality including:
//! - Axis middle bands and strength profiles
//! - Region names and directional descriptors
//! - Eight-neighbour adjacency and connected components
//! - Grid construction with nine-region decomposition

/// Eight-neighbour adjacency and trail grouping
pub mod adjacency;
/// Axis middle bands and strength profiles
pub mod axis;
/// Labeled grid construction and splicing
pub mod grid;
/// Regions, axis strengths and descriptors
pub mod region;

pub use grid::{Grid, GridPos, Unit};
pub use region::Region;
