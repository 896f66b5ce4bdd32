//! Semantic interpretation of trained self-organizing map grids
//!
//! The engine splits a grid of map units into nine named regions, gives every
//! cell a directional strength descriptor, and measures how labeled data classes
//! and per-cell quality measures spread over those regions.

#![forbid(unsafe_code)]

/// Class spatial statistics and quality measure bucketing
pub mod analysis;
/// Input adapters, configuration, error handling and the command-line front end
pub mod io;
/// Axis partitioning, regions, adjacency and the labeled grid
pub mod spatial;

pub use io::error::{Result, SomGridError};
