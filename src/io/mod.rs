//! Input/output adapters, configuration and error handling

/// Command-line argument parsing and batch processing
pub mod cli;
/// Constants and analysis configuration
pub mod configuration;
/// Error types and path context helpers
pub mod error;
/// PNG class map and quality map loaders
pub mod image;
/// Progress display and log sink
pub mod progress;
/// Statistics table export
pub mod summary;
