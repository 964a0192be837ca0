//! Error handling for the VTI monitor
//!
//! The numeric core has no fatal states; these errors cover input that
//! violates the core's contract, configuration problems, and the transport
//! and channel glue around it.

use thiserror::Error;

/// Main error type for VTI monitor operations
#[derive(Error, Debug)]
pub enum VtiError {
    /// A non-finite velocity reached the pipeline
    #[error("Invalid sample: {0} is not a finite velocity")]
    InvalidSample(f64),

    /// A vessel radius that is non-finite or not positive
    #[error("Invalid vessel radius: {0} m")]
    InvalidRadius(f64),

    /// Errors related to configuration loading/saving/validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// A transport frame that could not be decoded into a velocity
    #[error("Decode error: {0}")]
    Decode(String),

    /// Errors related to channel communication
    #[error("Channel error: {0}")]
    Channel(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for VTI monitor operations
pub type Result<T> = std::result::Result<T, VtiError>;
