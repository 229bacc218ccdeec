//! Error types for the simulation engine

use thiserror::Error;

/// Simulation result type
pub type Result<T> = std::result::Result<T, SimulationError>;

/// Errors that can occur while configuring or running a simulation
#[derive(Error, Debug)]
pub enum SimulationError {
    /// A per-type parameter list does not line up with the defect labels
    #[error("{0}: must have one value for each defect type")]
    PerTypeMismatch(&'static str),

    /// A scalar parameter that must be strictly positive is not
    #[error("{0}: must be positive")]
    NonPositive(&'static str),

    /// Checkpoint file could not be read or does not match the expected shape
    #[error("checkpoint error: {0}")]
    Checkpoint(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SimulationError {
    /// Create a checkpoint error
    pub fn checkpoint(msg: impl Into<String>) -> Self {
        Self::Checkpoint(msg.into())
    }
}
