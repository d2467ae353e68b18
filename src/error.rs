//! Crate error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the training wrapper
#[derive(Debug, Error)]
pub enum Error {
    /// Parameter snapshot path does not exist
    #[error("specified parameter file does not exist: {path}")]
    MissingParamFile { path: PathBuf },

    /// Snapshot element count does not match the live parameters
    #[error("parameter size mismatch: snapshot has {actual} values, model expects {expected}")]
    ParamSizeMismatch { expected: usize, actual: usize },

    /// Incompatible array shapes in a forward or loss computation
    #[error("shape mismatch: {0}")]
    Shape(String),

    /// `train`/`evaluate` called before a forward function was installed
    #[error("forward function not set; call set_forward first")]
    ForwardNotSet,

    /// Layer introspection requested without an output function
    #[error("output function not set; call set_output first")]
    OutputNotSet,

    /// `train`/`evaluate` called before `set_optimizer`
    #[error("optimizer not bound; call set_optimizer first")]
    OptimizerNotBound,

    /// Requested compute device has no backend in this build
    #[error("device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
