use thiserror::Error;

use crate::parameters::{ParameterError, SerializationError};
use crate::units::UnitError;

/// Error types for the instrument-params library.
#[derive(Error, Debug)]
pub enum Error {
    /// Unit text could not be parsed or units could not be converted.
    #[error("Unit error: {0}")]
    Unit(#[from] UnitError),

    /// A parameter, collection or store rejected an operation.
    #[error("Parameter error: {0}")]
    Parameter(#[from] ParameterError),

    /// Reading or writing JSON failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),
}

impl Error {
    /// Whether the error came from the file system rather than from the
    /// parameters themselves
    pub fn is_io(&self) -> bool {
        matches!(self, Error::Serialization(SerializationError::Io(_)))
    }
}

/// Result type alias for instrument-params operations.
pub type Result<T> = std::result::Result<T, Error>;
