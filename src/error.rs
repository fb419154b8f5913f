//! Error types for the audio-reactive core.

use thiserror::Error;

/// Errors raised by the analysis and playback pipeline
#[derive(Error, Debug)]
pub enum AudioError {
    /// Bytes are not a supported or well-formed audio encoding
    #[error("Decode error: {0}")]
    Decode(String),

    /// The platform refused audible output (no device, permission policy, ...)
    #[error("Output connect error: {0}")]
    OutputConnect(String),

    /// API misuse: an operation was called outside its valid states
    #[error("Invalid state: {operation} called while {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    /// Invalid configuration value
    #[error("Invalid config: {0}")]
    Config(String),

    /// I/O error while fetching asset bytes
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AudioError {
    /// Shorthand for building an [`AudioError::InvalidState`]
    pub fn invalid_state(operation: &'static str, state: &'static str) -> Self {
        Self::InvalidState { operation, state }
    }
}

impl From<symphonia::core::errors::Error> for AudioError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Result type for audio operations
pub type Result<T> = std::result::Result<T, AudioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_state_message() {
        let err = AudioError::invalid_state("tick", "closed");
        assert_eq!(err.to_string(), "Invalid state: tick called while closed");
    }
}
