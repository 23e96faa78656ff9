use thiserror::Error;

/// Errors returned when the input cannot be decoded without reading past the buffer
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("advertisement structure too short: {len} bytes, need at least 3")]
    TooShort { len: usize },

    #[error("advertisement structure declares {declared} bytes but only {available} are available")]
    Truncated { declared: usize, available: usize },

    #[error("invalid hex input: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}
