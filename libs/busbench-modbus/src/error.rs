//! Error types for the Modbus codec

use thiserror::Error;

/// Codec-level errors.
///
/// Note that a CRC mismatch or a truncated frame is *not* an error: both are
/// reported inside the decode report so partial results still render. Errors
/// here reject the input before any decoding is attempted.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Input contained a character that is not a hex digit or separator
    #[error("invalid hex input: {0}")]
    Format(String),

    /// Function code outside the supported set, or not valid for the operation
    #[error("unsupported function code: {0}")]
    UnsupportedFunction(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("annotation file error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CodecError>;
