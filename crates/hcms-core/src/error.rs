//! Error types for the color management engine.

use thiserror::Error;

/// Errors returned by engine operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A required argument was missing or malformed
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// A handle that does not refer to a live object
    #[error("Invalid handle: {0:#x}")]
    InvalidHandle(u64),

    /// Tag signature, directory entry, or association record absent
    #[error("Not found")]
    NotFound,

    /// Caller-supplied buffer too small; retry with `required` bytes
    #[error("Insufficient buffer: {required} bytes required")]
    InsufficientBuffer { required: usize },

    /// Byte buffer rejected as not a usable ICC profile
    #[error("Invalid profile data: {0}")]
    InvalidProfile(&'static str),

    /// Operation outside the supported scope of the engine
    #[error("Not supported: {0}")]
    NotSupported(&'static str),

    /// Underlying file open/read/write failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
