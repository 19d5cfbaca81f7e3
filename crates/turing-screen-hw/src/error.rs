//! Error types for the Turing Smart Screen library.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when driving the display.
#[derive(Error, Debug)]
pub enum Error {
    /// Caller supplied an out-of-range value or a malformed region.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The selected hardware variant has no command for this operation.
    #[error("{feature} is not supported by the {variant} display")]
    UnsupportedFeature {
        feature: &'static str,
        variant: &'static str,
    },

    /// The device did not answer the way the expected hardware does.
    #[error("Protocol mismatch: {0}")]
    ProtocolMismatch(String),

    /// Read or write failure on the underlying byte stream.
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// Serial port could not be opened or configured.
    #[error("Serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),

    /// Serial device path does not exist.
    #[error("Serial device not found at {0}")]
    PortNotFound(String),

    /// Command payload does not fit the variant's fixed frame.
    #[error("Frame payload too long: capacity {capacity}, got {actual}")]
    FrameOverflow { capacity: usize, actual: usize },

    /// Invalid orientation value.
    #[error("Invalid orientation: {0}")]
    InvalidOrientation(String),

    /// Invalid inversion value.
    #[error("Invalid inversion: {0}")]
    InvalidInversion(String),

    /// Invalid hardware variant name.
    #[error("Invalid display variant: {0}")]
    InvalidVariant(String),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}
