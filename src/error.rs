//! Error types for the rendering pipeline.

use std::fmt;

use thiserror::Error;

/// Result type alias for rendering operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Which overlay an image resource belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    Background,
    Logo,
}

impl fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlayKind::Background => f.write_str("background"),
            OverlayKind::Logo => f.write_str("logo"),
        }
    }
}

/// Errors that can occur while encoding or rendering a QR code.
#[derive(Error, Debug)]
pub enum Error {
    /// The drawing surface could not be acquired.
    #[error("Failed to get the rendering context: {0}")]
    ContextUnavailable(String),

    /// A color string could not be parsed.
    #[error("Invalid color: {0:?}")]
    InvalidColor(String),

    /// Options are out of their valid range.
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// The payload does not fit in the allowed version range.
    #[error("Data too long: {0}")]
    DataTooLong(#[from] qrcodegen::DataTooLong),

    /// An overlay image could not be decoded.
    #[error("Failed to decode {kind} image: {source}")]
    ResourceDecode {
        kind: OverlayKind,
        #[source]
        source: image::ImageError,
    },

    /// An overlay image did not finish decoding in time.
    #[error("Decoding the {kind} image timed out after {millis}ms")]
    DecodeTimeout { kind: OverlayKind, millis: u64 },

    /// The decode task went away without producing a result.
    #[error("Decoding the {kind} image was aborted")]
    DecodeAborted { kind: OverlayKind },

    /// Encoding the output image failed.
    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
