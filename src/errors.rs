// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the RGB-D reprojection pipeline

use std::fmt;

/// Result type alias using RenderError
pub type RenderResult<T> = Result<T, RenderError>;

/// Main pipeline error type
///
/// Every variant is scoped to the current frame: the renderer state is left
/// untouched and the caller may retry on the next frame.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// A required input frame has not been provided
    MissingInput(String),
    /// Color compositing was requested without a ready calibration
    MissingCalibration,
    /// A parameter failed validation
    InvalidParameter(String),
    /// The bind/draw/unbind protocol was violated
    ProtocolMisuse(ProtocolError),
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
}

/// Bind/draw/unbind protocol violations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// `draw` called while unbound
    DrawWithoutBind,
    /// `unbind` called while unbound
    UnbindWithoutBind,
    /// `bind` called while already bound
    AlreadyBound,
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::MissingInput(what) => write!(f, "Missing input: {}", what),
            RenderError::MissingCalibration => {
                write!(f, "No calibration available for color compositing")
            }
            RenderError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            RenderError::ProtocolMisuse(e) => write!(f, "Protocol misuse: {}", e),
            RenderError::Config(msg) => write!(f, "Configuration error: {}", msg),
            RenderError::Storage(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::DrawWithoutBind => write!(f, "draw called without renderer bound"),
            ProtocolError::UnbindWithoutBind => {
                write!(f, "unbind called without renderer bound")
            }
            ProtocolError::AlreadyBound => write!(f, "renderer already bound, unbind first"),
        }
    }
}

impl std::error::Error for RenderError {}
impl std::error::Error for ProtocolError {}

impl From<ProtocolError> for RenderError {
    fn from(err: ProtocolError) -> Self {
        RenderError::ProtocolMisuse(err)
    }
}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        RenderError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(err: serde_json::Error) -> Self {
        RenderError::Config(err.to_string())
    }
}

impl From<image::ImageError> for RenderError {
    fn from(err: image::ImageError) -> Self {
        RenderError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_display() {
        let err: RenderError = ProtocolError::DrawWithoutBind.into();
        assert_eq!(
            err.to_string(),
            "Protocol misuse: draw called without renderer bound"
        );
    }

    #[test]
    fn test_io_error_maps_to_storage() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: RenderError = io.into();
        assert!(matches!(err, RenderError::Storage(_)));
    }
}
