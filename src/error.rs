//! Error types for the head mouse library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// `OpenCV` operation failed
    #[cfg(feature = "vision")]
    #[error("OpenCV error: {0}")]
    OpenCV(#[from] opencv::Error),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No frames can be produced; the pipeline cannot start
    #[error("Camera unavailable: {0}")]
    CameraUnavailable(String),

    /// Cursor control operation failed
    #[error("Cursor control error: {0}")]
    CursorControl(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Detector model (cascade file) could not be loaded
    #[error("Model error: {0}")]
    ModelError(String),
}

/// Application-specific error type (alias for main Error type)
pub type AppError = Error;

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Per-frame detection or tracking failure.
///
/// These never propagate as errors: the tracker drops to `Lost` and the
/// detector is tried again on the next frame.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum TrackingFault {
    /// The detector found nothing in the search area
    #[error("detector found no candidate")]
    DetectionMiss,

    /// The best template match scored above the acceptance threshold
    #[error("template match score {score:.3} above acceptance threshold")]
    TrackingLoss { score: f64 },

    /// The tracked point moved further in one frame than a head can
    #[error("tracked point jumped ({dx}, {dy})")]
    ExcessiveJump { dx: i32, dy: i32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracking_fault_display() {
        let fault = TrackingFault::TrackingLoss { score: 0.25 };
        assert_eq!(fault.to_string(), "template match score 0.250 above acceptance threshold");

        let fault = TrackingFault::ExcessiveJump { dx: 60, dy: -3 };
        assert_eq!(fault.to_string(), "tracked point jumped (60, -3)");
    }

    #[test]
    fn test_camera_unavailable_message() {
        let err = Error::CameraUnavailable("index 0".to_string());
        assert!(err.to_string().contains("index 0"));
    }
}
