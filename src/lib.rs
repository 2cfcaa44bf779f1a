//! Hands-free pointer control from a webcam.
//!
//! The head is followed with a detect-then-track loop: a Haar cascade finds
//! the eye pair, the region is grown to cover the nose, and both regions are
//! then followed by template matching until the match degrades or jumps.
//! Nose displacement from a reference point drives the pointer through a
//! dead zone and an ease-in gain curve. When the head is still, the number
//! of SIFT keypoints above the eyes is compared with a calibrated baseline
//! to recognize eyebrow raises (clicks) and sustained eye closures (drag).
//!
//! Every `OpenCV` dependency sits behind the `vision` feature; the tracking,
//! motion and gesture logic works on the traits in [`tracker`] and
//! [`gesture`] and can be driven by any image type.
//!
//! # Examples
//!
//! ```
//! use head_mouse::{config::Settings, geometry::Point, motion::MotionMapper};
//!
//! let mapper = MotionMapper::new();
//! let delta = mapper.map(Point::new(130, 100), Point::new(100, 100), &Settings::default());
//! assert!(delta.dx > 0.0);
//! assert_eq!(delta.dy, 0.0);
//! ```
//!
//! ```
//! use head_mouse::calibration::{CalibrationWindow, Observation};
//!
//! let mut window = CalibrationWindow::new(2);
//! assert_eq!(window.observe(30), Observation::Recorded);
//! assert_eq!(window.observe(34), Observation::Completed);
//! assert_eq!(window.baseline().max_signal, 34);
//! ```

/// Pixel-space points, sizes and rectangles
pub mod geometry;

/// Detect-then-track state machines for the face and nose regions
pub mod tracker;

/// Nose displacement to pointer delta mapping
pub mod motion;

/// Salience baseline collection
pub mod calibration;

/// Eyebrow-raise and eye-closure recognition
pub mod gesture;

/// Per-frame orchestration
pub mod pipeline;

/// Utility functions for region shaping and numeric conversions
pub mod utils;

/// Error types and result handling
pub mod error;

/// `OpenCV` detector, matcher and keypoint implementations
#[cfg(feature = "vision")]
pub mod vision;

/// Main application module
#[cfg(feature = "vision")]
pub mod app;

/// Pointer injection, with an X11 backend
pub mod cursor_control;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
