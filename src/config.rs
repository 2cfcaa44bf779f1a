//! Configuration management for the head mouse application
//!
//! Two layers: [`Settings`] holds the live knobs the control panel exposes and
//! the frame loop reads every iteration, [`Config`] is the YAML file that
//! fixes camera, detector and timing parameters at startup.

use crate::{constants, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Live-adjustable controls, read by reference once per frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Pointer speed (0-10)
    pub speed: i32,

    /// Extra dead zone added to the base dead zone (0-10)
    pub motion_threshold: i32,

    /// Eyebrow-raise sensitivity (0-100, above 50 is easier to trigger)
    pub click_sensitivity: i32,

    /// Eye-closure sensitivity (0-100, above 50 is easier to trigger)
    pub drag_sensitivity: i32,

    /// Median blur strength (0-8, kernel is `1 + 2 * noise_filter`)
    pub noise_filter: i32,

    /// Request a calibration reset; cleared once consumed
    pub recalibrate: bool,

    /// Show the debug window
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            speed: constants::DEFAULT_SPEED,
            motion_threshold: constants::DEFAULT_MOTION_THRESHOLD,
            click_sensitivity: constants::DEFAULT_SENSITIVITY,
            drag_sensitivity: constants::DEFAULT_SENSITIVITY,
            noise_filter: constants::DEFAULT_NOISE_FILTER,
            recalibrate: true,
            debug: false,
        }
    }
}

impl Settings {
    /// Copy with every knob forced into its range
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self {
            speed: self.speed.clamp(0, constants::SPEED_MAX),
            motion_threshold: self.motion_threshold.clamp(0, constants::MOTION_THRESHOLD_MAX),
            click_sensitivity: self.click_sensitivity.clamp(0, constants::SENSITIVITY_MAX),
            drag_sensitivity: self.drag_sensitivity.clamp(0, constants::SENSITIVITY_MAX),
            noise_filter: self.noise_filter.clamp(0, constants::NOISE_FILTER_MAX),
            recalibrate: self.recalibrate,
            debug: self.debug,
        }
    }

    /// Median blur kernel size for the current noise filter strength
    #[must_use]
    pub const fn blur_kernel(&self) -> i32 {
        1 + self.noise_filter * 2
    }

    /// Validate knob ranges
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("speed", self.speed, constants::SPEED_MAX),
            ("motion_threshold", self.motion_threshold, constants::MOTION_THRESHOLD_MAX),
            ("click_sensitivity", self.click_sensitivity, constants::SENSITIVITY_MAX),
            ("drag_sensitivity", self.drag_sensitivity, constants::SENSITIVITY_MAX),
            ("noise_filter", self.noise_filter, constants::NOISE_FILTER_MAX),
        ];
        for (name, value, max) in checks {
            if !(0..=max).contains(&value) {
                return Err(Error::ConfigError(format!(
                    "{name} must be between 0 and {max}, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Application configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Camera configuration
    pub camera: CameraConfig,

    /// Haar cascade files
    pub cascades: CascadeConfig,

    /// Detect/track hand-off parameters
    pub tracking: TrackingConfig,

    /// Calibration window parameters
    pub calibration: CalibrationConfig,

    /// Gesture timing parameters
    pub gestures: GestureConfig,

    /// Initial values of the live controls
    pub controls: Settings,
}

/// Camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Webcam index
    pub index: i32,

    /// Requested capture rate
    pub fps: f64,

    /// Delay between loop iterations in milliseconds
    pub frame_delay_ms: i32,

    /// Mirror frames horizontally so head motion matches pointer motion
    pub mirror: bool,
}

/// Haar cascade file paths
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeConfig {
    /// Eye-pair cascade
    pub eye_pair: PathBuf,

    /// Nose cascade
    pub nose: PathBuf,
}

/// Tracking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Template match acceptance threshold (0.0-1.0, lower is stricter)
    pub acceptance_threshold: f64,

    /// Per-axis jump, in pixels, that forces re-detection
    pub max_jump: i32,
}

/// Calibration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Frames observed before the baseline is frozen
    pub frames: u32,
}

/// Gesture configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Eye-closure debounce buffer size
    pub debounce_size: usize,

    /// Longest span of a full debounce buffer that counts as sustained closure
    pub debounce_window_ms: u64,

    /// Time a button is held down for a click
    pub click_hold_ms: u64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: 0,
            fps: constants::DEFAULT_CAMERA_FPS,
            frame_delay_ms: constants::DEFAULT_FRAME_DELAY_MS,
            mirror: true,
        }
    }
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            eye_pair: PathBuf::from(constants::DEFAULT_EYE_PAIR_CASCADE),
            nose: PathBuf::from(constants::DEFAULT_NOSE_CASCADE),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: constants::MATCH_ACCEPTANCE_THRESHOLD,
            max_jump: constants::MAX_JUMP,
        }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            frames: constants::CALIBRATION_FRAMES,
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            debounce_size: constants::DEBOUNCE_SIZE,
            debounce_window_ms: constants::DEBOUNCE_WINDOW_MS,
            click_hold_ms: constants::CLICK_HOLD_MS,
        }
    }
}

impl GestureConfig {
    #[must_use]
    pub const fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_window_ms)
    }

    #[must_use]
    pub const fn click_hold(&self) -> Duration {
        Duration::from_millis(self.click_hold_ms)
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration values. Cascade files are checked when they are loaded.
    pub fn validate(&self) -> Result<()> {
        if self.camera.fps <= 0.0 {
            return Err(Error::ConfigError("Camera FPS must be greater than 0".to_string()));
        }
        if self.camera.frame_delay_ms < 1 {
            return Err(Error::ConfigError("Frame delay must be at least 1 ms".to_string()));
        }

        if !(0.0..=1.0).contains(&self.tracking.acceptance_threshold) {
            return Err(Error::ConfigError(
                "Acceptance threshold must be between 0.0 and 1.0".to_string(),
            ));
        }
        if self.tracking.max_jump <= 0 {
            return Err(Error::ConfigError("Max jump must be greater than 0".to_string()));
        }

        if self.calibration.frames == 0 {
            return Err(Error::ConfigError(
                "Calibration must observe at least one frame".to_string(),
            ));
        }

        if self.gestures.debounce_size == 0 {
            return Err(Error::ConfigError(
                "Debounce buffer size must be greater than 0".to_string(),
            ));
        }

        self.controls.validate()
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Head Mouse Configuration

# Webcam
camera:
  index: 0
  fps: 5.0
  frame_delay_ms: 10
  mirror: true

# Haar cascade files
cascades:
  eye_pair: "haarcascades/haarcascade_mcs_eyepair_small.xml"
  nose: "haarcascades/haarcascade_mcs_nose.xml"

# Detect/track hand-off
tracking:
  acceptance_threshold: 0.2
  max_jump: 50

# Neutral-expression warm-up
calibration:
  frames: 40

# Gesture timing
gestures:
  debounce_size: 5
  debounce_window_ms: 1000
  click_hold_ms: 10

# Initial control panel values
controls:
  speed: 5
  motion_threshold: 5
  click_sensitivity: 50
  drag_sensitivity: 50
  noise_filter: 0
  recalibrate: true
  debug: false
"#;
