//! Constants used throughout the application

/// Best-match score at or below which template tracking is accepted (`TM_SQDIFF_NORMED`, lower is better)
pub const MATCH_ACCEPTANCE_THRESHOLD: f64 = 0.2;

/// Per-axis displacement beyond which a tracked jump is treated as a tracking error
pub const MAX_JUMP: i32 = 50;

/// Magnitude bound applied to each displacement axis before scaling
pub const MAX_DISPLACEMENT: i32 = 50;

/// Base dead zone added to the configurable motion threshold
pub const DEAD_ZONE_BASE: i32 = 5;

/// Base of the exponential gain curve
pub const GAIN_BASE: f64 = 1.05;

/// Displacement at which the exponential gain factor equals one
pub const GAIN_OFFSET: f64 = 10.0;

/// Divisor turning the speed setting into a linear gain
pub const SPEED_DIVISOR: f64 = 100.0;

/// Number of observed frames that make up a calibration window
pub const CALIBRATION_FRAMES: u32 = 40;

/// Sentinel used for the calibration minimum before any frame is observed
pub const SIGNAL_MIN_SENTINEL: u32 = u32::MAX;

/// Number of timestamps kept by the eye-closure debounce buffer
pub const DEBOUNCE_SIZE: usize = 5;

/// Longest span, in milliseconds, over which a full debounce buffer counts as a sustained closure
pub const DEBOUNCE_WINDOW_MS: u64 = 1000;

/// Cooldown value at which gestures may fire
pub const COOLDOWN_READY: u32 = 100;

/// Cooldown after a left click
pub const COOLDOWN_AFTER_CLICK: u32 = 98;

/// Cooldown after a right click or a drag toggle
pub const COOLDOWN_AFTER_TOGGLE: u32 = 90;

/// Sensitivity value at which the calibration margins are zero
pub const SENSITIVITY_NEUTRAL: i64 = 50;

/// Time a button is held down for a click, in milliseconds
pub const CLICK_HOLD_MS: u64 = 10;

/// Live control ranges (inclusive upper bounds, lower bound is zero)
pub const SPEED_MAX: i32 = 10;
pub const MOTION_THRESHOLD_MAX: i32 = 10;
pub const SENSITIVITY_MAX: i32 = 100;
pub const NOISE_FILTER_MAX: i32 = 8;

/// Live control defaults
pub const DEFAULT_SPEED: i32 = 5;
pub const DEFAULT_MOTION_THRESHOLD: i32 = 5;
pub const DEFAULT_SENSITIVITY: i32 = 50;
pub const DEFAULT_NOISE_FILTER: i32 = 0;

/// Camera defaults
pub const DEFAULT_CAMERA_FPS: f64 = 5.0;
pub const DEFAULT_FRAME_DELAY_MS: i32 = 10;

/// Eye-pair detections are shifted up by their height and grown to this many heights
pub const EYE_PAIR_HEIGHT_FACTOR: i32 = 4;

/// Default Haar cascade files
pub const DEFAULT_EYE_PAIR_CASCADE: &str = "haarcascades/haarcascade_mcs_eyepair_small.xml";
pub const DEFAULT_NOSE_CASCADE: &str = "haarcascades/haarcascade_mcs_nose.xml";
