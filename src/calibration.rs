//! Baseline of the eye-area salience signal under a neutral expression.
//!
//! For the first frames after a (re)calibration the window records the
//! smallest and largest keypoint counts seen. Once the configured number of
//! frames has been observed the range is frozen and gesture recognition
//! measures departures from it.

use crate::constants::{CALIBRATION_FRAMES, SIGNAL_MIN_SENTINEL};
use log::info;

/// Whether the baseline is still being collected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationState {
    Observing,
    Complete,
}

/// Observed salience range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationBaseline {
    pub min_signal: u32,
    pub max_signal: u32,
    pub frames_observed: u32,
    pub state: CalibrationState,
}

impl Default for CalibrationBaseline {
    fn default() -> Self {
        Self {
            min_signal: SIGNAL_MIN_SENTINEL,
            max_signal: 0,
            frames_observed: 0,
            state: CalibrationState::Observing,
        }
    }
}

/// Result of feeding one frame to the window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// Signal folded into the baseline
    Recorded,
    /// Signal folded in and the baseline is now frozen; reported once per calibration
    Completed,
    /// Baseline already frozen, signal ignored
    Frozen,
}

/// Accumulates the salience baseline
#[derive(Debug, Clone)]
pub struct CalibrationWindow {
    baseline: CalibrationBaseline,
    target_frames: u32,
}

impl Default for CalibrationWindow {
    fn default() -> Self {
        Self::new(CALIBRATION_FRAMES)
    }
}

impl CalibrationWindow {
    #[must_use]
    pub fn new(target_frames: u32) -> Self {
        Self {
            baseline: CalibrationBaseline::default(),
            target_frames,
        }
    }

    pub const fn baseline(&self) -> &CalibrationBaseline {
        &self.baseline
    }

    pub fn is_complete(&self) -> bool {
        self.baseline.state == CalibrationState::Complete
    }

    /// Frames still needed before the baseline is frozen
    pub const fn remaining(&self) -> u32 {
        self.target_frames.saturating_sub(self.baseline.frames_observed)
    }

    /// Fold one frame's signal into the baseline
    pub fn observe(&mut self, signal: u32) -> Observation {
        if self.is_complete() {
            return Observation::Frozen;
        }

        self.baseline.min_signal = self.baseline.min_signal.min(signal);
        self.baseline.max_signal = self.baseline.max_signal.max(signal);
        self.baseline.frames_observed += 1;

        if self.baseline.frames_observed >= self.target_frames {
            self.baseline.state = CalibrationState::Complete;
            info!(
                "Calibration complete: salience range {}..={} over {} frames",
                self.baseline.min_signal, self.baseline.max_signal, self.baseline.frames_observed
            );
            return Observation::Completed;
        }

        Observation::Recorded
    }

    /// Discard the baseline and start observing again
    pub fn reset(&mut self) {
        self.baseline = CalibrationBaseline::default();
    }
}
