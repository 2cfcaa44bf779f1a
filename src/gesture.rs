//! Gesture recognition on the eye-area salience signal.
//!
//! Raising the eyebrows exposes more texture above the eyes, so the keypoint
//! count rises above the calibrated maximum; closing the eyes removes it, so
//! the count drops below the calibrated minimum. A cooldown counter keeps one
//! sustained gesture from firing every frame, and eye closures additionally
//! have to fill a time-windowed debounce buffer so that blinks are ignored.

use crate::{
    calibration::CalibrationBaseline,
    config::{GestureConfig, Settings},
    constants::{
        COOLDOWN_AFTER_CLICK, COOLDOWN_AFTER_TOGGLE, COOLDOWN_READY, DEBOUNCE_SIZE, DEBOUNCE_WINDOW_MS,
        SENSITIVITY_NEUTRAL,
    },
    geometry::{Point, Region},
    tracker::FrameImage,
    Error, Result,
};
use log::{debug, info};
use std::cell::Cell;
use std::time::{Duration, Instant};

/// Keypoint extractor producing the salience signal
pub trait SalienceExtractor {
    type Image: FrameImage;

    /// Salient points inside `area`, in frame coordinates
    fn keypoints(&mut self, image: &Self::Image, area: Region) -> Result<Vec<Point>>;
}

/// Monotonic time source for the debounce buffer
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall clock measured from construction
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self { start: Instant::now() }
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Clock advanced by hand, for replaying recorded or synthetic sessions
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    #[must_use]
    pub fn new(start: Duration) -> Self {
        Self { now: Cell::new(start) }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

/// Circular buffer of the times the closure signal was last seen low
#[derive(Debug, Clone)]
pub struct DebounceBuffer {
    slots: Vec<Option<Duration>>,
    position: usize,
    window: Duration,
}

impl Default for DebounceBuffer {
    fn default() -> Self {
        Self {
            slots: vec![None; DEBOUNCE_SIZE],
            position: 0,
            window: Duration::from_millis(DEBOUNCE_WINDOW_MS),
        }
    }
}

impl DebounceBuffer {
    /// # Errors
    ///
    /// Returns `InvalidInput` if `size` is zero
    pub fn new(size: usize, window: Duration) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidInput(
                "Debounce buffer needs at least one slot".to_string(),
            ));
        }
        Ok(Self {
            slots: vec![None; size],
            position: 0,
            window,
        })
    }

    /// Store `now` and report whether the whole buffer was filled within the window
    pub fn record(&mut self, now: Duration) -> bool {
        let size = self.slots.len();
        self.slots[self.position] = Some(now);
        let oldest = self.slots[(self.position + 1) % size];
        self.position = (self.position + 1) % size;

        oldest.is_some_and(|oldest| now.saturating_sub(oldest) <= self.window)
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.position = 0;
    }
}

/// Drag flag and cooldown counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureState {
    pub drag_active: bool,
    pub cooldown: u32,
}

impl Default for GestureState {
    fn default() -> Self {
        Self {
            drag_active: false,
            cooldown: COOLDOWN_READY,
        }
    }
}

/// Where the recognizer stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    /// Baseline still being collected, no gestures
    Calibrating,
    /// Cooling down after a gesture
    Armed,
    /// Gestures may fire
    Ready,
}

/// Discrete pointer actions produced by gestures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEvent {
    /// Left button press and release
    LeftClick,
    /// Right button press and release
    RightClick,
    /// Left button held down
    DragStart,
    /// Left button released
    DragEnd,
}

/// Thresholds around the baseline, adjusted by the sensitivity settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Margins {
    pub min_margin: i64,
    pub max_margin: i64,
}

impl Margins {
    /// Sensitivities above 50 move the thresholds toward the baseline, below 50 away from it
    #[must_use]
    pub fn new(baseline: &CalibrationBaseline, settings: &Settings) -> Self {
        let min = i64::from(baseline.min_signal);
        let max = i64::from(baseline.max_signal);
        Self {
            min_margin: min * (i64::from(settings.drag_sensitivity) - SENSITIVITY_NEUTRAL) / SENSITIVITY_NEUTRAL,
            max_margin: -max * (i64::from(settings.click_sensitivity) - SENSITIVITY_NEUTRAL) / SENSITIVITY_NEUTRAL,
        }
    }

    /// Signal above which the eyebrows count as raised
    #[must_use]
    pub fn raise_threshold(&self, baseline: &CalibrationBaseline) -> i64 {
        i64::from(baseline.max_signal) + self.max_margin
    }

    /// Signal below which the eyes count as closed
    #[must_use]
    pub fn closure_threshold(&self, baseline: &CalibrationBaseline) -> i64 {
        i64::from(baseline.min_signal) + self.min_margin
    }
}

/// Eyebrow-raise and eye-closure state machine
pub struct GestureRecognizer<C> {
    clock: C,
    debounce: DebounceBuffer,
    state: GestureState,
}

impl<C: Clock> GestureRecognizer<C> {
    #[must_use]
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            debounce: DebounceBuffer::default(),
            state: GestureState::default(),
        }
    }

    /// # Errors
    ///
    /// Returns `InvalidInput` if the debounce buffer size is zero
    pub fn with_config(clock: C, config: &GestureConfig) -> Result<Self> {
        Ok(Self {
            clock,
            debounce: DebounceBuffer::new(config.debounce_size, config.debounce_window())?,
            state: GestureState::default(),
        })
    }

    pub const fn state(&self) -> GestureState {
        self.state
    }

    pub const fn clock(&self) -> &C {
        &self.clock
    }

    pub const fn phase(&self) -> GesturePhase {
        if self.state.cooldown >= COOLDOWN_READY {
            GesturePhase::Ready
        } else {
            GesturePhase::Armed
        }
    }

    /// Back to ready with an empty debounce buffer. A drag in progress stays
    /// active so the held button can still be released by a closure.
    pub fn reset(&mut self) {
        self.state.cooldown = COOLDOWN_READY;
        self.debounce.clear();
    }

    /// Evaluate one frame of the salience signal against a frozen baseline
    pub fn observe(&mut self, signal: u32, baseline: &CalibrationBaseline, settings: &Settings) -> Vec<GestureEvent> {
        if self.state.cooldown < COOLDOWN_READY {
            self.state.cooldown += 1;
        }

        let margins = Margins::new(baseline, settings);
        let signal = i64::from(signal);
        let mut events = Vec::new();

        if signal > margins.raise_threshold(baseline) && self.phase() == GesturePhase::Ready {
            if self.state.drag_active {
                self.state.drag_active = false;
                self.state.cooldown = COOLDOWN_AFTER_TOGGLE;
                info!("Eyebrow raise during drag: right click");
                events.push(GestureEvent::DragEnd);
                events.push(GestureEvent::RightClick);
            } else {
                self.state.cooldown = COOLDOWN_AFTER_CLICK;
                info!("Eyebrow raise: left click");
                events.push(GestureEvent::LeftClick);
            }
        }

        if signal < margins.closure_threshold(baseline) {
            let sustained = self.debounce.record(self.clock.now());
            debug!("Eye closure signal {} (sustained: {})", signal, sustained);
            if sustained && self.phase() == GesturePhase::Ready {
                let event = if self.state.drag_active {
                    GestureEvent::DragEnd
                } else {
                    GestureEvent::DragStart
                };
                self.state.drag_active = !self.state.drag_active;
                self.state.cooldown = COOLDOWN_AFTER_TOGGLE;
                info!("Sustained eye closure: {:?}", event);
                events.push(event);
            }
        }

        events
    }
}
