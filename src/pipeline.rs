//! One frame of processing: track, move, calibrate or recognize.
//!
//! The pipeline owns every piece of per-session state (tracked regions,
//! reference point, calibration baseline, gesture state) and carries it from
//! frame to frame. Motion and gestures are mutually exclusive: a frame that
//! moves the pointer never evaluates gestures.

use crate::{
    calibration::{CalibrationWindow, Observation},
    config::{Config, Settings},
    cursor_control::{click, MouseButton, PointerSink},
    error::{Result, TrackingFault},
    geometry::{Point, Region},
    gesture::{Clock, GestureEvent, GesturePhase, GestureRecognizer, SalienceExtractor},
    motion::{MotionMapper, PointerDelta},
    tracker::{Detector, FeatureTracker, HeadTracker, TemplateMatcher},
    utils::{expand_eye_pair, safe_cast::usize_to_u32},
};
use log::{debug, info};
use std::time::Duration;

/// What happened during one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// A recalibration request was consumed
    pub recalibrated: bool,
    /// Face region in frame coordinates
    pub face: Option<Region>,
    /// Nose region in frame coordinates
    pub nose: Option<Region>,
    /// Region loss this frame
    pub fault: Option<TrackingFault>,
    /// Pointer delta computed from the nose
    pub delta: PointerDelta,
    /// The pointer moved, so gestures were skipped
    pub in_motion: bool,
    /// Eye-area keypoints, when the salience signal was computed
    pub keypoints: Vec<Point>,
    /// Keypoint count
    pub signal: Option<u32>,
    /// The calibration baseline was frozen this frame
    pub calibration_completed: bool,
    /// Gestures recognized this frame, already sent to the pointer
    pub events: Vec<GestureEvent>,
}

/// Per-frame orchestrator over the detector, matcher and extractor seams
pub struct FramePipeline<DF, DN, M: TemplateMatcher, S, C> {
    head: HeadTracker<DF, DN, M::Template>,
    matcher: M,
    salience: S,
    mapper: MotionMapper,
    calibration: CalibrationWindow,
    recognizer: GestureRecognizer<C>,
    reference: Option<Point>,
    click_hold: Duration,
}

impl<DF, DN, M, S, C> FramePipeline<DF, DN, M, S, C>
where
    DF: Detector<Image = M::Image>,
    DN: Detector<Image = M::Image>,
    M: TemplateMatcher,
    S: SalienceExtractor<Image = M::Image>,
    C: Clock,
{
    /// # Errors
    ///
    /// Returns `ConfigError` or `InvalidInput` if `config` does not validate
    pub fn new(
        eye_pair_detector: DF,
        nose_detector: DN,
        matcher: M,
        salience: S,
        clock: C,
        config: &Config,
    ) -> Result<Self> {
        config.validate()?;

        let threshold = config.tracking.acceptance_threshold;
        let face = FeatureTracker::new("face", eye_pair_detector)
            .with_shaper(expand_eye_pair)
            .with_acceptance_threshold(threshold);
        let nose = FeatureTracker::new("nose", nose_detector).with_acceptance_threshold(threshold);

        Ok(Self {
            head: HeadTracker::new(face, nose).with_max_jump(config.tracking.max_jump),
            matcher,
            salience,
            mapper: MotionMapper::new(),
            calibration: CalibrationWindow::new(config.calibration.frames),
            recognizer: GestureRecognizer::with_config(clock, &config.gestures)?,
            reference: None,
            click_hold: config.gestures.click_hold(),
        })
    }

    /// Restart calibration and feature locking from scratch
    pub fn recalibrate(&mut self) {
        info!("Recalibrating: hold a neutral expression until calibration completes");
        self.calibration.reset();
        self.recognizer.reset();
        self.head.reset();
        self.reference = None;
    }

    pub const fn head(&self) -> &HeadTracker<DF, DN, M::Template> {
        &self.head
    }

    pub const fn calibration(&self) -> &CalibrationWindow {
        &self.calibration
    }

    pub const fn recognizer(&self) -> &GestureRecognizer<C> {
        &self.recognizer
    }

    /// Nose center that corresponds to zero pointer motion
    pub const fn reference(&self) -> Option<Point> {
        self.reference
    }

    pub fn gesture_phase(&self) -> GesturePhase {
        if self.calibration.is_complete() {
            self.recognizer.phase()
        } else {
            GesturePhase::Calibrating
        }
    }

    /// Process one frame, sending any pointer motion and gestures to `pointer`
    pub fn process<P>(&mut self, image: &M::Image, settings: &Settings, pointer: &mut P) -> Result<FrameReport>
    where
        P: PointerSink + ?Sized,
    {
        let mut report = FrameReport::default();

        if settings.recalibrate {
            self.recalibrate();
            report.recalibrated = true;
        }

        let observation = self.head.update(image, &self.matcher)?;
        report.face = observation.face;
        report.nose = observation.nose;
        report.fault = observation.fault;

        let (Some(face), Some(nose)) = (observation.face, observation.nose) else {
            return Ok(report);
        };

        let center = nose.center();
        let reference = *self.reference.get_or_insert_with(|| {
            debug!("Reference point set at {:?}", center);
            center
        });

        report.delta = self.mapper.map(center, reference, settings);
        if !report.delta.is_zero() {
            let (dx, dy) = report.delta.to_pixels()?;
            pointer.move_by(dx, dy)?;
            report.in_motion = true;
            return Ok(report);
        }

        report.keypoints = self.salience.keypoints(image, face.upper_half())?;
        let signal = usize_to_u32(report.keypoints.len())?;
        report.signal = Some(signal);

        match self.calibration.observe(signal) {
            Observation::Recorded => {}
            Observation::Completed => report.calibration_completed = true,
            Observation::Frozen => {
                let baseline = *self.calibration.baseline();
                report.events = self.recognizer.observe(signal, &baseline, settings);
                for event in &report.events {
                    self.dispatch(*event, pointer)?;
                }
            }
        }

        Ok(report)
    }

    fn dispatch<P: PointerSink + ?Sized>(&self, event: GestureEvent, pointer: &mut P) -> Result<()> {
        match event {
            GestureEvent::LeftClick => click(pointer, MouseButton::Left, self.click_hold),
            GestureEvent::RightClick => click(pointer, MouseButton::Right, self.click_hold),
            GestureEvent::DragStart => pointer.button_down(MouseButton::Left),
            GestureEvent::DragEnd => pointer.button_up(MouseButton::Left),
        }
    }
}
