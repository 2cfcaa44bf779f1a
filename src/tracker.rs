//! Detect-then-track hand-off for facial feature regions.
//!
//! A [`FeatureTracker`] is either `Lost`, in which case the next update runs
//! the detector, or `Tracking`, in which case the next update searches a
//! window twice the region's size for the stored template. A match scoring
//! above the acceptance threshold drops it back to `Lost`.
//!
//! [`HeadTracker`] nests two trackers: the face region (an eye-pair detection
//! grown to cover the nose) owns the nose region, which is stored relative to
//! the face and searched only inside it. Losing the face drops the nose.

use crate::{
    constants::{MATCH_ACCEPTANCE_THRESHOLD, MAX_JUMP},
    error::{Result, TrackingFault},
    geometry::{Point, Region, Size},
    utils::keep_detection,
};
use log::{debug, trace};

/// Image that can report its dimensions
pub trait FrameImage {
    fn size(&self) -> Size;
}

/// Object detector for one kind of feature
pub trait Detector {
    type Image: FrameImage;

    /// Best candidate inside `area`, in frame coordinates
    fn detect(&mut self, image: &Self::Image, area: Region) -> Result<Option<Region>>;
}

/// Best location of a template inside a search window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateMatch {
    /// Normalized squared difference, 0.0 is a perfect match
    pub score: f64,
    /// Top-left corner of the match, in frame coordinates
    pub location: Point,
}

/// Template capture and similarity search
pub trait TemplateMatcher {
    type Image: FrameImage;
    type Template;

    /// Copy the pixels of `region` for later matching
    fn capture(&self, image: &Self::Image, region: Region) -> Result<Self::Template>;

    /// Lowest-scoring placement of `template` inside `window`
    fn best_match(&self, image: &Self::Image, window: Region, template: &Self::Template) -> Result<TemplateMatch>;
}

/// A locked-on region and the patch it is tracked with
#[derive(Debug, Clone)]
pub struct TrackedRegion<T> {
    /// Bounding box, relative to the area the tracker searches
    pub bounds: Region,
    /// Pixels captured when the region was detected
    pub template: T,
    /// Frame-coordinate center at the last frame that passed the jump check
    pub last_good_center: Point,
}

/// Either locked on a region or waiting for the detector
#[derive(Debug, Clone)]
pub enum TrackState<T> {
    Lost,
    Tracking(TrackedRegion<T>),
}

/// What one update did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackEvent {
    /// Detector found the feature; a new template was captured
    Acquired,
    /// Template matched inside the search window
    Tracked { score: f64 },
    /// No region this frame
    Lost(TrackingFault),
}

/// Post-processing applied to a fresh detection, given in coordinates
/// relative to the search area together with the area's size
pub type Shaper = fn(Region, Size) -> Region;

/// Detect/track state machine for a single feature
pub struct FeatureTracker<D, T> {
    name: &'static str,
    detector: D,
    shaper: Shaper,
    acceptance_threshold: f64,
    state: TrackState<T>,
}

impl<D, T> FeatureTracker<D, T> {
    /// Create a tracker that starts out lost
    #[must_use]
    pub fn new(name: &'static str, detector: D) -> Self {
        Self {
            name,
            detector,
            shaper: keep_detection,
            acceptance_threshold: MATCH_ACCEPTANCE_THRESHOLD,
            state: TrackState::Lost,
        }
    }

    /// Reshape detections before adopting them
    #[must_use]
    pub fn with_shaper(mut self, shaper: Shaper) -> Self {
        self.shaper = shaper;
        self
    }

    #[must_use]
    pub fn with_acceptance_threshold(mut self, threshold: f64) -> Self {
        self.acceptance_threshold = threshold;
        self
    }

    pub const fn state(&self) -> &TrackState<T> {
        &self.state
    }

    pub const fn is_tracking(&self) -> bool {
        matches!(self.state, TrackState::Tracking(_))
    }

    /// Current bounds relative to the search area
    pub fn region(&self) -> Option<Region> {
        match &self.state {
            TrackState::Tracking(tracked) => Some(tracked.bounds),
            TrackState::Lost => None,
        }
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Drop the region; the next update runs the detector
    pub fn reset(&mut self) {
        if self.is_tracking() {
            debug!("{} region reset", self.name);
        }
        self.state = TrackState::Lost;
    }

    /// Advance one frame inside `area` (frame coordinates)
    pub fn update<M>(&mut self, image: &M::Image, area: Region, matcher: &M) -> Result<TrackEvent>
    where
        D: Detector<Image = M::Image>,
        M: TemplateMatcher<Template = T>,
    {
        match &mut self.state {
            TrackState::Lost => {
                let Some(detected) = self.detector.detect(image, area)? else {
                    trace!("{} not detected", self.name);
                    return Ok(TrackEvent::Lost(TrackingFault::DetectionMiss));
                };

                let relative = detected.offset(Point::default() - area.origin());
                let bounds = (self.shaper)(relative, area.size());
                if bounds.is_empty() {
                    debug!("{} detection {:?} unusable after reshaping", self.name, detected);
                    return Ok(TrackEvent::Lost(TrackingFault::DetectionMiss));
                }

                let absolute = bounds.offset(area.origin());
                let template = matcher.capture(image, absolute)?;
                debug!("{} acquired at {:?}", self.name, absolute);
                self.state = TrackState::Tracking(TrackedRegion {
                    bounds,
                    template,
                    last_good_center: absolute.center(),
                });
                Ok(TrackEvent::Acquired)
            }
            TrackState::Tracking(tracked) => {
                let absolute = tracked.bounds.offset(area.origin());
                let window = absolute.search_window().intersect(&area);
                if window.width < absolute.width || window.height < absolute.height {
                    debug!("{} search window {:?} smaller than region", self.name, window);
                    self.state = TrackState::Lost;
                    return Ok(TrackEvent::Lost(TrackingFault::TrackingLoss { score: 1.0 }));
                }

                let best = matcher.best_match(image, window, &tracked.template)?;
                if best.score <= self.acceptance_threshold {
                    tracked.bounds = tracked.bounds.with_origin(best.location - area.origin());
                    trace!("{} tracked to {:?} (score {:.3})", self.name, tracked.bounds, best.score);
                    Ok(TrackEvent::Tracked { score: best.score })
                } else {
                    let fault = TrackingFault::TrackingLoss { score: best.score };
                    debug!("{} lost: {}", self.name, fault);
                    self.state = TrackState::Lost;
                    Ok(TrackEvent::Lost(fault))
                }
            }
        }
    }

    /// Compare the frame-coordinate center against the last good center.
    ///
    /// A move larger than `max_jump` on either axis drops the region and is
    /// reported as a fault; otherwise the current center becomes the last good one.
    pub fn check_jump(&mut self, area: Region, max_jump: i32) -> Option<TrackingFault> {
        let TrackState::Tracking(tracked) = &mut self.state else {
            return None;
        };

        let center = tracked.bounds.offset(area.origin()).center();
        let moved = center - tracked.last_good_center;
        if moved.x.abs() > max_jump || moved.y.abs() > max_jump {
            let fault = TrackingFault::ExcessiveJump { dx: moved.x, dy: moved.y };
            debug!("{} lost: {}", self.name, fault);
            self.state = TrackState::Lost;
            return Some(fault);
        }

        tracked.last_good_center = center;
        None
    }
}

/// Face and nose positions after one head tracker update
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeadObservation {
    /// Face region in frame coordinates
    pub face: Option<Region>,
    /// Nose region in frame coordinates
    pub nose: Option<Region>,
    /// The nose was detected this frame rather than tracked
    pub nose_acquired: bool,
    /// Why a region was lost this frame, if it was
    pub fault: Option<TrackingFault>,
}

/// Face region owning a nested nose region
pub struct HeadTracker<DF, DN, T> {
    face: FeatureTracker<DF, T>,
    nose: FeatureTracker<DN, T>,
    max_jump: i32,
}

impl<DF, DN, T> HeadTracker<DF, DN, T> {
    #[must_use]
    pub fn new(face: FeatureTracker<DF, T>, nose: FeatureTracker<DN, T>) -> Self {
        Self {
            face,
            nose,
            max_jump: MAX_JUMP,
        }
    }

    #[must_use]
    pub fn with_max_jump(mut self, max_jump: i32) -> Self {
        self.max_jump = max_jump;
        self
    }

    pub const fn face(&self) -> &FeatureTracker<DF, T> {
        &self.face
    }

    pub const fn nose(&self) -> &FeatureTracker<DN, T> {
        &self.nose
    }

    /// Drop both regions
    pub fn reset(&mut self) {
        self.face.reset();
        self.nose.reset();
    }

    /// Advance both trackers one frame
    pub fn update<M>(&mut self, image: &M::Image, matcher: &M) -> Result<HeadObservation>
    where
        DF: Detector<Image = M::Image>,
        DN: Detector<Image = M::Image>,
        M: TemplateMatcher<Template = T>,
    {
        let frame = Region::from_size(image.size());

        let face_event = self.face.update(image, frame, matcher)?;
        let Some(face) = self.face.region() else {
            self.nose.reset();
            return Ok(HeadObservation {
                fault: fault_of(face_event),
                ..HeadObservation::default()
            });
        };

        let nose_event = self.nose.update(image, face, matcher)?;
        if self.nose.region().is_none() {
            return Ok(HeadObservation {
                face: Some(face),
                fault: fault_of(nose_event),
                ..HeadObservation::default()
            });
        }

        let nose_acquired = nose_event == TrackEvent::Acquired;
        if !nose_acquired {
            if let Some(fault) = self.nose.check_jump(face, self.max_jump) {
                self.face.reset();
                return Ok(HeadObservation {
                    fault: Some(fault),
                    ..HeadObservation::default()
                });
            }
        }

        Ok(HeadObservation {
            face: Some(face),
            nose: self.nose.region().map(|nose| nose.offset(face.origin())),
            nose_acquired,
            fault: None,
        })
    }
}

const fn fault_of(event: TrackEvent) -> Option<TrackingFault> {
    match event {
        TrackEvent::Lost(fault) => Some(fault),
        _ => None,
    }
}
