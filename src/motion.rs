//! Nose displacement to pointer delta mapping.
//!
//! Each axis is handled independently: displacements inside the dead zone
//! produce nothing, larger ones are clamped and scaled by the speed setting
//! and an exponential ease-in curve.

use crate::{
    config::Settings,
    constants::{DEAD_ZONE_BASE, GAIN_BASE, GAIN_OFFSET, MAX_DISPLACEMENT, SPEED_DIVISOR},
    geometry::Point,
    utils::safe_cast::f64_to_i32,
    Result,
};

/// Pointer movement for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerDelta {
    pub dx: f64,
    pub dy: f64,
}

impl PointerDelta {
    /// No movement on either axis; a frame with a non-zero delta is "in motion"
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }

    /// Whole pixels, truncated toward zero
    pub fn to_pixels(&self) -> Result<(i32, i32)> {
        Ok((f64_to_i32(self.dx)?, f64_to_i32(self.dy)?))
    }
}

/// Maps the offset of the nose from its reference point to a pointer delta
#[derive(Debug, Clone)]
pub struct MotionMapper {
    max_displacement: i32,
    dead_zone_base: i32,
    gain_base: f64,
    gain_offset: f64,
}

impl Default for MotionMapper {
    fn default() -> Self {
        Self {
            max_displacement: MAX_DISPLACEMENT,
            dead_zone_base: DEAD_ZONE_BASE,
            gain_base: GAIN_BASE,
            gain_offset: GAIN_OFFSET,
        }
    }
}

impl MotionMapper {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delta for the current nose center relative to the reference point
    #[must_use]
    pub fn map(&self, current: Point, reference: Point, settings: &Settings) -> PointerDelta {
        let displacement = current - reference;
        PointerDelta {
            dx: self.axis(displacement.x, settings.speed, settings.motion_threshold),
            dy: self.axis(displacement.y, settings.speed, settings.motion_threshold),
        }
    }

    /// Half-width of the dead zone for a motion threshold setting
    #[must_use]
    pub const fn dead_zone(&self, motion_threshold: i32) -> i32 {
        self.dead_zone_base + motion_threshold
    }

    /// Delta along one axis
    #[must_use]
    pub fn axis(&self, displacement: i32, speed: i32, motion_threshold: i32) -> f64 {
        if displacement.abs() <= self.dead_zone(motion_threshold) {
            return 0.0;
        }

        let clamped = displacement.clamp(-self.max_displacement, self.max_displacement);
        let linear = f64::from(clamped) * f64::from(speed + 1) / SPEED_DIVISOR;
        linear * self.gain_base.powf(f64::from(clamped.abs()) - self.gain_offset)
    }
}
