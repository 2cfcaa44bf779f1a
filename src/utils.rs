//! Utility functions for region post-processing and numeric conversions.

pub mod safe_cast;

use crate::{
    constants::EYE_PAIR_HEIGHT_FACTOR,
    geometry::{Region, Size},
};

/// Grow an eye-pair detection into a face region that also covers the nose.
///
/// The box is shifted up by its own height, made `EYE_PAIR_HEIGHT_FACTOR`
/// times as tall and clamped to the image. A result with no area means the
/// detection could not be used.
#[must_use]
pub fn expand_eye_pair(detected: Region, bounds: Size) -> Region {
    let mut face = detected;

    face.y = (face.y - face.height).max(0);
    face.height *= EYE_PAIR_HEIGHT_FACTOR;
    if face.y + face.height >= bounds.height {
        face.height = bounds.height - face.y - 1;
    }

    face.intersect(&Region::from_size(bounds))
}

/// Detections of features that need no reshaping
#[must_use]
pub fn keep_detection(detected: Region, bounds: Size) -> Region {
    detected.intersect(&Region::from_size(bounds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_eye_pair_near_top() {
        let face = expand_eye_pair(Region::new(10, 10, 30, 30), Size::new(640, 480));
        assert_eq!(face.y, 0);
        assert_eq!(face.height, 120);
        assert_eq!(face.x, 10);
        assert_eq!(face.width, 30);
    }

    #[test]
    fn test_expand_eye_pair_clamps_bottom() {
        let face = expand_eye_pair(Region::new(10, 10, 30, 30), Size::new(640, 100));
        assert_eq!(face.y, 0);
        assert_eq!(face.height, 99);
    }

    #[test]
    fn test_expand_eye_pair_middle_of_frame() {
        let face = expand_eye_pair(Region::new(200, 150, 120, 30), Size::new(640, 480));
        assert_eq!(face, Region::new(200, 120, 120, 120));
    }

    #[test]
    fn test_expand_eye_pair_at_bottom_edge_has_no_area() {
        let face = expand_eye_pair(Region::new(0, 479, 30, 1), Size::new(640, 480));
        assert!(face.is_empty());
    }

    #[test]
    fn test_keep_detection_clamps_to_bounds() {
        let kept = keep_detection(Region::new(-5, 10, 20, 20), Size::new(100, 100));
        assert_eq!(kept, Region::new(0, 10, 15, 20));
    }
}
