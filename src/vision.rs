//! `OpenCV` implementations of the detector, matcher and salience seams.

use crate::{
    config::Settings,
    error::{Error, Result},
    geometry::{Point, Region, Size},
    gesture::SalienceExtractor,
    tracker::{Detector, FrameImage, TemplateMatch, TemplateMatcher},
};
use log::{debug, info};
use opencv::{
    core::{self, Mat, Ptr, Vector},
    features2d::SIFT,
    imgproc,
    objdetect::{CascadeClassifier, CASCADE_DO_CANNY_PRUNING},
    prelude::*,
};
use std::path::Path;

/// Haar cascade scale step between pyramid levels
const CASCADE_SCALE_FACTOR: f64 = 1.1;
/// Neighbouring hits required to keep a candidate
const CASCADE_MIN_NEIGHBORS: i32 = 4;

impl FrameImage for Mat {
    fn size(&self) -> Size {
        Size::new(self.cols(), self.rows())
    }
}

/// Copy of the pixels inside `region`
fn crop(image: &Mat, region: Region) -> Result<Mat> {
    let roi = Mat::roi(image, region.into())?;
    Ok(roi.try_clone()?)
}

/// Haar cascade detector returning the first candidate
pub struct CascadeDetector {
    classifier: CascadeClassifier,
}

impl CascadeDetector {
    /// Load a cascade file
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .to_str()
            .ok_or_else(|| Error::ModelError(format!("Cascade path is not valid UTF-8: {}", path.display())))?;

        let classifier = CascadeClassifier::new(name)
            .map_err(|e| Error::ModelError(format!("Failed to load cascade {name}: {e}")))?;
        if classifier.empty()? {
            return Err(Error::ModelError(format!("Failed to load cascade {name}")));
        }

        info!("Loaded cascade {}", name);
        Ok(Self { classifier })
    }
}

impl Detector for CascadeDetector {
    type Image = Mat;

    fn detect(&mut self, image: &Mat, area: Region) -> Result<Option<Region>> {
        let roi = crop(image, area)?;
        let mut objects = Vector::<core::Rect>::new();
        self.classifier.detect_multi_scale(
            &roi,
            &mut objects,
            CASCADE_SCALE_FACTOR,
            CASCADE_MIN_NEIGHBORS,
            CASCADE_DO_CANNY_PRUNING,
            core::Size::new(0, 0),
            core::Size::new(0, 0),
        )?;

        Ok(objects
            .iter()
            .next()
            .map(|rect| Region::from(rect).offset(area.origin())))
    }
}

/// Normalized squared difference template matching
#[derive(Debug, Default, Clone, Copy)]
pub struct SqDiffMatcher;

impl TemplateMatcher for SqDiffMatcher {
    type Image = Mat;
    type Template = Mat;

    fn capture(&self, image: &Mat, region: Region) -> Result<Mat> {
        crop(image, region)
    }

    fn best_match(&self, image: &Mat, window: Region, template: &Mat) -> Result<TemplateMatch> {
        let search = crop(image, window)?;
        let mut scores = Mat::default();
        imgproc::match_template(&search, template, &mut scores, imgproc::TM_SQDIFF_NORMED, &Mat::default())?;

        let mut min_val = 0.0;
        let mut min_loc = core::Point::default();
        core::min_max_loc(&scores, Some(&mut min_val), None, Some(&mut min_loc), None, &Mat::default())?;

        Ok(TemplateMatch {
            score: min_val,
            location: window.origin() + Point::new(min_loc.x, min_loc.y),
        })
    }
}

/// SIFT keypoints on the grayscale eye area
pub struct SiftSalience {
    sift: Ptr<SIFT>,
}

impl SiftSalience {
    pub fn new() -> Result<Self> {
        let sift = SIFT::create(0, 3, 0.01, 10.0, 1.6, false)?;
        Ok(Self { sift })
    }
}

impl SalienceExtractor for SiftSalience {
    type Image = Mat;

    #[allow(clippy::cast_possible_truncation)]
    fn keypoints(&mut self, image: &Mat, area: Region) -> Result<Vec<Point>> {
        if area.is_empty() {
            return Ok(Vec::new());
        }

        let roi = crop(image, area)?;
        let mut gray = Mat::default();
        imgproc::cvt_color(&roi, &mut gray, imgproc::COLOR_BGR2GRAY, 0)?;

        let mut keypoints = Vector::new();
        self.sift.detect(&gray, &mut keypoints, &Mat::default())?;

        Ok(keypoints
            .iter()
            .map(|kp| {
                let pt = kp.pt();
                Point::new(area.x + pt.x as i32, area.y + pt.y as i32)
            })
            .collect())
    }
}

/// Denoise and optionally mirror a raw camera frame
pub fn preprocess(frame: &Mat, settings: &Settings, mirror: bool) -> Result<Mat> {
    let mut blurred = Mat::default();
    imgproc::median_blur(frame, &mut blurred, settings.blur_kernel())?;

    if !mirror {
        return Ok(blurred);
    }

    let mut flipped = Mat::default();
    core::flip(&blurred, &mut flipped, 1)?;
    debug!("Preprocessed frame {}x{}", flipped.cols(), flipped.rows());
    Ok(flipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Scalar, CV_8UC3};

    fn checkerboard(width: i32, height: i32) -> Mat {
        let mut image = Mat::new_rows_cols_with_default(height, width, CV_8UC3, Scalar::all(0.0)).unwrap();
        for y in (0..height).step_by(8) {
            for x in (0..width).step_by(8) {
                if (x / 8 + y / 8) % 2 == 0 {
                    imgproc::rectangle(
                        &mut image,
                        core::Rect::new(x, y, 8, 8),
                        Scalar::all(255.0),
                        -1,
                        imgproc::LINE_8,
                        0,
                    )
                    .unwrap();
                }
            }
        }
        image
    }

    #[test]
    fn test_mat_reports_size() {
        let image = checkerboard(64, 48);
        assert_eq!(FrameImage::size(&image), Size::new(64, 48));
    }

    #[test]
    fn test_template_found_at_capture_location() {
        let mut image = checkerboard(128, 128);
        imgproc::circle(&mut image, core::Point::new(60, 60), 5, Scalar::new(0.0, 0.0, 255.0, 0.0), -1, imgproc::LINE_8, 0)
            .unwrap();

        let matcher = SqDiffMatcher;
        let region = Region::new(50, 50, 20, 20);
        let template = matcher.capture(&image, region).unwrap();
        let best = matcher.best_match(&image, region.search_window(), &template).unwrap();

        assert!(best.score < 1e-6);
        assert_eq!(best.location, Point::new(50, 50));
    }

    #[test]
    fn test_preprocess_mirrors() {
        let mut image = Mat::new_rows_cols_with_default(4, 4, CV_8UC3, Scalar::all(0.0)).unwrap();
        imgproc::rectangle(&mut image, core::Rect::new(0, 0, 1, 4), Scalar::all(255.0), -1, imgproc::LINE_8, 0)
            .unwrap();

        let out = preprocess(&image, &Settings::default(), true).unwrap();
        assert_eq!(out.at_2d::<core::Vec3b>(0, 3).unwrap()[0], 255);
        assert_eq!(out.at_2d::<core::Vec3b>(0, 0).unwrap()[0], 0);
    }

    #[test]
    fn test_missing_cascade_is_model_error() {
        let result = CascadeDetector::new("/nonexistent/cascade.xml");
        assert!(matches!(result, Err(Error::ModelError(_))));
    }
}
