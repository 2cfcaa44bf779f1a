//! Main application module: camera, control panel and the frame loop.

use crate::{
    config::{Config, Settings},
    constants::{MOTION_THRESHOLD_MAX, NOISE_FILTER_MAX, SENSITIVITY_MAX, SPEED_MAX},
    cursor_control::{LoggingPointer, PointerSink},
    error::{AppError, Result},
    gesture::{GestureEvent, MonotonicClock},
    pipeline::{FramePipeline, FrameReport},
    vision::{preprocess, CascadeDetector, SiftSalience, SqDiffMatcher},
};
use log::{debug, info, warn};
use opencv::{
    core::{Mat, Scalar},
    highgui::{self, WINDOW_AUTOSIZE, WND_PROP_VISIBLE},
    imgproc::{self, LINE_8},
    prelude::*,
    videoio::{self, VideoCapture, CAP_PROP_BUFFERSIZE, CAP_PROP_FPS},
};
use std::io::{self, Write};
use std::time::{Duration, Instant};

#[cfg(feature = "x11")]
use crate::cursor_control::CursorController;

const CONTROL_WINDOW: &str = "Head Mouse";
const DEBUG_WINDOW: &str = "Head Mouse Debug";

const SPEED: &str = "Speed";
const MOTION_THRESHOLD: &str = "Motion threshold";
const CLICK_SENSITIVITY: &str = "Click sensitivity";
const DRAG_SENSITIVITY: &str = "Drag sensitivity";
const NOISE_FILTER: &str = "Noise filter";
const RECALIBRATE: &str = "Recalibrate";
const DEBUG: &str = "Debug";

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// File configuration, with command line overrides applied
    pub config: Config,
    /// Log pointer actions instead of injecting them
    pub dry_run: bool,
}

/// Trackbar window exposing the live [`Settings`]
pub struct ControlPanel;

impl ControlPanel {
    /// Create the window with one trackbar per knob
    pub fn open(initial: &Settings) -> Result<Self> {
        highgui::named_window(CONTROL_WINDOW, WINDOW_AUTOSIZE)?;
        for (name, value, max) in Self::knobs(initial) {
            highgui::create_trackbar(name, CONTROL_WINDOW, None, max, None)?;
            highgui::set_trackbar_pos(name, CONTROL_WINDOW, value)?;
        }
        Ok(Self)
    }

    fn knobs(settings: &Settings) -> [(&'static str, i32, i32); 7] {
        [
            (SPEED, settings.speed, SPEED_MAX),
            (MOTION_THRESHOLD, settings.motion_threshold, MOTION_THRESHOLD_MAX),
            (CLICK_SENSITIVITY, settings.click_sensitivity, SENSITIVITY_MAX),
            (DRAG_SENSITIVITY, settings.drag_sensitivity, SENSITIVITY_MAX),
            (NOISE_FILTER, settings.noise_filter, NOISE_FILTER_MAX),
            (RECALIBRATE, i32::from(settings.recalibrate), 1),
            (DEBUG, i32::from(settings.debug), 1),
        ]
    }

    /// Current trackbar positions
    pub fn read(&self) -> Result<Settings> {
        let pos = |name: &str| highgui::get_trackbar_pos(name, CONTROL_WINDOW);
        Ok(Settings {
            speed: pos(SPEED)?,
            motion_threshold: pos(MOTION_THRESHOLD)?,
            click_sensitivity: pos(CLICK_SENSITIVITY)?,
            drag_sensitivity: pos(DRAG_SENSITIVITY)?,
            noise_filter: pos(NOISE_FILTER)?,
            recalibrate: pos(RECALIBRATE)? != 0,
            debug: pos(DEBUG)? != 0,
        })
    }

    /// Move every trackbar to `settings`
    pub fn write(&self, settings: &Settings) -> Result<()> {
        for (name, value, _) in Self::knobs(settings) {
            highgui::set_trackbar_pos(name, CONTROL_WINDOW, value)?;
        }
        Ok(())
    }

    /// The loop runs while this window is visible
    pub fn is_open(&self) -> Result<bool> {
        Ok(highgui::get_window_property(CONTROL_WINDOW, WND_PROP_VISIBLE)? >= 1.0)
    }
}

/// Recalibration requested on the panel, held until a frame consumes it
#[derive(Debug, Default)]
struct RecalibrationLatch {
    pending: bool,
}

impl RecalibrationLatch {
    /// Latch the knob; true when it was set and has to be cleared on the panel
    fn latch(&mut self, settings: &Settings) -> bool {
        self.pending |= settings.recalibrate;
        settings.recalibrate
    }

    /// Settings for the frame about to be processed, consuming the request
    fn apply(&mut self, settings: &Settings) -> Settings {
        Settings {
            recalibrate: std::mem::take(&mut self.pending),
            ..settings.clone()
        }
    }
}

type CameraPipeline = FramePipeline<CascadeDetector, CascadeDetector, SqDiffMatcher, SiftSalience, MonotonicClock>;

/// Main application struct
pub struct HeadMouseApp {
    config: Config,
    capture: VideoCapture,
    panel: ControlPanel,
    pipeline: CameraPipeline,
    pointer: Box<dyn PointerSink>,
    recalibration: RecalibrationLatch,
    debug_window_open: bool,
}

impl HeadMouseApp {
    /// Open the camera, load the cascades and create the control panel
    pub fn new(app_config: AppConfig) -> Result<Self> {
        info!("Initializing head mouse application");
        let AppConfig { config, dry_run } = app_config;

        let eye_pair = CascadeDetector::new(&config.cascades.eye_pair)?;
        let nose = CascadeDetector::new(&config.cascades.nose)?;
        let salience = SiftSalience::new()?;

        info!("Opening camera {}", config.camera.index);
        let mut capture = VideoCapture::new(config.camera.index, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(AppError::CameraUnavailable(format!(
                "camera {} could not be opened",
                config.camera.index
            )));
        }
        capture.set(CAP_PROP_FPS, config.camera.fps)?;
        // Reduce buffer size for lower latency
        capture.set(CAP_PROP_BUFFERSIZE, 1.0)?;

        let panel = ControlPanel::open(&config.controls.clamped())?;
        let pipeline = FramePipeline::new(eye_pair, nose, SqDiffMatcher, salience, MonotonicClock::default(), &config)?;

        Ok(Self {
            config,
            capture,
            panel,
            pipeline,
            pointer: create_pointer(dry_run),
            recalibration: RecalibrationLatch::default(),
            debug_window_open: false,
        })
    }

    /// Run until the control panel is closed
    pub fn run(&mut self) -> Result<()> {
        print_instructions();

        let mut frame = Mat::default();
        let mut frame_count = 0u32;
        let mut last_fps_update = Instant::now();

        while self.panel.is_open()? {
            match self.step(&mut frame) {
                Ok(true) => frame_count += 1,
                Ok(false) => {}
                Err(e) => warn!("Frame processing failed: {}", e),
            }

            let elapsed = last_fps_update.elapsed();
            if elapsed >= Duration::from_secs(1) {
                let fps = f64::from(frame_count) / elapsed.as_secs_f64();
                if self.debug_window_open {
                    info!("FPS: {:.1}", fps);
                } else {
                    debug!("FPS: {:.1}", fps);
                }
                frame_count = 0;
                last_fps_update = Instant::now();
            }

            highgui::wait_key(self.config.camera.frame_delay_ms)?;
        }

        info!("Control panel closed, shutting down");
        self.capture.release()?;
        highgui::destroy_all_windows()?;
        Ok(())
    }

    /// Read and process one frame; `false` when no frame was available
    fn step(&mut self, frame: &mut Mat) -> Result<bool> {
        let mut settings = self.panel.read()?.clamped();
        if self.recalibration.latch(&settings) {
            settings.recalibrate = false;
            self.panel.write(&settings)?;
        }

        if !self.capture.read(frame)? || frame.empty() {
            warn!("Failed to read frame, retrying...");
            return Ok(false);
        }

        let settings = self.recalibration.apply(&settings);
        let image = preprocess(frame, &settings, self.config.camera.mirror)?;
        let report = self.pipeline.process(&image, &settings, &mut self.pointer)?;
        self.handle_report(&image, &settings, &report)?;
        Ok(true)
    }

    fn handle_report(&mut self, image: &Mat, settings: &Settings, report: &FrameReport) -> Result<()> {
        if report.calibration_completed {
            println!("Calibration complete\x07");
            self.panel.write(&self.panel.read()?)?;
        }

        let toggled = report
            .events
            .iter()
            .any(|event| matches!(event, GestureEvent::DragStart | GestureEvent::DragEnd));
        if toggled && !report.events.contains(&GestureEvent::RightClick) {
            print!("\x07");
            io::stdout().flush()?;
        }

        if settings.debug {
            self.show_debug(image, report)?;
        } else if self.debug_window_open {
            highgui::destroy_window(DEBUG_WINDOW)?;
            self.debug_window_open = false;
        }

        Ok(())
    }

    fn show_debug(&mut self, image: &Mat, report: &FrameReport) -> Result<()> {
        let mut display = image.try_clone()?;

        if let Some(face) = report.face {
            imgproc::rectangle(&mut display, face.into(), Scalar::new(255.0, 0.0, 0.0, 0.0), 1, LINE_8, 0)?;
        }
        if let Some(nose) = report.nose {
            imgproc::rectangle(&mut display, nose.into(), Scalar::new(0.0, 255.0, 0.0, 0.0), 2, LINE_8, 0)?;
        }
        for point in &report.keypoints {
            imgproc::circle(&mut display, (*point).into(), 2, Scalar::new(0.0, 0.0, 255.0, 0.0), -1, LINE_8, 0)?;
        }

        highgui::imshow(DEBUG_WINDOW, &display)?;
        self.debug_window_open = true;
        Ok(())
    }
}

fn create_pointer(dry_run: bool) -> Box<dyn PointerSink> {
    if dry_run {
        info!("Dry run: pointer actions will only be logged");
        return Box::new(LoggingPointer);
    }

    #[cfg(feature = "x11")]
    {
        match CursorController::new() {
            Ok(controller) => {
                info!("X11 cursor control initialized");
                return Box::new(controller);
            }
            Err(e) => warn!("Failed to initialize cursor control: {}", e),
        }
    }

    #[cfg(not(feature = "x11"))]
    warn!("Built without X11 support");

    warn!("Pointer actions will only be logged");
    Box::new(LoggingPointer)
}

fn print_instructions() {
    println!("Head Mouse");
    println!("  Move your head to move the pointer.");
    println!("  Raise your eyebrows to left click; keep them raised to click again.");
    println!("  Close your eyes for a moment to start or stop dragging.");
    println!("  Raise your eyebrows while dragging to right click.");
    println!("Hold still with a neutral expression until the calibration beep.");
    println!("Use the Recalibrate slider to start over, close the control panel to quit.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recalibration_is_consumed_once() {
        let mut latch = RecalibrationLatch::default();
        let requested = Settings::default();
        assert!(requested.recalibrate);

        assert!(latch.latch(&requested));
        assert!(latch.apply(&requested).recalibrate);

        // The knob was cleared, so later frames run without recalibrating
        let cleared = Settings {
            recalibrate: false,
            ..requested
        };
        assert!(!latch.latch(&cleared));
        assert!(!latch.apply(&cleared).recalibrate);
    }

    #[test]
    fn test_recalibration_waits_for_a_frame() {
        let mut latch = RecalibrationLatch::default();
        let cleared = Settings {
            recalibrate: false,
            ..Settings::default()
        };

        // Requested on a frame the camera failed to deliver
        assert!(latch.latch(&Settings::default()));
        assert!(!latch.latch(&cleared));
        assert!(latch.apply(&cleared).recalibrate);
        assert!(!latch.apply(&cleared).recalibrate);
    }
}
