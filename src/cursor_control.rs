//! Pointer injection.
//!
//! [`PointerSink`] is the seam between gesture/motion logic and the OS. The
//! X11 implementation moves the pointer with relative warps and presses
//! buttons through the XTest extension.

use crate::error::Result;
use log::info;
use std::thread;
use std::time::Duration;

/// Mouse button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
}

impl MouseButton {
    /// X11 core protocol button number
    #[must_use]
    pub const fn x11_button(self) -> u8 {
        match self {
            Self::Left => 1,
            Self::Right => 3,
        }
    }
}

/// OS-level pointer primitives
pub trait PointerSink {
    /// Move relative to the current position
    fn move_by(&mut self, dx: i32, dy: i32) -> Result<()>;

    fn button_down(&mut self, button: MouseButton) -> Result<()>;

    fn button_up(&mut self, button: MouseButton) -> Result<()>;
}

impl<P: PointerSink + ?Sized> PointerSink for Box<P> {
    fn move_by(&mut self, dx: i32, dy: i32) -> Result<()> {
        (**self).move_by(dx, dy)
    }

    fn button_down(&mut self, button: MouseButton) -> Result<()> {
        (**self).button_down(button)
    }

    fn button_up(&mut self, button: MouseButton) -> Result<()> {
        (**self).button_up(button)
    }
}

/// Press and release `button`, holding it down for `hold`
pub fn click<P: PointerSink + ?Sized>(pointer: &mut P, button: MouseButton, hold: Duration) -> Result<()> {
    pointer.button_down(button)?;
    if !hold.is_zero() {
        thread::sleep(hold);
    }
    pointer.button_up(button)
}

/// Logs pointer actions instead of performing them
#[derive(Debug, Default)]
pub struct LoggingPointer;

impl PointerSink for LoggingPointer {
    fn move_by(&mut self, dx: i32, dy: i32) -> Result<()> {
        info!("[dry run] move pointer by ({}, {})", dx, dy);
        Ok(())
    }

    fn button_down(&mut self, button: MouseButton) -> Result<()> {
        info!("[dry run] {:?} button down", button);
        Ok(())
    }

    fn button_up(&mut self, button: MouseButton) -> Result<()> {
        info!("[dry run] {:?} button up", button);
        Ok(())
    }
}

#[cfg(feature = "x11")]
pub use x11::CursorController;

#[cfg(feature = "x11")]
mod x11 {
    use super::{MouseButton, PointerSink};
    use crate::{
        error::{AppError, Result},
        utils::safe_cast::i32_to_i16_clamp,
    };
    use log::{debug, info};
    use x11rb::{
        connection::{Connection, RequestConnection},
        protocol::{
            xproto::{ConnectionExt, Screen, BUTTON_PRESS_EVENT, BUTTON_RELEASE_EVENT},
            xtest::{self, ConnectionExt as XTestExt},
        },
        rust_connection::RustConnection,
    };

    /// Cursor control implementation for X11
    pub struct CursorController {
        connection: RustConnection,
        screen: Screen,
    }

    impl CursorController {
        /// Connect to the X server and check for the XTest extension
        pub fn new() -> Result<Self> {
            info!("Initializing X11 cursor controller");

            let (connection, screen_num) = RustConnection::connect(None)
                .map_err(|e| AppError::CursorControl(format!("Failed to connect to X11: {e}")))?;

            let screen = connection
                .setup()
                .roots
                .get(screen_num)
                .ok_or_else(|| AppError::CursorControl("Failed to get screen".to_string()))?
                .clone();

            let xtest_present = connection
                .extension_information(xtest::X11_EXTENSION_NAME)
                .map_err(|e| AppError::CursorControl(format!("Failed to query XTest: {e}")))?
                .is_some();
            if !xtest_present {
                return Err(AppError::CursorControl(
                    "X server does not support the XTest extension".to_string(),
                ));
            }

            info!(
                "Connected to X11 display, screen: {}x{}",
                screen.width_in_pixels, screen.height_in_pixels
            );

            Ok(Self { connection, screen })
        }

        fn fake_button(&self, event_type: u8, button: MouseButton) -> Result<()> {
            self.connection
                .xtest_fake_input(event_type, button.x11_button(), x11rb::CURRENT_TIME, self.screen.root, 0, 0, 0)
                .map_err(|e| AppError::CursorControl(format!("Failed to fake button event: {e}")))?;
            self.flush()
        }

        fn flush(&self) -> Result<()> {
            self.connection
                .flush()
                .map_err(|e| AppError::CursorControl(format!("Failed to flush connection: {e}")))
        }
    }

    impl PointerSink for CursorController {
        fn move_by(&mut self, dx: i32, dy: i32) -> Result<()> {
            debug!("Moving cursor by ({}, {})", dx, dy);

            // With no destination window the warp is relative to the current position
            self.connection
                .warp_pointer(
                    x11rb::NONE,
                    x11rb::NONE,
                    0,
                    0,
                    0,
                    0,
                    i32_to_i16_clamp(dx),
                    i32_to_i16_clamp(dy),
                )
                .map_err(|e| AppError::CursorControl(format!("Failed to warp pointer: {e}")))?;

            self.flush()
        }

        fn button_down(&mut self, button: MouseButton) -> Result<()> {
            debug!("{:?} button down", button);
            self.fake_button(BUTTON_PRESS_EVENT, button)
        }

        fn button_up(&mut self, button: MouseButton) -> Result<()> {
            debug!("{:?} button up", button);
            self.fake_button(BUTTON_RELEASE_EVENT, button)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl PointerSink for Recorder {
        fn move_by(&mut self, dx: i32, dy: i32) -> Result<()> {
            self.0.push(format!("move {dx} {dy}"));
            Ok(())
        }

        fn button_down(&mut self, button: MouseButton) -> Result<()> {
            self.0.push(format!("down {button:?}"));
            Ok(())
        }

        fn button_up(&mut self, button: MouseButton) -> Result<()> {
            self.0.push(format!("up {button:?}"));
            Ok(())
        }
    }

    #[test]
    fn test_click_is_down_then_up() {
        let mut recorder = Recorder::default();
        click(&mut recorder, MouseButton::Right, Duration::ZERO).unwrap();
        assert_eq!(recorder.0, vec!["down Right", "up Right"]);
    }

    #[test]
    fn test_boxed_sink_forwards() {
        let mut boxed: Box<dyn PointerSink> = Box::new(LoggingPointer);
        assert!(boxed.move_by(1, -1).is_ok());
        assert!(click(&mut boxed, MouseButton::Left, Duration::from_millis(1)).is_ok());
    }

    #[test]
    fn test_x11_button_numbers() {
        assert_eq!(MouseButton::Left.x11_button(), 1);
        assert_eq!(MouseButton::Right.x11_button(), 3);
    }

    #[cfg(feature = "x11")]
    #[test]
    #[ignore] // Requires X11 display
    fn test_cursor_controller_moves_relative() {
        let mut controller = CursorController::new().expect("X11 display with XTest");
        assert!(controller.move_by(0, 0).is_ok());
    }
}
