//! Raw key capture sources.
//!
//! A [`KeySource`] produces [`RawKeyEvent`]s on a std `mpsc` channel from
//! its own thread; the daemon pumps them into the input state. Keycodes
//! on this boundary are USB HID usages (page 0x07) with the modifier
//! usages 0xE0–0xE7 already remapped into 103–110. Sources are
//! responsible for that remap, exactly as the original USB host stack
//! was.
//!
//! Capture runs on its own thread so that a slow network send can never
//! stall key capture (and vice versa). This is the portable form of the
//! original's "no network calls from the key interrupt" rule.

pub mod mock;

#[cfg(target_os = "linux")]
pub mod linux;

use std::sync::mpsc;

use thiserror::Error;

/// Error type for capture source startup.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// No usable keyboard device was found.
    #[error("no keyboard device found under {searched}")]
    NoKeyboard { searched: String },

    /// The device could not be opened (typically a permissions problem).
    #[error("failed to open input device {device}: {source}")]
    OpenFailed {
        device: String,
        #[source]
        source: std::io::Error,
    },

    /// The capture source is already running.
    #[error("capture source already started")]
    AlreadyStarted,
}

/// One raw key transition from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawKeyEvent {
    /// A key went down. Keycode per the module contract above.
    Press { keycode: u8 },
    /// A key came up.
    Release { keycode: u8 },
}

/// Trait for a source of raw key events.
///
/// Infrastructure implementations read hardware; the mock implementation
/// lets tests inject events.
pub trait KeySource: Send + Sync {
    /// Starts capture and returns the channel events arrive on.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError`] if the underlying device cannot be
    /// opened or capture is already running.
    fn start(&self) -> Result<mpsc::Receiver<RawKeyEvent>, CaptureError>;

    /// Stops capture and closes the channel.
    fn stop(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_key_event_carries_keycode() {
        let press = RawKeyEvent::Press { keycode: 0x0A };
        let release = RawKeyEvent::Release { keycode: 0x0A };

        assert!(matches!(press, RawKeyEvent::Press { keycode: 0x0A }));
        assert_ne!(press, release);
    }

    #[test]
    fn test_capture_error_messages_name_the_device() {
        let e = CaptureError::OpenFailed {
            device: "/dev/input/event3".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.to_string().contains("/dev/input/event3"));
    }
}
