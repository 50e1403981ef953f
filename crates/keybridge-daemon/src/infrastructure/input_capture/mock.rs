//! Mock key source for unit and integration testing.
//!
//! Allows tests to inject synthetic [`RawKeyEvent`]s without a real
//! keyboard or device permissions.

use std::sync::{
    mpsc::{self, Sender},
    Arc, Mutex,
};

use super::{CaptureError, KeySource, RawKeyEvent};

/// A mock implementation of [`KeySource`] that tests drive by hand.
#[derive(Default)]
pub struct MockKeySource {
    sender: Arc<Mutex<Option<Sender<RawKeyEvent>>>>,
}

impl MockKeySource {
    /// Creates a new mock key source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Injects a synthetic event, as if captured from hardware.
    ///
    /// Panics if `start()` has not been called or `stop()` already has.
    pub fn inject(&self, event: RawKeyEvent) {
        let guard = self.sender.lock().expect("lock poisoned");
        if let Some(ref sender) = *guard {
            sender
                .send(event)
                .expect("receiver has been dropped; call start() first");
        } else {
            panic!("MockKeySource::inject called before start()");
        }
    }

    /// Convenience: injects a press of `keycode`.
    pub fn press(&self, keycode: u8) {
        self.inject(RawKeyEvent::Press { keycode });
    }

    /// Convenience: injects a release of `keycode`.
    pub fn release(&self, keycode: u8) {
        self.inject(RawKeyEvent::Release { keycode });
    }
}

impl KeySource for MockKeySource {
    fn start(&self) -> Result<mpsc::Receiver<RawKeyEvent>, CaptureError> {
        let (tx, rx) = mpsc::channel();
        *self.sender.lock().expect("lock poisoned") = Some(tx);
        Ok(rx)
    }

    fn stop(&self) {
        // Drop the sender to close the channel
        *self.sender.lock().expect("lock poisoned") = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_source_delivers_injected_events() {
        // Arrange
        let source = MockKeySource::new();
        let rx = source.start().expect("start should succeed");

        // Act
        source.press(0x0A);
        source.release(0x0A);

        // Assert
        assert_eq!(rx.recv().unwrap(), RawKeyEvent::Press { keycode: 0x0A });
        assert_eq!(rx.recv().unwrap(), RawKeyEvent::Release { keycode: 0x0A });
    }

    #[test]
    fn test_stop_closes_the_channel() {
        // Arrange
        let source = MockKeySource::new();
        let rx = source.start().expect("start should succeed");

        // Act
        source.stop();

        // Assert – receiver sees disconnect
        assert!(rx.recv().is_err());
    }
}
