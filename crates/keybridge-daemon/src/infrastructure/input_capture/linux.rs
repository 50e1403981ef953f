//! evdev-based key capture for Linux hosts.
//!
//! Opens a keyboard device under `/dev/input` (an explicit path, or the
//! first device that looks like a keyboard) and pumps its key events on
//! a dedicated blocking thread. Linux `KEY_*` codes are translated to
//! the bridge keycode space via the core table; key repeat events
//! (value 2) are dropped, since the console holds its own key state and
//! only transitions matter.
//!
//! Running this typically requires membership in the `input` group or
//! root.

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc, Arc, Mutex,
};

use evdev::{Device, EventType, InputEventKind, Key};
use keybridge_core::keymap::linux_evdev::evdev_to_keycode;
use tracing::{debug, info, warn};

use super::{CaptureError, KeySource, RawKeyEvent};

/// A [`KeySource`] reading from a Linux evdev keyboard device.
pub struct EvdevKeySource {
    /// Explicit device path; `None` scans `/dev/input` for a keyboard.
    device_path: Option<PathBuf>,
    running: Arc<AtomicBool>,
    started: Mutex<bool>,
}

impl EvdevKeySource {
    /// Creates a source for an explicit device path, or auto-detection
    /// when `device_path` is `None`.
    pub fn new(device_path: Option<PathBuf>) -> Self {
        Self {
            device_path,
            running: Arc::new(AtomicBool::new(false)),
            started: Mutex::new(false),
        }
    }

    fn open_device(&self) -> Result<(PathBuf, Device), CaptureError> {
        if let Some(path) = &self.device_path {
            let device = Device::open(path).map_err(|source| CaptureError::OpenFailed {
                device: path.display().to_string(),
                source,
            })?;
            return Ok((path.clone(), device));
        }
        find_keyboard()
    }
}

/// Returns `true` if a device reports key events and has a letter key,
/// the simplest reliable "is this a keyboard" test.
fn is_keyboard(device: &Device) -> bool {
    device.supported_events().contains(EventType::KEY)
        && device
            .supported_keys()
            .map(|keys| keys.contains(Key::KEY_A))
            .unwrap_or(false)
}

/// Scans `/dev/input/event*` for the first keyboard-looking device.
fn find_keyboard() -> Result<(PathBuf, Device), CaptureError> {
    let dir = std::fs::read_dir("/dev/input").map_err(|source| CaptureError::OpenFailed {
        device: "/dev/input".to_string(),
        source,
    })?;

    for entry in dir.flatten() {
        let path = entry.path();
        let is_event_node = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with("event"))
            .unwrap_or(false);
        if !is_event_node {
            continue;
        }

        match Device::open(&path) {
            Ok(device) if is_keyboard(&device) => {
                info!(
                    device = %path.display(),
                    name = device.name().unwrap_or("unknown"),
                    "using keyboard device"
                );
                return Ok((path, device));
            }
            Ok(_) => {}
            Err(e) => debug!(device = %path.display(), "could not open: {e}"),
        }
    }

    Err(CaptureError::NoKeyboard {
        searched: "/dev/input".to_string(),
    })
}

/// The capture loop executed on the capture thread.
fn capture_loop(
    mut device: Device,
    tx: mpsc::Sender<RawKeyEvent>,
    running: Arc<AtomicBool>,
) {
    while running.load(Ordering::Relaxed) {
        let events = match device.fetch_events() {
            Ok(events) => events,
            Err(e) => {
                warn!("keyboard read failed (unplugged?): {e}");
                break;
            }
        };

        for event in events {
            let InputEventKind::Key(key) = event.kind() else {
                continue;
            };
            let Some(keycode) = evdev_to_keycode(key.code()) else {
                debug!(code = key.code(), "ignoring unmapped key");
                continue;
            };
            // value: 1 = press, 0 = release, 2 = autorepeat (dropped)
            let raw = match event.value() {
                1 => RawKeyEvent::Press { keycode },
                0 => RawKeyEvent::Release { keycode },
                _ => continue,
            };
            if tx.send(raw).is_err() {
                // Receiver dropped – the daemon is shutting down.
                return;
            }
        }
    }
    info!("keyboard capture stopped");
}

impl KeySource for EvdevKeySource {
    fn start(&self) -> Result<mpsc::Receiver<RawKeyEvent>, CaptureError> {
        let mut started = self.started.lock().expect("lock poisoned");
        if *started {
            return Err(CaptureError::AlreadyStarted);
        }

        let (path, device) = self.open_device()?;
        info!(device = %path.display(), "starting keyboard capture");

        let (tx, rx) = mpsc::channel();
        self.running.store(true, Ordering::Relaxed);
        let running = Arc::clone(&self.running);

        std::thread::Builder::new()
            .name("keybridge-capture".to_string())
            .spawn(move || capture_loop(device, tx, running))
            .expect("failed to spawn capture thread");

        *started = true;
        Ok(rx)
    }

    fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
        // The blocking read returns on the next device event or error;
        // the thread then observes the cleared flag and exits.
    }
}
