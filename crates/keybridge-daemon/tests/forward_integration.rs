//! End-to-end tests for the capture → translate → forward pipeline.
//!
//! These tests stand up a real [`ConsoleConnection`] against a local TCP
//! listener playing the console's role, inject key events through the
//! [`MockKeySource`], and assert on the exact bytes the "console"
//! receives. This exercises the same path as the daemon binary:
//!
//! ```text
//! MockKeySource → InputState → ForwardKeysUseCase → ConsoleConnection → TCP
//! ```
//!
//! Only the evdev capture thread and UDP discovery are absent; both have
//! their own tests.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;

use keybridge_core::osc::framing::OscFraming;
use keybridge_daemon::application::forward_keys::{ConsoleTransport, ForwardKeysUseCase};
use keybridge_daemon::application::input_state::InputState;
use keybridge_daemon::infrastructure::input_capture::{KeySource, RawKeyEvent};
use keybridge_daemon::infrastructure::input_capture::mock::MockKeySource;
use keybridge_daemon::infrastructure::network::{ConsoleConnection, ConsoleConnectionConfig};

/// Builds the full pipeline against a listener bound to an OS-assigned
/// port, and waits for the connection to come up.
async fn connected_pipeline(
    framing: OscFraming,
) -> (
    TcpListener,
    MockKeySource,
    Arc<InputState>,
    ForwardKeysUseCase,
    Arc<AtomicBool>,
) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
    let addr = listener.local_addr().unwrap();

    let connection = Arc::new(ConsoleConnection::new(ConsoleConnectionConfig {
        console_addr: addr,
        framing,
        address_prefix: "/eos/key/".to_string(),
        reconnect_interval: Duration::from_millis(50),
    }));
    let running = Arc::new(AtomicBool::new(true));
    connection.start(Arc::clone(&running));

    // Wait (bounded) for the background task to connect.
    for _ in 0..100 {
        if connection.is_connected().await {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(connection.is_connected().await, "connection never came up");

    let state = Arc::new(InputState::new());
    let source = MockKeySource::new();
    let forward = ForwardKeysUseCase::new(
        Arc::clone(&state),
        Arc::clone(&connection) as Arc<dyn ConsoleTransport>,
    );

    (listener, source, state, forward, running)
}

/// Feeds all events from `source` into `state`, as the daemon's event
/// pump thread does.
fn pump(rx: &std::sync::mpsc::Receiver<RawKeyEvent>, state: &InputState) {
    while let Ok(event) = rx.try_recv() {
        match event {
            RawKeyEvent::Press { keycode } => state.on_raw_press(keycode),
            RawKeyEvent::Release { keycode } => state.on_raw_release(keycode),
        }
    }
}

/// Tests the happy path: one Space press arrives at the console as the
/// packet-length-framed OSC message `/eos/key/go 1.0`.
#[tokio::test]
async fn test_space_press_reaches_console_as_framed_go_message() {
    // Arrange
    let (listener, source, state, forward, running) =
        connected_pipeline(OscFraming::PacketLength).await;
    let (mut console, _) = listener.accept().await.expect("accept");
    let rx = source.start().expect("start mock source");

    // Act – Space (HID 0x2C) maps to "go"
    source.press(0x2C);
    pump(&rx, &state);
    let emitted = forward.tick().await;

    // Assert – exact wire bytes: 4-byte BE length, then the OSC packet
    assert_eq!(emitted, 1);
    let mut buf = [0u8; 24];
    console.read_exact(&mut buf).await.expect("read framed message");
    assert_eq!(&buf[..4], &20u32.to_be_bytes());
    assert_eq!(&buf[4..16], b"/eos/key/go\0");
    assert_eq!(&buf[16..20], b",f\0\0");
    assert_eq!(&buf[20..24], &1.0f32.to_be_bytes());

    running.store(false, Ordering::Relaxed);
}

/// Tests that a Ctrl chord resolves through the chorded layout: holding
/// LCtrl while pressing G must produce `go_to_cue`, not `group`.
#[tokio::test]
async fn test_ctrl_chord_sends_chorded_command() {
    // Arrange
    let (listener, source, state, forward, running) =
        connected_pipeline(OscFraming::PacketLength).await;
    let (mut console, _) = listener.accept().await.expect("accept");
    let rx = source.start().expect("start mock source");

    // Act – LCtrl (103) down, then G (0x0A)
    source.press(103);
    source.press(0x0A);
    pump(&rx, &state);
    forward.tick().await;

    // Assert – the address names the chorded command
    let mut buf = [0u8; 32];
    console.read_exact(&mut buf).await.expect("read framed message");
    assert_eq!(&buf[..4], &28u32.to_be_bytes());
    assert_eq!(&buf[4..24], b"/eos/key/go_to_cue\0\0");

    running.store(false, Ordering::Relaxed);
}

/// Tests a full press/release cycle over SLIP framing: both packets are
/// END-delimited, and the release carries 0.0.
#[tokio::test]
async fn test_press_release_cycle_over_slip_framing() {
    // Arrange
    let (listener, source, state, forward, running) =
        connected_pipeline(OscFraming::Slip).await;
    let (mut console, _) = listener.accept().await.expect("accept");
    let rx = source.start().expect("start mock source");

    // Act – press and drain, then release and drain
    source.press(0x2C);
    pump(&rx, &state);
    forward.tick().await;
    source.release(0x2C);
    pump(&rx, &state);
    forward.tick().await;

    // Assert – two SLIP frames, each the 20-byte packet plus END bytes
    let mut buf = [0u8; 44];
    console.read_exact(&mut buf).await.expect("read both frames");
    let (down, up) = buf.split_at(22);
    assert_eq!(down[0], 0xC0);
    assert_eq!(down[21], 0xC0);
    assert_eq!(&down[1..13], b"/eos/key/go\0");
    assert_eq!(&down[17..21], &1.0f32.to_be_bytes());
    assert_eq!(up[0], 0xC0);
    assert_eq!(&up[17..21], &0.0f32.to_be_bytes());

    running.store(false, Ordering::Relaxed);
}

/// Tests that an unmapped key never reaches the wire: nothing is queued,
/// so the tick emits zero messages.
#[tokio::test]
async fn test_unmapped_key_is_dropped_before_the_wire() {
    // Arrange
    let (_listener, source, state, forward, running) =
        connected_pipeline(OscFraming::PacketLength).await;
    let rx = source.start().expect("start mock source");

    // Act – HID 0x0C has no command in the layout
    source.press(0x0C);
    pump(&rx, &state);
    let emitted = forward.tick().await;

    // Assert
    assert_eq!(emitted, 0);

    running.store(false, Ordering::Relaxed);
}

/// Tests that keys pressed while the console is down are dropped, and
/// that the pipeline keeps working for later keys: no replay of the lost
/// event after the next tick.
#[tokio::test]
async fn test_keys_lost_while_disconnected_are_not_replayed() {
    // Arrange – connection pointed at a port nothing listens on
    let connection = Arc::new(ConsoleConnection::new(ConsoleConnectionConfig {
        console_addr: "127.0.0.1:1".parse().unwrap(),
        framing: OscFraming::PacketLength,
        address_prefix: "/eos/key/".to_string(),
        reconnect_interval: Duration::from_secs(60),
    }));
    let state = Arc::new(InputState::new());
    let forward = ForwardKeysUseCase::new(
        Arc::clone(&state),
        Arc::clone(&connection) as Arc<dyn ConsoleTransport>,
    );

    // Act – the press is dequeued into the void
    state.on_raw_press(0x2C);
    let first = forward.tick().await;
    let second = forward.tick().await;

    // Assert – dequeued once, never again
    assert_eq!(first, 1);
    assert_eq!(second, 0);
}
