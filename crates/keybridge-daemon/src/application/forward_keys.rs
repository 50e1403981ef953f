//! ForwardKeysUseCase: drains the pending key queue to the console.
//!
//! Invoked once per main-loop tick. Depends only on the
//! [`ConsoleTransport`] trait; the TCP implementation is injected at
//! construction time, which keeps the use case fully unit-testable.
//!
//! Emission order within one drain is fixed: all ups, then all downs.
//! Flushing stale key-state before re-asserting new key-state keeps the
//! console from seeing "down" followed by "down-again" without an
//! intervening "up" on fast repeats. Order *within* each phase is
//! unspecified; the queues are sets.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use super::input_state::InputState;

/// Trait for delivering key commands to the remote console.
///
/// The infrastructure implementation speaks OSC over TCP; test
/// implementations record calls. Implementations must tolerate being
/// called while disconnected (drop, don't error out the caller's loop)
/// and must not block indefinitely.
#[async_trait]
pub trait ConsoleTransport: Send + Sync {
    /// Sends one key command with its direction.
    async fn send_key(&self, command: &str, is_down: bool) -> Result<(), String>;
}

/// The forward-keys use case.
pub struct ForwardKeysUseCase {
    state: Arc<InputState>,
    transport: Arc<dyn ConsoleTransport>,
}

impl ForwardKeysUseCase {
    /// Creates a new use case draining `state` into `transport`.
    pub fn new(state: Arc<InputState>, transport: Arc<dyn ConsoleTransport>) -> Self {
        Self { state, transport }
    }

    /// Runs one drain cycle. Returns the number of commands emitted
    /// (zero when the queue was clean).
    ///
    /// Transport failures are logged and swallowed: once dequeued, a key
    /// event is gone. A keystroke lost while the console is unreachable
    /// is operator-visible and self-correcting, so there is no retry or
    /// replay machinery here.
    pub async fn tick(&self) -> usize {
        let Some(batch) = self.state.take_batch() else {
            return 0;
        };

        let mut emitted = 0;
        for command in &batch.ups {
            if let Err(e) = self.transport.send_key(command, false).await {
                warn!(command, error = %e, "failed to send key up");
            }
            emitted += 1;
        }
        for command in &batch.downs {
            if let Err(e) = self.transport.send_key(command, true).await {
                warn!(command, error = %e, "failed to send key down");
            }
            emitted += 1;
        }
        emitted
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
