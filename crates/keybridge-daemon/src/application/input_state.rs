//! Shared input state: modifier tracking plus the deferred command queue.
//!
//! The capture thread calls [`InputState::on_raw_press`] and
//! [`InputState::on_raw_release`] for every key transition; the main
//! loop periodically calls [`InputState::take_batch`] to extract the
//! pending work. One mutex guards all queue-adjacent state; with human
//! keystroke rates there is nothing to gain from finer locking.
//!
//! Translation happens at press time only. A release carries just the
//! raw keycode and is resolved through the active-command map at drain
//! time, so the modifier combination held at press determines the
//! emitted command for the whole press-hold-release cycle even if
//! modifiers change in between.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use keybridge_core::keymap::eos::{translate, Command};
use keybridge_core::keymap::modifier::ModifierState;
use keybridge_core::keymap::modifier_position;
use tracing::{debug, info, warn};

/// One extracted drain cycle: commands to emit, ups first.
#[derive(Debug, Default, PartialEq)]
pub struct DrainBatch {
    /// Commands whose keys were released (emit with `is_down = false`).
    pub ups: Vec<Command>,
    /// Commands whose keys were pressed (emit with `is_down = true`).
    pub downs: Vec<Command>,
}

impl DrainBatch {
    /// Returns `true` if the batch carries nothing to emit.
    pub fn is_empty(&self) -> bool {
        self.ups.is_empty() && self.downs.is_empty()
    }
}

#[derive(Default)]
struct QueueState {
    modifiers: ModifierState,
    /// Pending "key down" command strings. Keyed by command, not
    /// keycode: two keys resolving to the same command collapse into
    /// one pending entry.
    pending_down: HashSet<Command>,
    /// Pending "key up" raw keycodes, resolved at drain time.
    pending_up: HashSet<u8>,
    /// Keycode → the command it resolved to when pressed.
    active: HashMap<u8, Command>,
    dirty: bool,
}

/// The bridge's input-side state, shared between the capture thread and
/// the dispatcher.
#[derive(Default)]
pub struct InputState {
    inner: Mutex<QueueState>,
    /// Cosmetic "anything queued since last check" flag for the
    /// activity indicator.
    activity: AtomicBool,
}

impl InputState {
    /// Creates an empty state: no modifiers held, nothing queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles a raw key press from the capture thread.
    ///
    /// Modifier keys only update the modifier bitfield. Other keys are
    /// translated immediately; a hit is recorded in the active map and
    /// queued for a down emission, a miss is logged and dropped.
    ///
    /// Never blocks on I/O; safe to call from any thread.
    pub fn on_raw_press(&self, keycode: u8) {
        let mut state = self.inner.lock().expect("input state lock poisoned");

        if let Some(position) = modifier_position(keycode) {
            state.modifiers.set(position, true);
            debug!(keycode, modifiers = state.modifiers.0, "modifier down");
            return;
        }

        match translate(keycode, state.modifiers) {
            Some(command) => {
                state.active.insert(keycode, command);
                state.pending_down.insert(command);
                state.dirty = true;
                self.activity.store(true, Ordering::Relaxed);
                debug!(keycode, command, "queued key down");
            }
            None => {
                // Expected for keys with no console mapping.
                info!(keycode, "no command mapped for keycode, dropping press");
            }
        }
    }

    /// Handles a raw key release from the capture thread.
    ///
    /// Modifier keys clear their bit; other keys queue the raw keycode
    /// for resolution at drain time.
    pub fn on_raw_release(&self, keycode: u8) {
        let mut state = self.inner.lock().expect("input state lock poisoned");

        if let Some(position) = modifier_position(keycode) {
            state.modifiers.set(position, false);
            debug!(keycode, modifiers = state.modifiers.0, "modifier up");
            return;
        }

        state.pending_up.insert(keycode);
        state.dirty = true;
        self.activity.store(true, Ordering::Relaxed);
        debug!(keycode, "queued key up");
    }

    /// Extracts everything queued so far, or `None` if nothing changed
    /// since the last drain.
    ///
    /// The dirty flag is cleared before the queues are taken, inside the
    /// same critical section: events arriving concurrently land in the
    /// fresh queues and re-set the flag for the next cycle, so nothing
    /// is ever lost between cycles.
    ///
    /// Releases are resolved here: a pending-up keycode with an active
    /// entry consumes that entry; one without is logged and skipped (a
    /// press that never resolved, or a release for a key that was down
    /// before startup).
    pub fn take_batch(&self) -> Option<DrainBatch> {
        let mut state = self.inner.lock().expect("input state lock poisoned");
        if !state.dirty {
            return None;
        }
        state.dirty = false;

        let pending_up = std::mem::take(&mut state.pending_up);
        let mut ups = Vec::with_capacity(pending_up.len());
        for keycode in pending_up {
            match state.active.remove(&keycode) {
                Some(command) => ups.push(command),
                None => warn!(keycode, "release for a key that was never down, skipping"),
            }
        }

        let downs: Vec<Command> = state.pending_down.drain().collect();
        Some(DrainBatch { ups, downs })
    }

    /// Returns whether any key event was queued since the last check,
    /// clearing the flag. Drives the activity indicator only.
    pub fn take_activity(&self) -> bool {
        self.activity.swap(false, Ordering::Relaxed)
    }

    /// Current modifier bitfield, for status reporting and tests.
    pub fn modifier_bits(&self) -> u8 {
        self.inner.lock().expect("input state lock poisoned").modifiers.0
    }
}
