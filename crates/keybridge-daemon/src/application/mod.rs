//! Application layer: the event-queue reconciliation engine.
//!
//! [`input_state`] owns the shared state mutated by the capture thread;
//! [`forward_keys`] drains it towards the console on the main loop. The
//! two halves meet only through the mutex inside `InputState`: capture
//! never touches the network, and the dispatcher never blocks capture on
//! I/O.

pub mod forward_keys;
pub mod input_state;
