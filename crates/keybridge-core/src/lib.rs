//! # keybridge-core
//!
//! Shared library for keybridge containing the key translation tables,
//! modifier-state tracking, OSC message encoding, and the two TCP wire
//! framings understood by Eos-family lighting consoles.
//!
//! This crate is used by the bridge daemon. It has zero dependencies on
//! OS APIs, sockets, or async runtimes.
//!
//! keybridge is a one-way input forwarder: keystrokes from a physical
//! keyboard become `/eos/key/<command>` OSC messages on a TCP connection
//! to a lighting console. This crate defines:
//!
//! - **`keymap`** – How a raw HID keycode plus held modifiers resolves to
//!   a console command string ("at", "go", "group", ...). The lookup key
//!   is a derived [`KeyCombo`]; the table is compiled in.
//!
//! - **`osc`** – How a resolved command becomes bytes: a minimal OSC 1.0
//!   message encoder, plus packet-length and SLIP framings for the TCP
//!   stream, plus the console discovery datagram.

pub mod keymap;
pub mod osc;

pub use keymap::combo::KeyCombo;
pub use keymap::eos::translate;
pub use keymap::modifier::ModifierState;
pub use osc::framing::{frame_message, OscFraming};
pub use osc::message::OscMessage;
