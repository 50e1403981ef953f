//! Outbound OSC encoding for the console link.
//!
//! The bridge only ever sends one message shape: an address built from a
//! prefix plus a command token, carrying a single float argument (1.0 for
//! key down, 0.0 for key up). [`message`] encodes that shape, [`framing`]
//! wraps it for the TCP stream, and [`discovery`] holds the console
//! discovery datagram.

pub mod discovery;
pub mod framing;
pub mod message;
