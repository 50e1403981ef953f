//! Infrastructure layer: OS and network collaborators.
//!
//! Everything here sits behind a trait or a channel so the application
//! layer stays free of sockets and device handles.

pub mod input_capture;
pub mod network;
pub mod storage;
