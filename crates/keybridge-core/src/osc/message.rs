//! Minimal OSC 1.0 message encoder.
//!
//! Wire format of the one message shape the bridge sends:
//!
//! ```text
//! [address, NUL-terminated, padded to 4][",f" tag string, padded][f32 BE]
//! ```
//!
//! Example: `/eos/key/go` with 1.0 encodes as
//! `2F 65 6F 73 2F 6B 65 79 2F 67 6F 00  2C 66 00 00  3F 80 00 00`.

use thiserror::Error;

/// Errors that can occur while building an OSC message.
#[derive(Debug, Error, PartialEq)]
pub enum OscError {
    /// OSC addresses must begin with `/`.
    #[error("OSC address must start with '/': {0:?}")]
    BadAddress(String),

    /// The address contained an interior NUL, which the padding scheme
    /// cannot represent.
    #[error("OSC address contains a NUL byte")]
    NulInAddress,
}

/// An outbound OSC message: an address and a single float argument.
#[derive(Debug, Clone, PartialEq)]
pub struct OscMessage {
    address: String,
    arg: f32,
}

impl OscMessage {
    /// Creates a message for `address` carrying `arg`.
    ///
    /// # Errors
    ///
    /// Returns [`OscError`] if the address does not start with `/` or
    /// contains a NUL byte.
    pub fn new(address: impl Into<String>, arg: f32) -> Result<Self, OscError> {
        let address = address.into();
        if !address.starts_with('/') {
            return Err(OscError::BadAddress(address));
        }
        if address.as_bytes().contains(&0) {
            return Err(OscError::NulInAddress);
        }
        Ok(Self { address, arg })
    }

    /// Creates the key-event message for `command`: address
    /// `<prefix><command>`, argument 1.0 when down, 0.0 when up.
    ///
    /// # Errors
    ///
    /// Returns [`OscError`] if the combined address is invalid.
    pub fn key(prefix: &str, command: &str, is_down: bool) -> Result<Self, OscError> {
        let address = format!("{prefix}{command}");
        Self::new(address, if is_down { 1.0 } else { 0.0 })
    }

    /// The OSC address of this message.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The float argument of this message.
    pub fn arg(&self) -> f32 {
        self.arg
    }

    /// Encodes the message into its OSC 1.0 byte representation.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.address.len() + 12);
        write_padded_string(&mut buf, &self.address);
        write_padded_string(&mut buf, ",f");
        buf.extend_from_slice(&self.arg.to_be_bytes());
        buf
    }
}

/// Writes `s` NUL-terminated and padded with NULs to a 4-byte boundary.
fn write_padded_string(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(s.as_bytes());
    // At least one NUL terminator, then pad to the next multiple of four.
    let padded = (s.len() / 4 + 1) * 4;
    buf.resize(buf.len() + (padded - s.len()), 0);
}
