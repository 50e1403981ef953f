//! The Eos console discovery datagram.
//!
//! Consoles answer a specific OSC message broadcast to UDP port 3034,
//! replying to the port named in the request's integer argument. The
//! protocol is undocumented; the request bytes below are known-good and
//! must be sent exactly as-is for the console to answer.
//!
//! Decoded, the datagram reads `/etc/discovery/request` with type tags
//! `,is`, integer 3035 (the reply port) and string `"RFR OSC Discovery"`.

/// UDP port consoles listen on for discovery requests.
pub const DISCOVERY_REQUEST_PORT: u16 = 3034;

/// UDP port we listen on for discovery replies (also encoded inside
/// [`DISCOVERY_REQUEST`]).
pub const DISCOVERY_REPLY_PORT: u16 = 3035;

/// The fixed discovery request datagram.
pub const DISCOVERY_REQUEST: [u8; 52] = [
    0x2f, 0x65, 0x74, 0x63, 0x2f, 0x64, 0x69, 0x73, 0x63, 0x6f, 0x76, 0x65, 0x72, 0x79, 0x2f,
    0x72, 0x65, 0x71, 0x75, 0x65, 0x73, 0x74, 0x00, 0x00, 0x2c, 0x69, 0x73, 0x00, 0x00, 0x00,
    0x0b, 0xdb, 0x52, 0x46, 0x52, 0x20, 0x4f, 0x53, 0x43, 0x20, 0x44, 0x69, 0x73, 0x63, 0x6f,
    0x76, 0x65, 0x72, 0x79, 0x00, 0x00, 0x00,
];

/// Returns `true` if a reply datagram is plausibly an OSC packet.
///
/// Any OSC-shaped reply is treated as a console; the response is not
/// parsed further (no reliable documentation of its contents exists).
pub fn is_osc_reply(datagram: &[u8]) -> bool {
    datagram.first() == Some(&b'/') || datagram.starts_with(b"#bundle\0")
}
