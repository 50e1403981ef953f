//! TCP stream framings for OSC packets.
//!
//! Eos-family consoles accept OSC over TCP in one of two framings:
//!
//! - **Packet-length** (OSC 1.0): each packet is preceded by its length
//!   as a 4-byte big-endian integer.
//! - **SLIP** (OSC 1.1, RFC 1055): each packet is wrapped in END bytes,
//!   with END/ESC occurrences inside the payload escaped.
//!
//! The dispatcher does not care which is in use; the connection picks one
//! at construction time and calls [`frame_message`].

use serde::{Deserialize, Serialize};

use super::message::OscMessage;

/// SLIP frame delimiter.
const SLIP_END: u8 = 0xC0;
/// SLIP escape byte.
const SLIP_ESC: u8 = 0xDB;
/// Escaped substitute for END.
const SLIP_ESC_END: u8 = 0xDC;
/// Escaped substitute for ESC.
const SLIP_ESC_ESC: u8 = 0xDD;

/// The wire framing used on the console TCP connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OscFraming {
    /// 4-byte big-endian length prefix (OSC 1.0 over TCP).
    #[default]
    PacketLength,
    /// SLIP framing with double END delimiters (OSC 1.1 over TCP).
    Slip,
}

/// Encodes `msg` and wraps it in the selected framing, ready to write to
/// the TCP stream.
pub fn frame_message(msg: &OscMessage, framing: OscFraming) -> Vec<u8> {
    frame_packet(&msg.to_bytes(), framing)
}

/// Wraps an already-encoded OSC packet in the selected framing.
pub fn frame_packet(packet: &[u8], framing: OscFraming) -> Vec<u8> {
    match framing {
        OscFraming::PacketLength => {
            let mut buf = Vec::with_capacity(packet.len() + 4);
            buf.extend_from_slice(&(packet.len() as u32).to_be_bytes());
            buf.extend_from_slice(packet);
            buf
        }
        OscFraming::Slip => slip_encode(packet),
    }
}

/// SLIP-encodes `packet` with an END delimiter on both sides.
///
/// The leading END flushes any line noise on the receiver, per RFC 1055.
pub fn slip_encode(packet: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(packet.len() + 2);
    buf.push(SLIP_END);
    for &b in packet {
        match b {
            SLIP_END => buf.extend_from_slice(&[SLIP_ESC, SLIP_ESC_END]),
            SLIP_ESC => buf.extend_from_slice(&[SLIP_ESC, SLIP_ESC_ESC]),
            other => buf.push(other),
        }
    }
    buf.push(SLIP_END);
    buf
}

/// Decodes one SLIP frame, returning the payload and the number of input
/// bytes consumed (including delimiters).
///
/// Returns `None` if `input` does not yet contain a complete frame.
/// Stray bytes before the first END are skipped, and empty frames (the
/// back-to-back ENDs produced by double-ended encoding) are ignored.
pub fn slip_decode(input: &[u8]) -> Option<(Vec<u8>, usize)> {
    let mut payload = Vec::new();
    let mut started = false;
    let mut i = 0;
    while i < input.len() {
        let b = input[i];
        i += 1;
        match b {
            SLIP_END => {
                if started && !payload.is_empty() {
                    return Some((payload, i));
                }
                // Leading END, or an empty frame: keep scanning.
                started = true;
                payload.clear();
            }
            SLIP_ESC if started => {
                let next = *input.get(i)?;
                i += 1;
                match next {
                    SLIP_ESC_END => payload.push(SLIP_END),
                    SLIP_ESC_ESC => payload.push(SLIP_ESC),
                    other => payload.push(other), // tolerate bad escapes
                }
            }
            other if started => payload.push(other),
            _ => {} // noise before the first END
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_length_framing_prefixes_big_endian_length() {
        // Arrange
        let msg = OscMessage::key("/eos/key/", "go", true).unwrap();
        let raw = msg.to_bytes();

        // Act
        let framed = frame_message(&msg, OscFraming::PacketLength);

        // Assert
        assert_eq!(&framed[..4], &(raw.len() as u32).to_be_bytes());
        assert_eq!(&framed[4..], &raw[..]);
    }

    #[test]
    fn test_slip_framing_wraps_in_end_bytes() {
        let framed = frame_packet(&[1, 2, 3], OscFraming::Slip);
        assert_eq!(framed, vec![SLIP_END, 1, 2, 3, SLIP_END]);
    }

    #[test]
    fn test_slip_escapes_end_and_esc_bytes() {
        let framed = slip_encode(&[SLIP_END, 0x42, SLIP_ESC]);
        assert_eq!(
            framed,
            vec![
                SLIP_END,
                SLIP_ESC,
                SLIP_ESC_END,
                0x42,
                SLIP_ESC,
                SLIP_ESC_ESC,
                SLIP_END
            ]
        );
    }

    #[test]
    fn test_slip_decode_reverses_encode() {
        // Arrange – payload exercising both escape sequences
        let payload = vec![0x00, SLIP_END, SLIP_ESC, 0xFF, SLIP_END];

        // Act
        let encoded = slip_encode(&payload);
        let (decoded, consumed) = slip_decode(&encoded).expect("complete frame");

        // Assert
        assert_eq!(decoded, payload);
        assert_eq!(consumed, encoded.len());
    }

    #[test]
    fn test_slip_decode_incomplete_frame_returns_none() {
        let mut encoded = slip_encode(&[1, 2, 3]);
        encoded.pop(); // drop the trailing END
        assert!(slip_decode(&encoded).is_none());
    }

    #[test]
    fn test_slip_decode_skips_leading_noise() {
        let mut stream = vec![0x11, 0x22];
        stream.extend(slip_encode(&[9, 9, 9]));
        let (decoded, _) = slip_decode(&stream).expect("frame after noise");
        assert_eq!(decoded, vec![9, 9, 9]);
    }

    #[test]
    fn test_framing_default_is_packet_length() {
        // The live console connection in the original device used the
        // length-prefixed variant; the config default follows it.
        assert_eq!(OscFraming::default(), OscFraming::PacketLength);
    }
}
