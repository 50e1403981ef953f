//! UDP broadcast-based console discovery.
//!
//! Eos-family consoles answer a fixed OSC request broadcast to UDP port
//! 3034, replying to the port named inside the request (3035). Discovery
//! broadcasts the request, then collects replies for a fixed window:
//!
//! 1. Bind a UDP socket on the reply port and enable broadcast.
//! 2. Send [`DISCOVERY_REQUEST`] to `255.255.255.255:3034`.
//! 3. Any OSC-shaped reply within the window marks its sender as a
//!    console. The first responder wins; extras are logged so the
//!    operator knows a static address is needed to pick between them.
//!
//! Up to three rounds are attempted before giving up. The whole routine
//! is synchronous socket I/O; callers on the Tokio runtime should wrap
//! it in `spawn_blocking`.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::time::{Duration, Instant};

use keybridge_core::osc::discovery::{
    is_osc_reply, DISCOVERY_REPLY_PORT, DISCOVERY_REQUEST, DISCOVERY_REQUEST_PORT,
};
use thiserror::Error;
use tracing::{debug, info, warn};

/// How long to wait for replies after each broadcast.
const REPLY_WINDOW: Duration = Duration::from_secs(5);

/// How many broadcast rounds to run before giving up.
const MAX_ATTEMPTS: u32 = 3;

/// Error type for console discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The UDP reply socket could not be bound.
    #[error("failed to bind discovery socket on port {port}: {source}")]
    BindFailed {
        port: u16,
        #[source]
        source: std::io::Error,
    },
    /// The broadcast could not be sent.
    #[error("failed to broadcast discovery request: {0}")]
    SendFailed(std::io::Error),
    /// No console answered within any attempt window.
    #[error("no console answered after {attempts} discovery attempts")]
    NoResponse { attempts: u32 },
}

/// Broadcasts the discovery request and returns the first console that
/// answers.
///
/// Blocks for up to `MAX_ATTEMPTS * REPLY_WINDOW` (15 seconds) in the
/// worst case.
///
/// # Errors
///
/// Returns [`DiscoveryError`] if the reply socket cannot be bound (port
/// 3035 already in use is the usual culprit), the broadcast fails, or no
/// console answers.
pub fn discover_console() -> Result<IpAddr, DiscoveryError> {
    let socket = UdpSocket::bind(("0.0.0.0", DISCOVERY_REPLY_PORT)).map_err(|source| {
        DiscoveryError::BindFailed {
            port: DISCOVERY_REPLY_PORT,
            source,
        }
    })?;
    socket
        .set_broadcast(true)
        .map_err(DiscoveryError::SendFailed)?;
    socket
        .set_read_timeout(Some(Duration::from_millis(500)))
        .ok();

    let dest = SocketAddr::from((Ipv4Addr::BROADCAST, DISCOVERY_REQUEST_PORT));

    for attempt in 1..=MAX_ATTEMPTS {
        info!("broadcasting console discovery (attempt {attempt}/{MAX_ATTEMPTS})");
        socket
            .send_to(&DISCOVERY_REQUEST, dest)
            .map_err(DiscoveryError::SendFailed)?;

        if let Some(addr) = collect_replies(&socket, REPLY_WINDOW) {
            return Ok(addr);
        }
    }

    Err(DiscoveryError::NoResponse {
        attempts: MAX_ATTEMPTS,
    })
}

/// Collects replies for `window`, returning the first console found.
fn collect_replies(socket: &UdpSocket, window: Duration) -> Option<IpAddr> {
    let deadline = Instant::now() + window;
    let mut buf = vec![0u8; 1024];
    let mut found: Option<IpAddr> = None;

    while Instant::now() < deadline {
        let (len, src) = match socket.recv_from(&mut buf) {
            Ok(pair) => pair,
            Err(e) if is_timeout_error(&e) => continue,
            Err(e) => {
                warn!("discovery recv error: {e}");
                continue;
            }
        };

        if !is_osc_reply(&buf[..len]) {
            debug!("non-OSC datagram on discovery port from {src}; ignoring");
            continue;
        }

        match found {
            None => {
                info!("console discovered at {}", src.ip());
                found = Some(src.ip());
            }
            Some(first) if first != src.ip() => {
                warn!(
                    "multiple consoles answered discovery ({first} and {}); \
                     using {first}; configure a static address to choose",
                    src.ip()
                );
            }
            Some(_) => {} // duplicate reply from the same console
        }
    }

    found
}

/// Returns `true` for OS timeout / would-block errors that should be retried.
fn is_timeout_error(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────
