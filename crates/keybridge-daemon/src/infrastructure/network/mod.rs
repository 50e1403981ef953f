//! Network infrastructure: the OSC-over-TCP console connection.
//!
//! Architecture:
//! - `ConsoleConnection` owns a TCP stream to the console.
//! - A background task reconnects whenever the stream drops.
//! - Outbound key messages are framed per the configured [`OscFraming`]
//!   and written through the shared write half.
//! - Inbound traffic (the console chats back: ping replies, state
//!   updates) is read and discarded; the bridge is send-only, but the
//!   stream must still be drained so the console's send buffer never
//!   fills.

pub mod discovery;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use keybridge_core::osc::framing::{frame_message, OscFraming};
use keybridge_core::osc::message::OscMessage;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    sync::Mutex,
    time,
};
use tracing::{debug, info, warn};

use crate::application::forward_keys::ConsoleTransport;

/// Default TCP port for OSC on Eos-family consoles.
pub const DEFAULT_OSC_PORT: u16 = 3032;

/// Configuration for the console connection.
#[derive(Debug, Clone)]
pub struct ConsoleConnectionConfig {
    /// Address of the console's OSC TCP port.
    pub console_addr: SocketAddr,
    /// Wire framing for outbound packets.
    pub framing: OscFraming,
    /// OSC address prefix prepended to every command.
    pub address_prefix: String,
    /// Reconnect interval when the connection drops.
    pub reconnect_interval: Duration,
}

impl Default for ConsoleConnectionConfig {
    fn default() -> Self {
        Self {
            console_addr: format!("127.0.0.1:{DEFAULT_OSC_PORT}").parse().unwrap(),
            framing: OscFraming::default(),
            address_prefix: "/eos/key/".to_string(),
            reconnect_interval: Duration::from_secs(5),
        }
    }
}

/// Manages the TCP connection from the bridge to the console.
pub struct ConsoleConnection {
    config: ConsoleConnectionConfig,
    write_half: Arc<Mutex<Option<tokio::net::tcp::OwnedWriteHalf>>>,
}

impl ConsoleConnection {
    /// Creates a new (not yet connected) `ConsoleConnection`.
    pub fn new(config: ConsoleConnectionConfig) -> Self {
        Self {
            config,
            write_half: Arc::new(Mutex::new(None)),
        }
    }

    /// Begins connecting to the console.
    ///
    /// Runs a continuous reconnect loop on a background task until
    /// `running` is set to false. Returns immediately; sends before the
    /// first successful connect are dropped.
    pub fn start(self: &Arc<Self>, running: Arc<std::sync::atomic::AtomicBool>) {
        let this = Arc::clone(self);

        tokio::spawn(async move {
            while running.load(std::sync::atomic::Ordering::Relaxed) {
                match TcpStream::connect(this.config.console_addr).await {
                    Ok(stream) => {
                        info!("connected to console at {}", this.config.console_addr);
                        if let Err(e) = stream.set_nodelay(true) {
                            debug!("could not set TCP_NODELAY: {e}");
                        }

                        let (read_half, write_half_owned) = stream.into_split();
                        {
                            let mut guard = this.write_half.lock().await;
                            *guard = Some(write_half_owned);
                        }

                        // Drain inbound traffic until the console hangs up.
                        this.discard_loop(read_half).await;

                        {
                            let mut guard = this.write_half.lock().await;
                            *guard = None;
                        }
                        info!(
                            "console connection lost; reconnecting in {:?}",
                            this.config.reconnect_interval
                        );
                    }
                    Err(e) => {
                        warn!(
                            "could not connect to console at {}: {e}",
                            this.config.console_addr
                        );
                    }
                }

                if running.load(std::sync::atomic::Ordering::Relaxed) {
                    time::sleep(this.config.reconnect_interval).await;
                }
            }
        });
    }

    /// Returns `true` while a TCP connection to the console is up.
    pub async fn is_connected(&self) -> bool {
        self.write_half.lock().await.is_some()
    }

    /// Reads and discards inbound bytes until EOF or error.
    async fn discard_loop(&self, mut reader: tokio::net::tcp::OwnedReadHalf) {
        let mut buf = vec![0u8; 4096];
        loop {
            match reader.read(&mut buf).await {
                Ok(0) => break, // console closed the connection
                Ok(n) => debug!("discarded {n} inbound bytes from console"),
                Err(e) => {
                    warn!("read error on console connection: {e}");
                    break;
                }
            }
        }
    }
}

#[async_trait]
impl ConsoleTransport for ConsoleConnection {
    /// Frames and sends one key message.
    ///
    /// When disconnected the message is dropped without error: the
    /// reconnect task is already working on it, and key events are not
    /// worth replaying by the time it succeeds.
    async fn send_key(&self, command: &str, is_down: bool) -> Result<(), String> {
        let msg = OscMessage::key(&self.config.address_prefix, command, is_down)
            .map_err(|e| e.to_string())?;
        let bytes = frame_message(&msg, self.config.framing);

        let mut guard = self.write_half.lock().await;
        match *guard {
            Some(ref mut w) => {
                if let Err(e) = w.write_all(&bytes).await {
                    // Leave teardown to the read side; it sees the same error.
                    return Err(format!("write failed: {e}"));
                }
                debug!(address = msg.address(), is_down, "sent key");
                Ok(())
            }
            None => {
                debug!(command, "console not connected; dropping key");
                Ok(())
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
