//! Bridge daemon entry point.
//!
//! Wires together the infrastructure services and runs the drain loop.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()           -- TOML config, defaults on first run
//!  └─ resolve console address -- static config or UDP discovery
//!  └─ start services
//!       ├─ EvdevKeySource     (capture thread → mpsc)
//!       ├─ event pump         (mpsc → InputState, own thread)
//!       └─ ConsoleConnection  (Tokio reconnect task)
//!  └─ drain loop              -- ForwardKeysUseCase::tick every few ms
//! ```

use std::net::{IpAddr, SocketAddr, ToSocketAddrs};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use keybridge_daemon::application::forward_keys::{ConsoleTransport, ForwardKeysUseCase};
use keybridge_daemon::application::input_state::InputState;
use keybridge_daemon::infrastructure::input_capture::{KeySource, RawKeyEvent};
use keybridge_daemon::infrastructure::network::{
    discovery::discover_console, ConsoleConnection, ConsoleConnectionConfig,
};
use keybridge_daemon::infrastructure::storage::config::{load_config, AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config().context("loading configuration")?;

    // Initialise structured logging.  `RUST_LOG` overrides the config level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.bridge.log_level.clone())),
        )
        .init();

    info!("keybridge starting");

    // Shutdown flag shared across all background services.
    let running = Arc::new(AtomicBool::new(true));

    // ── Console address ───────────────────────────────────────────────────────
    let console_addr = resolve_console_addr(&config).await?;
    info!("console OSC endpoint: {console_addr}");

    // ── Console connection ────────────────────────────────────────────────────
    let connection = Arc::new(ConsoleConnection::new(ConsoleConnectionConfig {
        console_addr,
        framing: config.console.framing,
        address_prefix: config.console.address_prefix.clone(),
        reconnect_interval: config.console.reconnect_interval(),
    }));
    connection.start(Arc::clone(&running));

    // ── Key capture ───────────────────────────────────────────────────────────
    let state = Arc::new(InputState::new());
    let source = make_key_source(&config)?;
    let events = source.start().context("starting key capture")?;
    spawn_event_pump(events, Arc::clone(&state));

    // ── Ctrl-C handler ────────────────────────────────────────────────────────
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            running_clone.store(false, Ordering::Relaxed);
        }
    });

    info!("keybridge ready.  Press Ctrl-C to exit.");

    // ── Drain loop ────────────────────────────────────────────────────────────
    let forward = ForwardKeysUseCase::new(
        Arc::clone(&state),
        Arc::clone(&connection) as Arc<dyn ConsoleTransport>,
    );
    let tick = config.bridge.tick_interval();

    while running.load(Ordering::Relaxed) {
        let emitted = forward.tick().await;
        if emitted > 0 {
            debug!(emitted, "drained key batch");
        }
        if state.take_activity() && !connection.is_connected().await {
            warn!("keys pressed while console is unreachable; they will be dropped");
        }
        tokio::time::sleep(tick).await;
    }

    source.stop();
    info!("keybridge stopped");
    Ok(())
}

/// Resolves the console socket address: the configured static address if
/// present, otherwise UDP broadcast discovery.
async fn resolve_console_addr(config: &AppConfig) -> anyhow::Result<SocketAddr> {
    let port = config.console.port;

    if let Some(host) = &config.console.address {
        let addr = (host.as_str(), port)
            .to_socket_addrs()
            .with_context(|| format!("resolving console address {host}"))?
            .next()
            .with_context(|| format!("console address {host} resolved to nothing"))?;
        return Ok(addr);
    }

    info!("no console address configured; broadcasting discovery");
    // Discovery is blocking socket I/O with multi-second timeouts.
    let ip: IpAddr = tokio::task::spawn_blocking(discover_console)
        .await
        .context("discovery task panicked")?
        .context("console discovery failed")?;
    Ok(SocketAddr::new(ip, port))
}

/// Constructs the platform key source.
#[cfg(target_os = "linux")]
fn make_key_source(config: &AppConfig) -> anyhow::Result<Arc<dyn KeySource>> {
    use keybridge_daemon::infrastructure::input_capture::linux::EvdevKeySource;

    let path = config.input.device.as_ref().map(std::path::PathBuf::from);
    Ok(Arc::new(EvdevKeySource::new(path)))
}

#[cfg(not(target_os = "linux"))]
fn make_key_source(_config: &AppConfig) -> anyhow::Result<Arc<dyn KeySource>> {
    anyhow::bail!("keyboard capture is only implemented for Linux evdev")
}

/// Pumps raw capture events into the shared input state on its own
/// thread, so translation latency never depends on the Tokio runtime.
fn spawn_event_pump(
    events: std::sync::mpsc::Receiver<RawKeyEvent>,
    state: Arc<InputState>,
) {
    std::thread::Builder::new()
        .name("keybridge-pump".to_string())
        .spawn(move || {
            for event in events {
                match event {
                    RawKeyEvent::Press { keycode } => state.on_raw_press(keycode),
                    RawKeyEvent::Release { keycode } => state.on_raw_release(keycode),
                }
            }
            debug!("capture channel closed; event pump exiting");
        })
        .expect("failed to spawn event pump thread");
}
