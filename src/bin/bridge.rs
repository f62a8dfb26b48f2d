//! ETVR Bridge Application
//!
//! Listens for EyeTrackVR OSC traffic and maps it to eye expressions.

use anyhow::{Context, Result};
use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError};
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use etvr_bridge::{
    config::{default_config_dir, ConfigStore},
    mapping::{ExpressionEngine, TrackingOutput},
    network::OscListener,
    router::{MessageRouter, RouterCounters},
};

const STATS_INTERVAL: Duration = Duration::from_secs(5);

/// Requests handled by the thread that owns the listener
enum Control {
    Rebind(SocketAddr),
    Shutdown,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting ETVR Bridge");

    let config_dir = match std::env::args().nth(1) {
        Some(dir) => PathBuf::from(dir),
        None => default_config_dir().context("Could not resolve a config directory")?,
    };

    let store = Arc::new(ConfigStore::new(&config_dir));
    let config = store.load();
    tracing::info!("Using config at {}", store.path().display());

    // Frames for the host side
    let (frame_tx, frame_rx) = bounded::<TrackingOutput>(64);
    let mut engine = ExpressionEngine::new(config.clone(), frame_tx);
    engine.follow(&store);

    let router = MessageRouter::new(store.clone(), engine);
    let counters = router.counters();

    // Forward endpoint changes to the listener's owner
    let (control_tx, control_rx) = unbounded::<Control>();
    let endpoint = Arc::new(Mutex::new(config.socket_addr()));
    {
        let control_tx = control_tx.clone();
        let endpoint = endpoint.clone();
        store.subscribe(move |config| {
            let next = config.socket_addr();
            let mut current = endpoint.lock();
            if *current != next {
                *current = next;
                let _ = control_tx.send(Control::Rebind(next));
            }
        });
    }

    let listener = OscListener::new(router);
    let control = thread::Builder::new()
        .name("listener-control".into())
        .spawn(move || run_listener(listener, config.socket_addr(), control_rx, counters))
        .context("Failed to spawn listener control thread")?;

    let frames = tokio::spawn(log_frames(frame_rx));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");

    let _ = control_tx.send(Control::Shutdown);
    if control.join().is_err() {
        tracing::error!("Listener control thread panicked");
    }
    frames.abort();

    tracing::info!("ETVR Bridge stopped");
    Ok(())
}

fn run_listener(
    mut listener: OscListener<MessageRouter>,
    addr: SocketAddr,
    control_rx: Receiver<Control>,
    counters: Arc<RouterCounters>,
) {
    // A failed bind is logged by the listener; a later rebind may recover
    let _ = listener.start(addr);

    loop {
        match control_rx.recv_timeout(STATS_INTERVAL) {
            Ok(Control::Rebind(addr)) => {
                if let Err(e) = listener.rebind(addr) {
                    tracing::error!("Rebind to {} failed: {}", addr, e);
                }
            }
            Ok(Control::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                let net = listener.stats();
                let routed = counters.snapshot();
                tracing::info!(
                    "Stats: {:?} listener, {} datagrams, {} bytes, {} tracking, {} settings, {} ignored, {} dropped",
                    listener.state(),
                    net.datagrams,
                    net.bytes,
                    routed.tracking,
                    routed.settings,
                    routed.ignored,
                    routed.dropped
                );
            }
        }
    }

    if let Err(e) = listener.stop() {
        tracing::error!("Failed to stop listener: {}", e);
    }
}

/// Stand-in for the host: keep the latest frame and report it periodically.
async fn log_frames(frame_rx: Receiver<TrackingOutput>) {
    let mut interval = tokio::time::interval(STATS_INTERVAL);
    loop {
        interval.tick().await;
        if let Some(frame) = frame_rx.try_iter().last() {
            tracing::debug!(
                "Latest frame: left gaze {:?} openness {:.2}, right gaze {:?} openness {:.2}",
                frame.left.gaze,
                frame.left.openness,
                frame.right.gaze,
                frame.right.openness
            );
        }
    }
}
