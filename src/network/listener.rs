//! OSC receive loop
//!
//! One dedicated thread per bound socket. The thread owns the packet
//! handler while it runs and hands it back when joined, so handler state
//! survives a rebind.

use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, info, trace, warn};

use crate::constants::{DEFAULT_RECEIVE_TIMEOUT, MAX_PACKET_SIZE};
use crate::error::NetworkError;
use crate::network::udp::{create_socket, nudge};

/// Consumer of raw datagrams, called on the receive thread in arrival order.
pub trait PacketHandler: Send + 'static {
    fn handle_packet(&mut self, packet: &[u8]);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Idle,
    Connected,
    Error,
    Stopped,
}

#[derive(Debug, Default)]
struct Counters {
    datagrams: AtomicU64,
    bytes: AtomicU64,
    receive_errors: AtomicU64,
}

/// Listener statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerStats {
    pub datagrams: u64,
    pub bytes: u64,
    pub receive_errors: u64,
}

pub struct OscListener<H: PacketHandler> {
    /// Present whenever no receive thread is running
    handler: Option<H>,

    /// Whether the receive loop should keep going
    running: Arc<AtomicBool>,

    thread_handle: Option<JoinHandle<H>>,

    state: ListenerState,

    local_addr: Option<SocketAddr>,

    receive_timeout: Duration,

    counters: Arc<Counters>,
}

impl<H: PacketHandler> OscListener<H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler: Some(handler),
            running: Arc::new(AtomicBool::new(false)),
            thread_handle: None,
            state: ListenerState::Idle,
            local_addr: None,
            receive_timeout: DEFAULT_RECEIVE_TIMEOUT,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Upper bound on how long `stop`/`rebind` wait for the loop.
    pub fn with_receive_timeout(mut self, timeout: Duration) -> Self {
        self.receive_timeout = timeout;
        self
    }

    /// Bind `addr` and start the receive thread.
    ///
    /// A bind failure leaves the listener in [`ListenerState::Error`] until
    /// the next `start` or `rebind`.
    pub fn start(&mut self, addr: SocketAddr) -> Result<(), NetworkError> {
        if self.state == ListenerState::Stopped {
            return Err(NetworkError::Stopped);
        }
        if self.running.load(Ordering::SeqCst) {
            return Ok(());
        }
        let Some(mut handler) = self.handler.take() else {
            self.state = ListenerState::Error;
            return Err(NetworkError::HandlerLost);
        };

        let socket = match create_socket(addr, self.receive_timeout) {
            Ok(socket) => socket,
            Err(e) => {
                error!("Failed to bind OSC listener on {}: {}", addr, e);
                self.handler = Some(handler);
                self.state = ListenerState::Error;
                return Err(NetworkError::BindFailed { addr, source: e });
            }
        };
        let local_addr = socket.local_addr().unwrap_or(addr);

        let running = self.running.clone();
        let counters = self.counters.clone();
        running.store(true, Ordering::SeqCst);

        let spawned = thread::Builder::new()
            .name(format!("osc-listener-{}", local_addr.port()))
            .spawn(move || {
                let mut buf = [0u8; MAX_PACKET_SIZE];
                while running.load(Ordering::Relaxed) {
                    match socket.recv_from(&mut buf) {
                        // Wake-up nudge or an empty datagram
                        Ok((0, _)) => continue,
                        Ok((len, _)) => {
                            counters.datagrams.fetch_add(1, Ordering::Relaxed);
                            counters.bytes.fetch_add(len as u64, Ordering::Relaxed);
                            handler.handle_packet(&buf[..len]);
                        }
                        Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
                        Err(e) => {
                            counters.receive_errors.fetch_add(1, Ordering::Relaxed);
                            trace!("Receive error: {}", e);
                        }
                    }
                }
                // Socket is dropped here, releasing the port
                handler
            });

        match spawned {
            Ok(handle) => {
                self.thread_handle = Some(handle);
                self.local_addr = Some(local_addr);
                self.state = ListenerState::Connected;
                info!("OSC listener bound on {}", local_addr);
                Ok(())
            }
            Err(e) => {
                // The closure and its handler are gone with the failed spawn
                self.running.store(false, Ordering::SeqCst);
                self.state = ListenerState::Error;
                error!("Failed to spawn OSC receive thread: {}", e);
                Err(NetworkError::SpawnFailed(e))
            }
        }
    }

    /// Tear down the current loop completely, then start on `addr`.
    pub fn rebind(&mut self, addr: SocketAddr) -> Result<(), NetworkError> {
        if self.state == ListenerState::Stopped {
            return Err(NetworkError::Stopped);
        }
        self.shutdown_loop()?;
        if self.handler.is_none() {
            return Err(NetworkError::HandlerLost);
        }
        self.state = ListenerState::Idle;
        info!("Rebinding OSC listener to {}", addr);
        self.start(addr)
    }

    /// Stop the loop for good.
    pub fn stop(&mut self) -> Result<(), NetworkError> {
        self.shutdown_loop()?;
        if self.state != ListenerState::Stopped {
            info!("OSC listener stopped");
        }
        self.state = ListenerState::Stopped;
        Ok(())
    }

    pub fn state(&self) -> ListenerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Address of the bound socket while connected.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn stats(&self) -> ListenerStats {
        ListenerStats {
            datagrams: self.counters.datagrams.load(Ordering::Relaxed),
            bytes: self.counters.bytes.load(Ordering::Relaxed),
            receive_errors: self.counters.receive_errors.load(Ordering::Relaxed),
        }
    }

    /// The handler, available while no receive thread is running.
    pub fn handler(&self) -> Option<&H> {
        self.handler.as_ref()
    }

    fn called_from_worker(&self) -> bool {
        self.thread_handle
            .as_ref()
            .is_some_and(|handle| handle.thread().id() == thread::current().id())
    }

    fn shutdown_loop(&mut self) -> Result<(), NetworkError> {
        if self.called_from_worker() {
            return Err(NetworkError::CalledFromWorker);
        }

        self.running.store(false, Ordering::SeqCst);

        let Some(handle) = self.thread_handle.take() else {
            self.local_addr = None;
            return Ok(());
        };

        if let Some(addr) = self.local_addr.take() {
            if let Err(e) = nudge(addr) {
                debug!("Failed to wake OSC listener on {}: {}", addr, e);
            }
        }

        match handle.join() {
            Ok(handler) => self.handler = Some(handler),
            Err(_) => {
                warn!("OSC receive thread panicked; packet handler lost");
                self.state = ListenerState::Error;
            }
        }
        Ok(())
    }
}

impl<H: PacketHandler> Drop for OscListener<H> {
    fn drop(&mut self) {
        if self.called_from_worker() {
            self.running.store(false, Ordering::SeqCst);
            return;
        }
        let _ = self.stop();
    }
}
