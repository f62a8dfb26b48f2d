//! Message router
//!
//! Splits decoded messages into settings commands for the [`ConfigStore`]
//! and tracking data for the [`ExpressionEngine`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::codec;
use crate::config::ConfigStore;
use crate::mapping::ExpressionEngine;
use crate::network::PacketHandler;
use crate::protocol::Message;

/// Path segment reserved for settings commands.
pub const COMMAND_SEGMENT: &str = "command";
const SET_SEGMENT: &str = "set";

/// Where a message ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `/command/set/<Field>`; `applied` is false when the store rejected it
    Settings { applied: bool },
    /// Forwarded to the engine; `accepted` is false for unknown parameters
    Tracking { accepted: bool },
    /// Under `command` but not a well-formed set command
    Ignored,
}

/// Counters shared with whoever owns the listener.
#[derive(Debug, Default)]
pub struct RouterCounters {
    settings: AtomicU64,
    tracking: AtomicU64,
    ignored: AtomicU64,
    dropped: AtomicU64,
}

impl RouterCounters {
    pub fn snapshot(&self) -> RouterStats {
        RouterStats {
            settings: self.settings.load(Ordering::Relaxed),
            tracking: self.tracking.load(Ordering::Relaxed),
            ignored: self.ignored.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// Router statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouterStats {
    pub settings: u64,
    pub tracking: u64,
    pub ignored: u64,
    /// Packets that failed to decode
    pub dropped: u64,
}

impl RouterStats {
    pub fn total(&self) -> u64 {
        self.settings + self.tracking + self.ignored + self.dropped
    }
}

/// The field name of a `/command/set/<Field>` address.
///
/// `None` when the address has a `command` segment but any other shape.
pub fn settings_field(message: &Message) -> Option<&str> {
    let mut segments = message.segments();
    match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(COMMAND_SEGMENT), Some(SET_SEGMENT), Some(field), None) => Some(field),
        _ => None,
    }
}

fn is_settings_address(message: &Message) -> bool {
    message.segments().any(|segment| segment == COMMAND_SEGMENT)
}

pub struct MessageRouter {
    store: Arc<ConfigStore>,
    engine: ExpressionEngine,
    counters: Arc<RouterCounters>,
}

impl MessageRouter {
    pub fn new(store: Arc<ConfigStore>, engine: ExpressionEngine) -> Self {
        Self {
            store,
            engine,
            counters: Arc::new(RouterCounters::default()),
        }
    }

    pub fn route(&mut self, message: &Message) -> Route {
        if is_settings_address(message) {
            let Some(field) = settings_field(message) else {
                debug!("Ignoring unsupported command {}", message.address);
                self.counters.ignored.fetch_add(1, Ordering::Relaxed);
                return Route::Ignored;
            };
            self.counters.settings.fetch_add(1, Ordering::Relaxed);
            let applied = self.store.update_field(field, &message.value);
            return Route::Settings { applied };
        }

        self.counters.tracking.fetch_add(1, Ordering::Relaxed);
        let accepted = self.engine.handle(message);
        Route::Tracking { accepted }
    }

    pub fn engine(&self) -> &ExpressionEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut ExpressionEngine {
        &mut self.engine
    }

    pub fn store(&self) -> &Arc<ConfigStore> {
        &self.store
    }

    pub fn stats(&self) -> RouterStats {
        self.counters.snapshot()
    }

    /// Handle for reading the counters while the router is owned by the
    /// receive thread.
    pub fn counters(&self) -> Arc<RouterCounters> {
        self.counters.clone()
    }
}

impl PacketHandler for MessageRouter {
    fn handle_packet(&mut self, packet: &[u8]) {
        match codec::decode(packet) {
            Ok(message) => {
                self.route(&message);
            }
            Err(e) => {
                trace!("Dropping malformed packet ({} bytes): {}", packet.len(), e);
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}
