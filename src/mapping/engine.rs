//! Expression mapping engine
//!
//! Owns one mapper per protocol version and forwards every recognised
//! parameter to the mapper picked by the message address. Whichever
//! mapper accepted the last update drives the output.

use std::fmt;

use crossbeam_channel::{bounded, Receiver, TrySendError};
use tracing::{debug, trace};

use crate::config::{Config, ConfigStore};
use crate::mapping::output::{TrackingOutput, TrackingSink};
use crate::mapping::v1::V1Mapper;
use crate::mapping::v2::V2Mapper;
use crate::mapping::ExpressionMapper;
use crate::protocol::Message;

/// Time step used when the caller has no real timestamp.
pub const DEFAULT_DELTA: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProtocolVersion {
    #[default]
    V1,
    V2,
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolVersion::V1 => write!(f, "v1"),
            ProtocolVersion::V2 => write!(f, "v2"),
        }
    }
}

/// V2 iff one of the address segments is exactly `v2`.
pub fn protocol_version(address: &str) -> ProtocolVersion {
    if address.split('/').any(|segment| segment == "v2") {
        ProtocolVersion::V2
    } else {
        ProtocolVersion::V1
    }
}

pub struct ExpressionEngine {
    v1: V1Mapper,
    v2: V2Mapper,
    active: ProtocolVersion,
    config: Config,
    config_rx: Option<Receiver<Config>>,
    sink: Box<dyn TrackingSink>,
    output: TrackingOutput,
}

impl ExpressionEngine {
    pub fn new(config: Config, sink: impl TrackingSink + 'static) -> Self {
        Self {
            v1: V1Mapper::new(),
            v2: V2Mapper::new(),
            active: ProtocolVersion::default(),
            config,
            config_rx: None,
            sink: Box::new(sink),
            output: TrackingOutput::new(),
        }
    }

    /// Handle a tracking message with the default time step.
    pub fn handle(&mut self, message: &Message) -> bool {
        self.handle_with_delta(message, DEFAULT_DELTA)
    }

    /// Handle a tracking message, `dt` seconds after the previous one.
    ///
    /// Returns `true` when a mapper recognised the parameter and a new
    /// frame was written to the sink.
    pub fn handle_with_delta(&mut self, message: &Message, dt: f32) -> bool {
        self.drain_config();

        let Some(value) = message.value.as_f32() else {
            trace!("Ignoring non-numeric tracking value at {}", message.address);
            return false;
        };
        if !value.is_finite() {
            trace!("Ignoring non-finite tracking value {} at {}", value, message.address);
            return false;
        }

        let parameter = message.parameter_name();
        let version = protocol_version(&message.address);
        let accepted = match version {
            ProtocolVersion::V1 => self.v1.accept(parameter, value, dt),
            ProtocolVersion::V2 => self.v2.accept(parameter, value, dt),
        };

        if !accepted {
            trace!("Unrecognised {} parameter {}", version, parameter);
            return false;
        }

        if self.active != version {
            debug!("Active tracking protocol switched to {}", version);
            self.active = version;
        }

        self.refresh();
        true
    }

    /// Replace the thresholds used from the next update on.
    pub fn apply_config(&mut self, config: Config) {
        self.config = config;
    }

    /// Track changes made through `store`.
    ///
    /// The store's subscriber keeps only the latest snapshot queued; it is
    /// picked up at the start of the next `handle` or by `config`, so the
    /// store is never locked from here.
    pub fn follow(&mut self, store: &ConfigStore) {
        let (tx, rx) = bounded(1);
        let stale = rx.clone();
        store.subscribe(move |config| {
            let mut pending = config.clone();
            loop {
                match tx.try_send(pending) {
                    Ok(()) | Err(TrySendError::Disconnected(_)) => break,
                    Err(TrySendError::Full(config)) => {
                        // Replace the snapshot the engine has not seen yet
                        let _ = stale.try_recv();
                        pending = config;
                    }
                }
            }
        });
        self.config = store.snapshot();
        self.config_rx = Some(rx);
    }

    pub fn active_version(&self) -> ProtocolVersion {
        self.active
    }

    /// Current thresholds, including changes the store made since the last
    /// message.
    pub fn config(&mut self) -> &Config {
        self.drain_config();
        &self.config
    }

    /// Last frame written to the sink.
    pub fn output(&self) -> &TrackingOutput {
        &self.output
    }

    fn drain_config(&mut self) {
        let Some(rx) = &self.config_rx else {
            return;
        };
        if let Ok(config) = rx.try_recv() {
            self.config = config;
        }
    }

    fn refresh(&mut self) {
        match self.active {
            ProtocolVersion::V1 => self.v1.write(&self.config, &mut self.output),
            ProtocolVersion::V2 => self.v2.write(&self.config, &mut self.output),
        }
        self.sink.write(&self.output);
    }
}
