//! # ETVR Bridge
//!
//! Receives EyeTrackVR OSC parameters over UDP and turns them into eye
//! gaze, openness and emulated widen/squint/eyebrow expressions.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────┐
//! │   Tracker app (OSC sender)   │
//! └──────────────┬───────────────┘
//!                │ UDP, one OSC message per datagram
//!                ▼
//! ┌──────────────────────────────┐
//! │  OscListener (network)       │  receive thread, rebind on config change
//! └──────────────┬───────────────┘
//!                │ &[u8]
//!                ▼
//! ┌──────────────────────────────┐
//! │  codec::decode               │  address, type tag, big-endian payload
//! └──────────────┬───────────────┘
//!                │ Message
//!                ▼
//! ┌──────────────────────────────┐
//! │  MessageRouter (router)      │
//! └──────┬───────────────┬───────┘
//!        │ /command/set  │ tracking data
//!        ▼               ▼
//! ┌─────────────┐  ┌─────────────────────────────┐
//! │ ConfigStore │  │ ExpressionEngine (mapping)  │
//! │  JSON file  │─▶│  V1Mapper / V2Mapper        │
//! └─────────────┘  │  OneEuroFilter, smoothstep  │
//!   notifies       └──────────────┬──────────────┘
//!                                 ▼
//!                          TrackingSink (host)
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod mapping;
pub mod network;
pub mod protocol;
pub mod router;

pub use error::{Error, Result};

/// Application-wide constants
pub mod constants {
    use std::time::Duration;

    /// Default UDP port the tracker app sends to
    pub const DEFAULT_PORT: u16 = 8889;

    /// Default receive timeout; bounds how long stop/rebind wait
    pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_secs(10);

    /// Receive buffer per datagram
    pub const MAX_PACKET_SIZE: usize = 4096;

    /// Kernel receive buffer requested for the listener socket
    pub const RECV_BUFFER_SIZE: usize = 256 * 1024;

    /// Settings file name inside the config directory
    pub const CONFIG_FILE_NAME: &str = "ETVRModuleConfig.json";
}
