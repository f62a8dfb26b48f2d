//! Network subsystem for OSC over UDP

pub mod listener;
pub mod udp;

pub use listener::{ListenerState, ListenerStats, OscListener, PacketHandler};
pub use udp::create_socket;
