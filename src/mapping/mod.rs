//! Eye expression mapping
//!
//! Turns raw tracker parameters into gaze, openness and emulated
//! widen/squint/brow weights.

pub mod curve;
pub mod emulation;
pub mod engine;
pub mod filter;
pub mod output;
pub mod v1;
pub mod v2;

use crate::config::Config;

pub use engine::{protocol_version, ExpressionEngine, ProtocolVersion};
pub use filter::OneEuroFilter;
pub use output::{Eye, EyeOutput, NullSink, TrackingOutput, TrackingSink, UnifiedExpression};
pub use v1::V1Mapper;
pub use v2::V2Mapper;

/// Parameter state for one protocol version.
pub trait ExpressionMapper {
    /// Store a parameter update. Returns `false` for names this mapper does
    /// not know, leaving its state untouched.
    fn accept(&mut self, parameter: &str, value: f32, dt: f32) -> bool;

    /// Write gaze, openness and expression weights from the current state.
    fn write(&self, config: &Config, output: &mut TrackingOutput);
}
