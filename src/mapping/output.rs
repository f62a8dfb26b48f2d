//! Tracking output written to the host
//!
//! The host owns the consumer side; the engine only ever writes complete
//! [`TrackingOutput`] frames into a [`TrackingSink`].

use std::sync::Arc;

use crossbeam_channel::{Sender, TrySendError};
use parking_lot::Mutex;

/// Expression slots driven by the eye emulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnifiedExpression {
    EyeWideLeft,
    EyeWideRight,
    EyeSquintLeft,
    EyeSquintRight,
    BrowInnerUpLeft,
    BrowInnerUpRight,
    BrowOuterUpLeft,
    BrowOuterUpRight,
    BrowLowererLeft,
    BrowLowererRight,
}

impl UnifiedExpression {
    pub const COUNT: usize = 10;

    pub const ALL: [UnifiedExpression; Self::COUNT] = [
        Self::EyeWideLeft,
        Self::EyeWideRight,
        Self::EyeSquintLeft,
        Self::EyeSquintRight,
        Self::BrowInnerUpLeft,
        Self::BrowInnerUpRight,
        Self::BrowOuterUpLeft,
        Self::BrowOuterUpRight,
        Self::BrowLowererLeft,
        Self::BrowLowererRight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EyeWideLeft => "EyeWideLeft",
            Self::EyeWideRight => "EyeWideRight",
            Self::EyeSquintLeft => "EyeSquintLeft",
            Self::EyeSquintRight => "EyeSquintRight",
            Self::BrowInnerUpLeft => "BrowInnerUpLeft",
            Self::BrowInnerUpRight => "BrowInnerUpRight",
            Self::BrowOuterUpLeft => "BrowOuterUpLeft",
            Self::BrowOuterUpRight => "BrowOuterUpRight",
            Self::BrowLowererLeft => "BrowLowererLeft",
            Self::BrowLowererRight => "BrowLowererRight",
        }
    }
}

/// Which eye a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eye {
    Left,
    Right,
}

impl Eye {
    pub fn widen(self) -> UnifiedExpression {
        match self {
            Eye::Left => UnifiedExpression::EyeWideLeft,
            Eye::Right => UnifiedExpression::EyeWideRight,
        }
    }

    pub fn squint(self) -> UnifiedExpression {
        match self {
            Eye::Left => UnifiedExpression::EyeSquintLeft,
            Eye::Right => UnifiedExpression::EyeSquintRight,
        }
    }

    pub fn brow_raise(self) -> [UnifiedExpression; 2] {
        match self {
            Eye::Left => [
                UnifiedExpression::BrowInnerUpLeft,
                UnifiedExpression::BrowOuterUpLeft,
            ],
            Eye::Right => [
                UnifiedExpression::BrowInnerUpRight,
                UnifiedExpression::BrowOuterUpRight,
            ],
        }
    }

    pub fn brow_lower(self) -> UnifiedExpression {
        match self {
            Eye::Left => UnifiedExpression::BrowLowererLeft,
            Eye::Right => UnifiedExpression::BrowLowererRight,
        }
    }
}

/// Per-eye state as consumed by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeOutput {
    /// Normalised gaze direction (x, y)
    pub gaze: (f32, f32),
    /// 0.0 closed, 1.0 open
    pub openness: f32,
    pub pupil_diameter: f32,
}

impl Default for EyeOutput {
    fn default() -> Self {
        Self {
            gaze: (0.0, 0.0),
            openness: 1.0,
            pupil_diameter: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackingOutput {
    pub left: EyeOutput,
    pub right: EyeOutput,
    weights: [f32; UnifiedExpression::COUNT],
}

impl TrackingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eye(&self, eye: Eye) -> &EyeOutput {
        match eye {
            Eye::Left => &self.left,
            Eye::Right => &self.right,
        }
    }

    pub fn eye_mut(&mut self, eye: Eye) -> &mut EyeOutput {
        match eye {
            Eye::Left => &mut self.left,
            Eye::Right => &mut self.right,
        }
    }

    pub fn weight(&self, expression: UnifiedExpression) -> f32 {
        self.weights[expression as usize]
    }

    pub fn set_weight(&mut self, expression: UnifiedExpression, weight: f32) {
        self.weights[expression as usize] = weight;
    }

    /// Iterate all expression slots with their current weight.
    pub fn weights(&self) -> impl Iterator<Item = (UnifiedExpression, f32)> + '_ {
        UnifiedExpression::ALL
            .iter()
            .map(move |expr| (*expr, self.weights[*expr as usize]))
    }
}

/// Write-only surface the engine publishes frames into.
pub trait TrackingSink: Send {
    fn write(&mut self, output: &TrackingOutput);
}

/// Shared snapshot, overwritten with every frame.
impl TrackingSink for Arc<Mutex<TrackingOutput>> {
    fn write(&mut self, output: &TrackingOutput) {
        self.lock().clone_from(output);
    }
}

/// Channel sink. Frames are dropped rather than blocking the receive loop.
impl TrackingSink for Sender<TrackingOutput> {
    fn write(&mut self, output: &TrackingOutput) {
        match self.try_send(output.clone()) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::trace!("tracking consumer is behind, dropping frame");
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::trace!("tracking consumer has gone away");
            }
        }
    }
}

/// Sink that discards every frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TrackingSink for NullSink {
    fn write(&mut self, _output: &TrackingOutput) {}
}
