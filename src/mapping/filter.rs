//! One Euro filter for jittery tracker signals
//!
//! Adaptive low-pass filter: a low cutoff removes jitter while the signal is
//! steady, and the cutoff rises with the signal's speed to limit lag.

use std::f32::consts::PI;

/// Minimum cutoff used for eye-openness signals.
pub const DEFAULT_MIN_CUTOFF: f32 = 0.1;

/// Speed coefficient used for eye-openness signals.
pub const DEFAULT_BETA: f32 = 15.0;

/// Cutoff of the derivative estimate.
pub const DEFAULT_DERIVATIVE_CUTOFF: f32 = 1.0;

#[derive(Debug, Clone)]
pub struct OneEuroFilter {
    min_cutoff: f32,
    beta: f32,
    derivative_cutoff: f32,
    /// Previous filtered value, None until the first sample
    previous: Option<f32>,
    previous_derivative: f32,
}

impl OneEuroFilter {
    pub fn new(min_cutoff: f32, beta: f32) -> Self {
        Self::with_derivative_cutoff(min_cutoff, beta, DEFAULT_DERIVATIVE_CUTOFF)
    }

    pub fn with_derivative_cutoff(min_cutoff: f32, beta: f32, derivative_cutoff: f32) -> Self {
        Self {
            min_cutoff,
            beta,
            derivative_cutoff,
            previous: None,
            previous_derivative: 0.0,
        }
    }

    /// Filter `value` sampled `dt` seconds after the previous sample.
    ///
    /// The first sample passes through unchanged. A non-finite `value`, or
    /// a non-positive or non-finite `dt`, leaves the state untouched and
    /// returns the previous output.
    pub fn filter(&mut self, value: f32, dt: f32) -> f32 {
        if !value.is_finite() {
            return self.previous.unwrap_or(value);
        }
        let previous = match self.previous {
            None => {
                self.previous = Some(value);
                return value;
            }
            Some(previous) => previous,
        };

        if !(dt > 0.0 && dt.is_finite()) {
            return previous;
        }

        let derivative = (value - previous) / dt;
        let derivative = lerp(
            self.previous_derivative,
            derivative,
            smoothing_factor(self.derivative_cutoff, dt),
        );

        let cutoff = self.min_cutoff + self.beta * derivative.abs();
        let filtered = lerp(previous, value, smoothing_factor(cutoff, dt));

        self.previous = Some(filtered);
        self.previous_derivative = derivative;
        filtered
    }

    /// Last filtered value, if any sample has been seen.
    pub fn last(&self) -> Option<f32> {
        self.previous
    }

    pub fn reset(&mut self) {
        self.previous = None;
        self.previous_derivative = 0.0;
    }
}

impl Default for OneEuroFilter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CUTOFF, DEFAULT_BETA)
    }
}

fn smoothing_factor(cutoff: f32, dt: f32) -> f32 {
    let tau = 1.0 / (2.0 * PI * cutoff);
    1.0 / (1.0 + tau / dt)
}

fn lerp(from: f32, to: f32, alpha: f32) -> f32 {
    from + alpha * (to - from)
}
