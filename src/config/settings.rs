//! Persisted bridge settings

use std::net::{IpAddr, Ipv4Addr};
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_PORT;

/// Current on-disk format version.
pub const CONFIG_VERSION: u32 = 1;

/// How the two halves of a threshold pair relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordering {
    /// Saturation is at or above activation
    Rising,
    /// Saturation is at or below activation
    Falling,
    /// No ordering between the halves
    Independent,
}

/// Legal range of a threshold pair.
#[derive(Debug, Clone)]
pub struct PairLimits {
    pub activation: RangeInclusive<f32>,
    pub saturation: RangeInclusive<f32>,
    pub ordering: Ordering,
}

pub const WIDEN_LIMITS: PairLimits = PairLimits {
    activation: 0.0..=1.0,
    saturation: 0.0..=2.0,
    ordering: Ordering::Rising,
};

/// V1 squeeze saturation is a depth below the activation point.
pub const SQUEEZE_V1_LIMITS: PairLimits = PairLimits {
    activation: 0.0..=1.0,
    saturation: 0.0..=2.0,
    ordering: Ordering::Independent,
};

/// V2 lids go negative when squeezed, so saturation is a signed edge.
pub const SQUEEZE_V2_LIMITS: PairLimits = PairLimits {
    activation: 0.0..=1.0,
    saturation: -2.0..=0.0,
    ordering: Ordering::Falling,
};

pub const EYEBROW_RANGE: RangeInclusive<f32> = 0.0..=1.0;
pub const MULTIPLIER_RANGE: RangeInclusive<f32> = 0.0..=2.0;

/// Which half of a pair a `_min`/`_max` update targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Half {
    Activation,
    Saturation,
}

/// `[activation, saturation]` pair, stored as a two-element JSON array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct ThresholdPair {
    pub activation: f32,
    pub saturation: f32,
}

impl ThresholdPair {
    pub const fn new(activation: f32, saturation: f32) -> Self {
        Self {
            activation,
            saturation,
        }
    }

    /// Clamp both halves into `limits`. When the ordering is violated the
    /// `keep` half wins and the other half is moved onto it.
    pub fn clamped(self, limits: &PairLimits, keep: Half) -> Self {
        let mut activation = clamp(self.activation, &limits.activation);
        let mut saturation = clamp(self.saturation, &limits.saturation);

        let violated = match limits.ordering {
            Ordering::Rising => saturation < activation,
            Ordering::Falling => saturation > activation,
            Ordering::Independent => false,
        };
        if violated {
            match keep {
                Half::Activation => saturation = activation,
                Half::Saturation => activation = saturation,
            }
            activation = clamp(activation, &limits.activation);
            saturation = clamp(saturation, &limits.saturation);
        }

        Self {
            activation,
            saturation,
        }
    }

    pub fn with_half(self, half: Half, value: f32) -> Self {
        match half {
            Half::Activation => Self {
                activation: value,
                ..self
            },
            Half::Saturation => Self {
                saturation: value,
                ..self
            },
        }
    }
}

impl From<[f32; 2]> for ThresholdPair {
    fn from(value: [f32; 2]) -> Self {
        Self::new(value[0], value[1])
    }
}

impl From<ThresholdPair> for [f32; 2] {
    fn from(value: ThresholdPair) -> Self {
        [value.activation, value.saturation]
    }
}

/// Settings persisted as JSON and updated live over OSC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Config {
    pub version: u32,
    pub listening_address: IpAddr,
    pub port_number: u16,
    pub should_emulate_eye_widen: bool,
    pub should_emulate_eye_squint: bool,
    pub should_emulate_eyebrows: bool,
    pub widen_threshold_v1: ThresholdPair,
    pub widen_threshold_v2: ThresholdPair,
    pub squeeze_threshold_v1: ThresholdPair,
    pub squeeze_threshold_v2: ThresholdPair,
    pub eyebrow_threshold_rising: f32,
    pub eyebrow_threshold_lowering: f32,
    pub output_multiplier: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            listening_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port_number: DEFAULT_PORT,
            should_emulate_eye_widen: false,
            should_emulate_eye_squint: false,
            should_emulate_eyebrows: false,
            widen_threshold_v1: ThresholdPair::new(0.95, 1.0),
            widen_threshold_v2: ThresholdPair::new(0.95, 1.05),
            squeeze_threshold_v1: ThresholdPair::new(0.05, 0.5),
            squeeze_threshold_v2: ThresholdPair::new(0.05, -1.0),
            eyebrow_threshold_rising: 0.9,
            eyebrow_threshold_lowering: 0.05,
            output_multiplier: 1.0,
        }
    }
}

impl Config {
    /// Apply every clamp used by live updates to a config read from disk.
    pub fn sanitized(mut self) -> Self {
        self.widen_threshold_v1 = self.widen_threshold_v1.clamped(&WIDEN_LIMITS, Half::Activation);
        self.widen_threshold_v2 = self.widen_threshold_v2.clamped(&WIDEN_LIMITS, Half::Activation);
        self.squeeze_threshold_v1 = self
            .squeeze_threshold_v1
            .clamped(&SQUEEZE_V1_LIMITS, Half::Activation);
        self.squeeze_threshold_v2 = self
            .squeeze_threshold_v2
            .clamped(&SQUEEZE_V2_LIMITS, Half::Activation);
        self.eyebrow_threshold_rising = clamp(self.eyebrow_threshold_rising, &EYEBROW_RANGE);
        self.eyebrow_threshold_lowering = clamp(self.eyebrow_threshold_lowering, &EYEBROW_RANGE);
        self.output_multiplier = clamp(self.output_multiplier, &MULTIPLIER_RANGE);
        self
    }

    pub fn socket_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::new(self.listening_address, self.port_number)
    }
}

/// Clamp into an inclusive range; NaN collapses to the lower bound.
pub fn clamp(value: f32, range: &RangeInclusive<f32>) -> f32 {
    if value.is_nan() {
        return *range.start();
    }
    value.clamp(*range.start(), *range.end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert_eq!(json["ListeningAddress"], "127.0.0.1");
        assert_eq!(json["PortNumber"], 8889);
        assert_eq!(json["WidenThresholdV1"], serde_json::json!([0.95f32, 1.0f32]));
        assert_eq!(json["SqueezeThresholdV2"], serde_json::json!([0.05f32, -1.0f32]));
        assert_eq!(json["OutputMultiplier"], 1.0);
    }

    #[test]
    fn test_missing_keys_take_defaults() {
        let config: Config = serde_json::from_str(r#"{"PortNumber": 9000}"#).unwrap();
        assert_eq!(config.port_number, 9000);
        assert_eq!(config.widen_threshold_v2, Config::default().widen_threshold_v2);
    }

    #[test]
    fn test_pair_clamping() {
        let pair = ThresholdPair::new(1.5, 3.0).clamped(&WIDEN_LIMITS, Half::Activation);
        assert_eq!(pair, ThresholdPair::new(1.0, 2.0));

        let pair = ThresholdPair::new(0.5, 1.0).clamped(&SQUEEZE_V2_LIMITS, Half::Saturation);
        assert_eq!(pair, ThresholdPair::new(0.5, 0.0));

        let pair = ThresholdPair::new(-0.2, -5.0).clamped(&SQUEEZE_V2_LIMITS, Half::Activation);
        assert_eq!(pair, ThresholdPair::new(0.0, -2.0));
    }

    #[test]
    fn test_rising_order_enforced() {
        // Lowering the saturation below activation drags activation down
        let pair = ThresholdPair::new(0.95, 0.5).clamped(&WIDEN_LIMITS, Half::Saturation);
        assert_eq!(pair, ThresholdPair::new(0.5, 0.5));

        // Raising activation above saturation drags saturation up
        let pair = ThresholdPair::new(0.99, 0.9).clamped(&WIDEN_LIMITS, Half::Activation);
        assert_eq!(pair, ThresholdPair::new(0.99, 0.99));
    }

    #[test]
    fn test_sanitized() {
        let config = Config {
            output_multiplier: 7.0,
            eyebrow_threshold_rising: -1.0,
            squeeze_threshold_v2: ThresholdPair::new(0.05, 1.0),
            ..Config::default()
        }
        .sanitized();
        assert_eq!(config.output_multiplier, 2.0);
        assert_eq!(config.eyebrow_threshold_rising, 0.0);
        assert_eq!(config.squeeze_threshold_v2, ThresholdPair::new(0.05, 0.0));
    }
}
