//! Widen, squint and eyebrow emulation from a single lid scalar
//!
//! Trackers only report how open each eye is. Values past the configured
//! activation points are turned into expression weights so avatars can
//! widen, squint and move their brows.

use crate::config::{Config, ThresholdPair};
use crate::mapping::curve::{falling_smoothstep, smoothstep};
use crate::mapping::output::{Eye, TrackingOutput};

/// Thresholds a protocol version uses for its lid scalar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LidThresholds {
    pub widen: ThresholdPair,
    /// Activation for squint, and the lid value where squint saturates
    pub squeeze_activation: f32,
    pub squeeze_saturation: f32,
}

impl LidThresholds {
    /// V1 squeeze saturation is a depth below activation.
    ///
    /// V1 lids never go below 0, so squint only reaches full weight when
    /// the depth is at most the activation point. With the default
    /// `[0.05, 0.5]` the edge sits at -0.45 and a fully closed lid gives a
    /// squint of about 0.028; `[0.05, 0.05]` saturates exactly at closed.
    pub fn v1(config: &Config) -> Self {
        let squeeze = config.squeeze_threshold_v1;
        Self {
            widen: config.widen_threshold_v1,
            squeeze_activation: squeeze.activation,
            squeeze_saturation: squeeze.activation - squeeze.saturation,
        }
    }

    /// V2 squeeze saturation is already a signed lid value.
    pub fn v2(config: &Config) -> Self {
        let squeeze = config.squeeze_threshold_v2;
        Self {
            widen: config.widen_threshold_v2,
            squeeze_activation: squeeze.activation,
            squeeze_saturation: squeeze.saturation,
        }
    }
}

/// Write openness plus widen/squint weights for one eye.
///
/// Both weights are always written so a previous frame's value never
/// sticks once the lid leaves the emulation zone.
pub fn apply_openness(
    output: &mut TrackingOutput,
    eye: Eye,
    lid: f32,
    thresholds: &LidThresholds,
    config: &Config,
) {
    output.eye_mut(eye).openness = lid.clamp(0.0, 1.0);

    let mut widen = 0.0;
    let mut squint = 0.0;

    if config.should_emulate_eye_widen && lid >= thresholds.widen.activation {
        widen = smoothstep(
            thresholds.widen.activation,
            thresholds.widen.saturation,
            lid,
        ) * config.output_multiplier;
    } else if config.should_emulate_eye_squint && lid <= thresholds.squeeze_activation {
        squint = falling_smoothstep(
            thresholds.squeeze_activation,
            thresholds.squeeze_saturation,
            lid,
        ) * config.output_multiplier;
    }

    output.set_weight(eye.widen(), widen);
    output.set_weight(eye.squint(), squint);
}

/// Write brow raise/lower weights for one eye.
pub fn apply_eyebrows(output: &mut TrackingOutput, eye: Eye, lid: f32, config: &Config) {
    let mut raise = 0.0;
    let mut lower = 0.0;

    if config.should_emulate_eyebrows {
        let rising = config.eyebrow_threshold_rising;
        let lowering = config.eyebrow_threshold_lowering;
        if lid >= rising {
            raise = smoothstep(rising, 1.0, lid) * config.output_multiplier;
        }
        if lid <= lowering {
            lower = falling_smoothstep(lowering, 0.0, lid) * config.output_multiplier;
        }
    }

    for expression in eye.brow_raise() {
        output.set_weight(expression, raise);
    }
    output.set_weight(eye.brow_lower(), lower);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::output::UnifiedExpression;

    fn squint_config() -> Config {
        Config {
            should_emulate_eye_squint: true,
            should_emulate_eye_widen: true,
            ..Config::default()
        }
    }

    #[test]
    fn test_v1_squint_from_low_lid() {
        let config = squint_config();
        let mut output = TrackingOutput::new();
        apply_openness(&mut output, Eye::Right, 0.02, &LidThresholds::v1(&config), &config);

        assert!(output.weight(UnifiedExpression::EyeSquintRight) > 0.0);
        assert_eq!(output.weight(UnifiedExpression::EyeWideRight), 0.0);
        assert_eq!(output.right.openness, 0.02);
    }

    #[test]
    fn test_v1_default_squint_stays_faint() {
        let config = squint_config();
        let thresholds = LidThresholds::v1(&config);
        let mut output = TrackingOutput::new();

        apply_openness(&mut output, Eye::Left, 0.02, &thresholds, &config);
        let partly = output.weight(UnifiedExpression::EyeSquintLeft);
        apply_openness(&mut output, Eye::Left, 0.0, &thresholds, &config);
        let closed = output.weight(UnifiedExpression::EyeSquintLeft);

        assert!(closed > partly);
        assert!((closed - 0.028).abs() < 1e-4, "closed lid squint = {}", closed);
    }

    #[test]
    fn test_v1_squint_saturates_when_depth_matches_activation() {
        let mut config = squint_config();
        config.squeeze_threshold_v1 = ThresholdPair::new(0.05, 0.05);
        let mut output = TrackingOutput::new();

        apply_openness(&mut output, Eye::Left, 0.0, &LidThresholds::v1(&config), &config);
        assert_eq!(output.weight(UnifiedExpression::EyeSquintLeft), 1.0);
    }

    #[test]
    fn test_v1_widen_from_high_lid() {
        let config = squint_config();
        let mut output = TrackingOutput::new();
        apply_openness(&mut output, Eye::Left, 1.0, &LidThresholds::v1(&config), &config);

        assert_eq!(output.weight(UnifiedExpression::EyeWideLeft), 1.0);
        assert_eq!(output.weight(UnifiedExpression::EyeSquintLeft), 0.0);
    }

    #[test]
    fn test_v2_widen_above_one() {
        let config = squint_config();
        let mut output = TrackingOutput::new();
        apply_openness(&mut output, Eye::Left, 1.05, &LidThresholds::v2(&config), &config);

        assert_eq!(output.weight(UnifiedExpression::EyeWideLeft), 1.0);
        assert_eq!(output.left.openness, 1.0);
    }

    #[test]
    fn test_v2_squint_below_zero() {
        let config = squint_config();
        let mut output = TrackingOutput::new();
        apply_openness(&mut output, Eye::Right, -1.0, &LidThresholds::v2(&config), &config);

        assert_eq!(output.weight(UnifiedExpression::EyeSquintRight), 1.0);
        assert_eq!(output.right.openness, 0.0);
    }

    #[test]
    fn test_weights_reset_in_neutral_zone() {
        let config = squint_config();
        let thresholds = LidThresholds::v1(&config);
        let mut output = TrackingOutput::new();

        apply_openness(&mut output, Eye::Right, 0.01, &thresholds, &config);
        assert!(output.weight(UnifiedExpression::EyeSquintRight) > 0.0);

        apply_openness(&mut output, Eye::Right, 0.5, &thresholds, &config);
        assert_eq!(output.weight(UnifiedExpression::EyeSquintRight), 0.0);
        assert_eq!(output.weight(UnifiedExpression::EyeWideRight), 0.0);
    }

    #[test]
    fn test_disabled_emulation_writes_zero() {
        let config = Config::default();
        let mut output = TrackingOutput::new();
        output.set_weight(UnifiedExpression::EyeWideLeft, 0.8);

        apply_openness(&mut output, Eye::Left, 1.0, &LidThresholds::v1(&config), &config);
        assert_eq!(output.weight(UnifiedExpression::EyeWideLeft), 0.0);
    }

    #[test]
    fn test_multiplier_scales_weights() {
        let config = Config {
            output_multiplier: 0.5,
            ..squint_config()
        };
        let mut output = TrackingOutput::new();
        apply_openness(&mut output, Eye::Left, 1.0, &LidThresholds::v1(&config), &config);
        assert_eq!(output.weight(UnifiedExpression::EyeWideLeft), 0.5);
    }

    #[test]
    fn test_eyebrows() {
        let config = Config {
            should_emulate_eyebrows: true,
            ..Config::default()
        };
        let mut output = TrackingOutput::new();

        apply_eyebrows(&mut output, Eye::Left, 1.0, &config);
        assert_eq!(output.weight(UnifiedExpression::BrowOuterUpLeft), 1.0);
        assert_eq!(output.weight(UnifiedExpression::BrowInnerUpLeft), 1.0);
        assert_eq!(output.weight(UnifiedExpression::BrowLowererLeft), 0.0);

        apply_eyebrows(&mut output, Eye::Left, 0.0, &config);
        assert_eq!(output.weight(UnifiedExpression::BrowOuterUpLeft), 0.0);
        assert_eq!(output.weight(UnifiedExpression::BrowLowererLeft), 1.0);

        apply_eyebrows(&mut output, Eye::Left, 0.5, &config);
        assert_eq!(output.weight(UnifiedExpression::BrowLowererLeft), 0.0);
        assert_eq!(output.weight(UnifiedExpression::BrowOuterUpLeft), 0.0);
    }

    #[test]
    fn test_eyebrows_disabled_clears_slots() {
        let mut output = TrackingOutput::new();
        output.set_weight(UnifiedExpression::BrowLowererRight, 0.7);
        apply_eyebrows(&mut output, Eye::Right, 0.0, &Config::default());
        assert_eq!(output.weight(UnifiedExpression::BrowLowererRight), 0.0);
    }
}
