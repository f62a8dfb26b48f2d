//! V1 (legacy) tracker parameters
//!
//! Per-eye X gaze, a shared Y gaze, and one "expanded squeeze" lid scalar per
//! eye in `0..=1`.

use crate::config::Config;
use crate::mapping::emulation::{apply_eyebrows, apply_openness, LidThresholds};
use crate::mapping::filter::OneEuroFilter;
use crate::mapping::output::{Eye, TrackingOutput};
use crate::mapping::ExpressionMapper;

/// Parameter names understood by the V1 mapper.
pub const PARAMETERS: [&str; 6] = [
    "LeftEyeX",
    "RightEyeX",
    "EyesY",
    "LeftEyeLidExpandedSqueeze",
    "RightEyeLidExpandedSqueeze",
    "EyesDilation",
];

#[derive(Debug, Clone)]
pub struct V1Mapper {
    left_eye_x: f32,
    right_eye_x: f32,
    eyes_y: f32,
    /// Lid values after filtering
    left_lid: f32,
    right_lid: f32,
    dilation: Option<f32>,
    left_filter: OneEuroFilter,
    right_filter: OneEuroFilter,
}

impl V1Mapper {
    pub fn new() -> Self {
        Self {
            left_eye_x: 0.0,
            right_eye_x: 0.0,
            eyes_y: 0.0,
            left_lid: 1.0,
            right_lid: 1.0,
            dilation: None,
            left_filter: OneEuroFilter::default(),
            right_filter: OneEuroFilter::default(),
        }
    }

    fn filtered_lid(&self, eye: Eye) -> f32 {
        match eye {
            Eye::Left => self.left_lid,
            Eye::Right => self.right_lid,
        }
    }
}

impl Default for V1Mapper {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpressionMapper for V1Mapper {
    fn accept(&mut self, parameter: &str, value: f32, dt: f32) -> bool {
        match parameter {
            "LeftEyeX" => self.left_eye_x = value,
            "RightEyeX" => self.right_eye_x = value,
            "EyesY" => self.eyes_y = value,
            "LeftEyeLidExpandedSqueeze" => self.left_lid = self.left_filter.filter(value, dt),
            "RightEyeLidExpandedSqueeze" => self.right_lid = self.right_filter.filter(value, dt),
            "EyesDilation" => self.dilation = Some(value),
            _ => return false,
        }
        true
    }

    fn write(&self, config: &Config, output: &mut TrackingOutput) {
        output.left.gaze = (self.left_eye_x, self.eyes_y);
        output.right.gaze = (self.right_eye_x, self.eyes_y);

        if let Some(dilation) = self.dilation {
            output.left.pupil_diameter = dilation;
            output.right.pupil_diameter = dilation;
        }

        let thresholds = LidThresholds::v1(config);
        for eye in [Eye::Left, Eye::Right] {
            let lid = self.filtered_lid(eye);
            apply_openness(output, eye, lid, &thresholds, config);
            apply_eyebrows(output, eye, lid, config);
        }
    }
}
