//! V2 tracker parameters
//!
//! Either a combined single-eye family (`EyeX`, `EyeY`, `EyeLid`) or an
//! independent left/right family. Lids may leave `0..=1` when the user
//! widens or squeezes.

use crate::config::Config;
use crate::mapping::emulation::{apply_eyebrows, apply_openness, LidThresholds};
use crate::mapping::filter::OneEuroFilter;
use crate::mapping::output::{Eye, TrackingOutput};
use crate::mapping::ExpressionMapper;

/// Parameter names understood by the V2 mapper.
pub const PARAMETERS: [&str; 9] = [
    "EyeX",
    "EyeY",
    "EyeLid",
    "EyeLeftX",
    "EyeLeftY",
    "EyeRightX",
    "EyeRightY",
    "EyeLidLeft",
    "EyeLidRight",
];

#[derive(Debug, Clone)]
pub struct V2Mapper {
    eye_x: f32,
    eye_y: f32,
    left_gaze: (f32, f32),
    right_gaze: (f32, f32),
    /// Lid values after filtering
    left_lid: f32,
    right_lid: f32,
    /// Set by whichever family was updated last
    single_eye: bool,
    left_filter: OneEuroFilter,
    right_filter: OneEuroFilter,
}

impl V2Mapper {
    pub fn new() -> Self {
        Self {
            eye_x: 0.0,
            eye_y: 0.0,
            left_gaze: (0.0, 0.0),
            right_gaze: (0.0, 0.0),
            left_lid: 1.0,
            right_lid: 1.0,
            single_eye: false,
            left_filter: OneEuroFilter::default(),
            right_filter: OneEuroFilter::default(),
        }
    }

    pub fn is_single_eye(&self) -> bool {
        self.single_eye
    }

    fn handle_eye_gaze(&self, output: &mut TrackingOutput) {
        if self.single_eye {
            output.left.gaze = (self.eye_x, self.eye_y);
            output.right.gaze = (self.eye_x, self.eye_y);
        } else {
            output.left.gaze = self.left_gaze;
            output.right.gaze = self.right_gaze;
        }
    }
}

impl Default for V2Mapper {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpressionMapper for V2Mapper {
    fn accept(&mut self, parameter: &str, value: f32, dt: f32) -> bool {
        let single_eye = match parameter {
            "EyeX" => {
                self.eye_x = value;
                true
            }
            "EyeY" => {
                self.eye_y = value;
                true
            }
            "EyeLid" => {
                self.left_lid = self.left_filter.filter(value, dt);
                self.right_lid = self.right_filter.filter(value, dt);
                true
            }
            "EyeLeftX" => {
                self.left_gaze.0 = value;
                false
            }
            "EyeLeftY" => {
                self.left_gaze.1 = value;
                false
            }
            "EyeRightX" => {
                self.right_gaze.0 = value;
                false
            }
            "EyeRightY" => {
                self.right_gaze.1 = value;
                false
            }
            "EyeLidLeft" => {
                self.left_lid = self.left_filter.filter(value, dt);
                false
            }
            "EyeLidRight" => {
                self.right_lid = self.right_filter.filter(value, dt);
                false
            }
            _ => return false,
        };
        self.single_eye = single_eye;
        true
    }

    fn write(&self, config: &Config, output: &mut TrackingOutput) {
        self.handle_eye_gaze(output);

        let thresholds = LidThresholds::v2(config);
        for (eye, lid) in [(Eye::Left, self.left_lid), (Eye::Right, self.right_lid)] {
            apply_openness(output, eye, lid, &thresholds, config);
            apply_eyebrows(output, eye, lid, config);
        }
    }
}
