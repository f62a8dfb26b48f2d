//! Bridge configuration
//!
//! [`Config`] is the persisted settings document, [`FieldRegistry`] maps
//! OSC field names onto it and [`ConfigStore`] owns the live copy.

pub mod fields;
pub mod settings;
pub mod store;

use std::path::PathBuf;

pub use fields::FieldRegistry;
pub use settings::{Config, Half, PairLimits, ThresholdPair, CONFIG_VERSION};
pub use store::{ConfigStore, Subscriber};

/// Per-user directory holding the config file, if one can be resolved.
pub fn default_config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "EyeTrackVR", "etvr-bridge")
        .map(|dirs| dirs.config_dir().to_path_buf())
}
