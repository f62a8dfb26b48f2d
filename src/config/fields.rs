//! Name-addressable setters for [`Config`]
//!
//! Settings arrive over OSC as `(field name, value)`. The registry maps every
//! accepted name to a typed setter built once at startup.

use std::collections::HashMap;

use crate::config::settings::{
    clamp, Config, Half, PairLimits, ThresholdPair, EYEBROW_RANGE, MULTIPLIER_RANGE,
    SQUEEZE_V1_LIMITS, SQUEEZE_V2_LIMITS, WIDEN_LIMITS,
};
use crate::error::ConfigError;
use crate::protocol::Value;

type Setter = Box<dyn Fn(&mut Config, &Value) -> Option<()> + Send + Sync>;

/// Prefix the tracker GUI puts in front of every field name.
const GUI_PREFIX: &str = "gui_";

/// GUI names that do not follow the `gui_<Field>` pattern.
const GUI_ALIASES: [(&str, &str); 2] = [
    ("gui_VRCFTModuleIPAddress", "ListeningAddress"),
    ("gui_VRCFTModulePort", "PortNumber"),
];

pub struct FieldRegistry {
    setters: HashMap<String, Setter>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            setters: HashMap::new(),
        };

        registry.whole("ListeningAddress", |c, v| {
            c.listening_address = v.as_ip_addr()?;
            Some(())
        });
        registry.whole("PortNumber", |c, v| {
            c.port_number = v.as_port()?;
            Some(())
        });
        registry.whole("ShouldEmulateEyeWiden", |c, v| {
            c.should_emulate_eye_widen = v.as_bool()?;
            Some(())
        });
        registry.whole("ShouldEmulateEyeSquint", |c, v| {
            c.should_emulate_eye_squint = v.as_bool()?;
            Some(())
        });
        registry.whole("ShouldEmulateEyebrows", |c, v| {
            c.should_emulate_eyebrows = v.as_bool()?;
            Some(())
        });
        registry.whole("EyebrowThresholdRising", |c, v| {
            c.eyebrow_threshold_rising = clamp(v.as_f32()?, &EYEBROW_RANGE);
            Some(())
        });
        registry.whole("EyebrowThresholdLowering", |c, v| {
            c.eyebrow_threshold_lowering = clamp(v.as_f32()?, &EYEBROW_RANGE);
            Some(())
        });
        registry.whole("OutputMultiplier", |c, v| {
            c.output_multiplier = clamp(v.as_f32()?, &MULTIPLIER_RANGE);
            Some(())
        });

        registry.pair("WidenThresholdV1", WIDEN_LIMITS, |c| &mut c.widen_threshold_v1);
        registry.pair("WidenThresholdV2", WIDEN_LIMITS, |c| &mut c.widen_threshold_v2);
        registry.pair("SqueezeThresholdV1", SQUEEZE_V1_LIMITS, |c| {
            &mut c.squeeze_threshold_v1
        });
        registry.pair("SqueezeThresholdV2", SQUEEZE_V2_LIMITS, |c| {
            &mut c.squeeze_threshold_v2
        });

        registry
    }

    /// Apply `value` to the field called `name`.
    pub fn apply(&self, config: &mut Config, name: &str, value: &Value) -> Result<(), ConfigError> {
        let canonical = Self::canonical_name(name);
        let setter = self
            .setters
            .get(canonical)
            .ok_or_else(|| ConfigError::UnknownField(name.to_string()))?;

        setter(config, value).ok_or_else(|| ConfigError::TypeMismatch {
            field: canonical.to_string(),
            value: value.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.setters.contains_key(Self::canonical_name(name))
    }

    /// All canonical field names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.setters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn canonical_name(name: &str) -> &str {
        if let Some((_, canonical)) = GUI_ALIASES.iter().find(|(alias, _)| *alias == name) {
            return canonical;
        }
        name.strip_prefix(GUI_PREFIX).unwrap_or(name)
    }

    fn whole<F>(&mut self, name: &str, setter: F)
    where
        F: Fn(&mut Config, &Value) -> Option<()> + Send + Sync + 'static,
    {
        self.setters.insert(name.to_string(), Box::new(setter));
    }

    /// Register `<name>_min` and `<name>_max`, each replacing one half.
    fn pair(
        &mut self,
        name: &str,
        limits: PairLimits,
        select: fn(&mut Config) -> &mut ThresholdPair,
    ) {
        for (suffix, half) in [("min", Half::Activation), ("max", Half::Saturation)] {
            let limits = limits.clone();
            self.setters.insert(
                format!("{}_{}", name, suffix),
                Box::new(move |config: &mut Config, value: &Value| {
                    let pair = select(config);
                    *pair = pair.with_half(half, value.as_f32()?).clamped(&limits, half);
                    Some(())
                }),
            );
        }
    }
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn test_paired_update_preserves_other_half() {
        let registry = FieldRegistry::new();
        let mut config = Config::default();
        assert_eq!(config.widen_threshold_v1, ThresholdPair::new(0.95, 1.0));

        registry
            .apply(&mut config, "WidenThresholdV1_min", &Value::Float(0.5))
            .unwrap();
        assert_eq!(config.widen_threshold_v1, ThresholdPair::new(0.5, 1.0));

        registry
            .apply(&mut config, "WidenThresholdV1_max", &Value::Float(5.0))
            .unwrap();
        assert_eq!(config.widen_threshold_v1, ThresholdPair::new(0.5, 2.0));
    }

    #[test]
    fn test_paired_update_clamps_signed_squeeze() {
        let registry = FieldRegistry::new();
        let mut config = Config::default();
        registry
            .apply(&mut config, "SqueezeThresholdV2_max", &Value::Float(-3.0))
            .unwrap();
        assert_eq!(config.squeeze_threshold_v2, ThresholdPair::new(0.05, -2.0));
    }

    #[test]
    fn test_whole_field_updates() {
        let registry = FieldRegistry::new();
        let mut config = Config::default();

        registry
            .apply(&mut config, "ShouldEmulateEyeSquint", &Value::Bool(true))
            .unwrap();
        registry
            .apply(&mut config, "PortNumber", &Value::Int(9001))
            .unwrap();
        registry
            .apply(&mut config, "OutputMultiplier", &Value::Float(3.0))
            .unwrap();
        registry
            .apply(
                &mut config,
                "ListeningAddress",
                &Value::IpAddr(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            )
            .unwrap();

        assert!(config.should_emulate_eye_squint);
        assert_eq!(config.port_number, 9001);
        assert_eq!(config.output_multiplier, 2.0);
        assert_eq!(config.listening_address, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    }

    #[test]
    fn test_gui_aliases() {
        let registry = FieldRegistry::new();
        let mut config = Config::default();

        registry
            .apply(&mut config, "gui_VRCFTModulePort", &Value::Int(7000))
            .unwrap();
        registry
            .apply(&mut config, "gui_SqueezeThresholdV1_min", &Value::Float(0.1))
            .unwrap();

        assert_eq!(config.port_number, 7000);
        assert_eq!(config.squeeze_threshold_v1.activation, 0.1);
        assert!(registry.contains("gui_VRCFTModuleIPAddress"));
    }

    #[test]
    fn test_rejections_leave_config_untouched() {
        let registry = FieldRegistry::new();
        let mut config = Config::default();

        assert_eq!(
            registry.apply(&mut config, "NoSuchField", &Value::Int(1)),
            Err(ConfigError::UnknownField("NoSuchField".into()))
        );
        assert!(matches!(
            registry.apply(&mut config, "PortNumber", &Value::Str("eighty".into())),
            Err(ConfigError::TypeMismatch { .. })
        ));
        assert!(matches!(
            registry.apply(&mut config, "WidenThresholdV2_min", &Value::Str("x".into())),
            Err(ConfigError::TypeMismatch { .. })
        ));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_every_config_field_is_addressable() {
        let registry = FieldRegistry::new();
        let names = registry.names();
        assert_eq!(names.len(), 16);
        assert!(names.contains(&"SqueezeThresholdV2_max"));
    }
}
