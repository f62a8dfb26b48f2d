//! OSC message model shared by the codec, router and mapping engine

use std::fmt;
use std::net::IpAddr;

/// A single typed OSC argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Float(f32),
    Bool(bool),
    Str(String),
    IpAddr(IpAddr),
}

impl Value {
    /// OSC type tag used when this value is written to the wire.
    pub fn type_tag(&self) -> char {
        match self {
            Value::Int(_) => 'i',
            Value::Float(_) => 'f',
            Value::Bool(true) => 'T',
            Value::Bool(false) => 'F',
            Value::Str(_) | Value::IpAddr(_) => 's',
        }
    }

    /// Numeric view used by tracking parameters and float settings.
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f32),
            Value::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            Value::Str(_) | Value::IpAddr(_) => None,
        }
    }

    /// Boolean view. Integers count as true when non-zero.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            Value::Int(v) => Some(*v != 0),
            _ => None,
        }
    }

    /// Port number view. Floats are accepted only when integral.
    pub fn as_port(&self) -> Option<u16> {
        match self {
            Value::Int(v) => u16::try_from(*v).ok(),
            Value::Float(v) if v.fract() == 0.0 && (0.0..=u16::MAX as f32).contains(v) => {
                Some(*v as u16)
            }
            _ => None,
        }
    }

    pub fn as_ip_addr(&self) -> Option<IpAddr> {
        match self {
            Value::IpAddr(addr) => Some(*addr),
            Value::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Whether the value can drive a tracking parameter.
    pub fn is_numeric(&self) -> bool {
        self.as_f32().is_some()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Str(v) => write!(f, "\"{}\"", v),
            Value::IpAddr(v) => write!(f, "{}", v),
        }
    }
}

/// A decoded OSC message carrying exactly one argument.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub address: String,
    pub value: Value,
}

impl Message {
    pub fn new(address: impl Into<String>, value: Value) -> Self {
        Self {
            address: address.into(),
            value,
        }
    }

    /// Path segments, skipping the empty segment before the leading '/'.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.address.split('/').filter(|s| !s.is_empty())
    }

    /// The token after the last '/'.
    pub fn parameter_name(&self) -> &str {
        self.address.rsplit('/').next().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_numeric_views() {
        assert_eq!(Value::Int(3).as_f32(), Some(3.0));
        assert_eq!(Value::Bool(true).as_f32(), Some(1.0));
        assert_eq!(Value::Str("x".into()).as_f32(), None);
        assert!(!Value::IpAddr(IpAddr::V4(Ipv4Addr::LOCALHOST)).is_numeric());
    }

    #[test]
    fn test_port_view() {
        assert_eq!(Value::Int(8889).as_port(), Some(8889));
        assert_eq!(Value::Int(-1).as_port(), None);
        assert_eq!(Value::Int(70000).as_port(), None);
        assert_eq!(Value::Float(9000.0).as_port(), Some(9000));
        assert_eq!(Value::Float(9000.5).as_port(), None);
    }

    #[test]
    fn test_ip_view() {
        let expected = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20));
        assert_eq!(Value::Str("192.168.1.20".into()).as_ip_addr(), Some(expected));
        assert_eq!(Value::IpAddr(expected).as_ip_addr(), Some(expected));
        assert_eq!(Value::Str("not an ip".into()).as_ip_addr(), None);
    }

    #[test]
    fn test_parameter_name() {
        let msg = Message::new("/avatar/parameters/v2/EyeLid", Value::Float(0.5));
        assert_eq!(msg.parameter_name(), "EyeLid");
        assert_eq!(
            msg.segments().collect::<Vec<_>>(),
            vec!["avatar", "parameters", "v2", "EyeLid"]
        );
    }
}
