//! Observability trait for inspecting component state.
//!
//! Debuggers and test harnesses read registers and flags through string
//! paths. Queries never affect emulation state.

use std::fmt;

/// A dynamically-typed value for state queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Boolean value (flags, halt state).
    Bool(bool),
    /// 8-bit unsigned integer.
    U8(u8),
    /// 16-bit unsigned integer.
    U16(u16),
    /// 32-bit unsigned integer.
    U32(u32),
    /// String value.
    String(String),
}

impl Value {
    /// Widen any integer or boolean value to `u32`.
    ///
    /// Returns `None` for strings.
    #[must_use]
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::Bool(v) => Some(u32::from(*v)),
            Value::U8(v) => Some(u32::from(*v)),
            Value::U16(v) => Some(u32::from(*v)),
            Value::U32(v) => Some(*v),
            Value::String(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::U8(v) => write!(f, "{v:#04X}"),
            Value::U16(v) => write!(f, "{v:#06X}"),
            Value::U32(v) => write!(f, "{v:#010X}"),
            Value::String(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::U8(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::U16(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::U32(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

/// A component whose state can be inspected.
pub trait Observable {
    /// Query a specific property by path.
    ///
    /// Paths are hierarchical, separated by dots:
    /// - `pc` - Program counter
    /// - `d3` - Data register 3
    /// - `flags.z` - Zero flag
    ///
    /// Returns `None` if the path is not recognised.
    fn query(&self, path: &str) -> Option<Value>;

    /// List all available query paths.
    fn query_paths(&self) -> &'static [&'static str];
}

#[cfg(test)]
mod tests {
    use super::Value;

    #[test]
    fn display_pads_to_width() {
        assert_eq!(Value::U8(0x0A).to_string(), "0x0A");
        assert_eq!(Value::U16(0x2700).to_string(), "0x2700");
        assert_eq!(Value::U32(0x0040_002A).to_string(), "0x0040002A");
        assert_eq!(Value::from("68030").to_string(), "68030");
    }

    #[test]
    fn integers_widen_to_u32() {
        assert_eq!(Value::Bool(true).as_u32(), Some(1));
        assert_eq!(Value::U16(0xFFFF).as_u32(), Some(0xFFFF));
        assert_eq!(Value::from("x").as_u32(), None);
    }
}
