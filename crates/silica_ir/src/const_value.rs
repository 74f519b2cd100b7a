//! Constant values for attributes and cell parameters.

use serde::{Deserialize, Serialize};
use silica_common::LogicVec;

/// A constant attribute or parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Const {
    /// An integer constant.
    Int(i64),
    /// A bit-vector constant.
    Logic(LogicVec),
    /// A string constant.
    String(String),
    /// A boolean constant.
    Bool(bool),
}

impl Const {
    /// Returns the numeric interpretation of this constant, if it has one.
    ///
    /// Bit vectors are read as unsigned integers; vectors containing
    /// `X`/`Z` bits or wider than 64 bits have no numeric value. Strings
    /// are never numeric.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Const::Int(v) => Some(*v),
            Const::Logic(lv) => lv.to_u64().map(|v| v as i64),
            Const::Bool(b) => Some(i64::from(*b)),
            Const::String(_) => None,
        }
    }

    /// Returns the string payload, if this is a string constant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Const::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns `true` if this constant is a string.
    pub fn is_string(&self) -> bool {
        matches!(self, Const::String(_))
    }

    /// Returns `true` for a "set" boolean attribute: any nonzero numeric
    /// value or `Bool(true)`.
    pub fn is_truthy(&self) -> bool {
        match self {
            Const::Bool(b) => *b,
            Const::Int(v) => *v != 0,
            Const::Logic(lv) => !lv.is_all_zero(),
            Const::String(s) => !s.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_int_views() {
        assert_eq!(Const::Int(5).as_int(), Some(5));
        assert_eq!(Const::Bool(true).as_int(), Some(1));
        assert_eq!(Const::Logic(LogicVec::from_u64(12, 8)).as_int(), Some(12));
        assert_eq!(Const::String("12".into()).as_int(), None);
        assert_eq!(Const::Logic(LogicVec::all_x(4)).as_int(), None);
    }

    #[test]
    fn string_views() {
        let c = Const::String("hello".into());
        assert!(c.is_string());
        assert_eq!(c.as_str(), Some("hello"));
        assert_eq!(Const::Int(1).as_str(), None);
    }

    #[test]
    fn truthiness() {
        assert!(Const::Bool(true).is_truthy());
        assert!(Const::Int(2).is_truthy());
        assert!(!Const::Int(0).is_truthy());
        assert!(!Const::Logic(LogicVec::all_zero(4)).is_truthy());
        assert!(Const::Logic(LogicVec::all_one(4)).is_truthy());
    }

    #[test]
    fn serde_roundtrip() {
        let c = Const::Logic(LogicVec::from_u64(3, 2));
        let json = serde_json::to_string(&c).unwrap();
        let back: Const = serde_json::from_str(&json).unwrap();
        assert_eq!(c, back);
    }
}
