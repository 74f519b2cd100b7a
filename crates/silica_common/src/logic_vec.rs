//! Packed vectors of 4-state logic values.
//!
//! A [`LogicVec`] is the bit-vector constant type of the compiler: it backs
//! attribute and parameter values, functional IR constants, and evaluated
//! signal values. Each logic value occupies 2 bits, 32 values per `u64`
//! word.

use crate::logic::Logic;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};

/// A vector of 4-state [`Logic`] values packed for efficient storage.
///
/// Index 0 is the least significant bit.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogicVec {
    width: u32,
    /// Packed storage: 2 bits per logic value, 32 values per u64.
    data: Vec<u64>,
}

/// Number of logic values packed per u64 word.
const VALUES_PER_WORD: u32 = 32;

impl LogicVec {
    /// Creates a new `LogicVec` of the given width, initialized to all `Zero`.
    pub fn new(width: u32) -> Self {
        Self {
            width,
            data: vec![0; width.div_ceil(VALUES_PER_WORD) as usize],
        }
    }

    /// Returns the number of logic values in this vector.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Gets the logic value at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn get(&self, index: u32) -> Logic {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let word = (index / VALUES_PER_WORD) as usize;
        let shift = (index % VALUES_PER_WORD) * 2;
        match (self.data[word] >> shift) & 0b11 {
            0 => Logic::Zero,
            1 => Logic::One,
            2 => Logic::X,
            3 => Logic::Z,
            _ => unreachable!(),
        }
    }

    /// Sets the logic value at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn set(&mut self, index: u32, value: Logic) {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let word = (index / VALUES_PER_WORD) as usize;
        let shift = (index % VALUES_PER_WORD) * 2;
        self.data[word] = (self.data[word] & !(0b11u64 << shift)) | ((value as u64) << shift);
    }

    /// Creates a `LogicVec` with all bits `Zero`.
    pub fn all_zero(width: u32) -> Self {
        Self::new(width)
    }

    /// Creates a `LogicVec` with all bits `One`.
    pub fn all_one(width: u32) -> Self {
        let mut v = Self::new(width);
        for i in 0..width {
            v.set(i, Logic::One);
        }
        v
    }

    /// Creates a `LogicVec` with all bits `X`.
    pub fn all_x(width: u32) -> Self {
        let mut v = Self::new(width);
        for i in 0..width {
            v.set(i, Logic::X);
        }
        v
    }

    /// Creates a single-bit `LogicVec` from a boolean.
    pub fn from_bool(value: bool) -> Self {
        let mut v = Self::new(1);
        v.set(0, Logic::from(value));
        v
    }

    /// Creates a `LogicVec` of the given width from the low bits of a `u64`.
    pub fn from_u64(value: u64, width: u32) -> Self {
        let mut v = Self::new(width);
        for i in 0..width.min(64) {
            if (value >> i) & 1 != 0 {
                v.set(i, Logic::One);
            }
        }
        v
    }

    /// Converts to a `u64` if every bit is driven and the width fits.
    ///
    /// Returns `None` if the vector contains `X`/`Z` or is wider than 64.
    pub fn to_u64(&self) -> Option<u64> {
        if self.width > 64 {
            return None;
        }
        let mut result = 0u64;
        for i in 0..self.width {
            match self.get(i) {
                Logic::Zero => {}
                Logic::One => result |= 1 << i,
                Logic::X | Logic::Z => return None,
            }
        }
        Some(result)
    }

    /// Converts to an `i64` under two's-complement interpretation.
    ///
    /// The top bit is the sign bit. Returns `None` under the same
    /// conditions as [`to_u64`](Self::to_u64).
    pub fn to_i64(&self) -> Option<i64> {
        let raw = self.to_u64()?;
        if self.width == 0 || self.width >= 64 {
            return Some(raw as i64);
        }
        let sign = 1u64 << (self.width - 1);
        if raw & sign != 0 {
            Some((raw | !(sign | (sign - 1))) as i64)
        } else {
            Some(raw as i64)
        }
    }

    /// Returns `true` if any bit is `X` or `Z`.
    pub fn has_unknown(&self) -> bool {
        (0..self.width).any(|i| self.get(i).is_unknown())
    }

    /// Returns `true` if all bits are `Zero`.
    pub fn is_all_zero(&self) -> bool {
        (0..self.width).all(|i| self.get(i) == Logic::Zero)
    }

    /// Returns `true` if all bits are `One`.
    pub fn is_all_one(&self) -> bool {
        (0..self.width).all(|i| self.get(i) == Logic::One)
    }

    /// Parses a binary string like `"10XZ"`, most significant bit first.
    ///
    /// Returns `None` on invalid characters.
    pub fn from_binary_str(s: &str) -> Option<Self> {
        let mut v = Self::new(s.len() as u32);
        for (i, c) in s.chars().rev().enumerate() {
            v.set(i as u32, Logic::from_char(c)?);
        }
        Some(v)
    }
}

impl fmt::Display for LogicVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..self.width).rev() {
            write!(f, "{}", self.get(i))?;
        }
        Ok(())
    }
}

impl fmt::Debug for LogicVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogicVec({self})")
    }
}

impl BitAnd for &LogicVec {
    type Output = LogicVec;

    fn bitand(self, rhs: Self) -> LogicVec {
        assert_eq!(self.width, rhs.width, "LogicVec width mismatch in AND");
        let mut result = LogicVec::new(self.width);
        for i in 0..self.width {
            result.set(i, self.get(i) & rhs.get(i));
        }
        result
    }
}

impl BitOr for &LogicVec {
    type Output = LogicVec;

    fn bitor(self, rhs: Self) -> LogicVec {
        assert_eq!(self.width, rhs.width, "LogicVec width mismatch in OR");
        let mut result = LogicVec::new(self.width);
        for i in 0..self.width {
            result.set(i, self.get(i) | rhs.get(i));
        }
        result
    }
}

impl BitXor for &LogicVec {
    type Output = LogicVec;

    fn bitxor(self, rhs: Self) -> LogicVec {
        assert_eq!(self.width, rhs.width, "LogicVec width mismatch in XOR");
        let mut result = LogicVec::new(self.width);
        for i in 0..self.width {
            result.set(i, self.get(i) ^ rhs.get(i));
        }
        result
    }
}

impl Not for &LogicVec {
    type Output = LogicVec;

    fn not(self) -> LogicVec {
        let mut result = LogicVec::new(self.width);
        for i in 0..self.width {
            result.set(i, !self.get(i));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_roundtrip() {
        let mut v = LogicVec::new(4);
        v.set(1, Logic::One);
        v.set(2, Logic::X);
        v.set(3, Logic::Z);
        assert_eq!(v.get(0), Logic::Zero);
        assert_eq!(v.get(1), Logic::One);
        assert_eq!(v.get(2), Logic::X);
        assert_eq!(v.get(3), Logic::Z);
    }

    #[test]
    fn u64_roundtrip() {
        let v = LogicVec::from_u64(0xa5, 8);
        assert_eq!(format!("{v}"), "10100101");
        assert_eq!(v.to_u64(), Some(0xa5));
    }

    #[test]
    fn to_u64_rejects_unknowns() {
        let v = LogicVec::from_binary_str("1X0").unwrap();
        assert_eq!(v.to_u64(), None);
        assert!(v.has_unknown());
    }

    #[test]
    fn to_i64_sign_extends() {
        let v = LogicVec::from_u64(0b1111, 4);
        assert_eq!(v.to_i64(), Some(-1));
        let v = LogicVec::from_u64(0b0111, 4);
        assert_eq!(v.to_i64(), Some(7));
    }

    #[test]
    fn all_constructors() {
        assert!(LogicVec::all_zero(5).is_all_zero());
        assert!(LogicVec::all_one(5).is_all_one());
        assert!(LogicVec::all_x(5).has_unknown());
        assert_eq!(LogicVec::from_bool(true).to_u64(), Some(1));
    }

    #[test]
    fn binary_str_parse() {
        let v = LogicVec::from_binary_str("10XZ").unwrap();
        assert_eq!(v.width(), 4);
        assert_eq!(v.get(3), Logic::One);
        assert_eq!(v.get(0), Logic::Z);
        assert!(LogicVec::from_binary_str("10A").is_none());
    }

    #[test]
    fn bitwise_ops() {
        let a = LogicVec::from_binary_str("1100").unwrap();
        let b = LogicVec::from_binary_str("1010").unwrap();
        assert_eq!(format!("{}", &a & &b), "1000");
        assert_eq!(format!("{}", &a | &b), "1110");
        assert_eq!(format!("{}", &a ^ &b), "0110");
        assert_eq!(format!("{}", !&a), "0011");
    }

    #[test]
    fn wide_vector_spans_words() {
        let mut v = LogicVec::new(100);
        v.set(99, Logic::Z);
        v.set(31, Logic::One);
        v.set(32, Logic::X);
        assert_eq!(v.get(99), Logic::Z);
        assert_eq!(v.get(31), Logic::One);
        assert_eq!(v.get(32), Logic::X);
    }

    #[test]
    fn serde_roundtrip() {
        let v = LogicVec::from_binary_str("10XZ1010").unwrap();
        let json = serde_json::to_string(&v).unwrap();
        let back: LogicVec = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}
