//! Node sorts (types).

use serde::{Deserialize, Serialize};
use std::fmt;

/// The sort of a functional IR node.
///
/// A node is either a bitvector of some width or a memory of some shape;
/// never both. Signedness is not tracked: operations that care about
/// interpretation (division, comparison, shifts) come in explicitly signed
/// and unsigned variants.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Sort {
    /// A bitvector of the given width.
    Signal(u32),
    /// A memory shape.
    Memory {
        /// Number of address bits.
        addr_width: u32,
        /// Number of data bits per entry.
        data_width: u32,
    },
}

impl Sort {
    /// Returns `true` if this is a bitvector sort.
    pub fn is_signal(self) -> bool {
        matches!(self, Sort::Signal(_))
    }

    /// Returns `true` if this is a memory sort.
    pub fn is_memory(self) -> bool {
        matches!(self, Sort::Memory { .. })
    }

    /// Returns the width of a bitvector sort.
    ///
    /// # Panics
    ///
    /// Panics if this is a memory sort.
    pub fn width(self) -> u32 {
        match self {
            Sort::Signal(width) => width,
            Sort::Memory { .. } => panic!("width() called on a memory sort"),
        }
    }

    /// Returns the address width of a memory sort.
    ///
    /// # Panics
    ///
    /// Panics if this is a bitvector sort.
    pub fn addr_width(self) -> u32 {
        match self {
            Sort::Memory { addr_width, .. } => addr_width,
            Sort::Signal(_) => panic!("addr_width() called on a signal sort"),
        }
    }

    /// Returns the data width of a memory sort.
    ///
    /// # Panics
    ///
    /// Panics if this is a bitvector sort.
    pub fn data_width(self) -> u32 {
        match self {
            Sort::Memory { data_width, .. } => data_width,
            Sort::Signal(_) => panic!("data_width() called on a signal sort"),
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sort::Signal(width) => write!(f, "bit[{width}]"),
            Sort::Memory {
                addr_width,
                data_width,
            } => write!(f, "memory[{addr_width}, {data_width}]"),
        }
    }
}

/// Smallest number of bits that can index `width` distinct positions.
///
/// This is the required shift-amount width for shift operations.
pub fn ceil_log2(width: u32) -> u32 {
    if width <= 1 {
        0
    } else {
        32 - (width - 1).leading_zeros()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_accessors() {
        let s = Sort::Signal(8);
        assert!(s.is_signal());
        assert!(!s.is_memory());
        assert_eq!(s.width(), 8);
    }

    #[test]
    fn memory_accessors() {
        let m = Sort::Memory {
            addr_width: 4,
            data_width: 16,
        };
        assert!(m.is_memory());
        assert_eq!(m.addr_width(), 4);
        assert_eq!(m.data_width(), 16);
    }

    #[test]
    #[should_panic(expected = "memory sort")]
    fn width_of_memory_panics() {
        Sort::Memory {
            addr_width: 4,
            data_width: 16,
        }
        .width();
    }

    #[test]
    fn ceil_log2_values() {
        assert_eq!(ceil_log2(1), 0);
        assert_eq!(ceil_log2(2), 1);
        assert_eq!(ceil_log2(3), 2);
        assert_eq!(ceil_log2(8), 3);
        assert_eq!(ceil_log2(9), 4);
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", Sort::Signal(4)), "bit[4]");
        let m = Sort::Memory {
            addr_width: 2,
            data_width: 8,
        };
        assert_eq!(format!("{m}"), "memory[2, 8]");
    }

    #[test]
    fn serde_roundtrip() {
        let s = Sort::Signal(12);
        let json = serde_json::to_string(&s).unwrap();
        let back: Sort = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
    }
}
