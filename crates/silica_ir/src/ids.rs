//! Opaque ID newtypes for netlist entities.

use crate::arena::ArenaId;
use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl ArenaId for $name {
            fn from_raw(index: u32) -> Self {
                Self(index)
            }

            fn as_raw(self) -> u32 {
                self.0
            }
        }
    };
}

define_id!(
    /// Opaque, copyable ID for a module in the design.
    ModuleId
);

define_id!(
    /// Opaque, copyable ID for a wire within a module.
    WireId
);

define_id!(
    /// Opaque, copyable ID for a cell within a module.
    CellId
);

define_id!(
    /// Opaque, copyable ID for a memory within a module.
    MemoryId
);

define_id!(
    /// Opaque, copyable ID for a process within a module.
    ProcessId
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn roundtrip_and_equality() {
        let a = WireId::from_raw(3);
        assert_eq!(a.as_raw(), 3);
        assert_eq!(a, WireId::from_raw(3));
        assert_ne!(a, WireId::from_raw(4));
    }

    #[test]
    fn hashable() {
        let mut set = HashSet::new();
        set.insert(CellId::from_raw(1));
        set.insert(CellId::from_raw(1));
        set.insert(CellId::from_raw(2));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn serde_roundtrip() {
        let id = MemoryId::from_raw(9);
        let json = serde_json::to_string(&id).unwrap();
        let back: MemoryId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
