//! Bit-level signal references.
//!
//! A [`SigBit`] names a single bit of a wire or a constant logic value,
//! and a [`SigSpec`] is an ordered list of bits. [`SigMap`] maintains
//! equivalence classes of bits induced by module-level connections, so
//! that two differently-named aliases of the same net compare equal
//! after mapping.

use crate::ids::WireId;
use serde::{Deserialize, Serialize};
use silica_common::Logic;
use std::collections::HashMap;

/// A single bit of a signal: one bit of a wire, or a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SigBit {
    /// Bit `offset` of the given wire.
    Wire {
        /// The wire being referenced.
        wire: WireId,
        /// Bit offset into the wire, starting at 0.
        offset: u32,
    },
    /// A constant logic value.
    Const(Logic),
}

impl SigBit {
    /// Returns the wire this bit belongs to, if it is not a constant.
    pub fn wire(self) -> Option<WireId> {
        match self {
            SigBit::Wire { wire, .. } => Some(wire),
            SigBit::Const(_) => None,
        }
    }
}

/// An ordered sequence of signal bits, least significant first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SigSpec(pub Vec<SigBit>);

impl SigSpec {
    /// Creates an empty signal.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Creates a signal covering all `width` bits of a wire.
    pub fn from_wire(wire: WireId, width: u32) -> Self {
        Self((0..width).map(|offset| SigBit::Wire { wire, offset }).collect())
    }

    /// Width of the signal in bits.
    pub fn width(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the signal has no bits.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the bits, least significant first.
    pub fn bits(&self) -> impl Iterator<Item = SigBit> + '_ {
        self.0.iter().copied()
    }

    /// Returns `true` if any bit references the given wire.
    pub fn references_wire(&self, wire: WireId) -> bool {
        self.0.iter().any(|b| b.wire() == Some(wire))
    }
}

/// Union-find over signal bits.
///
/// Each module-level connection `lhs = rhs` merges the corresponding
/// bit pairs into one equivalence class. [`SigMap::map`] then rewrites
/// any bit to its class representative.
#[derive(Debug, Default)]
pub struct SigMap {
    parent: HashMap<SigBit, SigBit>,
}

impl SigMap {
    /// Creates an empty map where every bit is its own representative.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges the bit classes of two equal-width signals.
    ///
    /// Extra bits on the longer side are ignored, matching the semantics
    /// of a partial connection.
    pub fn add(&mut self, lhs: &SigSpec, rhs: &SigSpec) {
        for (&a, &b) in lhs.0.iter().zip(rhs.0.iter()) {
            self.union(a, b);
        }
    }

    /// Returns the class representative of a single bit.
    pub fn map_bit(&mut self, bit: SigBit) -> SigBit {
        self.find(bit)
    }

    /// Rewrites every bit of a signal to its class representative.
    pub fn map(&mut self, sig: &SigSpec) -> SigSpec {
        SigSpec(sig.0.iter().map(|&b| self.find(b)).collect())
    }

    fn find(&mut self, bit: SigBit) -> SigBit {
        let mut root = bit;
        while let Some(&p) = self.parent.get(&root) {
            root = p;
        }
        // Path compression.
        let mut cur = bit;
        while cur != root {
            let next = self.parent[&cur];
            self.parent.insert(cur, root);
            cur = next;
        }
        root
    }

    fn union(&mut self, a: SigBit, b: SigBit) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        // Constants never lose their identity to a wire bit.
        match (ra, rb) {
            (SigBit::Wire { .. }, SigBit::Const(_)) => {
                self.parent.insert(ra, rb);
            }
            _ => {
                self.parent.insert(rb, ra);
            }
        }
    }
}
