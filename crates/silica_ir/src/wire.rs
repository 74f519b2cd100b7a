//! Wire definitions.

use crate::ids::WireId;
use crate::Attributes;
use serde::{Deserialize, Serialize};
use silica_common::Ident;

/// A named multi-bit wire within a module.
///
/// Wires that form the module's external interface carry the `port_input`
/// and/or `port_output` flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wire {
    /// The unique ID of this wire within its module.
    pub id: WireId,
    /// The wire name (escaped form).
    pub name: Ident,
    /// Width in bits.
    pub width: u32,
    /// `true` if this wire is an input port of the module.
    pub port_input: bool,
    /// `true` if this wire is an output port of the module.
    pub port_output: bool,
    /// Attributes attached to this wire.
    pub attributes: Attributes,
}

impl Wire {
    /// Returns `true` if this wire is an input or output port.
    pub fn is_port(&self) -> bool {
        self.port_input || self.port_output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn port_flags() {
        let mut w = Wire {
            id: WireId::from_raw(0),
            name: Ident::from_raw(0),
            width: 8,
            port_input: false,
            port_output: false,
            attributes: BTreeMap::new(),
        };
        assert!(!w.is_port());
        w.port_output = true;
        assert!(w.is_port());
    }
}
