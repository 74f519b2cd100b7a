//! Cell definitions.

use crate::ids::CellId;
use crate::sigspec::SigSpec;
use crate::{Attributes, Const};
use serde::{Deserialize, Serialize};
use silica_common::Ident;
use std::collections::BTreeMap;

/// Direction of a cell port from the cell's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortDirection {
    /// The cell reads this port.
    Input,
    /// The cell drives this port.
    Output,
    /// The port is bidirectional.
    InOut,
}

/// A connection from a cell port to a signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    /// The port name on the cell (escaped form).
    pub port: Ident,
    /// Direction of the port.
    pub direction: PortDirection,
    /// The signal connected to the port.
    pub signal: SigSpec,
}

/// An instance of a cell type within a module.
///
/// The cell type is either a generated name for a built-in primitive
/// (`$add`, `$mux`) or the public name of another module in the design,
/// in which case the cell is a hierarchical instantiation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    /// The unique ID of this cell within its module.
    pub id: CellId,
    /// The instance name (escaped form).
    pub name: Ident,
    /// The cell type name (escaped form).
    pub ty: Ident,
    /// Cell parameters.
    pub parameters: BTreeMap<Ident, Const>,
    /// Attributes attached to this cell.
    pub attributes: Attributes,
    /// Port connections.
    pub connections: Vec<Connection>,
}

impl Cell {
    /// Returns the connection for the given port, if present.
    pub fn connection(&self, port: Ident) -> Option<&Connection> {
        self.connections.iter().find(|c| c.port == port)
    }

    /// Returns `true` if any port of this cell reads from the outside.
    pub fn has_inputs(&self) -> bool {
        self.connections
            .iter()
            .any(|c| matches!(c.direction, PortDirection::Input | PortDirection::InOut))
    }
}
