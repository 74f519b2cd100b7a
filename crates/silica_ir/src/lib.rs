//! The Silica netlist database.
//!
//! A [`Design`] is a set of hierarchical [`Module`]s; each module contains
//! wires, cells, memories, and processes sharing a single member namespace.
//! The database also owns the design-wide selection state: a stack of
//! [`Selection`] values scoping nested command execution, a registry of
//! named selections, and the optional active-module context.

#![warn(missing_docs)]

pub mod arena;
pub mod cell;
pub mod const_value;
pub mod design;
pub mod ids;
pub mod memory;
pub mod module;
pub mod process;
pub mod selection;
pub mod sigspec;
pub mod wire;

pub use arena::{Arena, ArenaId};
pub use cell::{Cell, Connection, PortDirection};
pub use const_value::Const;
pub use design::Design;
pub use ids::{CellId, MemoryId, ModuleId, ProcessId, WireId};
pub use memory::Memory;
pub use module::Module;
pub use process::Process;
pub use selection::Selection;
pub use sigspec::{SigBit, SigMap, SigSpec};
pub use wire::Wire;

use silica_common::Ident;
use std::collections::BTreeMap;

/// Attribute table attached to modules and module members.
///
/// Keys are interned attribute names (escaped form); BTree ordering keeps
/// iteration deterministic.
pub type Attributes = BTreeMap<Ident, Const>;
