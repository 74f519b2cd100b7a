//! Module definitions.

use crate::arena::Arena;
use crate::cell::Cell;
use crate::ids::{CellId, MemoryId, ProcessId, WireId};
use crate::memory::Memory;
use crate::process::Process;
use crate::sigspec::SigSpec;
use crate::wire::Wire;
use crate::Attributes;
use serde::{Deserialize, Serialize};
use silica_common::{Ident, Interner};
use std::collections::HashMap;

/// A hardware module: a named container of wires, cells, memories and
/// processes plus a list of direct wire-to-wire connections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    /// The module name (escaped form).
    pub name: Ident,
    /// Attributes attached to this module.
    pub attributes: Attributes,
    /// All wires in this module.
    pub wires: Arena<WireId, Wire>,
    /// All cells in this module.
    pub cells: Arena<CellId, Cell>,
    /// All memories in this module.
    pub memories: Arena<MemoryId, Memory>,
    /// All processes in this module.
    pub processes: Arena<ProcessId, Process>,
    /// Direct connections `(lhs, rhs)` between signals.
    pub connections: Vec<(SigSpec, SigSpec)>,
    wire_names: HashMap<Ident, WireId>,
    cell_names: HashMap<Ident, CellId>,
    memory_names: HashMap<Ident, MemoryId>,
    process_names: HashMap<Ident, ProcessId>,
}

impl Module {
    /// Creates a new empty module with the given name.
    pub fn new(name: Ident) -> Self {
        Self {
            name,
            attributes: Attributes::new(),
            wires: Arena::new(),
            cells: Arena::new(),
            memories: Arena::new(),
            processes: Arena::new(),
            connections: Vec::new(),
            wire_names: HashMap::new(),
            cell_names: HashMap::new(),
            memory_names: HashMap::new(),
            process_names: HashMap::new(),
        }
    }

    /// Adds a wire and returns its ID.
    ///
    /// # Panics
    ///
    /// Panics if a wire with the same name already exists.
    pub fn add_wire(&mut self, name: Ident, width: u32) -> WireId {
        assert!(
            !self.wire_names.contains_key(&name),
            "duplicate wire name in module"
        );
        let id = self.wires.next_id();
        self.wires.alloc(Wire {
            id,
            name,
            width,
            port_input: false,
            port_output: false,
            attributes: Attributes::new(),
        });
        self.wire_names.insert(name, id);
        id
    }

    /// Adds a cell and returns its ID.
    ///
    /// # Panics
    ///
    /// Panics if a cell with the same name already exists.
    pub fn add_cell(&mut self, name: Ident, ty: Ident) -> CellId {
        assert!(
            !self.cell_names.contains_key(&name),
            "duplicate cell name in module"
        );
        let id = self.cells.next_id();
        self.cells.alloc(Cell {
            id,
            name,
            ty,
            parameters: Attributes::new(),
            attributes: Attributes::new(),
            connections: Vec::new(),
        });
        self.cell_names.insert(name, id);
        id
    }

    /// Adds a memory and returns its ID.
    ///
    /// # Panics
    ///
    /// Panics if a memory with the same name already exists.
    pub fn add_memory(&mut self, name: Ident, width: u32, size: u32) -> MemoryId {
        assert!(
            !self.memory_names.contains_key(&name),
            "duplicate memory name in module"
        );
        let id = self.memories.next_id();
        self.memories.alloc(Memory {
            id,
            name,
            width,
            size,
            attributes: Attributes::new(),
        });
        self.memory_names.insert(name, id);
        id
    }

    /// Adds a process and returns its ID.
    ///
    /// # Panics
    ///
    /// Panics if a process with the same name already exists.
    pub fn add_process(&mut self, name: Ident) -> ProcessId {
        assert!(
            !self.process_names.contains_key(&name),
            "duplicate process name in module"
        );
        let id = self.processes.next_id();
        self.processes.alloc(Process {
            id,
            name,
            attributes: Attributes::new(),
        });
        self.process_names.insert(name, id);
        id
    }

    /// Adds a direct connection between two signals.
    pub fn connect(&mut self, lhs: SigSpec, rhs: SigSpec) {
        self.connections.push((lhs, rhs));
    }

    /// Looks up a wire by name.
    pub fn wire(&self, name: Ident) -> Option<&Wire> {
        self.wire_names.get(&name).map(|&id| &self.wires[id])
    }

    /// Looks up a cell by name.
    pub fn cell(&self, name: Ident) -> Option<&Cell> {
        self.cell_names.get(&name).map(|&id| &self.cells[id])
    }

    /// Looks up a memory by name.
    pub fn memory(&self, name: Ident) -> Option<&Memory> {
        self.memory_names.get(&name).map(|&id| &self.memories[id])
    }

    /// Looks up a process by name.
    pub fn process(&self, name: Ident) -> Option<&Process> {
        self.process_names.get(&name).map(|&id| &self.processes[id])
    }

    /// Returns `true` if any member (wire, cell, memory or process) has
    /// the given name.
    pub fn has_member(&self, name: Ident) -> bool {
        self.wire_names.contains_key(&name)
            || self.cell_names.contains_key(&name)
            || self.memory_names.contains_key(&name)
            || self.process_names.contains_key(&name)
    }

    /// Iterates over the names of all members of this module.
    pub fn member_names(&self) -> impl Iterator<Item = Ident> + '_ {
        self.wires
            .values()
            .map(|w| w.name)
            .chain(self.cells.values().map(|c| c.name))
            .chain(self.memories.values().map(|m| m.name))
            .chain(self.processes.values().map(|p| p.name))
    }

    /// Total number of members of this module.
    pub fn member_count(&self) -> usize {
        self.wires.len() + self.cells.len() + self.memories.len() + self.processes.len()
    }

    /// Returns `true` if this module is a black box or white box, i.e.
    /// carries a truthy `\blackbox` or `\whitebox` attribute.
    pub fn is_blackbox(&self, interner: &Interner) -> bool {
        for key in ["\\blackbox", "\\whitebox"] {
            if let Some(id) = interner.get(key) {
                if self.attributes.get(&id).is_some_and(|v| v.is_truthy()) {
                    return true;
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Const;

    #[test]
    fn add_and_lookup_members() {
        let interner = Interner::new();
        let mut module = Module::new(interner.intern_id("top"));
        let clk = interner.intern_id("clk");
        module.add_wire(clk, 1);
        let add = interner.get_or_intern("$add$1");
        module.add_cell(add, interner.get_or_intern("$add"));

        assert_eq!(module.wire(clk).map(|w| w.width), Some(1));
        assert!(module.cell(add).is_some());
        assert!(module.has_member(clk));
        assert!(!module.has_member(interner.intern_id("nope")));
        assert_eq!(module.member_count(), 2);
    }

    #[test]
    #[should_panic(expected = "duplicate wire name")]
    fn duplicate_wire_panics() {
        let interner = Interner::new();
        let mut module = Module::new(interner.intern_id("top"));
        let name = interner.intern_id("w");
        module.add_wire(name, 1);
        module.add_wire(name, 1);
    }

    #[test]
    fn blackbox_detection() {
        let interner = Interner::new();
        let mut module = Module::new(interner.intern_id("bb"));
        assert!(!module.is_blackbox(&interner));
        module
            .attributes
            .insert(interner.intern_id("blackbox"), Const::Int(1));
        assert!(module.is_blackbox(&interner));
    }

    #[test]
    fn falsy_blackbox_attribute() {
        let interner = Interner::new();
        let mut module = Module::new(interner.intern_id("bb"));
        module
            .attributes
            .insert(interner.intern_id("blackbox"), Const::Int(0));
        assert!(!module.is_blackbox(&interner));
    }

    #[test]
    fn member_names_cover_all_kinds() {
        let interner = Interner::new();
        let mut module = Module::new(interner.intern_id("top"));
        module.add_wire(interner.intern_id("w"), 1);
        module.add_cell(interner.intern_id("c"), interner.get_or_intern("$not"));
        module.add_memory(interner.intern_id("m"), 8, 256);
        module.add_process(interner.get_or_intern("$proc$1"));
        assert_eq!(module.member_names().count(), 4);
    }
}
