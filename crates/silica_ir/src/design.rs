//! The top-level design database.

use crate::arena::Arena;
use crate::ids::ModuleId;
use crate::module::Module;
use crate::selection::Selection;
use silica_common::{Ident, Interner};
use std::collections::HashMap;

/// A complete design: a set of modules plus the selection state that
/// commands operate on.
///
/// The selection stack always holds at least one entry; the bottom of
/// the stack starts out as a full selection. Saved selections live in a
/// separate name-keyed store and are referenced as `@name`.
#[derive(Debug)]
pub struct Design {
    modules: Arena<ModuleId, Module>,
    module_names: HashMap<Ident, ModuleId>,
    selection_stack: Vec<Selection>,
    selection_vars: HashMap<Ident, Selection>,
    /// The currently active module, if a `module` scope is open.
    pub selected_active_module: Option<Ident>,
}

impl Design {
    /// Creates an empty design with a full selection on the stack.
    pub fn new() -> Self {
        Self {
            modules: Arena::new(),
            module_names: HashMap::new(),
            selection_stack: vec![Selection::full()],
            selection_vars: HashMap::new(),
            selected_active_module: None,
        }
    }

    /// Adds a module to the design and returns its ID.
    ///
    /// # Panics
    ///
    /// Panics if a module with the same name already exists.
    pub fn add_module(&mut self, module: Module) -> ModuleId {
        assert!(
            !self.module_names.contains_key(&module.name),
            "duplicate module name in design"
        );
        let name = module.name;
        let id = self.modules.alloc(module);
        self.module_names.insert(name, id);
        id
    }

    /// Looks up a module by name.
    pub fn module(&self, name: Ident) -> Option<&Module> {
        self.module_names.get(&name).map(|&id| &self.modules[id])
    }

    /// Looks up a module by name, mutably.
    pub fn module_mut(&mut self, name: Ident) -> Option<&mut Module> {
        let id = *self.module_names.get(&name)?;
        Some(&mut self.modules[id])
    }

    /// Returns `true` if a module with the given name exists.
    pub fn has_module(&self, name: Ident) -> bool {
        self.module_names.contains_key(&name)
    }

    /// Iterates over all modules in the design.
    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    /// Number of modules in the design.
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// The current (topmost) selection.
    pub fn selection(&self) -> &Selection {
        self.selection_stack
            .last()
            .expect("selection stack must never be empty")
    }

    /// The current (topmost) selection, mutably.
    pub fn selection_mut(&mut self) -> &mut Selection {
        self.selection_stack
            .last_mut()
            .expect("selection stack must never be empty")
    }

    /// Pushes a new selection onto the stack.
    pub fn push_selection(&mut self, selection: Selection) {
        self.selection_stack.push(selection);
    }

    /// Pushes a copy of the current selection onto the stack.
    pub fn push_current_selection(&mut self) {
        let top = self.selection().clone();
        self.selection_stack.push(top);
    }

    /// Pops the topmost selection off the stack and returns it.
    ///
    /// # Panics
    ///
    /// Panics if only the base selection remains.
    pub fn pop_selection(&mut self) -> Selection {
        assert!(
            self.selection_stack.len() > 1,
            "cannot pop the base selection"
        );
        self.selection_stack.pop().unwrap()
    }

    /// Depth of the selection stack.
    pub fn selection_stack_depth(&self) -> usize {
        self.selection_stack.len()
    }

    /// Stores a saved selection under `name`.
    pub fn save_selection(&mut self, name: Ident, selection: Selection) {
        self.selection_vars.insert(name, selection);
    }

    /// Looks up a saved selection by name.
    pub fn saved_selection(&self, name: Ident) -> Option<&Selection> {
        self.selection_vars.get(&name)
    }

    /// Removes a saved selection, returning `true` if it existed.
    pub fn remove_saved_selection(&mut self, name: Ident) -> bool {
        self.selection_vars.remove(&name).is_some()
    }

    /// Iterates over the modules covered by the current selection.
    pub fn selected_modules<'a>(
        &'a self,
        interner: &'a Interner,
    ) -> impl Iterator<Item = &'a Module> {
        self.modules()
            .filter(move |m| self.selection().selected_module(self, interner, m.name))
    }

    /// Iterates over the modules every member of which is selected.
    pub fn selected_whole_modules<'a>(
        &'a self,
        interner: &'a Interner,
    ) -> impl Iterator<Item = &'a Module> {
        self.modules()
            .filter(move |m| self.selection().selected_whole_module(self, interner, m.name))
    }
}

impl Default for Design {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_selection_is_full() {
        let design = Design::new();
        assert_eq!(design.selection_stack_depth(), 1);
        assert!(design.selection().selects_all());
    }

    #[test]
    fn push_pop_selection() {
        let mut design = Design::new();
        design.push_selection(Selection::empty(false));
        assert!(design.selection().is_empty());
        let popped = design.pop_selection();
        assert!(popped.is_empty());
        assert!(design.selection().selects_all());
    }

    #[test]
    #[should_panic(expected = "cannot pop the base selection")]
    fn popping_base_selection_panics() {
        let mut design = Design::new();
        design.pop_selection();
    }

    #[test]
    fn saved_selections() {
        let interner = Interner::new();
        let mut design = Design::new();
        let name = interner.get_or_intern("\\mysel");
        assert!(design.saved_selection(name).is_none());
        design.save_selection(name, Selection::empty(false));
        assert!(design.saved_selection(name).is_some());
        assert!(design.remove_saved_selection(name));
        assert!(!design.remove_saved_selection(name));
    }

    #[test]
    fn selected_modules_respects_selection() {
        let interner = Interner::new();
        let mut design = Design::new();
        design.add_module(Module::new(interner.intern_id("a")));
        design.add_module(Module::new(interner.intern_id("b")));
        assert_eq!(design.selected_modules(&interner).count(), 2);

        let mut sel = Selection::empty(false);
        sel.select_module(interner.intern_id("a"));
        design.push_selection(sel);
        assert_eq!(design.selected_modules(&interner).count(), 1);
    }
}
