//! Selection sets.
//!
//! A [`Selection`] describes a subset of a design: a set of fully
//! selected modules plus, per module, a set of individually selected
//! members. Two special states avoid materializing every name: a *full*
//! selection covers every non-box module, and a *complete* selection
//! covers every module including boxes.
//!
//! Box modules (those carrying a truthy `\blackbox` or `\whitebox`
//! attribute) are excluded from membership queries unless the selection
//! was built with box visibility enabled.

use crate::design::Design;
use serde::{Deserialize, Serialize};
use silica_common::{Ident, Interner};
use std::collections::{BTreeMap, BTreeSet};

/// A subset of the modules and module members of a design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Selects every non-box module in the design.
    pub full_selection: bool,
    /// Selects every module in the design, boxes included.
    pub complete_selection: bool,
    /// Whether membership queries may report box modules.
    pub selects_boxes: bool,
    /// Names of fully selected modules.
    pub selected_modules: BTreeSet<Ident>,
    /// Names of individually selected members, per module.
    pub selected_members: BTreeMap<Ident, BTreeSet<Ident>>,
}

impl Selection {
    /// Creates a new selection.
    ///
    /// With `selects_all` set the selection starts out covering the whole
    /// design; `selects_boxes` controls whether box modules are visible.
    pub fn new(selects_all: bool, selects_boxes: bool) -> Self {
        Self {
            full_selection: selects_all && !selects_boxes,
            complete_selection: selects_all && selects_boxes,
            selects_boxes,
            selected_modules: BTreeSet::new(),
            selected_members: BTreeMap::new(),
        }
    }

    /// A selection covering every non-box module.
    pub fn full() -> Self {
        Self::new(true, false)
    }

    /// A selection covering nothing.
    pub fn empty(selects_boxes: bool) -> Self {
        Self::new(false, selects_boxes)
    }

    /// Returns `true` if the selection covers the whole design (with or
    /// without boxes).
    pub fn selects_all(&self) -> bool {
        self.full_selection || self.complete_selection
    }

    /// Returns `true` if nothing is selected.
    pub fn is_empty(&self) -> bool {
        !self.selects_all() && self.selected_modules.is_empty() && self.selected_members.is_empty()
    }

    /// Clears the selection down to nothing, keeping the box policy.
    pub fn clear(&mut self) {
        self.full_selection = false;
        self.complete_selection = false;
        self.selected_modules.clear();
        self.selected_members.clear();
    }

    /// Marks the whole design as selected, respecting the box policy.
    pub fn select_all(&mut self) {
        self.selected_modules.clear();
        self.selected_members.clear();
        if self.selects_boxes {
            self.complete_selection = true;
        } else {
            self.full_selection = true;
        }
    }

    /// Adds a whole module to the selection.
    pub fn select_module(&mut self, module: Ident) {
        if self.selects_all() {
            return;
        }
        self.selected_members.remove(&module);
        self.selected_modules.insert(module);
    }

    /// Adds a single member of a module to the selection.
    pub fn select_member(&mut self, module: Ident, member: Ident) {
        if self.selects_all() || self.selected_modules.contains(&module) {
            return;
        }
        self.selected_members.entry(module).or_default().insert(member);
    }

    fn boxed(design: &Design, interner: &Interner, module: Ident) -> bool {
        design
            .module(module)
            .is_some_and(|m| m.is_blackbox(interner))
    }

    /// Returns `true` if the module is fully or partially selected.
    pub fn selected_module(&self, design: &Design, interner: &Interner, module: Ident) -> bool {
        if !self.selects_boxes && Self::boxed(design, interner, module) {
            return false;
        }
        if self.selects_all() {
            return true;
        }
        self.selected_modules.contains(&module) || self.selected_members.contains_key(&module)
    }

    /// Returns `true` if every member of the module is selected.
    pub fn selected_whole_module(
        &self,
        design: &Design,
        interner: &Interner,
        module: Ident,
    ) -> bool {
        if !self.selects_boxes && Self::boxed(design, interner, module) {
            return false;
        }
        if self.selects_all() {
            return true;
        }
        self.selected_modules.contains(&module)
    }

    /// Returns `true` if the given member of the module is selected.
    pub fn selected_member(
        &self,
        design: &Design,
        interner: &Interner,
        module: Ident,
        member: Ident,
    ) -> bool {
        if !self.selects_boxes && Self::boxed(design, interner, module) {
            return false;
        }
        if self.selects_all() {
            return true;
        }
        if self.selected_modules.contains(&module) {
            return true;
        }
        self.selected_members
            .get(&module)
            .is_some_and(|members| members.contains(&member))
    }

    /// Normalizes the selection against a design.
    ///
    /// Drops names that no longer exist, promotes modules whose members
    /// are all individually selected to whole-module selections, and
    /// collapses a selection covering every module back to the full or
    /// complete form. Idempotent.
    pub fn optimize(&mut self, design: &Design, interner: &Interner) {
        if self.selects_all() {
            self.selected_modules.clear();
            self.selected_members.clear();
            return;
        }

        self.selected_modules
            .retain(|&name| design.module(name).is_some());
        let whole = &self.selected_modules;
        self.selected_members
            .retain(|name, _| design.module(*name).is_some() && !whole.contains(name));

        let mut promote = Vec::new();
        for (&mod_name, members) in &mut self.selected_members {
            if let Some(module) = design.module(mod_name) {
                members.retain(|&m| module.has_member(m));
                if !members.is_empty() && members.len() == module.member_count() {
                    promote.push(mod_name);
                }
            }
        }
        for mod_name in promote {
            self.selected_members.remove(&mod_name);
            self.selected_modules.insert(mod_name);
        }
        self.selected_members.retain(|_, members| !members.is_empty());

        let eligible = design
            .modules()
            .filter(|m| self.selects_boxes || !m.is_blackbox(interner))
            .count();
        if eligible > 0 && self.selected_modules.len() == eligible && self.selected_members.is_empty()
        {
            self.select_all();
        }
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::full()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::Module;

    fn design_with_two_modules(interner: &Interner) -> Design {
        let mut design = Design::new();
        let mut top = Module::new(interner.intern_id("top"));
        top.add_wire(interner.intern_id("clk"), 1);
        top.add_wire(interner.intern_id("out"), 8);
        design.add_module(top);
        design.add_module(Module::new(interner.intern_id("sub")));
        design
    }

    #[test]
    fn full_selection_selects_everything() {
        let interner = Interner::new();
        let design = design_with_two_modules(&interner);
        let sel = Selection::full();
        let top = interner.intern_id("top");
        assert!(sel.selected_module(&design, &interner, top));
        assert!(sel.selected_member(&design, &interner, top, interner.intern_id("clk")));
    }

    #[test]
    fn empty_selection_selects_nothing() {
        let interner = Interner::new();
        let design = design_with_two_modules(&interner);
        let sel = Selection::empty(false);
        assert!(sel.is_empty());
        assert!(!sel.selected_module(&design, &interner, interner.intern_id("top")));
    }

    #[test]
    fn member_selection_is_partial() {
        let interner = Interner::new();
        let design = design_with_two_modules(&interner);
        let top = interner.intern_id("top");
        let clk = interner.intern_id("clk");
        let out = interner.intern_id("out");

        let mut sel = Selection::empty(false);
        sel.select_member(top, clk);
        assert!(sel.selected_module(&design, &interner, top));
        assert!(!sel.selected_whole_module(&design, &interner, top));
        assert!(sel.selected_member(&design, &interner, top, clk));
        assert!(!sel.selected_member(&design, &interner, top, out));
    }

    #[test]
    fn whole_module_shadows_members() {
        let interner = Interner::new();
        let top = interner.intern_id("top");
        let clk = interner.intern_id("clk");

        let mut sel = Selection::empty(false);
        sel.select_member(top, clk);
        sel.select_module(top);
        assert!(sel.selected_members.is_empty());
        // Adding a member of a fully selected module is a no-op.
        sel.select_member(top, clk);
        assert!(sel.selected_members.is_empty());
    }

    #[test]
    fn boxes_hidden_without_box_policy() {
        let interner = Interner::new();
        let mut design = Design::new();
        let mut bb = Module::new(interner.intern_id("bb"));
        bb.attributes
            .insert(interner.intern_id("blackbox"), crate::Const::Int(1));
        design.add_module(bb);

        let name = interner.intern_id("bb");
        let sel = Selection::full();
        assert!(!sel.selected_module(&design, &interner, name));

        let all = Selection::new(true, true);
        assert!(all.selected_module(&design, &interner, name));
    }

    #[test]
    fn optimize_promotes_and_collapses() {
        let interner = Interner::new();
        let design = design_with_two_modules(&interner);
        let top = interner.intern_id("top");
        let sub = interner.intern_id("sub");

        let mut sel = Selection::empty(false);
        sel.select_member(top, interner.intern_id("clk"));
        sel.select_member(top, interner.intern_id("out"));
        sel.select_module(sub);
        sel.optimize(&design, &interner);
        // All members of `top` are selected, and `sub` is empty but fully
        // selected, so the selection collapses to full.
        assert!(sel.selects_all());
        assert!(sel.selected_modules.is_empty());
    }

    #[test]
    fn optimize_drops_stale_names() {
        let interner = Interner::new();
        let design = design_with_two_modules(&interner);
        let mut sel = Selection::empty(false);
        sel.select_module(interner.intern_id("deleted"));
        sel.select_member(interner.intern_id("top"), interner.intern_id("gone"));
        sel.optimize(&design, &interner);
        assert!(sel.is_empty());
    }

    #[test]
    fn optimize_is_idempotent() {
        let interner = Interner::new();
        let design = design_with_two_modules(&interner);
        let mut sel = Selection::empty(false);
        sel.select_member(interner.intern_id("top"), interner.intern_id("clk"));
        sel.optimize(&design, &interner);
        let once = sel.clone();
        sel.optimize(&design, &interner);
        assert_eq!(sel, once);
    }
}
