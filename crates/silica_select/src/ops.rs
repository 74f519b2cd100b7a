//! Selection set algebra.
//!
//! Every operation takes one or two [`Selection`] values and rewrites the
//! left-hand side in place. Operations that mix box-inclusive and
//! box-exclusive operands first materialize the full selections into
//! explicit per-module entries via [`select_all`], so the box policy is
//! applied exactly once.

use silica_common::{Ident, Interner};
use silica_ir::{Design, Selection, SigBit, SigMap, SigSpec};
use std::collections::HashSet;

/// Materializes a full or complete selection into explicit per-module
/// entries, filtered by the selection's box policy. No-op for selections
/// that are already explicit.
pub fn select_all(design: &Design, interner: &Interner, sel: &mut Selection) {
    if !sel.selects_all() {
        return;
    }
    sel.selected_modules.clear();
    for module in design.modules() {
        if !sel.selects_boxes && module.is_blackbox(interner) {
            continue;
        }
        sel.selected_modules.insert(module.name);
    }
    sel.full_selection = false;
    sel.complete_selection = false;
}

/// Inverts a selection within the universe of box-policy-respecting
/// modules and their members.
pub fn select_op_neg(design: &Design, interner: &Interner, sel: &mut Selection) {
    if sel.selects_all() {
        sel.clear();
        return;
    }

    if sel.selected_modules.is_empty() && sel.selected_members.is_empty() {
        sel.select_all();
        return;
    }

    let mut new_sel = Selection::empty(sel.selects_boxes);

    for module in design.modules() {
        if !sel.selects_boxes && module.is_blackbox(interner) {
            continue;
        }
        if sel.selected_whole_module(design, interner, module.name) {
            continue;
        }
        if !sel.selected_module(design, interner, module.name) {
            new_sel.selected_modules.insert(module.name);
            continue;
        }

        for name in module.member_names() {
            if !sel.selected_member(design, interner, module.name, name) {
                new_sel.selected_members.entry(module.name).or_default().insert(name);
            }
        }
    }

    std::mem::swap(&mut sel.selected_modules, &mut new_sel.selected_modules);
    std::mem::swap(&mut sel.selected_members, &mut new_sel.selected_members);
}

/// Deterministic xorshift32 generator used by the random-sample
/// operator. The seed is fixed so scripted selections are reproducible.
struct Xorshift32(u32);

impl Xorshift32 {
    fn new() -> Self {
        Self(314159265)
    }

    fn next(&mut self) -> u32 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 17;
        self.0 ^= self.0 << 5;
        self.0 & 0x0fff_ffff
    }
}

/// Replaces the selection with a pseudo-random sample of `count` of its
/// cells and wires, drawn without replacement.
pub fn select_op_random(design: &Design, interner: &Interner, sel: &mut Selection, count: usize) {
    let mut objects: Vec<(Ident, Ident)> = Vec::new();

    for module in design.modules() {
        if !sel.selected_module(design, interner, module.name) {
            continue;
        }
        for cell in module.cells.values() {
            if sel.selected_member(design, interner, module.name, cell.name) {
                objects.push((module.name, cell.name));
            }
        }
        for wire in module.wires.values() {
            if sel.selected_member(design, interner, module.name, wire.name) {
                objects.push((module.name, wire.name));
            }
        }
    }

    let mut new_sel = Selection::empty(sel.selects_boxes);
    let mut rng = Xorshift32::new();
    let mut remaining = count;

    while !objects.is_empty() && remaining > 0 {
        let idx = rng.next() as usize % objects.len();
        let (module, member) = objects.swap_remove(idx);
        new_sel.selected_members.entry(module).or_default().insert(member);
        remaining -= 1;
    }

    *sel = new_sel;
    sel.optimize(design, interner);
}

/// Adds the modules instantiated by cells of fully selected modules.
pub fn select_op_submod(design: &Design, interner: &Interner, sel: &mut Selection) {
    let mut found = Vec::new();
    for module in design.modules() {
        if sel.selected_whole_module(design, interner, module.name) {
            for cell in module.cells.values() {
                if design.has_module(cell.ty) {
                    found.push(cell.ty);
                }
            }
        }
    }
    for name in found {
        sel.selected_modules.insert(name);
    }
}

/// Replaces a cell selection with the modules those cells instantiate.
pub fn select_op_cells_to_modules(design: &Design, interner: &Interner, sel: &mut Selection) {
    let mut new_sel = Selection::empty(sel.selects_boxes);
    for module in design.modules() {
        if !sel.selected_module(design, interner, module.name) {
            continue;
        }
        for cell in module.cells.values() {
            if sel.selected_member(design, interner, module.name, cell.name)
                && design.has_module(cell.ty)
            {
                new_sel.selected_modules.insert(cell.ty);
            }
        }
    }
    *sel = new_sel;
}

/// Replaces a whole-module selection with the cells instantiating those
/// modules, anywhere in the design.
pub fn select_op_module_to_cells(design: &Design, interner: &Interner, sel: &mut Selection) {
    let mut new_sel = Selection::empty(sel.selects_boxes);
    for module in design.modules() {
        for cell in module.cells.values() {
            if design.has_module(cell.ty)
                && sel.selected_whole_module(design, interner, cell.ty)
            {
                new_sel
                    .selected_members
                    .entry(module.name)
                    .or_default()
                    .insert(cell.name);
            }
        }
    }
    *sel = new_sel;
}

/// Promotes every partially selected module to a whole-module selection.
pub fn select_op_fullmod(design: &Design, interner: &Interner, sel: &mut Selection) {
    sel.optimize(design, interner);
    let members = std::mem::take(&mut sel.selected_members);
    for module in members.into_keys() {
        sel.selected_modules.insert(module);
    }
}

/// Adds every wire sharing at least one signal bit (after alias
/// resolution through module connections) with an already-selected wire.
pub fn select_op_alias(design: &Design, interner: &Interner, sel: &mut Selection) {
    for module in design.modules() {
        if !sel.selects_boxes && module.is_blackbox(interner) {
            continue;
        }
        if sel.selected_whole_module(design, interner, module.name)
            || !sel.selected_module(design, interner, module.name)
        {
            continue;
        }

        let mut sigmap = SigMap::new();
        for (lhs, rhs) in &module.connections {
            sigmap.add(lhs, rhs);
        }

        let mut selected_bits: HashSet<SigBit> = HashSet::new();
        for wire in module.wires.values() {
            if sel.selected_member(design, interner, module.name, wire.name) {
                let sig = SigSpec::from_wire(wire.id, wire.width);
                selected_bits.extend(sigmap.map(&sig).bits());
            }
        }

        let mut added = Vec::new();
        for wire in module.wires.values() {
            if sel.selected_member(design, interner, module.name, wire.name) {
                continue;
            }
            let sig = SigSpec::from_wire(wire.id, wire.width);
            if sigmap.map(&sig).bits().any(|b| selected_bits.contains(&b)) {
                added.push(wire.name);
            }
        }
        for name in added {
            sel.selected_members.entry(module.name).or_default().insert(name);
        }
    }
}

/// Member-wise union; a full or complete selection on either side
/// dominates according to the box-inclusion rules.
pub fn select_op_union(design: &Design, interner: &Interner, lhs: &mut Selection, rhs: &Selection) {
    if lhs.complete_selection {
        return;
    }
    if rhs.complete_selection {
        lhs.selects_boxes = true;
        lhs.complete_selection = true;
        lhs.full_selection = false;
        lhs.optimize(design, interner);
        return;
    }

    if rhs.selects_boxes {
        if lhs.full_selection {
            select_all(design, interner, lhs);
        }
        lhs.selects_boxes = true;
    } else if lhs.full_selection {
        return;
    }

    if rhs.full_selection {
        if lhs.selects_boxes {
            let mut new_rhs = rhs.clone();
            select_all(design, interner, &mut new_rhs);
            for module in new_rhs.selected_modules {
                lhs.selected_modules.insert(module);
            }
        } else {
            lhs.clear();
            lhs.full_selection = true;
        }
        return;
    }

    for (&module, members) in &rhs.selected_members {
        lhs.selected_members.entry(module).or_default().extend(members.iter().copied());
    }

    for &module in &rhs.selected_modules {
        lhs.selected_modules.insert(module);
        lhs.selected_members.remove(&module);
    }
}

/// Removes from `lhs` every whole module and member that `rhs` covers.
pub fn select_op_diff(design: &Design, interner: &Interner, lhs: &mut Selection, rhs: &Selection) {
    if rhs.complete_selection {
        lhs.clear();
        return;
    }

    if rhs.full_selection {
        if lhs.selects_boxes {
            let mut new_rhs = rhs.clone();
            select_all(design, interner, &mut new_rhs);
            select_all(design, interner, lhs);
            for module in new_rhs.selected_modules {
                lhs.selected_modules.remove(&module);
                lhs.selected_members.remove(&module);
            }
        } else {
            lhs.clear();
        }
        return;
    }

    if rhs.is_empty() || lhs.is_empty() {
        return;
    }

    select_all(design, interner, lhs);

    for module in &rhs.selected_modules {
        lhs.selected_modules.remove(module);
        lhs.selected_members.remove(module);
    }

    for (&mod_name, members) in &rhs.selected_members {
        let Some(module) = design.module(mod_name) else {
            continue;
        };

        // A fully selected module is expanded to explicit members before
        // individual members can be removed from it.
        if lhs.selected_modules.remove(&mod_name) {
            let all: std::collections::BTreeSet<Ident> = module.member_names().collect();
            lhs.selected_members.insert(mod_name, all);
        }

        let Some(lhs_members) = lhs.selected_members.get_mut(&mod_name) else {
            continue;
        };
        for member in members {
            lhs_members.remove(member);
        }
    }
}

/// Keeps only the modules and members present in both selections.
pub fn select_op_intersect(
    design: &Design,
    interner: &Interner,
    lhs: &mut Selection,
    rhs: &Selection,
) {
    if rhs.complete_selection {
        return;
    }
    if rhs.full_selection && !lhs.selects_boxes {
        return;
    }
    if lhs.is_empty() {
        return;
    }
    if rhs.is_empty() {
        lhs.clear();
        return;
    }

    select_all(design, interner, lhs);

    let mut del_list = Vec::new();
    let mut demoted = Vec::new();
    for &mod_name in &lhs.selected_modules {
        if rhs.selected_whole_module(design, interner, mod_name) {
            continue;
        }
        if rhs.selected_module(design, interner, mod_name) {
            if let Some(members) = rhs.selected_members.get(&mod_name) {
                demoted.push((mod_name, members.clone()));
            }
        }
        del_list.push(mod_name);
    }
    for (mod_name, members) in demoted {
        lhs.selected_members.entry(mod_name).or_default().extend(members);
    }
    for mod_name in del_list {
        lhs.selected_modules.remove(&mod_name);
    }

    let mut del_list = Vec::new();
    for (&mod_name, members) in &mut lhs.selected_members {
        if rhs.selected_whole_module(design, interner, mod_name) {
            continue;
        }
        if !rhs.selected_module(design, interner, mod_name) {
            del_list.push(mod_name);
            continue;
        }
        members.retain(|&m| rhs.selected_member(design, interner, mod_name, m));
        if members.is_empty() {
            del_list.push(mod_name);
        }
    }
    for mod_name in del_list {
        lhs.selected_members.remove(&mod_name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use silica_ir::Module;

    fn test_design(interner: &Interner) -> Design {
        let mut design = Design::new();

        let mut top = Module::new(interner.intern_id("top"));
        top.add_wire(interner.intern_id("clk"), 1);
        top.add_wire(interner.intern_id("out"), 8);
        top.add_cell(interner.intern_id("u0"), interner.intern_id("sub"));
        design.add_module(top);

        let mut sub = Module::new(interner.intern_id("sub"));
        sub.add_wire(interner.intern_id("a"), 4);
        design.add_module(sub);

        design
    }

    fn member_sel(interner: &Interner, module: &str, member: &str) -> Selection {
        let mut sel = Selection::empty(false);
        sel.select_member(interner.intern_id(module), interner.intern_id(member));
        sel
    }

    #[test]
    fn union_with_empty_is_identity() {
        let interner = Interner::new();
        let design = test_design(&interner);
        let mut a = member_sel(&interner, "top", "clk");
        let before = a.clone();
        let empty = Selection::empty(false);
        select_op_union(&design, &interner, &mut a, &empty);
        a.optimize(&design, &interner);
        assert_eq!(a, before);
    }

    #[test]
    fn diff_self_is_empty() {
        let interner = Interner::new();
        let design = test_design(&interner);
        let mut a = member_sel(&interner, "top", "clk");
        let b = a.clone();
        select_op_diff(&design, &interner, &mut a, &b);
        a.optimize(&design, &interner);
        assert!(a.is_empty());
    }

    #[test]
    fn diff_then_intersect_is_empty() {
        let interner = Interner::new();
        let design = test_design(&interner);
        let mut a = Selection::full();
        select_all(&design, &interner, &mut a);
        let b = member_sel(&interner, "top", "clk");
        select_op_diff(&design, &interner, &mut a, &b);
        select_op_intersect(&design, &interner, &mut a, &b);
        a.optimize(&design, &interner);
        assert!(a.is_empty());
    }

    #[test]
    fn union_with_negation_is_full() {
        let interner = Interner::new();
        let design = test_design(&interner);
        let mut a = member_sel(&interner, "top", "clk");
        let mut not_a = a.clone();
        select_op_neg(&design, &interner, &mut not_a);
        select_op_union(&design, &interner, &mut a, &not_a);
        a.optimize(&design, &interner);
        assert!(a.selects_all());
    }

    #[test]
    fn neg_of_everything_is_nothing() {
        let interner = Interner::new();
        let design = test_design(&interner);
        let mut sel = Selection::full();
        select_op_neg(&design, &interner, &mut sel);
        assert!(sel.is_empty());
        select_op_neg(&design, &interner, &mut sel);
        assert!(sel.selects_all());
    }

    #[test]
    fn diff_removes_member_from_whole_module() {
        let interner = Interner::new();
        let design = test_design(&interner);
        let top = interner.intern_id("top");

        let mut a = Selection::empty(false);
        a.select_module(top);
        let b = member_sel(&interner, "top", "clk");
        select_op_diff(&design, &interner, &mut a, &b);

        assert!(!a.selected_member(&design, &interner, top, interner.intern_id("clk")));
        assert!(a.selected_member(&design, &interner, top, interner.intern_id("out")));
    }

    #[test]
    fn submod_selects_instantiated_modules() {
        let interner = Interner::new();
        let design = test_design(&interner);
        let mut sel = Selection::empty(false);
        sel.select_module(interner.intern_id("top"));
        select_op_submod(&design, &interner, &mut sel);
        assert!(sel.selected_whole_module(&design, &interner, interner.intern_id("sub")));
    }

    #[test]
    fn module_to_cells_finds_instances() {
        let interner = Interner::new();
        let design = test_design(&interner);
        let mut sel = Selection::empty(false);
        sel.select_module(interner.intern_id("sub"));
        select_op_module_to_cells(&design, &interner, &mut sel);
        assert!(sel.selected_member(
            &design,
            &interner,
            interner.intern_id("top"),
            interner.intern_id("u0")
        ));
        assert!(!sel.selected_module(&design, &interner, interner.intern_id("sub")));
    }

    #[test]
    fn cells_to_modules_inverts_instances() {
        let interner = Interner::new();
        let design = test_design(&interner);
        let mut sel = member_sel(&interner, "top", "u0");
        select_op_cells_to_modules(&design, &interner, &mut sel);
        assert!(sel.selected_whole_module(&design, &interner, interner.intern_id("sub")));
    }

    #[test]
    fn fullmod_promotes_partial_selections() {
        let interner = Interner::new();
        let design = test_design(&interner);
        let mut sel = member_sel(&interner, "top", "clk");
        select_op_fullmod(&design, &interner, &mut sel);
        assert!(sel.selected_whole_module(&design, &interner, interner.intern_id("top")));
    }

    #[test]
    fn alias_follows_connections() {
        let interner = Interner::new();
        let mut design = Design::new();
        let mut m = Module::new(interner.intern_id("m"));
        let a = m.add_wire(interner.intern_id("a"), 2);
        let b = m.add_wire(interner.intern_id("b"), 2);
        m.add_wire(interner.intern_id("unrelated"), 2);
        m.connect(SigSpec::from_wire(a, 2), SigSpec::from_wire(b, 2));
        design.add_module(m);

        let mut sel = member_sel(&interner, "m", "a");
        select_op_alias(&design, &interner, &mut sel);
        let m_name = interner.intern_id("m");
        assert!(sel.selected_member(&design, &interner, m_name, interner.intern_id("b")));
        assert!(!sel.selected_member(&design, &interner, m_name, interner.intern_id("unrelated")));
    }

    #[test]
    fn random_sample_is_deterministic_and_bounded() {
        let interner = Interner::new();
        let design = test_design(&interner);
        let mut a = Selection::full();
        let mut b = Selection::full();
        select_op_random(&design, &interner, &mut a, 2);
        select_op_random(&design, &interner, &mut b, 2);
        assert_eq!(a, b);
        let member_count: usize = a.selected_members.values().map(|m| m.len()).sum();
        let whole_count: usize = a
            .selected_modules
            .iter()
            .map(|&m| design.module(m).map_or(0, |m| m.member_count()))
            .sum();
        assert_eq!(member_count + whole_count, 2);
    }

    #[test]
    fn xorshift_sequence_is_stable() {
        let mut rng = Xorshift32::new();
        let first = rng.next();
        let second = rng.next();
        let mut rng2 = Xorshift32::new();
        assert_eq!(rng2.next(), first);
        assert_eq!(rng2.next(), second);
        assert_ne!(first, second);
    }
}
