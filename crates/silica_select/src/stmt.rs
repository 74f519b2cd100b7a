//! The selection-expression interpreter.
//!
//! One call to [`select_stmt`] processes a single expression token
//! against a work stack of [`Selection`] values: `%` operator tokens
//! transform or combine stack entries, `@name` tokens push saved
//! selections, and everything else is a pattern that pushes a freshly
//! computed selection from a scan over the design.

use crate::error::{SelectError, SelectResult};
use crate::expand::{parse_expand, select_op_expand, ExpandMode};
use crate::ops;
use crate::pattern::{match_attr, match_ids};
use silica_common::Interner;
use silica_diagnostics::DiagnosticSink;
use silica_ir::{Design, Selection};
use std::collections::HashMap;

/// Restricts a selection to the design's active module, if one is set.
pub fn select_filter_active_mod(design: &Design, sel: &mut Selection) {
    let Some(active) = design.selected_active_module else {
        return;
    };

    if sel.full_selection {
        sel.clear();
        sel.selected_modules.insert(active);
        return;
    }

    sel.selected_modules.retain(|&name| name == active);
    sel.selected_members.retain(|&name, _| name == active);
}

/// Unions all work-stack entries into the bottom entry, leaving a stack
/// of at most one.
pub fn fold_work_stack(design: &Design, interner: &Interner, work: &mut Vec<Selection>) {
    while work.len() > 1 {
        let top = work.pop().unwrap();
        ops::select_op_union(design, interner, &mut work[0], &top);
    }
}

/// Evaluates a sequence of selection tokens into one selection.
///
/// The union of everything left on the work stack is the result; an
/// empty token list yields an empty selection.
pub fn eval_select_args(
    design: &Design,
    interner: &Interner,
    sink: &DiagnosticSink,
    args: &[String],
) -> SelectResult<Selection> {
    let mut work = Vec::new();
    for arg in args {
        select_stmt(design, interner, sink, &mut work, arg, false)?;
    }
    fold_work_stack(design, interner, &mut work);
    Ok(work.pop().unwrap_or_else(|| Selection::empty(false)))
}

fn require_depth(work: &[Selection], needed: usize, op: &str) -> SelectResult<()> {
    if work.len() < needed {
        return Err(SelectError::StackUnderflow {
            op: op.to_string(),
            needed,
        });
    }
    Ok(())
}

fn is_expand_token(arg: &str, prefix: &str) -> bool {
    if arg == prefix {
        return true;
    }
    arg.len() > prefix.len()
        && arg.starts_with(prefix)
        && matches!(arg.as_bytes()[prefix.len()], b':' | b'*' | b'.' | b'0'..=b'9')
}

fn isprefixed(s: &str) -> bool {
    s.len() >= 2 && s.as_bytes()[0].is_ascii_alphabetic() && s.as_bytes()[1] == b':'
}

/// Processes a single selection token against the work stack.
///
/// `disable_empty_warning` suppresses the "matched nothing" warnings for
/// callers whose result legitimately may be empty, such as count and
/// assert queries.
pub fn select_stmt(
    design: &Design,
    interner: &Interner,
    sink: &DiagnosticSink,
    work: &mut Vec<Selection>,
    arg: &str,
    disable_empty_warning: bool,
) -> SelectResult<()> {
    if arg.is_empty() {
        return Ok(());
    }

    if arg.starts_with('%') {
        match arg {
            "%" => work.push(design.selection().clone()),
            "%%" => fold_work_stack(design, interner, work),
            "%n" => {
                require_depth(work, 1, arg)?;
                let top = work.last_mut().unwrap();
                ops::select_op_neg(design, interner, top);
            }
            "%u" => {
                require_depth(work, 2, arg)?;
                let top = work.pop().unwrap();
                ops::select_op_union(design, interner, work.last_mut().unwrap(), &top);
            }
            "%d" => {
                require_depth(work, 2, arg)?;
                let top = work.pop().unwrap();
                ops::select_op_diff(design, interner, work.last_mut().unwrap(), &top);
            }
            "%D" => {
                require_depth(work, 2, arg)?;
                let mut top = work.pop().unwrap();
                let second = work.pop().unwrap();
                ops::select_op_diff(design, interner, &mut top, &second);
                work.push(top);
            }
            "%i" => {
                require_depth(work, 2, arg)?;
                let top = work.pop().unwrap();
                ops::select_op_intersect(design, interner, work.last_mut().unwrap(), &top);
            }
            "%s" => {
                require_depth(work, 1, arg)?;
                ops::select_op_submod(design, interner, work.last_mut().unwrap());
            }
            "%M" => {
                require_depth(work, 1, arg)?;
                ops::select_op_cells_to_modules(design, interner, work.last_mut().unwrap());
            }
            "%C" => {
                require_depth(work, 1, arg)?;
                ops::select_op_module_to_cells(design, interner, work.last_mut().unwrap());
            }
            "%c" => {
                require_depth(work, 1, arg)?;
                work.push(work.last().unwrap().clone());
            }
            "%m" => {
                require_depth(work, 1, arg)?;
                ops::select_op_fullmod(design, interner, work.last_mut().unwrap());
            }
            "%a" => {
                require_depth(work, 1, arg)?;
                ops::select_op_alias(design, interner, work.last_mut().unwrap());
            }
            _ if arg.starts_with("%R") => {
                require_depth(work, 1, arg)?;
                let count = if arg.len() > 2 {
                    arg[2..]
                        .parse()
                        .map_err(|_| SelectError::Syntax(format!("bad count in operator '{arg}'")))?
                } else {
                    1
                };
                ops::select_op_random(design, interner, work.last_mut().unwrap(), count);
            }
            _ if is_expand_token(arg, "%xe") => {
                expand_top(design, interner, sink, work, arg, ExpandMode::Both, true)?;
            }
            _ if is_expand_token(arg, "%cie") => {
                expand_top(design, interner, sink, work, arg, ExpandMode::InputsOnly, true)?;
            }
            _ if is_expand_token(arg, "%coe") => {
                expand_top(design, interner, sink, work, arg, ExpandMode::OutputsOnly, true)?;
            }
            _ if is_expand_token(arg, "%x") => {
                expand_top(design, interner, sink, work, arg, ExpandMode::Both, false)?;
            }
            _ if is_expand_token(arg, "%ci") => {
                expand_top(design, interner, sink, work, arg, ExpandMode::InputsOnly, false)?;
            }
            _ if is_expand_token(arg, "%co") => {
                expand_top(design, interner, sink, work, arg, ExpandMode::OutputsOnly, false)?;
            }
            _ => return Err(SelectError::UnknownOperator(arg.to_string())),
        }
        if let Some(top) = work.last_mut() {
            select_filter_active_mod(design, top);
        }
        return Ok(());
    }

    if let Some(name) = arg.strip_prefix('@') {
        let id = interner.intern_id(name);
        let Some(saved) = design.saved_selection(id) else {
            return Err(SelectError::UndefinedSelection(name.to_string()));
        };
        work.push(saved.clone());
        select_filter_active_mod(design, work.last_mut().unwrap());
        return Ok(());
    }

    let mut arg = arg;
    let select_blackboxes = if let Some(rest) = arg.strip_prefix('=') {
        arg = rest;
        true
    } else {
        false
    };

    let mut arg_mod_found: HashMap<String, bool> = HashMap::new();
    let mut arg_memb_found: HashMap<String, bool> = HashMap::new();

    let arg_mod: String;
    let arg_memb: String;

    if let Some(active) = design.selected_active_module {
        arg_mod = interner.resolve(active).to_string();
        arg_memb = arg.to_string();
        if !isprefixed(&arg_memb) {
            arg_memb_found.insert(arg_memb.clone(), false);
        }
    } else if isprefixed(arg) && arg.as_bytes()[0].is_ascii_lowercase() {
        arg_mod = "*".to_string();
        arg_memb = arg.to_string();
    } else if let Some(pos) = arg.find('/') {
        arg_mod = arg[..pos].to_string();
        if !isprefixed(&arg_mod) {
            arg_mod_found.insert(arg_mod.clone(), false);
        }
        arg_memb = arg[pos + 1..].to_string();
        if !isprefixed(&arg_memb) {
            arg_memb_found.insert(arg_memb.clone(), false);
        }
    } else {
        arg_mod = arg.to_string();
        if !isprefixed(&arg_mod) {
            arg_mod_found.insert(arg_mod.clone(), false);
        }
        arg_memb = String::new();
    }

    let full_selection = arg == "*" && arg_mod == "*";
    let mut sel = Selection::new(full_selection, select_blackboxes);

    if sel.selects_all() {
        sel.optimize(design, interner);
        select_filter_active_mod(design, &mut sel);
        work.push(sel);
        return Ok(());
    }

    for module in design.modules() {
        if !select_blackboxes && module.is_blackbox(interner) {
            continue;
        }

        let mod_name = interner.resolve(module.name);
        if let Some(expr) = arg_mod.strip_prefix("A:") {
            if !match_attr(&module.attributes, interner, expr) {
                continue;
            }
        } else if let Some(pat) = arg_mod.strip_prefix("N:") {
            if !match_ids(mod_name, pat) {
                continue;
            }
        } else if !match_ids(mod_name, &arg_mod) {
            continue;
        } else {
            arg_mod_found.insert(arg_mod.clone(), true);
        }

        if arg_memb.is_empty() {
            sel.selected_modules.insert(module.name);
            continue;
        }

        let members = sel.selected_members.entry(module.name).or_default();

        if let Some(pat) = arg_memb.strip_prefix("w:") {
            for wire in module.wires.values() {
                if match_ids(interner.resolve(wire.name), pat) {
                    members.insert(wire.name);
                }
            }
        } else if let Some(pat) = arg_memb.strip_prefix("i:") {
            for wire in module.wires.values() {
                if wire.port_input && match_ids(interner.resolve(wire.name), pat) {
                    members.insert(wire.name);
                }
            }
        } else if let Some(pat) = arg_memb.strip_prefix("o:") {
            for wire in module.wires.values() {
                if wire.port_output && match_ids(interner.resolve(wire.name), pat) {
                    members.insert(wire.name);
                }
            }
        } else if let Some(pat) = arg_memb.strip_prefix("x:") {
            for wire in module.wires.values() {
                if wire.is_port() && match_ids(interner.resolve(wire.name), pat) {
                    members.insert(wire.name);
                }
            }
        } else if let Some(range) = arg_memb.strip_prefix("s:") {
            if let Some(delim) = range.find(':') {
                let min_width: u32 = range[..delim].parse().unwrap_or(0);
                let max_width: Option<u32> = range[delim + 1..].parse().ok();
                for wire in module.wires.values() {
                    if min_width <= wire.width && max_width.is_none_or(|max| wire.width <= max) {
                        members.insert(wire.name);
                    }
                }
            } else {
                let width: u32 = range.parse().unwrap_or(0);
                for wire in module.wires.values() {
                    if wire.width == width {
                        members.insert(wire.name);
                    }
                }
            }
        } else if let Some(pat) = arg_memb.strip_prefix("m:") {
            for memory in module.memories.values() {
                if match_ids(interner.resolve(memory.name), pat) {
                    members.insert(memory.name);
                }
            }
        } else if let Some(pat) = arg_memb.strip_prefix("c:") {
            for cell in module.cells.values() {
                if match_ids(interner.resolve(cell.name), pat) {
                    members.insert(cell.name);
                }
            }
        } else if let Some(pat) = arg_memb.strip_prefix("t:") {
            if let Some(set_name) = pat.strip_prefix('@') {
                let id = interner.intern_id(set_name);
                let Some(muster) = design.saved_selection(id) else {
                    return Err(SelectError::UndefinedSelection(set_name.to_string()));
                };
                for cell in module.cells.values() {
                    if muster.selected_modules.contains(&cell.ty) {
                        members.insert(cell.name);
                    }
                }
            } else {
                for cell in module.cells.values() {
                    if match_ids(interner.resolve(cell.ty), pat) {
                        members.insert(cell.name);
                    }
                }
            }
        } else if let Some(pat) = arg_memb.strip_prefix("p:") {
            for process in module.processes.values() {
                if match_ids(interner.resolve(process.name), pat) {
                    members.insert(process.name);
                }
            }
        } else if let Some(expr) = arg_memb.strip_prefix("a:") {
            for wire in module.wires.values() {
                if match_attr(&wire.attributes, interner, expr) {
                    members.insert(wire.name);
                }
            }
            for memory in module.memories.values() {
                if match_attr(&memory.attributes, interner, expr) {
                    members.insert(memory.name);
                }
            }
            for cell in module.cells.values() {
                if match_attr(&cell.attributes, interner, expr) {
                    members.insert(cell.name);
                }
            }
            for process in module.processes.values() {
                if match_attr(&process.attributes, interner, expr) {
                    members.insert(process.name);
                }
            }
        } else if let Some(expr) = arg_memb.strip_prefix("r:") {
            for cell in module.cells.values() {
                if match_attr(&cell.parameters, interner, expr) {
                    members.insert(cell.name);
                }
            }
        } else {
            let pat = arg_memb.strip_prefix("n:").unwrap_or(&arg_memb);
            let mut found = false;
            for name in module.member_names() {
                if match_ids(interner.resolve(name), pat) {
                    members.insert(name);
                    found = true;
                }
            }
            if found {
                arg_memb_found.insert(arg_memb.clone(), true);
            }
        }

        if members.is_empty() {
            sel.selected_members.remove(&module.name);
        }
    }

    select_filter_active_mod(design, &mut sel);
    work.push(sel);

    if !disable_empty_warning {
        let sigil = if select_blackboxes { "=" } else { "" };
        for (pattern, found) in &arg_mod_found {
            if !found {
                sink.warn(format!(
                    "selection \"{sigil}{pattern}\" did not match any module"
                ));
            }
        }
        for (pattern, found) in &arg_memb_found {
            if !found {
                sink.warn(format!(
                    "selection \"{sigil}{pattern}\" did not match any object"
                ));
            }
        }
    }

    Ok(())
}

fn expand_top(
    design: &Design,
    interner: &Interner,
    sink: &DiagnosticSink,
    work: &mut [Selection],
    arg: &str,
    mode: ExpandMode,
    eval_only: bool,
) -> SelectResult<()> {
    let Some(top) = work.last_mut() else {
        return Err(SelectError::StackUnderflow {
            op: arg.to_string(),
            needed: 1,
        });
    };
    let spec = parse_expand(design, interner, arg, mode, eval_only)?;
    select_op_expand(design, interner, sink, top, &spec);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use silica_ir::{Const, Module};

    fn test_design(interner: &Interner) -> Design {
        let mut design = Design::new();

        let mut top = Module::new(interner.intern_id("top"));
        let clk = top.add_wire(interner.intern_id("clk"), 1);
        top.wires[clk].port_input = true;
        let out = top.add_wire(interner.intern_id("out"), 8);
        top.wires[out].port_output = true;
        top.add_wire(interner.intern_id("state"), 8);
        top.add_cell(interner.get_or_intern("$add$f.v:1$1"), interner.get_or_intern("$add"));
        top.add_cell(interner.get_or_intern("$add$f.v:2$2"), interner.get_or_intern("$add"));
        top.add_cell(interner.get_or_intern("$mul$f.v:3$3"), interner.get_or_intern("$mul"));
        design.add_module(top);

        let mut sub = Module::new(interner.intern_id("sub"));
        sub.add_wire(interner.intern_id("a"), 4);
        design.add_module(sub);

        design
    }

    fn eval(design: &Design, interner: &Interner, args: &[&str]) -> Selection {
        let sink = DiagnosticSink::new();
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        eval_select_args(design, interner, &sink, &args).unwrap()
    }

    #[test]
    fn cell_type_pattern_selects_matching_cells() {
        let interner = Interner::new();
        let design = test_design(&interner);
        let sel = eval(&design, &interner, &["t:$add"]);

        let top = interner.intern_id("top");
        let members = sel.selected_members.get(&top).unwrap();
        assert_eq!(members.len(), 2);
        assert!(members.contains(&interner.get_or_intern("$add$f.v:1$1")));
        assert!(members.contains(&interner.get_or_intern("$add$f.v:2$2")));
    }

    #[test]
    fn star_selects_everything() {
        let interner = Interner::new();
        let design = test_design(&interner);
        let sel = eval(&design, &interner, &["*"]);
        assert!(sel.selects_all());
    }

    #[test]
    fn module_slash_member_syntax() {
        let interner = Interner::new();
        let design = test_design(&interner);
        let sel = eval(&design, &interner, &["top/w:clk"]);
        let top = interner.intern_id("top");
        assert!(sel.selected_member(&design, &interner, top, interner.intern_id("clk")));
        assert!(!sel.selected_member(&design, &interner, top, interner.intern_id("out")));
    }

    #[test]
    fn port_direction_prefixes() {
        let interner = Interner::new();
        let design = test_design(&interner);
        let top = interner.intern_id("top");

        let sel = eval(&design, &interner, &["i:*"]);
        assert!(sel.selected_member(&design, &interner, top, interner.intern_id("clk")));
        assert!(!sel.selected_member(&design, &interner, top, interner.intern_id("out")));

        let sel = eval(&design, &interner, &["o:*"]);
        assert!(sel.selected_member(&design, &interner, top, interner.intern_id("out")));

        let sel = eval(&design, &interner, &["x:*"]);
        assert!(sel.selected_member(&design, &interner, top, interner.intern_id("clk")));
        assert!(sel.selected_member(&design, &interner, top, interner.intern_id("out")));
        assert!(!sel.selected_member(&design, &interner, top, interner.intern_id("state")));
    }

    #[test]
    fn wire_size_range_prefix() {
        let interner = Interner::new();
        let design = test_design(&interner);
        let top = interner.intern_id("top");

        let sel = eval(&design, &interner, &["top/s:8"]);
        assert!(sel.selected_member(&design, &interner, top, interner.intern_id("out")));
        assert!(!sel.selected_member(&design, &interner, top, interner.intern_id("clk")));

        let sel = eval(&design, &interner, &["top/s:2:8"]);
        assert!(sel.selected_member(&design, &interner, top, interner.intern_id("out")));
        assert!(!sel.selected_member(&design, &interner, top, interner.intern_id("clk")));

        let sel = eval(&design, &interner, &["top/s:1:"]);
        assert!(sel.selected_member(&design, &interner, top, interner.intern_id("clk")));
        assert!(sel.selected_member(&design, &interner, top, interner.intern_id("out")));
    }

    #[test]
    fn union_and_difference_operators() {
        let interner = Interner::new();
        let design = test_design(&interner);
        let top = interner.intern_id("top");

        let sel = eval(&design, &interner, &["t:$add", "t:$mul", "%u"]);
        assert_eq!(sel.selected_members.get(&top).unwrap().len(), 3);

        let sel = eval(&design, &interner, &["t:*", "t:$mul", "%d"]);
        let members = sel.selected_members.get(&top).unwrap();
        assert_eq!(members.len(), 2);
        assert!(!members.contains(&interner.get_or_intern("$mul$f.v:3$3")));
    }

    #[test]
    fn reverse_difference_operator() {
        let interner = Interner::new();
        let design = test_design(&interner);
        let top = interner.intern_id("top");

        // %D subtracts the second entry from the top entry.
        let sel = eval(&design, &interner, &["t:$mul", "t:*", "%D"]);
        let members = sel.selected_members.get(&top).unwrap();
        assert_eq!(members.len(), 2);
        assert!(!members.contains(&interner.get_or_intern("$mul$f.v:3$3")));
    }

    #[test]
    fn copy_operator_duplicates_top() {
        let interner = Interner::new();
        let design = test_design(&interner);
        let sink = DiagnosticSink::new();
        let mut work = Vec::new();
        select_stmt(&design, &interner, &sink, &mut work, "t:$add", false).unwrap();
        select_stmt(&design, &interner, &sink, &mut work, "%c", false).unwrap();
        assert_eq!(work.len(), 2);
        assert_eq!(work[0], work[1]);
    }

    #[test]
    fn intersect_operator() {
        let interner = Interner::new();
        let design = test_design(&interner);
        let top = interner.intern_id("top");
        let sel = eval(&design, &interner, &["t:$add", "c:$add$f.v:1$1", "%i"]);
        let members = sel.selected_members.get(&top).unwrap();
        assert_eq!(members.len(), 1);
    }

    #[test]
    fn stack_underflow_is_an_error() {
        let interner = Interner::new();
        let design = test_design(&interner);
        let sink = DiagnosticSink::new();
        let mut work = Vec::new();
        let err = select_stmt(&design, &interner, &sink, &mut work, "%u", false).unwrap_err();
        assert!(matches!(err, SelectError::StackUnderflow { needed: 2, .. }));
    }

    #[test]
    fn unknown_operator_is_an_error() {
        let interner = Interner::new();
        let design = test_design(&interner);
        let sink = DiagnosticSink::new();
        let mut work = Vec::new();
        let err = select_stmt(&design, &interner, &sink, &mut work, "%bogus", false).unwrap_err();
        assert!(matches!(err, SelectError::UnknownOperator(_)));
    }

    #[test]
    fn undefined_saved_selection_is_an_error() {
        let interner = Interner::new();
        let design = test_design(&interner);
        let sink = DiagnosticSink::new();
        let mut work = Vec::new();
        let err = select_stmt(&design, &interner, &sink, &mut work, "@nope", false).unwrap_err();
        assert!(matches!(err, SelectError::UndefinedSelection(_)));
    }

    #[test]
    fn saved_selection_reference() {
        let interner = Interner::new();
        let mut design = test_design(&interner);
        let sink = DiagnosticSink::new();
        let args = vec!["t:$add".to_string()];
        let saved = eval_select_args(&design, &interner, &sink, &args).unwrap();
        design.save_selection(interner.intern_id("adds"), saved.clone());

        let sel = eval(&design, &interner, &["@adds"]);
        assert_eq!(sel, saved);
    }

    #[test]
    fn cell_type_by_saved_selection() {
        let interner = Interner::new();
        let mut design = test_design(&interner);
        let mut saved = Selection::empty(false);
        saved.select_module(interner.get_or_intern("$add"));
        design.save_selection(interner.intern_id("addtypes"), saved);

        let sel = eval(&design, &interner, &["t:@addtypes"]);
        let top = interner.intern_id("top");
        assert_eq!(sel.selected_members.get(&top).unwrap().len(), 2);
    }

    #[test]
    fn empty_match_warns_unless_suppressed() {
        let interner = Interner::new();
        let design = test_design(&interner);

        let sink = DiagnosticSink::new();
        let mut work = Vec::new();
        select_stmt(&design, &interner, &sink, &mut work, "nonexistent", false).unwrap();
        assert_eq!(sink.warning_count(), 1);

        let sink = DiagnosticSink::new();
        let mut work = Vec::new();
        select_stmt(&design, &interner, &sink, &mut work, "nonexistent", true).unwrap();
        assert_eq!(sink.warning_count(), 0);
    }

    #[test]
    fn active_module_scopes_patterns() {
        let interner = Interner::new();
        let mut design = test_design(&interner);
        design.selected_active_module = Some(interner.intern_id("top"));

        let sel = eval(&design, &interner, &["w:*"]);
        let top = interner.intern_id("top");
        assert!(sel.selected_member(&design, &interner, top, interner.intern_id("clk")));
        assert!(!sel.selected_module(&design, &interner, interner.intern_id("sub")));
    }

    #[test]
    fn attribute_module_pattern() {
        let interner = Interner::new();
        let mut design = test_design(&interner);
        design
            .module_mut(interner.intern_id("sub"))
            .unwrap()
            .attributes
            .insert(interner.intern_id("keep"), Const::Int(1));

        let sel = eval(&design, &interner, &["A:keep"]);
        assert!(sel.selected_whole_module(&design, &interner, interner.intern_id("sub")));
        assert!(!sel.selected_module(&design, &interner, interner.intern_id("top")));
    }

    #[test]
    fn blackbox_needs_marker() {
        let interner = Interner::new();
        let mut design = Design::new();
        let mut bb = Module::new(interner.intern_id("bb"));
        bb.attributes.insert(interner.intern_id("blackbox"), Const::Int(1));
        design.add_module(bb);

        let sink = DiagnosticSink::new();
        let no_boxes = eval_select_args(&design, &interner, &sink, &["bb".to_string()]);
        assert!(no_boxes.unwrap().is_empty());

        let sel = eval(&design, &interner, &["=bb"]);
        assert!(sel.selected_module(&design, &interner, interner.intern_id("bb")));
    }

    #[test]
    fn name_pattern_covers_all_member_kinds() {
        let interner = Interner::new();
        let mut design = Design::new();
        let mut m = Module::new(interner.intern_id("m"));
        m.add_wire(interner.intern_id("thing"), 1);
        m.add_memory(interner.intern_id("thing_mem"), 8, 16);
        design.add_module(m);

        let sel = eval(&design, &interner, &["m/thing*"]);
        let m_name = interner.intern_id("m");
        assert_eq!(sel.selected_members.get(&m_name).unwrap().len(), 2);

        let sel = eval(&design, &interner, &["m/n:thing"]);
        assert_eq!(sel.selected_members.get(&m_name).unwrap().len(), 1);
    }
}
