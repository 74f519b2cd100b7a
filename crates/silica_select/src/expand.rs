//! Connection-graph expansion operators.
//!
//! The `%x`, `%ci` and `%co` operators grow a selection outward along
//! wire connections and cell ports, for a bounded number of levels and
//! an optional object budget. Rule lists restrict which cell types and
//! ports the expansion may cross; named limits mark wires and cells the
//! expansion must not proceed beyond.

use crate::error::{SelectError, SelectResult};
use silica_common::{Ident, Interner};
use silica_diagnostics::DiagnosticSink;
use silica_ir::{Design, PortDirection, Selection};
use std::collections::{BTreeSet, HashSet};

/// Direction restriction of an expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandMode {
    /// `%x`: expand along all connections.
    Both,
    /// `%ci`: expand toward cone-of-influence inputs only.
    InputsOnly,
    /// `%co`: expand toward cone-of-influence outputs only.
    OutputsOnly,
}

/// One inclusion or exclusion rule of an expansion operator.
///
/// Rules are tested in order; the first rule whose (possibly empty)
/// cell-type and port-name filters both match decides. When no rule
/// matches, the default is inclusion, unless the last rule in the list
/// is itself an inclusion rule, in which case the default flips to
/// exclusion.
#[derive(Debug, Clone)]
pub struct ExpandRule {
    /// `true` for a `:+` rule, `false` for a `:-` rule.
    pub include: bool,
    /// Cell types this rule applies to; empty matches every type.
    pub cell_types: BTreeSet<Ident>,
    /// Port names this rule applies to; empty matches every port.
    pub port_names: BTreeSet<Ident>,
}

/// A fully parsed expansion operator token.
#[derive(Debug, Clone)]
pub struct ExpandSpec {
    /// Direction restriction.
    pub mode: ExpandMode,
    /// Restrict traversal to evaluable (combinational built-in) cells.
    pub eval_only: bool,
    /// Number of expansion levels; `*` parses to a large fixpoint bound.
    pub levels: u32,
    /// Optional object budget across all levels.
    pub max_objects: Option<usize>,
    /// Inclusion/exclusion rules, in order.
    pub rules: Vec<ExpandRule>,
    /// Wires and cells the expansion must not proceed beyond.
    pub limits: BTreeSet<Ident>,
    /// The original operator token, used in warnings.
    pub token: String,
}

/// Built-in combinational cell types the `%xe`/`%cie`/`%coe` variants
/// are allowed to traverse.
const EVALUABLE_CELL_TYPES: &[&str] = &[
    "$not", "$pos", "$neg", "$and", "$or", "$xor", "$xnor", "$reduce_and", "$reduce_or",
    "$reduce_xor", "$reduce_xnor", "$reduce_bool", "$logic_not", "$logic_and", "$logic_or",
    "$shl", "$shr", "$sshl", "$sshr", "$shift", "$shiftx", "$lt", "$le", "$eq", "$ne", "$ge",
    "$gt", "$add", "$sub", "$mul", "$div", "$mod", "$pow", "$mux", "$pmux", "$concat", "$slice",
];

fn cell_evaluable(ty: &str) -> bool {
    EVALUABLE_CELL_TYPES.contains(&ty)
}

fn parse_comma_list(
    tokens: &mut BTreeSet<Ident>,
    s: &str,
    mut pos: usize,
    stop: &str,
    interner: &Interner,
) -> usize {
    loop {
        let end = s[pos..]
            .find(|c: char| stop.contains(c) || c == ',')
            .map_or(s.len(), |i| pos + i);
        if end != pos {
            tokens.insert(interner.intern_id(&s[pos..end]));
        }
        pos = end;
        if pos == s.len() || s.as_bytes()[pos] != b',' {
            return pos;
        }
        pos += 1;
    }
}

/// Parses an expansion operator token such as `%ci3.100:+$dff[Q]:@stop`.
pub fn parse_expand(
    design: &Design,
    interner: &Interner,
    token: &str,
    mode: ExpandMode,
    eval_only: bool,
) -> SelectResult<ExpandSpec> {
    let mut pos = if mode == ExpandMode::Both { 2 } else { 3 } + usize::from(eval_only);
    let bytes = token.as_bytes();
    let mut levels: u32 = 1;
    let mut max_objects = None;

    if pos < token.len() && bytes[pos] == b'*' {
        levels = 1_000_000;
        pos += 1;
    } else if pos < token.len() && bytes[pos].is_ascii_digit() {
        let end = token[pos..]
            .find(|c: char| !c.is_ascii_digit())
            .map_or(token.len(), |i| pos + i);
        levels = token[pos..end].parse().unwrap_or(0);
        pos = end;
    }

    if pos < token.len() && bytes[pos] == b'.' {
        pos += 1;
        let end = token[pos..]
            .find(|c: char| !c.is_ascii_digit())
            .map_or(token.len(), |i| pos + i);
        if end > pos {
            max_objects = token[pos..end].parse().ok();
        }
        pos = end;
    }

    let mut rules = Vec::new();
    let mut limits = BTreeSet::new();

    while pos < token.len() {
        if bytes[pos] != b':' || pos + 1 == token.len() {
            return Err(SelectError::Syntax(format!(
                "syntax error in expand operator '{token}'"
            )));
        }
        pos += 1;
        if bytes[pos] == b'+' || bytes[pos] == b'-' {
            let include = bytes[pos] == b'+';
            pos += 1;
            let mut rule = ExpandRule {
                include,
                cell_types: BTreeSet::new(),
                port_names: BTreeSet::new(),
            };
            pos = parse_comma_list(&mut rule.cell_types, token, pos, "[:", interner);
            if pos < token.len() && bytes[pos] == b'[' {
                pos = parse_comma_list(&mut rule.port_names, token, pos + 1, "]:", interner);
                if pos < token.len() && bytes[pos] == b']' {
                    pos += 1;
                }
            }
            rules.push(rule);
        } else {
            let end = token[pos..].find(':').map_or(token.len(), |i| pos + i);
            if end > pos {
                let name = &token[pos..end];
                if let Some(set_name) = name.strip_prefix('@') {
                    let id = interner.intern_id(set_name);
                    let Some(saved) = design.saved_selection(id) else {
                        return Err(SelectError::UndefinedSelection(set_name.to_string()));
                    };
                    for members in saved.selected_members.values() {
                        limits.extend(members.iter().copied());
                    }
                } else {
                    limits.insert(interner.intern_id(name));
                }
            }
            pos = end;
        }
    }

    Ok(ExpandSpec {
        mode,
        eval_only,
        levels,
        max_objects,
        rules,
        limits,
        token: token.to_string(),
    })
}

/// Runs an expansion over the selection, level by level, until the level
/// bound is reached, a level adds nothing, or the object budget runs
/// out. Hitting the budget exactly emits a non-fatal warning.
pub fn select_op_expand(
    design: &Design,
    interner: &Interner,
    sink: &DiagnosticSink,
    sel: &mut Selection,
    spec: &ExpandSpec,
) {
    let mut rem: i64 = spec.max_objects.map_or(-1, |n| n as i64);
    let mut levels = spec.levels;

    while levels > 0 && rem != 0 {
        levels -= 1;
        let mut budget = rem;
        let added = expand_step(design, interner, sel, spec, &mut budget);
        if added == 0 {
            break;
        }
        rem -= added as i64;
    }

    if rem == 0 {
        sink.warn(format!("reached configured limit at `{}'", spec.token));
    }
}

/// Decides whether the expansion may cross a cell port, per the rule
/// chain.
fn rule_allows(spec: &ExpandSpec, cell_type: Ident, port: Ident) -> bool {
    for rule in &spec.rules {
        if !rule.cell_types.is_empty() && !rule.cell_types.contains(&cell_type) {
            continue;
        }
        if !rule.port_names.is_empty() && !rule.port_names.contains(&port) {
            continue;
        }
        return rule.include;
    }
    // No rule matched: an inclusion rule at the end of the list flips
    // the default to exclusion.
    !spec.rules.last().is_some_and(|r| r.include)
}

fn expand_step(
    design: &Design,
    interner: &Interner,
    sel: &mut Selection,
    spec: &ExpandSpec,
    max_objects: &mut i64,
) -> usize {
    let mut sel_objects = 0;

    for module in design.modules() {
        if sel.selected_whole_module(design, interner, module.name)
            || !sel.selected_module(design, interner, module.name)
        {
            continue;
        }

        // Membership at the start of this level; additions within the
        // level do not seed further additions until the next level.
        let snapshot: BTreeSet<Ident> = sel
            .selected_members
            .get(&module.name)
            .cloned()
            .unwrap_or_default();

        let mut selected_wires = HashSet::new();
        for wire in module.wires.values() {
            if sel.selected_member(design, interner, module.name, wire.name)
                && !spec.limits.contains(&wire.name)
            {
                selected_wires.insert(wire.id);
            }
        }

        for (conn_lhs, conn_rhs) in &module.connections {
            for (lb, rb) in conn_lhs.bits().zip(conn_rhs.bits()) {
                let (Some(lw), Some(rw)) = (lb.wire(), rb.wire()) else {
                    continue;
                };
                let lname = module.wires[lw].name;
                let rname = module.wires[rw].name;
                if spec.mode != ExpandMode::InputsOnly
                    && selected_wires.contains(&rw)
                    && !snapshot.contains(&lname)
                {
                    sel.selected_members.entry(module.name).or_default().insert(lname);
                    sel_objects += 1;
                    *max_objects -= 1;
                }
                if spec.mode != ExpandMode::OutputsOnly
                    && selected_wires.contains(&lw)
                    && !snapshot.contains(&rname)
                {
                    sel.selected_members.entry(module.name).or_default().insert(rname);
                    sel_objects += 1;
                    *max_objects -= 1;
                }
            }
        }

        for cell in module.cells.values() {
            for conn in &cell.connections {
                if spec.eval_only && !cell_evaluable(interner.resolve(cell.ty)) {
                    continue;
                }
                if !rule_allows(spec, cell.ty, conn.port) {
                    continue;
                }

                let is_input = spec.mode == ExpandMode::Both
                    || matches!(conn.direction, PortDirection::Input | PortDirection::InOut);
                let is_output = spec.mode == ExpandMode::Both
                    || matches!(conn.direction, PortDirection::Output | PortDirection::InOut);

                let mut last_wire = None;
                for bit in conn.signal.bits() {
                    let Some(w) = bit.wire() else {
                        continue;
                    };
                    // One visit per chunk of consecutive bits of a wire.
                    if last_wire == Some(w) {
                        continue;
                    }
                    last_wire = Some(w);
                    let wname = module.wires[w].name;

                    if *max_objects != 0
                        && selected_wires.contains(&w)
                        && !snapshot.contains(&cell.name)
                        && (spec.mode == ExpandMode::Both
                            || (spec.mode == ExpandMode::InputsOnly && is_output)
                            || (spec.mode == ExpandMode::OutputsOnly && is_input))
                    {
                        sel.selected_members.entry(module.name).or_default().insert(cell.name);
                        sel_objects += 1;
                        *max_objects -= 1;
                    }

                    if *max_objects != 0
                        && snapshot.contains(&cell.name)
                        && !spec.limits.contains(&cell.name)
                        && !snapshot.contains(&wname)
                        && (spec.mode == ExpandMode::Both
                            || (spec.mode == ExpandMode::InputsOnly && is_input)
                            || (spec.mode == ExpandMode::OutputsOnly && is_output))
                    {
                        sel.selected_members.entry(module.name).or_default().insert(wname);
                        sel_objects += 1;
                        *max_objects -= 1;
                    }
                }
            }
        }
    }

    sel_objects
}
