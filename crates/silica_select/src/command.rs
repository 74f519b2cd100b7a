//! The structured `select` operation.
//!
//! Command dispatch parses its options into a [`SelectCommand`] and
//! executes it against a design. Depending on the options this either
//! rewrites the design-wide selection (default, `-add`, `-del`,
//! `-clear`, `-none`), manages saved selections (`-set`, `-unset`),
//! checks assertions (`-assert-*`), or reports the selection contents
//! (`-list`, `-list-mod`, `-count`, `-write`) without modifying it.

use crate::error::{SelectError, SelectResult};
use crate::stmt::{fold_work_stack, select_filter_active_mod, select_stmt};
use silica_common::{Ident, Interner};
use silica_diagnostics::DiagnosticSink;
use silica_ir::{Design, Module, Selection};
use std::io::Write;
use std::path::PathBuf;

/// Options of one `select` invocation.
#[derive(Debug, Default)]
pub struct SelectCommand {
    /// Union the evaluated selection into the current one.
    pub add: bool,
    /// Subtract the evaluated selection from the current one.
    pub del: bool,
    /// Reset to a full selection and leave module scope.
    pub clear: bool,
    /// Replace the current selection with an empty one.
    pub none: bool,
    /// Report the selection contents.
    pub list: bool,
    /// With `list`, report affected modules only.
    pub list_mod: bool,
    /// Count all objects in the selection.
    pub count: bool,
    /// Assert the selection is empty.
    pub assert_none: bool,
    /// Assert the selection is non-empty.
    pub assert_any: bool,
    /// Assert the selection covers exactly this many modules.
    pub assert_mod_count: Option<usize>,
    /// Assert the selection contains exactly this many objects.
    pub assert_count: Option<usize>,
    /// Assert the selection contains at most this many objects.
    pub assert_max: Option<usize>,
    /// Assert the selection contains at least this many objects.
    pub assert_min: Option<usize>,
    /// Write the selection to this file in `module/member` line format.
    pub write_file: Option<PathBuf>,
    /// Read the selection from a file written by `write_file`.
    pub read_file: Option<PathBuf>,
    /// Enter module scope: interpret subsequent patterns relative to
    /// this module.
    pub module: Option<String>,
    /// Save the evaluated selection under this name.
    pub set: Option<String>,
    /// Remove the saved selection with this name.
    pub unset: Option<String>,
    /// Selection expression tokens.
    pub args: Vec<String>,
}

/// What a `select` invocation reported.
#[derive(Debug, Default)]
pub struct SelectOutcome {
    /// Lines `-list` (or an argument-less `select`) would print.
    pub lines: Vec<String>,
    /// Object count recorded by `-count`.
    pub count: Option<usize>,
}

impl SelectCommand {
    /// Creates a command with no options set.
    pub fn new() -> Self {
        Self::default()
    }

    fn suppress_empty_warning(&self) -> bool {
        self.count
            || self.assert_none
            || self.assert_any
            || self.assert_mod_count.is_some()
            || self.assert_count.is_some()
            || self.assert_max.is_some()
            || self.assert_min.is_some()
    }

    fn common_flagset_tally(&self) -> usize {
        usize::from(self.add)
            + usize::from(self.del)
            + usize::from(self.assert_none)
            + usize::from(self.assert_any)
            + usize::from(self.assert_mod_count.is_some())
            + usize::from(self.assert_count.is_some())
            + usize::from(self.assert_max.is_some())
            + usize::from(self.assert_min.is_some())
    }

    fn check_option_conflicts(&self) -> SelectResult<()> {
        const COMMON: &str = "-add, -del, -assert-none, -assert-any, -assert-mod-count, \
                              -assert-count, -assert-max, or -assert-min";

        let tally = self.common_flagset_tally();
        let reporting = self.list || self.write_file.is_some() || self.count;
        let others = tally > 0
            || reporting
            || self.set.is_some()
            || self.unset.is_some()
            || self.module.is_some()
            || self.read_file.is_some()
            || !self.args.is_empty();

        if self.clear && (self.none || others) {
            return Err(SelectError::Syntax(
                "option -clear can not be combined with any other options".into(),
            ));
        }
        if self.none && others {
            return Err(SelectError::Syntax(
                "option -none can not be combined with any other options".into(),
            ));
        }
        if tally > 1 {
            return Err(SelectError::Syntax(format!(
                "options {COMMON} can not be combined"
            )));
        }
        if reporting && tally > 0 {
            return Err(SelectError::Syntax(format!(
                "options -list, -list-mod, -write and -count can not be combined with {COMMON}"
            )));
        }
        if self.set.is_some() && (reporting || self.unset.is_some() || tally > 0) {
            return Err(SelectError::Syntax(format!(
                "option -set can not be combined with -list, -write, -count, -unset, {COMMON}"
            )));
        }
        if self.unset.is_some() && (reporting || self.set.is_some() || tally > 0) {
            return Err(SelectError::Syntax(format!(
                "option -unset can not be combined with -list, -write, -count, -set, {COMMON}"
            )));
        }
        Ok(())
    }

    /// Executes the command against a design.
    pub fn execute(
        &self,
        design: &mut Design,
        interner: &Interner,
        sink: &DiagnosticSink,
    ) -> SelectResult<SelectOutcome> {
        self.check_option_conflicts()?;

        if let Some(name) = &self.module {
            let id = interner.intern_id(name);
            if !design.has_module(id) {
                return Err(SelectError::NoSuchModule(name.clone()));
            }
            design.selected_active_module = Some(id);
        }

        let mut work: Vec<Selection> = Vec::new();
        let mut sel_str = String::new();
        let suppress = self.suppress_empty_warning();
        for arg in &self.args {
            select_stmt(design, interner, sink, &mut work, arg, suppress)?;
            sel_str.push(' ');
            sel_str.push_str(arg);
        }

        if let Some(path) = &self.read_file {
            if !sel_str.is_empty() {
                return Err(SelectError::Syntax(
                    "option -read can not be combined with a selection expression".into(),
                ));
            }
            work.push(self.read_selection(design, interner, sink, path)?);
        }

        if work.is_empty() && self.module.is_some() {
            let mut sel = Selection::full();
            select_filter_active_mod(design, &mut sel);
            work.push(sel);
        }

        fold_work_stack(design, interner, &mut work);

        if self.clear {
            *design.selection_mut() = Selection::full();
            design.selected_active_module = None;
            return Ok(SelectOutcome::default());
        }

        if self.none {
            *design.selection_mut() = Selection::empty(false);
            return Ok(SelectOutcome::default());
        }

        if self.list || self.count || self.write_file.is_some() {
            return self.report(design, interner, work.pop());
        }

        if self.add {
            let top = work
                .pop()
                .ok_or(SelectError::MissingSelection("nothing to add to selection"))?;
            let mut current = design.selection().clone();
            crate::ops::select_op_union(design, interner, &mut current, &top);
            current.optimize(design, interner);
            *design.selection_mut() = current;
            return Ok(SelectOutcome::default());
        }

        if self.del {
            let top = work.pop().ok_or(SelectError::MissingSelection(
                "nothing to delete from selection",
            ))?;
            let mut current = design.selection().clone();
            crate::ops::select_op_diff(design, interner, &mut current, &top);
            current.optimize(design, interner);
            *design.selection_mut() = current;
            return Ok(SelectOutcome::default());
        }

        if self.assert_none
            || self.assert_any
            || self.assert_mod_count.is_some()
            || self.assert_count.is_some()
            || self.assert_max.is_some()
            || self.assert_min.is_some()
        {
            let mut sel = work
                .pop()
                .ok_or(SelectError::MissingSelection("no selection to check"))?;
            sel.optimize(design, interner);
            return self.check_assertions(design, interner, &sel, &sel_str);
        }

        if let Some(name) = &self.set {
            let sel = work.pop().unwrap_or_else(|| Selection::empty(false));
            design.save_selection(interner.intern_id(name), sel);
            return Ok(SelectOutcome::default());
        }

        if let Some(name) = &self.unset {
            if !design.remove_saved_selection(interner.intern_id(name)) {
                return Err(SelectError::UndefinedSelection(name.clone()));
            }
            return Ok(SelectOutcome::default());
        }

        if let Some(mut top) = work.pop() {
            top.optimize(design, interner);
            *design.selection_mut() = top;
            return Ok(SelectOutcome::default());
        }

        // No expression: report the current selection in compact form.
        let mut outcome = SelectOutcome::default();
        let sel = design.selection();
        if sel.full_selection {
            outcome.lines.push("*".to_string());
        }
        for &module in &sel.selected_modules {
            outcome.lines.push(interner.display(module).to_string());
        }
        for (&module, members) in &sel.selected_members {
            for &member in members {
                outcome.lines.push(format!(
                    "{}/{}",
                    interner.display(module),
                    interner.display(member)
                ));
            }
        }
        Ok(outcome)
    }

    fn read_selection(
        &self,
        design: &Design,
        interner: &Interner,
        sink: &DiagnosticSink,
        path: &PathBuf,
    ) -> SelectResult<Selection> {
        let text = std::fs::read_to_string(path).map_err(|source| SelectError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let mut sel = Selection::empty(false);
        for line in text.lines() {
            let Some((module, member)) = line.split_once('/') else {
                sink.warn(format!("ignoring line without slash in 'select -read': {line}"));
                continue;
            };
            sel.selected_members
                .entry(interner.intern_id(module))
                .or_default()
                .insert(interner.intern_id(member));
        }

        select_filter_active_mod(design, &mut sel);
        sel.optimize(design, interner);
        Ok(sel)
    }

    fn report(
        &self,
        design: &Design,
        interner: &Interner,
        top: Option<Selection>,
    ) -> SelectResult<SelectOutcome> {
        let mut outcome = SelectOutcome::default();
        let mut file_lines = Vec::new();

        {
            let mut sel = match top {
                Some(sel) => sel,
                None => design.selection().clone(),
            };
            sel.optimize(design, interner);

            for module in design.modules() {
                if !sel.selected_module(design, interner, module.name) {
                    continue;
                }
                if self.list && sel.selected_whole_module(design, interner, module.name) {
                    outcome.lines.push(interner.display(module.name).to_string());
                }
                if self.list_mod {
                    continue;
                }
                for member in selected_member_names(design, interner, &sel, module) {
                    let line = format!(
                        "{}/{}",
                        interner.display(module.name),
                        interner.display(member)
                    );
                    if self.list {
                        outcome.lines.push(line.clone());
                    }
                    file_lines.push(line);
                }
            }
        }

        if self.count {
            outcome.count = Some(file_lines.len());
        }

        if let Some(path) = &self.write_file {
            let mut file = std::fs::File::create(path).map_err(|source| SelectError::Io {
                path: path.display().to_string(),
                source,
            })?;
            for line in &file_lines {
                writeln!(file, "{line}").map_err(|source| SelectError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
            }
        }

        Ok(outcome)
    }

    fn check_assertions(
        &self,
        design: &Design,
        interner: &Interner,
        sel: &Selection,
        sel_str: &str,
    ) -> SelectResult<SelectOutcome> {
        if self.assert_none && !sel.is_empty() {
            return Err(SelectError::AssertNonEmpty {
                expr: sel_str.to_string(),
                details: describe_selection(design, interner, sel, true),
            });
        }
        if self.assert_any && sel.is_empty() {
            return Err(SelectError::AssertEmpty {
                expr: sel_str.to_string(),
            });
        }

        let mut module_count = 0;
        let mut total_count = 0;
        for module in design.modules() {
            if !sel.selected_module(design, interner, module.name) {
                continue;
            }
            module_count += 1;
            total_count += selected_member_names(design, interner, sel, module).count();
        }

        if let Some(expected) = self.assert_mod_count {
            if expected != module_count {
                return Err(SelectError::AssertModCount {
                    expected,
                    actual: module_count,
                    expr: sel_str.to_string(),
                });
            }
        }
        if let Some(expected) = self.assert_count {
            if expected != total_count {
                return Err(SelectError::AssertCount {
                    expected,
                    actual: total_count,
                    expr: sel_str.to_string(),
                    details: describe_selection(design, interner, sel, false),
                });
            }
        }
        if let Some(expected) = self.assert_max {
            if total_count > expected {
                return Err(SelectError::AssertMax {
                    expected,
                    actual: total_count,
                    expr: sel_str.to_string(),
                    details: describe_selection(design, interner, sel, false),
                });
            }
        }
        if let Some(expected) = self.assert_min {
            if total_count < expected {
                return Err(SelectError::AssertMin {
                    expected,
                    actual: total_count,
                    expr: sel_str.to_string(),
                    details: describe_selection(design, interner, sel, false),
                });
            }
        }

        Ok(SelectOutcome::default())
    }
}

fn selected_member_names<'a>(
    design: &'a Design,
    interner: &'a Interner,
    sel: &'a Selection,
    module: &'a Module,
) -> impl Iterator<Item = Ident> + 'a {
    module
        .member_names()
        .filter(move |&name| sel.selected_member(design, interner, module.name, name))
}

fn describe_selection(
    design: &Design,
    interner: &Interner,
    sel: &Selection,
    whole_modules: bool,
) -> String {
    let mut desc = String::from("Selection contains:\n");
    for module in design.modules() {
        if !sel.selected_module(design, interner, module.name) {
            continue;
        }
        if whole_modules && sel.selected_whole_module(design, interner, module.name) {
            desc.push_str(interner.display(module.name));
            desc.push('\n');
        }
        for member in selected_member_names(design, interner, sel, module) {
            desc.push_str(&format!(
                "{}/{}\n",
                interner.display(module.name),
                interner.display(member)
            ));
        }
    }
    desc
}
