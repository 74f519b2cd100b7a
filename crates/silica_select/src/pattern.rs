//! Identifier and attribute pattern matching.
//!
//! Identifier patterns are matched against the escaped database spelling
//! with a fixed precedence: exact match first, then the public name with
//! its sigil stripped, then shell-style wildcards (against the full and
//! the stripped spelling), and finally the suffix rule for generated
//! names. Attribute patterns add a relational comparison on the value.

use glob::Pattern;
use silica_common::Interner;
use silica_ir::{Attributes, Const};

/// Matches an escaped identifier against a pattern.
///
/// The pattern may be a literal name (with or without the `\` sigil) or
/// a shell-style wildcard using `*`, `?` and `[...]`. For generated
/// names, a pattern starting with `$` also matches on the substring
/// after the identifier's last `$`, so `$add` matches `$auto$mod$add`.
pub fn match_ids(id: &str, pattern: &str) -> bool {
    if id == pattern {
        return true;
    }
    if let Some(stripped) = id.strip_prefix('\\') {
        if stripped == pattern {
            return true;
        }
    }
    if wildcard_match(pattern, id) {
        return true;
    }
    if let Some(stripped) = id.strip_prefix('\\') {
        if wildcard_match(pattern, stripped) {
            return true;
        }
    }
    if id.starts_with('$') && pattern.starts_with('$') {
        if let Some(pos) = id.rfind('$') {
            if &id[pos..] == pattern {
                return true;
            }
        }
    }
    false
}

fn wildcard_match(pattern: &str, s: &str) -> bool {
    // A pattern that fails to parse as a glob simply matches nothing.
    Pattern::new(pattern).is_ok_and(|p| p.matches(s))
}

fn has_wildcard(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Relational operator in an attribute match expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOp {
    /// No value constraint; the attribute only has to exist.
    Any,
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
}

/// Matches an attribute value against a pattern under a relational
/// operator.
///
/// Numeric values compare as integers against a decimal, `0x` hex or
/// `0b` binary pattern; a pattern that parses as none of these fails the
/// match instead of erroring. String values compare lexicographically,
/// and equality additionally accepts a wildcard pattern.
pub fn match_attr_val(value: &Const, pattern: &str, op: MatchOp) -> bool {
    if op == MatchOp::Any {
        return true;
    }

    if value.is_string() {
        let value_str = value.as_str().unwrap_or_default();
        if op == MatchOp::Eq && wildcard_match(pattern, value_str) {
            return true;
        }
        match op {
            MatchOp::Any => true,
            MatchOp::Eq => value_str == pattern,
            MatchOp::Ne => value_str != pattern,
            MatchOp::Lt => value_str < pattern,
            MatchOp::Gt => value_str > pattern,
            MatchOp::Le => value_str <= pattern,
            MatchOp::Ge => value_str >= pattern,
        }
    } else {
        let Some(pattern_value) = parse_numeric_pattern(pattern) else {
            return false;
        };
        let Some(value) = value.as_int() else {
            return false;
        };
        match op {
            MatchOp::Any => true,
            MatchOp::Eq => value == pattern_value,
            MatchOp::Ne => value != pattern_value,
            MatchOp::Lt => value < pattern_value,
            MatchOp::Gt => value > pattern_value,
            MatchOp::Le => value <= pattern_value,
            MatchOp::Ge => value >= pattern_value,
        }
    }
}

fn parse_numeric_pattern(pattern: &str) -> Option<i64> {
    if let Some(hex) = pattern.strip_prefix("0x") {
        return i64::from_str_radix(hex, 16).ok();
    }
    if let Some(bin) = pattern.strip_prefix("0b") {
        return i64::from_str_radix(bin, 2).ok();
    }
    pattern.parse().ok()
}

/// Matches an attribute table against a `name`, `name=value` or
/// `name<op>value` expression.
///
/// A wildcard in the name part scans all attributes; a literal name is
/// looked up directly, both in its given spelling and with the public
/// `\` sigil prepended.
pub fn match_attr(attributes: &Attributes, interner: &Interner, expr: &str) -> bool {
    let (name_pat, value_pat, op) = split_attr_expr(expr);
    match_attr_parts(attributes, interner, name_pat, value_pat, op)
}

fn split_attr_expr(expr: &str) -> (&str, &str, MatchOp) {
    let Some(pos) = expr.find(['<', '!', '=', '>']) else {
        return (expr, "", MatchOp::Any);
    };
    let rest = &expr[pos..];
    if rest.starts_with("!=") {
        (&expr[..pos], &expr[pos + 2..], MatchOp::Ne)
    } else if rest.starts_with("<=") {
        (&expr[..pos], &expr[pos + 2..], MatchOp::Le)
    } else if rest.starts_with(">=") {
        (&expr[..pos], &expr[pos + 2..], MatchOp::Ge)
    } else {
        let op = match expr.as_bytes()[pos] {
            b'=' => MatchOp::Eq,
            b'<' => MatchOp::Lt,
            b'>' => MatchOp::Gt,
            // A lone `!` compares like `!=` with an empty tail.
            _ => MatchOp::Ne,
        };
        (&expr[..pos], &expr[pos + 1..], op)
    }
}

fn match_attr_parts(
    attributes: &Attributes,
    interner: &Interner,
    name_pat: &str,
    value_pat: &str,
    op: MatchOp,
) -> bool {
    if has_wildcard(name_pat) {
        for (&name, value) in attributes {
            let name_str = interner.resolve(name);
            if wildcard_match(name_pat, name_str) && match_attr_val(value, value_pat, op) {
                return true;
            }
            if let Some(stripped) = name_str.strip_prefix('\\') {
                if wildcard_match(name_pat, stripped) && match_attr_val(value, value_pat, op) {
                    return true;
                }
            }
        }
    } else {
        if name_pat.starts_with(['\\', '$']) {
            if let Some(id) = interner.get(name_pat) {
                if let Some(value) = attributes.get(&id) {
                    if match_attr_val(value, value_pat, op) {
                        return true;
                    }
                }
            }
        }
        if let Some(id) = interner.get(&format!("\\{name_pat}")) {
            if let Some(value) = attributes.get(&id) {
                if match_attr_val(value, value_pat, op) {
                    return true;
                }
            }
        }
    }
    false
}
