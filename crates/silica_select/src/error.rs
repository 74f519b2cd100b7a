//! Selection errors.

use thiserror::Error;

/// Convenience alias for results in this crate.
pub type SelectResult<T> = Result<T, SelectError>;

/// Errors raised while evaluating selection expressions or executing the
/// `select` operation.
///
/// Syntax and stack errors abort the current command without touching the
/// design-wide selection state; the work stack they corrupt is local to
/// one evaluation.
#[derive(Debug, Error)]
pub enum SelectError {
    /// A malformed selection expression or option combination.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// An operator token that is not part of the language.
    #[error("unknown selection operator '{0}'")]
    UnknownOperator(String),

    /// An operator found fewer work-stack entries than it consumes.
    #[error("must have at least {needed} element(s) on the stack for operator {op}")]
    StackUnderflow {
        /// The operator token.
        op: String,
        /// How many stack entries the operator requires.
        needed: usize,
    },

    /// A `@name` reference to a saved selection that does not exist.
    #[error("selection @{0} is not defined")]
    UndefinedSelection(String),

    /// A `-module` or `cd` target that does not exist.
    #[error("no such module: {0}")]
    NoSuchModule(String),

    /// An operation that needs a selection argument got none.
    #[error("{0}")]
    MissingSelection(&'static str),

    /// `-assert-none` failed: the selection is not empty.
    #[error("assertion failed: selection is not empty:{expr}\n{details}")]
    AssertNonEmpty {
        /// The selection expression that was checked.
        expr: String,
        /// The offending selection contents.
        details: String,
    },

    /// `-assert-any` failed: the selection is empty.
    #[error("assertion failed: selection is empty:{expr}")]
    AssertEmpty {
        /// The selection expression that was checked.
        expr: String,
    },

    /// `-assert-mod-count` failed.
    #[error("assertion failed: selection contains {actual} modules instead of the asserted {expected}:{expr}")]
    AssertModCount {
        /// The asserted module count.
        expected: usize,
        /// The actual module count.
        actual: usize,
        /// The selection expression that was checked.
        expr: String,
    },

    /// `-assert-count` failed.
    #[error("assertion failed: selection contains {actual} elements instead of the asserted {expected}:{expr}\n{details}")]
    AssertCount {
        /// The asserted object count.
        expected: usize,
        /// The actual object count.
        actual: usize,
        /// The selection expression that was checked.
        expr: String,
        /// The offending selection contents.
        details: String,
    },

    /// `-assert-max` failed.
    #[error("assertion failed: selection contains {actual} elements, more than the maximum number {expected}:{expr}\n{details}")]
    AssertMax {
        /// The asserted maximum.
        expected: usize,
        /// The actual object count.
        actual: usize,
        /// The selection expression that was checked.
        expr: String,
        /// The offending selection contents.
        details: String,
    },

    /// `-assert-min` failed.
    #[error("assertion failed: selection contains {actual} elements, less than the minimum number {expected}:{expr}\n{details}")]
    AssertMin {
        /// The asserted minimum.
        expected: usize,
        /// The actual object count.
        actual: usize,
        /// The selection expression that was checked.
        expr: String,
        /// The offending selection contents.
        details: String,
    },

    /// A selection file could not be read or written.
    #[error("can't open '{path}': {source}")]
    Io {
        /// The file that failed.
        path: String,
        /// The underlying system error.
        #[source]
        source: std::io::Error,
    },
}
