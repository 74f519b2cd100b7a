//! Selection expression engine.
//!
//! Selections are resolved from a small stack-based expression language:
//! pattern tokens push freshly computed [`Selection`](silica_ir::Selection)
//! values onto a work stack, `%` operator tokens combine or transform the
//! entries already on it, and whatever remains at the end is unioned into
//! the final result.
//!
//! The [`stmt`] module is the single-token interpreter, [`ops`] the set
//! algebra it dispatches to, [`expand`] the connection-graph expansion
//! operators, [`pattern`] the identifier and attribute matchers, and
//! [`command`] the structured `select` entry point used by command
//! dispatch.

#![warn(missing_docs)]

pub mod command;
pub mod error;
pub mod expand;
pub mod ops;
pub mod pattern;
pub mod stmt;

pub use command::{SelectCommand, SelectOutcome};
pub use error::{SelectError, SelectResult};
pub use stmt::{eval_select_args, select_stmt};
