//! Shared foundational types for the Silica netlist compiler.
//!
//! This crate provides interned identifiers and the identifier escaping
//! conventions used throughout the design database, 4-state logic values,
//! packed logic vectors, and common result types.

#![warn(missing_docs)]

pub mod ident;
pub mod logic;
pub mod logic_vec;
pub mod result;

pub use ident::{escape_id, unescape_id, Ident, Interner};
pub use logic::Logic;
pub use logic_vec::LogicVec;
pub use result::{InternalError, SilicaResult};
