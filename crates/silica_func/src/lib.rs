//! Functional intermediate representation.
//!
//! This crate re-expresses a hardware module's combinational and
//! sequential behavior as a pure expression graph: outputs and next-state
//! values are side-effect-free functions of inputs and current state.
//! Nodes live in a hash-consed [`ComputeGraph`], so structurally identical
//! subexpressions share one node.
//!
//! Construction goes through [`Factory`], which validates operand sorts up
//! front and applies trivial identity simplifications. Consumers interpret
//! the graph exclusively through the [`Visitor`] trait; [`eval`] contains
//! the reference consumer, a 4-state logic evaluator.

#![warn(missing_docs)]

pub mod eval;
pub mod graph;
pub mod ir;
pub mod sort;
pub mod visitor;

pub use eval::{EvalError, Evaluator, MemContents, Value};
pub use graph::{ComputeGraph, NodeId};
pub use ir::{Factory, FunctionalIr, Node, NodeData, PortKey};
pub use sort::Sort;
pub use visitor::Visitor;
