//! Diagnostics for the Silica netlist compiler core.
//!
//! The core never aborts on advisory conditions (a selection pattern that
//! matched nothing, an expansion that hit its object budget); it reports
//! them as warnings through a [`DiagnosticSink`] and continues. Hard user
//! errors are returned as `Result` errors by the component that detected
//! them; internal invariant violations are assertions.

#![warn(missing_docs)]

pub mod diagnostic;
pub mod severity;
pub mod sink;

pub use diagnostic::Diagnostic;
pub use severity::Severity;
pub use sink::DiagnosticSink;
