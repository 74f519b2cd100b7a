//! Process definitions.

use crate::ids::ProcessId;
use crate::Attributes;
use serde::{Deserialize, Serialize};
use silica_common::Ident;

/// A behavioral process within a module.
///
/// Processes are opaque to the selection and query layers; only their
/// name and attributes participate in matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Process {
    /// The unique ID of this process within its module.
    pub id: ProcessId,
    /// The process name (escaped form).
    pub name: Ident,
    /// Attributes attached to this process.
    pub attributes: Attributes,
}
