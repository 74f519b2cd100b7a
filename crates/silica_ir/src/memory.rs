//! Memory definitions.

use crate::ids::MemoryId;
use crate::Attributes;
use serde::{Deserialize, Serialize};
use silica_common::Ident;

/// An addressable memory block within a module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    /// The unique ID of this memory within its module.
    pub id: MemoryId,
    /// The memory name (escaped form).
    pub name: Ident,
    /// Width of each memory word in bits.
    pub width: u32,
    /// Number of addressable words.
    pub size: u32,
    /// Attributes attached to this memory.
    pub attributes: Attributes,
}
