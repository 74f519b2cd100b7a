//! Interned identifiers and the design-database naming convention.
//!
//! All named entities in a design (modules, wires, cells, memories,
//! processes, attributes) carry an [`Ident`]: an interned string with O(1)
//! equality and cloning. Names follow a two-sigil convention:
//!
//! - Names starting with `\` are *public* names that came from the input
//!   source (`\counter`, `\clk`).
//! - Names starting with `$` are *generated* names invented by the compiler
//!   (`$add$top.v:14$3`). The suffix after the last `$` is the most
//!   specific part of a generated name.
//!
//! [`escape_id`] and [`unescape_id`] convert between the raw user-facing
//! spelling and the sigil-prefixed database spelling.

use lasso::ThreadedRodeo;
use serde::{Deserialize, Serialize};

/// A unique identifier for any named entity in the design.
///
/// Identifiers are interned strings represented as a `u32` index into a
/// string interner. `Ord` follows the interning order, which gives a
/// stable (if arbitrary) iteration order for identifier-keyed BTree
/// collections within one session.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct Ident(u32);

impl Ident {
    /// Creates an `Ident` from a raw `u32` index.
    ///
    /// This is primarily intended for deserialization and testing.
    /// In normal use, identifiers are created through [`Interner::get_or_intern`].
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw `u32` index of this identifier.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

// SAFETY: `Ident` wraps a `u32` which is always a valid `usize` on 32-bit
// and 64-bit platforms. `try_from_usize` rejects values that don't fit in
// `u32`.
unsafe impl lasso::Key for Ident {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn try_from_usize(int: usize) -> Option<Self> {
        u32::try_from(int).ok().map(Ident)
    }
}

/// Thread-safe string interner backed by [`lasso::ThreadedRodeo`].
///
/// All identifiers are interned here, providing O(1) equality, O(1)
/// cloning, and string deduplication across a compilation session.
pub struct Interner {
    rodeo: ThreadedRodeo<Ident>,
}

impl Interner {
    /// Creates a new empty interner.
    pub fn new() -> Self {
        Self {
            rodeo: ThreadedRodeo::new(),
        }
    }

    /// Interns a string, returning its [`Ident`]. If the string was already
    /// interned, returns the existing identifier without allocating.
    pub fn get_or_intern(&self, s: &str) -> Ident {
        self.rodeo.get_or_intern(s)
    }

    /// Interns the escaped (database) form of a raw name.
    ///
    /// Shorthand for `get_or_intern(&escape_id(name))`.
    pub fn intern_id(&self, name: &str) -> Ident {
        self.rodeo.get_or_intern(escape_id(name))
    }

    /// Returns the [`Ident`] of a string if it was previously interned.
    pub fn get(&self, s: &str) -> Option<Ident> {
        self.rodeo.get(s)
    }

    /// Resolves an [`Ident`] back to its string value.
    ///
    /// # Panics
    ///
    /// Panics if the `Ident` was not created by this interner.
    pub fn resolve(&self, ident: Ident) -> &str {
        self.rodeo.resolve(&ident)
    }

    /// Resolves an [`Ident`] to its user-facing spelling (sigil stripped
    /// for public names).
    pub fn display(&self, ident: Ident) -> &str {
        unescape_id(self.resolve(ident))
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts a raw name to its database spelling.
///
/// Names already carrying a `\` or `$` sigil are returned unchanged;
/// anything else gets the public `\` prefix. The empty string stays empty.
pub fn escape_id(name: &str) -> String {
    if name.is_empty() || name.starts_with('\\') || name.starts_with('$') {
        name.to_string()
    } else {
        format!("\\{name}")
    }
}

/// Converts a database spelling back to the user-facing form.
///
/// Strips the leading `\` from public names; generated (`$`) names are
/// returned unchanged.
pub fn unescape_id(name: &str) -> &str {
    name.strip_prefix('\\').unwrap_or(name)
}
