//! String interner for stub names.
//!
//! Names are [`SmolStr`]s: short names are stored inline and longer ones
//! share a single heap allocation, so cloning an interned name never copies
//! the text. The interner deduplicates names so identical strings coming
//! from one file (or one decoded blob) share the same allocation.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

/// An interned name - cheap to clone.
pub type Name = SmolStr;

/// Deduplicating name interner.
#[derive(Debug, Default, Clone)]
pub struct Interner {
    names: FxHashSet<Name>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning a cheap-to-clone name.
    ///
    /// If the string was already interned, returns the existing name.
    pub fn intern(&mut self, s: &str) -> Name {
        if let Some(existing) = self.names.get(s) {
            existing.clone()
        } else {
            let name = Name::new(s);
            self.names.insert(name.clone());
            name
        }
    }

    /// Get an interned name if it exists, without creating it.
    pub fn get(&self, s: &str) -> Option<Name> {
        self.names.get(s).cloned()
    }

    /// Number of unique names interned.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if no names have been interned.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
