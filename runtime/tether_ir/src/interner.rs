//! Thread-safe string interner for type, function and property names.
//!
//! Lookups take a shared read lock; inserts re-check under the write lock so
//! two threads interning the same string always receive the same `Name`.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::Name;

#[derive(Default)]
struct InternTable {
    map: FxHashMap<&'static str, Name>,
    strings: Vec<&'static str>,
}

/// Error when the interner runs out of 32-bit indices.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("string interner exceeded capacity: {count} strings, max is {}", u32::MAX)]
pub struct InternError {
    pub count: usize,
}

/// String interner with O(1) interning and lookup.
///
/// Interned strings are leaked and live for the rest of the process. The
/// set of names is bounded by the registered object model, so this is the
/// same trade the metadata itself makes.
pub struct StringInterner {
    table: RwLock<InternTable>,
}

impl StringInterner {
    /// Create a new interner with the empty string pre-interned.
    pub fn new() -> Self {
        let mut table = InternTable::default();
        table.map.insert("", Name::EMPTY);
        table.strings.push("");
        StringInterner {
            table: RwLock::new(table),
        }
    }

    /// Try to intern a string, returning its `Name` or an error on overflow.
    pub fn try_intern(&self, s: &str) -> Result<Name, InternError> {
        if let Some(&name) = self.table.read().map.get(s) {
            return Ok(name);
        }

        let mut table = self.table.write();
        if let Some(&name) = table.map.get(s) {
            return Ok(name);
        }

        let raw = u32::try_from(table.strings.len()).map_err(|_| InternError {
            count: table.strings.len(),
        })?;
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        let name = Name::from_raw(raw);
        table.strings.push(leaked);
        table.map.insert(leaked, name);
        Ok(name)
    }

    /// Intern a string.
    ///
    /// # Panics
    /// Panics if more than `u32::MAX` strings are interned.
    pub fn intern(&self, s: &str) -> Name {
        self.try_intern(s).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Find a previously interned string without inserting it.
    pub fn get(&self, s: &str) -> Option<Name> {
        self.table.read().map.get(s).copied()
    }

    /// Look up the string for a `Name`.
    ///
    /// Unknown names (from another interner) resolve to the empty string.
    pub fn lookup(&self, name: Name) -> &'static str {
        self.table
            .read()
            .strings
            .get(name.index())
            .copied()
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.table.read().strings.len()
    }

    /// Check if the interner only holds the empty string.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StringInterner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StringInterner({} names)", self.len())
    }
}

/// Cloneable handle to a shared interner.
#[derive(Clone, Default)]
pub struct SharedInterner(Arc<StringInterner>);

impl SharedInterner {
    pub fn new() -> Self {
        SharedInterner(Arc::new(StringInterner::new()))
    }
}

impl std::ops::Deref for SharedInterner {
    type Target = StringInterner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Debug for SharedInterner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedInterner({} names)", self.0.len())
    }
}
