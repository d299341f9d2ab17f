//! String interner for identifier storage.
//!
//! Provides O(1) interning and lookup behind a `RwLock`, so every compiler
//! phase can intern through a shared `&StringInterner`.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::Name;

/// Builtin type names pre-interned at construction, in `TypeId` order.
pub(crate) const BUILTIN_TYPE_NAMES: &[&str] = &["error", "void", "bool", "int", "string", "object"];

struct Inner {
    /// Map from string content to index.
    map: FxHashMap<&'static str, u32>,
    /// Storage for string contents.
    strings: Vec<&'static str>,
}

/// String interner producing [`Name`] handles.
///
/// Interned strings are leaked into `'static` storage; the interner lives
/// for the duration of a compilation, so the leak is bounded by the source
/// text plus synthesized qualified names.
pub struct StringInterner {
    inner: RwLock<Inner>,
}

impl StringInterner {
    /// Create a new interner with the empty string at index 0 and the
    /// builtin type names pre-interned.
    pub fn new() -> Self {
        let mut inner = Inner {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(256),
        };
        let empty: &'static str = "";
        inner.map.insert(empty, 0);
        inner.strings.push(empty);

        let interner = StringInterner {
            inner: RwLock::new(inner),
        };
        for name in BUILTIN_TYPE_NAMES {
            interner.intern(name);
        }
        interner
    }

    /// Intern a string, returning its `Name`.
    ///
    /// Interning the same content twice returns the same `Name`.
    pub fn intern(&self, s: &str) -> Name {
        // Fast path: already interned.
        {
            let inner = self.inner.read();
            if let Some(&idx) = inner.map.get(s) {
                return Name::from_raw(idx);
            }
        }

        let mut inner = self.inner.write();
        // Re-check under the write lock: another caller may have interned
        // between the read release and the write acquire.
        if let Some(&idx) = inner.map.get(s) {
            return Name::from_raw(idx);
        }
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        let idx = u32::try_from(inner.strings.len()).unwrap_or_else(|_| {
            panic!("interner overflow: more than u32::MAX distinct strings")
        });
        inner.map.insert(leaked, idx);
        inner.strings.push(leaked);
        Name::from_raw(idx)
    }

    /// Look up the content of an interned name.
    ///
    /// # Panics
    /// Panics if `name` did not come from this interner.
    pub fn lookup(&self, name: Name) -> &'static str {
        let inner = self.inner.read();
        inner.strings[name.index()]
    }

    /// Number of interned strings.
    pub fn len(&self) -> usize {
        self.inner.read().strings.len()
    }

    /// Check if the interner holds only the pre-interned entries.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1 + BUILTIN_TYPE_NAMES.len()
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_dedupes() {
        let interner = StringInterner::new();
        let a = interner.intern("hello");
        let b = interner.intern("hello");
        let c = interner.intern("world");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(interner.lookup(a), "hello");
        assert_eq!(interner.lookup(c), "world");
    }

    #[test]
    fn empty_string_is_name_empty() {
        let interner = StringInterner::new();
        assert_eq!(interner.intern(""), Name::EMPTY);
        assert_eq!(interner.lookup(Name::EMPTY), "");
    }

    #[test]
    fn builtin_names_are_pre_interned() {
        let interner = StringInterner::new();
        let before = interner.len();
        for name in BUILTIN_TYPE_NAMES {
            interner.intern(name);
        }
        // Nothing new was added.
        assert_eq!(interner.len(), before);
    }
}
