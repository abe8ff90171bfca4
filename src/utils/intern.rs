//! Symbol interning for array base names.
//!
//! Dependence testing compares array bases by identity, so every base name
//! is interned once and compared as a `Symbol` thereafter.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::RwLock;
use string_interner::{backend::StringBackend, DefaultSymbol, StringInterner, Symbol as SymbolTrait};

/// Type alias for our interner backend
type Backend = StringBackend<DefaultSymbol>;

/// A symbol representing an interned array base name.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(u32);

impl Symbol {
    pub(crate) fn from_raw(index: u32) -> Self {
        Symbol(index)
    }

    /// The raw interner index.
    pub fn as_raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match resolve(*self) {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "<sym{}>", self.0),
        }
    }
}

/// Global symbol interner (thread-safe).
static GLOBAL_INTERNER: Lazy<RwLock<StringInterner<Backend>>> =
    Lazy::new(|| RwLock::new(StringInterner::new()));

/// A symbol interner for efficient string storage.
#[derive(Debug)]
pub struct SymbolInterner {
    interner: StringInterner<Backend>,
}

impl Default for SymbolInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolInterner {
    /// Create an empty interner.
    pub fn new() -> Self {
        Self {
            interner: StringInterner::new(),
        }
    }

    /// Intern a string, returning its symbol.
    pub fn intern(&mut self, s: &str) -> Symbol {
        let sym = self.interner.get_or_intern(s);
        Symbol(sym.to_usize() as u32)
    }

    /// Resolve a symbol back to its string.
    pub fn resolve(&self, sym: Symbol) -> Option<&str> {
        let internal_sym = DefaultSymbol::try_from_usize(sym.0 as usize)?;
        self.interner.resolve(internal_sym)
    }

    /// Look up a previously interned string.
    pub fn get(&self, s: &str) -> Option<Symbol> {
        self.interner.get(s).map(|sym| Symbol(sym.to_usize() as u32))
    }

    /// Number of interned strings.
    pub fn len(&self) -> usize {
        self.interner.len()
    }

    /// Whether the interner is empty.
    pub fn is_empty(&self) -> bool {
        self.interner.is_empty()
    }
}

/// Intern a string in the global interner.
pub fn intern(s: &str) -> Symbol {
    let mut interner = GLOBAL_INTERNER.write().unwrap();
    let sym = interner.get_or_intern(s);
    Symbol(sym.to_usize() as u32)
}

/// Resolve a symbol from the global interner.
pub fn resolve(sym: Symbol) -> Option<String> {
    let interner = GLOBAL_INTERNER.read().unwrap();
    let internal_sym = DefaultSymbol::try_from_usize(sym.0 as usize)?;
    interner.resolve(internal_sym).map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interner() {
        let mut interner = SymbolInterner::new();
        let sym1 = interner.intern("A");
        let sym2 = interner.intern("B");
        let sym3 = interner.intern("A");
        assert_eq!(sym1, sym3);
        assert_ne!(sym1, sym2);
        assert_eq!(interner.resolve(sym1), Some("A"));
    }

    #[test]
    fn test_global_interner() {
        let sym1 = intern("workspace_array");
        let sym2 = intern("workspace_array");
        assert_eq!(sym1, sym2);
        assert_eq!(resolve(sym1), Some("workspace_array".to_string()));
        let _ = Symbol::from_raw(sym1.as_raw());
    }
}
