//! Identifier table shared by every declaration of a program.
//!
//! Symbols are dense: the n-th distinct string gets `Symbol(n)`, so a
//! program built twice from the same source interns identically.

use hashbrown::HashMap;
use rustc_hash::FxBuildHasher;

use crate::Symbol;

#[derive(Debug, Clone)]
pub struct Interner {
    ids: HashMap<Box<str>, Symbol, FxBuildHasher>,
    names: Vec<Box<str>>,
}

impl Default for Interner {
    fn default() -> Self {
        Self {
            ids: HashMap::with_hasher(FxBuildHasher),
            names: Vec::new(),
        }
    }
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, name: &str) -> Symbol {
        if let Some(sym) = self.lookup(name) {
            return sym;
        }
        let sym = Symbol::new(self.names.len() as u32);
        self.names.push(name.into());
        self.ids.insert(name.into(), sym);
        sym
    }

    /// The string behind `sym`. Panics on a symbol from another interner.
    pub fn resolve(&self, sym: Symbol) -> &str {
        &self.names[sym.index() as usize]
    }

    /// Symbol of an already interned name; never interns.
    pub fn lookup(&self, name: &str) -> Option<Symbol> {
        self.ids.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// All names in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| (Symbol::new(i as u32), &**name))
    }
}
