//! Scope manager: chained scopes over the symbol arena
#![allow(dead_code)]

use std::collections::HashMap;

use log::trace;

use crate::semantic::symbol::{Symbol, SymbolId, SymbolTable};
use crate::utils::{Error, Result};

/// Unique identifier for a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

/// A scope mapping names to symbols
#[derive(Debug)]
struct Scope {
    parent: Option<ScopeId>,
    names: HashMap<String, SymbolId>,
}

impl Scope {
    fn new(parent: Option<ScopeId>) -> Self {
        Self { parent, names: HashMap::new() }
    }
}

/// Owned by one compilation; scopes are popped on exit but the symbols they
/// declared stay in the arena.
pub struct ScopeManager {
    scopes: Vec<Scope>,
    current: ScopeId,
    symbols: SymbolTable,
}

impl ScopeManager {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(None)],
            current: ScopeId(0),
            symbols: SymbolTable::new(),
        }
    }

    /// Drop every scope and symbol and recreate the global scope
    pub fn reset(&mut self) {
        self.scopes.clear();
        self.scopes.push(Scope::new(None));
        self.current = ScopeId(0);
        self.symbols.clear();
    }

    /// Enter a new scope
    pub fn enter_scope(&mut self) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope::new(Some(self.current)));
        self.current = id;
        id
    }

    /// Exit the current scope
    pub fn exit_scope(&mut self) {
        if let Some(parent) = self.scopes[self.current.0].parent {
            self.current = parent;
        }
    }

    pub fn current_scope(&self) -> ScopeId {
        self.current
    }

    /// Declare a symbol in the current scope
    pub fn declare(&mut self, symbol: Symbol) -> Result<SymbolId> {
        if self.scopes[self.current.0].names.contains_key(&symbol.name) {
            return Err(Error::DuplicateDefinition {
                name: symbol.name,
                span: symbol.span,
            });
        }
        let name = symbol.name.clone();
        let id = self.symbols.push(symbol);
        trace!("declare {} as {} in scope {}", name, id, self.current.0);
        self.scopes[self.current.0].names.insert(name, id);
        Ok(id)
    }

    /// Look up a name, searching from the current scope outward
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        let mut scope = Some(self.current);
        while let Some(id) = scope {
            let s = &self.scopes[id.0];
            if let Some(&sym) = s.names.get(name) {
                return Some(sym);
            }
            scope = s.parent;
        }
        None
    }

    /// Look up a name in the current scope only
    pub fn lookup_local(&self, name: &str) -> Option<SymbolId> {
        self.scopes[self.current.0].names.get(name).copied()
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    /// Hand the arena to the later passes
    pub fn into_symbols(self) -> SymbolTable {
        self.symbols
    }
}

impl Default for ScopeManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::symbol::SymbolKind;
    use crate::types::Type;
    use crate::utils::Span;

    fn var(name: &str) -> Symbol {
        Symbol::new(name, SymbolKind::Variable, Type::Int, Span::dummy())
    }

    #[test]
    fn test_lookup_walks_parents() {
        let mut scopes = ScopeManager::new();
        let a = scopes.declare(var("a")).unwrap();
        scopes.enter_scope();
        assert_eq!(scopes.lookup("a"), Some(a));
        assert_eq!(scopes.lookup_local("a"), None);
        assert_eq!(scopes.lookup("b"), None);
    }

    #[test]
    fn test_shadowing_and_exit() {
        let mut scopes = ScopeManager::new();
        let outer = scopes.declare(var("a")).unwrap();
        scopes.enter_scope();
        let inner = scopes.declare(var("a")).unwrap();
        assert_ne!(outer, inner);
        assert_eq!(scopes.lookup("a"), Some(inner));
        scopes.exit_scope();
        assert_eq!(scopes.lookup("a"), Some(outer));
        // symbols survive scope exit
        assert_eq!(scopes.symbols().len(), 2);
    }

    #[test]
    fn test_duplicate_in_same_scope() {
        let mut scopes = ScopeManager::new();
        scopes.declare(var("a")).unwrap();
        let err = scopes.declare(var("a")).unwrap_err();
        assert!(matches!(err, Error::DuplicateDefinition { ref name, .. } if name == "a"));
    }

    #[test]
    fn test_sibling_scopes_may_reuse_names() {
        let mut scopes = ScopeManager::new();
        scopes.enter_scope();
        scopes.declare(var("x")).unwrap();
        scopes.exit_scope();
        scopes.enter_scope();
        assert!(scopes.declare(var("x")).is_ok());
    }

    #[test]
    fn test_reset() {
        let mut scopes = ScopeManager::new();
        scopes.declare(var("a")).unwrap();
        scopes.enter_scope();
        scopes.reset();
        assert_eq!(scopes.lookup("a"), None);
        assert!(scopes.symbols().is_empty());
        assert!(scopes.declare(var("a")).is_ok());
    }
}
