//! Semantic analysis
//!
//! Runs the passes in order:
//! - symbol building (scopes, declarations, bindings)
//! - type resolution, repeated until nothing changes
//! - finalization (default numeric type, unresolved identifiers)
//! - checking (rules unification cannot express)

pub mod symbol;
pub mod scope;
pub mod builder;
pub mod resolver;
pub mod finalizer;
pub mod checker;

use std::collections::HashMap;

use log::debug;

use crate::frontend::ast::{Ident, NodeId, Program};
use crate::types::Type;
use crate::utils::{Error, Result};

pub use builder::SymbolBuilder;
pub use checker::TypeChecker;
pub use finalizer::TypeFinalizer;
pub use resolver::TypeResolver;
pub use scope::ScopeManager;
pub use symbol::{MethodSig, Storage, Symbol, SymbolId, SymbolKind, SymbolTable};

/// Side tables produced by the passes, keyed by AST node id
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub symbols: SymbolTable,
    /// Identifier node -> symbol it resolves to
    pub bindings: HashMap<NodeId, SymbolId>,
    /// Expression node -> its current type
    pub types: HashMap<NodeId, Type>,
}

impl Analysis {
    /// Symbol bound to an identifier occurrence
    pub fn binding(&self, ident: &Ident) -> Result<SymbolId> {
        self.bindings.get(&ident.id).copied().ok_or_else(|| {
            Error::CodeGen(format!("identifier {} ({}) has no symbol", ident.name, ident.id))
        })
    }

    pub fn symbol(&self, ident: &Ident) -> Result<&Symbol> {
        Ok(self.symbols.get(self.binding(ident)?))
    }

    /// Current type of an expression node (`Undefined` if never annotated)
    pub fn type_of(&self, id: NodeId) -> Type {
        self.types.get(&id).copied().unwrap_or(Type::Undefined)
    }

    /// First symbol with this name, in declaration order
    pub fn lookup_name(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().map(|(_, s)| s).find(|s| s.name == name)
    }
}

/// Analyze a program with a fresh scope manager
pub fn analyze(program: &Program) -> Result<Analysis> {
    let mut scopes = ScopeManager::new();
    analyze_with(program, &mut scopes)
}

/// Analyze a program, resetting and reusing the given scope manager
pub fn analyze_with(program: &Program, scopes: &mut ScopeManager) -> Result<Analysis> {
    scopes.reset();

    let mut analysis = SymbolBuilder::new(scopes).build(program)?;
    debug!(
        "symbols built: {} symbols, {} bindings",
        analysis.symbols.len(),
        analysis.bindings.len()
    );

    let iterations = resolve_to_fixpoint(program, &mut analysis)?;
    debug!("type resolution stable after {} passes", iterations);

    TypeFinalizer::new(&mut analysis).finalize()?;
    TypeChecker::new(&analysis).check(program)?;
    debug!("type check passed for program {}", program.name.name);

    Ok(analysis)
}

/// Run resolver traversals until one reports no change; returns the traversal count
pub fn resolve_to_fixpoint(program: &Program, analysis: &mut Analysis) -> Result<usize> {
    let mut iterations = 0;
    loop {
        iterations += 1;
        let changed = TypeResolver::new(analysis).resolve(program)?;
        debug!("resolver pass {}: changed = {}", iterations, changed);
        if !changed {
            return Ok(iterations);
        }
    }
}
