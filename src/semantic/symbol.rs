//! Symbols and the symbol arena
#![allow(dead_code)]

use std::fmt;

use crate::types::Type;
use crate::utils::Span;

/// Index of a symbol in the [`SymbolTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub(crate) usize);

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Where a symbol's value lives at run time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    /// Slot in the activation of the owning routine
    Local,
    /// Named field of the emitted unit
    Global,
}

/// Ordered parameter list of a procedure or function
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodSig {
    pub params: Vec<SymbolId>,
}

/// Kind of symbol
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolKind {
    Variable,
    /// `ty` is the element type
    Array,
    /// No return type; the symbol's `ty` stays `Undefined`
    Procedure(MethodSig),
    /// `ty` is the declared return type
    Function(MethodSig),
}

impl SymbolKind {
    pub fn describe(&self) -> &'static str {
        match self {
            SymbolKind::Variable => "variable",
            SymbolKind::Array => "array",
            SymbolKind::Procedure(_) => "procedure",
            SymbolKind::Function(_) => "function",
        }
    }

    pub fn signature(&self) -> Option<&MethodSig> {
        match self {
            SymbolKind::Procedure(sig) | SymbolKind::Function(sig) => Some(sig),
            _ => None,
        }
    }
}

/// Symbol information
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub ty: Type,
    pub storage: Storage,
    /// Procedure or function whose body declares this symbol
    pub owner: Option<SymbolId>,
    pub span: Span,
    /// Local slot, assigned once by code generation
    pub address: Option<u16>,
    /// Global field or routine name, assigned once by code generation
    pub backing: Option<String>,
}

impl Symbol {
    pub fn new(name: &str, kind: SymbolKind, ty: Type, span: Span) -> Self {
        Self {
            name: name.to_string(),
            kind,
            ty,
            storage: Storage::Global,
            owner: None,
            span,
            address: None,
            backing: None,
        }
    }

    /// Place the symbol inside a routine body, or at program level for `None`
    pub fn owned_by(mut self, owner: Option<SymbolId>) -> Self {
        self.owner = owner;
        self.storage = if owner.is_some() { Storage::Local } else { Storage::Global };
        self
    }

    pub fn is_local(&self) -> bool {
        self.storage == Storage::Local
    }

    pub fn is_method(&self) -> bool {
        self.kind.signature().is_some()
    }

    /// Variables and parameters, the symbols whose type may be inferred
    pub fn is_value(&self) -> bool {
        matches!(self.kind, SymbolKind::Variable)
    }
}

/// Arena of every symbol declared in one compilation
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len());
        self.symbols.push(symbol);
        id
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0]
    }

    pub fn get_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.0]
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols.iter().enumerate().map(|(i, s)| (SymbolId(i), s))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SymbolId, &mut Symbol)> {
        self.symbols.iter_mut().enumerate().map(|(i, s)| (SymbolId(i), s))
    }

    /// Parameter types of a procedure or function, read from the parameter symbols
    pub fn param_types(&self, method: SymbolId) -> Vec<Type> {
        self.get(method)
            .kind
            .signature()
            .map(|sig| sig.params.iter().map(|&p| self.get(p).ty).collect())
            .unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.symbols.clear();
    }
}
