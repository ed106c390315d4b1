//! Symbol builder: declares every identifier and binds identifier nodes to symbols

use std::collections::HashMap;

use crate::frontend::ast::*;
use crate::semantic::scope::ScopeManager;
use crate::semantic::symbol::{MethodSig, Symbol, SymbolId, SymbolKind};
use crate::semantic::Analysis;
use crate::types::Type;
use crate::utils::{Error, Result, Span};

/// One traversal over the program. Variables assigned or read by `input`
/// before any declaration are declared implicitly with an undefined type.
pub struct SymbolBuilder<'a> {
    scopes: &'a mut ScopeManager,
    bindings: HashMap<NodeId, SymbolId>,
    types: HashMap<NodeId, Type>,
    /// Procedure or function whose body is being visited
    current_method: Option<SymbolId>,
}

impl<'a> SymbolBuilder<'a> {
    pub fn new(scopes: &'a mut ScopeManager) -> Self {
        Self {
            scopes,
            bindings: HashMap::new(),
            types: HashMap::new(),
            current_method: None,
        }
    }

    pub fn build(mut self, program: &Program) -> Result<Analysis> {
        for stmt in &program.body {
            self.stmt(stmt)?;
        }
        Ok(Analysis {
            symbols: std::mem::take(self.scopes.symbols_mut()),
            bindings: self.bindings,
            types: self.types,
        })
    }

    // ==================== Declarations ====================

    fn declare(&mut self, ident: &Ident, kind: SymbolKind, ty: Type) -> Result<SymbolId> {
        let symbol = Symbol::new(&ident.name, kind, ty, ident.span).owned_by(self.current_method);
        let id = self.scopes.declare(symbol)?;
        self.bindings.insert(ident.id, id);
        Ok(id)
    }

    fn method(&mut self, decl: &MethodDecl, is_function: bool) -> Result<()> {
        let (kind, ty) = if is_function {
            (SymbolKind::Function(MethodSig::default()), decl.ret.unwrap_or(Type::Undefined))
        } else {
            (SymbolKind::Procedure(MethodSig::default()), Type::Undefined)
        };

        // Routines are emitted as units of their own, so they are never local
        let symbol = Symbol::new(&decl.name.name, kind, ty, decl.name.span);
        let method = self.scopes.declare(symbol)?;
        self.bindings.insert(decl.name.id, method);

        let outer = self.current_method.replace(method);
        self.scopes.enter_scope();
        let result = self.method_body(method, decl);
        self.scopes.exit_scope();
        self.current_method = outer;
        result
    }

    /// Parameters and body share one scope
    fn method_body(&mut self, method: SymbolId, decl: &MethodDecl) -> Result<()> {
        let mut params = Vec::with_capacity(decl.params.len());
        for param in &decl.params {
            let ty = param.ty.unwrap_or(Type::Undefined);
            params.push(self.declare(&param.name, SymbolKind::Variable, ty)?);
        }

        match &mut self.scopes.symbols_mut().get_mut(method).kind {
            SymbolKind::Procedure(sig) | SymbolKind::Function(sig) => sig.params = params,
            _ => {}
        }

        for stmt in &decl.body.stmts {
            self.stmt(stmt)?;
        }
        Ok(())
    }

    // ==================== References ====================

    fn bind(&mut self, ident: &Ident, id: SymbolId) -> Result<SymbolId> {
        let symbol = self.scopes.symbols().get(id);
        if symbol.is_local() && symbol.owner != self.current_method {
            return Err(Error::CapturedLocal {
                name: ident.name.clone(),
                span: ident.span,
            });
        }
        self.bindings.insert(ident.id, id);
        Ok(id)
    }

    fn variable(&mut self, ident: &Ident) -> Result<SymbolId> {
        let id = self.scopes.lookup(&ident.name).ok_or_else(|| Error::UndefinedSymbol {
            name: ident.name.clone(),
            span: ident.span,
        })?;
        if self.scopes.symbols().get(id).kind != SymbolKind::Variable {
            return Err(Error::NotAVariable {
                name: ident.name.clone(),
                span: ident.span,
            });
        }
        self.bind(ident, id)
    }

    /// Assignment or input destination; declares it when unknown
    fn target_variable(&mut self, ident: &Ident) -> Result<SymbolId> {
        match self.scopes.lookup(&ident.name) {
            Some(_) => self.variable(ident),
            None => self.declare(ident, SymbolKind::Variable, Type::Undefined),
        }
    }

    fn array(&mut self, ident: &Ident) -> Result<SymbolId> {
        match self.scopes.lookup(&ident.name) {
            Some(id) if self.scopes.symbols().get(id).kind == SymbolKind::Array => {
                self.bind(ident, id)
            }
            _ => Err(Error::NoSuchArray {
                name: ident.name.clone(),
                span: ident.span,
            }),
        }
    }

    fn callee(&mut self, ident: &Ident, function: bool, argc: usize, span: Span) -> Result<SymbolId> {
        let name = ident.name.clone();
        let missing = || {
            if function {
                Error::NoSuchFunction { name: ident.name.clone(), span: ident.span }
            } else {
                Error::NoSuchProcedure { name: ident.name.clone(), span: ident.span }
            }
        };

        let id = self.scopes.lookup(&ident.name).ok_or_else(missing)?;
        let sig = match (&self.scopes.symbols().get(id).kind, function) {
            (SymbolKind::Function(sig), true) | (SymbolKind::Procedure(sig), false) => sig,
            (SymbolKind::Procedure(_), true) => {
                return Err(Error::ProcedureAsFunction { name, span: ident.span })
            }
            (SymbolKind::Function(_), false) => {
                return Err(Error::FunctionAsProcedure { name, span: ident.span })
            }
            _ => return Err(missing()),
        };

        if sig.params.len() != argc {
            return Err(Error::ArgCountMismatch {
                name,
                expected: sig.params.len(),
                got: argc,
                span,
            });
        }
        self.bind(ident, id)
    }

    // ==================== Traversal ====================

    fn stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match &stmt.kind {
            StmtKind::VarDecl { ty, names } => {
                for name in names {
                    self.declare(name, SymbolKind::Variable, *ty)?;
                }
            }
            StmtKind::ArrayDecl { ty, size, names } => {
                self.expr(size)?;
                for name in names {
                    self.declare(name, SymbolKind::Array, *ty)?;
                }
            }
            StmtKind::Procedure(decl) => self.method(decl, false)?,
            StmtKind::Function(decl) => self.method(decl, true)?,
            StmtKind::Assign { targets, values } => {
                if targets.len() != values.len() {
                    return Err(Error::AssignmentArity {
                        targets: targets.len(),
                        values: values.len(),
                        span: stmt.span,
                    });
                }
                // sources first: `a <- a` does not declare `a`
                for value in values {
                    self.expr(value)?;
                }
                for target in targets {
                    match target {
                        Target::Var(ident) => {
                            self.target_variable(ident)?;
                        }
                        Target::Index { array, index } => {
                            self.array(array)?;
                            self.expr(index)?;
                        }
                    }
                }
            }
            StmtKind::Input { targets } => {
                for ident in targets {
                    self.target_variable(ident)?;
                }
            }
            StmtKind::Print(expr) => self.expr(expr)?,
            StmtKind::Alternative(guards) | StmtKind::Iterative(guards) => {
                for guard in guards {
                    self.expr(&guard.cond)?;
                    self.stmt(&guard.body)?;
                }
            }
            StmtKind::Block(block) => {
                self.scopes.enter_scope();
                let result = block.stmts.iter().try_for_each(|s| self.stmt(s));
                self.scopes.exit_scope();
                result?;
            }
            StmtKind::Return(value) => {
                if let Some(expr) = value {
                    self.expr(expr)?;
                }
            }
            StmtKind::Call { callee, args } => {
                self.callee(callee, false, args.len(), stmt.span)?;
                for arg in args {
                    self.expr(arg)?;
                }
            }
        }
        Ok(())
    }

    fn expr(&mut self, expr: &Expr) -> Result<()> {
        match &expr.kind {
            ExprKind::Int(_) => {
                self.types.insert(expr.id, Type::Int);
            }
            ExprKind::Float(_) => {
                self.types.insert(expr.id, Type::Float);
            }
            ExprKind::Bool(_) => {
                self.types.insert(expr.id, Type::Boolean);
            }
            ExprKind::Var(ident) => {
                self.variable(ident)?;
            }
            ExprKind::Index { array, index } => {
                self.array(array)?;
                self.expr(index)?;
            }
            ExprKind::Call { callee, args } => {
                self.callee(callee, true, args.len(), expr.span)?;
                for arg in args {
                    self.expr(arg)?;
                }
            }
            ExprKind::Paren(inner) | ExprKind::Unary { expr: inner, .. } => self.expr(inner)?,
            ExprKind::Binary { lhs, rhs, .. } => {
                self.expr(lhs)?;
                self.expr(rhs)?;
            }
        }
        Ok(())
    }
}
