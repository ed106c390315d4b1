//! Type resolver: one traversal of the fixpoint type inference
//!
//! Each traversal recomputes expression types bottom-up and pushes the
//! constraints of every operator and statement into the symbol table through
//! [`unify`]. It reports whether anything changed; the caller repeats it
//! until a traversal changes nothing.

use crate::frontend::ast::*;
use crate::semantic::symbol::{SymbolId, SymbolKind};
use crate::semantic::Analysis;
use crate::types::{unify, Type};
use crate::utils::{Result, Span};

pub struct TypeResolver<'a> {
    analysis: &'a mut Analysis,
    current_method: Option<SymbolId>,
    changed: bool,
}

impl<'a> TypeResolver<'a> {
    pub fn new(analysis: &'a mut Analysis) -> Self {
        Self {
            analysis,
            current_method: None,
            changed: false,
        }
    }

    /// Run one traversal; true if any symbol or node type changed
    pub fn resolve(mut self, program: &Program) -> Result<bool> {
        for stmt in &program.body {
            self.stmt(stmt)?;
        }
        Ok(self.changed)
    }

    // ==================== Unification helpers ====================

    fn refine_symbol(&mut self, id: SymbolId, ty: Type, span: Span) -> Result<()> {
        let symbol = self.analysis.symbols.get_mut(id);
        let (next, changed) = unify(symbol.ty, ty, span)?;
        symbol.ty = next;
        self.changed |= changed;
        Ok(())
    }

    fn refine_node(&mut self, id: NodeId, ty: Type, span: Span) -> Result<Type> {
        let (next, changed) = unify(self.analysis.type_of(id), ty, span)?;
        if changed {
            self.analysis.types.insert(id, next);
            self.changed = true;
        }
        Ok(next)
    }

    /// Push `ty` into an expression: variables, elements and calls refine
    /// their symbol, parentheses and negation pass it to their operand, any
    /// other node only has to be compatible with it.
    fn constrain(&mut self, expr: &Expr, ty: Type) -> Result<()> {
        match &expr.kind {
            ExprKind::Var(ident) => {
                let id = self.analysis.binding(ident)?;
                self.refine_symbol(id, ty, expr.span)
            }
            ExprKind::Index { array: ident, .. } | ExprKind::Call { callee: ident, .. } => {
                let id = self.analysis.binding(ident)?;
                self.refine_symbol(id, ty, expr.span)
            }
            ExprKind::Paren(inner) => self.constrain(inner, ty),
            ExprKind::Unary { op: UnOp::Neg, expr: inner } if ty.is_numeric() => {
                self.constrain(inner, ty)
            }
            _ => unify(self.analysis.type_of(expr.id), ty, expr.span).map(|_| ()),
        }
    }

    // ==================== Statements ====================

    fn stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match &stmt.kind {
            StmtKind::VarDecl { .. } => {}
            StmtKind::ArrayDecl { size, .. } => {
                self.expr(size)?;
                self.constrain(size, Type::Int)?;
            }
            StmtKind::Procedure(decl) | StmtKind::Function(decl) => {
                let method = self.analysis.binding(&decl.name)?;
                let outer = self.current_method.replace(method);
                for stmt in &decl.body.stmts {
                    self.stmt(stmt)?;
                }
                self.current_method = outer;
            }
            StmtKind::Assign { targets, values } => {
                for (target, value) in targets.iter().zip(values) {
                    let value_ty = self.expr(value)?;
                    let (symbol, span) = match target {
                        Target::Var(ident) => (self.analysis.binding(ident)?, ident.span),
                        Target::Index { array, index } => {
                            self.expr(index)?;
                            self.constrain(index, Type::Int)?;
                            (self.analysis.binding(array)?, array.span)
                        }
                    };
                    self.refine_symbol(symbol, value_ty, span)?;
                    let target_ty = self.analysis.symbols.get(symbol).ty;
                    self.constrain(value, target_ty)?;
                }
            }
            StmtKind::Input { .. } => {}
            StmtKind::Print(expr) => {
                self.expr(expr)?;
            }
            StmtKind::Alternative(guards) | StmtKind::Iterative(guards) => {
                for guard in guards {
                    self.expr(&guard.cond)?;
                    self.constrain(&guard.cond, Type::Boolean)?;
                    self.stmt(&guard.body)?;
                }
            }
            StmtKind::Block(block) => {
                for stmt in &block.stmts {
                    self.stmt(stmt)?;
                }
            }
            StmtKind::Return(value) => {
                if let Some(expr) = value {
                    self.expr(expr)?;
                    if let Some(method) = self.current_method {
                        let symbol = self.analysis.symbols.get(method);
                        if matches!(symbol.kind, SymbolKind::Function(_)) {
                            let ret = symbol.ty;
                            self.constrain(expr, ret)?;
                        }
                    }
                }
            }
            StmtKind::Call { callee, args } => {
                self.args(callee, args)?;
            }
        }
        Ok(())
    }

    /// Arguments take the parameter types; untyped parameters learn from the arguments
    fn args(&mut self, callee: &Ident, args: &[Expr]) -> Result<()> {
        let method = self.analysis.binding(callee)?;
        let params = self
            .analysis
            .symbols
            .get(method)
            .kind
            .signature()
            .map(|sig| sig.params.clone())
            .unwrap_or_default();

        for (arg, param) in args.iter().zip(params) {
            let arg_ty = self.expr(arg)?;
            let param_ty = self.analysis.symbols.get(param).ty;
            if param_ty == Type::Undefined {
                self.refine_symbol(param, arg_ty, arg.span)?;
            } else {
                self.constrain(arg, param_ty)?;
            }
        }
        Ok(())
    }

    // ==================== Expressions ====================

    /// Compute, record and return the type of an expression
    fn expr(&mut self, expr: &Expr) -> Result<Type> {
        let ty = match &expr.kind {
            ExprKind::Int(_) => Type::Int,
            ExprKind::Float(_) => Type::Float,
            ExprKind::Bool(_) => Type::Boolean,
            ExprKind::Var(ident) => {
                let id = self.analysis.binding(ident)?;
                self.analysis.symbols.get(id).ty
            }
            ExprKind::Index { array, index } => {
                self.expr(index)?;
                self.constrain(index, Type::Int)?;
                let id = self.analysis.binding(array)?;
                self.analysis.symbols.get(id).ty
            }
            ExprKind::Call { callee, args } => {
                self.args(callee, args)?;
                let id = self.analysis.binding(callee)?;
                self.analysis.symbols.get(id).ty
            }
            ExprKind::Paren(inner) => self.expr(inner)?,
            ExprKind::Unary { op: UnOp::Neg, expr: inner } => {
                let inner_ty = self.expr(inner)?;
                self.constrain(inner, Type::Num)?;
                if inner_ty == Type::Undefined {
                    Type::Num
                } else {
                    inner_ty
                }
            }
            ExprKind::Unary { op: UnOp::Not, expr: inner } => {
                self.expr(inner)?;
                self.constrain(inner, Type::Boolean)?;
                Type::Boolean
            }
            ExprKind::Binary { op, lhs, rhs } => self.binary(*op, lhs, rhs)?,
        };
        self.refine_node(expr.id, ty, expr.span)
    }

    fn binary(&mut self, op: BinOp, lhs: &Expr, rhs: &Expr) -> Result<Type> {
        let lt = self.expr(lhs)?;
        let rt = self.expr(rhs)?;

        let both = |this: &mut Self, ty: Type| -> Result<()> {
            this.constrain(lhs, ty)?;
            this.constrain(rhs, ty)
        };

        match op {
            BinOp::And | BinOp::Or => {
                both(self, Type::Boolean)?;
                Ok(Type::Boolean)
            }
            BinOp::Eq | BinOp::Ne => {
                if lt != Type::Undefined {
                    self.constrain(rhs, lt)?;
                }
                if rt != Type::Undefined {
                    self.constrain(lhs, rt)?;
                }
                Ok(Type::Boolean)
            }
            BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => {
                both(self, Type::Num)?;
                Ok(Type::Boolean)
            }
            BinOp::Slash => {
                both(self, Type::Float)?;
                Ok(Type::Float)
            }
            BinOp::Div | BinOp::Mod => {
                both(self, Type::Int)?;
                Ok(Type::Int)
            }
            BinOp::Add | BinOp::Sub | BinOp::Mul => {
                let ty = if lt == Type::Float || rt == Type::Float {
                    Type::Float
                } else if lt == Type::Int && rt == Type::Int {
                    Type::Int
                } else {
                    Type::Num
                };
                both(self, ty)?;
                Ok(ty)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parser::parse_source;
    use crate::semantic::{resolve_to_fixpoint, ScopeManager, SymbolBuilder};
    use crate::utils::Error;

    fn resolve(source: &str) -> Result<Analysis> {
        let program = parse_source(source)?;
        let mut scopes = ScopeManager::new();
        let mut analysis = SymbolBuilder::new(&mut scopes).build(&program)?;
        resolve_to_fixpoint(&program, &mut analysis)?;
        Ok(analysis)
    }

    fn ty(analysis: &Analysis, name: &str) -> Type {
        analysis.lookup_name(name).map(|s| s.ty).unwrap_or(Type::Undefined)
    }

    #[test]
    fn test_assignment_inference() {
        let a = resolve("program p a <- 1 b <- 1.0 c <- true d <- a").unwrap();
        assert_eq!(ty(&a, "a"), Type::Int);
        assert_eq!(ty(&a, "b"), Type::Float);
        assert_eq!(ty(&a, "c"), Type::Boolean);
        assert_eq!(ty(&a, "d"), Type::Int);
    }

    #[test]
    fn test_backward_propagation_through_assignment() {
        // `b` is only known once `a` has been assigned later in the program
        let a = resolve("program p input b; c <- b; a <- c; a <- 2.5").unwrap();
        assert_eq!(ty(&a, "a"), Type::Float);
        assert_eq!(ty(&a, "c"), Type::Float);
        assert_eq!(ty(&a, "b"), Type::Float);
    }

    #[test]
    fn test_operator_constraints() {
        let a = resolve(
            "program p
             input a, b, c, d, e, f, g
             x <- a & b
             y <- c < 3
             z <- d div e
             w <- f / 2
             v <- ~g",
        )
        .unwrap();
        assert_eq!(ty(&a, "a"), Type::Boolean);
        assert_eq!(ty(&a, "b"), Type::Boolean);
        assert_eq!(ty(&a, "c"), Type::Num);
        assert_eq!(ty(&a, "d"), Type::Int);
        assert_eq!(ty(&a, "e"), Type::Int);
        assert_eq!(ty(&a, "f"), Type::Float);
        assert_eq!(ty(&a, "g"), Type::Boolean);
        assert_eq!(ty(&a, "w"), Type::Float);
        assert_eq!(ty(&a, "y"), Type::Boolean);
    }

    #[test]
    fn test_arithmetic_follows_float() {
        let a = resolve("program p input a, b, c; x <- a + b; y <- a * 2.0; z <- -c").unwrap();
        assert_eq!(ty(&a, "a"), Type::Float);
        assert_eq!(ty(&a, "y"), Type::Float);
        // `a` turned Float after `a + b` was first seen; the next pass carries it over
        assert_eq!(ty(&a, "b"), Type::Float);
        assert_eq!(ty(&a, "x"), Type::Float);
        assert_eq!(ty(&a, "c"), Type::Num);
        assert_eq!(ty(&a, "z"), Type::Num);
    }

    #[test]
    fn test_equality_cross_propagates() {
        let a = resolve("program p input a, b; int i; c <- a = i; d <- b ~= true").unwrap();
        assert_eq!(ty(&a, "a"), Type::Int);
        assert_eq!(ty(&a, "b"), Type::Boolean);
        assert_eq!(ty(&a, "c"), Type::Boolean);
    }

    #[test]
    fn test_guard_and_index() {
        let a = resolve(
            "program p input g, i, n; int[n] xs; if g :: xs[i] <- 1 fi",
        )
        .unwrap();
        assert_eq!(ty(&a, "g"), Type::Boolean);
        assert_eq!(ty(&a, "i"), Type::Int);
        assert_eq!(ty(&a, "n"), Type::Int);
    }

    #[test]
    fn test_parameters_and_returns() {
        let a = resolve(
            "program p
             fun f(x, float y) : int { return x }
             proc q(z) { print z }
             input arg
             r <- f(arg, 1)
             q(true)",
        )
        .unwrap();
        assert_eq!(ty(&a, "x"), Type::Int);
        assert_eq!(ty(&a, "y"), Type::Float);
        assert_eq!(ty(&a, "arg"), Type::Int);
        assert_eq!(ty(&a, "z"), Type::Boolean);
        assert_eq!(ty(&a, "r"), Type::Int);
    }

    #[test]
    fn test_conflicts() {
        assert!(matches!(
            resolve("program p a <- 1; a <- true").unwrap_err(),
            Error::TypeConflict { .. }
        ));
        assert!(matches!(
            resolve("program p if 1 :: print 1 fi").unwrap_err(),
            Error::TypeConflict { .. }
        ));
        assert!(matches!(
            resolve("program p boolean b; print b + 1").unwrap_err(),
            Error::TypeConflict { .. }
        ));
        assert!(matches!(
            resolve("program p print 1 = true").unwrap_err(),
            Error::TypeConflict { .. }
        ));
    }

    #[test]
    fn test_fixpoint_is_idempotent() {
        let source = "program p
                      input a, b, c
                      c <- b
                      b <- a
                      a <- 1.5
                      do c > 0.0 :: c <- c - 1 od";
        let program = parse_source(source).unwrap();
        let mut scopes = ScopeManager::new();
        let mut analysis = SymbolBuilder::new(&mut scopes).build(&program).unwrap();
        let passes = resolve_to_fixpoint(&program, &mut analysis).unwrap();
        assert!(passes > 1);

        let symbols: Vec<Type> = analysis.symbols.iter().map(|(_, s)| s.ty).collect();
        let nodes = analysis.types.clone();
        for _ in 0..3 {
            assert!(!TypeResolver::new(&mut analysis).resolve(&program).unwrap());
        }
        let after: Vec<Type> = analysis.symbols.iter().map(|(_, s)| s.ty).collect();
        assert_eq!(symbols, after);
        assert_eq!(nodes, analysis.types);
        assert_eq!(ty(&analysis, "c"), Type::Float);
    }
}
