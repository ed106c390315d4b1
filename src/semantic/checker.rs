//! Type checker: rules that unification alone does not enforce

use crate::frontend::ast::*;
use crate::semantic::symbol::{SymbolId, SymbolKind};
use crate::semantic::Analysis;
use crate::types::Type;
use crate::utils::{Error, Result};

pub struct TypeChecker<'a> {
    analysis: &'a Analysis,
    current_method: Option<SymbolId>,
}

impl<'a> TypeChecker<'a> {
    pub fn new(analysis: &'a Analysis) -> Self {
        Self {
            analysis,
            current_method: None,
        }
    }

    pub fn check(mut self, program: &Program) -> Result<()> {
        for stmt in &program.body {
            self.stmt(stmt)?;
        }
        Ok(())
    }

    fn require_int_index(&self, index: &Expr) -> Result<()> {
        if self.analysis.type_of(index.id) != Type::Int {
            return Err(Error::NonIntegerIndex { span: index.span });
        }
        Ok(())
    }

    fn stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match &stmt.kind {
            StmtKind::VarDecl { .. } => {}
            StmtKind::ArrayDecl { size, .. } => {
                self.expr(size)?;
                self.require_int_index(size)?;
            }
            StmtKind::Procedure(decl) | StmtKind::Function(decl) => {
                let outer = self.current_method.replace(self.analysis.binding(&decl.name)?);
                for stmt in &decl.body.stmts {
                    self.stmt(stmt)?;
                }
                self.current_method = outer;
            }
            StmtKind::Assign { targets, values } => {
                for target in targets {
                    if let Target::Index { index, .. } = target {
                        self.expr(index)?;
                        self.require_int_index(index)?;
                    }
                }
                for value in values {
                    self.expr(value)?;
                }
            }
            StmtKind::Input { .. } => {}
            StmtKind::Print(expr) => self.expr(expr)?,
            StmtKind::Alternative(guards) | StmtKind::Iterative(guards) => {
                for guard in guards {
                    self.expr(&guard.cond)?;
                    self.stmt(&guard.body)?;
                }
            }
            StmtKind::Block(block) => {
                for stmt in &block.stmts {
                    self.stmt(stmt)?;
                }
            }
            StmtKind::Return(value) => self.ret(stmt, value.as_ref())?,
            StmtKind::Call { args, .. } => {
                for arg in args {
                    self.expr(arg)?;
                }
            }
        }
        Ok(())
    }

    fn ret(&mut self, stmt: &Stmt, value: Option<&Expr>) -> Result<()> {
        let method = self
            .current_method
            .ok_or(Error::ReturnOutsideMethod { span: stmt.span })?;
        let symbol = self.analysis.symbols.get(method);

        match (&symbol.kind, value) {
            (SymbolKind::Function(_), Some(expr)) => {
                self.expr(expr)?;
                if self.analysis.type_of(expr.id) != symbol.ty {
                    return Err(Error::InvalidReturnType {
                        expected: symbol.ty.to_string(),
                        span: expr.span,
                    });
                }
                Ok(())
            }
            (SymbolKind::Function(_), None) => Err(Error::InvalidReturnType {
                expected: symbol.ty.to_string(),
                span: stmt.span,
            }),
            (_, Some(expr)) => Err(Error::InvalidReturnType {
                expected: "nothing".to_string(),
                span: expr.span,
            }),
            (_, None) => Ok(()),
        }
    }

    fn expr(&mut self, expr: &Expr) -> Result<()> {
        match &expr.kind {
            ExprKind::Int(_) | ExprKind::Float(_) | ExprKind::Bool(_) | ExprKind::Var(_) => {}
            ExprKind::Index { index, .. } => {
                self.expr(index)?;
                self.require_int_index(index)?;
            }
            ExprKind::Call { args, .. } => {
                for arg in args {
                    self.expr(arg)?;
                }
            }
            ExprKind::Paren(inner) | ExprKind::Unary { expr: inner, .. } => self.expr(inner)?,
            ExprKind::Binary { op, lhs, rhs } => {
                self.expr(lhs)?;
                self.expr(rhs)?;
                let lt = self.analysis.type_of(lhs.id);
                let rt = self.analysis.type_of(rhs.id);
                match op {
                    BinOp::Eq | BinOp::Ne if lt != rt => {
                        return Err(Error::EqualityOperands {
                            left: lt.to_string(),
                            right: rt.to_string(),
                            span: expr.span,
                        });
                    }
                    BinOp::Div | BinOp::Mod if lt != Type::Int || rt != Type::Int => {
                        return Err(Error::NonIntegerDivMod { span: expr.span });
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::frontend::parser::parse_source;
    use crate::semantic::analyze;
    use crate::utils::{Error, Result};

    fn check(source: &str) -> Result<()> {
        analyze(&parse_source(source)?).map(|_| ())
    }

    #[test]
    fn test_valid_program() {
        check(
            "program p
             int[4] xs
             fun f(int n) : int { if n <= 0 :: return 0 n > 0 :: return n + f(n - 1) fi }
             proc show(x) { print x; return }
             xs[1] <- f(3)
             show(xs[1] div 2)",
        )
        .unwrap();
    }

    #[test]
    fn test_return_outside_method() {
        assert!(matches!(
            check("program p return 1").unwrap_err(),
            Error::ReturnOutsideMethod { .. }
        ));
    }

    #[test]
    fn test_return_type_must_match() {
        let err = check("program p fun f() : int { return 1.5 }").unwrap_err();
        assert!(matches!(err, Error::InvalidReturnType { ref expected, .. } if expected == "int"));
        assert!(matches!(
            check("program p fun f() : int { return }").unwrap_err(),
            Error::InvalidReturnType { .. }
        ));
        assert!(matches!(
            check("program p proc f() { return 1 }").unwrap_err(),
            Error::InvalidReturnType { ref expected, .. } if expected == "nothing"
        ));
    }

    #[test]
    fn test_equality_operands_must_agree() {
        let err = check("program p int a; float b; a, b <- 1, 2.0; print a = b").unwrap_err();
        assert!(matches!(err, Error::EqualityOperands { .. }));
        assert!(check("program p int a; a <- 1; print a ~= 2").is_ok());
    }

    #[test]
    fn test_div_mod_need_integers() {
        let err = check("program p float f; f <- 1.0; print f mod 2").unwrap_err();
        assert!(matches!(err, Error::NonIntegerDivMod { .. }));
        assert!(check("program p print 7 div 2").is_ok());
    }

    #[test]
    fn test_index_must_be_integer() {
        let err = check("program p int[4] xs; float i; i <- 1.0; print xs[i]").unwrap_err();
        assert!(matches!(err, Error::NonIntegerIndex { .. }));
        let err = check("program p int[2.5] xs").unwrap_err();
        assert!(matches!(err, Error::NonIntegerIndex { .. }));
    }
}
