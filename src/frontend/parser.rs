//! Parser for the Dijkstra language
//!
//! Recursive descent parser with Pratt parsing for expressions.

use crate::frontend::ast::*;
use crate::frontend::lexer::Lexer;
use crate::frontend::token::{Token, TokenKind};
use crate::types::Type;
use crate::utils::{Error, Result, Span};

/// The parser
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    next_id: u32,
}

impl Parser {
    /// Create a new parser from a lexer
    pub fn new(mut lexer: Lexer) -> Self {
        Self::from_tokens(lexer.tokenize())
    }

    /// Create a parser from pre-tokenized input
    pub fn from_tokens(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map_or(true, |t| t.kind != TokenKind::Eof) {
            let span = tokens.last().map(|t| t.span).unwrap_or_default();
            tokens.push(Token::eof(span));
        }
        Self { tokens, pos: 0, next_id: 0 }
    }

    // ==================== Helper Methods ====================

    fn current(&self) -> &Token {
        // from_tokens guarantees a trailing Eof
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos + 1)
    }

    fn prev_span(&self) -> Span {
        self.tokens[self.pos.saturating_sub(1)].span
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    fn expect(&mut self, expected: TokenKind) -> Result<Token> {
        if self.check(&expected) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&format!("{:?}", expected)))
        }
    }

    fn consume(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn unexpected(&self, expected: &str) -> Error {
        let token = self.current();
        match token.kind {
            TokenKind::Unknown(ch) => Error::UnexpectedChar { ch, span: token.span },
            ref kind => Error::UnexpectedToken {
                expected: expected.to_string(),
                got: format!("{:?}", kind),
                span: token.span,
            },
        }
    }

    fn node_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    // ==================== Parsing Methods ====================

    /// Parse a complete program
    pub fn parse_program(&mut self) -> Result<Program> {
        let start = self.current().span;
        self.expect(TokenKind::Program)?;
        let name = self.parse_ident()?;

        let mut body = Vec::new();
        while !self.is_at_end() {
            body.push(self.parse_stmt()?);
            self.consume(&TokenKind::Semicolon);
        }

        Ok(Program {
            name,
            body,
            span: start.merge(&self.prev_span()),
        })
    }

    /// Parse a statement or declaration
    pub fn parse_stmt(&mut self) -> Result<Stmt> {
        let start = self.current().span;
        let kind = match self.current_kind() {
            TokenKind::Int | TokenKind::Float | TokenKind::Boolean => self.parse_declaration()?,
            TokenKind::Proc => StmtKind::Procedure(self.parse_method(false)?),
            TokenKind::Fun => StmtKind::Function(self.parse_method(true)?),
            TokenKind::Ident(_) => {
                if matches!(self.peek().map(|t| &t.kind), Some(TokenKind::LParen)) {
                    let callee = self.parse_ident()?;
                    let args = self.parse_args()?;
                    StmtKind::Call { callee, args }
                } else {
                    self.parse_assignment()?
                }
            }
            TokenKind::Input => {
                self.advance();
                StmtKind::Input { targets: self.parse_ident_list()? }
            }
            TokenKind::Print => {
                self.advance();
                StmtKind::Print(self.parse_expr()?)
            }
            TokenKind::If => {
                self.advance();
                let guards = self.parse_guards(&TokenKind::Fi)?;
                StmtKind::Alternative(guards)
            }
            TokenKind::Do => {
                self.advance();
                let guards = self.parse_guards(&TokenKind::Od)?;
                StmtKind::Iterative(guards)
            }
            TokenKind::LBrace => StmtKind::Block(self.parse_block()?),
            TokenKind::Return => {
                self.advance();
                let value = if self.current_kind().starts_expr() {
                    Some(self.parse_expr()?)
                } else {
                    None
                };
                StmtKind::Return(value)
            }
            _ => return Err(self.unexpected("statement")),
        };

        Ok(Stmt {
            id: self.node_id(),
            kind,
            span: start.merge(&self.prev_span()),
        })
    }

    fn parse_type(&mut self) -> Result<Type> {
        let ty = match self.current_kind() {
            TokenKind::Int => Type::Int,
            TokenKind::Float => Type::Float,
            TokenKind::Boolean => Type::Boolean,
            _ => return Err(Error::ExpectedType { span: self.current().span }),
        };
        self.advance();
        Ok(ty)
    }

    fn parse_ident(&mut self) -> Result<Ident> {
        match self.current_kind().clone() {
            TokenKind::Ident(name) => {
                let span = self.advance().span;
                Ok(Ident { id: self.node_id(), name, span })
            }
            TokenKind::Unknown(_) => Err(self.unexpected("identifier")),
            _ => Err(Error::ExpectedIdent { span: self.current().span }),
        }
    }

    fn parse_ident_list(&mut self) -> Result<Vec<Ident>> {
        let mut names = vec![self.parse_ident()?];
        while self.consume(&TokenKind::Comma) {
            names.push(self.parse_ident()?);
        }
        Ok(names)
    }

    /// `int a, b` or `int[size] a, b`
    fn parse_declaration(&mut self) -> Result<StmtKind> {
        let ty = self.parse_type()?;
        if self.consume(&TokenKind::LBracket) {
            let size = self.parse_expr()?;
            self.expect(TokenKind::RBracket)?;
            let names = self.parse_ident_list()?;
            Ok(StmtKind::ArrayDecl { ty, size, names })
        } else {
            let names = self.parse_ident_list()?;
            Ok(StmtKind::VarDecl { ty, names })
        }
    }

    /// `proc name(params) block` or `fun name(params) : type block`
    fn parse_method(&mut self, is_function: bool) -> Result<MethodDecl> {
        self.advance(); // proc / fun
        let name = self.parse_ident()?;

        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let ty = if self.current_kind().is_type_keyword() {
                    Some(self.parse_type()?)
                } else {
                    None
                };
                params.push(Param { name: self.parse_ident()?, ty });
                if !self.consume(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;

        let ret = if is_function {
            self.expect(TokenKind::Colon)?;
            Some(self.parse_type()?)
        } else {
            None
        };

        let body = self.parse_block()?;
        Ok(MethodDecl { name, params, ret, body })
    }

    fn parse_block(&mut self) -> Result<Block> {
        let start = self.current().span;
        self.expect(TokenKind::LBrace)?;

        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            stmts.push(self.parse_stmt()?);
            self.consume(&TokenKind::Semicolon);
        }
        self.expect(TokenKind::RBrace)?;

        Ok(Block {
            id: self.node_id(),
            stmts,
            span: start.merge(&self.prev_span()),
        })
    }

    /// `targets <- values`
    fn parse_assignment(&mut self) -> Result<StmtKind> {
        let mut targets = vec![self.parse_target()?];
        while self.consume(&TokenKind::Comma) {
            targets.push(self.parse_target()?);
        }

        self.expect(TokenKind::Assign)?;

        let mut values = vec![self.parse_expr()?];
        while self.consume(&TokenKind::Comma) {
            values.push(self.parse_expr()?);
        }

        Ok(StmtKind::Assign { targets, values })
    }

    fn parse_target(&mut self) -> Result<Target> {
        let name = self.parse_ident()?;
        if self.consume(&TokenKind::LBracket) {
            let index = self.parse_expr()?;
            self.expect(TokenKind::RBracket)?;
            Ok(Target::Index { array: name, index })
        } else {
            Ok(Target::Var(name))
        }
    }

    /// One or more guards up to and including the closing keyword
    fn parse_guards(&mut self, close: &TokenKind) -> Result<Vec<Guard>> {
        let mut guards = Vec::new();
        loop {
            let start = self.current().span;
            let cond = self.parse_expr()?;
            self.expect(TokenKind::Guard)?;
            let body = self.parse_stmt()?;
            self.consume(&TokenKind::Semicolon);
            guards.push(Guard {
                id: self.node_id(),
                cond,
                body: Box::new(body),
                span: start.merge(&self.prev_span()),
            });

            if self.consume(close) {
                return Ok(guards);
            }
            if self.is_at_end() {
                return Err(self.unexpected(&format!("{:?}", close)));
            }
        }
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                args.push(self.parse_expr()?);
                if !self.consume(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(args)
    }

    // ==================== Expressions ====================

    /// Parse an expression
    pub fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_expr_bp(0)
    }

    /// Pratt parsing with binding power; all binary operators are left associative
    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr> {
        let mut lhs = self.parse_unary()?;

        while let Some(prec) = self.current_kind().binary_precedence() {
            if prec <= min_bp {
                break;
            }

            let Some(op) = Self::binary_op(self.current_kind()) else {
                break;
            };
            self.advance();

            let rhs = self.parse_expr_bp(prec)?;
            let span = lhs.span.merge(&rhs.span);
            lhs = Expr {
                id: self.node_id(),
                kind: ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            };
        }

        Ok(lhs)
    }

    fn binary_op(kind: &TokenKind) -> Option<BinOp> {
        let op = match kind {
            TokenKind::Or => BinOp::Or,
            TokenKind::And => BinOp::And,
            TokenKind::Eq => BinOp::Eq,
            TokenKind::Ne => BinOp::Ne,
            TokenKind::Lt => BinOp::Lt,
            TokenKind::Gt => BinOp::Gt,
            TokenKind::Le => BinOp::Le,
            TokenKind::Ge => BinOp::Ge,
            TokenKind::Plus => BinOp::Add,
            TokenKind::Minus => BinOp::Sub,
            TokenKind::Star => BinOp::Mul,
            TokenKind::Slash => BinOp::Slash,
            TokenKind::Div => BinOp::Div,
            TokenKind::Mod => BinOp::Mod,
            _ => return None,
        };
        Some(op)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        let op = match self.current_kind() {
            TokenKind::Minus => UnOp::Neg,
            TokenKind::Tilde => UnOp::Not,
            _ => return self.parse_primary(),
        };
        let start = self.advance().span;
        let expr = self.parse_unary()?;
        let span = start.merge(&expr.span);
        Ok(Expr {
            id: self.node_id(),
            kind: ExprKind::Unary { op, expr: Box::new(expr) },
            span,
        })
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let start = self.current().span;
        let kind = match self.current_kind().clone() {
            TokenKind::IntLit(v) => {
                self.advance();
                let v = i32::try_from(v).map_err(|_| Error::InvalidNumber {
                    text: v.to_string(),
                    span: start,
                })?;
                ExprKind::Int(v)
            }
            TokenKind::FloatLit(v) => {
                self.advance();
                let f = v as f32;
                if !f.is_finite() {
                    return Err(Error::InvalidNumber { text: v.to_string(), span: start });
                }
                ExprKind::Float(f)
            }
            TokenKind::True => {
                self.advance();
                ExprKind::Bool(true)
            }
            TokenKind::False => {
                self.advance();
                ExprKind::Bool(false)
            }
            TokenKind::Ident(_) => {
                let name = self.parse_ident()?;
                if self.check(&TokenKind::LParen) {
                    let args = self.parse_args()?;
                    ExprKind::Call { callee: name, args }
                } else if self.consume(&TokenKind::LBracket) {
                    let index = self.parse_expr()?;
                    self.expect(TokenKind::RBracket)?;
                    ExprKind::Index { array: name, index: Box::new(index) }
                } else {
                    ExprKind::Var(name)
                }
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                ExprKind::Paren(Box::new(inner))
            }
            TokenKind::Unknown(_) => return Err(self.unexpected("expression")),
            _ => return Err(Error::ExpectedExpr { span: start }),
        };

        Ok(Expr {
            id: self.node_id(),
            kind,
            span: start.merge(&self.prev_span()),
        })
    }
}

/// Parse a source string into a program
pub fn parse_source(source: &str) -> Result<Program> {
    Parser::new(Lexer::new(source)).parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(source: &str) -> Expr {
        Parser::new(Lexer::new(source)).parse_expr().unwrap()
    }

    /// Fully parenthesized rendering, to make precedence visible
    fn render(e: &Expr) -> String {
        match &e.kind {
            ExprKind::Int(v) => v.to_string(),
            ExprKind::Float(v) => format!("{:?}", v),
            ExprKind::Bool(b) => b.to_string(),
            ExprKind::Var(id) => id.name.clone(),
            ExprKind::Index { array, index } => format!("{}[{}]", array.name, render(index)),
            ExprKind::Call { callee, args } => {
                let args: Vec<String> = args.iter().map(render).collect();
                format!("{}({})", callee.name, args.join(", "))
            }
            ExprKind::Paren(inner) => render(inner),
            ExprKind::Unary { op: UnOp::Neg, expr } => format!("(-{})", render(expr)),
            ExprKind::Unary { op: UnOp::Not, expr } => format!("(~{})", render(expr)),
            ExprKind::Binary { op, lhs, rhs } => {
                format!("({} {} {})", render(lhs), op, render(rhs))
            }
        }
    }

    #[test]
    fn test_precedence() {
        assert_eq!(render(&expr("1 - 1 - 3 * 5")), "((1 - 1) - (3 * 5))");
        assert_eq!(render(&expr("4 + 4 >= 3 * 4")), "((4 + 4) >= (3 * 4))");
        assert_eq!(render(&expr("1 * - 4.0 / 2")), "((1 * (-4.0)) / 2)");
        assert_eq!(render(&expr("1 div - 4")), "(1 div (-4))");
        assert_eq!(
            render(&expr("a < b & c = d | ~e")),
            "(((a < b) & (c = d)) | (~e))"
        );
    }

    #[test]
    fn test_primaries() {
        assert_eq!(render(&expr("bar[foo[1]]")), "bar[foo[1]]");
        assert_eq!(render(&expr("bar(4, 5 + 3, (11))")), "bar(4, (5 + 3), 11)");
        assert_eq!(render(&expr("foo()")), "foo()");
    }

    #[test]
    fn test_declarations() {
        let program = parse_source(
            "program test boolean b1, b2; int i int[4] xs float[n + 1] ys",
        )
        .unwrap();
        assert_eq!(program.name.name, "test");
        assert_eq!(program.body.len(), 4);
        assert!(matches!(
            program.body[0].kind,
            StmtKind::VarDecl { ty: Type::Boolean, ref names } if names.len() == 2
        ));
        assert!(matches!(program.body[2].kind, StmtKind::ArrayDecl { ty: Type::Int, .. }));
        assert!(matches!(program.body[3].kind, StmtKind::ArrayDecl { ty: Type::Float, .. }));
    }

    #[test]
    fn test_statements() {
        let program = parse_source(
            "program p
             a, x[1] <- 1, 2
             input a, b
             print a
             if a > 1 :: print 1 a <= 1 :: { print 2; } fi
             do a > 1 :: a <- a - 1 od
             foo(a)",
        )
        .unwrap();
        assert_eq!(program.body.len(), 6);
        assert!(matches!(
            program.body[0].kind,
            StmtKind::Assign { ref targets, ref values } if targets.len() == 2 && values.len() == 2
        ));
        assert!(matches!(program.body[1].kind, StmtKind::Input { ref targets } if targets.len() == 2));
        assert!(matches!(program.body[3].kind, StmtKind::Alternative(ref g) if g.len() == 2));
        assert!(matches!(program.body[4].kind, StmtKind::Iterative(ref g) if g.len() == 1));
        assert!(matches!(program.body[5].kind, StmtKind::Call { ref args, .. } if args.len() == 1));
    }

    #[test]
    fn test_methods() {
        let program = parse_source(
            "program p
             proc foo(int a, b) { print a }
             fun bar(a, float b) : int { return 1 }",
        )
        .unwrap();
        match &program.body[0].kind {
            StmtKind::Procedure(m) => {
                assert_eq!(m.params.len(), 2);
                assert_eq!(m.params[0].ty, Some(Type::Int));
                assert_eq!(m.params[1].ty, None);
                assert_eq!(m.ret, None);
            }
            other => panic!("expected procedure, got {:?}", other),
        }
        match &program.body[1].kind {
            StmtKind::Function(m) => {
                assert_eq!(m.params[1].ty, Some(Type::Float));
                assert_eq!(m.ret, Some(Type::Int));
                assert!(matches!(m.body.stmts[0].kind, StmtKind::Return(Some(_))));
            }
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_node_ids_are_unique() {
        let program = parse_source("program p a <- 1 + b * c").unwrap();
        let StmtKind::Assign { targets, values } = &program.body[0].kind else {
            panic!("expected assignment");
        };
        let Target::Var(a) = &targets[0] else { panic!("expected variable target") };
        let mut ids = vec![a.id, values[0].id, program.body[0].id, program.name.id];
        if let ExprKind::Binary { lhs, rhs, .. } = &values[0].kind {
            ids.push(lhs.id);
            ids.push(rhs.id);
        }
        let count = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), count);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(parse_source("a <- 1"), Err(Error::UnexpectedToken { .. })));
        assert!(matches!(parse_source("program p a <- "), Err(Error::ExpectedExpr { .. })));
        assert!(matches!(
            parse_source("program p if a :: print 1"),
            Err(Error::UnexpectedToken { .. })
        ));
        assert!(matches!(parse_source("program p a <- $"), Err(Error::UnexpectedChar { ch: '$', .. })));
        assert!(matches!(
            parse_source("program p a <- 99999999999"),
            Err(Error::InvalidNumber { .. })
        ));
    }
}
