//! Abstract Syntax Tree definitions for the Dijkstra language
//!
//! Every node that later passes annotate carries a [`NodeId`]. Semantic
//! information never lives in the tree itself; it is kept in side tables
//! keyed by these ids.

use std::fmt;

use crate::types::Type;
use crate::utils::Span;

/// Stable identity of an AST node, unique within one parsed program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A complete program (compilation unit)
#[derive(Debug, Clone)]
pub struct Program {
    pub name: Ident,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// An identifier occurrence; symbols are bound to its id
#[derive(Debug, Clone)]
pub struct Ident {
    pub id: NodeId,
    pub name: String,
    pub span: Span,
}

/// Statement (declarations are statements too)
#[derive(Debug, Clone)]
pub struct Stmt {
    pub id: NodeId,
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    /// `int a, b`
    VarDecl { ty: Type, names: Vec<Ident> },
    /// `int[n] a, b`
    ArrayDecl { ty: Type, size: Expr, names: Vec<Ident> },
    /// `proc p(...) { ... }`
    Procedure(MethodDecl),
    /// `fun f(...) : t { ... }`
    Function(MethodDecl),
    /// `a, x[i] <- e1, e2`
    Assign { targets: Vec<Target>, values: Vec<Expr> },
    /// `input a, b`
    Input { targets: Vec<Ident> },
    /// `print e`
    Print(Expr),
    /// `if g :: s ... fi`
    Alternative(Vec<Guard>),
    /// `do g :: s ... od`
    Iterative(Vec<Guard>),
    /// `{ ... }`
    Block(Block),
    /// `return [e]`
    Return(Option<Expr>),
    /// `p(args)`
    Call { callee: Ident, args: Vec<Expr> },
}

/// Procedure or function declaration
#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub name: Ident,
    pub params: Vec<Param>,
    /// Declared return type; `None` for procedures
    pub ret: Option<Type>,
    pub body: Block,
}

/// Parameter; the type may be left for inference
#[derive(Debug, Clone)]
pub struct Param {
    pub name: Ident,
    pub ty: Option<Type>,
}

/// Compound statement
#[derive(Debug, Clone)]
pub struct Block {
    pub id: NodeId,
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// `condition :: statement`
#[derive(Debug, Clone)]
pub struct Guard {
    pub id: NodeId,
    pub cond: Expr,
    pub body: Box<Stmt>,
    pub span: Span,
}

/// Assignment destination
#[derive(Debug, Clone)]
pub enum Target {
    Var(Ident),
    Index { array: Ident, index: Expr },
}

impl Target {
    pub fn span(&self) -> Span {
        match self {
            Target::Var(ident) => ident.span,
            Target::Index { array, index } => array.span.merge(&index.span),
        }
    }
}

/// Expression
#[derive(Debug, Clone)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Int(i32),
    Float(f32),
    Bool(bool),
    Var(Ident),
    Index { array: Ident, index: Box<Expr> },
    Call { callee: Ident, args: Vec<Expr> },
    Paren(Box<Expr>),
    Unary { op: UnOp, expr: Box<Expr> },
    Binary { op: BinOp, lhs: Box<Expr>, rhs: Box<Expr> },
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    /// `/`, always float division
    Slash,
    /// `div`
    Div,
    /// `mod`
    Mod,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl BinOp {
    pub fn is_relational(self) -> bool {
        matches!(self, BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge)
    }

    pub fn is_equality(self) -> bool {
        matches!(self, BinOp::Eq | BinOp::Ne)
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }

    /// `+`, `-` and `*`, whose type follows their operands
    pub fn is_arithmetic(self) -> bool {
        matches!(self, BinOp::Add | BinOp::Sub | BinOp::Mul)
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Slash => "/",
            BinOp::Div => "div",
            BinOp::Mod => "mod",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::Eq => "=",
            BinOp::Ne => "~=",
            BinOp::And => "&",
            BinOp::Or => "|",
        };
        write!(f, "{}", s)
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    /// `-`
    Neg,
    /// `~`
    Not,
}
