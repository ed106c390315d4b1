//! Token definitions for the Dijkstra language
#![allow(dead_code)]

use crate::utils::Span;

/// A token produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn eof(span: Span) -> Self {
        Self { kind: TokenKind::Eof, span }
    }
}

/// Token kinds
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ============ Keywords ============
    Program,
    Int,
    Float,
    Boolean,
    True,
    False,
    If,
    Fi,
    Do,
    Od,
    Input,
    Print,
    Proc,
    Fun,
    Return,
    Div,
    Mod,

    // ============ Literals ============
    IntLit(i64),
    FloatLit(f64),
    Ident(String),

    // ============ Operators ============
    /// <-
    Assign,
    /// =
    Eq,
    /// ~=
    Ne,
    /// <
    Lt,
    /// >
    Gt,
    /// <=
    Le,
    /// >=
    Ge,
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// /
    Slash,
    /// &
    And,
    /// |
    Or,
    /// ~
    Tilde,

    // ============ Separators ============
    /// ::
    Guard,
    Colon,
    Semicolon,
    Comma,
    Period,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,

    // ============ Special ============
    Unknown(char),
    Eof,
}

impl TokenKind {
    /// Try to convert an identifier to a keyword
    pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
        match s {
            "program" => Some(TokenKind::Program),
            "int" => Some(TokenKind::Int),
            "float" => Some(TokenKind::Float),
            "boolean" => Some(TokenKind::Boolean),
            "true" => Some(TokenKind::True),
            "false" => Some(TokenKind::False),
            "if" => Some(TokenKind::If),
            "fi" => Some(TokenKind::Fi),
            "do" => Some(TokenKind::Do),
            "od" => Some(TokenKind::Od),
            "input" => Some(TokenKind::Input),
            "print" => Some(TokenKind::Print),
            "proc" => Some(TokenKind::Proc),
            "fun" => Some(TokenKind::Fun),
            "return" => Some(TokenKind::Return),
            "div" => Some(TokenKind::Div),
            "mod" => Some(TokenKind::Mod),
            _ => None,
        }
    }

    /// Check if this token names a value type
    pub fn is_type_keyword(&self) -> bool {
        matches!(self, TokenKind::Int | TokenKind::Float | TokenKind::Boolean)
    }

    /// Check if this token can begin an expression
    pub fn starts_expr(&self) -> bool {
        matches!(
            self,
            TokenKind::IntLit(_)
                | TokenKind::FloatLit(_)
                | TokenKind::Ident(_)
                | TokenKind::True
                | TokenKind::False
                | TokenKind::LParen
                | TokenKind::Minus
                | TokenKind::Tilde
        )
    }

    /// Get the precedence of a binary operator (for Pratt parsing)
    /// Returns None if not a binary operator
    pub fn binary_precedence(&self) -> Option<u8> {
        match self {
            TokenKind::Or => Some(1),
            TokenKind::And => Some(2),
            TokenKind::Eq | TokenKind::Ne => Some(3),
            TokenKind::Lt | TokenKind::Gt | TokenKind::Le | TokenKind::Ge => Some(4),
            TokenKind::Plus | TokenKind::Minus => Some(5),
            TokenKind::Star | TokenKind::Slash | TokenKind::Div | TokenKind::Mod => Some(6),
            _ => None,
        }
    }
}
