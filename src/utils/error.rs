//! Error handling for the Dijkstra compiler and VM

use crate::utils::Span;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Compiler and runtime error
#[derive(Error, Debug, Clone, PartialEq)]
#[allow(dead_code)]
pub enum Error {
    // ==================== Lexer / Parser Errors ====================

    #[error("Unexpected token: expected {expected}, got {got}")]
    UnexpectedToken {
        expected: String,
        got: String,
        span: Span,
    },

    #[error("Unexpected character '{ch}'")]
    UnexpectedChar { ch: char, span: Span },

    #[error("Invalid number literal: {text}")]
    InvalidNumber { text: String, span: Span },

    #[error("Expected identifier")]
    ExpectedIdent { span: Span },

    #[error("Expected type")]
    ExpectedType { span: Span },

    #[error("Expected expression")]
    ExpectedExpr { span: Span },

    // ==================== Scope / Symbol Errors ====================

    #[error("Duplicate definition: {name}")]
    DuplicateDefinition { name: String, span: Span },

    #[error("Reference to symbol {name}, which does not exist")]
    UndefinedSymbol { name: String, span: Span },

    #[error("{name} is not a variable")]
    NotAVariable { name: String, span: Span },

    #[error("No array with name {name}")]
    NoSuchArray { name: String, span: Span },

    #[error("No function with name {name}")]
    NoSuchFunction { name: String, span: Span },

    #[error("No procedure with name {name}")]
    NoSuchProcedure { name: String, span: Span },

    #[error("Procedure {name} cannot be used as a function")]
    ProcedureAsFunction { name: String, span: Span },

    #[error("Function {name} cannot be called as a procedure")]
    FunctionAsProcedure { name: String, span: Span },

    #[error("Argument count mismatch calling {name}: expected {expected}, got {got}")]
    ArgCountMismatch {
        name: String,
        expected: usize,
        got: usize,
        span: Span,
    },

    #[error("Assignment has {targets} targets but {values} values")]
    AssignmentArity {
        targets: usize,
        values: usize,
        span: Span,
    },

    #[error("{name} is local to an enclosing routine and cannot be used here")]
    CapturedLocal { name: String, span: Span },

    // ==================== Type Errors ====================

    #[error("Type conflict: cannot use {proposed} where {current} is required")]
    TypeConflict {
        current: String,
        proposed: String,
        span: Span,
    },

    #[error("Unable to infer type of identifier {name}")]
    UnresolvedType { name: String, span: Span },

    #[error("Return call outside of a function!")]
    ReturnOutsideMethod { span: Span },

    #[error("Invalid return type, must be {expected}")]
    InvalidReturnType { expected: String, span: Span },

    #[error("'=' and '~=' can only be used with operands of the same type ({left} vs {right})")]
    EqualityOperands {
        left: String,
        right: String,
        span: Span,
    },

    #[error("Cannot use div or mod with non-integer operands")]
    NonIntegerDivMod { span: Span },

    #[error("Arrays can only be accessed with integer types!")]
    NonIntegerIndex { span: Span },

    // ==================== Code Generation Errors ====================

    #[error("Code generation error: {0}")]
    CodeGen(String),

    // ==================== Runtime Errors ====================

    #[error("No alternative satisfied in if statement on line {line}")]
    NoAlternative { line: i32 },

    #[error("Function ended without a return on line {line}")]
    NoFunctionReturn { line: i32 },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Array index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: i32, len: usize },

    #[error("Negative array size: {0}")]
    NegativeArraySize(i32),

    #[error("Array used before it was created")]
    NullArray,

    #[error("Call stack overflow")]
    StackOverflow,

    #[error("Invalid input for {name}: {text}")]
    BadInput { name: String, text: String },

    #[error("Malformed object code: {0}")]
    Malformed(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl Error {
    /// Get the span associated with this error
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::UnexpectedToken { span, .. } => Some(*span),
            Self::UnexpectedChar { span, .. } => Some(*span),
            Self::InvalidNumber { span, .. } => Some(*span),
            Self::ExpectedIdent { span } => Some(*span),
            Self::ExpectedType { span } => Some(*span),
            Self::ExpectedExpr { span } => Some(*span),
            Self::DuplicateDefinition { span, .. } => Some(*span),
            Self::UndefinedSymbol { span, .. } => Some(*span),
            Self::NotAVariable { span, .. } => Some(*span),
            Self::NoSuchArray { span, .. } => Some(*span),
            Self::NoSuchFunction { span, .. } => Some(*span),
            Self::NoSuchProcedure { span, .. } => Some(*span),
            Self::ProcedureAsFunction { span, .. } => Some(*span),
            Self::FunctionAsProcedure { span, .. } => Some(*span),
            Self::ArgCountMismatch { span, .. } => Some(*span),
            Self::AssignmentArity { span, .. } => Some(*span),
            Self::CapturedLocal { span, .. } => Some(*span),
            Self::TypeConflict { span, .. } => Some(*span),
            Self::UnresolvedType { span, .. } => Some(*span),
            Self::ReturnOutsideMethod { span } => Some(*span),
            Self::InvalidReturnType { span, .. } => Some(*span),
            Self::EqualityOperands { span, .. } => Some(*span),
            Self::NonIntegerDivMod { span } => Some(*span),
            Self::NonIntegerIndex { span } => Some(*span),
            Self::CodeGen(_)
            | Self::NoAlternative { .. }
            | Self::NoFunctionReturn { .. }
            | Self::DivisionByZero
            | Self::IndexOutOfBounds { .. }
            | Self::NegativeArraySize(_)
            | Self::NullArray
            | Self::StackOverflow
            | Self::BadInput { .. }
            | Self::Malformed(_)
            | Self::Io(_) => None,
        }
    }

    /// Source line of the error, from its span or its runtime payload
    pub fn line(&self) -> Option<u32> {
        match self {
            Self::NoAlternative { line } | Self::NoFunctionReturn { line } => {
                u32::try_from(*line).ok()
            }
            _ => self.span().map(|s| s.line).filter(|&l| l > 0),
        }
    }

    /// Whether this error was raised while executing object code
    pub fn is_runtime(&self) -> bool {
        matches!(
            self,
            Self::NoAlternative { .. }
                | Self::NoFunctionReturn { .. }
                | Self::DivisionByZero
                | Self::IndexOutOfBounds { .. }
                | Self::NegativeArraySize(_)
                | Self::NullArray
                | Self::StackOverflow
                | Self::BadInput { .. }
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_from_span() {
        let err = Error::UndefinedSymbol {
            name: "x".to_string(),
            span: Span::new(3, 4, 7),
        };
        assert_eq!(err.line(), Some(7));
        assert_eq!(err.to_string(), "Reference to symbol x, which does not exist");
        assert!(!err.is_runtime());
    }

    #[test]
    fn test_line_from_runtime_trap() {
        let err = Error::NoAlternative { line: 12 };
        assert_eq!(err.line(), Some(12));
        assert!(err.span().is_none());
        assert!(err.is_runtime());
    }
}
