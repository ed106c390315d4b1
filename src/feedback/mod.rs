//! Structured Feedback Module
//!
//! Machine-readable diagnostics for `check --json`:
//! - JSON error reports with a stable code and fix suggestions
//! - Analysis statistics

use serde::{Deserialize, Serialize};

use crate::semantic::{Analysis, SymbolKind};
use crate::utils::Error;

// ==================== Structured Error Report ====================

/// A structured error report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Error code (e.g., "E0301")
    pub code: String,

    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    pub location: Option<Location>,

    /// Suggested fixes, most likely first
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub message: String,

    /// Confidence in this suggestion (0.0 - 1.0)
    pub confidence: f64,
}

impl Suggestion {
    fn new(message: impl Into<String>, confidence: f64) -> Self {
        Self { message: message.into(), confidence }
    }
}

// ==================== Check Feedback ====================

/// Result of checking one source file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckFeedback {
    pub success: bool,
    pub source_file: String,
    pub diagnostics: Vec<ErrorReport>,
    pub stats: CheckStats,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckStats {
    pub variables: usize,
    pub arrays: usize,
    pub procedures: usize,
    pub functions: usize,
    /// Source lines
    pub loc: usize,
}

impl CheckStats {
    pub fn collect(analysis: &Analysis, source: &str) -> Self {
        let mut stats = CheckStats {
            loc: source.lines().count(),
            ..Default::default()
        };
        for (_, symbol) in analysis.symbols.iter() {
            match symbol.kind {
                SymbolKind::Variable => stats.variables += 1,
                SymbolKind::Array => stats.arrays += 1,
                SymbolKind::Procedure(_) => stats.procedures += 1,
                SymbolKind::Function(_) => stats.functions += 1,
            }
        }
        stats
    }
}

// ==================== Error Conversion ====================

impl ErrorReport {
    /// Create an error report from a compiler or runtime error
    pub fn from_error(error: &Error, file_name: &str) -> Self {
        let (code, suggestions) = error_info(error);

        let location = error.span().map(|s| Location {
            file: file_name.to_string(),
            line: s.line,
            start: s.start,
            end: s.end,
        });

        let mut report = Self {
            code: code.to_string(),
            severity: Severity::Error,
            message: error.to_string(),
            location,
            suggestions,
        };
        report.sort_suggestions();
        report
    }

    /// Highest confidence first
    pub fn sort_suggestions(&mut self) {
        self.suggestions.sort_by(|a, b| {
            b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal)
        });
    }
}

/// Error code and fix suggestions for an error
fn error_info(error: &Error) -> (&'static str, Vec<Suggestion>) {
    match error {
        // ========== Lexer / Parser ==========
        Error::UnexpectedToken { expected, .. } => (
            "E0101",
            vec![Suggestion::new(format!("Insert {} here", expected), 0.6)],
        ),
        Error::UnexpectedChar { ch, .. } => (
            "E0102",
            vec![Suggestion::new(format!("Remove '{}'; comments start with '#'", ch), 0.5)],
        ),
        Error::InvalidNumber { .. } => (
            "E0103",
            vec![Suggestion::new("Integer literals must fit in 32 bits", 0.8)],
        ),
        Error::ExpectedIdent { .. } | Error::ExpectedType { .. } | Error::ExpectedExpr { .. } => ("E0104", vec![]),

        // ========== Scope / Symbol ==========
        Error::DuplicateDefinition { name, .. } => (
            "E0201",
            vec![Suggestion::new(format!("Rename one of the declarations of '{}'", name), 0.8)],
        ),
        Error::UndefinedSymbol { name, .. } => (
            "E0202",
            vec![Suggestion::new(format!("Declare or assign '{}' before using it", name), 0.8)],
        ),
        Error::NotAVariable { name, .. } => (
            "E0203",
            vec![Suggestion::new(format!("'{}' names a routine or an array", name), 0.6)],
        ),
        Error::NoSuchArray { name, .. } => (
            "E0204",
            vec![Suggestion::new(format!("Declare '{}' as an array, e.g. int[10] {}", name, name), 0.7)],
        ),
        Error::NoSuchFunction { .. } | Error::NoSuchProcedure { .. } => ("E0205", vec![]),
        Error::ProcedureAsFunction { name, .. } => (
            "E0206",
            vec![Suggestion::new(format!("Call '{}' as a statement, or make it a fun with a return type", name), 0.7)],
        ),
        Error::FunctionAsProcedure { name, .. } => (
            "E0207",
            vec![Suggestion::new(format!("Use the result of '{}' in an expression", name), 0.7)],
        ),
        Error::ArgCountMismatch { expected, got, .. } => {
            let fix = if got < expected {
                format!("Add {} more argument(s)", expected - got)
            } else {
                format!("Remove {} extra argument(s)", got - expected)
            };
            ("E0208", vec![Suggestion::new(fix, 0.9)])
        }
        Error::AssignmentArity { .. } => (
            "E0209",
            vec![Suggestion::new("Give every target on the left exactly one value on the right", 0.9)],
        ),
        Error::CapturedLocal { name, .. } => (
            "E0210",
            vec![Suggestion::new(format!("Pass '{}' as a parameter", name), 0.8)],
        ),

        // ========== Type ==========
        Error::TypeConflict { .. } => ("E0301", vec![]),
        Error::UnresolvedType { name, .. } => (
            "E0302",
            vec![
                Suggestion::new(format!("Declare '{}' with an explicit type", name), 0.8),
                Suggestion::new(format!("Use '{}' where its type can be inferred", name), 0.4),
            ],
        ),
        Error::ReturnOutsideMethod { .. } => ("E0303", vec![]),
        Error::InvalidReturnType { .. } => ("E0304", vec![]),
        Error::EqualityOperands { .. } => (
            "E0305",
            vec![Suggestion::new("Compare values of the same type", 0.6)],
        ),
        Error::NonIntegerDivMod { .. } => (
            "E0306",
            vec![Suggestion::new("Use '/' for float division", 0.8)],
        ),
        Error::NonIntegerIndex { .. } => ("E0307", vec![]),

        // ========== Code generation / object code ==========
        Error::CodeGen(_) => ("E0901", vec![]),
        Error::Malformed(_) => ("E0902", vec![]),
        Error::Io(_) => ("E0903", vec![]),

        // ========== Runtime ==========
        Error::NoAlternative { .. } => (
            "E1001",
            vec![Suggestion::new("Add a guard that covers the remaining cases", 0.7)],
        ),
        Error::NoFunctionReturn { .. } => (
            "E1002",
            vec![Suggestion::new("Return a value on every path through the function", 0.8)],
        ),
        Error::DivisionByZero => ("E1003", vec![]),
        Error::IndexOutOfBounds { .. } => ("E1004", vec![]),
        Error::NegativeArraySize(_) => ("E1005", vec![]),
        Error::NullArray => ("E1006", vec![]),
        Error::StackOverflow => ("E1007", vec![]),
        Error::BadInput { .. } => ("E1008", vec![]),
    }
}

impl CheckFeedback {
    pub fn success(source_file: String, stats: CheckStats) -> Self {
        Self {
            success: true,
            source_file,
            diagnostics: vec![],
            stats,
        }
    }

    pub fn failure(source_file: String, error: &Error) -> Self {
        let diagnostics = vec![ErrorReport::from_error(error, &source_file)];
        Self {
            success: false,
            source_file,
            diagnostics,
            stats: CheckStats::default(),
        }
    }

    /// Output as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
