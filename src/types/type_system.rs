//! Type lattice for the guarded-command language
//!
//! `Undefined ⊑ Num ⊑ {Int, Float}`, with `Boolean` disjoint from the numeric chain.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils::{Error, Result, Span};

/// A (possibly provisional) value type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    /// Nothing known yet
    Undefined,
    /// Some numeric type, not yet decided
    Num,
    Int,
    Float,
    Boolean,
}

impl Type {
    /// Num, Int or Float
    pub fn is_numeric(self) -> bool {
        matches!(self, Type::Num | Type::Int | Type::Float)
    }

    /// Int, Float or Boolean; nothing can refine these further
    pub fn is_terminal(self) -> bool {
        matches!(self, Type::Int | Type::Float | Type::Boolean)
    }
}

impl Default for Type {
    fn default() -> Self {
        Type::Undefined
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Type::Undefined => "undefined",
            Type::Num => "num",
            Type::Int => "int",
            Type::Float => "float",
            Type::Boolean => "boolean",
        };
        write!(f, "{}", s)
    }
}

/// Refine `current` with `proposed`.
///
/// Returns the refined type and whether it differs from `current`. Mixing
/// Boolean with a numeric type is a conflict. A numeric proposal onto a
/// terminal numeric type leaves it alone; casting is code generation's job.
pub fn unify(current: Type, proposed: Type, span: Span) -> Result<(Type, bool)> {
    use Type::*;

    match (current, proposed) {
        (_, Undefined) => Ok((current, false)),
        (Undefined, p) => Ok((p, true)),
        (Boolean, Boolean) => Ok((Boolean, false)),
        (Boolean, _) | (_, Boolean) => Err(Error::TypeConflict {
            current: current.to_string(),
            proposed: proposed.to_string(),
            span,
        }),
        (Num, Int) | (Num, Float) => Ok((proposed, true)),
        (c, _) => Ok((c, false)),
    }
}
