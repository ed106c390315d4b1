//! Object code for the stack machine
//!
//! An [`ObjectUnit`] is what the compiler emits for one program: the entry
//! routine, one routine per procedure or function, and the global fields
//! materialised for program-level symbols. Units serialize to JSON.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Type;
use crate::utils::{Error, Result};

/// Package used when none is given
pub const DEFAULT_PACKAGE: &str = "djkcode";

/// File extension of serialized units
pub const OBJECT_EXTENSION: &str = "djo";

/// Storage type of a field, local slot, parameter or return value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotType {
    Int,
    Float,
    Boolean,
    IntArray,
    FloatArray,
    BooleanArray,
}

impl SlotType {
    /// Slot type of a finalized scalar type
    pub fn scalar(ty: Type) -> Result<SlotType> {
        match ty {
            Type::Int => Ok(SlotType::Int),
            Type::Float => Ok(SlotType::Float),
            Type::Boolean => Ok(SlotType::Boolean),
            other => Err(Error::CodeGen(format!("no storage for type {}", other))),
        }
    }

    /// Slot type of an array with the given element type
    pub fn array(elem: Type) -> Result<SlotType> {
        match elem {
            Type::Int => Ok(SlotType::IntArray),
            Type::Float => Ok(SlotType::FloatArray),
            Type::Boolean => Ok(SlotType::BooleanArray),
            other => Err(Error::CodeGen(format!("no array storage for type {}", other))),
        }
    }

    pub fn is_array(self) -> bool {
        matches!(self, SlotType::IntArray | SlotType::FloatArray | SlotType::BooleanArray)
    }
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SlotType::Int => "int",
            SlotType::Float => "float",
            SlotType::Boolean => "boolean",
            SlotType::IntArray => "int[]",
            SlotType::FloatArray => "float[]",
            SlotType::BooleanArray => "boolean[]",
        };
        write!(f, "{}", s)
    }
}

/// Element kind of a `NewArray`; booleans are stored as ints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElemType {
    Int,
    Float,
}

/// Branch condition, comparing against zero (`If`) or two ints (`IfICmp`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cond {
    Eq,
    Ne,
    Lt,
    Ge,
    Gt,
    Le,
}

impl Cond {
    pub fn holds(self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            Cond::Eq => ordering == Equal,
            Cond::Ne => ordering != Equal,
            Cond::Lt => ordering == Less,
            Cond::Ge => ordering != Less,
            Cond::Gt => ordering == Greater,
            Cond::Le => ordering != Greater,
        }
    }

    pub fn negate(self) -> Cond {
        match self {
            Cond::Eq => Cond::Ne,
            Cond::Ne => Cond::Eq,
            Cond::Lt => Cond::Ge,
            Cond::Ge => Cond::Lt,
            Cond::Gt => Cond::Le,
            Cond::Le => Cond::Gt,
        }
    }
}

impl fmt::Display for Cond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Cond::Eq => "eq",
            Cond::Ne => "ne",
            Cond::Lt => "lt",
            Cond::Ge => "ge",
            Cond::Gt => "gt",
            Cond::Le => "le",
        };
        write!(f, "{}", s)
    }
}

/// Runtime support routines called by generated code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuntimeCall {
    /// `(int) -> ()`
    PrintInt,
    /// `(float) -> ()`
    PrintFloat,
    /// `(boolean) -> ()`
    PrintBoolean,
    /// `(name) -> int`
    InputInt,
    /// `(name) -> float`
    InputFloat,
    /// `(name) -> boolean`
    InputBoolean,
    /// `(line) -> !`
    AbortNoAlternative,
    /// `(line) -> !`
    AbortNoFunctionReturn,
}

impl RuntimeCall {
    pub fn name(self) -> &'static str {
        match self {
            RuntimeCall::PrintInt => "printInt",
            RuntimeCall::PrintFloat => "printFloat",
            RuntimeCall::PrintBoolean => "printBoolean",
            RuntimeCall::InputInt => "inputInt",
            RuntimeCall::InputFloat => "inputFloat",
            RuntimeCall::InputBoolean => "inputBoolean",
            RuntimeCall::AbortNoAlternative => "abortNoAlternative",
            RuntimeCall::AbortNoFunctionReturn => "abortNoFunctionReturn",
        }
    }
}

/// One stack-machine instruction. Branch targets are instruction offsets
/// within the same routine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instr {
    IConst(i32),
    FConst(f32),
    SConst(String),

    ILoad(u16),
    FLoad(u16),
    ALoad(u16),
    IStore(u16),
    FStore(u16),
    AStore(u16),
    GetStatic(String),
    PutStatic(String),

    NewArray(ElemType),
    IALoad,
    FALoad,
    IAStore,
    FAStore,

    IAdd,
    ISub,
    IMul,
    IDiv,
    IRem,
    INeg,
    FAdd,
    FSub,
    FMul,
    FDiv,
    FNeg,
    I2F,
    F2I,
    IAnd,
    IOr,
    /// Float compare, NaN gives -1
    FCmpL,
    /// Float compare, NaN gives 1
    FCmpG,

    If(Cond, usize),
    IfICmp(Cond, usize),
    Goto(usize),

    Invoke(String),
    InvokeRuntime(RuntimeCall),
    IReturn,
    FReturn,
    Return,
}

impl Instr {
    /// Branch target, if this instruction can jump
    pub fn target(&self) -> Option<usize> {
        match self {
            Instr::If(_, t) | Instr::IfICmp(_, t) | Instr::Goto(t) => Some(*t),
            _ => None,
        }
    }
}

/// A named global storage location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub ty: SlotType,
}

/// One callable unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Routine {
    pub name: String,
    /// Occupy the first local slots, in order
    pub params: Vec<SlotType>,
    pub ret: Option<SlotType>,
    /// Type of every local slot, parameters included
    pub locals: Vec<SlotType>,
    pub code: Vec<Instr>,
}

/// Everything emitted for one program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectUnit {
    pub package: String,
    pub name: String,
    pub globals: Vec<Field>,
    pub entry: Routine,
    pub routines: Vec<Routine>,
}

impl ObjectUnit {
    /// Package-qualified name, e.g. `djkcode.Main`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.package, self.name)
    }

    pub fn routine(&self, name: &str) -> Option<&Routine> {
        self.routines.iter().find(|r| r.name == name)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Io(e.to_string()))
    }

    pub fn from_json(text: &str) -> Result<ObjectUnit> {
        serde_json::from_str(text).map_err(|e| Error::Malformed(e.to_string()))
    }
}
