//! Stack-machine backend
//!
//! Lowers the typed AST into routines of typed stack instructions with
//! label-resolved branches.

mod routine;
mod stack_codegen;

pub use routine::{Label, RoutineBuilder};
pub use stack_codegen::StackCodeGen;
