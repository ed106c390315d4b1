//! Backend module - Code generation for the stack machine

pub mod codegen;
pub mod object;
pub mod printer;
pub mod stack;

pub use codegen::CodeGen;
pub use printer::UnitPrinter;
pub use stack::StackCodeGen;
