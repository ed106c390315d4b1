//! Code generation trait - backend abstraction
//!
//! Backends lower an analysed program into an object unit.

use crate::backend::object::ObjectUnit;
use crate::frontend::ast::Program;
use crate::semantic::Analysis;
use crate::utils::Result;

/// Code generation backend trait
pub trait CodeGen {
    /// Emit object code for a fully typed program. Backends record storage
    /// decisions (slots, field names) on the analysed symbols.
    fn generate(&mut self, program: &Program, analysis: &mut Analysis) -> Result<ObjectUnit>;

    /// Get the backend name
    fn name(&self) -> &str;
}
