//! Reference virtual machine for object units

mod machine;
mod runtime;

pub use machine::Machine;
pub use runtime::{ConsoleRuntime, Runtime};

use crate::backend::object::ObjectUnit;
use crate::utils::Result;

/// Execute a unit against the given runtime
pub fn execute(unit: &ObjectUnit, runtime: &mut dyn Runtime) -> Result<()> {
    Machine::new(unit, runtime).run()
}
