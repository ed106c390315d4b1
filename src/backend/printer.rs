//! Unit printer - human-readable listing of an object unit
//!
//! Used by `build --emit-asm` and in tests.

use std::fmt::{self, Write};

use crate::backend::object::*;
use crate::utils::{Error, Result};

/// Pretty printer for object units
pub struct UnitPrinter {
    output: String,
}

impl UnitPrinter {
    pub fn new() -> Self {
        Self { output: String::new() }
    }

    /// Print a whole unit to string
    pub fn print_unit(&mut self, unit: &ObjectUnit) -> Result<String> {
        self.output.clear();
        self.write_unit(unit)
            .map_err(|e| Error::CodeGen(format!("listing failed: {}", e)))?;
        Ok(self.output.clone())
    }

    fn write_unit(&mut self, unit: &ObjectUnit) -> fmt::Result {
        writeln!(self.output, "; unit {}", unit.qualified_name())?;
        writeln!(self.output, "; routines: {}", unit.routines.len() + 1)?;
        writeln!(self.output)?;

        for field in &unit.globals {
            writeln!(self.output, "static {}: {}", field.name, field.ty)?;
        }
        if !unit.globals.is_empty() {
            writeln!(self.output)?;
        }

        self.write_routine(&unit.entry)?;
        for routine in &unit.routines {
            writeln!(self.output)?;
            self.write_routine(routine)?;
        }
        Ok(())
    }

    fn write_routine(&mut self, routine: &Routine) -> fmt::Result {
        let params: Vec<String> = routine.params.iter().map(|p| p.to_string()).collect();
        write!(self.output, "{}({})", routine.name, params.join(", "))?;
        match routine.ret {
            Some(ret) => writeln!(self.output, " -> {} {{", ret)?,
            None => writeln!(self.output, " {{")?,
        }

        if routine.locals.len() > routine.params.len() {
            let locals: Vec<String> = routine.locals[routine.params.len()..]
                .iter()
                .enumerate()
                .map(|(i, ty)| format!("{}:{}", i + routine.params.len(), ty))
                .collect();
            writeln!(self.output, "  ; locals {}", locals.join(" "))?;
        }

        // Offsets some branch jumps to
        let targets: Vec<usize> = routine.code.iter().filter_map(Instr::target).collect();
        for (offset, instr) in routine.code.iter().enumerate() {
            let mark = if targets.contains(&offset) { ">" } else { " " };
            writeln!(self.output, "{}{:4}  {}", mark, offset, instr_str(instr))?;
        }

        writeln!(self.output, "}}")
    }
}

impl Default for UnitPrinter {
    fn default() -> Self {
        Self::new()
    }
}

/// Mnemonic and operands of one instruction
pub fn instr_str(instr: &Instr) -> String {
    match instr {
        Instr::IConst(v) => format!("iconst {}", v),
        Instr::FConst(v) => format!("fconst {:?}", v),
        Instr::SConst(s) => format!("sconst {:?}", s),
        Instr::ILoad(n) => format!("iload {}", n),
        Instr::FLoad(n) => format!("fload {}", n),
        Instr::ALoad(n) => format!("aload {}", n),
        Instr::IStore(n) => format!("istore {}", n),
        Instr::FStore(n) => format!("fstore {}", n),
        Instr::AStore(n) => format!("astore {}", n),
        Instr::GetStatic(f) => format!("getstatic {}", f),
        Instr::PutStatic(f) => format!("putstatic {}", f),
        Instr::NewArray(ElemType::Int) => "newarray int".to_string(),
        Instr::NewArray(ElemType::Float) => "newarray float".to_string(),
        Instr::If(cond, t) => format!("if{} {}", cond, t),
        Instr::IfICmp(cond, t) => format!("if_icmp{} {}", cond, t),
        Instr::Goto(t) => format!("goto {}", t),
        Instr::Invoke(name) => format!("invoke {}", name),
        Instr::InvokeRuntime(call) => format!("invoke runtime.{}", call.name()),
        other => format!("{:?}", other).to_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{CodeGen, StackCodeGen};
    use crate::frontend::parser::parse_source;
    use crate::semantic::analyze;

    fn compile_and_print(source: &str) -> String {
        let program = parse_source(source).unwrap();
        let mut analysis = analyze(&program).unwrap();
        let unit = StackCodeGen::default().generate(&program, &mut analysis).unwrap();
        UnitPrinter::new().print_unit(&unit).unwrap()
    }

    #[test]
    fn test_print_header_and_fields() {
        let listing = compile_and_print("program Demo a <- 1.5; print a");
        assert!(listing.starts_with("; unit djkcode.Demo\n"));
        assert!(listing.contains("static a$0: float"));
        assert!(listing.contains("fconst 1.5"));
        assert!(listing.contains("invoke runtime.printFloat"));
    }

    #[test]
    fn test_print_routine_signature() {
        let listing = compile_and_print("program p fun sq(int n) : int { m <- n * n; return m } print sq(3)");
        assert!(listing.contains("sq(int) -> int {"));
        assert!(listing.contains("; locals 1:int"));
        assert!(listing.contains("imul"));
        assert!(listing.contains("ireturn"));
    }

    #[test]
    fn test_print_marks_branch_targets() {
        let listing = compile_and_print("program p do false :: print 1 od");
        assert!(listing.contains(">   0  iconst 0"));
        assert!(listing.contains("ifeq 5"));
        assert!(listing.contains("goto 0"));
    }
}
