//! Routine builder: instruction buffer, labels and the local slot allocator

use crate::backend::object::{Cond, Instr, Routine, SlotType};
use crate::utils::{Error, Result};

/// Forward or backward branch target, resolved when the routine is finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label(usize);

pub struct RoutineBuilder {
    name: String,
    params: Vec<SlotType>,
    ret: Option<SlotType>,
    locals: Vec<SlotType>,
    code: Vec<Instr>,
    /// Offset of each label once placed
    labels: Vec<Option<usize>>,
    /// Instructions whose target still holds a label index
    fixups: Vec<usize>,
}

impl RoutineBuilder {
    pub fn new(name: &str, params: Vec<SlotType>, ret: Option<SlotType>) -> Self {
        Self {
            name: name.to_string(),
            params,
            ret,
            locals: Vec::new(),
            code: Vec::new(),
            labels: Vec::new(),
            fixups: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Next free local slot
    pub fn alloc_local(&mut self, ty: SlotType) -> Result<u16> {
        let slot = u16::try_from(self.locals.len())
            .map_err(|_| Error::CodeGen(format!("too many locals in {}", self.name)))?;
        self.locals.push(ty);
        Ok(slot)
    }

    pub fn emit(&mut self, instr: Instr) {
        self.code.push(instr);
    }

    pub fn new_label(&mut self) -> Label {
        self.labels.push(None);
        Label(self.labels.len() - 1)
    }

    /// Bind a label to the next instruction offset
    pub fn place(&mut self, label: Label) {
        self.labels[label.0] = Some(self.code.len());
    }

    fn jump(&mut self, instr: Instr) {
        self.fixups.push(self.code.len());
        self.code.push(instr);
    }

    pub fn goto(&mut self, label: Label) {
        self.jump(Instr::Goto(label.0));
    }

    /// Pop an int and branch when it compares to zero as `cond`
    pub fn branch_if(&mut self, cond: Cond, label: Label) {
        self.jump(Instr::If(cond, label.0));
    }

    /// Pop two ints and branch when they compare as `cond`
    pub fn branch_icmp(&mut self, cond: Cond, label: Label) {
        self.jump(Instr::IfICmp(cond, label.0));
    }

    /// Resolve labels and produce the routine
    pub fn finish(mut self) -> Result<Routine> {
        for &at in &self.fixups {
            let target = match &mut self.code[at] {
                Instr::If(_, t) | Instr::IfICmp(_, t) | Instr::Goto(t) => t,
                other => return Err(Error::CodeGen(format!("{:?} is not a branch", other))),
            };
            *target = self.labels[*target].ok_or_else(|| {
                Error::CodeGen(format!("label {} never placed in {}", *target, self.name))
            })?;
        }

        Ok(Routine {
            name: self.name,
            params: self.params,
            ret: self.ret,
            locals: self.locals,
            code: self.code,
        })
    }
}
