//! Stack-machine code generator
//!
//! Walks the finalized AST and emits one routine for the program body and
//! one per procedure or function. Every expression is emitted for the type
//! its context needs; a mismatch inserts a single `I2F`/`F2I` at that node.

use std::collections::HashSet;
use std::mem;

use log::{debug, trace};

use crate::backend::codegen::CodeGen;
use crate::backend::object::*;
use crate::backend::stack::routine::{Label, RoutineBuilder};
use crate::frontend::ast::*;
use crate::semantic::{Analysis, SymbolId, SymbolKind};
use crate::types::Type;
use crate::utils::{Error, Result};

/// Stack-machine backend
pub struct StackCodeGen {
    package: String,
}

impl StackCodeGen {
    pub fn new(package: &str) -> Self {
        Self { package: package.to_string() }
    }
}

impl Default for StackCodeGen {
    fn default() -> Self {
        Self::new(DEFAULT_PACKAGE)
    }
}

impl CodeGen for StackCodeGen {
    fn generate(&mut self, program: &Program, analysis: &mut Analysis) -> Result<ObjectUnit> {
        let mut emitter = Emitter::new(analysis);
        for stmt in &program.body {
            emitter.stmt(stmt)?;
        }
        emitter.current.emit(Instr::Return);

        let entry = mem::replace(&mut emitter.current, RoutineBuilder::new("", vec![], None)).finish()?;
        debug!(
            "generated {}.{}: {} globals, {} routines",
            self.package,
            program.name.name,
            emitter.globals.len(),
            emitter.routines.len()
        );

        Ok(ObjectUnit {
            package: self.package.clone(),
            name: program.name.name.clone(),
            globals: emitter.globals,
            entry,
            routines: emitter.routines,
        })
    }

    fn name(&self) -> &str {
        "stack"
    }
}

/// Where a symbol lives at run time
enum Place {
    Local(u16),
    Global(String),
}

struct Emitter<'a> {
    analysis: &'a mut Analysis,
    /// Routine being emitted
    current: RoutineBuilder,
    /// Procedure or function being emitted, `None` for the program body
    current_method: Option<SymbolId>,
    /// Where a satisfied guard continues: the end of an `if`, the top of a `do`
    guard_targets: Vec<Label>,
    globals: Vec<Field>,
    routines: Vec<Routine>,
    routine_names: HashSet<String>,
    field_counter: usize,
}

impl<'a> Emitter<'a> {
    fn new(analysis: &'a mut Analysis) -> Self {
        let mut routine_names = HashSet::new();
        routine_names.insert("main".to_string());
        Self {
            analysis,
            current: RoutineBuilder::new("main", vec![], None),
            current_method: None,
            guard_targets: Vec::new(),
            globals: Vec::new(),
            routines: Vec::new(),
            routine_names,
            field_counter: 0,
        }
    }

    // ==================== Storage ====================

    fn slot_type(&self, id: SymbolId) -> Result<SlotType> {
        let symbol = self.analysis.symbols.get(id);
        match symbol.kind {
            SymbolKind::Array => SlotType::array(symbol.ty),
            _ => SlotType::scalar(symbol.ty),
        }
    }

    /// Local slot or global field of a symbol, allocated on first use
    fn place(&mut self, id: SymbolId) -> Result<Place> {
        let slot = self.slot_type(id)?;
        let symbol = self.analysis.symbols.get(id);

        if symbol.is_local() {
            if let Some(address) = symbol.address {
                return Ok(Place::Local(address));
            }
            let address = self.current.alloc_local(slot)?;
            trace!("{} -> slot {} of {}", symbol.name, address, self.current.name());
            self.analysis.symbols.get_mut(id).address = Some(address);
            return Ok(Place::Local(address));
        }

        if let Some(field) = &symbol.backing {
            return Ok(Place::Global(field.clone()));
        }
        let field = format!("{}${}", symbol.name, self.field_counter);
        self.field_counter += 1;
        trace!("{} -> field {}", symbol.name, field);
        self.globals.push(Field { name: field.clone(), ty: slot });
        self.analysis.symbols.get_mut(id).backing = Some(field.clone());
        Ok(Place::Global(field))
    }

    fn load_symbol(&mut self, id: SymbolId) -> Result<()> {
        let slot = self.slot_type(id)?;
        let instr = match self.place(id)? {
            Place::Global(field) => Instr::GetStatic(field),
            Place::Local(n) if slot.is_array() => Instr::ALoad(n),
            Place::Local(n) if slot == SlotType::Float => Instr::FLoad(n),
            Place::Local(n) => Instr::ILoad(n),
        };
        self.current.emit(instr);
        Ok(())
    }

    fn store_symbol(&mut self, id: SymbolId) -> Result<()> {
        let slot = self.slot_type(id)?;
        let instr = match self.place(id)? {
            Place::Global(field) => Instr::PutStatic(field),
            Place::Local(n) if slot.is_array() => Instr::AStore(n),
            Place::Local(n) if slot == SlotType::Float => Instr::FStore(n),
            Place::Local(n) => Instr::IStore(n),
        };
        self.current.emit(instr);
        Ok(())
    }

    /// Name of the routine a procedure or function is emitted as
    fn routine_name(&mut self, id: SymbolId) -> String {
        let symbol = self.analysis.symbols.get(id);
        if let Some(name) = &symbol.backing {
            return name.clone();
        }
        let mut name = symbol.name.clone();
        if self.routine_names.contains(&name) {
            name = format!("{}${}", symbol.name, self.field_counter);
            self.field_counter += 1;
        }
        self.routine_names.insert(name.clone());
        self.analysis.symbols.get_mut(id).backing = Some(name.clone());
        name
    }

    fn elem_type(&self, array: &Ident) -> Result<Type> {
        Ok(self.analysis.symbol(array)?.ty)
    }

    // ==================== Routines ====================

    fn method(&mut self, decl: &MethodDecl) -> Result<()> {
        let id = self.analysis.binding(&decl.name)?;
        let name = self.routine_name(id);

        let symbol = self.analysis.symbols.get(id);
        let ret = match symbol.kind {
            SymbolKind::Function(_) => Some(SlotType::scalar(symbol.ty)?),
            _ => None,
        };
        let param_ids = symbol.kind.signature().map(|s| s.params.clone()).unwrap_or_default();
        let params = param_ids
            .iter()
            .map(|&p| self.slot_type(p))
            .collect::<Result<Vec<_>>>()?;

        let outer = mem::replace(&mut self.current, RoutineBuilder::new(&name, params.clone(), ret));
        let outer_method = self.current_method.replace(id);
        let outer_guards = mem::take(&mut self.guard_targets);

        for (&param, &ty) in param_ids.iter().zip(&params) {
            let address = self.current.alloc_local(ty)?;
            self.analysis.symbols.get_mut(param).address = Some(address);
        }

        for stmt in &decl.body.stmts {
            self.stmt(stmt)?;
        }

        match ret {
            Some(ret) => {
                // falling off the end of a function is a run-time error
                self.current.emit(Instr::IConst(line_of(decl.name.span.line)));
                self.current.emit(Instr::InvokeRuntime(RuntimeCall::AbortNoFunctionReturn));
                if ret == SlotType::Float {
                    self.current.emit(Instr::FConst(0.0));
                    self.current.emit(Instr::FReturn);
                } else {
                    self.current.emit(Instr::IConst(-1));
                    self.current.emit(Instr::IReturn);
                }
            }
            None => self.current.emit(Instr::Return),
        }

        let routine = mem::replace(&mut self.current, outer).finish()?;
        self.current_method = outer_method;
        self.guard_targets = outer_guards;

        trace!("emitted routine {} ({} instructions)", routine.name, routine.code.len());
        self.routines.push(routine);
        Ok(())
    }

    /// Push arguments converted to the parameter types and invoke
    fn call(&mut self, callee: &Ident, args: &[Expr]) -> Result<()> {
        let id = self.analysis.binding(callee)?;
        let param_types = self.analysis.symbols.param_types(id);
        for (arg, ty) in args.iter().zip(param_types) {
            self.expr(arg, ty)?;
        }
        let name = self.routine_name(id);
        self.current.emit(Instr::Invoke(name));
        Ok(())
    }

    // ==================== Statements ====================

    fn stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match &stmt.kind {
            // storage is materialised lazily on first access
            StmtKind::VarDecl { .. } => {}
            StmtKind::ArrayDecl { ty, size, names } => {
                let elem = if *ty == Type::Float { ElemType::Float } else { ElemType::Int };
                for name in names {
                    let id = self.analysis.binding(name)?;
                    self.expr(size, Type::Int)?;
                    self.current.emit(Instr::NewArray(elem));
                    self.store_symbol(id)?;
                }
            }
            StmtKind::Procedure(decl) | StmtKind::Function(decl) => self.method(decl)?,
            StmtKind::Assign { targets, values } => self.assign(targets, values)?,
            StmtKind::Input { targets } => {
                for ident in targets {
                    let id = self.analysis.binding(ident)?;
                    let call = match self.analysis.symbols.get(id).ty {
                        Type::Float => RuntimeCall::InputFloat,
                        Type::Boolean => RuntimeCall::InputBoolean,
                        _ => RuntimeCall::InputInt,
                    };
                    self.current.emit(Instr::SConst(ident.name.clone()));
                    self.current.emit(Instr::InvokeRuntime(call));
                    self.store_symbol(id)?;
                }
            }
            StmtKind::Print(expr) => {
                let ty = self.analysis.type_of(expr.id);
                self.expr(expr, ty)?;
                let call = match ty {
                    Type::Float => RuntimeCall::PrintFloat,
                    Type::Boolean => RuntimeCall::PrintBoolean,
                    _ => RuntimeCall::PrintInt,
                };
                self.current.emit(Instr::InvokeRuntime(call));
            }
            StmtKind::Alternative(guards) => {
                let end = self.current.new_label();
                self.guard_targets.push(end);
                for guard in guards {
                    self.guard(guard)?;
                }
                self.guard_targets.pop();
                self.current.emit(Instr::IConst(line_of(stmt.span.line)));
                self.current.emit(Instr::InvokeRuntime(RuntimeCall::AbortNoAlternative));
                self.current.place(end);
            }
            StmtKind::Iterative(guards) => {
                let top = self.current.new_label();
                self.current.place(top);
                self.guard_targets.push(top);
                for guard in guards {
                    self.guard(guard)?;
                }
                self.guard_targets.pop();
            }
            StmtKind::Block(block) => {
                for stmt in &block.stmts {
                    self.stmt(stmt)?;
                }
            }
            StmtKind::Return(value) => self.ret(value.as_ref())?,
            StmtKind::Call { callee, args } => self.call(callee, args)?,
        }
        Ok(())
    }

    /// Evaluate every source before storing any target, then store in reverse
    fn assign(&mut self, targets: &[Target], values: &[Expr]) -> Result<()> {
        for (target, value) in targets.iter().zip(values) {
            match target {
                Target::Var(ident) => {
                    let ty = self.analysis.symbol(ident)?.ty;
                    self.expr(value, ty)?;
                }
                Target::Index { array, index } => {
                    let elem = self.elem_type(array)?;
                    self.load_symbol(self.analysis.binding(array)?)?;
                    self.expr(index, Type::Int)?;
                    self.expr(value, elem)?;
                }
            }
        }

        for target in targets.iter().rev() {
            match target {
                Target::Var(ident) => self.store_symbol(self.analysis.binding(ident)?)?,
                Target::Index { array, .. } => {
                    let instr = if self.elem_type(array)? == Type::Float {
                        Instr::FAStore
                    } else {
                        Instr::IAStore
                    };
                    self.current.emit(instr);
                }
            }
        }
        Ok(())
    }

    fn guard(&mut self, guard: &Guard) -> Result<()> {
        let next = *self
            .guard_targets
            .last()
            .ok_or_else(|| Error::CodeGen("guard outside if/do".to_string()))?;
        let fail = self.current.new_label();

        self.expr(&guard.cond, Type::Boolean)?;
        self.current.branch_if(Cond::Eq, fail);
        self.stmt(&guard.body)?;
        self.current.goto(next);
        self.current.place(fail);
        Ok(())
    }

    fn ret(&mut self, value: Option<&Expr>) -> Result<()> {
        let Some(expr) = value else {
            self.current.emit(Instr::Return);
            return Ok(());
        };
        let method = self
            .current_method
            .ok_or_else(|| Error::CodeGen("return outside a routine".to_string()))?;
        let ty = self.analysis.symbols.get(method).ty;
        self.expr(expr, ty)?;
        let instr = if ty == Type::Float { Instr::FReturn } else { Instr::IReturn };
        self.current.emit(instr);
        Ok(())
    }

    // ==================== Expressions ====================

    /// Emit `expr` so that it leaves a value of type `needed` on the stack
    fn expr(&mut self, expr: &Expr, needed: Type) -> Result<()> {
        let ty = self.analysis.type_of(expr.id);
        match &expr.kind {
            // constants are pushed directly in the needed type
            ExprKind::Int(v) => {
                let instr = if needed == Type::Float { Instr::FConst(*v as f32) } else { Instr::IConst(*v) };
                self.current.emit(instr);
                return Ok(());
            }
            ExprKind::Float(v) => {
                let instr = if needed == Type::Int { Instr::IConst(*v as i32) } else { Instr::FConst(*v) };
                self.current.emit(instr);
                return Ok(());
            }
            ExprKind::Bool(b) => {
                self.current.emit(Instr::IConst(i32::from(*b)));
                return Ok(());
            }
            ExprKind::Paren(inner) => return self.expr(inner, needed),
            ExprKind::Var(ident) => self.load_symbol(self.analysis.binding(ident)?)?,
            ExprKind::Index { array, index } => {
                self.load_symbol(self.analysis.binding(array)?)?;
                self.expr(index, Type::Int)?;
                let instr = if ty == Type::Float { Instr::FALoad } else { Instr::IALoad };
                self.current.emit(instr);
            }
            ExprKind::Call { callee, args } => self.call(callee, args)?,
            ExprKind::Unary { op: UnOp::Neg, expr: inner } => {
                self.expr(inner, ty)?;
                let instr = if ty == Type::Float { Instr::FNeg } else { Instr::INeg };
                self.current.emit(instr);
            }
            ExprKind::Unary { op: UnOp::Not, expr: inner } => {
                self.expr(inner, Type::Boolean)?;
                // 1 when the operand is 0
                self.bool_from_branch(|code, when_false| code.branch_if(Cond::Ne, when_false));
            }
            ExprKind::Binary { op, lhs, rhs } => self.binary(*op, lhs, rhs, ty)?,
        }
        self.cast(ty, needed);
        Ok(())
    }

    fn cast(&mut self, from: Type, to: Type) {
        match (from, to) {
            (Type::Int, Type::Float) => self.current.emit(Instr::I2F),
            (Type::Float, Type::Int) => self.current.emit(Instr::F2I),
            _ => {}
        }
    }

    /// Leave 1 or 0 on the stack; `branch` must jump to its label when the result is false
    fn bool_from_branch(&mut self, branch: impl FnOnce(&mut RoutineBuilder, Label)) {
        let when_false = self.current.new_label();
        let end = self.current.new_label();
        branch(&mut self.current, when_false);
        self.current.emit(Instr::IConst(1));
        self.current.goto(end);
        self.current.place(when_false);
        self.current.emit(Instr::IConst(0));
        self.current.place(end);
    }

    fn binary(&mut self, op: BinOp, lhs: &Expr, rhs: &Expr, ty: Type) -> Result<()> {
        match op {
            BinOp::Add | BinOp::Sub | BinOp::Mul => {
                self.expr(lhs, ty)?;
                self.expr(rhs, ty)?;
                let float = ty == Type::Float;
                let instr = match (op, float) {
                    (BinOp::Add, false) => Instr::IAdd,
                    (BinOp::Add, true) => Instr::FAdd,
                    (BinOp::Sub, false) => Instr::ISub,
                    (BinOp::Sub, true) => Instr::FSub,
                    (_, false) => Instr::IMul,
                    (_, true) => Instr::FMul,
                };
                self.current.emit(instr);
            }
            BinOp::Slash => {
                self.expr(lhs, Type::Float)?;
                self.expr(rhs, Type::Float)?;
                self.current.emit(Instr::FDiv);
            }
            BinOp::Div | BinOp::Mod => {
                self.expr(lhs, Type::Int)?;
                self.expr(rhs, Type::Int)?;
                let instr = if op == BinOp::Div { Instr::IDiv } else { Instr::IRem };
                self.current.emit(instr);
            }
            BinOp::And | BinOp::Or => {
                self.expr(lhs, Type::Boolean)?;
                self.expr(rhs, Type::Boolean)?;
                let instr = if op == BinOp::And { Instr::IAnd } else { Instr::IOr };
                self.current.emit(instr);
            }
            BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge | BinOp::Eq | BinOp::Ne => {
                let cond = match op {
                    BinOp::Lt => Cond::Lt,
                    BinOp::Gt => Cond::Gt,
                    BinOp::Le => Cond::Le,
                    BinOp::Ge => Cond::Ge,
                    BinOp::Eq => Cond::Eq,
                    _ => Cond::Ne,
                };
                let float = self.analysis.type_of(lhs.id) == Type::Float
                    || self.analysis.type_of(rhs.id) == Type::Float;
                let operand = if float { Type::Float } else { Type::Int };
                self.expr(lhs, operand)?;
                self.expr(rhs, operand)?;

                if float {
                    // NaN must make every comparison false
                    let compare = if matches!(cond, Cond::Lt | Cond::Le) { Instr::FCmpG } else { Instr::FCmpL };
                    self.current.emit(compare);
                    self.bool_from_branch(|code, when_false| code.branch_if(cond.negate(), when_false));
                } else {
                    self.bool_from_branch(|code, when_false| code.branch_icmp(cond.negate(), when_false));
                }
            }
        }
        Ok(())
    }
}

/// Line numbers travel to the runtime as int operands
fn line_of(line: u32) -> i32 {
    i32::try_from(line).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parser::parse_source;
    use crate::semantic::{analyze, Storage};
    use pretty_assertions::assert_eq;

    fn generate(source: &str) -> (ObjectUnit, Analysis) {
        let program = parse_source(source).unwrap();
        let mut analysis = analyze(&program).unwrap();
        let unit = StackCodeGen::default().generate(&program, &mut analysis).unwrap();
        (unit, analysis)
    }

    #[test]
    fn test_globals_are_lazy_fields() {
        let (unit, _) = generate("program Main int unused; a <- 1; print a");
        assert_eq!(unit.name, "Main");
        assert_eq!(unit.package, DEFAULT_PACKAGE);
        assert_eq!(unit.globals, vec![Field { name: "a$0".to_string(), ty: SlotType::Int }]);
        assert_eq!(
            unit.entry.code,
            vec![
                Instr::IConst(1),
                Instr::PutStatic("a$0".to_string()),
                Instr::GetStatic("a$0".to_string()),
                Instr::InvokeRuntime(RuntimeCall::PrintInt),
                Instr::Return,
            ]
        );
    }

    #[test]
    fn test_literal_conversion_at_leaf() {
        let (unit, _) = generate("program p int a; float b; a <- 1.9; b <- 1");
        assert_eq!(unit.entry.code[0], Instr::IConst(1));
        assert_eq!(unit.entry.code[2], Instr::FConst(1.0));
    }

    #[test]
    fn test_single_conversion_at_node() {
        let (unit, _) = generate("program p int a, b; float c; a, b <- 1, 2; c <- a + b");
        let tail: Vec<Instr> = unit.entry.code[4..].to_vec();
        assert_eq!(
            tail,
            vec![
                Instr::GetStatic("a$1".to_string()),
                Instr::GetStatic("b$0".to_string()),
                Instr::IAdd,
                Instr::I2F,
                Instr::PutStatic("c$2".to_string()),
                Instr::Return,
            ]
        );
    }

    #[test]
    fn test_simultaneous_assignment_stores_in_reverse() {
        let (unit, _) = generate("program p a, b <- 1, 2; a, b <- b, a");
        assert_eq!(
            unit.entry.code,
            vec![
                Instr::IConst(1),
                Instr::IConst(2),
                Instr::PutStatic("b$0".to_string()),
                Instr::PutStatic("a$1".to_string()),
                Instr::GetStatic("b$0".to_string()),
                Instr::GetStatic("a$1".to_string()),
                Instr::PutStatic("b$0".to_string()),
                Instr::PutStatic("a$1".to_string()),
                Instr::Return,
            ]
        );
    }

    #[test]
    fn test_array_store_pushes_array_index_value() {
        let (unit, _) = generate("program p int[4] xs; xs[2] <- 1");
        assert_eq!(
            unit.entry.code,
            vec![
                Instr::IConst(4),
                Instr::NewArray(ElemType::Int),
                Instr::PutStatic("xs$0".to_string()),
                Instr::GetStatic("xs$0".to_string()),
                Instr::IConst(2),
                Instr::IConst(1),
                Instr::IAStore,
                Instr::Return,
            ]
        );
        assert_eq!(unit.globals[0].ty, SlotType::IntArray);
    }

    #[test]
    fn test_alternation_layout() {
        let (unit, _) = generate("program p\nboolean b\nb <- true\nif b :: print 1 fi");
        assert_eq!(
            unit.entry.code,
            vec![
                Instr::IConst(1),
                Instr::PutStatic("b$0".to_string()),
                Instr::GetStatic("b$0".to_string()),
                Instr::If(Cond::Eq, 7),
                Instr::IConst(1),
                Instr::InvokeRuntime(RuntimeCall::PrintInt),
                Instr::Goto(9),
                Instr::IConst(4),
                Instr::InvokeRuntime(RuntimeCall::AbortNoAlternative),
                Instr::Return,
            ]
        );
    }

    #[test]
    fn test_iteration_jumps_back_to_top() {
        let (unit, _) = generate("program p boolean b; b <- false; do b :: b <- false od");
        assert_eq!(
            unit.entry.code,
            vec![
                Instr::IConst(0),
                Instr::PutStatic("b$0".to_string()),
                Instr::GetStatic("b$0".to_string()),
                Instr::If(Cond::Eq, 7),
                Instr::IConst(0),
                Instr::PutStatic("b$0".to_string()),
                Instr::Goto(2),
                Instr::Return,
            ]
        );
    }

    #[test]
    fn test_routines_and_locals() {
        let (unit, analysis) = generate(
            "program p
             fun add(int x, float y) : float { z <- x; return z + y }
             proc show(b) { print b }
             show(add(1, 2))",
        );
        assert_eq!(unit.routines.len(), 2);

        let add = unit.routine("add").unwrap();
        assert_eq!(add.params, vec![SlotType::Int, SlotType::Float]);
        assert_eq!(add.ret, Some(SlotType::Float));
        assert_eq!(add.locals, vec![SlotType::Int, SlotType::Float, SlotType::Int]);
        assert_eq!(add.code[0], Instr::ILoad(0));
        assert_eq!(add.code[1], Instr::IStore(2));
        assert!(add.code.contains(&Instr::InvokeRuntime(RuntimeCall::AbortNoFunctionReturn)));
        assert_eq!(add.code.last(), Some(&Instr::FReturn));

        let show = unit.routine("show").unwrap();
        assert_eq!(show.params, vec![SlotType::Float]);
        assert_eq!(show.code.last(), Some(&Instr::Return));

        assert_eq!(
            unit.entry.code,
            vec![
                Instr::IConst(1),
                Instr::FConst(2.0),
                Instr::Invoke("add".to_string()),
                Instr::Invoke("show".to_string()),
                Instr::Return,
            ]
        );
        assert!(unit.globals.is_empty());

        let z = analysis.lookup_name("z").unwrap();
        assert_eq!(z.storage, Storage::Local);
        assert_eq!(z.address, Some(2));
    }

    #[test]
    fn test_sibling_routines_reuse_slots() {
        let (unit, _) = generate(
            "program p
             proc a(int x) { print x }
             proc b(float y) { print y }",
        );
        assert_eq!(unit.routine("a").unwrap().code[0], Instr::ILoad(0));
        assert_eq!(unit.routine("b").unwrap().code[0], Instr::FLoad(0));
    }

    #[test]
    fn test_shadowed_routine_names_are_unique() {
        let (unit, _) = generate(
            "program p
             { proc f() { print 1 } f() }
             { proc f() { print 2 } f() }",
        );
        let names: Vec<&str> = unit.routines.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["f", "f$0"]);
        assert_eq!(unit.entry.code[0], Instr::Invoke("f".to_string()));
        assert_eq!(unit.entry.code[1], Instr::Invoke("f$0".to_string()));
    }

    #[test]
    fn test_float_comparison() {
        let (unit, _) = generate("program p float f; f <- 1.5; print f < 2");
        assert_eq!(
            unit.entry.code[2..].to_vec(),
            vec![
                Instr::GetStatic("f$0".to_string()),
                Instr::FConst(2.0),
                Instr::FCmpG,
                Instr::If(Cond::Ge, 8),
                Instr::IConst(1),
                Instr::Goto(9),
                Instr::IConst(0),
                Instr::InvokeRuntime(RuntimeCall::PrintBoolean),
                Instr::Return,
            ]
        );
    }
}
