//! Type finalizer: settles what the fixpoint left open

use log::trace;

use crate::semantic::symbol::SymbolKind;
use crate::semantic::Analysis;
use crate::types::Type;
use crate::utils::{Error, Result};

/// `Num` defaults to `Int`; a variable still `Undefined` is an error.
pub struct TypeFinalizer<'a> {
    analysis: &'a mut Analysis,
}

impl<'a> TypeFinalizer<'a> {
    pub fn new(analysis: &'a mut Analysis) -> Self {
        Self { analysis }
    }

    pub fn finalize(self) -> Result<()> {
        for (id, symbol) in self.analysis.symbols.iter_mut() {
            if matches!(symbol.kind, SymbolKind::Procedure(_)) {
                continue;
            }
            match symbol.ty {
                Type::Num => {
                    trace!("{} ({}) defaults to int", symbol.name, id);
                    symbol.ty = Type::Int;
                }
                Type::Undefined => {
                    return Err(Error::UnresolvedType {
                        name: symbol.name.clone(),
                        span: symbol.span,
                    });
                }
                _ => {}
            }
        }

        for ty in self.analysis.types.values_mut() {
            if *ty == Type::Num {
                *ty = Type::Int;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parser::parse_source;
    use crate::semantic::{resolve_to_fixpoint, ScopeManager, SymbolBuilder};

    fn finalize(source: &str) -> Result<Analysis> {
        let program = parse_source(source)?;
        let mut scopes = ScopeManager::new();
        let mut analysis = SymbolBuilder::new(&mut scopes).build(&program)?;
        resolve_to_fixpoint(&program, &mut analysis)?;
        TypeFinalizer::new(&mut analysis).finalize()?;
        Ok(analysis)
    }

    #[test]
    fn test_num_defaults_to_int() {
        let analysis = finalize("program p input a, b; c <- a + b; print a < 3").unwrap();
        for name in ["a", "b", "c"] {
            assert_eq!(analysis.lookup_name(name).unwrap().ty, Type::Int, "{}", name);
        }
        assert!(analysis.types.values().all(|&t| t != Type::Num));
    }

    #[test]
    fn test_unconstrained_input_is_an_error() {
        let err = finalize("program p input a; print a").unwrap_err();
        assert!(matches!(err, Error::UnresolvedType { ref name, .. } if name == "a"));
        assert_eq!(err.to_string(), "Unable to infer type of identifier a");
    }

    #[test]
    fn test_unused_parameter_is_an_error() {
        let err = finalize("program p proc foo(x) { print 1 }").unwrap_err();
        assert!(matches!(err, Error::UnresolvedType { ref name, .. } if name == "x"));
    }

    #[test]
    fn test_procedures_are_left_alone() {
        let analysis = finalize("program p proc foo() { print 1 } foo()").unwrap();
        assert_eq!(analysis.lookup_name("foo").unwrap().ty, Type::Undefined);
    }
}
