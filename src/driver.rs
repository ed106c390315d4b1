//! Compilation driver: source text in, object unit out

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::backend::object::{ObjectUnit, DEFAULT_PACKAGE, OBJECT_EXTENSION};
use crate::backend::{CodeGen, StackCodeGen};
use crate::frontend::parser::parse_source;
use crate::semantic::{analyze, Analysis};
use crate::utils::Result;

/// Options shared by `build` and `run`
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Package qualifier of the emitted unit
    pub package: String,
    /// Root directory for object files
    pub output_dir: PathBuf,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            package: DEFAULT_PACKAGE.to_string(),
            output_dir: PathBuf::from("."),
        }
    }
}

impl CompileOptions {
    /// `<output_dir>/<package>/<name>.djo`
    pub fn object_path(&self, unit: &ObjectUnit) -> PathBuf {
        self.output_dir
            .join(&self.package)
            .join(&unit.name)
            .with_extension(OBJECT_EXTENSION)
    }
}

/// Parse and analyze without generating code
pub fn check(source: &str) -> Result<Analysis> {
    let program = parse_source(source)?;
    info!("parsed program {} ({} statements)", program.name.name, program.body.len());
    analyze(&program)
}

/// Run every pass and return the generated unit
pub fn compile(source: &str, options: &CompileOptions) -> Result<ObjectUnit> {
    let program = parse_source(source)?;
    info!("parsed program {} ({} statements)", program.name.name, program.body.len());

    let mut analysis = analyze(&program)?;
    info!("analysis passed: {} symbols", analysis.symbols.len());

    let mut codegen = StackCodeGen::new(&options.package);
    let unit = codegen.generate(&program, &mut analysis)?;
    info!(
        "{} backend emitted {} ({} routines)",
        codegen.name(),
        unit.qualified_name(),
        unit.routines.len() + 1
    );
    Ok(unit)
}

/// Serialize a unit under the output directory and return its path
pub fn write_unit(unit: &ObjectUnit, options: &CompileOptions) -> Result<PathBuf> {
    let path = options.object_path(unit);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(&path, unit.to_json()?)?;
    info!("wrote {}", path.display());
    Ok(path)
}

pub fn read_unit(path: &Path) -> Result<ObjectUnit> {
    let text = fs::read_to_string(path)?;
    ObjectUnit::from_json(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Error;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_compile_uses_package() {
        let options = CompileOptions {
            package: "demo".to_string(),
            ..CompileOptions::default()
        };
        let unit = compile("program Hello print 1", &options).unwrap();
        assert_eq!(unit.qualified_name(), "demo.Hello");
        assert_eq!(options.object_path(&unit), PathBuf::from("./demo/Hello.djo"));
    }

    #[test]
    fn test_first_error_aborts() {
        let err = compile("program p print x", &CompileOptions::default()).unwrap_err();
        assert!(matches!(err, Error::UndefinedSymbol { ref name, .. } if name == "x"));
        assert!(check("program p x <- 1 print x").is_ok());
    }

    #[test]
    fn test_write_and_read_unit() {
        let options = CompileOptions {
            package: "pkg".to_string(),
            output_dir: std::env::temp_dir().join(format!("djkc-test-{}", std::process::id())),
        };
        let unit = compile("program RoundTrip a <- 2.5 print a", &options).unwrap();
        let path = write_unit(&unit, &options).unwrap();
        assert!(path.ends_with("pkg/RoundTrip.djo"));
        assert_eq!(read_unit(&path).unwrap(), unit);
        fs::remove_dir_all(&options.output_dir).unwrap();
    }
}
