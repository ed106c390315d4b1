//! djkc - Dijkstra Compiler
//!
//! Compiles guarded-command programs to stack-machine object units and runs them.

mod backend;
mod driver;
mod feedback;
mod frontend;
mod semantic;
mod types;
mod utils;
mod vm;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use backend::object::{DEFAULT_PACKAGE, OBJECT_EXTENSION};
use backend::UnitPrinter;
use driver::CompileOptions;
use feedback::{CheckFeedback, CheckStats};
use vm::ConsoleRuntime;

/// Dijkstra Compiler
#[derive(Parser, Debug)]
#[command(name = "djkc")]
#[command(version = "0.1.0")]
#[command(about = "Compiler for Dijkstra's guarded-command language")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input source file (.djk)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    #[command(flatten)]
    build: BuildArgs,
}

#[derive(clap::Args, Debug, Clone)]
struct BuildArgs {
    /// Output directory for object files
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output: PathBuf,

    /// Package qualifier of the generated unit
    #[arg(short, long, default_value = DEFAULT_PACKAGE)]
    package: String,

    /// Print a listing of the generated code
    #[arg(long)]
    emit_asm: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a source file to an object unit
    Build {
        /// Input source file
        input: PathBuf,

        #[command(flatten)]
        args: BuildArgs,
    },
    /// Check a source file for errors
    Check {
        /// Input source file
        input: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compile (or load) and execute a program
    Run {
        /// Source file (.djk) or object file (.djo)
        input: PathBuf,

        #[arg(short, long, default_value = DEFAULT_PACKAGE)]
        package: String,
    },
    /// Print version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Some(Commands::Build { input, args }) => build_file(input, args),
        Some(Commands::Check { input, json }) => check_file(input, *json),
        Some(Commands::Run { input, package }) => run_file(input, package),
        Some(Commands::Version) => {
            println!("djkc 0.1.0");
            println!("Dijkstra Compiler");
            println!("License: Apache-2.0");
            Ok(())
        }
        None => match &cli.input {
            Some(input) => build_file(input, &cli.build),
            None => {
                eprintln!("Error: No input file specified");
                eprintln!("Usage: djkc <FILE> or djkc build <FILE>");
                process::exit(1);
            }
        },
    };

    if let Err(e) = result {
        report(&e);
        process::exit(1);
    }
}

/// Print an error, with its source line when the compiler knows it
fn report(error: &anyhow::Error) {
    match error.downcast_ref::<utils::Error>() {
        Some(e) if e.is_runtime() => eprintln!("Runtime error: {}", e),
        Some(e) => match e.line() {
            Some(line) => eprintln!("Error (line {}): {}", line, e),
            None => eprintln!("Error: {}", e),
        },
        None => eprintln!("Error: {:#}", error),
    }
}

fn read_source(input: &Path) -> Result<String> {
    fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))
}

/// Compile a source file and write its object unit
fn build_file(input: &Path, args: &BuildArgs) -> Result<()> {
    println!("Dijkstra Compiler v0.1.0");
    println!("Compiling: {}", input.display());

    let source = read_source(input)?;
    let options = CompileOptions {
        package: args.package.clone(),
        output_dir: args.output.clone(),
    };

    let unit = driver::compile(&source, &options)?;
    println!("  [✓] Analysis passed");
    println!("  [✓] Generated {} ({} routines)", unit.qualified_name(), unit.routines.len() + 1);

    if args.emit_asm {
        let listing = UnitPrinter::new().print_unit(&unit)?;
        println!("\n{}", listing);
    }

    let path = driver::write_unit(&unit, &options)
        .with_context(|| format!("writing object file under {}", options.output_dir.display()))?;
    println!("\n✅ Output: {}", path.display());
    Ok(())
}

/// Check a source file for errors without generating code
fn check_file(input: &Path, json: bool) -> Result<()> {
    let source = read_source(input)?;
    let file_name = input.display().to_string();

    if json {
        let feedback = match driver::check(&source) {
            Ok(analysis) => CheckFeedback::success(file_name, CheckStats::collect(&analysis, &source)),
            Err(e) => CheckFeedback::failure(file_name, &e),
        };
        println!("{}", feedback.to_json());
        if !feedback.success {
            process::exit(1);
        }
        return Ok(());
    }

    println!("Checking: {}", file_name);
    driver::check(&source)?;
    println!("✅ No errors found");
    Ok(())
}

/// Run a source file or a previously written object file
fn run_file(input: &Path, package: &str) -> Result<()> {
    let unit = if input.extension().map_or(false, |e| e == OBJECT_EXTENSION) {
        driver::read_unit(input).with_context(|| format!("loading {}", input.display()))?
    } else {
        let source = read_source(input)?;
        let options = CompileOptions {
            package: package.to_string(),
            ..CompileOptions::default()
        };
        driver::compile(&source, &options)?
    };

    let mut runtime = ConsoleRuntime::stdio();
    vm::execute(&unit, &mut runtime)?;
    Ok(())
}
