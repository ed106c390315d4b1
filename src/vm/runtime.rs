//! Runtime support called by generated code through `InvokeRuntime`

use std::io::{self, BufRead, Write};

use crate::utils::{Error, Result};

/// Host side of the runtime support contract
pub trait Runtime {
    fn print_int(&mut self, value: i32) -> Result<()>;
    fn print_float(&mut self, value: f32) -> Result<()>;
    fn print_boolean(&mut self, value: bool) -> Result<()>;

    fn input_int(&mut self, name: &str) -> Result<i32>;
    fn input_float(&mut self, name: &str) -> Result<f32>;
    fn input_boolean(&mut self, name: &str) -> Result<bool>;

    /// An `if` found no true guard
    fn abort_no_alternative(&mut self, line: i32) -> Error {
        Error::NoAlternative { line }
    }

    /// A function body ended without `return`
    fn abort_no_function_return(&mut self, line: i32) -> Error {
        Error::NoFunctionReturn { line }
    }
}

/// Floats always show a fractional part: `1.0`, `1.5`
pub fn format_float(value: f32) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "Infinity".to_string() } else { "-Infinity".to_string() }
    } else if value.fract() == 0.0 && value.abs() < 1e7 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

fn parse_int(name: &str, text: &str) -> Result<i32> {
    text.parse().map_err(|_| Error::BadInput { name: name.to_string(), text: text.to_string() })
}

fn parse_float(name: &str, text: &str) -> Result<f32> {
    text.parse().map_err(|_| Error::BadInput { name: name.to_string(), text: text.to_string() })
}

fn parse_boolean(name: &str, text: &str) -> Result<bool> {
    match text {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(Error::BadInput { name: name.to_string(), text: text.to_string() }),
    }
}

/// Line-oriented runtime over any reader and writer
pub struct ConsoleRuntime<R, W> {
    input: R,
    output: W,
}

impl ConsoleRuntime<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsoleRuntime<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn print(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{}", text)?;
        Ok(())
    }

    /// Prompt with `name? ` and read one trimmed line
    fn read_line(&mut self, name: &str) -> Result<String> {
        write!(self.output, "{}? ", name)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(Error::BadInput { name: name.to_string(), text: "end of input".to_string() });
        }
        Ok(line.trim().to_string())
    }
}

impl<R: BufRead, W: Write> Runtime for ConsoleRuntime<R, W> {
    fn print_int(&mut self, value: i32) -> Result<()> {
        self.print(&value.to_string())
    }

    fn print_float(&mut self, value: f32) -> Result<()> {
        self.print(&format_float(value))
    }

    fn print_boolean(&mut self, value: bool) -> Result<()> {
        self.print(&value.to_string())
    }

    fn input_int(&mut self, name: &str) -> Result<i32> {
        let text = self.read_line(name)?;
        parse_int(name, &text)
    }

    fn input_float(&mut self, name: &str) -> Result<f32> {
        let text = self.read_line(name)?;
        parse_float(name, &text)
    }

    fn input_boolean(&mut self, name: &str) -> Result<bool> {
        let text = self.read_line(name)?;
        parse_boolean(name, &text)
    }
}

/// Runtime fed from a fixed list of inputs that records everything printed
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ScriptedRuntime {
    inputs: std::collections::VecDeque<String>,
    pub prompts: Vec<String>,
    pub output: Vec<String>,
}

#[cfg(test)]
impl ScriptedRuntime {
    pub fn new(inputs: &[&str]) -> Self {
        Self {
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    fn next(&mut self, name: &str) -> Result<String> {
        self.prompts.push(name.to_string());
        self.inputs
            .pop_front()
            .ok_or_else(|| Error::BadInput { name: name.to_string(), text: "end of input".to_string() })
    }
}

#[cfg(test)]
impl Runtime for ScriptedRuntime {
    fn print_int(&mut self, value: i32) -> Result<()> {
        self.output.push(value.to_string());
        Ok(())
    }

    fn print_float(&mut self, value: f32) -> Result<()> {
        self.output.push(format_float(value));
        Ok(())
    }

    fn print_boolean(&mut self, value: bool) -> Result<()> {
        self.output.push(value.to_string());
        Ok(())
    }

    fn input_int(&mut self, name: &str) -> Result<i32> {
        let text = self.next(name)?;
        parse_int(name, &text)
    }

    fn input_float(&mut self, name: &str) -> Result<f32> {
        let text = self.next(name)?;
        parse_float(name, &text)
    }

    fn input_boolean(&mut self, name: &str) -> Result<bool> {
        let text = self.next(name)?;
        parse_boolean(name, &text)
    }
}
