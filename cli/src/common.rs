//! Common utils.

use codespan::{FileId, Files};
use codespan_reporting::{
    diagnostic::{Diagnostic, Label},
    term::termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor},
    term::{emit, Config as ReportingConfig},
};
use unindent::unindent;

use std::io::Write;

use scicalc_engine::{
    env::{Builtin, BUILTINS},
    format_value, parse_line, Diagnostics, Environment, Expr,
};

/// Exit code on parsing errors in the non-interactive mode.
pub const ERROR_EXIT_CODE: i32 = 2;

const HELP: &str = "
    Enter an expression to evaluate it, e.g., `2 * sin(30) + 1`.

    Syntax:
      y = 1 + 2      declare a variable
      f: x^2 + 1     define a function of `x`; call it as `f(3)`
      del y          delete a variable
      5!             factorial; `2(3 + 4)` multiplies implicitly

    Commands:
      .help          show this message
      .dump          list declared variables and functions
      .clear         remove all variables and functions
";

/// Code map containing evaluated lines.
#[derive(Debug, Default)]
struct CodeMap {
    files: Files<String>,
    snippet_count: usize,
}

impl CodeMap {
    fn add(&mut self, source: &str) -> FileId {
        self.snippet_count += 1;
        let file_name = format!("Snip #{}", self.snippet_count);
        self.files.add(file_name, source.to_owned())
    }
}

/// Calculator session together with the means to report its results.
pub struct Env {
    code_map: CodeMap,
    writer: StandardStream,
    out: StandardStream,
    config: ReportingConfig,
    calculator: Environment,
}

impl Env {
    pub fn new(color_choice: ColorChoice) -> Self {
        Self {
            code_map: CodeMap::default(),
            writer: StandardStream::stderr(color_choice),
            out: StandardStream::stdout(color_choice),
            config: ReportingConfig::default(),
            calculator: Environment::new(),
        }
    }

    pub fn print_greeting(&mut self) -> anyhow::Result<()> {
        let mut writer = self.writer.lock();
        writer.set_color(ColorSpec::new().set_bold(true))?;
        writeln!(writer, "scicalc REPL v{}", env!("CARGO_PKG_VERSION"))?;
        writer.reset()?;
        writeln!(writer, "{}", env!("CARGO_PKG_DESCRIPTION"))?;
        writeln!(writer, "Use `.help` for help; Ctrl+C or Ctrl+D to exit.")?;
        Ok(())
    }

    fn print_help(&mut self) -> anyhow::Result<()> {
        let (constants, functions): (Vec<_>, Vec<_>) = BUILTINS
            .iter()
            .partition(|(_, builtin)| matches!(builtin, Builtin::Constant(_)));
        let names = |builtins: Vec<(&str, Builtin)>| {
            let names: Vec<_> = builtins.into_iter().map(|(name, _)| name).collect();
            names.join(", ")
        };

        let mut writer = self.writer.lock();
        write!(writer, "{}", unindent(HELP))?;
        writeln!(writer)?;
        writeln!(writer, "Builtin constants: {}", names(constants))?;
        writeln!(writer, "Builtin functions: {}", names(functions))?;
        writeln!(writer, "Trigonometric functions take degrees.")?;
        Ok(())
    }

    /// Outputs variables and functions declared in the session.
    fn dump(&mut self) -> anyhow::Result<()> {
        let num_color = ColorSpec::new().set_fg(Some(Color::Green)).clone();
        let fn_color = ColorSpec::new().set_fg(Some(Color::Magenta)).clone();
        let mut writer = self.writer.lock();

        for (name, value) in self.calculator.variables() {
            write!(writer, "{name} = ")?;
            writer.set_color(&num_color)?;
            write!(writer, "{}", format_value(value))?;
            writer.reset()?;
            writeln!(writer)?;
        }
        for (name, body) in self.calculator.functions() {
            write!(writer, "{name}: ")?;
            writer.set_color(&fn_color)?;
            write!(writer, "{body}")?;
            writer.reset()?;
            writeln!(writer)?;
        }
        Ok(())
    }

    fn report_diagnostics(&self, file: FileId, diagnostics: &Diagnostics) -> anyhow::Result<()> {
        let mut writer = self.writer.lock();
        for (span, kind) in diagnostics.iter() {
            let code = if kind.is_lex_error() { "LEX" } else { "PARSE" };
            let label = Label::primary(file, span.range()).with_message("Error occurred here");
            let diagnostic = Diagnostic::error()
                .with_message(kind.to_string())
                .with_code(code)
                .with_labels(vec![label]);
            emit(&mut writer, &self.config, &self.code_map.files, &diagnostic)?;
        }
        Ok(())
    }

    fn report_unknown_command(&self, file: FileId, line: &str) -> anyhow::Result<()> {
        let label = Label::primary(file, 0..line.len())
            .with_message("Use `.help` to find out commands");
        let diagnostic = Diagnostic::error()
            .with_message("Unknown command")
            .with_code("CMD")
            .with_labels(vec![label]);
        emit(
            &mut self.writer.lock(),
            &self.config,
            &self.code_map.files,
            &diagnostic,
        )?;
        Ok(())
    }

    /// Parses a line without evaluating it. Returns `None` and reports diagnostics
    /// if the line contains errors.
    pub fn parse(&mut self, line: &str) -> anyhow::Result<Option<Expr>> {
        let file = self.code_map.add(line);
        let parsed = parse_line(&mut self.calculator, line);
        if parsed.is_ok() {
            Ok(Some(parsed.expr))
        } else {
            self.report_diagnostics(file, &parsed.diagnostics)?;
            Ok(None)
        }
    }

    /// Handles a single line, which is either a command starting with `.` or an expression.
    /// Returns `false` if the line contains errors.
    pub fn parse_and_eval(&mut self, line: &str) -> anyhow::Result<bool> {
        if is_command(line) {
            return self.run_command(line);
        }

        let Some(expr) = self.parse(line)? else {
            return Ok(false);
        };
        let value = expr.evaluate();
        tracing::debug!(%expr, value, "evaluated line");

        let mut out = self.out.lock();
        out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
        write!(out, "{}", format_value(value))?;
        out.reset()?;
        writeln!(out)?;
        Ok(true)
    }

    fn run_command(&mut self, line: &str) -> anyhow::Result<bool> {
        match line.trim_end() {
            ".help" => self.print_help()?,
            ".dump" => self.dump()?,
            ".clear" => self.calculator.clear(),
            _ => {
                let file = self.code_map.add(line);
                self.report_unknown_command(file, line)?;
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Checks whether the line is a dot command. Lines like `.5 + 1` start with a number literal.
fn is_command(line: &str) -> bool {
    let mut chars = line.chars();
    chars.next() == Some('.') && !chars.next().is_some_and(|ch| ch.is_ascii_digit())
}
