//! CLI / REPL for the scientific calculator.

use clap::{Args, Parser, Subcommand, ValueEnum};
use codespan_reporting::term::termcolor::ColorChoice;
use is_terminal::IsTerminal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use std::{
    io::{self, BufRead, Read},
    process,
};

mod common;
mod repl;

use crate::{
    common::{Env, ERROR_EXIT_CODE},
    repl::repl,
};

const ABOUT: &str = "CLI and REPL for evaluating scientific calculator expressions.";

const AFTER_HELP: &str = "\
EXIT CODES:
    0    Normal exit
    1    Invalid command-line option
    2    Parsing error in non-interactive mode";

/// Exit code on invalid command-line args.
const ARGS_ERROR_EXIT_CODE: i32 = 1;

/// Environment variable containing the logging filter.
const LOG_ENV_VAR: &str = "SCICALC_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ColorOption {
    /// Use colors if the output is a terminal.
    Auto,
    /// Always use colors.
    Always,
    /// Never use colors.
    Never,
}

impl ColorOption {
    fn color_choice(self, is_terminal: bool) -> ColorChoice {
        match self {
            Self::Auto if is_terminal => ColorChoice::Auto,
            Self::Auto | Self::Never => ColorChoice::Never,
            Self::Always => ColorChoice::Always,
        }
    }
}

#[derive(Debug, Parser)]
#[command(version, about = ABOUT, after_help = AFTER_HELP)]
struct Cli {
    /// Coloring of the output.
    #[arg(long, global = true, value_enum, env = "COLOR", default_value_t = ColorOption::Auto)]
    color: ColorOption,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a line and output its AST.
    Ast {
        /// Line to parse. If omitted, the line will be read from stdin.
        command: Option<String>,
    },
    /// Evaluate lines in a shared environment.
    Eval(EvalArgs),
}

#[derive(Debug, Args)]
struct EvalArgs {
    /// Launch the REPL.
    #[arg(long, short = 'i')]
    interactive: bool,
    /// Line to evaluate. If omitted, lines will be read from stdin.
    #[arg(conflicts_with = "interactive")]
    command: Option<String>,
}

impl Cli {
    fn run(self) -> anyhow::Result<()> {
        let color_choice = self.color.color_choice(io::stderr().is_terminal());
        init_tracing(color_choice != ColorChoice::Never);

        match self.command {
            Command::Ast { command } => Self::output_ast(color_choice, command),
            Command::Eval(args) if args.interactive => repl(color_choice),
            Command::Eval(args) => Self::evaluate(color_choice, args.command),
        }
    }

    fn output_ast(color_choice: ColorChoice, command: Option<String>) -> anyhow::Result<()> {
        let command = match command {
            Some(command) => command,
            None => {
                let mut buffer = String::new();
                io::stdin().read_to_string(&mut buffer)?;
                buffer.trim_end_matches(['\r', '\n']).to_owned()
            }
        };

        let mut env = Env::new(color_choice);
        if let Some(expr) = env.parse(&command)? {
            println!("{expr:#?}");
            Ok(())
        } else {
            process::exit(ERROR_EXIT_CODE);
        }
    }

    fn evaluate(color_choice: ColorChoice, command: Option<String>) -> anyhow::Result<()> {
        let mut env = Env::new(color_choice);
        if let Some(command) = command {
            return Self::evaluate_line(&mut env, &command);
        }

        for line in io::stdin().lock().lines() {
            let line = line?;
            if !line.trim().is_empty() {
                Self::evaluate_line(&mut env, &line)?;
            }
        }
        Ok(())
    }

    fn evaluate_line(env: &mut Env, line: &str) -> anyhow::Result<()> {
        if env.parse_and_eval(line)? {
            Ok(())
        } else {
            process::exit(ERROR_EXIT_CODE);
        }
    }
}

fn init_tracing(ansi: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(ansi)
                .with_target(true),
        )
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    match Cli::try_parse() {
        Ok(cli) => cli.run(),
        // `--help` or `--version`
        Err(err) if !err.use_stderr() => Ok(err.print()?),
        Err(err) => {
            err.print()?;
            process::exit(ARGS_ERROR_EXIT_CODE);
        }
    }
}
