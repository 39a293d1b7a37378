//! REPL for the calculator.

use codespan_reporting::term::termcolor::{Ansi, Color, ColorChoice, ColorSpec, WriteColor};
use rustyline::{
    completion::Completer, error::ReadlineError, highlight::Highlighter, hint::Hinter,
    history::DefaultHistory, validate::Validator, Editor, Helper,
};

use std::{
    borrow::Cow,
    io::{self, Write},
};

use scicalc_engine::{tokenize, Highlight};

use crate::common::Env;

const PROMPT: &str = ">> ";

/// Highlights the input line based on its tokens.
#[derive(Debug)]
struct ReplHelper;

impl ReplHelper {
    fn color_spec(highlight: Highlight) -> Option<ColorSpec> {
        let mut spec = ColorSpec::new();
        match highlight {
            Highlight::Number => spec.set_fg(Some(Color::Cyan)),
            Highlight::Identifier => spec.set_fg(Some(Color::Yellow)),
            Highlight::Comma => spec.set_fg(Some(Color::White)),
            Highlight::Paren => spec.set_dimmed(true),
            Highlight::Bad => spec.set_fg(Some(Color::Red)).set_underline(true),
            Highlight::Del => spec.set_fg(Some(Color::Magenta)).set_bold(true),
            Highlight::Other => return None,
        };
        Some(spec)
    }

    fn highlight_line(line: &str) -> io::Result<String> {
        let mut buffer = Ansi::new(Vec::with_capacity(line.len() * 2));
        for token in tokenize(line) {
            let spec = Self::color_spec(token.kind.highlight());
            Self::write_colored(&mut buffer, token.lexeme, spec.as_ref())?;
        }
        Self::into_string(buffer)
    }

    fn write_colored(
        buffer: &mut Ansi<Vec<u8>>,
        text: &str,
        spec: Option<&ColorSpec>,
    ) -> io::Result<()> {
        if let Some(spec) = spec {
            buffer.set_color(spec)?;
            buffer.write_all(text.as_bytes())?;
            buffer.reset()
        } else {
            buffer.write_all(text.as_bytes())
        }
    }

    fn into_string(buffer: Ansi<Vec<u8>>) -> io::Result<String> {
        String::from_utf8(buffer.into_inner())
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }
}

impl Highlighter for ReplHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Self::highlight_line(line).map_or(Cow::Borrowed(line), Cow::Owned)
    }

    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        _default: bool,
    ) -> Cow<'b, str> {
        let mut buffer = Ansi::new(Vec::with_capacity(prompt.len() * 2));
        let spec = ColorSpec::new().set_fg(Some(Color::Green)).clone();
        Self::write_colored(&mut buffer, prompt, Some(&spec))
            .and_then(|()| Self::into_string(buffer))
            .map_or(Cow::Borrowed(prompt), Cow::Owned)
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Completer for ReplHelper {
    type Candidate = String;
}

impl Hinter for ReplHelper {
    type Hint = String;
}

impl Validator for ReplHelper {}

impl Helper for ReplHelper {}

pub fn repl(color_choice: ColorChoice) -> anyhow::Result<()> {
    let mut rl = Editor::<ReplHelper, DefaultHistory>::new()?;
    if !matches!(color_choice, ColorChoice::Never) {
        rl.set_helper(Some(ReplHelper));
    }
    let mut env = Env::new(color_choice);
    env.print_greeting()?;

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                rl.add_history_entry(line.as_str())?;
                env.parse_and_eval(&line)?;
            }

            Err(ReadlineError::Interrupted) => {
                println!("Bye");
                break Ok(());
            }

            Err(ReadlineError::Eof) => break Ok(()),

            Err(err) => break Err(err.into()),
        }
    }
}
