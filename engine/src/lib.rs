//! Lexer, parser and evaluator for a line-oriented scientific calculator language.
//!
//! Each line is scanned by the [`Lexer`], parsed by the [`Parser`] against a mutable
//! [`Environment`] and evaluated into an `f64`. The language supports:
//!
//! - Arithmetic with `+`, `-`, `*`, `/`, `%` and `^` (all left-associative), unary `-`
//!   and postfix factorial `!`
//! - Implicit multiplication with a parenthesized expression, e.g., `2(3 + 4)`
//! - Builtin constants `pi` and `e`, and builtin functions `sin`, `cos`, `tan` (taking
//!   degrees), `sqrt`, `cbrt`, `round`, `floor`, `ceil` and `ln`
//! - Variable assignments (`y = 5`) and deletions (`del y`)
//! - Single-parameter user functions (`f: x^2 + 1`) called as `f(3)`
//!
//! Errors are collected into [`Diagnostics`] keyed by the source span. Evaluation itself
//! never fails: division by zero and similar cases produce IEEE 754 special values.
//!
//! # Examples
//!
//! ```
//! use scicalc_engine::{evaluate_line, format_value, Environment, ErrorKind};
//!
//! let mut env = Environment::new();
//! assert_eq!(evaluate_line(&mut env, "2^3^2").unwrap(), 64.0);
//!
//! evaluate_line(&mut env, "f: x^2 + 1").unwrap();
//! evaluate_line(&mut env, "y = f(3)").unwrap();
//! assert_eq!(env.variable("y"), Some(10.0));
//!
//! let errors = evaluate_line(&mut env, "y = 7").unwrap_err();
//! let (span, kind) = errors.iter().next().unwrap();
//! assert_eq!(span.range(), 0..1);
//! assert_eq!(*kind, ErrorKind::AlreadyExists("y".to_owned()));
//!
//! let value = evaluate_line(&mut env, "sin(30)").unwrap();
//! assert_eq!(format_value(value), "0.5");
//! ```

#![warn(missing_docs, missing_debug_implementations)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::float_cmp
)]

pub use crate::{
    ast::{Callee, Expr},
    env::Environment,
    error::{Diagnostics, ErrorKind, SpannedError},
    lexer::{tokenize, Highlight, Lexer, Token, TokenKind},
    ops::{BinaryOp, OpPriority, UnaryOp},
    parser::{Parser, FN_PARAMETER, MAX_NESTING},
    spans::{Spanned, TextSpan},
};

mod ast;
pub mod env;
mod error;
mod lexer;
mod ops;
mod parser;
mod spans;

/// Result of parsing a single line.
#[derive(Debug, Clone)]
pub struct ParsedLine {
    /// Parsed expression. [`Expr::Error`] if parsing has failed.
    pub expr: Expr,
    /// Errors found in the line.
    pub diagnostics: Diagnostics,
}

impl ParsedLine {
    /// Checks whether the line contains no errors.
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Scans and parses a single line. The line may modify `env`, even if it contains errors.
pub fn parse_line(env: &mut Environment, source: &str) -> ParsedLine {
    let mut diagnostics = Diagnostics::new();
    let tokens = Lexer::new(source).lex(&mut diagnostics);
    let expr = Parser::new(tokens, env, &mut diagnostics).parse_top_level();
    ParsedLine { expr, diagnostics }
}

/// Scans, parses and evaluates a single line.
pub fn evaluate_line(env: &mut Environment, source: &str) -> Result<f64, Diagnostics> {
    let ParsedLine { expr, diagnostics } = parse_line(env, source);
    if diagnostics.is_empty() {
        Ok(expr.evaluate())
    } else {
        Err(diagnostics)
    }
}

/// Number of decimal places in [`format_value()`] output.
const DISPLAYED_DECIMALS: usize = 15;

/// Formats a value for display: rounds to 15 decimal places and trims trailing zeros.
/// Negative zero is displayed as `0`; infinities and NaN are displayed as `inf`, `-inf`
/// and `NaN`.
///
/// # Examples
///
/// ```
/// # use scicalc_engine::format_value;
/// assert_eq!(format_value(2.5), "2.5");
/// assert_eq!(format_value(1.0 / 3.0), "0.333333333333333");
/// assert_eq!(format_value(-1e-20), "0");
/// assert_eq!(format_value(f64::NEG_INFINITY), "-inf");
/// ```
pub fn format_value(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let mut formatted = format!("{value:.prec$}", prec = DISPLAYED_DECIMALS);
    if formatted.contains('.') {
        let trimmed_len = formatted.trim_end_matches('0').trim_end_matches('.').len();
        formatted.truncate(trimmed_len);
    }
    if formatted == "-0" {
        formatted = "0".to_owned();
    }
    formatted
}
