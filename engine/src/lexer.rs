//! Lexer turning a line of source text into [`Token`]s.
//!
//! The lexer is total: it never fails and never loses input. Concatenating the lexemes of all
//! tokens except the final [`TokenKind::Eof`] reproduces the source exactly. Unrecognized
//! characters become [`TokenKind::Bad`] tokens, and malformed number literals are still
//! scanned to the end; both are reported to the [`Diagnostics`] sink.

use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{anychar, char as tag_char, satisfy},
    combinator::{consumed, map, map_opt, opt, peek, recognize},
    sequence::{pair, tuple},
};

use crate::{
    spans::{InputSpan, NomResult},
    Diagnostics, ErrorKind, TextSpan,
};

/// Kind of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Number literal, e.g., `1_000.5e-3`.
    Number,
    /// Identifier, e.g., `pi` or `my_var`.
    Identifier,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Mod,
    /// `^`
    Power,
    /// `!`
    Bang,
    /// `=`
    Eq,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `del` keyword.
    Del,
    /// Single whitespace char.
    Space,
    /// End of input. Always the last token and always empty.
    Eof,
    /// Unrecognized char.
    Bad,
}

impl TokenKind {
    fn from_char(ch: char) -> Option<Self> {
        Some(match ch {
            '+' => Self::Plus,
            '-' => Self::Minus,
            '*' => Self::Star,
            '/' => Self::Slash,
            '%' => Self::Mod,
            '^' => Self::Power,
            '!' => Self::Bang,
            '=' => Self::Eq,
            '(' => Self::LParen,
            ')' => Self::RParen,
            ',' => Self::Comma,
            ':' => Self::Colon,
            ' ' | '\t' | '\r' | '\n' => Self::Space,
            _ => return None,
        })
    }

    /// Returns the highlighting category for this kind of tokens.
    pub fn highlight(self) -> Highlight {
        match self {
            Self::Number => Highlight::Number,
            Self::Identifier => Highlight::Identifier,
            Self::Comma => Highlight::Comma,
            Self::LParen | Self::RParen => Highlight::Paren,
            Self::Bad => Highlight::Bad,
            Self::Del => Highlight::Del,
            _ => Highlight::Other,
        }
    }
}

/// Highlighting category of a token, used by line editors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Highlight {
    /// Number literals.
    Number,
    /// Identifiers.
    Identifier,
    /// Commas.
    Comma,
    /// Opening and closing parentheses.
    Paren,
    /// Unrecognized chars.
    Bad,
    /// `del` keyword.
    Del,
    /// Everything else: operators and whitespace.
    Other,
}

/// Lexical token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'a> {
    /// Token kind.
    pub kind: TokenKind,
    /// Span of the token in the source.
    pub span: TextSpan,
    /// Source text of the token.
    pub lexeme: &'a str,
    /// Value of a number literal. Only set for [`TokenKind::Number`] tokens.
    pub literal: Option<f64>,
}

impl<'a> Token<'a> {
    fn new(kind: TokenKind, lexeme: InputSpan<'a>) -> Self {
        Self {
            kind,
            span: TextSpan::of_fragment(&lexeme),
            lexeme: *lexeme.fragment(),
            literal: None,
        }
    }

    pub(crate) fn eof(offset: usize) -> Self {
        Self {
            kind: TokenKind::Eof,
            span: TextSpan::empty(offset),
            lexeme: "",
            literal: None,
        }
    }
}

/// Lexer for a single line of source text.
#[derive(Debug, Clone, Copy)]
pub struct Lexer<'a> {
    source: &'a str,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer for the provided source.
    pub fn new(source: &'a str) -> Self {
        Self { source }
    }

    /// Scans the entire source. Errors are added to `diagnostics`.
    pub fn lex(self, diagnostics: &mut Diagnostics) -> Vec<Token<'a>> {
        let mut tokens = Vec::new();
        let mut input = InputSpan::new(self.source);

        // `raw_token` only fails on empty input.
        while let Ok((rest, (lexeme, kind))) = raw_token(input) {
            let mut token = Token::new(kind, lexeme);
            match kind {
                TokenKind::Number => {
                    token.literal = Some(number_value(lexeme, diagnostics));
                }
                TokenKind::Bad => {
                    if let Some(ch) = token.lexeme.chars().next() {
                        diagnostics.insert(token.span, ErrorKind::UnknownChar(ch));
                    }
                }
                _ => { /* no additional processing */ }
            }
            tokens.push(token);
            input = rest;
        }

        tokens.push(Token::eof(self.source.len()));
        tracing::trace!(source = self.source, tokens = tokens.len(), "scanned line");
        tokens
    }
}

/// Scans `source` for highlighting purposes. Errors are discarded.
pub fn tokenize(source: &str) -> Vec<Token<'_>> {
    Lexer::new(source).lex(&mut Diagnostics::new())
}

fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

fn is_mantissa_char(ch: char) -> bool {
    ch.is_ascii_digit() || ch == '_' || ch == '.'
}

fn raw_token(input: InputSpan<'_>) -> NomResult<'_, (InputSpan<'_>, TokenKind)> {
    alt((
        consumed(map_opt(anychar, TokenKind::from_char)),
        map(number_literal, |lexeme| (lexeme, TokenKind::Number)),
        map(identifier, |lexeme| {
            let kind = if *lexeme.fragment() == "del" {
                TokenKind::Del
            } else {
                TokenKind::Identifier
            };
            (lexeme, kind)
        }),
        map(recognize(anychar), |lexeme| (lexeme, TokenKind::Bad)),
    ))(input)
}

/// Identifier: letters and underscores.
fn identifier(input: InputSpan<'_>) -> NomResult<'_, InputSpan<'_>> {
    take_while1(|ch: char| ch.is_alphabetic() || ch == '_')(input)
}

/// Number literal. Recognizes malformed literals as well; they are reported
/// by [`number_value()`].
fn number_literal(input: InputSpan<'_>) -> NomResult<'_, InputSpan<'_>> {
    let mantissa_start = alt((
        recognize(satisfy(is_digit)),
        recognize(pair(tag_char('.'), peek(satisfy(is_digit)))),
    ));
    let mantissa = pair(mantissa_start, take_while(is_mantissa_char));
    let exponent = tuple((
        tag_char('e'),
        take_while(|ch: char| ch == '-'),
        take_while(|ch: char| ch.is_ascii_digit() || ch == '_'),
    ));
    recognize(pair(mantissa, opt(exponent)))(input)
}

/// Computes the value of a literal recognized by [`number_literal()`].
fn number_value(lexeme: InputSpan<'_>, diagnostics: &mut Diagnostics) -> f64 {
    let offset = lexeme.location_offset();
    let mut normalized = String::with_capacity(lexeme.fragment().len() + 1);
    let mut has_dot = false;
    let mut in_exponent = false;
    let mut exponent_sign = false;
    let mut exponent_digits = false;

    for (i, ch) in lexeme.fragment().char_indices() {
        let char_span = TextSpan::new(offset + i, offset + i + ch.len_utf8());
        match ch {
            '_' => { /* digit group separator */ }
            '.' if has_dot => {
                diagnostics.insert(char_span, ErrorKind::DuplicateDecimalPoint);
            }
            '.' => {
                if normalized.is_empty() {
                    normalized.push('0');
                }
                normalized.push('.');
                has_dot = true;
            }
            'e' => {
                in_exponent = true;
            }
            '-' if exponent_sign => {
                diagnostics.insert(char_span, ErrorKind::DuplicateExponentSign);
            }
            '-' => {
                exponent_sign = true;
            }
            digit => {
                if in_exponent && !exponent_digits {
                    normalized.push_str(if exponent_sign { "e-" } else { "e" });
                    exponent_digits = true;
                }
                normalized.push(digit);
            }
        }
    }

    // `normalized` is a valid float literal by construction.
    normalized.parse().unwrap_or(f64::NAN)
}
