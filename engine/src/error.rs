//! Error handling.

use std::{collections::BTreeMap, fmt};

use crate::TextSpan;

/// Kind of a scanning or parsing error.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// No token starts with this character.
    UnknownChar(char),
    /// Number literal contains more than one decimal point.
    DuplicateDecimalPoint,
    /// Exponent of a number literal contains more than one `-` sign.
    DuplicateExponentSign,

    /// Token cannot start an expression.
    InvalidExpression,
    /// Missing closing parenthesis.
    ExpectedClosingParen,
    /// Tokens remaining after a complete expression.
    Leftovers,
    /// `del` is not followed by a name.
    ExpectedName,
    /// Name is neither a builtin, nor a variable, nor a user function.
    UnknownName(String),
    /// Called name is not a function.
    UnknownFunction(String),
    /// Function is used without being called.
    UncalledFunction(String),
    /// Name is already bound, or is reserved by a builtin.
    AlreadyExists(String),
    /// Factorial applied to a value that is not a natural number.
    NonNaturalFactorial,
    /// Attempt to delete a builtin constant.
    DeleteConstant,
    /// Attempt to delete a builtin or user function.
    DeleteFunction,
    /// Left-hand side of an assignment is not a name.
    AssignmentTarget,
    /// Left-hand side of a function definition is not a name.
    DefinitionTarget,
    /// Assignment inside a function body.
    AssignmentInFunction,
    /// Function definition inside a function body.
    DefinitionInFunction,
    /// `del` anywhere but at the start of a line.
    MisplacedDel,
    /// Expression is nested deeper than the parser allows.
    TooDeep,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownChar(ch) => write!(formatter, "Unknown character: '{ch}'."),
            Self::DuplicateDecimalPoint => {
                formatter.write_str("invalid number literal with multiple decimal points")
            }
            Self::DuplicateExponentSign => {
                formatter.write_str("invalid number literal with multiple negatives")
            }

            Self::InvalidExpression => formatter.write_str("invalid expression"),
            Self::ExpectedClosingParen => formatter.write_str("expected ')'"),
            Self::Leftovers => formatter.write_str("unexpected input after the expression"),
            Self::ExpectedName => formatter.write_str("expected a name"),
            Self::UnknownName(name) => write!(formatter, "could not find `{name}`"),
            Self::UnknownFunction(name) => write!(formatter, "could not find function `{name}`"),
            Self::UncalledFunction(name) => {
                write!(formatter, "`{name}` is a function; you must call it")
            }
            Self::AlreadyExists(name) => write!(formatter, "`{name}` already exists"),
            Self::NonNaturalFactorial => {
                formatter.write_str("factorial only applies to natural numbers")
            }
            Self::DeleteConstant => formatter.write_str("cannot delete a constant"),
            Self::DeleteFunction => formatter.write_str("cannot delete a function"),
            Self::AssignmentTarget => formatter.write_str("variables need a name"),
            Self::DefinitionTarget => formatter.write_str("functions need a name"),
            Self::AssignmentInFunction => {
                formatter.write_str("variables cannot be assigned in a function body")
            }
            Self::DefinitionInFunction => {
                formatter.write_str("functions cannot be defined in a function body")
            }
            Self::MisplacedDel => {
                formatter.write_str("`del` is only allowed at the start of a line")
            }
            Self::TooDeep => formatter.write_str("expression is nested too deeply"),
        }
    }
}

impl ErrorKind {
    /// Returns `true` if this error is raised by the lexer rather than the parser.
    pub fn is_lex_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownChar(_) | Self::DuplicateDecimalPoint | Self::DuplicateExponentSign
        )
    }

    pub(crate) fn with_span(self, span: TextSpan) -> SpannedError {
        SpannedError { span, kind: self }
    }
}

impl std::error::Error for ErrorKind {}

/// Error with the associated code span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedError {
    span: TextSpan,
    kind: ErrorKind,
}

impl SpannedError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns the span of this error.
    pub fn span(&self) -> TextSpan {
        self.span
    }
}

impl fmt::Display for SpannedError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}: {}", self.span, self.kind)
    }
}

impl std::error::Error for SpannedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

/// Span-keyed collection of errors shared by the lexer and the parser for a single line.
///
/// Errors are ordered by their span. An error for a span that is already present
/// does not overwrite the existing one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    errors: BTreeMap<TextSpan, ErrorKind>,
}

impl Diagnostics {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an error. Returns `false` if there already is an error with the same span.
    pub fn insert(&mut self, span: TextSpan, kind: ErrorKind) -> bool {
        if self.errors.contains_key(&span) {
            return false;
        }
        tracing::trace!(%span, %kind, "recorded diagnostic");
        self.errors.insert(span, kind);
        true
    }

    /// Checks whether there are no errors.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Gets the error recorded for exactly the specified span.
    pub fn get(&self, span: TextSpan) -> Option<&ErrorKind> {
        self.errors.get(&span)
    }

    /// Iterates over errors ordered by their span.
    pub fn iter(&self) -> impl Iterator<Item = (TextSpan, &ErrorKind)> + '_ {
        self.errors.iter().map(|(&span, kind)| (span, kind))
    }

    /// Converts this collection into a list of spanned errors.
    pub fn into_errors(self) -> Vec<SpannedError> {
        self.errors
            .into_iter()
            .map(|(span, kind)| kind.with_span(span))
            .collect()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (span, kind)) in self.iter().enumerate() {
            if i > 0 {
                formatter.write_str("; ")?;
            }
            write!(formatter, "{span}: {kind}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostics {}
