//! Types related to spanning scanned code.

use core::{fmt, ops::Range};

/// Code span used by the lexer combinators.
pub(crate) type InputSpan<'a> = nom_locate::LocatedSpan<&'a str>;
/// Scanning outcome generalized by the type returned on success.
pub(crate) type NomResult<'a, T> = nom::IResult<InputSpan<'a>, T>;

/// Half-open range `[start, end)` of byte offsets into a single input line.
///
/// Spans are only used to place diagnostics; two spans are considered equal only if they
/// cover exactly the same range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextSpan {
    /// Offset of the first byte in the span.
    pub start: usize,
    /// Offset one past the last byte in the span.
    pub end: usize,
}

impl TextSpan {
    /// Creates a span. `end` must not be less than `start`.
    pub const fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// Creates an empty span at the specified offset.
    pub const fn empty(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    /// Returns the length of this span in bytes.
    pub const fn len(self) -> usize {
        self.end - self.start
    }

    /// Checks whether this span is empty.
    pub const fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Returns this span as a range, e.g., for slicing the source or reporting.
    pub const fn range(self) -> Range<usize> {
        self.start..self.end
    }

    /// Returns the smallest span containing both this and `other` span.
    #[must_use]
    pub fn cover(self, other: Self) -> Self {
        Self::new(self.start.min(other.start), self.end.max(other.end))
    }

    pub(crate) fn of_fragment(span: &InputSpan<'_>) -> Self {
        let start = span.location_offset();
        Self::new(start, start + span.fragment().len())
    }
}

impl From<Range<usize>> for TextSpan {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl fmt::Display for TextSpan {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}..{}", self.start, self.end)
    }
}

/// Value together with the span of code it was produced from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spanned<T> {
    /// Code span.
    pub span: TextSpan,
    /// Spanned value.
    pub extra: T,
}

impl<T> Spanned<T> {
    /// Creates a new spanned value.
    pub const fn new(span: TextSpan, extra: T) -> Self {
        Self { span, extra }
    }
}
