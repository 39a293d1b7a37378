//! Operation-related types.

use crate::TokenKind;

/// Priority of a binary operation. Operations with a higher priority bind tighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OpPriority {
    /// Addition or subtraction: `+` or `-`.
    AddOrSub = 1,
    /// Multiplication, division or remainder: `*`, `/` or `%`.
    MulDivMod = 2,
    /// Power (`^`).
    Power = 3,
}

impl OpPriority {
    /// Precedence floor used to parse the operand of unary `-`. It is greater than
    /// the priority of any binary operation.
    pub const NEGATION_FLOOR: u8 = 4;

    /// Returns the numeric precedence used in precedence climbing.
    pub const fn precedence(self) -> u8 {
        self as u8
    }
}

/// Unary operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Negation (prefix `-`).
    Neg,
    /// Factorial (postfix `!`).
    Factorial,
}

impl UnaryOp {
    /// Returns the string representation of this operation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Factorial => "!",
        }
    }

    /// Applies this operation to a value.
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Self::Neg => -value,
            Self::Factorial => factorial(value),
        }
    }
}

/// Largest argument for which the factorial is finite in `f64`.
const MAX_FINITE_FACTORIAL: f64 = 170.0;

fn factorial(value: f64) -> f64 {
    let n = value.floor();
    if n > MAX_FINITE_FACTORIAL {
        return f64::INFINITY;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n = n.max(0.0) as u32;
    (1..=n).map(f64::from).product()
}

/// Binary arithmetic operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// Addition (`+`).
    Add,
    /// Subtraction (`-`).
    Sub,
    /// Multiplication (`*`).
    Mul,
    /// Division (`/`).
    Div,
    /// Remainder (`%`).
    Mod,
    /// Power (`^`).
    Power,
}

impl BinaryOp {
    /// Converts a token kind into a binary operation, if the token denotes one.
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Plus => Self::Add,
            TokenKind::Minus => Self::Sub,
            TokenKind::Star => Self::Mul,
            TokenKind::Slash => Self::Div,
            TokenKind::Mod => Self::Mod,
            TokenKind::Power => Self::Power,
            _ => return None,
        })
    }

    /// Returns the string representation of this operation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Power => "^",
        }
    }

    /// Returns the priority of this operation.
    pub fn priority(self) -> OpPriority {
        match self {
            Self::Add | Self::Sub => OpPriority::AddOrSub,
            Self::Mul | Self::Div | Self::Mod => OpPriority::MulDivMod,
            Self::Power => OpPriority::Power,
        }
    }

    /// Applies this operation. Division and remainder by zero follow IEEE 754 semantics.
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Self::Add => lhs + rhs,
            Self::Sub => lhs - rhs,
            Self::Mul => lhs * rhs,
            Self::Div => lhs / rhs,
            Self::Mod => lhs % rhs,
            Self::Power => lhs.powf(rhs),
        }
    }
}

/// Returns the precedence of a token in binary position, or 0 if the token
/// is not a binary operator.
pub(crate) fn binary_precedence(kind: TokenKind) -> u8 {
    BinaryOp::from_token(kind).map_or(0, |op| op.priority().precedence())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priorities_are_ordered() {
        assert!(OpPriority::AddOrSub < OpPriority::MulDivMod);
        assert!(OpPriority::MulDivMod < OpPriority::Power);
        assert!(OpPriority::Power.precedence() < OpPriority::NEGATION_FLOOR);
        assert_eq!(binary_precedence(TokenKind::Mod), 2);
        assert_eq!(binary_precedence(TokenKind::Bang), 0);
    }

    #[test]
    fn factorials() {
        assert_eq!(UnaryOp::Factorial.apply(0.0), 1.0);
        assert_eq!(UnaryOp::Factorial.apply(5.0), 120.0);
        assert!(UnaryOp::Factorial.apply(170.0).is_finite());
        assert_eq!(UnaryOp::Factorial.apply(1e12), f64::INFINITY);
    }

    #[test]
    fn division_by_zero_is_not_an_error() {
        assert_eq!(BinaryOp::Div.apply(1.0, 0.0), f64::INFINITY);
        assert_eq!(BinaryOp::Div.apply(-1.0, 0.0), f64::NEG_INFINITY);
        assert!(BinaryOp::Mod.apply(1.0, 0.0).is_nan());
    }
}
