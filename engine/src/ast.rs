//! Expression tree produced by the parser, together with its evaluation.

use std::{fmt, rc::Rc};

use crate::{env::BuiltinFn, BinaryOp, UnaryOp};

/// Resolved target of a function call.
#[derive(Debug, Clone, PartialEq)]
pub enum Callee {
    /// Builtin math function.
    Builtin(BuiltinFn),
    /// Body of a user-defined function, parameterized by the free variable `x`.
    User(Rc<Expr>),
}

/// Expression tree for a single line.
///
/// All environment lookups are resolved while parsing: variables and constants are
/// substituted as [`Literal`](Self::Literal)s, and calls carry their [`Callee`]. Hence,
/// evaluating an expression never needs the environment.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Number, e.g., `1.5`, or a substituted variable / constant.
    Literal(f64),

    /// Unary operation, e.g., `-x` or `3!`.
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        operand: Box<Expr>,
    },

    /// Binary operation, e.g., `x + 1`.
    Binary {
        /// LHS of the operation.
        lhs: Box<Expr>,
        /// Operator.
        op: BinaryOp,
        /// RHS of the operation.
        rhs: Box<Expr>,
    },

    /// Parenthesized expression. Only retained for printing.
    Grouping(Box<Expr>),

    /// Name that is not substituted while parsing. Within a function body, this is
    /// the function parameter.
    Name(String),

    /// Function call, e.g., `sin(90)`.
    Call {
        /// Name of the called function.
        name: String,
        /// Resolved function.
        callee: Callee,
        /// Function argument.
        arg: Box<Expr>,
    },

    /// Variable assignment, e.g., `y = 3`.
    VarDecl {
        /// Variable name.
        name: String,
        /// Assigned value.
        value: Box<Expr>,
    },

    /// Function definition, e.g., `f: x^2 + 1`.
    FnDecl {
        /// Function name.
        name: String,
        /// Function body.
        body: Rc<Expr>,
    },

    /// Variable deletion, e.g., `del y`.
    Del(String),

    /// Placeholder for an expression that failed to parse.
    Error,
}

impl Expr {
    /// Evaluates this expression with the free variable bound to 0.
    pub fn evaluate(&self) -> f64 {
        self.evaluate_with(0.0)
    }

    /// Evaluates this expression with the free variable bound to `x`.
    pub fn evaluate_with(&self, x: f64) -> f64 {
        match self {
            Self::Literal(value) => *value,
            Self::Unary { op, operand } => op.apply(operand.evaluate_with(x)),
            Self::Binary { lhs, op, rhs } => op.apply(lhs.evaluate_with(x), rhs.evaluate_with(x)),
            Self::Grouping(inner) => inner.evaluate_with(x),
            Self::Name(_) => x,
            Self::Call { callee, arg, .. } => {
                let arg = arg.evaluate_with(x);
                match callee {
                    Callee::Builtin(function) => function.call(arg),
                    Callee::User(body) => body.evaluate_with(arg),
                }
            }
            Self::VarDecl { value, .. } => value.evaluate_with(x),
            Self::FnDecl { body, .. } => body.evaluate_with(x),
            Self::Del(_) | Self::Error => 0.0,
        }
    }

    /// Checks whether this is an [`Error`](Self::Error) placeholder.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    pub(crate) fn unary(op: UnaryOp, operand: Self) -> Self {
        Self::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub(crate) fn binary(lhs: Self, op: BinaryOp, rhs: Self) -> Self {
        Self::Binary {
            lhs: Box::new(lhs),
            op,
            rhs: Box::new(rhs),
        }
    }
}

/// Outputs the expression in the source form, with a single space around binary operators.
impl fmt::Display for Expr {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => write!(formatter, "{value}"),
            Self::Unary { op, operand } => match op {
                UnaryOp::Neg => write!(formatter, "{op}{operand}", op = op.as_str()),
                UnaryOp::Factorial => write!(formatter, "{operand}{op}", op = op.as_str()),
            },
            Self::Binary { lhs, op, rhs } => {
                write!(formatter, "{lhs} {op} {rhs}", op = op.as_str())
            }
            Self::Grouping(inner) => write!(formatter, "({inner})"),
            Self::Name(name) => formatter.write_str(name),
            Self::Call { name, arg, .. } => write!(formatter, "{name}({arg})"),
            Self::VarDecl { name, value } => write!(formatter, "{name} = {value}"),
            Self::FnDecl { name, body } => write!(formatter, "{name}: {body}"),
            Self::Del(name) => write!(formatter, "del {name}"),
            Self::Error => formatter.write_str("<error>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::BUILTINS;

    fn lit(value: f64) -> Box<Expr> {
        Box::new(Expr::Literal(value))
    }

    #[test]
    fn evaluating_arithmetic() {
        // (2 + 3) * 4
        let expr = Expr::binary(
            Expr::Grouping(Box::new(Expr::binary(
                Expr::Literal(2.0),
                BinaryOp::Add,
                Expr::Literal(3.0),
            ))),
            BinaryOp::Mul,
            Expr::Literal(4.0),
        );
        assert_eq!(expr.evaluate(), 20.0);
        assert_eq!(expr.to_string(), "(2 + 3) * 4");
    }

    #[test]
    fn evaluating_free_variable() {
        // x ^ 2 + 1
        let body = Expr::binary(
            Expr::binary(Expr::Name("x".into()), BinaryOp::Power, Expr::Literal(2.0)),
            BinaryOp::Add,
            Expr::Literal(1.0),
        );
        assert_eq!(body.evaluate(), 1.0);
        assert_eq!(body.evaluate_with(3.0), 10.0);

        let call = Expr::Call {
            name: "f".into(),
            callee: Callee::User(Rc::new(body)),
            arg: lit(3.0),
        };
        assert_eq!(call.evaluate(), 10.0);
        assert_eq!(call.to_string(), "f(3)");
    }

    #[test]
    fn evaluating_builtin_call() {
        let sqrt = BUILTINS.function("sqrt").unwrap();
        let call = Expr::Call {
            name: "sqrt".into(),
            callee: Callee::Builtin(sqrt),
            arg: lit(16.0),
        };
        assert_eq!(call.evaluate(), 4.0);
    }

    #[test]
    fn evaluating_unary_ops() {
        let expr = Expr::unary(UnaryOp::Neg, Expr::unary(UnaryOp::Factorial, Expr::Literal(3.0)));
        assert_eq!(expr.evaluate(), -6.0);
        assert_eq!(expr.to_string(), "-3!");
    }

    #[test]
    fn declarations_evaluate_to_their_value() {
        let decl = Expr::VarDecl {
            name: "y".into(),
            value: lit(3.0),
        };
        assert_eq!(decl.evaluate(), 3.0);
        assert_eq!(decl.to_string(), "y = 3");

        let def = Expr::FnDecl {
            name: "g".into(),
            body: Rc::new(Expr::binary(
                Expr::Name("x".into()),
                BinaryOp::Add,
                Expr::Literal(1.0),
            )),
        };
        assert_eq!(def.evaluate(), 1.0);
        assert_eq!(def.to_string(), "g: x + 1");

        assert_eq!(Expr::Del("y".into()).evaluate(), 0.0);
        assert_eq!(Expr::Del("y".into()).to_string(), "del y");
        assert_eq!(Expr::Error.evaluate(), 0.0);
        assert!(Expr::Error.is_error());
    }

    #[test]
    fn ieee_special_values_propagate() {
        let expr = Expr::binary(Expr::Literal(1.0), BinaryOp::Div, Expr::Literal(0.0));
        assert_eq!(expr.evaluate(), f64::INFINITY);
        let expr = Expr::binary(Expr::Literal(0.0), BinaryOp::Div, Expr::Literal(0.0));
        assert!(expr.evaluate().is_nan());
    }
}
