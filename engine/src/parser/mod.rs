//! Precedence-climbing parser.
//!
//! The parser consumes the tokens of a single line and produces an [`Expr`]. Unlike a pure
//! parser, it reads and writes the [`Environment`]: names are resolved against it right away,
//! and assignments, function definitions and deletions are applied as soon as they
//! are recognized.
//!
//! # Grammar
//!
//! Binary operations have the following precedence (higher binds tighter):
//!
//! | Operations | Precedence |
//! |------------|------------|
//! | `^`        | 3          |
//! | `*` `/` `%`| 2          |
//! | `+` `-`    | 1          |
//!
//! All binary operations are left-associative, including `^`; that is, `2^3^2` is parsed
//! as `(2^3)^2`. Unary `-` only applies to the immediately following primary expression
//! and its postfix continuations, so `-2^2` is `(-2)^2`.
//!
//! # Errors
//!
//! The first error aborts parsing of the line, and the line is parsed as [`Expr::Error`].
//! Expressions nested deeper than [`MAX_NESTING`] levels are rejected.
//! Environment changes made by the line before the error are kept. For example, after
//! `y = 1 + (z = 2) + w` with an undefined `w`, `z` stays declared while `y` does not.

use std::rc::Rc;

use crate::{
    ast::Callee,
    env::Binding,
    lexer::{Token, TokenKind},
    ops::binary_precedence,
    spans::Spanned,
    BinaryOp, Diagnostics, Environment, ErrorKind, Expr, OpPriority, TextSpan, UnaryOp,
};


/// Name of the parameter in user function bodies.
pub const FN_PARAMETER: &str = "x";

/// Maximum depth of a parsed expression tree.
pub const MAX_NESTING: usize = 128;

/// Signals that an error has been recorded and the line must be abandoned.
#[derive(Debug)]
struct Abort;

type ParseResult<T> = Result<T, Abort>;

/// Expression together with the depth of its tree.
#[derive(Debug)]
struct Node {
    expr: Expr,
    depth: usize,
}

impl Node {
    fn leaf(expr: Expr) -> Self {
        Self { expr, depth: 1 }
    }
}

/// Parser for a single line.
#[derive(Debug)]
pub struct Parser<'t, 'e> {
    tokens: Vec<Token<'t>>,
    position: usize,
    env: &'e mut Environment,
    diagnostics: &'e mut Diagnostics,
    in_fn_body: bool,
    nesting: usize,
}

impl<'t, 'e> Parser<'t, 'e> {
    /// Creates a parser. Whitespace tokens are skipped; errors are added to `diagnostics`.
    pub fn new(
        tokens: impl IntoIterator<Item = Token<'t>>,
        env: &'e mut Environment,
        diagnostics: &'e mut Diagnostics,
    ) -> Self {
        let mut tokens: Vec<_> = tokens
            .into_iter()
            .filter(|token| token.kind != TokenKind::Space)
            .collect();
        if tokens.last().map_or(true, |token| token.kind != TokenKind::Eof) {
            let end = tokens.last().map_or(0, |token| token.span.end);
            tokens.push(Token::eof(end));
        }

        Self {
            tokens,
            position: 0,
            env,
            diagnostics,
            in_fn_body: false,
            nesting: 0,
        }
    }

    /// Parses the line. Returns [`Expr::Error`] if parsing fails.
    pub fn parse_top_level(mut self) -> Expr {
        match self.top_level() {
            Ok(expr) => expr,
            Err(Abort) => {
                tracing::trace!(position = self.position, "aborted parsing line");
                Expr::Error
            }
        }
    }

    fn top_level(&mut self) -> ParseResult<Expr> {
        let expr = if self.peek().kind == TokenKind::Del {
            let del = self.advance();
            self.get_del(del)?
        } else {
            self.parse_expr(0)?
        };

        let next = self.peek();
        if next.kind != TokenKind::Eof {
            return self.error(next.span, ErrorKind::Leftovers);
        }
        Ok(expr.extra.expr)
    }

    fn peek(&self) -> Token<'t> {
        self.tokens[self.position]
    }

    fn advance(&mut self) -> Token<'t> {
        let token = self.tokens[self.position];
        if token.kind != TokenKind::Eof {
            self.position += 1;
        }
        token
    }

    fn error<T>(&mut self, span: TextSpan, kind: ErrorKind) -> ParseResult<T> {
        self.diagnostics.insert(span, kind);
        Err(Abort)
    }

    /// Applies a change to the environment. Changes are only applied to lines
    /// without errors so far.
    fn commit(
        &mut self,
        span: TextSpan,
        change: impl FnOnce(&mut Environment) -> Result<(), ErrorKind>,
    ) -> ParseResult<()> {
        if !self.diagnostics.is_empty() {
            return Err(Abort);
        }
        match change(&mut *self.env) {
            Ok(()) => Ok(()),
            Err(kind) => self.error(span, kind),
        }
    }

    /// Wraps an expression built on top of subexpressions with the specified maximum depth.
    fn nest(
        &mut self,
        span: TextSpan,
        expr: Expr,
        inner_depth: usize,
    ) -> ParseResult<Spanned<Node>> {
        let depth = inner_depth + 1;
        if depth > MAX_NESTING {
            return self.error(span, ErrorKind::TooDeep);
        }
        Ok(Spanned::new(span, Node { expr, depth }))
    }

    /// Parses a primary expression and its continuations with operations binding tighter
    /// than `floor`.
    fn parse_expr(&mut self, floor: u8) -> ParseResult<Spanned<Node>> {
        if self.nesting >= MAX_NESTING {
            let span = self.peek().span;
            return self.error(span, ErrorKind::TooDeep);
        }
        self.nesting += 1;
        let expr = self.parse_operand(floor);
        self.nesting -= 1;
        expr
    }

    fn parse_operand(&mut self, floor: u8) -> ParseResult<Spanned<Node>> {
        let token = self.advance();
        let primary = match token.kind {
            TokenKind::Number => {
                let value = token.literal.unwrap_or_default();
                Spanned::new(token.span, Node::leaf(Expr::Literal(value)))
            }
            TokenKind::Identifier => self.get_name(token)?,
            TokenKind::Minus => {
                let operand = self.parse_expr(OpPriority::NEGATION_FLOOR)?;
                let span = token.span.cover(operand.span);
                let neg = Expr::unary(UnaryOp::Neg, operand.extra.expr);
                self.nest(span, neg, operand.extra.depth)?
            }
            TokenKind::LParen => self.get_grouping(token)?,
            TokenKind::Del => return self.error(token.span, ErrorKind::MisplacedDel),
            _ => return self.error(token.span, ErrorKind::InvalidExpression),
        };
        self.check_extension(primary, floor)
    }

    /// Folds binary operations, calls, implicit multiplication, factorials, assignments
    /// and definitions following `left`.
    fn check_extension(
        &mut self,
        mut left: Spanned<Node>,
        floor: u8,
    ) -> ParseResult<Spanned<Node>> {
        loop {
            let next = self.peek();
            left = match next.kind {
                kind if binary_precedence(kind) > 0 => return self.binary_chain(left, floor),
                TokenKind::LParen => self.call_or_product(left)?,
                TokenKind::Bang => self.factorial(left)?,
                TokenKind::Eq => self.assignment(left)?,
                TokenKind::Colon => self.definition(left)?,
                _ => return Ok(left),
            };
        }
    }

    fn binary_chain(&mut self, mut left: Spanned<Node>, floor: u8) -> ParseResult<Spanned<Node>> {
        while let Some(op) = BinaryOp::from_token(self.peek().kind) {
            let precedence = op.priority().precedence();
            if precedence <= floor {
                break;
            }
            self.advance();

            let rhs = self.parse_expr(precedence)?;
            let span = left.span.cover(rhs.span);
            let depth = left.extra.depth.max(rhs.extra.depth);
            let binary = Expr::binary(left.extra.expr, op, rhs.extra.expr);
            let binary = self.nest(span, binary, depth)?;
            left = self.check_extension(binary, precedence)?;
        }
        Ok(left)
    }

    /// Parses `(` .. `)` after the opening paren has been consumed.
    fn get_grouping(&mut self, open: Token<'t>) -> ParseResult<Spanned<Node>> {
        let inner = self.parse_expr(0)?;
        let close = self.expect_closing_paren()?;
        let span = open.span.cover(close.span);
        let grouping = Expr::Grouping(Box::new(inner.extra.expr));
        self.nest(span, grouping, inner.extra.depth)
    }

    fn expect_closing_paren(&mut self) -> ParseResult<Token<'t>> {
        let next = self.peek();
        if next.kind == TokenKind::RParen {
            Ok(self.advance())
        } else {
            self.error(next.span, ErrorKind::ExpectedClosingParen)
        }
    }

    /// A name followed by `(` is a call; anything else followed by `(` is multiplied
    /// by the parenthesized expression.
    fn call_or_product(&mut self, left: Spanned<Node>) -> ParseResult<Spanned<Node>> {
        let open = self.advance();
        let name = match left.extra.expr {
            Expr::Name(name) => name,
            lhs => {
                let group = self.get_grouping(open)?;
                let span = left.span.cover(group.span);
                let depth = left.extra.depth.max(group.extra.depth);
                let product = Expr::binary(lhs, BinaryOp::Mul, group.extra.expr);
                return self.nest(span, product, depth);
            }
        };

        let callee = match self.env.lookup(&name) {
            Some(Binding::Builtin(function)) => Callee::Builtin(function),
            Some(Binding::Function(body)) => Callee::User(body),
            _ => return self.error(left.span, ErrorKind::UnknownFunction(name)),
        };
        let arg = self.parse_expr(0)?;
        let close = self.expect_closing_paren()?;

        let span = left.span.cover(close.span);
        let call = Expr::Call {
            name,
            callee,
            arg: Box::new(arg.extra.expr),
        };
        self.nest(span, call, arg.extra.depth)
    }

    /// The operand is evaluated right away to check that it is a natural number.
    fn factorial(&mut self, left: Spanned<Node>) -> ParseResult<Spanned<Node>> {
        let bang = self.advance();
        let value = left.extra.expr.evaluate();
        if value != value.round() || value < 0.0 {
            return self.error(bang.span, ErrorKind::NonNaturalFactorial);
        }
        let span = left.span.cover(bang.span);
        let factorial = Expr::unary(UnaryOp::Factorial, left.extra.expr);
        self.nest(span, factorial, left.extra.depth)
    }

    fn assignment(&mut self, left: Spanned<Node>) -> ParseResult<Spanned<Node>> {
        let eq = self.peek();
        if self.in_fn_body {
            return self.error(eq.span, ErrorKind::AssignmentInFunction);
        }
        let Expr::Name(name) = left.extra.expr else {
            return self.error(eq.span, ErrorKind::AssignmentTarget);
        };
        if self.env.contains(&name) {
            return self.error(left.span, ErrorKind::AlreadyExists(name));
        }
        self.advance();

        let value = self.parse_expr(0)?;
        let evaluated = value.extra.expr.evaluate();
        self.commit(left.span, |env| env.declare_variable(&name, evaluated))?;

        let span = left.span.cover(value.span);
        let decl = Expr::VarDecl {
            name,
            value: Box::new(value.extra.expr),
        };
        self.nest(span, decl, value.extra.depth)
    }

    fn definition(&mut self, left: Spanned<Node>) -> ParseResult<Spanned<Node>> {
        let colon = self.peek();
        if self.in_fn_body {
            return self.error(colon.span, ErrorKind::DefinitionInFunction);
        }
        let Expr::Name(name) = left.extra.expr else {
            return self.error(colon.span, ErrorKind::DefinitionTarget);
        };
        if self.env.contains(&name) {
            return self.error(left.span, ErrorKind::AlreadyExists(name));
        }
        self.advance();

        self.in_fn_body = true;
        let body = self.parse_expr(0);
        self.in_fn_body = false;
        let body = body?;

        let span = left.span.cover(body.span);
        let depth = body.extra.depth;
        let body = Rc::new(body.extra.expr);
        self.commit(left.span, |env| env.define_function(&name, Rc::clone(&body)))?;
        self.nest(span, Expr::FnDecl { name, body }, depth)
    }

    /// Resolves an identifier. Variables and constants are substituted with their current
    /// values; names that are called or assigned stay as [`Expr::Name`]s.
    fn get_name(&mut self, token: Token<'t>) -> ParseResult<Spanned<Node>> {
        let name = token.lexeme;
        let next = self.peek().kind;
        let as_name = || Spanned::new(token.span, Node::leaf(Expr::Name(name.to_owned())));

        if matches!(next, TokenKind::Eq | TokenKind::Colon) {
            return Ok(as_name());
        }
        if self.in_fn_body && name == FN_PARAMETER {
            return Ok(as_name());
        }

        let Some(binding) = self.env.lookup(name) else {
            return self.error(token.span, ErrorKind::UnknownName(name.to_owned()));
        };
        if next == TokenKind::LParen {
            return Ok(as_name());
        }
        match binding {
            Binding::Constant(value) | Binding::Variable(value) => {
                Ok(Spanned::new(token.span, Node::leaf(Expr::Literal(value))))
            }
            Binding::Builtin(_) | Binding::Function(_) => {
                self.error(token.span, ErrorKind::UncalledFunction(name.to_owned()))
            }
        }
    }

    /// Parses the target of `del` after the keyword has been consumed.
    fn get_del(&mut self, del: Token<'t>) -> ParseResult<Spanned<Node>> {
        let target = self.advance();
        if target.kind != TokenKind::Identifier {
            return self.error(target.span, ErrorKind::ExpectedName);
        }

        let name = target.lexeme;
        self.commit(target.span, |env| env.remove_variable(name).map(drop))?;
        let span = del.span.cover(target.span);
        Ok(Spanned::new(span, Node::leaf(Expr::Del(name.to_owned()))))
    }
}
