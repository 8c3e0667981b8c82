//! Recursive-descent parser for the utility expression language.
//!
//! Besides the usual `+ - * / ^` grammar it accepts the shorthand people type by hand:
//! implicit products (`2x`, `3(x + 1)`, `xy`), a digit glued to a variable as its exponent
//! (`x2` is `x^2`), and a bare fraction after `^` as a grouped exponent (`x^1/2` is
//! `x^(1/2)`).

use super::lexer::{Token, TokenKind, tokenize};
use super::{BinOp, Expr, Func, Var};
use crate::ExprError;

/// Longest accepted source. Every tree node consumes at least one byte, so this also bounds
/// the height of the tree that evaluation and solving recurse over.
pub(crate) const MAX_SOURCE_LEN: usize = 1024;

/// Deepest accepted nesting of parentheses, signs, exponents and call arguments.
pub(crate) const MAX_DEPTH: usize = 64;

pub(crate) fn parse(source: &str) -> Result<Expr, ExprError> {
    if source.len() > MAX_SOURCE_LEN {
        return Err(ExprError::TooLong {
            limit: MAX_SOURCE_LEN,
        });
    }

    let mut parser = Parser {
        tokens: tokenize(source)?,
        pos: 0,
        depth: 0,
    };
    let expr = parser.expr()?;
    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(parser.unexpected(token)),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + offset).map(|token| &token.kind)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn unexpected(&self, token: &Token) -> ExprError {
        ExprError::UnexpectedToken {
            pos: token.start,
            found: token.kind.describe(),
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ExprError> {
        match self.advance() {
            Some(token) if token.kind == kind => Ok(token),
            Some(token) => Err(self.unexpected(&token)),
            None => Err(ExprError::UnexpectedEnd),
        }
    }

    fn expr(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek_kind(0) {
                Some(TokenKind::Plus) => BinOp::Add,
                Some(TokenKind::Minus) => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.term()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
    }

    fn term(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.unary()?;
        loop {
            let rhs = match self.peek_kind(0) {
                Some(TokenKind::Star) => {
                    self.advance();
                    Expr::binary(BinOp::Mul, lhs, self.unary()?)
                }
                Some(TokenKind::Slash) => {
                    self.advance();
                    Expr::binary(BinOp::Div, lhs, self.unary()?)
                }
                // implicit product
                Some(TokenKind::Num(_) | TokenKind::Ident(_) | TokenKind::LParen) => {
                    Expr::binary(BinOp::Mul, lhs, self.power()?)
                }
                _ => return Ok(lhs),
            };
            lhs = rhs;
        }
    }

    /// Every recursive path of the grammar passes through here, so this is where depth is counted.
    fn unary(&mut self) -> Result<Expr, ExprError> {
        if self.depth >= MAX_DEPTH {
            return Err(ExprError::TooDeep { limit: MAX_DEPTH });
        }
        self.depth += 1;
        let result = self.signed();
        self.depth -= 1;
        result
    }

    fn signed(&mut self) -> Result<Expr, ExprError> {
        match self.peek_kind(0) {
            Some(TokenKind::Minus) => {
                self.advance();
                Ok(Expr::Neg(Box::new(self.unary()?)))
            }
            Some(TokenKind::Plus) => {
                self.advance();
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Expr, ExprError> {
        let base = self.primary()?;
        if !matches!(self.peek_kind(0), Some(TokenKind::Caret)) {
            return Ok(base);
        }
        self.advance();
        let exponent = self.exponent()?;
        Ok(Expr::binary(BinOp::Pow, base, exponent))
    }

    fn exponent(&mut self) -> Result<Expr, ExprError> {
        if let (Some(TokenKind::Num(num)), Some(TokenKind::Slash), Some(TokenKind::Num(den))) =
            (self.peek_kind(0), self.peek_kind(1), self.peek_kind(2))
        {
            let fraction = Expr::binary(BinOp::Div, Expr::Num(*num), Expr::Num(*den));
            self.pos += 3;
            return Ok(fraction);
        }
        self.unary()
    }

    fn primary(&mut self) -> Result<Expr, ExprError> {
        let token = self.advance().ok_or(ExprError::UnexpectedEnd)?;
        match &token.kind {
            TokenKind::Num(value) => Ok(Expr::Num(*value)),
            TokenKind::LParen => {
                let inner = self.expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::Ident(name) => self.identifier(name, &token),
            _ => Err(self.unexpected(&token)),
        }
    }

    fn identifier(&mut self, name: &str, token: &Token) -> Result<Expr, ExprError> {
        if name == "pow" {
            let mut args = self.arguments("pow", (2, 2))?;
            let exponent = args.pop().ok_or(ExprError::UnexpectedEnd)?;
            let base = args.pop().ok_or(ExprError::UnexpectedEnd)?;
            return Ok(Expr::binary(BinOp::Pow, base, exponent));
        }
        if let Some(func) = Func::lookup(name) {
            let args = self.arguments(func.name(), func.arity())?;
            return Ok(Expr::Call(func, args));
        }

        match name {
            "e" => return Ok(Expr::Num(core::f64::consts::E)),
            "pi" => return Ok(Expr::Num(core::f64::consts::PI)),
            _ => {}
        }

        if !name.chars().all(|c| c == 'x' || c == 'y') {
            return Err(ExprError::UnknownIdentifier {
                pos: token.start,
                name: name.to_owned(),
            });
        }

        let mut vars = name.chars().map(|c| match c {
            'x' => Expr::Var(Var::X),
            _ => Expr::Var(Var::Y),
        });
        let mut product = vars.next().ok_or(ExprError::UnexpectedEnd)?;
        for var in vars {
            product = Expr::binary(BinOp::Mul, product, var);
        }

        // `x2` is `x^2`: a number glued to the last variable is its exponent.
        if let Some(next) = self.peek() {
            if let TokenKind::Num(exponent) = next.kind {
                if next.start == token.end {
                    self.advance();
                    product = raise_last(product, exponent);
                }
            }
        }

        Ok(product)
    }

    fn arguments(
        &mut self,
        name: &'static str,
        (min, max): (usize, usize),
    ) -> Result<Vec<Expr>, ExprError> {
        self.expect(TokenKind::LParen)?;
        let mut args = vec![self.expr()?];
        while matches!(self.peek_kind(0), Some(TokenKind::Comma)) {
            self.advance();
            args.push(self.expr()?);
        }
        self.expect(TokenKind::RParen)?;

        if args.len() < min || args.len() > max {
            return Err(ExprError::Arity {
                name,
                expected: match (min, max) {
                    (1, 1) => "1",
                    (2, 2) => "2",
                    _ => "1 or 2",
                },
                found: args.len(),
            });
        }
        Ok(args)
    }
}

fn raise_last(product: Expr, exponent: f64) -> Expr {
    match product {
        Expr::Binary(BinOp::Mul, lhs, rhs) => {
            Expr::binary(BinOp::Mul, *lhs, raise_last(*rhs, exponent))
        }
        var => Expr::binary(BinOp::Pow, var, Expr::Num(exponent)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn same(lhs: &str, rhs: &str) {
        assert_eq!(parse(lhs).unwrap(), parse(rhs).unwrap(), "{lhs} vs {rhs}");
    }

    #[test]
    fn precedence_and_associativity() {
        same("1 + 2 * x ^ 2", "1 + (2 * (x ^ 2))");
        same("x - y - 1", "(x - y) - 1");
        same("2 ^ 3 ^ x", "2 ^ (3 ^ x)");
        same("-x^2", "-(x^2)");
        same("x^-1", "x^(-1)");
    }

    #[test]
    fn implicit_multiplication() {
        same("2x", "2*x");
        same("3(x + 1)", "3*(x + 1)");
        same("(x)(y)", "x*y");
        same("2 ln(x) y", "2*ln(x)*y");
        same("xy", "x*y");
    }

    #[test]
    fn implicit_exponents() {
        same("x2", "x^2");
        same("3x2y", "3*x^2*y");
        same("xy2", "x*y^2");
        same("x^1/2 * y^1/2", "x^(1/2) * y^(1/2)");
        same("x", "x");
        same("x 2", "x*2");
    }

    #[test]
    fn functions_and_constants() {
        same("pow(x, 2)", "x^2");
        assert_eq!(parse("ln(e)").unwrap().eval(0.0, 0.0), 1.0);
        assert!(matches!(parse("log(x, 10)").unwrap(), Expr::Call(Func::Log, args) if args.len() == 2));
    }

    #[test]
    fn reports_errors() {
        assert_eq!(parse("x +"), Err(ExprError::UnexpectedEnd));
        assert_eq!(
            parse("foo(x)"),
            Err(ExprError::UnknownIdentifier {
                pos: 0,
                name: "foo".into()
            })
        );
        assert_eq!(
            parse("sqrt(x, y)"),
            Err(ExprError::Arity {
                name: "sqrt",
                expected: "1",
                found: 2
            })
        );
        assert!(matches!(parse("(x"), Err(ExprError::UnexpectedEnd)));
        assert!(matches!(parse("x)"), Err(ExprError::UnexpectedToken { pos: 1, .. })));
        assert!(parse("").is_err());
    }

    #[test]
    fn rejects_runaway_nesting() {
        let limit = Err(ExprError::TooDeep { limit: MAX_DEPTH });
        let nested = |depth: usize| format!("{}x{}", "(".repeat(depth), ")".repeat(depth));

        assert!(parse(&nested(MAX_DEPTH - 2)).is_ok());
        assert_eq!(parse(&nested(MAX_DEPTH)), limit);
        assert_eq!(parse(&format!("{}x", "-".repeat(200))), limit);
        assert_eq!(parse(&format!("2{}", "^2".repeat(200))), limit);
    }

    #[test]
    fn rejects_oversized_input() {
        let limit = Err(ExprError::TooLong {
            limit: MAX_SOURCE_LEN,
        });

        assert_eq!(parse(&"(".repeat(10_000)), limit);
        assert_eq!(parse(&format!("{}x", "-".repeat(10_000))), limit);
        assert_eq!(parse(&"x".repeat(10_000)), limit);
        assert_eq!(parse(&vec!["x"; 5_000].join("+")), limit);
    }
}
