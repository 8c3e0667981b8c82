//! Closed-form solving of `U(x, y) = level` for `y` at a fixed `x`.

use smallvec::{SmallVec, smallvec};

use super::expr::{BinOp, Expr, Func, Var};
use crate::SolveError;

/// Real roots in ascending order.
pub type Roots = SmallVec<[f64; 2]>;

const MAX_DEGREE: usize = 2;
const EPSILON: f64 = 1e-12;

/// Solves `expr(x, y) = level` for `y`.
///
/// Polynomials in `y` up to degree two are solved directly; otherwise a single occurrence of
/// `y` is isolated by inverting the operations around it. Anything else is `NotAlgebraic`.
pub fn solve_for_y(expr: &Expr, x: f64, level: f64) -> Result<Roots, SolveError> {
    let bound = expr.bind_x(x);
    if !bound.constants_finite() {
        return Err(SolveError::Undefined);
    }
    if !bound.contains(Var::Y) {
        return Err(SolveError::Degenerate);
    }

    let mut roots = if let Some(poly) = Poly::from_expr(&bound) {
        poly.solve(level)?
    } else if bound.occurrences(Var::Y) == 1 {
        isolate(&bound, level)?
    } else {
        return Err(SolveError::NotAlgebraic);
    };

    roots.retain(|root| root.is_finite());
    roots.sort_by(f64::total_cmp);
    roots.dedup_by(|a, b| (*a - *b).abs() <= EPSILON * a.abs().max(1.0));
    Ok(roots)
}

/// Coefficients of a polynomial in `y`, constant term first.
#[derive(Clone, Debug, PartialEq)]
struct Poly(SmallVec<[f64; 3]>);

impl Poly {
    fn constant(value: f64) -> Self {
        Self(smallvec![value])
    }

    fn degree(&self) -> usize {
        self.0.len() - 1
    }

    fn from_expr(expr: &Expr) -> Option<Self> {
        match expr {
            Expr::Num(value) => Some(Self::constant(*value)),
            Expr::Var(Var::Y) => Some(Self(smallvec![0.0, 1.0])),
            Expr::Var(Var::X) | Expr::Call(..) => None,
            Expr::Neg(inner) => Some(Self::from_expr(inner)?.scale(-1.0)),
            Expr::Binary(op, lhs, rhs) => {
                let lhs = Self::from_expr(lhs)?;
                match op {
                    BinOp::Add => Some(lhs.add(&Self::from_expr(rhs)?)),
                    BinOp::Sub => Some(lhs.add(&Self::from_expr(rhs)?.scale(-1.0))),
                    BinOp::Mul => lhs.mul(&Self::from_expr(rhs)?),
                    BinOp::Div => {
                        let divisor = rhs.as_num()?;
                        (divisor != 0.0).then(|| lhs.scale(1.0 / divisor))
                    }
                    BinOp::Pow => {
                        let exponent = rhs.as_num()?;
                        if exponent < 0.0 || exponent.fract() != 0.0 || exponent > MAX_DEGREE as f64
                        {
                            return None;
                        }
                        let mut result = Self::constant(1.0);
                        for _ in 0..exponent as usize {
                            result = result.mul(&lhs)?;
                        }
                        Some(result)
                    }
                }
            }
        }
    }

    fn scale(mut self, factor: f64) -> Self {
        self.0.iter_mut().for_each(|c| *c *= factor);
        self
    }

    fn add(&self, other: &Self) -> Self {
        let len = self.0.len().max(other.0.len());
        Self(
            (0..len)
                .map(|i| self.0.get(i).unwrap_or(&0.0) + other.0.get(i).unwrap_or(&0.0))
                .collect(),
        )
    }

    fn mul(&self, other: &Self) -> Option<Self> {
        if self.degree() + other.degree() > MAX_DEGREE {
            return None;
        }
        let mut coeffs: SmallVec<[f64; 3]> = smallvec![0.0; self.0.len() + other.0.len() - 1];
        for (i, a) in self.0.iter().enumerate() {
            for (j, b) in other.0.iter().enumerate() {
                coeffs[i + j] += a * b;
            }
        }
        Some(Self(coeffs))
    }

    fn solve(mut self, level: f64) -> Result<Roots, SolveError> {
        self.0[0] -= level;
        while self.0.len() > 1 && self.0.last().is_some_and(|c| c.abs() < EPSILON) {
            self.0.pop();
        }

        match self.0.as_slice() {
            [c] if c.abs() < EPSILON => Err(SolveError::Degenerate),
            [_] => Ok(Roots::new()),
            [c, b] => Ok(smallvec![-c / b]),
            [c, b, a] => {
                let discriminant = b * b - 4.0 * a * c;
                if discriminant < 0.0 {
                    return Ok(Roots::new());
                }
                // avoids cancellation when b dominates
                let q = -0.5 * (b + b.signum() * discriminant.sqrt());
                if q == 0.0 {
                    return Ok(smallvec![0.0]);
                }
                Ok(smallvec![q / a, c / q])
            }
            _ => Err(SolveError::NotAlgebraic),
        }
    }
}

/// Walks from the root towards the single `y`, inverting each operation on the way.
fn isolate(expr: &Expr, level: f64) -> Result<Roots, SolveError> {
    let mut targets: Roots = smallvec![level];
    let mut node = expr;

    loop {
        node = match node {
            Expr::Var(Var::Y) => return Ok(targets),
            Expr::Num(_) | Expr::Var(Var::X) => return Err(SolveError::NotAlgebraic),
            Expr::Neg(inner) => {
                targets.iter_mut().for_each(|t| *t = -*t);
                &**inner
            }
            Expr::Binary(op, lhs, rhs) => {
                let (inner, constant, y_on_left): (&Expr, _, _) = if lhs.contains(Var::Y) {
                    (&**lhs, rhs.as_num(), true)
                } else {
                    (&**rhs, lhs.as_num(), false)
                };
                let constant = constant.ok_or(SolveError::NotAlgebraic)?;
                targets = invert_all(&targets, |t| invert_binary(*op, t, constant, y_on_left))?;
                inner
            }
            Expr::Call(func, args) => {
                let (index, inner) = args
                    .iter()
                    .enumerate()
                    .find(|(_, arg)| arg.contains(Var::Y))
                    .ok_or(SolveError::NotAlgebraic)?;
                let other = args.get(1 - index.min(1)).and_then(Expr::as_num);
                targets = invert_all(&targets, |t| invert_call(*func, t, index, other))?;
                inner
            }
        };

        if targets.is_empty() {
            return Ok(targets);
        }
    }
}

fn invert_all(
    targets: &Roots,
    invert: impl Fn(f64) -> Result<Roots, SolveError>,
) -> Result<Roots, SolveError> {
    let mut inverted = Roots::new();
    for &target in targets {
        inverted.extend(invert(target)?);
    }
    Ok(inverted)
}

fn invert_binary(op: BinOp, t: f64, c: f64, y_on_left: bool) -> Result<Roots, SolveError> {
    Ok(match (op, y_on_left) {
        (BinOp::Add, _) => smallvec![t - c],
        (BinOp::Sub, true) => smallvec![t + c],
        (BinOp::Sub, false) => smallvec![c - t],
        (BinOp::Mul, _) if c == 0.0 => return Err(SolveError::Degenerate),
        (BinOp::Mul, _) => smallvec![t / c],
        // s / c = t
        (BinOp::Div, true) if c == 0.0 => return Err(SolveError::Degenerate),
        (BinOp::Div, true) => smallvec![t * c],
        // c / s = t
        (BinOp::Div, false) if c == 0.0 => return Err(SolveError::Degenerate),
        (BinOp::Div, false) if t == 0.0 => Roots::new(),
        (BinOp::Div, false) => smallvec![c / t],
        // s ^ c = t
        (BinOp::Pow, true) => invert_power(t, c)?,
        // c ^ s = t
        (BinOp::Pow, false) if c == 1.0 => return Err(SolveError::Degenerate),
        (BinOp::Pow, false) if c <= 0.0 => return Err(SolveError::NotAlgebraic),
        (BinOp::Pow, false) if t <= 0.0 => Roots::new(),
        (BinOp::Pow, false) => smallvec![t.ln() / c.ln()],
    })
}

/// Real solutions of `s ^ exponent = t`.
fn invert_power(t: f64, exponent: f64) -> Result<Roots, SolveError> {
    if exponent == 0.0 {
        return Err(SolveError::Degenerate);
    }

    if exponent.fract() == 0.0 {
        let even = exponent % 2.0 == 0.0;
        let roots = if t == 0.0 {
            zero_root(exponent)
        } else if !even {
            smallvec![t.signum() * t.abs().powf(1.0 / exponent)]
        } else if t < 0.0 {
            Roots::new()
        } else {
            let root = t.powf(1.0 / exponent);
            smallvec![-root, root]
        };
        return Ok(roots);
    }

    Ok(if t == 0.0 {
        zero_root(exponent)
    } else if t < 0.0 {
        Roots::new()
    } else {
        smallvec![t.powf(1.0 / exponent)]
    })
}

/// `s ^ exponent = 0` only has `s = 0` as a solution for positive exponents.
fn zero_root(exponent: f64) -> Roots {
    if exponent > 0.0 {
        smallvec![0.0]
    } else {
        Roots::new()
    }
}

fn invert_call(
    func: Func,
    t: f64,
    index: usize,
    other: Option<f64>,
) -> Result<Roots, SolveError> {
    Ok(match (func, index, other) {
        (Func::Ln, _, _) | (Func::Log, 0, None) => smallvec![t.exp()],
        // log_base(s) = t
        (Func::Log, 0, Some(base)) if base <= 0.0 || base == 1.0 => {
            return Err(SolveError::Degenerate);
        }
        (Func::Log, 0, Some(base)) => smallvec![base.powf(t)],
        // log_s(a) = t
        (Func::Log, _, Some(a)) if a <= 0.0 || a == 1.0 => return Err(SolveError::Degenerate),
        (Func::Log, _, Some(_)) if t == 0.0 => Roots::new(),
        (Func::Log, _, Some(a)) => smallvec![(a.ln() / t).exp()],
        (Func::Sqrt, _, _) if t < 0.0 => Roots::new(),
        (Func::Sqrt, _, _) => smallvec![t * t],
        (Func::Exp, _, _) if t <= 0.0 => Roots::new(),
        (Func::Exp, _, _) => smallvec![t.ln()],
        (Func::Abs, _, _) if t < 0.0 => Roots::new(),
        (Func::Abs, _, _) if t == 0.0 => smallvec![0.0],
        (Func::Abs, _, _) => smallvec![-t, t],
        _ => return Err(SolveError::NotAlgebraic),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solve(source: &str, x: f64, level: f64) -> Result<Roots, SolveError> {
        solve_for_y(&Expr::parse(source).unwrap(), x, level)
    }

    fn assert_roots(actual: Result<Roots, SolveError>, expected: &[f64]) {
        let actual = actual.unwrap();
        assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{actual:?} vs {expected:?}");
        }
    }

    #[test]
    fn linear_in_y() {
        assert_roots(solve("x * y", 5.0, 25.0), &[5.0]);
        assert_roots(solve("2x + 3y", 1.0, 8.0), &[2.0]);
        assert_roots(solve("(x + y) / 2", 1.0, 3.0), &[5.0]);
    }

    #[test]
    fn quadratic_in_y() {
        assert_roots(solve("y^2", 3.0, 4.0), &[-2.0, 2.0]);
        assert_roots(solve("x*y + y^2", 1.0, 6.0), &[-3.0, 2.0]);
        assert_roots(solve("y2 + 1", 3.0, 0.0), &[]);
    }

    #[test]
    fn isolates_single_occurrence() {
        assert_roots(solve("ln(x) + ln(y)", 1.0, 2.0), &[2f64.exp()]);
        assert_roots(solve("x^0.5 * y^0.5", 4.0, 6.0), &[9.0]);
        assert_roots(solve("x^1/2 y^1/2", 4.0, 6.0), &[9.0]);
        assert_roots(solve("sqrt(x * y)", 2.0, 4.0), &[8.0]);
        assert_roots(solve("x + y^3", 1.0, -7.0), &[-2.0]);
        assert_roots(solve("exp(y) - x", 1.0, 0.0), &[0.0]);
        assert_roots(solve("log(y, 2)", 1.0, 3.0), &[8.0]);
        assert_roots(solve("10 / y", 1.0, 4.0), &[2.5]);
        assert_roots(solve("2^y", 1.0, 8.0), &[3.0]);
    }

    #[test]
    fn out_of_domain_targets_have_no_roots() {
        assert_roots(solve("sqrt(y)", 1.0, -1.0), &[]);
        assert_roots(solve("y^0.5", 1.0, -1.0), &[]);
        assert_roots(solve("exp(y)", 1.0, 0.0), &[]);
    }

    #[test]
    fn falls_back_when_not_closed_form() {
        assert_eq!(solve("min(x, y)", 1.0, 1.0), Err(SolveError::NotAlgebraic));
        assert_eq!(solve("y + ln(y)", 1.0, 1.0), Err(SolveError::NotAlgebraic));
        assert_eq!(solve("y^3 + y", 1.0, 1.0), Err(SolveError::NotAlgebraic));
    }

    #[test]
    fn reports_degenerate_and_undefined() {
        assert_eq!(solve("x", 1.0, 1.0), Err(SolveError::Degenerate));
        assert_eq!(solve("0 * y + 1", 1.0, 1.0), Err(SolveError::Degenerate));
        assert_eq!(solve("ln(x) + y", 0.0, 1.0), Err(SolveError::Undefined));
    }
}
