use core::fmt;

use crate::ExprError;

mod lexer;
mod parser;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Var {
    X,
    Y,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinOp {
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Self::Add => lhs + rhs,
            Self::Sub => lhs - rhs,
            Self::Mul => lhs * rhs,
            Self::Div => lhs / rhs,
            Self::Pow => lhs.powf(rhs),
        }
    }

    const fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
            Self::Pow => '^',
        }
    }
}

/// Named functions; `ln` and one-argument `log` are both the natural logarithm.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Func {
    Ln,
    Log,
    Sqrt,
    Exp,
    Abs,
    Min,
    Max,
}

impl Func {
    pub fn lookup(name: &str) -> Option<Self> {
        Some(match name {
            "ln" => Self::Ln,
            "log" => Self::Log,
            "sqrt" => Self::Sqrt,
            "exp" => Self::Exp,
            "abs" => Self::Abs,
            "min" => Self::Min,
            "max" => Self::Max,
            _ => return None,
        })
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Ln => "ln",
            Self::Log => "log",
            Self::Sqrt => "sqrt",
            Self::Exp => "exp",
            Self::Abs => "abs",
            Self::Min => "min",
            Self::Max => "max",
        }
    }

    /// Accepted argument counts as `(min, max)`.
    pub const fn arity(self) -> (usize, usize) {
        match self {
            Self::Log => (1, 2),
            Self::Min | Self::Max => (2, 2),
            _ => (1, 1),
        }
    }

    pub fn apply(self, args: &[f64]) -> f64 {
        match (self, args) {
            (Self::Ln | Self::Log, [a]) => a.ln(),
            (Self::Log, [a, base]) => a.ln() / base.ln(),
            (Self::Sqrt, [a]) => a.sqrt(),
            (Self::Exp, [a]) => a.exp(),
            (Self::Abs, [a]) => a.abs(),
            (Self::Min, [a, b]) => a.min(*b),
            (Self::Max, [a, b]) => a.max(*b),
            _ => f64::NAN,
        }
    }
}

/// Parsed utility expression over `x` and `y`.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Num(f64),
    Var(Var),
    Neg(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Call(Func, Vec<Expr>),
}

impl Expr {
    pub fn parse(source: &str) -> Result<Self, ExprError> {
        parser::parse(source)
    }

    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        Self::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    /// Evaluates with IEEE semantics; domain errors come back as NaN or infinities.
    pub fn eval(&self, x: f64, y: f64) -> f64 {
        match self {
            Self::Num(value) => *value,
            Self::Var(Var::X) => x,
            Self::Var(Var::Y) => y,
            Self::Neg(inner) => -inner.eval(x, y),
            Self::Binary(op, lhs, rhs) => op.apply(lhs.eval(x, y), rhs.eval(x, y)),
            Self::Call(func, args) => {
                let values: Vec<f64> = args.iter().map(|arg| arg.eval(x, y)).collect();
                func.apply(&values)
            }
        }
    }

    pub fn occurrences(&self, var: Var) -> usize {
        match self {
            Self::Num(_) => 0,
            Self::Var(v) => usize::from(*v == var),
            Self::Neg(inner) => inner.occurrences(var),
            Self::Binary(_, lhs, rhs) => lhs.occurrences(var) + rhs.occurrences(var),
            Self::Call(_, args) => args.iter().map(|arg| arg.occurrences(var)).sum(),
        }
    }

    pub fn contains(&self, var: Var) -> bool {
        self.occurrences(var) > 0
    }

    /// Substitutes `x` and folds every subtree that no longer depends on `y`.
    pub fn bind_x(&self, x: f64) -> Expr {
        match self {
            Self::Num(value) => Self::Num(*value),
            Self::Var(Var::X) => Self::Num(x),
            Self::Var(Var::Y) => Self::Var(Var::Y),
            Self::Neg(inner) => match inner.bind_x(x) {
                Self::Num(value) => Self::Num(-value),
                other => Self::Neg(Box::new(other)),
            },
            Self::Binary(op, lhs, rhs) => match (lhs.bind_x(x), rhs.bind_x(x)) {
                (Self::Num(a), Self::Num(b)) => Self::Num(op.apply(a, b)),
                (lhs, rhs) => Self::binary(*op, lhs, rhs),
            },
            Self::Call(func, args) => {
                let args: Vec<Expr> = args.iter().map(|arg| arg.bind_x(x)).collect();
                let constants: Option<Vec<f64>> = args.iter().map(Expr::as_num).collect();
                match constants {
                    Some(values) => Self::Num(func.apply(&values)),
                    None => Self::Call(*func, args),
                }
            }
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Self::Num(value) => Some(*value),
            _ => None,
        }
    }

    /// Whether every literal in the tree is finite.
    pub fn constants_finite(&self) -> bool {
        match self {
            Self::Num(value) => value.is_finite(),
            Self::Var(_) => true,
            Self::Neg(inner) => inner.constants_finite(),
            Self::Binary(_, lhs, rhs) => lhs.constants_finite() && rhs.constants_finite(),
            Self::Call(_, args) => args.iter().all(Expr::constants_finite),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(value) => write!(f, "{value}"),
            Self::Var(Var::X) => f.write_str("x"),
            Self::Var(Var::Y) => f.write_str("y"),
            Self::Neg(inner) => write!(f, "-({inner})"),
            Self::Binary(op, lhs, rhs) => write!(f, "({lhs} {} {rhs})", op.symbol()),
            Self::Call(func, args) => {
                write!(f, "{}(", func.name())?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}
