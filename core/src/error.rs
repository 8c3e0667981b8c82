use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Board shape does not match declared size")]
    InvalidBoardShape,
}

pub type Result<T> = core::result::Result<T, GameError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown preset {0:?}, expected beginner, intermediate or expert")]
pub struct UnknownPreset(pub String);

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Seed is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Seed payload is not a valid board description: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Seed declares a {width}x{height} board, sides must be 1 to 255")]
    InvalidDimension { width: i64, height: i64 },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    #[error("Unexpected character {found:?} at {pos}")]
    UnexpectedChar { pos: usize, found: char },
    #[error("Unexpected {found} at {pos}")]
    UnexpectedToken { pos: usize, found: String },
    #[error("Unexpected end of expression")]
    UnexpectedEnd,
    #[error("Unknown identifier {name:?} at {pos}")]
    UnknownIdentifier { pos: usize, name: String },
    #[error("Function {name} takes {expected} argument(s), got {found}")]
    Arity {
        name: &'static str,
        expected: &'static str,
        found: usize,
    },
    #[error("Expression is longer than {limit} bytes")]
    TooLong { limit: usize },
    #[error("Expression nests deeper than {limit} levels")]
    TooDeep { limit: usize },
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum SolveError {
    #[error("Expression cannot be solved for y in closed form")]
    NotAlgebraic,
    #[error("Equation holds for every y or none in a degenerate way")]
    Degenerate,
    #[error("Expression is undefined at the sampled x")]
    Undefined,
}
