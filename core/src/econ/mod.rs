//! Edgeworth box economics: utility evaluation and indifference-curve sampling.

use serde::{Deserialize, Serialize};

pub use edgeworth::*;
pub use sampler::*;
pub use solve::{Roots, solve_for_y};
pub use utility::*;

pub mod expr;

mod edgeworth;
mod sampler;
mod solve;
mod utility;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Agent 1 measures from the bottom-left corner of the box, agent 2 from the top-right.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentId {
    One,
    Two,
}

impl AgentId {
    pub const fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }
}

/// Box size, always the sum of both agents' endowments along each axis.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoxDimensions {
    pub width: f64,
    pub height: f64,
}

impl BoxDimensions {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Mirrors a point through the box centre, swapping between the two agents' frames.
    pub fn reflect(&self, point: Point) -> Point {
        Point::new(self.width - point.x, self.height - point.y)
    }

    /// Converts a point in box coordinates into `agent`'s own frame (and back).
    pub fn to_agent_frame(&self, agent: AgentId, point: Point) -> Point {
        match agent {
            AgentId::One => point,
            AgentId::Two => self.reflect(point),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflection_is_an_involution() {
        let dims = BoxDimensions::new(10.0, 8.0);
        let point = Point::new(3.0, 1.5);

        assert_eq!(dims.reflect(point), Point::new(7.0, 6.5));
        assert_eq!(dims.reflect(dims.reflect(point)), point);
        assert_eq!(dims.to_agent_frame(AgentId::One, point), point);
    }
}
