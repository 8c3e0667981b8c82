use super::expr::Expr;
use super::{AgentId, BoxDimensions, Point};
use crate::ExprError;

/// Coordinates at or below this are treated as zero and score no utility.
pub const DOMAIN_EPSILON: f64 = 0.001;

/// A parsed utility function `U(x, y)` in the agent's own frame.
#[derive(Clone, Debug, PartialEq)]
pub struct UtilityFunction {
    source: String,
    expr: Expr,
}

impl UtilityFunction {
    pub fn parse(source: &str) -> Result<Self, ExprError> {
        Ok(Self {
            source: source.to_owned(),
            expr: Expr::parse(source)?,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Utility at `(x, y)` in the agent's own frame.
    ///
    /// Never fails: non-positive coordinates and non-finite results both score 0.
    pub fn evaluate_own(&self, x: f64, y: f64) -> f64 {
        if x <= DOMAIN_EPSILON || y <= DOMAIN_EPSILON {
            return 0.0;
        }
        let value = self.expr.eval(x, y);
        if value.is_finite() { value } else { 0.0 }
    }

    /// Utility at a point given in box coordinates.
    pub fn evaluate(&self, point: Point, agent: AgentId, dims: BoxDimensions) -> f64 {
        let own = dims.to_agent_frame(agent, point);
        self.evaluate_own(own.x, own.y)
    }
}

/// Utility of `function` at the box point `point` for `agent`, or 0 when it cannot be computed.
pub fn evaluate_utility(function: &str, point: Point, agent: AgentId, dims: BoxDimensions) -> f64 {
    match UtilityFunction::parse(function) {
        Ok(utility) => utility.evaluate(point, agent, dims),
        Err(err) => {
            log::debug!("Cannot evaluate utility {function:?}: {err}");
            0.0
        }
    }
}
