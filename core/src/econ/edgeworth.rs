use serde::{Deserialize, Serialize};

use super::{
    AgentId, BoxDimensions, Point, SamplerConfig, evaluate_utility, sample_indifference_curve,
};

/// Smallest endowment allowed on either axis.
pub const MIN_ENDOWMENT: f64 = 0.1;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Endowment {
    pub x: f64,
    pub y: f64,
}

impl Endowment {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: clamp_component(x),
            y: clamp_component(y),
        }
    }

    /// Parses a user-typed amount; anything unusable becomes the minimum endowment.
    pub fn parse_component(input: &str) -> f64 {
        match input.trim().parse::<f64>() {
            Ok(value) => clamp_component(value),
            Err(_) => {
                log::debug!("Unparseable endowment {input:?}, using {MIN_ENDOWMENT}");
                MIN_ENDOWMENT
            }
        }
    }

    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    fn set(&mut self, axis: Axis, value: f64) {
        match axis {
            Axis::X => self.x = clamp_component(value),
            Axis::Y => self.y = clamp_component(value),
        }
    }
}

fn clamp_component(value: f64) -> f64 {
    if value.is_finite() && value >= MIN_ENDOWMENT {
        value
    } else {
        MIN_ENDOWMENT
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub utility: String,
    pub endowment: Endowment,
}

impl Agent {
    pub fn new(utility: impl Into<String>, endowment: Endowment) -> Self {
        Self {
            utility: utility.into(),
            endowment,
        }
    }
}

/// Two agents trading two goods. The box is exactly as large as their combined endowments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeworthBox {
    agents: [Agent; 2],
}

impl Default for EdgeworthBox {
    fn default() -> Self {
        Self::new(
            Agent::new("ln(x) + ln(y)", Endowment::new(4.0, 6.0)),
            Agent::new("x^0.5 * y^0.5", Endowment::new(6.0, 4.0)),
        )
    }
}

impl EdgeworthBox {
    pub fn new(first: Agent, second: Agent) -> Self {
        let mut agents = [first, second];
        for agent in &mut agents {
            // re-clamp values that bypassed `Endowment::new`, e.g. from a config file
            agent.endowment = Endowment::new(agent.endowment.x, agent.endowment.y);
        }
        Self { agents }
    }

    pub fn agent(&self, id: AgentId) -> &Agent {
        &self.agents[id.index()]
    }

    pub fn agents(&self) -> &[Agent; 2] {
        &self.agents
    }

    pub fn dimensions(&self) -> BoxDimensions {
        let [first, second] = &self.agents;
        BoxDimensions::new(
            first.endowment.x + second.endowment.x,
            first.endowment.y + second.endowment.y,
        )
    }

    /// Updates one endowment component from user input and returns the value actually stored.
    pub fn set_endowment(&mut self, id: AgentId, axis: Axis, input: &str) -> f64 {
        let value = Endowment::parse_component(input);
        let endowment = &mut self.agents[id.index()].endowment;
        endowment.set(axis, value);
        endowment.get(axis)
    }

    pub fn set_utility(&mut self, id: AgentId, utility: impl Into<String>) {
        self.agents[id.index()].utility = utility.into();
    }

    /// The initial allocation, in box coordinates measured from agent 1's origin.
    pub fn endowment_point(&self) -> Point {
        let endowment = self.agents[AgentId::One.index()].endowment;
        Point::new(endowment.x, endowment.y)
    }

    pub fn utility_at(&self, id: AgentId, point: Point) -> f64 {
        evaluate_utility(&self.agent(id).utility, point, id, self.dimensions())
    }

    pub fn endowment_utility(&self, id: AgentId) -> f64 {
        self.utility_at(id, self.endowment_point())
    }

    pub fn indifference_curve(&self, id: AgentId, level: f64, config: &SamplerConfig) -> Vec<Point> {
        sample_indifference_curve(&self.agent(id).utility, level, self.dimensions(), id, config)
    }

    /// The indifference curve through the endowment point.
    pub fn endowment_curve(&self, id: AgentId, config: &SamplerConfig) -> Vec<Point> {
        self.indifference_curve(id, self.endowment_utility(id), config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unusable_input_clamps_to_minimum() {
        for input in ["0", "-3", "abc", "", "inf", "NaN", "0.05"] {
            assert_eq!(Endowment::parse_component(input), MIN_ENDOWMENT, "{input:?}");
        }
        assert_eq!(Endowment::parse_component(" 2.5 "), 2.5);
    }

    #[test]
    fn dimensions_follow_endowments() {
        let mut economy = EdgeworthBox::default();
        assert_eq!(economy.dimensions(), BoxDimensions::new(10.0, 10.0));

        assert_eq!(economy.set_endowment(AgentId::Two, Axis::X, "1"), 1.0);
        assert_eq!(economy.set_endowment(AgentId::One, Axis::Y, "zero"), MIN_ENDOWMENT);
        assert_eq!(economy.dimensions(), BoxDimensions::new(5.0, 4.1));
    }

    #[test]
    fn endowment_point_is_shared_by_both_agents() {
        let economy = EdgeworthBox::new(
            Agent::new("x * y", Endowment::new(3.0, 1.0)),
            Agent::new("x * y", Endowment::new(2.0, 4.0)),
        );

        assert_eq!(economy.endowment_point(), Point::new(3.0, 1.0));
        assert_eq!(economy.endowment_utility(AgentId::One), 3.0);
        assert_eq!(economy.endowment_utility(AgentId::Two), 8.0);
    }

    #[test]
    fn endowment_curves_pass_through_endowment() {
        let economy = EdgeworthBox::default();
        let config = SamplerConfig {
            steps: 200,
            ..SamplerConfig::default()
        };
        let endowment = economy.endowment_point();

        for id in [AgentId::One, AgentId::Two] {
            let curve = economy.endowment_curve(id, &config);
            let level = economy.endowment_utility(id);
            assert!(curve.len() >= 2);
            for point in &curve {
                assert!((economy.utility_at(id, *point) - level).abs() < 1e-2);
            }
            let nearest = curve
                .iter()
                .map(|p| (p.x - endowment.x).abs() + (p.y - endowment.y).abs())
                .fold(f64::INFINITY, f64::min);
            assert!(nearest < 0.2, "{id:?}: {nearest}");
        }
    }

    #[test]
    fn config_values_are_clamped() {
        let economy: EdgeworthBox = serde_json::from_str(
            r#"{"agents": [
                {"utility": "x", "endowment": {"x": -1.0, "y": 2.0}},
                {"utility": "y", "endowment": {"x": 1.0, "y": 1.0}}
            ]}"#,
        )
        .unwrap();
        let economy = EdgeworthBox::new(economy.agents[0].clone(), economy.agents[1].clone());

        assert_eq!(economy.agent(AgentId::One).endowment.x, MIN_ENDOWMENT);
    }
}
