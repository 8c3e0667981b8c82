use serde::{Deserialize, Serialize};

use super::solve::solve_for_y;
use super::{AgentId, BoxDimensions, Point, UtilityFunction};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Number of intervals across the box width; `steps + 1` x-samples are taken.
    pub steps: usize,
    /// Accepted `|U - level|` for a bisection midpoint.
    pub tolerance: f64,
    pub max_iterations: u32,
    /// Bisection stops once the bracket is narrower than this.
    pub min_bracket: f64,
    /// Distance kept from the box edges when sampling.
    pub margin: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            steps: 30,
            tolerance: 1e-3,
            max_iterations: 40,
            min_bracket: 1e-4,
            margin: 0.001,
        }
    }
}

/// Samples the indifference curve `U = level` of `function` across the box.
///
/// The result is in box coordinates, ordered by the x-sample in the agent's own frame. Samples
/// with no solution are skipped, so the curve may have gaps; fewer than two points cannot be
/// drawn. A function that does not parse yields an empty curve.
pub fn sample_indifference_curve(
    function: &str,
    level: f64,
    dims: BoxDimensions,
    agent: AgentId,
    config: &SamplerConfig,
) -> Vec<Point> {
    match UtilityFunction::parse(function) {
        Ok(utility) => indifference_curve(&utility, level, dims, agent, config),
        Err(err) => {
            log::debug!("Cannot sample curve for {function:?}: {err}");
            Vec::new()
        }
    }
}

pub fn indifference_curve(
    utility: &UtilityFunction,
    level: f64,
    dims: BoxDimensions,
    agent: AgentId,
    config: &SamplerConfig,
) -> Vec<Point> {
    let steps = config.steps.max(1);
    let span = dims.width - 2.0 * config.margin;

    let points: Vec<Point> = (0..=steps)
        .filter_map(|i| {
            let x = config.margin + span * (i as f64) / (steps as f64);
            let y = solve_sample(utility, x, level, dims, config)?;
            Some(dims.to_agent_frame(agent, Point::new(x, y)))
        })
        .collect();

    log::debug!(
        "Sampled {}/{} points for {:?} at level {} ({:?})",
        points.len(),
        steps + 1,
        utility.source(),
        level,
        agent
    );
    points
}

/// Finds `y` in the agent's own frame with `U(x, y) = level`, if any lies inside the box.
///
/// Tries the closed-form solver first and bisects only when it gives up.
pub fn solve_sample(
    utility: &UtilityFunction,
    x: f64,
    level: f64,
    dims: BoxDimensions,
    config: &SamplerConfig,
) -> Option<f64> {
    let low = config.margin;
    let high = dims.height - config.margin;

    match solve_for_y(utility.expr(), x, level) {
        Ok(roots) => {
            let root = roots.into_iter().find(|y| (low..=high).contains(y));
            if root.is_none() {
                log::trace!("No root of {:?} within the box at x = {x}", utility.source());
            }
            root
        }
        Err(err) => {
            log::trace!("Bisecting {:?} at x = {x}: {err}", utility.source());
            bisect_y(utility, x, level, dims, config)
        }
    }
}

/// Bisection on `y`, assuming `U(x, ·)` increases with `y`.
pub fn bisect_y(
    utility: &UtilityFunction,
    x: f64,
    level: f64,
    dims: BoxDimensions,
    config: &SamplerConfig,
) -> Option<f64> {
    let mut low = config.margin;
    let mut high = dims.height - config.margin;
    let mut mid = 0.5 * (low + high);
    let mut residual = f64::INFINITY;

    for _ in 0..config.max_iterations {
        if high - low < config.min_bracket {
            break;
        }
        mid = 0.5 * (low + high);
        let value = utility.evaluate_own(x, mid);
        residual = (value - level).abs();
        if residual < config.tolerance {
            return Some(mid);
        }
        if value < level {
            low = mid;
        } else {
            high = mid;
        }
    }

    (residual < 10.0 * config.tolerance).then_some(mid)
}

/// A curve needs at least two points to draw a segment.
pub fn is_drawable(points: &[Point]) -> bool {
    points.len() >= 2
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utility(source: &str) -> UtilityFunction {
        UtilityFunction::parse(source).unwrap()
    }

    #[test]
    fn config_defaults_fill_missing_fields() {
        let config: SamplerConfig = serde_json::from_str(r#"{"steps": 10}"#).unwrap();
        assert_eq!(config.steps, 10);
        assert_eq!(config.max_iterations, 40);
    }

    #[test]
    fn algebraic_tier_hits_hyperbola() {
        let dims = BoxDimensions::new(15.0, 15.0);
        let y = solve_sample(&utility("x * y"), 5.0, 25.0, dims, &SamplerConfig::default());
        assert!((y.unwrap() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn roots_outside_box_are_discarded() {
        let dims = BoxDimensions::new(15.0, 15.0);
        let config = SamplerConfig::default();
        assert_eq!(solve_sample(&utility("x * y"), 1.0, 25.0, dims, &config), None);
        assert_eq!(solve_sample(&utility("y^2"), 1.0, 4.0, dims, &config), Some(2.0));
    }

    #[test]
    fn bisection_handles_kinked_preferences() {
        let dims = BoxDimensions::new(10.0, 10.0);
        let config = SamplerConfig::default();
        let leontief = utility("min(x, y)");

        let y = solve_sample(&leontief, 8.0, 5.0, dims, &config).unwrap();
        assert!((y - 5.0).abs() < 0.01);
        assert_eq!(solve_sample(&leontief, 3.0, 5.0, dims, &config), None);
    }

    #[test]
    fn bisection_gives_up_outside_range() {
        let dims = BoxDimensions::new(10.0, 10.0);
        let config = SamplerConfig::default();
        assert_eq!(bisect_y(&utility("x + y"), 1.0, 100.0, dims, &config), None);
    }

    #[test]
    fn unparseable_function_yields_empty_curve() {
        let dims = BoxDimensions::new(10.0, 10.0);
        let points =
            sample_indifference_curve("x **", 1.0, dims, AgentId::One, &SamplerConfig::default());
        assert!(points.is_empty());
        assert!(!is_drawable(&points));

        let nested = format!("{}x + y{}", "(".repeat(5_000), ")".repeat(5_000));
        let points =
            sample_indifference_curve(&nested, 1.0, dims, AgentId::One, &SamplerConfig::default());
        assert!(points.is_empty());
    }

    #[test]
    fn agent_two_points_are_reflected() {
        let dims = BoxDimensions::new(10.0, 10.0);
        let config = SamplerConfig {
            steps: 4,
            ..SamplerConfig::default()
        };

        let own = sample_indifference_curve("x + y", 10.0, dims, AgentId::One, &config);
        let reflected = sample_indifference_curve("x + y", 10.0, dims, AgentId::Two, &config);

        assert_eq!(own.len(), reflected.len());
        for (a, b) in own.iter().zip(&reflected) {
            assert_eq!(*b, dims.reflect(*a));
        }
        assert!(reflected.windows(2).all(|w| w[0].x > w[1].x));
    }
}
