use anyhow::{Context, Result};
use clap::Subcommand;
use serde::Serialize;
use toybox_core::econ::*;

use crate::SamplerArgs;

#[derive(Subcommand, Debug)]
pub(crate) enum EconCommand {
    /// Evaluate a utility function at a box point
    Utility {
        function: String,
        x: f64,
        y: f64,

        /// Measure from the top-right corner of the box
        #[arg(long, requires = "width", requires = "height")]
        agent2: bool,

        #[arg(long, default_value_t = 0.0)]
        width: f64,

        #[arg(long, default_value_t = 0.0)]
        height: f64,
    },

    /// Sample the indifference curve `function = level`
    Curve {
        function: String,

        #[arg(long, allow_negative_numbers = true)]
        level: f64,

        #[arg(long)]
        width: f64,

        #[arg(long)]
        height: f64,

        #[arg(long)]
        agent2: bool,

        #[command(flatten)]
        sampler: SamplerArgs,

        #[arg(long)]
        json: bool,
    },

    /// Both agents' endowment curves in an Edgeworth box
    #[command(name = "box")]
    Edgeworth {
        #[arg(long, default_value = "ln(x) + ln(y)")]
        u1: String,

        /// Agent 1 endowment as `x,y`
        #[arg(long, default_value = "4,6")]
        e1: String,

        #[arg(long, default_value = "x^0.5 * y^0.5")]
        u2: String,

        #[arg(long, default_value = "6,4")]
        e2: String,

        #[command(flatten)]
        sampler: SamplerArgs,

        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct AgentReport {
    utility: String,
    endowment: Endowment,
    endowment_utility: f64,
    curve: Vec<Point>,
}

#[derive(Serialize)]
struct BoxReport {
    dimensions: BoxDimensions,
    endowment_point: Point,
    agents: Vec<AgentReport>,
}

pub(crate) fn run(command: EconCommand) -> Result<()> {
    match command {
        EconCommand::Utility {
            function,
            x,
            y,
            agent2,
            width,
            height,
        } => {
            UtilityFunction::parse(&function)
                .with_context(|| format!("parsing utility {function:?}"))?;
            let dims = BoxDimensions::new(width, height);
            let value = evaluate_utility(&function, Point::new(x, y), agent_id(agent2), dims);
            println!("{value}");
            Ok(())
        }
        EconCommand::Curve {
            function,
            level,
            width,
            height,
            agent2,
            sampler,
            json,
        } => {
            let config = sampler.resolve()?;
            let utility = UtilityFunction::parse(&function)
                .with_context(|| format!("parsing utility {function:?}"))?;
            let dims = BoxDimensions::new(width, height);
            let curve = indifference_curve(&utility, level, dims, agent_id(agent2), &config);
            print_curve(&curve, json)
        }
        EconCommand::Edgeworth {
            u1,
            e1,
            u2,
            e2,
            sampler,
            json,
        } => {
            let config = sampler.resolve()?;
            let economy = EdgeworthBox::new(
                Agent::new(u1, parse_endowment(&e1)),
                Agent::new(u2, parse_endowment(&e2)),
            );
            print_box(&economy, &config, json)
        }
    }
}

fn agent_id(agent2: bool) -> AgentId {
    if agent2 { AgentId::Two } else { AgentId::One }
}

/// `x,y`, each component clamped to the minimum endowment.
fn parse_endowment(input: &str) -> Endowment {
    let (x, y) = input.split_once(',').unwrap_or((input, ""));
    Endowment::new(
        Endowment::parse_component(x),
        Endowment::parse_component(y),
    )
}

fn print_curve(curve: &[Point], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(curve)?);
        return Ok(());
    }
    if !is_drawable(curve) {
        log::warn!("Only {} point(s) found, nothing to draw", curve.len());
    }
    for point in curve {
        println!("{:.6}\t{:.6}", point.x, point.y);
    }
    Ok(())
}

fn print_box(economy: &EdgeworthBox, config: &SamplerConfig, json: bool) -> Result<()> {
    let report = BoxReport {
        dimensions: economy.dimensions(),
        endowment_point: economy.endowment_point(),
        agents: [AgentId::One, AgentId::Two]
            .into_iter()
            .map(|id| {
                let agent = economy.agent(id);
                AgentReport {
                    utility: agent.utility.clone(),
                    endowment: agent.endowment,
                    endowment_utility: economy.endowment_utility(id),
                    curve: economy.endowment_curve(id, config),
                }
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let dims = report.dimensions;
    let point = report.endowment_point;
    println!("box {} x {}, endowment at ({}, {})", dims.width, dims.height, point.x, point.y);
    for (agent, id) in report.agents.iter().zip(1..) {
        println!(
            "agent {id}: U = {} holds ({}, {}), U(endowment) = {:.6}, {} curve points",
            agent.utility,
            agent.endowment.x,
            agent.endowment.y,
            agent.endowment_utility,
            agent.curve.len()
        );
    }
    Ok(())
}
