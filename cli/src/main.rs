use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use toybox_core::econ::SamplerConfig;

mod econ;
mod mines;

#[derive(Parser, Debug)]
#[command(name = "toybox", version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Minesweeper boards: generate, inspect, play and edit seeds
    #[command(subcommand)]
    Mines(mines::MinesCommand),

    /// Utility functions and indifference curves in an Edgeworth box
    #[command(subcommand)]
    Econ(econ::EconCommand),
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.verbose.log_level_filter())
        .init();
    log::debug!("{:?}", args.command);

    match args.command {
        Command::Mines(command) => mines::run(command),
        Command::Econ(command) => econ::run(command),
    }
}

/// Seed for the board generator when none is forced on the command line.
pub(crate) fn random_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

pub(crate) fn load_sampler_config(path: Option<&Path>) -> Result<SamplerConfig> {
    let Some(path) = path else {
        return Ok(SamplerConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let file: ConfigFile =
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?;
    log::debug!("Loaded sampler config {:?} from {}", file.sampler, path.display());
    Ok(file.sampler)
}

/// Layout of the `--config` file: a single `[sampler]` table.
#[derive(serde::Deserialize, Debug, Default)]
#[serde(default)]
struct ConfigFile {
    sampler: SamplerConfig,
}

#[derive(clap::Args, Debug)]
pub(crate) struct SamplerArgs {
    /// TOML file with a `[sampler]` table
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of x-intervals to sample, overrides the config file
    #[arg(long)]
    steps: Option<usize>,
}

impl SamplerArgs {
    pub(crate) fn resolve(&self) -> Result<SamplerConfig> {
        let mut config = load_sampler_config(self.config.as_deref())?;
        if let Some(steps) = self.steps {
            config.steps = steps;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn config_file_fills_missing_sampler_fields() {
        let file: ConfigFile = toml::from_str("[sampler]\nsteps = 12\ntolerance = 0.01\n").unwrap();
        assert_eq!(file.sampler.steps, 12);
        assert_eq!(file.sampler.tolerance, 0.01);
        assert_eq!(file.sampler.max_iterations, 40);

        let empty: ConfigFile = toml::from_str("").unwrap();
        assert_eq!(empty.sampler, SamplerConfig::default());
    }

    #[test]
    fn parses_moves_and_flags() {
        let args = Args::try_parse_from(["toybox", "-v", "mines", "play", "SEED", "r1,2", "f0,0"]);
        assert!(args.is_ok());
        assert!(Args::try_parse_from(["toybox", "mines", "play", "SEED", "x1,2"]).is_err());
    }
}
