use anyhow::{Context, Result, bail};
use clap::Subcommand;
use serde::Serialize;
use std::str::FromStr;
use toybox_core::*;

#[derive(Subcommand, Debug)]
pub(crate) enum MinesCommand {
    /// Generate a random board and print its seed
    New {
        #[arg(long, default_value_t = Preset::default())]
        preset: Preset,

        /// Force the generator seed instead of using the clock
        #[arg(long)]
        rng_seed: Option<u64>,

        #[arg(long)]
        json: bool,
    },

    /// Print the full layout of a seed
    Show {
        seed: String,

        #[arg(long)]
        json: bool,
    },

    /// Apply moves to a fresh game and print what the player sees
    Play {
        seed: String,

        /// `r<x>,<y>` reveals a cell, `f<x>,<y>` toggles a flag
        #[arg(required = true)]
        moves: Vec<Move>,
    },

    /// Toggle mines on a layout and print the resulting seed
    Edit {
        seed: String,

        #[arg(required = true)]
        cells: Vec<CellArg>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Move {
    Reveal(Coord2),
    Flag(Coord2),
}

impl FromStr for Move {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (kind, rest) = s.split_at_checked(1).context("empty move")?;
        let CellArg(coords) = rest.parse()?;
        match kind {
            "r" | "R" => Ok(Self::Reveal(coords)),
            "f" | "F" => Ok(Self::Flag(coords)),
            _ => bail!("unknown move {s:?}, expected r<x>,<y> or f<x>,<y>"),
        }
    }
}

/// A cell written as `x,y`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct CellArg(Coord2);

impl FromStr for CellArg {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (x, y) = s
            .split_once(',')
            .with_context(|| format!("expected x,y but got {s:?}"))?;
        let x = x.trim().parse().with_context(|| format!("bad column in {s:?}"))?;
        let y = y.trim().parse().with_context(|| format!("bad row in {s:?}"))?;
        Ok(Self((x, y)))
    }
}

#[derive(Serialize)]
struct BoardReport<'a> {
    seed: &'a str,
    width: Coord,
    height: Coord,
    preset: Option<Preset>,
    mines: CellCount,
    cells: Vec<Vec<i8>>,
}

pub(crate) fn run(command: MinesCommand) -> Result<()> {
    match command {
        MinesCommand::New {
            preset,
            rng_seed,
            json,
        } => {
            let rng_seed = rng_seed.unwrap_or_else(crate::random_seed);
            log::info!("Generating {preset} board with rng seed {rng_seed}");
            let seed = RandomSeedGenerator::new(rng_seed).generate(preset.config());
            show(&Minesweeper::from_seed(seed), json)
        }
        MinesCommand::Show { seed, json } => show(&open(&seed), json),
        MinesCommand::Play { seed, moves } => play(open(&seed), &moves),
        MinesCommand::Edit { seed, cells } => edit(open(&seed), &cells),
    }
}

/// Decodes a seed, falling back to a random beginner board when it is unusable.
fn open(encoded: &str) -> Minesweeper {
    Minesweeper::from_seed(Seed::decode_or_random(encoded, crate::random_seed()))
}

fn show(game: &Minesweeper, json: bool) -> Result<()> {
    let board = game.board();
    let (width, height) = board.size();

    if json {
        let report = BoardReport {
            seed: game.encoded_seed(),
            width,
            height,
            preset: game.preset(),
            mines: game.mine_count(),
            cells: board.rows(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", game.encoded_seed());
    let preset = game.preset().map_or("custom".to_owned(), |p| p.to_string());
    println!("{width}x{height}, {} mines ({preset})", game.mine_count());
    for row in board.rows() {
        let line: String = row
            .iter()
            .map(|&cell| match cell {
                MINE => '*',
                0 => '.',
                n => char::from(b'0' + n as u8),
            })
            .collect();
        println!("{line}");
    }
    Ok(())
}

fn play(mut game: Minesweeper, moves: &[Move]) -> Result<()> {
    let mut revealed = RevealOutcome::NoChange;
    for &mv in moves {
        match mv {
            Move::Reveal(coords) => {
                let outcome = game.reveal(coords)?;
                log::info!("reveal {coords:?}: {outcome:?}");
                revealed = revealed | outcome;
            }
            Move::Flag(coords) => {
                let outcome = game.toggle_flag(coords)?;
                log::info!("flag {coords:?}: {outcome:?}");
            }
        }
    }
    if !revealed.has_update() {
        log::warn!("No reveal changed the board");
    }

    print_view(&game)?;
    println!("{:?}, {} mines left", game.state(), game.mines_left());
    Ok(())
}

fn edit(mut game: Minesweeper, cells: &[CellArg]) -> Result<()> {
    game.set_mode(Mode::Edit);
    for &CellArg(coords) in cells {
        game.toggle_mine(coords)?;
    }

    print_view(&game)?;
    println!("{}", game.encoded_seed());
    Ok(())
}

fn print_view(game: &Minesweeper) -> Result<()> {
    let (width, height) = game.size();
    for y in 0..height {
        let line = (0..width)
            .map(|x| {
                Ok(match game.view((x, y))? {
                    CellView::Hidden => '#',
                    CellView::Flagged => 'F',
                    CellView::Revealed(0) | CellView::EditEmpty => '.',
                    CellView::Revealed(n) => char::from(b'0' + n),
                    CellView::Mine | CellView::EditMine => '*',
                })
            })
            .collect::<core::result::Result<String, GameError>>()?;
        println!("{line}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_moves() {
        assert_eq!("r3,4".parse::<Move>().unwrap(), Move::Reveal((3, 4)));
        assert_eq!("F0, 1".parse::<Move>().unwrap(), Move::Flag((0, 1)));
        assert!("r3".parse::<Move>().is_err());
        assert!("q1,1".parse::<Move>().is_err());
        assert!("".parse::<Move>().is_err());
        assert!("r300,1".parse::<Move>().is_err());
    }

    #[test]
    fn edits_produce_decodable_seed() {
        let mut game = Minesweeper::from_seed(Seed {
            width: 3,
            height: 3,
            mines: vec![],
        });
        game.set_mode(Mode::Edit);
        game.toggle_mine((2, 1)).unwrap();

        let seed = Seed::decode(game.encoded_seed()).unwrap();
        assert_eq!(seed.mines, vec![[1, 2]]);
    }
}
