use hashbrown::HashSet;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    Ready,
    Playing,
    Won,
    Lost,
}

impl GameState {
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::Ready
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Play,
    Edit,
}

impl Default for Mode {
    fn default() -> Self {
        Self::Play
    }
}

/// What a host should draw for a single cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellView {
    Hidden,
    Flagged,
    Revealed(u8),
    Mine,
    EditMine,
    EditEmpty,
}

/// A board plus the player's revealed and flagged grids.
///
/// The mine counter starts at the number of mines listed in the seed and then moves by one per
/// edit toggle, independently of how many distinct mines the board ends up holding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Minesweeper {
    board: Board,
    revealed: Array2<bool>,
    flagged: Array2<bool>,
    mode: Mode,
    state: GameState,
    mine_count: CellCount,
    preset: Option<Preset>,
    encoded_seed: String,
}

impl Minesweeper {
    pub fn from_seed(seed: Seed) -> Self {
        let board = Board::from_seed(&seed);
        let listed = seed.mines.len();
        if usize::from(board.mine_count()) != listed {
            log::warn!(
                "Seed lists {} mines but only {} distinct mines fit on the board",
                listed,
                board.mine_count()
            );
        }

        let shape = board.cells().dim();
        Self {
            board,
            revealed: Array2::from_elem(shape, false),
            flagged: Array2::from_elem(shape, false),
            mode: Mode::default(),
            state: GameState::default(),
            mine_count: listed.try_into().unwrap_or(CellCount::MAX),
            preset: seed.preset(),
            encoded_seed: seed.encode(),
        }
    }

    /// Starts a fresh random board for `preset`, keeping the current mode.
    pub fn new_game(&mut self, preset: Preset, rng_seed: u64) {
        let mode = self.mode;
        *self = Self::from_seed(RandomSeedGenerator::new(rng_seed).generate(preset.config()));
        self.mode = mode;
        self.preset = Some(preset);
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn preset(&self) -> Option<Preset> {
        self.preset
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn size(&self) -> Coord2 {
        self.board.size()
    }

    pub fn revealed(&self) -> &Array2<bool> {
        &self.revealed
    }

    pub fn flagged(&self) -> &Array2<bool> {
        &self.flagged
    }

    /// False off the board.
    pub fn is_revealed(&self, coords: Coord2) -> bool {
        self.revealed.get(coords.to_nd_index()).is_some_and(|&revealed| revealed)
    }

    /// False off the board.
    pub fn is_flagged(&self, coords: Coord2) -> bool {
        self.flagged.get(coords.to_nd_index()).is_some_and(|&flagged| flagged)
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn flag_count(&self) -> CellCount {
        self.flagged
            .iter()
            .filter(|&&flag| flag)
            .count()
            .try_into()
            .unwrap_or(CellCount::MAX)
    }

    pub fn mines_left(&self) -> isize {
        (self.mine_count as isize) - (self.flag_count() as isize)
    }

    /// Base64 seed of the current layout, refreshed after every edit.
    pub fn encoded_seed(&self) -> &str {
        &self.encoded_seed
    }

    pub fn seed(&self) -> Seed {
        Seed::from_board(&self.board)
    }

    pub fn view(&self, coords: Coord2) -> Result<CellView> {
        let coords = self.board.validate_coords(coords)?;
        let mine = self.board.is_mine(coords);

        Ok(match self.mode {
            Mode::Edit if mine => CellView::EditMine,
            Mode::Edit => CellView::EditEmpty,
            Mode::Play if !self.is_revealed(coords) => {
                if self.is_flagged(coords) {
                    CellView::Flagged
                } else {
                    CellView::Hidden
                }
            }
            Mode::Play if mine => CellView::Mine,
            Mode::Play => CellView::Revealed(self.board[coords] as u8),
        })
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn toggle_mode(&mut self) -> Mode {
        self.mode = match self.mode {
            Mode::Play => Mode::Edit,
            Mode::Edit => Mode::Play,
        };
        self.mode
    }

    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.board.validate_coords(coords)?;

        if self.mode != Mode::Play
            || self.state.is_finished()
            || self.is_revealed(coords)
            || self.is_flagged(coords)
        {
            return Ok(RevealOutcome::NoChange);
        }

        self.revealed[coords.to_nd_index()] = true;

        if self.board.is_mine(coords) {
            log::debug!("Hit mine at {:?}", coords);
            self.reveal_all_mines();
            self.state = GameState::Lost;
            return Ok(RevealOutcome::HitMine);
        }

        log::debug!("Revealed {:?}, adjacent mines: {}", coords, self.board[coords]);
        if self.board[coords] == 0 {
            self.flood_fill(coords);
        }

        self.state = GameState::Playing;
        if self.hidden_safe_count() == 0 && self.mine_count > 0 {
            log::debug!("All safe cells revealed");
            self.state = GameState::Won;
            Ok(RevealOutcome::Won)
        } else {
            Ok(RevealOutcome::Revealed)
        }
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        let coords = self.board.validate_coords(coords)?;

        if self.mode != Mode::Play || self.state.is_finished() || self.is_revealed(coords) {
            return Ok(MarkOutcome::NoChange);
        }

        let flag = &mut self.flagged[coords.to_nd_index()];
        *flag = !*flag;
        Ok(MarkOutcome::Changed)
    }

    /// Flips a cell between mine and empty while editing, then recounts and re-encodes.
    pub fn toggle_mine(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        let coords = self.board.validate_coords(coords)?;

        if self.mode != Mode::Edit {
            return Ok(MarkOutcome::NoChange);
        }

        let was_mine = self.board.is_mine(coords);
        self.board.set_mine(coords, !was_mine)?;
        self.mine_count = if was_mine {
            self.mine_count.saturating_sub(1)
        } else {
            self.mine_count.saturating_add(1)
        };
        self.board.recount();
        self.encoded_seed = self.seed().encode();
        log::debug!(
            "Toggled mine at {:?}, mine counter now {}",
            coords,
            self.mine_count
        );

        Ok(MarkOutcome::Changed)
    }

    /// Removes every mine while editing.
    pub fn clear_mines(&mut self) -> MarkOutcome {
        if self.mode != Mode::Edit {
            return MarkOutcome::NoChange;
        }

        self.board.clear();
        self.mine_count = 0;
        self.encoded_seed = self.seed().encode();
        MarkOutcome::Changed
    }

    /// Hides every cell and removes every flag; the layout is kept unless it has no mines.
    pub fn reset(&mut self) {
        self.revealed.fill(false);
        self.flagged.fill(false);
        self.state = GameState::Ready;

        if self.mine_count == 0 {
            self.board.clear();
        }
    }

    fn flood_fill(&mut self, start: Coord2) {
        let mut visited: HashSet<Coord2> = HashSet::from_iter([start]);
        let mut queue = VecDeque::from([start]);

        while let Some(current) = queue.pop_front() {
            for pos in self.board.neighbors(current) {
                let idx = pos.to_nd_index();
                if visited.contains(&pos) || self.revealed[idx] || self.flagged[idx] {
                    continue;
                }

                visited.insert(pos);
                self.revealed[idx] = true;
                log::trace!("Flood revealed {:?}, adjacent mines: {}", pos, self.board[pos]);

                if self.board[pos] == 0 {
                    queue.push_back(pos);
                }
            }
        }
    }

    fn reveal_all_mines(&mut self) {
        let (width, height) = self.size();
        for y in 0..height {
            for x in 0..width {
                if self.board.is_mine((x, y)) {
                    self.revealed[(x, y).to_nd_index()] = true;
                }
            }
        }
    }

    fn hidden_safe_count(&self) -> usize {
        self.board
            .cells()
            .iter()
            .zip(self.revealed.iter())
            .filter(|&(&cell, &revealed)| !revealed && cell != MINE)
            .count()
    }
}
