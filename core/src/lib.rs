use core::ops::{BitOr, Index};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use engine::*;
pub use error::*;
pub use generator::*;
pub use preset::*;
pub use seed::*;
pub use types::*;

pub mod econ;

mod engine;
mod error;
mod generator;
mod preset;
mod seed;
mod types;

/// Cell value marking a mine on a [`Board`].
pub const MINE: i8 = -1;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    /// Builds a config with at least one cell and no more mines than cells.
    pub fn new((width, height): Coord2, mines: CellCount) -> Self {
        let size = (width.max(1), height.max(1));
        Self::new_unchecked(size, mines.min(mult(size.0, size.1)))
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }
}

/// Counts mines among the up-to-8 neighbors of `coords`; off-grid neighbors count as 0.
pub fn count_adjacent_mines(cells: &Array2<i8>, coords: Coord2) -> u8 {
    cells
        .neighbors(coords)
        .filter(|&pos| cells[pos.to_nd_index()] == MINE)
        .count()
        .try_into()
        .unwrap_or(u8::MAX)
}

/// Mine layout with every safe cell holding its adjacency count.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    cells: Array2<i8>,
}

impl Board {
    pub fn empty((width, height): Coord2) -> Self {
        Self {
            cells: Array2::zeros((usize::from(height), usize::from(width))),
        }
    }

    pub fn from_seed(seed: &Seed) -> Self {
        let mut board = Self::empty((seed.width, seed.height));

        for &[row, col] in &seed.mines {
            match board.seed_coords(row, col) {
                Some(coords) => board.cells[coords.to_nd_index()] = MINE,
                None => log::debug!("Ignoring out-of-range seed mine at [{row}, {col}]"),
            }
        }

        board.recount();
        board
    }

    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut board = Self::empty(size);

        for &coords in mine_coords {
            let coords = board.validate_coords(coords)?;
            board.cells[coords.to_nd_index()] = MINE;
        }

        board.recount();
        Ok(board)
    }

    /// Builds a board from row-major values, where any negative value is a mine.
    pub fn from_rows(rows: &[Vec<i8>]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if height == 0
            || width == 0
            || height > usize::from(Coord::MAX)
            || width > usize::from(Coord::MAX)
            || rows.iter().any(|row| row.len() != width)
        {
            return Err(GameError::InvalidBoardShape);
        }

        let cells = Array2::from_shape_fn((height, width), |(y, x)| {
            if rows[y][x] < 0 { MINE } else { 0 }
        });
        let mut board = Self { cells };
        board.recount();
        Ok(board)
    }

    fn seed_coords(&self, row: i64, col: i64) -> Option<Coord2> {
        let coords = (Coord::try_from(col).ok()?, Coord::try_from(row).ok()?);
        self.validate_coords(coords).ok()
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn size(&self) -> Coord2 {
        grid_size(&self.cells)
    }

    pub fn total_cells(&self) -> CellCount {
        self.cells.len().try_into().unwrap_or(CellCount::MAX)
    }

    /// Distinct mines currently on the board.
    pub fn mine_count(&self) -> CellCount {
        self.cells
            .iter()
            .filter(|&&cell| cell == MINE)
            .count()
            .try_into()
            .unwrap_or(CellCount::MAX)
    }

    /// Cell value, or `None` off the board.
    pub fn cell(&self, coords: Coord2) -> Option<i8> {
        self.cells.get(coords.to_nd_index()).copied()
    }

    pub fn is_mine(&self, coords: Coord2) -> bool {
        self.cell(coords) == Some(MINE)
    }

    pub fn cells(&self) -> &Array2<i8> {
        &self.cells
    }

    pub fn rows(&self) -> Vec<Vec<i8>> {
        self.cells.rows().into_iter().map(|row| row.to_vec()).collect()
    }

    /// Places or clears a single mine; the caller is expected to [`Board::recount`] afterwards.
    pub fn set_mine(&mut self, coords: Coord2, mine: bool) -> Result<()> {
        let coords = self.validate_coords(coords)?;
        self.cells[coords.to_nd_index()] = if mine { MINE } else { 0 };
        Ok(())
    }

    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// Recomputes the adjacency count of every safe cell.
    pub fn recount(&mut self) {
        let (width, height) = self.size();
        for y in 0..height {
            for x in 0..width {
                let coords = (x, y);
                if self.cells[coords.to_nd_index()] != MINE {
                    let count = count_adjacent_mines(&self.cells, coords);
                    self.cells[coords.to_nd_index()] = count as i8;
                }
            }
        }
    }

    pub(crate) fn neighbors(&self, coords: Coord2) -> NeighborIter {
        self.cells.neighbors(coords)
    }
}

impl Index<Coord2> for Board {
    type Output = i8;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[coords.to_nd_index()]
    }
}

/// Result of a flag or edit toggle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        matches!(self, Self::Changed)
    }
}

/// Result of a reveal, ordered by how much it matters to the host.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    Won,
    HitMine,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

/// Merging keeps the most significant outcome, so a batch of reveals reports a loss over a win.
impl BitOr for RevealOutcome {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.max(rhs)
    }
}
