use ndarray::Array2;

/// Board axis: width, height, or a position along either.
pub type Coord = u8;

/// Mine and cell counts.
pub type CellCount = u16;

/// `(x, y)`: column, then row.
pub type Coord2 = (Coord, Coord);

/// Maps `(x, y)` onto the row-major index `[y, x]` used by every board grid.
pub trait ToNdIndex {
    fn to_nd_index(self) -> [usize; 2];
}

impl ToNdIndex for Coord2 {
    fn to_nd_index(self) -> [usize; 2] {
        [self.1.into(), self.0.into()]
    }
}

/// Number of cells on a `width × height` board.
pub const fn mult(width: Coord, height: Coord) -> CellCount {
    (width as CellCount).saturating_mul(height as CellCount)
}

/// Board size `(width, height)` of a row-major grid.
pub fn grid_size<T>(grid: &Array2<T>) -> Coord2 {
    let (rows, cols) = grid.dim();
    (
        cols.try_into().unwrap_or(Coord::MAX),
        rows.try_into().unwrap_or(Coord::MAX),
    )
}

pub trait NeighborsExt {
    fn neighbors(&self, center: Coord2) -> NeighborIter;
}

impl<T> NeighborsExt for Array2<T> {
    fn neighbors(&self, center: Coord2) -> NeighborIter {
        NeighborIter::new(center, grid_size(self))
    }
}

/// Walks the 3×3 window around `center`, clipped to the board, row by row and skipping the
/// center itself. A center outside the board has no neighbors.
#[derive(Clone, Debug)]
pub struct NeighborIter {
    center: Coord2,
    min: Coord2,
    max: Coord2,
    cursor: Option<Coord2>,
}

impl NeighborIter {
    pub fn new(center: Coord2, (width, height): Coord2) -> Self {
        let (x, y) = center;
        let min = (x.saturating_sub(1), y.saturating_sub(1));
        let max = (
            x.saturating_add(1).min(width.saturating_sub(1)),
            y.saturating_add(1).min(height.saturating_sub(1)),
        );
        let inside = x < width && y < height;

        Self {
            center,
            min,
            max,
            cursor: inside.then_some(min),
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let current = self.cursor?;
            self.cursor = if current.0 < self.max.0 {
                Some((current.0 + 1, current.1))
            } else if current.1 < self.max.1 {
                Some((self.min.0, current.1 + 1))
            } else {
                None
            };

            if current != self.center {
                return Some(current);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_has_three_neighbors() {
        let neighbors: Vec<_> = NeighborIter::new((0, 0), (9, 9)).collect();
        assert_eq!(neighbors, vec![(1, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn interior_neighbors_in_row_order() {
        let neighbors: Vec<_> = NeighborIter::new((4, 4), (9, 9)).collect();
        assert_eq!(
            neighbors,
            vec![(3, 3), (4, 3), (5, 3), (3, 4), (5, 4), (3, 5), (4, 5), (5, 5)]
        );
    }

    #[test]
    fn edge_has_five_neighbors() {
        assert_eq!(NeighborIter::new((4, 0), (9, 9)).count(), 5);
        assert_eq!(NeighborIter::new((29, 7), (30, 16)).count(), 5);
        assert_eq!(NeighborIter::new((254, 254), (255, 255)).count(), 3);
    }

    #[test]
    fn degenerate_boards() {
        assert_eq!(NeighborIter::new((0, 0), (1, 1)).count(), 0);
        assert_eq!(NeighborIter::new((9, 0), (9, 9)).count(), 0);
        assert_eq!(NeighborIter::new((0, 0), (0, 0)).count(), 0);
    }

    #[test]
    fn nd_index_is_row_major() {
        let grid: Array2<u8> = Array2::zeros((16, 30));
        assert_eq!(grid_size(&grid), (30, 16));
        assert_eq!((29, 15).to_nd_index(), [15, 29]);
    }
}
