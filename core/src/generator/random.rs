use super::*;

/// Uniformly random layout: Fisher–Yates over every position, first `mines` positions win.
///
/// There is no first-click protection, every `C(cells, mines)` layout is equally likely.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomSeedGenerator {
    seed: u64,
}

impl RandomSeedGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl SeedGenerator for RandomSeedGenerator {
    fn generate(self, config: GameConfig) -> Seed {
        use rand::prelude::*;

        let (width, height) = config.size;
        let total_cells = config.total_cells();

        let mines = if config.mines > total_cells {
            log::warn!(
                "Minefield already full, requested {} but only fits {}",
                config.mines,
                total_cells
            );
            total_cells
        } else {
            config.mines
        };

        let mut positions: Vec<[i64; 2]> = (0..height)
            .flat_map(|row| (0..width).map(move |col| [i64::from(row), i64::from(col)]))
            .collect();

        let mut rng = SmallRng::seed_from_u64(self.seed);
        for i in (1..positions.len()).rev() {
            let j = rng.random_range(0..=i);
            positions.swap(i, j);
        }
        positions.truncate(mines.into());

        log::debug!(
            "Generated {}x{} layout with {} mines from seed {}",
            width,
            height,
            positions.len(),
            self.seed
        );
        Seed {
            width,
            height,
            mines: positions,
        }
    }
}
