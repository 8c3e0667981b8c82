use crate::*;
pub use random::*;

mod random;

pub trait SeedGenerator {
    fn generate(self, config: GameConfig) -> Seed;
}
