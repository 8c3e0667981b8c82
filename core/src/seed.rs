use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::{Engine as _, alphabet};
use serde::{Deserialize, Serialize};

use crate::*;

/// Standard alphabet, padded on encode and lenient about padding on decode.
const SEED_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Shareable board description: `{"width":9,"height":9,"mines":[[row,col],...]}`.
///
/// Mine entries are kept exactly as received, so a decoded seed re-encodes to the same
/// payload even when it carries duplicate, negative or out-of-range entries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seed {
    pub width: Coord,
    pub height: Coord,
    pub mines: Vec<[i64; 2]>,
}

/// Wire shape before the board size is checked.
#[derive(Deserialize)]
struct RawSeed {
    width: i64,
    height: i64,
    mines: Vec<[i64; 2]>,
}

impl Seed {
    pub fn encode(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        SEED_ENGINE.encode(json)
    }

    pub fn decode(encoded: &str) -> core::result::Result<Self, SeedError> {
        let json = SEED_ENGINE.decode(encoded.trim())?;
        let raw: RawSeed = serde_json::from_slice(&json)?;
        let side = |value: i64| Coord::try_from(value).ok().filter(|&side| side > 0);
        match (side(raw.width), side(raw.height)) {
            (Some(width), Some(height)) => Ok(Self {
                width,
                height,
                mines: raw.mines,
            }),
            _ => Err(SeedError::InvalidDimension {
                width: raw.width,
                height: raw.height,
            }),
        }
    }

    /// Decodes `encoded`, or falls back to a fresh board of the default preset.
    pub fn decode_or_random(encoded: &str, rng_seed: u64) -> Self {
        match Self::decode(encoded) {
            Ok(seed) => seed,
            Err(err) => {
                log::warn!("Invalid seed, generating a new board: {err}");
                RandomSeedGenerator::new(rng_seed).generate(Preset::default().config())
            }
        }
    }

    pub fn from_board(board: &Board) -> Self {
        let (width, height) = board.size();
        let mut mines = Vec::new();
        for y in 0..height {
            for x in 0..width {
                if board.is_mine((x, y)) {
                    mines.push([y.into(), x.into()]);
                }
            }
        }
        Self {
            width,
            height,
            mines,
        }
    }

    pub fn size(&self) -> Coord2 {
        (self.width, self.height)
    }

    /// Preset matching this seed's dimensions and listed mine count.
    pub fn preset(&self) -> Option<Preset> {
        Preset::detect(self.width, self.height, self.mines.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Seed {
        Seed {
            width: 9,
            height: 9,
            mines: vec![[0, 0], [8, 3], [4, 4]],
        }
    }

    #[test]
    fn encodes_browser_compatible_payload() {
        let seed = Seed {
            width: 2,
            height: 1,
            mines: vec![[0, 1]],
        };

        let encoded = seed.encode();
        let json = SEED_ENGINE.decode(&encoded).unwrap();

        assert_eq!(json, br#"{"width":2,"height":1,"mines":[[0,1]]}"#);
        // btoa('{"width":2,"height":1,"mines":[[0,1]]}')
        assert_eq!(encoded, "eyJ3aWR0aCI6MiwiaGVpZ2h0IjoxLCJtaW5lcyI6W1swLDFdXX0=");
    }

    #[test]
    fn decode_accepts_missing_padding() {
        let decoded = Seed::decode("eyJ3aWR0aCI6MiwiaGVpZ2h0IjoxLCJtaW5lcyI6W1swLDFdXX0").unwrap();
        assert_eq!(decoded.mines, vec![[0, 1]]);
    }

    #[test]
    fn decode_round_trips() {
        let seed = sample();
        assert_eq!(Seed::decode(&seed.encode()).unwrap(), seed);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(Seed::decode("not base64!"), Err(SeedError::Base64(_))));
        let not_json = SEED_ENGINE.encode("hello");
        assert!(matches!(Seed::decode(&not_json), Err(SeedError::Json(_))));
        let missing = SEED_ENGINE.encode(r#"{"width":9,"height":9}"#);
        assert!(matches!(Seed::decode(&missing), Err(SeedError::Json(_))));
        let empty = SEED_ENGINE.encode(r#"{"width":0,"height":9,"mines":[]}"#);
        assert!(matches!(
            Seed::decode(&empty),
            Err(SeedError::InvalidDimension { width: 0, height: 9 })
        ));
    }

    #[test]
    fn oversized_or_negative_sides_are_dimension_errors() {
        for (json, width, height) in [
            (r#"{"width":300,"height":9,"mines":[]}"#, 300, 9),
            (r#"{"width":9,"height":-2,"mines":[]}"#, 9, -2),
        ] {
            let err = Seed::decode(&SEED_ENGINE.encode(json)).unwrap_err();
            let expected = SeedError::InvalidDimension { width, height };
            assert_eq!(err.to_string(), expected.to_string(), "{json}");
        }
    }

    #[test]
    fn bad_mine_entries_do_not_reject_the_seed() {
        let encoded = SEED_ENGINE.encode(r#"{"width":4,"height":4,"mines":[[0,0],[-1,3],[2,9000000000]]}"#);

        let seed = Seed::decode(&encoded).unwrap();
        assert_eq!(seed.mines, vec![[0, 0], [-1, 3], [2, 9_000_000_000]]);
        assert_eq!(Seed::decode(&seed.encode()).unwrap(), seed);

        let board = Board::from_seed(&seed);
        assert_eq!(board.mine_count(), 1);
        assert!(board.is_mine((0, 0)));
    }

    #[test]
    fn invalid_seed_heals_to_beginner_board() {
        let seed = Seed::decode_or_random("%%%", 7);

        assert_eq!(seed.preset(), Some(Preset::Beginner));
        assert_eq!(seed.mines.len(), 10);
    }

    #[test]
    fn duplicates_are_preserved() {
        let seed = Seed {
            width: 3,
            height: 3,
            mines: vec![[1, 1], [1, 1]],
        };

        let decoded = Seed::decode(&seed.encode()).unwrap();

        assert_eq!(decoded.mines.len(), 2);
        assert_eq!(Board::from_seed(&decoded).mine_count(), 1);
    }

    #[test]
    fn from_board_lists_mines_row_major() {
        let board = Board::from_mine_coords((3, 2), &[(2, 0), (0, 1)]).unwrap();
        let seed = Seed::from_board(&board);
        assert_eq!(seed.mines, vec![[0, 2], [1, 0]]);
        assert_eq!(seed.preset(), None);
    }
}
