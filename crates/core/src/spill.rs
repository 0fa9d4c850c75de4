//! Seeded random flood growth ("spill") used to carve irregular blobs.

use std::collections::BTreeSet;

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};

use crate::geometry::cardinal_neighbors;
use crate::grid::Grid;
use crate::types::Cell;

#[derive(Clone, Debug)]
pub struct Spill {
    grid: Grid,
    seed: u64,
    rng: ChaCha8Rng,
    filled: BTreeSet<Cell>,
}

impl Spill {
    pub fn new(grid: &Grid, seed: u64) -> Self {
        Self {
            grid: grid.clone(),
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            filled: BTreeSet::new(),
        }
    }

    /// Swaps the grid and forgets everything filled so far.
    pub fn initialize(&mut self, grid: &Grid) {
        self.grid = grid.clone();
        self.reset();
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Grows the blob by up to `volume` newly filled cells, starting at
    /// `center` when nothing is filled yet. Each step picks uniformly among
    /// the open, unfilled cells 4-adjacent to the blob. Returns the whole blob
    /// in scan order.
    pub fn start(&mut self, center: Cell, volume: u32, excluded: &[Cell]) -> Vec<Cell> {
        let open = |cell: Cell| self.grid.is_walkable(cell) && !excluded.contains(&cell);
        let mut added = 0u32;
        if volume > 0 && !self.filled.contains(&center) {
            if !open(center) {
                return self.filled();
            }
            self.filled.insert(center);
            added += 1;
        }

        let mut frontier: BTreeSet<Cell> = self
            .filled
            .iter()
            .flat_map(|cell| cardinal_neighbors(*cell))
            .filter(|cell| open(*cell) && !self.filled.contains(cell))
            .collect();
        while added < volume && !frontier.is_empty() {
            let pick = (self.rng.next_u64() % frontier.len() as u64) as usize;
            let Some(&cell) = frontier.iter().nth(pick) else {
                break;
            };
            frontier.remove(&cell);
            self.filled.insert(cell);
            added += 1;
            for next in cardinal_neighbors(cell) {
                if open(next) && !self.filled.contains(&next) {
                    frontier.insert(next);
                }
            }
        }
        self.filled()
    }

    pub fn filled(&self) -> Vec<Cell> {
        self.filled.iter().copied().collect()
    }

    /// Changes the seed and restarts the random stream from it.
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    /// Empties the blob and rewinds the random stream to the current seed.
    pub fn reset(&mut self) {
        self.filled.clear();
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
    }
}
