//! Blue-noise point selection by dart throwing.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::Rng;

use crate::types::{Cell, Metric};

/// Shuffles `cells` and keeps each one that sits at least `spacing` away
/// (Euclidean) from every cell kept before it.
pub fn poisson_disk(cells: &[Cell], spacing: f64, rng: &mut ChaCha8Rng) -> Vec<Cell> {
    let mut candidates = cells.to_vec();
    for i in (1..candidates.len()).rev() {
        let j = (rng.next_u64() % (i as u64 + 1)) as usize;
        candidates.swap(i, j);
    }

    let mut accepted: Vec<Cell> = Vec::new();
    for cell in candidates {
        if accepted.iter().all(|kept| Metric::Euclidean.distance(*kept, cell) >= spacing) {
            accepted.push(cell);
        }
    }
    accepted
}
