//! Phase one of the waypoint pathfinder: choosing graph nodes.

use std::collections::BTreeSet;

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;
use tracing::{trace, warn};

use crate::config::ChokepointStrategy;
use crate::field::CostField;
use crate::geometry::{CARDINALS, DIAGONALS, cardinal_neighbors};
use crate::grid::Grid;
use crate::sampling::poisson_disk;
use crate::types::{Cell, Metric, Tile};

/// Chokepoints for `grid` in scan order.
pub(super) fn discover(grid: &Grid, metric: Metric, strategy: &ChokepointStrategy) -> Vec<Cell> {
    match *strategy {
        ChokepointStrategy::FloodExpansion { center_spacing, seed } => {
            flood_expansion(grid, metric, center_spacing, seed)
        }
        ChokepointStrategy::ThickCorridor { thickness, min_separation } => {
            thick_corridor(grid, thickness, min_separation)
        }
        ChokepointStrategy::Fraction { every } => fraction(grid, every),
    }
}

fn eight_neighbors(cell: Cell) -> impl Iterator<Item = Cell> {
    CARDINALS.into_iter().chain(DIAGONALS).map(move |(dx, dy)| cell.offset(dx, dy))
}

/// Wall clumps this small that do not touch the grid edge count as clutter.
const CLUTTER_LIMIT: usize = 2;

/// Clears wall clutter: small 8-connected wall clumps standing free of every
/// other wall become floor. Door frames and wall runs are kept.
pub(super) fn simplify(grid: &Grid) -> Grid {
    let mut simplified = grid.clone();
    let mut seen = vec![false; grid.len()];
    for start in grid.cells() {
        let Some(idx) = grid.index_of(start) else {
            continue;
        };
        if seen[idx] || grid.is_walkable(start) {
            continue;
        }
        seen[idx] = true;
        let mut clump = vec![start];
        let mut stack = vec![start];
        let mut anchored = false;
        while let Some(cell) = stack.pop() {
            for next in eight_neighbors(cell) {
                match grid.index_of(next) {
                    None => anchored = true,
                    Some(next_idx) if !seen[next_idx] && !grid.is_walkable(next) => {
                        seen[next_idx] = true;
                        clump.push(next);
                        stack.push(next);
                    }
                    Some(_) => {}
                }
            }
        }
        if !anchored && clump.len() <= CLUTTER_LIMIT {
            for cell in clump {
                simplified.set_tile(cell, Tile::Floor);
            }
        }
    }
    simplified
}

fn flood_expansion(grid: &Grid, metric: Metric, spacing: f64, seed: u64) -> Vec<Cell> {
    let simplified = simplify(grid);
    let walkable: Vec<Cell> = simplified.walkable_cells().collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let centers = poisson_disk(&walkable, spacing, &mut rng);
    if centers.is_empty() {
        return Vec::new();
    }
    trace!(centers = centers.len(), "room centers sampled");

    let mut passes = vec![0u32; simplified.len()];
    let mut field = CostField::new(&simplified, metric);
    for center in &centers {
        let mut scope = field.scope();
        scope.set_goal(*center);
        scope.scan(&[]);

        let pinched: BTreeSet<Cell> = scope
            .reached()
            .map(|(cell, _)| cell)
            .filter(|cell| is_pinched(&simplified, &scope, *cell))
            .collect();
        for (idx, pass) in passes.iter_mut().enumerate() {
            let cell = simplified.cell_at(idx);
            let crossed = pinched.contains(&cell)
                || cardinal_neighbors(cell).iter().any(|next| pinched.contains(next));
            if crossed && simplified.is_walkable(cell) {
                *pass += 1;
            }
        }
    }

    let score = |cell: Cell| {
        simplified.index_of(cell).map_or(0.0, |idx| f64::from(passes[idx]) / centers.len() as f64)
    };
    let mut chokepoints: Vec<Cell> = Vec::new();
    let mut taken = BTreeSet::new();
    for cell in grid.walkable_cells() {
        if score(cell) <= 0.0 {
            continue;
        }
        if cardinal_neighbors(cell).iter().any(|next| taken.contains(next)) {
            continue;
        }
        let rising = CARDINALS
            .iter()
            .any(|(dx, dy)| score(cell.offset(*dx, *dy)) > score(cell.offset(-dx, -dy)));
        if rising {
            taken.insert(cell);
            chokepoints.push(cell);
        }
    }
    chokepoints
}

/// A reached cell is pinched when the wavefront enters it through a one-cell
/// gap: both sides perpendicular to its direction of travel are blocked.
fn is_pinched(grid: &Grid, field: &CostField, cell: Cell) -> bool {
    let here = field.value_at(cell);
    let downhill = CARDINALS
        .iter()
        .map(|(dx, dy)| (*dx, *dy))
        .filter(|(dx, dy)| field.value_at(cell.offset(*dx, *dy)) < here)
        .min_by(|a, b| {
            field.value_at(cell.offset(a.0, a.1)).total_cmp(&field.value_at(cell.offset(b.0, b.1)))
        });
    let Some((dx, dy)) = downhill else {
        return false;
    };
    !grid.is_walkable(cell.offset(dy, dx)) && !grid.is_walkable(cell.offset(-dy, -dx))
}

fn thick_corridor(grid: &Grid, thickness: u32, min_separation: u32) -> Vec<Cell> {
    let floor: Vec<bool> = grid.cells().map(|cell| grid.is_walkable(cell)).collect();
    let at = |mask: &[bool], cell: Cell| grid.index_of(cell).is_some_and(|idx| mask[idx]);

    let mut rooms = floor.clone();
    for _ in 0..thickness {
        rooms = grid
            .cells()
            .map(|cell| at(&rooms, cell) && eight_neighbors(cell).all(|next| at(&rooms, next)))
            .collect();
    }
    for _ in 0..thickness {
        rooms = grid
            .cells()
            .map(|cell| {
                at(&floor, cell)
                    && (at(&rooms, cell) || eight_neighbors(cell).any(|next| at(&rooms, next)))
            })
            .collect();
    }
    let corridor: Vec<bool> = floor.iter().zip(&rooms).map(|(open, room)| *open && !*room).collect();

    let mut chokepoints: Vec<Cell> = Vec::new();
    for cell in grid.cells() {
        if !at(&rooms, cell) || !cardinal_neighbors(cell).iter().any(|next| at(&corridor, *next)) {
            continue;
        }
        let separated = chokepoints
            .iter()
            .all(|kept| Metric::Chebyshev.distance(*kept, cell) >= f64::from(min_separation));
        if separated {
            chokepoints.push(cell);
        }
    }
    chokepoints
}

fn fraction(grid: &Grid, every: usize) -> Vec<Cell> {
    if every == 0 {
        warn!("fractional sampling needs a positive stride; no chokepoints chosen");
        return Vec::new();
    }
    grid.walkable_cells().enumerate().filter(|(idx, _)| idx % every == 0).map(|(_, cell)| cell).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::two_rooms_grid;

    #[test]
    fn simplify_strips_small_clutter_only() {
        let mut grid = Grid::open(9, 9);
        grid.set_tile(Cell::new(1, 1), Tile::Wall);
        grid.set_tile(Cell::new(6, 1), Tile::Wall);
        grid.set_tile(Cell::new(7, 2), Tile::Wall);
        for x in 2..5 {
            grid.set_tile(Cell::new(x, 5), Tile::Wall);
        }
        grid.set_tile(Cell::new(8, 7), Tile::Wall);
        let simplified = simplify(&grid);
        assert!(simplified.is_walkable(Cell::new(1, 1)));
        assert!(simplified.is_walkable(Cell::new(6, 1)));
        assert!(simplified.is_walkable(Cell::new(7, 2)));
        assert!(!simplified.is_walkable(Cell::new(3, 5)), "three-cell runs are structure");
        assert!(!simplified.is_walkable(Cell::new(8, 7)), "walls on the edge are kept");
    }

    #[test]
    fn simplify_keeps_door_frames() {
        let grid = two_rooms_grid();
        assert_eq!(simplify(&grid), grid);
    }

    #[test]
    fn flood_expansion_flanks_the_doorway() {
        let grid = two_rooms_grid();
        let chokepoints = flood_expansion(&grid, Metric::Manhattan, 3.0, 9);
        assert!(chokepoints.contains(&Cell::new(5, 3)));
        assert!(chokepoints.contains(&Cell::new(7, 3)));
        assert!(!chokepoints.contains(&Cell::new(6, 3)), "the doorway itself neighbours a chokepoint");
    }

    #[test]
    fn open_floor_has_no_flood_chokepoints() {
        let grid = Grid::open(12, 12);
        assert!(flood_expansion(&grid, Metric::Euclidean, 4.0, 1).is_empty());
    }

    #[test]
    fn thick_corridor_marks_room_mouths() {
        let grid = two_rooms_grid();
        assert_eq!(thick_corridor(&grid, 1, 2), vec![Cell::new(5, 3), Cell::new(7, 3)]);
        assert_eq!(thick_corridor(&grid, 1, 3), vec![Cell::new(5, 3)]);
    }

    #[test]
    fn fraction_takes_every_nth_walkable_cell() {
        let grid = Grid::open(10, 3);
        assert_eq!(fraction(&grid, 29), vec![Cell::new(0, 0), Cell::new(9, 2)]);
        assert!(fraction(&Grid::open(0, 0), 29).is_empty());
        assert!(fraction(&grid, 0).is_empty());
    }
}
