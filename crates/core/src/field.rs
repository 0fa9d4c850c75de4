//! Weighted flood-fill cost field ("Dijkstra map").
//!
//! A `CostField` holds a physical map (the per-cell base state: wall or
//! open floor), a set of goals and the gradient produced by the last scan: the
//! cheapest movement cost from each cell to its nearest goal. The same
//! instance is reused across many logically separate scans, so callers
//! borrow it through [`CostField::scope`], whose guard clears goals, undoes
//! physical overlays and resets the gradient on every exit path.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::ops::{Deref, DerefMut};

use crate::geometry::steps;
use crate::grid::Grid;
use crate::types::{Cell, Metric};

pub const GOAL: f64 = 0.0;
/// Open floor that no scan has reached.
pub const FLOOR: f64 = 999_200.0;
pub const WALL: f64 = 999_500.0;
/// Cells deliberately hidden from a result, such as an AOE's own origin.
pub const DARK: f64 = 999_800.0;

#[derive(Clone, Copy, Debug)]
struct OpenNode {
    cost: f64,
    cell: Cell,
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost.total_cmp(&other.cost).then_with(|| self.cell.cmp(&other.cell))
    }
}

#[derive(Clone, Debug)]
pub struct CostField {
    width: usize,
    height: usize,
    metric: Metric,
    base: Vec<f64>,
    physical: Vec<f64>,
    gradient: Vec<f64>,
    goals: BTreeSet<Cell>,
}

impl CostField {
    pub fn new(grid: &Grid, metric: Metric) -> Self {
        let mut field = Self {
            width: 0,
            height: 0,
            metric,
            base: Vec::new(),
            physical: Vec::new(),
            gradient: Vec::new(),
            goals: BTreeSet::new(),
        };
        field.initialize(grid);
        field
    }

    /// Rebuilds every map from `grid`, dropping goals and overlays.
    pub fn initialize(&mut self, grid: &Grid) {
        self.width = grid.width();
        self.height = grid.height();
        self.base =
            grid.cells().map(|cell| if grid.is_walkable(cell) { FLOOR } else { WALL }).collect();
        self.physical = self.base.clone();
        self.gradient = self.base.clone();
        self.goals.clear();
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Borrows the field for one logical scan; see [`ScanScope`].
    pub fn scope(&mut self) -> ScanScope<'_> {
        ScanScope { field: self }
    }

    pub fn index_of(&self, cell: Cell) -> Option<usize> {
        let in_bounds = cell.x >= 0
            && cell.y >= 0
            && (cell.x as usize) < self.width
            && (cell.y as usize) < self.height;
        in_bounds.then(|| (cell.y as usize) * self.width + (cell.x as usize))
    }

    /// Goals on walls or off the grid are ignored.
    pub fn set_goal(&mut self, cell: Cell) {
        let Some(idx) = self.index_of(cell) else {
            return;
        };
        if self.physical[idx] >= WALL {
            return;
        }
        self.goals.insert(cell);
        self.gradient[idx] = GOAL;
    }

    pub fn goals(&self) -> &BTreeSet<Cell> {
        &self.goals
    }

    pub fn clear_goals(&mut self) {
        self.goals.clear();
    }

    /// Gradient back to the physical map; goals are kept.
    pub fn reset_map(&mut self) {
        self.gradient.clone_from(&self.physical);
        for goal in &self.goals {
            let idx = (goal.y as usize) * self.width + (goal.x as usize);
            self.gradient[idx] = GOAL;
        }
    }

    pub fn physical_map(&self) -> &[f64] {
        &self.physical
    }

    /// Marks a cell impassable until [`CostField::restore_physical`].
    pub fn block(&mut self, cell: Cell) {
        if let Some(idx) = self.index_of(cell) {
            self.physical[idx] = WALL;
            self.gradient[idx] = WALL;
            self.goals.remove(&cell);
        }
    }

    pub fn restore_physical(&mut self) {
        self.physical.clone_from(&self.base);
    }

    pub fn gradient(&self) -> &[f64] {
        &self.gradient
    }

    /// Gradient value at `cell`; off-grid cells read as [`WALL`].
    pub fn value_at(&self, cell: Cell) -> f64 {
        self.index_of(cell).map_or(WALL, |idx| self.gradient[idx])
    }

    /// Whether the last scan reached `cell` with a finite cost.
    pub fn is_reached(&self, cell: Cell) -> bool {
        self.value_at(cell) < FLOOR
    }

    /// Full scan: every open cell connected to a goal receives its cost.
    pub fn scan(&mut self, excluded: &[Cell]) -> &[f64] {
        self.run(f64::INFINITY, excluded);
        &self.gradient
    }

    /// Scan that stops expanding once costs exceed `limit`; farther cells keep
    /// their [`FLOOR`] value.
    pub fn partial_scan(&mut self, limit: f64, excluded: &[Cell]) -> &[f64] {
        self.run(limit, excluded);
        &self.gradient
    }

    fn run(&mut self, limit: f64, excluded: &[Cell]) {
        self.reset_map();
        let blocked: BTreeSet<Cell> =
            excluded.iter().copied().filter(|cell| !self.goals.contains(cell)).collect();

        let mut open = BTreeSet::new();
        for goal in &self.goals {
            open.insert(OpenNode { cost: GOAL, cell: *goal });
        }

        while let Some(current) = open.pop_first() {
            let Some(idx) = self.index_of(current.cell) else {
                continue;
            };
            if current.cost > self.gradient[idx] {
                continue;
            }
            let passable = |cell: Cell| {
                self.index_of(cell).is_some_and(|i| self.physical[i] < WALL)
                    && !blocked.contains(&cell)
            };
            for (next, step_cost) in steps(current.cell, self.metric, passable) {
                let cost = current.cost + step_cost;
                if cost > limit {
                    continue;
                }
                let Some(next_idx) = self.index_of(next) else {
                    continue;
                };
                if cost < self.gradient[next_idx] {
                    self.gradient[next_idx] = cost;
                    open.insert(OpenNode { cost, cell: next });
                }
            }
        }
    }

    /// Steepest descent from `start` down to a goal, `start` first and the goal
    /// last. Empty when `start` was not reached by the last scan.
    pub fn descend_from(&self, start: Cell) -> Vec<Cell> {
        if !self.is_reached(start) {
            return Vec::new();
        }
        let mut path = vec![start];
        let mut current = start;
        while self.value_at(current) > GOAL {
            let here = self.value_at(current);
            let passable = |cell: Cell| self.is_reached(cell);
            let next = steps(current, self.metric, passable)
                .into_iter()
                .map(|(cell, _)| cell)
                .filter(|cell| self.value_at(*cell) < here)
                .min_by(|a, b| self.value_at(*a).total_cmp(&self.value_at(*b)));
            let Some(next) = next else {
                break;
            };
            path.push(next);
            current = next;
        }
        path
    }

    /// Cells with a finite gradient, in scan order, paired with their cost.
    pub fn reached(&self) -> impl Iterator<Item = (Cell, f64)> + '_ {
        self.gradient.iter().enumerate().filter(|(_, value)| **value < FLOOR).map(|(idx, value)| {
            (Cell::new((idx % self.width) as i32, (idx / self.width) as i32), *value)
        })
    }
}

/// Exclusive borrow of a [`CostField`] for one logical scan. Dropping the
/// scope clears goals, restores the physical map and resets the gradient, so
/// no goal or overlay leaks into the next scan.
pub struct ScanScope<'a> {
    field: &'a mut CostField,
}

impl Deref for ScanScope<'_> {
    type Target = CostField;

    fn deref(&self) -> &CostField {
        self.field
    }
}

impl DerefMut for ScanScope<'_> {
    fn deref_mut(&mut self) -> &mut CostField {
        self.field
    }
}

impl Drop for ScanScope<'_> {
    fn drop(&mut self) {
        self.field.clear_goals();
        self.field.restore_physical();
        self.field.reset_map();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::walled_column_grid;

    #[test]
    fn scan_measures_cost_around_walls() {
        let grid = walled_column_grid();
        let mut field = CostField::new(&grid, Metric::Manhattan);
        let mut scope = field.scope();
        scope.set_goal(Cell::new(0, 0));
        scope.scan(&[]);
        assert_eq!(scope.value_at(Cell::new(0, 0)), GOAL);
        assert_eq!(scope.value_at(Cell::new(1, 0)), 1.0);
        assert_eq!(scope.value_at(Cell::new(2, 0)), WALL);
        // Down four rows, across three columns and back up four rows.
        assert_eq!(scope.value_at(Cell::new(3, 0)), 11.0);
    }

    #[test]
    fn partial_scan_leaves_far_cells_unreached() {
        let grid = Grid::open(8, 1);
        let mut field = CostField::new(&grid, Metric::Chebyshev);
        let mut scope = field.scope();
        scope.set_goal(Cell::new(0, 0));
        scope.partial_scan(3.0, &[]);
        assert!(scope.is_reached(Cell::new(3, 0)));
        assert_eq!(scope.value_at(Cell::new(4, 0)), FLOOR);
    }

    #[test]
    fn excluded_cells_block_the_scan() {
        let grid = Grid::open(5, 1);
        let mut field = CostField::new(&grid, Metric::Chebyshev);
        let mut scope = field.scope();
        scope.set_goal(Cell::new(0, 0));
        scope.scan(&[Cell::new(2, 0)]);
        assert!(scope.is_reached(Cell::new(1, 0)));
        assert!(!scope.is_reached(Cell::new(3, 0)));
    }

    #[test]
    fn dropping_a_scope_releases_goals_and_overlays() {
        let grid = Grid::open(4, 4);
        let mut field = CostField::new(&grid, Metric::Euclidean);
        {
            let mut scope = field.scope();
            scope.block(Cell::new(1, 1));
            scope.set_goal(Cell::new(0, 0));
            scope.scan(&[]);
            assert_eq!(scope.value_at(Cell::new(1, 1)), WALL);
        }
        assert!(field.goals().is_empty());
        assert_eq!(field.value_at(Cell::new(1, 1)), FLOOR);
        assert_eq!(field.value_at(Cell::new(0, 0)), FLOOR);
    }

    #[test]
    fn descent_walks_downhill_to_the_goal() {
        let grid = walled_column_grid();
        let mut field = CostField::new(&grid, Metric::Chebyshev);
        let mut scope = field.scope();
        scope.set_goal(Cell::new(0, 2));
        scope.scan(&[]);
        let path = scope.descend_from(Cell::new(4, 2));
        assert_eq!(path.first(), Some(&Cell::new(4, 2)));
        assert_eq!(path.last(), Some(&Cell::new(0, 2)));
        assert!(path.contains(&Cell::new(2, 4)), "only the gap at row 4 crosses the wall");
        for pair in path.windows(2) {
            assert!(scope.value_at(pair[1]) < scope.value_at(pair[0]));
        }
    }
}
