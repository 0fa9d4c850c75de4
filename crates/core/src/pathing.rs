//! Localized point-to-point search.
//! Waypoint on-ramps and the line tracer's detour both need a cheap route
//! between two nearby cells; this module runs a budgeted A* for them instead
//! of a full cost-field scan.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::geometry::steps;
use crate::types::{Cell, Metric};

#[derive(Clone, Copy, Debug)]
struct OpenNode {
    f: f64,
    h: f64,
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
        self.f
            .total_cmp(&other.f)
            .then_with(|| self.h.total_cmp(&other.h))
            .then_with(|| self.cell.cmp(&other.cell))
    }
}

/// Admissible estimate matching the step costs [`steps`] hands out.
pub fn heuristic(metric: Metric, a: Cell, b: Cell) -> f64 {
    let dx = f64::from(a.x.abs_diff(b.x));
    let dy = f64::from(a.y.abs_diff(b.y));
    match metric {
        Metric::Manhattan => dx + dy,
        Metric::Chebyshev => dx.max(dy),
        Metric::Euclidean => {
            let (long, short) = if dx > dy { (dx, dy) } else { (dy, dx) };
            long - short + short * metric.diagonal_cost()
        }
    }
}

/// A* from `start` to `goal` over cells accepted by `passable`, giving up after
/// `budget` node expansions. The returned path excludes `start` and ends at
/// `goal`; it is empty when `start == goal`. `None` means no route was found
/// within the budget.
pub fn astar<P>(start: Cell, goal: Cell, metric: Metric, budget: usize, passable: P) -> Option<Vec<Cell>>
where
    P: Fn(Cell) -> bool,
{
    if !passable(start) || !passable(goal) {
        return None;
    }
    if start == goal {
        return Some(Vec::new());
    }

    let mut open = BTreeSet::new();
    let mut g_score = BTreeMap::new();
    let mut came_from = BTreeMap::new();
    let h = heuristic(metric, start, goal);
    open.insert(OpenNode { f: h, h, cell: start });
    g_score.insert(start, 0.0);

    let mut expanded = 0usize;
    while let Some(current) = open.pop_first() {
        if current.cell == goal {
            return Some(reconstruct_path(&came_from, start, goal));
        }
        expanded += 1;
        if expanded > budget {
            return None;
        }
        let Some(&cur_g) = g_score.get(&current.cell) else {
            continue;
        };
        for (next, step_cost) in steps(current.cell, metric, &passable) {
            let tentative = cur_g + step_cost;
            if tentative < *g_score.get(&next).unwrap_or(&f64::INFINITY) {
                came_from.insert(next, current.cell);
                g_score.insert(next, tentative);
                let h = heuristic(metric, next, goal);
                open.insert(OpenNode { f: tentative + h, h, cell: next });
            }
        }
    }
    None
}

fn reconstruct_path(came_from: &BTreeMap<Cell, Cell>, start: Cell, goal: Cell) -> Vec<Cell> {
    let mut cell = goal;
    let mut result = vec![cell];
    while let Some(&previous) = came_from.get(&cell) {
        if previous == start {
            break;
        }
        result.push(previous);
        cell = previous;
    }
    result.reverse();
    result
}
