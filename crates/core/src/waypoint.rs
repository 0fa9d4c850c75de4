//! Chokepoint waypoint pathfinding.
//!
//! Construction picks chokepoints (phase one, see `chokepoint`) and caches the
//! cheapest path between every pair of them that can reach each other (phase
//! two). Queries then only search locally: a short bounded A* "on-ramp" from
//! the caller onto a cached long-haul path.

mod chokepoint;

use std::collections::{BTreeMap, BTreeSet};
use std::hash::Hasher;

use serde::Serialize;
use tracing::{debug, trace};
use xxhash_rust::xxh3::Xxh3;

use crate::config::WaypointConfig;
use crate::field::CostField;
use crate::grid::Grid;
use crate::pathing::astar;
use crate::types::{Cell, Metric};

/// Cached route between two chokepoints, stored once per unordered pair.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Edge {
    pub from: Cell,
    pub to: Cell,
    /// `from` first, `to` last, cost strictly rising along the way.
    pub path: Vec<Cell>,
    pub cost: f64,
}

#[derive(Clone, Debug)]
pub struct WaypointPathfinder {
    grid: Grid,
    metric: Metric,
    config: WaypointConfig,
    chokepoints: Vec<Cell>,
    edges: BTreeMap<(Cell, Cell), Edge>,
}

impl WaypointPathfinder {
    /// Runs both precompute phases over `grid`.
    pub fn new(grid: &Grid, metric: Metric, config: WaypointConfig) -> Self {
        let mut chokepoints = chokepoint::discover(grid, metric, &config.strategy);
        chokepoints.sort();
        chokepoints.dedup();
        debug!(chokepoints = chokepoints.len(), strategy = ?config.strategy, "chokepoints discovered");

        let edges = build_edges(grid, metric, &chokepoints);
        debug!(edges = edges.len(), "waypoint graph built");

        Self { grid: grid.clone(), metric, config, chokepoints, edges }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn config(&self) -> &WaypointConfig {
        &self.config
    }

    /// Graph nodes in scan order.
    pub fn chokepoints(&self) -> &[Cell] {
        &self.chokepoints
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// The stored edge joining `a` and `b`, in whichever direction it was recorded.
    pub fn edge_between(&self, a: Cell, b: Cell) -> Option<&Edge> {
        self.edges.get(&(a, b)).or_else(|| self.edges.get(&(b, a)))
    }

    /// Route from `from` toward `approximate_target` along the cached graph.
    /// The route leaves `from` out and ends at the chokepoint nearest the
    /// target that the graph links to; empty when no cached route applies.
    pub fn get_known_path(&self, from: Cell, approximate_target: Cell) -> Vec<Cell> {
        let Some(target) = self.grid.nearest_walkable(approximate_target) else {
            return Vec::new();
        };
        let Some(&start) = self.nearest_chokepoints(from, 1).first() else {
            return Vec::new();
        };

        let mut best: Option<(f64, Vec<Cell>)> = None;
        for candidate in self.nearest_chokepoints(target, self.config.nearest_candidates) {
            let path = if let Some(edge) = self.edges.get(&(start, candidate)) {
                (edge.cost, edge.path.clone())
            } else if let Some(edge) = self.edges.get(&(candidate, start)) {
                (edge.cost, edge.path.iter().rev().copied().collect())
            } else {
                continue;
            };
            if best.as_ref().is_none_or(|(cost, _)| path.0 < *cost) {
                best = Some(path);
            }
        }
        let Some((_, long_haul)) = best else {
            trace!(?from, ?target, "no cached edge toward target");
            return Vec::new();
        };
        let Some(&join) = long_haul.first() else {
            return Vec::new();
        };

        let Some(mut route) = self.on_ramp(from, join) else {
            trace!(?from, ?join, "no on-ramp onto cached path");
            return Vec::new();
        };
        route.pop();
        route.extend(long_haul);
        if route.first() == Some(&from) {
            route.remove(0);
        }
        route
    }

    /// Short detour from `position` back onto `path`, followed by the rest of
    /// `path` past the rejoin cell. Empty when `path` is empty or unreachable.
    pub fn go_back_to_path(&self, position: Cell, path: &[Cell]) -> Vec<Cell> {
        let mut nearest: Option<(usize, f64)> = None;
        for (idx, cell) in path.iter().enumerate() {
            let distance = self.metric.distance(position, *cell);
            if nearest.is_none_or(|(_, best)| distance < best) {
                nearest = Some((idx, distance));
            }
        }
        let Some((idx, _)) = nearest else {
            return Vec::new();
        };
        let Some(mut route) = self.on_ramp(position, path[idx]) else {
            trace!(?position, rejoin = ?path[idx], "cannot return to path");
            return Vec::new();
        };
        route.extend_from_slice(&path[idx + 1..]);
        route
    }

    /// Digest of the chokepoints and edges; equal graphs hash equal.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_usize(self.chokepoints.len());
        for cell in &self.chokepoints {
            hasher.write_i32(cell.x);
            hasher.write_i32(cell.y);
        }
        hasher.write_usize(self.edges.len());
        for edge in self.edges.values() {
            hasher.write_i32(edge.from.x);
            hasher.write_i32(edge.from.y);
            hasher.write_i32(edge.to.x);
            hasher.write_i32(edge.to.y);
            hasher.write_u64(edge.cost.to_bits());
            hasher.write_usize(edge.path.len());
            for cell in &edge.path {
                hasher.write_i32(cell.x);
                hasher.write_i32(cell.y);
            }
        }
        hasher.finish()
    }

    /// Up to `count` chokepoints closest to `cell`, nearest first.
    fn nearest_chokepoints(&self, cell: Cell, count: usize) -> Vec<Cell> {
        let mut ranked: Vec<(f64, Cell)> =
            self.chokepoints.iter().map(|node| (self.metric.distance(cell, *node), *node)).collect();
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        ranked.into_iter().take(count).map(|(_, node)| node).collect()
    }

    /// Bounded A* from `from` to `to`; excludes `from`, ends at `to`.
    fn on_ramp(&self, from: Cell, to: Cell) -> Option<Vec<Cell>> {
        astar(from, to, self.metric, self.config.on_ramp_budget, |cell| self.grid.is_walkable(cell))
    }
}

fn build_edges(grid: &Grid, metric: Metric, chokepoints: &[Cell]) -> BTreeMap<(Cell, Cell), Edge> {
    let mut edges = BTreeMap::new();
    let mut field = CostField::new(grid, metric);
    let mut remaining: BTreeSet<Cell> = chokepoints.iter().copied().collect();
    for &from in chokepoints {
        remaining.remove(&from);
        if remaining.is_empty() {
            break;
        }
        let mut scope = field.scope();
        scope.set_goal(from);
        scope.scan(&[]);
        for &to in &remaining {
            if !scope.is_reached(to) {
                continue;
            }
            let mut path = scope.descend_from(to);
            path.reverse();
            edges.insert((from, to), Edge { from, to, path, cost: scope.value_at(to) });
        }
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChokepointStrategy;
    use crate::test_support::{corridor_grid, two_rooms_grid};
    use crate::types::Tile;

    fn corridor_config() -> WaypointConfig {
        WaypointConfig {
            strategy: ChokepointStrategy::ThickCorridor { thickness: 1, min_separation: 2 },
            ..WaypointConfig::default()
        }
    }

    fn every(n: usize) -> WaypointConfig {
        WaypointConfig { strategy: ChokepointStrategy::Fraction { every: n }, ..WaypointConfig::default() }
    }

    #[test]
    fn graph_links_both_sides_of_the_doorway() {
        let finder = WaypointPathfinder::new(&two_rooms_grid(), Metric::Manhattan, corridor_config());
        assert_eq!(finder.chokepoints(), &[Cell::new(5, 3), Cell::new(7, 3)]);
        let edge = finder.edge_between(Cell::new(7, 3), Cell::new(5, 3)).expect("rooms are connected");
        assert_eq!(edge.path, vec![Cell::new(5, 3), Cell::new(6, 3), Cell::new(7, 3)]);
        assert_eq!(edge.cost, 2.0);
    }

    #[test]
    fn edges_are_valid_walks() {
        let grid = two_rooms_grid();
        let finder = WaypointPathfinder::new(&grid, Metric::Euclidean, every(7));
        assert!(finder.edges().count() > 0);
        for edge in finder.edges() {
            assert_eq!(edge.path.first(), Some(&edge.from));
            assert_eq!(edge.path.last(), Some(&edge.to));
            assert!(edge.path.iter().all(|cell| grid.is_walkable(*cell)));
            for pair in edge.path.windows(2) {
                assert!(Metric::Chebyshev.distance(pair[0], pair[1]) == 1.0);
            }
        }
    }

    #[test]
    fn known_path_crosses_between_rooms() {
        let finder = WaypointPathfinder::new(&two_rooms_grid(), Metric::Manhattan, corridor_config());
        let route = finder.get_known_path(Cell::new(2, 3), Cell::new(10, 3));
        assert_eq!(
            route,
            vec![Cell::new(3, 3), Cell::new(4, 3), Cell::new(5, 3), Cell::new(6, 3), Cell::new(7, 3)]
        );
    }

    #[test]
    fn known_path_starting_on_a_chokepoint_skips_the_start() {
        let finder = WaypointPathfinder::new(&two_rooms_grid(), Metric::Manhattan, corridor_config());
        let route = finder.get_known_path(Cell::new(5, 3), Cell::new(9, 2));
        assert_eq!(route, vec![Cell::new(6, 3), Cell::new(7, 3)]);
    }

    #[test]
    fn wall_targets_snap_to_the_nearest_floor() {
        let finder = WaypointPathfinder::new(&two_rooms_grid(), Metric::Manhattan, corridor_config());
        let route = finder.get_known_path(Cell::new(2, 3), Cell::new(12, 3));
        assert_eq!(route.last(), Some(&Cell::new(7, 3)));
    }

    #[test]
    fn graph_without_walkable_cells_is_empty() {
        let mut grid = Grid::open(5, 5);
        for cell in Grid::open(5, 5).cells() {
            grid.set_tile(cell, Tile::Wall);
        }
        let finder = WaypointPathfinder::new(&grid, Metric::Euclidean, every(29));
        assert!(finder.chokepoints().is_empty());
        assert_eq!(finder.edges().count(), 0);
        assert!(finder.get_known_path(Cell::new(0, 0), Cell::new(4, 4)).is_empty());
    }

    #[test]
    fn back_to_path_rejoins_and_continues() {
        let finder = WaypointPathfinder::new(&corridor_grid(8), Metric::Manhattan, every(29));
        let path: Vec<Cell> = (1..=8).map(|x| Cell::new(x, 1)).collect();
        assert_eq!(finder.go_back_to_path(Cell::new(6, 1), &path), vec![Cell::new(7, 1), Cell::new(8, 1)]);

        let open = WaypointPathfinder::new(&Grid::open(6, 6), Metric::Manhattan, every(29));
        let route = open.go_back_to_path(Cell::new(2, 4), &[Cell::new(0, 2), Cell::new(2, 2), Cell::new(4, 2)]);
        assert_eq!(route, vec![Cell::new(2, 3), Cell::new(2, 2), Cell::new(4, 2)]);
        assert!(open.go_back_to_path(Cell::new(2, 4), &[]).is_empty());
    }

    #[test]
    fn fingerprint_tracks_the_graph() {
        let grid = two_rooms_grid();
        let a = WaypointPathfinder::new(&grid, Metric::Euclidean, every(5));
        let b = WaypointPathfinder::new(&grid, Metric::Euclidean, every(5));
        let c = WaypointPathfinder::new(&grid, Metric::Euclidean, every(6));
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }
}
