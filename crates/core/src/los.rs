//! Line tracing between two cells.
//!
//! The tracer first tries the straight line. When an opaque cell interrupts
//! it, the traced sequence falls back to the shortest open walk between the
//! two cells, so beams and similar effects bend around obstacles instead of
//! passing through them. `is_reachable` reports whether any such route exists.

use crate::geometry::line;
use crate::grid::Resistance;
use crate::pathing::astar;
use crate::types::{Cell, Metric};

/// Expansion budget for the detour search. A beam detour never needs to look
/// farther than a few hundred cells on maps this engine targets.
const DETOUR_BUDGET: usize = 4_096;

#[derive(Clone, Debug, Default)]
pub struct LineTracer {
    last_path: Vec<Cell>,
}

impl LineTracer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Traces `from -> to`. On success the last path starts at `from` and ends
    /// at `to`; on failure it holds the straight-line prefix up to the first
    /// opaque cell.
    pub fn is_reachable(&mut self, resistance: &Resistance, from: Cell, to: Cell, metric: Metric) -> bool {
        self.trace(resistance, from, to, to, metric)
    }

    /// As [`LineTracer::is_reachable`], but a detour around a blocked line
    /// passes through `via` on its way to `to` whenever `via` is open.
    pub fn is_reachable_via(
        &mut self,
        resistance: &Resistance,
        from: Cell,
        via: Cell,
        to: Cell,
        metric: Metric,
    ) -> bool {
        self.trace(resistance, from, via, to, metric)
    }

    fn trace(&mut self, resistance: &Resistance, from: Cell, via: Cell, to: Cell, metric: Metric) -> bool {
        self.last_path.clear();
        if !resistance.in_bounds(from) {
            return false;
        }

        let straight = line(from, to, metric);
        let blocked_at = straight
            .iter()
            .skip(1)
            .position(|cell| resistance.is_opaque(*cell))
            .map(|offset| offset + 1);
        let Some(blocked_at) = blocked_at else {
            self.last_path = straight;
            return true;
        };

        let passable = |cell: Cell| !resistance.is_opaque(cell);
        if via != to
            && via != from
            && let Some(first_leg) = astar(from, via, metric, DETOUR_BUDGET, passable)
        {
            self.last_path.push(from);
            self.last_path.extend(first_leg);
            let Some(second_leg) = astar(via, to, metric, DETOUR_BUDGET, passable) else {
                return false;
            };
            self.last_path.extend(second_leg);
            return true;
        }
        if let Some(detour) = astar(from, to, metric, DETOUR_BUDGET, passable) {
            self.last_path.push(from);
            self.last_path.extend(detour);
            return true;
        }

        self.last_path.extend_from_slice(&straight[..blocked_at]);
        false
    }

    pub fn last_path(&self) -> &[Cell] {
        &self.last_path
    }
}
