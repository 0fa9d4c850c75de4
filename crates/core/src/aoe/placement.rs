//! Firing-position search shared by every shape.
//!
//! Each target gets a cost map: a scan rooted at the target over the cells
//! from which the shape would still cover it, with every unusable cell charged
//! the target tier's sentinel. A cell only keeps a finite cost when aiming at
//! it really covers the target. The maps are summed and the cheapest cells
//! that hit at least one target win, ties included.

use std::collections::BTreeMap;

use tracing::trace;

use super::{Aoe, AreaMap, IdealLocations, TargetHit, Tier};
use crate::error::TargetingError;
use crate::field::FLOOR;
use crate::reach::verify_reach;
use crate::types::Cell;

/// Targets per tier; hits are tracked in one `u64` mask per tier.
pub const MAX_TARGETS_PER_TIER: usize = 63;

const TIE_EPSILON: f64 = 1e-6;

impl Aoe {
    /// Best firing positions for hitting `targets` while keeping every cell
    /// covered by an aim at one of `exclusions` out of the blast.
    pub fn ideal_locations(
        &mut self,
        targets: &[Cell],
        exclusions: &[Cell],
    ) -> Result<IdealLocations, TargetingError> {
        self.ideal_locations_prioritized(&[], targets, exclusions)
    }

    /// As [`Aoe::ideal_locations`], but any priority hit outweighs every
    /// combination of lesser hits. Each winner lists its priority hits first.
    pub fn ideal_locations_prioritized(
        &mut self,
        priority: &[Cell],
        lesser: &[Cell],
        exclusions: &[Cell],
    ) -> Result<IdealLocations, TargetingError> {
        for (tier, targets) in [(Tier::Priority, priority), (Tier::Lesser, lesser)] {
            if targets.len() > MAX_TARGETS_PER_TIER {
                return Err(TargetingError::TooManyTargets {
                    tier,
                    count: targets.len(),
                    limit: MAX_TARGETS_PER_TIER,
                });
            }
        }
        let Some(grid) = self.grid().cloned() else {
            return Ok(IdealLocations::new());
        };
        if priority.is_empty() && lesser.is_empty() {
            return Ok(IdealLocations::new());
        }

        let mut forbidden: Vec<bool> =
            grid.cells().map(|cell| !verify_reach(&self.reach, self.origin, cell)).collect();
        for exclusion in exclusions {
            for cell in self.area_aimed_at(*exclusion).into_keys() {
                if let Some(idx) = grid.index_of(cell) {
                    forbidden[idx] = true;
                }
            }
        }

        let mut coverage: BTreeMap<Cell, AreaMap> = BTreeMap::new();
        let mut quality = vec![0.0; grid.len()];
        let mut priority_hits = vec![0u64; grid.len()];
        let mut lesser_hits = vec![0u64; grid.len()];
        for (tier, targets, hits) in [
            (Tier::Priority, priority, &mut priority_hits),
            (Tier::Lesser, lesser, &mut lesser_hits),
        ] {
            let sentinel = tier.sentinel();
            for (bit, target) in targets.iter().enumerate() {
                let mut costs = self.target_costs(*target, &forbidden, sentinel);
                for (idx, cost) in costs.iter_mut().enumerate() {
                    if *cost >= sentinel {
                        continue;
                    }
                    let cell = grid.cell_at(idx);
                    let covered = coverage.entry(cell).or_insert_with(|| self.area_aimed_at(cell));
                    if !covered.contains_key(target) {
                        *cost = sentinel;
                    }
                }
                for (idx, cost) in costs.into_iter().enumerate() {
                    quality[idx] += cost;
                    if cost < sentinel {
                        hits[idx] |= 1 << bit;
                    }
                }
            }
        }

        let best = (0..grid.len())
            .filter(|idx| priority_hits[*idx] | lesser_hits[*idx] != 0)
            .map(|idx| quality[idx])
            .min_by(f64::total_cmp);
        let Some(best) = best else {
            trace!(origin = ?self.origin, "no firing position hits any target");
            return Ok(IdealLocations::new());
        };

        let mut locations = IdealLocations::new();
        for idx in 0..grid.len() {
            let hit_any = priority_hits[idx] | lesser_hits[idx] != 0;
            if !hit_any || quality[idx] - best > TIE_EPSILON {
                continue;
            }
            let mut hits = Vec::new();
            for (tier, targets, mask) in
                [(Tier::Priority, priority, priority_hits[idx]), (Tier::Lesser, lesser, lesser_hits[idx])]
            {
                hits.extend(
                    targets
                        .iter()
                        .enumerate()
                        .filter(|(bit, _)| mask & (1 << bit) != 0)
                        .map(|(_, cell)| TargetHit::new(*cell, tier)),
                );
            }
            locations.insert(grid.cell_at(idx), hits);
        }
        trace!(origin = ?self.origin, best, winners = locations.len(), "ideal locations");
        Ok(locations)
    }

    /// Per-cell cost of firing from that cell at `target`, or `sentinel` where
    /// the target cannot be hit.
    fn target_costs(&mut self, target: Cell, forbidden: &[bool], sentinel: f64) -> Vec<f64> {
        let area = self.area_aimed_at(target);
        let Some(surface) = &mut self.surface else {
            return Vec::new();
        };
        let mut costs = vec![sentinel; surface.grid.len()];
        if !area.contains_key(&target) {
            return costs;
        }

        let grid = &surface.grid;
        let mut scope = surface.field.scope();
        for cell in grid.cells() {
            if !area.contains_key(&cell) {
                scope.block(cell);
            }
        }
        scope.set_goal(target);
        scope.scan(&[]);
        for (idx, cost) in costs.iter_mut().enumerate() {
            let cell = grid.cell_at(idx);
            let value = scope.gradient()[idx];
            if area.contains_key(&cell) && !forbidden[idx] && value < FLOOR {
                *cost = value;
            }
        }
        costs
    }
}
