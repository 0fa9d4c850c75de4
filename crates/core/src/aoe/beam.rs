//! Beams: a traced line from the origin, optionally widened by a partial
//! cost-field scan around every traced cell.

use super::{AreaMap, Surface};
use crate::geometry::segment_distance;
use crate::types::{Cell, Metric};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Beam {
    /// Cell the beam was last aimed at; blocked traces detour through it.
    pub(super) aim: Cell,
    pub(super) end: Cell,
    pub(super) length: u32,
    pub(super) radius: u32,
}

impl Beam {
    pub(super) fn new(end: Cell, length: u32, radius: u32) -> Self {
        Self { aim: end, end, length, radius }
    }

    pub fn aim(&self) -> Cell {
        self.aim
    }

    pub fn end(&self) -> Cell {
        self.end
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }
}

pub(super) fn area(surface: &mut Surface, origin: Cell, aim: Cell, end: Cell, radius: u32) -> AreaMap {
    let metric = surface.field.metric();
    surface.tracer.is_reachable_via(&surface.resistance, origin, aim, end, metric);
    let traced: Vec<Cell> =
        surface.tracer.last_path().iter().copied().filter(|cell| *cell != origin).collect();
    if traced.is_empty() {
        return AreaMap::new();
    }
    if radius == 0 {
        return traced.into_iter().map(|cell| (cell, 1.0)).collect();
    }

    let mut scope = surface.field.scope();
    for cell in &traced {
        scope.set_goal(*cell);
    }
    scope.partial_scan(f64::from(radius), &[origin]);
    scope.reached().filter(|(cell, _)| *cell != origin).map(|(cell, _)| (cell, 1.0)).collect()
}

/// Straight-line estimate; beams detoured around walls can reach farther.
pub(super) fn may_contain(origin: Cell, beam: &Beam, targets: &[Cell]) -> bool {
    let radius = f64::from(beam.radius);
    let span = Metric::Euclidean.distance(origin, beam.end) + radius;
    targets.iter().any(|target| {
        *target != origin
            && segment_distance(origin, beam.end, *target) <= radius + 0.5
            && Metric::Euclidean.distance(origin, *target) <= span
    })
}
