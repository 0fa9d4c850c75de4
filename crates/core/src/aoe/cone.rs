use super::{AreaMap, Surface};
use crate::fov;
use crate::geometry::{angle_degrees, angle_difference};
use crate::types::{AimLimit, Cell, Metric};

const ANGLE_EPSILON: f64 = 1e-9;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cone {
    pub(super) angle: f64,
    pub(super) radius: u32,
    pub(super) span: f64,
}

impl Cone {
    pub(super) fn new(angle: f64, radius: u32, span: f64) -> Self {
        Self { angle, radius, span: span.clamp(0.0, 360.0) }
    }

    /// Facing in degrees, 0 along +x and clockwise on screen.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn span(&self) -> f64 {
        self.span
    }
}

/// Every cell of the sector with a positive weight, walls included; the origin
/// is left out.
pub(super) fn area(
    surface: &Surface,
    origin: Cell,
    angle: f64,
    radius: u32,
    span: f64,
    metric: Metric,
) -> AreaMap {
    let weights = fov::sector(&surface.resistance, origin, radius, metric, angle, span);
    weights
        .iter()
        .enumerate()
        .filter(|(_, weight)| **weight > 0.0)
        .map(|(idx, weight)| (surface.grid.cell_at(idx), *weight))
        .filter(|(cell, _)| *cell != origin)
        .collect()
}

pub(super) fn may_contain(origin: Cell, cone: &Cone, metric: Metric, targets: &[Cell]) -> bool {
    targets.iter().any(|target| {
        *target != origin
            && metric.distance(origin, *target) <= f64::from(cone.radius)
            && angle_difference(angle_degrees(origin, *target), cone.angle)
                <= cone.span / 2.0 + ANGLE_EPSILON
    })
}

/// Whether a facing of `degrees` is one of the directions `limit` allows.
pub(super) fn angle_allowed(limit: AimLimit, degrees: f64) -> bool {
    let on_step = |step: f64, offset: f64| {
        let rem = (degrees - offset).rem_euclid(step);
        rem < ANGLE_EPSILON || step - rem < ANGLE_EPSILON
    };
    match limit {
        AimLimit::Free => true,
        AimLimit::Orthogonal => on_step(90.0, 0.0),
        AimLimit::Diagonal => on_step(90.0, 45.0),
        AimLimit::EightWay => on_step(45.0, 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aoe::Aoe;
    use crate::grid::Grid;
    use crate::types::Tile;

    #[test]
    fn cone_faces_its_aim_and_grades_by_distance() {
        let mut aoe = Aoe::cone(Cell::new(4, 4), 3, 90.0).with_metric(Metric::Chebyshev);
        aoe.set_map(&Grid::open(9, 9));
        assert!(aoe.shift(Cell::new(4, 8)));
        let area = aoe.find_area();
        assert!(!area.contains_key(&Cell::new(4, 4)));
        assert_eq!(area.get(&Cell::new(4, 5)), Some(&0.75));
        assert_eq!(area.get(&Cell::new(4, 7)), Some(&0.25));
        assert!(!area.contains_key(&Cell::new(4, 3)));
        assert!(area.values().all(|weight| *weight > 0.0 && *weight <= 1.0));
    }

    #[test]
    fn lit_walls_are_affected_but_shadow_what_lies_behind() {
        let mut grid = Grid::open(7, 3);
        grid.set_tile(Cell::new(3, 1), Tile::Wall);
        let mut aoe = Aoe::cone(Cell::new(1, 1), 5, 60.0);
        aoe.set_map(&grid);
        let area = aoe.find_area();
        let lit = fov::sector(&grid.resistance(), Cell::new(1, 1), 5, Metric::Euclidean, 0.0, 60.0);
        for (idx, weight) in lit.iter().enumerate() {
            let cell = grid.cell_at(idx);
            if *weight > 0.0 && cell != Cell::new(1, 1) {
                assert_eq!(area.get(&cell), Some(weight), "{cell:?} is lit but missing");
            }
        }
        assert!(area.contains_key(&Cell::new(2, 1)));
        assert!(area.get(&Cell::new(3, 1)).is_some_and(|weight| *weight > 0.0));
        assert!(!area.contains_key(&Cell::new(5, 1)));
    }

    #[test]
    fn limited_cones_only_turn_in_allowed_steps() {
        assert!(angle_allowed(AimLimit::Orthogonal, 270.0));
        assert!(!angle_allowed(AimLimit::Orthogonal, 45.0));
        assert!(angle_allowed(AimLimit::Diagonal, 135.0));
        assert!(angle_allowed(AimLimit::EightWay, 359.999_999_999_9));
        assert!(!angle_allowed(AimLimit::EightWay, 30.0));
    }

    #[test]
    fn quick_reject_checks_range_and_facing() {
        let aoe = Aoe::cone(Cell::new(0, 0), 4, 90.0);
        assert!(aoe.may_contain_target(&[Cell::new(3, 1)]));
        assert!(!aoe.may_contain_target(&[Cell::new(0, 3)]));
        assert!(!aoe.may_contain_target(&[Cell::new(6, 0)]));
    }
}
