use super::{AreaMap, Surface};
use crate::types::Cell;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Point {
    pub(super) center: Cell,
}

impl Point {
    pub(super) fn new(center: Cell) -> Self {
        Self { center }
    }

    pub fn center(&self) -> Cell {
        self.center
    }
}

pub(super) fn area(surface: &Surface, center: Cell) -> AreaMap {
    let mut area = AreaMap::new();
    if surface.grid.is_walkable(center) {
        area.insert(center, 1.0);
    }
    area
}

pub(super) fn may_contain(center: Cell, targets: &[Cell]) -> bool {
    targets.contains(&center)
}

#[cfg(test)]
mod tests {
    use crate::aoe::Aoe;
    use crate::test_support::walled_column_grid;
    use crate::types::Cell;

    #[test]
    fn area_is_exactly_the_center() {
        let mut aoe = Aoe::point(Cell::new(0, 0), Cell::new(3, 3));
        aoe.set_map(&walled_column_grid());
        let area = aoe.find_area();
        assert_eq!(area.len(), 1);
        assert_eq!(area.get(&Cell::new(3, 3)), Some(&1.0));
    }

    #[test]
    fn wall_center_affects_nothing() {
        let mut aoe = Aoe::point(Cell::new(0, 0), Cell::new(2, 1));
        aoe.set_map(&walled_column_grid());
        assert!(aoe.find_area().is_empty());
    }

    #[test]
    fn quick_reject_matches_the_center_only() {
        let aoe = Aoe::point(Cell::new(0, 0), Cell::new(3, 3));
        assert!(aoe.may_contain_target(&[Cell::new(1, 1), Cell::new(3, 3)]));
        assert!(!aoe.may_contain_target(&[Cell::new(3, 4)]));
        assert!(!aoe.may_contain_target(&[]));
    }
}
