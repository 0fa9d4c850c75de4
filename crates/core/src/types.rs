use std::f64::consts::SQRT_2;

use serde::{Deserialize, Serialize};

/// Integer grid coordinate. Ordering is row-major (`y`, then `x`), which is
/// the scan order every first-wins tie-break in the crate relies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub y: i32,
    pub x: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { y, x }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self { y: self.y + dy, x: self.x + dx }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tile {
    Wall,
    Floor,
}

/// Distance measurement shared by AOE falloff, reach checks and the cost field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Manhattan,
    Chebyshev,
    #[default]
    Euclidean,
}

impl Metric {
    pub fn distance(self, a: Cell, b: Cell) -> f64 {
        let dx = f64::from(a.x.abs_diff(b.x));
        let dy = f64::from(a.y.abs_diff(b.y));
        match self {
            Self::Manhattan => dx + dy,
            Self::Chebyshev => dx.max(dy),
            Self::Euclidean => (dx * dx + dy * dy).sqrt(),
        }
    }

    /// Whether the cost field and tracers may step diagonally under this metric.
    pub fn allows_diagonals(self) -> bool {
        !matches!(self, Self::Manhattan)
    }

    pub fn diagonal_cost(self) -> f64 {
        match self {
            Self::Euclidean => SQRT_2,
            Self::Manhattan | Self::Chebyshev => 1.0,
        }
    }
}

/// Radius descriptions as weapon data names them; each implies a [`Metric`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadiusShape {
    Square,
    Diamond,
    #[default]
    Circle,
    Cube,
    Octahedron,
    Sphere,
}

impl From<RadiusShape> for Metric {
    fn from(shape: RadiusShape) -> Self {
        match shape {
            RadiusShape::Diamond | RadiusShape::Octahedron => Metric::Manhattan,
            RadiusShape::Square | RadiusShape::Cube => Metric::Chebyshev,
            RadiusShape::Circle | RadiusShape::Sphere => Metric::Euclidean,
        }
    }
}

/// Which facing directions an AOE may legally be aimed along.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AimLimit {
    #[default]
    Free,
    Orthogonal,
    Diagonal,
    EightWay,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_order_is_row_major() {
        let mut cells = vec![Cell::new(3, 1), Cell::new(0, 2), Cell::new(1, 1)];
        cells.sort();
        assert_eq!(cells, vec![Cell::new(1, 1), Cell::new(3, 1), Cell::new(0, 2)]);
    }

    #[test]
    fn metric_distances_match_their_shapes() {
        let a = Cell::new(0, 0);
        let b = Cell::new(3, 4);
        assert_eq!(Metric::Manhattan.distance(a, b), 7.0);
        assert_eq!(Metric::Chebyshev.distance(a, b), 4.0);
        assert_eq!(Metric::Euclidean.distance(a, b), 5.0);
    }

    #[test]
    fn radius_shapes_imply_metrics() {
        assert_eq!(Metric::from(RadiusShape::Diamond), Metric::Manhattan);
        assert_eq!(Metric::from(RadiusShape::Octahedron), Metric::Manhattan);
        assert_eq!(Metric::from(RadiusShape::Square), Metric::Chebyshev);
        assert_eq!(Metric::from(RadiusShape::Cube), Metric::Chebyshev);
        assert_eq!(Metric::from(RadiusShape::Circle), Metric::Euclidean);
        assert_eq!(Metric::from(RadiusShape::Sphere), Metric::Euclidean);
    }
}
