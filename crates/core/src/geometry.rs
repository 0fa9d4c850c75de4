//! Shared grid geometry: neighbourhoods, lines, angles and ray extension.
//! The cost field, tracers and every AOE variant measure the grid through these
//! helpers so that all of them agree on adjacency and direction.

use crate::types::{Cell, Metric};

/// Up, right, down, left.
pub const CARDINALS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// Up-right, down-right, down-left, up-left.
pub const DIAGONALS: [(i32, i32); 4] = [(1, -1), (1, 1), (-1, 1), (-1, -1)];

pub fn cardinal_neighbors(cell: Cell) -> [Cell; 4] {
    CARDINALS.map(|(dx, dy)| cell.offset(dx, dy))
}

/// Legal single steps out of `cell` with their movement cost. Diagonal steps
/// are only offered when the metric allows them and at least one of the two
/// orthogonal cells they cut past is passable.
pub fn steps<P>(cell: Cell, metric: Metric, passable: P) -> Vec<(Cell, f64)>
where
    P: Fn(Cell) -> bool,
{
    let mut out = Vec::with_capacity(8);
    for (dx, dy) in CARDINALS {
        let next = cell.offset(dx, dy);
        if passable(next) {
            out.push((next, 1.0));
        }
    }
    if metric.allows_diagonals() {
        for (dx, dy) in DIAGONALS {
            let next = cell.offset(dx, dy);
            if passable(next) && (passable(cell.offset(dx, 0)) || passable(cell.offset(0, dy))) {
                out.push((next, metric.diagonal_cost()));
            }
        }
    }
    out
}

/// Cells on the straight line from `from` to `to`, both included. Metrics that
/// allow diagonals get an 8-connected Bresenham line; Manhattan gets a
/// 4-connected walk that never steps diagonally.
pub fn line(from: Cell, to: Cell, metric: Metric) -> Vec<Cell> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let sx = dx.signum();
    let sy = dy.signum();
    let total_x = dx.abs();
    let total_y = dy.abs();

    let mut cells = Vec::with_capacity((total_x + total_y + 1) as usize);
    let mut current = from;
    cells.push(current);

    if metric.allows_diagonals() {
        let mut err = total_x - total_y;
        while current != to {
            let doubled = 2 * err;
            if doubled > -total_y {
                err -= total_y;
                current.x += sx;
            }
            if doubled < total_x {
                err += total_x;
                current.y += sy;
            }
            cells.push(current);
        }
        return cells;
    }

    let mut step_x = 0;
    let mut step_y = 0;
    while step_x < total_x || step_y < total_y {
        let lhs = (1 + 2 * step_x) * total_y;
        let rhs = (1 + 2 * step_y) * total_x;
        if lhs <= rhs {
            current.x += sx;
            step_x += 1;
        } else {
            current.y += sy;
            step_y += 1;
        }
        cells.push(current);
    }
    cells
}

/// Direction from `from` to `to` in degrees, 0 pointing along +x and growing
/// clockwise on screen (y grows downward). Normalised to `[0, 360)`.
pub fn angle_degrees(from: Cell, to: Cell) -> f64 {
    let dx = f64::from(to.x - from.x);
    let dy = f64::from(to.y - from.y);
    dy.atan2(dx).to_degrees().rem_euclid(360.0)
}

/// Smallest absolute difference between two angles, in `[0, 180]`.
pub fn angle_difference(a: f64, b: f64) -> f64 {
    let diff = (a - b).rem_euclid(360.0);
    diff.min(360.0 - diff)
}

/// Extends the ray `origin -> through` to `length` (measured with `metric`),
/// shortening it where needed so the result stays inside a
/// `width x height` grid.
pub fn extend(
    origin: Cell,
    through: Cell,
    length: f64,
    metric: Metric,
    width: usize,
    height: usize,
) -> Cell {
    if origin == through || width == 0 || height == 0 {
        return origin;
    }
    let dx = f64::from(through.x - origin.x);
    let dy = f64::from(through.y - origin.y);
    let scale = (length / metric.distance(origin, through))
        .min(axis_limit(origin.x, dx, width))
        .min(axis_limit(origin.y, dy, height))
        .max(0.0);
    let x = (f64::from(origin.x) + dx * scale).round() as i32;
    let y = (f64::from(origin.y) + dy * scale).round() as i32;
    Cell::new(x.clamp(0, width as i32 - 1), y.clamp(0, height as i32 - 1))
}

fn axis_limit(start: i32, delta: f64, size: usize) -> f64 {
    if delta > 0.0 {
        (size as f64 - 1.0 - f64::from(start)) / delta
    } else if delta < 0.0 {
        f64::from(start) / -delta
    } else {
        f64::INFINITY
    }
}

/// Euclidean distance from `point` to the segment `a..=b`.
pub fn segment_distance(a: Cell, b: Cell, point: Cell) -> f64 {
    let (ax, ay) = (f64::from(a.x), f64::from(a.y));
    let (bx, by) = (f64::from(b.x), f64::from(b.y));
    let (px, py) = (f64::from(point.x), f64::from(point.y));
    let (vx, vy) = (bx - ax, by - ay);
    let len_sq = vx * vx + vy * vy;
    let t = if len_sq == 0.0 { 0.0 } else { (((px - ax) * vx + (py - ay) * vy) / len_sq).clamp(0.0, 1.0) };
    let (cx, cy) = (ax + vx * t, ay + vy * t);
    ((px - cx).powi(2) + (py - cy).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagonal_line_is_eight_connected() {
        let cells = line(Cell::new(0, 0), Cell::new(3, 3), Metric::Chebyshev);
        assert_eq!(cells, vec![Cell::new(0, 0), Cell::new(1, 1), Cell::new(2, 2), Cell::new(3, 3)]);
    }

    #[test]
    fn manhattan_line_never_steps_diagonally() {
        let cells = line(Cell::new(0, 0), Cell::new(2, 2), Metric::Manhattan);
        assert_eq!(cells.len(), 5);
        for pair in cells.windows(2) {
            let step = pair[0].x.abs_diff(pair[1].x) + pair[0].y.abs_diff(pair[1].y);
            assert_eq!(step, 1, "step {:?} -> {:?} is not orthogonal", pair[0], pair[1]);
        }
        assert_eq!(cells.last(), Some(&Cell::new(2, 2)));
    }

    #[test]
    fn angles_grow_clockwise_from_positive_x() {
        let origin = Cell::new(5, 5);
        assert_eq!(angle_degrees(origin, Cell::new(9, 5)), 0.0);
        assert_eq!(angle_degrees(origin, Cell::new(5, 9)), 90.0);
        assert_eq!(angle_degrees(origin, Cell::new(1, 5)), 180.0);
        assert_eq!(angle_degrees(origin, Cell::new(5, 1)), 270.0);
        assert_eq!(angle_difference(350.0, 10.0), 20.0);
    }

    #[test]
    fn extend_stops_at_the_grid_edge() {
        let origin = Cell::new(1, 1);
        assert_eq!(extend(origin, Cell::new(2, 1), 5.0, Metric::Euclidean, 10, 10), Cell::new(6, 1));
        assert_eq!(extend(origin, Cell::new(2, 1), 50.0, Metric::Euclidean, 10, 10), Cell::new(9, 1));
        assert_eq!(extend(origin, Cell::new(2, 2), 50.0, Metric::Chebyshev, 5, 10), Cell::new(4, 4));
    }

    #[test]
    fn corner_cutting_needs_one_open_side() {
        let walls = [Cell::new(1, 0), Cell::new(0, 1)];
        let passable = |cell: Cell| !walls.contains(&cell);
        let from_origin = steps(Cell::new(0, 0), Metric::Chebyshev, passable);
        assert!(from_origin.iter().all(|(cell, _)| *cell != Cell::new(1, 1)));
    }
}
