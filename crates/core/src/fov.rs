//! Sector-limited field of view.
//! Recursive shadowcasting over the eight octants, with each lit cell filtered
//! by facing angle and weighted by its distance from the origin.

use crate::geometry::{angle_degrees, angle_difference};
use crate::grid::Resistance;
use crate::types::{Cell, Metric};

const ANGLE_EPSILON: f64 = 1e-9;

#[derive(Clone, Copy)]
struct Slope {
    y: i32,
    x: i32,
}

impl Slope {
    fn new(y: i32, x: i32) -> Self {
        Self { y, x }
    }

    fn greater_or_equal(&self, other: &Slope) -> bool {
        self.y * other.x >= other.y * self.x
    }

    fn greater_than(&self, other: &Slope) -> bool {
        self.y * other.x > other.y * self.x
    }
}

struct Sector<'a> {
    resistance: &'a Resistance,
    origin: Cell,
    radius: u32,
    metric: Metric,
    angle: f64,
    span: f64,
    weights: Vec<f64>,
}

/// Visibility weights for a `span`-degree sector facing `angle`, indexed in
/// row-major order. Lit cells weigh `1 - d / (radius + 1)`; everything else is
/// 0.0. The origin is always lit at 1.0 when it lies on the grid.
pub fn sector(
    resistance: &Resistance,
    origin: Cell,
    radius: u32,
    metric: Metric,
    angle: f64,
    span: f64,
) -> Vec<f64> {
    let mut sector = Sector {
        resistance,
        origin,
        radius,
        metric,
        angle,
        span,
        weights: vec![0.0; resistance.width() * resistance.height()],
    };
    if !resistance.in_bounds(origin) || span <= 0.0 {
        return sector.weights;
    }
    sector.light(origin);
    for octant in 0..8 {
        sector.scan_octant(1, Slope::new(1, 1), Slope::new(0, 1), octant);
    }
    sector.weights
}

fn transform_octant(origin: Cell, x: i32, y: i32, octant: u8) -> Cell {
    match octant {
        0 => Cell::new(origin.x + x, origin.y - y),
        1 => Cell::new(origin.x + y, origin.y - x),
        2 => Cell::new(origin.x - y, origin.y - x),
        3 => Cell::new(origin.x - x, origin.y - y),
        4 => Cell::new(origin.x - x, origin.y + y),
        5 => Cell::new(origin.x - y, origin.y + x),
        6 => Cell::new(origin.x + y, origin.y + x),
        7 => Cell::new(origin.x + x, origin.y + y),
        _ => origin,
    }
}

impl Sector<'_> {
    fn light(&mut self, cell: Cell) {
        if !self.resistance.in_bounds(cell) {
            return;
        }
        let distance = self.metric.distance(self.origin, cell);
        if distance > f64::from(self.radius) {
            return;
        }
        if cell != self.origin && self.span < 360.0 {
            let off_axis = angle_difference(angle_degrees(self.origin, cell), self.angle);
            if off_axis > self.span / 2.0 + ANGLE_EPSILON {
                return;
            }
        }
        let idx = (cell.y as usize) * self.resistance.width() + (cell.x as usize);
        self.weights[idx] = 1.0 - distance / (f64::from(self.radius) + 1.0);
    }

    fn scan_octant(&mut self, dist: i32, start: Slope, end: Slope, octant: u8) {
        if dist > self.radius as i32 {
            return;
        }
        let mut blocked = false;
        let mut cur_start = start;
        for y in (0..=dist).rev() {
            let top = Slope::new(2 * y + 1, 2 * dist - 1);
            let bot = Slope::new(2 * y - 1, 2 * dist + 1);
            if cur_start.greater_or_equal(&bot) && top.greater_than(&end) {
                let cell = transform_octant(self.origin, dist, y, octant);
                self.light(cell);
                if self.resistance.is_opaque(cell) {
                    if !blocked {
                        self.scan_octant(dist + 1, cur_start, top, octant);
                        blocked = true;
                    }
                    cur_start = bot;
                } else if blocked {
                    blocked = false;
                }
            }
        }
        if !blocked {
            self.scan_octant(dist + 1, cur_start, end, octant);
        }
    }
}
