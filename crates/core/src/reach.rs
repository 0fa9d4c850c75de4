//! Range envelope shared by every AOE: how near and how far an effect may be
//! aimed, under which metric, and along which directions.

use serde::{Deserialize, Serialize};

use crate::error::TargetingError;
use crate::types::{AimLimit, Cell, Metric};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reach {
    min_distance: u32,
    max_distance: u32,
    metric: Metric,
    aim_limit: AimLimit,
}

impl Default for Reach {
    fn default() -> Self {
        Self { min_distance: 0, max_distance: 1, metric: Metric::Euclidean, aim_limit: AimLimit::Free }
    }
}

impl Reach {
    pub fn new(min_distance: u32, max_distance: u32, metric: Metric) -> Result<Self, TargetingError> {
        if min_distance > max_distance {
            return Err(TargetingError::InvertedReach { min: min_distance, max: max_distance });
        }
        Ok(Self { min_distance, max_distance, metric, aim_limit: AimLimit::Free })
    }

    pub fn with_aim_limit(mut self, aim_limit: AimLimit) -> Self {
        self.aim_limit = aim_limit;
        self
    }

    pub fn min_distance(&self) -> u32 {
        self.min_distance
    }

    pub fn max_distance(&self) -> u32 {
        self.max_distance
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn aim_limit(&self) -> AimLimit {
        self.aim_limit
    }

    /// Raises the maximum along with it when needed.
    pub fn set_min_distance(&mut self, min_distance: u32) {
        self.min_distance = min_distance;
        self.max_distance = self.max_distance.max(min_distance);
    }

    /// Lowers the minimum along with it when needed.
    pub fn set_max_distance(&mut self, max_distance: u32) {
        self.max_distance = max_distance;
        self.min_distance = self.min_distance.min(max_distance);
    }

    pub fn set_metric(&mut self, metric: Metric) {
        self.metric = metric;
    }

    pub fn set_aim_limit(&mut self, aim_limit: AimLimit) {
        self.aim_limit = aim_limit;
    }
}

/// Whether `candidate` lies in the inclusive `[min, max]` ring around `origin`.
pub fn verify_reach(reach: &Reach, origin: Cell, candidate: Cell) -> bool {
    let distance = reach.metric.distance(origin, candidate);
    distance >= f64::from(reach.min_distance) && distance <= f64::from(reach.max_distance)
}

/// Whether aiming from `origin` at `candidate` is a legal direction.
pub fn verify_limit(aim_limit: AimLimit, origin: Cell, candidate: Cell) -> bool {
    let dx = candidate.x - origin.x;
    let dy = candidate.y - origin.y;
    let orthogonal = dx == 0 || dy == 0;
    let diagonal = dx.abs() == dy.abs();
    match aim_limit {
        AimLimit::Free => true,
        AimLimit::Orthogonal => orthogonal,
        AimLimit::Diagonal => diagonal,
        AimLimit::EightWay => orthogonal || diagonal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverted_reach_is_rejected() {
        assert_eq!(
            Reach::new(4, 2, Metric::Chebyshev),
            Err(TargetingError::InvertedReach { min: 4, max: 2 })
        );
    }

    #[test]
    fn setters_keep_min_below_max() {
        let mut reach = Reach::default();
        reach.set_min_distance(5);
        assert_eq!((reach.min_distance(), reach.max_distance()), (5, 5));
        reach.set_max_distance(2);
        assert_eq!((reach.min_distance(), reach.max_distance()), (2, 2));
    }

    #[test]
    fn ring_bounds_are_inclusive() {
        let reach = Reach::new(2, 3, Metric::Manhattan).expect("valid reach");
        let origin = Cell::new(0, 0);
        assert!(!verify_reach(&reach, origin, Cell::new(1, 0)));
        assert!(verify_reach(&reach, origin, Cell::new(1, 1)));
        assert!(verify_reach(&reach, origin, Cell::new(2, 1)));
        assert!(!verify_reach(&reach, origin, Cell::new(2, 2)));
    }

    #[test]
    fn aim_limits_filter_directions() {
        let origin = Cell::new(3, 3);
        let east = Cell::new(6, 3);
        let south_east = Cell::new(5, 5);
        let knight = Cell::new(4, 5);
        assert!(verify_limit(AimLimit::Orthogonal, origin, east));
        assert!(!verify_limit(AimLimit::Orthogonal, origin, south_east));
        assert!(verify_limit(AimLimit::Diagonal, origin, south_east));
        assert!(!verify_limit(AimLimit::Diagonal, origin, east));
        assert!(verify_limit(AimLimit::EightWay, origin, east));
        assert!(verify_limit(AimLimit::EightWay, origin, south_east));
        assert!(!verify_limit(AimLimit::EightWay, origin, knight));
        assert!(verify_limit(AimLimit::Free, origin, knight));
    }
}
