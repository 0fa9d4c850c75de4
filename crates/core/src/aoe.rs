//! Area-of-effect calculators.
//!
//! An [`Aoe`] pairs the state every effect shares (origin, [`Reach`], falloff
//! metric and the attached grid) with a [`Shape`] payload for the variant
//! specific extent. Geometry for each variant lives in its own submodule; the
//! firing-position optimizer in `placement` works on any shape through
//! [`Aoe::area_aimed_at`].

mod beam;
mod cloud;
mod cone;
mod placement;
mod point;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use beam::Beam;
pub use cloud::Cloud;
pub use cone::Cone;
pub use placement::MAX_TARGETS_PER_TIER;
pub use point::Point;

use crate::field::CostField;
use crate::geometry::{angle_degrees, extend};
use crate::grid::{Grid, Resistance};
use crate::los::LineTracer;
use crate::reach::{Reach, verify_limit};
use crate::spill::Spill;
use crate::types::{Cell, Metric};

/// Affected cells and their weight in `(0, 1]`.
pub type AreaMap = BTreeMap<Cell, f64>;

/// Firing positions mapped to the targets each one hits.
pub type IdealLocations = BTreeMap<Cell, Vec<TargetHit>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Priority,
    Lesser,
}

impl Tier {
    pub fn weight(self) -> u32 {
        match self {
            Self::Priority => 2,
            Self::Lesser => 1,
        }
    }

    /// Cost charged to a cell that cannot hit a target of this tier.
    pub(crate) fn sentinel(self) -> f64 {
        match self {
            Self::Priority => 399_999.0,
            Self::Lesser => 99_999.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetHit {
    pub cell: Cell,
    pub tier: Tier,
    pub weight: u32,
}

impl TargetHit {
    pub fn new(cell: Cell, tier: Tier) -> Self {
        Self { cell, tier, weight: tier.weight() }
    }
}

#[derive(Clone, Debug)]
pub enum Shape {
    Point(Point),
    Beam(Beam),
    Cone(Cone),
    Cloud(Cloud),
}

impl Shape {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Point(_) => "point",
            Self::Beam(_) => "beam",
            Self::Cone(_) => "cone",
            Self::Cloud(_) => "cloud",
        }
    }
}

/// Everything derived from the attached grid, plus the scratch used to query it.
#[derive(Clone, Debug)]
pub(crate) struct Surface {
    grid: Grid,
    resistance: Resistance,
    field: CostField,
    tracer: LineTracer,
}

impl Surface {
    fn new(grid: &Grid, metric: Metric) -> Self {
        Self {
            grid: grid.clone(),
            resistance: grid.resistance(),
            field: CostField::new(grid, metric),
            tracer: LineTracer::new(),
        }
    }

    fn clamp(&self, cell: Cell) -> Cell {
        let max_x = self.grid.width().saturating_sub(1) as i32;
        let max_y = self.grid.height().saturating_sub(1) as i32;
        Cell::new(cell.x.clamp(0, max_x), cell.y.clamp(0, max_y))
    }
}

#[derive(Clone, Debug)]
pub struct Aoe {
    origin: Cell,
    reach: Reach,
    metric: Metric,
    surface: Option<Surface>,
    shape: Shape,
}

impl Aoe {
    fn with_shape(origin: Cell, shape: Shape) -> Self {
        Self { origin, reach: Reach::default(), metric: Metric::default(), surface: None, shape }
    }

    /// Single-cell effect at `center`.
    pub fn point(origin: Cell, center: Cell) -> Self {
        Self::with_shape(origin, Shape::Point(Point::new(center)))
    }

    /// Line from `origin` to `end`; `shift` re-aims it out to `length` cells.
    /// A positive `radius` widens the traced line by a partial cost scan.
    pub fn beam(origin: Cell, end: Cell, length: u32, radius: u32) -> Self {
        Self::with_shape(origin, Shape::Beam(Beam::new(end, length, radius)))
    }

    /// Sector of `span` degrees and `radius` cells, initially facing +x.
    pub fn cone(origin: Cell, radius: u32, span: f64) -> Self {
        Self::with_shape(origin, Shape::Cone(Cone::new(0.0, radius, span)))
    }

    /// Random blob of `volume` cells around `center`, reproducible from `seed`.
    pub fn cloud(origin: Cell, center: Cell, volume: u32, seed: u64) -> Self {
        Self::with_shape(origin, Shape::Cloud(Cloud::new(center, volume, seed)))
    }

    pub fn with_reach(mut self, reach: Reach) -> Self {
        self.reach = reach;
        self
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.set_metric(metric);
        self
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn origin(&self) -> Cell {
        self.origin
    }

    pub fn set_origin(&mut self, origin: Cell) {
        self.origin = origin;
    }

    pub fn reach(&self) -> &Reach {
        &self.reach
    }

    pub fn reach_mut(&mut self) -> &mut Reach {
        &mut self.reach
    }

    pub fn set_reach(&mut self, reach: Reach) {
        self.reach = reach;
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Changes the falloff metric; an attached grid is re-derived for it.
    pub fn set_metric(&mut self, metric: Metric) {
        self.metric = metric;
        if let Some(surface) = &mut self.surface {
            surface.field = CostField::new(&surface.grid, metric);
        }
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.surface.as_ref().map(|surface| &surface.grid)
    }

    /// Attaches `grid`, re-deriving resistance and scratch and pulling the
    /// extent back inside the new bounds.
    pub fn set_map(&mut self, grid: &Grid) {
        let surface = Surface::new(grid, self.metric);
        match &mut self.shape {
            Shape::Point(point) => point.center = surface.clamp(point.center),
            Shape::Beam(beam) => {
                beam.aim = surface.clamp(beam.aim);
                beam.end = surface.clamp(beam.end);
            }
            Shape::Cone(_) => {}
            Shape::Cloud(cloud) => cloud.spill = Some(Spill::new(grid, cloud.seed)),
        }
        self.surface = Some(surface);
    }

    fn in_bounds(&self, cell: Cell) -> bool {
        self.surface.as_ref().is_none_or(|surface| surface.grid.in_bounds(cell))
    }

    /// Re-aims the effect toward `aim`. Returns `false` and leaves the state
    /// untouched when the aim is illegal.
    pub fn shift(&mut self, aim: Cell) -> bool {
        if !verify_limit(self.reach.aim_limit(), self.origin, aim) {
            return false;
        }
        match &self.shape {
            Shape::Point(_) | Shape::Cloud(_) => self.set_center(aim),
            Shape::Beam(beam) => {
                if aim == self.origin {
                    return false;
                }
                let end = match &self.surface {
                    Some(surface) => extend(
                        self.origin,
                        aim,
                        f64::from(beam.length),
                        self.metric,
                        surface.grid.width(),
                        surface.grid.height(),
                    ),
                    None => aim,
                };
                if !self.set_end(end) {
                    return false;
                }
                if let Shape::Beam(beam) = &mut self.shape {
                    beam.aim = aim;
                }
                true
            }
            Shape::Cone(_) => {
                if aim == self.origin {
                    return false;
                }
                self.set_angle(angle_degrees(self.origin, aim))
            }
        }
    }

    /// Moves a point or cloud center. Clouds restart their spill.
    pub fn set_center(&mut self, center: Cell) -> bool {
        if !self.in_bounds(center) || !verify_limit(self.reach.aim_limit(), self.origin, center) {
            return false;
        }
        match &mut self.shape {
            Shape::Point(point) => point.center = center,
            Shape::Cloud(cloud) => {
                cloud.center = center;
                if let Some(spill) = &mut cloud.spill {
                    spill.reset();
                }
            }
            Shape::Beam(_) | Shape::Cone(_) => return false,
        }
        true
    }

    /// Places a beam's end directly, without extending it to full length.
    pub fn set_end(&mut self, end: Cell) -> bool {
        if !self.in_bounds(end) || !verify_limit(self.reach.aim_limit(), self.origin, end) {
            return false;
        }
        match &mut self.shape {
            Shape::Beam(beam) => {
                beam.aim = end;
                beam.end = end;
                true
            }
            _ => false,
        }
    }

    /// Sets a cone's facing in degrees. Under an aim limit the angle must be a
    /// direction that limit allows.
    pub fn set_angle(&mut self, degrees: f64) -> bool {
        let Shape::Cone(cone) = &mut self.shape else {
            return false;
        };
        if !cone::angle_allowed(self.reach.aim_limit(), degrees) {
            return false;
        }
        cone.angle = degrees.rem_euclid(360.0);
        true
    }

    pub fn set_span(&mut self, degrees: f64) -> bool {
        match &mut self.shape {
            Shape::Cone(cone) if degrees >= 0.0 => {
                cone.span = degrees.min(360.0);
                true
            }
            _ => false,
        }
    }

    /// Radius of a beam's widening or a cone's reach.
    pub fn set_radius(&mut self, radius: u32) -> bool {
        match &mut self.shape {
            Shape::Beam(beam) => beam.radius = radius,
            Shape::Cone(cone) => cone.radius = radius,
            Shape::Point(_) | Shape::Cloud(_) => return false,
        }
        true
    }

    pub fn set_length(&mut self, length: u32) -> bool {
        match &mut self.shape {
            Shape::Beam(beam) => {
                beam.length = length;
                true
            }
            _ => false,
        }
    }

    pub fn set_volume(&mut self, volume: u32) -> bool {
        match &mut self.shape {
            Shape::Cloud(cloud) => {
                cloud.volume = volume;
                true
            }
            _ => false,
        }
    }

    /// Accreting clouds keep their spill between `find_area` calls.
    pub fn set_expanding(&mut self, expanding: bool) -> bool {
        match &mut self.shape {
            Shape::Cloud(cloud) => {
                cloud.expanding = expanding;
                if !expanding && let Some(spill) = &mut cloud.spill {
                    spill.reset();
                }
                true
            }
            _ => false,
        }
    }

    /// Cells affected by the current state. Empty until a grid is attached.
    pub fn find_area(&mut self) -> AreaMap {
        let Some(surface) = &mut self.surface else {
            return AreaMap::new();
        };
        match &mut self.shape {
            Shape::Point(point) => point::area(surface, point.center),
            Shape::Beam(beam) => beam::area(surface, self.origin, beam.aim, beam.end, beam.radius),
            Shape::Cone(cone) => {
                cone::area(surface, self.origin, cone.angle, cone.radius, cone.span, self.metric)
            }
            Shape::Cloud(cloud) => cloud::area(cloud),
        }
    }

    /// Closed-form check that at least one of `targets` could be inside the
    /// current area. Used to skip the optimizer when nothing is plausible.
    pub fn may_contain_target(&self, targets: &[Cell]) -> bool {
        match &self.shape {
            Shape::Point(point) => point::may_contain(point.center, targets),
            Shape::Beam(beam) => beam::may_contain(self.origin, beam, targets),
            Shape::Cone(cone) => cone::may_contain(self.origin, cone, self.metric, targets),
            Shape::Cloud(cloud) => cloud::may_contain(cloud, targets),
        }
    }

    /// The area this effect would cover if it were aimed at `aim` from the
    /// current origin. The aim state itself is left alone; empty when the aim
    /// is illegal or no grid is attached.
    pub fn area_aimed_at(&mut self, aim: Cell) -> AreaMap {
        if !verify_limit(self.reach.aim_limit(), self.origin, aim) {
            return AreaMap::new();
        }
        let Some(surface) = &mut self.surface else {
            return AreaMap::new();
        };
        if !surface.grid.in_bounds(aim) {
            return AreaMap::new();
        }
        match &self.shape {
            Shape::Point(_) => point::area(surface, aim),
            Shape::Beam(beam) => {
                if aim == self.origin {
                    return AreaMap::new();
                }
                let end = extend(
                    self.origin,
                    aim,
                    f64::from(beam.length),
                    self.metric,
                    surface.grid.width(),
                    surface.grid.height(),
                );
                beam::area(surface, self.origin, aim, end, beam.radius)
            }
            Shape::Cone(cone) => {
                if aim == self.origin {
                    return AreaMap::new();
                }
                let angle = angle_degrees(self.origin, aim);
                cone::area(surface, self.origin, angle, cone.radius, cone.span, self.metric)
            }
            Shape::Cloud(cloud) => {
                let mut spill = Spill::new(&surface.grid, cloud.seed);
                spill.start(aim, cloud.volume, &[]).into_iter().map(|cell| (cell, 1.0)).collect()
            }
        }
    }
}
