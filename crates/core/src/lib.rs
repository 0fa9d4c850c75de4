pub mod aoe;
pub mod config;
pub mod error;
pub mod field;
pub mod fov;
pub mod geometry;
pub mod grid;
pub mod los;
pub mod pathing;
pub mod reach;
pub mod sampling;
pub mod spill;
pub mod types;
pub mod waypoint;

#[cfg(test)]
mod test_support;

pub use aoe::{Aoe, AreaMap, IdealLocations, MAX_TARGETS_PER_TIER, Shape, TargetHit, Tier};
pub use config::{AoeConfig, ChokepointStrategy, ReachConfig, WaypointConfig};
pub use error::{GridError, TargetingError};
pub use field::{CostField, ScanScope};
pub use grid::{Grid, Resistance};
pub use los::LineTracer;
pub use reach::{Reach, verify_limit, verify_reach};
pub use spill::Spill;
pub use types::*;
pub use waypoint::{Edge, WaypointPathfinder};
