//! Serializable descriptions of AOEs and pathfinder setups.
//! Scenario files deserialize into these; `build` turns them into live values.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::aoe::Aoe;
use crate::error::TargetingError;
use crate::reach::Reach;
use crate::types::{AimLimit, Cell, Metric, RadiusShape};

/// How phase one of the waypoint pathfinder picks chokepoints.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChokepointStrategy {
    FloodExpansion {
        #[serde(default = "default_center_spacing")]
        center_spacing: f64,
        #[serde(default)]
        seed: u64,
    },
    ThickCorridor {
        #[serde(default = "default_thickness")]
        thickness: u32,
        #[serde(default = "default_min_separation")]
        min_separation: u32,
    },
    Fraction {
        #[serde(default = "default_every")]
        every: usize,
    },
}

fn default_center_spacing() -> f64 {
    8.0
}

fn default_thickness() -> u32 {
    1
}

fn default_min_separation() -> u32 {
    2
}

fn default_every() -> usize {
    29
}

impl Default for ChokepointStrategy {
    fn default() -> Self {
        Self::FloodExpansion { center_spacing: default_center_spacing(), seed: 0 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaypointConfig {
    pub strategy: ChokepointStrategy,
    /// Chokepoints near the destination considered per query.
    pub nearest_candidates: usize,
    /// Node expansions allowed when walking onto a cached path.
    pub on_ramp_budget: usize,
}

impl Default for WaypointConfig {
    fn default() -> Self {
        Self { strategy: ChokepointStrategy::default(), nearest_candidates: 5, on_ramp_budget: 4_096 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReachConfig {
    pub min: u32,
    pub max: u32,
    pub shape: RadiusShape,
    pub limit: AimLimit,
}

impl Default for ReachConfig {
    fn default() -> Self {
        Self { min: 0, max: 1, shape: RadiusShape::Circle, limit: AimLimit::Free }
    }
}

impl ReachConfig {
    pub fn build(&self) -> Result<Reach, TargetingError> {
        Ok(Reach::new(self.min, self.max, Metric::from(self.shape))?.with_aim_limit(self.limit))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AoeConfig {
    Point {
        origin: Cell,
        center: Cell,
        #[serde(default)]
        reach: ReachConfig,
    },
    Beam {
        origin: Cell,
        end: Cell,
        length: u32,
        #[serde(default)]
        radius: u32,
        #[serde(default)]
        shape: RadiusShape,
        #[serde(default)]
        reach: ReachConfig,
    },
    Cone {
        origin: Cell,
        radius: u32,
        span: f64,
        #[serde(default)]
        aim: Option<Cell>,
        #[serde(default)]
        shape: RadiusShape,
        #[serde(default)]
        reach: ReachConfig,
    },
    Cloud {
        origin: Cell,
        center: Cell,
        volume: u32,
        #[serde(default)]
        seed: u64,
        #[serde(default)]
        expanding: bool,
        #[serde(default)]
        reach: ReachConfig,
    },
}

impl AoeConfig {
    pub fn build(&self) -> Result<Aoe, TargetingError> {
        let aoe = match self {
            Self::Point { origin, center, reach } => Aoe::point(*origin, *center).with_reach(reach.build()?),
            Self::Beam { origin, end, length, radius, shape, reach } => {
                if *length == 0 {
                    warn!(?origin, "rejecting beam with zero length");
                    return Err(TargetingError::InvalidShape("beam length must be positive"));
                }
                Aoe::beam(*origin, *end, *length, *radius)
                    .with_metric(Metric::from(*shape))
                    .with_reach(reach.build()?)
            }
            Self::Cone { origin, radius, span, aim, shape, reach } => {
                if !(0.0..=360.0).contains(span) {
                    warn!(?origin, degrees = *span, "rejecting cone span outside 0..=360");
                    return Err(TargetingError::InvalidShape("cone span must be within 0..=360 degrees"));
                }
                let mut aoe = Aoe::cone(*origin, *radius, *span)
                    .with_metric(Metric::from(*shape))
                    .with_reach(reach.build()?);
                if let Some(aim) = aim
                    && !aoe.shift(*aim)
                {
                    warn!(?origin, ?aim, "cone aim rejected by its reach");
                }
                aoe
            }
            Self::Cloud { origin, center, volume, seed, expanding, reach } => {
                let mut aoe = Aoe::cloud(*origin, *center, *volume, *seed).with_reach(reach.build()?);
                aoe.set_expanding(*expanding);
                aoe
            }
        };
        Ok(aoe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aoe::Shape;

    #[test]
    fn waypoint_defaults_fill_missing_fields() {
        let config: WaypointConfig = toml::from_str("nearest_candidates = 3").expect("valid toml");
        assert_eq!(config.nearest_candidates, 3);
        assert_eq!(config.on_ramp_budget, 4_096);
        assert_eq!(config.strategy, ChokepointStrategy::FloodExpansion { center_spacing: 8.0, seed: 0 });
    }

    #[test]
    fn strategies_are_tagged_by_kind() {
        let config: WaypointConfig = toml::from_str(
            r#"
            [strategy]
            kind = "fraction"
            "#,
        )
        .expect("valid toml");
        assert_eq!(config.strategy, ChokepointStrategy::Fraction { every: 29 });

        let json = r#"{"kind":"thick_corridor","thickness":2}"#;
        let strategy: ChokepointStrategy = serde_json::from_str(json).expect("valid json");
        assert_eq!(strategy, ChokepointStrategy::ThickCorridor { thickness: 2, min_separation: 2 });
    }

    #[test]
    fn aoe_configs_build_their_shapes() {
        let config: AoeConfig = toml::from_str(
            r#"
            kind = "beam"
            origin = { x = 0, y = 2 }
            end = { x = 4, y = 2 }
            length = 4
            shape = "square"
            reach = { min = 1, max = 4, shape = "square" }
            "#,
        )
        .expect("valid toml");
        let aoe = config.build().expect("valid beam");
        assert!(matches!(aoe.shape(), Shape::Beam(_)));
        assert_eq!(aoe.metric(), Metric::Chebyshev);
        assert_eq!(aoe.reach().max_distance(), 4);
    }

    #[test]
    fn invalid_configs_are_errors() {
        let inverted = AoeConfig::Point {
            origin: Cell::new(0, 0),
            center: Cell::new(1, 1),
            reach: ReachConfig { min: 3, max: 1, ..ReachConfig::default() },
        };
        assert_eq!(inverted.build().unwrap_err(), TargetingError::InvertedReach { min: 3, max: 1 });

        let wide = AoeConfig::Cone {
            origin: Cell::new(0, 0),
            radius: 3,
            span: 400.0,
            aim: None,
            shape: RadiusShape::Circle,
            reach: ReachConfig::default(),
        };
        assert!(matches!(wide.build(), Err(TargetingError::InvalidShape(_))));
    }
}
