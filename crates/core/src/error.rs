//! Error types for grid construction and targeting configuration.
//!
//! Geometry itself never fails: clipped, blocked or unreachable requests come
//! back as empty areas, empty placements or empty paths. Only malformed input
//! (an unparsable grid, an inverted reach, an oversized target tier) is an error.

use crate::aoe::Tier;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("grid text contains no rows")]
    Empty,

    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },

    #[error("unknown glyph {glyph:?} at row {row}, column {column}")]
    UnknownGlyph { row: usize, column: usize, glyph: char },
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum TargetingError {
    #[error("reach minimum {min} exceeds maximum {max}")]
    InvertedReach { min: u32, max: u32 },

    /// Each tier is tracked in a 63-bit mask; larger tiers are rejected
    /// instead of being truncated.
    #[error("{count} {tier:?} targets exceed the per-tier limit of {limit}")]
    TooManyTargets { tier: Tier, count: usize, limit: usize },

    #[error("invalid shape parameter: {0}")]
    InvalidShape(&'static str),
}
