use super::AreaMap;
use crate::spill::Spill;
use crate::types::{Cell, Metric};

#[derive(Clone, Debug)]
pub struct Cloud {
    pub(super) center: Cell,
    pub(super) volume: u32,
    pub(super) seed: u64,
    pub(super) expanding: bool,
    pub(super) spill: Option<Spill>,
}

impl Cloud {
    pub(super) fn new(center: Cell, volume: u32, seed: u64) -> Self {
        Self { center, volume, seed, expanding: false, spill: None }
    }

    pub fn center(&self) -> Cell {
        self.center
    }

    pub fn volume(&self) -> u32 {
        self.volume
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn expanding(&self) -> bool {
        self.expanding
    }
}

/// Spills from the center. A fixed cloud rewinds afterwards so the next call
/// draws the same blob; an expanding one keeps growing.
pub(super) fn area(cloud: &mut Cloud) -> AreaMap {
    let Some(spill) = &mut cloud.spill else {
        return AreaMap::new();
    };
    let cells = spill.start(cloud.center, cloud.volume, &[]);
    if !cloud.expanding {
        spill.reset();
    }
    cells.into_iter().map(|cell| (cell, 1.0)).collect()
}

pub(super) fn may_contain(cloud: &Cloud, targets: &[Cell]) -> bool {
    let Some(limit) = cloud.volume.checked_sub(1) else {
        return false;
    };
    targets.iter().any(|target| Metric::Manhattan.distance(cloud.center, *target) <= f64::from(limit))
}
