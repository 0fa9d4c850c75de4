//! Scenario files: a grid, some AOE queries and optional waypoint routes,
//! evaluated into a JSON-friendly report.

use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tactics::{AoeConfig, Cell, Grid, Metric, TargetHit, WaypointConfig, WaypointPathfinder};
use tracing::{debug, info};

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Scenario {
    /// Rows of `#` and `.`.
    pub grid: String,
    #[serde(default)]
    pub aoe: Vec<AoeQuery>,
    #[serde(default)]
    pub waypoint: Option<WaypointQuery>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct AoeQuery {
    pub name: String,
    pub shape: AoeConfig,
    #[serde(default)]
    pub priority: Vec<Cell>,
    #[serde(default)]
    pub targets: Vec<Cell>,
    #[serde(default)]
    pub exclusions: Vec<Cell>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct WaypointQuery {
    #[serde(default)]
    pub metric: Metric,
    #[serde(default)]
    pub config: WaypointConfig,
    #[serde(default)]
    pub routes: Vec<RouteQuery>,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct RouteQuery {
    pub from: Cell,
    pub to: Cell,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub aoe: Vec<AoeReport>,
    pub waypoint: Option<WaypointReport>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AoeReport {
    pub name: String,
    pub kind: String,
    pub area: Vec<AffectedCell>,
    pub may_contain_target: bool,
    pub ideal_locations: Vec<Placement>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AffectedCell {
    pub cell: Cell,
    pub weight: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub cell: Cell,
    pub hits: Vec<TargetHit>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaypointReport {
    pub chokepoints: Vec<Cell>,
    pub edges: usize,
    pub fingerprint: u64,
    pub routes: Vec<RouteReport>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteReport {
    pub from: Cell,
    pub to: Cell,
    pub path: Vec<Cell>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario file: {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("Failed to parse scenario TOML: {}", path.display()))
    }

    pub fn run(&self) -> Result<Report> {
        let grid = Grid::parse(&self.grid).context("Scenario grid is malformed")?;
        info!(width = grid.width(), height = grid.height(), "grid loaded");

        let mut aoe_reports = Vec::with_capacity(self.aoe.len());
        for query in &self.aoe {
            aoe_reports.push(run_aoe(&grid, query)?);
        }
        let waypoint = self.waypoint.as_ref().map(|query| run_waypoint(&grid, query));
        Ok(Report { aoe: aoe_reports, waypoint })
    }
}

fn run_aoe(grid: &Grid, query: &AoeQuery) -> Result<AoeReport> {
    let mut aoe = query.shape.build().with_context(|| format!("Invalid AOE '{}'", query.name))?;
    aoe.set_map(grid);

    let area = aoe.find_area().into_iter().map(|(cell, weight)| AffectedCell { cell, weight }).collect();
    let all_targets: Vec<Cell> = query.priority.iter().chain(&query.targets).copied().collect();
    let may_contain_target = aoe.may_contain_target(&all_targets);
    let ideal_locations = aoe
        .ideal_locations_prioritized(&query.priority, &query.targets, &query.exclusions)
        .with_context(|| format!("Cannot place AOE '{}'", query.name))?
        .into_iter()
        .map(|(cell, hits)| Placement { cell, hits })
        .collect::<Vec<_>>();
    debug!(name = %query.name, placements = ideal_locations.len(), "aoe evaluated");

    Ok(AoeReport {
        name: query.name.clone(),
        kind: aoe.shape().name().to_owned(),
        area,
        may_contain_target,
        ideal_locations,
    })
}

fn run_waypoint(grid: &Grid, query: &WaypointQuery) -> WaypointReport {
    let finder = WaypointPathfinder::new(grid, query.metric, query.config);
    let routes = query
        .routes
        .iter()
        .map(|route| RouteReport {
            from: route.from,
            to: route.to,
            path: finder.get_known_path(route.from, route.to),
        })
        .collect();
    WaypointReport {
        chokepoints: finder.chokepoints().to_vec(),
        edges: finder.edges().count(),
        fingerprint: finder.fingerprint(),
        routes,
    }
}

impl Report {
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty { serde_json::to_string_pretty(self) } else { serde_json::to_string(self) };
        json.context("Failed to serialize report")
    }

    /// Writes through a sibling temp file so readers never see a partial report.
    pub fn write_atomic(&self, path: &Path, pretty: bool) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = path.with_extension("json.tmp");
        let json = self.to_json(pretty).map_err(io::Error::other)?;
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tactics::Tier;
    use tempfile::tempdir;

    const SCENARIO: &str = r#"
grid = """
.....
..#..
..#..
..#..
.....
"""

[[aoe]]
name = "blast"
targets = [{ x = 3, y = 3 }]
shape = { kind = "point", origin = { x = 0, y = 0 }, center = { x = 3, y = 3 }, reach = { min = 0, max = 6, shape = "square" } }

[[aoe]]
name = "ray"
targets = [{ x = 4, y = 2 }]
shape = { kind = "beam", origin = { x = 0, y = 2 }, end = { x = 4, y = 2 }, length = 4 }

[waypoint]
metric = "manhattan"
config = { strategy = { kind = "fraction", every = 4 } }
routes = [{ from = { x = 0, y = 0 }, to = { x = 4, y = 4 } }]
"#;

    #[test]
    fn scenario_file_loads_and_runs() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("scenario.toml");
        fs::write(&path, SCENARIO).expect("write scenario");

        let scenario = Scenario::load(&path).expect("load");
        let report = scenario.run().expect("run");

        let blast = &report.aoe[0];
        assert_eq!(blast.kind, "point");
        assert_eq!(blast.area, vec![AffectedCell { cell: Cell::new(3, 3), weight: 1.0 }]);
        assert!(blast.may_contain_target);
        assert_eq!(
            blast.ideal_locations,
            vec![Placement { cell: Cell::new(3, 3), hits: vec![TargetHit::new(Cell::new(3, 3), Tier::Lesser)] }]
        );

        let ray = &report.aoe[1];
        assert!(ray.area.iter().any(|affected| affected.cell == Cell::new(2, 4)));

        let waypoint = report.waypoint.as_ref().expect("waypoint section");
        assert!(!waypoint.chokepoints.is_empty());
        assert_eq!(waypoint.routes.len(), 1);
    }

    #[test]
    fn report_atomic_write_and_reload() {
        let scenario: Scenario = toml::from_str(SCENARIO).expect("parse");
        let report = scenario.run().expect("run");

        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("out").join("report.json");
        report.write_atomic(&path, true).expect("write");

        let loaded: Report = serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("decode");
        assert_eq!(loaded, report);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn malformed_grid_is_reported() {
        let scenario = Scenario { grid: "..\n.".to_owned(), aoe: Vec::new(), waypoint: None };
        let err = scenario.run().expect_err("ragged grid");
        assert!(format!("{err:#}").contains("row 1 has 1 cells"));
    }
}
