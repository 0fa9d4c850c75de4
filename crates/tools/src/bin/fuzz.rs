use std::io;

use anyhow::{Result, bail};
use clap::Parser;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use tactics::{
    Aoe, Cell, ChokepointStrategy, CostField, Grid, Metric, Reach, Tile, WaypointConfig,
    WaypointPathfinder, verify_reach,
};
use tracing::{Level, debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 100)]
    grids: u32,
    /// Side length of each square grid
    #[arg(long, default_value_t = 16)]
    size: usize,
}

const METRICS: [Metric; 3] = [Metric::Manhattan, Metric::Chebyshev, Metric::Euclidean];

fn choose<T: Clone>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p].clone()
}

fn random_cell(rng: &mut ChaCha8Rng, size: usize) -> Cell {
    let x = (rng.next_u64() as usize % size) as i32;
    let y = (rng.next_u64() as usize % size) as i32;
    Cell::new(x, y)
}

fn random_grid(rng: &mut ChaCha8Rng, size: usize) -> Grid {
    let mut grid = Grid::open(size, size);
    let cells: Vec<Cell> = grid.cells().collect();
    for cell in cells {
        if rng.next_u64() % 4 == 0 {
            grid.set_tile(cell, Tile::Wall);
        }
    }
    grid
}

fn check_edges(grid: &Grid, finder: &WaypointPathfinder) -> Result<()> {
    let mut field = CostField::new(grid, finder.metric());
    for edge in finder.edges() {
        if edge.path.first() != Some(&edge.from) || edge.path.last() != Some(&edge.to) {
            bail!("edge {:?} -> {:?} has mismatched endpoints", edge.from, edge.to);
        }
        if let Some(cell) = edge.path.iter().find(|cell| !grid.is_walkable(**cell)) {
            bail!("edge {:?} -> {:?} crosses wall at {cell:?}", edge.from, edge.to);
        }
        if edge.path.windows(2).any(|pair| Metric::Chebyshev.distance(pair[0], pair[1]) != 1.0) {
            bail!("edge {:?} -> {:?} skips cells", edge.from, edge.to);
        }
        if edge.cost < 0.0 {
            bail!("edge {:?} -> {:?} has negative cost {}", edge.from, edge.to, edge.cost);
        }
        let mut scope = field.scope();
        scope.set_goal(edge.from);
        scope.scan(&[]);
        if scope.value_at(edge.to) != edge.cost {
            bail!("edge {:?} -> {:?} cost {} disagrees with a rescan", edge.from, edge.to, edge.cost);
        }
    }
    Ok(())
}

fn check_exclusivity(grid: &Grid, rng: &mut ChaCha8Rng, size: usize) -> Result<()> {
    let origin = random_cell(rng, size);
    let reach = Reach::new(0, 6, choose(rng, &METRICS))?;
    let targets: Vec<Cell> = (0..3).map(|_| random_cell(rng, size)).collect();
    let exclusions: Vec<Cell> = (0..2).map(|_| random_cell(rng, size)).collect();
    let volume = 1 + (rng.next_u64() % 6) as u32;
    let mut shapes = [
        Aoe::point(origin, origin).with_reach(reach),
        Aoe::beam(origin, origin, 5, 0).with_reach(reach),
        Aoe::cloud(origin, origin, volume, rng.next_u64()).with_reach(reach),
    ];
    for aoe in &mut shapes {
        aoe.set_map(grid);
        let locations = aoe.ideal_locations(&targets, &exclusions)?;
        for exclusion in &exclusions {
            let covered = aoe.area_aimed_at(*exclusion);
            if let Some(cell) = locations.keys().find(|cell| covered.contains_key(cell)) {
                bail!("{} at {cell:?} fires into exclusion {exclusion:?}", aoe.shape().name());
            }
        }
        if let Some(cell) = locations.keys().find(|cell| !verify_reach(&reach, origin, **cell)) {
            bail!("{} placement {cell:?} lies outside its reach", aoe.shape().name());
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    if args.size == 0 {
        bail!("grid size must be positive");
    }
    info!(seed = args.seed, grids = args.grids, size = args.size, "starting fuzz run");
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);

    for round in 0..args.grids {
        let grid = random_grid(&mut rng, args.size);
        let strategies = [
            ChokepointStrategy::FloodExpansion { center_spacing: 4.0, seed: rng.next_u64() },
            ChokepointStrategy::ThickCorridor { thickness: 1, min_separation: 2 },
            ChokepointStrategy::Fraction { every: 3 + (rng.next_u64() % 20) as usize },
        ];
        for strategy in strategies {
            let metric = choose(&mut rng, &METRICS);
            let config = WaypointConfig { strategy, ..WaypointConfig::default() };
            let finder = WaypointPathfinder::new(&grid, metric, config);
            check_edges(&grid, &finder)?;

            let from = random_cell(&mut rng, args.size);
            let to = random_cell(&mut rng, args.size);
            let path = finder.get_known_path(from, to);
            if let Some(cell) = path.iter().find(|cell| !grid.is_walkable(**cell)) {
                bail!("round {round}: route {from:?} -> {to:?} enters wall at {cell:?}");
            }
            debug!(round, ?strategy, chokepoints = finder.chokepoints().len(), "graph checked");
        }
        check_exclusivity(&grid, &mut rng, args.size)?;
    }

    info!(grids = args.grids, "fuzzing completed successfully");
    Ok(())
}
