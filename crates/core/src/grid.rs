//! Rectangular obstacle grids and the resistance maps derived from them.

use crate::error::GridError;
use crate::types::{Cell, Tile};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl Grid {
    /// An all-floor grid.
    pub fn open(width: usize, height: usize) -> Self {
        Self { width, height, tiles: vec![Tile::Floor; width * height] }
    }

    /// A floor grid enclosed by a one-cell wall border.
    pub fn walled(width: usize, height: usize) -> Self {
        let mut grid = Self::open(width, height);
        if width == 0 || height == 0 {
            return grid;
        }
        for x in 0..width {
            grid.tiles[x] = Tile::Wall;
            grid.tiles[(height - 1) * width + x] = Tile::Wall;
        }
        for y in 0..height {
            grid.tiles[y * width] = Tile::Wall;
            grid.tiles[y * width + (width - 1)] = Tile::Wall;
        }
        grid
    }

    /// Parses rows of `#` (wall) and `.` (floor). Blank lines are skipped and
    /// each row is trimmed.
    pub fn parse(text: &str) -> Result<Self, GridError> {
        let rows: Vec<&str> =
            text.lines().map(str::trim).filter(|line| !line.is_empty()).collect();
        let Some(first) = rows.first() else {
            return Err(GridError::Empty);
        };
        let width = first.chars().count();
        let mut tiles = Vec::with_capacity(width * rows.len());
        for (row, line) in rows.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(GridError::RaggedRow { row, expected: width, found });
            }
            for (column, glyph) in line.chars().enumerate() {
                tiles.push(match glyph {
                    '#' => Tile::Wall,
                    '.' => Tile::Floor,
                    _ => return Err(GridError::UnknownGlyph { row, column, glyph }),
                });
            }
        }
        Ok(Self { width, height: rows.len(), tiles })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0
            && cell.y >= 0
            && (cell.x as usize) < self.width
            && (cell.y as usize) < self.height
    }

    pub fn tile_at(&self, cell: Cell) -> Tile {
        match self.index_of(cell) {
            Some(idx) => self.tiles[idx],
            None => Tile::Wall,
        }
    }

    pub fn set_tile(&mut self, cell: Cell, tile: Tile) {
        if let Some(idx) = self.index_of(cell) {
            self.tiles[idx] = tile;
        }
    }

    pub fn is_walkable(&self, cell: Cell) -> bool {
        self.tile_at(cell) == Tile::Floor
    }

    /// Row-major index of an in-bounds cell.
    pub fn index_of(&self, cell: Cell) -> Option<usize> {
        self.in_bounds(cell).then(|| (cell.y as usize) * self.width + (cell.x as usize))
    }

    pub fn cell_at(&self, idx: usize) -> Cell {
        Cell::new((idx % self.width) as i32, (idx / self.width) as i32)
    }

    /// Every cell in scan order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.tiles.len()).map(|idx| self.cell_at(idx))
    }

    pub fn walkable_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells().filter(|&cell| self.is_walkable(cell))
    }

    pub fn resistance(&self) -> Resistance {
        Resistance::from_grid(self)
    }

    /// Nearest walkable cell to `desired` by squared Euclidean distance,
    /// lowest `(y, x)` winning ties.
    pub fn nearest_walkable(&self, desired: Cell) -> Option<Cell> {
        if self.is_walkable(desired) {
            return Some(desired);
        }
        self.walkable_cells().min_by_key(|cell| {
            let dx = i64::from(cell.x - desired.x);
            let dy = i64::from(cell.y - desired.y);
            (dx * dx + dy * dy, *cell)
        })
    }
}

/// Per-cell opacity: 1.0 blocks sight and beams, 0.0 is fully transparent.
#[derive(Clone, Debug, PartialEq)]
pub struct Resistance {
    width: usize,
    height: usize,
    values: Vec<f64>,
}

impl Resistance {
    pub fn from_grid(grid: &Grid) -> Self {
        let values = grid
            .tiles
            .iter()
            .map(|tile| match tile {
                Tile::Wall => 1.0,
                Tile::Floor => 0.0,
            })
            .collect();
        Self { width: grid.width, height: grid.height, values }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0
            && cell.y >= 0
            && (cell.x as usize) < self.width
            && (cell.y as usize) < self.height
    }

    /// Out-of-bounds cells are fully opaque.
    pub fn at(&self, cell: Cell) -> f64 {
        if !self.in_bounds(cell) {
            return 1.0;
        }
        self.values[(cell.y as usize) * self.width + (cell.x as usize)]
    }

    pub fn is_opaque(&self, cell: Cell) -> bool {
        self.at(cell) >= 1.0
    }
}
