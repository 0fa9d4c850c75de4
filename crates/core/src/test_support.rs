//! Shared grid fixtures for the unit test suites.
//! Keeps the recurring maps in one place; nothing here is used outside tests.

use crate::grid::Grid;
use crate::types::{Cell, Tile};

/// 5x5 open grid with a wall column at x = 2 covering rows 0..=3; row 4 is
/// the only crossing.
pub(crate) fn walled_column_grid() -> Grid {
    let mut grid = Grid::open(5, 5);
    for y in 0..4 {
        grid.set_tile(Cell::new(2, y), Tile::Wall);
    }
    grid
}

/// Two 5x5 rooms joined by a single doorway at (6, 3).
pub(crate) fn two_rooms_grid() -> Grid {
    Grid::parse(
        "
        #############
        #.....#.....#
        #.....#.....#
        #...........#
        #.....#.....#
        #.....#.....#
        #############
        ",
    )
    .expect("fixture grid is well formed")
}

/// A single horizontal corridor of floor in an otherwise solid grid.
pub(crate) fn corridor_grid(length: usize) -> Grid {
    let mut grid = Grid::open(length + 2, 3);
    for cell in grid.clone().cells() {
        if cell.y != 1 || cell.x == 0 || cell.x as usize == length + 1 {
            grid.set_tile(cell, Tile::Wall);
        }
    }
    grid
}
