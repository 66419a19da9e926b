//! Fixed-size tile grid with edge-aware collision lookup

use glam::{IVec2, Vec2};

use super::rect::Rect;
use super::tile::{CollisionKind, Tile};
use crate::consts::{TILE_HEIGHT, TILE_WIDTH};

/// Width × height cells, row-major. Dimensions never change after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    width: i32,
    height: i32,
    cells: Vec<Tile>,
}

impl TileGrid {
    /// Create a grid filled with passable tiles
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "grid must have at least one cell");
        Self {
            width: width as i32,
            height: height as i32,
            cells: vec![Tile::PASSABLE; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Last row index; column collapses never settle below it
    #[inline]
    pub fn floor_row(&self) -> i32 {
        self.height - 1
    }

    pub fn pixel_width(&self) -> f32 {
        (self.width * TILE_WIDTH) as f32
    }

    pub fn pixel_height(&self) -> f32 {
        (self.height * TILE_HEIGHT) as f32
    }

    #[inline]
    pub fn in_bounds(&self, col: i32, row: i32) -> bool {
        (0..self.width).contains(&col) && (0..self.height).contains(&row)
    }

    #[inline]
    fn index(&self, col: i32, row: i32) -> usize {
        (row * self.width + col) as usize
    }

    /// Collision kind at a cell, with level-edge semantics
    ///
    /// Columns outside the grid are walls so nothing escapes the sides. Rows
    /// outside the grid are open so bodies can jump above the top and fall out
    /// of the bottom.
    pub fn collision_at(&self, col: i32, row: i32) -> CollisionKind {
        if col < 0 || col >= self.width {
            return CollisionKind::Impassable;
        }
        if row < 0 || row >= self.height {
            return CollisionKind::Passable;
        }
        self.cells[self.index(col, row)].collision
    }

    /// Tile stored at an in-range cell
    pub fn tile(&self, coord: IVec2) -> Option<Tile> {
        self.in_bounds(coord.x, coord.y)
            .then(|| self.cells[self.index(coord.x, coord.y)])
    }

    /// Overwrite a cell. Writing outside the grid is a caller bug.
    pub fn set_cell(&mut self, col: i32, row: i32, tile: Tile) {
        assert!(
            self.in_bounds(col, row),
            "set_cell({col}, {row}) outside {}x{} grid",
            self.width,
            self.height
        );
        let index = self.index(col, row);
        self.cells[index] = tile;
    }

    /// World-space rectangle covered by a cell
    pub fn bounds_of(&self, col: i32, row: i32) -> Rect {
        tile_bounds(col, row)
    }

    /// Grid as level-file text, one line per row
    pub fn to_ascii(&self) -> Vec<String> {
        self.cells
            .chunks(self.width as usize)
            .map(|row| row.iter().map(|tile| tile.to_char()).collect())
            .collect()
    }

    /// All coordinates in row-major order
    pub fn coords(&self) -> impl Iterator<Item = IVec2> + '_ {
        (0..self.height).flat_map(move |row| (0..self.width).map(move |col| IVec2::new(col, row)))
    }
}

/// World-space rectangle of a tile coordinate (no grid needed)
#[inline]
pub fn tile_bounds(col: i32, row: i32) -> Rect {
    Rect::new(col * TILE_WIDTH, row * TILE_HEIGHT, TILE_WIDTH, TILE_HEIGHT)
}

/// Cell containing a world-space point
#[inline]
pub fn world_to_tile(point: Vec2) -> IVec2 {
    IVec2::new(
        (point.x / TILE_WIDTH as f32).floor() as i32,
        (point.y / TILE_HEIGHT as f32).floor() as i32,
    )
}

/// World-space center of a tile, as used for entity positions
#[inline]
pub fn tile_center(coord: IVec2) -> Vec2 {
    tile_bounds(coord.x, coord.y).center().as_vec2()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_grid_is_passable() {
        let grid = TileGrid::new(4, 3);
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.floor_row(), 2);
        assert!(grid.coords().all(|c| grid.collision_at(c.x, c.y) == CollisionKind::Passable));
        assert_eq!(grid.coords().count(), 12);
    }

    #[test]
    fn test_set_cell() {
        let mut grid = TileGrid::new(4, 3);
        grid.set_cell(2, 1, Tile::bare(CollisionKind::DropTile));
        assert_eq!(grid.collision_at(2, 1), CollisionKind::DropTile);
        assert_eq!(grid.collision_at(1, 2), CollisionKind::Passable);
        assert_eq!(grid.tile(IVec2::new(2, 1)), Some(Tile::bare(CollisionKind::DropTile)));
        assert_eq!(grid.tile(IVec2::new(9, 1)), None);
    }

    #[test]
    fn test_to_ascii() {
        let mut grid = TileGrid::new(3, 2);
        grid.set_cell(0, 1, Tile::bare(CollisionKind::Impassable));
        grid.set_cell(1, 0, Tile::bare(CollisionKind::PositiveTile));
        grid.set_cell(2, 1, Tile::bare(CollisionKind::EmptyTile));
        assert_eq!(grid.to_ascii(), vec![".+.".to_string(), "#.:".to_string()]);
    }

    #[test]
    #[should_panic]
    fn test_set_cell_out_of_range_panics() {
        let mut grid = TileGrid::new(2, 2);
        grid.set_cell(2, 0, Tile::PASSABLE);
    }

    #[test]
    fn test_corner_outside_both_axes_is_wall() {
        // Column check wins over row check
        let grid = TileGrid::new(2, 2);
        assert_eq!(grid.collision_at(-1, -1), CollisionKind::Impassable);
        assert_eq!(grid.collision_at(2, 5), CollisionKind::Impassable);
    }

    #[test]
    fn test_bounds_and_world_to_tile() {
        let grid = TileGrid::new(10, 10);
        assert_eq!(grid.bounds_of(2, 3), Rect::new(96, 144, 48, 48));
        assert_eq!(world_to_tile(Vec2::new(96.0, 191.9)), IVec2::new(2, 3));
        assert_eq!(world_to_tile(Vec2::new(-0.5, 0.0)), IVec2::new(-1, 0));
        assert_eq!(tile_center(IVec2::new(1, 0)), Vec2::new(72.0, 24.0));
        assert_eq!(grid.pixel_width(), 480.0);
    }

    proptest! {
        #[test]
        fn prop_columns_outside_are_impassable(
            w in 1usize..20, h in 1usize..20, row in -50i32..50, off in 0i32..50
        ) {
            let grid = TileGrid::new(w, h);
            prop_assert_eq!(grid.collision_at(-1 - off, row), CollisionKind::Impassable);
            prop_assert_eq!(grid.collision_at(w as i32 + off, row), CollisionKind::Impassable);
        }

        #[test]
        fn prop_rows_outside_are_passable(
            w in 1usize..20, h in 1usize..20, col_seed in 0usize..20, off in 0i32..50
        ) {
            let mut grid = TileGrid::new(w, h);
            for c in grid.coords().collect::<Vec<_>>() {
                grid.set_cell(c.x, c.y, Tile::bare(CollisionKind::Impassable));
            }
            let col = (col_seed % w) as i32;
            prop_assert_eq!(grid.collision_at(col, -1 - off), CollisionKind::Passable);
            prop_assert_eq!(grid.collision_at(col, h as i32 + off), CollisionKind::Passable);
        }
    }
}
