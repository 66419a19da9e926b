//! Body-versus-grid collision resolution
//!
//! Bodies are axis-aligned boxes anchored at their bottom-center. Each
//! overlapped tile is resolved along its shallower penetration axis, one tile
//! at a time, with the box recomputed after every correction.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::grid::TileGrid;
use super::rect::Rect;
use super::tile::CollisionKind;
use crate::consts::{TILE_HEIGHT, TILE_WIDTH};
use crate::round_px;

/// A movable box that collides with the tile grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionBox {
    /// Bottom-center of the box in world pixels
    pub position: Vec2,
    pub size: IVec2,
    /// Bottom edge after last tick's resolution
    pub previous_bottom: i32,
}

impl CollisionBox {
    pub fn new(position: Vec2, size: IVec2) -> Self {
        let mut body = Self {
            position,
            size,
            previous_bottom: 0,
        };
        body.previous_bottom = body.bounds().bottom();
        body
    }

    /// Pixel rectangle covered by the box
    pub fn bounds(&self) -> Rect {
        let left = round_px(self.position.x - self.size.x as f32 / 2.0) as i32;
        let top = round_px(self.position.y) as i32 - self.size.y;
        Rect::new(left, top, self.size.x, self.size.y)
    }
}

/// Inclusive tile range covered by a rectangle: (min corner, max corner)
pub fn overlapped_tiles(bounds: &Rect) -> (IVec2, IVec2) {
    let tw = TILE_WIDTH as f32;
    let th = TILE_HEIGHT as f32;
    let min = IVec2::new(
        (bounds.left() as f32 / tw).floor() as i32,
        (bounds.top() as f32 / th).floor() as i32,
    );
    let max = IVec2::new(
        (bounds.right() as f32 / tw).ceil() as i32 - 1,
        (bounds.bottom() as f32 / th).ceil() as i32 - 1,
    );
    (min, max)
}

/// Push a body out of every tile it overlaps. Returns true if it ended up
/// standing on something.
///
/// Platforms always resolve vertically and only hold the body once it has
/// landed on them from above. Exit tiles never collide.
pub fn resolve_tile_collisions(body: &mut CollisionBox, grid: &TileGrid) -> bool {
    let mut bounds = body.bounds();
    let (min, max) = overlapped_tiles(&bounds);
    let mut grounded = false;

    for row in min.y..=max.y {
        for col in min.x..=max.x {
            let kind = grid.collision_at(col, row);
            if !kind.is_collidable() {
                continue;
            }

            let tile_bounds = grid.bounds_of(col, row);
            let depth = bounds.intersection_depth(&tile_bounds);
            if depth == Vec2::ZERO {
                continue;
            }

            if depth.y.abs() < depth.x.abs() || kind == CollisionKind::Platform {
                // Came down onto the top of the tile
                if body.previous_bottom <= tile_bounds.top() {
                    grounded = true;
                }
                if kind.is_solid() || grounded {
                    body.position.y += depth.y;
                    bounds = body.bounds();
                }
            } else if kind.is_solid() {
                body.position.x += depth.x;
                bounds = body.bounds();
            }
        }
    }

    body.previous_bottom = bounds.bottom();
    grounded
}
