//! Integer axis-aligned rectangles in world pixels
//!
//! Y grows downward: `top` is the smallest y, `bottom` is one past the last row.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn left(&self) -> i32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    #[inline]
    pub fn top(&self) -> i32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Integer center (rounds toward the top-left)
    pub fn center(&self) -> IVec2 {
        IVec2::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Bottom edge midpoint, used as a standing position
    pub fn bottom_center(&self) -> Vec2 {
        Vec2::new(self.x as f32 + self.width as f32 / 2.0, self.bottom() as f32)
    }

    /// Half-open containment: left/top edges are inside, right/bottom are not
    pub fn contains(&self, point: IVec2) -> bool {
        point.x >= self.left() && point.x < self.right() && point.y >= self.top() && point.y < self.bottom()
    }

    /// Signed penetration depth of `self` into `other`
    ///
    /// Each component is the distance `self` must move along that axis to stop
    /// overlapping; its sign points away from `other`. Returns `Vec2::ZERO` when
    /// the rectangles do not overlap (edges touching counts as no overlap).
    pub fn intersection_depth(&self, other: &Rect) -> Vec2 {
        let half_a = Vec2::new(self.width as f32, self.height as f32) / 2.0;
        let half_b = Vec2::new(other.width as f32, other.height as f32) / 2.0;

        let center_a = Vec2::new(self.left() as f32, self.top() as f32) + half_a;
        let center_b = Vec2::new(other.left() as f32, other.top() as f32) + half_b;

        let distance = center_a - center_b;
        let min_distance = half_a + half_b;

        if distance.x.abs() >= min_distance.x || distance.y.abs() >= min_distance.y {
            return Vec2::ZERO;
        }

        let depth_x = if distance.x > 0.0 {
            min_distance.x - distance.x
        } else {
            -min_distance.x - distance.x
        };
        let depth_y = if distance.y > 0.0 {
            min_distance.y - distance.y
        } else {
            -min_distance.y - distance.y
        };
        Vec2::new(depth_x, depth_y)
    }
}
