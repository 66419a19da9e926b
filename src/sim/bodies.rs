//! Kinematic bodies: the player and its projectiles

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::collision::{CollisionBox, resolve_tile_collisions};
use super::grid::{TileGrid, world_to_tile};
use super::rect::Rect;
use super::tile::Polarity;
use crate::consts::{PROJECTILE_RADIUS, PROJECTILE_STEP};
use crate::round_px;
use crate::tuning::Tuning;

/// Horizontal facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

/// What happened during one physics step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhysicsReport {
    /// A new jump started this step
    pub jumped: bool,
}

/// The player character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub body: CollisionBox,
    pub velocity: Vec2,
    pub alive: bool,
    pub on_ground: bool,
    was_on_ground: bool,
    pub facing: Facing,
    pub ducking: bool,
    /// Seconds spent in the current jump ascent (0 when not jumping)
    jump_time: f32,
    was_jumping: bool,
    /// Seconds since the last input-driven shot
    pub time_since_shot: f32,
}

impl Player {
    pub fn new(start: Vec2, tuning: &Tuning) -> Self {
        Self {
            body: CollisionBox::new(start, IVec2::new(tuning.player_width, tuning.player_height)),
            velocity: Vec2::ZERO,
            alive: true,
            on_ground: false,
            was_on_ground: false,
            facing: Facing::default(),
            ducking: false,
            jump_time: 0.0,
            was_jumping: false,
            time_since_shot: tuning.fire_cooldown,
        }
    }

    /// Put the player back at a start point, alive and at rest
    pub fn reset(&mut self, start: Vec2) {
        self.body = CollisionBox::new(start, self.body.size);
        self.velocity = Vec2::ZERO;
        self.alive = true;
        self.on_ground = false;
        self.was_on_ground = false;
        self.ducking = false;
        self.jump_time = 0.0;
        self.was_jumping = false;
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.body.position
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        self.body.bounds()
    }

    pub fn is_jumping(&self) -> bool {
        self.jump_time > 0.0
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// Integrate one step of movement and resolve it against the grid
    ///
    /// `movement` is the horizontal control in [-1, 1]; `jumping` is whether
    /// the jump control is held this step.
    pub fn apply_physics(
        &mut self,
        movement: f32,
        jumping: bool,
        dt: f32,
        grid: &TileGrid,
        tuning: &Tuning,
    ) -> PhysicsReport {
        let previous_position = self.body.position;
        let movement = movement.clamp(-1.0, 1.0);

        self.velocity.x += movement * tuning.move_acceleration * dt;
        self.velocity.y = (self.velocity.y + tuning.gravity_acceleration * dt)
            .clamp(-tuning.max_fall_speed, tuning.max_fall_speed);

        let (velocity_y, jumped) = self.do_jump(self.velocity.y, jumping, dt, tuning);
        self.velocity.y = velocity_y;

        // Pseudo-drag
        if self.on_ground {
            self.velocity.x *= tuning.ground_drag_factor;
        } else {
            self.velocity.x *= tuning.air_drag_factor;
        }
        self.velocity.x = self.velocity.x.clamp(-tuning.max_move_speed, tuning.max_move_speed);

        let moved = self.body.position + self.velocity * dt;
        self.body.position = Vec2::new(round_px(moved.x), round_px(moved.y));

        self.was_on_ground = self.on_ground;
        self.on_ground = resolve_tile_collisions(&mut self.body, grid);

        // Blocked on an axis: stop moving along it
        if self.body.position.x == previous_position.x {
            self.velocity.x = 0.0;
        }
        if self.body.position.y == previous_position.y {
            self.velocity.y = 0.0;
        }

        if self.velocity.x > 0.0 {
            self.facing = Facing::Right;
        } else if self.velocity.x < 0.0 {
            self.facing = Facing::Left;
        }

        PhysicsReport { jumped }
    }

    /// Vertical velocity override for a jump in progress
    ///
    /// The ascent follows a power curve of elapsed jump time, giving more
    /// control near the apex. Past `max_jump_time` gravity takes over again.
    fn do_jump(&mut self, velocity_y: f32, jumping: bool, dt: f32, tuning: &Tuning) -> (f32, bool) {
        let mut velocity_y = velocity_y;
        let mut jumped = false;

        if jumping {
            let can_start = !self.was_jumping && (self.on_ground || self.was_on_ground);
            if can_start || self.jump_time > 0.0 {
                jumped = self.jump_time == 0.0;
                self.jump_time += dt;
            }

            if 0.0 < self.jump_time && self.jump_time <= tuning.max_jump_time {
                let t = self.jump_time / tuning.max_jump_time;
                velocity_y = tuning.jump_launch_velocity * (1.0 - t.powf(tuning.jump_control_power));
            } else {
                // Apex reached
                self.jump_time = 0.0;
            }
        } else {
            self.jump_time = 0.0;
        }

        self.was_jumping = jumping;
        (velocity_y, jumped)
    }
}

/// A charged shot travelling horizontally
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub position: Vec2,
    pub polarity: Polarity,
    /// +1 or -1, fixed at spawn
    pub direction: f32,
    pub live: bool,
}

impl Projectile {
    /// Spawn from a body's current state
    ///
    /// Direction follows the body's horizontal velocity, or its facing when
    /// standing still. It never changes afterwards.
    pub fn spawn(source: &Player, polarity: Polarity, ducking: bool, tuning: &Tuning) -> Self {
        let height = if ducking {
            tuning.projectile_spawn_height_ducking
        } else {
            tuning.projectile_spawn_height
        };
        let direction = if source.velocity.x > 0.0 {
            1.0
        } else if source.velocity.x < 0.0 {
            -1.0
        } else {
            source.facing.sign()
        };
        Self {
            position: source.position() - Vec2::new(0.0, height),
            polarity,
            direction,
            live: true,
        }
    }

    /// Step forward. Returns false once outside `[0, level_width]`.
    pub fn advance(&mut self, level_width: f32) -> bool {
        self.position.x += PROJECTILE_STEP * self.direction;
        (0.0..=level_width).contains(&self.position.x)
    }

    /// Tile the projectile is probing, offset half a radius along both axes
    pub fn tile_coord(&self) -> IVec2 {
        world_to_tile(self.position + Vec2::splat(PROJECTILE_RADIUS / 2.0))
    }
}
