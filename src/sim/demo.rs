//! Seeded demo player
//!
//! Produces `TickInput`s from a fixed seed so a level can be run headless
//! and replayed exactly. It wanders toward the exit, hops over whatever it
//! bumps into and now and then shoots at the nearest charge ahead of it.

use glam::{IVec2, Vec2};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::grid::world_to_tile;
use super::state::Level;
use super::tick::TickInput;
use super::tile::Polarity;
use crate::consts::PROJECTILE_RADIUS;

/// Chance per tick of trying to fire
const FIRE_CHANCE: f64 = 0.08;
/// Chance per tick of a jump for no reason
const HOP_CHANCE: f64 = 0.02;
const DUCK_CHANCE: f64 = 0.04;

#[derive(Debug, Clone)]
pub struct DemoDriver {
    rng: Pcg32,
    movement: f32,
    /// Ticks left before the heading is picked again
    hold: u32,
}

impl DemoDriver {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            movement: 0.0,
            hold: 0,
        }
    }

    /// Input for the next tick of `level`
    pub fn next_input(&mut self, level: &Level) -> TickInput {
        let player = &level.player;

        if self.hold == 0 {
            self.hold = self.rng.random_range(20..90);
            let toward_exit = (level.entities().exit().exit_point.x as f32 - player.position().x).signum();
            self.movement = match self.rng.random_range(0..10) {
                0 => 0.0,
                1..=2 => -toward_exit,
                _ => toward_exit,
            };
        }
        self.hold -= 1;

        let stuck = self.movement != 0.0 && player.on_ground && player.velocity.x.abs() < 1.0;
        let jump = stuck || self.rng.random_bool(HOP_CHANCE);
        let duck = !jump && self.rng.random_bool(DUCK_CHANCE);

        let fire = if self.rng.random_bool(FIRE_CHANCE) {
            let target = target_charge(level, duck);
            Some(match target {
                Some(charge) => charge.opposite(),
                None if self.rng.random_bool(0.5) => Polarity::Positive,
                None => Polarity::Negative,
            })
        } else {
            None
        };

        TickInput {
            movement: self.movement,
            jump,
            duck,
            fire,
        }
    }
}

/// Polarity of the first charge on the muzzle row, looking the way a shot would go
fn target_charge(level: &Level, ducking: bool) -> Option<Polarity> {
    let player = &level.player;
    let height = if ducking {
        level.tuning.projectile_spawn_height_ducking
    } else {
        level.tuning.projectile_spawn_height
    };
    let muzzle = player.position() - Vec2::new(0.0, height) + Vec2::splat(PROJECTILE_RADIUS / 2.0);
    let row = world_to_tile(muzzle).y;
    let col = world_to_tile(player.position()).x;
    let step = if player.velocity.x != 0.0 {
        player.velocity.x.signum() as i32
    } else {
        player.facing.sign() as i32
    };

    let grid = level.grid();
    std::iter::successors(Some(col), |c| Some(c + step))
        .take_while(|&c| (0..grid.width()).contains(&c))
        .find_map(|c| level.entities().charge_at(IVec2::new(c, row)))
}
