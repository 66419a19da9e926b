//! Neutralizer - tile-grid platformer simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, entities, collisions, cascades)
//! - `tuning`: Data-driven player and projectile balance
//!
//! Rendering, audio, input polling and level sequencing live outside this
//! crate and talk to it through [`sim::Level`] and [`sim::tick`].

pub mod sim;
pub mod tuning;

pub use sim::{Level, LevelError, TickInput, tick};
pub use tuning::Tuning;

/// Fixed simulation geometry
pub mod consts {
    /// Simulation timestep (one tick per rendered frame at 60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Tile dimensions in pixels
    pub const TILE_WIDTH: i32 = 48;
    pub const TILE_HEIGHT: i32 = 48;

    /// Pixels per tick a tile entity moves toward its settling target
    pub const FALL_ANIMATION_SPEED: f32 = 8.0;
    /// Exit tile always drops by exactly one tile row per cascade shift
    pub const EXIT_FALL_OFFSET: f32 = 48.0;

    /// Projectile horizontal step per tick (pixels)
    pub const PROJECTILE_STEP: f32 = 10.0;
    /// Projectile bounding circle radius
    pub const PROJECTILE_RADIUS: f32 = TILE_WIDTH as f32 / 3.0;
}

/// Round a world coordinate to whole pixels (ties to even)
#[inline]
pub fn round_px(value: f32) -> f32 {
    value.round_ties_even()
}
