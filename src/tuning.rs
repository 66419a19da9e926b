//! Player and projectile tuning
//!
//! Loaded from an optional JSON file; any field left out keeps its default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while reading a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid tuning file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Data-driven balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Horizontal movement ===
    /// Horizontal acceleration at full stick deflection (px/s²)
    pub move_acceleration: f32,
    /// Top horizontal speed (px/s)
    pub max_move_speed: f32,
    /// Per-tick velocity multiplier while grounded
    pub ground_drag_factor: f32,
    /// Per-tick velocity multiplier while airborne
    pub air_drag_factor: f32,

    // === Vertical movement ===
    /// Longest time a held jump keeps overriding gravity (s)
    pub max_jump_time: f32,
    /// Vertical launch velocity at jump start (px/s, negative is up)
    pub jump_launch_velocity: f32,
    pub gravity_acceleration: f32,
    pub max_fall_speed: f32,
    /// Exponent of the jump ascent curve
    pub jump_control_power: f32,

    // === Body ===
    /// Collision box size in pixels (bottom-center anchored)
    pub player_width: i32,
    pub player_height: i32,

    // === Shooting ===
    /// Height above the feet where projectiles spawn when standing
    pub projectile_spawn_height: f32,
    /// Height above the feet where projectiles spawn when ducking
    pub projectile_spawn_height_ducking: f32,
    /// Minimum time between two input-driven shots (s)
    pub fire_cooldown: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            move_acceleration: 14000.0,
            max_move_speed: 2000.0,
            ground_drag_factor: 0.58,
            air_drag_factor: 0.65,

            max_jump_time: 0.35,
            jump_launch_velocity: -2500.0,
            gravity_acceleration: 3500.0,
            max_fall_speed: 600.0,
            jump_control_power: 0.14,

            player_width: 38,
            player_height: 76,

            projectile_spawn_height: 84.0,
            projectile_spawn_height_ducking: 42.0,
            fire_cooldown: 0.3,
        }
    }
}

impl Tuning {
    /// Parse tuning from a JSON document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize tuning as pretty JSON
    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load tuning from a file on disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Load tuning if a path is given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, TuningError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                log::info!("Using default tuning");
                Ok(Self::default())
            }
        }
    }
}
