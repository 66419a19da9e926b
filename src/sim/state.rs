//! Level state and the simulation-facing API
//!
//! A `Level` owns the grid, the entity index, the player and live projectiles.
//! Nothing outside the simulation writes to them; teardown is dropping the level.

use std::path::Path;

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::bodies::{Player, Projectile};
use super::cascade::{CascadeEngine, Impact};
use super::entities::{EntityIndex, EntityKind, ExitTile};
use super::grid::TileGrid;
use super::loader::{LevelError, LevelLayout, load_level, parse_level};
use super::rect::Rect;
use super::tile::{CollisionKind, Polarity};
use crate::tuning::Tuning;

/// Something the presentation layer may want to react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimEvent {
    ProjectileFired { polarity: Polarity },
    /// A projectile resolved against a tile
    Impact(Impact),
    /// A projectile flew off the side of the level
    ProjectileLeftLevel,
    Jumped,
    PlayerKilled,
    ExitReached,
}

#[derive(Debug, Clone)]
pub struct Level {
    pub tuning: Tuning,
    pub(crate) grid: TileGrid,
    pub(crate) entities: EntityIndex,
    pub(crate) cascade: CascadeEngine,
    pub player: Player,
    /// Live projectiles in firing order
    pub projectiles: Vec<Projectile>,
    start: Vec2,
    pub(crate) reached_exit: bool,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub(crate) events: Vec<SimEvent>,
}

impl Level {
    pub fn from_layout(layout: LevelLayout, tuning: Tuning) -> Self {
        let player = Player::new(layout.start, &tuning);
        Self {
            tuning,
            grid: layout.grid,
            entities: layout.entities,
            cascade: CascadeEngine::new(),
            player,
            projectiles: Vec::new(),
            start: layout.start,
            reached_exit: false,
            time_ticks: 0,
            events: Vec::new(),
        }
    }

    /// Build a level from level-file text
    pub fn parse(text: &str, tuning: Tuning) -> Result<Self, LevelError> {
        Ok(Self::from_layout(parse_level(text)?, tuning))
    }

    /// Load a level file from disk
    pub fn load(path: impl AsRef<Path>, tuning: Tuning) -> Result<Self, LevelError> {
        Ok(Self::from_layout(load_level(path)?, tuning))
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn entities(&self) -> &EntityIndex {
        &self.entities
    }

    pub fn start(&self) -> Vec2 {
        self.start
    }

    /// Collision kind with level-edge semantics
    pub fn collision_at(&self, col: i32, row: i32) -> CollisionKind {
        self.grid.collision_at(col, row)
    }

    pub fn bounds_of(&self, col: i32, row: i32) -> Rect {
        self.grid.bounds_of(col, row)
    }

    pub fn has_reached_exit(&self) -> bool {
        self.reached_exit
    }

    pub fn is_player_alive(&self) -> bool {
        self.player.alive
    }

    /// Fire a projectile from the player, using its current crouch state
    pub fn spawn_projectile(&mut self, polarity: Polarity) {
        let projectile = Projectile::spawn(&self.player, polarity, self.player.ducking, &self.tuning);
        self.projectiles.push(projectile);
        self.events.push(SimEvent::ProjectileFired { polarity });
    }

    /// Put the player back on the start point; the grid keeps its state
    pub fn restart(&mut self) {
        log::info!("Player restarted at {}", self.start);
        self.player.reset(self.start);
        self.projectiles.clear();
        self.reached_exit = false;
    }

    /// Take all events raised since the last drain
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> LevelSnapshot {
        LevelSnapshot {
            tick: self.time_ticks,
            rows: self.grid.to_ascii(),
            player_position: self.player.position(),
            player_velocity: self.player.velocity,
            player_alive: self.player.alive,
            player_on_ground: self.player.on_ground,
            reached_exit: self.reached_exit,
            projectiles: self.projectiles.clone(),
            entities: self
                .entities
                .sorted()
                .into_iter()
                .map(|(coord, entity)| EntitySnapshot {
                    coord,
                    kind: entity.kind,
                    position: entity.motion.position,
                    target: entity.motion.target,
                })
                .collect(),
            exit: *self.entities.exit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub coord: IVec2,
    pub kind: EntityKind,
    pub position: Vec2,
    pub target: Vec2,
}

/// Serializable view of a level, for replays and debugging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSnapshot {
    pub tick: u64,
    /// Grid in level-file characters
    pub rows: Vec<String>,
    pub player_position: Vec2,
    pub player_velocity: Vec2,
    pub player_alive: bool,
    pub player_on_ground: bool,
    pub reached_exit: bool,
    pub projectiles: Vec<Projectile>,
    /// Entity records sorted row-major
    pub entities: Vec<EntitySnapshot>,
    pub exit: ExitTile,
}
