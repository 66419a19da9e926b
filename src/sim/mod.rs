//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (demo driver)
//! - Stable iteration order (projectiles in firing order, entities row-major)
//! - No rendering or platform dependencies

pub mod bodies;
pub mod cascade;
pub mod collision;
pub mod demo;
pub mod entities;
pub mod grid;
pub mod loader;
pub mod rect;
pub mod state;
pub mod tick;
pub mod tile;

pub use bodies::{Facing, Player, Projectile};
pub use cascade::{CascadeEngine, Impact, ProjectileOutcome};
pub use collision::{CollisionBox, resolve_tile_collisions};
pub use demo::DemoDriver;
pub use entities::{EntityIndex, EntityKind, ExitTile, FallMotion, InvariantError, TileEntity};
pub use grid::TileGrid;
pub use loader::{LevelError, LevelLayout, load_level, parse_level};
pub use rect::Rect;
pub use state::{EntitySnapshot, Level, LevelSnapshot, SimEvent};
pub use tick::{TickInput, tick};
pub use tile::{CollisionKind, Polarity, Tile, VisualRef};
