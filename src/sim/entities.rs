//! Tile-coordinate keyed registry of entity-backed tiles
//!
//! Charge, empty-slot and falling tiles each carry a world position that lags
//! behind their grid cell while they animate a fall. Records are looked up by
//! the tile coordinate they occupy, never by identity across ticks. The exit
//! tile is a singleton kept outside the map; it is relocated like the others
//! but can never be removed.

use std::collections::HashMap;

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::grid::{TileGrid, tile_center};
use super::tile::{CollisionKind, Polarity};
use crate::consts::TILE_HEIGHT;

/// A record that disagrees with the grid cell it claims to occupy
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantError {
    #[error("cell {coord} is {cell:?} but has no entity record")]
    MissingRecord { coord: IVec2, cell: CollisionKind },
    #[error("record at {coord} expects {expected:?} but the cell is {cell:?}")]
    KindMismatch {
        coord: IVec2,
        expected: CollisionKind,
        cell: CollisionKind,
    },
    #[error("exit record at {coord} but the cell is {cell:?}")]
    ExitMismatch { coord: IVec2, cell: CollisionKind },
}

/// World-space position animating toward a settling target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallMotion {
    pub position: Vec2,
    pub target: Vec2,
    /// Distance the target moves per cascade shift
    pub step_size: f32,
}

impl FallMotion {
    pub fn at_rest(position: Vec2, step_size: f32) -> Self {
        Self {
            position,
            target: position,
            step_size,
        }
    }

    #[inline]
    pub fn is_settled(&self) -> bool {
        self.position == self.target
    }

    /// Move toward the target by at most `speed` pixels. Returns true if it moved.
    pub fn animate(&mut self, speed: f32) -> bool {
        if self.is_settled() {
            return false;
        }
        let delta = self.target - self.position;
        self.position += delta.clamp_length_max(speed);
        true
    }
}

/// What an indexed record represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Charge(Polarity),
    Empty,
    Falling,
}

impl EntityKind {
    /// Grid cell kind that must accompany this record
    pub fn collision_kind(self) -> CollisionKind {
        match self {
            EntityKind::Charge(polarity) => CollisionKind::charge(polarity),
            EntityKind::Empty => CollisionKind::EmptyTile,
            EntityKind::Falling => CollisionKind::DropTile,
        }
    }

    /// Record kind for a grid cell kind, if that kind is map-indexed
    pub fn for_collision(kind: CollisionKind) -> Option<Self> {
        if let Some(polarity) = kind.polarity() {
            return Some(EntityKind::Charge(polarity));
        }
        match kind {
            CollisionKind::EmptyTile => Some(EntityKind::Empty),
            CollisionKind::DropTile => Some(EntityKind::Falling),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileEntity {
    pub kind: EntityKind,
    pub motion: FallMotion,
}

/// The level exit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExitTile {
    pub tile: IVec2,
    /// Point the player must stand over to finish the level
    pub exit_point: IVec2,
    pub motion: FallMotion,
}

impl ExitTile {
    pub fn new(tile: IVec2) -> Self {
        Self {
            tile,
            exit_point: tile_center(tile).as_ivec2(),
            motion: FallMotion::at_rest(tile_center(tile), TILE_HEIGHT as f32),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EntityIndex {
    records: HashMap<IVec2, TileEntity>,
    exit: ExitTile,
}

impl EntityIndex {
    pub fn new(exit_tile: IVec2) -> Self {
        Self {
            records: HashMap::new(),
            exit: ExitTile::new(exit_tile),
        }
    }

    /// Register a record resting at the center of its tile
    pub fn insert(&mut self, coord: IVec2, kind: EntityKind) {
        let entity = TileEntity {
            kind,
            motion: FallMotion::at_rest(tile_center(coord), TILE_HEIGHT as f32),
        };
        let previous = self.records.insert(coord, entity);
        debug_assert!(previous.is_none(), "two records at {coord}");
    }

    pub fn get(&self, coord: IVec2) -> Option<&TileEntity> {
        self.records.get(&coord)
    }

    pub fn charge_at(&self, coord: IVec2) -> Option<Polarity> {
        match self.records.get(&coord)?.kind {
            EntityKind::Charge(polarity) => Some(polarity),
            _ => None,
        }
    }

    pub fn is_empty_at(&self, coord: IVec2) -> bool {
        matches!(self.records.get(&coord), Some(e) if e.kind == EntityKind::Empty)
    }

    pub fn is_falling_at(&self, coord: IVec2) -> bool {
        matches!(self.records.get(&coord), Some(e) if e.kind == EntityKind::Falling)
    }

    pub fn remove(&mut self, coord: IVec2) -> Option<TileEntity> {
        self.records.remove(&coord)
    }

    /// Move a record to a new tile, pushing its target by `delta`
    ///
    /// The world position is left alone so the record animates into place.
    /// Returns false if there was no record at `from`.
    pub fn relocate(&mut self, from: IVec2, to: IVec2, delta: Vec2) -> bool {
        let Some(mut entity) = self.records.remove(&from) else {
            return false;
        };
        entity.motion.target += delta;
        let previous = self.records.insert(to, entity);
        debug_assert!(previous.is_none(), "relocate {from} -> {to} overwrote a record");
        true
    }

    pub fn exit(&self) -> &ExitTile {
        &self.exit
    }

    /// Move the exit to a new tile, pushing its target by `delta`
    pub fn relocate_exit(&mut self, to: IVec2, delta: Vec2) {
        self.exit.tile = to;
        self.exit.exit_point = tile_center(to).as_ivec2();
        self.exit.motion.target += delta;
    }

    /// Step every record (and the exit) toward its target
    pub fn animate(&mut self, speed: f32) {
        self.exit.motion.animate(speed);
        for entity in self.records.values_mut() {
            entity.motion.animate(speed);
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn count(&self, pred: impl Fn(EntityKind) -> bool) -> usize {
        self.records.values().filter(|e| pred(e.kind)).count()
    }

    pub fn charge_count(&self) -> usize {
        self.count(|k| matches!(k, EntityKind::Charge(_)))
    }

    /// Records sorted row-major, for stable output
    pub fn sorted(&self) -> Vec<(IVec2, TileEntity)> {
        let mut out: Vec<_> = self.records.iter().map(|(c, e)| (*c, *e)).collect();
        out.sort_by_key(|(c, _)| (c.y, c.x));
        out
    }

    /// Check that records and grid cells agree one-to-one
    pub fn validate(&self, grid: &TileGrid) -> Result<(), InvariantError> {
        let exit_cell = grid.collision_at(self.exit.tile.x, self.exit.tile.y);
        if exit_cell != CollisionKind::ExitTile {
            return Err(InvariantError::ExitMismatch {
                coord: self.exit.tile,
                cell: exit_cell,
            });
        }

        for (coord, entity) in &self.records {
            let expected = entity.kind.collision_kind();
            let cell = grid.collision_at(coord.x, coord.y);
            if cell != expected || !grid.in_bounds(coord.x, coord.y) {
                return Err(InvariantError::KindMismatch {
                    coord: *coord,
                    expected,
                    cell,
                });
            }
        }

        for coord in grid.coords() {
            let cell = grid.collision_at(coord.x, coord.y);
            let has_record = match cell {
                CollisionKind::ExitTile => self.exit.tile == coord,
                kind if kind.has_entity() => self.records.contains_key(&coord),
                _ => true,
            };
            if !has_record {
                return Err(InvariantError::MissingRecord { coord, cell });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tile::Tile;

    fn index_with_exit() -> (TileGrid, EntityIndex) {
        let mut grid = TileGrid::new(3, 4);
        grid.set_cell(0, 0, Tile::bare(CollisionKind::ExitTile));
        (grid, EntityIndex::new(IVec2::new(0, 0)))
    }

    #[test]
    fn test_lookup_by_kind() {
        let mut index = EntityIndex::new(IVec2::ZERO);
        index.insert(IVec2::new(1, 1), EntityKind::Charge(Polarity::Negative));
        index.insert(IVec2::new(2, 1), EntityKind::Empty);
        index.insert(IVec2::new(2, 2), EntityKind::Falling);

        assert_eq!(index.charge_at(IVec2::new(1, 1)), Some(Polarity::Negative));
        assert_eq!(index.charge_at(IVec2::new(2, 1)), None);
        assert!(index.is_empty_at(IVec2::new(2, 1)));
        assert!(!index.is_empty_at(IVec2::new(1, 1)));
        assert!(index.is_falling_at(IVec2::new(2, 2)));
        assert_eq!(index.len(), 3);
        assert_eq!(index.charge_count(), 1);
    }

    #[test]
    fn test_relocate_moves_key_and_target_only() {
        let mut index = EntityIndex::new(IVec2::ZERO);
        let from = IVec2::new(1, 1);
        index.insert(from, EntityKind::Falling);
        let start = index.get(from).unwrap().motion.position;

        assert!(index.relocate(from, IVec2::new(1, 2), Vec2::new(0.0, 48.0)));
        assert!(index.get(from).is_none());
        let moved = index.get(IVec2::new(1, 2)).unwrap();
        assert_eq!(moved.motion.position, start);
        assert_eq!(moved.motion.target, start + Vec2::new(0.0, 48.0));

        assert!(!index.relocate(from, IVec2::new(1, 3), Vec2::Y));
    }

    #[test]
    fn test_relocate_accumulates_pending_targets() {
        let mut index = EntityIndex::new(IVec2::ZERO);
        index.insert(IVec2::new(0, 1), EntityKind::Empty);
        index.relocate(IVec2::new(0, 1), IVec2::new(0, 2), Vec2::new(0.0, 48.0));
        index.relocate(IVec2::new(0, 2), IVec2::new(0, 3), Vec2::new(0.0, 48.0));
        let e = index.get(IVec2::new(0, 3)).unwrap();
        assert_eq!(e.motion.target.y - e.motion.position.y, 96.0);
    }

    #[test]
    fn test_animate_reaches_target_without_overshoot() {
        let mut motion = FallMotion::at_rest(Vec2::new(24.0, 24.0), 48.0);
        motion.target.y += 20.0;
        assert!(motion.animate(8.0));
        assert_eq!(motion.position.y, 32.0);
        motion.animate(8.0);
        motion.animate(8.0);
        assert_eq!(motion.position.y, 44.0);
        assert!(motion.is_settled());
        assert!(!motion.animate(8.0));
    }

    #[test]
    fn test_relocate_exit_moves_exit_point() {
        let mut index = EntityIndex::new(IVec2::new(2, 0));
        index.relocate_exit(IVec2::new(2, 1), Vec2::new(0.0, 48.0));
        assert_eq!(index.exit().tile, IVec2::new(2, 1));
        assert_eq!(index.exit().exit_point, IVec2::new(120, 72));
        assert_eq!(index.exit().motion.target, Vec2::new(120.0, 72.0));
        assert_eq!(index.exit().motion.position, Vec2::new(120.0, 24.0));
    }

    #[test]
    fn test_validate_accepts_consistent_state() {
        let (mut grid, mut index) = index_with_exit();
        grid.set_cell(1, 3, Tile::bare(CollisionKind::PositiveTile));
        index.insert(IVec2::new(1, 3), EntityKind::Charge(Polarity::Positive));
        assert_eq!(index.validate(&grid), Ok(()));
    }

    #[test]
    fn test_validate_reports_missing_record() {
        let (mut grid, index) = index_with_exit();
        grid.set_cell(2, 3, Tile::bare(CollisionKind::DropTile));
        assert_eq!(
            index.validate(&grid),
            Err(InvariantError::MissingRecord {
                coord: IVec2::new(2, 3),
                cell: CollisionKind::DropTile
            })
        );
    }

    #[test]
    fn test_validate_reports_kind_mismatch() {
        let (mut grid, mut index) = index_with_exit();
        grid.set_cell(1, 1, Tile::bare(CollisionKind::NegativeTile));
        index.insert(IVec2::new(1, 1), EntityKind::Charge(Polarity::Positive));
        assert!(matches!(
            index.validate(&grid),
            Err(InvariantError::KindMismatch { .. })
        ));
    }

    #[test]
    fn test_validate_reports_moved_exit() {
        let (mut grid, index) = index_with_exit();
        grid.set_cell(0, 0, Tile::PASSABLE);
        assert!(matches!(
            index.validate(&grid),
            Err(InvariantError::ExitMismatch { .. })
        ));
    }
}
