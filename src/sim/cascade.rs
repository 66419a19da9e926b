//! Projectile impacts, charge neutralization and column collapse
//!
//! When a projectile neutralizes a charge tile the struck cell is cleared and
//! every fallable tile stacked directly above it drops one row. The column
//! then keeps compacting downward while the cell under the struck row is
//! open, until it lands on something or reaches the floor row.

use std::collections::HashSet;

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::bodies::Projectile;
use super::entities::{EntityIndex, EntityKind};
use super::grid::TileGrid;
use super::tile::{CollisionKind, Polarity, Tile};
use crate::consts::EXIT_FALL_OFFSET;

/// How a projectile interaction ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Impact {
    /// Opposite-polarity charge removed; `shifted` tiles fell in its column
    Neutralized { coord: IVec2, shifted: usize },
    /// Same-polarity charge soaked up the shot
    Absorbed { coord: IVec2 },
    /// Hit a wall or a falling block
    Blocked { coord: IVec2 },
    /// Empty slot turned into a charge of the projectile's polarity
    SlotFilled { coord: IVec2, polarity: Polarity },
    /// Empty slot that fell into place this tick; shot lost, slot unchanged
    SlotSettling { coord: IVec2 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileOutcome {
    Continuing,
    Consumed(Impact),
}

/// Resolves projectile hits against the grid
///
/// Tracks which cells received an empty slot through a collapse during the
/// current tick; those slots cannot be filled until the next tick.
#[derive(Debug, Clone, Default)]
pub struct CascadeEngine {
    settling: HashSet<IVec2>,
}

impl CascadeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget last tick's settling slots
    pub fn begin_tick(&mut self) {
        self.settling.clear();
    }

    pub fn is_settling(&self, coord: IVec2) -> bool {
        self.settling.contains(&coord)
    }

    /// Test a projectile against the tile it is probing
    ///
    /// Checked in order: charge tile, wall/falling block, empty slot.
    pub fn on_projectile_tick(
        &mut self,
        projectile: &Projectile,
        grid: &mut TileGrid,
        entities: &mut EntityIndex,
    ) -> ProjectileOutcome {
        let coord = projectile.tile_coord();

        if let Some(charge) = entities.charge_at(coord) {
            if charge.is_neutralized_by(projectile.polarity) {
                let shifted = self.neutralize(coord, grid, entities);
                return ProjectileOutcome::Consumed(Impact::Neutralized { coord, shifted });
            }
            return ProjectileOutcome::Consumed(Impact::Absorbed { coord });
        }

        let kind = grid.collision_at(coord.x, coord.y);
        if kind.blocks_projectiles() {
            return ProjectileOutcome::Consumed(Impact::Blocked { coord });
        }

        if kind == CollisionKind::EmptyTile {
            if self.is_settling(coord) {
                log::debug!("Slot {coord} still settling, shot lost");
                return ProjectileOutcome::Consumed(Impact::SlotSettling { coord });
            }
            fill_slot(coord, projectile.polarity, grid, entities);
            return ProjectileOutcome::Consumed(Impact::SlotFilled {
                coord,
                polarity: projectile.polarity,
            });
        }

        ProjectileOutcome::Continuing
    }

    /// Remove the charge tile at `coord` and collapse its column.
    /// Returns how many tiles were shifted.
    pub fn neutralize(&mut self, coord: IVec2, grid: &mut TileGrid, entities: &mut EntityIndex) -> usize {
        grid.set_cell(coord.x, coord.y, Tile::PASSABLE);
        entities.remove(coord);

        let shifted = self.collapse_column(coord.x, coord.y, grid, entities);
        log::debug!("Neutralized charge at {coord}, {shifted} tile shifts");
        shifted
    }

    /// Compact the fallable stack above `row` into the open cell at `row`
    fn collapse_column(&mut self, col: i32, row: i32, grid: &mut TileGrid, entities: &mut EntityIndex) -> usize {
        let floor = grid.floor_row();
        let mut settle_row = row;
        let mut shifted = 0;

        loop {
            let mut cursor = settle_row;
            while let Some(tile) = grid
                .tile(IVec2::new(col, cursor - 1))
                .filter(|t| t.collision.is_fallable())
            {
                self.shift_down(col, cursor, tile, grid, entities);
                cursor -= 1;
                shifted += 1;
            }

            if settle_row == floor {
                break;
            }
            if grid.collision_at(col, settle_row + 1) == CollisionKind::Passable {
                settle_row += 1;
            } else {
                break;
            }
        }
        shifted
    }

    /// Move `tile` from the row above `to_row` into `to_row`, with its record
    fn shift_down(&mut self, col: i32, to_row: i32, tile: Tile, grid: &mut TileGrid, entities: &mut EntityIndex) {
        let from = IVec2::new(col, to_row - 1);
        let to = IVec2::new(col, to_row);
        log::trace!("Shift {:?} {from} -> {to}", tile.collision);

        grid.set_cell(col, to_row, tile);
        match tile.collision {
            CollisionKind::ExitTile => {
                entities.relocate_exit(to, Vec2::new(0.0, EXIT_FALL_OFFSET));
            }
            _ => {
                let step = entities.get(from).map_or(0.0, |e| e.motion.step_size);
                let relocated = entities.relocate(from, to, Vec2::new(0.0, step));
                debug_assert!(relocated, "{:?} at {from} has no record", tile.collision);
                if tile.collision == CollisionKind::EmptyTile {
                    self.settling.remove(&from);
                    self.settling.insert(to);
                }
            }
        }
        grid.set_cell(col, to_row - 1, Tile::PASSABLE);
    }
}

/// Turn an empty slot into a charge tile of the given polarity
pub fn fill_slot(coord: IVec2, polarity: Polarity, grid: &mut TileGrid, entities: &mut EntityIndex) {
    grid.set_cell(coord.x, coord.y, Tile::bare(CollisionKind::charge(polarity)));
    entities.remove(coord);
    entities.insert(coord, EntityKind::Charge(polarity));
    log::debug!("Filled slot {coord} with {} charge", polarity.as_char());
}
