//! Level file parsing
//!
//! A level is a text file of equal-length lines, one character per tile:
//!
//! | char | tile |
//! |------|------|
//! | `.`  | passable |
//! | `X`  | exit (exactly one) |
//! | `~`  | hazard decoration, passable |
//! | `:`  | empty slot |
//! | `1`  | player start (exactly one), passable |
//! | `+`  | positive charge |
//! | `-`  | negative charge |
//! | `#`  | impassable |
//! | `F`  | falling block |
//!
//! A level either loads completely or not at all.

use std::fs;
use std::path::Path;

use glam::{IVec2, Vec2};
use thiserror::Error;

use super::entities::{EntityIndex, EntityKind};
use super::grid::{TileGrid, tile_bounds};
use super::tile::{CollisionKind, Polarity, Tile, VisualRef};

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read level file: {0}")]
    Io(#[from] std::io::Error),
    #[error("level file is empty")]
    Empty,
    /// 1-based line number
    #[error("the length of line {line} is different from all preceding lines")]
    LineLength { line: usize },
    #[error("unsupported tile type character '{ch}' at position {x}, {y}")]
    UnknownTile { ch: char, x: usize, y: usize },
    #[error("multiple start points: second start at {x}, {y}")]
    MultipleStarts { x: usize, y: usize },
    #[error("missing start: a level must have a starting point")]
    MissingStart,
    #[error("multiple exits: second exit at {x}, {y}")]
    MultipleExits { x: usize, y: usize },
    #[error("missing exit: a level must have an exit")]
    MissingExit,
}

/// Everything a level file describes
#[derive(Debug, Clone)]
pub struct LevelLayout {
    pub grid: TileGrid,
    pub entities: EntityIndex,
    /// Bottom-center of the start tile
    pub start: Vec2,
}

/// What a single character turns into
enum Cell {
    Plain(Tile),
    Entity(EntityKind),
    Exit,
    Start,
}

fn classify(ch: char) -> Option<Cell> {
    let cell = match ch {
        '.' => Cell::Plain(Tile::PASSABLE),
        '~' => Cell::Plain(Tile::with_visual(CollisionKind::Passable, VisualRef::HAZARD)),
        '#' => Cell::Plain(Tile::with_visual(CollisionKind::Impassable, VisualRef::BLOCK)),
        'X' => Cell::Exit,
        '1' => Cell::Start,
        ':' => Cell::Entity(EntityKind::Empty),
        '+' => Cell::Entity(EntityKind::Charge(Polarity::Positive)),
        '-' => Cell::Entity(EntityKind::Charge(Polarity::Negative)),
        'F' => Cell::Entity(EntityKind::Falling),
        _ => return None,
    };
    Some(cell)
}

/// Parse level text into a grid, its entity records and the start point
pub fn parse_level(text: &str) -> Result<LevelLayout, LevelError> {
    let lines: Vec<Vec<char>> = text.lines().map(|line| line.chars().collect()).collect();
    let width = lines.first().map(Vec::len).ok_or(LevelError::Empty)?;
    if width == 0 {
        return Err(LevelError::Empty);
    }
    if let Some(bad) = lines.iter().position(|line| line.len() != width) {
        return Err(LevelError::LineLength { line: bad + 1 });
    }

    let mut grid = TileGrid::new(width, lines.len());
    let mut records = Vec::new();
    let mut start = None;
    let mut exit = None;

    for (y, line) in lines.iter().enumerate() {
        for (x, &ch) in line.iter().enumerate() {
            let coord = IVec2::new(x as i32, y as i32);
            let cell = classify(ch).ok_or(LevelError::UnknownTile { ch, x, y })?;
            let tile = match cell {
                Cell::Plain(tile) => tile,
                Cell::Entity(kind) => {
                    records.push((coord, kind));
                    Tile::bare(kind.collision_kind())
                }
                Cell::Exit => {
                    if exit.replace(coord).is_some() {
                        return Err(LevelError::MultipleExits { x, y });
                    }
                    Tile::bare(CollisionKind::ExitTile)
                }
                Cell::Start => {
                    if start.replace(tile_bounds(coord.x, coord.y).bottom_center()).is_some() {
                        return Err(LevelError::MultipleStarts { x, y });
                    }
                    Tile::PASSABLE
                }
            };
            grid.set_cell(coord.x, coord.y, tile);
        }
    }

    let start = start.ok_or(LevelError::MissingStart)?;
    let exit = exit.ok_or(LevelError::MissingExit)?;

    let mut entities = EntityIndex::new(exit);
    for (coord, kind) in records {
        entities.insert(coord, kind);
    }

    Ok(LevelLayout { grid, entities, start })
}

/// Read and parse a level file
pub fn load_level(path: impl AsRef<Path>) -> Result<LevelLayout, LevelError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let layout = parse_level(&text)?;
    log::info!(
        "Loaded level {} ({}x{}, {} tile entities)",
        path.display(),
        layout.grid.width(),
        layout.grid.height(),
        layout.entities.len()
    );
    Ok(layout)
}
