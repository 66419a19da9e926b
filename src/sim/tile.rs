//! Tile kinds and the predicates shared by collision and cascades

use serde::{Deserialize, Serialize};

/// How a tile behaves for bodies and projectiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CollisionKind {
    /// Nothing to collide with
    #[default]
    Passable,
    /// Solid wall or floor
    Impassable,
    /// One-way surface, only solid from above
    Platform,
    /// The level exit (walk-through, falls with its column)
    ExitTile,
    /// Empty slot that a projectile can fill with a charge
    EmptyTile,
    PositiveTile,
    NegativeTile,
    /// Falling block (solid, falls with its column)
    DropTile,
}

impl CollisionKind {
    /// Kinds that drop into a vacated cell during a column collapse
    #[inline]
    pub fn is_fallable(self) -> bool {
        matches!(
            self,
            CollisionKind::PositiveTile
                | CollisionKind::NegativeTile
                | CollisionKind::DropTile
                | CollisionKind::EmptyTile
                | CollisionKind::ExitTile
        )
    }

    /// Kinds that always push bodies out, on either axis
    #[inline]
    pub fn is_solid(self) -> bool {
        matches!(
            self,
            CollisionKind::Impassable
                | CollisionKind::NegativeTile
                | CollisionKind::PositiveTile
                | CollisionKind::DropTile
                | CollisionKind::EmptyTile
        )
    }

    /// Kinds that take part in body collision at all
    #[inline]
    pub fn is_collidable(self) -> bool {
        !matches!(self, CollisionKind::Passable | CollisionKind::ExitTile)
    }

    /// Kinds that stop a projectile without any grid change
    #[inline]
    pub fn blocks_projectiles(self) -> bool {
        matches!(self, CollisionKind::Impassable | CollisionKind::DropTile)
    }

    /// Kinds that must have a matching entity record at their coordinate
    #[inline]
    pub fn has_entity(self) -> bool {
        self.is_fallable()
    }

    /// Charge kind for a polarity
    pub fn charge(polarity: Polarity) -> Self {
        match polarity {
            Polarity::Positive => CollisionKind::PositiveTile,
            Polarity::Negative => CollisionKind::NegativeTile,
        }
    }

    /// Polarity carried by a charge kind
    pub fn polarity(self) -> Option<Polarity> {
        match self {
            CollisionKind::PositiveTile => Some(Polarity::Positive),
            CollisionKind::NegativeTile => Some(Polarity::Negative),
            _ => None,
        }
    }
}

/// Charge polarity shared by projectiles and charge tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Polarity::Positive => Polarity::Negative,
            Polarity::Negative => Polarity::Positive,
        }
    }

    /// True when `other` neutralizes `self`
    #[inline]
    pub fn is_neutralized_by(self, other: Polarity) -> bool {
        self == other.opposite()
    }

    pub fn as_char(self) -> char {
        match self {
            Polarity::Positive => '+',
            Polarity::Negative => '-',
        }
    }
}

/// Opaque handle to presentation content for a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisualRef(pub u16);

impl VisualRef {
    pub const BLOCK: VisualRef = VisualRef(1);
    pub const HAZARD: VisualRef = VisualRef(2);
}

/// One grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tile {
    pub collision: CollisionKind,
    pub visual: Option<VisualRef>,
}

impl Tile {
    pub const PASSABLE: Tile = Tile {
        collision: CollisionKind::Passable,
        visual: None,
    };

    /// Tile with no visual of its own (entity-backed kinds draw themselves)
    pub const fn bare(collision: CollisionKind) -> Self {
        Self {
            collision,
            visual: None,
        }
    }

    pub const fn with_visual(collision: CollisionKind, visual: VisualRef) -> Self {
        Self {
            collision,
            visual: Some(visual),
        }
    }

    /// Level-file character for this tile (`=` for platforms, which have none)
    pub fn to_char(self) -> char {
        match self.collision {
            CollisionKind::Passable if self.visual == Some(VisualRef::HAZARD) => '~',
            CollisionKind::Passable => '.',
            CollisionKind::Impassable => '#',
            CollisionKind::Platform => '=',
            CollisionKind::ExitTile => 'X',
            CollisionKind::EmptyTile => ':',
            CollisionKind::PositiveTile => '+',
            CollisionKind::NegativeTile => '-',
            CollisionKind::DropTile => 'F',
        }
    }
}
