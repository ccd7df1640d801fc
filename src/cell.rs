//! A single grid position and its packed 16-bit code.
//!
//! The code space of a version is `max_tiles` ids wide. The top
//! `anim_count` ids of that space select animated tiles, the rest are
//! static tileset tiles. The bit just above the id space marks a flipped
//! cell:
//!
//! ```text
//!  base:     ....F IIIIIIIIII   (10-bit id, flip at 0x0400)
//!  extended: ..F IIIIIIIIIIII   (12-bit id, flip at 0x1000)
//! ```

use crate::version::Version;

/// One cell of a layer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cell {
    /// Tileset tile id, or animated tile index when `animated` is set.
    pub id: u16,
    /// Whether the tile is drawn mirrored horizontally.
    pub flipped: bool,
    /// Whether `id` indexes the animated tile table.
    pub animated: bool,
    /// Event code. Only stored for the sprite layer.
    pub event: u32,
}

impl Cell {
    /// Constructs a static tile.
    #[inline]
    #[must_use]
    pub fn tile(id: u16) -> Self {
        Cell {
            id,
            ..Cell::default()
        }
    }

    /// Constructs an animated tile.
    #[inline]
    #[must_use]
    pub fn animated(index: u16) -> Self {
        Cell {
            id: index,
            animated: true,
            ..Cell::default()
        }
    }

    /// Whether this cell draws nothing.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id == 0 && !self.animated
    }

    /// Clears the flip flag of an empty cell, where it has no meaning.
    #[inline]
    pub fn normalize(&mut self) {
        if self.is_empty() {
            self.flipped = false;
        }
    }
}

/// Unpacks a 16-bit cell code.
///
/// The event code isn't part of the packed code and is left at zero.
/// An empty cell never comes back flipped.
#[must_use]
pub fn decode_cell(raw: u16, version: Version, anim_count: u16) -> Cell {
    let max_tiles = version.max_tiles();
    let static_tiles = max_tiles.saturating_sub(anim_count);
    let id = raw & (max_tiles - 1);
    let flipped = raw & max_tiles != 0;
    if id >= static_tiles {
        Cell {
            id: id - static_tiles,
            flipped,
            animated: true,
            event: 0,
        }
    } else {
        let mut cell = Cell {
            id,
            flipped,
            animated: false,
            event: 0,
        };
        cell.normalize();
        cell
    }
}

/// Packs a cell into its 16-bit code.
///
/// Ids that don't fit the version's tile space wrap within it.
#[must_use]
pub fn encode_cell(cell: Cell, version: Version, anim_count: u16) -> u16 {
    let max_tiles = version.max_tiles();
    let static_tiles = max_tiles.saturating_sub(anim_count);
    let mut id = cell.id;
    if cell.animated {
        id = id.wrapping_add(static_tiles);
    }
    let mut raw = id & (max_tiles - 1);
    if cell.flipped {
        raw |= max_tiles;
    }
    raw
}
