#![warn(missing_docs)]
#![warn(clippy::pedantic, clippy::perf, clippy::cargo)]
#![allow(
    clippy::cast_possible_truncation,
    clippy::too_many_lines,
    clippy::cast_lossless,
    clippy::module_name_repetitions
)]

/*!
Library to read and write Jazz Jackrabbit 2 level (`.j2l`) files.

A level file is a 262-byte header followed by four zlib streams: the level
info record, the sprite layer's events, a dictionary of 4-tile words and a
word map that rebuilds the eight tile layers out of those words.

```rust
# use j2l::{Cell, Level, Version};
# fn main() -> Result<(), Box<dyn std::error::Error>> {
let mut level = Level::new(Version::Base);
level.info.level_name = "Diamondus".into();
level.resize_layer(3, 64, 32);
level.layers[3][(2, 5)] = Cell::tile(17);

let bytes = level.to_bytes()?;
let loaded = Level::from_bytes(&bytes)?;
assert_eq!(loaded.layers[3][(2, 5)], Cell::tile(17));
#
# Ok(())
# }
```
 */

use std::io::{Read, Write};

pub mod cell;
pub mod checksum;
mod decode;
pub mod encode;
mod error;
mod formatting;
pub mod grid;
pub mod header;
pub mod info;
pub mod options;
mod read_helper;
pub mod stream;
mod version;
mod write_helper;

pub use cell::{decode_cell, encode_cell, Cell};
pub use error::{ReadError, WriteError};
pub use grid::{Layer, TileGrid};
pub use header::FileHeader;
pub use info::{LevelInfo, LAYER_COUNT, SPRITE_LAYER};
pub use options::{ExportOptions, LoadOptions};
pub use version::Version;

/// A decoded level.
#[derive(Clone, PartialEq, Eq)]
pub struct Level {
    /// The version the level was loaded as, and is exported as by default.
    pub version: Version,
    /// The header the level was loaded with.
    ///
    /// Only the password hash and hide flag carry over into exported files,
    /// the rest is recomputed.
    pub header: FileHeader,
    /// Level metadata.
    ///
    /// Layer sizes here are overwritten by the grids' sizes on export.
    /// Use [`Level::resize_layer`] to keep both in step.
    pub info: LevelInfo,
    /// The eight tile layers. Layer 3 holds sprites and events.
    pub layers: [Layer; LAYER_COUNT],
}

impl Default for Level {
    fn default() -> Self {
        Self::new(Version::default())
    }
}

impl Level {
    /// Creates a blank level with zero-sized layers.
    #[must_use]
    pub fn new(version: Version) -> Self {
        Level {
            version,
            header: FileHeader {
                version: version.raw(),
                ..FileHeader::default()
            },
            info: LevelInfo::new(version),
            layers: Default::default(),
        }
    }

    /// Attempt to read a level from a readable.
    ///
    /// # Errors
    /// Errors if the file fails to be read or isn't a valid level.
    pub fn read(mut cursor: impl Read) -> Result<Self, ReadError> {
        let mut bytes = Vec::new();
        cursor.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }

    /// Decodes a level from the bytes of a whole file.
    ///
    /// # Errors
    /// Errors if the magic, checksum or version don't check out, or if any
    /// stream is malformed. No partial level is returned.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ReadError> {
        Self::from_bytes_with(bytes, &LoadOptions::default())
    }

    /// Decodes a level with custom load settings.
    ///
    /// # Errors
    /// See [`Level::from_bytes`].
    pub fn from_bytes_with(bytes: &[u8], options: &LoadOptions) -> Result<Self, ReadError> {
        decode::decode_level(bytes, options)
    }

    /// Attempts to write the level to a writable, in its own version.
    ///
    /// # Errors
    /// Errors if encoding or writing fails.
    pub fn write(&self, mut cursor: impl Write) -> Result<(), WriteError> {
        cursor.write_all(&self.to_bytes()?)?;
        Ok(())
    }

    /// Encodes the level in its own version.
    ///
    /// # Errors
    /// See [`Level::export`].
    pub fn to_bytes(&self) -> Result<Vec<u8>, WriteError> {
        self.export(&ExportOptions::default())
    }

    /// Encodes the level into the bytes of a file.
    ///
    /// Layer geometry, flags, z-axis depths and the per-tile flip table are
    /// recomputed from the grids. The level itself is left untouched.
    ///
    /// # Errors
    /// Errors if the requested version isn't recognized (before any work is
    /// done), if the level doesn't fit the version, or if compression fails.
    pub fn export(&self, options: &ExportOptions) -> Result<Vec<u8>, WriteError> {
        self.export_with(options, |_, _| {})
    }

    /// Encodes the level, letting `modifier` adjust the final header and
    /// level info just before they're serialized.
    ///
    /// Checksum, file size and stream sizes are filled in after the modifier runs.
    ///
    /// # Errors
    /// See [`Level::export`].
    pub fn export_with<F>(&self, options: &ExportOptions, modifier: F) -> Result<Vec<u8>, WriteError>
    where
        F: FnOnce(&mut FileHeader, &mut LevelInfo),
    {
        encode::encode_level(self, options, modifier)
    }

    /// Resizes a layer, keeping the level info in step with the grid.
    ///
    /// Cells in the overlapping region are kept.
    ///
    /// # Panics
    /// Panics if `layer` is not below [`LAYER_COUNT`].
    pub fn resize_layer(&mut self, layer: usize, width: u32, height: u32) {
        let props = &mut self.info.layers[layer];
        props.width = width;
        props.height = height;
        props.real_width = props.computed_real_width();
        self.layers[layer].resize(width, height);
    }

    /// Returns the sprite layer.
    #[inline]
    #[must_use]
    pub fn sprite_layer(&self) -> &Layer {
        &self.layers[SPRITE_LAYER]
    }

    /// Returns the event at a sprite layer position, or `None` if out of bounds.
    #[must_use]
    pub fn event(&self, x: u32, y: u32) -> Option<u32> {
        self.sprite_layer().get((x, y)).map(|cell| cell.event)
    }

    /// Clears the flip flag on every empty cell.
    ///
    /// Export does the same on the fly, so this only matters when comparing
    /// a level with its exported copy.
    pub fn normalize(&mut self) {
        for layer in &mut self.layers {
            for cell in &mut layer.data {
                cell.normalize();
            }
        }
    }
}
