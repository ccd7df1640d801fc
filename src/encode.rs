//! Turns a [`Level`] back into the bytes of a file.
//!
//! Tile grids are stored as a dictionary of unique 4-cell words plus a word
//! map that references one word per 4-cell strip of every layer that has
//! tiles. The sprite layer's events go to a stream of their own.

use crate::cell::{encode_cell, Cell};
use crate::checksum;
use crate::error::WriteError;
use crate::grid::TileGrid;
use crate::header::{FileHeader, HEADER_NOTICE, MAGIC};
use crate::info::{LevelInfo, CANONICAL_Z_AXIS, LAYER_COUNT, SPRITE_LAYER};
use crate::options::ExportOptions;
use crate::stream;
use crate::version::Version;
use crate::write_helper;
use crate::Level;
use bytemuck::{cast_slice, Zeroable};
use log::debug;
use std::collections::{HashMap, HashSet};

/// Four packed cell codes, one 4-cell strip of a layer row.
pub type Word = [u16; 4];

/// The deduplicated table of words.
///
/// Index 0 is always the all-zero word, whether or not anything uses it.
#[derive(Debug, Clone)]
pub struct Dictionary {
    words: Vec<Word>,
    index: HashMap<Word, u16>,
}

impl Default for Dictionary {
    fn default() -> Self {
        let zero = Word::zeroed();
        Dictionary {
            words: vec![zero],
            index: HashMap::from([(zero, 0)]),
        }
    }
}

impl Dictionary {
    /// Constructs a dictionary holding only the zero word.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index of the first word equal to `word`, appending it if there is none.
    ///
    /// # Errors
    /// Errors if the dictionary is full.
    pub fn intern(&mut self, word: Word) -> Result<u16, WriteError> {
        match self.index.get(&word) {
            Some(&index) => Ok(index),
            None => self.push(word),
        }
    }

    /// Appends a word without looking for an existing copy.
    ///
    /// Later lookups of an equal word still find the earliest copy.
    ///
    /// # Errors
    /// Errors if the dictionary is full.
    pub fn push(&mut self, word: Word) -> Result<u16, WriteError> {
        let index = u16::try_from(self.words.len())
            .map_err(|_| WriteError::TooManyWords(self.words.len() + 1))?;
        self.words.push(word);
        self.index.entry(word).or_insert(index);
        Ok(index)
    }

    /// Returns the words in index order.
    #[must_use]
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Number of words, including the zero word.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Never true, the zero word is always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Returns the words as a flat run of cell codes.
    #[must_use]
    pub fn codes(&self) -> &[u16] {
        cast_slice(&self.words)
    }
}

/// The tile streams of an encoded level.
#[derive(Debug, Clone, Default)]
pub struct EncodedTiles {
    /// One event per sprite layer cell, row-major.
    pub events: Vec<u32>,
    /// The word dictionary.
    pub dictionary: Dictionary,
    /// One word index per strip of every layer with tiles.
    pub word_map: Vec<u16>,
    /// Static tile ids that appear flipped anywhere.
    pub flipped_tiles: HashSet<u16>,
    /// Animated tile indices that appear flipped anywhere.
    pub flipped_anims: HashSet<u16>,
}

/// Recomputes the geometry and flags of each layer from its grid.
///
/// Widths and heights come from the grids. The word map stride is derived
/// from the width, the sprite layer is always marked as having tiles, and
/// the z-axis is reset to its canonical depth.
pub fn normalize_layers<G: TileGrid>(info: &mut LevelInfo, grids: &[G; LAYER_COUNT]) {
    for (l, (props, grid)) in info.layers.iter_mut().zip(grids).enumerate() {
        props.width = grid.width();
        props.height = grid.height();
        props.real_width = props.computed_real_width();
        props.has_tiles = l == SPRITE_LAYER || grid_has_tiles(grid);
        props.z_axis = CANONICAL_Z_AXIS[l];
    }
}

fn grid_has_tiles<G: TileGrid>(grid: &G) -> bool {
    (0..grid.height()).any(|y| {
        (0..grid.width()).any(|x| grid.cell(x, y).is_some_and(|cell| !cell.is_empty()))
    })
}

/// Builds the event grid, dictionary and word map from normalized layer properties.
///
/// # Errors
/// Errors if the dictionary outgrows 16-bit indices.
pub fn encode_tiles<G: TileGrid>(
    info: &LevelInfo,
    grids: &[G; LAYER_COUNT],
    version: Version,
) -> Result<EncodedTiles, WriteError> {
    let anim_count = info.anim_count();
    let mut out = EncodedTiles::default();
    for (l, (props, grid)) in info.layers.iter().zip(grids).enumerate() {
        let width = props.width;
        let height = props.height;
        if l == SPRITE_LAYER {
            out.events = vec![0; width as usize * height as usize];
        }
        if !props.has_tiles {
            continue;
        }
        let tile_width = props.tile_width();
        let stride = props.strips_per_row() as u32 * 4;
        for y in 0..height {
            for x in (0..stride).step_by(4) {
                let mut word = Word::zeroed();
                let mut has_anim_and_event = false;
                for k in 0..4 {
                    let cx = x + k;
                    // Tiling layers repeat their row to fill the stride
                    let mut cell = grid.cell(cx % width, y).unwrap_or_default();
                    cell.normalize();
                    let raw = encode_cell(cell, version, anim_count);
                    if l == SPRITE_LAYER && cx < width {
                        out.events[cx as usize + y as usize * width as usize] = cell.event;
                    }
                    if !tile_width && cx >= width {
                        break;
                    }
                    word[k as usize] = raw;
                    if l == SPRITE_LAYER && cell.animated && cell.event > 0 {
                        has_anim_and_event = true;
                    }
                    track_flip(&mut out, cell);
                }
                // Animated tiles with events can't share a word
                let index = if has_anim_and_event {
                    out.dictionary.push(word)?
                } else {
                    out.dictionary.intern(word)?
                };
                out.word_map.push(index);
            }
        }
    }
    Ok(out)
}

fn track_flip(out: &mut EncodedTiles, cell: Cell) {
    if !cell.flipped {
        return;
    }
    if cell.animated {
        out.flipped_anims.insert(cell.id);
    } else {
        out.flipped_tiles.insert(cell.id);
    }
}

/// Serializes a level into the bytes of a file.
pub(crate) fn encode_level<F>(
    level: &Level,
    options: &ExportOptions,
    modifier: F,
) -> Result<Vec<u8>, WriteError>
where
    F: FnOnce(&mut FileHeader, &mut LevelInfo),
{
    let version = options.resolve_version(level.version)?;
    let max_tiles = version.max_tiles();
    let anim_count = level.info.anims.len();
    if anim_count > max_tiles as usize {
        return Err(WriteError::TooManyAnimations {
            count: anim_count,
            max: max_tiles,
        });
    }
    let static_tiles = max_tiles - anim_count as u16;
    debug!("exporting level \"{}\" as version {version}", level.info.level_name);

    let mut header = FileHeader {
        copyright: HEADER_NOTICE.to_owned(),
        magic: *MAGIC,
        password_hash: level.header.password_hash,
        hide_level: level.header.hide_level,
        level_name: level.info.level_name.clone(),
        version: version.raw(),
        ..FileHeader::default()
    };

    let mut info = level.info.clone();
    info.resize_tables(version);
    info.static_tiles = static_tiles;
    info.buffer_size = info.layout(version).len() as u32;
    normalize_layers(&mut info, &level.layers);

    let tiles = encode_tiles(&info, &level.layers, version)?;
    for (id, flipped) in info
        .tile_flipped
        .iter_mut()
        .enumerate()
        .take(static_tiles as usize)
    {
        *flipped = tiles.flipped_tiles.contains(&(id as u16));
    }
    debug!(
        "{} dictionary words, {} word map entries",
        tiles.dictionary.len(),
        tiles.word_map.len()
    );

    modifier(&mut header, &mut info);

    let info_bytes = info.to_bytes(version);
    let event_bytes = write_helper::u32_bytes(&tiles.events);
    let dictionary_bytes = write_helper::u16_bytes(tiles.dictionary.codes());
    let word_map_bytes = write_helper::u16_bytes(&tiles.word_map);
    let (body, sizes) = stream::deflate_all(
        [
            info_bytes.as_slice(),
            event_bytes.as_slice(),
            dictionary_bytes.as_slice(),
            word_map_bytes.as_slice(),
        ],
        options.parallel,
    )?;
    header.stream_sizes = sizes;
    checksum::seal(&mut header, &body);

    let mut file = header.to_bytes();
    file.extend_from_slice(&body);
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Layer;

    #[test]
    fn first_match_wins() {
        let mut dictionary = Dictionary::new();
        assert_eq!(dictionary.intern([0; 4]).unwrap(), 0);
        assert_eq!(dictionary.intern([1, 2, 3, 4]).unwrap(), 1);
        // A forced copy gets a new index, but lookups keep finding the first
        assert_eq!(dictionary.push([1, 2, 3, 4]).unwrap(), 2);
        assert_eq!(dictionary.intern([1, 2, 3, 4]).unwrap(), 1);
        // A forced word is visible to later lookups
        assert_eq!(dictionary.push([5, 5, 5, 5]).unwrap(), 3);
        assert_eq!(dictionary.intern([5, 5, 5, 5]).unwrap(), 3);
        assert_eq!(dictionary.codes().len(), 16);
        assert_eq!(&dictionary.codes()[4..8], &[1, 2, 3, 4]);
    }

    #[test]
    fn dictionary_overflow() {
        let mut dictionary = Dictionary::new();
        for i in 1..=u16::MAX {
            dictionary.push([i, 0, 0, 0]).unwrap();
        }
        assert!(matches!(
            dictionary.push([0, 1, 0, 0]),
            Err(WriteError::TooManyWords(65537))
        ));
    }

    fn grids() -> [Layer; LAYER_COUNT] {
        Default::default()
    }

    #[test]
    fn partial_strip_is_zero_padded() {
        let mut info = LevelInfo::new(Version::Base);
        let mut layers = grids();
        layers[0] = Layer::new(10, 1);
        for x in 0..10 {
            layers[0][(x, 0)] = Cell::tile(x as u16 + 1);
        }
        normalize_layers(&mut info, &layers);
        assert_eq!(info.layers[0].real_width, 10);
        let tiles = encode_tiles(&info, &layers, Version::Base).unwrap();
        // 3 strips for layer 0, nothing for the empty sprite layer
        assert_eq!(tiles.word_map, vec![1, 2, 3]);
        assert_eq!(tiles.dictionary.words()[3], [9, 10, 0, 0]);
    }

    #[test]
    fn tiling_layer_repeats_its_row() {
        let mut info = LevelInfo::new(Version::Base);
        info.layers[0].misc = crate::info::misc::TILE_WIDTH;
        let mut layers = grids();
        layers[0] = Layer::new(6, 1);
        for x in 0..6 {
            layers[0][(x, 0)] = Cell::tile(x as u16 + 1);
        }
        normalize_layers(&mut info, &layers);
        assert_eq!(info.layers[0].real_width, 12);
        let tiles = encode_tiles(&info, &layers, Version::Base).unwrap();
        let words: Vec<Word> = tiles
            .word_map
            .iter()
            .map(|&w| tiles.dictionary.words()[w as usize])
            .collect();
        assert_eq!(words, vec![[1, 2, 3, 4], [5, 6, 1, 2], [3, 4, 5, 6]]);
    }

    #[test]
    fn animated_event_strips_are_never_shared() {
        let mut info = LevelInfo::new(Version::Base);
        info.anims.push(crate::info::AnimatedTile::default());
        let mut layers = grids();
        layers[SPRITE_LAYER] = Layer::new(8, 2);
        let spring = Cell {
            event: 0x41,
            ..Cell::animated(0)
        };
        layers[SPRITE_LAYER][(0, 0)] = spring;
        layers[SPRITE_LAYER][(0, 1)] = spring;
        layers[SPRITE_LAYER][(4, 1)] = Cell::animated(0);
        normalize_layers(&mut info, &layers);
        let tiles = encode_tiles(&info, &layers, Version::Base).unwrap();
        // Both spring strips get words of their own, while the plain
        // animated strip reuses the first copy
        assert_eq!(tiles.word_map, vec![1, 0, 2, 1]);
        assert_eq!(tiles.dictionary.len(), 3);
        assert_eq!(tiles.dictionary.words()[1], [1023, 0, 0, 0]);
        assert_eq!(tiles.dictionary.words()[1], tiles.dictionary.words()[2]);
        assert_eq!(tiles.events[0], 0x41);
        assert_eq!(tiles.events[8], 0x41);
        assert_eq!(tiles.events.len(), 16);
    }

    #[test]
    fn empty_cells_lose_their_flip() {
        let mut info = LevelInfo::new(Version::Base);
        let mut layers = grids();
        layers[1] = Layer::new(4, 1);
        layers[1][(0, 0)] = Cell {
            flipped: true,
            ..Cell::default()
        };
        layers[1][(1, 0)] = Cell {
            flipped: true,
            ..Cell::tile(12)
        };
        normalize_layers(&mut info, &layers);
        let tiles = encode_tiles(&info, &layers, Version::Base).unwrap();
        assert_eq!(tiles.dictionary.words()[1], [0, 0x400 | 12, 0, 0]);
        assert_eq!(tiles.flipped_tiles, HashSet::from([12]));
        assert!(tiles.flipped_anims.is_empty());
    }
}
