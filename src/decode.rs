//! Rebuilds a [`Level`] from the bytes of a file.

use crate::cell::{decode_cell, Cell};
use crate::checksum;
use crate::error::ReadError;
use crate::grid::{Layer, TileGrid};
use crate::header::{FileHeader, HEADER_LEN, MAGIC};
use crate::info::{LayerProperties, LevelInfo, LAYER_COUNT, SPRITE_LAYER};
use crate::options::LoadOptions;
use crate::read_helper;
use crate::stream;
use crate::version::Version;
use crate::Level;
use log::debug;

/// Largest grid a layer may claim without tile data to back it.
pub(crate) const MAX_BARE_LAYER_CELLS: usize = 1 << 24;

/// Parses, validates and decodes a whole file.
pub(crate) fn decode_level(bytes: &[u8], options: &LoadOptions) -> Result<Level, ReadError> {
    let header = FileHeader::parse(bytes)?;
    if &header.magic != MAGIC {
        return Err(ReadError::InvalidMagic);
    }
    let body = &bytes[HEADER_LEN..];
    checksum::verify(&header, body)?;
    let version = Version::try_from(header.version).map_err(ReadError::UnsupportedVersion)?;
    debug!("loading level \"{}\", version {version}", header.level_name);

    let [info_bytes, event_bytes, dictionary_bytes, word_map_bytes] =
        stream::inflate_all(&header, body, options.parallel)?;
    let info = LevelInfo::parse(version, &info_bytes)?;
    let events = read_helper::to_u32_words(&event_bytes);
    let dictionary = read_helper::to_u16_words(&dictionary_bytes);
    let word_map = read_helper::to_u16_words(&word_map_bytes);
    debug!(
        "{} animations, {} dictionary words, {} word map entries",
        info.anim_count(),
        dictionary.len() / 4,
        word_map.len()
    );

    let mut layers: [Layer; LAYER_COUNT] = Default::default();
    let mut words = WordMapReader {
        dictionary: &dictionary,
        word_map: &word_map,
        offset: 0,
    };
    for (l, layer) in layers.iter_mut().enumerate() {
        let props = &info.layers[l];
        check_layer_size(l, props, &words)?;
        layer.resize(props.width, props.height);
        let events = if l == SPRITE_LAYER { events.as_slice() } else { &[] };
        decode_layer(layer, l, props, events, &mut words, version, info.anim_count())?;
    }
    if words.offset < word_map.len() {
        debug!("{} unused word map entries", word_map.len() - words.offset);
    }

    Ok(Level {
        version,
        header,
        info,
        layers,
    })
}

/// Walks the word map, handing out the dictionary words it references.
pub(crate) struct WordMapReader<'a> {
    dictionary: &'a [u16],
    word_map: &'a [u16],
    offset: usize,
}

impl<'a> WordMapReader<'a> {
    fn remaining(&self) -> usize {
        self.word_map.len() - self.offset
    }

    fn next_word(&mut self, layer: usize) -> Result<&'a [u16], ReadError> {
        let word = *self
            .word_map
            .get(self.offset)
            .ok_or(ReadError::WordMapTooShort { layer })?;
        self.offset += 1;
        let start = word as usize * 4;
        self.dictionary
            .get(start..start + 4)
            .ok_or(ReadError::WordOutOfRange {
                word,
                len: self.dictionary.len() / 4,
            })
    }
}

/// Makes sure a layer's grid is backed by the streams before allocating it.
///
/// A layer with tiles needs a word map entry per strip, and its strips must
/// span its width. Other layers are capped at [`MAX_BARE_LAYER_CELLS`].
fn check_layer_size(l: usize, props: &LayerProperties, words: &WordMapReader) -> Result<(), ReadError> {
    let too_large = || ReadError::LayerTooLarge {
        layer: l,
        width: props.width,
        height: props.height,
    };
    let cells = (props.width as usize)
        .checked_mul(props.height as usize)
        .ok_or_else(too_large)?;
    if !props.has_tiles {
        return if cells > MAX_BARE_LAYER_CELLS {
            Err(too_large())
        } else {
            Ok(())
        };
    }
    let strips = props
        .strips_per_row()
        .checked_mul(props.height as usize)
        .ok_or_else(too_large)?;
    if strips > words.remaining() {
        return Err(ReadError::WordMapTooShort { layer: l });
    }
    if cells > strips.saturating_mul(4) {
        return Err(too_large());
    }
    Ok(())
}

/// Fills one layer row by row.
///
/// Layers without tiles consume no word map entries; their cells stay empty
/// apart from any events.
fn decode_layer<G: TileGrid>(
    grid: &mut G,
    l: usize,
    props: &LayerProperties,
    events: &[u32],
    words: &mut WordMapReader,
    version: Version,
    anim_count: u16,
) -> Result<(), ReadError> {
    let width = props.width as usize;
    if !props.has_tiles && events.is_empty() {
        return Ok(());
    }
    let strips = props.strips_per_row();
    let mut row = vec![Cell::default(); width];
    for y in 0..props.height as usize {
        for (x, cell) in row.iter_mut().enumerate() {
            *cell = Cell {
                event: events.get(x + width * y).copied().unwrap_or(0),
                ..Cell::default()
            };
        }
        if props.has_tiles {
            for strip in 0..strips {
                let word = words.next_word(l)?;
                for (t, &raw) in word.iter().enumerate() {
                    let x = strip * 4 + t;
                    if x >= width {
                        break;
                    }
                    row[x] = Cell {
                        event: row[x].event,
                        ..decode_cell(raw, version, anim_count)
                    };
                }
            }
        }
        grid.replace_region(0, y as u32, props.width, &row);
    }
    Ok(())
}
