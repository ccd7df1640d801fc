//! The level info record: per-level metadata, the eight layers' properties,
//! the per-tile tables and the animated tile definitions.
//!
//! The record has no length prefix of its own. Its size depends on the
//! version (which sizes the per-tile tables) and on the animation count,
//! which has to be peeked out of the raw buffer before the record can be
//! parsed. See [`Layout`].

use crate::error::ReadError;
use crate::read_helper;
use crate::version::Version;
use crate::write_helper;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Cursor, Read, Write};

/// Number of layers in a level.
pub const LAYER_COUNT: usize = 8;

/// The layer that holds sprites and events.
pub const SPRITE_LAYER: usize = 3;

/// Number of help text slots.
pub const HELP_STRING_COUNT: usize = 16;

/// Width of a help text slot.
pub const HELP_STRING_LEN: usize = 512;

/// Width of the file name fields.
pub const FILENAME_LEN: usize = 32;

/// Byte offset of the animation count within the record.
pub const ANIM_COUNT_OFFSET: usize = 11;

/// Length of everything up to and including the `AnimOffset` field.
pub const FIXED_PREFIX_LEN: usize = 8813;

/// Z-axis depth every layer is normalized to on export.
pub const CANONICAL_Z_AXIS: [i32; LAYER_COUNT] = [-300, -200, -100, 0, 100, 200, 300, 400];

/// Bits of [`LayerProperties::misc`].
pub mod misc {
    /// The layer tiles horizontally.
    pub const TILE_WIDTH: u32 = 1 << 0;
    /// The layer tiles vertically.
    pub const TILE_HEIGHT: u32 = 1 << 1;
    /// Only the region the size of the sprite layer is visible.
    pub const LIMIT_VISIBLE_REGION: u32 = 1 << 2;
    /// The layer is drawn with a texture mode.
    pub const TEXTURE_MODE: u32 = 1 << 3;
    /// Parallax stars are drawn in texture mode.
    pub const PARALLAX_STARS: u32 = 1 << 4;
}

/// Byte geometry of a level info record for one version and animation count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// The version, which sizes the per-tile tables.
    pub version: Version,
    /// Number of entries in the animated tile table.
    pub anim_count: u16,
}

impl Layout {
    /// Resolves the layout of a raw record by peeking its animation count.
    ///
    /// # Errors
    /// Errors if the buffer doesn't reach the animation count field.
    pub fn peek(version: Version, bytes: &[u8]) -> Result<Self, ReadError> {
        let field = bytes
            .get(ANIM_COUNT_OFFSET..ANIM_COUNT_OFFSET + 2)
            .ok_or(ReadError::Truncated {
                context: "level info",
                expected: ANIM_COUNT_OFFSET + 2,
                found: bytes.len(),
            })?;
        Ok(Layout {
            version,
            anim_count: u16::from_le_bytes([field[0], field[1]]),
        })
    }

    /// Offset of the tileset event table.
    #[must_use]
    pub fn tileset_events_offset(&self) -> usize {
        FIXED_PREFIX_LEN
    }

    /// Offset of the animated tile table.
    #[must_use]
    pub fn anims_offset(&self) -> usize {
        // Events are four bytes per tile, followed by three one-byte tables
        FIXED_PREFIX_LEN + self.version.max_tiles() as usize * 7
    }

    /// Total length of the record.
    #[must_use]
    pub fn len(&self) -> usize {
        self.anims_offset() + self.anim_count as usize * AnimatedTile::LEN
    }

    /// A record always has a fixed prefix, so this is never true.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// The properties of one layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayerProperties {
    /// Bitfield of [`misc`] flags.
    pub misc: u32,
    /// Layer type, unused by the game.
    pub kind: u8,
    /// Whether the layer has any tiles stored in the word map.
    pub has_tiles: bool,
    /// Width in tiles.
    pub width: u32,
    /// Word map stride in tiles. Only differs from `width` when the layer tiles horizontally.
    pub real_width: u32,
    /// Height in tiles.
    pub height: u32,
    /// Z-axis depth. Editors don't honor custom values.
    pub z_axis: i32,
    /// Detail level.
    pub detail_level: u8,
    /// X offset in 16.16 fixed point pixels.
    pub x_offset: i32,
    /// Y offset in 16.16 fixed point pixels.
    pub y_offset: i32,
    /// X scroll speed in 16.16 fixed point.
    pub x_speed: i32,
    /// Y scroll speed in 16.16 fixed point.
    pub y_speed: i32,
    /// X auto scroll speed in 16.16 fixed point.
    pub auto_x_speed: i32,
    /// Y auto scroll speed in 16.16 fixed point.
    pub auto_y_speed: i32,
    /// Texture mode.
    pub texture_mode: u8,
    /// Texture parameters.
    pub texture_params: [u8; 3],
}

impl LayerProperties {
    /// Whether the layer tiles horizontally.
    #[inline]
    #[must_use]
    pub fn tile_width(&self) -> bool {
        self.misc & misc::TILE_WIDTH != 0
    }

    /// Number of 4-tile strips the word map holds per row of this layer.
    #[must_use]
    pub fn strips_per_row(&self) -> usize {
        let stride = if self.tile_width() {
            self.real_width
        } else {
            self.width
        };
        (stride as usize).div_ceil(4)
    }

    /// Computes the word map stride for the layer's current width.
    ///
    /// A horizontally tiling layer whose width isn't a multiple of four is
    /// padded by repeating it until it is.
    #[must_use]
    pub fn computed_real_width(&self) -> u32 {
        if !self.tile_width() {
            return self.width;
        }
        match self.width % 4 {
            0 => self.width,
            2 => self.width * 2,
            _ => self.width * 4,
        }
    }
}

/// An animated tile definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimatedTile {
    /// Frames to wait between loops.
    pub frame_wait: u16,
    /// Random extra frames to wait between loops.
    pub random_wait: u16,
    /// Frames to wait between ping-pong directions.
    pub ping_pong_wait: u16,
    /// Whether the animation plays back and forth.
    pub ping_pong: bool,
    /// Frames per second.
    pub speed: u8,
    /// Number of used entries in `frames`.
    pub frame_count: u8,
    /// Packed cell codes of each frame.
    pub frames: [u16; 64],
}

impl Default for AnimatedTile {
    fn default() -> Self {
        AnimatedTile {
            frame_wait: 0,
            random_wait: 0,
            ping_pong_wait: 0,
            ping_pong: false,
            speed: 10,
            frame_count: 0,
            frames: [0; 64],
        }
    }
}

impl AnimatedTile {
    /// Length of one definition in bytes.
    pub const LEN: usize = 137;

    fn read(mut cursor: impl Read) -> io::Result<Self> {
        let frame_wait = cursor.read_u16::<LittleEndian>()?;
        let random_wait = cursor.read_u16::<LittleEndian>()?;
        let ping_pong_wait = cursor.read_u16::<LittleEndian>()?;
        let ping_pong = cursor.read_u8()? > 0;
        let speed = cursor.read_u8()?;
        let frame_count = cursor.read_u8()?;
        let mut frames = [0; 64];
        cursor.read_u16_into::<LittleEndian>(&mut frames)?;
        Ok(AnimatedTile {
            frame_wait,
            random_wait,
            ping_pong_wait,
            ping_pong,
            speed,
            frame_count,
            frames,
        })
    }

    fn write(&self, mut cursor: impl Write) -> io::Result<()> {
        cursor.write_u16::<LittleEndian>(self.frame_wait)?;
        cursor.write_u16::<LittleEndian>(self.random_wait)?;
        cursor.write_u16::<LittleEndian>(self.ping_pong_wait)?;
        cursor.write_u8(self.ping_pong as u8)?;
        cursor.write_u8(self.speed)?;
        cursor.write_u8(self.frame_count)?;
        for frame in self.frames {
            cursor.write_u16::<LittleEndian>(frame)?;
        }
        Ok(())
    }
}

/// Per-level metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelInfo {
    /// Horizontal scroll position of the editor's view.
    pub jcs_horizontal_offset: u16,
    /// `0xBA00` when password protected.
    pub security_envelope_1: u16,
    /// Vertical scroll position of the editor's view.
    pub jcs_vertical_offset: u16,
    /// `0xBE00` when password protected.
    pub security_envelope_2: u16,
    /// Upper nibble set when password protected, lower nibble is the editor's last layer.
    pub sec_env_and_layer: u8,
    /// Minimum light, in units of 1/64.
    pub min_light: u8,
    /// Starting light, in units of 1/64.
    pub start_light: u8,
    /// Whether splitscreen splits vertically.
    pub vertical_splitscreen: bool,
    /// Whether this is a multiplayer level.
    pub is_multiplayer: bool,
    /// Length of the serialized record, as stored.
    pub buffer_size: u32,
    /// Display name of the level.
    pub level_name: String,
    /// Tileset file name.
    pub tileset: String,
    /// Bonus level file name.
    pub bonus_level: String,
    /// Next level file name.
    pub next_level: String,
    /// Secret level file name.
    pub secret_level: String,
    /// Music file name.
    pub music_file: String,
    /// Help text slots.
    pub help_strings: [String; HELP_STRING_COUNT],
    /// Properties of each layer.
    pub layers: [LayerProperties; LAYER_COUNT],
    /// Number of static tiles, as stored.
    pub static_tiles: u16,
    /// Event attached to each tileset tile.
    pub tileset_events: Vec<u32>,
    /// Whether each static tile appears flipped anywhere in the level.
    pub tile_flipped: Vec<bool>,
    /// Type of each tile (translucent, caption).
    pub tile_types: Vec<u8>,
    /// Unused per-tile table.
    pub x_mask: Vec<u8>,
    /// Animated tile definitions.
    pub anims: Vec<AnimatedTile>,
}

impl LevelInfo {
    /// Creates a blank record for a version.
    #[must_use]
    pub fn new(version: Version) -> Self {
        let max_tiles = version.max_tiles() as usize;
        LevelInfo {
            jcs_horizontal_offset: 0,
            security_envelope_1: 0,
            jcs_vertical_offset: 0,
            security_envelope_2: 0,
            sec_env_and_layer: 0,
            min_light: 64,
            start_light: 64,
            vertical_splitscreen: false,
            is_multiplayer: false,
            buffer_size: 0,
            level_name: String::new(),
            tileset: String::new(),
            bonus_level: String::new(),
            next_level: String::new(),
            secret_level: String::new(),
            music_file: String::new(),
            help_strings: Default::default(),
            layers: Default::default(),
            static_tiles: version.max_tiles(),
            tileset_events: vec![0; max_tiles],
            tile_flipped: vec![false; max_tiles],
            tile_types: vec![0; max_tiles],
            x_mask: vec![0; max_tiles],
            anims: Vec::new(),
        }
    }

    /// Number of animated tile definitions.
    #[inline]
    #[must_use]
    pub fn anim_count(&self) -> u16 {
        self.anims.len() as u16
    }

    /// Returns the layout this record serializes to under a version.
    #[must_use]
    pub fn layout(&self, version: Version) -> Layout {
        Layout {
            version,
            anim_count: self.anim_count(),
        }
    }

    /// Parses a record from an inflated stream.
    ///
    /// The animation count is peeked first to size the trailing animation
    /// table. Bytes past the table are ignored.
    ///
    /// # Errors
    /// Errors if the buffer is shorter than the resolved layout.
    pub fn parse(version: Version, bytes: &[u8]) -> Result<Self, ReadError> {
        let layout = Layout::peek(version, bytes)?;
        if layout.anim_count > version.max_tiles() {
            return Err(ReadError::TooManyAnimations {
                count: layout.anim_count,
                max: version.max_tiles(),
            });
        }
        if bytes.len() < layout.len() {
            return Err(ReadError::Truncated {
                context: "level info",
                expected: layout.len(),
                found: bytes.len(),
            });
        }
        Ok(Self::read(layout, &mut Cursor::new(&bytes[..layout.len()]))?)
    }

    fn read(layout: Layout, mut cursor: impl Read) -> io::Result<Self> {
        let mut info = LevelInfo::new(layout.version);
        info.jcs_horizontal_offset = cursor.read_u16::<LittleEndian>()?;
        info.security_envelope_1 = cursor.read_u16::<LittleEndian>()?;
        info.jcs_vertical_offset = cursor.read_u16::<LittleEndian>()?;
        info.security_envelope_2 = cursor.read_u16::<LittleEndian>()?;
        info.sec_env_and_layer = cursor.read_u8()?;
        info.min_light = cursor.read_u8()?;
        info.start_light = cursor.read_u8()?;
        // Already resolved by the layout
        let _anim_count = cursor.read_u16::<LittleEndian>()?;
        info.vertical_splitscreen = cursor.read_u8()? > 0;
        info.is_multiplayer = cursor.read_u8()? > 0;
        info.buffer_size = cursor.read_u32::<LittleEndian>()?;
        info.level_name = read_helper::read_fixed_string(&mut cursor, FILENAME_LEN)?;
        info.tileset = read_helper::read_fixed_string(&mut cursor, FILENAME_LEN)?;
        info.bonus_level = read_helper::read_fixed_string(&mut cursor, FILENAME_LEN)?;
        info.next_level = read_helper::read_fixed_string(&mut cursor, FILENAME_LEN)?;
        info.secret_level = read_helper::read_fixed_string(&mut cursor, FILENAME_LEN)?;
        info.music_file = read_helper::read_fixed_string(&mut cursor, FILENAME_LEN)?;
        for help in &mut info.help_strings {
            *help = read_helper::read_fixed_string(&mut cursor, HELP_STRING_LEN)?;
        }

        // Layer properties are stored as parallel arrays
        let misc = read_helper::read_u32_array::<LAYER_COUNT>(&mut cursor)?;
        let kind = read_helper::read_array::<LAYER_COUNT>(&mut cursor)?;
        let has_tiles = read_helper::read_array::<LAYER_COUNT>(&mut cursor)?;
        let width = read_helper::read_u32_array::<LAYER_COUNT>(&mut cursor)?;
        let real_width = read_helper::read_u32_array::<LAYER_COUNT>(&mut cursor)?;
        let height = read_helper::read_u32_array::<LAYER_COUNT>(&mut cursor)?;
        let z_axis = read_helper::read_i32_array::<LAYER_COUNT>(&mut cursor)?;
        let detail_level = read_helper::read_array::<LAYER_COUNT>(&mut cursor)?;
        let x_offset = read_helper::read_i32_array::<LAYER_COUNT>(&mut cursor)?;
        let y_offset = read_helper::read_i32_array::<LAYER_COUNT>(&mut cursor)?;
        let x_speed = read_helper::read_i32_array::<LAYER_COUNT>(&mut cursor)?;
        let y_speed = read_helper::read_i32_array::<LAYER_COUNT>(&mut cursor)?;
        let auto_x_speed = read_helper::read_i32_array::<LAYER_COUNT>(&mut cursor)?;
        let auto_y_speed = read_helper::read_i32_array::<LAYER_COUNT>(&mut cursor)?;
        let texture_mode = read_helper::read_array::<LAYER_COUNT>(&mut cursor)?;
        let texture_params = read_helper::read_array::<{ LAYER_COUNT * 3 }>(&mut cursor)?;
        for (l, layer) in info.layers.iter_mut().enumerate() {
            *layer = LayerProperties {
                misc: misc[l],
                kind: kind[l],
                has_tiles: has_tiles[l] > 0,
                width: width[l],
                real_width: real_width[l],
                height: height[l],
                z_axis: z_axis[l],
                detail_level: detail_level[l],
                x_offset: x_offset[l],
                y_offset: y_offset[l],
                x_speed: x_speed[l],
                y_speed: y_speed[l],
                auto_x_speed: auto_x_speed[l],
                auto_y_speed: auto_y_speed[l],
                texture_mode: texture_mode[l],
                texture_params: [
                    texture_params[l * 3],
                    texture_params[l * 3 + 1],
                    texture_params[l * 3 + 2],
                ],
            };
        }

        info.static_tiles = cursor.read_u16::<LittleEndian>()?;
        cursor.read_u32_into::<LittleEndian>(&mut info.tileset_events)?;
        let mut flipped = vec![0; info.tile_flipped.len()];
        cursor.read_exact(&mut flipped)?;
        info.tile_flipped = flipped.into_iter().map(|b| b > 0).collect();
        cursor.read_exact(&mut info.tile_types)?;
        cursor.read_exact(&mut info.x_mask)?;
        info.anims = (0..layout.anim_count)
            .map(|_| AnimatedTile::read(&mut cursor))
            .collect::<io::Result<_>>()?;
        Ok(info)
    }

    /// Serializes the record under a version.
    ///
    /// Per-tile tables are zero-padded or truncated to the version's tile count.
    ///
    /// # Errors
    /// Errors if the writer fails.
    pub fn write(&self, version: Version, mut cursor: impl Write) -> io::Result<()> {
        cursor.write_u16::<LittleEndian>(self.jcs_horizontal_offset)?;
        cursor.write_u16::<LittleEndian>(self.security_envelope_1)?;
        cursor.write_u16::<LittleEndian>(self.jcs_vertical_offset)?;
        cursor.write_u16::<LittleEndian>(self.security_envelope_2)?;
        cursor.write_u8(self.sec_env_and_layer)?;
        cursor.write_u8(self.min_light)?;
        cursor.write_u8(self.start_light)?;
        cursor.write_u16::<LittleEndian>(self.anim_count())?;
        cursor.write_u8(self.vertical_splitscreen as u8)?;
        cursor.write_u8(self.is_multiplayer as u8)?;
        cursor.write_u32::<LittleEndian>(self.buffer_size)?;
        for name in [
            &self.level_name,
            &self.tileset,
            &self.bonus_level,
            &self.next_level,
            &self.secret_level,
            &self.music_file,
        ] {
            write_helper::write_fixed_string(&mut cursor, name, FILENAME_LEN)?;
        }
        for help in &self.help_strings {
            write_helper::write_fixed_string(&mut cursor, help, HELP_STRING_LEN)?;
        }

        let layers = self.layers;
        write_helper::write_u32_slice(&mut cursor, &layers.map(|l| l.misc))?;
        cursor.write_all(&layers.map(|l| l.kind))?;
        cursor.write_all(&layers.map(|l| l.has_tiles as u8))?;
        write_helper::write_u32_slice(&mut cursor, &layers.map(|l| l.width))?;
        write_helper::write_u32_slice(&mut cursor, &layers.map(|l| l.real_width))?;
        write_helper::write_u32_slice(&mut cursor, &layers.map(|l| l.height))?;
        write_helper::write_i32_slice(&mut cursor, &layers.map(|l| l.z_axis))?;
        cursor.write_all(&layers.map(|l| l.detail_level))?;
        write_helper::write_i32_slice(&mut cursor, &layers.map(|l| l.x_offset))?;
        write_helper::write_i32_slice(&mut cursor, &layers.map(|l| l.y_offset))?;
        write_helper::write_i32_slice(&mut cursor, &layers.map(|l| l.x_speed))?;
        write_helper::write_i32_slice(&mut cursor, &layers.map(|l| l.y_speed))?;
        write_helper::write_i32_slice(&mut cursor, &layers.map(|l| l.auto_x_speed))?;
        write_helper::write_i32_slice(&mut cursor, &layers.map(|l| l.auto_y_speed))?;
        cursor.write_all(&layers.map(|l| l.texture_mode))?;
        for layer in &layers {
            cursor.write_all(&layer.texture_params)?;
        }

        cursor.write_u16::<LittleEndian>(self.static_tiles)?;
        let max_tiles = version.max_tiles() as usize;
        let mut events = self.tileset_events.clone();
        events.resize(max_tiles, 0);
        write_helper::write_u32_slice(&mut cursor, &events)?;
        let mut flipped: Vec<u8> = self.tile_flipped.iter().map(|&f| f as u8).collect();
        flipped.resize(max_tiles, 0);
        cursor.write_all(&flipped)?;
        let mut types = self.tile_types.clone();
        types.resize(max_tiles, 0);
        cursor.write_all(&types)?;
        let mut x_mask = self.x_mask.clone();
        x_mask.resize(max_tiles, 0);
        cursor.write_all(&x_mask)?;
        for anim in &self.anims {
            anim.write(&mut cursor)?;
        }
        Ok(())
    }

    /// Serializes the record into a fresh buffer.
    #[must_use]
    pub fn to_bytes(&self, version: Version) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.layout(version).len());
        // Writing into a Vec can't fail
        let _ = self.write(version, &mut buf);
        buf
    }

    /// Resizes the per-tile tables to a version's tile count.
    pub fn resize_tables(&mut self, version: Version) {
        let max_tiles = version.max_tiles() as usize;
        self.tileset_events.resize(max_tiles, 0);
        self.tile_flipped.resize(max_tiles, false);
        self.tile_types.resize(max_tiles, 0);
        self.x_mask.resize(max_tiles, 0);
    }
}

impl Default for LevelInfo {
    fn default() -> Self {
        Self::new(Version::default())
    }
}
