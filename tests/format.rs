use j2l::checksum::{body_checksum, seal};
use j2l::header::{FileHeader, HEADER_LEN};
use j2l::info::{misc, CANONICAL_Z_AXIS};
use j2l::stream::{self, DICTIONARY, EVENTS, LEVEL_INFO, WORD_MAP};
use j2l::{Cell, Level, LevelInfo, ReadError, Version, LAYER_COUNT, SPRITE_LAYER};

fn words(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect()
}

/// Splits an exported file into its header, level info and raw streams.
fn unpack(bytes: &[u8]) -> (FileHeader, LevelInfo, [Vec<u8>; 4]) {
    let header = FileHeader::parse(bytes).unwrap();
    let streams = stream::inflate_all(&header, &bytes[HEADER_LEN..], false).unwrap();
    let version = Version::try_from(header.version).unwrap();
    let info = LevelInfo::parse(version, &streams[LEVEL_INFO]).unwrap();
    (header, info, streams)
}

/// Packs raw streams into a sealed file.
fn pack(info: &LevelInfo, events: &[u8], dictionary: &[u8], word_map: &[u8]) -> Vec<u8> {
    let info_bytes = info.to_bytes(Version::Base);
    let (body, sizes) =
        stream::deflate_all([info_bytes.as_slice(), events, dictionary, word_map], false).unwrap();
    let mut header = FileHeader {
        version: 0x202,
        stream_sizes: sizes,
        ..FileHeader::default()
    };
    seal(&mut header, &body);
    let mut file = header.to_bytes();
    file.extend_from_slice(&body);
    file
}

fn code_bytes(codes: &[u16]) -> Vec<u8> {
    codes.iter().flat_map(|c| c.to_le_bytes()).collect()
}

#[test]
fn blank_sprite_layer_from_raw_streams() {
    let mut info = LevelInfo::new(Version::Base);
    info.layers[3].width = 100;
    info.layers[3].real_width = 100;
    info.layers[3].height = 50;
    info.layers[3].has_tiles = true;
    // 25 strips per row, every one of them word 0
    let file = pack(&info, &[0; 100 * 50 * 4], &[0; 8], &[0; 25 * 50 * 2]);

    let level = Level::from_bytes(&file).unwrap();
    let sprite = level.sprite_layer();
    assert_eq!((sprite.width(), sprite.height()), (100, 50));
    assert!(sprite.cells().iter().all(|cell| *cell == Cell::default()));
    for l in (0..LAYER_COUNT).filter(|&l| l != SPRITE_LAYER) {
        assert!(level.layers[l].cells().is_empty());
    }
}

#[test]
fn empty_layers_are_skipped() {
    let mut level = Level::new(Version::Base);
    level.resize_layer(0, 20, 20);
    level.resize_layer(SPRITE_LAYER, 8, 2);
    level.layers[SPRITE_LAYER][(6, 1)] = Cell::tile(42);

    let bytes = level.to_bytes().unwrap();
    let (_, info, streams) = unpack(&bytes);
    let has_tiles: Vec<bool> = info.layers.iter().map(|l| l.has_tiles).collect();
    assert_eq!(
        has_tiles,
        vec![false, false, false, true, false, false, false, false]
    );
    // Only the sprite layer's 2 rows of 2 strips are in the word map
    assert_eq!(words(&streams[WORD_MAP]), vec![0, 0, 0, 1]);
    assert_eq!(words(&streams[DICTIONARY]), vec![0, 0, 0, 0, 0, 0, 42, 0]);
    assert_eq!(streams[EVENTS].len(), 8 * 2 * 4);
}

#[test]
fn sprite_layer_always_has_tiles() {
    let level = Level::new(Version::Extended);
    let (_, info, streams) = unpack(&level.to_bytes().unwrap());
    assert!(info.layers[SPRITE_LAYER].has_tiles);
    assert!(streams[WORD_MAP].is_empty());
    // The zero word is there even when nothing uses it
    assert_eq!(words(&streams[DICTIONARY]), vec![0, 0, 0, 0]);
}

#[test]
fn checksum_and_size_fields() {
    let mut level = Level::new(Version::Base);
    level.resize_layer(SPRITE_LAYER, 33, 17);
    level.layers[SPRITE_LAYER][(32, 16)] = Cell::animated(0);
    level.info.anims.push(Default::default());
    let bytes = level.to_bytes().unwrap();
    let header = FileHeader::parse(&bytes).unwrap();
    assert_eq!(header.checksum, body_checksum(&bytes[HEADER_LEN..]));
    assert_eq!(header.file_size as usize, bytes.len());
    let compressed: u32 = header.stream_sizes.iter().map(|s| s.compressed).sum();
    assert_eq!(compressed as usize + HEADER_LEN, bytes.len());
    assert_eq!(&header.magic, b"LEVL");
    assert!(header.copyright.starts_with("                      Jazz Jackrabbit 2 Data File"));
}

#[test]
fn export_normalizes_layer_properties() {
    let mut level = Level::new(Version::Base);
    for l in 0..LAYER_COUNT {
        level.info.layers[l].z_axis = 12345;
    }
    level.info.layers[5].misc = misc::TILE_WIDTH;
    level.resize_layer(5, 10, 1);
    level.info.layers[5].real_width = 3;
    level.resize_layer(6, 10, 1);
    level.info.anims.push(Default::default());
    level.info.anims.push(Default::default());
    let (_, info, streams) = unpack(&level.to_bytes().unwrap());
    let z: Vec<i32> = info.layers.iter().map(|l| l.z_axis).collect();
    assert_eq!(z, CANONICAL_Z_AXIS.to_vec());
    assert_eq!(info.layers[5].real_width, 20);
    assert_eq!(info.layers[6].real_width, 10);
    assert_eq!(info.static_tiles, 1022);
    assert_eq!(info.buffer_size as usize, streams[LEVEL_INFO].len());
}

#[test]
fn width_not_divisible_by_four() {
    let mut level = Level::new(Version::Base);
    level.resize_layer(1, 10, 2);
    for x in 0..10 {
        level.layers[1][(x, 0)] = Cell::tile(7);
        level.layers[1][(x, 1)] = Cell::tile(8);
    }
    let bytes = level.to_bytes().unwrap();
    let (_, _, streams) = unpack(&bytes);
    // 3 strips per row, the last one only half used
    let map = words(&streams[WORD_MAP]);
    assert_eq!(map.len(), 6);
    let dictionary = words(&streams[DICTIONARY]);
    let last = map[2] as usize * 4;
    assert_eq!(&dictionary[last..last + 4], &[7, 7, 0, 0]);
    let loaded = Level::from_bytes(&bytes).unwrap();
    assert_eq!(loaded.layers[1], level.layers[1]);
}

#[test]
fn flip_table_tracks_static_tiles() {
    let mut level = Level::new(Version::Base);
    level.info.anims.push(Default::default());
    level.info.tile_flipped[900] = true;
    level.resize_layer(0, 4, 1);
    level.layers[0][(0, 0)] = Cell {
        flipped: true,
        ..Cell::tile(17)
    };
    level.layers[0][(1, 0)] = Cell {
        flipped: true,
        ..Cell::animated(0)
    };
    let (_, info, _) = unpack(&level.to_bytes().unwrap());
    assert!(info.tile_flipped[17]);
    // Stale entries are cleared, animations don't show up
    assert!(!info.tile_flipped[900]);
    assert!(!info.tile_flipped[0]);
    assert_eq!(info.tile_flipped.iter().filter(|&&f| f).count(), 1);
}

#[test]
fn modifier_runs_before_sealing() {
    let level = Level::new(Version::Base);
    let bytes = level
        .export_with(&Default::default(), |header, info| {
            header.level_name = "Secret".into();
            info.music_file = "boss1.j2b".into();
        })
        .unwrap();
    let loaded = Level::from_bytes(&bytes).unwrap();
    assert_eq!(loaded.header.level_name, "Secret");
    assert_eq!(loaded.info.music_file, "boss1.j2b");
}

#[test]
fn flipped_empty_code_survives_export() {
    let mut info = LevelInfo::new(Version::Base);
    info.layers[3].width = 4;
    info.layers[3].real_width = 4;
    info.layers[3].height = 1;
    info.layers[3].has_tiles = true;
    let file = pack(
        &info,
        &[0; 4 * 4],
        &code_bytes(&[0, 0, 0, 0, 0x400, 0, 0, 0]),
        &code_bytes(&[1]),
    );
    let level = Level::from_bytes(&file).unwrap();
    assert_eq!(level.layers[3][(0, 0)], Cell::default());
    let reloaded = Level::from_bytes(&level.to_bytes().unwrap()).unwrap();
    assert_eq!(reloaded.layers, level.layers);
}

#[test]
fn oversized_layers_are_rejected() {
    let mut info = LevelInfo::new(Version::Base);
    info.layers[0].width = u32::MAX;
    info.layers[0].height = u32::MAX;
    let file = pack(&info, &[], &[0; 8], &[]);
    let err = Level::from_bytes(&file).unwrap_err();
    assert!(matches!(err, ReadError::LayerTooLarge { layer: 0, .. }), "{err}");
    assert!(err.is_corrupt());

    // A layer with tiles needs a word per strip
    let mut info = LevelInfo::new(Version::Base);
    info.layers[1].width = 4000;
    info.layers[1].real_width = 4000;
    info.layers[1].height = 4000;
    info.layers[1].has_tiles = true;
    let file = pack(&info, &[], &[0; 8], &code_bytes(&[0; 10]));
    assert!(matches!(
        Level::from_bytes(&file),
        Err(ReadError::WordMapTooShort { layer: 1 })
    ));

    // Strips that don't span the width can't back the grid
    let mut info = LevelInfo::new(Version::Base);
    info.layers[2].width = 1 << 20;
    info.layers[2].real_width = 4;
    info.layers[2].height = 1;
    info.layers[2].misc = misc::TILE_WIDTH;
    info.layers[2].has_tiles = true;
    let file = pack(&info, &[], &[0; 8], &code_bytes(&[0]));
    assert!(matches!(
        Level::from_bytes(&file),
        Err(ReadError::LayerTooLarge { layer: 2, .. })
    ));
}
