use byteorder::{LittleEndian, WriteBytesExt};
use bytemuck::cast_slice;
use libflate::zlib::Encoder;
use std::io;
use std::io::Write;

/// Writes text into a fixed-width, zero-padded field.
///
/// Characters outside Latin-1 are written as `?`. Text that fills the whole
/// field is stored without a terminator.
pub(crate) fn write_fixed_string(mut w: impl Write, string: &str, width: usize) -> io::Result<()> {
    let mut bytes: Vec<u8> = string
        .chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .take(width)
        .collect();
    bytes.resize(width, 0);
    w.write_all(&bytes)
}

pub(crate) fn write_u32_slice(mut w: impl Write, values: &[u32]) -> io::Result<()> {
    for &value in values {
        w.write_u32::<LittleEndian>(value)?;
    }
    Ok(())
}

pub(crate) fn write_i32_slice(mut w: impl Write, values: &[i32]) -> io::Result<()> {
    for &value in values {
        w.write_i32::<LittleEndian>(value)?;
    }
    Ok(())
}

/// Lays out 16-bit words as little-endian bytes.
pub(crate) fn u16_bytes(words: &[u16]) -> Vec<u8> {
    if cfg!(target_endian = "little") {
        // Use bytemuck to safely cast the words
        cast_slice::<u16, u8>(words).to_vec()
    } else {
        words.iter().flat_map(|w| w.to_le_bytes()).collect()
    }
}

/// Lays out 32-bit words as little-endian bytes.
pub(crate) fn u32_bytes(words: &[u32]) -> Vec<u8> {
    if cfg!(target_endian = "little") {
        cast_slice::<u32, u8>(words).to_vec()
    } else {
        words.iter().flat_map(|w| w.to_le_bytes()).collect()
    }
}

pub(crate) fn deflate(data: &[u8]) -> io::Result<Vec<u8>> {
    // libflate has no level setting, its default is its strongest mode
    let mut encoder = Encoder::new(Vec::new())?;
    encoder.write_all(data)?;
    encoder.finish().into_result()
}
