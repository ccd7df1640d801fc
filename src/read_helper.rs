use byteorder::{LittleEndian, ReadBytesExt};
use libflate::zlib::Decoder;
use std::io;
use std::io::{Cursor, Read};

/// Reads a fixed-width field holding NUL-terminated Latin-1 text.
pub(crate) fn read_fixed_string(mut r: impl Read, width: usize) -> io::Result<String> {
    let mut bytes = vec![0u8; width];
    r.read_exact(bytes.as_mut_slice())?;
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(width);
    // Latin-1 maps every byte straight onto the first 256 code points
    Ok(bytes[..end].iter().map(|&b| b as char).collect())
}

pub(crate) fn read_array<const N: usize>(mut r: impl Read) -> io::Result<[u8; N]> {
    let mut buf = [0; N];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

pub(crate) fn read_u32_array<const N: usize>(mut r: impl Read) -> io::Result<[u32; N]> {
    let mut buf = [0; N];
    r.read_u32_into::<LittleEndian>(&mut buf)?;
    Ok(buf)
}

pub(crate) fn read_i32_array<const N: usize>(mut r: impl Read) -> io::Result<[i32; N]> {
    let mut buf = [0; N];
    r.read_i32_into::<LittleEndian>(&mut buf)?;
    Ok(buf)
}

/// Reinterprets a byte buffer as little-endian 16-bit words.
/// A trailing odd byte is dropped.
pub(crate) fn to_u16_words(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
        .collect()
}

/// Reinterprets a byte buffer as little-endian 32-bit words.
/// Trailing bytes that don't make a whole word are dropped.
pub(crate) fn to_u32_words(bytes: &[u8]) -> Vec<u32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

pub(crate) fn inflate(encoded: &[u8]) -> io::Result<Vec<u8>> {
    // Decode data using libflate
    let mut decoder = Decoder::new(Cursor::new(encoded))?;
    let mut decoded_buf = Vec::new();
    decoder.read_to_end(&mut decoded_buf)?;
    Ok(decoded_buf)
}
