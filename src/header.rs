//! The fixed 262-byte header that opens every level file.

use crate::error::ReadError;
use crate::read_helper;
use crate::write_helper;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Cursor, Read, Write};

/// Length of the header in bytes.
pub const HEADER_LEN: usize = 262;

/// Magic identifier every level file carries at byte 180.
pub const MAGIC: &[u8; 4] = b"LEVL";

/// Width of the copyright field.
pub const COPYRIGHT_LEN: usize = 180;

/// Width of the level name field.
pub const NAME_LEN: usize = 32;

/// Number of compressed streams in the file body.
pub const STREAM_COUNT: usize = 4;

/// The notice written into the copyright field of every exported file.
pub const HEADER_NOTICE: &str = concat!(
    "                      Jazz Jackrabbit 2 Data File\r\n\r\n",
    "         Retail distribution of this data is prohibited without\r\n",
    "             written permission from Epic MegaGames, Inc.\r\n\r\n\x1A"
);

/// The recorded sizes of one body stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamSize {
    /// Bytes the stream occupies in the file.
    pub compressed: u32,
    /// Bytes the stream inflates to.
    pub uncompressed: u32,
}

/// The file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    /// Copyright text.
    pub copyright: String,
    /// Magic identifier, `LEVL` in every valid file.
    pub magic: [u8; 4],
    /// Three bytes of the level password's hash.
    pub password_hash: [u8; 3],
    /// Whether the level is hidden from the in-game level list.
    pub hide_level: bool,
    /// Level name, mirrored from the level info on export.
    pub level_name: String,
    /// Raw format version.
    pub version: u16,
    /// Total size of the file.
    pub file_size: u32,
    /// CRC-32 of every byte after the header.
    pub checksum: u32,
    /// Sizes of the four body streams, in body order.
    pub stream_sizes: [StreamSize; STREAM_COUNT],
}

impl Default for FileHeader {
    fn default() -> Self {
        FileHeader {
            copyright: HEADER_NOTICE.to_owned(),
            magic: *MAGIC,
            password_hash: [0; 3],
            hide_level: false,
            level_name: String::new(),
            version: crate::Version::default().raw(),
            file_size: 0,
            checksum: 0,
            stream_sizes: [StreamSize::default(); STREAM_COUNT],
        }
    }
}

impl FileHeader {
    /// Parses a header from the start of a buffer.
    ///
    /// This only decodes fields, it doesn't validate them.
    ///
    /// # Errors
    /// Errors if the buffer is shorter than [`HEADER_LEN`].
    pub fn parse(bytes: &[u8]) -> Result<Self, ReadError> {
        if bytes.len() < HEADER_LEN {
            return Err(ReadError::Truncated {
                context: "file header",
                expected: HEADER_LEN,
                found: bytes.len(),
            });
        }
        Ok(Self::read(&mut Cursor::new(&bytes[..HEADER_LEN]))?)
    }

    fn read(mut cursor: impl Read) -> io::Result<Self> {
        let copyright = read_helper::read_fixed_string(&mut cursor, COPYRIGHT_LEN)?;
        let magic = read_helper::read_array::<4>(&mut cursor)?;
        let password_hash = read_helper::read_array::<3>(&mut cursor)?;
        let hide_level = cursor.read_u8()? > 0;
        let level_name = read_helper::read_fixed_string(&mut cursor, NAME_LEN)?;
        let version = cursor.read_u16::<LittleEndian>()?;
        let file_size = cursor.read_u32::<LittleEndian>()?;
        let checksum = cursor.read_u32::<LittleEndian>()?;
        let raw_sizes = read_helper::read_u32_array::<8>(&mut cursor)?;
        let mut stream_sizes = [StreamSize::default(); STREAM_COUNT];
        for (size, pair) in stream_sizes.iter_mut().zip(raw_sizes.chunks_exact(2)) {
            size.compressed = pair[0];
            size.uncompressed = pair[1];
        }
        Ok(FileHeader {
            copyright,
            magic,
            password_hash,
            hide_level,
            level_name,
            version,
            file_size,
            checksum,
            stream_sizes,
        })
    }

    /// Writes the header's 262 bytes.
    ///
    /// # Errors
    /// Errors if the writer fails.
    pub fn write(&self, mut cursor: impl Write) -> io::Result<()> {
        write_helper::write_fixed_string(&mut cursor, &self.copyright, COPYRIGHT_LEN)?;
        cursor.write_all(&self.magic)?;
        cursor.write_all(&self.password_hash)?;
        cursor.write_u8(self.hide_level as u8)?;
        write_helper::write_fixed_string(&mut cursor, &self.level_name, NAME_LEN)?;
        cursor.write_u16::<LittleEndian>(self.version)?;
        cursor.write_u32::<LittleEndian>(self.file_size)?;
        cursor.write_u32::<LittleEndian>(self.checksum)?;
        for size in &self.stream_sizes {
            cursor.write_u32::<LittleEndian>(size.compressed)?;
            cursor.write_u32::<LittleEndian>(size.uncompressed)?;
        }
        Ok(())
    }

    /// Serializes the header into a fresh buffer.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_LEN);
        // Writing into a Vec can't fail
        let _ = self.write(&mut buf);
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_262_bytes() {
        let header = FileHeader {
            level_name: "Castle 1".into(),
            password_hash: [1, 2, 3],
            hide_level: true,
            file_size: 1234,
            checksum: 0xDEAD_BEEF,
            stream_sizes: [StreamSize {
                compressed: 7,
                uncompressed: 9,
            }; STREAM_COUNT],
            ..FileHeader::default()
        };
        let bytes = header.to_bytes();
        assert_eq!(bytes.len(), HEADER_LEN);
        assert_eq!(&bytes[180..184], b"LEVL");
        assert_eq!(&bytes[184..187], &[1, 2, 3]);
        assert_eq!(bytes[187], 1);
        assert_eq!(&bytes[188..196], b"Castle 1");
        assert_eq!(&bytes[220..222], &0x202_u16.to_le_bytes());
        assert_eq!(&bytes[226..230], &0xDEAD_BEEF_u32.to_le_bytes());
        assert_eq!(FileHeader::parse(&bytes).unwrap(), header);
    }

    #[test]
    fn short_buffer() {
        assert!(matches!(
            FileHeader::parse(&[0; 100]),
            Err(ReadError::Truncated { found: 100, .. })
        ));
    }
}
