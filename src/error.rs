use std::io;
use thiserror::Error;

/// A reason why reading a level failed.
#[derive(Debug, Error)]
pub enum ReadError {
    /// IO error.
    #[error("{0}")]
    IoError(#[from] io::Error),
    /// The magic identifier was not `LEVL`.
    #[error("found invalid magic string for level file")]
    InvalidMagic,
    /// The header named a version other than the two recognized ones.
    #[error("version 0x{0:03X} of level files is not supported")]
    UnsupportedVersion(u16),
    /// The checksum stored in the header doesn't match the file body.
    #[error("checksum mismatch: header says {expected:#010x}, body hashes to {actual:#010x}")]
    ChecksumMismatch {
        /// Checksum stored in the header.
        expected: u32,
        /// Checksum computed over the body.
        actual: u32,
    },
    /// A section ended before its layout did.
    #[error("{context} is truncated: needed {expected} bytes, found {found}")]
    Truncated {
        /// Which section was short.
        context: &'static str,
        /// Bytes the layout requires.
        expected: usize,
        /// Bytes actually available.
        found: usize,
    },
    /// A stream failed to inflate.
    #[error("failed to inflate stream {stream}: {source}")]
    Compression {
        /// Index of the stream, 0 through 3.
        stream: usize,
        /// The underlying inflate error.
        #[source]
        source: io::Error,
    },
    /// The animation count doesn't leave room for any static tiles.
    #[error("animation count {count} exceeds the tile space of {max}")]
    TooManyAnimations {
        /// Stored animation count.
        count: u16,
        /// Tile space of the version.
        max: u16,
    },
    /// The word map referenced a word the dictionary doesn't have.
    #[error("word map references word {word}, but the dictionary has {len} words")]
    WordOutOfRange {
        /// Referenced word index.
        word: u16,
        /// Number of words in the dictionary.
        len: usize,
    },
    /// A layer claims a grid its streams can't back.
    #[error("layer {layer} claims {width}x{height} cells, more than its data can back")]
    LayerTooLarge {
        /// The offending layer.
        layer: usize,
        /// Stored width.
        width: u32,
        /// Stored height.
        height: u32,
    },
    /// The word map ran out before every flagged layer was filled.
    #[error("word map ended while filling layer {layer}")]
    WordMapTooShort {
        /// The layer being filled.
        layer: usize,
    },
}

impl ReadError {
    /// Whether this error means the file is damaged, as opposed to not being a level at all.
    #[must_use]
    pub fn is_corrupt(&self) -> bool {
        matches!(
            self,
            ReadError::ChecksumMismatch { .. }
                | ReadError::Compression { .. }
                | ReadError::Truncated { .. }
                | ReadError::WordOutOfRange { .. }
                | ReadError::WordMapTooShort { .. }
                | ReadError::LayerTooLarge { .. }
                | ReadError::TooManyAnimations { .. }
        )
    }

    /// Whether this error means the data is not a level file this library understands.
    #[must_use]
    pub fn is_wrong_type(&self) -> bool {
        matches!(
            self,
            ReadError::InvalidMagic | ReadError::UnsupportedVersion(_)
        )
    }
}

/// A reason why exporting a level failed.
#[derive(Debug, Error)]
pub enum WriteError {
    /// IO error.
    #[error("{0}")]
    IoError(#[from] io::Error),
    /// Export was requested for a version that isn't one of the two recognized ones.
    #[error("cannot export to unknown version 0x{0:03X}")]
    UnsupportedVersion(u16),
    /// The level has more animations than the target version has tile ids.
    #[error("{count} animations do not fit in the tile space of {max}")]
    TooManyAnimations {
        /// Number of animations in the level.
        count: usize,
        /// Tile space of the target version.
        max: u16,
    },
    /// The level has more distinct 4-tile strips than 16-bit word indices can address.
    #[error("{0} dictionary words do not fit in 16-bit word indices")]
    TooManyWords(usize),
    /// A stream failed to deflate.
    #[error("failed to deflate stream {stream}: {source}")]
    Compression {
        /// Index of the stream, 0 through 3.
        stream: usize,
        /// The underlying deflate error.
        #[source]
        source: io::Error,
    },
}
