//! Whole-file integrity: the CRC-32 of the body and the total file size.

use crate::error::ReadError;
use crate::header::{FileHeader, HEADER_LEN};
use crc32fast::Hasher;

/// Computes the CRC-32 of a file body.
#[must_use]
pub fn body_checksum(body: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(body);
    hasher.finalize()
}

/// Checks the header's checksum against the bytes following the header.
///
/// # Errors
/// Errors with [`ReadError::ChecksumMismatch`] if they differ.
pub fn verify(header: &FileHeader, body: &[u8]) -> Result<(), ReadError> {
    let actual = body_checksum(body);
    if actual != header.checksum {
        return Err(ReadError::ChecksumMismatch {
            expected: header.checksum,
            actual,
        });
    }
    Ok(())
}

/// Fills in the checksum and file size of a header for a finished body.
///
/// These are the last header fields set before the file is assembled.
pub fn seal(header: &mut FileHeader, body: &[u8]) {
    header.checksum = body_checksum(body);
    header.file_size = (HEADER_LEN + body.len()) as u32;
}
