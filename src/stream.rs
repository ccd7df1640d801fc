//! The four zlib streams that make up a file body.
//!
//! Streams are stored back to back in a fixed order. Each one's start is the
//! sum of the compressed sizes before it, so spans are located up front and
//! only the inflating and deflating runs as independent units.

use crate::error::{ReadError, WriteError};
use crate::header::{FileHeader, StreamSize, STREAM_COUNT};
use crate::read_helper;
use crate::write_helper;
use log::{trace, warn};
use rayon::prelude::*;

/// Index of the level info stream.
pub const LEVEL_INFO: usize = 0;
/// Index of the event grid stream.
pub const EVENTS: usize = 1;
/// Index of the dictionary stream.
pub const DICTIONARY: usize = 2;
/// Index of the word map stream.
pub const WORD_MAP: usize = 3;

/// Locates each compressed stream within a body.
///
/// # Errors
/// Errors if a span runs past the end of the body.
pub fn split<'a>(header: &FileHeader, body: &'a [u8]) -> Result<[&'a [u8]; STREAM_COUNT], ReadError> {
    let mut spans: [&[u8]; STREAM_COUNT] = [&[]; STREAM_COUNT];
    let mut offset = 0usize;
    for (stream, span) in spans.iter_mut().enumerate() {
        let len = header.stream_sizes[stream].compressed as usize;
        let end = offset.saturating_add(len);
        *span = body.get(offset..end).ok_or(ReadError::Truncated {
            context: "stream span",
            expected: end,
            found: body.len(),
        })?;
        offset = end;
    }
    if offset < body.len() {
        trace!("{} trailing bytes after the last stream", body.len() - offset);
    }
    Ok(spans)
}

/// Inflates the four streams of a body, in stream order.
///
/// If several streams fail, the one with the lowest index is reported.
///
/// # Errors
/// Errors if a span is out of bounds or fails to inflate.
pub fn inflate_all(
    header: &FileHeader,
    body: &[u8],
    parallel: bool,
) -> Result<[Vec<u8>; STREAM_COUNT], ReadError> {
    let spans = split(header, body)?;
    let inflate = |(stream, span): (usize, &&[u8])| -> Result<Vec<u8>, ReadError> {
        let data = read_helper::inflate(span)
            .map_err(|source| ReadError::Compression { stream, source })?;
        trace!("inflated stream {stream}: {} -> {} bytes", span.len(), data.len());
        Ok(data)
    };
    let results: Vec<Result<Vec<u8>, ReadError>> = if parallel {
        spans.par_iter().enumerate().map(inflate).collect()
    } else {
        spans.iter().enumerate().map(inflate).collect()
    };
    let mut streams: [Vec<u8>; STREAM_COUNT] = Default::default();
    for (stream, result) in results.into_iter().enumerate() {
        let data = result?;
        let recorded = header.stream_sizes[stream].uncompressed as usize;
        if data.len() != recorded {
            warn!(
                "stream {stream} inflated to {} bytes, but the header records {recorded}",
                data.len()
            );
        }
        streams[stream] = data;
    }
    Ok(streams)
}

/// Deflates four buffers into a body, returning it with each stream's sizes.
///
/// Streams are concatenated in index order regardless of which finishes first.
///
/// # Errors
/// Errors if a buffer fails to deflate.
pub fn deflate_all(
    buffers: [&[u8]; STREAM_COUNT],
    parallel: bool,
) -> Result<(Vec<u8>, [StreamSize; STREAM_COUNT]), WriteError> {
    let deflate = |(stream, data): (usize, &&[u8])| -> Result<Vec<u8>, WriteError> {
        let compressed = write_helper::deflate(data)
            .map_err(|source| WriteError::Compression { stream, source })?;
        trace!("deflated stream {stream}: {} -> {} bytes", data.len(), compressed.len());
        Ok(compressed)
    };
    let results: Vec<Result<Vec<u8>, WriteError>> = if parallel {
        buffers.par_iter().enumerate().map(deflate).collect()
    } else {
        buffers.iter().enumerate().map(deflate).collect()
    };
    let mut body = Vec::new();
    let mut sizes = [StreamSize::default(); STREAM_COUNT];
    for (stream, result) in results.into_iter().enumerate() {
        let compressed = result?;
        sizes[stream] = StreamSize {
            compressed: compressed.len() as u32,
            uncompressed: buffers[stream].len() as u32,
        };
        body.extend_from_slice(&compressed);
    }
    Ok((body, sizes))
}
