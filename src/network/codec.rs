//! Length-prefixed framing for the peer stream
//!
//! A frame is a 4-byte big-endian length followed by that many bytes of
//! message envelope. TCP gives no message boundaries of its own, so every
//! message travels inside exactly one frame.

use crate::error::{LedgerError, Result};
use log::warn;
use std::io::{self, ErrorKind, Read, Write};

/// Default ceiling for a single frame body
pub const MAX_FRAME_SIZE: usize = 8 * 1024 * 1024;

const LEN_PREFIX: usize = 4;

/// Outcome of reading one frame off a stream
#[derive(Debug, PartialEq, Eq)]
pub enum Frame {
    /// A complete frame body
    Data(Vec<u8>),
    /// A frame over the size limit; its body was consumed and thrown away
    Oversized(usize),
    /// The peer closed the stream cleanly between frames
    Eof,
}

pub fn write_frame<W: Write>(writer: &mut W, body: &[u8]) -> Result<()> {
    let len = u32::try_from(body.len()).map_err(|_| {
        LedgerError::Serialization(format!("frame of {} bytes is too large", body.len()))
    })?;
    writer.write_all(&len.to_be_bytes())?;
    writer.write_all(body)?;
    writer.flush()?;
    Ok(())
}

/// Read the next frame. I/O errors (including EOF inside a frame) are
/// returned as errors; the stream is unusable after one.
pub fn read_frame<R: Read>(reader: &mut R, max_frame_size: usize) -> Result<Frame> {
    let mut len_buf = [0u8; LEN_PREFIX];
    if !read_prefix(reader, &mut len_buf)? {
        return Ok(Frame::Eof);
    }

    let expected_len = u32::from_be_bytes(len_buf) as usize;
    if expected_len > max_frame_size {
        warn!("Dropping frame of {expected_len} bytes (limit {max_frame_size})");
        let drained = io::copy(&mut reader.take(expected_len as u64), &mut io::sink())?;
        if drained < expected_len as u64 {
            return Err(LedgerError::Io("stream closed inside a frame".to_string()));
        }
        return Ok(Frame::Oversized(expected_len));
    }

    let mut body = vec![0u8; expected_len];
    reader.read_exact(&mut body)?;
    Ok(Frame::Data(body))
}

// Fills the prefix; false on a clean EOF before the first byte
fn read_prefix<R: Read>(reader: &mut R, buf: &mut [u8; LEN_PREFIX]) -> Result<bool> {
    let mut filled = 0;
    while filled < LEN_PREFIX {
        match reader.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(false),
            Ok(0) => {
                return Err(LedgerError::Io(
                    "stream closed inside a length prefix".to_string(),
                ))
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(true)
}
