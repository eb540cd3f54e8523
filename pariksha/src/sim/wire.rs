//! Length-prefixed protobuf framing.
//!
//! ```text
//! ┌──────────────────┬──────────────────────────┐
//! │ Length (4 bytes) │ Protobuf message         │
//! │ Big-endian u32   │ (variable size)          │
//! └──────────────────┴──────────────────────────┘
//! ```
//!
//! Frames larger than [`MAX_FRAME_SIZE`] are rejected on both write and read.

use prost::Message;
use std::io::{Read, Write};

use crate::error::{BenchError, Result};

/// Maximum accepted payload size (1MB)
pub const MAX_FRAME_SIZE: usize = 1024 * 1024;

/// Encode and write one frame.
pub fn write_frame<M: Message, W: Write>(writer: &mut W, msg: &M) -> Result<()> {
    let encoded = msg.encode_to_vec();
    if encoded.len() > MAX_FRAME_SIZE {
        return Err(BenchError::Protocol(format!(
            "frame of {} bytes exceeds limit of {}",
            encoded.len(),
            MAX_FRAME_SIZE
        )));
    }
    let len = encoded.len() as u32;

    writer.write_all(&len.to_be_bytes())?;
    writer.write_all(&encoded)?;
    writer.flush()?;
    Ok(())
}

/// Read and decode one frame.
pub fn read_frame<M: Message + Default, R: Read>(reader: &mut R) -> Result<M> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf)?;
    let len = u32::from_be_bytes(len_buf) as usize;

    if len > MAX_FRAME_SIZE {
        return Err(BenchError::Protocol(format!(
            "frame of {} bytes exceeds limit of {}",
            len, MAX_FRAME_SIZE
        )));
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload)?;
    Ok(M::decode(payload.as_slice())?)
}
