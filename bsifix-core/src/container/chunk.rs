use std::fmt;
use std::io::Write;

use serde::{Serialize, Serializer};

use crate::error::{FixError, Result};

pub const CHUNK_HEADER_LEN: u64 = 8;

/// Four-character chunk tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkId(pub [u8; 4]);

impl ChunkId {
    pub const RIFF: ChunkId = ChunkId(*b"RIFF");
    pub const WAVE: ChunkId = ChunkId(*b"WAVE");
    pub const FMT: ChunkId = ChunkId(*b"fmt ");
    pub const DATA: ChunkId = ChunkId(*b"data");
    pub const BEXT: ChunkId = ChunkId(*b"bext");
    pub const CART: ChunkId = ChunkId(*b"cart");
    pub const LIST: ChunkId = ChunkId(*b"LIST");
    pub const INFO: ChunkId = ChunkId(*b"INFO");

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            let c = if (0x20..=0x7e).contains(&b) { b as char } else { '.' };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkId({self})")
    }
}

impl Serialize for ChunkId {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

/// Where a chunk's payload lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChunkBody {
    /// Small chunk, read into memory.
    Inline(Vec<u8>),
    /// Large or `data` chunk: absolute offset of the payload in the source stream.
    Deferred { offset: u64 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    pub id: ChunkId,
    /// Payload length; never includes the pad byte.
    pub size: u32,
    pub body: ChunkBody,
}

impl Chunk {
    pub fn inline(id: ChunkId, payload: Vec<u8>) -> Result<Self> {
        let size = u32::try_from(payload.len())
            .map_err(|_| FixError::Format(format!("chunk '{id}' payload exceeds 4 GiB")))?;
        Ok(Self {
            id,
            size,
            body: ChunkBody::Inline(payload),
        })
    }

    pub fn payload(&self) -> Option<&[u8]> {
        match &self.body {
            ChunkBody::Inline(b) => Some(b),
            ChunkBody::Deferred { .. } => None,
        }
    }

    /// Bytes this chunk occupies on disk: header, payload and pad.
    pub fn stored_len(&self) -> u64 {
        CHUNK_HEADER_LEN + padded_len(self.size)
    }
}

#[inline]
pub fn padded_len(size: u32) -> u64 {
    size as u64 + (size as u64 & 1)
}

pub fn write_header(mut w: impl Write, id: ChunkId, size: u32) -> std::io::Result<()> {
    w.write_all(id.as_bytes())?;
    w.write_all(&size.to_le_bytes())
}

pub fn write_pad(mut w: impl Write, size: u32) -> std::io::Result<()> {
    if size % 2 == 1 {
        w.write_all(&[0u8])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_masks_unprintable_bytes() {
        assert_eq!(ChunkId::FMT.to_string(), "fmt ");
        assert_eq!(ChunkId([b'a', 0, 0xff, b'z']).to_string(), "a..z");
    }

    #[test]
    fn odd_sizes_get_one_pad_byte() {
        let mut out = Vec::new();
        write_header(&mut out, ChunkId::BEXT, 3).unwrap();
        out.extend_from_slice(b"abc");
        write_pad(&mut out, 3).unwrap();
        assert_eq!(out, b"bext\x03\x00\x00\x00abc\x00");
        assert_eq!(padded_len(3), 4);
        assert_eq!(padded_len(4), 4);

        let c = Chunk::inline(ChunkId::LIST, vec![0; 5]).unwrap();
        assert_eq!(c.stored_len(), 14);
    }
}
