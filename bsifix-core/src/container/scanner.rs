use std::io::{ErrorKind, Read, Seek, SeekFrom};

use tracing::debug;

use super::chunk::{Chunk, ChunkBody, ChunkId};
use crate::error::Result;

/// Payloads above this size are never read into memory.
pub const LARGE_CHUNK_THRESHOLD: u32 = 1024 * 1024;

/// Lazy walk over the chunk records of a RIFF stream.
///
/// The reader must already be positioned just past the 12-byte outer header.
/// `data` chunks and anything larger than the threshold come back as
/// [`ChunkBody::Deferred`] and are skipped with a seek, everything else is
/// read inline. The walk ends quietly at end of stream or when fewer than 8
/// header bytes remain.
pub struct ChunkScanner<R> {
    r: R,
    threshold: u32,
    done: bool,
}

impl<R: Read + Seek> ChunkScanner<R> {
    pub fn new(r: R) -> Self {
        Self::with_threshold(r, LARGE_CHUNK_THRESHOLD)
    }

    pub fn with_threshold(r: R, threshold: u32) -> Self {
        Self {
            r,
            threshold,
            done: false,
        }
    }

    pub fn into_inner(self) -> R {
        self.r
    }

    fn read_header(&mut self) -> Result<Option<(ChunkId, u32)>> {
        let mut h = [0u8; 8];
        let mut got = 0;
        while got < h.len() {
            match self.r.read(&mut h[got..]) {
                Ok(0) => break,
                Ok(n) => got += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        if got < h.len() {
            if got > 0 {
                debug!(trailing = got, "short chunk header; ending scan");
            }
            return Ok(None);
        }
        let id = ChunkId([h[0], h[1], h[2], h[3]]);
        let size = u32::from_le_bytes([h[4], h[5], h[6], h[7]]);
        Ok(Some((id, size)))
    }

    fn next_chunk(&mut self) -> Result<Option<Chunk>> {
        let Some((id, size)) = self.read_header()? else {
            return Ok(None);
        };
        let pad = (size & 1) as i64;

        let body = if id == ChunkId::DATA || size > self.threshold {
            let offset = self.r.stream_position()?;
            self.r.seek(SeekFrom::Current(size as i64 + pad))?;
            ChunkBody::Deferred { offset }
        } else {
            let mut payload = vec![0u8; size as usize];
            self.r.read_exact(&mut payload)?;
            if pad == 1 {
                self.r.seek(SeekFrom::Current(1))?;
            }
            ChunkBody::Inline(payload)
        };
        debug!(chunk = %id, size, deferred = matches!(body, ChunkBody::Deferred { .. }), "scanned chunk");
        Ok(Some(Chunk { id, size, body }))
    }
}

impl<R: Read + Seek> Iterator for ChunkScanner<R> {
    type Item = Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_chunk() {
            Ok(Some(c)) => Some(Ok(c)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
