use std::borrow::Cow;

use tracing::{debug, warn};

use super::chunk::{Chunk, ChunkBody, ChunkId};
use super::format::{FormatDescriptor, normalize_fmt};
use crate::error::{FixError, Result};

/// Scanned chunks split into the two required chunks and everything else.
#[derive(Debug, Clone)]
pub struct ChunkLayout {
    pub fmt: Chunk,
    pub data: Chunk,
    /// Remaining chunks in source order.
    pub others: Vec<Chunk>,
}

impl ChunkLayout {
    pub fn from_chunks<I>(chunks: I) -> Result<Self>
    where
        I: IntoIterator<Item = Result<Chunk>>,
    {
        let mut fmt = None;
        let mut data = None;
        let mut others = Vec::new();
        for c in chunks {
            let c = c?;
            let slot = match c.id {
                ChunkId::FMT => &mut fmt,
                ChunkId::DATA => &mut data,
                _ => {
                    others.push(c);
                    continue;
                }
            };
            if slot.is_some() {
                warn!(chunk = %c.id, size = c.size, "duplicate chunk dropped");
            } else {
                *slot = Some(c);
            }
        }
        let fmt = fmt.ok_or(FixError::MissingRequiredChunk(ChunkId::FMT))?;
        let data = data.ok_or(FixError::MissingRequiredChunk(ChunkId::DATA))?;
        if !matches!(fmt.body, ChunkBody::Inline(_)) {
            return Err(FixError::Format(format!(
                "fmt chunk of {} bytes is implausibly large",
                fmt.size
            )));
        }
        Ok(Self { fmt, data, others })
    }

    /// Rewrite an extensible `fmt ` in place; returns true when it changed.
    pub fn normalize_format(&mut self) -> Result<bool> {
        let ChunkBody::Inline(payload) = &self.fmt.body else {
            return Ok(false);
        };
        let Cow::Owned(pcm) = normalize_fmt(payload) else {
            return Ok(false);
        };
        debug!(from = payload.len(), to = pcm.len(), "fmt downgraded to PCM");
        self.fmt = Chunk::inline(ChunkId::FMT, pcm)?;
        Ok(true)
    }

    pub fn descriptor(&self) -> Result<FormatDescriptor> {
        self.fmt
            .payload()
            .and_then(FormatDescriptor::parse)
            .ok_or_else(|| FixError::Format(format!("fmt chunk too short ({} bytes)", self.fmt.size)))
    }

    /// Accept linear PCM only.
    pub fn require_pcm(&self) -> Result<FormatDescriptor> {
        let d = self.descriptor()?;
        if !d.is_pcm() {
            return Err(FixError::UnsupportedFormat(d.format_tag));
        }
        Ok(d)
    }
}
