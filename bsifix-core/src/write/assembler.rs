use std::io::{Read, Seek, SeekFrom, Write};

use serde::Serialize;
use tracing::debug;

use crate::container::chunk::{Chunk, ChunkBody, ChunkId, write_header, write_pad};
use crate::container::layout::ChunkLayout;
use crate::container::riff::{RiffHeader, patch_size};
use crate::error::Result;
use crate::util::copy::{COPY_BUF_SIZE, HashingWriter, copy_exact};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AssemblyReport {
    /// Bytes written, outer header included.
    pub total_len: u64,
    /// Value patched into the outer size field (`total_len - 8`).
    pub riff_size: u32,
    pub data_len: u32,
    /// blake3 of the audio payload as it was streamed.
    #[serde(serialize_with = "hex_digest")]
    pub data_digest: [u8; 32],
    /// Chunk ids in output order.
    pub order: Vec<ChunkId>,
}

fn hex_digest<S: serde::Serializer>(d: &[u8; 32], s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&hex::encode(d))
}

/// Write a fresh container: `fmt `, `data`, the injected chunks in order,
/// then every remaining source chunk in source order.
///
/// Source chunks sharing an id with an injected chunk are dropped. Deferred
/// payloads are streamed from `src` through a fixed buffer. The outer size
/// field is patched last.
pub fn assemble<R, W>(
    src: &mut R,
    form_type: ChunkId,
    layout: &ChunkLayout,
    injected: &[Chunk],
    out: &mut W,
) -> Result<AssemblyReport>
where
    R: Read + Seek,
    W: Write + Seek,
{
    let mut buf = vec![0u8; COPY_BUF_SIZE];
    let mut order = Vec::with_capacity(2 + injected.len() + layout.others.len());

    out.seek(SeekFrom::Start(0))?;
    RiffHeader::placeholder(form_type).write_to(&mut *out)?;

    write_chunk(src, out, &layout.fmt, &mut buf)?;
    order.push(layout.fmt.id);

    // audio goes right after fmt for players that expect it early
    let data = &layout.data;
    write_header(&mut *out, data.id, data.size)?;
    let mut hasher = blake3::Hasher::new();
    {
        let mut hw = HashingWriter::new(&mut *out, &mut hasher);
        write_body(src, &mut hw, data, &mut buf)?;
    }
    write_pad(&mut *out, data.size)?;
    order.push(data.id);
    debug!(size = data.size, "data chunk streamed");

    for c in injected {
        write_chunk(src, out, c, &mut buf)?;
        order.push(c.id);
    }

    for c in &layout.others {
        if injected.iter().any(|i| i.id == c.id) {
            debug!(chunk = %c.id, size = c.size, "dropping source chunk replaced by injection");
            continue;
        }
        write_chunk(src, out, c, &mut buf)?;
        order.push(c.id);
    }

    let total_len = out.stream_position()?;
    let riff_size = patch_size(out, total_len)?;
    out.flush()?;

    Ok(AssemblyReport {
        total_len,
        riff_size,
        data_len: data.size,
        data_digest: *hasher.finalize().as_bytes(),
        order,
    })
}

fn write_chunk<R, W>(src: &mut R, out: &mut W, c: &Chunk, buf: &mut [u8]) -> Result<()>
where
    R: Read + Seek,
    W: Write,
{
    write_header(&mut *out, c.id, c.size)?;
    write_body(src, out, c, buf)?;
    write_pad(&mut *out, c.size)?;
    Ok(())
}

fn write_body<R, W>(src: &mut R, out: &mut W, c: &Chunk, buf: &mut [u8]) -> Result<()>
where
    R: Read + Seek,
    W: Write,
{
    match &c.body {
        ChunkBody::Inline(payload) => out.write_all(payload)?,
        ChunkBody::Deferred { offset } => {
            src.seek(SeekFrom::Start(*offset))?;
            copy_exact(src, out, c.size as u64, buf)?;
        }
    }
    Ok(())
}
