use std::io::{Read, Seek, SeekFrom, Write};

use super::chunk::ChunkId;
use crate::error::{FixError, Result};

pub const HEADER_LEN: u64 = 12;

/// Outer `RIFF<size><form-type>` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiffHeader {
    /// Length of everything after the size field itself.
    pub size: u32,
    pub form_type: ChunkId,
}

impl RiffHeader {
    pub fn placeholder(form_type: ChunkId) -> Self {
        Self { size: 0, form_type }
    }

    pub fn write_to(&self, mut w: impl Write) -> std::io::Result<()> {
        w.write_all(ChunkId::RIFF.as_bytes())?;
        w.write_all(&self.size.to_le_bytes())?;
        w.write_all(self.form_type.as_bytes())?;
        Ok(())
    }

    pub fn read_from(mut r: impl Read) -> Result<Self> {
        let mut buf = [0u8; HEADER_LEN as usize];
        r.read_exact(&mut buf).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                FixError::Format("file too small for a RIFF header".into())
            } else {
                FixError::Io(e)
            }
        })?;
        if buf[0..4] != *ChunkId::RIFF.as_bytes() {
            return Err(FixError::Format("not a RIFF container".into()));
        }
        let size = u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
        let form_type = ChunkId([buf[8], buf[9], buf[10], buf[11]]);
        Ok(Self { size, form_type })
    }
}

/// Seek back and set the outer size field to `total_len - 8`.
pub fn patch_size<W: Write + Seek>(w: &mut W, total_len: u64) -> Result<u32> {
    let size = u32::try_from(total_len.saturating_sub(8)).map_err(|_| {
        FixError::Format(format!(
            "assembled container is {total_len} bytes; RIFF size field overflows"
        ))
    })?;
    w.seek(SeekFrom::Start(4))?;
    w.write_all(&size.to_le_bytes())?;
    w.seek(SeekFrom::Start(total_len))?;
    Ok(size)
}
