use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Serialize;

use crate::container::chunk::{CHUNK_HEADER_LEN, ChunkId};
use crate::container::format::{FormatDescriptor, extension_size};
use crate::container::riff::{HEADER_LEN, RiffHeader};
use crate::container::scanner::ChunkScanner;
use crate::error::Result;
use crate::meta::bext::BextView;
use crate::meta::cart::CartView;

#[derive(Clone, Debug, Serialize)]
pub struct ChunkSummary {
    pub id: ChunkId,
    pub size: u32,
    /// Absolute offset of the payload.
    pub offset: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct FormatSummary {
    #[serde(flatten)]
    pub descriptor: FormatDescriptor,
    pub expected_block_align: u32,
    pub extension_size: Option<u16>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InfoEntry {
    pub id: ChunkId,
    pub value: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ContainerReport {
    pub file_len: u64,
    pub riff_size: u32,
    pub form_type: ChunkId,
    pub chunks: Vec<ChunkSummary>,
    pub format: Option<FormatSummary>,
    pub bext: Option<BextView>,
    pub cart: Option<CartView>,
    pub info: Vec<InfoEntry>,
}

impl ContainerReport {
    /// The outer size field agrees with the file length.
    pub fn size_consistent(&self) -> bool {
        self.riff_size as u64 + 8 == self.file_len
    }
}

/// Walk a container and decode the chunks this tool reads or writes.
pub fn inspect(path: &Path) -> Result<ContainerReport> {
    let f = File::open(path)?;
    let file_len = f.metadata()?.len();
    let mut r = BufReader::new(f);
    let header = RiffHeader::read_from(&mut r)?;

    let mut report = ContainerReport {
        file_len,
        riff_size: header.size,
        form_type: header.form_type,
        chunks: Vec::new(),
        format: None,
        bext: None,
        cart: None,
        info: Vec::new(),
    };

    let mut pos = HEADER_LEN;
    for c in ChunkScanner::new(&mut r) {
        let c = c?;
        report.chunks.push(ChunkSummary {
            id: c.id,
            size: c.size,
            offset: pos + CHUNK_HEADER_LEN,
        });
        pos += c.stored_len();

        let Some(payload) = c.payload() else { continue };
        match c.id {
            ChunkId::FMT if report.format.is_none() => {
                report.format = FormatDescriptor::parse(payload).map(|d| FormatSummary {
                    expected_block_align: d.expected_block_align(),
                    extension_size: extension_size(payload),
                    descriptor: d,
                });
            }
            ChunkId::BEXT => report.bext = BextView::decode(payload),
            ChunkId::CART => report.cart = CartView::decode(payload),
            ChunkId::LIST => report.info.extend(parse_info_list(payload)),
            _ => {}
        }
    }
    Ok(report)
}

/// Entries of a `LIST`/`INFO` payload; other list types yield nothing.
pub fn parse_info_list(payload: &[u8]) -> Vec<InfoEntry> {
    let mut out = Vec::new();
    if payload.len() < 4 || payload[0..4] != *ChunkId::INFO.as_bytes() {
        return out;
    }
    let mut rest = &payload[4..];
    while rest.len() >= 8 {
        let id = ChunkId([rest[0], rest[1], rest[2], rest[3]]);
        let size = u32::from_le_bytes([rest[4], rest[5], rest[6], rest[7]]) as usize;
        rest = &rest[8..];
        let take = size.min(rest.len());
        let value = String::from_utf8_lossy(&rest[..take])
            .trim_end_matches('\0')
            .to_string();
        out.push(InfoEntry { id, value });
        let skip = (size + (size & 1)).min(rest.len());
        rest = &rest[skip..];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_entries_with_odd_sizes() {
        let mut p = b"INFO".to_vec();
        p.extend_from_slice(b"INAM");
        p.extend_from_slice(&5u32.to_le_bytes());
        p.extend_from_slice(b"Song\0\0");
        p.extend_from_slice(b"IART");
        p.extend_from_slice(&6u32.to_le_bytes());
        p.extend_from_slice("Björk".as_bytes());

        let e = parse_info_list(&p);
        assert_eq!(e.len(), 2);
        assert_eq!(e[0].id, ChunkId(*b"INAM"));
        assert_eq!(e[0].value, "Song");
        assert_eq!(e[1].value, "Björk");
    }

    #[test]
    fn non_info_lists_are_ignored() {
        assert!(parse_info_list(b"adtlxxxx").is_empty());
        assert!(parse_info_list(b"IN").is_empty());
    }
}
