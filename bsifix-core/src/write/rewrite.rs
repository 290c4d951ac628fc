use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use tempfile::TempPath;
use tracing::{debug, info};

use crate::container::chunk::{Chunk, ChunkId};
use crate::container::layout::ChunkLayout;
use crate::container::riff::RiffHeader;
use crate::container::scanner::ChunkScanner;
use crate::error::{FixError, Result};
use crate::meta::bext::BroadcastMetadata;
use crate::meta::cart::CartMetadata;
use crate::meta::tags::TrackMetadata;
use crate::util::paths::with_suffix;
use crate::write::assembler::{AssemblyReport, assemble};

/// Freshly built `bext` and `cart` chunks for one track.
pub fn broadcast_chunks(meta: &TrackMetadata) -> Result<[Chunk; 2]> {
    let bext = BroadcastMetadata::new(&meta.title, &meta.artist)?;
    let cart = CartMetadata::new(&meta.title, &meta.artist, &meta.cut_id);
    Ok([
        Chunk::inline(ChunkId::BEXT, bext.to_bytes())?,
        Chunk::inline(ChunkId::CART, cart.to_bytes())?,
    ])
}

fn scan_layout(src: &mut BufReader<File>) -> Result<(RiffHeader, ChunkLayout)> {
    let header = RiffHeader::read_from(&mut *src)?;
    if header.form_type != ChunkId::WAVE {
        return Err(FixError::Format(format!(
            "RIFF form type '{}' is not WAVE",
            header.form_type
        )));
    }
    let layout = ChunkLayout::from_chunks(ChunkScanner::new(&mut *src))?;
    debug!(others = layout.others.len(), data = layout.data.size, "source scanned");
    Ok((header, layout))
}

fn write_out(
    src: &mut BufReader<File>,
    header: &RiffHeader,
    layout: &ChunkLayout,
    injected: &[Chunk],
    dst: &Path,
) -> Result<AssemblyReport> {
    let mut out = BufWriter::new(File::create(dst)?);
    let report = assemble(src, header.form_type, layout, injected, &mut out)?;
    let f = out.into_inner().map_err(|e| e.into_error())?;
    f.sync_all()?;
    Ok(report)
}

/// Rewrite the WAVE file at `src` into `dst`: PCM `fmt `, `data`, the given
/// injected chunks, then the remaining source chunks.
///
/// Only linear PCM (after downgrading WAVE_FORMAT_EXTENSIBLE) is accepted.
/// `dst` is written directly; callers publish it.
pub fn rewrite_container(src: &Path, dst: &Path, injected: &[Chunk]) -> Result<AssemblyReport> {
    let mut r = BufReader::new(File::open(src)?);
    let (header, mut layout) = scan_layout(&mut r)?;
    if layout.normalize_format()? {
        info!(src = %src.display(), "WAVE_FORMAT_EXTENSIBLE downgraded to PCM");
    }
    layout.require_pcm()?;
    write_out(&mut r, &header, &layout, injected, dst)
}

/// Put `fmt ` and `data` first without touching anything else; `dest` is
/// replaced atomically.
pub fn reorder(src: &Path, dest: &Path) -> Result<AssemblyReport> {
    let mut r = BufReader::new(File::open(src)?);
    let (header, layout) = scan_layout(&mut r)?;
    let tmp = TempPath::try_from_path(with_suffix(dest, ".tmp"))?;
    let report = write_out(&mut r, &header, &layout, &[], &tmp)?;
    tmp.persist(dest).map_err(|e| e.error)?;
    Ok(report)
}

