#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use bsifix_core::error::{FixError, Result};
use bsifix_core::meta::tags::TagMap;
use bsifix_core::tools::{MetadataProbe, Transcoder};
use bsifix_core::Toolchain;

/// `fmt ` payload with WAVE_FORMAT_EXTENSIBLE and a PCM sub-format.
pub fn extensible_fmt(channels: u16, rate: u32, bits: u16) -> Vec<u8> {
    let align = channels * bits / 8;
    let mut p = Vec::with_capacity(40);
    p.extend_from_slice(&0xFFFEu16.to_le_bytes());
    p.extend_from_slice(&channels.to_le_bytes());
    p.extend_from_slice(&rate.to_le_bytes());
    p.extend_from_slice(&(rate * align as u32).to_le_bytes());
    p.extend_from_slice(&align.to_le_bytes());
    p.extend_from_slice(&bits.to_le_bytes());
    p.extend_from_slice(&22u16.to_le_bytes());
    p.extend_from_slice(&bits.to_le_bytes());
    p.extend_from_slice(&3u32.to_le_bytes());
    // KSDATAFORMAT_SUBTYPE_PCM
    p.extend_from_slice(&[
        0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00, 0x80, 0x00, 0x00, 0xAA, 0x00, 0x38, 0x9B,
        0x71,
    ]);
    p
}

pub fn fmt_with_tag(tag: u16, channels: u16, rate: u32, bits: u16) -> Vec<u8> {
    let align = channels * bits / 8;
    let mut p = Vec::with_capacity(16);
    p.extend_from_slice(&tag.to_le_bytes());
    p.extend_from_slice(&channels.to_le_bytes());
    p.extend_from_slice(&rate.to_le_bytes());
    p.extend_from_slice(&(rate * align as u32).to_le_bytes());
    p.extend_from_slice(&align.to_le_bytes());
    p.extend_from_slice(&bits.to_le_bytes());
    p
}

pub fn pcm_fmt(channels: u16, rate: u32, bits: u16) -> Vec<u8> {
    fmt_with_tag(1, channels, rate, bits)
}

/// Deterministic, non-repeating-looking audio bytes.
pub fn audio(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i.wrapping_mul(31) ^ (i >> 7)) as u8).collect()
}

/// `LIST`/`INFO` payload with one `INAM` entry.
pub fn info_list(name: &str) -> Vec<u8> {
    let mut p = b"INFO".to_vec();
    let mut v = name.as_bytes().to_vec();
    v.push(0);
    p.extend_from_slice(b"INAM");
    p.extend_from_slice(&(v.len() as u32).to_le_bytes());
    p.extend_from_slice(&v);
    if v.len() % 2 == 1 {
        p.push(0);
    }
    p
}

/// A complete RIFF/WAVE image with the chunks in the given order.
pub fn wav(chunks: &[(&[u8; 4], &[u8])]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&[0; 4]);
    out.extend_from_slice(b"WAVE");
    for (id, payload) in chunks {
        out.extend_from_slice(*id);
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(payload);
        if payload.len() % 2 == 1 {
            out.push(0);
        }
    }
    let size = (out.len() - 8) as u32;
    out[4..8].copy_from_slice(&size.to_le_bytes());
    out
}

pub fn write_wav(path: &Path, chunks: &[(&[u8; 4], &[u8])]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, wav(chunks)).unwrap();
}

/// A small stereo 24-bit source as a transcoder would emit it.
pub fn write_track(path: &Path, data_len: usize) {
    write_wav(
        path,
        &[
            (b"fmt ", &extensible_fmt(2, 48_000, 24)),
            (b"LIST", &info_list("old")),
            (b"data", &audio(data_len)),
        ],
    );
}

/// Every regular file under `root`, sorted.
pub fn files_under(root: &Path) -> Vec<PathBuf> {
    let mut v: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect();
    v.sort();
    v
}

/// Probe returning fixed tags, or failing when `tags` is `None`.
pub struct FakeProbe {
    pub tags: Option<TagMap>,
}

impl MetadataProbe for FakeProbe {
    fn probe(&self, _src: &Path) -> Result<TagMap> {
        self.tags.clone().ok_or_else(|| FixError::ExternalTool {
            tool: "fake-probe".into(),
            detail: "exit status: 1".into(),
        })
    }
}

/// "Transcodes" by copying the source, which is already a WAVE file.
/// Sources whose name contains `broken` fail after leaving a partial output.
#[derive(Default)]
pub struct CopyTranscoder {
    pub calls: Mutex<Vec<(PathBuf, Vec<(String, String)>)>>,
}

impl Transcoder for CopyTranscoder {
    fn transcode(&self, src: &Path, dst: &Path, tags: &[(&'static str, String)]) -> Result<()> {
        self.calls.lock().unwrap().push((
            src.to_path_buf(),
            tags.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
        ));
        if src.to_string_lossy().contains("broken") {
            fs::write(dst, b"RIFF partial")?;
            return Err(FixError::ExternalTool {
                tool: "fake-ffmpeg".into(),
                detail: "exit status: 1 Invalid data found when processing input".into(),
            });
        }
        fs::copy(src, dst)?;
        Ok(())
    }
}

/// Transcoder whose program is not installed.
pub struct MissingTranscoder;

impl Transcoder for MissingTranscoder {
    fn transcode(&self, _: &Path, _: &Path, _: &[(&'static str, String)]) -> Result<()> {
        unreachable!("never runs when unavailable")
    }

    fn ensure_available(&self) -> Result<()> {
        Err(FixError::ToolNotFound("ffmpeg".into()))
    }
}

pub fn toolchain(tags: Option<TagMap>) -> (Toolchain, Arc<CopyTranscoder>) {
    let t = Arc::new(CopyTranscoder::default());
    let tools = Toolchain::new(Arc::new(FakeProbe { tags }), t.clone());
    (tools, t)
}
