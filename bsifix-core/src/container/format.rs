use std::borrow::Cow;

use serde::Serialize;

pub const WAVE_FORMAT_PCM: u16 = 0x0001;
pub const WAVE_FORMAT_EXTENSIBLE: u16 = 0xFFFE;
/// Length of the canonical PCM `fmt ` payload.
pub const PCM_FMT_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormatDescriptor {
    pub format_tag: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub avg_bytes_per_sec: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
}

impl FormatDescriptor {
    /// Decode the leading 16 bytes of a `fmt ` payload.
    pub fn parse(payload: &[u8]) -> Option<Self> {
        if payload.len() < PCM_FMT_LEN {
            return None;
        }
        let le16 = |o: usize| u16::from_le_bytes([payload[o], payload[o + 1]]);
        let le32 = |o: usize| {
            u32::from_le_bytes([payload[o], payload[o + 1], payload[o + 2], payload[o + 3]])
        };
        Some(Self {
            format_tag: le16(0),
            channels: le16(2),
            sample_rate: le32(4),
            avg_bytes_per_sec: le32(8),
            block_align: le16(12),
            bits_per_sample: le16(14),
        })
    }

    pub fn to_bytes(&self) -> [u8; PCM_FMT_LEN] {
        let mut out = [0u8; PCM_FMT_LEN];
        out[0..2].copy_from_slice(&self.format_tag.to_le_bytes());
        out[2..4].copy_from_slice(&self.channels.to_le_bytes());
        out[4..8].copy_from_slice(&self.sample_rate.to_le_bytes());
        out[8..12].copy_from_slice(&self.avg_bytes_per_sec.to_le_bytes());
        out[12..14].copy_from_slice(&self.block_align.to_le_bytes());
        out[14..16].copy_from_slice(&self.bits_per_sample.to_le_bytes());
        out
    }

    pub fn is_pcm(&self) -> bool {
        self.format_tag == WAVE_FORMAT_PCM
    }

    pub fn is_extensible(&self) -> bool {
        self.format_tag == WAVE_FORMAT_EXTENSIBLE
    }

    /// Block alignment implied by channels and bit depth.
    pub fn expected_block_align(&self) -> u32 {
        self.channels as u32 * (self.bits_per_sample as u32).div_ceil(8)
    }
}

/// `cbSize` of an extended `fmt ` payload, when one is present.
pub fn extension_size(payload: &[u8]) -> Option<u16> {
    payload
        .get(PCM_FMT_LEN..PCM_FMT_LEN + 2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
}

/// Downgrade a WAVE_FORMAT_EXTENSIBLE descriptor to plain 16-byte PCM.
///
/// Channels, rate, byte rate, alignment and bit depth are carried over
/// unchanged and the extension (valid bits, channel mask, sub-format GUID) is
/// dropped. Any other payload, including one shorter than 16 bytes, is
/// returned as is.
pub fn normalize_fmt(payload: &[u8]) -> Cow<'_, [u8]> {
    match FormatDescriptor::parse(payload) {
        Some(d) if d.is_extensible() => {
            let pcm = FormatDescriptor {
                format_tag: WAVE_FORMAT_PCM,
                ..d
            };
            Cow::Owned(pcm.to_bytes().to_vec())
        }
        _ => Cow::Borrowed(payload),
    }
}
