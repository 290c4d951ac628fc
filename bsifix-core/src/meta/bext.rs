//! Broadcast Wave `bext` chunk, version 0 layout.

use serde::Serialize;
use time::macros::format_description;

use super::{TOOL_NAME, TOOL_VERSION};
use crate::error::{FixError, Result};
use crate::util::text::{put_text, read_text};

/// Fixed part of the payload; coding history follows it.
pub const BEXT_FIXED_LEN: usize = 602;

const DESCRIPTION: (usize, usize) = (0, 256);
const ORIGINATOR: (usize, usize) = (256, 32);
const ORIGINATOR_REF: (usize, usize) = (288, 32);
const ORIGINATION_DATE: (usize, usize) = (320, 10);
const ORIGINATION_TIME: (usize, usize) = (330, 8);
const TIME_REFERENCE: usize = 338;
const VERSION: usize = 346;
// UMID 348..412, loudness + reserved 412..602: left zeroed

const REFERENCE_PREFIX: &str = "bsifix-";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BroadcastMetadata {
    pub description: String,
    pub originator: String,
    pub originator_reference: String,
    /// `YYYY-MM-DD`; current date when absent.
    pub origination_date: Option<String>,
    /// `HH:MM:SS`; current time when absent.
    pub origination_time: Option<String>,
    pub coding_history: String,
}

impl BroadcastMetadata {
    /// Record for `title`/`artist` with a fresh originator reference.
    pub fn new(title: &str, artist: &str) -> Result<Self> {
        Ok(Self {
            description: title.to_string(),
            originator: artist.to_string(),
            originator_reference: new_originator_reference()?,
            origination_date: None,
            origination_time: None,
            coding_history: format!("CodingHistory={TOOL_NAME}{TOOL_VERSION}\r\n"),
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let (date, time) = match (&self.origination_date, &self.origination_time) {
            (Some(d), Some(t)) => (d.clone(), t.clone()),
            (d, t) => {
                let now = super::now();
                let date = d.clone().unwrap_or_else(|| {
                    now.format(format_description!("[year]-[month]-[day]"))
                        .unwrap_or_default()
                });
                let time = t.clone().unwrap_or_else(|| {
                    now.format(format_description!("[hour]:[minute]:[second]"))
                        .unwrap_or_default()
                });
                (date, time)
            }
        };

        let mut buf = vec![0u8; BEXT_FIXED_LEN];
        put_text(field(&mut buf, DESCRIPTION), &self.description);
        put_text(field(&mut buf, ORIGINATOR), &self.originator);
        put_text(field(&mut buf, ORIGINATOR_REF), &self.originator_reference);
        put_text(field(&mut buf, ORIGINATION_DATE), &date);
        put_text(field(&mut buf, ORIGINATION_TIME), &time);
        buf[TIME_REFERENCE..TIME_REFERENCE + 8].copy_from_slice(&0u64.to_le_bytes());
        buf[VERSION..VERSION + 2].copy_from_slice(&0u16.to_le_bytes());

        let history: String = self
            .coding_history
            .chars()
            .map(|c| if c.is_ascii() { c } else { '?' })
            .collect();
        buf.extend_from_slice(history.as_bytes());
        buf
    }
}

fn field(buf: &mut [u8], (off, len): (usize, usize)) -> &mut [u8] {
    &mut buf[off..off + len]
}

/// `bsifix-` followed by 16 hex digits of OS randomness.
pub fn new_originator_reference() -> Result<String> {
    reference_from(getrandom::getrandom)
}

fn reference_from(
    fill: impl FnOnce(&mut [u8]) -> std::result::Result<(), getrandom::Error>,
) -> Result<String> {
    let mut raw = [0u8; 8];
    fill(&mut raw).map_err(|e| {
        FixError::Io(std::io::Error::other(format!(
            "no randomness for originator reference: {e}"
        )))
    })?;
    Ok(format!("{REFERENCE_PREFIX}{}", hex::encode(raw)))
}

/// Text fields of an existing `bext` payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BextView {
    pub description: String,
    pub originator: String,
    pub originator_reference: String,
    pub origination_date: String,
    pub origination_time: String,
    pub version: u16,
    pub coding_history: String,
}

impl BextView {
    pub fn decode(payload: &[u8]) -> Option<Self> {
        if payload.len() < BEXT_FIXED_LEN {
            return None;
        }
        let text = |(off, len): (usize, usize)| read_text(&payload[off..off + len]);
        let history = String::from_utf8_lossy(&payload[BEXT_FIXED_LEN..]);
        Some(Self {
            description: text(DESCRIPTION),
            originator: text(ORIGINATOR),
            originator_reference: text(ORIGINATOR_REF),
            origination_date: text(ORIGINATION_DATE),
            origination_time: text(ORIGINATION_TIME),
            version: u16::from_le_bytes([payload[VERSION], payload[VERSION + 1]]),
            coding_history: history.trim_end_matches(['\0', '\r', '\n']).to_string(),
        })
    }
}
