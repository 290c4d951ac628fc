//! `cart` chunk (AES46 / CartChunk 0101) for radio playout systems.

use serde::Serialize;

use super::{TOOL_NAME, TOOL_VERSION};
use crate::util::text::{put_text, read_text};

pub const CART_LEN: usize = 2048;
pub const CART_VERSION: &str = "0101";

const VERSION: (usize, usize) = (0, 4);
const TITLE: (usize, usize) = (4, 64);
const ARTIST: (usize, usize) = (68, 64);
const CUT_ID: (usize, usize) = (132, 64);
// client id, category, classification, out cue: 196..452
// start date/time, end date/time: 452..488
const PRODUCER_APP_ID: (usize, usize) = (488, 64);
const PRODUCER_APP_VERSION: (usize, usize) = (552, 64);
// user def 616..680
const LEVEL_REFERENCE: usize = 680;
// post timers 684..748, reserved 748..1024, url 1024..2048

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartMetadata {
    pub version: String,
    pub title: String,
    pub artist: String,
    pub cut_id: String,
    pub producer_app_id: String,
    pub producer_app_version: String,
}

impl CartMetadata {
    pub fn new(title: &str, artist: &str, cut_id: &str) -> Self {
        Self {
            version: CART_VERSION.to_string(),
            title: title.to_string(),
            artist: artist.to_string(),
            cut_id: cut_id.to_string(),
            producer_app_id: TOOL_NAME.to_string(),
            producer_app_version: TOOL_VERSION.to_string(),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; CART_LEN];
        let mut put = |(off, len): (usize, usize), s: &str| put_text(&mut buf[off..off + len], s);
        put(VERSION, &self.version);
        put(TITLE, &self.title);
        put(ARTIST, &self.artist);
        put(CUT_ID, &self.cut_id);
        put(PRODUCER_APP_ID, &self.producer_app_id);
        put(PRODUCER_APP_VERSION, &self.producer_app_version);
        buf[LEVEL_REFERENCE..LEVEL_REFERENCE + 4].copy_from_slice(&0u32.to_le_bytes());
        buf
    }
}

/// Identifying fields of an existing `cart` payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub version: String,
    pub title: String,
    pub artist: String,
    pub cut_id: String,
    pub producer_app_id: String,
    pub producer_app_version: String,
}

impl CartView {
    pub fn decode(payload: &[u8]) -> Option<Self> {
        if payload.len() < PRODUCER_APP_VERSION.0 + PRODUCER_APP_VERSION.1 {
            return None;
        }
        let text = |(off, len): (usize, usize)| read_text(&payload[off..off + len]);
        Some(Self {
            version: text(VERSION),
            title: text(TITLE),
            artist: text(ARTIST),
            cut_id: text(CUT_ID),
            producer_app_id: text(PRODUCER_APP_ID),
            producer_app_version: text(PRODUCER_APP_VERSION),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_layout() {
        let b = CartMetadata::new("Song", "Band", "cut-7").to_bytes();
        assert_eq!(b.len(), CART_LEN);
        assert_eq!(&b[0..4], b"0101");
        assert_eq!(&b[4..8], b"Song");
        assert_eq!(&b[68..72], b"Band");
        assert_eq!(&b[132..137], b"cut-7");
        assert!(b[196..488].iter().all(|&x| x == 0));
        assert_eq!(&b[488..494], b"BSIFix");
        assert_eq!(&b[552..552 + TOOL_VERSION.len()], TOOL_VERSION.as_bytes());
        assert!(b[616..].iter().all(|&x| x == 0));
    }

    #[test]
    fn title_is_ascii_and_exactly_field_width() {
        let title = format!("Für Élise {}", "y".repeat(100));
        let b = CartMetadata::new(&title, "a", "c").to_bytes();
        let t = &b[4..68];
        assert!(t.is_ascii());
        assert_eq!(&t[..11], b"F?r ?lise y");
        assert!(t.iter().all(|&x| x != 0));
        assert_eq!(b[68], b'a');
    }

    #[test]
    fn decode_reads_back_text() {
        let view = CartView::decode(&CartMetadata::new("T", "A", "C").to_bytes()).unwrap();
        assert_eq!(view.version, "0101");
        assert_eq!(view.title, "T");
        assert_eq!(view.cut_id, "C");
        assert_eq!(view.producer_app_id, "BSIFix");
        assert!(CartView::decode(&[0u8; 100]).is_none());
    }
}
