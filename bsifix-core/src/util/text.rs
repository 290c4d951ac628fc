//! Fixed-width ASCII fields as used by the bext and cart layouts.

/// Replace every non-ASCII character with `?` and keep at most `max_len` characters.
///
/// Overlong input is cut silently; the fixed layouts have nowhere to report it.
pub fn ascii_clean(s: &str, max_len: usize) -> String {
    s.chars()
        .map(|c| if c.is_ascii() { c } else { '?' })
        .take(max_len)
        .collect()
}

/// Write `s` into `field`, ASCII-cleaned, truncated to the field width and
/// NUL-padded.
pub fn put_text(field: &mut [u8], s: &str) {
    let clean = ascii_clean(s, field.len());
    let n = clean.len();
    field[..n].copy_from_slice(clean.as_bytes());
    field[n..].fill(0);
}

/// Fixed-width field of exactly `width` bytes.
pub fn pad_text(s: &str, width: usize) -> Vec<u8> {
    let mut out = vec![0u8; width];
    put_text(&mut out, s);
    out
}

/// Printable view of a NUL-padded field; stops at the first NUL.
pub fn read_text(field: &[u8]) -> String {
    field
        .iter()
        .take_while(|&&b| b != 0)
        .map(|&b| if (0x20..=0x7e).contains(&b) { b as char } else { '.' })
        .collect()
}
