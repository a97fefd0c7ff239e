//! Text decoding for Stripe exports
//!
//! Exports are UTF-8 in recent dashboards, but older downloads (and files
//! re-saved from Excel) are Windows-1252. Valid UTF-8 is borrowed as is;
//! anything else is decoded as Windows-1252, which maps every byte.

use encoding_rs::WINDOWS_1252;
use std::borrow::Cow;

/// Decode one field, trying UTF-8 first and falling back to Windows-1252
pub fn decode_field(raw: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(raw) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => WINDOWS_1252.decode_without_bom_handling(raw).0,
    }
}
