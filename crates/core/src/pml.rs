//! ASCII-hex decoding of embedded PML payloads.
//!
//! PML (Printer Management Language) is a binary protocol that PJL
//! `DMCMD`/`DMINFO` commands carry as an `ASCIIHEX="…"` option: pairs of
//! hex digits encoding the raw PML bytes. This module decodes such a
//! payload; rendering the decoded bytes is the caller's concern.
//!
//! A decode failure is reported with the payload offset of the offending
//! byte so the enclosing command can surface it as a warning without
//! aborting the outer scan.

use thiserror::Error;

/// An ASCII-hex decode failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PmlError {
    /// The payload holds an odd number of hex digits.
    #[error("odd number of hex digits (trailing digit at payload offset {offset})")]
    OddLength {
        /// Offset of the unpaired trailing digit within the payload.
        offset: usize,
    },
    /// A byte that is not a hex digit appeared in the payload.
    #[error("invalid hex digit {byte:#04X} at payload offset {offset}")]
    InvalidDigit {
        /// Offset of the offending byte within the payload.
        offset: usize,
        /// The offending byte value.
        byte: u8,
    },
}

/// Decode an ASCII-hex payload into raw PML bytes.
///
/// The payload must be an even number of hex digits (upper or lower case),
/// with no separators. Returns the first error encountered.
pub fn decode_ascii_hex(payload: &[u8]) -> Result<Vec<u8>, PmlError> {
    let mut out = Vec::with_capacity(payload.len() / 2);
    let mut i = 0;
    while i < payload.len() {
        let h1 = payload[i];
        if !h1.is_ascii_hexdigit() {
            return Err(PmlError::InvalidDigit { offset: i, byte: h1 });
        }
        if i + 1 >= payload.len() {
            return Err(PmlError::OddLength { offset: i });
        }
        let h2 = payload[i + 1];
        if !h2.is_ascii_hexdigit() {
            return Err(PmlError::InvalidDigit { offset: i + 1, byte: h2 });
        }
        out.push((hex_digit_value(h1) << 4) | hex_digit_value(h2));
        i += 2;
    }
    Ok(out)
}

/// Format bytes as space-separated uppercase hex pairs (`48 50 4A`).
pub fn format_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format!("{b:02X}"));
    }
    out
}

/// Convert a single ASCII hex digit to its numeric value (0-15).
fn hex_digit_value(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'A'..=b'F' => b - b'A' + 10,
        b'a'..=b'f' => b - b'a' + 10,
        _ => unreachable!("hex_digit_value called with non-hex byte: {}", b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_simple() {
        assert_eq!(decode_ascii_hex(b"48454C4C4F").unwrap(), b"HELLO");
    }

    #[test]
    fn decode_empty() {
        assert!(decode_ascii_hex(b"").unwrap().is_empty());
    }

    #[test]
    fn decode_case_insensitive() {
        assert_eq!(decode_ascii_hex(b"ff"), decode_ascii_hex(b"FF"));
        assert_eq!(decode_ascii_hex(b"0a").unwrap(), vec![0x0A]);
    }

    #[test]
    fn decode_odd_length() {
        assert_eq!(decode_ascii_hex(b"484"), Err(PmlError::OddLength { offset: 2 }));
    }

    #[test]
    fn decode_invalid_digit_reports_offset() {
        assert_eq!(
            decode_ascii_hex(b"48ZZ"),
            Err(PmlError::InvalidDigit { offset: 2, byte: b'Z' })
        );
        // Second digit of a pair.
        assert_eq!(
            decode_ascii_hex(b"4G"),
            Err(PmlError::InvalidDigit { offset: 1, byte: b'G' })
        );
    }

    #[test]
    fn format_hex_pairs() {
        assert_eq!(format_hex(&[0x00, 0x1B, 0xFF]), "00 1B FF");
        assert_eq!(format_hex(&[]), "");
    }
}
